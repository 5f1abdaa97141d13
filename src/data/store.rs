use std::collections::{BTreeMap, HashSet};

use super::history::ChangeHistory;
use super::model::{CellValue, ColumnType, Row};
use super::notify::{ListenerId, NotificationBus};
use super::stats::{self, BasicStats};
use super::transform::Transformation;

// ---------------------------------------------------------------------------
// DatasetStore – rows, schema, history and listeners
// ---------------------------------------------------------------------------

/// The in-memory dataset every panel reads from.
///
/// Each mutator records the pre-mutation rows in the history, performs the
/// change, then fires the notification bus exactly once. `undo`/`redo`
/// restore rows only; the column list and type map are left as they are.
///
/// The store is single-threaded and does no locking of its own.
#[derive(Debug, Default)]
pub struct DatasetStore {
    rows: Vec<Row>,
    column_names: Vec<String>,
    column_types: BTreeMap<String, ColumnType>,
    history: ChangeHistory,
    bus: NotificationBus,
}

impl DatasetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose undo history keeps at most `limit` snapshots.
    pub fn with_history_limit(limit: Option<usize>) -> Self {
        Self {
            history: ChangeHistory::with_limit(limit),
            ..Self::default()
        }
    }

    // -- listeners --

    pub fn add_listener<F>(&mut self, callback: F) -> ListenerId
    where
        F: FnMut() + 'static,
    {
        let id = self.bus.add_listener(callback);
        log::debug!("listener {id:?} registered ({} total)", self.bus.listener_count());
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.bus.remove_listener(id)
    }

    // -- accessors --

    /// The live row sequence.
    pub fn data(&self) -> &[Row] {
        &self.rows
    }

    /// Mutable handle on the live rows. Changes made through it bypass the
    /// history and the listeners.
    pub fn data_mut(&mut self) -> &mut Vec<Row> {
        &mut self.rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn column_types(&self) -> &BTreeMap<String, ColumnType> {
        &self.column_types
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Number of `(undo, redo)` steps available.
    pub fn history_depth(&self) -> (usize, usize) {
        (self.history.undo_depth(), self.history.redo_depth())
    }

    pub fn basic_stats(&self, column: &str) -> Option<BasicStats> {
        stats::basic_stats(&self.rows, column)
    }

    // -- mutators --

    /// Replace the whole dataset. Column types come from the first row only;
    /// a Null (or absent) first cell gives `ColumnType::Unknown`.
    pub fn set_data(&mut self, rows: Vec<Row>, headers: Vec<String>) {
        self.history.record(&self.rows);
        self.rows = rows;

        self.column_types = match self.rows.first() {
            Some(first) => headers
                .iter()
                .map(|h| {
                    let tag = first
                        .get(h)
                        .map(CellValue::column_type)
                        .unwrap_or(ColumnType::Unknown);
                    (h.clone(), tag)
                })
                .collect(),
            None => BTreeMap::new(),
        };
        self.column_names = headers;

        log::info!(
            "dataset replaced: {} rows, columns {:?}",
            self.rows.len(),
            self.column_names
        );
        self.bus.notify();
    }

    pub fn apply_transformation(&mut self, transformation: &Transformation) {
        self.history.record(&self.rows);
        self.rows = transformation.apply(&self.rows);

        let columns = transformation.output_columns(&self.column_names);
        if columns != self.column_names {
            self.column_types.retain(|name, _| columns.contains(name));
            self.column_names = columns;
        }

        log::info!(
            "applied '{}': {} rows remain",
            transformation.description(),
            self.rows.len()
        );
        self.bus.notify();
    }

    /// Replace one cell. An out-of-range `row_index` is ignored entirely:
    /// no history entry, no notification.
    pub fn update_value(&mut self, row_index: usize, column: &str, value: CellValue) {
        if row_index >= self.rows.len() {
            log::debug!(
                "update_value ignored: row {row_index} out of range ({} rows)",
                self.rows.len()
            );
            return;
        }
        self.history.record(&self.rows);
        self.rows[row_index].insert(column.to_string(), value);
        log::debug!("cell ({row_index}, {column}) updated");
        self.bus.notify();
    }

    pub fn clear_data(&mut self) {
        self.history.record(&self.rows);
        self.rows.clear();
        self.column_names.clear();
        self.column_types.clear();
        log::info!("dataset cleared");
        self.bus.notify();
    }

    /// Drop rows whose `column` cell is exactly Null. Rows lacking the key
    /// are kept.
    pub fn remove_null_values(&mut self, column: &str) {
        self.history.record(&self.rows);
        let before = self.rows.len();
        self.rows
            .retain(|r| !matches!(r.get(column), Some(CellValue::Null)));
        log::info!(
            "removed {} rows with null '{column}'",
            before - self.rows.len()
        );
        self.bus.notify();
    }

    /// Keep the first occurrence of each structurally equal row.
    pub fn remove_duplicates(&mut self) {
        self.history.record(&self.rows);
        let before = self.rows.len();
        let mut seen: HashSet<Row> = HashSet::with_capacity(before);
        self.rows.retain(|r| seen.insert(r.clone()));
        log::info!("removed {} duplicate rows", before - self.rows.len());
        self.bus.notify();
    }

    pub fn undo(&mut self) {
        if self.history.undo(&mut self.rows) {
            log::debug!("undo: {} rows", self.rows.len());
            self.bus.notify();
        }
    }

    pub fn redo(&mut self) {
        if self.history.redo(&mut self.rows) {
            log::debug!("redo: {} rows", self.rows.len());
            self.bus.notify();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::row;
    use crate::data::transform::{AggregationKind, Condition};
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn headers() -> Vec<String> {
        vec!["id".into(), "value".into(), "category".into()]
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row([("id", CellValue::Integer(1)), ("value", CellValue::Float(10.5)), ("category", CellValue::from("A"))]),
            row([("id", CellValue::Integer(2)), ("value", CellValue::Float(20.5)), ("category", CellValue::from("B"))]),
            row([("id", CellValue::Integer(3)), ("value", CellValue::Float(30.5)), ("category", CellValue::from("A"))]),
        ]
    }

    fn loaded() -> DatasetStore {
        let mut store = DatasetStore::new();
        store.set_data(sample_rows(), headers());
        store
    }

    fn counter(store: &mut DatasetStore) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        store.add_listener(move || c.set(c.get() + 1));
        count
    }

    #[test]
    fn set_data_infers_types_from_first_row() {
        let store = loaded();
        let types = store.column_types();
        assert_eq!(types["id"], ColumnType::Integer);
        assert_eq!(types["value"], ColumnType::Float);
        assert_eq!(types["category"], ColumnType::Text);
        assert_eq!(store.column_names(), headers().as_slice());
    }

    #[test]
    fn type_inference_only_looks_at_first_row() {
        let mut store = DatasetStore::new();
        let rows = vec![
            row([("x", CellValue::Null), ("y", CellValue::Integer(1))]),
            row([("x", CellValue::Integer(5)), ("y", CellValue::from("text"))]),
        ];
        store.set_data(rows, vec!["x".into(), "y".into()]);
        assert_eq!(store.column_types()["x"], ColumnType::Unknown);
        assert_eq!(store.column_types()["y"], ColumnType::Integer);
    }

    #[test]
    fn set_data_with_no_rows_has_no_types() {
        let mut store = DatasetStore::new();
        store.set_data(Vec::new(), vec!["a".into()]);
        assert!(store.column_types().is_empty());
        assert_eq!(store.column_names(), ["a".to_string()].as_slice());
    }

    #[test]
    fn every_mutation_notifies_once() {
        let mut store = loaded();
        let count = counter(&mut store);

        store.set_data(sample_rows(), headers());
        assert_eq!(count.get(), 1);
        store.apply_transformation(&Transformation::sort("value", false));
        assert_eq!(count.get(), 2);
        store.update_value(0, "value", CellValue::Null);
        assert_eq!(count.get(), 3);
        store.remove_null_values("value");
        assert_eq!(count.get(), 4);
        store.remove_duplicates();
        assert_eq!(count.get(), 5);
        store.undo();
        assert_eq!(count.get(), 6);
        store.redo();
        assert_eq!(count.get(), 7);
        store.clear_data();
        assert_eq!(count.get(), 8);
    }

    #[test]
    fn removed_listener_stops_receiving() {
        let mut store = loaded();
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let id = store.add_listener(move || c.set(c.get() + 1));
        store.clear_data();
        assert!(store.remove_listener(id));
        store.clear_data();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn update_value_out_of_range_is_silent() {
        let mut store = loaded();
        let count = counter(&mut store);
        let before = store.data().to_vec();

        store.update_value(99, "value", CellValue::Integer(0));

        assert_eq!(store.data(), before.as_slice());
        assert_eq!(count.get(), 0);
        // no history entry either: undo goes back past set_data
        store.undo();
        assert!(store.is_empty());
    }

    #[test]
    fn update_value_replaces_one_cell() {
        let mut store = loaded();
        store.update_value(1, "category", CellValue::from("Z"));
        assert_eq!(store.data()[1].get("category"), Some(&CellValue::from("Z")));
        store.undo();
        assert_eq!(store.data()[1].get("category"), Some(&CellValue::from("B")));
    }

    #[test]
    fn clear_data_empties_everything_and_can_be_undone() {
        let mut store = loaded();
        store.clear_data();
        assert!(store.is_empty());
        assert!(store.column_names().is_empty());
        assert!(store.column_types().is_empty());
        assert!(store.basic_stats("value").is_none());

        store.undo();
        assert_eq!(store.len(), 3);
        // columns are not part of the snapshot
        assert!(store.column_names().is_empty());
    }

    #[test]
    fn remove_null_values_only_drops_exact_nulls() {
        let mut store = DatasetStore::new();
        store.set_data(
            vec![
                row([("v", CellValue::Integer(1))]),
                row([("v", CellValue::Null)]),
                row([("v", CellValue::from(""))]),
                row([("w", CellValue::Integer(2))]),
            ],
            vec!["v".into()],
        );
        store.remove_null_values("v");
        assert_eq!(store.len(), 3);
        assert!(store.data().iter().all(|r| r.get("v") != Some(&CellValue::Null)));
    }

    #[test]
    fn remove_duplicates_keeps_first_occurrence_in_order() {
        let mut store = loaded();
        let dup = sample_rows()[0].clone();
        store.data_mut().push(dup.clone());
        store.data_mut().insert(1, sample_rows()[2].clone());
        assert_eq!(store.len(), 5);

        store.remove_duplicates();
        let s = sample_rows();
        assert_eq!(store.data(), [s[0].clone(), s[2].clone(), s[1].clone()].as_slice());
        assert_eq!(store.data().iter().filter(|r| **r == dup).count(), 1);
    }

    #[test]
    fn data_mut_is_the_live_store() {
        let mut store = loaded();
        store.data_mut()[0].insert("value".into(), CellValue::Integer(0));
        assert_eq!(store.data()[0].get("value"), Some(&CellValue::Integer(0)));
        assert!(store.can_undo());
    }

    #[test]
    fn filter_then_undo_restores_rows() {
        let mut store = loaded();
        let before = store.data().to_vec();
        store.apply_transformation(&Transformation::filter(
            "value",
            Condition::GreaterThan(15.0).into_predicate(),
        ));
        assert_eq!(store.len(), 2);

        store.undo();
        assert_eq!(store.data(), before.as_slice());
        store.redo();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn undo_and_redo_on_empty_history_do_nothing() {
        let mut store = DatasetStore::new();
        let count = counter(&mut store);
        store.undo();
        store.redo();
        assert_eq!(count.get(), 0);
        assert!(!store.can_undo());
        assert!(!store.can_redo());
    }

    #[test]
    fn new_mutation_clears_redo() {
        let mut store = loaded();
        store.remove_null_values("value");
        store.undo();
        assert!(store.can_redo());
        store.remove_duplicates();
        assert!(!store.can_redo());
    }

    #[test]
    fn aggregation_redefines_columns_and_undo_keeps_them() {
        let mut store = loaded();
        store.apply_transformation(&Transformation::aggregate(
            "category",
            "value",
            AggregationKind::Sum,
        ));
        assert_eq!(store.column_names(), ["category".to_string(), "value".to_string()].as_slice());
        assert!(!store.column_types().contains_key("id"));
        assert_eq!(store.len(), 2);

        store.undo();
        assert_eq!(store.len(), 3);
        assert_eq!(store.column_names().len(), 2);
    }

    #[test]
    fn aggregation_count_example() {
        let mut store = DatasetStore::new();
        store.set_data(
            vec![
                row([("g", CellValue::from("A")), ("v", CellValue::Integer(1))]),
                row([("g", CellValue::from("A")), ("v", CellValue::Integer(2))]),
                row([("g", CellValue::from("B")), ("v", CellValue::Null)]),
            ],
            vec!["g".into(), "v".into()],
        );
        store.apply_transformation(&Transformation::aggregate("g", "v", AggregationKind::Count));
        assert_eq!(store.data(), [row([("g", CellValue::from("A")), ("v", CellValue::Float(2.0))])].as_slice());
    }

    #[test]
    fn aggregating_a_column_by_itself_keeps_one_column() {
        let mut store = DatasetStore::new();
        store.set_data(
            vec![row([("v", CellValue::Integer(1))]), row([("v", CellValue::Integer(1))])],
            vec!["v".into()],
        );
        store.apply_transformation(&Transformation::aggregate("v", "v", AggregationKind::Count));
        assert_eq!(store.column_names(), ["v".to_string()].as_slice());
        assert_eq!(store.data(), [row([("v", CellValue::Float(2.0))])].as_slice());
    }

    #[test]
    fn history_limit_caps_undo() {
        let mut store = DatasetStore::with_history_limit(Some(1));
        store.set_data(sample_rows(), headers());
        store.remove_duplicates();
        assert_eq!(store.history_depth(), (1, 0));
        store.undo();
        store.undo();
        assert_eq!(store.len(), 3);
        assert_eq!(store.history_depth(), (0, 1));
    }

    #[test]
    fn stats_example() {
        let mut store = DatasetStore::new();
        store.set_data(
            vec![
                row([("v", CellValue::Integer(10))]),
                row([("v", CellValue::Integer(20))]),
                row([("v", CellValue::Integer(30))]),
            ],
            vec!["v".into()],
        );
        let s = store.basic_stats("v").unwrap();
        assert_eq!(s.count, 3);
        assert!((s.sum - 60.0).abs() < 1e-9);
        assert!((s.std_dev - 8.165).abs() < 1e-3);
    }

    fn arb_cell() -> impl Strategy<Value = CellValue> {
        prop_oneof![
            Just(CellValue::Null),
            (0i64..3).prop_map(CellValue::Integer),
            (0u8..3).prop_map(|f| CellValue::Float(f as f64 / 2.0)),
            "[ab]".prop_map(CellValue::Text),
        ]
    }

    fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
        proptest::collection::vec((arb_cell(), arb_cell()), 0..24).prop_map(|cells| {
            cells
                .into_iter()
                .map(|(a, b)| row([("a", a), ("b", b)]))
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_remove_duplicates_is_idempotent(rows in arb_rows()) {
            let mut store = DatasetStore::new();
            store.set_data(rows, vec!["a".into(), "b".into()]);
            store.remove_duplicates();
            let once = store.data().to_vec();
            store.remove_duplicates();
            prop_assert_eq!(store.data(), once.as_slice());
        }

        #[test]
        fn prop_undo_restores_pre_transformation_rows(rows in arb_rows(), ascending in any::<bool>()) {
            let mut store = DatasetStore::new();
            store.set_data(rows, vec!["a".into(), "b".into()]);
            let before = store.data().to_vec();

            store.apply_transformation(&Transformation::sort("a", ascending));
            let after = store.data().to_vec();
            store.undo();
            prop_assert_eq!(store.data(), before.as_slice());
            store.redo();
            prop_assert_eq!(store.data(), after.as_slice());
        }
    }
}
