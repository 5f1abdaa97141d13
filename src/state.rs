use std::cell::Cell;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::config::{AppConfig, ChartKind};
use crate::data::model::{CellValue, DataError};
use crate::data::stats::{self, ColumnProfile};
use crate::data::store::DatasetStore;
use crate::data::transform::{AggregationKind, Condition, Transformation};
use crate::data::{export, loader};

// ---------------------------------------------------------------------------
// Panel inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Data,
    Analysis,
    Visualisation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOp {
    #[default]
    GreaterThan,
    AtLeast,
    LessThan,
    AtMost,
    EqualTo,
    Contains,
    NotNull,
}

impl FilterOp {
    pub const ALL: [FilterOp; 7] = [
        FilterOp::GreaterThan,
        FilterOp::AtLeast,
        FilterOp::LessThan,
        FilterOp::AtMost,
        FilterOp::EqualTo,
        FilterOp::Contains,
        FilterOp::NotNull,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilterOp::GreaterThan => "greater than",
            FilterOp::AtLeast => "at least",
            FilterOp::LessThan => "less than",
            FilterOp::AtMost => "at most",
            FilterOp::EqualTo => "equal to",
            FilterOp::Contains => "contains text",
            FilterOp::NotNull => "is not null",
        }
    }

    /// Whether the operand field is shown/used.
    pub fn takes_operand(self) -> bool {
        !matches!(self, FilterOp::NotNull)
    }

    fn condition(self, operand: &str) -> Result<Condition, String> {
        let number = || {
            operand
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid number format: '{operand}'"))
        };
        Ok(match self {
            FilterOp::GreaterThan => Condition::GreaterThan(number()?),
            FilterOp::AtLeast => Condition::AtLeast(number()?),
            FilterOp::LessThan => Condition::LessThan(number()?),
            FilterOp::AtMost => Condition::AtMost(number()?),
            FilterOp::EqualTo => Condition::EqualTo(number()?),
            FilterOp::Contains => Condition::Contains(operand.to_string()),
            FilterOp::NotNull => Condition::NotNull,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterInput {
    pub column: Option<String>,
    pub op: FilterOp,
    pub operand: String,
}

#[derive(Debug, Clone)]
pub struct SortInput {
    pub column: Option<String>,
    pub ascending: bool,
}

impl Default for SortInput {
    fn default() -> Self {
        Self {
            column: None,
            ascending: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AggregateInput {
    pub group_column: Option<String>,
    pub value_column: Option<String>,
    /// Aggregation name as picked in the UI ("SUM", "AVERAGE", "COUNT").
    pub kind: String,
}

impl Default for AggregateInput {
    fn default() -> Self {
        Self {
            group_column: None,
            value_column: None,
            kind: AggregationKind::Sum.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct EditInput {
    pub row: usize,
    pub column: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct ChartInput {
    pub kind: ChartKind,
    pub x: Option<String>,
    pub y: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisInput {
    pub first: Option<String>,
    pub second: Option<String>,
    pub report: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Info(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub store: DatasetStore,
    pub config: AppConfig,
    /// Where preferences are written back; `None` disables saving.
    config_path: Option<PathBuf>,

    /// Bumped by the store listener on every data change.
    revision: Rc<Cell<u64>>,
    /// Revision the panel selections were last synced against.
    synced_revision: u64,

    pub tab: Tab,
    /// Column whose statistics are shown in the side panel.
    pub stats_column: Option<String>,
    pub filter: FilterInput,
    pub sort: SortInput,
    pub aggregate: AggregateInput,
    pub edit: EditInput,
    pub chart: ChartInput,
    pub analysis: AnalysisInput,

    /// Status / error message shown in the top bar.
    pub status: Option<Status>,
}

impl AppState {
    pub fn new(config: AppConfig, config_path: Option<PathBuf>) -> Self {
        let mut store = DatasetStore::with_history_limit(config.history_limit);
        let revision = Rc::new(Cell::new(0));
        let counter = Rc::clone(&revision);
        store.add_listener(move || counter.set(counter.get() + 1));

        let chart = ChartInput {
            kind: config.preferred_chart,
            ..ChartInput::default()
        };

        Self {
            store,
            config,
            config_path,
            revision,
            synced_revision: 0,
            tab: Tab::default(),
            stats_column: None,
            filter: FilterInput::default(),
            sort: SortInput::default(),
            aggregate: AggregateInput::default(),
            edit: EditInput::default(),
            chart,
            analysis: AnalysisInput::default(),
            status: None,
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision.get()
    }

    /// Re-point every column picker at a valid column after the data
    /// changed. Returns whether anything was refreshed.
    pub fn sync_with_store(&mut self) -> bool {
        let rev = self.revision();
        if rev == self.synced_revision {
            return false;
        }
        self.synced_revision = rev;

        let columns = self.store.column_names().to_vec();
        let first = columns.first().cloned();
        let second = columns.get(1).cloned().or_else(|| first.clone());
        let keep = |current: &mut Option<String>, fallback: &Option<String>| {
            if !current.as_ref().is_some_and(|c| columns.contains(c)) {
                *current = fallback.clone();
            }
        };

        keep(&mut self.stats_column, &first);
        keep(&mut self.filter.column, &first);
        keep(&mut self.sort.column, &first);
        keep(&mut self.aggregate.group_column, &first);
        keep(&mut self.aggregate.value_column, &second);
        keep(&mut self.edit.column, &first);
        keep(&mut self.chart.x, &first);
        keep(&mut self.chart.y, &second);
        keep(&mut self.analysis.first, &first);
        keep(&mut self.analysis.second, &second);

        if self.edit.row >= self.store.len() {
            self.edit.row = self.store.len().saturating_sub(1);
        }
        log::debug!("panel selections synced at revision {rev}");
        true
    }

    fn info(&mut self, msg: impl Into<String>) {
        self.status = Some(Status::Info(msg.into()));
    }

    fn error(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::warn!("{msg}");
        self.status = Some(Status::Error(msg));
    }

    fn save_config(&self) {
        if let Some(path) = &self.config_path {
            if let Err(e) = self.config.save_to(path) {
                log::warn!("could not save preferences: {e:#}");
            }
        }
    }

    // -- file actions --

    pub fn import_file(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(table) => {
                if table.is_empty() {
                    log::warn!("{} contains no rows", path.display());
                }
                let n = table.len();
                self.store.set_data(table.rows, table.headers);
                self.config.remember_file(path);
                self.save_config();
                self.info(format!("Imported {n} rows from {}", path.display()));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.error(format!("Error importing file: {e:#}"));
            }
        }
    }

    pub fn export_file(&mut self, path: &Path) {
        match export::save_file(path, self.store.column_names(), self.store.data()) {
            Ok(()) => {
                self.config.remember_file(path);
                self.save_config();
                self.info(format!("Exported {} rows to {}", self.store.len(), path.display()));
            }
            Err(e) => self.error(format!("Error exporting file: {e:#}")),
        }
    }

    // -- cleaning / editing --

    pub fn remove_nulls(&mut self) {
        let Some(column) = self.stats_column.clone() else {
            return self.error("Select a column first");
        };
        let before = self.store.len();
        self.store.remove_null_values(&column);
        self.info(format!("Removed {} rows with null '{column}'", before - self.store.len()));
    }

    pub fn remove_duplicates(&mut self) {
        let before = self.store.len();
        self.store.remove_duplicates();
        self.info(format!("Removed {} duplicate rows", before - self.store.len()));
    }

    pub fn edit_cell(&mut self) {
        let Some(column) = self.edit.column.clone() else {
            return self.error("Select a column to edit");
        };
        if self.edit.row >= self.store.len() {
            return self.error(format!("Row {} does not exist", self.edit.row));
        }
        let value = CellValue::parse_input(&self.edit.text);
        self.store.update_value(self.edit.row, &column, value);
        self.info(format!("Updated row {}, column '{column}'", self.edit.row));
    }

    /// Point the statistics panel and the cell editor at a cell.
    pub fn select_cell(&mut self, row: usize, column: &str) {
        self.edit.row = row;
        self.edit.column = Some(column.to_string());
        self.edit.text = self
            .store
            .data()
            .get(row)
            .and_then(|r| r.get(column))
            .filter(|v| !v.is_null())
            .map(|v| v.to_string())
            .unwrap_or_default();
        self.select_stats_column(column);
    }

    pub fn select_stats_column(&mut self, column: &str) {
        self.stats_column = Some(column.to_string());
    }

    pub fn clear(&mut self) {
        self.store.clear_data();
        self.analysis.report.clear();
        self.info("Data cleared");
    }

    pub fn undo(&mut self) {
        self.store.undo();
    }

    pub fn redo(&mut self) {
        self.store.redo();
    }

    // -- transformations --

    fn apply(&mut self, transformation: Transformation) {
        let description = transformation.description();
        self.store.apply_transformation(&transformation);
        self.info(format!("{description} ({} rows)", self.store.len()));
    }

    pub fn filter(&mut self) {
        let Some(column) = self.filter.column.clone() else {
            return self.error("Select a column to filter on");
        };
        match self.filter.op.condition(&self.filter.operand) {
            Ok(condition) => {
                log::info!("filter '{column}' {condition}");
                self.apply(Transformation::filter(column, condition.into_predicate()));
            }
            Err(msg) => self.error(msg),
        }
    }

    pub fn sort(&mut self) {
        let Some(column) = self.sort.column.clone() else {
            return self.error("Select a column to sort by");
        };
        self.apply(Transformation::sort(column, self.sort.ascending));
    }

    pub fn aggregate(&mut self) {
        let (Some(group), Some(value)) = (
            self.aggregate.group_column.clone(),
            self.aggregate.value_column.clone(),
        ) else {
            return self.error("Select group and value columns");
        };
        match self.aggregate.kind.parse::<AggregationKind>() {
            Ok(kind) => self.apply(Transformation::aggregate(group, value, kind)),
            Err(e @ DataError::UnknownAggregation(_)) => self.error(e.to_string()),
        }
    }

    // -- analysis --

    pub fn run_correlation(&mut self) {
        let (Some(a), Some(b)) = (self.analysis.first.clone(), self.analysis.second.clone()) else {
            return self.error("Please select two columns for correlation analysis.");
        };
        match stats::correlation(self.store.data(), &a, &b) {
            Some(r) => {
                self.analysis.report = format!(
                    "Correlation Analysis Results:\n\n\
                     Columns: {a} and {b}\n\
                     Pearson's Correlation Coefficient: {r:.4}\n\n\
                     Interpretation:\n\
                     - Values close to 1 indicate strong positive correlation\n\
                     - Values close to -1 indicate strong negative correlation\n\
                     - Values close to 0 indicate weak or no correlation"
                );
            }
            None => self.error("Selected columns must contain varying numeric data for correlation analysis."),
        }
    }

    pub fn run_summary(&mut self) {
        let summaries = stats::summarize_columns(self.store.data(), self.store.column_names());
        let mut out = String::new();
        for s in &summaries {
            let _ = writeln!(out, "Column: {}", s.column);
            let _ = writeln!(out, "Total values: {}", s.non_null);
            let _ = writeln!(out, "Null values: {}", s.nulls);
            match &s.profile {
                ColumnProfile::Numeric(Some(b)) => {
                    let _ = writeln!(out, "Mean: {:.2}", b.mean);
                    let _ = writeln!(out, "Median: {:.2}", b.median);
                    let _ = writeln!(out, "Std Dev: {:.2}", b.std_dev);
                    let _ = writeln!(out, "Min: {:.2}", b.min);
                    let _ = writeln!(out, "Max: {:.2}", b.max);
                }
                ColumnProfile::Categorical { distinct } => {
                    let _ = writeln!(out, "Unique values: {distinct}");
                }
                ColumnProfile::Numeric(None) | ColumnProfile::Empty => {}
            }
            out.push('\n');
        }
        self.analysis.report = out;
    }

    // -- preferences --

    pub fn set_chart_kind(&mut self, kind: ChartKind) {
        if self.chart.kind == kind {
            return;
        }
        self.chart.kind = kind;
        self.config.preferred_chart = kind;
        self.save_config();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{row, Row};

    fn state() -> AppState {
        AppState::new(AppConfig::default(), None)
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            row([("id", CellValue::Integer(1)), ("value", CellValue::Float(10.5)), ("category", CellValue::from("A"))]),
            row([("id", CellValue::Integer(2)), ("value", CellValue::Float(20.5)), ("category", CellValue::from("B"))]),
            row([("id", CellValue::Integer(3)), ("value", CellValue::Float(30.5)), ("category", CellValue::from("A"))]),
        ]
    }

    fn loaded() -> AppState {
        let mut s = state();
        s.store.set_data(
            sample_rows(),
            vec!["id".into(), "value".into(), "category".into()],
        );
        s.sync_with_store();
        s
    }

    #[test]
    fn listener_bumps_revision_and_sync_picks_columns() {
        let mut s = state();
        assert!(!s.sync_with_store());
        let rev = s.revision();

        s.store.set_data(sample_rows(), vec!["id".into(), "value".into(), "category".into()]);
        assert_eq!(s.revision(), rev + 1);
        assert!(s.sync_with_store());
        assert!(!s.sync_with_store());

        assert_eq!(s.chart.x.as_deref(), Some("id"));
        assert_eq!(s.chart.y.as_deref(), Some("value"));
        assert_eq!(s.aggregate.value_column.as_deref(), Some("value"));
    }

    #[test]
    fn sync_keeps_still_valid_selections() {
        let mut s = loaded();
        s.sort.column = Some("category".into());
        s.store.remove_duplicates();
        s.sync_with_store();
        assert_eq!(s.sort.column.as_deref(), Some("category"));

        s.store.clear_data();
        s.sync_with_store();
        assert_eq!(s.sort.column, None);
    }

    #[test]
    fn filter_with_bad_number_reports_error() {
        let mut s = loaded();
        s.filter.column = Some("value".into());
        s.filter.operand = "abc".into();
        s.filter();
        assert!(matches!(s.status, Some(Status::Error(_))));
        assert_eq!(s.store.len(), 3);
    }

    #[test]
    fn filter_sort_and_undo() {
        let mut s = loaded();
        s.filter.column = Some("value".into());
        s.filter.operand = "15".into();
        s.filter();
        assert_eq!(s.store.len(), 2);

        s.sort.column = Some("value".into());
        s.sort.ascending = false;
        s.sort();
        assert_eq!(s.store.data()[0]["value"], CellValue::Float(30.5));

        s.undo();
        s.undo();
        assert_eq!(s.store.len(), 3);
        s.redo();
        assert_eq!(s.store.len(), 2);
    }

    #[test]
    fn unknown_aggregation_name_is_reported() {
        let mut s = loaded();
        s.aggregate.group_column = Some("category".into());
        s.aggregate.value_column = Some("value".into());
        s.aggregate.kind = "MEDIAN".into();
        s.aggregate();
        assert_eq!(
            s.status,
            Some(Status::Error("unknown aggregation kind: MEDIAN".into()))
        );
        assert_eq!(s.store.len(), 3);

        s.aggregate.kind = "AVERAGE".into();
        s.aggregate();
        assert_eq!(s.store.len(), 2);
        s.sync_with_store();
        assert_eq!(s.chart.x.as_deref(), Some("category"));
    }

    #[test]
    fn edit_cell_parses_input() {
        let mut s = loaded();
        s.edit.row = 1;
        s.edit.column = Some("value".into());
        s.edit.text = "99".into();
        s.edit_cell();
        assert_eq!(s.store.data()[1]["value"], CellValue::Integer(99));

        s.edit.row = 10;
        s.edit_cell();
        assert!(matches!(s.status, Some(Status::Error(_))));
    }

    #[test]
    fn select_cell_fills_editor() {
        let mut s = loaded();
        s.select_cell(2, "category");
        assert_eq!(s.edit.row, 2);
        assert_eq!(s.edit.text, "A");
        assert_eq!(s.stats_column.as_deref(), Some("category"));

        s.store.update_value(0, "value", CellValue::Null);
        s.select_cell(0, "value");
        assert_eq!(s.edit.text, "");
    }

    #[test]
    fn remove_nulls_uses_selected_column() {
        let mut s = loaded();
        s.store.update_value(0, "value", CellValue::Null);
        s.stats_column = Some("value".into());
        s.remove_nulls();
        assert_eq!(s.store.len(), 2);
    }

    #[test]
    fn summary_and_correlation_reports() {
        let mut s = loaded();
        s.run_summary();
        assert!(s.analysis.report.contains("Column: value"));
        assert!(s.analysis.report.contains("Mean: 20.50"));
        assert!(s.analysis.report.contains("Unique values: 2"));

        s.analysis.first = Some("id".into());
        s.analysis.second = Some("value".into());
        s.run_correlation();
        assert!(s.analysis.report.contains("1.0000"));
    }

    #[test]
    fn import_and_export_through_state() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        let mut s = AppState::new(AppConfig::default(), Some(config_path.clone()));

        let input = dir.path().join("in.csv");
        std::fs::write(&input, "a,b\n1,x\n2,y\n").unwrap();
        s.import_file(&input);
        assert_eq!(s.store.len(), 2);
        assert_eq!(s.config.last_directory.as_deref(), Some(dir.path()));

        let output = dir.path().join("out.json");
        s.export_file(&output);
        assert!(output.exists());
        assert_eq!(AppConfig::load_from(&config_path).last_directory.as_deref(), Some(dir.path()));

        s.import_file(&dir.path().join("missing.csv"));
        assert!(matches!(s.status, Some(Status::Error(_))));
        assert_eq!(s.store.len(), 2);
    }

    #[test]
    fn chart_kind_is_remembered() {
        let mut s = state();
        s.set_chart_kind(ChartKind::Bar);
        assert_eq!(s.config.preferred_chart, ChartKind::Bar);
        let again = AppState::new(s.config.clone(), None);
        assert_eq!(again.chart.kind, ChartKind::Bar);
    }
}
