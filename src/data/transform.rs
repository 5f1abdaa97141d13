use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::model::{CellValue, DataError, Row};

// ---------------------------------------------------------------------------
// Predicates for the filter transformation
// ---------------------------------------------------------------------------

/// Boxed cell test used by [`Transformation::Filter`].
pub struct Predicate(Box<dyn Fn(&CellValue) -> bool>);

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&CellValue) -> bool + 'static,
    {
        Predicate(Box::new(f))
    }

    pub fn test(&self, value: &CellValue) -> bool {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Filter conditions offered by the UI. Numeric comparisons reject
/// non-numeric cells.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    GreaterThan(f64),
    AtLeast(f64),
    LessThan(f64),
    AtMost(f64),
    EqualTo(f64),
    Contains(String),
    NotNull,
}

impl Condition {
    pub fn into_predicate(self) -> Predicate {
        match self {
            Condition::GreaterThan(t) => numeric(move |v| v > t),
            Condition::AtLeast(t) => numeric(move |v| v >= t),
            Condition::LessThan(t) => numeric(move |v| v < t),
            Condition::AtMost(t) => numeric(move |v| v <= t),
            Condition::EqualTo(t) => numeric(move |v| v == t),
            Condition::Contains(needle) => Predicate::new(move |cell| match cell {
                CellValue::Text(s) => s.contains(needle.as_str()),
                _ => false,
            }),
            Condition::NotNull => Predicate::new(|cell| !cell.is_null()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::GreaterThan(t) => write!(f, "> {t}"),
            Condition::AtLeast(t) => write!(f, ">= {t}"),
            Condition::LessThan(t) => write!(f, "< {t}"),
            Condition::AtMost(t) => write!(f, "<= {t}"),
            Condition::EqualTo(t) => write!(f, "== {t}"),
            Condition::Contains(s) => write!(f, "contains \"{s}\""),
            Condition::NotNull => write!(f, "is not null"),
        }
    }
}

fn numeric<F>(test: F) -> Predicate
where
    F: Fn(f64) -> bool + 'static,
{
    Predicate::new(move |cell| cell.as_f64().is_some_and(&test))
}

// ---------------------------------------------------------------------------
// Aggregation kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregationKind {
    Sum,
    Average,
    /// Number of *numeric* values in the group, not the number of rows.
    Count,
}

impl AggregationKind {
    pub const ALL: [AggregationKind; 3] = [
        AggregationKind::Sum,
        AggregationKind::Average,
        AggregationKind::Count,
    ];

    fn reduce(self, values: &[f64]) -> f64 {
        match self {
            AggregationKind::Sum => values.iter().sum(),
            AggregationKind::Average => {
                if values.is_empty() {
                    0.0
                } else {
                    values.iter().sum::<f64>() / values.len() as f64
                }
            }
            AggregationKind::Count => values.len() as f64,
        }
    }
}

impl fmt::Display for AggregationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AggregationKind::Sum => "SUM",
            AggregationKind::Average => "AVERAGE",
            AggregationKind::Count => "COUNT",
        };
        f.write_str(name)
    }
}

impl FromStr for AggregationKind {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUM" => Ok(AggregationKind::Sum),
            "AVERAGE" | "AVG" | "MEAN" => Ok(AggregationKind::Average),
            "COUNT" => Ok(AggregationKind::Count),
            _ => Err(DataError::UnknownAggregation(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Transformation
// ---------------------------------------------------------------------------

/// A named, pure operation over the row sequence.
#[derive(Debug)]
pub enum Transformation {
    Filter {
        column: String,
        predicate: Predicate,
    },
    Sort {
        column: String,
        ascending: bool,
    },
    Aggregate {
        group_column: String,
        value_column: String,
        kind: AggregationKind,
    },
}

impl Transformation {
    pub fn filter(column: impl Into<String>, predicate: Predicate) -> Self {
        Transformation::Filter {
            column: column.into(),
            predicate,
        }
    }

    pub fn sort(column: impl Into<String>, ascending: bool) -> Self {
        Transformation::Sort {
            column: column.into(),
            ascending,
        }
    }

    pub fn aggregate(
        group_column: impl Into<String>,
        value_column: impl Into<String>,
        kind: AggregationKind,
    ) -> Self {
        Transformation::Aggregate {
            group_column: group_column.into(),
            value_column: value_column.into(),
            kind,
        }
    }

    /// Produce the transformed rows. The input is never modified.
    pub fn apply(&self, rows: &[Row]) -> Vec<Row> {
        match self {
            Transformation::Filter { column, predicate } => rows
                .iter()
                .filter(|r| r.get(column).is_some_and(|v| predicate.test(v)))
                .cloned()
                .collect(),
            Transformation::Sort { column, ascending } => {
                let mut sorted = rows.to_vec();
                stable_sort_by(&mut sorted, |a, b| {
                    let ord = compare_column(a, b, column);
                    if *ascending {
                        ord
                    } else {
                        ord.reverse()
                    }
                });
                sorted
            }
            Transformation::Aggregate {
                group_column,
                value_column,
                kind,
            } => aggregate(rows, group_column, value_column, *kind),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Transformation::Filter { column, .. } => format!("Filter data on column: {column}"),
            Transformation::Sort { column, ascending } => format!(
                "Sort {} by column: {column}",
                if *ascending { "ascending" } else { "descending" }
            ),
            Transformation::Aggregate {
                group_column,
                value_column,
                kind,
            } => format!("{kind} {value_column} grouped by {group_column}"),
        }
    }

    /// Column order after the transformation. Only aggregation changes it.
    pub fn output_columns(&self, current: &[String]) -> Vec<String> {
        match self {
            Transformation::Aggregate {
                group_column,
                value_column,
                ..
            } if group_column == value_column => vec![group_column.clone()],
            Transformation::Aggregate {
                group_column,
                value_column,
                ..
            } => vec![group_column.clone(), value_column.clone()],
            _ => current.to_vec(),
        }
    }
}

/// Missing keys are treated like Null so the comparator stays defined.
fn compare_column(a: &Row, b: &Row, column: &str) -> Ordering {
    let null = CellValue::Null;
    let va = a.get(column).unwrap_or(&null);
    let vb = b.get(column).unwrap_or(&null);
    va.compare(vb)
}

fn aggregate(rows: &[Row], group_column: &str, value_column: &str, kind: AggregationKind) -> Vec<Row> {
    // Groups in order of first appearance; only numeric values are collected.
    let mut index: HashMap<CellValue, usize> = HashMap::new();
    let mut groups: Vec<(CellValue, Vec<f64>)> = Vec::new();

    for r in rows {
        let Some(value) = r.get(value_column).and_then(CellValue::as_f64) else {
            continue;
        };
        let key = r.get(group_column).cloned().unwrap_or(CellValue::Null);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push((key, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(value);
    }

    groups
        .into_iter()
        .map(|(key, values)| {
            let mut out = Row::new();
            out.insert(group_column.to_string(), key);
            out.insert(value_column.to_string(), CellValue::Float(kind.reduce(&values)));
            out
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Stable merge sort
// ---------------------------------------------------------------------------

/// Stable top-down merge sort.
///
/// `slice::sort_by` may panic when the comparator is not a total order,
/// which the cell comparator is not once kinds are mixed. This one only
/// ever asks "is b strictly less than a", so ties keep their input order
/// and inconsistent answers cannot abort the sort.
pub fn stable_sort_by<T, F>(items: &mut Vec<T>, mut cmp: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let taken = std::mem::take(items);
    *items = merge_sort(taken, &mut cmp);
}

fn merge_sort<T, F>(mut items: Vec<T>, cmp: &mut F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Ordering,
{
    if items.len() <= 1 {
        return items;
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, cmp);
    let right = merge_sort(right, cmp);

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => cmp(r, l) == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged
}
