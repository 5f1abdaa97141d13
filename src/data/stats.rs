use std::collections::HashSet;

use super::model::{CellValue, Row};

// ---------------------------------------------------------------------------
// Descriptive statistics for one column
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    /// Population standard deviation (divisor = count).
    pub std_dev: f64,
}

impl BasicStats {
    /// Label/value pairs in display order.
    pub fn entries(&self) -> [(&'static str, f64); 7] {
        [
            ("count", self.count as f64),
            ("sum", self.sum),
            ("mean", self.mean),
            ("min", self.min),
            ("max", self.max),
            ("median", self.median),
            ("standard deviation", self.std_dev),
        ]
    }
}

/// Every numeric cell of `column`, in row order. Null, Text and missing
/// cells are skipped.
pub fn numeric_values(rows: &[Row], column: &str) -> Vec<f64> {
    rows.iter()
        .filter_map(|r| r.get(column).and_then(CellValue::as_f64))
        .collect()
}

/// `None` when the column holds no numeric value at all.
pub fn basic_stats(rows: &[Row], column: &str) -> Option<BasicStats> {
    summarize(numeric_values(rows, column))
}

fn summarize(mut values: Vec<f64>) -> Option<BasicStats> {
    if values.is_empty() {
        return None;
    }

    let count = values.len();
    let (sum, min, max) = values.iter().fold(
        (0.0, f64::INFINITY, f64::NEG_INFINITY),
        |(sum, min, max), &v| (sum + v, min.min(v), max.max(v)),
    );
    let mean = sum / count as f64;

    values.sort_by(f64::total_cmp);
    let median = if count % 2 == 0 {
        (values[count / 2 - 1] + values[count / 2]) / 2.0
    } else {
        values[count / 2]
    };

    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

    Some(BasicStats {
        count,
        sum,
        mean,
        min,
        max,
        median,
        std_dev: variance.sqrt(),
    })
}

// ---------------------------------------------------------------------------
// Whole-table summary and correlation (analysis tab)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnProfile {
    /// First non-null value was numeric.
    Numeric(Option<BasicStats>),
    /// Otherwise: how many distinct non-null values.
    Categorical { distinct: usize },
    /// No non-null values.
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub non_null: usize,
    pub nulls: usize,
    pub profile: ColumnProfile,
}

/// Summaries for `columns`, in the given order. A missing cell counts as null.
pub fn summarize_columns(rows: &[Row], columns: &[String]) -> Vec<ColumnSummary> {
    columns
        .iter()
        .map(|column| {
            let present: Vec<&CellValue> = rows
                .iter()
                .filter_map(|r| r.get(column))
                .filter(|v| !v.is_null())
                .collect();

            let profile = match present.first() {
                None => ColumnProfile::Empty,
                Some(first) if first.as_f64().is_some() => {
                    ColumnProfile::Numeric(basic_stats(rows, column))
                }
                Some(_) => ColumnProfile::Categorical {
                    distinct: present.iter().collect::<HashSet<_>>().len(),
                },
            };

            ColumnSummary {
                column: column.clone(),
                non_null: present.len(),
                nulls: rows.len() - present.len(),
                profile,
            }
        })
        .collect()
}

/// Pearson correlation over rows where both cells are numeric.
///
/// `None` with fewer than two pairs or when either side has zero variance.
pub fn correlation(rows: &[Row], a: &str, b: &str) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|r| {
            let x = r.get(a)?.as_f64()?;
            let y = r.get(b)?.as_f64()?;
            Some((x, y))
        })
        .collect();

    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}
