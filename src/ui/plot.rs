use std::collections::HashMap;

use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::config::ChartKind;
use crate::data::model::Row;
use crate::data::stats::numeric_values;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Series builders (pure, no egui)
// ---------------------------------------------------------------------------

/// `[x, y]` for every row where both cells are numeric, in row order.
pub fn xy_points(rows: &[Row], x: &str, y: &str) -> Vec<[f64; 2]> {
    rows.iter()
        .filter_map(|r| Some([r.get(x)?.as_f64()?, r.get(y)?.as_f64()?]))
        .collect()
}

/// Same as [`xy_points`], ordered by x.
pub fn line_points(rows: &[Row], x: &str, y: &str) -> Vec<[f64; 2]> {
    let mut points = xy_points(rows, x, y);
    points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    points
}

/// Sum of numeric `y` per non-null `x` category, in order of first appearance.
pub fn category_totals(rows: &[Row], x: &str, y: &str) -> Vec<(String, f64)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut totals: Vec<(String, f64)> = Vec::new();
    for r in rows {
        let (Some(category), Some(value)) = (r.get(x), r.get(y).and_then(|v| v.as_f64())) else {
            continue;
        };
        if category.is_null() {
            continue;
        }
        let label = category.to_string();
        match index.get(&label) {
            Some(&i) => totals[i].1 += value,
            None => {
                index.insert(label.clone(), totals.len());
                totals.push((label, value));
            }
        }
    }
    totals
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub width: f64,
    pub count: usize,
}

/// Equal-width bins over `[min, max]`; `min(50, n / 2)` bins, at least one.
/// The last bin is closed on the right.
pub fn histogram(values: &[f64]) -> Vec<Bin> {
    if values.is_empty() {
        return Vec::new();
    }
    let n_bins = (values.len() / 2).clamp(1, 50);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    if span.abs() < f64::EPSILON {
        return vec![Bin {
            start: min - 0.5,
            width: 1.0,
            count: values.len(),
        }];
    }

    let width = span / n_bins as f64;
    let mut bins: Vec<Bin> = (0..n_bins)
        .map(|i| Bin {
            start: min + i as f64 * width,
            width,
            count: 0,
        })
        .collect();
    for &v in values {
        let idx = (((v - min) / width) as usize).min(n_bins - 1);
        bins[idx].count += 1;
    }
    bins
}

// ---------------------------------------------------------------------------
// Chart rendering (visualisation tab)
// ---------------------------------------------------------------------------

pub fn chart(ui: &mut Ui, state: &AppState) {
    let (Some(x), y) = (state.chart.x.as_deref(), state.chart.y.as_deref()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Import data to create a chart  (File → Import…)");
        });
        return;
    };
    let rows = state.store.data();
    let kind = state.chart.kind;
    let y = if kind.needs_y() { y.unwrap_or(x) } else { "Frequency" };

    let plot = Plot::new("data_chart")
        .legend(Legend::default())
        .x_axis_label(x)
        .y_axis_label(y)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true);

    match kind {
        ChartKind::Scatter => {
            let points: PlotPoints = xy_points(rows, x, y).into_iter().collect();
            plot.show(ui, |plot_ui| {
                plot_ui.points(
                    Points::new(points)
                        .name("Data")
                        .radius(3.0)
                        .color(Color32::LIGHT_BLUE),
                );
            });
        }
        ChartKind::Line => {
            let points: PlotPoints = line_points(rows, x, y).into_iter().collect();
            plot.show(ui, |plot_ui| {
                plot_ui.line(Line::new(points).name("Data").width(1.5));
            });
        }
        ChartKind::Bar => {
            let totals = category_totals(rows, x, y);
            let colors = ColorMap::new(totals.iter().map(|(label, _)| label.as_str()));
            plot.show(ui, |plot_ui| {
                for (i, (label, total)) in totals.iter().enumerate() {
                    let color = colors.color_for(label);
                    let bar = Bar::new(i as f64, *total).name(label).width(0.7);
                    plot_ui.bar_chart(BarChart::new(vec![bar]).name(label).color(color));
                }
            });
        }
        ChartKind::Histogram => {
            let bins = histogram(&numeric_values(rows, x));
            if bins.is_empty() {
                ui.label("No numeric data available for histogram.");
                return;
            }
            let bars: Vec<Bar> = bins
                .iter()
                .map(|b| Bar::new(b.start + b.width / 2.0, b.count as f64).width(b.width))
                .collect();
            plot.show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name(x).color(Color32::LIGHT_BLUE));
            });
        }
    }
}
