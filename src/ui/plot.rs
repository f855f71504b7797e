use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, Plot, PlotPoints, Points,
};

use crate::color::ColorMap;
use crate::data::aggregate::{BoxSummary, GroupCount, Histogram};
use crate::data::model::CellValue;

pub const CHART_HEIGHT: f32 = 280.0;
const DEFAULT_COLOR: Color32 = Color32::LIGHT_BLUE;

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Axis formatter that prints `labels[i]` at integer positions only.
fn category_axis(labels: Vec<String>) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String {
    move |mark: GridMark, _range: &RangeInclusive<f64>| {
        let i = mark.value.round();
        if (mark.value - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        labels.get(i as usize).cloned().unwrap_or_default()
    }
}

fn series_color(colors: Option<&ColorMap>, name: &str) -> Color32 {
    colors.map(|cm| cm.color_for(name)).unwrap_or(DEFAULT_COLOR)
}

// ---------------------------------------------------------------------------
// Bars
// ---------------------------------------------------------------------------

/// Vertical bars, one per labelled category, coloured by a value ramp.
pub fn category_bars(
    ui: &mut Ui,
    id: &str,
    labels: Vec<String>,
    values: Vec<f64>,
    x_label: &str,
    y_label: &str,
) {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let bars: Vec<Bar> = labels
        .iter()
        .zip(&values)
        .enumerate()
        .map(|(i, (label, &v))| {
            let t = if max > 0.0 { (v / max) as f32 } else { 0.0 };
            Bar::new(i as f64, v)
                .name(label)
                .fill(crate::color::shade(Color32::from_rgb(31, 90, 160), 0.3 + 0.7 * t))
        })
        .collect();

    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_scroll(false)
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).width(0.7));
        });
}

/// Horizontal bars of each category's share of the total, the stand-in for
/// a pie chart.
pub fn share_chart(ui: &mut Ui, id: &str, title: &str, counts: &[GroupCount], colors: Option<&ColorMap>) {
    ui.strong(title);
    let total: usize = counts.iter().map(|g| g.count).sum();
    if total == 0 {
        ui.label("No data.");
        return;
    }
    let labels: Vec<String> = counts.iter().map(|g| g.key.to_string()).collect();
    let fallback = crate::color::generate_palette(counts.len());
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let pct = 100.0 * g.count as f64 / total as f64;
            let label = &labels[i];
            let color = colors
                .map(|cm| cm.color_for(label))
                .unwrap_or(fallback[i]);
            Bar::new(i as f64, pct)
                .name(format!("{label}: {} ({pct:.1}%)", g.count))
                .fill(color)
        })
        .collect();

    Plot::new(id.to_string())
        .height(CHART_HEIGHT * 0.8)
        .x_axis_label("Share (%)")
        .y_axis_formatter(category_axis(labels))
        .include_x(0.0)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().width(0.7));
        });
}

/// Stacked histogram: one bar series per histogram group.
pub fn histogram_chart(
    ui: &mut Ui,
    id: &str,
    hist: &Histogram,
    x_label: &str,
    colors: Option<&ColorMap>,
) {
    if hist.total() == 0 {
        ui.label("No data.");
        return;
    }
    let width = hist.bin_width();
    let mut charts: Vec<BarChart> = Vec::with_capacity(hist.series.len());
    for (name, counts) in &hist.series {
        let bars: Vec<Bar> = counts
            .iter()
            .enumerate()
            .map(|(bin, &c)| Bar::new(hist.bin_center(bin), c as f64))
            .collect();
        let below: Vec<&BarChart> = charts.iter().collect();
        let chart = BarChart::new(bars)
            .name(name)
            .color(series_color(colors, name))
            .width(width)
            .stack_on(&below);
        charts.push(chart);
    }

    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label("Listings")
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Points and lines
// ---------------------------------------------------------------------------

/// Scatter plot with one coloured series per group.
pub fn scatter_chart(
    ui: &mut Ui,
    id: &str,
    groups: BTreeMap<String, Vec<[f64; 2]>>,
    x_label: &str,
    y_label: &str,
    colors: Option<&ColorMap>,
) {
    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (name, points) in groups {
                let color = series_color(colors, &name);
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(name)
                        .color(color)
                        .radius(2.5),
                );
            }
        });
}

/// Geographic scatter with a 1:1 aspect ratio.
pub fn map_chart(ui: &mut Ui, id: &str, groups: BTreeMap<String, Vec<[f64; 2]>>, colors: Option<&ColorMap>) {
    Plot::new(id.to_string())
        .height(CHART_HEIGHT * 1.8)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (name, points) in groups {
                let color = series_color(colors, &name);
                plot_ui.points(
                    Points::new(PlotPoints::from(points))
                        .name(name)
                        .color(color)
                        .radius(3.0),
                );
            }
        });
}

/// Line with point markers.
pub fn line_chart(ui: &mut Ui, id: &str, points: Vec<[f64; 2]>, x_label: &str, y_label: &str) {
    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(points.clone()))
                    .color(DEFAULT_COLOR)
                    .width(2.0),
            );
            plot_ui.points(Points::new(PlotPoints::from(points)).color(DEFAULT_COLOR).radius(3.0));
        });
}

// ---------------------------------------------------------------------------
// Box plots
// ---------------------------------------------------------------------------

/// One box per category, with the raw values overlaid when `show_points`.
pub fn box_chart(
    ui: &mut Ui,
    id: &str,
    groups: &BTreeMap<CellValue, Vec<f64>>,
    x_label: &str,
    y_label: &str,
    colors: Option<&ColorMap>,
    show_points: bool,
) {
    let labels: Vec<String> = groups.keys().map(|k| k.to_string()).collect();
    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .x_axis_label(x_label.to_string())
        .y_axis_label(y_label.to_string())
        .allow_scroll(false)
        .x_axis_formatter(category_axis(labels.clone()))
        .show(ui, |plot_ui| {
            for (i, (label, values)) in labels.iter().zip(groups.values()).enumerate() {
                let Some(b) = BoxSummary::from_values(values) else {
                    continue;
                };
                let color = series_color(colors, label);
                let elem = BoxElem::new(
                    i as f64,
                    BoxSpread::new(b.lower_whisker, b.q1, b.median, b.q3, b.upper_whisker),
                )
                .name(label)
                .box_width(0.5)
                .fill(color.linear_multiply(0.3))
                .stroke(Stroke::new(1.5, color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(label));

                let points: Vec<[f64; 2]> = values
                    .iter()
                    .filter(|&&v| show_points || v < b.lower_whisker || v > b.upper_whisker)
                    .map(|&v| [i as f64, v])
                    .collect();
                if !points.is_empty() {
                    plot_ui.points(Points::new(PlotPoints::from(points)).color(color).radius(2.0));
                }
            }
        });
}
