//! Chart Plotter Module
//! Draws dashboard panels with egui_plot.

use crate::charts::{ChartPanel, PanelContent};
use crate::stats::{BoxSummary, CorrelationMatrix};
use egui::{Align2, Color32, FontId, RichText, Sense, Stroke};
use egui_plot::{Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Line, Plot, PlotPoints, Points};
use std::collections::BTreeMap;

pub const LINE_COLOR: Color32 = Color32::from_rgb(52, 152, 219); // Blue
pub const BAR_COLOR: Color32 = Color32::from_rgb(46, 204, 113); // Green
pub const BOX_COLOR: Color32 = Color32::from_rgb(155, 89, 182); // Purple
pub const NEGATIVE_COLOR: Color32 = Color32::from_rgb(52, 152, 219);
pub const POSITIVE_COLOR: Color32 = Color32::from_rgb(231, 76, 60);

const PLOT_HEIGHT: f32 = 280.0;
const MAX_CELL: f32 = 28.0;
const MIN_CELL: f32 = 4.0;
/// Cell values are printed only when the matrix is this small or smaller.
const MAX_ANNOTATED_COLUMNS: usize = 12;

/// Draws dashboard chart panels.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw any panel, dispatching on its content.
    pub fn draw_panel(ui: &mut egui::Ui, panel: &ChartPanel) {
        match &panel.content {
            PanelContent::Line(segments) => {
                Self::draw_line_chart(ui, panel.id, segments, &panel.y_label)
            }
            PanelContent::Bar(means) => Self::draw_bar_chart(ui, panel.id, means, &panel.y_label),
            PanelContent::Box(boxes) => Self::draw_box_chart(ui, panel.id, boxes, &panel.y_label),
            PanelContent::Heatmap(matrix) => Self::draw_heatmap(ui, matrix),
            PanelContent::Placeholder(message) => Self::draw_placeholder(ui, message),
        }
    }

    /// Line over years with point markers, one line per run of present values.
    pub fn draw_line_chart(
        ui: &mut egui::Ui,
        id: &str,
        segments: &[Vec<(i32, f64)>],
        y_label: &str,
    ) {
        Plot::new(format!("line_{}", id))
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label(y_label.to_string())
            .show(ui, |plot_ui| {
                // One line per run so missing years stay visible as gaps
                for segment in segments {
                    let coords: Vec<[f64; 2]> =
                        segment.iter().map(|&(y, v)| [y as f64, v]).collect();
                    plot_ui.line(
                        Line::new(PlotPoints::from_iter(coords.iter().copied()))
                            .color(LINE_COLOR)
                            .width(2.0)
                            .name(y_label),
                    );
                    plot_ui.points(
                        Points::new(PlotPoints::from_iter(coords))
                            .radius(3.0)
                            .color(LINE_COLOR),
                    );
                }
            });
    }

    /// One bar per year. Years without a mean are left out.
    pub fn draw_bar_chart(ui: &mut egui::Ui, id: &str, means: &BTreeMap<i32, f64>, y_label: &str) {
        let bars: Vec<Bar> = means
            .iter()
            .filter(|(_, v)| !v.is_nan())
            .map(|(&year, &mean)| Bar::new(year as f64, mean).width(0.7).name(year.to_string()))
            .collect();

        Plot::new(format!("bar_{}", id))
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label(y_label.to_string())
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("Mean"));
            });
    }

    /// One box per year.
    pub fn draw_box_chart(
        ui: &mut egui::Ui,
        id: &str,
        boxes: &[(i32, BoxSummary)],
        y_label: &str,
    ) {
        let elems: Vec<BoxElem> = boxes
            .iter()
            .map(|(year, s)| {
                BoxElem::new(
                    *year as f64,
                    BoxSpread::new(s.whisker_low, s.q1, s.median, s.q3, s.whisker_high),
                )
                .name(format!("{} (n={}, mean={:.1})", year, s.count, s.mean))
                .box_width(0.6)
                .fill(BOX_COLOR.gamma_multiply(0.3))
                .stroke(Stroke::new(1.5, BOX_COLOR))
            })
            .collect();
        let outliers: Vec<[f64; 2]> = boxes
            .iter()
            .flat_map(|(year, s)| s.outliers.iter().map(move |&v| [*year as f64, v]))
            .collect();

        Plot::new(format!("box_{}", id))
            .height(PLOT_HEIGHT)
            .allow_scroll(false)
            .x_axis_label("Year")
            .y_axis_label(y_label.to_string())
            .show(ui, |plot_ui| {
                plot_ui.box_plot(BoxPlot::new(elems).name(y_label));
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(outliers))
                        .radius(2.5)
                        .color(BOX_COLOR)
                        .name("Outliers"),
                );
            });
    }

    /// Map a correlation in `[-1, 1]` onto a blue-white-red scale.
    pub fn heat_color(r: f64) -> Color32 {
        if r.is_nan() {
            return Color32::from_gray(160);
        }
        let t = r.clamp(-1.0, 1.0).abs() as f32;
        let target = if r < 0.0 { NEGATIVE_COLOR } else { POSITIVE_COLOR };
        let mix = |c: u8| (255.0 + (c as f32 - 255.0) * t).round() as u8;
        Color32::from_rgb(mix(target.r()), mix(target.g()), mix(target.b()))
    }

    /// Correlation heatmap painted cell by cell; hover shows the pair.
    pub fn draw_heatmap(ui: &mut egui::Ui, matrix: &CorrelationMatrix) {
        let n = matrix.len();
        if n == 0 {
            return;
        }

        let cell = (ui.available_width() / n as f32).clamp(MIN_CELL, MAX_CELL);
        let size = egui::vec2(cell * n as f32, cell * n as f32);
        let (rect, response) = ui.allocate_exact_size(size, Sense::hover());
        let painter = ui.painter_at(rect);
        let annotate = n <= MAX_ANNOTATED_COLUMNS;

        for i in 0..n {
            for j in 0..n {
                let r = matrix.get(i, j).unwrap_or(f64::NAN);
                let min = rect.min + egui::vec2(j as f32 * cell, i as f32 * cell);
                let cell_rect = egui::Rect::from_min_size(min, egui::vec2(cell, cell));
                painter.rect_filled(cell_rect, 0.0, Self::heat_color(r));

                if annotate && !r.is_nan() {
                    let text_color = if r.abs() > 0.6 {
                        Color32::WHITE
                    } else {
                        Color32::BLACK
                    };
                    painter.text(
                        cell_rect.center(),
                        Align2::CENTER_CENTER,
                        format!("{:.2}", r),
                        FontId::proportional(9.0),
                        text_color,
                    );
                }
            }
        }

        if let Some(pos) = response.hover_pos() {
            let j = (((pos.x - rect.min.x) / cell) as usize).min(n - 1);
            let i = (((pos.y - rect.min.y) / cell) as usize).min(n - 1);
            let r = matrix.get(i, j).unwrap_or(f64::NAN);
            response.on_hover_text_at_pointer(format!(
                "{} vs {}\nr = {:.3}",
                matrix.columns[i], matrix.columns[j], r
            ));
        }

        ui.horizontal(|ui| {
            for (label, r) in [("-1", -1.0), ("0", 0.0), ("+1", 1.0)] {
                let (swatch, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), Sense::hover());
                ui.painter().rect_filled(swatch, 2.0, Self::heat_color(r));
                ui.label(RichText::new(label).size(11.0));
                ui.add_space(8.0);
            }
            ui.label(
                RichText::new(format!("{} numeric columns", n))
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
    }

    /// Static text shown instead of a chart.
    pub fn draw_placeholder(ui: &mut egui::Ui, message: &str) {
        ui.add_space(6.0);
        ui.label(RichText::new(message).size(13.0).italics().color(Color32::GRAY));
        ui.add_space(6.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heat_color_scale() {
        assert_eq!(ChartPlotter::heat_color(0.0), Color32::WHITE);
        assert_eq!(ChartPlotter::heat_color(1.0), POSITIVE_COLOR);
        assert_eq!(ChartPlotter::heat_color(-1.0), NEGATIVE_COLOR);
        assert_eq!(ChartPlotter::heat_color(f64::NAN), Color32::from_gray(160));
    }
}
