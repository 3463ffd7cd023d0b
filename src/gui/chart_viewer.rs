//! Chart Viewer Widget
//! Central scrollable panel: title, clock, filtered data table and one card
//! per chart.

use crate::charts::{ChartPanel, ChartPlotter, DashboardView, DataTable};
use egui::{Color32, RichText, ScrollArea};

const CARD_SPACING: f32 = 15.0;
const TABLE_HEIGHT: f32 = 260.0;

/// Scrollable dashboard display area.
pub struct ChartViewer {
    pub title: String,
    pub view: Option<DashboardView>,
}

impl ChartViewer {
    pub fn new(title: String) -> Self {
        Self { title, view: None }
    }

    pub fn clear(&mut self) {
        self.view = None;
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = Some(view);
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(RichText::new(&self.title).size(26.0).strong());
                ui.label(
                    RichText::new(format!(
                        "Current Date and Time: {}",
                        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
                    ))
                    .size(15.0),
                );
                ui.add_space(CARD_SPACING);

                let Some(view) = &self.view else {
                    ui.centered_and_justified(|ui| {
                        ui.label(RichText::new("No Data").size(20.0));
                    });
                    return;
                };

                Self::draw_card(ui, "Filtered Data", |ui| {
                    Self::draw_table(ui, &view.table);
                });
                ui.add_space(CARD_SPACING);

                for panel in &view.panels {
                    Self::draw_chart_card(ui, panel);
                    ui.add_space(CARD_SPACING);
                }
            });
    }

    fn draw_chart_card(ui: &mut egui::Ui, panel: &ChartPanel) {
        Self::draw_card(ui, &panel.title, |ui| ChartPlotter::draw_panel(ui, panel));
    }

    fn draw_card(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui)) {
        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, Color32::from_gray(90)))
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(title).size(18.0).strong());
                ui.add_space(8.0);
                add_contents(ui);
            });
    }

    /// Raw rows of the filtered view.
    fn draw_table(ui: &mut egui::Ui, table: &DataTable) {
        if table.is_empty() {
            ChartPlotter::draw_placeholder(ui, "No rows match the selected range.");
            return;
        }

        ScrollArea::both()
            .id_salt("filtered_table")
            .max_height(TABLE_HEIGHT)
            .show(ui, |ui| {
                egui::Grid::new("filtered_table_grid")
                    .striped(true)
                    .min_col_width(60.0)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        for header in &table.headers {
                            ui.label(RichText::new(header).strong().size(11.0));
                        }
                        ui.end_row();

                        for row in &table.rows {
                            for cell in row {
                                ui.label(RichText::new(cell).size(11.0));
                            }
                            ui.end_row();
                        }
                    });
            });
    }
}
