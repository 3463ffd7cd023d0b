//! Control Panel Widget
//! Left side panel with the year range filter and load status.

use crate::data::YearRange;
use egui::{Color32, RichText};

/// Left side control panel with the filter options.
pub struct ControlPanel {
    pub country: String,
    /// Available years for the country, known once the dataset is loaded
    pub bounds: Option<(i32, i32)>,
    pub range: YearRange,
    pub row_count: usize,
    pub status: String,
    pub is_error: bool,
}

impl ControlPanel {
    pub fn new(country: &str) -> Self {
        Self {
            country: country.to_string(),
            bounds: None,
            range: YearRange::new(0, 0),
            row_count: 0,
            status: "Ready".to_string(),
            is_error: false,
        }
    }

    /// Set the slider limits and select the full range.
    pub fn set_bounds(&mut self, bounds: (i32, i32)) {
        self.bounds = Some(bounds);
        self.range = YearRange::new(bounds.0, bounds.1);
    }

    /// Draw the control panel
    pub fn show(&mut self, ui: &mut egui::Ui, is_loading: bool) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("⚡ Energy Dashboard")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(RichText::new(&self.country).size(11.0).color(Color32::GRAY));
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Filter Section =====
        ui.label(RichText::new("Filter Options").size(14.0).strong());
        ui.add_space(5.0);

        match self.bounds {
            Some(bounds) => {
                let before = self.range;
                let (min, max) = bounds;

                ui.label("Select year range");
                ui.add(egui::Slider::new(&mut self.range.start, min..=max).text("From"));
                ui.add(egui::Slider::new(&mut self.range.end, min..=max).text("To"));

                // Dragging one end past the other drags both
                if self.range.start > self.range.end {
                    if self.range.start != before.start {
                        self.range.end = self.range.start;
                    } else {
                        self.range.start = self.range.end;
                    }
                }
                self.range = self.range.normalized(bounds);

                ui.add_space(5.0);
                if ui.small_button("Full range").clicked() {
                    self.range = YearRange::new(min, max);
                }

                if self.range != before {
                    action = ControlPanelAction::RangeChanged;
                }

                ui.add_space(5.0);
                ui.label(
                    RichText::new(format!("{} rows selected", self.row_count))
                        .size(11.0)
                        .color(Color32::GRAY),
                );
            }
            None => {
                ui.label(RichText::new("Waiting for data...").color(Color32::GRAY));
            }
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status Section =====
        ui.label(RichText::new("Status").size(14.0).strong());
        ui.add_space(5.0);

        if is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new(&self.status).size(11.0));
            });
        } else {
            let status_color = if self.is_error {
                Color32::from_rgb(220, 53, 69)
            } else {
                Color32::GRAY
            };
            ui.label(RichText::new(&self.status).size(11.0).color(status_color));
        }

        if self.is_error && !is_loading {
            ui.add_space(8.0);
            if ui.button("Retry").clicked() {
                action = ControlPanelAction::Reload;
            }
        }

        action
    }

    /// Set status text
    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
        self.is_error = false;
    }

    pub fn set_error(&mut self, status: &str) {
        self.status = status.to_string();
        self.is_error = true;
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    RangeChanged,
    Reload,
}
