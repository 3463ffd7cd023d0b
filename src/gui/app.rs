//! Energy Dashboard Main Application
//! Main window with control panel and chart viewer.

use crate::charts::build_view;
use crate::config::DashboardConfig;
use crate::data::{DataProcessor, DatasetCache, EnergyDataset};
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Dataset loading result from background thread
enum LoadResult {
    Complete(Arc<EnergyDataset>),
    Error(String),
}

/// Main application window.
pub struct EnergyDashboardApp {
    config: DashboardConfig,
    cache: Arc<DatasetCache>,
    dataset: Option<Arc<EnergyDataset>>,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async dataset loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl EnergyDashboardApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut app = Self {
            control_panel: ControlPanel::new(&config.country),
            chart_viewer: ChartViewer::new(config.title()),
            config,
            cache: Arc::new(DatasetCache::new()),
            dataset: None,
            load_rx: None,
            is_loading: false,
        };
        app.start_loading();
        app
    }

    /// Load the dataset in a background thread; the cache makes repeated
    /// requests after a success free.
    fn start_loading(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(dataset) = self.cache.get() {
            log::debug!("Dataset already cached, skipping download");
            self.handle_loaded(dataset);
            return;
        }

        self.is_loading = true;
        self.chart_viewer.clear();
        self.control_panel.set_status("Downloading dataset...");

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        let cache = Arc::clone(&self.cache);
        let config = self.config.clone();

        thread::spawn(move || {
            let result = match cache.get_or_load(&config) {
                Ok(dataset) => LoadResult::Complete(dataset),
                Err(e) => {
                    log::error!("Failed to load dataset: {}", e);
                    LoadResult::Error(e.to_string())
                }
            };
            let _ = tx.send(result);
        });
    }

    /// Check for dataset loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            if let Some(result) = poll_load(&rx) {
                match result {
                    LoadResult::Complete(dataset) => {
                        self.handle_loaded(dataset);
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                    LoadResult::Error(error) => {
                        self.control_panel.set_error(&format!("Error: {}", error));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    fn handle_loaded(&mut self, dataset: Arc<EnergyDataset>) {
        log::info!(
            "Dataset ready: {} rows, {} columns",
            dataset.row_count(),
            dataset.column_count()
        );

        match DataProcessor::year_bounds(dataset.dataframe(), &self.config.country) {
            Ok(Some(bounds)) => {
                self.control_panel.set_bounds(bounds);
                self.dataset = Some(dataset);
                self.recompute();
            }
            Ok(None) => {
                log::warn!("No rows for country '{}'", self.config.country);
                self.dataset = Some(dataset);
                self.control_panel
                    .set_error(&format!("No data for {}", self.config.country));
            }
            Err(e) => {
                self.control_panel.set_error(&format!("Error: {}", e));
            }
        }
    }

    /// Rebuild the table and charts for the current range.
    fn recompute(&mut self) {
        let Some(dataset) = &self.dataset else {
            return;
        };
        let range = self.control_panel.range;

        match build_view(dataset, &self.config, range) {
            Ok(view) => {
                log::debug!("Recomputed view for {}-{}", view.range.start, view.range.end);
                self.control_panel.row_count = view.row_count();
                self.control_panel.set_status(&format!(
                    "Loaded {} rows, {} columns",
                    dataset.row_count(),
                    dataset.column_count()
                ));
                self.chart_viewer.set_view(view);
            }
            Err(e) => {
                log::error!("Failed to build dashboard view: {}", e);
                self.control_panel.set_error(&format!("Error: {}", e));
            }
        }
    }
}

/// Next pending load result. A loader thread that exits without sending
/// (e.g. it panicked) is reported as an error instead of waiting forever.
fn poll_load(rx: &Receiver<LoadResult>) -> Option<LoadResult> {
    match rx.try_recv() {
        Ok(result) => Some(result),
        Err(TryRecvError::Empty) => None,
        Err(TryRecvError::Disconnected) => {
            log::error!("Dataset loader stopped without a result");
            Some(LoadResult::Error("Loader stopped unexpectedly".to_string()))
        }
    }
}

impl eframe::App for EnergyDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        } else {
            // Keep the clock ticking
            ctx.request_repaint_after(Duration::from_secs(1));
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                let action = self.control_panel.show(ui, self.is_loading);

                match action {
                    ControlPanelAction::RangeChanged => self.recompute(),
                    ControlPanelAction::Reload => self.start_loading(),
                    ControlPanelAction::None => {}
                }
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_load_yields_nothing() {
        let (_tx, rx) = channel::<LoadResult>();
        assert!(poll_load(&rx).is_none());
    }

    #[test]
    fn dead_loader_thread_is_an_error() {
        let (tx, rx) = channel::<LoadResult>();
        let handle = thread::spawn(move || {
            let _tx = tx;
            panic!("loader failed");
        });
        assert!(handle.join().is_err());

        match poll_load(&rx) {
            Some(LoadResult::Error(message)) => assert!(message.contains("unexpectedly")),
            _ => panic!("expected a load error"),
        }
    }

    #[test]
    fn sent_result_is_returned() {
        let (tx, rx) = channel();
        tx.send(LoadResult::Error("boom".to_string())).unwrap();
        assert!(matches!(poll_load(&rx), Some(LoadResult::Error(ref e)) if e == "boom"));
    }
}
