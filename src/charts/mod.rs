//! Charts module - Dashboard view building and chart drawing

mod plotter;
mod view;

pub use plotter::ChartPlotter;
pub use view::{build_view, ChartPanel, DashboardView, DataTable, PanelContent};
