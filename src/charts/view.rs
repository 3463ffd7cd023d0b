//! Dashboard View Builder
//! Turns the dataset and the selected year range into the table and chart
//! panels shown by the GUI. Pure: nothing here touches egui.

use crate::config::DashboardConfig;
use crate::data::{year_to_date, DataProcessor, EnergyDataset, ProcessorError, YearRange, YEAR_COLUMN};
use crate::stats::{BoxSummary, CorrelationMatrix, StatsCalculator};
use polars::prelude::*;
use std::collections::BTreeMap;

pub const NO_DATA_MESSAGE: &str = "No data available for the selected range.";
pub const NO_NUMERIC_MESSAGE: &str = "No numeric data available for correlation heatmap.";
pub const NO_RENEWABLES_MESSAGE: &str = "Renewable energy consumption data not available.";

/// What a chart card displays.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelContent {
    /// `(year, value)` runs in row order, split where values are missing
    Line(Vec<Vec<(i32, f64)>>),
    /// Per-year mean
    Bar(BTreeMap<i32, f64>),
    /// One box per year
    Box(Vec<(i32, BoxSummary)>),
    Heatmap(CorrelationMatrix),
    /// Static message shown instead of a chart
    Placeholder(&'static str),
}

/// One chart card.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPanel {
    pub id: &'static str,
    pub title: String,
    pub y_label: String,
    pub content: PanelContent,
}

impl ChartPanel {
    fn new(id: &'static str, title: &str, y_label: &str, content: PanelContent) -> Self {
        Self {
            id,
            title: title.to_string(),
            y_label: y_label.to_string(),
            content,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.content, PanelContent::Placeholder(_))
    }
}

/// Stringified filtered rows for the raw data table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DataTable {
    pub fn from_dataframe(df: &DataFrame) -> Self {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut rows = vec![Vec::with_capacity(headers.len()); df.height()];
        for column in df.get_columns() {
            let is_year = column.name().as_str() == YEAR_COLUMN;
            for (i, row) in rows.iter_mut().enumerate() {
                row.push(Self::format_cell(column, i, is_year));
            }
        }

        Self { headers, rows }
    }

    fn format_cell(column: &Column, index: usize, is_year: bool) -> String {
        let Ok(value) = column.get(index) else {
            return String::new();
        };
        if value.is_null() {
            return String::new();
        }
        if is_year {
            if let Some(date) = value.extract::<i32>().and_then(year_to_date) {
                return date.format("%Y-%m-%d").to_string();
            }
        }
        value.to_string().trim_matches('"').to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the dashboard shows for one filter setting.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub range: YearRange,
    pub filtered: DataFrame,
    pub table: DataTable,
    pub panels: Vec<ChartPanel>,
}

impl DashboardView {
    pub fn row_count(&self) -> usize {
        self.filtered.height()
    }

    pub fn panel(&self, id: &str) -> Option<&ChartPanel> {
        self.panels.iter().find(|p| p.id == id)
    }
}

/// Recompute the whole dashboard for `range`.
pub fn build_view(
    dataset: &EnergyDataset,
    config: &DashboardConfig,
    range: YearRange,
) -> Result<DashboardView, ProcessorError> {
    let filtered = DataProcessor::filter_range(dataset.dataframe(), &config.country, range)?;
    let table = DataTable::from_dataframe(&filtered);
    let has_rows = filtered.height() > 0;
    let metric = config.primary_metric.as_str();

    let mut panels = Vec::with_capacity(5);

    panels.push(ChartPanel::new(
        "primary_line",
        "Primary Energy Consumption Over Time",
        metric,
        if has_rows {
            PanelContent::Line(DataProcessor::year_segments(&filtered, metric)?)
        } else {
            PanelContent::Placeholder(NO_DATA_MESSAGE)
        },
    ));

    let yearly = DataProcessor::yearly_mean(&filtered, metric)?;
    panels.push(ChartPanel::new(
        "primary_yearly_mean",
        "Average Primary Energy Consumption per Year",
        metric,
        if yearly.is_empty() {
            PanelContent::Placeholder(NO_DATA_MESSAGE)
        } else {
            PanelContent::Bar(yearly)
        },
    ));

    panels.push(ChartPanel::new(
        "primary_box",
        "Primary Energy Consumption by Year",
        metric,
        if has_rows {
            let boxes = DataProcessor::values_by_year(&filtered, metric)?
                .into_iter()
                .filter_map(|(year, values)| {
                    StatsCalculator::box_summary(&values).map(|s| (year, s))
                })
                .collect();
            PanelContent::Box(boxes)
        } else {
            PanelContent::Placeholder(NO_DATA_MESSAGE)
        },
    ));

    let correlation = StatsCalculator::correlation_matrix(&filtered)?;
    panels.push(ChartPanel::new(
        "correlation",
        "Energy Consumption Correlation",
        "",
        if correlation.is_empty() {
            PanelContent::Placeholder(NO_NUMERIC_MESSAGE)
        } else {
            PanelContent::Heatmap(correlation)
        },
    ));

    let renewables = config.renewables_metric.as_str();
    panels.push(ChartPanel::new(
        "renewables_line",
        "Renewable Energy Consumption Over Time",
        renewables,
        if !dataset.has_column(renewables) {
            PanelContent::Placeholder(NO_RENEWABLES_MESSAGE)
        } else if has_rows {
            PanelContent::Line(DataProcessor::year_segments(&filtered, renewables)?)
        } else {
            PanelContent::Placeholder(NO_DATA_MESSAGE)
        },
    ));

    log::debug!(
        "Built view for {}-{}: {} rows, {} placeholders",
        range.start,
        range.end,
        filtered.height(),
        panels.iter().filter(|p| p.is_placeholder()).count()
    );

    Ok(DashboardView {
        range,
        filtered,
        table,
        panels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset(with_renewables: bool) -> EnergyDataset {
        let mut df = df!(
            "country" => ["Turkey", "Turkey", "Turkey", "Greece"],
            "year" => [2019i32, 2020, 2021, 2020],
            "primary_energy_consumption" => [Some(100.0), Some(200.0), None, Some(5.0)],
            "coal_consumption" => [Some(10.0), Some(30.0), Some(20.0), Some(1.0)]
        )
        .unwrap();
        if with_renewables {
            df.with_column(Column::new(
                "renewables_consumption".into(),
                vec![Some(1.0), Some(2.0), Some(3.0), None],
            ))
            .unwrap();
        }
        EnergyDataset::from_dataframe(df, &["primary_energy_consumption"]).unwrap()
    }

    #[test]
    fn full_range_builds_every_chart() {
        let view = build_view(&dataset(true), &DashboardConfig::default(), YearRange::new(2019, 2021))
            .unwrap();

        assert_eq!(view.row_count(), 3);
        assert_eq!(view.panels.len(), 5);
        assert!(view.panels.iter().all(|p| !p.is_placeholder()));

        assert_eq!(
            view.panel("primary_line").unwrap().content,
            PanelContent::Line(vec![vec![(2019, 100.0), (2020, 200.0)]])
        );

        let PanelContent::Bar(ref means) = view.panel("primary_yearly_mean").unwrap().content else {
            panic!("expected bar chart");
        };
        assert_eq!(means.keys().copied().collect::<Vec<_>>(), vec![2019, 2020, 2021]);
        assert!(means[&2021].is_nan());

        let PanelContent::Box(ref boxes) = view.panel("primary_box").unwrap().content else {
            panic!("expected box plot");
        };
        assert_eq!(boxes.len(), 2);
        assert_eq!(boxes[0].1.median, 100.0);
    }

    #[test]
    fn empty_range_shows_placeholders() {
        let view = build_view(&dataset(true), &DashboardConfig::default(), YearRange::new(1990, 1995))
            .unwrap();

        assert_eq!(view.row_count(), 0);
        assert!(view.table.is_empty());
        for panel in &view.panels {
            assert!(panel.is_placeholder(), "{} should be a placeholder", panel.id);
        }
        assert_eq!(
            view.panel("correlation").unwrap().content,
            PanelContent::Placeholder(NO_NUMERIC_MESSAGE)
        );
    }

    #[test]
    fn renewables_missing_from_dataset() {
        let view = build_view(&dataset(false), &DashboardConfig::default(), YearRange::new(2019, 2021))
            .unwrap();
        assert_eq!(
            view.panel("renewables_line").unwrap().content,
            PanelContent::Placeholder(NO_RENEWABLES_MESSAGE)
        );
    }

    #[test]
    fn table_renders_year_as_date_and_nulls_blank() {
        let view = build_view(&dataset(true), &DashboardConfig::default(), YearRange::new(2021, 2021))
            .unwrap();

        assert_eq!(view.table.headers[1], "year");
        assert_eq!(view.table.rows.len(), 1);
        assert_eq!(view.table.rows[0][0], "Turkey");
        assert_eq!(view.table.rows[0][1], "2021-01-01");
        assert_eq!(view.table.rows[0][2], "");
    }
}
