//! Energy Dataset Loader Module
//! Downloads the energy CSV, parses it with Polars and keeps the result in a
//! load-once cache shared by the whole application.

use crate::config::DashboardConfig;
use once_cell::sync::OnceCell;
use polars::prelude::*;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const COUNTRY_COLUMN: &str = "country";
pub const YEAR_COLUMN: &str = "year";

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to download dataset: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Failed to parse CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Dataset is missing required column '{0}'")]
    MissingColumn(String),
}

/// The full energy table, immutable once loaded.
#[derive(Debug, Clone)]
pub struct EnergyDataset {
    df: DataFrame,
}

impl EnergyDataset {
    /// Wrap an already-parsed DataFrame, checking the required columns and
    /// normalizing `year` to `Int32`.
    pub fn from_dataframe(df: DataFrame, required: &[&str]) -> Result<Self, LoaderError> {
        let names = df.get_column_names();
        for column in [COUNTRY_COLUMN, YEAR_COLUMN].iter().chain(required) {
            if !names.iter().any(|n| n.as_str() == *column) {
                return Err(LoaderError::MissingColumn(column.to_string()));
            }
        }

        let df = df
            .lazy()
            .with_column(col(YEAR_COLUMN).cast(DataType::Int32))
            .collect()?;

        Ok(Self { df })
    }

    /// Get a reference to the underlying DataFrame.
    pub fn dataframe(&self) -> &DataFrame {
        &self.df
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    pub fn column_count(&self) -> usize {
        self.df.width()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df
            .get_column_names()
            .iter()
            .any(|n| n.as_str() == name)
    }
}

/// Download the raw CSV bytes.
pub fn fetch_csv(url: &str, timeout: Duration) -> Result<Vec<u8>, LoaderError> {
    log::info!("Downloading dataset from {}", url);

    let client = reqwest::blocking::Client::builder()
        .timeout(timeout)
        .build()?;
    let bytes = client.get(url).send()?.error_for_status()?.bytes()?;

    log::info!("Downloaded {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

/// Parse CSV bytes into an [`EnergyDataset`].
///
/// Column types are inferred from the whole file: the table is sorted by
/// country, so a metric can stay empty for thousands of leading rows.
pub fn parse_csv(bytes: Vec<u8>, required: &[&str]) -> Result<EnergyDataset, LoaderError> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .with_ignore_errors(true)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()?;

    log::debug!("Parsed {} rows, {} columns", df.height(), df.width());
    EnergyDataset::from_dataframe(df, required)
}

/// Fetch and parse the dataset described by `config`.
pub fn load_dataset(config: &DashboardConfig) -> Result<EnergyDataset, LoaderError> {
    let bytes = fetch_csv(
        &config.dataset_url,
        Duration::from_secs(config.request_timeout_secs),
    )?;
    parse_csv(bytes, &[config.primary_metric.as_str()])
}

/// Load-once holder for the dataset.
///
/// The first successful load is kept for the lifetime of the cache and every
/// later call hands out the same `Arc`. A failed load stores nothing, so the
/// next call tries again.
#[derive(Default)]
pub struct DatasetCache {
    cell: OnceCell<Arc<EnergyDataset>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<Arc<EnergyDataset>> {
        self.cell.get().cloned()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Return the cached dataset, running `load` only if nothing is cached yet.
    pub fn get_or_load_with<F>(&self, load: F) -> Result<Arc<EnergyDataset>, LoaderError>
    where
        F: FnOnce() -> Result<EnergyDataset, LoaderError>,
    {
        self.cell
            .get_or_try_init(|| load().map(Arc::new))
            .cloned()
    }

    /// Return the cached dataset, downloading it on first use.
    pub fn get_or_load(&self, config: &DashboardConfig) -> Result<Arc<EnergyDataset>, LoaderError> {
        self.get_or_load_with(|| load_dataset(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::StatsCalculator;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SAMPLE: &str = "\
country,year,iso_code,primary_energy_consumption,renewables_consumption
Turkey,2019,TUR,1700.5,300.0
Turkey,2020,TUR,1650.0,
Greece,2020,GRC,300.25,80.0
";

    #[test]
    fn parses_sample_and_normalizes_year() {
        let dataset = parse_csv(SAMPLE.as_bytes().to_vec(), &["primary_energy_consumption"])
            .unwrap();

        assert_eq!(dataset.row_count(), 3);
        assert_eq!(dataset.column_count(), 5);
        assert!(dataset.has_column("renewables_consumption"));

        let year = dataset.dataframe().column(YEAR_COLUMN).unwrap();
        assert_eq!(year.dtype(), &DataType::Int32);
        assert_eq!(year.i32().unwrap().get(0), Some(2019));

        let renewables = dataset
            .dataframe()
            .column("renewables_consumption")
            .unwrap()
            .f64()
            .unwrap()
            .get(1);
        assert_eq!(renewables, None);
    }

    #[test]
    fn late_first_value_still_infers_numeric() {
        let mut csv = String::from("country,year,primary_energy_consumption,late_metric\n");
        for i in 0..10_005 {
            let late = if i >= 10_002 { format!("{}.5", i) } else { String::new() };
            csv.push_str(&format!("Turkey,{},{}.0,{}\n", 1900 + i % 100, i, late));
        }

        let dataset = parse_csv(csv.into_bytes(), &[]).unwrap();
        let late = dataset.dataframe().column("late_metric").unwrap();
        assert_eq!(late.dtype(), &DataType::Float64);

        let matrix = StatsCalculator::correlation_matrix(dataset.dataframe()).unwrap();
        assert_eq!(matrix.columns, vec!["primary_energy_consumption", "late_metric"]);
    }

    #[test]
    fn missing_required_column_is_rejected() {
        let err = parse_csv(SAMPLE.as_bytes().to_vec(), &["coal_consumption"]).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(ref c) if c == "coal_consumption"));

        let no_year = "country,primary_energy_consumption\nTurkey,1.0\n";
        let err = parse_csv(no_year.as_bytes().to_vec(), &[]).unwrap_err();
        assert!(matches!(err, LoaderError::MissingColumn(ref c) if c == YEAR_COLUMN));
    }

    #[test]
    fn cache_loads_once() {
        let cache = DatasetCache::new();
        let calls = AtomicUsize::new(0);
        let load = || {
            calls.fetch_add(1, Ordering::SeqCst);
            parse_csv(SAMPLE.as_bytes().to_vec(), &[])
        };

        let first = cache.get_or_load_with(load).unwrap();
        let second = cache.get_or_load_with(load).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(cache.is_loaded());
    }

    #[test]
    fn failed_load_is_retried() {
        let cache = DatasetCache::new();
        let err = cache.get_or_load_with(|| Err(LoaderError::MissingColumn("year".into())));
        assert!(err.is_err());
        assert!(cache.get().is_none());

        let ok = cache.get_or_load_with(|| parse_csv(SAMPLE.as_bytes().to_vec(), &[]));
        assert!(ok.is_ok());
        assert!(cache.is_loaded());
    }
}
