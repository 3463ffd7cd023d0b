//! Data Processor Module
//! Country/year filtering and per-year aggregation over the energy table.

use crate::data::loader::{COUNTRY_COLUMN, YEAR_COLUMN};
use chrono::NaiveDate;
use polars::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Column '{0}' not found")]
    MissingColumn(String),
}

/// Inclusive year range selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub start: i32,
    pub end: i32,
}

impl YearRange {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Clamp both ends into `bounds` and keep `start <= end`.
    pub fn normalized(self, bounds: (i32, i32)) -> Self {
        let (min, max) = bounds;
        let start = self.start.clamp(min, max);
        let end = self.end.clamp(min, max);
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }
}

/// The calendar date a dataset year stands for (January 1st).
pub fn year_to_date(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 1, 1)
}

/// Handles filtering and aggregation of the energy table.
pub struct DataProcessor;

impl DataProcessor {
    /// Rows of `country` whose year lies in `[start_year, end_year]`.
    pub fn filter(
        df: &DataFrame,
        country: &str,
        start_year: i32,
        end_year: i32,
    ) -> Result<DataFrame, ProcessorError> {
        let filtered = df
            .clone()
            .lazy()
            .filter(
                col(COUNTRY_COLUMN)
                    .eq(lit(country))
                    .and(col(YEAR_COLUMN).gt_eq(lit(start_year)))
                    .and(col(YEAR_COLUMN).lt_eq(lit(end_year))),
            )
            .collect()?;
        Ok(filtered)
    }

    /// Filter with a [`YearRange`].
    pub fn filter_range(
        df: &DataFrame,
        country: &str,
        range: YearRange,
    ) -> Result<DataFrame, ProcessorError> {
        Self::filter(df, country, range.start, range.end)
    }

    /// Smallest and largest year present for `country`.
    pub fn year_bounds(df: &DataFrame, country: &str) -> Result<Option<(i32, i32)>, ProcessorError> {
        let country_df = df
            .clone()
            .lazy()
            .filter(col(COUNTRY_COLUMN).eq(lit(country)))
            .select([col(YEAR_COLUMN)])
            .collect()?;

        let bounds = Self::years(&country_df)?
            .into_iter()
            .flatten()
            .fold(None, |acc: Option<(i32, i32)>, y| match acc {
                None => Some((y, y)),
                Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
            });
        Ok(bounds)
    }

    /// Mean of `metric` per year, skipping missing values.
    ///
    /// Every year present in `rows` gets an entry; a year where the metric is
    /// missing on every row maps to NaN.
    pub fn yearly_mean(
        rows: &DataFrame,
        metric: &str,
    ) -> Result<BTreeMap<i32, f64>, ProcessorError> {
        if rows.height() == 0 {
            return Ok(BTreeMap::new());
        }

        let years = Self::years(rows)?;
        let values = Self::column_values(rows, metric)?;

        let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
        for (year, value) in years.into_iter().zip(values) {
            let Some(year) = year else {
                continue;
            };
            let entry = sums.entry(year).or_insert((0.0, 0));
            if let Some(v) = value {
                entry.0 += v;
                entry.1 += 1;
            }
        }

        Ok(sums
            .into_iter()
            .map(|(year, (sum, count))| {
                let mean = if count == 0 { f64::NAN } else { sum / count as f64 };
                (year, mean)
            })
            .collect())
    }

    /// `(year, value)` pairs in row order, skipping rows with a missing value.
    pub fn year_series(rows: &DataFrame, metric: &str) -> Result<Vec<(i32, f64)>, ProcessorError> {
        if rows.height() == 0 {
            return Ok(Vec::new());
        }

        let years = Self::years(rows)?;
        let values = Self::column_values(rows, metric)?;
        Ok(years
            .into_iter()
            .zip(values)
            .filter_map(|(y, v)| Some((y?, v?)))
            .collect())
    }

    /// Runs of consecutive rows with a present value, in row order.
    ///
    /// A missing value ends the current run, so a line drawn per run leaves a
    /// gap where data is absent.
    pub fn year_segments(
        rows: &DataFrame,
        metric: &str,
    ) -> Result<Vec<Vec<(i32, f64)>>, ProcessorError> {
        if rows.height() == 0 {
            return Ok(Vec::new());
        }

        let years = Self::years(rows)?;
        let values = Self::column_values(rows, metric)?;

        let mut segments: Vec<Vec<(i32, f64)>> = Vec::new();
        let mut current: Vec<(i32, f64)> = Vec::new();
        for (year, value) in years.into_iter().zip(values) {
            match (year, value) {
                (Some(y), Some(v)) => current.push((y, v)),
                _ => {
                    if !current.is_empty() {
                        segments.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        Ok(segments)
    }

    /// Non-missing values of `metric` grouped by year.
    pub fn values_by_year(
        rows: &DataFrame,
        metric: &str,
    ) -> Result<BTreeMap<i32, Vec<f64>>, ProcessorError> {
        let mut grouped: BTreeMap<i32, Vec<f64>> = BTreeMap::new();
        for (year, value) in Self::year_series(rows, metric)? {
            grouped.entry(year).or_default().push(value);
        }
        Ok(grouped)
    }

    /// Names of the numeric columns, excluding `year`.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .filter(|col| col.name().as_str() != YEAR_COLUMN)
            .filter(|col| {
                matches!(
                    col.dtype(),
                    DataType::Float32
                        | DataType::Float64
                        | DataType::Int8
                        | DataType::Int16
                        | DataType::Int32
                        | DataType::Int64
                        | DataType::UInt8
                        | DataType::UInt16
                        | DataType::UInt32
                        | DataType::UInt64
                )
            })
            .map(|col| col.name().to_string())
            .collect()
    }

    /// A column as `f64` values. NaN is reported as missing.
    pub fn column_values(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>, ProcessorError> {
        let series = df
            .column(column)
            .map_err(|_| ProcessorError::MissingColumn(column.to_string()))?;
        let as_f64 = series.cast(&DataType::Float64)?;
        Ok(as_f64
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| !x.is_nan()))
            .collect())
    }

    fn years(df: &DataFrame) -> Result<Vec<Option<i32>>, ProcessorError> {
        let series = df
            .column(YEAR_COLUMN)
            .map_err(|_| ProcessorError::MissingColumn(YEAR_COLUMN.to_string()))?;
        let as_i32 = series.cast(&DataType::Int32)?;
        Ok(as_i32.i32()?.into_iter().collect())
    }
}
