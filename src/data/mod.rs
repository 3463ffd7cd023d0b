//! Data module - dataset loading and filtering

mod loader;
mod processor;

pub use loader::{DatasetCache, EnergyDataset, YEAR_COLUMN};
pub use processor::{year_to_date, DataProcessor, ProcessorError, YearRange};
