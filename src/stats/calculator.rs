//! Statistics Calculator Module
//! Pairwise correlation across numeric columns and box plot summaries.

use crate::data::{DataProcessor, ProcessorError};
use polars::prelude::*;
use rayon::prelude::*;
use statrs::statistics::Statistics;

/// Square correlation matrix over named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` x `columns.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied()
    }
}

#[cfg(test)]
impl CorrelationMatrix {
    /// Lookup by column names.
    pub fn get_by_name(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        self.get(i, j)
    }
}

/// Five-number summary for one box of a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub whisker_low: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub whisker_high: f64,
    pub mean: f64,
    pub count: usize,
    /// Values beyond the whiskers, ascending
    pub outliers: Vec<f64>,
}

/// Handles statistical calculations with multi-threading support.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Pearson correlation over the indices where both values are present.
    ///
    /// Returns NaN with fewer than two complete pairs or when either side has
    /// zero variance.
    pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> f64 {
        let (a, b): (Vec<f64>, Vec<f64>) = xs
            .iter()
            .zip(ys)
            .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
            .unzip();

        if a.len() < 2 {
            return f64::NAN;
        }

        let sa = a.iter().std_dev();
        let sb = b.iter().std_dev();
        if sa == 0.0 || sb == 0.0 || sa.is_nan() || sb.is_nan() {
            return f64::NAN;
        }

        let r = a.iter().covariance(b.iter()) / (sa * sb);
        r.clamp(-1.0, 1.0)
    }

    /// Correlation matrix over every numeric column of `rows`.
    ///
    /// Empty when `rows` has no rows or no numeric columns.
    pub fn correlation_matrix(rows: &DataFrame) -> Result<CorrelationMatrix, ProcessorError> {
        let columns = DataProcessor::numeric_columns(rows);
        if rows.height() == 0 || columns.is_empty() {
            return Ok(CorrelationMatrix::default());
        }

        let data: Vec<Vec<Option<f64>>> = columns
            .iter()
            .map(|c| DataProcessor::column_values(rows, c))
            .collect::<Result<_, _>>()?;

        let n = columns.len();
        let pairs: Vec<(usize, usize)> = (0..n).flat_map(|i| (i..n).map(move |j| (i, j))).collect();

        // Upper triangle in parallel, mirrored below
        let upper: Vec<(usize, usize, f64)> = pairs
            .par_iter()
            .map(|&(i, j)| (i, j, Self::pearson(&data[i], &data[j])))
            .collect();

        let mut values = vec![vec![f64::NAN; n]; n];
        for (i, j, r) in upper {
            values[i][j] = r;
            values[j][i] = r;
        }

        Ok(CorrelationMatrix { columns, values })
    }

    /// Box plot summary: linear-interpolated quartiles, whiskers at the most
    /// extreme values within 1.5 IQR of the box, everything past them kept as
    /// outliers.
    pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let q1 = Self::percentile(&sorted, 25.0);
        let median = Self::percentile(&sorted, 50.0);
        let q3 = Self::percentile(&sorted, 75.0);
        let iqr = q3 - q1;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|&v| v >= q1 - 1.5 * iqr)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= q3 + 1.5 * iqr)
            .unwrap_or(q3);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < whisker_low || v > whisker_high)
            .collect();

        Some(BoxSummary {
            whisker_low,
            q1,
            median,
            q3,
            whisker_high,
            mean: values.iter().sum::<f64>() / values.len() as f64,
            count: values.len(),
            outliers,
        })
    }

    /// Calculate percentile using linear interpolation (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return f64::NAN;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn rows() -> DataFrame {
        df!(
            "country" => ["Turkey"; 5],
            "year" => [2000i32, 2001, 2002, 2003, 2004],
            "coal" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
            "gas" => [Some(10.0), Some(8.0), Some(6.0), Some(4.0), Some(2.0)],
            "oil" => [Some(1.0), None, Some(2.0), Some(5.0), Some(3.0)],
            "flat" => [7.0, 7.0, 7.0, 7.0, 7.0]
        )
        .unwrap()
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let m = StatsCalculator::correlation_matrix(&rows()).unwrap();
        assert_eq!(m.columns, vec!["coal", "gas", "oil", "flat"]);

        for i in 0..m.len() {
            for j in 0..m.len() {
                let (a, b) = (m.get(i, j).unwrap(), m.get(j, i).unwrap());
                assert!(a == b || (a.is_nan() && b.is_nan()));
            }
        }
        for name in ["coal", "gas", "oil"] {
            assert!((m.get_by_name(name, name).unwrap() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn perfect_negative_correlation() {
        let m = StatsCalculator::correlation_matrix(&rows()).unwrap();
        assert!((m.get_by_name("coal", "gas").unwrap() + 1.0).abs() < EPS);
    }

    #[test]
    fn pairwise_complete_observations() {
        // coal over the rows where oil is present: (1,1) (3,2) (4,5) (5,3)
        let coal = [Some(1.0), Some(3.0), Some(4.0), Some(5.0)];
        let oil = [Some(1.0), Some(2.0), Some(5.0), Some(3.0)];
        let expected = StatsCalculator::pearson(&coal, &oil);

        let m = StatsCalculator::correlation_matrix(&rows()).unwrap();
        assert!((m.get_by_name("coal", "oil").unwrap() - expected).abs() < EPS);
        assert!(expected > 0.0 && expected < 1.0);
    }

    #[test]
    fn zero_variance_is_nan() {
        let m = StatsCalculator::correlation_matrix(&rows()).unwrap();
        assert!(m.get_by_name("flat", "flat").unwrap().is_nan());
        assert!(m.get_by_name("flat", "coal").unwrap().is_nan());
    }

    #[test]
    fn empty_inputs_give_empty_matrix() {
        let empty = rows().head(Some(0));
        assert!(StatsCalculator::correlation_matrix(&empty).unwrap().is_empty());

        let text_only = df!("country" => ["Turkey"], "year" => [2000i32]).unwrap();
        assert!(StatsCalculator::correlation_matrix(&text_only).unwrap().is_empty());
    }

    #[test]
    fn box_summary_quartiles() {
        let summary = StatsCalculator::box_summary(&[4.0, 1.0, 3.0, 2.0, 100.0]).unwrap();
        assert_eq!(summary.q1, 2.0);
        assert_eq!(summary.median, 3.0);
        assert_eq!(summary.q3, 4.0);
        assert_eq!(summary.whisker_low, 1.0);
        // 100 is an outlier beyond q3 + 1.5 * iqr
        assert_eq!(summary.whisker_high, 4.0);
        assert_eq!(summary.outliers, vec![100.0]);
        assert_eq!(summary.count, 5);
        assert!(StatsCalculator::box_summary(&[]).is_none());
    }

    #[test]
    fn single_value_box() {
        let summary = StatsCalculator::box_summary(&[42.0]).unwrap();
        assert_eq!(summary.q1, 42.0);
        assert_eq!(summary.whisker_high, 42.0);
        assert_eq!(summary.mean, 42.0);
        assert!(summary.outliers.is_empty());
    }

    #[test]
    fn outliers_on_both_sides() {
        let summary =
            StatsCalculator::box_summary(&[-50.0, 10.0, 11.0, 12.0, 13.0, 14.0, 90.0]).unwrap();
        assert_eq!(summary.whisker_low, 10.0);
        assert_eq!(summary.whisker_high, 14.0);
        assert_eq!(summary.outliers, vec![-50.0, 90.0]);
    }

    #[test]
    fn single_complete_pair_is_nan() {
        let xs = [Some(1.0), None, Some(3.0)];
        let ys = [Some(2.0), Some(4.0), None];
        assert!(StatsCalculator::pearson(&xs, &ys).is_nan());
        assert!(StatsCalculator::pearson(&[], &[]).is_nan());
    }

    #[test]
    fn nan_cells_are_missing() {
        let df = df!(
            "country" => ["Turkey"; 4],
            "year" => [2000i32, 2001, 2002, 2003],
            "coal" => [1.0, 2.0, f64::NAN, 4.0],
            "gas" => [2.0, 4.0, 100.0, 7.0]
        )
        .unwrap();

        let coal = DataProcessor::column_values(&df, "coal").unwrap();
        assert_eq!(coal, vec![Some(1.0), Some(2.0), None, Some(4.0)]);

        let expected = StatsCalculator::pearson(
            &[Some(1.0), Some(2.0), Some(4.0)],
            &[Some(2.0), Some(4.0), Some(7.0)],
        );
        let m = StatsCalculator::correlation_matrix(&df).unwrap();
        let r = m.get_by_name("coal", "gas").unwrap();
        assert!(!r.is_nan());
        assert!((r - expected).abs() < EPS);
    }
}
