//! Descriptive statistics of a signal, skipping undefined samples.

use crate::signal::Signal;
use std::fmt;

/// Statistical summary of the defined values of a series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    /// Number of samples, defined or not
    pub count: usize,
    /// Number of non-NaN samples
    pub valid: usize,
    /// Mean of the defined samples
    pub mean: f64,
    /// Population standard deviation of the defined samples
    pub std_dev: f64,
    /// Minimum defined value
    pub min: f64,
    /// Maximum defined value
    pub max: f64,
    /// Range (max - min)
    pub range: f64,
}

impl Statistics {
    /// Summarise a series; `None` when it holds no defined value
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // Sample counts are small
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let defined: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        if defined.is_empty() {
            return None;
        }

        let n = defined.len() as f64;
        let mean = defined.iter().sum::<f64>() / n;
        let variance = defined.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let min = defined.iter().copied().fold(f64::INFINITY, f64::min);
        let max = defined.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Some(Self {
            count: values.len(),
            valid: defined.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
            range: max - min,
        })
    }

    /// Summaries of a signal: one for time series, one per axis for trajectories
    #[must_use]
    pub fn of_signal(signal: &Signal) -> Vec<(&'static str, Option<Self>)> {
        match signal {
            Signal::TimeSeries(series) => vec![(series.kind.label(), Self::from_values(&series.values))],
            Signal::Trajectory(trajectory) => {
                let xs: Vec<f64> = trajectory.points.iter().map(|p| p.0).collect();
                let ys: Vec<f64> = trajectory.points.iter().map(|p| p.1).collect();
                vec![("x", Self::from_values(&xs)), ("y", Self::from_values(&ys))]
            }
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={} (defined {}), mean={:.3}, sd={:.3}, min={:.3}, max={:.3}",
            self.count, self.valid, self.mean, self.std_dev, self.min, self.max
        )
    }
}
