//! TimeSeries: core container for timestamped sensor samples

use crate::error::{MspError, MspResult};
use crate::timestamp::{micros_to_secs, secs_to_micros};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque handle naming a series held by a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SeriesId(Uuid);

impl SeriesId {
    /// Fresh random handle
    pub fn new() -> Self {
        SeriesId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SeriesId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Named, unit-tagged sequence of `(timestamp_us, value)` samples.
///
/// Timestamps and values are stored as index-aligned vectors and can only be
/// grown point by point or replaced in full, so their lengths always match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    name: String,
    unit: String,
    start_time_us: u64,
    /// Nominal sampling rate the series was generated or resampled at
    #[serde(default)]
    frequency_hz: Option<f64>,
    timestamps_us: Vec<u64>,
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create an empty series with a zero start time
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        TimeSeries {
            name: name.into(),
            unit: unit.into(),
            start_time_us: 0,
            frequency_hz: None,
            timestamps_us: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a series from parallel vectors
    pub fn from_points(
        name: impl Into<String>,
        unit: impl Into<String>,
        start_time_us: u64,
        timestamps_us: Vec<u64>,
        values: Vec<f64>,
    ) -> MspResult<Self> {
        let mut series = TimeSeries::new(name, unit);
        series.start_time_us = start_time_us;
        series.replace_points(timestamps_us, values)?;
        Ok(series)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn start_time_us(&self) -> u64 {
        self.start_time_us
    }

    /// Nominal sampling rate, if a generator or resampler produced the series
    pub fn frequency_hz(&self) -> Option<f64> {
        self.frequency_hz
    }

    pub fn set_frequency_hz(&mut self, frequency_hz: Option<f64>) {
        self.frequency_hz = frequency_hz;
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn set_unit(&mut self, unit: impl Into<String>) {
        self.unit = unit.into();
    }

    pub fn set_start_time_us(&mut self, start_time_us: u64) {
        self.start_time_us = start_time_us;
    }

    /// Append one sample
    pub fn push(&mut self, timestamp_us: u64, value: f64) {
        self.timestamps_us.push(timestamp_us);
        self.values.push(value);
    }

    pub fn timestamps(&self) -> &[u64] {
        &self.timestamps_us
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Replace the value sequence wholesale, keeping timestamps
    pub fn set_values(&mut self, values: Vec<f64>) -> MspResult<()> {
        if values.len() != self.timestamps_us.len() {
            return Err(MspError::InvalidArgument {
                reason: format!(
                    "series '{}' has {} timestamps but {} values were supplied",
                    self.name,
                    self.timestamps_us.len(),
                    values.len()
                ),
            });
        }
        self.values = values;
        Ok(())
    }

    /// Replace both sequences wholesale
    pub fn replace_points(&mut self, timestamps_us: Vec<u64>, values: Vec<f64>) -> MspResult<()> {
        if timestamps_us.len() != values.len() {
            return Err(MspError::InvalidArgument {
                reason: format!(
                    "timestamp count {} does not match value count {}",
                    timestamps_us.len(),
                    values.len()
                ),
            });
        }
        self.timestamps_us = timestamps_us;
        self.values = values;
        Ok(())
    }

    /// Drop all samples, keeping the metadata
    pub fn clear(&mut self) {
        self.timestamps_us.clear();
        self.values.clear();
    }

    /// Clone every field of `other` into this series
    pub fn copy_from(&mut self, other: &TimeSeries) {
        self.clone_from(other);
    }

    pub fn len(&self) -> usize {
        self.timestamps_us.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps_us.is_empty()
    }

    pub fn first_timestamp_us(&self) -> Option<u64> {
        self.timestamps_us.first().copied()
    }

    pub fn last_timestamp_us(&self) -> Option<u64> {
        self.timestamps_us.last().copied()
    }

    /// Iterate over `(timestamp_us, value)` pairs
    pub fn points(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        self.timestamps_us.iter().copied().zip(self.values.iter().copied())
    }

    /// Absolute `[start, end]` bounds in epoch microseconds for a window given
    /// in seconds relative to this series' start time
    pub fn window_bounds_us(&self, window_start_s: f64, window_end_s: f64) -> (u64, u64) {
        (
            self.start_time_us.saturating_add(secs_to_micros(window_start_s)),
            self.start_time_us.saturating_add(secs_to_micros(window_end_s)),
        )
    }

    /// Seconds elapsed between the series start and `timestamp_us`
    pub fn seconds_since_start(&self, timestamp_us: u64) -> f64 {
        if timestamp_us >= self.start_time_us {
            micros_to_secs(timestamp_us - self.start_time_us)
        } else {
            -micros_to_secs(self.start_time_us - timestamp_us)
        }
    }

    /// Span covered by the samples, in seconds
    pub fn duration_s(&self) -> f64 {
        match (self.first_timestamp_us(), self.last_timestamp_us()) {
            (Some(first), Some(last)) => micros_to_secs(last - first),
            _ => 0.0,
        }
    }

    /// Summary statistics of the values
    pub fn stats(&self) -> SeriesStats {
        SeriesStats::calculate(&self.values)
    }
}

impl fmt::Display for TimeSeries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] ({} samples, {:.3}s)",
               self.name, self.unit, self.len(), self.duration_s())
    }
}

/// Basic statistics for a series' values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStats {
    pub mean: f64,
    pub rms: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub peak_to_peak: f64,
}

impl SeriesStats {
    pub fn calculate(data: &[f64]) -> Self {
        if data.is_empty() {
            return Self {
                mean: 0.0,
                rms: 0.0,
                std_dev: 0.0,
                min: 0.0,
                max: 0.0,
                peak_to_peak: 0.0,
            };
        }

        let n = data.len() as f64;
        let mean = data.iter().sum::<f64>() / n;
        let rms = (data.iter().map(|x| x * x).sum::<f64>() / n).sqrt();
        let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;

        let min = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));
        let max = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));

        Self {
            mean,
            rms,
            std_dev: variance.sqrt(),
            min,
            max,
            peak_to_peak: max - min,
        }
    }
}
