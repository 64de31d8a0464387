//! Fixed-rate resampling of irregularly timed series

use crate::spline::CubicSpline;
use msp_core::timestamp::secs_to_micros;
use msp_core::{invalid_argument, EventDispatcher, MspError, MspResult, TimeSeries};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Where the interpolating spline places its knots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KnotSpacing {
    /// Treat samples as evenly spaced between the first and last timestamp,
    /// with step `(last - first) / (count - 1)` µs. Jittered sources are
    /// interpolated with a small timing bias.
    #[default]
    Uniform,
    /// Use each sample's own timestamp as its knot
    Measured,
}

/// Resampler configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResampleConfig {
    pub knot_spacing: KnotSpacing,
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            knot_spacing: KnotSpacing::Uniform,
        }
    }
}

/// Converts a series onto a fixed-rate grid over a time window
#[derive(Debug, Clone, Default)]
pub struct Resampler {
    config: ResampleConfig,
    events: EventDispatcher,
}

impl Resampler {
    pub fn new(config: ResampleConfig) -> Self {
        Resampler {
            config,
            events: EventDispatcher::new(),
        }
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &ResampleConfig {
        &self.config
    }

    /// Resample `source` at `target_rate_hz` over `[window_start_s, window_end_s]`
    /// (seconds relative to the source start) into `destination`.
    ///
    /// Grid points outside the source's first..last timestamp are skipped.
    /// On success the destination's points are replaced, its start time is
    /// copied from the source, a ready event is published and the number of
    /// emitted samples returned. Failures are logged and leave the
    /// destination untouched; they do not affect other series.
    pub fn resample(
        &self,
        source: &TimeSeries,
        destination: &mut TimeSeries,
        target_rate_hz: f64,
        window_start_s: f64,
        window_end_s: f64,
    ) -> MspResult<usize> {
        let (timestamps, values) =
            match self.grid_points(source, target_rate_hz, window_start_s, window_end_s) {
                Ok(points) => points,
                Err(e) => {
                    warn!(
                        source = source.name(),
                        destination = destination.name(),
                        error = %e,
                        "resampling skipped"
                    );
                    return Err(e);
                }
            };

        let count = timestamps.len();
        destination.replace_points(timestamps, values)?;
        destination.set_start_time_us(source.start_time_us());
        destination.set_frequency_hz(Some(target_rate_hz));

        info!(
            source = source.name(),
            destination = destination.name(),
            target_rate_hz,
            samples = count,
            "resampled series"
        );
        self.events.series_ready(destination);
        Ok(count)
    }

    fn grid_points(
        &self,
        source: &TimeSeries,
        target_rate_hz: f64,
        window_start_s: f64,
        window_end_s: f64,
    ) -> MspResult<(Vec<u64>, Vec<f64>)> {
        if !(window_start_s.is_finite() && window_end_s.is_finite())
            || window_end_s < window_start_s
        {
            return Err(MspError::InvalidWindow {
                start_s: window_start_s,
                end_s: window_end_s,
            });
        }
        let (first, last) = match (source.first_timestamp_us(), source.last_timestamp_us()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(MspError::EmptyData {
                    series: source.name().to_string(),
                })
            }
        };
        if !(target_rate_hz.is_finite() && target_rate_hz > 0.0) {
            return Err(invalid_argument!("target rate must be positive, got {}", target_rate_hz));
        }
        let step_us = (1e6 / target_rate_hz) as u64;
        if step_us == 0 {
            return Err(invalid_argument!(
                "target rate {} Hz is finer than the microsecond timestamp resolution",
                target_rate_hz
            ));
        }

        let spline = self.build_spline(source, first, last)?;

        let start_us = source.start_time_us().saturating_add(secs_to_micros(window_start_s));
        let end_us = start_us.saturating_add(secs_to_micros(window_end_s - window_start_s));
        debug!(start_us, end_us, step_us, first, last, "resampling window");

        let mut timestamps = Vec::new();
        let mut values = Vec::new();
        let stop_us = end_us.min(last);
        let mut cursor = first_grid_point(start_us, step_us, first);
        while let Some(current) = cursor.filter(|&t| t <= stop_us) {
            timestamps.push(current);
            values.push(spline.evaluate((current - first) as f64));
            cursor = current.checked_add(step_us);
        }

        Ok((timestamps, values))
    }

    /// Knot positions are measured in µs from the first source timestamp
    fn build_spline(&self, source: &TimeSeries, first: u64, last: u64) -> MspResult<CubicSpline> {
        let values = source.values().to_vec();
        match self.config.knot_spacing {
            KnotSpacing::Uniform => {
                let intervals = (source.len() as u64).saturating_sub(1).max(1);
                let step = (last - first) / intervals;
                CubicSpline::cardinal(values, 0.0, step as f64)
            }
            KnotSpacing::Measured => {
                let knots = source
                    .timestamps()
                    .iter()
                    .map(|&t| t.saturating_sub(first) as f64)
                    .collect();
                CubicSpline::new(knots, values)
            }
        }
    }
}

/// First point of the grid `start_us + k * step_us` that is not before `first`
fn first_grid_point(start_us: u64, step_us: u64, first: u64) -> Option<u64> {
    if first <= start_us {
        return Some(start_us);
    }
    let steps = (first - start_us).div_ceil(step_us);
    steps.checked_mul(step_us)?.checked_add(start_us)
}
