//! Finite-difference velocity and acceleration estimation

use msp_core::timestamp::MICROS_PER_SECOND;
use msp_core::TimeSeries;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Differences over less than this many seconds are skipped
pub const MIN_DT_S: f64 = 1e-5;

/// One derived sample, stamped with the earlier of the two inputs it spans
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicSample {
    pub timestamp_us: u64,
    pub value: f64,
}

/// Velocity and acceleration over a window
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    pub velocities: Vec<KinematicSample>,
    pub accelerations: Vec<KinematicSample>,
}

impl Kinematics {
    pub fn velocity_values(&self) -> Vec<f64> {
        self.velocities.iter().map(|s| s.value).collect()
    }

    pub fn acceleration_values(&self) -> Vec<f64> {
        self.accelerations.iter().map(|s| s.value).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.velocities.is_empty()
    }
}

/// Derives velocity and acceleration from a position-like series
#[derive(Debug, Clone, Copy, Default)]
pub struct KinematicsEstimator;

impl KinematicsEstimator {
    pub fn new() -> Self {
        KinematicsEstimator
    }

    /// Forward differences over the samples in `[window_start_s, window_end_s]`.
    ///
    /// The range starts at the first sample at or after the window start
    /// (the first sample if none is) and ends at the last sample not after
    /// the window end (the last sample if none is after it). Pairs closer
    /// than [`MIN_DT_S`] are dropped, so velocities carry their own
    /// timestamps rather than relying on position.
    pub fn derive(
        &self,
        series: &TimeSeries,
        window_start_s: f64,
        window_end_s: f64,
    ) -> Kinematics {
        let Some((start_index, end_index)) = window_indices(series, window_start_s, window_end_s)
        else {
            return Kinematics::default();
        };

        let positions: Vec<KinematicSample> = series
            .points()
            .skip(start_index)
            .take(end_index + 1 - start_index)
            .map(|(timestamp_us, value)| KinematicSample { timestamp_us, value })
            .collect();

        let velocities = differentiate(&positions);
        let accelerations = differentiate(&velocities);

        debug!(
            series = series.name(),
            start_index,
            end_index,
            velocities = velocities.len(),
            accelerations = accelerations.len(),
            "derived kinematics"
        );

        Kinematics { velocities, accelerations }
    }
}

/// Inclusive `(start, end)` sample range covered by the window, or `None` if
/// it is empty or non-finite
fn window_indices(
    series: &TimeSeries,
    window_start_s: f64,
    window_end_s: f64,
) -> Option<(usize, usize)> {
    if series.is_empty() || !(window_start_s.is_finite() && window_end_s.is_finite()) {
        return None;
    }
    let (start_us, end_us) = series.window_bounds_us(window_start_s, window_end_s);
    let timestamps = series.timestamps();

    let lower = timestamps.partition_point(|&t| t < start_us);
    let start_index = if lower == timestamps.len() { 0 } else { lower };

    let upper = timestamps.partition_point(|&t| t <= end_us);
    let end_index = if upper == timestamps.len() {
        timestamps.len() - 1
    } else {
        upper.checked_sub(1)?
    };

    (start_index <= end_index).then_some((start_index, end_index))
}

fn differentiate(samples: &[KinematicSample]) -> Vec<KinematicSample> {
    samples
        .windows(2)
        .filter_map(|pair| {
            let dt =
                (pair[1].timestamp_us as f64 - pair[0].timestamp_us as f64) / MICROS_PER_SECOND;
            (dt.abs() > MIN_DT_S).then(|| KinematicSample {
                timestamp_us: pair[0].timestamp_us,
                value: (pair[1].value - pair[0].value) / dt,
            })
        })
        .collect()
}
