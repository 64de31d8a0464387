//! Gaussian smoothing of series values

use msp_core::{invalid_argument, EventDispatcher, MspError, MspResult, TimeSeries};
use std::f64::consts::PI;
use tracing::debug;

/// Normalized Gaussian kernel with `kernel_size` taps at offsets
/// `k - kernel_size / 2`.
///
/// Even sizes are not re-centred, so they lean one tap towards positive
/// offsets. Weights sum to 1.
pub fn gaussian_kernel(kernel_size: usize, sigma: f64) -> MspResult<Vec<f64>> {
    if kernel_size == 0 {
        return Err(invalid_argument!("kernel size must be at least 1"));
    }
    if !(sigma.is_finite() && sigma > 0.0) {
        return Err(invalid_argument!("kernel sigma must be positive, got {}", sigma));
    }

    let half = (kernel_size / 2) as f64;
    let scale = 1.0 / ((2.0 * PI).sqrt() * sigma);
    let mut kernel: Vec<f64> = (0..kernel_size)
        .map(|k| {
            let x = k as f64 - half;
            scale * (-0.5 * x * x / (sigma * sigma)).exp()
        })
        .collect();

    let sum: f64 = kernel.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        return Err(invalid_argument!(
            "kernel of size {} with sigma {} has no usable weight",
            kernel_size,
            sigma
        ));
    }
    kernel.iter_mut().for_each(|w| *w /= sum);
    Ok(kernel)
}

/// In-place Gaussian convolution over a series
#[derive(Debug, Clone, Default)]
pub struct SmoothingFilter {
    events: EventDispatcher,
}

impl SmoothingFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Replace the series values with their Gaussian-weighted average.
    ///
    /// Taps that fall outside the series are dropped without renormalizing,
    /// so samples within `kernel_size / 2` of either end are attenuated.
    pub fn gaussian_smooth(
        &self,
        series: &mut TimeSeries,
        kernel_size: usize,
        sigma: f64,
    ) -> MspResult<()> {
        let kernel = gaussian_kernel(kernel_size, sigma)?;
        if series.is_empty() {
            return Err(MspError::EmptyData {
                series: series.name().to_string(),
            });
        }

        let smoothed = convolve_same(series.values(), &kernel);
        series.set_values(smoothed)?;

        debug!(series = series.name(), kernel_size, sigma, "gaussian smoothing applied");
        self.events.series_ready(series);
        Ok(())
    }
}

fn convolve_same(values: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = values.len() as isize;
    let half = (kernel.len() / 2) as isize;
    (0..n)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter_map(|(k, w)| {
                    let j = i + k as isize - half;
                    (0..n).contains(&j).then(|| values[j as usize] * w)
                })
                .sum()
        })
        .collect()
}
