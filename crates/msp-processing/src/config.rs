//! Configuration for the analysis stages

use crate::resampler::{KnotSpacing, ResampleConfig};
use msp_core::{invalid_argument, MspError, MspResult};
use serde::{Deserialize, Serialize};

/// Gaussian kernel parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    pub kernel_size: usize,
    pub sigma: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            kernel_size: 19,
            sigma: 3.0,
        }
    }
}

impl SmoothingConfig {
    pub fn validate(&self) -> MspResult<()> {
        if self.kernel_size == 0 {
            return Err(invalid_argument!("kernel_size must be at least 1"));
        }
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(invalid_argument!("sigma must be positive, got {}", self.sigma));
        }
        Ok(())
    }
}

/// Parameters for one pass of resample, peak search, kinematics and smoothing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Configuration name/profile
    pub name: String,
    pub target_rate_hz: f64,
    /// Window start, seconds after the series start
    pub window_start_s: f64,
    /// Window end, seconds after the series start
    pub window_end_s: f64,
    pub resample: ResampleConfig,
    pub smoothing: SmoothingConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self::gait_overview()
    }
}

impl AnalysisConfig {
    /// 100 Hz over the first second, default smoothing
    pub fn gait_overview() -> Self {
        Self {
            name: "gait_overview".to_string(),
            target_rate_hz: 100.0,
            window_start_s: 0.0,
            window_end_s: 1.0,
            resample: ResampleConfig::default(),
            smoothing: SmoothingConfig::default(),
        }
    }

    /// Dense grid on measured knots with light smoothing
    pub fn high_resolution() -> Self {
        Self {
            name: "high_resolution".to_string(),
            target_rate_hz: 500.0,
            window_start_s: 0.0,
            window_end_s: 1.0,
            resample: ResampleConfig {
                knot_spacing: KnotSpacing::Measured,
            },
            smoothing: SmoothingConfig {
                kernel_size: 9,
                sigma: 1.5,
            },
        }
    }

    /// Coarse grid over a longer window with heavy smoothing
    pub fn coarse_trend() -> Self {
        Self {
            name: "coarse_trend".to_string(),
            target_rate_hz: 25.0,
            window_start_s: 0.0,
            window_end_s: 5.0,
            resample: ResampleConfig::default(),
            smoothing: SmoothingConfig {
                kernel_size: 31,
                sigma: 6.0,
            },
        }
    }

    pub fn presets() -> Vec<AnalysisConfig> {
        vec![Self::gait_overview(), Self::high_resolution(), Self::coarse_trend()]
    }

    /// Window length in seconds
    pub fn window_length_s(&self) -> f64 {
        self.window_end_s - self.window_start_s
    }

    pub fn validate(&self) -> MspResult<()> {
        if !(self.target_rate_hz.is_finite() && self.target_rate_hz > 0.0) {
            return Err(invalid_argument!(
                "target_rate_hz must be positive, got {}",
                self.target_rate_hz
            ));
        }
        if !(self.window_start_s.is_finite() && self.window_end_s.is_finite())
            || self.window_end_s < self.window_start_s
        {
            return Err(MspError::InvalidWindow {
                start_s: self.window_start_s,
                end_s: self.window_end_s,
            });
        }
        self.smoothing.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use msp_core::ErrorKind;

    #[test]
    fn test_presets_validate() {
        for preset in AnalysisConfig::presets() {
            assert!(preset.validate().is_ok(), "{} failed", preset.name);
        }
        assert_eq!(AnalysisConfig::default(), AnalysisConfig::gait_overview());
    }

    #[test]
    fn test_invalid_configs() {
        let mut config = AnalysisConfig::default();
        config.window_end_s = -1.0;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidWindow);

        let mut config = AnalysisConfig::default();
        config.target_rate_hz = 0.0;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);

        let mut config = AnalysisConfig::default();
        config.smoothing.sigma = -2.0;
        assert_eq!(config.validate().unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_window_length() {
        assert_eq!(AnalysisConfig::coarse_trend().window_length_s(), 5.0);
    }
}
