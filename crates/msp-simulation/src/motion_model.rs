//! Synthetic gait motion model

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Periodic hip-flexion angle model.
///
/// The hip swings sinusoidally at the gait cycle frequency; sensor noise is
/// added on top by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionModel {
    /// Peak hip flexion amplitude (deg)
    pub amplitude: f64,
    /// Gait cycle frequency (Hz)
    pub gait_frequency_hz: f64,
    /// Standard deviation of additive sensor noise (deg)
    pub noise_std: f64,
}

impl Default for MotionModel {
    fn default() -> Self {
        Self {
            amplitude: 30.0,
            gait_frequency_hz: 1.0,
            noise_std: 0.1,
        }
    }
}

impl MotionModel {
    /// Noise-free hip angle `elapsed_s` seconds into the recording
    pub fn angle_at(&self, elapsed_s: f64) -> f64 {
        self.amplitude * (2.0 * PI * self.gait_frequency_hz * elapsed_s).sin()
    }

    /// Duration of one gait cycle in seconds
    pub fn cycle_period_s(&self) -> f64 {
        1.0 / self.gait_frequency_hz
    }

    pub fn description(&self) -> String {
        format!("{:.1} deg @ {:.2} Hz", self.amplitude, self.gait_frequency_hz)
    }

    /// Common gait presets
    pub fn presets() -> Vec<(&'static str, MotionModel)> {
        vec![
            ("Slow Walk", MotionModel {
                amplitude: 25.0, gait_frequency_hz: 0.8, noise_std: 0.1
            }),
            ("Walk", MotionModel::default()),
            ("Brisk Walk", MotionModel {
                amplitude: 35.0, gait_frequency_hz: 1.2, noise_std: 0.15
            }),
            ("Run", MotionModel {
                amplitude: 45.0, gait_frequency_hz: 1.5, noise_std: 0.3
            }),
        ]
    }
}
