//! MSP-Processing: analysis stages for motion sensor series
//!
//! Spline resampling onto a fixed grid, windowed peak search,
//! finite-difference kinematics and Gaussian smoothing.

pub mod config;
pub mod kinematics;
pub mod peaks;
pub mod resampler;
pub mod smoothing;
pub mod spline;

pub use config::{AnalysisConfig, SmoothingConfig};
pub use kinematics::{KinematicSample, Kinematics, KinematicsEstimator, MIN_DT_S};
pub use peaks::PeakDetector;
pub use resampler::{KnotSpacing, ResampleConfig, Resampler};
pub use smoothing::{gaussian_kernel, SmoothingFilter};
pub use spline::CubicSpline;
