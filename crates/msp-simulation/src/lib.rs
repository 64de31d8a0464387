//! MSP-Simulation: synthetic motion sensor streams
//!
//! Generates a periodic hip-angle series with jittered sample timing and a
//! correlated angular-rate series derived from it.

pub mod generator;
pub mod motion_model;

pub use generator::*;
pub use motion_model::*;
