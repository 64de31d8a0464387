//! Sensor kinds known to the pipeline

use crate::error::MspError;
use crate::series::TimeSeries;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a sensor's samples come into existence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalOrigin {
    /// Synthesized from the motion model
    Base,
    /// Derived from a reference series
    Correlated,
}

/// Closed set of simulated sensors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Goniometer-style hip flexion angle
    Hip,
    /// Inertial angular-rate sensor riding on the hip
    Imu,
}

impl SensorKind {
    pub const ALL: [SensorKind; 2] = [SensorKind::Hip, SensorKind::Imu];

    /// Default series name for a fresh sensor of this kind
    pub fn default_name(&self) -> &'static str {
        match self {
            SensorKind::Hip => "hip_sensor",
            SensorKind::Imu => "3-axis IMU",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            SensorKind::Hip => "deg",
            SensorKind::Imu => "deg/s",
        }
    }

    pub fn origin(&self) -> SignalOrigin {
        match self {
            SensorKind::Hip => SignalOrigin::Base,
            SensorKind::Imu => SignalOrigin::Correlated,
        }
    }

    /// Short tag accepted by [`FromStr`]
    pub fn tag(&self) -> &'static str {
        match self {
            SensorKind::Hip => "HIP",
            SensorKind::Imu => "IMU",
        }
    }

    /// Empty series named and tagged for this kind
    pub fn empty_series(&self) -> TimeSeries {
        TimeSeries::new(self.default_name(), self.unit())
    }
}

impl FromStr for SensorKind {
    type Err = MspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SensorKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.tag().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| MspError::InvalidArgument {
                reason: format!("unknown sensor tag '{}'", s),
            })
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.default_name(), self.unit())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_parsing() {
        assert_eq!("HIP".parse::<SensorKind>().unwrap(), SensorKind::Hip);
        assert_eq!("Hip".parse::<SensorKind>().unwrap(), SensorKind::Hip);
        assert_eq!(" imu ".parse::<SensorKind>().unwrap(), SensorKind::Imu);
        assert!("knee".parse::<SensorKind>().is_err());
    }

    #[test]
    fn test_empty_series_defaults() {
        let hip = SensorKind::Hip.empty_series();
        assert_eq!(hip.name(), "hip_sensor");
        assert_eq!(hip.unit(), "deg");

        let imu = SensorKind::Imu.empty_series();
        assert_eq!(imu.name(), "3-axis IMU");
        assert_eq!(imu.unit(), "deg/s");
        assert_eq!(SensorKind::Imu.origin(), SignalOrigin::Correlated);
    }
}
