//! MSP-Core: Foundation types for motion sensor signal processing
//!
//! Time series container, sensor kinds, clock, errors and the completion
//! event dispatcher shared by the simulation and processing crates.

pub mod error;
pub mod events;
pub mod sensor_types;
pub mod series;
pub mod timestamp;

pub use error::{ErrorKind, MspError, MspResult};
pub use events::{EventDispatcher, ListenerId, SeriesEvent, SeriesListener};
pub use sensor_types::{SensorKind, SignalOrigin};
pub use series::{SeriesId, SeriesStats, TimeSeries};
pub use timestamp::{Clock, FixedClock, SystemClock};
