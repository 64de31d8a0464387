//! MSP-Workbench: handle-based operation surface over the motion pipeline
//!
//! A [`Workbench`] owns every series it creates and addresses them through
//! [`SeriesId`] handles. Generation and analysis stages share one
//! [`EventDispatcher`], so a single subscription observes every completion.

use msp_core::timestamp::Clock;
use msp_core::{
    EventDispatcher, ListenerId, MspError, MspResult, SensorKind, SeriesId, SeriesListener,
    SeriesEvent, SeriesStats, TimeSeries,
};
use msp_processing::{
    AnalysisConfig, Kinematics, KinematicsEstimator, PeakDetector, ResampleConfig, Resampler,
    SmoothingFilter,
};
use msp_simulation::{GeneratorConfig, SignalGenerator};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Summary of one [`Workbench::analyze`] pass
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub config: String,
    pub source: String,
    /// Nominal rate of the source series, if known
    pub source_frequency_hz: Option<f64>,
    pub resampled: SeriesId,
    pub samples: usize,
    pub peaks_us: Vec<u64>,
    /// Peak positions in seconds after the resampled series start
    pub peak_times_s: Vec<f64>,
    pub velocity_samples: usize,
    pub acceleration_samples: usize,
    pub raw_stats: SeriesStats,
    pub smoothed_stats: SeriesStats,
}

/// Owns series and runs pipeline stages on them by handle
pub struct Workbench {
    series: HashMap<SeriesId, TimeSeries>,
    events: EventDispatcher,
    generator: SignalGenerator,
    resampler: Resampler,
    peaks: PeakDetector,
    kinematics: KinematicsEstimator,
    smoothing: SmoothingFilter,
}

impl Workbench {
    /// Workbench with default generator and resampler settings
    pub fn new() -> MspResult<Self> {
        Self::with_config(GeneratorConfig::default(), ResampleConfig::default())
    }

    pub fn with_config(generator: GeneratorConfig, resample: ResampleConfig) -> MspResult<Self> {
        let events = EventDispatcher::new();
        Ok(Workbench {
            series: HashMap::new(),
            generator: SignalGenerator::new(generator)?.with_events(events.clone()),
            resampler: Resampler::new(resample).with_events(events.clone()),
            peaks: PeakDetector::new().with_events(events.clone()),
            kinematics: KinematicsEstimator::new(),
            smoothing: SmoothingFilter::new().with_events(events.clone()),
            events,
        })
    }

    /// Take generation start times from `clock`
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.generator = self.generator.with_clock(clock);
        self
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn create(&mut self, name: impl Into<String>, unit: impl Into<String>) -> SeriesId {
        self.add(TimeSeries::new(name, unit))
    }

    /// Empty series carrying the sensor's default name and unit
    pub fn create_sensor(&mut self, kind: SensorKind) -> SeriesId {
        self.add(kind.empty_series())
    }

    /// Take ownership of an existing series
    pub fn add(&mut self, series: TimeSeries) -> SeriesId {
        let id = SeriesId::new();
        debug!(%id, name = series.name(), unit = series.unit(), "series created");
        self.series.insert(id, series);
        id
    }

    pub fn series(&self, handle: SeriesId) -> MspResult<&TimeSeries> {
        self.series.get(&handle).ok_or_else(|| null_handle(handle))
    }

    pub fn contains(&self, handle: SeriesId) -> bool {
        self.series.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Drop a series; returns it if the handle was known
    pub fn remove(&mut self, handle: SeriesId) -> Option<TimeSeries> {
        self.series.remove(&handle)
    }

    pub fn subscribe<L>(&self, listener: L) -> ListenerId
    where
        L: SeriesListener + 'static,
    {
        self.events.subscribe(listener)
    }

    pub fn subscribe_fn<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SeriesEvent<'_>) + Send + Sync + 'static,
    {
        self.events.subscribe_fn(listener)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    /// Overwrite `dest` with every field of `source`
    pub fn copy(&mut self, source: SeriesId, dest: SeriesId) -> MspResult<()> {
        if source == dest {
            return self.series(source).map(|_| ());
        }
        let snapshot = self.series(source)?.clone();
        lookup_mut(&mut self.series, dest)?.copy_from(&snapshot);
        Ok(())
    }

    pub fn generate_base(
        &mut self,
        handle: SeriesId,
        frequency_hz: f64,
        jitter_ratio: f64,
        duration_s: f64,
    ) -> MspResult<()> {
        let series = lookup_mut(&mut self.series, handle)?;
        self.generator.generate_base_into(series, frequency_hz, jitter_ratio, duration_s)
    }

    /// Derive `handle` from the series behind `reference`; `None` fails with
    /// `MissingReference`
    pub fn generate_correlated(
        &mut self,
        handle: SeriesId,
        frequency_hz: f64,
        jitter_ratio: f64,
        duration_s: f64,
        reference: Option<SeriesId>,
    ) -> MspResult<()> {
        if !self.contains(handle) {
            return Err(null_handle(handle));
        }
        let reference = match reference {
            Some(id) => self.series(id)?.clone(),
            None => {
                return Err(MspError::MissingReference {
                    series: self.series(handle)?.name().to_string(),
                })
            }
        };

        let series = lookup_mut(&mut self.series, handle)?;
        self.generator.generate_correlated_into(
            series,
            frequency_hz,
            jitter_ratio,
            duration_s,
            Some(&reference),
        )
    }

    /// Resample `source` into `dest`; returns the number of grid samples
    pub fn resample(
        &mut self,
        source: SeriesId,
        dest: SeriesId,
        target_rate_hz: f64,
        window_start_s: f64,
        window_end_s: f64,
    ) -> MspResult<usize> {
        let source = self.series(source)?.clone();
        let destination = lookup_mut(&mut self.series, dest)?;
        self.resampler
            .resample(&source, destination, target_rate_hz, window_start_s, window_end_s)
    }

    pub fn find_peaks(
        &self,
        handle: SeriesId,
        window_start_s: f64,
        window_end_s: f64,
    ) -> MspResult<Vec<u64>> {
        let series = self.series(handle)?;
        Ok(self.peaks.find_peaks(series, window_start_s, window_end_s))
    }

    pub fn derive_kinematics(
        &self,
        handle: SeriesId,
        window_start_s: f64,
        window_end_s: f64,
    ) -> MspResult<Kinematics> {
        let series = self.series(handle)?;
        Ok(self.kinematics.derive(series, window_start_s, window_end_s))
    }

    pub fn smooth(&mut self, handle: SeriesId, kernel_size: usize, sigma: f64) -> MspResult<()> {
        let series = lookup_mut(&mut self.series, handle)?;
        self.smoothing.gaussian_smooth(series, kernel_size, sigma)
    }

    /// Resample `source` into a new series, then run peak search, kinematics
    /// and smoothing on it with the settings in `config`
    pub fn analyze(&mut self, source: SeriesId, config: &AnalysisConfig) -> MspResult<AnalysisReport> {
        config.validate()?;
        let (name, unit) = {
            let s = self.series(source)?;
            (format!("{}_{}", s.name(), config.name), s.unit().to_string())
        };
        let resampled = self.create(name, unit);

        let resampler = Resampler::new(config.resample).with_events(self.events.clone());
        let snapshot = self.series(source)?.clone();
        let samples = match resampler.resample(
            &snapshot,
            lookup_mut(&mut self.series, resampled)?,
            config.target_rate_hz,
            config.window_start_s,
            config.window_end_s,
        ) {
            Ok(samples) => samples,
            Err(e) => {
                self.series.remove(&resampled);
                return Err(e);
            }
        };

        let peaks_us = self.find_peaks(resampled, config.window_start_s, config.window_end_s)?;
        let kinematics =
            self.derive_kinematics(resampled, config.window_start_s, config.window_end_s)?;
        let raw_stats = self.series(resampled)?.stats();

        self.smooth(resampled, config.smoothing.kernel_size, config.smoothing.sigma)?;
        let smoothed = self.series(resampled)?;

        let report = AnalysisReport {
            config: config.name.clone(),
            source: snapshot.name().to_string(),
            source_frequency_hz: snapshot.frequency_hz(),
            resampled,
            samples,
            peak_times_s: peaks_us.iter().map(|&t| smoothed.seconds_since_start(t)).collect(),
            peaks_us,
            velocity_samples: kinematics.velocities.len(),
            acceleration_samples: kinematics.accelerations.len(),
            raw_stats,
            smoothed_stats: smoothed.stats(),
        };

        info!(
            config = %report.config,
            source = %report.source,
            samples,
            peaks = report.peaks_us.len(),
            "analysis finished"
        );
        Ok(report)
    }
}

fn lookup_mut(
    series: &mut HashMap<SeriesId, TimeSeries>,
    handle: SeriesId,
) -> MspResult<&mut TimeSeries> {
    series.get_mut(&handle).ok_or_else(|| null_handle(handle))
}

fn null_handle(handle: SeriesId) -> MspError {
    MspError::NullHandle {
        handle: handle.to_string(),
    }
}
