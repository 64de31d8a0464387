//! Sensor stream generator with jittered sample timing

use crate::motion_model::MotionModel;
use msp_core::timestamp::{secs_to_micros, Clock, SystemClock};
use msp_core::{invalid_argument, EventDispatcher, MspError, MspResult, SensorKind, TimeSeries};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for signal generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Base hip-angle model
    pub motion: MotionModel,
    /// Noise added to each derived rate sample (deg/s)
    pub rate_noise_std: f64,
    /// Smallest allowed inter-sample interval, as a fraction of the nominal
    /// interval. Never below 1 µs.
    pub min_interval_fraction: f64,
    /// Random seed for reproducibility; `None` reseeds from the wall clock on
    /// every generation call
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            motion: MotionModel::default(),
            rate_noise_std: 0.5,
            min_interval_fraction: 0.05,
            seed: None,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> MspResult<()> {
        let m = &self.motion;
        if !m.amplitude.is_finite() {
            return Err(invalid_argument!("motion amplitude must be finite"));
        }
        if !(m.gait_frequency_hz.is_finite() && m.gait_frequency_hz > 0.0) {
            return Err(invalid_argument!(
                "gait frequency must be positive, got {}", m.gait_frequency_hz
            ));
        }
        if !(m.noise_std.is_finite() && m.noise_std >= 0.0) {
            return Err(invalid_argument!("noise std must be non-negative, got {}", m.noise_std));
        }
        if !(self.rate_noise_std.is_finite() && self.rate_noise_std >= 0.0) {
            return Err(invalid_argument!(
                "rate noise std must be non-negative, got {}", self.rate_noise_std
            ));
        }
        if !(self.min_interval_fraction > 0.0 && self.min_interval_fraction <= 1.0) {
            return Err(invalid_argument!(
                "min interval fraction must be in (0, 1], got {}", self.min_interval_fraction
            ));
        }
        Ok(())
    }
}

/// Draws jittered inter-sample intervals.
///
/// Each interval is the nominal spacing scaled by a Normal(1, jitter) factor,
/// clamped from below so timestamps keep strictly increasing.
struct IntervalSampler {
    nominal_us: f64,
    floor_us: f64,
    factor: Normal<f64>,
    clamped: usize,
}

impl IntervalSampler {
    fn new(frequency_hz: f64, jitter_ratio: f64, min_fraction: f64) -> MspResult<Self> {
        let nominal_us = 1e6 / frequency_hz;
        let factor = Normal::new(1.0, jitter_ratio)
            .map_err(|e| invalid_argument!("invalid jitter ratio {}: {}", jitter_ratio, e))?;

        Ok(IntervalSampler {
            nominal_us,
            floor_us: (nominal_us * min_fraction).max(1.0),
            factor,
            clamped: 0,
        })
    }

    fn next(&mut self, rng: &mut StdRng) -> f64 {
        let interval = self.nominal_us * self.factor.sample(rng);
        if interval < self.floor_us {
            self.clamped += 1;
            self.floor_us
        } else {
            interval
        }
    }
}

/// Generates base hip-angle series and correlated angular-rate series
pub struct SignalGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    reseed_per_call: bool,
    clock: Arc<dyn Clock>,
    events: EventDispatcher,
}

impl SignalGenerator {
    /// Create a generator using the system clock and a private dispatcher
    pub fn new(config: GeneratorConfig) -> MspResult<Self> {
        config.validate()?;

        let reseed_per_call = config.seed.is_none();
        let rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(wall_clock_seed));

        Ok(SignalGenerator {
            config,
            rng,
            reseed_per_call,
            clock: Arc::new(SystemClock),
            events: EventDispatcher::new(),
        })
    }

    /// Use `clock` for generation start times
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Publish completion events through `events`
    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Draw all randomness from `rng`, disabling wall-clock reseeding
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self.reseed_per_call = false;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    /// Synthesize a hip-angle series named after [`SensorKind::Hip`]
    pub fn generate_base(
        &mut self,
        frequency_hz: f64,
        jitter_ratio: f64,
        duration_s: f64,
    ) -> MspResult<TimeSeries> {
        let mut series = SensorKind::Hip.empty_series();
        self.generate_base_into(&mut series, frequency_hz, jitter_ratio, duration_s)?;
        Ok(series)
    }

    /// Replace the samples of `series` with a freshly synthesized hip angle
    pub fn generate_base_into(
        &mut self,
        series: &mut TimeSeries,
        frequency_hz: f64,
        jitter_ratio: f64,
        duration_s: f64,
    ) -> MspResult<()> {
        validate_request(frequency_hz, jitter_ratio, duration_s)?;
        let mut sampler =
            IntervalSampler::new(frequency_hz, jitter_ratio, self.config.min_interval_fraction)?;
        let noise = Normal::new(0.0, self.config.motion.noise_std)
            .map_err(|e| invalid_argument!("invalid noise std: {}", e))?;
        self.prepare_rng();

        let start_us = self.clock.now_us();
        let end_offset_us = secs_to_micros(duration_s) as f64;
        let motion = self.config.motion;

        series.clear();
        series.set_start_time_us(start_us);
        series.set_frequency_hz(Some(frequency_hz));

        let mut offset_us = 0.0;
        while offset_us <= end_offset_us {
            let elapsed_s = offset_us.round() / 1e6;
            let value = motion.angle_at(elapsed_s) + noise.sample(&mut self.rng);
            series.push(start_us + offset_us.round() as u64, value);
            offset_us += sampler.next(&mut self.rng);
        }

        self.finish(series, &sampler, "base");
        Ok(())
    }

    /// Derive an angular-rate series named after [`SensorKind::Imu`]
    pub fn generate_correlated(
        &mut self,
        frequency_hz: f64,
        jitter_ratio: f64,
        duration_s: f64,
        reference: Option<&TimeSeries>,
    ) -> MspResult<TimeSeries> {
        let mut series = SensorKind::Imu.empty_series();
        self.generate_correlated_into(&mut series, frequency_hz, jitter_ratio, duration_s, reference)?;
        Ok(series)
    }

    /// Replace the samples of `series` with a finite-difference rate of
    /// `reference`.
    ///
    /// For each reference sample inside the window, derived samples are
    /// emitted at jittered intervals until the derived clock catches up with
    /// that sample. Each carries `(v[i] - v[i-1]) * frequency_hz` plus noise;
    /// the scale is the generation frequency, not the reference's own rate.
    pub fn generate_correlated_into(
        &mut self,
        series: &mut TimeSeries,
        frequency_hz: f64,
        jitter_ratio: f64,
        duration_s: f64,
        reference: Option<&TimeSeries>,
    ) -> MspResult<()> {
        let reference = reference
            .filter(|r| !r.is_empty())
            .ok_or_else(|| MspError::MissingReference {
                series: series.name().to_string(),
            })?;
        validate_request(frequency_hz, jitter_ratio, duration_s)?;
        let mut sampler =
            IntervalSampler::new(frequency_hz, jitter_ratio, self.config.min_interval_fraction)?;
        let noise = Normal::new(0.0, self.config.rate_noise_std)
            .map_err(|e| invalid_argument!("invalid rate noise std: {}", e))?;
        self.prepare_rng();

        let start_us = reference.start_time_us();
        let end_us = start_us.saturating_add(secs_to_micros(duration_s));

        series.clear();
        series.set_start_time_us(start_us);
        series.set_frequency_hz(Some(frequency_hz));
        debug!(
            series = series.name(),
            reference = reference.name(),
            start_us,
            end_us,
            "deriving correlated series"
        );

        let mut previous = reference.values()[0];
        let mut offset_us = 0.0;
        for (ref_ts, ref_value) in reference.points() {
            if ref_ts > end_us {
                break;
            }

            let ref_offset_us = ref_ts.saturating_sub(start_us) as f64;
            while offset_us < ref_offset_us {
                let value = (ref_value - previous) * frequency_hz + noise.sample(&mut self.rng);
                series.push(start_us + offset_us.round() as u64, value);
                offset_us += sampler.next(&mut self.rng);
            }
            previous = ref_value;
        }

        self.finish(series, &sampler, "correlated");
        Ok(())
    }

    fn prepare_rng(&mut self) {
        if self.reseed_per_call {
            self.rng = StdRng::seed_from_u64(wall_clock_seed());
        }
    }

    fn finish(&self, series: &TimeSeries, sampler: &IntervalSampler, kind: &str) {
        if sampler.clamped > 0 {
            warn!(
                series = series.name(),
                clamped = sampler.clamped,
                floor_us = sampler.floor_us,
                "jittered intervals clamped to minimum spacing"
            );
        }
        info!(
            series = series.name(),
            kind,
            samples = series.len(),
            duration_s = series.duration_s(),
            "generated series"
        );
        self.events.series_ready(series);
    }
}

fn validate_request(frequency_hz: f64, jitter_ratio: f64, duration_s: f64) -> MspResult<()> {
    if !(frequency_hz.is_finite() && frequency_hz > 0.0) {
        return Err(invalid_argument!("frequency must be positive, got {}", frequency_hz));
    }
    if !(jitter_ratio.is_finite() && jitter_ratio >= 0.0) {
        return Err(invalid_argument!("jitter ratio must be non-negative, got {}", jitter_ratio));
    }
    if !(duration_s.is_finite() && duration_s >= 0.0) {
        return Err(invalid_argument!("duration must be non-negative, got {}", duration_s));
    }
    Ok(())
}

fn wall_clock_seed() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
