//! Local-maximum peak detection

use msp_core::{EventDispatcher, TimeSeries};
use tracing::{debug, warn};

/// Finds strict local maxima inside a time window
#[derive(Debug, Clone, Default)]
pub struct PeakDetector {
    events: EventDispatcher,
}

impl PeakDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(mut self, events: EventDispatcher) -> Self {
        self.events = events;
        self
    }

    /// Indices `i` with `v[i-1] < v[i] > v[i+1]` whose own timestamp lies in
    /// the window. Neighbours may fall outside the window; plateaus never
    /// count. Fewer than three samples or a non-finite window yield nothing.
    pub fn find_peak_indices(
        &self,
        series: &TimeSeries,
        window_start_s: f64,
        window_end_s: f64,
    ) -> Vec<usize> {
        if series.len() < 3 {
            return Vec::new();
        }
        if !(window_start_s.is_finite() && window_end_s.is_finite()) {
            warn!(series = series.name(), window_start_s, window_end_s, "non-finite peak window");
            return Vec::new();
        }

        let (start_us, end_us) = series.window_bounds_us(window_start_s, window_end_s);
        let timestamps = series.timestamps();
        let values = series.values();

        (1..series.len() - 1)
            .filter(|&i| timestamps[i] >= start_us && timestamps[i] <= end_us)
            .filter(|&i| values[i] > values[i - 1] && values[i] > values[i + 1])
            .collect()
    }

    /// Peak timestamps in the window; also published as a peaks-ready event
    pub fn find_peaks(
        &self,
        series: &TimeSeries,
        window_start_s: f64,
        window_end_s: f64,
    ) -> Vec<u64> {
        let peaks: Vec<u64> = self
            .find_peak_indices(series, window_start_s, window_end_s)
            .into_iter()
            .map(|i| series.timestamps()[i])
            .collect();

        debug!(series = series.name(), peaks = peaks.len(), "peak search finished");
        self.events.peaks_ready(series, &peaks);
        peaks
    }
}
