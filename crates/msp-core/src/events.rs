//! Completion notifications for pipeline stages
//!
//! Stages publish a [`SeriesEvent`] once a series is fully populated.
//! Listeners run synchronously on the publishing thread, in the order they
//! subscribed.

use crate::series::TimeSeries;
use std::sync::{Arc, RwLock};
use tracing::trace;

/// Notification raised by a pipeline stage
#[derive(Debug, Clone, Copy)]
pub enum SeriesEvent<'a> {
    /// A series was generated, resampled or smoothed
    Ready(&'a TimeSeries),
    /// Peak search finished
    PeaksReady {
        series: &'a TimeSeries,
        peaks_us: &'a [u64],
        name: &'a str,
    },
}

impl<'a> SeriesEvent<'a> {
    /// Series the event refers to
    pub fn series(&self) -> &'a TimeSeries {
        match *self {
            SeriesEvent::Ready(series) => series,
            SeriesEvent::PeaksReady { series, .. } => series,
        }
    }
}

/// Receiver of [`SeriesEvent`]s
pub trait SeriesListener: Send + Sync {
    fn on_event(&self, event: &SeriesEvent<'_>);
}

impl<F> SeriesListener for F
where
    F: Fn(&SeriesEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &SeriesEvent<'_>) {
        self(event)
    }
}

/// Token returned by [`EventDispatcher::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(ListenerId, Arc<dyn SeriesListener>)>,
}

/// Shared list of listeners.
///
/// Cloning yields another handle to the same list, so a stage and the code
/// that owns it can subscribe and publish through separate clones.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    inner: Arc<RwLock<Registry>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener; it is called after all earlier subscribers
    pub fn subscribe<L>(&self, listener: L) -> ListenerId
    where
        L: SeriesListener + 'static,
    {
        let mut registry = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Register a closure as a listener
    pub fn subscribe_fn<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&SeriesEvent<'_>) + Send + Sync + 'static,
    {
        self.subscribe(listener)
    }

    /// Remove a listener; returns false if it was not registered
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut registry = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let before = registry.listeners.len();
        registry.listeners.retain(|(existing, _)| *existing != id);
        registry.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).listeners.len()
    }

    /// Deliver `event` to every listener in subscription order
    pub fn publish(&self, event: SeriesEvent<'_>) {
        // Snapshot so listeners may subscribe or unsubscribe while being called
        let listeners: Vec<Arc<dyn SeriesListener>> = {
            let registry = self.inner.read().unwrap_or_else(|e| e.into_inner());
            registry.listeners.iter().map(|(_, l)| Arc::clone(l)).collect()
        };

        trace!(series = event.series().name(), listeners = listeners.len(), "publishing event");
        for listener in listeners {
            listener.on_event(&event);
        }
    }

    pub fn series_ready(&self, series: &TimeSeries) {
        self.publish(SeriesEvent::Ready(series));
    }

    pub fn peaks_ready(&self, series: &TimeSeries, peaks_us: &[u64]) {
        self.publish(SeriesEvent::PeaksReady {
            series,
            peaks_us,
            name: series.name(),
        });
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_listeners_called_in_subscription_order() {
        let dispatcher = EventDispatcher::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            dispatcher.subscribe_fn(move |event: &SeriesEvent<'_>| {
                log.lock().unwrap().push(format!("{}:{}", tag, event.series().name()));
            });
        }

        let series = TimeSeries::new("hip_sensor", "deg");
        dispatcher.series_ready(&series);

        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:hip_sensor", "second:hip_sensor", "third:hip_sensor"]
        );
    }

    #[test]
    fn test_peaks_event_carries_name_and_peaks() {
        let dispatcher = EventDispatcher::new();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        dispatcher.subscribe_fn(move |event: &SeriesEvent<'_>| {
            if let SeriesEvent::PeaksReady { peaks_us, name, .. } = event {
                *sink.lock().unwrap() = Some((name.to_string(), peaks_us.to_vec()));
            }
        });

        let series = TimeSeries::new("imu", "deg/s");
        dispatcher.peaks_ready(&series, &[5, 9]);
        assert_eq!(*seen.lock().unwrap(), Some(("imu".to_string(), vec![5, 9])));
    }

    #[test]
    fn test_unsubscribe_and_shared_clones() {
        let dispatcher = EventDispatcher::new();
        let clone = dispatcher.clone();
        let id = clone.subscribe_fn(|_: &SeriesEvent<'_>| {});
        assert_eq!(dispatcher.listener_count(), 1);
        assert!(dispatcher.unsubscribe(id));
        assert!(!dispatcher.unsubscribe(id));
        assert_eq!(clone.listener_count(), 0);
    }
}
