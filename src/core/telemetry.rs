//! Optional debug sink for `(message, category)` records.
//!
//! The numerical modules never log. Stateful drivers (world, collision
//! manager, octree) hold a [`Telemetry`] handle and emit through it; when no
//! sink is installed the message closure is never evaluated.

use std::fmt;
use std::sync::Arc;

/// Category for tick scheduling and body lifecycle records
pub const CATEGORY_SIMULATION: &str = "simulation";

/// Category for contact and cache records
pub const CATEGORY_COLLISION: &str = "collision";

/// Category for octree split and merge records
pub const CATEGORY_OCTREE: &str = "octree";

/// Category for body construction records
pub const CATEGORY_BODIES: &str = "bodies";

/// Receives debug records. Implementations must not panic or block.
pub trait DebugSink: Send + Sync {
    /// Handles one record
    fn record(&self, message: &str, category: &str);
}

/// Forwards records to the `log` facade at debug level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DebugSink for LogSink {
    fn record(&self, message: &str, category: &str) {
        log::debug!(target: "verlet_physics", "[{}] {}", category, message);
    }
}

/// Cheap, clonable handle to an optional sink
#[derive(Clone, Default)]
pub struct Telemetry {
    sink: Option<Arc<dyn DebugSink>>,
}

impl Telemetry {
    /// A handle that drops every record
    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// A handle that forwards to the `log` crate
    pub fn log() -> Self {
        Self::with_sink(Arc::new(LogSink))
    }

    /// A handle around a custom sink
    pub fn with_sink(sink: Arc<dyn DebugSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Returns true when records are delivered somewhere
    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Emits a record; `message` is only built when a sink is installed
    #[inline]
    pub fn emit<F>(&self, category: &str, message: F)
    where
        F: FnOnce() -> String,
    {
        if let Some(sink) = &self.sink {
            sink.record(&message(), category);
        }
    }
}

impl fmt::Debug for Telemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Telemetry")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(String, String)>>);

    impl DebugSink for Recorder {
        fn record(&self, message: &str, category: &str) {
            if let Ok(mut records) = self.0.lock() {
                records.push((message.to_string(), category.to_string()));
            }
        }
    }

    #[test]
    fn disabled_handle_never_builds_the_message() {
        let telemetry = Telemetry::disabled();
        telemetry.emit(CATEGORY_SIMULATION, || panic!("message built while disabled"));
    }

    #[test]
    fn records_reach_the_sink() {
        let recorder = Arc::new(Recorder::default());
        let telemetry = Telemetry::with_sink(recorder.clone());
        telemetry.emit(CATEGORY_OCTREE, || "split".to_string());
        let records = recorder.0.lock().unwrap();
        assert_eq!(records.as_slice(), &[("split".to_string(), "octree".to_string())]);
    }
}
