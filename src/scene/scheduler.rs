//! Fixed-interval tick scheduling.
//!
//! Two states, stopped and running. `dt` handed to the tick pipeline is
//! always the configured interval, never measured wall-clock time — timer
//! jitter becomes simulation-time error, which is accepted for a
//! soft-realtime visual system.

use crate::error::SceneError;

/// Tick driver state machine. The scene owns one and drives the actual
/// timer loop in [`Scene::run`](crate::scene::Scene::run).
#[derive(Debug)]
pub struct Scheduler {
    interval: f32,
    running: bool,
}

impl Scheduler {
    pub(crate) fn new() -> Self {
        Self {
            interval: 0.0,
            running: false,
        }
    }

    /// Stopped -> running. Returns `Ok(false)` without touching anything
    /// when already running, so a double start can never create a second
    /// tick source.
    pub(crate) fn start(&mut self, interval: f32) -> Result<bool, SceneError> {
        if !interval.is_finite() || interval <= 0.0 {
            return Err(SceneError::InvalidInterval(interval));
        }
        if self.running {
            return Ok(false);
        }
        self.interval = interval;
        self.running = true;
        Ok(true)
    }

    /// Running -> stopped. Returns whether a transition happened.
    pub(crate) fn stop(&mut self) -> bool {
        let was_running = self.running;
        self.running = false;
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The configured tick interval in seconds (zero before the first start).
    pub fn interval(&self) -> f32 {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_validates_interval() {
        let mut scheduler = Scheduler::new();
        assert!(matches!(
            scheduler.start(0.0),
            Err(SceneError::InvalidInterval(_))
        ));
        assert!(matches!(
            scheduler.start(-1.0),
            Err(SceneError::InvalidInterval(_))
        ));
        assert!(matches!(
            scheduler.start(f32::NAN),
            Err(SceneError::InvalidInterval(_))
        ));
        assert!(matches!(
            scheduler.start(f32::INFINITY),
            Err(SceneError::InvalidInterval(_))
        ));
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_double_start_is_idempotent() {
        let mut scheduler = Scheduler::new();
        assert_eq!(scheduler.start(0.1).unwrap(), true);
        assert_eq!(scheduler.start(0.5).unwrap(), false);
        // the second start did not replace the interval
        assert_eq!(scheduler.interval(), 0.1);
    }

    #[test]
    fn test_double_stop_is_a_noop() {
        let mut scheduler = Scheduler::new();
        scheduler.start(0.1).unwrap();
        assert!(scheduler.stop());
        assert!(!scheduler.stop());
        assert!(!scheduler.is_running());
    }

    #[test]
    fn test_restart_after_stop() {
        let mut scheduler = Scheduler::new();
        scheduler.start(0.1).unwrap();
        scheduler.stop();
        assert_eq!(scheduler.start(0.2).unwrap(), true);
        assert_eq!(scheduler.interval(), 0.2);
    }
}
