//! Closed-form 1-D trajectories under constant acceleration.
//!
//! Used for ballistic motions (jumps): construct once, feed it the tick
//! `dt`, and read back position/velocity samples. Threshold crossings are
//! reported through the trajectory's event bus at the exact or last safe
//! time before the crossing:
//!
//! - `MaxVelocity`      the projected velocity would exceed `max_v`
//! - `MaxTime`          the projected time would exceed `max_t`
//! - `ReturnedToStart`  the position crossed back through its start
//!
//! `reset` zeroes the clock only, so one trajectory can drive repeated arcs
//! without being rebuilt.

use serde::{Deserialize, Serialize};

use crate::events::{Event, EventBus, TrajectoryEvent, TrajectoryEventKind};

/// Immutable trajectory parameters.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TrajectorySettings {
    /// Starting position.
    pub x: f32,
    /// Initial velocity.
    pub v: f32,
    /// Constant acceleration.
    pub a: f32,
    /// Time ceiling; `calc` past it emits `MaxTime` and stops advancing.
    pub max_t: Option<f32>,
    /// Velocity ceiling; `calc` past it emits `MaxVelocity` and stops advancing.
    pub max_v: Option<f32>,
    /// When true, samples clamp to the exact return-time position once the
    /// trajectory crosses back through its start.
    pub return_to_start: bool,
}

/// Position and velocity at a point in trajectory time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: f32,
    pub velocity: f32,
}

/// A 1-D constant-acceleration trajectory with threshold events.
pub struct Trajectory {
    t: f32,
    x0: f32,
    v0: f32,
    a: f32,
    max_t: Option<f32>,
    max_v: Option<f32>,
    return_to_start: bool,
    return_time: Option<f32>,
    events: EventBus<Trajectory, TrajectoryEvent>,
}

impl Trajectory {
    pub fn new(settings: TrajectorySettings) -> Self {
        let TrajectorySettings {
            x, v, a, max_t, max_v, return_to_start,
        } = settings;
        let disc = v * v - 4.0 * x * a;
        let return_time = if a != 0.0 && disc > 0.0 {
            let root = disc.sqrt();
            let plus = (-v + root) / (2.0 * a);
            // the positive-root expression collapses to zero whenever the
            // trajectory starts at x0 (e.g. every jump); the other root is
            // the crossing we want
            Some(if plus != 0.0 {
                plus
            } else {
                (-v - root) / (2.0 * a)
            })
        } else {
            None
        };
        Self {
            t: 0.0,
            x0: x,
            v0: v,
            a,
            max_t,
            max_v,
            return_to_start,
            return_time,
            events: EventBus::new(),
        }
    }

    /// Position/velocity at trajectory time `t`.
    ///
    /// The velocity term is `v0 + a*t/2`, not the textbook `v0 + a*t`;
    /// jump tuning depends on the observed behavior, so it stays.
    fn eval(&self, t: f32) -> Sample {
        Sample {
            position: self.x0 + self.v0 * t + self.a * t * t,
            velocity: self.v0 + self.a * t / 2.0,
        }
    }

    /// Register a handler for one or more event kinds. Handlers receive the
    /// trajectory itself and may call [`reset`](Self::reset) to start the
    /// next arc.
    pub fn on<F>(&mut self, kinds: &[TrajectoryEventKind], handler: F)
    where
        F: FnMut(&mut Trajectory, &TrajectoryEvent) + 'static,
    {
        self.events.on(kinds, handler);
    }

    fn emit(&mut self, event: &TrajectoryEvent) {
        for handler in self.events.handlers_for(event.kind()) {
            (&mut *handler.borrow_mut())(self, event);
        }
    }

    /// Advance the clock by `dt` and return the sample at the new time —
    /// unless a threshold blocks the advance, in which case every
    /// applicable event fires and the sample at the unadvanced time is
    /// returned. With `return_to_start` set, crossing the return time
    /// instead returns the exact return-time sample (and keeps doing so
    /// until `reset`).
    pub fn calc(&mut self, dt: f32) -> Sample {
        let next_t = self.t + dt;
        let next = self.eval(next_t);
        let mut advance = true;

        if let Some(max_v) = self.max_v {
            if next.velocity > max_v {
                self.emit(&TrajectoryEvent::MaxVelocity);
                advance = false;
            }
        }
        if let Some(max_t) = self.max_t {
            if next_t > max_t {
                self.emit(&TrajectoryEvent::MaxTime);
                advance = false;
            }
        }
        if let Some(return_time) = self.return_time {
            if next_t.abs() > return_time.abs() {
                let landing = self.eval(return_time);
                self.emit(&TrajectoryEvent::ReturnedToStart {
                    position: landing.position,
                    dt: return_time - self.t,
                });
                if self.return_to_start {
                    return landing;
                }
            }
        }

        if advance {
            self.t = next_t;
        }
        self.eval(self.t)
    }

    /// Zero the clock; all derived parameters (including the return time)
    /// are untouched.
    pub fn reset(&mut self) {
        self.t = 0.0;
    }

    /// Current trajectory time.
    pub fn time(&self) -> f32 {
        self.t
    }

    /// Time at which the position returns to its start, when one exists.
    pub fn return_time(&self) -> Option<f32> {
        self.return_time
    }
}
