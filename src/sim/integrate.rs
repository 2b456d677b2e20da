//! Constant-acceleration integration between two samples
//!
//! The acceleration of the newest sample is assumed to hold over the whole
//! interval since the previous one:
//!
//! ```text
//! d  = v * dt + a * dt² / 2
//! v' = v + a * dt
//! p' = p + d * coef
//! ```

use glam::Vec2;

use super::state::{AccelerationSample, SimulationState};
use crate::consts::NANOS_PER_SEC;

/// A sample arrived with a timestamp older than the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeAnomaly {
    pub previous_nanos: i64,
    pub received_nanos: i64,
}

impl TimeAnomaly {
    /// How far the clock went backwards
    pub fn backwards_nanos(&self) -> i64 {
        self.previous_nanos.saturating_sub(self.received_nanos)
    }
}

/// Integrated but not yet reflected ball state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Unreflected position, screen units
    pub position: Vec2,
    /// Velocity after applying this sample's acceleration
    pub velocity: Vec2,
    /// Raw displacement before scaling; its sign drives the edge tests
    pub displacement: Vec2,
    /// Elapsed seconds actually used (0 when the clock went backwards)
    pub dt: f32,
    pub timestamp_nanos: i64,
    pub anomaly: Option<TimeAnomaly>,
}

/// Outcome of feeding one sample to the integrator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Integration {
    /// First sample since creation/reset; only the time base was established
    WarmUp { timestamp_nanos: i64 },
    /// A full step; reflect, commit and render
    Step(Candidate),
}

/// Elapsed seconds between two sensor timestamps, clamped at zero
fn elapsed_secs(previous_nanos: i64, sample_nanos: i64) -> (f32, Option<TimeAnomaly>) {
    if sample_nanos < previous_nanos {
        let anomaly = TimeAnomaly {
            previous_nanos,
            received_nanos: sample_nanos,
        };
        return (0.0, Some(anomaly));
    }
    let delta = sample_nanos.saturating_sub(previous_nanos);
    ((delta as f64 / NANOS_PER_SEC) as f32, None)
}

/// Advance `state` by `sample` without touching it.
///
/// The y displacement reuses the *x* velocity component. This reproduces the
/// reference trajectory exactly; changing it to `velocity.y` alters the
/// simulated motion whenever the two components differ.
pub fn integrate(state: &SimulationState, sample: &AccelerationSample, coef: f32) -> Integration {
    let Some(previous_nanos) = state.last_sample_time_nanos else {
        return Integration::WarmUp {
            timestamp_nanos: sample.timestamp_nanos,
        };
    };

    let (dt, anomaly) = elapsed_secs(previous_nanos, sample.timestamp_nanos);
    let accel = sample.acceleration();
    let v = state.velocity;

    let displacement = Vec2::new(
        v.x * dt + 0.5 * accel.x * dt * dt,
        v.x * dt + 0.5 * accel.y * dt * dt,
    );

    Integration::Step(Candidate {
        position: state.position + displacement * coef,
        velocity: v + accel * dt,
        displacement,
        dt,
        timestamp_nanos: sample.timestamp_nanos,
        anomaly,
    })
}
