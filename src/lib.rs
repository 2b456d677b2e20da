//! Tilt Ball - an accelerometer-driven ball in a rectangular viewport
//!
//! Core modules:
//! - `sim`: Kinematic integration and edge reflection (pure, no platform deps)
//! - `session`: Per-view session owning state + viewport, push-style entry points
//! - `renderer`: Render boundary (sprite placement, renderer trait)
//! - `settings`: Data-driven physics tuning
//! - `source`: Sample sources for driving a session without a device

pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;
pub mod source;

pub use session::{CycleOutcome, SampleRejection, Session, SessionStats};
pub use settings::PhysicsSettings;

/// Simulation constants
pub mod consts {
    /// Ball radius in screen units
    pub const BALL_RADIUS: f32 = 150.0;
    /// Scale from physical displacement (meters) to screen units
    pub const DISPLACEMENT_COEF: f32 = 1000.0;
    /// Velocity divisor applied on every edge bounce
    pub const REFLECTION_DAMPING: f32 = 1.5;

    /// Nanoseconds per second (sensor timestamps are in ns)
    pub const NANOS_PER_SEC: f64 = 1_000_000_000.0;
}

/// True if both components are finite
#[inline]
pub fn is_finite_vec(v: glam::Vec2) -> bool {
    v.x.is_finite() && v.y.is_finite()
}
