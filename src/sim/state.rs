//! Simulation state and input types
//!
//! Everything the physics reads or writes between two samples lives here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis carrying the largest acceleration magnitude in a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DominantAxis {
    X,
    Y,
    /// Also the fallback when no axis strictly dominates
    Z,
}

impl DominantAxis {
    /// Classify by strict magnitude dominance; ties fall through to Z
    pub fn classify(x: f32, y: f32, z: f32) -> Self {
        let (ax, ay, az) = (x.abs(), y.abs(), z.abs());
        if ax > ay && ax > az {
            DominantAxis::X
        } else if ay > ax && ay > az {
            DominantAxis::Y
        } else {
            DominantAxis::Z
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DominantAxis::X => "X",
            DominantAxis::Y => "Y",
            DominantAxis::Z => "Z",
        }
    }
}

/// One accelerometer reading (m/s², device axes)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelerationSample {
    pub x: f32,
    pub y: f32,
    /// Not used by the planar physics
    #[serde(default)]
    pub z: f32,
    /// Monotonic sensor clock, nanoseconds
    pub timestamp_nanos: i64,
}

impl AccelerationSample {
    pub fn new(x: f32, y: f32, z: f32, timestamp_nanos: i64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_nanos,
        }
    }

    /// Planar acceleration (x, y)
    #[inline]
    pub fn acceleration(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// All three components are finite
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }

    pub fn dominant_axis(&self) -> DominantAxis {
        DominantAxis::classify(self.x, self.y, self.z)
    }
}

/// Drawable area bounding the ball.
///
/// Coordinates are absolute with the origin at the top-left corner: the
/// playfield spans `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    /// Returns `None` unless both dimensions are finite and positive
    pub fn new(width: f32, height: f32) -> Option<Self> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if valid(width) && valid(height) {
            Some(Self { width, height })
        } else {
            None
        }
    }

    /// Far bound per axis
    #[inline]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.extent() * 0.5
    }

    /// Whether a ball of `radius` fits between the near and far bounds
    pub fn fits(&self, radius: f32) -> bool {
        2.0 * radius <= self.width && 2.0 * radius <= self.height
    }
}

/// Position/velocity of the ball plus the timestamp of the last absorbed sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Ball center, screen units
    pub position: Vec2,
    /// Physical velocity (m/s, unscaled)
    pub velocity: Vec2,
    /// `None` until a first sample establishes the time base
    pub last_sample_time_nanos: Option<i64>,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            last_sample_time_nanos: None,
        }
    }
}

impl SimulationState {
    /// Fresh state with the ball at rest in the middle of `viewport`
    pub fn centered(viewport: &Viewport) -> Self {
        Self {
            position: viewport.center(),
            ..Self::default()
        }
    }

    /// Re-center, stop the ball and forget the time base
    pub fn reset(&mut self, viewport: &Viewport) {
        *self = Self::centered(viewport);
    }

    /// Forget the time base only; the next sample becomes a warm-up
    pub fn clear_time_base(&mut self) {
        self.last_sample_time_nanos = None;
    }

    /// True once a sample has established the time base
    pub fn is_warm(&self) -> bool {
        self.last_sample_time_nanos.is_some()
    }

    /// Store the result of one full integrate + reflect cycle
    pub fn commit(&mut self, position: Vec2, velocity: Vec2, timestamp_nanos: i64) {
        self.position = position;
        self.velocity = velocity;
        self.last_sample_time_nanos = Some(timestamp_nanos);
    }
}
