//! Inelastic reflection at the viewport edges
//!
//! Each axis is tested on its own. The ball bounces off an edge only when its
//! rim is past the edge *and* the step was heading further out; a ball that is
//! already moving back inside is left alone.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::integrate::Candidate;
use super::state::Viewport;

/// Which bound of an axis was hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Edge {
    /// The 0 bound (left / top)
    Near,
    /// The extent bound (right / bottom)
    Far,
}

/// Edges hit during one cycle, per axis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeHits {
    pub x: Option<Edge>,
    pub y: Option<Edge>,
}

impl EdgeHits {
    pub fn any(&self) -> bool {
        self.x.is_some() || self.y.is_some()
    }

    pub fn count(&self) -> u32 {
        u32::from(self.x.is_some()) + u32::from(self.y.is_some())
    }
}

/// Committed ball state after edge handling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reflection {
    pub position: Vec2,
    pub velocity: Vec2,
    pub hits: EdgeHits,
}

/// Reflect a single axis.
///
/// Returns the (possibly clamped) position, the (possibly inverted and
/// attenuated) velocity and the edge that was hit.
pub fn reflect_axis(
    position: f32,
    velocity: f32,
    displacement: f32,
    extent: f32,
    radius: f32,
    damping: f32,
) -> (f32, f32, Option<Edge>) {
    if position - radius < 0.0 && displacement < 0.0 {
        (radius, -velocity / damping, Some(Edge::Near))
    } else if position + radius > extent && displacement > 0.0 {
        (extent - radius, -velocity / damping, Some(Edge::Far))
    } else {
        (position, velocity, None)
    }
}

/// Apply edge reflection to an integrated candidate
pub fn reflect(candidate: &Candidate, viewport: &Viewport, radius: f32, damping: f32) -> Reflection {
    let extent = viewport.extent();

    let (px, vx, hit_x) = reflect_axis(
        candidate.position.x,
        candidate.velocity.x,
        candidate.displacement.x,
        extent.x,
        radius,
        damping,
    );
    let (py, vy, hit_y) = reflect_axis(
        candidate.position.y,
        candidate.velocity.y,
        candidate.displacement.y,
        extent.y,
        radius,
        damping,
    );

    Reflection {
        position: Vec2::new(px, py),
        velocity: Vec2::new(vx, vy),
        hits: EdgeHits { x: hit_x, y: hit_y },
    }
}
