//! Sprite placement for the ball

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// What crosses the render boundary each cycle: center + fixed radius
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BallFrame {
    pub center: Vec2,
    pub radius: f32,
}

impl BallFrame {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Top-left corner of the square sprite
    #[inline]
    pub fn sprite_origin(&self) -> Vec2 {
        self.center - Vec2::splat(self.radius)
    }

    /// Side length of the square sprite
    #[inline]
    pub fn sprite_size(&self) -> f32 {
        self.radius * 2.0
    }

    pub fn instance(&self) -> SpriteInstance {
        SpriteInstance::new(self.sprite_origin(), self.sprite_size())
    }
}

/// Per-instance sprite rect, laid out for a GPU instance buffer
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    pub origin: [f32; 2],
    pub size: [f32; 2],
}

impl SpriteInstance {
    pub fn new(origin: Vec2, side: f32) -> Self {
        Self {
            origin: origin.to_array(),
            size: [side, side],
        }
    }

    /// Raw bytes of a slice of instances
    pub fn as_bytes(instances: &[SpriteInstance]) -> &[u8] {
        bytemuck::cast_slice(instances)
    }
}
