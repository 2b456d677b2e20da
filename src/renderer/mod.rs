//! Render boundary
//!
//! The core never draws. Each committed cycle hands a `BallFrame` to whatever
//! `Renderer` the platform supplies.

pub mod sprite;

pub use sprite::{BallFrame, SpriteInstance};

/// Paints the ball; implemented by the platform layer
pub trait Renderer {
    fn draw_ball(&mut self, frame: &BallFrame);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn draw_ball(&mut self, frame: &BallFrame) {
        (**self).draw_ball(frame);
    }
}

/// Drops every frame (headless sessions)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_ball(&mut self, _frame: &BallFrame) {}
}

/// Keeps every frame it is handed, newest last
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pub frames: Vec<BallFrame>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&BallFrame> {
        self.frames.last()
    }

    /// Instance records for every recorded frame, ready for upload
    pub fn instances(&self) -> Vec<SpriteInstance> {
        self.frames.iter().map(BallFrame::instance).collect()
    }
}

impl Renderer for RecordingRenderer {
    fn draw_ball(&mut self, frame: &BallFrame) {
        self.frames.push(*frame);
    }
}
