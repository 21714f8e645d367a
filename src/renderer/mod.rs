//! Rendering seam
//!
//! The core never draws. Each frame it builds a `FrameView` and hands it to
//! whatever `RenderSurface` the engine was given.

pub mod view;

pub use view::{FrameView, HudView, NameEntryView, SymbolSprite};

/// Rendering collaborator
pub trait RenderSurface {
    fn present(&mut self, frame: &FrameView);
}

/// Surface that drops every frame (headless runs)
#[derive(Debug, Default)]
pub struct NullSurface {
    /// Frames presented so far
    pub frames: u64,
}

impl RenderSurface for NullSurface {
    fn present(&mut self, _frame: &FrameView) {
        self.frames += 1;
    }
}
