//! Drawing-surface abstraction and the per-frame render step.

mod canvas;

pub use canvas::Canvas;

use serde::{Deserialize, Serialize};

use crate::{
    color::Rgba, config::BACKGROUND, state::SharedVisualState, timeline::Clock, Result,
};

/// Minimal immediate-mode drawing target supplied by the platform layer.
pub trait Surface {
    fn set_color(&mut self, color: Rgba);
    /// Plots one point in the current color. Points off the surface are
    /// ignored.
    fn draw_point(&mut self, x: i32, y: i32);
    fn clear(&mut self, color: Rgba);
    fn present(&mut self);
}

/// What one rendered frame looked like.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameStats {
    /// Unclamped ring radius; negative during long silences.
    pub radius: f32,
    pub ring_points: usize,
    /// Particles drawn this frame, including those that expired on it.
    pub particles_drawn: usize,
    /// Particles still active once the frame finished.
    pub active_particles: usize,
}

/// Render-loop side of the shared visual state.
#[derive(Debug, Clone)]
pub struct FrameRenderer<C: Clock> {
    shared: SharedVisualState,
    clock: C,
}

impl<C: Clock> FrameRenderer<C> {
    pub fn new(shared: SharedVisualState, clock: C) -> Self {
        Self { shared, clock }
    }

    /// Clears, renders the ring and particles under the state lock, then
    /// presents.
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) -> Result<FrameStats> {
        surface.clear(Rgba::from(BACKGROUND));

        let stats = {
            let mut state = self.shared.lock()?;
            let now = self.clock.now_ms();
            state.render_frame(now, surface)
        };

        surface.present();
        Ok(stats)
    }
}
