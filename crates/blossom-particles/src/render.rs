//! Per-frame render pass: background treatment, blend mode, particle draw

use crate::emitter::{EmitterConfig, RenderMode};
use crate::particle::Particle;
use blossom_core::{CompositeMode, DrawSurface, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderPass {
    pub mode: RenderMode,
    pub additive: bool,
}

impl RenderPass {
    pub fn new(mode: RenderMode, additive: bool) -> Self {
        Self { mode, additive }
    }

    pub fn from_config(config: &EmitterConfig) -> Self {
        Self::new(config.render_mode, config.additive)
    }

    /// Draw one frame. Leaves the surface in source-over mode with a global
    /// alpha of 1 so the next frame's background is never blended additively.
    pub fn draw<S: DrawSurface + ?Sized>(&self, surface: &mut S, particles: &[Particle]) {
        surface.set_composite(CompositeMode::SourceOver);
        surface.set_global_alpha(1.0);

        let full = Rect::from_size(surface.size());
        match self.mode {
            RenderMode::Clear { background } => {
                surface.clear();
                if let Some(bg) = background {
                    surface.fill_rect(full, bg);
                }
            }
            RenderMode::Trail { overlay } => surface.fill_rect(full, overlay),
        }

        if self.additive {
            surface.set_composite(CompositeMode::Lighter);
        }
        for p in particles {
            p.render(surface);
        }

        surface.set_composite(CompositeMode::SourceOver);
        surface.set_global_alpha(1.0);
    }
}
