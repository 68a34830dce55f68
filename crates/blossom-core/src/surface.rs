//! 2D drawing surface contract
//!
//! Modeled on a canvas 2D context: a transform stack (translate/rotate, with the
//! device-pixel-ratio scale as the base transform), a global alpha, and a
//! composite mode. Coordinates passed in are logical pixels.

use crate::types::{Color, Rect, Size, Vec2};

/// How drawn pixels combine with what is already on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositeMode {
    /// Normal alpha compositing
    #[default]
    SourceOver,
    /// Additive: overlapping colors sum toward white
    Lighter,
    /// `1 - (1 - src)(1 - dst)`: never darkens what lies beneath
    Screen,
}

pub trait DrawSurface {
    /// Logical size (what particles are laid out against)
    fn size(&self) -> Size;

    /// Backing-store size in device pixels
    fn pixel_size(&self) -> (u32, u32);

    /// Resynchronize dimensions. Resets the transform stack to the
    /// device-pixel-ratio base scale; contents may be discarded.
    fn resize(&mut self, size: Size, device_pixel_ratio: f32);

    /// Clear every pixel to fully transparent
    fn clear(&mut self);

    /// Fill a rectangle with `color`, honoring global alpha and composite mode
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Fill an axis-aligned ellipse in the current coordinate space
    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color);

    /// Push transform, global alpha and composite mode
    fn save(&mut self);

    /// Pop the state pushed by the matching `save`
    fn restore(&mut self);

    fn translate(&mut self, offset: Vec2);

    /// Rotate the current coordinate space by `angle` radians
    fn rotate(&mut self, angle: f32);

    fn set_global_alpha(&mut self, alpha: f32);

    fn set_composite(&mut self, mode: CompositeMode);

    /// Fill a circle; shorthand for an ellipse with equal radii
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.fill_ellipse(center, Vec2::new(radius, radius), color);
    }
}
