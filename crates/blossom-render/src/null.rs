//! Surface that only counts what would have been drawn

use blossom_core::{Color, CompositeMode, DrawSurface, Rect, Size, Vec2};

/// Draw-call counters for headless simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub clears: u64,
    pub rect_fills: u64,
    pub ellipse_fills: u64,
    /// Ellipse fills made in additive mode
    pub additive_fills: u64,
    pub resizes: u64,
}

#[derive(Debug, Clone)]
pub struct NullSurface {
    size: Size,
    dpr: f32,
    composite: CompositeMode,
    stack: Vec<CompositeMode>,
    stats: DrawStats,
}

impl NullSurface {
    pub fn new(size: Size, device_pixel_ratio: f32) -> Self {
        Self {
            size,
            dpr: device_pixel_ratio,
            composite: CompositeMode::SourceOver,
            stack: Vec::new(),
            stats: DrawStats::default(),
        }
    }

    pub fn stats(&self) -> DrawStats {
        self.stats
    }
}

impl DrawSurface for NullSurface {
    fn size(&self) -> Size {
        self.size
    }

    fn pixel_size(&self) -> (u32, u32) {
        (
            (self.size.width * self.dpr).round().max(0.0) as u32,
            (self.size.height * self.dpr).round().max(0.0) as u32,
        )
    }

    fn resize(&mut self, size: Size, device_pixel_ratio: f32) {
        self.size = size;
        self.dpr = device_pixel_ratio;
        self.composite = CompositeMode::SourceOver;
        self.stack.clear();
        self.stats.resizes += 1;
    }

    fn clear(&mut self) {
        self.stats.clears += 1;
    }

    fn fill_rect(&mut self, _rect: Rect, _color: Color) {
        self.stats.rect_fills += 1;
    }

    fn fill_ellipse(&mut self, _center: Vec2, _radii: Vec2, _color: Color) {
        self.stats.ellipse_fills += 1;
        if self.composite == CompositeMode::Lighter {
            self.stats.additive_fills += 1;
        }
    }

    fn save(&mut self) {
        self.stack.push(self.composite);
    }

    fn restore(&mut self) {
        if let Some(mode) = self.stack.pop() {
            self.composite = mode;
        }
    }

    fn translate(&mut self, _offset: Vec2) {}

    fn rotate(&mut self, _angle: f32) {}

    fn set_global_alpha(&mut self, _alpha: f32) {}

    fn set_composite(&mut self, mode: CompositeMode) {
        self.composite = mode;
    }
}
