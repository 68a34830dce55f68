//! Surface that records draw calls instead of rasterizing them

use crate::affine::Affine;
use blossom_core::{Color, CompositeMode, DrawSurface, Rect, Size, Vec2};

/// An ellipse fill resolved to logical viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseFill {
    /// Center after the current transform
    pub center: Vec2,
    pub radii: Vec2,
    /// Accumulated rotation in radians
    pub rotation: f32,
    pub color: Color,
    pub alpha: f32,
    pub composite: CompositeMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Resize {
        size: Size,
        device_pixel_ratio: f32,
    },
    Clear,
    FillRect {
        rect: Rect,
        color: Color,
        alpha: f32,
        composite: CompositeMode,
    },
    FillEllipse(EllipseFill),
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    SetGlobalAlpha(f32),
    SetComposite(CompositeMode),
}

#[derive(Debug, Clone, Copy)]
struct State {
    transform: Affine,
    rotation: f32,
    alpha: f32,
    composite: CompositeMode,
}

impl Default for State {
    fn default() -> Self {
        Self {
            transform: Affine::IDENTITY,
            rotation: 0.0,
            alpha: 1.0,
            composite: CompositeMode::SourceOver,
        }
    }
}

/// Records every call made through `DrawSurface`, tracking transform,
/// alpha and composite state so fills can be inspected in viewport space.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    size: Size,
    dpr: f32,
    state: State,
    stack: Vec<State>,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            dpr: 1.0,
            state: State::default(),
            stack: Vec::new(),
            commands: Vec::new(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain the recorded commands, keeping the current state
    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn ellipses(&self) -> impl Iterator<Item = &EllipseFill> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillEllipse(fill) => Some(fill),
            _ => None,
        })
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.alpha
    }

    pub fn composite(&self) -> CompositeMode {
        self.state.composite
    }

    /// Depth of the save stack; zero when every save was restored
    pub fn save_depth(&self) -> usize {
        self.stack.len()
    }

    pub fn device_pixel_ratio(&self) -> f32 {
        self.dpr
    }
}

impl DrawSurface for RecordingSurface {
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
        self.state = State::default();
        self.stack.clear();
        self.commands.push(DrawCommand::Resize {
            size,
            device_pixel_ratio,
        });
    }

    fn clear(&mut self) {
        self.commands.push(DrawCommand::Clear);
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            rect,
            color,
            alpha: self.state.alpha,
            composite: self.state.composite,
        });
    }

    fn fill_ellipse(&mut self, center: Vec2, radii: Vec2, color: Color) {
        self.commands.push(DrawCommand::FillEllipse(EllipseFill {
            center: self.state.transform.apply(center),
            radii,
            rotation: self.state.rotation,
            color,
            alpha: self.state.alpha,
            composite: self.state.composite,
        }));
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.state.transform = self.state.transform.translate(offset);
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn rotate(&mut self, angle: f32) {
        self.state.transform = self.state.transform.rotate(angle);
        self.state.rotation += angle;
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        self.state.alpha = alpha;
        self.commands.push(DrawCommand::SetGlobalAlpha(alpha));
    }

    fn set_composite(&mut self, mode: CompositeMode) {
        self.state.composite = mode;
        self.commands.push(DrawCommand::SetComposite(mode));
    }
}
