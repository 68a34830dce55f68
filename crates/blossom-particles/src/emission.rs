//! Emission policies: when, where and how many particles are spawned

use crate::emitter::{EmissionKind, EmitterConfig};
use crate::rand::ParticleRng;
use blossom_core::{Rect, Size, Vec2};
use blossom_runtime::{InputEvent, InputKind};

/// Where the particles of one request start
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnOrigin {
    /// Every particle starts exactly here
    Point(Vec2),
    /// Each particle draws its own uniform point inside the rectangle
    Region(Rect),
}

/// A batch of identical-template particles to append to the active set
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpawnRequest {
    pub origin: SpawnOrigin,
    pub count: u32,
    /// Index into the effect's templates
    pub template: usize,
}

/// What a policy knows about the frame being emitted into
#[derive(Clone, Copy, Debug)]
pub struct FrameContext {
    pub viewport: Size,
    /// Frames run since `start()`
    pub frame: u64,
}

pub trait EmissionPolicy {
    /// Requests made once when the effect starts
    fn initial(&mut self, _ctx: &FrameContext, _rng: &mut ParticleRng) -> Vec<SpawnRequest> {
        Vec::new()
    }

    /// Requests for the current frame, before the simulation step
    fn decide(&mut self, ctx: &FrameContext, rng: &mut ParticleRng) -> Vec<SpawnRequest>;

    /// Requests triggered synchronously by an input event
    fn on_input(&mut self, _event: &InputEvent) -> Vec<SpawnRequest> {
        Vec::new()
    }

    /// Input kinds (besides resize) this policy needs subscriptions for
    fn input_kinds(&self) -> &'static [InputKind] {
        &[]
    }

    /// Forget accumulated state; called on `stop()`
    fn reset(&mut self);

    fn name(&self) -> &'static str;
}

/// Build the policy an `EmitterConfig` asks for
pub fn policy_for(config: &EmitterConfig) -> Box<dyn EmissionPolicy> {
    match config.emission {
        EmissionKind::Ambient { target_count } => Box::new(AmbientPolicy::new(target_count)),
        EmissionKind::Burst {
            probability,
            burst_size,
            region,
        } => Box::new(BurstPolicy::new(probability, burst_size, region)),
        EmissionKind::Pointer {
            move_count,
            click_count,
            trail_template,
            burst_template,
        } => Box::new(PointerPolicy::new(
            move_count,
            click_count,
            trail_template,
            burst_template,
        )),
    }
}

/// Continuous-ambient: fill up to `target_count` once, above the viewport
#[derive(Debug, Clone)]
pub struct AmbientPolicy {
    pub target_count: u32,
    frames: u64,
}

impl AmbientPolicy {
    pub fn new(target_count: u32) -> Self {
        Self {
            target_count,
            frames: 0,
        }
    }
}

impl EmissionPolicy for AmbientPolicy {
    fn initial(&mut self, ctx: &FrameContext, _rng: &mut ParticleRng) -> Vec<SpawnRequest> {
        let Size { width, height } = ctx.viewport;
        vec![SpawnRequest {
            origin: SpawnOrigin::Region(Rect::new(0.0, -height, width, height)),
            count: self.target_count,
            template: 0,
        }]
    }

    fn decide(&mut self, _ctx: &FrameContext, _rng: &mut ParticleRng) -> Vec<SpawnRequest> {
        self.frames += 1;
        Vec::new()
    }

    fn reset(&mut self) {
        self.frames = 0;
    }

    fn name(&self) -> &'static str {
        "ambient"
    }
}

/// Timer-probabilistic: a Bernoulli trial per frame, one burst per success
#[derive(Debug, Clone)]
pub struct BurstPolicy {
    pub probability: f32,
    pub burst_size: u32,
    /// Fractions of the viewport bursts may appear in
    pub region: Rect,
    frames: u64,
    bursts: u64,
}

impl BurstPolicy {
    pub fn new(probability: f32, burst_size: u32, region: Rect) -> Self {
        Self {
            probability,
            burst_size,
            region,
            frames: 0,
            bursts: 0,
        }
    }

    /// Bursts fired since the last reset
    pub fn bursts(&self) -> u64 {
        self.bursts
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl EmissionPolicy for BurstPolicy {
    fn decide(&mut self, ctx: &FrameContext, rng: &mut ParticleRng) -> Vec<SpawnRequest> {
        self.frames += 1;
        if !rng.chance(self.probability) {
            return Vec::new();
        }
        self.bursts += 1;

        let Size { width, height } = ctx.viewport;
        let area = Rect::new(
            self.region.x * width,
            self.region.y * height,
            self.region.width * width,
            self.region.height * height,
        );
        vec![SpawnRequest {
            origin: SpawnOrigin::Point(rng.point_in(area)),
            count: self.burst_size,
            template: 0,
        }]
    }

    fn reset(&mut self) {
        self.frames = 0;
        self.bursts = 0;
    }

    fn name(&self) -> &'static str {
        "burst"
    }
}

/// Input-driven: a trail batch per pointer move, a burst per click
#[derive(Debug, Clone)]
pub struct PointerPolicy {
    pub move_count: u32,
    pub click_count: u32,
    pub trail_template: usize,
    pub burst_template: usize,
    last_pointer: Option<Vec2>,
}

impl PointerPolicy {
    pub fn new(move_count: u32, click_count: u32, trail_template: usize, burst_template: usize) -> Self {
        Self {
            move_count,
            click_count,
            trail_template,
            burst_template,
            last_pointer: None,
        }
    }

    pub fn last_pointer(&self) -> Option<Vec2> {
        self.last_pointer
    }
}

impl EmissionPolicy for PointerPolicy {
    fn decide(&mut self, _ctx: &FrameContext, _rng: &mut ParticleRng) -> Vec<SpawnRequest> {
        Vec::new()
    }

    fn on_input(&mut self, event: &InputEvent) -> Vec<SpawnRequest> {
        let (position, count, template) = match *event {
            InputEvent::PointerMove { position } => (position, self.move_count, self.trail_template),
            InputEvent::PointerClick { position } => {
                (position, self.click_count, self.burst_template)
            }
            InputEvent::Resize { .. } => return Vec::new(),
        };
        self.last_pointer = Some(position);
        vec![SpawnRequest {
            origin: SpawnOrigin::Point(position),
            count,
            template,
        }]
    }

    fn input_kinds(&self) -> &'static [InputKind] {
        &[InputKind::PointerMove, InputKind::PointerClick]
    }

    fn reset(&mut self) {
        self.last_pointer = None;
    }

    fn name(&self) -> &'static str {
        "pointer"
    }
}
