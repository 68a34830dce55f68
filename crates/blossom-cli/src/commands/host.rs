//! Shared headless host: effect loading, mounting and the frame loop

use anyhow::{Context, Result};
use blossom_core::{DrawSurface, Size, Vec2};
use blossom_particles::{presets, Effect, EmitterConfig};
use blossom_runtime::{InputEvent, Stage};

/// Options common to every command that runs effects
#[derive(Debug, Clone)]
pub struct HostArgs {
    pub presets: Vec<String>,
    pub configs: Vec<String>,
    pub frames: u32,
    pub seed: u32,
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
    pub pointer: bool,
    pub click_every: u32,
}

impl HostArgs {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Presets and config files named on the command line, in that order.
/// With neither, every built-in preset is loaded.
pub fn load_configs(args: &HostArgs) -> Result<Vec<EmitterConfig>> {
    let mut configs = Vec::new();
    for name in &args.presets {
        configs.push(presets::by_name(name)?);
    }
    for path in &args.configs {
        let config = EmitterConfig::load(path)
            .with_context(|| format!("Failed to load effect config {}", path))?;
        configs.push(config);
    }
    if configs.is_empty() {
        for name in presets::NAMES {
            configs.push(presets::by_name(name)?);
        }
    }
    Ok(configs)
}

/// Mount one effect per config, each with its own surface and seed
pub fn mount<S, F>(
    configs: Vec<EmitterConfig>,
    seed: u32,
    mut acquire: F,
) -> Result<Stage<Effect<S>>>
where
    S: DrawSurface,
    F: FnMut(&EmitterConfig) -> blossom_core::Result<S>,
{
    let mut stage = Stage::new();
    for (i, config) in configs.into_iter().enumerate() {
        let surface = acquire(&config);
        log::info!(
            "[host] mounting {} ({})",
            config.name,
            config.emission.label()
        );
        let effect = Effect::new(config, surface, seed.wrapping_add(i as u32))?;
        stage.mount(effect);
    }
    Ok(stage)
}

/// Synthetic pointer: a Lissajous curve across the viewport
pub struct PointerPath {
    size: Size,
    click_every: u32,
}

impl PointerPath {
    pub fn new(size: Size, click_every: u32) -> Self {
        Self { size, click_every }
    }

    pub fn position(&self, frame: u32) -> Vec2 {
        let t = frame as f32;
        Vec2::new(
            self.size.width * (0.5 + 0.35 * (t * 0.05).sin()),
            self.size.height * (0.5 + 0.3 * (t * 0.07).sin()),
        )
    }

    /// Events to deliver before `frame` is pumped
    pub fn events(&self, frame: u32) -> Vec<InputEvent> {
        let position = self.position(frame);
        let mut events = vec![InputEvent::PointerMove { position }];
        if self.click_every > 0 && (frame + 1) % self.click_every == 0 {
            events.push(InputEvent::PointerClick { position });
        }
        events
    }
}

/// Start every effect, deliver the initial resize, then run `args.frames`
/// frames at 60Hz. `observe` is called after each frame with its index.
pub fn run<S, F>(stage: &mut Stage<Effect<S>>, args: &HostArgs, mut observe: F) -> Result<()>
where
    S: DrawSurface,
    F: FnMut(u32, &Stage<Effect<S>>),
{
    stage.start_all().context("Failed to start effects")?;
    stage.dispatch(InputEvent::Resize {
        size: args.size(),
        device_pixel_ratio: args.dpr,
    })?;

    let pointer = args
        .pointer
        .then(|| PointerPath::new(args.size(), args.click_every));

    for frame in 0..args.frames {
        if let Some(path) = &pointer {
            for event in path.events(frame) {
                stage.dispatch(event)?;
            }
        }
        stage.pump_frame(frame as f64 / 60.0)?;
        observe(frame, stage);
    }
    Ok(())
}
