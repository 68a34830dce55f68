//! Headless effect-to-PNG render command

use super::host::{self, HostArgs};
use anyhow::{Context, Result};
use blossom_core::{Color, DrawSurface, Rect};
use blossom_particles::Effect;
use blossom_render::RasterSurface;
use blossom_runtime::{FrameSystem, Stage};
use std::path::Path;

pub struct RenderArgs {
    pub host: HostArgs,
    pub output: String,
    /// Page color behind every effect layer
    pub background: String,
}

/// Run the effects and flatten their final frames onto one surface, each
/// with its configured layer blend
pub fn render_frame(args: &RenderArgs) -> Result<RasterSurface> {
    let host_args = &args.host;
    let background = Color::parse(&args.background)
        .with_context(|| format!("Invalid background color '{}'", args.background))?;
    let configs = host::load_configs(host_args)?;
    let size = host_args.size();

    let mut stage: Stage<Effect<RasterSurface>> =
        host::mount(configs, host_args.seed, |_| RasterSurface::new(size, 1.0))?;
    host::run(&mut stage, host_args, |_, _| {})?;

    let mut page = RasterSurface::new(size, host_args.dpr)
        .context("Failed to allocate output image")?;
    page.fill_rect(Rect::from_size(size), background);
    for effect in stage.systems() {
        match effect.surface() {
            Some(layer) => page.composite_layer(layer, effect.config().layer_blend),
            None => println!("Warning: effect '{}' has no surface; skipped", effect.name()),
        }
    }
    Ok(page)
}

pub fn run(args: RenderArgs) -> Result<()> {
    let page = render_frame(&args)?;
    page.save_png(Path::new(&args.output))
        .with_context(|| format!("Failed to save image to {}", args.output))?;

    let (width, height) = page.pixel_size();
    println!(
        "Rendered {} frame(s) to {}x{} image {}",
        args.host.frames, width, height, args.output
    );
    Ok(())
}
