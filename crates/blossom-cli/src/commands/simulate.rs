//! Headless simulation command: run effects and report particle statistics

use super::host::{self, HostArgs};
use anyhow::Result;
use blossom_core::DrawSurface;
use blossom_particles::Effect;
use blossom_render::NullSurface;
use blossom_runtime::{FrameSystem, Stage};
use serde::Serialize;

pub struct SimulateArgs {
    pub host: HostArgs,
    pub json: bool,
    pub report_every: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct EffectReport {
    pub name: String,
    pub policy: String,
    pub running: bool,
    pub frames: u64,
    pub live: usize,
    pub peak: usize,
    pub emitted: u64,
    pub expired: u64,
    pub dropped: u64,
    pub ellipse_fills: u64,
    pub additive_fills: u64,
    pub pixel_size: (u32, u32),
}

#[derive(Debug, Serialize)]
pub struct Sample {
    pub frame: u32,
    /// Live particles per effect, in mount order
    pub live: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct SimulationReport {
    pub frames: u32,
    pub seed: u32,
    pub width: f32,
    pub height: f32,
    pub effects: Vec<EffectReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<Sample>,
}

fn effect_report(effect: &Effect<NullSurface>) -> EffectReport {
    let engine = effect.engine();
    let (stats, pixel_size) = effect
        .surface()
        .map(|s| (s.stats(), s.pixel_size()))
        .unwrap_or_default();
    EffectReport {
        name: effect.name().to_string(),
        policy: effect.policy().name().to_string(),
        running: effect.is_running(),
        frames: effect.frames(),
        live: engine.len(),
        peak: engine.peak(),
        emitted: engine.emitted(),
        expired: engine.expired(),
        dropped: engine.dropped(),
        ellipse_fills: stats.ellipse_fills,
        additive_fills: stats.additive_fills,
        pixel_size,
    }
}

pub fn simulate(args: &SimulateArgs) -> Result<SimulationReport> {
    let host_args = &args.host;
    let configs = host::load_configs(host_args)?;
    let size = host_args.size();
    let mut stage: Stage<Effect<NullSurface>> =
        host::mount(configs, host_args.seed, |_| Ok(NullSurface::new(size, 1.0)))?;

    let mut samples = Vec::new();
    host::run(&mut stage, host_args, |frame, stage| {
        if let Some(every) = args.report_every.filter(|n| *n > 0) {
            if (frame + 1) % every == 0 {
                samples.push(Sample {
                    frame: frame + 1,
                    live: stage.systems().iter().map(|e| e.particle_count()).collect(),
                });
            }
        }
    })?;

    Ok(SimulationReport {
        frames: host_args.frames,
        seed: host_args.seed,
        width: host_args.width,
        height: host_args.height,
        effects: stage.systems().iter().map(effect_report).collect(),
        samples,
    })
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let report = simulate(&args)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "Simulated {} frame(s) at {}x{} (seed {})",
        report.frames, report.width, report.height, report.seed
    );
    for sample in &report.samples {
        let counts: Vec<String> = sample.live.iter().map(|n| n.to_string()).collect();
        println!("  frame {:>6}: {}", sample.frame, counts.join(" / "));
    }
    println!();
    for e in &report.effects {
        println!("{} ({})", e.name, e.policy);
        if !e.running {
            println!("  not running (no drawing surface)");
            continue;
        }
        println!("  live:     {}", e.live);
        println!("  peak:     {}", e.peak);
        println!("  emitted:  {}", e.emitted);
        println!("  expired:  {}", e.expired);
        if e.dropped > 0 {
            println!("  dropped:  {}", e.dropped);
        }
        println!(
            "  draws:    {} ({} additive)",
            e.ellipse_fills, e.additive_fills
        );
        println!("  surface:  {}x{} px", e.pixel_size.0, e.pixel_size.1);
    }
    Ok(())
}
