//! Blossom CLI - Command-line host for the Blossom particle effects

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::host::HostArgs;
use commands::{presets, render, simulate};

#[derive(Parser)]
#[command(name = "blossom")]
#[command(about = "Headless host for sakura petal and fireworks particle effects", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Which effects to run and on what viewport
#[derive(Args)]
struct EffectArgs {
    /// Built-in preset to mount (repeatable; default: all presets)
    #[arg(short, long = "preset")]
    presets: Vec<String>,

    /// TOML effect config to mount (repeatable)
    #[arg(short, long = "config")]
    configs: Vec<String>,

    /// Number of frames to run
    #[arg(long, default_value = "600")]
    frames: u32,

    /// RNG seed; effects are seeded seed, seed+1, ... in mount order
    #[arg(long, default_value = "1")]
    seed: u32,

    /// Viewport width in logical pixels
    #[arg(long, default_value = "1280")]
    width: f32,

    /// Viewport height in logical pixels
    #[arg(long, default_value = "720")]
    height: f32,

    /// Device pixel ratio reported with the initial resize
    #[arg(long, default_value = "1.0")]
    dpr: f32,

    /// Drive a synthetic pointer across the viewport
    #[arg(long)]
    pointer: bool,

    /// Click every N frames while the synthetic pointer is on (0 = never)
    #[arg(long, default_value = "30")]
    click_every: u32,
}

impl From<EffectArgs> for HostArgs {
    fn from(args: EffectArgs) -> Self {
        HostArgs {
            presets: args.presets,
            configs: args.configs,
            frames: args.frames,
            seed: args.seed,
            width: args.width,
            height: args.height,
            dpr: args.dpr,
            pointer: args.pointer,
            click_every: args.click_every,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in effect presets
    Presets {
        /// Show emission, template and render settings
        #[arg(short, long)]
        verbose: bool,
    },

    /// Run effects headless and report particle statistics
    Simulate {
        #[command(flatten)]
        effects: EffectArgs,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Sample live particle counts every N frames
        #[arg(long)]
        report_every: Option<u32>,
    },

    /// Run effects and render the final frame to a PNG image
    Render {
        #[command(flatten)]
        effects: EffectArgs,

        /// Output image path
        #[arg(short, long, default_value = "blossom.png")]
        output: String,

        /// Page color behind the effects (#RGB, #RRGGBB, rgb(), rgba())
        #[arg(long, default_value = "#000000")]
        background: String,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Presets { verbose } => presets::run(verbose),
        Commands::Simulate {
            effects,
            json,
            report_every,
        } => simulate::run(simulate::SimulateArgs {
            host: effects.into(),
            json,
            report_every,
        }),
        Commands::Render {
            effects,
            output,
            background,
        } => render::run(render::RenderArgs {
            host: effects.into(),
            output,
            background,
        }),
    }
}
