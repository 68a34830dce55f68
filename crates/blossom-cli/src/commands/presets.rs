//! Built-in preset listing

use anyhow::Result;
use blossom_particles::{presets, RenderMode};

pub fn run(verbose: bool) -> Result<()> {
    println!("Presets:");
    for name in presets::NAMES {
        println!("  {:<16} {}", name, presets::describe(name));
        if !verbose {
            continue;
        }
        let config = presets::by_name(name)?;
        let mode = match config.render_mode {
            RenderMode::Clear { .. } => "clear",
            RenderMode::Trail { .. } => "trail",
        };
        println!(
            "    emission: {}, templates: {}, render: {}{}{}",
            config.emission.label(),
            config.templates.len(),
            mode,
            if config.additive { ", additive" } else { "" },
            if config.hi_dpi { ", hi-dpi" } else { "" },
        );
    }
    Ok(())
}
