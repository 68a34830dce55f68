//! Built-in effect presets

use crate::emitter::{
    full_turn, EmissionKind, EmitterConfig, ForceOrder, LifecycleSpec, PaletteEntry,
    ParticleShape, ParticleTemplate, RenderMode, SwaySpec, VelocitySpec,
};
use blossom_core::{BlossomError, Color, CompositeMode, Result, ValueRange};

pub const AMBIENT_PETALS: &str = "ambient-petals";
pub const FIREWORKS: &str = "fireworks";
pub const POINTER_PETALS: &str = "pointer-petals";

/// Every preset name, in listing order
pub const NAMES: [&str; 3] = [AMBIENT_PETALS, FIREWORKS, POINTER_PETALS];

pub fn by_name(name: &str) -> Result<EmitterConfig> {
    match name {
        AMBIENT_PETALS => Ok(ambient_petals()),
        FIREWORKS => Ok(fireworks()),
        POINTER_PETALS => Ok(pointer_petals()),
        _ => Err(BlossomError::UnknownPreset {
            name: name.to_string(),
            allowed: NAMES.iter().map(|n| n.to_string()).collect(),
        }),
    }
}

/// One-line description for listings
pub fn describe(name: &str) -> &'static str {
    match name {
        AMBIENT_PETALS => "60 swaying petals falling forever, recycled at the bottom edge",
        FIREWORKS => "random radial bursts with gravity, drag, fading trails and additive glow",
        POINTER_PETALS => "gold sparkle trail on pointer move, petal explosion on click",
        _ => "",
    }
}

fn hex(value: u32) -> Color {
    Color::from_hex(value)
}

fn palette(colors: &[u32]) -> Vec<PaletteEntry> {
    colors.iter().map(|&c| PaletteEntry::new(hex(c))).collect()
}

/// Falling peach/ochna petals: sway-only motion, recycled, never expire
pub fn ambient_petals() -> EmitterConfig {
    let pink = Color::new(1.0, 183.0 / 255.0, 197.0 / 255.0, 1.0);
    let petal = ParticleTemplate {
        size: ValueRange::new(2.0, 6.0),
        velocity: VelocitySpec::Cartesian {
            x: ValueRange::constant(0.0),
            y: ValueRange::new(0.2, 1.0),
        },
        gravity: ValueRange::constant(0.0),
        drag: ValueRange::constant(1.0),
        force_order: ForceOrder::GravityThenDrag,
        lifecycle: LifecycleSpec::Recycle { margin: 20.0 },
        // One gold petal in five; gold ones stay opaque
        palette: vec![
            pink.into(),
            pink.into(),
            pink.into(),
            pink.into(),
            PaletteEntry::with_alpha(hex(0xFFD700), ValueRange::constant(1.0)),
        ],
        alpha: ValueRange::new(0.4, 0.8),
        shapes: vec![ParticleShape::Ellipse {
            minor_ratio: 1.0 / 1.8,
        }],
        rotation: full_turn(),
        spin: ValueRange::new((-0.5f32).to_radians(), 0.5f32.to_radians()),
        sway: Some(SwaySpec {
            amplitude: ValueRange::new(20.0, 70.0),
            frequency: ValueRange::new(0.01, 0.03),
            phase: ValueRange::new(0.0, 100.0),
        }),
        color_per_burst: false,
    };

    EmitterConfig {
        name: AMBIENT_PETALS.to_string(),
        emission: EmissionKind::ambient(),
        templates: vec![petal],
        render_mode: RenderMode::Clear { background: None },
        additive: false,
        hi_dpi: false,
        layer_blend: CompositeMode::SourceOver,
        max_particles: None,
        fixed_ticks: true,
    }
}

/// Fireworks: one palette color per burst, persistence-of-vision trail
pub fn fireworks() -> EmitterConfig {
    let spark = ParticleTemplate {
        size: ValueRange::constant(2.0),
        velocity: VelocitySpec::Radial {
            speed: ValueRange::new(2.0, 7.0),
        },
        gravity: ValueRange::constant(0.15),
        drag: ValueRange::constant(0.96),
        force_order: ForceOrder::DragThenGravity,
        lifecycle: LifecycleSpec::Fade {
            decay: ValueRange::new(0.01, 0.025),
        },
        palette: palette(&[0xFFD700, 0xFF4D4D, 0x00FF7F, 0x00E5FF, 0xE066FF, 0xFFFFFF]),
        alpha: ValueRange::constant(1.0),
        shapes: vec![ParticleShape::Circle { radius_scale: 1.0 }],
        rotation: ValueRange::constant(0.0),
        spin: ValueRange::constant(0.0),
        sway: None,
        color_per_burst: true,
    };

    EmitterConfig {
        name: FIREWORKS.to_string(),
        emission: EmissionKind::burst(),
        templates: vec![spark],
        render_mode: RenderMode::Trail {
            overlay: Color::new(0.0, 0.0, 0.0, 0.2),
        },
        additive: true,
        hi_dpi: true,
        // The black trail overlay must not hide layers beneath
        layer_blend: CompositeMode::Screen,
        max_particles: None,
        fixed_ticks: true,
    }
}

/// Cursor interaction: template 0 is the move trail, template 1 the click burst
pub fn pointer_petals() -> EmitterConfig {
    let sparkle = ParticleTemplate {
        size: ValueRange::new(0.5, 2.5),
        velocity: VelocitySpec::Cartesian {
            x: ValueRange::new(-1.0, 1.0),
            y: ValueRange::new(-1.0, 1.0),
        },
        gravity: ValueRange::constant(0.0),
        drag: ValueRange::constant(1.0),
        force_order: ForceOrder::GravityThenDrag,
        lifecycle: LifecycleSpec::Fade {
            decay: ValueRange::constant(0.02),
        },
        palette: palette(&[0xFFD700, 0xFFFACD, 0xFFFFFF]),
        alpha: ValueRange::constant(1.0),
        shapes: vec![ParticleShape::Circle { radius_scale: 1.0 }],
        rotation: ValueRange::constant(0.0),
        spin: ValueRange::constant(0.0),
        sway: None,
        color_per_burst: false,
    };

    let petal = ParticleTemplate {
        size: ValueRange::new(3.0, 8.0),
        velocity: VelocitySpec::Radial {
            speed: ValueRange::new(2.0, 7.0),
        },
        gravity: ValueRange::constant(0.15),
        drag: ValueRange::constant(0.95),
        force_order: ForceOrder::GravityThenDrag,
        lifecycle: LifecycleSpec::Fade {
            decay: ValueRange::constant(0.015),
        },
        palette: palette(&[0xFF69B4, 0xFFB7C5, 0xFFD700, 0xFFEA00]),
        alpha: ValueRange::constant(1.0),
        shapes: vec![
            ParticleShape::Ellipse { minor_ratio: 0.5 },
            ParticleShape::Circle {
                radius_scale: 1.0 / 1.5,
            },
        ],
        rotation: full_turn(),
        spin: ValueRange::new(-0.1, 0.1),
        sway: None,
        color_per_burst: false,
    };

    EmitterConfig {
        name: POINTER_PETALS.to_string(),
        emission: EmissionKind::pointer(),
        templates: vec![sparkle, petal],
        render_mode: RenderMode::Clear { background: None },
        additive: false,
        hi_dpi: false,
        layer_blend: CompositeMode::SourceOver,
        max_particles: None,
        fixed_ticks: true,
    }
}
