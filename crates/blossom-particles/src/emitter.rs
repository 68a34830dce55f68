//! Effect configuration (parsed from TOML) and per-particle templates

use blossom_core::{BlossomError, Color, CompositeMode, Rect, Result, ValueRange};
use std::f32::consts::TAU;
use std::path::Path;

/// How a particle's initial velocity is drawn
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VelocitySpec {
    /// Uniform direction, speed drawn from the range
    Radial { speed: ValueRange },
    /// Independent uniform components
    Cartesian { x: ValueRange, y: ValueRange },
}

/// Drawn outline. `size` is the major radius for ellipses and is scaled for circles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParticleShape {
    Circle { radius_scale: f32 },
    Ellipse { minor_ratio: f32 },
}

impl ParticleShape {
    /// Semi-axes for a particle of the given size
    pub fn radii(&self, size: f32) -> (f32, f32) {
        match *self {
            ParticleShape::Circle { radius_scale } => (size * radius_scale, size * radius_scale),
            ParticleShape::Ellipse { minor_ratio } => (size, size * minor_ratio),
        }
    }
}

/// What happens at the end of a particle's life
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LifecycleSpec {
    /// Opacity starts at 1 and drops by `decay` per tick; removed at 0
    Fade { decay: ValueRange },
    /// Never dies; wraps to `-margin` after falling past `height + margin`
    Recycle { margin: f32 },
}

/// Sinusoidal horizontal sway (replaces linear horizontal motion)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwaySpec {
    pub amplitude: ValueRange,
    /// Phase advance in radians per tick
    pub frequency: ValueRange,
    pub phase: ValueRange,
}

/// Order gravity and drag are applied in each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForceOrder {
    /// `vy += g; v *= drag`; terminal speed is `g·drag / (1 - drag)`
    #[default]
    GravityThenDrag,
    /// `v *= drag; vy += g`; terminal speed is `g / (1 - drag)`
    DragThenGravity,
}

/// One palette color, optionally with its own alpha range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    pub color: Color,
    /// Replaces the template's `alpha` for particles of this color
    pub alpha: Option<ValueRange>,
}

impl PaletteEntry {
    pub const fn new(color: Color) -> Self {
        Self { color, alpha: None }
    }

    pub const fn with_alpha(color: Color, alpha: ValueRange) -> Self {
        Self {
            color,
            alpha: Some(alpha),
        }
    }
}

impl From<Color> for PaletteEntry {
    fn from(color: Color) -> Self {
        Self::new(color)
    }
}

/// Ranges every spawned particle draws its attributes from
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleTemplate {
    pub size: ValueRange,
    pub velocity: VelocitySpec,
    /// Added to vertical velocity per tick; 0 when unused
    pub gravity: ValueRange,
    /// Velocity multiplier per tick; 1.0 when unused
    pub drag: ValueRange,
    pub force_order: ForceOrder,
    pub lifecycle: LifecycleSpec,
    pub palette: Vec<PaletteEntry>,
    /// Multiplies the palette color's alpha unless the entry has its own range
    pub alpha: ValueRange,
    pub shapes: Vec<ParticleShape>,
    /// Initial rotation in radians
    pub rotation: ValueRange,
    /// Angular velocity in radians per tick
    pub spin: ValueRange,
    pub sway: Option<SwaySpec>,
    /// One palette color for every particle of a spawn request
    pub color_per_burst: bool,
}

impl Default for ParticleTemplate {
    fn default() -> Self {
        Self {
            size: ValueRange::new(1.0, 3.0),
            velocity: VelocitySpec::Radial {
                speed: ValueRange::new(1.0, 3.0),
            },
            gravity: ValueRange::constant(0.0),
            drag: ValueRange::constant(1.0),
            force_order: ForceOrder::default(),
            lifecycle: LifecycleSpec::Fade {
                decay: ValueRange::constant(0.02),
            },
            palette: vec![PaletteEntry::new(Color::WHITE)],
            alpha: ValueRange::constant(1.0),
            shapes: vec![ParticleShape::Circle { radius_scale: 1.0 }],
            rotation: ValueRange::constant(0.0),
            spin: ValueRange::constant(0.0),
            sway: None,
            color_per_burst: false,
        }
    }
}

impl ParticleTemplate {
    /// Apply overrides from a `[[template]]` TOML table onto `self`
    pub fn merge_toml(mut self, table: &toml::value::Table) -> Result<Self> {
        if let Some(v) = table.get("size") {
            self.size = toml_range(v, self.size);
        }

        let velocity_kind = table.get("velocity").and_then(|v| v.as_str());
        let (speed, vx, vy) = match self.velocity {
            VelocitySpec::Radial { speed } => (speed, ValueRange::constant(0.0), ValueRange::constant(0.0)),
            VelocitySpec::Cartesian { x, y } => (ValueRange::new(1.0, 3.0), x, y),
        };
        let speed = table.get("speed").map(|v| toml_range(v, speed)).unwrap_or(speed);
        let vx = table.get("velocity_x").map(|v| toml_range(v, vx)).unwrap_or(vx);
        let vy = table.get("velocity_y").map(|v| toml_range(v, vy)).unwrap_or(vy);
        let radial = match velocity_kind {
            Some("radial") => true,
            Some("cartesian") => false,
            Some(other) => {
                return Err(BlossomError::InvalidConfig(format!(
                    "unknown velocity kind '{other}' (expected radial or cartesian)"
                )))
            }
            None => matches!(self.velocity, VelocitySpec::Radial { .. }),
        };
        self.velocity = if radial {
            VelocitySpec::Radial { speed }
        } else {
            VelocitySpec::Cartesian { x: vx, y: vy }
        };

        if let Some(v) = table.get("gravity") {
            self.gravity = toml_range(v, self.gravity);
        }
        if let Some(v) = table.get("drag") {
            self.drag = toml_range(v, self.drag);
        }
        if let Some(order) = table.get("force_order").and_then(|v| v.as_str()) {
            self.force_order = match order {
                "gravity-first" => ForceOrder::GravityThenDrag,
                "drag-first" => ForceOrder::DragThenGravity,
                other => {
                    return Err(BlossomError::InvalidConfig(format!(
                        "unknown force_order '{other}' (expected gravity-first or drag-first)"
                    )))
                }
            };
        }

        let (decay, margin) = match self.lifecycle {
            LifecycleSpec::Fade { decay } => (decay, 20.0),
            LifecycleSpec::Recycle { margin } => (ValueRange::constant(0.02), margin),
        };
        let decay = table.get("decay").map(|v| toml_range(v, decay)).unwrap_or(decay);
        let margin = table
            .get("recycle_margin")
            .map(|v| toml_f32(v, margin))
            .unwrap_or(margin);
        self.lifecycle = match table.get("lifecycle").and_then(|v| v.as_str()) {
            Some("fade") => LifecycleSpec::Fade { decay },
            Some("recycle") => LifecycleSpec::Recycle { margin },
            Some(other) => {
                return Err(BlossomError::InvalidConfig(format!(
                    "unknown lifecycle '{other}' (expected fade or recycle)"
                )))
            }
            None => match self.lifecycle {
                LifecycleSpec::Fade { .. } => LifecycleSpec::Fade { decay },
                LifecycleSpec::Recycle { .. } => LifecycleSpec::Recycle { margin },
            },
        };

        if let Some(v) = table.get("palette") {
            self.palette = toml_palette(v)?;
        }
        if let Some(v) = table.get("alpha") {
            self.alpha = toml_range(v, self.alpha);
        }
        if let Some(v) = table.get("shapes") {
            self.shapes = toml_shapes(v)?;
        }
        if let Some(v) = table.get("rotation_deg") {
            self.rotation = degrees(toml_range(v, ValueRange::constant(0.0)));
        }
        if let Some(v) = table.get("spin_deg") {
            self.spin = degrees(toml_range(v, ValueRange::constant(0.0)));
        }

        if table.contains_key("sway_amplitude")
            || table.contains_key("sway_frequency")
            || table.contains_key("sway_phase")
        {
            let base = self.sway.unwrap_or(SwaySpec {
                amplitude: ValueRange::new(20.0, 70.0),
                frequency: ValueRange::new(0.01, 0.03),
                phase: ValueRange::new(0.0, 100.0),
            });
            self.sway = Some(SwaySpec {
                amplitude: table
                    .get("sway_amplitude")
                    .map(|v| toml_range(v, base.amplitude))
                    .unwrap_or(base.amplitude),
                frequency: table
                    .get("sway_frequency")
                    .map(|v| toml_range(v, base.frequency))
                    .unwrap_or(base.frequency),
                phase: table
                    .get("sway_phase")
                    .map(|v| toml_range(v, base.phase))
                    .unwrap_or(base.phase),
            });
        }
        if let Some(v) = table.get("sway") {
            if v.as_bool() == Some(false) {
                self.sway = None;
            }
        }

        if let Some(v) = table.get("color_per_burst") {
            self.color_per_burst = v.as_bool().unwrap_or(self.color_per_burst);
        }

        Ok(self)
    }

    pub fn validate(&self, label: &str) -> Result<()> {
        self.size.validate(&format!("{label}.size"))?;
        match self.velocity {
            VelocitySpec::Radial { speed } => speed.validate(&format!("{label}.speed"))?,
            VelocitySpec::Cartesian { x, y } => {
                x.validate(&format!("{label}.velocity_x"))?;
                y.validate(&format!("{label}.velocity_y"))?;
            }
        }
        self.gravity.validate(&format!("{label}.gravity"))?;
        self.drag.validate(&format!("{label}.drag"))?;
        if self.drag.min <= 0.0 || self.drag.max > 1.0 {
            return Err(BlossomError::ValueOutOfRange {
                field: format!("{label}.drag"),
                min: 0.0,
                max: 1.0,
                value: if self.drag.min <= 0.0 {
                    self.drag.min as f64
                } else {
                    self.drag.max as f64
                },
            });
        }
        match self.lifecycle {
            LifecycleSpec::Fade { decay } => {
                decay.validate(&format!("{label}.decay"))?;
                if decay.min < 0.0 {
                    return Err(BlossomError::InvalidConfig(format!(
                        "{label}.decay must not be negative"
                    )));
                }
            }
            LifecycleSpec::Recycle { margin } => {
                if !margin.is_finite() || margin < 0.0 {
                    return Err(BlossomError::InvalidConfig(format!(
                        "{label}.recycle_margin must be a non-negative number"
                    )));
                }
            }
        }
        if self.palette.is_empty() {
            return Err(BlossomError::InvalidConfig(format!(
                "{label}.palette must list at least one color"
            )));
        }
        self.alpha.validate(&format!("{label}.alpha"))?;
        for (i, entry) in self.palette.iter().enumerate() {
            if let Some(alpha) = entry.alpha {
                alpha.validate(&format!("{label}.palette[{i}].alpha"))?;
            }
        }
        if self.shapes.is_empty() {
            return Err(BlossomError::InvalidConfig(format!(
                "{label}.shapes must list at least one shape"
            )));
        }
        self.rotation.validate(&format!("{label}.rotation"))?;
        self.spin.validate(&format!("{label}.spin"))?;
        if let Some(sway) = &self.sway {
            sway.amplitude.validate(&format!("{label}.sway_amplitude"))?;
            sway.frequency.validate(&format!("{label}.sway_frequency"))?;
            sway.phase.validate(&format!("{label}.sway_phase"))?;
        }
        Ok(())
    }
}

/// When, where and how many particles are spawned
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmissionKind {
    /// Pre-populate `target_count` particles above the viewport, then rely on recycling
    Ambient { target_count: u32 },
    /// Each frame, with `probability`, one burst of `burst_size` at a random point
    /// of `region` (fractions of the viewport)
    Burst {
        probability: f32,
        burst_size: u32,
        region: Rect,
    },
    /// Trail particles on pointer move, a burst on click
    Pointer {
        move_count: u32,
        click_count: u32,
        trail_template: usize,
        burst_template: usize,
    },
}

impl EmissionKind {
    pub fn ambient() -> Self {
        EmissionKind::Ambient { target_count: 60 }
    }

    pub fn burst() -> Self {
        EmissionKind::Burst {
            probability: 0.03,
            burst_size: 80,
            region: Rect::new(0.0, 0.0, 1.0, 0.6),
        }
    }

    pub fn pointer() -> Self {
        EmissionKind::Pointer {
            move_count: 2,
            click_count: 20,
            trail_template: 0,
            burst_template: 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EmissionKind::Ambient { .. } => "ambient",
            EmissionKind::Burst { .. } => "burst",
            EmissionKind::Pointer { .. } => "pointer",
        }
    }
}

/// Per-frame background treatment
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    /// Clear to transparent, then optionally fill a solid background
    Clear { background: Option<Color> },
    /// Paint a translucent overlay over the previous frame for a fading trail
    Trail { overlay: Color },
}

/// Configuration for one mounted effect
#[derive(Debug, Clone, PartialEq)]
pub struct EmitterConfig {
    pub name: String,
    pub emission: EmissionKind,
    pub templates: Vec<ParticleTemplate>,
    pub render_mode: RenderMode,
    /// Draw particles with the additive ("lighter") composite mode
    pub additive: bool,
    /// Scale the surface by the device pixel ratio
    pub hi_dpi: bool,
    /// How the effect's finished layer combines with what lies beneath it
    pub layer_blend: CompositeMode,
    /// Optional cap on the active set; oldest particles are dropped first
    pub max_particles: Option<usize>,
    /// Advance exactly one tick per frame instead of deriving ticks from timestamps
    pub fixed_ticks: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            name: "effect".to_string(),
            emission: EmissionKind::burst(),
            templates: vec![ParticleTemplate::default()],
            render_mode: RenderMode::Clear { background: None },
            additive: false,
            hi_dpi: false,
            layer_blend: CompositeMode::SourceOver,
            max_particles: None,
            fixed_ticks: true,
        }
    }
}

impl EmitterConfig {
    /// Parse an EmitterConfig from a TOML table. A `preset` key selects the
    /// base configuration; every other key overrides it.
    pub fn from_toml(table: &toml::value::Table) -> Result<Self> {
        let mut config = match table.get("preset").and_then(|v| v.as_str()) {
            Some(name) => crate::presets::by_name(name)?,
            None => Self::default(),
        };

        if let Some(v) = table.get("name").and_then(|v| v.as_str()) {
            config.name = v.to_string();
        }

        if let Some(kind) = table.get("emission").and_then(|v| v.as_str()) {
            let fresh = match kind {
                "ambient" => EmissionKind::ambient(),
                "burst" => EmissionKind::burst(),
                "pointer" => EmissionKind::pointer(),
                other => {
                    return Err(BlossomError::InvalidConfig(format!(
                        "unknown emission '{other}' (expected ambient, burst or pointer)"
                    )))
                }
            };
            if fresh.label() != config.emission.label() {
                config.emission = fresh;
            }
        }

        config.emission = match config.emission {
            EmissionKind::Ambient { target_count } => EmissionKind::Ambient {
                target_count: toml_u32(table.get("target_count"), target_count),
            },
            EmissionKind::Burst {
                probability,
                burst_size,
                region,
            } => EmissionKind::Burst {
                probability: table
                    .get("probability")
                    .map(|v| toml_f32(v, probability))
                    .unwrap_or(probability),
                burst_size: toml_u32(table.get("burst_size"), burst_size),
                region: table
                    .get("region")
                    .map(|v| toml_rect(v, region))
                    .unwrap_or(region),
            },
            EmissionKind::Pointer {
                move_count,
                click_count,
                trail_template,
                burst_template,
            } => EmissionKind::Pointer {
                move_count: toml_u32(table.get("move_count"), move_count),
                click_count: toml_u32(table.get("click_count"), click_count),
                trail_template: toml_u32(table.get("trail_template"), trail_template as u32)
                    as usize,
                burst_template: toml_u32(table.get("burst_template"), burst_template as u32)
                    as usize,
            },
        };

        if let Some(mode) = table.get("render_mode").and_then(|v| v.as_str()) {
            config.render_mode = match mode {
                "clear" => RenderMode::Clear { background: None },
                "trail" => RenderMode::Trail {
                    overlay: Color::new(0.0, 0.0, 0.0, 0.2),
                },
                other => {
                    return Err(BlossomError::InvalidConfig(format!(
                        "unknown render_mode '{other}' (expected clear or trail)"
                    )))
                }
            };
        }
        match &mut config.render_mode {
            RenderMode::Clear { background } => {
                if let Some(v) = table.get("background").and_then(|v| v.as_str()) {
                    *background = Some(Color::parse(v)?);
                }
            }
            RenderMode::Trail { overlay } => {
                if let Some(v) = table.get("overlay").and_then(|v| v.as_str()) {
                    *overlay = Color::parse(v)?;
                }
            }
        }

        if let Some(v) = table.get("additive") {
            config.additive = v.as_bool().unwrap_or(config.additive);
        }
        if let Some(v) = table.get("hi_dpi") {
            config.hi_dpi = v.as_bool().unwrap_or(config.hi_dpi);
        }
        if let Some(blend) = table.get("layer_blend").and_then(|v| v.as_str()) {
            config.layer_blend = match blend {
                "normal" => CompositeMode::SourceOver,
                "screen" => CompositeMode::Screen,
                "lighter" => CompositeMode::Lighter,
                other => {
                    return Err(BlossomError::InvalidConfig(format!(
                        "unknown layer_blend '{other}' (expected normal, screen or lighter)"
                    )))
                }
            };
        }
        if let Some(v) = table.get("fixed_ticks") {
            config.fixed_ticks = v.as_bool().unwrap_or(config.fixed_ticks);
        }
        if let Some(v) = table.get("max_particles") {
            config.max_particles = match v.as_integer() {
                Some(n) if n > 0 => Some(n as usize),
                _ => None,
            };
        }

        if let Some(list) = table.get("template").and_then(|v| v.as_array()) {
            for (i, entry) in list.iter().enumerate() {
                let Some(t) = entry.as_table() else {
                    log::warn!("[config] template #{i} is not a table; ignored");
                    continue;
                };
                let base = config.templates.get(i).cloned().unwrap_or_default();
                let merged = base.merge_toml(t)?;
                if i < config.templates.len() {
                    config.templates[i] = merged;
                } else {
                    config.templates.push(merged);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let table: toml::value::Table = toml::from_str(source)?;
        Self::from_toml(&table)
    }

    /// Load and parse a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let source = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&source)
    }

    pub fn validate(&self) -> Result<()> {
        if self.templates.is_empty() {
            return Err(BlossomError::InvalidConfig(format!(
                "{}: at least one template is required",
                self.name
            )));
        }
        for (i, t) in self.templates.iter().enumerate() {
            t.validate(&format!("{}.template[{i}]", self.name))?;
        }
        match self.emission {
            EmissionKind::Ambient { .. } => {}
            EmissionKind::Burst {
                probability,
                region,
                ..
            } => {
                if !(0.0..=1.0).contains(&probability) {
                    return Err(BlossomError::ValueOutOfRange {
                        field: format!("{}.probability", self.name),
                        min: 0.0,
                        max: 1.0,
                        value: probability as f64,
                    });
                }
                if region.width < 0.0 || region.height < 0.0 {
                    return Err(BlossomError::InvalidConfig(format!(
                        "{}.region must have a non-negative size",
                        self.name
                    )));
                }
            }
            EmissionKind::Pointer {
                trail_template,
                burst_template,
                ..
            } => {
                for index in [trail_template, burst_template] {
                    if index >= self.templates.len() {
                        return Err(BlossomError::InvalidConfig(format!(
                            "{}: template index {index} out of bounds ({} templates)",
                            self.name,
                            self.templates.len()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

fn degrees(range: ValueRange) -> ValueRange {
    ValueRange::new(range.min.to_radians(), range.max.to_radians())
}

/// Full turn in radians, as a range
pub(crate) fn full_turn() -> ValueRange {
    ValueRange::new(0.0, TAU)
}

// ── TOML helpers (handle integer/float coercion) ──

fn toml_f32(v: &toml::Value, default: f32) -> f32 {
    v.as_float()
        .map(|f| f as f32)
        .or_else(|| v.as_integer().map(|i| i as f32))
        .unwrap_or(default)
}

fn toml_u32(v: Option<&toml::Value>, default: u32) -> u32 {
    v.and_then(|v| v.as_integer())
        .map(|i| i.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(default)
}

/// A single number is a constant range; a two-element array is `[min, max]`
fn toml_range(v: &toml::Value, default: ValueRange) -> ValueRange {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 2 {
            return ValueRange::new(toml_f32(&arr[0], default.min), toml_f32(&arr[1], default.max));
        }
        return default;
    }
    if v.as_float().is_some() || v.as_integer().is_some() {
        return ValueRange::constant(toml_f32(v, default.min));
    }
    default
}

fn toml_rect(v: &toml::Value, default: Rect) -> Rect {
    if let Some(arr) = v.as_array() {
        if arr.len() >= 4 {
            return Rect::new(
                toml_f32(&arr[0], default.x),
                toml_f32(&arr[1], default.y),
                toml_f32(&arr[2], default.width),
                toml_f32(&arr[3], default.height),
            );
        }
    }
    default
}

/// `"#FFB7C5"` or `{ color = "#FFD700", alpha = 1.0 }`
fn toml_palette(v: &toml::Value) -> Result<Vec<PaletteEntry>> {
    let Some(arr) = v.as_array() else {
        return Err(BlossomError::InvalidConfig(
            "palette must be an array of colors".to_string(),
        ));
    };
    arr.iter()
        .map(|entry| {
            if let Some(c) = entry.as_str() {
                return Color::parse(c).map(PaletteEntry::new);
            }
            let color = entry
                .as_table()
                .and_then(|t| t.get("color"))
                .and_then(|c| c.as_str())
                .ok_or_else(|| BlossomError::InvalidColor(entry.to_string()))?;
            let alpha = entry
                .get("alpha")
                .map(|a| toml_range(a, ValueRange::constant(1.0)));
            Ok(PaletteEntry {
                color: Color::parse(color)?,
                alpha,
            })
        })
        .collect()
}

/// `"circle"`, `"ellipse"`, `{ circle = 0.66 }` or `{ ellipse = 0.5 }`
fn toml_shapes(v: &toml::Value) -> Result<Vec<ParticleShape>> {
    let Some(arr) = v.as_array() else {
        return Err(BlossomError::InvalidConfig(
            "shapes must be an array".to_string(),
        ));
    };
    arr.iter()
        .map(|s| {
            if let Some(name) = s.as_str() {
                return match name {
                    "circle" => Ok(ParticleShape::Circle { radius_scale: 1.0 }),
                    "ellipse" => Ok(ParticleShape::Ellipse { minor_ratio: 0.5 }),
                    other => Err(BlossomError::InvalidConfig(format!(
                        "unknown shape '{other}'"
                    ))),
                };
            }
            if let Some(t) = s.as_table() {
                if let Some(scale) = t.get("circle") {
                    return Ok(ParticleShape::Circle {
                        radius_scale: toml_f32(scale, 1.0),
                    });
                }
                if let Some(ratio) = t.get("ellipse") {
                    return Ok(ParticleShape::Ellipse {
                        minor_ratio: toml_f32(ratio, 0.5),
                    });
                }
            }
            Err(BlossomError::InvalidConfig(format!("unknown shape {s}")))
        })
        .collect()
}
