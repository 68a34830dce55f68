//! Particle: kinematic state, per-tick update, and draw routine

use crate::emitter::{
    ForceOrder, LifecycleSpec, PaletteEntry, ParticleShape, ParticleTemplate, VelocitySpec,
};
use crate::rand::ParticleRng;
use blossom_core::{Color, DrawSurface, Size, ValueRange, Vec2};
use std::f32::consts::TAU;

/// Horizontal sinusoidal sway; x is derived from `origin_x` every tick
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sway {
    pub origin_x: f32,
    pub phase: f32,
    pub amplitude: f32,
    pub frequency: f32,
    /// Range a fresh phase is drawn from when the particle recycles
    pub phase_range: ValueRange,
}

impl Sway {
    pub fn offset(&self) -> f32 {
        self.phase.sin() * self.amplitude
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Lifecycle {
    /// Opacity counter dropping by `decay` per tick
    Fading { opacity: f32, decay: f32 },
    /// Wraps to the top edge instead of dying
    Recycling { margin: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub shape: ParticleShape,
    pub color: Color,
    /// Radians
    pub rotation: f32,
    /// Radians per tick
    pub spin: f32,
    pub gravity: f32,
    pub drag: f32,
    pub force_order: ForceOrder,
    pub sway: Option<Sway>,
    pub lifecycle: Lifecycle,
}

impl Particle {
    /// Build one particle at `origin`, drawing every attribute independently
    /// from the template ranges. `color` overrides the palette pick.
    pub fn spawn(
        origin: Vec2,
        template: &ParticleTemplate,
        rng: &mut ParticleRng,
        color: Option<PaletteEntry>,
    ) -> Self {
        let size = rng.sample(template.size);
        let velocity = match template.velocity {
            VelocitySpec::Radial { speed } => {
                let angle = rng.range(0.0, TAU);
                Vec2::from_polar(angle, rng.sample(speed))
            }
            VelocitySpec::Cartesian { x, y } => Vec2::new(rng.sample(x), rng.sample(y)),
        };
        let shape = rng
            .pick(&template.shapes)
            .copied()
            .unwrap_or(ParticleShape::Circle { radius_scale: 1.0 });
        let entry = color
            .or_else(|| rng.pick(&template.palette).copied())
            .unwrap_or(PaletteEntry::new(Color::WHITE));
        let alpha = rng.sample(entry.alpha.unwrap_or(template.alpha));
        let color = entry.color.with_alpha(entry.color.a * alpha);
        let rotation = rng.sample(template.rotation);
        let spin = rng.sample(template.spin);
        let gravity = rng.sample(template.gravity);
        let drag = rng.sample(template.drag);

        let sway = template.sway.map(|s| Sway {
            origin_x: origin.x,
            phase: rng.sample(s.phase),
            amplitude: rng.sample(s.amplitude),
            frequency: rng.sample(s.frequency),
            phase_range: s.phase,
        });

        let lifecycle = match template.lifecycle {
            LifecycleSpec::Fade { decay } => Lifecycle::Fading {
                opacity: 1.0,
                decay: rng.sample(decay),
            },
            LifecycleSpec::Recycle { margin } => Lifecycle::Recycling { margin },
        };

        Self {
            position: origin,
            velocity,
            size,
            shape,
            color,
            rotation,
            spin,
            gravity,
            drag,
            force_order: template.force_order,
            sway,
            lifecycle,
        }
    }

    /// Advance by `dt` ticks. `viewport` bounds recycling; `rng` draws the
    /// fresh origin and phase when a recyclable particle wraps.
    pub fn advance(&mut self, dt: f32, viewport: Size, rng: &mut ParticleRng) {
        match &mut self.sway {
            Some(sway) => {
                sway.phase += sway.frequency * dt;
                self.position.x = sway.origin_x + sway.offset();
                self.position.y += self.velocity.y * dt;
            }
            None => self.position += self.velocity * dt,
        }

        match self.force_order {
            ForceOrder::GravityThenDrag => {
                self.apply_gravity(dt);
                self.apply_drag(dt);
            }
            ForceOrder::DragThenGravity => {
                self.apply_drag(dt);
                self.apply_gravity(dt);
            }
        }
        self.rotation += self.spin * dt;

        match &mut self.lifecycle {
            Lifecycle::Fading { opacity, decay } => *opacity -= *decay * dt,
            Lifecycle::Recycling { margin } => {
                let margin = *margin;
                if self.position.y > viewport.height + margin {
                    self.position.y = -margin;
                    let origin_x = rng.range(0.0, viewport.width.max(0.0));
                    match &mut self.sway {
                        Some(sway) => {
                            sway.origin_x = origin_x;
                            sway.phase = rng.sample(sway.phase_range);
                            self.position.x = origin_x + sway.offset();
                        }
                        None => self.position.x = origin_x,
                    }
                }
            }
        }
    }

    fn apply_gravity(&mut self, dt: f32) {
        if self.gravity != 0.0 {
            self.velocity.y += self.gravity * dt;
        }
    }

    fn apply_drag(&mut self, dt: f32) {
        if self.drag != 1.0 {
            self.velocity = self.velocity * self.drag.powf(dt);
        }
    }

    /// Fading particles expire once opacity reaches zero; recyclers never do
    pub fn is_expired(&self) -> bool {
        match self.lifecycle {
            Lifecycle::Fading { opacity, .. } => opacity <= 0.0,
            Lifecycle::Recycling { .. } => false,
        }
    }

    /// Lifecycle opacity clamped to [0, 1]
    pub fn opacity(&self) -> f32 {
        match self.lifecycle {
            Lifecycle::Fading { opacity, .. } => opacity.clamp(0.0, 1.0),
            Lifecycle::Recycling { .. } => 1.0,
        }
    }

    /// Draw a rotated ellipse/circle at the current position.
    /// Only the surface is mutated; its state is restored afterwards.
    pub fn render<S: DrawSurface + ?Sized>(&self, surface: &mut S) {
        let (rx, ry) = self.shape.radii(self.size);
        surface.save();
        surface.translate(self.position);
        if self.rotation != 0.0 {
            surface.rotate(self.rotation);
        }
        surface.set_global_alpha(self.opacity());
        surface.fill_ellipse(Vec2::ZERO, Vec2::new(rx, ry), self.color);
        surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use blossom_render::{DrawCommand, RecordingSurface};

    const VIEW: Size = Size::new(800.0, 600.0);

    fn spark(velocity: Vec2, gravity: f32, drag: f32, decay: f32) -> Particle {
        Particle {
            position: Vec2::new(100.0, 100.0),
            velocity,
            size: 2.0,
            shape: ParticleShape::Circle { radius_scale: 1.0 },
            color: Color::WHITE,
            rotation: 0.0,
            spin: 0.0,
            gravity,
            drag,
            force_order: ForceOrder::GravityThenDrag,
            sway: None,
            lifecycle: Lifecycle::Fading {
                opacity: 1.0,
                decay,
            },
        }
    }

    #[test]
    fn advance_applies_velocity_gravity_drag() {
        let mut rng = ParticleRng::new(1);
        let mut p = spark(Vec2::new(3.0, -2.0), 0.15, 0.96, 0.01);
        p.advance(1.0, VIEW, &mut rng);

        assert!((p.position.x - 103.0).abs() < 1e-5);
        assert!((p.position.y - 98.0).abs() < 1e-5);
        assert!((p.velocity.x - 3.0 * 0.96).abs() < 1e-5);
        assert!((p.velocity.y - (-2.0 + 0.15) * 0.96).abs() < 1e-5);
    }

    #[test]
    fn drag_first_adds_gravity_after_damping() {
        let mut rng = ParticleRng::new(1);
        let mut p = spark(Vec2::new(3.0, -2.0), 0.15, 0.96, 0.01);
        p.force_order = ForceOrder::DragThenGravity;
        p.advance(1.0, VIEW, &mut rng);

        assert!((p.velocity.x - 3.0 * 0.96).abs() < 1e-5);
        assert!((p.velocity.y - (-2.0 * 0.96 + 0.15)).abs() < 1e-5);
    }

    #[test]
    fn advance_without_forces_is_linear() {
        let mut rng = ParticleRng::new(1);
        let mut p = spark(Vec2::new(0.5, -1.0), 0.0, 1.0, 0.02);
        for _ in 0..10 {
            p.advance(1.0, VIEW, &mut rng);
        }
        assert!((p.position.x - 105.0).abs() < 1e-4);
        assert!((p.position.y - 90.0).abs() < 1e-4);
        assert_eq!(p.velocity, Vec2::new(0.5, -1.0));
    }

    #[test]
    fn spin_advances_rotation() {
        let mut rng = ParticleRng::new(1);
        let mut p = spark(Vec2::ZERO, 0.0, 1.0, 0.02);
        p.spin = 0.1;
        p.advance(2.0, VIEW, &mut rng);
        assert!((p.rotation - 0.2).abs() < 1e-6);
    }

    #[test]
    fn opacity_decays_monotonically_until_expired() {
        let mut rng = ParticleRng::new(1);
        let mut p = spark(Vec2::ZERO, 0.0, 1.0, 0.3);
        let mut last = 1.0;
        let mut ticks = 0;
        while !p.is_expired() {
            p.advance(1.0, VIEW, &mut rng);
            let Lifecycle::Fading { opacity, .. } = p.lifecycle else {
                panic!("fading particle changed lifecycle");
            };
            assert!((last - opacity - 0.3).abs() < 1e-5);
            last = opacity;
            ticks += 1;
            assert!(ticks < 10);
        }
        assert_eq!(ticks, 4);
        assert_eq!(p.opacity(), 0.0);
    }

    #[test]
    fn sway_follows_sine_formula() {
        let mut rng = ParticleRng::new(1);
        let mut p = spark(Vec2::new(0.0, 0.5), 0.0, 1.0, 0.0);
        p.lifecycle = Lifecycle::Recycling { margin: 20.0 };
        p.sway = Some(Sway {
            origin_x: 200.0,
            phase: 1.0,
            amplitude: 30.0,
            frequency: 0.02,
            phase_range: ValueRange::new(0.0, 100.0),
        });

        p.advance(1.0, VIEW, &mut rng);
        let expected = 200.0 + (1.02f32).sin() * 30.0;
        assert!((p.position.x - expected).abs() < 1e-4);
        assert!((p.position.y - 100.5).abs() < 1e-5);
    }

    #[test]
    fn recycler_wraps_to_top_and_never_expires() {
        let mut rng = ParticleRng::new(9);
        let mut p = spark(Vec2::new(0.0, 1.0), 0.0, 1.0, 0.0);
        p.lifecycle = Lifecycle::Recycling { margin: 20.0 };
        p.sway = Some(Sway {
            origin_x: 5.0,
            phase: 0.0,
            amplitude: 10.0,
            frequency: 0.01,
            phase_range: ValueRange::new(0.0, 100.0),
        });
        p.position.y = VIEW.height + 25.0;

        p.advance(1.0, VIEW, &mut rng);
        assert!(p.position.y <= 0.0);
        let sway = p.sway.unwrap();
        assert!((0.0..VIEW.width).contains(&sway.origin_x));
        assert!((0.0..100.0).contains(&sway.phase));
        assert!(!p.is_expired());
        assert_eq!(p.opacity(), 1.0);
    }

    #[test]
    fn recycler_without_sway_gets_new_x() {
        let mut rng = ParticleRng::new(4);
        let mut p = spark(Vec2::new(0.0, 5.0), 0.0, 1.0, 0.0);
        p.lifecycle = Lifecycle::Recycling { margin: 0.0 };
        p.position = Vec2::new(-50.0, VIEW.height);
        p.advance(1.0, VIEW, &mut rng);
        assert_eq!(p.position.y, 0.0);
        assert!((0.0..VIEW.width).contains(&p.position.x));
    }

    #[test]
    fn spawn_draws_from_ranges() {
        let config = presets::pointer_petals();
        let template = &config.templates[1];
        let mut rng = ParticleRng::new(1234);
        for _ in 0..200 {
            let p = Particle::spawn(Vec2::new(10.0, 20.0), template, &mut rng, None);
            assert_eq!(p.position, Vec2::new(10.0, 20.0));
            assert!(template.size.contains(p.size));
            let speed = p.velocity.length();
            assert!(speed >= 2.0 - 1e-4 && speed < 7.0 + 1e-4);
            assert!(template.palette.iter().any(|e| e.color == p.color));
            assert!(template.shapes.contains(&p.shape));
            assert!(template.spin.contains(p.spin));
            assert_eq!(p.gravity, 0.15);
            assert_eq!(p.drag, 0.95);
            assert_eq!(
                p.lifecycle,
                Lifecycle::Fading {
                    opacity: 1.0,
                    decay: 0.015
                }
            );
        }
    }

    #[test]
    fn spawn_is_deterministic_for_a_seed() {
        let config = presets::fireworks();
        let mut a = ParticleRng::new(77);
        let mut b = ParticleRng::new(77);
        let pa = Particle::spawn(Vec2::ZERO, &config.templates[0], &mut a, None);
        let pb = Particle::spawn(Vec2::ZERO, &config.templates[0], &mut b, None);
        assert_eq!(pa, pb);
    }

    #[test]
    fn spawn_color_override() {
        let config = presets::fireworks();
        let mut rng = ParticleRng::new(5);
        let red = Color::new(1.0, 0.0, 0.0, 1.0);
        let p = Particle::spawn(Vec2::ZERO, &config.templates[0], &mut rng, Some(red.into()));
        assert_eq!(p.color, red);
        assert_eq!(p.force_order, ForceOrder::DragThenGravity);
    }

    #[test]
    fn render_draws_rotated_ellipse_with_opacity() {
        let mut surface = RecordingSurface::new(VIEW);
        let mut p = spark(Vec2::ZERO, 0.0, 1.0, 0.0);
        p.shape = ParticleShape::Ellipse { minor_ratio: 0.5 };
        p.size = 6.0;
        p.rotation = 0.5;
        p.lifecycle = Lifecycle::Fading {
            opacity: 0.25,
            decay: 0.0,
        };
        let before = p.clone();

        p.render(&mut surface);
        assert_eq!(p, before);

        let fills: Vec<_> = surface.ellipses().collect();
        assert_eq!(fills.len(), 1);
        let fill = fills[0];
        assert_eq!(fill.center, Vec2::new(100.0, 100.0));
        assert_eq!(fill.radii, Vec2::new(6.0, 3.0));
        assert!((fill.rotation - 0.5).abs() < 1e-6);
        assert!((fill.alpha - 0.25).abs() < 1e-6);
        assert!(matches!(surface.commands().first(), Some(DrawCommand::Save)));
        assert!(matches!(surface.commands().last(), Some(DrawCommand::Restore)));
        assert_eq!(surface.global_alpha(), 1.0);
    }

    #[test]
    fn negative_opacity_renders_transparent() {
        let mut surface = RecordingSurface::new(VIEW);
        let mut p = spark(Vec2::ZERO, 0.0, 1.0, 0.0);
        p.lifecycle = Lifecycle::Fading {
            opacity: -0.2,
            decay: 0.0,
        };
        p.render(&mut surface);
        assert_eq!(surface.ellipses().next().unwrap().alpha, 0.0);
    }
}
