//! Active set ownership and the two-phase simulation step

use crate::emission::{SpawnOrigin, SpawnRequest};
use crate::emitter::ParticleTemplate;
use crate::particle::Particle;
use crate::rand::ParticleRng;
use blossom_core::Size;

/// Owns the insertion-ordered active set of one effect.
///
/// The set only grows through `emit` and only shrinks in the prune phase of
/// `step` (or when `max_particles` drops the oldest).
pub struct ParticleEngine {
    particles: Vec<Particle>,
    templates: Vec<ParticleTemplate>,
    max_particles: Option<usize>,
    emitted: u64,
    expired: u64,
    dropped: u64,
    peak: usize,
}

impl ParticleEngine {
    pub fn new(templates: Vec<ParticleTemplate>, max_particles: Option<usize>) -> Self {
        Self {
            particles: Vec::new(),
            templates,
            max_particles,
            emitted: 0,
            expired: 0,
            dropped: 0,
            peak: 0,
        }
    }

    /// Append the particles of one request. Returns how many were spawned.
    pub fn emit(&mut self, request: &SpawnRequest, rng: &mut ParticleRng) -> usize {
        let Some(template) = self.templates.get(request.template) else {
            log::warn!(
                "[particles] spawn request for missing template {}",
                request.template
            );
            return 0;
        };

        let burst_color = if template.color_per_burst {
            rng.pick(&template.palette).copied()
        } else {
            None
        };

        self.particles.reserve(request.count as usize);
        for _ in 0..request.count {
            let origin = match request.origin {
                SpawnOrigin::Point(p) => p,
                SpawnOrigin::Region(rect) => rng.point_in(rect),
            };
            self.particles
                .push(Particle::spawn(origin, template, rng, burst_color));
        }
        self.emitted += request.count as u64;
        self.enforce_cap();
        self.peak = self.peak.max(self.particles.len());
        request.count as usize
    }

    /// Advance every live particle, then prune expired ones in a single
    /// order-preserving pass. Returns the number pruned.
    pub fn step(&mut self, dt: f32, viewport: Size, rng: &mut ParticleRng) -> usize {
        for p in &mut self.particles {
            p.advance(dt, viewport, rng);
        }

        let before = self.particles.len();
        self.particles.retain(|p| !p.is_expired());
        let pruned = before - self.particles.len();
        self.expired += pruned as u64;
        pruned
    }

    /// Discard the active set (statistics are kept)
    pub fn clear(&mut self) {
        self.particles.clear();
    }

    /// Discard the active set and statistics
    pub fn reset(&mut self) {
        self.particles.clear();
        self.emitted = 0;
        self.expired = 0;
        self.dropped = 0;
        self.peak = 0;
    }

    fn enforce_cap(&mut self) {
        let Some(cap) = self.max_particles else {
            return;
        };
        if self.particles.len() > cap {
            let excess = self.particles.len() - cap;
            self.particles.drain(..excess);
            self.dropped += excess as u64;
        }
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn templates(&self) -> &[ParticleTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles spawned since the last reset
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Particles pruned after expiring
    pub fn expired(&self) -> u64 {
        self.expired
    }

    /// Particles dropped by the cap
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Largest active set seen
    pub fn peak(&self) -> usize {
        self.peak
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Lifecycle;
    use crate::presets;
    use blossom_core::{Rect, Vec2};

    const VIEW: Size = Size::new(800.0, 600.0);

    fn point(x: f32, y: f32, count: u32, template: usize) -> SpawnRequest {
        SpawnRequest {
            origin: SpawnOrigin::Point(Vec2::new(x, y)),
            count,
            template,
        }
    }

    #[test]
    fn emit_and_prune_lifecycle() {
        let mut engine = ParticleEngine::new(presets::pointer_petals().templates, None);
        let mut rng = ParticleRng::new(42);

        assert_eq!(engine.emit(&point(10.0, 10.0, 2, 0), &mut rng), 2);
        assert_eq!(engine.len(), 2);

        // Trail decay is 0.02 per tick: opacity reaches zero around tick 50
        for _ in 0..49 {
            assert_eq!(engine.step(1.0, VIEW, &mut rng), 0);
        }
        assert_eq!(engine.len(), 2);
        let pruned: usize = (0..2).map(|_| engine.step(1.0, VIEW, &mut rng)).sum();
        assert_eq!(pruned, 2);
        assert!(engine.is_empty());
        assert_eq!(engine.emitted(), 2);
        assert_eq!(engine.expired(), 2);
    }

    #[test]
    fn prune_preserves_survivor_order() {
        let mut engine = ParticleEngine::new(presets::fireworks().templates, None);
        let mut rng = ParticleRng::new(3);
        engine.emit(&point(0.0, 0.0, 6, 0), &mut rng);

        // Tag particles by size, make odd ones about to expire
        for (i, p) in engine.particles.iter_mut().enumerate() {
            p.size = i as f32;
            p.lifecycle = Lifecycle::Fading {
                opacity: if i % 2 == 1 { 0.001 } else { 1.0 },
                decay: 0.01,
            };
        }
        assert_eq!(engine.step(1.0, VIEW, &mut rng), 3);
        let sizes: Vec<f32> = engine.particles().iter().map(|p| p.size).collect();
        assert_eq!(sizes, vec![0.0, 2.0, 4.0]);
    }

    #[test]
    fn color_per_burst_shares_one_color() {
        let mut engine = ParticleEngine::new(presets::fireworks().templates, None);
        let mut rng = ParticleRng::new(11);
        engine.emit(&point(50.0, 50.0, 80, 0), &mut rng);
        let first = engine.particles()[0].color;
        assert!(engine.particles().iter().all(|p| p.color == first));
    }

    #[test]
    fn region_origin_spreads_particles() {
        let mut engine = ParticleEngine::new(presets::ambient_petals().templates, None);
        let mut rng = ParticleRng::new(6);
        let region = Rect::new(0.0, -600.0, 800.0, 600.0);
        engine.emit(
            &SpawnRequest {
                origin: SpawnOrigin::Region(region),
                count: 60,
                template: 0,
            },
            &mut rng,
        );
        assert_eq!(engine.len(), 60);
        assert!(engine
            .particles()
            .iter()
            .all(|p| region.contains(p.position)));
    }

    #[test]
    fn recyclers_are_never_pruned() {
        let mut engine = ParticleEngine::new(presets::ambient_petals().templates, None);
        let mut rng = ParticleRng::new(6);
        engine.emit(
            &SpawnRequest {
                origin: SpawnOrigin::Region(Rect::new(0.0, -600.0, 800.0, 600.0)),
                count: 60,
                template: 0,
            },
            &mut rng,
        );
        for _ in 0..5_000 {
            assert_eq!(engine.step(1.0, VIEW, &mut rng), 0);
        }
        assert_eq!(engine.len(), 60);
        assert!(engine
            .particles()
            .iter()
            .all(|p| p.position.y >= -20.0 && p.position.y <= VIEW.height + 20.0));
    }

    #[test]
    fn cap_drops_oldest_first() {
        let mut engine = ParticleEngine::new(presets::pointer_petals().templates, Some(5));
        let mut rng = ParticleRng::new(1);
        engine.emit(&point(1.0, 1.0, 3, 0), &mut rng);
        engine.emit(&point(2.0, 2.0, 4, 0), &mut rng);

        assert_eq!(engine.len(), 5);
        assert_eq!(engine.dropped(), 2);
        assert_eq!(engine.peak(), 5);
        assert_eq!(engine.particles()[0].position, Vec2::new(1.0, 1.0));
        assert!(engine.particles()[1..]
            .iter()
            .all(|p| p.position == Vec2::new(2.0, 2.0)));
    }

    #[test]
    fn missing_template_is_ignored() {
        let mut engine = ParticleEngine::new(presets::fireworks().templates, None);
        let mut rng = ParticleRng::new(1);
        assert_eq!(engine.emit(&point(0.0, 0.0, 10, 3), &mut rng), 0);
        assert!(engine.is_empty());
    }

    #[test]
    fn reset_clears_statistics() {
        let mut engine = ParticleEngine::new(presets::fireworks().templates, None);
        let mut rng = ParticleRng::new(1);
        engine.emit(&point(0.0, 0.0, 10, 0), &mut rng);
        engine.clear();
        assert!(engine.is_empty());
        assert_eq!(engine.emitted(), 10);
        engine.reset();
        assert_eq!(engine.emitted(), 0);
        assert_eq!(engine.peak(), 0);
    }
}
