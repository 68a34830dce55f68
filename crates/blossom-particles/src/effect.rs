//! Surface/lifecycle adapter: one mounted effect on the frame loop

use crate::emission::{policy_for, EmissionPolicy, FrameContext, SpawnRequest};
use crate::emitter::EmitterConfig;
use crate::engine::ParticleEngine;
use crate::rand::ParticleRng;
use crate::render::RenderPass;
use blossom_core::{DrawSurface, Result};
use blossom_runtime::{
    FrameClock, FrameHandle, FrameScheduler, FrameSystem, InputEvent, InputKind, InputSource,
    ListenerId,
};

/// A particle effect bound to a drawing surface.
///
/// `start` acquires a frame request and input subscriptions; `stop` releases
/// every one of them and discards the active set. An effect whose surface
/// could not be acquired never schedules a frame.
pub struct Effect<S: DrawSurface> {
    config: EmitterConfig,
    surface: Option<S>,
    engine: ParticleEngine,
    policy: Box<dyn EmissionPolicy>,
    pass: RenderPass,
    seed: u32,
    rng: ParticleRng,
    clock: FrameClock,
    pending: Option<FrameHandle>,
    listeners: Vec<ListenerId>,
    frames: u64,
}

impl<S: DrawSurface> Effect<S> {
    /// Validate `config` and bind the acquired surface. A failed acquisition
    /// is kept as "no surface": the effect mounts but stays inert.
    pub fn new(config: EmitterConfig, surface: Result<S>, seed: u32) -> Result<Self> {
        config.validate()?;
        let surface = match surface {
            Ok(s) => Some(s),
            Err(e) => {
                log::debug!("[{}] {e}; effect disabled", config.name);
                None
            }
        };
        Ok(Self {
            engine: ParticleEngine::new(config.templates.clone(), config.max_particles),
            policy: policy_for(&config),
            pass: RenderPass::from_config(&config),
            rng: ParticleRng::new(seed),
            seed,
            clock: FrameClock::new(),
            pending: None,
            listeners: Vec::new(),
            frames: 0,
            surface,
            config,
        })
    }

    pub fn with_surface(config: EmitterConfig, surface: S, seed: u32) -> Result<Self> {
        Self::new(config, Ok(surface), seed)
    }

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn surface_mut(&mut self) -> Option<&mut S> {
        self.surface.as_mut()
    }

    pub fn engine(&self) -> &ParticleEngine {
        &self.engine
    }

    pub fn policy(&self) -> &dyn EmissionPolicy {
        self.policy.as_ref()
    }

    /// Live particles
    pub fn particle_count(&self) -> usize {
        self.engine.len()
    }

    /// Frames run since the last `start`
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn pending_frame(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn listeners(&self) -> &[ListenerId] {
        &self.listeners
    }

    fn frame_context(&self) -> Option<FrameContext> {
        self.surface.as_ref().map(|s| FrameContext {
            viewport: s.size(),
            frame: self.frames,
        })
    }

    fn emit_all(&mut self, requests: Vec<SpawnRequest>) {
        for request in &requests {
            self.engine.emit(request, &mut self.rng);
        }
    }

    fn device_pixel_ratio(&self, requested: f32) -> f32 {
        if self.config.hi_dpi && requested > 0.0 {
            requested
        } else {
            1.0
        }
    }
}

impl<S: DrawSurface> FrameSystem for Effect<S> {
    fn start(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        input: &mut dyn InputSource,
    ) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }
        let Some(ctx) = self.frame_context() else {
            log::debug!("[{}] no drawing surface; not starting", self.config.name);
            return Ok(());
        };

        self.rng = ParticleRng::new(self.seed);
        self.clock.reset();
        self.frames = 0;
        self.engine.reset();
        self.policy.reset();

        self.listeners.push(input.subscribe(InputKind::Resize));
        for kind in self.policy.input_kinds() {
            self.listeners.push(input.subscribe(*kind));
        }

        let initial = self.policy.initial(&ctx, &mut self.rng);
        self.emit_all(initial);

        self.pending = Some(scheduler.request_frame());
        log::debug!(
            "[{}] started with {} particle(s)",
            self.config.name,
            self.engine.len()
        );
        Ok(())
    }

    fn on_frame(
        &mut self,
        frame: FrameHandle,
        timestamp: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<bool> {
        if self.pending != Some(frame) {
            return Ok(false);
        }
        self.pending = None;
        let Some(ctx) = self.frame_context() else {
            return Ok(false);
        };

        let dt = if self.config.fixed_ticks {
            1.0
        } else {
            self.clock.advance(timestamp)
        };

        let requests = self.policy.decide(&ctx, &mut self.rng);
        self.emit_all(requests);
        self.engine.step(dt, ctx.viewport, &mut self.rng);
        if let Some(surface) = self.surface.as_mut() {
            self.pass.draw(surface, self.engine.particles());
        }
        self.frames += 1;

        self.pending = Some(scheduler.request_frame());
        Ok(true)
    }

    fn on_input(&mut self, listener: ListenerId, event: &InputEvent) -> Result<()> {
        if !self.listeners.contains(&listener) {
            return Ok(());
        }
        match *event {
            InputEvent::Resize {
                size,
                device_pixel_ratio,
            } => {
                let dpr = self.device_pixel_ratio(device_pixel_ratio);
                if let Some(surface) = self.surface.as_mut() {
                    surface.resize(size, dpr);
                }
            }
            InputEvent::PointerMove { .. } | InputEvent::PointerClick { .. } => {
                // Appended now, through the same path frame emission uses
                let requests = self.policy.on_input(event);
                self.emit_all(requests);
            }
        }
        Ok(())
    }

    fn stop(&mut self, scheduler: &mut dyn FrameScheduler, input: &mut dyn InputSource) {
        if !self.is_running() {
            return;
        }
        if let Some(handle) = self.pending.take() {
            scheduler.cancel_frame(handle);
        }
        for listener in self.listeners.drain(..) {
            input.unsubscribe(listener);
        }
        self.engine.clear();
        self.policy.reset();
        log::debug!(
            "[{}] stopped after {} frame(s)",
            self.config.name,
            self.frames
        );
    }

    fn is_running(&self) -> bool {
        self.pending.is_some() || !self.listeners.is_empty()
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;
    use blossom_core::{BlossomError, Size, Vec2};
    use blossom_render::RecordingSurface;
    use blossom_runtime::{InputRegistry, ManualScheduler, Stage};

    const VIEW: Size = Size::new(1024.0, 768.0);

    fn effect(config: EmitterConfig) -> Effect<RecordingSurface> {
        Effect::with_surface(config, RecordingSurface::new(VIEW), 42).unwrap()
    }

    fn run_frames(
        fx: &mut Effect<RecordingSurface>,
        sched: &mut ManualScheduler,
        frames: usize,
    ) -> usize {
        let mut ran = 0;
        for i in 0..frames {
            for handle in sched.take_due() {
                if fx.on_frame(handle, i as f64 / 60.0, sched).unwrap() {
                    ran += 1;
                }
            }
        }
        ran
    }

    #[test]
    fn ambient_start_prepopulates_target() {
        let mut fx = effect(presets::ambient_petals());
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
        assert_eq!(fx.particle_count(), 0);

        fx.start(&mut sched, &mut input).unwrap();
        assert_eq!(fx.particle_count(), 60);
        assert!(fx.is_running());
        assert_eq!(sched.pending_count(), 1);
        // Ambient needs resize only
        assert_eq!(input.listener_count(), 1);

        assert_eq!(run_frames(&mut fx, &mut sched, 120), 120);
        assert_eq!(fx.particle_count(), 60);
    }

    #[test]
    fn stop_then_start_is_fresh() {
        for (config, expected) in [
            (presets::ambient_petals(), 60),
            (presets::fireworks(), 0),
            (presets::pointer_petals(), 0),
        ] {
            let mut fx = effect(config);
            let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
            fx.start(&mut sched, &mut input).unwrap();
            run_frames(&mut fx, &mut sched, 200);
            for l in input.listeners_for(InputKind::PointerClick) {
                fx.on_input(
                    l,
                    &InputEvent::PointerClick {
                        position: Vec2::new(5.0, 5.0),
                    },
                )
                .unwrap();
            }

            fx.stop(&mut sched, &mut input);
            assert_eq!(fx.particle_count(), 0);
            fx.start(&mut sched, &mut input).unwrap();
            assert_eq!(fx.particle_count(), expected);
            assert_eq!(fx.frames(), 0);
        }
    }

    #[test]
    fn restart_replays_the_same_run() {
        let mut fx = effect(presets::fireworks());
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());

        fx.start(&mut sched, &mut input).unwrap();
        run_frames(&mut fx, &mut sched, 300);
        let first: Vec<_> = fx.engine().particles().to_vec();

        fx.stop(&mut sched, &mut input);
        fx.start(&mut sched, &mut input).unwrap();
        run_frames(&mut fx, &mut sched, 300);
        assert_eq!(fx.engine().particles(), first.as_slice());
    }

    #[test]
    fn no_frames_after_stop() {
        let mut fx = effect(presets::fireworks());
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
        fx.start(&mut sched, &mut input).unwrap();
        let handle = fx.pending_frame().unwrap();

        fx.stop(&mut sched, &mut input);
        assert_eq!(sched.pending_count(), 0);
        assert_eq!(input.listener_count(), 0);
        // A stale callback for the cancelled handle is ignored
        assert!(!fx.on_frame(handle, 0.0, &mut sched).unwrap());
        assert_eq!(fx.frames(), 0);
        assert_eq!(sched.pending_count(), 0);
    }

    #[test]
    fn stop_is_idempotent() {
        let mut fx = effect(presets::pointer_petals());
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
        fx.start(&mut sched, &mut input).unwrap();
        assert_eq!(input.listener_count(), 3);

        fx.stop(&mut sched, &mut input);
        fx.stop(&mut sched, &mut input);
        assert!(!fx.is_running());
        assert_eq!(input.listener_count(), 0);
        assert!(fx.listeners().is_empty());
    }

    #[test]
    fn start_twice_does_not_double_subscribe() {
        let mut fx = effect(presets::pointer_petals());
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
        fx.start(&mut sched, &mut input).unwrap();
        fx.start(&mut sched, &mut input).unwrap();
        assert_eq!(input.listener_count(), 3);
        assert_eq!(sched.pending_count(), 1);
    }

    #[test]
    fn pointer_events_append_exact_counts_at_exact_origin() {
        let mut fx = effect(presets::pointer_petals());
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
        fx.start(&mut sched, &mut input).unwrap();

        let at = Vec2::new(412.75, 99.5);
        let mv = input.listeners_for(InputKind::PointerMove)[0];
        let click = input.listeners_for(InputKind::PointerClick)[0];

        fx.on_input(mv, &InputEvent::PointerMove { position: at })
            .unwrap();
        assert_eq!(fx.particle_count(), 2);
        fx.on_input(click, &InputEvent::PointerClick { position: at })
            .unwrap();
        assert_eq!(fx.particle_count(), 22);
        assert!(fx.engine().particles().iter().all(|p| p.position == at));

        // Events for listeners the effect does not own change nothing
        fx.on_input(ListenerId(9999), &InputEvent::PointerClick { position: at })
            .unwrap();
        assert_eq!(fx.particle_count(), 22);
    }

    #[test]
    fn resize_keeps_particles() {
        let mut fx = effect(presets::fireworks());
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
        fx.start(&mut sched, &mut input).unwrap();
        run_frames(&mut fx, &mut sched, 400);
        let before = fx.particle_count();

        let resize = input.listeners_for(InputKind::Resize)[0];
        let size = Size::new(500.0, 300.0);
        fx.on_input(
            resize,
            &InputEvent::Resize {
                size,
                device_pixel_ratio: 2.0,
            },
        )
        .unwrap();

        assert_eq!(fx.particle_count(), before);
        let surface = fx.surface().unwrap();
        assert_eq!(surface.size(), size);
        assert_eq!(surface.pixel_size(), (1000, 600));
    }

    #[test]
    fn resize_ignores_dpr_without_hi_dpi() {
        let mut fx = effect(presets::ambient_petals());
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
        fx.start(&mut sched, &mut input).unwrap();
        let resize = input.listeners_for(InputKind::Resize)[0];
        fx.on_input(
            resize,
            &InputEvent::Resize {
                size: Size::new(200.0, 100.0),
                device_pixel_ratio: 3.0,
            },
        )
        .unwrap();
        assert_eq!(fx.surface().unwrap().pixel_size(), (200, 100));
        assert_eq!(fx.particle_count(), 60);
    }

    #[test]
    fn unavailable_surface_never_starts() {
        let mut fx: Effect<RecordingSurface> = Effect::new(
            presets::fireworks(),
            Err(BlossomError::SurfaceUnavailable("no 2d context".into())),
            1,
        )
        .unwrap();
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());

        fx.start(&mut sched, &mut input).unwrap();
        assert!(!fx.is_running());
        assert_eq!(sched.pending_count(), 0);
        assert_eq!(input.listener_count(), 0);
        fx.stop(&mut sched, &mut input);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = presets::fireworks();
        config.templates.clear();
        assert!(Effect::with_surface(config, RecordingSurface::new(VIEW), 1).is_err());
    }

    #[test]
    fn elapsed_ticks_when_not_fixed() {
        let mut config = presets::pointer_petals();
        config.fixed_ticks = false;
        let mut fx = effect(config);
        let (mut sched, mut input) = (ManualScheduler::new(), InputRegistry::new());
        fx.start(&mut sched, &mut input).unwrap();

        let mv = input.listeners_for(InputKind::PointerMove)[0];
        fx.on_input(
            mv,
            &InputEvent::PointerMove {
                position: Vec2::new(10.0, 10.0),
            },
        )
        .unwrap();

        // The first frame is one tick; later deltas clamp to 0.25 s (15 ticks)
        let h = sched.take_due()[0];
        fx.on_frame(h, 0.0, &mut sched).unwrap();
        assert_eq!(fx.particle_count(), 2);
        let h = sched.take_due()[0];
        fx.on_frame(h, 0.5, &mut sched).unwrap();
        // Trail opacity after 16 ticks: 1 - 0.02 * 16 > 0
        assert_eq!(fx.particle_count(), 2);
        let h = sched.take_due()[0];
        fx.on_frame(h, 0.75, &mut sched).unwrap();
        let h = sched.take_due()[0];
        fx.on_frame(h, 1.0, &mut sched).unwrap();
        let h = sched.take_due()[0];
        fx.on_frame(h, 1.25, &mut sched).unwrap();
        // 1 + 4 * 15 ticks = 61 ticks > 50
        assert_eq!(fx.particle_count(), 0);
    }

    #[test]
    fn stage_hosts_independent_effects() {
        let mut stage = Stage::new();
        stage.mount(effect(presets::ambient_petals()));
        stage.mount(effect(presets::fireworks()));
        stage.mount(effect(presets::pointer_petals()));
        stage.start_all().unwrap();

        for i in 0..100 {
            assert_eq!(stage.pump_frame(i as f64 / 60.0).unwrap(), 3);
            stage
                .dispatch(InputEvent::PointerMove {
                    position: Vec2::new(i as f32, 50.0),
                })
                .unwrap();
        }

        let systems = stage.systems();
        assert_eq!(systems[0].particle_count(), 60);
        assert!(systems[2].engine().emitted() == 200);
        assert_eq!(systems[0].engine().emitted(), 60);

        stage.stop_all();
        assert_eq!(stage.input().listener_count(), 0);
        assert_eq!(stage.scheduler().pending_count(), 0);
        assert_eq!(stage.pump_frame(2.0).unwrap(), 0);
    }
}
