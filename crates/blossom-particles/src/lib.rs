//! Blossom Particles - configurable 2D particle effects
//!
//! Provides per-effect particle simulation with:
//! - Three emission policies (continuous ambient, probabilistic bursts, pointer-driven)
//! - Fading and recycling lifecycles with optional horizontal sway
//! - Insertion-ordered active set with a single-pass prune per frame
//! - Clear or trail backgrounds, source-over or additive blending
//! - TOML-configurable emitters layered over named presets

pub mod effect;
pub mod emission;
pub mod emitter;
pub mod engine;
pub mod particle;
pub mod presets;
pub mod rand;
pub mod render;

pub use effect::Effect;
pub use emission::{
    policy_for, AmbientPolicy, BurstPolicy, EmissionPolicy, FrameContext, PointerPolicy,
    SpawnOrigin, SpawnRequest,
};
pub use emitter::{
    EmissionKind, EmitterConfig, ForceOrder, LifecycleSpec, PaletteEntry, ParticleShape,
    ParticleTemplate, RenderMode, SwaySpec, VelocitySpec,
};
pub use engine::ParticleEngine;
pub use particle::{Lifecycle, Particle, Sway};
pub use rand::ParticleRng;
pub use render::RenderPass;
