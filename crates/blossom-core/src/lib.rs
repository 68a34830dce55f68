//! Blossom Core - Foundational types for the Blossom particle engine
//!
//! This crate provides the types that all other Blossom crates depend on:
//! - `Vec2`, `Size`, `Rect` - 2D spatial types in CSS-style logical pixels
//! - `Color` - straight (non-premultiplied) RGBA with CSS color parsing
//! - `ValueRange` - inclusive-exclusive float range for randomized attributes
//! - `DrawSurface` - the 2D drawing contract consumed by the render pass
//! - Error types and Result alias

mod error;
mod surface;
mod types;

pub use error::{BlossomError, Result};
pub use surface::{CompositeMode, DrawSurface};
pub use types::{Color, Rect, Size, ValueRange, Vec2};
