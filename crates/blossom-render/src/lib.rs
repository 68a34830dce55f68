//! Blossom Render - software drawing surfaces
//!
//! Implementations of the `DrawSurface` contract used to host particle
//! effects outside a browser: a premultiplied-alpha CPU rasterizer with PNG
//! export, a recording surface for inspecting draw calls, and a counting
//! surface for headless simulation.

mod affine;
mod null;
mod raster;
mod recording;

pub use affine::Affine;
pub use null::{DrawStats, NullSurface};
pub use raster::RasterSurface;
pub use recording::{DrawCommand, EllipseFill, RecordingSurface};
