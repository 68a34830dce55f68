//! CLI command implementations

pub mod host;
pub mod presets;
pub mod render;
pub mod simulate;
