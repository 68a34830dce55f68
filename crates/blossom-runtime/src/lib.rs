//! Blossom Runtime - Frame loop infrastructure
//!
//! Provides the host-side building blocks an effect is driven by:
//! - `FrameScheduler` / `ManualScheduler` - request/cancel per-frame callbacks by handle
//! - `InputSource` / `InputRegistry` - pointer and resize subscriptions by listener id
//! - `FrameClock` - converts frame timestamps into simulation ticks
//! - `FrameSystem` - trait for anything mounted on the frame loop
//! - `Stage` - single-threaded host that pumps frames and input into mounted systems

mod clock;
mod input;
mod scheduler;
mod stage;
mod system;

pub use clock::FrameClock;
pub use input::{InputEvent, InputKind, InputRegistry, InputSource, ListenerId};
pub use scheduler::{FrameHandle, FrameScheduler, ManualScheduler};
pub use stage::Stage;
pub use system::FrameSystem;
