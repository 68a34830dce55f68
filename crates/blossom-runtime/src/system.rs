//! Frame system trait

use crate::input::{InputEvent, InputSource, ListenerId};
use crate::scheduler::{FrameHandle, FrameScheduler};
use blossom_core::Result;

/// Something mounted on the frame loop.
///
/// A system acquires its own frame requests and input subscriptions in
/// `start` and must release all of them in `stop`. Callbacks carrying a
/// handle or listener the system does not own are ignored.
pub trait FrameSystem {
    /// Acquire subscriptions and request the first frame
    fn start(
        &mut self,
        scheduler: &mut dyn FrameScheduler,
        input: &mut dyn InputSource,
    ) -> Result<()>;

    /// Run one frame. Returns true if `frame` belonged to this system.
    fn on_frame(
        &mut self,
        frame: FrameHandle,
        timestamp: f64,
        scheduler: &mut dyn FrameScheduler,
    ) -> Result<bool>;

    /// Handle an input notification delivered to `listener`
    fn on_input(&mut self, listener: ListenerId, event: &InputEvent) -> Result<()>;

    /// Cancel the pending frame and release every subscription. Idempotent.
    fn stop(&mut self, scheduler: &mut dyn FrameScheduler, input: &mut dyn InputSource);

    fn is_running(&self) -> bool;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
