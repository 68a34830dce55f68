//! Frame scheduler contract and a deterministic implementation

/// Opaque handle for a requested frame callback
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct FrameHandle(pub u64);

/// Requests a callback before the next repaint, or cancels one.
pub trait FrameScheduler {
    /// Request a frame callback; the returned handle identifies it
    fn request_frame(&mut self) -> FrameHandle;

    /// Cancel a pending request. Returns false if it was not pending.
    fn cancel_frame(&mut self, handle: FrameHandle) -> bool;
}

/// Scheduler driven explicitly by the host: every `take_due` call is one
/// vsync, handing out the requests made before it. Requests made while those
/// callbacks run land in the following vsync.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next_id: u64,
    pending: Vec<FrameHandle>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain the requests due at this vsync, in request order
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_pending(&self, handle: FrameHandle) -> bool {
        self.pending.contains(&handle)
    }

    /// Number of outstanding requests
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.pending.push(handle);
        handle
    }

    fn cancel_frame(&mut self, handle: FrameHandle) -> bool {
        let before = self.pending.len();
        self.pending.retain(|h| *h != handle);
        self.pending.len() != before
    }
}
