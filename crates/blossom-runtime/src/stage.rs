//! Single-threaded host loop
//!
//! The stage owns the scheduler and input registry for every mounted system.
//! Frames and input events are delivered one at a time, so an input-driven
//! emission can never interleave with a frame's advance/prune pass.

use crate::input::{InputEvent, InputRegistry};
use crate::scheduler::ManualScheduler;
use crate::system::FrameSystem;
use blossom_core::Result;

pub struct Stage<T: FrameSystem> {
    scheduler: ManualScheduler,
    input: InputRegistry,
    systems: Vec<T>,
    frames: u64,
}

impl<T: FrameSystem> Default for Stage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FrameSystem> Stage<T> {
    pub fn new() -> Self {
        Self {
            scheduler: ManualScheduler::new(),
            input: InputRegistry::new(),
            systems: Vec::new(),
            frames: 0,
        }
    }

    /// Mount a system (not started). Returns its index.
    pub fn mount(&mut self, system: T) -> usize {
        self.systems.push(system);
        self.systems.len() - 1
    }

    pub fn start_all(&mut self) -> Result<()> {
        for system in &mut self.systems {
            system.start(&mut self.scheduler, &mut self.input)?;
            log::debug!("[stage] started {}", system.name());
        }
        Ok(())
    }

    pub fn start(&mut self, index: usize) -> Result<()> {
        if let Some(system) = self.systems.get_mut(index) {
            system.start(&mut self.scheduler, &mut self.input)?;
        }
        Ok(())
    }

    pub fn stop(&mut self, index: usize) {
        if let Some(system) = self.systems.get_mut(index) {
            system.stop(&mut self.scheduler, &mut self.input);
        }
    }

    pub fn stop_all(&mut self) {
        for system in &mut self.systems {
            system.stop(&mut self.scheduler, &mut self.input);
        }
    }

    /// Run one vsync at `timestamp` seconds. Returns the number of frame
    /// callbacks executed.
    pub fn pump_frame(&mut self, timestamp: f64) -> Result<usize> {
        let due = self.scheduler.take_due();
        let mut executed = 0;
        for handle in due {
            for system in &mut self.systems {
                if system.on_frame(handle, timestamp, &mut self.scheduler)? {
                    executed += 1;
                    break;
                }
            }
        }
        self.frames += 1;
        Ok(executed)
    }

    /// Deliver an input event to every subscribed listener
    pub fn dispatch(&mut self, event: InputEvent) -> Result<()> {
        for listener in self.input.listeners_for(event.kind()) {
            for system in &mut self.systems {
                system.on_input(listener, &event)?;
            }
        }
        Ok(())
    }

    pub fn systems(&self) -> &[T] {
        &self.systems
    }

    pub fn system_mut(&mut self, index: usize) -> Option<&mut T> {
        self.systems.get_mut(index)
    }

    pub fn scheduler(&self) -> &ManualScheduler {
        &self.scheduler
    }

    pub fn input(&self) -> &InputRegistry {
        &self.input
    }

    /// Vsyncs pumped so far
    pub fn frame_count(&self) -> u64 {
        self.frames
    }
}
