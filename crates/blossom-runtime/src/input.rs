//! Input source contract: pointer and viewport notifications

use blossom_core::{Size, Vec2};
use std::collections::BTreeMap;

/// A notification delivered by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    PointerMove { position: Vec2 },
    PointerClick { position: Vec2 },
    Resize { size: Size, device_pixel_ratio: f32 },
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::PointerMove { .. } => InputKind::PointerMove,
            InputEvent::PointerClick { .. } => InputKind::PointerClick,
            InputEvent::Resize { .. } => InputKind::Resize,
        }
    }
}

/// Notification categories a listener can subscribe to
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum InputKind {
    PointerMove,
    PointerClick,
    Resize,
}

/// Identifies one subscription
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ListenerId(pub u64);

/// Subscribe/unsubscribe to input notifications
pub trait InputSource {
    fn subscribe(&mut self, kind: InputKind) -> ListenerId;

    /// Returns false if the listener was not subscribed
    fn unsubscribe(&mut self, id: ListenerId) -> bool;
}

/// Listener bookkeeping for a host. Dispatch order is subscription order.
#[derive(Debug, Default)]
pub struct InputRegistry {
    next_id: u64,
    listeners: BTreeMap<ListenerId, InputKind>,
}

impl InputRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listeners interested in `kind`
    pub fn listeners_for(&self, kind: InputKind) -> Vec<ListenerId> {
        self.listeners
            .iter()
            .filter(|(_, k)| **k == kind)
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn is_subscribed(&self, id: ListenerId) -> bool {
        self.listeners.contains_key(&id)
    }

    /// Total live subscriptions
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl InputSource for InputRegistry {
    fn subscribe(&mut self, kind: InputKind) -> ListenerId {
        self.next_id += 1;
        let id = ListenerId(self.next_id);
        self.listeners.insert(id, kind);
        id
    }

    fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }
}
