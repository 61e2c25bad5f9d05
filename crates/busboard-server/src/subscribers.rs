//! Registry of connected push subscribers.
//!
//! Each `WebSocket` connection registers itself and holds a
//! [`SubscriberGuard`]. Dropping the guard removes the entry, so a
//! subscriber disappears from the registry on every exit path of its
//! connection task.

use std::collections::BTreeMap;
use std::sync::Arc;

use busboard_types::SubscriberId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::debug;

/// Bookkeeping for one connected subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberInfo {
    /// Subscriber identity.
    pub id: SubscriberId,
    /// When the connection was registered.
    pub connected_at: DateTime<Utc>,
}

/// Thread-safe set of connected subscribers.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<BTreeMap<SubscriberId, SubscriberInfo>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber. The entry lives as long as the returned
    /// guard.
    pub fn register(self: &Arc<Self>) -> SubscriberGuard {
        let id = SubscriberId::new();
        let info = SubscriberInfo {
            id,
            connected_at: Utc::now(),
        };
        let active = {
            let mut subscribers = self.subscribers.write();
            subscribers.insert(id, info);
            subscribers.len()
        };
        debug!(subscriber = %id, active, "subscriber registered");
        SubscriberGuard {
            id,
            registry: Arc::clone(self),
        }
    }

    /// Remove a subscriber, returning its entry if it was registered.
    pub fn remove(&self, id: SubscriberId) -> Option<SubscriberInfo> {
        self.subscribers.write().remove(&id)
    }

    /// Number of connected subscribers.
    pub fn len(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Whether no subscriber is connected.
    pub fn is_empty(&self) -> bool {
        self.subscribers.read().is_empty()
    }
}

/// Registration handle; unregisters the subscriber when dropped.
#[derive(Debug)]
pub struct SubscriberGuard {
    id: SubscriberId,
    registry: Arc<SubscriberRegistry>,
}

impl SubscriberGuard {
    /// The registered subscriber's id.
    pub const fn id(&self) -> SubscriberId {
        self.id
    }
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        if let Some(info) = self.registry.remove(self.id) {
            let connected_secs = Utc::now()
                .signed_duration_since(info.connected_at)
                .num_seconds();
            debug!(subscriber = %self.id, connected_secs, "subscriber unregistered");
        }
    }
}
