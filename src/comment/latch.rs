use std::collections::HashSet;
use std::sync::Mutex;

use uuid::Uuid;

use crate::comment::model::EntityRef;

/// One viewer's view of one thread; like toggles are serialized per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThreadKey {
    pub viewer_id: Uuid,
    pub entity: EntityRef,
}

/// Busy flags for in-flight like toggles. At most one toggle per thread key
/// runs at a time; a second request is turned away, not queued.
#[derive(Default)]
pub struct LikeLatches {
    busy: Mutex<HashSet<ThreadKey>>,
}

impl LikeLatches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the latch for `key`, or `None` while another toggle holds it
    pub fn try_acquire(&self, key: ThreadKey) -> Option<LatchGuard<'_>> {
        let mut busy = self.busy.lock().unwrap_or_else(|e| e.into_inner());
        if busy.insert(key) {
            Some(LatchGuard { latches: self, key })
        } else {
            None
        }
    }

    #[cfg(test)]
    pub fn is_busy(&self, key: &ThreadKey) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(key)
    }
}

/// Releases the latch when the toggle finishes, successfully or not
pub struct LatchGuard<'a> {
    latches: &'a LikeLatches,
    key: ThreadKey,
}

impl Drop for LatchGuard<'_> {
    fn drop(&mut self) {
        self.latches
            .busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.key);
    }
}
