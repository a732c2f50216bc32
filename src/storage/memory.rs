use anyhow::Result;
use std::cell::RefCell;
use std::rc::Rc;

use super::{Snapshot, SnapshotStore};

/// In-process store. Clones share the same slot, so a caller can keep a
/// handle and inspect what the engine saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slot: Rc<RefCell<Option<Snapshot>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(snapshot))),
        }
    }

    /// Last saved snapshot, if any.
    pub fn saved(&self) -> Option<Snapshot> {
        self.slot.borrow().clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Snapshot {
        self.slot.borrow().clone().unwrap_or_default()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.slot.borrow_mut() = Some(snapshot.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
