//! Handle pools, one per spawnable kind
//!
//! A handle is either on the free list or checked out, never both. Releasing a
//! handle that is not checked out does nothing, so duplicate despawn requests
//! (an entity leaving the screen after it was already collected) are harmless.

use serde::{Deserialize, Serialize};

use super::state::{EntityHandle, EntityKind};
use crate::tuning::PoolPrewarm;

/// Reusable store of handles for a single kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPool {
    kind: EntityKind,
    /// Inactive handles, last released is reused first
    free: Vec<EntityHandle>,
    /// Checked-out flag per slot
    checked_out: Vec<bool>,
}

impl ObjectPool {
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            free: Vec::new(),
            checked_out: Vec::new(),
        }
    }

    /// Pool with `count` handles already on the free list
    pub fn with_prewarmed(kind: EntityKind, count: usize) -> Self {
        let mut pool = Self::new(kind);
        pool.free.reserve(count);
        pool.checked_out.reserve(count);
        for _ in 0..count {
            let handle = pool.mint();
            pool.free.push(handle);
        }
        // Hand out slot 0 first
        pool.free.reverse();
        pool
    }

    #[inline]
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Take a free handle, or create one if the free list is empty
    pub fn acquire(&mut self) -> EntityHandle {
        let handle = match self.free.pop() {
            Some(handle) => handle,
            None => {
                let handle = self.mint();
                log::trace!("Pool {:?} grew to {}", self.kind, self.checked_out.len());
                handle
            }
        };
        self.checked_out[handle.slot as usize] = true;
        handle
    }

    /// Return a handle. False (and no change) if it was not checked out here.
    pub fn release(&mut self, handle: EntityHandle) -> bool {
        if !self.is_checked_out(handle) {
            return false;
        }
        self.checked_out[handle.slot as usize] = false;
        self.free.push(handle);
        true
    }

    pub fn is_checked_out(&self, handle: EntityHandle) -> bool {
        handle.kind == self.kind
            && self
                .checked_out
                .get(handle.slot as usize)
                .copied()
                .unwrap_or(false)
    }

    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    pub fn active_len(&self) -> usize {
        self.checked_out.len() - self.free.len()
    }

    /// Total handles ever created
    pub fn capacity(&self) -> usize {
        self.checked_out.len()
    }

    fn mint(&mut self) -> EntityHandle {
        let handle = EntityHandle {
            kind: self.kind,
            slot: self.checked_out.len() as u32,
        };
        self.checked_out.push(false);
        handle
    }
}

/// One pool per [`EntityKind`], indexed by the kind tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSet {
    pools: Vec<ObjectPool>,
}

impl PoolSet {
    pub fn new(prewarm: &PoolPrewarm) -> Self {
        Self {
            pools: EntityKind::ALL
                .iter()
                .map(|&kind| ObjectPool::with_prewarmed(kind, prewarm.for_kind(kind)))
                .collect(),
        }
    }

    #[inline]
    pub fn get(&self, kind: EntityKind) -> &ObjectPool {
        &self.pools[kind.index()]
    }

    #[inline]
    pub fn acquire(&mut self, kind: EntityKind) -> EntityHandle {
        self.pools[kind.index()].acquire()
    }

    #[inline]
    pub fn release(&mut self, handle: EntityHandle) -> bool {
        self.pools[handle.kind.index()].release(handle)
    }

    pub fn is_checked_out(&self, handle: EntityHandle) -> bool {
        self.get(handle.kind).is_checked_out(handle)
    }
}
