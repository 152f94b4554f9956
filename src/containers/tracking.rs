//! Resolution stack and dependency edges shared by a container chain.

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Weak;

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard};

use crate::interfaces::container::{Container, ServiceName};

static NEXT_CONTAINER: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(pub u64);

impl ContainerId {
    pub fn next() -> Self {
        ContainerId(NEXT_CONTAINER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A service of a given container.
///
/// Used both as a frame of the resolution stack and as a dependency edge.
/// Equality and hashing only look at the name and the owner's identity.
#[derive(Clone)]
pub struct Dependent {
    name: ServiceName,
    owner: ContainerId,
    handle: Weak<dyn Container>,
}

impl Dependent {
    pub fn new(name: ServiceName, owner: ContainerId, handle: Weak<dyn Container>) -> Self {
        Self {
            name,
            owner,
            handle,
        }
    }

    pub fn name(&self) -> &ServiceName {
        &self.name
    }

    pub fn owner(&self) -> ContainerId {
        self.owner
    }

    /// Deep-deletes this service from its owner. A dropped owner has nothing
    /// left to evict.
    pub(crate) fn evict(&self) -> bool {
        match self.handle.upgrade() {
            Some(owner) => owner.delete(&self.name, true),
            None => true,
        }
    }
}

impl PartialEq for Dependent {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name
    }
}

impl Eq for Dependent {}

impl Hash for Dependent {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.owner.hash(state);
    }
}

impl fmt::Debug for Dependent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dependent")
            .field("name", &self.name)
            .field("owner", &self.owner)
            .finish()
    }
}

/// State shared by every container of a chain.
///
/// The root container creates it and descendants borrow the root's, so a
/// provider running in a descendant is still on the stack when it reaches
/// into an ancestor.
#[derive(Debug, Default)]
pub struct Tracker {
    chain: ReentrantMutex<()>,
    stack: Mutex<Vec<Dependent>>,
    evicting: Mutex<HashSet<Dependent>>,
}

impl Tracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes resolution and deletion across the chain. Reentrant, so
    /// providers may resolve further services on the same thread.
    pub fn lock(&self) -> ReentrantMutexGuard<'_, ()> {
        self.chain.lock()
    }

    /// Pushes `frame` for the duration of a provider invocation. The frame is
    /// popped when the guard drops, including on error or panic.
    pub fn track(&self, frame: Dependent) -> Tracking<'_> {
        self.stack.lock().push(frame);
        Tracking { tracker: self }
    }

    /// Innermost provider invocation in progress.
    pub fn current(&self) -> Option<Dependent> {
        self.stack.lock().last().cloned()
    }

    pub fn depth(&self) -> usize {
        self.stack.lock().len()
    }

    /// Marks `target` as having its dependents evicted. `None` when an outer
    /// deletion is already cascading from it.
    pub(crate) fn evict(&self, target: Dependent) -> Option<Eviction<'_>> {
        if !self.evicting.lock().insert(target.clone()) {
            return None;
        }
        Some(Eviction {
            tracker: self,
            target,
        })
    }
}

#[must_use]
pub struct Tracking<'a> {
    tracker: &'a Tracker,
}

impl Drop for Tracking<'_> {
    fn drop(&mut self) {
        self.tracker.stack.lock().pop();
    }
}

#[must_use]
pub(crate) struct Eviction<'a> {
    tracker: &'a Tracker,
    target: Dependent,
}

impl Drop for Eviction<'_> {
    fn drop(&mut self) {
        self.tracker.evicting.lock().remove(&self.target);
    }
}
