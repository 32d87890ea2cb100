#![forbid(unsafe_code)]

//! Pointer listener bookkeeping.
//!
//! Listeners are plain keys rather than closures: the owning element and a
//! handler discriminant. The host routes a dispatched event back to the
//! owner, so no callback ever needs shared mutable access to its element.

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::NodeId;

/// Pointer events delivered to listener targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Pointer entered the target's box.
    Enter,
    /// Pointer left the target's box.
    Leave,
}

/// Owner-scoped handler discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub u32);

/// Identity of one bound listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerKey {
    /// Element whose handler runs.
    pub owner: NodeId,
    /// Which of the owner's handlers runs.
    pub handler: HandlerId,
}

/// A pointer event as seen by a handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    pub kind: PointerEventKind,
    pub target: NodeId,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ListenerTable {
    bound: AHashMap<(NodeId, PointerEventKind), SmallVec<[ListenerKey; 2]>>,
}

impl ListenerTable {
    pub(crate) fn add(&mut self, target: NodeId, kind: PointerEventKind, key: ListenerKey) {
        let keys = self.bound.entry((target, kind)).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    pub(crate) fn remove(&mut self, target: NodeId, kind: PointerEventKind, key: ListenerKey) -> bool {
        let Some(keys) = self.bound.get_mut(&(target, kind)) else {
            return false;
        };
        let Some(pos) = keys.iter().position(|k| *k == key) else {
            return false;
        };
        keys.remove(pos);
        if keys.is_empty() {
            self.bound.remove(&(target, kind));
        }
        true
    }

    pub(crate) fn get(&self, target: NodeId, kind: PointerEventKind) -> &[ListenerKey] {
        self.bound
            .get(&(target, kind))
            .map_or(&[][..], |keys| keys.as_slice())
    }

    pub(crate) fn len(&self) -> usize {
        self.bound.values().map(SmallVec::len).sum()
    }
}
