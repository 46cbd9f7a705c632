//! Per-client index of every probe, group, device and sensor.

use crate::core::domain::model::status::NodeKind;
use std::collections::HashMap;

/// Ids of the tree objects a client currently mirrors, by kind.
///
/// Owned by one [`PrtgClient`](crate::PrtgClient) and kept in step with the
/// tree by every reconciliation: objects are registered when built and
/// unregistered, with their descendants, when they disappear remotely.
/// Channels are never registered.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Registry {
    by_kind: HashMap<NodeKind, Vec<String>>,
    kinds: HashMap<String, NodeKind>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, kind: NodeKind, id: &str) {
        if self.kinds.insert(id.to_string(), kind).is_none() {
            self.by_kind.entry(kind).or_default().push(id.to_string());
        }
    }

    pub(crate) fn remove(&mut self, kind: NodeKind, id: &str) {
        if self.kinds.get(id) == Some(&kind) {
            self.kinds.remove(id);
            if let Some(ids) = self.by_kind.get_mut(&kind) {
                ids.retain(|known| known != id);
            }
        }
    }

    /// Whether an object of `kind` with this id is mirrored.
    pub fn contains(&self, kind: NodeKind, id: &str) -> bool {
        self.kinds.get(id) == Some(&kind)
    }

    /// Kind of the mirrored object with this id.
    pub fn kind_of(&self, id: &str) -> Option<NodeKind> {
        self.kinds.get(id).copied()
    }

    /// Ids of one kind, in registration order.
    pub fn ids(&self, kind: NodeKind) -> &[String] {
        self.by_kind.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}
