//! Merges sensor tree fragments into the mirrored object tree.
//!
//! A fragment is the XML element of one object as found in a
//! `content=sensortree` answer. Reconciling it against an existing object
//! updates the object's scalar fields in place, updates children that are
//! still reported, builds children that are new and drops children that are
//! gone, keeping the [`Registry`] in step. Children that survive keep their
//! identity and their position in the collection.

use crate::core::{
    domain::{
        error::{PrtgError, PrtgResult},
        model::{node::Node, registry::Registry, status::NodeKind},
    },
    infrastructure::{api_client::ApiClient, document},
};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use xmltree::Element;

/// Element names that denote child objects rather than scalar fields.
const STRUCTURAL_TAGS: [&str; 4] = ["probenode", "group", "device", "sensor"];

/// Counters of one reconciliation run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Structural ids of one fetched document, by element name.
///
/// An object pruned from one parent may have moved to another parent of the
/// same document; its registry entry stays as long as its id is listed here.
#[derive(Debug, Default)]
pub(crate) struct DocumentIds(HashMap<String, HashSet<String>>);

impl DocumentIds {
    /// Whether the document lists an object of `kind` with this id.
    pub(crate) fn contains(&self, kind: NodeKind, id: &str) -> bool {
        kind.tag()
            .and_then(|tag| self.0.get(tag))
            .is_some_and(|ids| ids.contains(id))
    }

    fn insert(&mut self, tag: &str, id: String) -> bool {
        self.0.entry(tag.to_string()).or_default().insert(id)
    }
}

/// Everything a reconciliation needs besides the fragment.
pub(crate) struct ReconcileScope<'a> {
    pub(crate) api: &'a Arc<ApiClient>,
    pub(crate) registry: &'a mut Registry,
    /// Id of the object whose children are being reconciled.
    pub(crate) parent_id: Option<&'a str>,
    present: &'a DocumentIds,
    stats: &'a mut ReconcileStats,
}

impl ReconcileScope<'_> {
    fn nested<'b>(&'b mut self, parent_id: &'b str) -> ReconcileScope<'b> {
        ReconcileScope {
            api: self.api,
            registry: &mut *self.registry,
            parent_id: Some(parent_id),
            present: self.present,
            stats: &mut *self.stats,
        }
    }
}

/// An object that lives in a child collection of the tree.
pub(crate) trait TreeEntity: Sized {
    fn entity_id(&self) -> &str;

    /// Builds a new object of `kind` from its fragment.
    fn build(kind: NodeKind, fragment: &Element, scope: &mut ReconcileScope<'_>) -> PrtgResult<Self>;

    /// Merges a fragment of this same object into it.
    fn reconcile(&mut self, fragment: &Element, scope: &mut ReconcileScope<'_>) -> PrtgResult<()>;

    /// Removes this object and its descendants from the registry, except
    /// those `present` still lists.
    fn unregister(&self, registry: &mut Registry, present: &DocumentIds);
}

/// One child collection of an object, keyed by element name.
pub(crate) trait ChildSlot {
    fn tag(&self) -> &'static str;

    fn upsert(
        &mut self,
        id: &str,
        fragment: &Element,
        scope: &mut ReconcileScope<'_>,
    ) -> PrtgResult<()>;

    fn prune(&mut self, seen: &HashSet<String>, scope: &mut ReconcileScope<'_>);
}

/// A `Vec` of tree entities of one kind.
pub(crate) struct Children<'c, T> {
    kind: NodeKind,
    items: &'c mut Vec<T>,
}

impl<'c, T> Children<'c, T> {
    pub(crate) fn new(kind: NodeKind, items: &'c mut Vec<T>) -> Self {
        Self { kind, items }
    }
}

impl<T: TreeEntity> ChildSlot for Children<'_, T> {
    fn tag(&self) -> &'static str {
        self.kind.tag().unwrap_or_default()
    }

    fn upsert(
        &mut self,
        id: &str,
        fragment: &Element,
        scope: &mut ReconcileScope<'_>,
    ) -> PrtgResult<()> {
        match self.items.iter_mut().find(|item| item.entity_id() == id) {
            Some(existing) => {
                existing.reconcile(fragment, scope)?;
                scope.stats.updated += 1;
            }
            None => {
                let entity = T::build(self.kind, fragment, scope)?;
                scope.registry.insert(self.kind, id);
                self.items.push(entity);
                scope.stats.added += 1;
            }
        }
        Ok(())
    }

    fn prune(&mut self, seen: &HashSet<String>, scope: &mut ReconcileScope<'_>) {
        let registry = &mut *scope.registry;
        let present = scope.present;
        let stats = &mut *scope.stats;
        self.items.retain(|item| {
            let keep = seen.contains(item.entity_id());
            if !keep {
                item.unregister(registry, present);
                stats.removed += 1;
            }
            keep
        });
    }
}

/// Checks the ids of every structural element below `fragment` and returns
/// them.
///
/// Runs before any mutation, so a rejected document leaves the tree as it
/// was.
///
/// # Errors
/// `PrtgError::MalformedDocument` for a structural element without an id or
/// for two elements of the same kind sharing one anywhere in the document.
pub(crate) fn validate_fragment(fragment: &Element) -> PrtgResult<DocumentIds> {
    let mut ids = DocumentIds::default();
    collect_ids(fragment, &mut ids)?;
    Ok(ids)
}

fn collect_ids(fragment: &Element, ids: &mut DocumentIds) -> PrtgResult<()> {
    for child in document::child_elements(fragment) {
        if !STRUCTURAL_TAGS.contains(&child.name.as_str()) {
            continue;
        }
        let id = document::fragment_id(child)?;
        if !ids.insert(&child.name, id.clone()) {
            return Err(PrtgError::malformed(format!(
                "Duplicate <{}> id {} (again below <{}>)",
                child.name, id, fragment.name
            )));
        }
        collect_ids(child, ids)?;
    }
    Ok(())
}

/// Merges one fragment into `node` and the given child collections.
///
/// Children whose element name matches a slot are upserted into it; every
/// other child element becomes a scalar property holding its text. Children
/// of a slot that the fragment no longer lists are pruned afterwards.
pub(crate) fn reconcile_fragment(
    fragment: &Element,
    node: &mut Node,
    slots: &mut [&mut dyn ChildSlot],
    scope: &mut ReconcileScope<'_>,
) -> PrtgResult<()> {
    let mut seen: Vec<HashSet<String>> = vec![HashSet::new(); slots.len()];

    for child in document::child_elements(fragment) {
        match slots.iter().position(|slot| slot.tag() == child.name) {
            Some(index) => {
                let id = document::fragment_id(child)?;
                slots[index].upsert(&id, child, &mut scope.nested(node.id()))?;
                seen[index].insert(id);
            }
            None => node.apply_property(&child.name, document::element_text(child)),
        }
    }
    node.apply_attributes(fragment);

    for (slot, seen) in slots.iter_mut().zip(&seen) {
        slot.prune(seen, scope);
    }
    Ok(())
}

/// Validates a fragment, then hands it to `apply` with a fresh scope.
pub(crate) fn run<T, F>(
    fragment: &Element,
    api: &Arc<ApiClient>,
    registry: &mut Registry,
    parent_id: Option<&str>,
    apply: F,
) -> PrtgResult<T>
where
    F: FnOnce(&Element, &mut ReconcileScope<'_>) -> PrtgResult<T>,
{
    let present = validate_fragment(fragment)?;

    let mut stats = ReconcileStats::default();
    let mut scope = ReconcileScope {
        api,
        registry,
        parent_id,
        present: &present,
        stats: &mut stats,
    };
    let result = apply(fragment, &mut scope)?;

    debug!(
        fragment = %fragment.name,
        added = stats.added,
        updated = stats.updated,
        removed = stats.removed,
        "Reconciled sensor tree"
    );
    Ok(result)
}
