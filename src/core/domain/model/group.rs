use crate::core::{
    domain::{
        error::{PrtgError, PrtgResult},
        model::{
            device::Device,
            entity::{EntityMut, EntityRef},
            node::Node,
            registry::Registry,
            sensor::Sensor,
            status::NodeKind,
        },
        service::tree_reconciler::{
            self, ChildSlot, Children, DocumentIds, ReconcileScope, TreeEntity,
        },
    },
    infrastructure::{api_client::ApiClient, document},
};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use xmltree::Element;

/// A probe is a group that sits directly below the root and carries
/// [`NodeKind::Probe`].
pub type Probe = Group;

/// A group (or probe) of the sensor tree with its nested groups and devices.
#[derive(Debug)]
pub struct Group {
    node: Node,
    groups: Vec<Group>,
    devices: Vec<Device>,
}

impl Group {
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut [Device] {
        &mut self.devices
    }

    /// All sensors below this group, depth first.
    pub fn sensors(&self) -> Vec<&Sensor> {
        let mut sensors: Vec<&Sensor> = self
            .devices
            .iter()
            .flat_map(|device| device.sensors())
            .collect();
        for group in &self.groups {
            sensors.extend(group.sensors());
        }
        sensors
    }

    /// Re-fetches this group's subtree and reconciles it in place.
    pub async fn refresh(&mut self, registry: &mut Registry) -> PrtgResult<()> {
        let api = Arc::clone(self.api());
        let fragment = api.sensor_tree(self.id()).await?;
        tree_reconciler::run(&fragment, &api, registry, None, |fragment, scope| {
            self.reconcile(fragment, scope)
        })
    }

    /// Fetches the group with this id and registers it with its subtree.
    ///
    /// # Errors
    /// `PrtgError::MalformedDocument` when the id denotes another kind.
    pub async fn fetch(api: Arc<ApiClient>, id: &str, registry: &mut Registry) -> PrtgResult<Self> {
        let fragment = api.sensor_tree(id).await?;
        let kind = match fragment.name.as_str() {
            "group" => NodeKind::Group,
            "probenode" => NodeKind::Probe,
            other => {
                return Err(PrtgError::malformed(format!(
                    "Object {} is a <{}>, not a group",
                    id, other
                )));
            }
        };
        let group = tree_reconciler::run(&fragment, &api, registry, None, |fragment, scope| {
            Group::build(kind, fragment, scope)
        })?;
        registry.insert(kind, group.id());
        Ok(group)
    }

    pub(crate) fn find(&self, id: &str) -> Option<EntityRef<'_>> {
        if self.id() == id {
            return Some(EntityRef::Group(self));
        }
        self.devices
            .iter()
            .find_map(|device| device.find(id))
            .or_else(|| self.groups.iter().find_map(|group| group.find(id)))
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<EntityMut<'_>> {
        if self.id() == id {
            return Some(EntityMut::Group(self));
        }
        if let Some(found) = self.devices.iter_mut().find_map(|device| device.find_mut(id)) {
            return Some(found);
        }
        self.groups.iter_mut().find_map(|group| group.find_mut(id))
    }
}

impl TreeEntity for Group {
    fn entity_id(&self) -> &str {
        self.node.id()
    }

    fn build(kind: NodeKind, fragment: &Element, scope: &mut ReconcileScope<'_>) -> PrtgResult<Self> {
        let id = document::fragment_id(fragment)?;
        let mut group = Group {
            node: Node::new(kind, id, Arc::clone(scope.api)),
            groups: Vec::new(),
            devices: Vec::new(),
        };
        group.reconcile(fragment, scope)?;
        Ok(group)
    }

    fn reconcile(&mut self, fragment: &Element, scope: &mut ReconcileScope<'_>) -> PrtgResult<()> {
        let Group {
            node,
            groups,
            devices,
        } = self;
        let mut group_slot = Children::new(NodeKind::Group, groups);
        let mut device_slot = Children::new(NodeKind::Device, devices);
        let mut slots: [&mut dyn ChildSlot; 2] = [&mut group_slot, &mut device_slot];
        tree_reconciler::reconcile_fragment(fragment, node, &mut slots, scope)
    }

    fn unregister(&self, registry: &mut Registry, present: &DocumentIds) {
        if !present.contains(self.kind(), self.id()) {
            registry.remove(self.kind(), self.id());
        }
        for group in &self.groups {
            group.unregister(registry, present);
        }
        for device in &self.devices {
            device.unregister(registry, present);
        }
    }
}

impl Deref for Group {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl DerefMut for Group {
    fn deref_mut(&mut self) -> &mut Node {
        &mut self.node
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node, f)
    }
}
