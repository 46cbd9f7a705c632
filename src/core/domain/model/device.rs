use crate::core::{
    domain::{
        error::{PrtgError, PrtgResult},
        model::{
            entity::{EntityMut, EntityRef},
            node::Node,
            registry::Registry,
            sensor::Sensor,
            status::{NodeKind, Status},
        },
        service::tree_reconciler::{
            self, ChildSlot, Children, DocumentIds, ReconcileScope, TreeEntity,
        },
    },
    infrastructure::{api_client::ApiClient, document},
};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use xmltree::Element;

/// Status buckets a device index always carries, even when empty.
const INDEXED_STATUSES: [Status; 4] = [Status::Up, Status::Down, Status::Warning, Status::Paused];

/// A monitored device with its sensors.
#[derive(Debug)]
pub struct Device {
    node: Node,
    sensors: Vec<Sensor>,
    sensors_by_status: BTreeMap<String, Vec<String>>,
}

impl Device {
    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    pub fn sensors_mut(&mut self) -> &mut [Sensor] {
        &mut self.sensors
    }

    pub fn sensor(&self, id: &str) -> Option<&Sensor> {
        self.sensors.iter().find(|sensor| sensor.id() == id)
    }

    pub fn sensor_mut(&mut self, id: &str) -> Option<&mut Sensor> {
        self.sensors.iter_mut().find(|sensor| sensor.id() == id)
    }

    /// Sensor ids grouped by status text, as of the last reconciliation.
    ///
    /// `Up`, `Down`, `Warning` and `Paused` are always present; other status
    /// texts get a bucket when some sensor reports them.
    pub fn sensors_by_status(&self) -> &BTreeMap<String, Vec<String>> {
        &self.sensors_by_status
    }

    /// Sensors currently reporting `status`.
    pub fn sensors_with_status(&self, status: &Status) -> Vec<&Sensor> {
        self.sensors_by_status
            .get(status.as_str())
            .into_iter()
            .flatten()
            .filter_map(|id| self.sensor(id))
            .collect()
    }

    /// Changes the address the device is monitored at.
    pub async fn set_host(&mut self, host: &str) -> PrtgResult<()> {
        self.set_property("host", host).await
    }

    /// Re-fetches this device's subtree and reconciles it in place.
    pub async fn refresh(&mut self, registry: &mut Registry) -> PrtgResult<()> {
        let api = Arc::clone(self.api());
        let fragment = api.sensor_tree(self.id()).await?;
        tree_reconciler::run(&fragment, &api, registry, None, |fragment, scope| {
            self.reconcile(fragment, scope)
        })
    }

    /// Fetches the device with this id and registers it with its sensors.
    ///
    /// # Errors
    /// `PrtgError::MalformedDocument` when the id denotes another kind.
    pub async fn fetch(api: Arc<ApiClient>, id: &str, registry: &mut Registry) -> PrtgResult<Self> {
        let fragment = api.sensor_tree(id).await?;
        if fragment.name != "device" {
            return Err(PrtgError::malformed(format!(
                "Object {} is a <{}>, not a device",
                id, fragment.name
            )));
        }
        let device = tree_reconciler::run(&fragment, &api, registry, None, |fragment, scope| {
            Device::build(NodeKind::Device, fragment, scope)
        })?;
        registry.insert(NodeKind::Device, device.id());
        Ok(device)
    }

    pub(crate) fn find(&self, id: &str) -> Option<EntityRef<'_>> {
        if self.id() == id {
            return Some(EntityRef::Device(self));
        }
        self.sensor(id).map(EntityRef::Sensor)
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<EntityMut<'_>> {
        if self.id() == id {
            return Some(EntityMut::Device(self));
        }
        self.sensor_mut(id).map(EntityMut::Sensor)
    }

    fn index_sensors(&mut self) {
        let mut index: BTreeMap<String, Vec<String>> = INDEXED_STATUSES
            .iter()
            .map(|status| (status.as_str().to_string(), Vec::new()))
            .collect();
        for sensor in &self.sensors {
            index
                .entry(sensor.status().as_str().to_string())
                .or_default()
                .push(sensor.id().to_string());
        }
        self.sensors_by_status = index;
    }
}

impl TreeEntity for Device {
    fn entity_id(&self) -> &str {
        self.node.id()
    }

    fn build(kind: NodeKind, fragment: &Element, scope: &mut ReconcileScope<'_>) -> PrtgResult<Self> {
        let id = document::fragment_id(fragment)?;
        let mut device = Device {
            node: Node::new(kind, id, Arc::clone(scope.api)),
            sensors: Vec::new(),
            sensors_by_status: BTreeMap::new(),
        };
        device.reconcile(fragment, scope)?;
        Ok(device)
    }

    fn reconcile(&mut self, fragment: &Element, scope: &mut ReconcileScope<'_>) -> PrtgResult<()> {
        let mut sensor_slot = Children::new(NodeKind::Sensor, &mut self.sensors);
        let mut slots: [&mut dyn ChildSlot; 1] = [&mut sensor_slot];
        tree_reconciler::reconcile_fragment(fragment, &mut self.node, &mut slots, scope)?;
        self.index_sensors();
        Ok(())
    }

    fn unregister(&self, registry: &mut Registry, present: &DocumentIds) {
        if !present.contains(self.kind(), self.id()) {
            registry.remove(self.kind(), self.id());
        }
        for sensor in &self.sensors {
            sensor.unregister(registry, present);
        }
    }
}

impl Deref for Device {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl DerefMut for Device {
    fn deref_mut(&mut self) -> &mut Node {
        &mut self.node
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node, f)
    }
}
