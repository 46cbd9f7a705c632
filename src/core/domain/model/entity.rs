//! Kind-tagged handles to objects found in the tree.

use crate::core::domain::model::{device::Device, group::Group, node::Node, sensor::Sensor};

/// Shared handle returned by id lookups. Probes come back as `Group`.
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Group(&'a Group),
    Device(&'a Device),
    Sensor(&'a Sensor),
}

impl<'a> EntityRef<'a> {
    pub fn node(&self) -> &'a Node {
        match *self {
            EntityRef::Group(group) => group,
            EntityRef::Device(device) => device,
            EntityRef::Sensor(sensor) => sensor,
        }
    }
}

/// Exclusive handle returned by id lookups.
#[derive(Debug)]
pub enum EntityMut<'a> {
    Group(&'a mut Group),
    Device(&'a mut Device),
    Sensor(&'a mut Sensor),
}

impl EntityMut<'_> {
    pub fn node(&self) -> &Node {
        match self {
            EntityMut::Group(group) => group,
            EntityMut::Device(device) => device,
            EntityMut::Sensor(sensor) => sensor,
        }
    }

    pub fn node_mut(&mut self) -> &mut Node {
        match self {
            EntityMut::Group(group) => group,
            EntityMut::Device(device) => device,
            EntityMut::Sensor(sensor) => sensor,
        }
    }
}
