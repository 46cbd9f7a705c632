use crate::core::{
    domain::{
        error::{PrtgError, PrtgResult},
        model::node::Node,
    },
    infrastructure::{api_client::ApiClient, document},
};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use xmltree::Element;

/// One measured value of a sensor.
///
/// Channels come from the sensor's channel table, not from the sensor tree.
/// Property calls address them as `id=<sensor>&subid=<objid>`, and they can
/// be neither paused nor deleted on their own.
#[derive(Debug)]
pub struct Channel {
    node: Node,
    sensor_id: String,
    last_value: Option<LastValue>,
}

/// A `lastvalue` text split into its leading number and unit.
#[derive(Debug, Clone, PartialEq)]
struct LastValue {
    float: f64,
    int: i64,
    unit: Option<String>,
}

impl Channel {
    pub(crate) fn new(sensor_id: &str, id: &str, api: Arc<ApiClient>) -> Self {
        Self {
            node: Node::channel(sensor_id, id, api),
            sensor_id: sensor_id.to_string(),
            last_value: None,
        }
    }

    /// `objid` of a channel table item.
    pub(crate) fn item_id(item: &Element) -> PrtgResult<String> {
        document::child_text(item, "objid")
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| PrtgError::malformed("Channel item without an objid"))
    }

    /// Overwrites the scalar fields with those of a channel table item.
    pub(crate) fn update(&mut self, item: &Element) {
        for field in document::child_elements(item) {
            self.node
                .apply_property(&field.name, document::element_text(field));
        }
        self.last_value = self.last_value_text().and_then(parse_last_value);
    }

    pub fn sensor_id(&self) -> &str {
        &self.sensor_id
    }

    /// Last reading as the server formats it, e.g. `12 msec`.
    pub fn last_value_text(&self) -> Option<&str> {
        self.property("lastvalue")
    }

    pub fn last_value_float(&self) -> Option<f64> {
        self.last_value.as_ref().map(|value| value.float)
    }

    pub fn last_value_int(&self) -> Option<i64> {
        self.last_value.as_ref().map(|value| value.int)
    }

    pub fn unit(&self) -> Option<&str> {
        self.last_value.as_ref().and_then(|value| value.unit.as_deref())
    }
}

/// Splits `"1,234 kbit/s"` into `1234.0`, `1234` and `kbit/s`.
///
/// Readings that do not start with a number (`No data`, `-`) yield `None`.
fn parse_last_value(text: &str) -> Option<LastValue> {
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let number = parts.next()?.replace(',', "");
    let float: f64 = number.parse().ok()?;
    let unit = parts
        .next()
        .map(str::trim)
        .filter(|unit| !unit.is_empty())
        .map(str::to_string);
    Some(LastValue {
        float,
        int: float.trunc() as i64,
        unit,
    })
}

impl Deref for Channel {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl DerefMut for Channel {
    fn deref_mut(&mut self) -> &mut Node {
        &mut self.node
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node, f)
    }
}
