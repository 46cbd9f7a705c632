use crate::core::{
    domain::{
        error::{PrtgError, PrtgResult},
        model::{
            channel::Channel,
            node::Node,
            registry::Registry,
            status::{NodeKind, Status},
        },
        service::tree_reconciler::{self, ChildSlot, DocumentIds, ReconcileScope, TreeEntity},
    },
    infrastructure::{api_client::ApiClient, api_request::ApiRequest, document},
};
use std::collections::HashSet;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use xmltree::Element;

/// Preset dimensions of a saved graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GraphSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl GraphSize {
    /// Width, height and legend font size in pixels.
    pub fn dimensions(&self) -> (u32, u32, u32) {
        match self {
            GraphSize::Small => (400, 300, 9),
            GraphSize::Medium => (800, 350, 13),
            GraphSize::Large => (1500, 500, 13),
        }
    }
}

/// Image format of a saved graph.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum GraphFormat {
    #[default]
    Svg,
    Png,
}

impl GraphFormat {
    fn endpoint(&self) -> &'static str {
        match self {
            GraphFormat::Svg => "chart.svg",
            GraphFormat::Png => "chart.png",
        }
    }
}

/// Rendering options for [`Sensor::save_graph`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GraphOptions {
    pub size: GraphSize,
    pub format: GraphFormat,
    /// Comma separated channel ids to leave out of the chart.
    pub hidden_channels: Option<String>,
}

/// A sensor with its channels.
///
/// Channels are not part of the sensor tree: they stay empty until
/// [`Sensor::get_channels`] is called, and tree reconciliation never touches
/// them.
#[derive(Debug)]
pub struct Sensor {
    node: Node,
    device_id: Option<String>,
    channels: Vec<Channel>,
    graph_path: Option<PathBuf>,
}

impl Sensor {
    /// Id of the device this sensor was found under, if it was built from a
    /// device's subtree.
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channels_mut(&mut self) -> &mut [Channel] {
        &mut self.channels
    }

    pub fn channel(&self, id: &str) -> Option<&Channel> {
        self.channels.iter().find(|channel| channel.id() == id)
    }

    pub fn channel_mut(&mut self, id: &str) -> Option<&mut Channel> {
        self.channels.iter_mut().find(|channel| channel.id() == id)
    }

    /// Where the last graph was saved.
    pub fn graph_path(&self) -> Option<&Path> {
        self.graph_path.as_deref()
    }

    /// Loads the sensor's channels.
    ///
    /// Channels already present are updated in place and new ones appended.
    /// Channels the server no longer lists are kept.
    ///
    /// # Errors
    /// `PrtgError::MalformedDocument` for an item without an `objid` or for
    /// two items sharing one; no channel is changed in that case.
    pub async fn get_channels(&mut self) -> PrtgResult<&[Channel]> {
        let request = ApiRequest::new("table.xml")
            .param("content", "channels")
            .param("output", "xml")
            .param("columns", "name,lastvalue_,objid")
            .param("id", self.id());
        let answer = self.api().get_document(&request).await?;
        let items = document::find_all(&answer, "item");

        let mut ids = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        for item in &items {
            let id = Channel::item_id(item)?;
            if !seen.insert(id.clone()) {
                return Err(PrtgError::malformed(format!(
                    "Duplicate channel objid {} for sensor {}",
                    id,
                    self.id()
                )));
            }
            ids.push(id);
        }

        for (item, id) in items.into_iter().zip(ids) {
            match self.channels.iter_mut().find(|channel| channel.id() == id) {
                Some(channel) => channel.update(item),
                None => {
                    let mut channel = Channel::new(self.node.id(), &id, Arc::clone(self.node.api()));
                    channel.update(item);
                    self.channels.push(channel);
                }
            }
        }
        debug!(sensor = %self.id(), channels = self.channels.len(), "Loaded channels");
        Ok(&self.channels)
    }

    /// Acknowledges an alarm, then refreshes the status.
    pub async fn acknowledge(&mut self, message: &str) -> PrtgResult<Status> {
        let request = ApiRequest::new("acknowledgealarm.htm")
            .param("id", self.id())
            .param("ackmsg", message);
        self.api().request(&request).await?;
        self.get_status().await
    }

    /// Downloads a chart of this sensor and writes it to `path`.
    ///
    /// `graph_id` selects the period (`0` live, `1` last 48 hours, `2` last
    /// 30 days, `3` last 365 days). The body is streamed to the file and the
    /// path remembered as [`Sensor::graph_path`].
    pub async fn save_graph(
        &mut self,
        graph_id: u32,
        path: impl AsRef<Path>,
        options: &GraphOptions,
    ) -> PrtgResult<PathBuf> {
        let path = path.as_ref().to_path_buf();
        let (width, height, font_size) = options.size.dimensions();
        let request = ApiRequest::new(options.format.endpoint())
            .without_api_prefix()
            .param("type", "graph")
            .param("graphid", graph_id)
            .param("id", self.id())
            .param("width", width)
            .param("height", height)
            .param_opt("hide", options.hidden_channels.as_deref())
            .param("plotcolor", "#ffffff")
            .param("gridcolor", "#ffffff")
            .param(
                "graphstyling",
                format!("showLegend='1' baseFontSize='{}'", font_size),
            );

        let mut response = self.api().request(&request).await?;
        let mut file = tokio::fs::File::create(&path).await?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| PrtgError::Connection(format!("Failed to read graph: {}", e)))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        debug!(sensor = %self.id(), path = %path.display(), "Saved graph");
        self.graph_path = Some(path.clone());
        Ok(path)
    }

    /// Sets the `params` property some script sensors pass to their script.
    pub async fn set_additional_param(&mut self, parameter: &str) -> PrtgResult<()> {
        self.set_property("params", parameter).await
    }

    /// Re-fetches the sensor's fields; reloads channels when some are loaded.
    pub async fn refresh(&mut self, registry: &mut Registry) -> PrtgResult<()> {
        let api = Arc::clone(self.api());
        let fragment = api.sensor_tree(self.id()).await?;
        tree_reconciler::run(&fragment, &api, registry, None, |fragment, scope| {
            self.reconcile(fragment, scope)
        })?;
        if !self.channels.is_empty() {
            self.get_channels().await?;
        }
        Ok(())
    }

    /// Fetches the sensor with this id, registers it and loads its channels.
    ///
    /// # Errors
    /// `PrtgError::MalformedDocument` when the id denotes another kind.
    pub async fn fetch(api: Arc<ApiClient>, id: &str, registry: &mut Registry) -> PrtgResult<Self> {
        let fragment = api.sensor_tree(id).await?;
        if fragment.name != "sensor" {
            return Err(PrtgError::malformed(format!(
                "Object {} is a <{}>, not a sensor",
                id, fragment.name
            )));
        }
        let mut sensor = tree_reconciler::run(&fragment, &api, registry, None, |fragment, scope| {
            Sensor::build(NodeKind::Sensor, fragment, scope)
        })?;
        registry.insert(NodeKind::Sensor, sensor.id());
        sensor.get_channels().await?;
        Ok(sensor)
    }
}

impl TreeEntity for Sensor {
    fn entity_id(&self) -> &str {
        self.node.id()
    }

    fn build(kind: NodeKind, fragment: &Element, scope: &mut ReconcileScope<'_>) -> PrtgResult<Self> {
        let id = document::fragment_id(fragment)?;
        let mut sensor = Sensor {
            node: Node::new(kind, id, Arc::clone(scope.api)),
            device_id: scope.parent_id.map(str::to_string),
            channels: Vec::new(),
            graph_path: None,
        };
        sensor.reconcile(fragment, scope)?;
        Ok(sensor)
    }

    fn reconcile(&mut self, fragment: &Element, scope: &mut ReconcileScope<'_>) -> PrtgResult<()> {
        let mut slots: [&mut dyn ChildSlot; 0] = [];
        tree_reconciler::reconcile_fragment(fragment, &mut self.node, &mut slots, scope)
    }

    fn unregister(&self, registry: &mut Registry, present: &DocumentIds) {
        if !present.contains(self.kind(), self.id()) {
            registry.remove(self.kind(), self.id());
        }
    }
}

impl Deref for Sensor {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl DerefMut for Sensor {
    fn deref_mut(&mut self) -> &mut Node {
        &mut self.node
    }
}

impl fmt::Display for Sensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.node, f)
    }
}
