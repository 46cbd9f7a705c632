//! State and behaviour shared by every object of the sensor tree.

use crate::core::{
    domain::{
        error::{PrtgError, PrtgResult, ValidationError},
        model::status::{NodeKind, PAUSED_STATUS_RAW, Status, UNKNOWN_STATUS_RAW},
    },
    infrastructure::{
        api_client::ApiClient,
        api_request::ApiRequest,
        document::{self, PROPERTY_NOT_FOUND},
        prompt::{ConfirmPrompt, DELETE_QUESTION},
    },
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::warn;
use xmltree::Element;

/// Scanning intervals (seconds) the server accepts for the `interval`
/// property. [`Node::set_interval`] does not enforce them.
pub const VALID_INTERVALS: [u32; 11] = [
    30, 60, 300, 600, 900, 1800, 3600, 14400, 21600, 43200, 86400,
];

/// Result of [`Node::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The server accepted the deletion.
    Deleted,
    /// The operator answered no; nothing was sent.
    Declined,
    /// The object cannot be deleted at all; nothing was sent.
    Rejected(String),
}

/// A mirrored PRTG object: identity, status and every scalar field the
/// server reported for it.
///
/// Mutating operations issue the request first and only touch local state
/// once the server accepted it.
#[derive(Debug)]
pub struct Node {
    id: String,
    kind: NodeKind,
    name: String,
    status: Status,
    status_raw: String,
    active: bool,
    parent_sensor_id: Option<String>,
    properties: BTreeMap<String, String>,
    attributes: HashMap<String, String>,
    api: Arc<ApiClient>,
}

impl Node {
    pub(crate) fn new(kind: NodeKind, id: impl Into<String>, api: Arc<ApiClient>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: String::new(),
            status: Status::Unknown,
            status_raw: String::new(),
            active: true,
            parent_sensor_id: None,
            properties: BTreeMap::new(),
            attributes: HashMap::new(),
            api,
        }
    }

    pub(crate) fn channel(
        sensor_id: impl Into<String>,
        id: impl Into<String>,
        api: Arc<ApiClient>,
    ) -> Self {
        let mut node = Self::new(NodeKind::Channel, id, api);
        node.parent_sensor_id = Some(sensor_id.into());
        node
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Server status code as text (`"3"` for up, `"7"` for paused, ...).
    pub fn status_raw(&self) -> &str {
        &self.status_raw
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Value of a scalar field as last reported or written.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn properties(&self) -> &BTreeMap<String, String> {
        &self.properties
    }

    /// XML attributes of the element this object was built from.
    pub fn attributes(&self) -> &HashMap<String, String> {
        &self.attributes
    }

    pub(crate) fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Stores a scalar field and keeps the typed fields in step with it.
    pub(crate) fn apply_property(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match name {
            "name" => self.name = value.clone(),
            "status" => self.status = Status::from_text(&value),
            "status_raw" => self.status_raw = value.trim().to_string(),
            "active" => self.active = matches!(value.trim(), "true" | "1" | "-1"),
            _ => {}
        }
        self.properties.insert(name.to_string(), value);
    }

    pub(crate) fn apply_attributes(&mut self, element: &Element) {
        self.attributes = element
            .attributes
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
    }

    /// Object addressing of property and status calls: channels are reached
    /// through their sensor plus their own sub id.
    fn addressed(&self, request: ApiRequest) -> ApiRequest {
        match &self.parent_sensor_id {
            Some(sensor_id) => request.param("id", sensor_id).param("subid", &self.id),
            None => request.param("id", &self.id),
        }
    }

    /// Id pause and resume act on; channels redirect to their sensor.
    fn pause_target(&self, action: &str) -> &str {
        match &self.parent_sensor_id {
            Some(sensor_id) => {
                warn!(
                    channel = %self.id,
                    sensor = %sensor_id,
                    "Channels cannot be {}, acting on parent sensor",
                    action
                );
                sensor_id
            }
            None => &self.id,
        }
    }

    /// Renames the object on the server.
    pub async fn rename(&mut self, new_name: &str) -> PrtgResult<()> {
        if self.kind == NodeKind::Channel {
            return self.set_property("name", new_name).await;
        }
        let request = ApiRequest::new("rename.htm")
            .param("id", &self.id)
            .param("value", new_name);
        self.api.request(&request).await?;
        self.apply_property("name", new_name);
        Ok(())
    }

    /// Pauses monitoring.
    ///
    /// A `duration` of zero pauses until resumed; any other value is sent as
    /// the `duration` of a timed pause. On a channel the owning sensor is
    /// paused instead and the channel itself is left untouched.
    pub async fn pause(&mut self, duration: u32, message: Option<&str>) -> PrtgResult<()> {
        let target = self.pause_target("paused").to_string();
        let request = if duration > 0 {
            ApiRequest::new("pauseobjectfor.htm")
                .param("id", target)
                .param("duration", duration)
        } else {
            ApiRequest::new("pause.htm").param("id", target).param("action", 0)
        };
        let request = request.param_opt("pausemsg", message.filter(|m| !m.is_empty()));
        self.api.request(&request).await?;

        if self.kind != NodeKind::Channel {
            self.apply_property("status", Status::Paused.as_str());
            self.apply_property("status_raw", PAUSED_STATUS_RAW);
            self.apply_property("active", "false");
        }
        Ok(())
    }

    /// Resumes monitoring.
    ///
    /// The server does not report the resulting state synchronously, so the
    /// local status becomes [`Status::Unknown`] until the next refresh or
    /// [`Node::get_status`].
    pub async fn resume(&mut self) -> PrtgResult<()> {
        let target = self.pause_target("resumed").to_string();
        let request = ApiRequest::new("pause.htm").param("id", target).param("action", 1);
        self.api.request(&request).await?;

        if self.kind != NodeKind::Channel {
            self.apply_property("status", UNKNOWN_STATUS_RAW);
            self.apply_property("status_raw", UNKNOWN_STATUS_RAW);
            self.apply_property("active", "true");
        }
        Ok(())
    }

    /// Asks the server for the live status and stores it.
    pub async fn get_status(&mut self) -> PrtgResult<Status> {
        let request = self
            .addressed(ApiRequest::new("getobjectstatus.htm"))
            .param("name", "status")
            .param("show", "text");
        let answer = self.api.get_document(&request).await?;
        let text = document::result_text(&answer)?.trim().to_string();
        self.apply_property("status", text);
        Ok(self.status.clone())
    }

    /// Deletes the object on the server.
    ///
    /// The synthetic root and channels are never deleted; that is reported
    /// as [`DeleteOutcome::Rejected`]. With a `prompt`, the request is only
    /// sent after an affirmative answer. The local tree keeps the object
    /// until the next refresh of its parent.
    pub async fn delete(&self, prompt: Option<&dyn ConfirmPrompt>) -> PrtgResult<DeleteOutcome> {
        match self.kind {
            NodeKind::Root => {
                return Ok(DeleteOutcome::Rejected(
                    "You cannot delete the root object.".to_string(),
                ));
            }
            NodeKind::Channel => {
                return Ok(DeleteOutcome::Rejected(
                    "You cannot delete a channel".to_string(),
                ));
            }
            _ => {}
        }

        if let Some(prompt) = prompt {
            if !prompt.confirm(DELETE_QUESTION).await? {
                return Ok(DeleteOutcome::Declined);
            }
        }

        let request = ApiRequest::new("deleteobject.htm")
            .param("id", &self.id)
            .param("approve", 1);
        self.api.request(&request).await?;
        Ok(DeleteOutcome::Deleted)
    }

    /// Writes a property on the server and stores the new value locally.
    pub async fn set_property(&mut self, name: &str, value: impl ToString) -> PrtgResult<()> {
        let value = value.to_string();
        let request = self
            .addressed(ApiRequest::new("setobjectproperty.htm"))
            .param("name", name)
            .param("value", &value);
        self.api.request(&request).await?;
        self.apply_property(name, value);
        Ok(())
    }

    /// Reads a property from the server and stores it locally.
    ///
    /// # Errors
    /// `PrtgError::ResourceNotFound` when the server does not know the
    /// property; nothing is stored in that case.
    pub async fn get_property(&mut self, name: &str) -> PrtgResult<String> {
        let mut request = self
            .addressed(ApiRequest::new("getobjectproperty.htm"))
            .param("name", name);
        if self.kind != NodeKind::Channel {
            request = request.param("show", "text");
        }
        let answer = self.api.get_document(&request).await?;
        let value = document::result_text(&answer)?;
        if value.trim() == PROPERTY_NOT_FOUND {
            return Err(PrtgError::ResourceNotFound(format!(
                "No object property of name: {}",
                name
            )));
        }
        self.apply_property(name, value.clone());
        Ok(value)
    }

    /// Sets the scanning interval in seconds.
    ///
    /// The server only accepts the values in [`VALID_INTERVALS`] and the
    /// object must not inherit its interval; neither is checked here.
    pub async fn set_interval(&mut self, seconds: u32) -> PrtgResult<()> {
        self.set_property("interval", seconds).await
    }

    /// Duplicates the object below `target_id` under a new name.
    ///
    /// The copy gets an id the local tree does not know yet; it shows up on
    /// the next refresh of its new parent.
    pub async fn clone_to(&self, new_name: &str, target_id: &str) -> PrtgResult<()> {
        let request = ApiRequest::new("duplicateobject.htm")
            .param("id", &self.id)
            .param("name", new_name)
            .param("targetid", target_id);
        self.api.request(&request).await?;
        Ok(())
    }

    /// Appends tags to the `tags` property, or replaces them when
    /// `clear_old` is set.
    ///
    /// # Errors
    /// `PrtgError::Validation` for an empty tag or one containing
    /// whitespace, since tags are stored space separated.
    pub async fn add_tags<S: AsRef<str>>(&mut self, tags: &[S], clear_old: bool) -> PrtgResult<()> {
        for tag in tags {
            let tag = tag.as_ref();
            if tag.is_empty() || tag.chars().any(char::is_whitespace) {
                return Err(ValidationError::Field {
                    field: "tags".to_string(),
                    message: format!("Tag '{}' must be a single non-empty word", tag),
                }
                .into());
            }
        }

        let mut merged: Vec<String> = if clear_old {
            Vec::new()
        } else {
            self.get_property("tags")
                .await?
                .split_whitespace()
                .map(str::to_string)
                .collect()
        };
        merged.extend(tags.iter().map(|tag| tag.as_ref().to_string()));
        self.set_property("tags", merged.join(" ")).await
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<{} Name: {}, ID: {}, Active: {}>",
            self.kind, self.name, self.id, self.active
        )
    }
}
