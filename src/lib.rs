//! Async client for the PRTG Network Monitor HTTP API.
//!
//! [`PrtgClient`] mirrors the server's sensor tree (probes, groups, devices,
//! sensors) as owned Rust objects and keeps that mirror up to date by
//! reconciling freshly fetched tree documents into it. Every object exposes
//! the management operations of the API: rename, pause/resume, status and
//! property access, deletion, cloning and tagging.

mod auth;
mod core;

pub use crate::core::domain::error::{PrtgError, PrtgResult, ValidationError};
pub use crate::core::domain::model::{
    channel::Channel,
    client_config::{ClientConfig, DEFAULT_TIMEOUT, RateLimitConfig},
    device::Device,
    entity::{EntityMut, EntityRef},
    group::{Group, Probe},
    historic_data::{HistoricColumn, HistoricData, HistoricDate},
    node::{DeleteOutcome, Node, VALID_INTERVALS},
    prtg_connection::PrtgConnection,
    registry::Registry,
    sensor::{GraphFormat, GraphOptions, GraphSize, Sensor},
    status::{NodeKind, Status},
};
pub use crate::core::domain::service::historic_data_fetcher::HistoricDataFetcher;
pub use crate::core::domain::value_object::{
    PrtgHost, PrtgPasshash, PrtgPort, PrtgUrl, PrtgUsername,
};
pub use crate::core::infrastructure::{
    api_client::ApiClient,
    api_request::ApiRequest,
    prompt::{ConfirmPrompt, StdinPrompt},
};

use crate::{
    auth::application::service::passhash_service::PasshashService,
    core::domain::{
        service::tree_reconciler::{self, ChildSlot, Children},
        value_object::{validate_host, validate_passhash, validate_port, validate_username},
    },
};
use std::env;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use xmltree::Element;

/// A client mirroring the sensor tree below one root object.
///
/// The client owns the tree and the [`Registry`] of every probe, group,
/// device and sensor in it. Operations on the tree go through `&mut`
/// borrows, so they run one at a time.
///
/// # Examples
///
/// ```no_run
/// use leeca_prtg::{PrtgClient, PrtgResult};
///
/// #[tokio::main]
/// async fn main() -> PrtgResult<()> {
///     let mut client = PrtgClient::builder()
///         .host("prtg.example.com")
///         .credentials("prtgadmin", "1234567890")
///         .connect()
///         .await?;
///
///     for device in client.devices() {
///         println!("{} ({})", device.name(), device.status());
///     }
///
///     client.refresh().await?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct PrtgClient {
    api: Arc<ApiClient>,
    root: Node,
    probes: Vec<Probe>,
    groups: Vec<Group>,
    devices: Vec<Device>,
    registry: Registry,
}

#[derive(Clone)]
enum Secret {
    Passhash(String),
    Password(String),
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Secret::Passhash(_) => f.write_str("Passhash(***)"),
            Secret::Password(_) => f.write_str("Password(***)"),
        }
    }
}

/// Builder for PrtgClient configuration
#[derive(Debug, Clone)]
pub struct PrtgClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    username: Option<String>,
    secret: Option<Secret>,
    secure: bool,
    accept_invalid_certs: bool,
    root_id: String,
    timeout: Duration,
    rate_limit: Option<RateLimitConfig>,
}

impl Default for PrtgClientBuilder {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: None,
            secret: None,
            secure: true,
            accept_invalid_certs: false,
            root_id: "0".to_string(),
            timeout: DEFAULT_TIMEOUT,
            rate_limit: None,
        }
    }
}

impl PrtgClientBuilder {
    /// Reads the configuration from `PRTG_HOST`, `PRTG_PORT`,
    /// `PRTG_USERNAME`, `PRTG_PASSHASH`, `PRTG_SECURE` and `PRTG_ROOT_ID`.
    ///
    /// Unset variables keep their defaults; missing required values are
    /// reported when the client is built.
    ///
    /// # Errors
    /// `PrtgError::Validation` when `PRTG_PORT` or `PRTG_SECURE` cannot be
    /// parsed.
    pub fn from_env() -> PrtgResult<Self> {
        let mut builder = Self::default();
        if let Ok(host) = env::var("PRTG_HOST") {
            builder.host = Some(host);
        }
        if let Ok(port) = env::var("PRTG_PORT") {
            let parsed = port.trim().parse::<u16>().map_err(|_| ValidationError::Field {
                field: "PRTG_PORT".to_string(),
                message: format!("'{}' is not a port number", port),
            })?;
            builder.port = Some(parsed);
        }
        if let Ok(username) = env::var("PRTG_USERNAME") {
            builder.username = Some(username);
        }
        if let Ok(passhash) = env::var("PRTG_PASSHASH") {
            builder.secret = Some(Secret::Passhash(passhash));
        }
        if let Ok(secure) = env::var("PRTG_SECURE") {
            builder.secure = match secure.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ValidationError::Field {
                        field: "PRTG_SECURE".to_string(),
                        message: format!("'{}' is not a boolean", secure),
                    }
                    .into());
                }
            };
        }
        if let Ok(root_id) = env::var("PRTG_ROOT_ID") {
            builder.root_id = root_id;
        }
        Ok(builder)
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Defaults to 443, or 80 when `secure(false)`.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Authenticates with a username and its passhash.
    pub fn credentials(mut self, username: impl Into<String>, passhash: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.secret = Some(Secret::Passhash(passhash.into()));
        self
    }

    /// Authenticates with a username and password; the passhash is looked up
    /// once while building.
    pub fn password_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.secret = Some(Secret::Password(password.into()));
        self
    }

    /// HTTPS when `true` (the default), plain HTTP otherwise.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Object the tree is fetched from; `0` (the whole server) by default.
    pub fn root_id(mut self, root_id: impl Into<String>) -> Self {
        self.root_id = root_id.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn rate_limit(mut self, requests_per_second: u32, burst_size: u32) -> Self {
        self.rate_limit = Some(RateLimitConfig {
            requests_per_second,
            burst_size,
        });
        self
    }

    /// Validates the configuration and returns the shared HTTP client
    /// without fetching anything from the tree.
    ///
    /// # Errors
    /// - `PrtgError::Validation` for a missing or invalid field
    /// - any error of the passhash lookup when password credentials are used
    pub async fn build_api(self) -> PrtgResult<Arc<ApiClient>> {
        let host = self.host.ok_or_else(|| required("host"))?;
        validate_host(&host)?;
        let host = PrtgHost::new_unchecked(host);

        let port = match self.port {
            Some(port) => {
                validate_port(port)?;
                PrtgPort::new_unchecked(port)
            }
            None => PrtgPort::default_for(self.secure),
        };

        let username = self.username.ok_or_else(|| required("username"))?;
        validate_username(&username)?;
        let username = PrtgUsername::new_unchecked(username);

        let url = PrtgUrl::new(&host, &port, self.secure)?;

        let passhash = match self.secret {
            Some(Secret::Passhash(passhash)) => {
                validate_passhash(&passhash)?;
                PrtgPasshash::new_unchecked(passhash)
            }
            Some(Secret::Password(password)) => {
                PasshashService::new(self.accept_invalid_certs, self.timeout)
                    .execute(&url, &username, &password)
                    .await?
            }
            None => return Err(required("passhash")),
        };

        let connection = PrtgConnection::new(
            host,
            port,
            username,
            passhash,
            self.secure,
            self.accept_invalid_certs,
            url,
        );
        let config = ClientConfig {
            timeout: self.timeout,
            rate_limit: self.rate_limit,
        };
        Ok(Arc::new(ApiClient::new(connection, config)?))
    }

    /// Validates the configuration, connects and fetches the sensor tree.
    pub async fn connect(self) -> PrtgResult<PrtgClient> {
        let root_id = self.root_id.clone();
        let api = self.build_api().await?;
        PrtgClient::from_api(api, &root_id).await
    }
}

fn required(field: &str) -> PrtgError {
    ValidationError::Field {
        field: field.to_string(),
        message: format!("{} is required", field),
    }
    .into()
}

impl PrtgClient {
    /// Creates a new builder for PrtgClient configuration
    pub fn builder() -> PrtgClientBuilder {
        PrtgClientBuilder::default()
    }

    /// Fetches the tree below `root_id` through an existing API client.
    ///
    /// # Errors
    /// `PrtgError::ResourceNotFound` when the server has no object at
    /// `root_id`, plus any transport or document error.
    pub async fn from_api(api: Arc<ApiClient>, root_id: &str) -> PrtgResult<Self> {
        let mut client = Self {
            root: Node::new(NodeKind::Root, root_id, Arc::clone(&api)),
            api,
            probes: Vec::new(),
            groups: Vec::new(),
            devices: Vec::new(),
            registry: Registry::new(),
        };
        client.refresh().await?;
        info!(
            root = %root_id,
            objects = client.registry.len(),
            "Connected to PRTG"
        );
        Ok(client)
    }

    /// The object the client is rooted at.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn probes_mut(&mut self) -> &mut [Probe] {
        &mut self.probes
    }

    /// Groups directly below the root.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }

    /// Devices directly below the root.
    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut [Device] {
        &mut self.devices
    }

    /// Index of every probe, group, device and sensor in the tree.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    /// Re-fetches the whole tree and reconciles it in place.
    ///
    /// Objects still reported are updated and keep their identity, new
    /// objects are added and objects the server no longer reports are
    /// dropped together with their registry entries.
    pub async fn refresh(&mut self) -> PrtgResult<()> {
        let fragment = self.api.sensor_tree(self.root.id()).await?;
        self.apply_tree(&fragment)
    }

    fn apply_tree(&mut self, fragment: &Element) -> PrtgResult<()> {
        let Self {
            api,
            root,
            probes,
            groups,
            devices,
            registry,
        } = self;
        tree_reconciler::run(fragment, api, registry, None, |fragment, scope| {
            let mut probe_slot = Children::new(NodeKind::Probe, probes);
            let mut group_slot = Children::new(NodeKind::Group, groups);
            let mut device_slot = Children::new(NodeKind::Device, devices);
            let mut slots: [&mut dyn ChildSlot; 3] =
                [&mut probe_slot, &mut group_slot, &mut device_slot];
            tree_reconciler::reconcile_fragment(fragment, root, &mut slots, scope)
        })
    }

    /// Re-fetches one object's subtree and reconciles it in place.
    ///
    /// # Errors
    /// `PrtgError::ResourceNotFound` when no object of the tree has this id.
    pub async fn refresh_object(&mut self, id: &str) -> PrtgResult<()> {
        if id == self.root.id() {
            return self.refresh().await;
        }
        let Self {
            probes,
            groups,
            devices,
            registry,
            ..
        } = self;
        let entity = find_mut_in(probes, groups, devices, id)
            .ok_or_else(|| PrtgError::ResourceNotFound(format!("No object with ID: {}", id)))?;
        match entity {
            EntityMut::Group(group) => group.refresh(registry).await,
            EntityMut::Device(device) => device.refresh(registry).await,
            EntityMut::Sensor(sensor) => sensor.refresh(registry).await,
        }
    }

    /// Looks up a probe, group, device or sensor of the tree by id.
    pub fn search_by_id(&self, id: &str) -> Option<EntityRef<'_>> {
        self.registry.kind_of(id)?;
        self.probes
            .iter()
            .chain(&self.groups)
            .find_map(|group| group.find(id))
            .or_else(|| self.devices.iter().find_map(|device| device.find(id)))
    }

    /// Mutable variant of [`PrtgClient::search_by_id`].
    pub fn search_by_id_mut(&mut self, id: &str) -> Option<EntityMut<'_>> {
        self.registry.kind_of(id)?;
        find_mut_in(&mut self.probes, &mut self.groups, &mut self.devices, id)
    }

    /// All sensors of the tree, depth first.
    pub fn sensors(&self) -> Vec<&Sensor> {
        let mut sensors: Vec<&Sensor> = self
            .devices
            .iter()
            .flat_map(|device| device.sensors())
            .collect();
        for group in self.probes.iter().chain(&self.groups) {
            sensors.extend(group.sensors());
        }
        sensors
    }

    /// Fetches historic readings of any object, averaged over `average`
    /// seconds.
    pub async fn historic_data(
        &self,
        object_id: &str,
        start: impl Into<HistoricDate>,
        end: impl Into<HistoricDate>,
        average: u32,
    ) -> PrtgResult<HistoricData> {
        HistoricDataFetcher::new(Arc::clone(&self.api))
            .fetch(object_id, start, end, average)
            .await
    }
}

fn find_mut_in<'a>(
    probes: &'a mut [Probe],
    groups: &'a mut [Group],
    devices: &'a mut [Device],
    id: &str,
) -> Option<EntityMut<'a>> {
    if let Some(found) = probes
        .iter_mut()
        .chain(groups.iter_mut())
        .find_map(|group| group.find_mut(id))
    {
        return Some(found);
    }
    devices.iter_mut().find_map(|device| device.find_mut(id))
}
