//! HTTP client that attaches PRTG credentials and classifies responses.

use crate::core::{
    domain::{
        error::{PrtgError, PrtgResult, ValidationError},
        model::{client_config::ClientConfig, prtg_connection::PrtgConnection},
    },
    infrastructure::{api_request::ApiRequest, document},
};
use governor::{DefaultDirectRateLimiter, Quota};
use reqwest::{Client, Response, StatusCode};
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::debug;
use url::Url;
use xmltree::Element;

/// HTTP client shared by the root client and every entity of the tree.
///
/// PRTG authenticates each call through the `username` and `passhash` query
/// parameters, so there is no session to maintain: every request is a plain
/// GET with the credentials appended.
#[derive(Debug)]
pub struct ApiClient {
    http_client: Client,
    connection: Arc<PrtgConnection>,
    config: Arc<ClientConfig>,
    rate_limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl ApiClient {
    /// Creates a new `ApiClient`.
    ///
    /// # Errors
    /// Returns `PrtgError::Connection` if the HTTP client cannot be built and
    /// `PrtgError::Validation` for a rate limit with zero capacity.
    pub fn new(connection: PrtgConnection, config: ClientConfig) -> PrtgResult<Self> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(connection.accepts_invalid_certs())
            .timeout(config.timeout)
            .build()
            .map_err(|e| PrtgError::Connection(e.to_string()))?;

        let rate_limiter = match config.rate_limit {
            Some(rl) => {
                let per_second = non_zero("requests_per_second", rl.requests_per_second)?;
                let burst = non_zero("burst_size", rl.burst_size)?;
                let quota = Quota::per_second(per_second).allow_burst(burst);
                Some(Arc::new(DefaultDirectRateLimiter::direct(quota)))
            }
            None => None,
        };

        Ok(Self {
            http_client,
            connection: Arc::new(connection),
            config: Arc::new(config),
            rate_limiter,
        })
    }

    /// Returns a reference to the underlying connection details.
    pub fn connection(&self) -> &PrtgConnection {
        &self.connection
    }

    /// Returns the transport settings.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the absolute, authenticated URL of a request.
    pub fn build_url(&self, request: &ApiRequest) -> PrtgResult<Url> {
        let mut url = self
            .connection
            .prtg_url()
            .join(request.path(), request.uses_api_prefix())?;
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in request.params() {
                query.append_pair(key, value);
            }
            query
                .append_pair("username", self.connection.prtg_username().as_str())
                .append_pair("passhash", self.connection.prtg_passhash().as_str());
        }
        Ok(url)
    }

    /// Sends a request and classifies the HTTP status.
    ///
    /// # Errors
    /// - `PrtgError::Authentication` on 401
    /// - `PrtgError::ResourceNotFound` on 404, with the requested URL
    /// - `PrtgError::Http` on any other non-200 status
    /// - `PrtgError::Connection` when the request cannot be sent
    pub async fn request(&self, request: &ApiRequest) -> PrtgResult<Response> {
        let url = self.build_url(request)?;

        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let shown = redact(&url);
        debug!(url = %shown, "GET");

        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| PrtgError::Connection(format!("HTTP request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(PrtgError::Authentication(
                "PRTG authentication failed. Check the username and passhash".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(PrtgError::ResourceNotFound(format!(
                "No resource at URL used: {}",
                shown
            ))),
            status => Err(PrtgError::Http {
                status: status.as_u16(),
                url: shown,
            }),
        }
    }

    /// Sends a request and returns the body as text.
    pub async fn get_text(&self, request: &ApiRequest) -> PrtgResult<String> {
        self.request(request)
            .await?
            .text()
            .await
            .map_err(|e| PrtgError::Connection(format!("Failed to read response body: {}", e)))
    }

    /// Sends a request and parses the body as an XML document.
    pub async fn get_document(&self, request: &ApiRequest) -> PrtgResult<Element> {
        let body = self.get_text(request).await?;
        document::parse_document(&body)
    }

    /// Fetches the sensor tree below `root_id` and returns its top object
    /// element (a `group`, `probenode`, `device` or `sensor`).
    ///
    /// # Errors
    /// `PrtgError::ResourceNotFound` when the tree has no object at that id.
    pub async fn sensor_tree(&self, root_id: &str) -> PrtgResult<Element> {
        let request = ApiRequest::new("table.xml")
            .param("content", "sensortree")
            .param("output", "xml")
            .param("id", root_id);
        let tree = self.get_document(&request).await?;
        document::tree_root(&tree, root_id)
    }
}

fn non_zero(field: &str, value: u32) -> PrtgResult<NonZeroU32> {
    NonZeroU32::new(value).ok_or_else(|| {
        ValidationError::Field {
            field: field.to_string(),
            message: "Rate limit values must be greater than zero".to_string(),
        }
        .into()
    })
}

/// Renders a URL with secrets masked, for logs and error messages.
pub(crate) fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "passhash" || k == "password" {
                "***".into()
            } else {
                v
            };
            (k.into_owned(), v.into_owned())
        })
        .collect();
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
