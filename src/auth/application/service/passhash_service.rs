use crate::core::{
    domain::{
        error::{PrtgError, PrtgResult},
        value_object::{PrtgPasshash, PrtgUrl, PrtgUsername, validate_passhash},
    },
    infrastructure::api_client::redact,
};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Trades a username and password for the account's passhash.
///
/// PRTG authenticates API calls with the passhash only, so the password is
/// sent once, here, and never kept.
pub struct PasshashService {
    accept_invalid_certs: bool,
    timeout: Duration,
}

impl PasshashService {
    pub fn new(accept_invalid_certs: bool, timeout: Duration) -> Self {
        Self {
            accept_invalid_certs,
            timeout,
        }
    }

    pub async fn execute(
        &self,
        base_url: &PrtgUrl,
        username: &PrtgUsername,
        password: &str,
    ) -> PrtgResult<PrtgPasshash> {
        let http_client = Client::builder()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .timeout(self.timeout)
            .build()
            .map_err(|e| PrtgError::Connection(e.to_string()))?;

        let mut url = base_url.join("getpasshash.htm", true)?;
        url.query_pairs_mut()
            .append_pair("username", username.as_str())
            .append_pair("password", password);
        debug!(url = %redact(&url), "Resolving passhash");

        let response = http_client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PrtgError::Connection(format!("HTTP request failed: {}", e)))?;

        match response.status() {
            StatusCode::OK => {
                let body = response.text().await.map_err(|e| {
                    PrtgError::Connection(format!("Failed to read passhash response: {}", e))
                })?;
                let passhash = body.trim().to_string();
                validate_passhash(&passhash).map_err(|_| {
                    PrtgError::Authentication("Server did not return a passhash".to_string())
                })?;
                Ok(PrtgPasshash::new_unchecked(passhash))
            }
            StatusCode::UNAUTHORIZED => Err(PrtgError::Authentication(
                "Invalid credentials provided".to_string(),
            )),
            StatusCode::NOT_FOUND => Err(PrtgError::ResourceNotFound(format!(
                "No resource at URL used: {}",
                redact(&url)
            ))),
            status => Err(PrtgError::Http {
                status: status.as_u16(),
                url: redact(&url),
            }),
        }
    }
}
