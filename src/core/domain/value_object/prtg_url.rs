use crate::core::domain::{
    error::{PrtgResult, ValidationError},
    value_object::{prtg_host::PrtgHost, prtg_port::PrtgPort},
};
use std::net::Ipv6Addr;
use url::Url;

/// Path prefix of every PRTG API verb except rendered charts.
pub(crate) const API_PREFIX: &str = "api/";

/// The validated base URL of a PRTG web server, e.g. `https://prtg.local:443/`.
///
/// Verb paths are joined onto it with [`PrtgUrl::join`]; the base always ends
/// with a slash so joining never drops a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrtgUrl(Url);

impl PrtgUrl {
    /// Builds the base URL from host, port and protocol.
    pub fn new(host: &PrtgHost, port: &PrtgPort, secure: bool) -> PrtgResult<Self> {
        let scheme = if secure { "https" } else { "http" };
        let host = match host.as_str().parse::<Ipv6Addr>() {
            Ok(_) => format!("[{}]", host.as_str()),
            Err(_) => host.as_str().to_string(),
        };
        let raw = format!("{}://{}:{}/", scheme, host, port.get());
        Self::parse(&raw)
    }

    /// Parses and validates an already assembled base URL.
    ///
    /// A trailing slash is appended when missing.
    pub fn parse(raw: &str) -> PrtgResult<Self> {
        let mut raw = raw.to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        validate_url(&raw)?;
        let url = Url::parse(&raw)
            .map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;
        Ok(Self(url))
    }

    /// Returns the base URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Joins a verb path (e.g. `table.xml`) onto the base, optionally behind
    /// the `api/` prefix.
    pub(crate) fn join(&self, path: &str, api_prefix: bool) -> PrtgResult<Url> {
        let path = path.trim_start_matches('/');
        let relative = if api_prefix {
            format!("{}{}", API_PREFIX, path)
        } else {
            path.to_string()
        };
        self.0.join(&relative).map_err(|e| {
            ValidationError::Format(format!("Invalid request path '{}': {}", path, e)).into()
        })
    }
}

/// Validates a base URL: parsable, http(s), no query or fragment.
pub(crate) fn validate_url(raw: &str) -> Result<(), ValidationError> {
    let parsed =
        Url::parse(raw).map_err(|e| ValidationError::Format(format!("Invalid URL format: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ValidationError::ConstraintViolation(
            "Invalid scheme. Must be one of: http, https".to_string(),
        ));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(ValidationError::Format(
            "Base URL cannot carry a query or fragment".to_string(),
        ));
    }
    Ok(())
}
