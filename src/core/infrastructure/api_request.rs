//! Description of one PRTG API verb call.

/// A GET request against the PRTG web server, before authentication is
/// attached.
///
/// Parameters are kept unencoded; [`ApiClient::build_url`](crate::ApiClient::build_url)
/// percent-encodes them and appends `username`/`passhash`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    path: String,
    params: Vec<(String, String)>,
    api_prefix: bool,
}

impl ApiRequest {
    /// Starts a request for a verb path such as `rename.htm` or `table.xml`.
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: Vec::new(),
            api_prefix: true,
        }
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Appends a query parameter only when a value is present.
    #[must_use]
    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Serves the verb from the web root instead of `/api/` (charts).
    #[must_use]
    pub fn without_api_prefix(mut self) -> Self {
        self.api_prefix = false;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    pub fn uses_api_prefix(&self) -> bool {
        self.api_prefix
    }

    /// Returns the value of the first parameter named `key`.
    pub fn param_value(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}
