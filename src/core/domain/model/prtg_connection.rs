use crate::core::domain::value_object::{
    PrtgHost, PrtgPasshash, PrtgPort, PrtgUrl, PrtgUsername,
};

/// Endpoint and credential configuration of one PRTG server.
///
/// Immutable once built; every entity reaches it through the shared
/// [`ApiClient`](crate::ApiClient).
#[derive(Debug, Clone)]
pub struct PrtgConnection {
    prtg_host: PrtgHost,
    prtg_port: PrtgPort,
    prtg_username: PrtgUsername,
    prtg_passhash: PrtgPasshash,
    prtg_secure: bool,
    prtg_accept_invalid_certs: bool,
    prtg_url: PrtgUrl,
}

impl PrtgConnection {
    pub fn new(
        prtg_host: PrtgHost,
        prtg_port: PrtgPort,
        prtg_username: PrtgUsername,
        prtg_passhash: PrtgPasshash,
        prtg_secure: bool,
        prtg_accept_invalid_certs: bool,
        prtg_url: PrtgUrl,
    ) -> Self {
        Self {
            prtg_host,
            prtg_port,
            prtg_username,
            prtg_passhash,
            prtg_secure,
            prtg_accept_invalid_certs,
            prtg_url,
        }
    }

    pub fn prtg_host(&self) -> &PrtgHost {
        &self.prtg_host
    }

    pub fn prtg_port(&self) -> &PrtgPort {
        &self.prtg_port
    }

    pub fn prtg_username(&self) -> &PrtgUsername {
        &self.prtg_username
    }

    pub fn prtg_passhash(&self) -> &PrtgPasshash {
        &self.prtg_passhash
    }

    pub fn is_connection_secure(&self) -> bool {
        self.prtg_secure
    }

    /// Whether TLS certificate verification is disabled.
    pub fn accepts_invalid_certs(&self) -> bool {
        self.prtg_accept_invalid_certs
    }

    pub fn prtg_url(&self) -> &PrtgUrl {
        &self.prtg_url
    }
}
