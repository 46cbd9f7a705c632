mod prtg_host;
mod prtg_passhash;
mod prtg_port;
mod prtg_url;
mod prtg_username;

pub use prtg_host::PrtgHost;
pub use prtg_passhash::PrtgPasshash;
pub use prtg_port::PrtgPort;
pub use prtg_url::PrtgUrl;
pub use prtg_username::PrtgUsername;

// Re-export validation functions for internal use
pub(crate) use prtg_host::validate_host;
pub(crate) use prtg_passhash::validate_passhash;
pub(crate) use prtg_port::validate_port;
pub(crate) use prtg_username::validate_username;
