use thiserror::Error;

/// The main error type for PRTG operations.
///
/// This enum represents all possible errors that can occur while talking
/// to a PRTG server or while mirroring its sensor tree locally.
#[derive(Error, Debug)]
pub enum PrtgError {
    /// Represents transport failures (connection refused, TLS, timeout)
    ///
    /// # Fields
    /// * `0` - A description of what went wrong during the request
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server rejected the configured credentials (HTTP 401)
    ///
    /// # Fields
    /// * `0` - A description of the authentication failure
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The requested object, property or endpoint does not exist
    ///
    /// Raised for HTTP 404 and for the server's `(Property not found)` answer.
    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    /// Any HTTP status the client does not explicitly handle
    ///
    /// # Fields
    /// * `status` - The HTTP status code returned by the server
    /// * `url` - The requested URL, with the passhash redacted
    #[error("Unexpected HTTP status {status} for {url}")]
    Http { status: u16, url: String },

    /// A document returned by the server does not have the expected shape
    ///
    /// Covers structural children without an id, duplicate ids among
    /// siblings, unparsable XML and inconsistent CSV tables.
    #[error("Malformed document: {0}")]
    MalformedDocument(String),

    /// Represents validation failures of caller supplied values
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Local I/O failures, e.g. while writing a graph to disk
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PrtgError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        PrtgError::MalformedDocument(message.into())
    }

    /// Returns `true` if the server rejected the credentials.
    pub fn is_authentication(&self) -> bool {
        matches!(self, PrtgError::Authentication(_))
    }

    /// Returns `true` if the target object or property does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PrtgError::ResourceNotFound(_))
    }
}

/// Specialized error type for validation failures.
///
/// This enum provides detailed context about why a validation
/// failed, including field-specific errors and format violations.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Represents a validation failure for a specific field
    ///
    /// # Fields
    /// * `field` - The name of the field that failed validation
    /// * `message` - A detailed message about why validation failed
    #[error("Field '{field}' validation failed: {message}")]
    Field { field: String, message: String },

    /// Represents format/syntax validation failures
    ///
    /// # Fields
    /// * `0` - Description of the format violation
    #[error("Format error: {0}")]
    Format(String),

    /// Represents violations of domain constraints
    ///
    /// # Fields
    /// * `0` - Description of the constraint violation
    #[error("Domain constraint violation: {0}")]
    ConstraintViolation(String),
}

/// Type alias for Results that may fail with a PrtgError
pub type PrtgResult<T> = Result<T, PrtgError>;
