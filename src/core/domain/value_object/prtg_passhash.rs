use crate::core::domain::error::ValidationError;
use std::fmt;

/// A PRTG passhash, the credential token sent instead of the password.
///
/// The value never shows up in `Debug` output or in logged URLs.
#[derive(Clone, PartialEq, Eq)]
pub struct PrtgPasshash(String);

impl PrtgPasshash {
    /// Creates a new passhash without validation.
    pub(crate) fn new_unchecked(passhash: String) -> Self {
        Self(passhash)
    }

    /// Returns the passhash as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrtgPasshash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrtgPasshash(***)")
    }
}

/// Validates a passhash: PRTG issues them as a string of decimal digits.
pub(crate) fn validate_passhash(passhash: &str) -> Result<(), ValidationError> {
    if passhash.is_empty() {
        return Err(ValidationError::Field {
            field: "passhash".to_string(),
            message: "Passhash cannot be empty".to_string(),
        });
    }
    if !passhash.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::Format(
            "Passhash must only contain digits".to_string(),
        ));
    }
    Ok(())
}
