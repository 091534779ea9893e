use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallerError {
    #[error("Caller {audience} is missing privilege: {privilege}")]
    Forbidden { audience: String, privilege: String },
}

impl CallerError {
    pub fn forbidden(audience: &str, privilege: &str) -> Self {
        Self::Forbidden {
            audience: audience.into(),
            privilege: privilege.into(),
        }
    }
}

/// Identity of the caller, read from an already-verified bearer credential.
///
/// Built once per request and never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerClaims {
    /// Subject the credential was issued to. For non-admin callers this must
    /// equal the common name of any certificate they act on.
    pub audience: String,

    /// Whether the credential carries administrative privilege.
    pub admin: bool,
}

impl CallerClaims {
    pub fn new(audience: impl Into<String>, admin: bool) -> Self {
        Self {
            audience: audience.into(),
            admin,
        }
    }

    /// Case-sensitive comparison of the caller's identity with a common name.
    pub fn is_subject(&self, common_name: &str) -> bool {
        self.audience == common_name
    }

    #[tracing::instrument(skip(self), fields(audience = %self.audience))]
    pub fn require_admin(&self) -> Result<(), CallerError> {
        if !self.admin {
            return Err(CallerError::forbidden(&self.audience, "admin"));
        }
        Ok(())
    }
}
