use axum::{Json, http::StatusCode, response::IntoResponse};
use certadm_common::{caller::CallerError, views::ApiErrorResponse};
use certadm_db::storage::StoreError;
use thiserror::Error;
use tracing::Level;

use crate::{auth::AuthError, guard::GuardError, revocation::RevocationError};

const INTERNAL_MESSAGE: &str = "Something went wrong on our end. Please try again later.";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Guard(#[from] GuardError),

    #[error(transparent)]
    Revocation(#[from] RevocationError),

    #[error(transparent)]
    Storage(#[from] StoreError),

    #[error(transparent)]
    CallerError(#[from] CallerError),

    #[error(transparent)]
    InternalAnyhow(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(AuthError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::Guard(ge) => match ge {
                GuardError::DefaultCredentialActive => StatusCode::SERVICE_UNAVAILABLE,
                GuardError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Revocation(re) => match re {
                RevocationError::CertificateNotFound { .. } => StatusCode::NOT_FOUND,
                RevocationError::NotRevocable { .. } => StatusCode::CONFLICT,
                RevocationError::NotOwner { .. } => StatusCode::FORBIDDEN,
                RevocationError::Timeout => StatusCode::GATEWAY_TIMEOUT,
                RevocationError::MalformedDn(_)
                | RevocationError::DuplicateSerial { .. }
                | RevocationError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CallerError(CallerError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            Self::InternalAnyhow(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::Timeout) => "Timeout",
            Self::Auth(_) => "Unauthorized",
            Self::Guard(ge) => match ge {
                GuardError::DefaultCredentialActive => "DefaultCredentialActive",
                GuardError::Timeout => "Timeout",
                _ => "InternalError",
            },
            Self::Revocation(re) => match re {
                RevocationError::CertificateNotFound { .. } => "CertificateNotFound",
                RevocationError::DuplicateSerial { .. } => "DuplicateSerial",
                RevocationError::MalformedDn(_) => "MalformedDN",
                RevocationError::NotRevocable { .. } => "NotRevocable",
                RevocationError::NotOwner { .. } => "NotOwner",
                RevocationError::Timeout => "Timeout",
                RevocationError::Storage(_) => "InternalError",
            },
            Self::Storage(_) => "InternalError",
            Self::CallerError(CallerError::Forbidden { .. }) => "Forbidden",
            Self::InternalAnyhow(_) => "InternalError",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Auth(AuthError::Timeout) => "Credential verification timed out.",
            Self::Auth(_) => "You are not authenticated to perform this action.",
            Self::Guard(GuardError::DefaultCredentialActive) => {
                "Default admin password should be changed."
            }
            Self::Guard(GuardError::Timeout) => "The request did not complete in time.",
            Self::Revocation(re) => match re {
                RevocationError::CertificateNotFound { .. } => {
                    "The requested certificate was not found."
                }
                RevocationError::NotRevocable { .. } => {
                    "The certificate is not in a state that allows revocation."
                }
                RevocationError::NotOwner { .. } => {
                    "Cannot revoke a certificate for which you are not the owner."
                }
                RevocationError::Timeout => "The request did not complete in time.",
                _ => INTERNAL_MESSAGE,
            },
            Self::CallerError(CallerError::Forbidden { .. }) => {
                "You do not have permission to perform this action."
            }
            _ => INTERNAL_MESSAGE,
        }
    }

    /// Level at which the rendered error is logged.
    ///
    /// Denials a caller can cause (4xx) are routine. Store anomalies and the
    /// default-credential block are already reported where they are detected.
    pub fn log_level(&self) -> Level {
        match self {
            Self::Revocation(RevocationError::MalformedDn(_))
            | Self::Revocation(RevocationError::DuplicateSerial { .. })
            | Self::Guard(GuardError::DefaultCredentialActive) => Level::DEBUG,
            _ if self.status_code() == StatusCode::GATEWAY_TIMEOUT => Level::WARN,
            _ if self.status_code().is_server_error() => Level::ERROR,
            _ => Level::DEBUG,
        }
    }
}

impl From<ApiError> for ApiErrorResponse {
    fn from(err: ApiError) -> Self {
        ApiErrorResponse {
            code: Some(err.code().into()),
            message: err.message().into(),

            #[cfg(debug_assertions)]
            details: Some(err.to_string()),

            #[cfg(not(debug_assertions))]
            details: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let level = self.log_level();
        if level == Level::ERROR {
            tracing::error!("Error returned by handler: {self}");
        } else if level == Level::WARN {
            tracing::warn!("Error returned by handler: {self}");
        } else {
            tracing::debug!("Error returned by handler: {self}");
        }

        let status_code = self.status_code();
        (status_code, Json(Into::<ApiErrorResponse>::into(self))).into_response()
    }
}
