use async_trait::async_trait;
use certadm_common::caller::CallerClaims;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::error::AuthError;
use crate::config::CertAdmApiConfig;

/// Payload of a bearer token issued to a certadm caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Audience: the identity the token was issued to.
    pub aud: String,
    /// Administrative privilege. Absent means `false`.
    #[serde(default)]
    pub admin: bool,
    /// Expiry (seconds since the epoch)
    pub exp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

impl From<TokenClaims> for CallerClaims {
    fn from(value: TokenClaims) -> Self {
        CallerClaims::new(value.aud, value.admin)
    }
}

/// Turns a bearer token into the caller's claims.
///
/// Implementations own all cryptographic checks. Any token that cannot be
/// read must produce an error; there is no anonymous fallback.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<CallerClaims, AuthError>;
}

/// Verifies JWTs with a fixed key and algorithm.
pub struct JwtVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        // The audience is the caller's identity, not this service's name.
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp", "aud"]);

        Self { key, validation }
    }

    /// The verifier configured by `--token-*` options.
    pub fn from_config(config: &CertAdmApiConfig) -> anyhow::Result<Self> {
        let (key, algorithm) = config.token_verification_key()?;
        let verifier = Self::new(key, algorithm);

        Ok(match config.token_issuer {
            Some(ref issuer) => verifier.with_issuer(issuer),
            None => verifier,
        })
    }

    /// Only accept tokens from this issuer.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }
}

#[async_trait]
impl CredentialVerifier for JwtVerifier {
    #[instrument(skip(self, token), fields(scheme = "jwt"))]
    async fn verify(&self, token: &str) -> Result<CallerClaims, AuthError> {
        let data = decode::<TokenClaims>(token, &self.key, &self.validation).map_err(|e| {
            debug!(error = %e, "Rejected bearer token");
            AuthError::InvalidCredentials
        })?;

        if data.claims.aud.is_empty() {
            debug!("Rejected bearer token with empty audience");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(data.claims.into())
    }
}
