//! Bearer credential handling.
//!
//! Callers authenticate with `Authorization: Bearer <token>`. The token's
//! signature and expiry are checked by a [`CredentialVerifier`]; the engine
//! only ever sees the resulting [`CallerClaims`](certadm_common::caller::CallerClaims).

pub mod claims;
pub mod error;
pub mod extractor;

pub use claims::{CredentialVerifier, JwtVerifier, TokenClaims};
pub use error::AuthError;
pub use extractor::Bearer;
