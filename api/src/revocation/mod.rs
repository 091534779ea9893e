//! Revocation authorization engine.
//!
//! A revocation request goes through three steps:
//!
//! 1. The record is looked up by serial number ([`RevocationService::lookup`]).
//! 2. [`authorizer::authorize`] checks that the record is still valid and that
//!    the caller owns it (common name equals the caller's audience) or is an
//!    admin.
//! 3. [`executor::execute`] flips the record to revoked with the
//!    cessation-of-operation reason code.
//!
//! Nothing is written unless every check passes, and the final write is
//! conditional on the record still being valid, so concurrent requests for
//! the same serial cannot both succeed.

use std::sync::Arc;

use certadm_common::{caller::CallerClaims, certificate::CertificateStatus};
use certadm_db::{
    models::DbCertificate,
    storage::{Storage, StoreError},
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::deadline::Deadline;

pub mod authorizer;
pub mod executor;
pub mod ownership;

pub use authorizer::{Grant, authorize};
pub use ownership::{MalformedDn, common_name};

#[derive(Debug, Error)]
pub enum RevocationError {
    #[error("certificate {serial} not found")]
    CertificateNotFound { serial: i64 },

    #[error("{count} certificates share serial number {serial}")]
    DuplicateSerial { serial: i64, count: usize },

    #[error(transparent)]
    MalformedDn(#[from] MalformedDn),

    #[error("certificate {serial} is {status} and cannot be revoked")]
    NotRevocable { serial: i64, status: CertificateStatus },

    #[error("caller {audience} does not own certificate {serial}")]
    NotOwner { serial: i64, audience: String },

    #[error("record store did not respond before the deadline")]
    Timeout,

    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for RevocationError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::CertificateNotFound { serial } => Self::CertificateNotFound { serial },
            StoreError::DuplicateSerial { serial, count } => {
                Self::DuplicateSerial { serial, count }
            }
            StoreError::NotRevocable { serial, status } => Self::NotRevocable { serial, status },
            other => Self::Storage(other),
        }
    }
}

impl From<tokio::time::error::Elapsed> for RevocationError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        Self::Timeout
    }
}

/// Surface data-integrity problems in the store to operators.
fn report_anomaly(err: &RevocationError) {
    match err {
        RevocationError::MalformedDn(e) => {
            warn!(dn = %e.dn, "Certificate record has a malformed distinguished name")
        }
        RevocationError::DuplicateSerial { serial, count } => {
            error!(serial, count, "Serial number is not unique in the record store")
        }
        _ => {}
    }
}

#[derive(Clone)]
pub struct RevocationService {
    store: Arc<dyn Storage>,
}

impl RevocationService {
    pub fn new(store: Arc<dyn Storage>) -> Self {
        Self { store }
    }

    /// Fetch the record for `serial`, failing if it is missing or not unique.
    #[instrument(skip(self, deadline))]
    pub async fn lookup(
        &self,
        serial: i64,
        deadline: Deadline,
    ) -> Result<DbCertificate, RevocationError> {
        deadline
            .run(self.store.lookup(serial))
            .await?
            .map_err(RevocationError::from)
            .inspect_err(report_anomaly)?
            .ok_or(RevocationError::CertificateNotFound { serial })
    }

    /// Revoke `serial` on behalf of `claims`.
    #[instrument(
        skip(self, claims, deadline),
        fields(audience = %claims.audience, admin = claims.admin)
    )]
    pub async fn revoke(
        &self,
        serial: i64,
        claims: &CallerClaims,
        deadline: Deadline,
    ) -> Result<DbCertificate, RevocationError> {
        let record = self.lookup(serial, deadline).await?;
        let grant = authorize(&record, claims).inspect_err(report_anomaly)?;

        let revoked = deadline
            .run(executor::execute(&*self.store, serial, chrono::Utc::now()))
            .await??;

        info!(?grant, revocation_date = ?revoked.revocation_date, "Certificate revoked");
        Ok(revoked)
    }
}
