use async_trait::async_trait;
use certadm_common::certificate::{CertificateStatus, RevocationReason};
use thiserror::Error;

use crate::models::DbCertificate;

pub mod memory;
pub mod mongodb;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Query Error: {0}")]
    MongoDB(#[from] ::mongodb::error::Error),

    #[error("certificate {serial} not found")]
    CertificateNotFound { serial: i64 },

    #[error("{count} certificates share serial number {serial}")]
    DuplicateSerial { serial: i64, count: usize },

    #[error("certificate {serial} is {status} and cannot be revoked")]
    NotRevocable { serial: i64, status: CertificateStatus },

    #[error(transparent)]
    Internal(#[from] Box<dyn std::error::Error + Send + Sync>),
}

#[async_trait]
pub trait Storage: CertificateStore + ConfigStore + Send + Sync + 'static {
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Certificate records keyed by serial number.
#[async_trait]
pub trait CertificateStore {
    /// Fetch the one record with this serial.
    ///
    /// Returns `StoreError::DuplicateSerial` when more than one record
    /// carries the serial; callers never get to pick one.
    async fn lookup(&self, serial: i64) -> Result<Option<DbCertificate>, StoreError>;

    /// Atomically move a valid certificate to revoked and return the updated
    /// record.
    ///
    /// The write only applies while the stored status is still valid, so of
    /// two concurrent calls for the same serial exactly one succeeds and the
    /// other gets `StoreError::NotRevocable`.
    async fn revoke(
        &self,
        serial: i64,
        revocation_date: &str,
        reason: RevocationReason,
    ) -> Result<DbCertificate, StoreError>;

    /// Record a newly issued certificate. Fails with
    /// `StoreError::DuplicateSerial` if the serial is taken.
    async fn insert(&self, certificate: DbCertificate) -> Result<DbCertificate, StoreError>;
}

/// Process-wide configuration entries.
#[async_trait]
pub trait ConfigStore {
    async fn get_config(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set_config(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
