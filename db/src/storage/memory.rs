//! In-process store used by tests and local runs without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use certadm_common::certificate::RevocationReason;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{
    models::DbCertificate,
    storage::{CertificateStore, ConfigStore, Storage, StoreError},
};

#[derive(Debug, Default)]
pub struct MemoryStorage {
    certificates: RwLock<Vec<DbCertificate>>,
    config: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed records as-is, without the uniqueness check `insert` applies.
    pub fn with_certificates(certificates: Vec<DbCertificate>) -> Self {
        Self {
            certificates: RwLock::new(certificates),
            config: RwLock::default(),
        }
    }

    pub fn with_config(mut self, key: &str, value: &str) -> Self {
        self.config
            .get_mut()
            .insert(key.to_string(), value.to_string());
        self
    }

    fn matching<'a>(
        certificates: &'a [DbCertificate],
        serial: i64,
    ) -> Result<Option<&'a DbCertificate>, StoreError> {
        let mut matches = certificates.iter().filter(|c| c.serial_number == serial);
        let first = matches.next();
        let rest = matches.count();
        if rest > 0 {
            return Err(StoreError::DuplicateSerial {
                serial,
                count: rest + 1,
            });
        }
        Ok(first)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl CertificateStore for MemoryStorage {
    async fn lookup(&self, serial: i64) -> Result<Option<DbCertificate>, StoreError> {
        let certificates = self.certificates.read().await;
        Ok(Self::matching(&certificates, serial)?.cloned())
    }

    async fn revoke(
        &self,
        serial: i64,
        revocation_date: &str,
        reason: RevocationReason,
    ) -> Result<DbCertificate, StoreError> {
        // Held for the whole read-check-write so concurrent revocations
        // serialize here.
        let mut certificates = self.certificates.write().await;
        Self::matching(&certificates, serial)?;

        let record = certificates
            .iter_mut()
            .find(|c| c.serial_number == serial)
            .ok_or(StoreError::CertificateNotFound { serial })?;

        if !record.mark_revoked(revocation_date, reason) {
            return Err(StoreError::NotRevocable {
                serial,
                status: record.status,
            });
        }

        debug!(serial, "Certificate revoked in memory store");
        Ok(record.clone())
    }

    async fn insert(&self, certificate: DbCertificate) -> Result<DbCertificate, StoreError> {
        let mut certificates = self.certificates.write().await;
        if certificates
            .iter()
            .any(|c| c.serial_number == certificate.serial_number)
        {
            return Err(StoreError::DuplicateSerial {
                serial: certificate.serial_number,
                count: 2,
            });
        }

        certificates.push(certificate.clone());
        Ok(certificate)
    }
}

#[async_trait]
impl ConfigStore for MemoryStorage {
    async fn get_config(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.config.read().await.get(key).cloned())
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.config
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use certadm_common::certificate::CertificateStatus;

    use super::*;

    fn alice() -> DbCertificate {
        DbCertificate::issued(42, "O=Example, CN=alice.example.com")
    }

    #[tokio::test]
    async fn lookup_missing_serial_is_none() {
        let store = MemoryStorage::new();
        assert!(store.lookup(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_finds_record_by_serial() {
        let store = MemoryStorage::with_certificates(vec![alice()]);
        let record = store.lookup(42).await.unwrap().unwrap();
        assert_eq!(record.distinguished_name, "O=Example, CN=alice.example.com");
    }

    #[tokio::test]
    async fn lookup_refuses_duplicate_serials() {
        let store = MemoryStorage::with_certificates(vec![alice(), alice()]);
        let err = store.lookup(42).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::DuplicateSerial { serial: 42, count: 2 }
        ));
    }

    #[tokio::test]
    async fn insert_rejects_taken_serial() {
        let store = MemoryStorage::with_certificates(vec![alice()]);
        let err = store.insert(alice()).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateSerial { serial: 42, .. }));
    }

    #[tokio::test]
    async fn revoke_is_single_shot() {
        let store = MemoryStorage::with_certificates(vec![alice()]);

        let revoked = store
            .revoke(42, "261019120000Z", RevocationReason::CessationOfOperation)
            .await
            .unwrap();
        assert_eq!(revoked.status, CertificateStatus::Revoked);

        let err = store
            .revoke(42, "261019120001Z", RevocationReason::CessationOfOperation)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::NotRevocable { serial: 42, status: CertificateStatus::Revoked }
        ));

        let stored = store.lookup(42).await.unwrap().unwrap();
        assert_eq!(stored.revocation_date.as_deref(), Some("261019120000Z"));
    }

    #[tokio::test]
    async fn revoke_unknown_serial_is_not_found() {
        let store = MemoryStorage::new();
        let err = store
            .revoke(9, "261019120000Z", RevocationReason::CessationOfOperation)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::CertificateNotFound { serial: 9 }));
    }

    #[tokio::test]
    async fn concurrent_revocations_have_one_winner() {
        let store = Arc::new(MemoryStorage::with_certificates(vec![alice()]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .revoke(42, "261019120000Z", RevocationReason::CessationOfOperation)
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(StoreError::NotRevocable { .. }) => rejected += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(rejected, 7);
    }

    #[tokio::test]
    async fn config_round_trips() {
        let store = MemoryStorage::new();
        assert!(store.get_config("admin_password").await.unwrap().is_none());

        store.set_config("admin_password", "hash").await.unwrap();
        assert_eq!(
            store.get_config("admin_password").await.unwrap().as_deref(),
            Some("hash")
        );
    }
}
