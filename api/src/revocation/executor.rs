use certadm_common::certificate::RevocationReason;
use certadm_db::{
    models::DbCertificate,
    storage::{Storage, StoreError},
};
use chrono::{DateTime, Utc};

/// The only reason code this service records.
pub const REVOCATION_REASON: RevocationReason = RevocationReason::CessationOfOperation;

/// Timestamp layout of the authority's certificate database (UTC).
pub const AUTHORITY_DATE_FORMAT: &str = "%y%m%d%H%M%SZ";

pub fn authority_timestamp(at: DateTime<Utc>) -> String {
    at.format(AUTHORITY_DATE_FORMAT).to_string()
}

/// Revoke an already-authorized certificate with a single conditional write.
pub async fn execute(
    store: &dyn Storage,
    serial: i64,
    at: DateTime<Utc>,
) -> Result<DbCertificate, StoreError> {
    store
        .revoke(serial, &authority_timestamp(at), REVOCATION_REASON)
        .await
}

#[cfg(test)]
mod tests {
    use certadm_common::certificate::CertificateStatus;
    use certadm_db::storage::{CertificateStore, memory::MemoryStorage};
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamp_uses_authority_format() {
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 8, 5, 3).unwrap();
        assert_eq!(authority_timestamp(at), "261019080503Z");
    }

    #[tokio::test]
    async fn execute_records_date_and_reason() {
        let store = MemoryStorage::with_certificates(vec![DbCertificate::issued(
            42,
            "CN=alice.example.com",
        )]);
        let at = Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap();

        let revoked = execute(&store, 42, at).await.unwrap();

        assert_eq!(revoked.status, CertificateStatus::Revoked);
        assert_eq!(revoked.revocation_date.as_deref(), Some("261019120000Z"));
        assert_eq!(
            revoked.revocation_reason,
            Some(RevocationReason::CessationOfOperation)
        );
        assert_eq!(store.lookup(42).await.unwrap(), Some(revoked));
    }

    #[tokio::test]
    async fn execute_does_not_touch_revoked_records() {
        let original = DbCertificate::issued(42, "CN=alice.example.com");
        let store = MemoryStorage::with_certificates(vec![original]);
        let first = execute(&store, 42, Utc::now()).await.unwrap();

        let err = execute(&store, 42, Utc::now()).await.unwrap_err();
        assert!(matches!(err, StoreError::NotRevocable { .. }));
        assert_eq!(store.lookup(42).await.unwrap(), Some(first));
    }
}
