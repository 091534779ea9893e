use std::fmt::Display;

use certadm_common::{
    certificate::{CertificateStatus, RevocationReason},
    views::Certificate,
};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One issued certificate as tracked by the authority.
///
/// `revocation_date` and `revocation_reason` are set if and only if `status`
/// is [`CertificateStatus::Revoked`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DbCertificate {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,

    /// Unique key of the certificate. Never changes after issuance.
    pub serial_number: i64,

    pub distinguished_name: String,

    pub status: CertificateStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<RevocationReason>,
}

/// Returned when a revoked status is requested without its revocation
/// fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a certificate only becomes revoked through mark_revoked")]
pub struct RevokedWithoutDetails;

impl Display for DbCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DbCertificate {{ serial_number: {}, distinguished_name: {}, status: {} }}",
            self.serial_number, self.distinguished_name, self.status
        )
    }
}

impl DbCertificate {
    /// A freshly issued, valid certificate.
    pub fn issued(serial_number: i64, distinguished_name: impl Into<String>) -> Self {
        Self {
            id: None,
            serial_number,
            distinguished_name: distinguished_name.into(),
            status: CertificateStatus::Valid,
            revocation_date: None,
            revocation_reason: None,
        }
    }

    /// Replace the status of a certificate that has not been revoked.
    ///
    /// `Revoked` is refused: it is only reachable through
    /// [`DbCertificate::mark_revoked`], which also records the date and reason.
    pub fn with_status(
        mut self,
        status: CertificateStatus,
    ) -> Result<Self, RevokedWithoutDetails> {
        if status == CertificateStatus::Revoked {
            return Err(RevokedWithoutDetails);
        }

        self.status = status;
        Ok(self)
    }

    /// Apply the valid to revoked transition in place.
    ///
    /// Returns `false`, leaving the record untouched, unless the certificate
    /// is currently valid.
    pub fn mark_revoked(&mut self, revocation_date: &str, reason: RevocationReason) -> bool {
        if !self.status.is_valid() {
            return false;
        }

        self.status = CertificateStatus::Revoked;
        self.revocation_date = Some(revocation_date.to_string());
        self.revocation_reason = Some(reason);
        true
    }
}

impl From<DbCertificate> for Certificate {
    fn from(value: DbCertificate) -> Self {
        Self {
            serial_number: value.serial_number,
            distinguished_name: value.distinguished_name,
            status: value.status,
            revocation_date: value.revocation_date,
            revocation_reason: value.revocation_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_certificate_has_no_revocation_fields() {
        let cert = DbCertificate::issued(42, "O=Example, CN=alice.example.com");
        assert_eq!(cert.status, CertificateStatus::Valid);
        assert!(cert.revocation_date.is_none());
        assert!(cert.revocation_reason.is_none());
    }

    #[test]
    fn mark_revoked_sets_every_revocation_field() {
        let mut cert = DbCertificate::issued(42, "CN=alice.example.com");
        assert!(cert.mark_revoked("261019120000Z", RevocationReason::CessationOfOperation));

        assert_eq!(cert.status, CertificateStatus::Revoked);
        assert_eq!(cert.revocation_date.as_deref(), Some("261019120000Z"));
        assert_eq!(
            cert.revocation_reason,
            Some(RevocationReason::CessationOfOperation)
        );
    }

    #[test]
    fn mark_revoked_leaves_non_valid_records_alone() {
        let mut cert = DbCertificate::issued(7, "CN=bob.example.com")
            .with_status(CertificateStatus::Expired)
            .unwrap();
        let before = cert.clone();

        assert!(!cert.mark_revoked("261019120000Z", RevocationReason::CessationOfOperation));
        assert_eq!(cert, before);
    }

    #[test]
    fn with_status_refuses_revoked() {
        let cert = DbCertificate::issued(7, "CN=bob.example.com");

        assert_eq!(
            cert.clone().with_status(CertificateStatus::Revoked),
            Err(RevokedWithoutDetails)
        );
        assert_eq!(
            cert.with_status(CertificateStatus::Expired).unwrap().status,
            CertificateStatus::Expired
        );
    }
}
