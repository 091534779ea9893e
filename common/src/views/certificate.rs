use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::certificate::{CertificateStatus, RevocationReason};

/// A certificate as recorded by the authority.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Certificate {
    pub serial_number: i64,
    /// Subject distinguished name
    pub distinguished_name: String,
    pub status: CertificateStatus,
    /// When the certificate was revoked, in the authority's database format
    /// (`YYMMDDHHMMSSZ`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revocation_reason: Option<RevocationReason>,
}

/// Response for a successful revocation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RevokeCertificateResponse {
    pub message: String,
    pub certificate: Certificate,
}
