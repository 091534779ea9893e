use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Status flag of a certificate as tracked in the authority's index.
///
/// Serialized with the single-letter flags of an OpenSSL CA database so that
/// records imported from an existing authority keep their meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum CertificateStatus {
    #[serde(rename = "V")]
    Valid,

    #[serde(rename = "R")]
    Revoked,

    #[serde(rename = "E")]
    Expired,

    /// Any other flag found in the store. Never revocable.
    ///
    /// The raw flag is not kept: such a record serializes back out (for
    /// example from the admin read endpoint) as `"Unknown"`.
    #[serde(other)]
    Unknown,
}

impl CertificateStatus {
    /// The flag as stored in the record store.
    pub fn flag(&self) -> &'static str {
        match self {
            Self::Valid => "V",
            Self::Revoked => "R",
            Self::Expired => "E",
            Self::Unknown => "?",
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl fmt::Display for CertificateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Valid => "valid",
            Self::Revoked => "revoked",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// CRL reason codes from RFC 5280 section 5.3.1.
///
/// Code 7 is unassigned by the RFC and has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum RevocationReason {
    Unspecified,
    KeyCompromise,
    #[serde(rename = "cACompromise")]
    CaCompromise,
    AffiliationChanged,
    Superseded,
    CessationOfOperation,
    CertificateHold,
    RemoveFromCrl,
    PrivilegeWithdrawn,
    #[serde(rename = "aACompromise")]
    AaCompromise,
}

impl RevocationReason {
    /// Numeric reason code as encoded in CRLs and OCSP responses.
    pub fn code(&self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::KeyCompromise => 1,
            Self::CaCompromise => 2,
            Self::AffiliationChanged => 3,
            Self::Superseded => 4,
            Self::CessationOfOperation => 5,
            Self::CertificateHold => 6,
            Self::RemoveFromCrl => 8,
            Self::PrivilegeWithdrawn => 9,
            Self::AaCompromise => 10,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        Some(match code {
            0 => Self::Unspecified,
            1 => Self::KeyCompromise,
            2 => Self::CaCompromise,
            3 => Self::AffiliationChanged,
            4 => Self::Superseded,
            5 => Self::CessationOfOperation,
            6 => Self::CertificateHold,
            8 => Self::RemoveFromCrl,
            9 => Self::PrivilegeWithdrawn,
            10 => Self::AaCompromise,
            _ => return None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_uses_index_flags() {
        assert_eq!(serde_json::to_string(&CertificateStatus::Valid).unwrap(), r#""V""#);
        assert_eq!(serde_json::to_string(&CertificateStatus::Revoked).unwrap(), r#""R""#);

        let expired: CertificateStatus = serde_json::from_str(r#""E""#).unwrap();
        assert_eq!(expired, CertificateStatus::Expired);
    }

    #[test]
    fn unrecognised_status_flag_is_unknown() {
        let status: CertificateStatus = serde_json::from_str(r#""S""#).unwrap();
        assert_eq!(status, CertificateStatus::Unknown);
        assert!(!status.is_valid());
        assert_eq!(serde_json::to_string(&status).unwrap(), r#""Unknown""#);
    }

    #[test]
    fn cessation_of_operation_is_code_5() {
        assert_eq!(RevocationReason::CessationOfOperation.code(), 5);
        assert_eq!(
            RevocationReason::from_code(5),
            Some(RevocationReason::CessationOfOperation)
        );
    }

    #[test]
    fn reason_code_7_is_unassigned() {
        assert_eq!(RevocationReason::from_code(7), None);
        assert_eq!(RevocationReason::from_code(11), None);
    }

    #[test]
    fn reason_codes_map_back_to_themselves() {
        for code in (0..=10).filter(|c| *c != 7) {
            let reason = RevocationReason::from_code(code).unwrap();
            assert_eq!(reason.code(), code);
        }
    }
}
