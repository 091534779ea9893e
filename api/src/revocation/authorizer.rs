use certadm_common::caller::CallerClaims;
use certadm_db::models::DbCertificate;

use super::{RevocationError, ownership::common_name};

/// Why a revocation was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// The caller is the certificate's subject.
    Owner,
    /// The caller is not the subject but holds admin privilege.
    Admin,
}

/// Decide whether `claims` may revoke `record`.
///
/// The state check runs first: a caller asking about a certificate that can
/// no longer be revoked gets `NotRevocable` whether or not they own it. The
/// common name is always resolved, so a malformed DN is reported even to
/// admins.
pub fn authorize(record: &DbCertificate, claims: &CallerClaims) -> Result<Grant, RevocationError> {
    if !record.status.is_valid() {
        return Err(RevocationError::NotRevocable {
            serial: record.serial_number,
            status: record.status,
        });
    }

    let cn = common_name(&record.distinguished_name)?;

    if claims.is_subject(cn) {
        Ok(Grant::Owner)
    } else if claims.admin {
        Ok(Grant::Admin)
    } else {
        Err(RevocationError::NotOwner {
            serial: record.serial_number,
            audience: claims.audience.clone(),
        })
    }
}
