//! Input parameters for the various functions within certadm.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for revoking a certificate.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct RevokeCertificateParams {
    /// Serial number of the certificate to revoke.
    pub serial_number: i64,
}
