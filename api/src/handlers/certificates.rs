use std::sync::Arc;

use axum::{Json, extract::State};
use certadm_common::{
    params::RevokeCertificateParams,
    views::{ApiErrorResponse, RevokeCertificateResponse},
};
use tracing::{debug, instrument};

use crate::{
    auth::Bearer, context::ApiContext, deadline::Deadline, error::ApiError,
    revocation::RevocationService,
};

/// POST /api/v1/acme/revoke
///
/// Revoke a certificate. Callers may revoke certificates whose common name
/// matches their token's audience; admins may revoke any certificate.
#[utoipa::path(
    post,
    path = "/api/v1/acme/revoke",
    tags = ["acme"],
    request_body = RevokeCertificateParams,
    responses(
        (status = 200, description = "Certificate revoked", body = RevokeCertificateResponse),
        (status = 404, description = "No certificate with this serial number", body = ApiErrorResponse),
        (status = 409, description = "Certificate is not valid and cannot be revoked", body = ApiErrorResponse),
        (status = 503, description = "Default admin password is still set", body = ApiErrorResponse),
        (status = 504, description = "Deadline exceeded", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
#[instrument(skip(ctx, claims, deadline), fields(audience = %claims.audience))]
pub async fn revoke_certificate(
    State(ctx): State<ApiContext>,
    Bearer(claims): Bearer,
    deadline: Deadline,
    Json(params): Json<RevokeCertificateParams>,
) -> Result<Json<RevokeCertificateResponse>, ApiError> {
    debug!(serial = params.serial_number, "Revocation requested");

    let revoked = RevocationService::new(Arc::clone(&ctx.db))
        .revoke(params.serial_number, &claims, deadline)
        .await?;

    Ok(Json(RevokeCertificateResponse {
        message: "Certificate revoked".into(),
        certificate: revoked.into(),
    }))
}
