use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
};
use certadm_common::views::{ApiErrorResponse, Certificate};
use tracing::instrument;

use crate::{
    auth::Bearer, context::ApiContext, deadline::Deadline, error::ApiError,
    revocation::RevocationService,
};

#[utoipa::path(
    get,
    path = "/api/v1/admin/certificates/{serial}",
    tags = ["admin"],
    params(
        ("serial" = i64, Path, description = "Certificate serial number")
    ),
    responses(
        (status = 200, description = "Certificate record", body = Certificate),
        (status = 404, description = "No certificate with this serial number", body = ApiErrorResponse),
        (status = 503, description = "Default admin password is still set", body = ApiErrorResponse),
    ),
    security(
        ("bearer" = [])
    )
)]
#[instrument(skip(ctx, claims, deadline), fields(audience = %claims.audience))]
pub async fn get_certificate(
    State(ctx): State<ApiContext>,
    Bearer(claims): Bearer,
    deadline: Deadline,
    Path(serial): Path<i64>,
) -> Result<Json<Certificate>, ApiError> {
    claims.require_admin()?;

    let record = RevocationService::new(Arc::clone(&ctx.db))
        .lookup(serial, deadline)
        .await?;

    Ok(Json(record.into()))
}
