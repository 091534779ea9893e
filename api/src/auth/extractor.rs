use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use certadm_common::caller::CallerClaims;

use super::error::AuthError;
use crate::{context::ApiContext, deadline::Deadline, error::ApiError};

/// Extractor that REQUIRES a verified bearer credential.
///
/// Returns 401 Unauthorized if the `Authorization` header is missing or the
/// token does not verify. Handlers that act on a record must take this
/// extractor before touching the store, so an unauthenticated caller never
/// learns whether the record exists.
///
/// # Examples
///
/// ```rust,ignore
/// use certadm_api::auth::Bearer;
///
/// pub async fn revoke(
///     Bearer(claims): Bearer,  // ← verified caller claims
///     Json(body): Json<RevokeCertificateParams>,
/// ) -> Result<Json<RevokeCertificateResponse>, ApiError> {
///     // ...
/// }
/// ```
pub struct Bearer(pub CallerClaims);

impl FromRequestParts<ApiContext> for Bearer {
    type Rejection = ApiError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &ApiContext,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let verifier = Arc::clone(&state.verifier);
        let deadline = Deadline::for_request(parts, &state.config);
        let token = extract_bearer_token(&parts.headers);

        async move {
            let token = token?;
            let claims = deadline
                .run(verifier.verify(&token))
                .await
                .map_err(|_| AuthError::Timeout)??;
            Ok(Bearer(claims))
        }
    }
}

/// Extract Bearer token from Authorization header
pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingCredentials)?
        .to_str()
        .map_err(|_| AuthError::InvalidCredentials)?;

    match auth_header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
        _ => Err(AuthError::InvalidCredentials),
    }
}
