//! Per-request deadlines.
//!
//! A caller may bound a request with the `x-request-timeout-ms` header. The
//! resulting [`Deadline`] is shared by every external call the request makes
//! (credential verification, config reads, record store round trips), so the
//! whole request finishes or fails within it.

use std::{convert::Infallible, future::Future, time::Duration};

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, request::Parts},
};
use tokio::time::{Instant, error::Elapsed, timeout_at};

use crate::{config::CertAdmApiConfig, context::ApiContext};

pub const REQUEST_TIMEOUT_HEADER: &str = "x-request-timeout-ms";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Instant);

impl Deadline {
    pub fn after(timeout: Duration) -> Self {
        Self(Instant::now() + timeout)
    }

    /// Build the deadline for a request from its headers.
    ///
    /// A missing or unparseable header falls back to the configured default;
    /// a parseable one is clamped to the configured maximum.
    pub fn from_headers(headers: &HeaderMap, config: &CertAdmApiConfig) -> Self {
        let requested = headers
            .get(REQUEST_TIMEOUT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis);

        let timeout = match requested {
            Some(t) => t.min(config.max_request_timeout()),
            None => config.request_timeout(),
        };

        Self::after(timeout)
    }

    /// The deadline of the request `parts` belong to.
    ///
    /// Computed on first use and stored in the request extensions, so the
    /// guard, the credential check and the handler all share one deadline.
    pub fn for_request(parts: &mut Parts, config: &CertAdmApiConfig) -> Self {
        if let Some(deadline) = parts.extensions.get::<Deadline>() {
            return *deadline;
        }

        let deadline = Self::from_headers(&parts.headers, config);
        parts.extensions.insert(deadline);
        deadline
    }

    pub fn remaining(&self) -> Duration {
        self.0.saturating_duration_since(Instant::now())
    }

    /// Run `fut`, dropping it if the deadline passes first.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Elapsed> {
        timeout_at(self.0, fut).await
    }
}

impl FromRequestParts<ApiContext> for Deadline {
    type Rejection = Infallible;

    fn from_request_parts(
        parts: &mut Parts,
        state: &ApiContext,
    ) -> impl Future<Output = Result<Self, Self::Rejection>> + Send {
        let deadline = Deadline::for_request(parts, &state.config);
        async move { Ok(deadline) }
    }
}
