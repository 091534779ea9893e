//! Default-credential guard.
//!
//! Every installation is bootstrapped with the well-known admin password
//! [`DEFAULT_ADMIN_PASSWORD`]. Until an operator changes it, anyone could log
//! in as admin, so gated routes refuse to run at all. The stored hash is
//! re-read on every request: rotating the password takes effect immediately.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use certadm_db::{
    models::ADMIN_PASSWORD_KEY,
    password::{DEFAULT_ADMIN_PASSWORD, PasswordError, SecureCompare},
    storage::{Storage, StoreError},
};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::{context::ApiContext, deadline::Deadline, error::ApiError};

/// Decides per request whether the guard is bypassed.
pub type Skipper = Arc<dyn Fn(&Request) -> bool + Send + Sync>;

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Default admin password should be changed")]
    DefaultCredentialActive,

    #[error("Admin password is not configured")]
    CredentialUnset,

    #[error("Admin credential check did not finish before the deadline")]
    Timeout,

    #[error("Admin credential comparison was aborted")]
    CompareAborted,

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// The stored admin password is the default one.
    Blocked,
    Clear,
}

/// Per-instance guard configuration. Unset fields get their defaults when the
/// guard is constructed.
#[derive(Clone, Default)]
pub struct GuardConfig {
    pub skipper: Option<Skipper>,
}

impl GuardConfig {
    pub fn with_skipper<F>(mut self, skipper: F) -> Self
    where
        F: Fn(&Request) -> bool + Send + Sync + 'static,
    {
        let skipper: Skipper = Arc::new(skipper);
        self.skipper = Some(skipper);
        self
    }
}

fn never_skip(_: &Request) -> bool {
    false
}

pub struct DefaultCredentialGuard {
    store: Arc<dyn Storage>,
    compare: Arc<dyn SecureCompare>,
    skipper: Skipper,
}

impl DefaultCredentialGuard {
    pub fn new(
        store: Arc<dyn Storage>,
        compare: Arc<dyn SecureCompare>,
        config: GuardConfig,
    ) -> Self {
        Self {
            store,
            compare,
            skipper: config
                .skipper
                .unwrap_or_else(|| Arc::new(never_skip) as Skipper),
        }
    }

    pub fn skips(&self, request: &Request) -> bool {
        (self.skipper)(request)
    }

    /// Read the stored admin credential and compare it with the default.
    ///
    /// A missing entry or an unreadable hash is an error rather than
    /// [`GuardState::Clear`].
    pub async fn evaluate(&self, deadline: Deadline) -> Result<GuardState, GuardError> {
        let stored = deadline
            .run(self.store.get_config(ADMIN_PASSWORD_KEY))
            .await
            .map_err(|_| GuardError::Timeout)??
            .ok_or(GuardError::CredentialUnset)?;

        // Keep bcrypt off the async workers.
        let compare = Arc::clone(&self.compare);
        let is_default = deadline
            .run(tokio::task::spawn_blocking(move || {
                compare.compare(DEFAULT_ADMIN_PASSWORD, &stored)
            }))
            .await
            .map_err(|_| GuardError::Timeout)?
            .map_err(|_| GuardError::CompareAborted)??;

        Ok(if is_default {
            GuardState::Blocked
        } else {
            GuardState::Clear
        })
    }

    #[instrument(skip_all)]
    pub async fn check(&self, deadline: Deadline) -> Result<(), GuardError> {
        match self.evaluate(deadline).await? {
            GuardState::Blocked => {
                warn!("Refusing request: the default admin password is still set");
                Err(GuardError::DefaultCredentialActive)
            }
            GuardState::Clear => {
                debug!("Admin password has been changed from the default");
                Ok(())
            }
        }
    }
}

/// Middleware placing a route behind the [`DefaultCredentialGuard`] held in
/// the [`ApiContext`].
pub async fn enforce(
    State(ctx): State<ApiContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if ctx.guard.skips(&request) {
        return Ok(next.run(request).await);
    }

    let (mut parts, body) = request.into_parts();
    let deadline = Deadline::for_request(&mut parts, &ctx.config);
    ctx.guard.check(deadline).await?;

    Ok(next.run(Request::from_parts(parts, body)).await)
}
