//! Session gating for writes.

use crate::error::{ClinicError, ClinicResult};
use dpm_backend::{Backend, Session};

/// Resolves the current session, treating both an absent session and a
/// failed auth lookup as "not authenticated".
///
/// Every write that requires an actor identity calls this first, so an
/// expired session aborts the operation before any partial write or upload.
pub(crate) async fn require_session(backend: &Backend) -> ClinicResult<Session> {
    match backend.auth().session().await {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(ClinicError::Unauthenticated),
        Err(error) => {
            tracing::warn!(%error, "auth lookup failed; treating as unauthenticated");
            Err(ClinicError::Unauthenticated)
        }
    }
}
