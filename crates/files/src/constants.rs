//! Upload limits.

/// Maximum accepted upload size in bytes (10 MiB).
///
/// The hosted storage bucket enforces its own limit server-side; this bound
/// exists so oversized files are rejected before any bytes leave the client.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
