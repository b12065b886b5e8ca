//! Stable exit codes for the installer CLI.

/// Command succeeded.
pub const OK: i32 = 0;
/// Command failed (prompt aborted, docker or Cloudflare error, bad config).
pub const FAILED: i32 = 1;
/// `n8n-install check` found catalog violations.
pub const INVALID_CATALOG: i32 = 2;
/// The container runtime never became ready; rerun once it is up.
pub const RUNTIME_NOT_READY: i32 = 3;
