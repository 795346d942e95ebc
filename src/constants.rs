//! Application-wide constants for clientprojet.
//!
//! Centralizes the timeouts, pool sizes and default endpoints used by the
//! communication layer.
//!
//! # Categories
//!
//! - **Timeouts**: Network and worker timeouts
//! - **Workers**: Background dispatch pool sizing
//! - **Server**: Default API location

use std::time::Duration;

// ============================================================================
// Timeouts
// ============================================================================

/// HTTP client request timeout for API calls.
///
/// Applies to each individual round trip. A request that exceeds it resolves
/// with the custom timeout status (608).
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How long an idle worker waits on the job queue before re-checking the
/// shutdown flag.
pub const WORKER_POLL_INTERVAL: Duration = Duration::from_millis(100);

// ============================================================================
// Workers
// ============================================================================

/// Default number of background worker threads.
///
/// Bounds how many non-blocking communications can be in flight at once.
/// Further units queue until a worker frees up.
pub const MAX_CONCURRENT_COMMUNICATIONS: usize = 16;

// ============================================================================
// Server
// ============================================================================

/// Default base URL of the project API. Operation paths are joined onto it.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080/api/";

/// User agent string sent with every request.
pub fn user_agent() -> String {
    format!("clientprojet/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_values_are_reasonable() {
        assert!(HTTP_REQUEST_TIMEOUT >= Duration::from_secs(5));
        assert!(HTTP_REQUEST_TIMEOUT <= Duration::from_secs(60));
        assert!(WORKER_POLL_INTERVAL < HTTP_REQUEST_TIMEOUT);
    }

    #[test]
    fn test_pool_is_bounded() {
        assert!(MAX_CONCURRENT_COMMUNICATIONS > 0);
        assert!(MAX_CONCURRENT_COMMUNICATIONS <= 64);
    }

    #[test]
    fn test_default_server_url_ends_with_slash() {
        // Operation paths are relative and get appended directly
        assert!(DEFAULT_SERVER_URL.ends_with('/'));
    }

    #[test]
    fn test_user_agent_contains_version() {
        assert!(user_agent().starts_with("clientprojet/"));
        assert!(user_agent().contains(env!("CARGO_PKG_VERSION")));
    }
}
