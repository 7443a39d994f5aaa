//! Timeout and retry policy for ledger calls

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayPolicy {
    /// Upper bound on one ledger round trip
    pub timeout: Duration,
    /// Extra attempts after a transient failure
    pub retries: u32,
    /// Pause between attempts
    pub retry_backoff: Duration,
    /// Extra attempts for the waste status link after a create
    pub link_retries: u32,
}

impl Default for GatewayPolicy {
    /// A single attempt per call, bounded by a 10 second timeout
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retries: 0,
            retry_backoff: Duration::from_millis(200),
            link_retries: 1,
        }
    }
}
