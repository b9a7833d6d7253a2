use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use merklelog_canonical::TenantId;
use merklelog_massifs::DEFAULT_MASSIF_HEIGHT;

/// Deadline for every storage fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared flag a caller can set to abandon verification between fetches.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// True once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Options for verification calls.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Tenant whose log is read. When `None`, the tenant is taken from each
    /// event's `tenant_identity` (default: None).
    pub tenant_id: Option<TenantId>,
    /// Massif height of the log (default: 14).
    pub massif_height: u8,
    /// Cancellation checked before every fetch.
    pub cancel: CancelToken,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            tenant_id: None,
            massif_height: DEFAULT_MASSIF_HEIGHT,
            cancel: CancelToken::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = VerifyOptions::default();
        assert_eq!(options.massif_height, 14);
        assert!(options.tenant_id.is_none());
        assert!(!options.cancel.is_cancelled());
    }

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        token.cancel();
        assert!(observer.is_cancelled());
    }
}
