//! The abstract "fetch history" capability.
//!
//! The engine only ever sees one operation: fetch the current history
//! payload, which either succeeds or fails. Concrete transports (the HTTP
//! client, scripted test sources) implement [`HistorySource`] behind this
//! seam.

use crate::snapshot::RawHistoryPayload;
use std::future::Future;

/// A transport-level fetch failure.
///
/// Network errors, non-2xx responses, and malformed JSON all collapse into
/// this one type; the engine treats them identically (notify unchanged, keep
/// polling).
#[derive(Debug, Clone, thiserror::Error)]
#[error("history fetch failed: {0}")]
pub struct FetchError(String);

impl FetchError {
    /// Create a fetch error from any displayable reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self(reason.into())
    }
}

/// Something that can fetch the remote now-playing history.
///
/// The fetch is asynchronous and non-blocking; the engine awaits its
/// completion before doing anything else, so implementations never see two
/// overlapping calls.
pub trait HistorySource: Send {
    /// Fetch the current history payload from the source.
    fn fetch_history(
        &mut self,
    ) -> impl Future<Output = Result<RawHistoryPayload, FetchError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_error_carries_reason() {
        let err = FetchError::new("connection refused");
        assert_eq!(err.to_string(), "history fetch failed: connection refused");
    }
}
