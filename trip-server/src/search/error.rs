//! Search session errors.

/// Errors from feeding search pages into a [`CandidatePool`](super::CandidatePool).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The response belongs to a search that has since been replaced
    #[error("stale search response (sequence {got}, current {current})")]
    Stale { got: u64, current: u64 },

    /// The response is not for the page currently awaited
    #[error("out-of-order page {got} (expected {expected:?})")]
    OutOfOrder { got: u32, expected: Option<u32> },

    /// No search has been started
    #[error("no search in progress")]
    NoActiveSearch,

    /// A page is already in flight or there are no more pages
    #[error("no further page can be requested")]
    NoMorePages,

    /// The candidate id is not in the current result set
    #[error("unknown candidate: {0}")]
    UnknownCandidate(String),
}
