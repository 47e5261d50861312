//! Candidate search results: dedup and paging.

mod dedup;
mod error;
mod pool;

pub use dedup::{NEAR_DUPLICATE_DEGREES, find_near_duplicate, merge};
pub use error::SearchError;
pub use pool::{
    CandidatePool, DEFAULT_PAGE_SIZE, MergeOutcome, Pagination, SearchPage, SearchPaging,
    SearchQuery, SearchTicket,
};
