//! Paginated candidate pool.
//!
//! Holds the accumulated, duplicate-free result set of one search session
//! and the bookkeeping needed to page through it in order.
//!
//! Every search gets a fresh sequence number. Responses are handed back
//! together with the [`SearchTicket`] they were requested with; responses
//! for a superseded search or for a page other than the awaited one are
//! rejected without touching the pool.

use serde::{Deserialize, Serialize};

use crate::domain::Candidate;

use super::dedup::merge;
use super::error::SearchError;

/// Default number of results requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Paging configuration for a candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchPaging {
    pub page_size: u32,
}

impl Default for SearchPaging {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Filters for a places search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    /// Free-text query.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Category filter, e.g. `restaurant`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// City filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl SearchQuery {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Everything needed to fetch one page, tagged with the search it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    pub seq: u64,
    pub page: u32,
    pub limit: u32,
    pub query: SearchQuery,
}

/// Server-reported pagination info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub candidates: Vec<Candidate>,
    pub pagination: Option<Pagination>,
}

/// Result of merging one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Candidates new to the pool.
    pub added: usize,
    /// Candidates dropped as already present.
    pub duplicates: usize,
    pub has_more: bool,
}

/// Accumulated search results and paging state.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    paging: SearchPaging,
    seq: u64,
    query: Option<SearchQuery>,
    candidates: Vec<Candidate>,
    /// Page awaiting a response, if any.
    in_flight: Option<u32>,
    /// Last page merged (0 before the first).
    merged_pages: u32,
    total: Option<u64>,
    last_page_len: usize,
}

impl CandidatePool {
    pub fn new(paging: SearchPaging) -> Self {
        Self {
            paging,
            seq: 0,
            query: None,
            candidates: Vec::new(),
            in_flight: None,
            merged_pages: 0,
            total: None,
            last_page_len: 0,
        }
    }

    /// Begin a fresh search, discarding current results.
    ///
    /// Any response still in flight for an earlier search becomes stale.
    pub fn start(&mut self, query: SearchQuery) -> SearchTicket {
        self.seq += 1;
        self.query = Some(query);
        self.candidates.clear();
        self.merged_pages = 0;
        self.total = None;
        self.last_page_len = 0;
        self.in_flight = Some(1);
        self.ticket(1)
    }

    /// Ticket for the next page.
    ///
    /// Only issued once the previous page has been merged and more results
    /// are available.
    pub fn next_page(&mut self) -> Result<SearchTicket, SearchError> {
        if self.query.is_none() {
            return Err(SearchError::NoActiveSearch);
        }
        if self.in_flight.is_some() || !self.has_more() {
            return Err(SearchError::NoMorePages);
        }
        let page = self.merged_pages + 1;
        self.in_flight = Some(page);
        Ok(self.ticket(page))
    }

    /// Merge a fetched page into the pool.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Stale`] for a superseded search and
    /// [`SearchError::OutOfOrder`] for a page other than the awaited one.
    /// The pool is unchanged in both cases.
    pub fn accept(
        &mut self,
        ticket: &SearchTicket,
        page: SearchPage,
    ) -> Result<MergeOutcome, SearchError> {
        if ticket.seq != self.seq {
            return Err(SearchError::Stale {
                got: ticket.seq,
                current: self.seq,
            });
        }
        if self.in_flight != Some(ticket.page) {
            return Err(SearchError::OutOfOrder {
                got: ticket.page,
                expected: self.in_flight,
            });
        }

        let incoming = page.candidates.len();
        let before = self.candidates.len();
        self.candidates = merge(&self.candidates, page.candidates);
        let added = self.candidates.len() - before;

        self.in_flight = None;
        self.merged_pages = ticket.page;
        self.last_page_len = incoming;
        self.total = page.pagination.map(|p| p.total);

        Ok(MergeOutcome {
            added,
            duplicates: incoming - added,
            has_more: self.has_more(),
        })
    }

    /// Release the in-flight page after an upstream failure so it can be
    /// requested again. Stale tickets are ignored.
    ///
    /// A failed first page leaves nothing to continue from; callers re-run
    /// [`start`](Self::start) instead.
    pub fn abandon(&mut self, ticket: &SearchTicket) {
        if ticket.seq == self.seq && self.in_flight == Some(ticket.page) {
            self.in_flight = None;
        }
    }

    /// Whether another page is available.
    ///
    /// With a server total this is `materialized < total`; without one, it
    /// holds while the last page was full. An empty page always ends paging.
    pub fn has_more(&self) -> bool {
        if self.query.is_none() || self.merged_pages == 0 || self.last_page_len == 0 {
            return false;
        }
        match self.total {
            Some(total) => (self.candidates.len() as u64) < total,
            None => self.last_page_len >= self.paging.page_size as usize,
        }
    }

    /// Look up a candidate by provider id.
    pub fn take(&self, id: &str) -> Result<Candidate, SearchError> {
        self.candidates
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| SearchError::UnknownCandidate(id.to_string()))
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn query(&self) -> Option<&SearchQuery> {
        self.query.as_ref()
    }

    fn ticket(&self, page: u32) -> SearchTicket {
        SearchTicket {
            seq: self.seq,
            page,
            limit: self.paging.page_size,
            query: self.query.clone().unwrap_or_default(),
        }
    }
}

impl Default for CandidatePool {
    fn default() -> Self {
        Self::new(SearchPaging::default())
    }
}
