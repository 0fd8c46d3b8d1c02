//! The external data-fetch boundary.
//!
//! In manual mode the full query state is forwarded to a [`DataSource`],
//! which returns pre-filtered, pre-sorted, pre-paginated rows plus the
//! total count the pager needs. The controller never computes row
//! filtering in manual mode; what it owns is the state shape and the
//! staleness guarantee around applying results.
//!
//! Requests are correlated by [`FetchTicket`]: issuing a new ticket
//! supersedes all older ones, and the controller refuses to apply a result
//! for a superseded ticket. That is the whole cancellation story: callers
//! simply let an obsolete request's result fall on the floor. Retries, if
//! any, belong to the data source.

use std::collections::BTreeMap;

use crate::codec::DataQueryState;
use crate::error::Result;

/// Correlates a fetch request with its result. Monotonically increasing;
/// larger supersedes smaller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(pub(crate) u64);

/// One page of fetched rows.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchPage<T> {
    pub rows: Vec<T>,
    /// Total row count across all pages, when the source knows it.
    pub total: Option<u64>,
    /// Per-facet counts (e.g. rows per status value), for filter menus.
    pub facets: BTreeMap<String, u64>,
}

impl<T> FetchPage<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows,
            total: None,
            facets: BTreeMap::new(),
        }
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }
}

impl<T> Default for FetchPage<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// The boundary a manual-mode host implements.
///
/// The source must honor the search, column filters, sorting, and
/// pagination carried by the query state. Failures come back as
/// [`crate::GridError::Fetch`]; this layer does not retry.
pub trait DataSource<T> {
    fn fetch(&mut self, query: &DataQueryState) -> Result<FetchPage<T>>;
}
