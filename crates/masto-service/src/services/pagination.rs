//! Cursor pagination adapter
//!
//! Turns Mastodon's `max_id` / `since_id` / `min_id` / `limit` query
//! parameters into a [`PaginationWindow`], runs bounded over-fetching range
//! queries against the store, and produces [`Page`]s with continuation
//! cursors and `Link` headers.
//!
//! Pages are always newest-first. With `min_id` the store is read upwards
//! from the cursor and the result reversed.

use std::collections::BTreeMap;
use std::future::Future;

use masto_core::traits::{Paginated, RangeQuery, RepoResult};
use masto_core::{DomainError, IdSpace, NativeId};
use tracing::{debug, warn};

/// Rows scanned per requested row before giving up on filling a page
const SCAN_FACTOR: usize = 10;

// ============================================================================
// Query parameters
// ============================================================================

/// Raw query string parameters, possibly repeated
///
/// Array-style keys (`types[]`) are stored under their bare name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    values: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut params = Self::new();
        for (key, value) in pairs {
            params.push(key.as_ref(), value);
        }
        params
    }

    /// Append a value under a key
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let key = key.strip_suffix("[]").unwrap_or(key);
        self.values
            .entry(key.to_string())
            .or_default()
            .push(value.into());
    }

    /// First value for a key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// First non-empty value for a key
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// Every value for a key, comma-separated values split
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.values
            .get(key)
            .map(|values| {
                values
                    .iter()
                    .flat_map(|v| v.split(','))
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Boolean flag: `true`, `1` and `on` are set, anything else is not
    pub fn get_bool(&self, key: &str) -> bool {
        self.get(key)
            .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "on"))
    }

    /// Decode an optional id parameter from the given space
    pub fn get_id(&self, key: &str, space: IdSpace) -> Result<Option<NativeId>, DomainError> {
        self.get_non_empty(key).map(|raw| space.decode(raw)).transpose()
    }
}

// ============================================================================
// Window
// ============================================================================

/// Default and maximum `limit` for an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitPolicy {
    pub default: usize,
    pub cap: usize,
}

impl LimitPolicy {
    /// Status timelines
    pub const STATUSES: Self = Self { default: 20, cap: 40 };
    /// Account lists (followers, favourited_by, ...)
    pub const ACCOUNTS: Self = Self { default: 40, cap: 80 };
    /// Notification lists
    pub const NOTIFICATIONS: Self = Self { default: 40, cap: 80 };

    /// Clamp a requested limit into `[1, cap]`
    pub fn clamp(self, requested: i64) -> usize {
        if requested < 1 {
            1
        } else {
            usize::try_from(requested).map_or(self.cap, |n| n.min(self.cap))
        }
    }
}

/// Canonical, decoded pagination request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationWindow {
    pub max_id: Option<NativeId>,
    pub since_id: Option<NativeId>,
    pub min_id: Option<NativeId>,
    pub limit: usize,
}

impl PaginationWindow {
    /// Window with no cursors
    pub fn with_limit(limit: usize) -> Self {
        Self {
            max_id: None,
            since_id: None,
            min_id: None,
            limit: limit.max(1),
        }
    }

    /// Build a window from raw query parameters
    ///
    /// # Errors
    /// `MalformedIdentifier` for undecodable cursors, `InvalidPagination` for
    /// a non-integer limit.
    pub fn from_query(
        params: &QueryParams,
        space: IdSpace,
        policy: LimitPolicy,
    ) -> Result<Self, DomainError> {
        let limit = match params.get_non_empty("limit") {
            None => policy.default,
            Some(raw) => {
                let requested: i64 = raw.trim().parse().map_err(|_| {
                    DomainError::InvalidPagination(format!("limit must be an integer, got {raw:?}"))
                })?;
                policy.clamp(requested)
            }
        };

        Ok(Self {
            max_id: params.get_id("max_id", space)?,
            since_id: params.get_id("since_id", space)?,
            min_id: params.get_id("min_id", space)?,
            limit,
        })
    }

    /// `min_id` pages are read upwards from the cursor
    pub fn is_ascending(&self) -> bool {
        self.min_id.is_some()
    }

    /// Exclusive lower bound: the larger of `since_id` and `min_id`
    pub fn lower_bound(&self) -> Option<&NativeId> {
        match (&self.since_id, &self.min_id) {
            (Some(since), Some(min)) => Some(since.max(min)),
            (since, min) => since.as_ref().or(min.as_ref()),
        }
    }

    /// Range query for one fetch of the over-fetch loop
    pub fn range(&self, take: usize, skip: usize) -> RangeQuery {
        RangeQuery {
            max_id: self.max_id.clone(),
            min_id: self.lower_bound().cloned(),
            ascending: self.is_ascending(),
            take,
            skip,
        }
    }

    /// Rows per fetch: one and a half times the limit
    pub fn batch_size(&self) -> usize {
        (self.limit * 3 / 2).max(1)
    }
}

// ============================================================================
// Page
// ============================================================================

/// One page of results with continuation cursors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Cursor of the oldest row, for `rel="next"`
    pub max_id: Option<NativeId>,
    /// Cursor of the newest row, for `rel="prev"`
    pub min_id: Option<NativeId>,
    /// Page size requested, repeated in continuation links
    pub limit: usize,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            max_id: None,
            min_id: None,
            limit: 0,
        }
    }

    /// Page over newest-first rows, cursors taken from the rows themselves
    pub fn from_rows(rows: Vec<T>) -> Self
    where
        T: Paginated,
    {
        let min_id = rows.first().map(|row| row.cursor_id().clone());
        let max_id = rows.last().map(|row| row.cursor_id().clone());
        Self {
            limit: rows.len(),
            items: rows,
            max_id,
            min_id,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Replace the items, keeping the cursors of the rows they came from
    pub fn with_items<U>(self, items: Vec<U>) -> Page<U> {
        Page {
            items,
            max_id: self.max_id,
            min_id: self.min_id,
            limit: self.limit,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            max_id: self.max_id,
            min_id: self.min_id,
            limit: self.limit,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `Link` header for the page, `None` when there are no cursors
    ///
    /// `endpoint` is the absolute URL of the list, without query string.
    pub fn link_header(&self, endpoint: &str, space: IdSpace) -> Option<String> {
        let limit = self.limit;
        let mut links = Vec::with_capacity(2);
        if let Some(max_id) = &self.max_id {
            links.push(format!(
                "<{endpoint}?limit={limit}&max_id={}>; rel=\"next\"",
                space.encode(max_id)
            ));
        }
        if let Some(min_id) = &self.min_id {
            links.push(format!(
                "<{endpoint}?limit={limit}&min_id={}>; rel=\"prev\"",
                space.encode(min_id)
            ));
        }
        (!links.is_empty()).then(|| links.join(", "))
    }
}

// ============================================================================
// Execution
// ============================================================================

/// Fetch one page through repeated range queries
///
/// Query failures are logged and produce an empty page.
pub async fn fetch_page<T, F, Fut>(window: &PaginationWindow, query: F) -> Page<T>
where
    T: Paginated,
    F: FnMut(RangeQuery) -> Fut,
    Fut: Future<Output = RepoResult<Vec<T>>>,
{
    fetch_page_filtered(window, query, |_| true).await
}

/// Fetch one page, dropping rows rejected by `keep`
///
/// Fetches `floor(limit * 1.5)` rows at a time until the page is full, the
/// store runs dry, or `limit * 10` rows have been scanned.
pub async fn fetch_page_filtered<T, F, Fut, P>(
    window: &PaginationWindow,
    mut query: F,
    mut keep: P,
) -> Page<T>
where
    T: Paginated,
    F: FnMut(RangeQuery) -> Fut,
    Fut: Future<Output = RepoResult<Vec<T>>>,
    P: FnMut(&T) -> bool,
{
    let take = window.batch_size();
    let scan_limit = window.limit.saturating_mul(SCAN_FACTOR);
    let mut found: Vec<T> = Vec::with_capacity(window.limit);
    let mut skip = 0;

    while found.len() < window.limit {
        let rows = match query(window.range(take, skip)).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, skip = skip, "Pagination query failed, returning empty page");
                return Page::empty();
            }
        };

        let fetched = rows.len();
        found.extend(rows.into_iter().filter(|row| keep(row)));
        skip += take;

        if fetched < take {
            break;
        }
        if skip >= scan_limit {
            debug!(scanned = skip, found = found.len(), "Scan bound reached, returning partial page");
            break;
        }
    }

    found.truncate(window.limit);
    if window.is_ascending() {
        found.reverse();
    }
    Page::from_rows(found).with_limit(window.limit)
}
