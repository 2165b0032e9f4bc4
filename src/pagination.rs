//! The request engine: single-shot and multi-page calls.
//!
//! A paged call walks `page=1, 2, ...` sequentially. Each page fetch runs
//! under the client's retry policy; the first page tells us how many pages
//! there are. Any page that ends in an error ends the whole call with that
//! error, and records already aggregated are dropped, so a caller never
//! mistakes a partial result for a complete one. The one partial outcome that
//! is not an error is a walk deliberately capped by [`PageRequest::UpTo`].

use crate::client::Client;
use crate::envelope::{Page, Shape};
use crate::listing::Listing;
use crate::query::Endpoint;
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Which pages of a paged endpoint to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageRequest {
    /// Only page 1. The reported page count is not consulted.
    First,
    /// Every page the server reports.
    #[default]
    All,
    /// At most this many pages; `0` behaves like `1`.
    UpTo(u32),
}

impl From<bool> for PageRequest {
    /// `true` means every page, `false` the first page only.
    fn from(all_pages: bool) -> Self {
        if all_pages {
            PageRequest::All
        } else {
            PageRequest::First
        }
    }
}

/// Per-call paging state.
#[derive(Debug)]
struct PageCursor<T> {
    page: u32,
    total_pages: u32,
    limit: Option<u32>,
    track_total: bool,
    records: Vec<T>,
    pages_fetched: u32,
    attempts: usize,
}

impl<T> PageCursor<T> {
    fn new(request: PageRequest) -> Self {
        let (track_total, limit) = match request {
            PageRequest::First => (false, None),
            PageRequest::All => (true, None),
            PageRequest::UpTo(n) => (true, Some(n.max(1))),
        };

        Self {
            page: 1,
            total_pages: 1,
            limit,
            track_total,
            records: Vec::new(),
            pages_fetched: 0,
            attempts: 0,
        }
    }

    fn has_next(&self) -> bool {
        self.total_pages != 0
            && self.page <= self.total_pages
            && self.limit.map_or(true, |limit| self.page <= limit)
    }

    fn absorb(&mut self, page: Page<T>, attempts: usize) {
        // Only the first page's count is trusted.
        if self.track_total && self.pages_fetched == 0 {
            if let Some(total) = u32::try_from(page.total_pages).ok().filter(|t| *t > 0) {
                self.total_pages = total;
            }
        }

        self.records.extend(page.records);
        self.pages_fetched += 1;
        self.attempts += attempts;
        self.page += 1;
    }

    fn finish(self, latency: Duration) -> Listing<T> {
        Listing {
            records: self.records,
            pages_fetched: self.pages_fetched,
            total_pages: self.total_pages,
            attempts: self.attempts,
            latency,
        }
    }
}

impl Client {
    /// Fetches the pages of a paged endpoint and aggregates their records.
    ///
    /// Null entries are dropped; the rest keep server order across pages.
    ///
    /// # Errors
    ///
    /// Returns the first terminal error of any page: [`Error::Api`] when a
    /// page declares `result_ok = false` or has no `data`, the transport
    /// error wrapped in [`Error::MaxRetriesExceeded`] once a page used up
    /// its attempts, or [`Error::DeserializationFailed`].
    pub async fn fetch_pages<T>(
        &self,
        endpoint: &Endpoint,
        request: PageRequest,
    ) -> Result<Listing<T>>
    where
        T: DeserializeOwned,
    {
        let start_time = Instant::now();
        let mut cursor = PageCursor::new(request);

        while cursor.has_next() {
            let page = cursor.page;
            let url = self.request_url(endpoint, Some(page));
            let (client, url) = (self, &url);

            let fetched = self
                .retry_policy()
                .run(&url.redacted, move |attempt| {
                    client.fetch_page::<T>(url, Shape::Paged, Some(page), attempt)
                })
                .await?;

            cursor.absorb(fetched.value, fetched.attempts);
        }

        let listing = cursor.finish(start_time.elapsed());

        if !listing.is_complete() {
            tracing::warn!(
                path = %endpoint.path(),
                pages_fetched = listing.pages_fetched,
                total_pages = listing.total_pages,
                "Fewer pages retrieved than the server reported"
            );
        }

        tracing::debug!(
            path = %endpoint.path(),
            records = listing.records.len(),
            pages_fetched = listing.pages_fetched,
            latency_ms = listing.latency.as_millis(),
            "Paged call complete"
        );

        Ok(listing)
    }

    /// Fetches a record wrapped in a single envelope (`{"result_ok", "data"}`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Api`] if the envelope declares failure or carries no
    /// record.
    pub async fn fetch_one<T>(&self, endpoint: &Endpoint) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.fetch_single(endpoint, Shape::Wrapped).await
    }

    /// Fetches a response whose body is the record itself.
    ///
    /// No success check is made; the record carries its own status.
    pub async fn fetch_direct<T>(&self, endpoint: &Endpoint) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.fetch_single(endpoint, Shape::Direct).await
    }

    async fn fetch_single<T>(&self, endpoint: &Endpoint, shape: Shape) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.request_url(endpoint, None);
        let (client, url_ref) = (self, &url);

        let fetched = self
            .retry_policy()
            .run(&url.redacted, move |attempt| {
                client.fetch_page::<T>(url_ref, shape, None, attempt)
            })
            .await?;

        fetched
            .value
            .records
            .into_iter()
            .next()
            .ok_or_else(|| Error::Api {
                url: url.redacted.clone(),
                page: None,
            })
    }
}
