//! The result of a paged call: records plus page accounting.

use std::time::Duration;

/// Records aggregated across the pages of one logical call.
///
/// Dereferences to the record slice, so it can be used like a list.
///
/// # Examples
///
/// ```no_run
/// use gizmo_client::{query::Endpoint, Client, PageRequest};
///
/// # async fn example() -> Result<(), gizmo_client::Error> {
/// let client = Client::builder().credentials("token", "secret").build()?;
///
/// let listing = client
///     .fetch_pages::<serde_json::Value>(&Endpoint::get("survey"), PageRequest::UpTo(3))
///     .await?;
///
/// println!("{} surveys from {} pages", listing.len(), listing.pages_fetched);
/// if !listing.is_complete() {
///     println!("{} pages left unread", listing.total_pages - listing.pages_fetched);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    /// Non-null records of every fetched page, in server order.
    pub records: Vec<T>,

    /// How many pages were fetched.
    pub pages_fetched: u32,

    /// How many pages the server reported. Stays `1` when only the first
    /// page was requested.
    pub total_pages: u32,

    /// Attempts made across all pages, retries included.
    pub attempts: usize,

    /// Time from the first request to the last response.
    pub latency: Duration,
}

impl<T> Listing<T> {
    /// Returns `false` if fewer pages were fetched than the server reported.
    pub fn is_complete(&self) -> bool {
        self.pages_fetched >= self.total_pages
    }

    /// Returns `true` if any page needed more than one attempt.
    pub fn was_retried(&self) -> bool {
        self.attempts > self.pages_fetched as usize
    }

    /// Discards the accounting and returns the records.
    pub fn into_records(self) -> Vec<T> {
        self.records
    }

    /// Maps every record, keeping the accounting.
    ///
    /// # Examples
    ///
    /// ```
    /// use gizmo_client::Listing;
    /// use std::time::Duration;
    ///
    /// let listing = Listing {
    ///     records: vec![1, 2, 3],
    ///     pages_fetched: 1,
    ///     total_pages: 1,
    ///     attempts: 1,
    ///     latency: Duration::from_millis(20),
    /// };
    ///
    /// let labels = listing.map(|n| format!("#{}", n));
    /// assert_eq!(labels.records, vec!["#1", "#2", "#3"]);
    /// ```
    pub fn map<U, F>(self, f: F) -> Listing<U>
    where
        F: FnMut(T) -> U,
    {
        Listing {
            records: self.records.into_iter().map(f).collect(),
            pages_fetched: self.pages_fetched,
            total_pages: self.total_pages,
            attempts: self.attempts,
            latency: self.latency,
        }
    }
}

impl<T> std::ops::Deref for Listing<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl<T> IntoIterator for Listing<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(pages_fetched: u32, total_pages: u32, attempts: usize) -> Listing<u8> {
        Listing {
            records: vec![],
            pages_fetched,
            total_pages,
            attempts,
            latency: Duration::ZERO,
        }
    }

    #[test]
    fn test_completeness() {
        assert!(listing(3, 3, 3).is_complete());
        assert!(!listing(2, 5, 2).is_complete());
    }

    #[test]
    fn test_was_retried() {
        assert!(!listing(3, 3, 3).was_retried());
        assert!(listing(3, 3, 5).was_retried());
    }
}
