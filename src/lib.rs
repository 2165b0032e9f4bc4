//! # gizmo-client - a typed client for the survey REST API
//!
//! The API is query-string driven: every call is a GET, non-GET verbs are
//! emulated with a `_method` parameter, credentials travel as `api_token`
//! and `api_token_secret`, and list endpoints are paged. This crate turns a
//! logical call into the requests it takes, retries transient failures with
//! a fixed budget, walks every page, and hands back typed records.
//!
//! ## Quick Start
//!
//! ```no_run
//! use gizmo_client::{Client, PageRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gizmo_client::Error> {
//!     let client = Client::builder()
//!         .credentials("my-token", "my-secret")
//!         .batch_size(100)
//!         .build()?;
//!
//!     // Walks every page of the result set
//!     let responses = client.get_responses(1234, PageRequest::All).await?;
//!     for response in &responses {
//!         println!("{}: {:?}", response.id, response.all_questions());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## The engine
//!
//! The per-entity methods are thin wrappers over three calls, usable with any
//! endpoint and record type:
//!
//! - [`Client::fetch_pages`] walks a paged endpoint (`{result_ok, total_pages, data: [...]}`)
//! - [`Client::fetch_one`] unwraps a single envelope (`{result_ok, data: {...}}`)
//! - [`Client::fetch_direct`] deserializes the body as is
//!
//! ```no_run
//! use gizmo_client::{query::Endpoint, Client, PageRequest};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Team {
//!     id: i64,
//!     teamname: String,
//! }
//!
//! # async fn example(client: Client) -> Result<(), gizmo_client::Error> {
//! let teams = client
//!     .fetch_pages::<Team>(&Endpoint::get("accountteams"), PageRequest::All)
//!     .await?;
//! println!("{} teams over {} pages", teams.len(), teams.pages_fetched);
//! # Ok(())
//! # }
//! ```
//!
//! ## Retries
//!
//! Every request gets [`retry::MAX_ATTEMPTS`] attempts. Only transport errors
//! (network failures, non-2xx statuses) are retried by default; a
//! `result_ok = false` answer or an unparseable body ends the call at once.
//! Delays between attempts come from a [`Backoff`], or from the server's
//! `Retry-After` when it sends one.
//!
//! ```no_run
//! use gizmo_client::{retry::RetryOnServerError, Backoff, Client};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), gizmo_client::Error> {
//! let client = Client::builder()
//!     .credentials("my-token", "my-secret")
//!     .backoff(Backoff::Exponential {
//!         initial_delay: Duration::from_millis(200),
//!         max_delay: Duration::from_secs(20),
//!         jitter: true,
//!     })
//!     .retry_predicate(Box::new(RetryOnServerError))
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod api;
mod client;
mod credentials;
pub mod envelope;
mod error;
mod listing;
pub mod models;
mod pagination;
pub mod query;
pub mod rate_limit;
pub mod retry;
mod transport;

pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL};
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use listing::Listing;
pub use pagination::PageRequest;
pub use retry::{Backoff, RetryPredicate};
pub use transport::{HttpTransport, Transport, TransportError};
