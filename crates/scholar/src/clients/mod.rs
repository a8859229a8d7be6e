//! Everything the pipeline needs from the outside world.
//!
//! The fetch pipeline talks to three collaborators, each behind a trait so it can be swapped for
//! an in-memory double in tests:
//!
//! - [`ScholarBackend`] - searches for a query and renders the citation of a result
//! - [`Transport`] - plain HTTP GET that follows redirects, used for PDF downloads
//! - [`Sleeper`] - waits between requests
//!
//! # Implementations
//!
//! - [`scholar`] - [`ScholarClient`], a Google Scholar backend that scrapes the result pages
//! - [`http`] - [`HttpTransport`], a `reqwest` transport
//! - [`TokioSleeper`] - sleeps on the tokio timer
//!
//! # Examples
//!
//! ```no_run
//! use scholar::{
//!   clients::{ScholarBackend, ScholarClient},
//!   settings::Settings,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ScholarClient::new(&Settings::default())?;
//! if let Some(hit) = client.first_result("Attention is all you need").await? {
//!   println!("{}", client.citation(&hit).await?);
//! }
//! # Ok(())
//! # }
//! ```

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{Html, Selector};

pub mod http;
#[cfg(test)] pub mod mock;
pub mod scholar;

pub use http::HttpTransport;
pub use scholar::ScholarClient;

use super::*;

/// A search engine that can find papers and render their citations.
#[async_trait]
pub trait ScholarBackend: Send + Sync {
  /// Returns the first result for `query`, or `None` when there are no results or access is
  /// blocked.
  async fn first_result(&self, query: &str) -> Result<Option<SearchHit>, ScholarError>;

  /// Returns the formatted citation text (BibTeX) for a result.
  async fn citation(&self, hit: &SearchHit) -> Result<String, ScholarError>;
}

/// An HTTP GET that follows redirects and returns the full body.
#[async_trait]
pub trait Transport: Send + Sync {
  /// Fetches `url`. Any failure to get a body is an error; the status code is not checked.
  async fn get(&self, url: &Url) -> Result<Vec<u8>, ScholarError>;
}

/// Something that can wait.
#[async_trait]
pub trait Sleeper: Send + Sync {
  /// Waits for `duration`.
  async fn sleep(&self, duration: Duration);
}

/// A [`Sleeper`] backed by [`tokio::time::sleep`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
  async fn sleep(&self, duration: Duration) { tokio::time::sleep(duration).await }
}

/// Builds the `reqwest` client shared by the HTTP implementations.
fn build_client(settings: &Settings) -> Result<reqwest::Client, ScholarError> {
  Ok(
    reqwest::Client::builder()
      .user_agent(&settings.user_agent)
      .timeout(settings.timeout)
      .redirect(reqwest::redirect::Policy::limited(10))
      .build()?,
  )
}
