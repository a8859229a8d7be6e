//! In-memory doubles for the client traits, used by the unit tests.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
};

use super::*;

/// A search backend that answers from a fixed table of queries.
#[derive(Default)]
pub struct MockBackend {
  /// Search results keyed by query
  hits:      HashMap<String, SearchHit>,
  /// Citation text keyed by citation handle
  citations: HashMap<String, String>,
  /// Queries whose search fails with an API error
  failures:  HashMap<String, String>,
  /// Every query searched, in order
  searched:  Arc<Mutex<Vec<String>>>,
}

impl MockBackend {
  /// An empty backend: every search finds nothing.
  pub fn new() -> Self { Self::default() }

  /// Registers a paper returned for `query`.
  pub fn with_paper(mut self, query: &str, title: &str, eprint: Option<&str>, bibtex: &str) -> Self {
    let citation_handle = format!("cite:{query}");
    self.citations.insert(citation_handle.clone(), bibtex.to_string());
    self.hits.insert(query.to_string(), SearchHit {
      title: title.to_string(),
      citation_handle,
      eprint: eprint.map(String::from),
    });
    self
  }

  /// Makes the search for `query` fail with an API error.
  pub fn with_failure(mut self, query: &str, message: &str) -> Self {
    self.failures.insert(query.to_string(), message.to_string());
    self
  }

  /// Handle on the searched queries that outlives moving the backend into a `Box`.
  pub fn searched(&self) -> Arc<Mutex<Vec<String>>> { Arc::clone(&self.searched) }
}

#[async_trait]
impl ScholarBackend for MockBackend {
  async fn first_result(&self, query: &str) -> Result<Option<SearchHit>, ScholarError> {
    self.searched.lock().unwrap().push(query.to_string());
    if let Some(message) = self.failures.get(query) {
      return Err(ScholarError::ApiError(message.clone()));
    }
    Ok(self.hits.get(query).cloned())
  }

  async fn citation(&self, hit: &SearchHit) -> Result<String, ScholarError> {
    self
      .citations
      .get(&hit.citation_handle)
      .cloned()
      .ok_or_else(|| ScholarError::ApiError(format!("no citation for {}", hit.title)))
  }
}

/// A transport serving fixed bodies and recording every URL it is asked for.
#[derive(Default)]
pub struct MockTransport {
  /// Response bodies keyed by URL; unknown URLs fail like a refused connection
  bodies:    HashMap<String, Vec<u8>>,
  /// Every URL requested, in order
  requested: Arc<Mutex<Vec<String>>>,
}

impl MockTransport {
  /// An empty transport: every request fails.
  pub fn new() -> Self { Self::default() }

  /// Serves `body` for `url`.
  pub fn with_body(mut self, url: &str, body: Vec<u8>) -> Self {
    self.bodies.insert(url.to_string(), body);
    self
  }

  /// Handle on the requested URLs that outlives moving the transport into a `Box`.
  pub fn requested(&self) -> Arc<Mutex<Vec<String>>> { Arc::clone(&self.requested) }
}

#[async_trait]
impl Transport for MockTransport {
  async fn get(&self, url: &Url) -> Result<Vec<u8>, ScholarError> {
    self.requested.lock().unwrap().push(url.to_string());
    self
      .bodies
      .get(url.as_str())
      .cloned()
      .ok_or_else(|| ScholarError::ApiError(format!("connection refused: {url}")))
  }
}

/// A sleeper that returns immediately and records what it was asked to wait.
#[derive(Default, Clone)]
pub struct RecordingSleeper {
  /// Every requested duration, in order
  durations: Arc<Mutex<Vec<Duration>>>,
}

impl RecordingSleeper {
  /// A sleeper with no recorded durations.
  pub fn new() -> Self { Self::default() }

  /// The durations requested so far.
  pub fn durations(&self) -> Vec<Duration> { self.durations.lock().unwrap().clone() }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
  async fn sleep(&self, duration: Duration) { self.durations.lock().unwrap().push(duration); }
}
