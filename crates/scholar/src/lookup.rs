//! Turning a query into a [`PaperRecord`].
//!
//! The search backend's relevance ordering is taken at face value: the first result is the
//! paper. Two soft checks guard against surprises without rejecting the result: the query should
//! appear (loosely) in the returned title, and the result should link a PDF. Either failing
//! produces a warning and nothing more.

use crate::{matching::is_fuzzy_match, settings::CITATION_PAUSE_SECS};

use super::*;

/// Looks up papers through a [`ScholarBackend`].
pub struct PaperLookup {
  /// Where searches and citations come from.
  backend: Box<dyn ScholarBackend>,
  /// Used for the pause between finding a result and requesting its citation.
  sleeper: Arc<dyn Sleeper>,
}

impl PaperLookup {
  /// Creates a lookup over `backend`.
  pub fn new(backend: Box<dyn ScholarBackend>, sleeper: Arc<dyn Sleeper>) -> Self {
    Self { backend, sleeper }
  }

  /// Searches for `query` and returns the first result with its citation text, after checking
  /// it with [`PaperLookup::verify`].
  ///
  /// Between the search and the citation request the lookup pauses for a random 2 to 4 seconds,
  /// which makes the request pattern look less automated.
  ///
  /// # Errors
  ///
  /// - [`ScholarError::NotFound`] if the search produced no result (nothing matched, or Scholar
  ///   blocked the request). This is never retried.
  /// - Any error from the backend while searching or fetching the citation.
  pub async fn lookup(&self, query: &str) -> Result<PaperRecord, ScholarError> {
    let paper = self.find(query).await?;
    self.verify(query, &paper);
    Ok(paper)
  }

  /// Like [`PaperLookup::lookup`], without the checks.
  ///
  /// # Errors
  ///
  /// Same as [`PaperLookup::lookup`].
  pub async fn find(&self, query: &str) -> Result<PaperRecord, ScholarError> {
    let hit = self.backend.first_result(query).await?.ok_or(ScholarError::NotFound)?;
    trace!("First result for {query:?}: {hit:?}");

    self.sleeper.sleep(settings::random_pause(CITATION_PAUSE_SECS)).await;
    let citation_text = self.backend.citation(&hit).await?;

    Ok(PaperRecord { title: hit.title, citation_text, pdf_url: hit.eprint })
  }

  /// Warns when `paper` looks like the wrong result for `query` or has no PDF link. Returns
  /// whether both checks passed.
  pub fn verify(&self, query: &str, paper: &PaperRecord) -> bool {
    let title_matches = is_fuzzy_match(query, &paper.title);
    if !title_matches {
      warn!("Title not in search, may be the wrong paper: {:?}", paper.title);
    }

    if paper.pdf_url.is_none() {
      warn!("PDF URL not found: {}", paper.title);
    }

    title_matches && paper.pdf_url.is_some()
  }
}
