//! Queries and the paper metadata that flows through the fetch pipeline.
//!
//! A [`Query`] is the free text typed by the user. The search backend turns it into a
//! [`SearchHit`], and [`crate::lookup::PaperLookup`] completes that into a [`PaperRecord`] by
//! fetching the citation text.

use std::fmt;

use super::*;

/// A free-text paper search, usually a (partial) title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
  /// Creates a query from raw text.
  pub fn new(text: impl Into<String>) -> Self { Self(text.into()) }

  /// The raw query text.
  pub fn as_str(&self) -> &str { &self.0 }

  /// Splits newline-delimited text into queries.
  ///
  /// Lines are trimmed (which also handles `\r\n` endings) and blank lines are skipped, so a
  /// trailing newline at the end of a file does not produce an empty search.
  ///
  /// ```
  /// use scholar::paper::Query;
  ///
  /// let queries = Query::parse_list("Deep Learning\r\n\n  Attention Is All You Need \n");
  /// assert_eq!(queries, vec![Query::new("Deep Learning"), Query::new("Attention Is All You Need")]);
  /// ```
  pub fn parse_list(text: &str) -> Vec<Self> {
    text.lines().map(str::trim).filter(|line| !line.is_empty()).map(Self::new).collect()
  }

  /// Reads newline-delimited queries from a file.
  ///
  /// # Errors
  ///
  /// Returns [`ScholarError::InputFileMissing`] if `path` does not exist and
  /// [`ScholarError::Io`] for any other read failure.
  pub async fn read_list(path: &Path) -> Result<Vec<Self>, ScholarError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
      std::io::ErrorKind::NotFound => ScholarError::InputFileMissing(path.to_path_buf()),
      _ => ScholarError::Io(e),
    })?;
    let queries = Self::parse_list(&text);
    debug!("Read {} queries from {}", queries.len(), path.display());
    Ok(queries)
  }
}

impl fmt::Display for Query {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for Query {
  fn from(text: &str) -> Self { Self::new(text) }
}

/// The first result of a search, as reported by the search backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
  /// Title of the result
  pub title:           String,
  /// Opaque handle the backend uses to render the citation (a URL for Google Scholar)
  pub citation_handle: String,
  /// Link to a full-text version of the paper, if the result has one
  pub eprint:          Option<String>,
}

/// A paper found for a query, with everything needed to save it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperRecord {
  /// The paper's title
  pub title:         String,
  /// Formatted citation (BibTeX) exactly as returned by the backend
  pub citation_text: String,
  /// URL of the paper's PDF, if the result linked one
  pub pdf_url:       Option<String>,
}
