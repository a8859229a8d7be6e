//! Error types for the scholar library.
//!
//! Only conditions that stop a lookup are errors. Soft failures that the pipeline is expected to
//! shrug off (a title that does not look like the query, a missing PDF link, a download that is
//! too small or cannot connect) are reported through [`crate::pdf::FetchOutcome`] and `tracing`
//! warnings instead.
//!
//! # Examples
//!
//! ```no_run
//! use scholar::errors::ScholarError;
//!
//! # fn example(result: Result<(), ScholarError>) {
//! match result {
//!   Err(ScholarError::NotFound) => println!("Blocked by a CAPTCHA or the paper does not exist"),
//!   Err(ScholarError::Network(e)) => println!("Network error: {}", e),
//!   Err(e) => println!("Other error: {}", e),
//!   Ok(()) => println!("Success!"),
//! }
//! # }
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while looking up papers and running batches.
#[derive(Error, Debug)]
pub enum ScholarError {
  /// The search returned no results.
  ///
  /// Google Scholar answers with an empty page both when nothing matches and when it has decided
  /// the client is a robot and served a CAPTCHA instead, so the two cases are indistinguishable.
  /// A batch run stops at the first occurrence.
  #[error("Could not access search results (CAPTCHA or paper does not exist)")]
  NotFound,

  /// A network request failed.
  ///
  /// This can occur when:
  /// - The network is unavailable
  /// - The server is unreachable
  /// - The request times out
  /// - TLS/SSL errors occur
  #[error(transparent)]
  Network(#[from] reqwest::Error),

  /// The search backend returned something we could not use.
  ///
  /// The string contains a description of what was wrong with the response.
  #[error("API error: {0}")]
  ApiError(String),

  /// Failed to parse a URL.
  #[error(transparent)]
  InvalidUrl(#[from] url::ParseError),

  /// A file system operation failed.
  #[error(transparent)]
  Io(#[from] std::io::Error),

  /// The file holding the list of queries does not exist.
  #[error("File not found: {}", .0.display())]
  InputFileMissing(PathBuf),
}
