//! Runtime settings and the fixed constants of the fetch pipeline.
//!
//! There is no configuration file. The binary fills a [`Settings`] from its command line flags
//! (which also read `SCHOLAR_*` environment variables) and hands it to the clients.

use std::ops::Range;

use rand::Rng;

use super::*;

/// Base URL of Google Scholar.
pub const DEFAULT_BASE_URL: &str = "https://scholar.google.com";

/// Default timeout for a single HTTP request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Browser-like user agent; Scholar serves CAPTCHAs far sooner to obvious bots.
pub const DEFAULT_USER_AGENT: &str =
  "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// Bodies shorter than this are error or interstitial pages, not PDFs.
pub const MIN_PDF_BYTES: usize = 10_000;

/// Pause in seconds between finding a result and requesting its citation.
pub const CITATION_PAUSE_SECS: Range<f64> = 2.0..4.0;

/// Pause in seconds between queries of a batch run in slow mode.
pub const SLOW_PAUSE_SECS: Range<f64> = 50.0..100.0;

/// Longest file stem, in bytes, used for downloaded PDFs.
pub const MAX_FILE_STEM_LEN: usize = 120;

/// Settings shared by the HTTP clients and the PDF fetcher.
#[derive(Debug, Clone)]
pub struct Settings {
  /// Base URL of the Scholar instance (or mirror) to query
  pub base_url:     Url,
  /// Timeout applied to every request
  pub timeout:      Duration,
  /// User agent sent with every request
  pub user_agent:   String,
  /// Directory that downloaded PDFs are written to
  pub download_dir: PathBuf,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      base_url:     Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
      timeout:      DEFAULT_TIMEOUT,
      user_agent:   DEFAULT_USER_AGENT.to_string(),
      download_dir: PathBuf::from("."),
    }
  }
}

impl Settings {
  /// Replaces the base URL, e.g. to point at a Scholar mirror.
  pub fn with_base_url(mut self, base_url: &str) -> Result<Self, ScholarError> {
    self.base_url = Url::parse(base_url)?;
    Ok(self)
  }

  /// Replaces the request timeout.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  /// Replaces the user agent.
  pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
    self.user_agent = user_agent.into();
    self
  }

  /// Replaces the download directory.
  pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
    self.download_dir = dir.into();
    self
  }
}

/// Draws a pause uniformly from `range`, given in seconds.
pub fn random_pause(range: Range<f64>) -> Duration {
  Duration::from_secs_f64(rand::thread_rng().gen_range(range))
}
