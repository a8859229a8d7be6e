//! Downloading PDFs.
//!
//! Links taken from search results are not always clean and the servers behind them do not
//! always return a PDF, so [`PdfFetcher::fetch`] reports what happened as a [`FetchOutcome`]
//! instead of failing. Only a local write error is returned as an error.
//!
//! A file is written only when the body is at least [`MIN_PDF_BYTES`] long: anything shorter is
//! almost certainly an HTML error or paywall page, and must not replace a good copy on disk.

use std::fmt;

use crate::{format::file_stem, settings::MIN_PDF_BYTES};

use super::*;

/// Prefix Scholar sometimes glues in front of an already absolute link, or in front of its own
/// `/scholar_url?url=...` redirect.
const SCHOLAR_PREFIX: &str = "https://scholar.google.com";

/// What happened when trying to download a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
  /// The PDF was written to `path`.
  Success {
    /// Where the file was written
    path:  PathBuf,
    /// Size of the file
    bytes: usize,
  },
  /// The response was too short to be a PDF; nothing was written.
  TooSmall {
    /// Size of the response body
    bytes: usize,
  },
  /// The link could not be parsed or the server could not be reached; nothing was written.
  ConnectionFailure {
    /// The link as it was given
    url:    String,
    /// Why it failed
    reason: String,
  },
  /// The paper has no PDF link.
  NoUrl,
}

impl fmt::Display for FetchOutcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FetchOutcome::Success { path, bytes } => write!(f, "saved {} ({bytes} bytes)", path.display()),
      FetchOutcome::TooSmall { bytes } => write!(f, "PDF may be too small ({bytes} bytes)"),
      FetchOutcome::ConnectionFailure { url, reason } => write!(f, "invalid PDF URL {url}: {reason}"),
      FetchOutcome::NoUrl => write!(f, "no PDF URL"),
    }
  }
}

/// Resolves a PDF link from a search result into the URL to download.
///
/// Links starting with `https://scholar.google.com` or with `scholar_base` (the address searches
/// went to, which differs for a mirror) are unwrapped: if what follows is itself an absolute URL
/// it is used directly, and if it is a `/scholar_url?url=...` redirect its target is used.
/// Anything else is parsed as is.
///
/// ```
/// use scholar::pdf::resolve_pdf_url;
/// use url::Url;
///
/// let base = Url::parse("https://scholar.google.com")?;
/// let url = resolve_pdf_url("https://scholar.google.comhttps://arxiv.org/pdf/1706.03762", &base)?;
/// assert_eq!(url.as_str(), "https://arxiv.org/pdf/1706.03762");
/// # Ok::<(), scholar::errors::ScholarError>(())
/// ```
pub fn resolve_pdf_url(raw: &str, scholar_base: &Url) -> Result<Url, ScholarError> {
  let raw = raw.trim();
  let base = scholar_base.as_str().trim_end_matches('/');
  for prefix in [SCHOLAR_PREFIX, base] {
    let Some(rest) = raw.strip_prefix(prefix) else { continue };
    if let Ok(url) = Url::parse(rest) {
      return Ok(url);
    }
    if rest.starts_with("/scholar_url") {
      let redirect = Url::parse(raw)?;
      if let Some((_, target)) = redirect.query_pairs().find(|(key, _)| key == "url") {
        return Ok(Url::parse(&target)?);
      }
    }
  }
  Ok(Url::parse(raw)?)
}

/// Downloads PDFs into a directory.
pub struct PdfFetcher {
  /// Used for the GET requests.
  transport:    Box<dyn Transport>,
  /// Directory the files are written to.
  dir:          PathBuf,
  /// Scholar address whose links are unwrapped, see [`resolve_pdf_url`].
  scholar_base: Url,
}

impl PdfFetcher {
  /// Creates a fetcher writing into `dir`.
  pub fn new(transport: Box<dyn Transport>, dir: &Path) -> Self {
    Self { transport, dir: dir.to_path_buf(), scholar_base: Settings::default().base_url }
  }

  /// Unwraps links pointing at `base` instead of the default Scholar address.
  pub fn with_scholar_base(mut self, base: Url) -> Self {
    self.scholar_base = base;
    self
  }

  /// The file a paper titled `title` is saved to.
  pub fn target_path(&self, title: &str) -> PathBuf {
    self.dir.join(format!("{}.pdf", file_stem(title, None)))
  }

  /// Like [`PdfFetcher::fetch`], but reports [`FetchOutcome::NoUrl`] when there is no link.
  pub async fn fetch_optional(
    &self,
    url: Option<&str>,
    title: &str,
  ) -> Result<FetchOutcome, ScholarError> {
    match url {
      Some(url) => self.fetch(url, title).await,
      None => Ok(FetchOutcome::NoUrl),
    }
  }

  /// Downloads `url` and saves it as `{title}.pdf` (see [`PdfFetcher::target_path`]),
  /// overwriting any existing file.
  ///
  /// # Errors
  ///
  /// Returns an error only if the file cannot be written. Bad links, unreachable servers and
  /// short bodies are reported through the returned [`FetchOutcome`].
  pub async fn fetch(&self, url: &str, title: &str) -> Result<FetchOutcome, ScholarError> {
    let resolved = match resolve_pdf_url(url, &self.scholar_base) {
      Ok(resolved) => resolved,
      Err(e) => {
        return Ok(FetchOutcome::ConnectionFailure { url: url.to_string(), reason: e.to_string() })
      },
    };
    if resolved.as_str() != url {
      debug!("Resolved PDF URL {url} to {resolved}");
    }

    let body = match self.transport.get(&resolved).await {
      Ok(body) => body,
      Err(e) => {
        return Ok(FetchOutcome::ConnectionFailure { url: url.to_string(), reason: e.to_string() })
      },
    };

    if body.len() < MIN_PDF_BYTES {
      return Ok(FetchOutcome::TooSmall { bytes: body.len() });
    }

    let path = self.target_path(title);
    debug!("Writing PDF to path: {path:?}");
    write_replacing(&path, &body).await?;
    Ok(FetchOutcome::Success { path, bytes: body.len() })
  }
}

/// Writes `bytes` next to `path` and renames the result onto it, so `path` never holds a
/// partial file.
async fn write_replacing(path: &Path, bytes: &[u8]) -> Result<(), ScholarError> {
  let partial = path.with_extension("pdf.part");
  let written = match tokio::fs::write(&partial, bytes).await {
    Ok(()) => tokio::fs::rename(&partial, path).await,
    Err(e) => Err(e),
  };
  if let Err(e) = written {
    if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
      trace!("Could not remove {}: {cleanup}", partial.display());
    }
    return Err(e.into());
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use tempfile::tempdir;

  use super::*;
  use crate::clients::mock::MockTransport;

  const PDF_URL: &str = "https://example.org/paper.pdf";

  fn body(len: usize) -> Vec<u8> { (0..len).map(|i| (i % 251) as u8).collect() }

  fn scholar() -> Url { Settings::default().base_url }

  #[test]
  fn test_resolve_plain_url() -> anyhow::Result<()> {
    assert_eq!(resolve_pdf_url(PDF_URL, &scholar())?.as_str(), PDF_URL);
    Ok(())
  }

  #[test]
  fn test_resolve_duplicated_prefix() -> anyhow::Result<()> {
    let url = resolve_pdf_url("https://scholar.google.comhttps://example.org/paper.pdf", &scholar())?;
    assert_eq!(url.as_str(), PDF_URL);
    Ok(())
  }

  #[test]
  fn test_resolve_scholar_redirect() -> anyhow::Result<()> {
    let url = resolve_pdf_url(
      "https://scholar.google.com/scholar_url?url=https://example.org/paper.pdf&hl=en&sa=X",
      &scholar(),
    )?;
    assert_eq!(url.as_str(), PDF_URL);
    Ok(())
  }

  #[test]
  fn test_resolve_invalid_url() {
    assert!(matches!(resolve_pdf_url("not a url", &scholar()), Err(ScholarError::InvalidUrl(_))));
  }

  #[test]
  fn test_resolve_mirror_redirect() -> anyhow::Result<()> {
    let mirror = Url::parse("http://127.0.0.1:8080/")?;
    let url = resolve_pdf_url(
      "http://127.0.0.1:8080/scholar_url?url=https://example.org/paper.pdf&hl=en",
      &mirror,
    )?;
    assert_eq!(url.as_str(), PDF_URL);

    let url = resolve_pdf_url("https://scholar.google.comhttps://example.org/paper.pdf", &mirror)?;
    assert_eq!(url.as_str(), PDF_URL);
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_writes_exact_bytes() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let content = body(MIN_PDF_BYTES);
    let fetcher =
      PdfFetcher::new(Box::new(MockTransport::new().with_body(PDF_URL, content.clone())), dir.path());

    let outcome = fetcher.fetch(PDF_URL, "Attention Is All You Need").await?;
    let path = dir.path().join("Attention Is All You Need.pdf");
    assert_eq!(outcome, FetchOutcome::Success { path: path.clone(), bytes: MIN_PDF_BYTES });
    assert_eq!(std::fs::read(&path)?, content);
    assert!(!dir.path().join("Attention Is All You Need.pdf.part").exists());
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_too_small() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fetcher = PdfFetcher::new(
      Box::new(MockTransport::new().with_body(PDF_URL, body(MIN_PDF_BYTES - 1))),
      dir.path(),
    );

    let outcome = fetcher.fetch(PDF_URL, "Small").await?;
    assert_eq!(outcome, FetchOutcome::TooSmall { bytes: 9_999 });
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_too_small_keeps_existing_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("Paper.pdf");
    std::fs::write(&path, b"previous download")?;
    let fetcher =
      PdfFetcher::new(Box::new(MockTransport::new().with_body(PDF_URL, body(100))), dir.path());

    fetcher.fetch(PDF_URL, "Paper").await?;
    assert_eq!(std::fs::read(&path)?, b"previous download");
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_overwrites_existing_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let path = dir.path().join("Paper.pdf");
    std::fs::write(&path, b"previous download")?;
    let content = body(20_000);
    let fetcher =
      PdfFetcher::new(Box::new(MockTransport::new().with_body(PDF_URL, content.clone())), dir.path());

    fetcher.fetch(PDF_URL, "Paper").await?;
    assert_eq!(std::fs::read(&path)?, content);
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_strips_scholar_prefix_before_request() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let transport = MockTransport::new().with_body(PDF_URL, body(MIN_PDF_BYTES));
    let requested = transport.requested();
    let fetcher = PdfFetcher::new(Box::new(transport), dir.path());

    let outcome = fetcher
      .fetch("https://scholar.google.com/scholar_url?url=https://example.org/paper.pdf&hl=en", "P")
      .await?;
    assert!(matches!(outcome, FetchOutcome::Success { .. }));
    assert_eq!(*requested.lock().unwrap(), vec![PDF_URL.to_string()]);
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_unwraps_mirror_links() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let transport = MockTransport::new().with_body(PDF_URL, body(MIN_PDF_BYTES));
    let requested = transport.requested();
    let fetcher = PdfFetcher::new(Box::new(transport), dir.path())
      .with_scholar_base(Url::parse("http://127.0.0.1:8080")?);

    let outcome = fetcher
      .fetch("http://127.0.0.1:8080/scholar_url?url=https://example.org/paper.pdf&hl=en", "P")
      .await?;
    assert!(matches!(outcome, FetchOutcome::Success { .. }));
    assert_eq!(*requested.lock().unwrap(), vec![PDF_URL.to_string()]);
    Ok(())
  }

  #[tokio::test]
  async fn test_failed_write_leaves_no_partial_file() -> anyhow::Result<()> {
    let dir = tempdir()?;
    std::fs::create_dir(dir.path().join("Paper.pdf"))?;
    std::fs::write(dir.path().join("Paper.pdf").join("inside"), b"occupied")?;
    let fetcher = PdfFetcher::new(
      Box::new(MockTransport::new().with_body(PDF_URL, body(MIN_PDF_BYTES))),
      dir.path(),
    );

    let result = fetcher.fetch(PDF_URL, "Paper").await;
    assert!(matches!(result, Err(ScholarError::Io(_))));
    assert!(!dir.path().join("Paper.pdf.part").exists());
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_connection_failure() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fetcher = PdfFetcher::new(Box::new(MockTransport::new()), dir.path());

    let outcome = fetcher.fetch("https://unreachable.example/paper.pdf", "Paper").await?;
    assert!(matches!(
      outcome,
      FetchOutcome::ConnectionFailure { ref url, .. } if url == "https://unreachable.example/paper.pdf"
    ));
    assert_eq!(std::fs::read_dir(dir.path())?.count(), 0);
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_unparseable_url() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let transport = MockTransport::new();
    let requested = transport.requested();
    let fetcher = PdfFetcher::new(Box::new(transport), dir.path());

    let outcome = fetcher.fetch("definitely not a url", "Paper").await?;
    assert!(matches!(outcome, FetchOutcome::ConnectionFailure { .. }));
    assert!(requested.lock().unwrap().is_empty());
    Ok(())
  }

  #[tokio::test]
  async fn test_fetch_optional_without_url() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let fetcher = PdfFetcher::new(Box::new(MockTransport::new()), dir.path());
    assert_eq!(fetcher.fetch_optional(None, "Paper").await?, FetchOutcome::NoUrl);
    Ok(())
  }

  #[test]
  fn test_target_path_is_sanitized() {
    let fetcher = PdfFetcher::new(Box::new(MockTransport::new()), Path::new("/papers"));
    assert_eq!(fetcher.target_path("../secret/plans"), PathBuf::from("/papers/_secret_plans.pdf"));
  }
}
