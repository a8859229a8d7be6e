//! Google Scholar backend.
//!
//! Scholar has no API, so this client requests the same pages a browser would and scrapes them.
//! A search is `GET /scholar?hl=en&q=...`; only the first result block is read. Each result
//! carries a cluster id (`data-cid`) that identifies its citation popup
//! (`/scholar?q=info:{cid}:scholar.google.com/&output=cite`), which in turn links to the BibTeX
//! export.
//!
//! Scholar blocks automated traffic aggressively. A CAPTCHA page, a redirect to the `/sorry`
//! interstitial and a rate-limit status are all reported as "no result", the same as an empty
//! result page, since from the caller's side the search simply failed to produce anything.
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
//! let hit = client.first_result("Verifiable Fully Homomorphic Encryption").await?;
//!
//! if let Some(hit) = hit {
//!   println!("Title: {}", hit.title);
//!   println!("PDF: {:?}", hit.eprint);
//! }
//! # Ok(())
//! # }
//! ```

use reqwest::StatusCode;

use super::*;

/// Client for searching Google Scholar and exporting citations.
pub struct ScholarClient {
  /// Internal web client used to connect to Scholar.
  client:   reqwest::Client,
  /// The base URL of Scholar or a mirror of it.
  base_url: Url,
}

impl ScholarClient {
  /// Creates a new client configured from `settings`.
  pub fn new(settings: &Settings) -> Result<Self, ScholarError> {
    Ok(Self { client: build_client(settings)?, base_url: settings.base_url.clone() })
  }

  /// The search page URL for `query`.
  fn search_url(&self, query: &str) -> Result<Url, ScholarError> {
    Ok(Url::parse_with_params(self.base_url.join("scholar")?.as_str(), &[
      ("hl", "en"),
      ("q", query),
    ])?)
  }

  /// GETs `url` and returns the body, failing on any non-success status.
  async fn get_text(&self, url: Url) -> Result<String, ScholarError> {
    debug!("Fetching from Google Scholar via: {url}");
    Ok(self.client.get(url).send().await?.error_for_status()?.text().await?)
  }
}

#[async_trait]
impl ScholarBackend for ScholarClient {
  async fn first_result(&self, query: &str) -> Result<Option<SearchHit>, ScholarError> {
    let url = self.search_url(query)?;
    debug!("Searching Google Scholar via: {url}");

    let response = self.client.get(url).send().await?;
    let status = response.status();
    if response.url().path().starts_with("/sorry") {
      warn!("Google Scholar redirected the search to its robot check");
      return Ok(None);
    }
    if matches!(
      status,
      StatusCode::TOO_MANY_REQUESTS | StatusCode::FORBIDDEN | StatusCode::SERVICE_UNAVAILABLE
    ) {
      warn!("Google Scholar refused the search with {status}");
      return Ok(None);
    }
    if !status.is_success() {
      return Err(ScholarError::ApiError(format!("Search returned {status}")));
    }

    let body = response.text().await?;
    trace!("Google Scholar response: {body}");
    parse_first_result(&body, &self.base_url)
  }

  async fn citation(&self, hit: &SearchHit) -> Result<String, ScholarError> {
    let popup = self.get_text(Url::parse(&hit.citation_handle)?).await?;
    let link = parse_bibtex_link(&popup, &self.base_url)?.ok_or_else(|| {
      ScholarError::ApiError(format!("No BibTeX export offered for: {}", hit.title))
    })?;
    self.get_text(link).await
  }
}

/// Extracts the first result from a search page.
///
/// Returns `Ok(None)` for CAPTCHA pages and pages without results.
fn parse_first_result(html: &str, base_url: &Url) -> Result<Option<SearchHit>, ScholarError> {
  lazy_static! {
      static ref CAPTCHA: Selector =
        Selector::parse("#gs_captcha_ccl, #captcha-form, #recaptcha").unwrap();
      static ref RESULT: Selector = Selector::parse("div.gs_r.gs_or.gs_scl").unwrap();
      static ref TITLE: Selector = Selector::parse("h3.gs_rt").unwrap();
      static ref TITLE_LINK: Selector = Selector::parse("h3.gs_rt > a").unwrap();
      static ref EPRINT: Selector = Selector::parse("div.gs_or_ggsm a[href]").unwrap();
      // "[PDF]", "[BOOK][B]", "[CITATION][C]" and friends
      static ref TYPE_TAGS: Regex = Regex::new(r"^\s*(\[[^\]]*\]\s*)+").unwrap();
  }

  let document = Html::parse_document(html);
  if document.select(&CAPTCHA).next().is_some() {
    warn!("Google Scholar served a CAPTCHA");
    return Ok(None);
  }

  let Some(result) = document.select(&RESULT).next() else {
    debug!("Google Scholar returned no results");
    return Ok(None);
  };

  let raw_title = result
    .select(&TITLE_LINK)
    .next()
    .or_else(|| result.select(&TITLE).next())
    .map(|element| element.text().collect::<String>())
    .unwrap_or_default();
  let title = TYPE_TAGS.replace(&raw_title, "").split_whitespace().collect::<Vec<_>>().join(" ");
  if title.is_empty() {
    return Err(ScholarError::ApiError("First result has no title".into()));
  }

  let cluster_id = result
    .value()
    .attr("data-cid")
    .ok_or_else(|| ScholarError::ApiError(format!("No cluster id for result: {title}")))?;
  let info = format!("info:{cluster_id}:scholar.google.com/");
  let citation_handle = Url::parse_with_params(base_url.join("scholar")?.as_str(), &[
    ("q", info.as_str()),
    ("output", "cite"),
    ("scirp", "0"),
    ("hl", "en"),
  ])?;

  let eprint = result
    .select(&EPRINT)
    .next()
    .and_then(|link| link.value().attr("href"))
    .map(|href| base_url.join(href))
    .transpose()?
    .map(String::from);

  Ok(Some(SearchHit { title, citation_handle: citation_handle.into(), eprint }))
}

/// Finds the BibTeX export link in a citation popup.
fn parse_bibtex_link(html: &str, base_url: &Url) -> Result<Option<Url>, ScholarError> {
  lazy_static! {
      static ref EXPORT_LINK: Selector = Selector::parse("a.gs_citi").unwrap();
  }

  let document = Html::parse_document(html);
  let href = document
    .select(&EXPORT_LINK)
    .find(|link| link.text().collect::<String>().trim() == "BibTeX")
    .and_then(|link| link.value().attr("href"));
  Ok(href.map(|href| base_url.join(href)).transpose()?)
}
