//! Driving the fetch pipeline over one or many queries.
//!
//! Each query goes through the same stages: search, record the citation, fetch the PDF. A
//! problem with one paper (no PDF link, a download that is too small or cannot connect, a
//! failed citation request) is logged and the batch moves on. The exception is a search that
//! yields nothing at all: Scholar answers that way once it has started serving CAPTCHAs, so every
//! later query would fail the same way and the run stops immediately. With a single query there
//! is nothing to move on to, so any failed lookup is returned as an error.
//!
//! Progress text (the query being searched, citations, pauses) goes to the writer passed to
//! [`BatchRunner::new`]; diagnostics go through `tracing`.

use tokio::io::AsyncWriteExt;

use crate::{
  lookup::PaperLookup,
  pdf::{FetchOutcome, PdfFetcher},
  settings::SLOW_PAUSE_SECS,
};

use super::*;

/// Options for a run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
  /// File every citation is appended to, created if missing
  pub citation_sink: Option<PathBuf>,
  /// Pause 50 to 100 seconds between queries of a batch
  pub slow:          bool,
}

/// Where the runner is within the current query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  /// Between queries
  Idle,
  /// Searching and fetching the citation
  Searching,
  /// Checking the result and recording its citation
  Verifying,
  /// Downloading the PDF
  Fetching,
}

/// How a single query ended, short of stopping the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
  /// The paper was found; this is what happened to its PDF.
  Fetched(FetchOutcome),
  /// The paper could not be processed.
  Failed(String),
}

/// Report for a single query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemReport {
  /// The query as given
  pub query:   Query,
  /// Title of the paper found, if the lookup succeeded
  pub title:   Option<String>,
  /// What happened
  pub outcome: ItemOutcome,
}

/// Reports for every query processed, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
  /// One entry per processed query
  pub items: Vec<ItemReport>,
}

impl RunReport {
  /// Number of PDFs written.
  pub fn downloaded(&self) -> usize {
    self
      .items
      .iter()
      .filter(|item| matches!(item.outcome, ItemOutcome::Fetched(FetchOutcome::Success { .. })))
      .count()
  }

  /// Number of queries whose paper could not be processed.
  pub fn failed(&self) -> usize {
    self.items.iter().filter(|item| matches!(item.outcome, ItemOutcome::Failed(_))).count()
  }
}

/// Runs [`PaperLookup`] and [`PdfFetcher`] over queries, one at a time.
pub struct BatchRunner<W> {
  /// Finds papers and their citations.
  lookup:  PaperLookup,
  /// Downloads PDFs.
  fetcher: PdfFetcher,
  /// Used for the pause between queries in slow mode.
  sleeper: Arc<dyn Sleeper>,
  /// Options for this run.
  options: RunOptions,
  /// Receives progress text and citations.
  out:     W,
  /// Current stage of the query being processed.
  stage:   Stage,
  /// Items of the latest run, including one that stopped early.
  report:  RunReport,
}

impl<W: Write> BatchRunner<W> {
  /// Creates a runner writing its progress to `out`.
  pub fn new(
    lookup: PaperLookup,
    fetcher: PdfFetcher,
    sleeper: Arc<dyn Sleeper>,
    options: RunOptions,
    out: W,
  ) -> Self {
    Self { lookup, fetcher, sleeper, options, out, stage: Stage::Idle, report: RunReport::default() }
  }

  /// The stage the runner is in.
  pub fn stage(&self) -> Stage { self.stage }

  /// Items processed by the latest run. After a run that returned an error this holds the
  /// queries finished before it stopped.
  pub fn report(&self) -> &RunReport { &self.report }

  /// Consumes the runner and returns its output writer.
  pub fn into_output(self) -> W { self.out }

  /// Processes a single query. Slow mode never pauses here.
  ///
  /// # Errors
  ///
  /// Returns [`ScholarError::NotFound`] if the search yields nothing, the backend's error if the
  /// search or citation request fails, and [`ScholarError::Io`] if progress cannot be written to
  /// the output.
  pub async fn run_single(&mut self, query: &Query) -> Result<RunReport, ScholarError> {
    self.report = RunReport::default();
    let paper = self.search(query).await?;
    let item = self.record_and_fetch(query, paper).await?;
    self.report.items.push(item);
    Ok(self.report.clone())
  }

  /// Processes `queries` in order, pausing between them in slow mode.
  ///
  /// # Errors
  ///
  /// Stops at the first query whose search yields nothing and returns
  /// [`ScholarError::NotFound`]; the remaining queries are not attempted. Also returns
  /// [`ScholarError::Io`] if progress cannot be written to the output. Either way
  /// [`BatchRunner::report`] keeps the queries processed before the error.
  pub async fn run(&mut self, queries: &[Query]) -> Result<RunReport, ScholarError> {
    self.report = RunReport::default();
    for (i, query) in queries.iter().enumerate() {
      if i > 0 && self.options.slow {
        self.pause().await?;
      }
      let item = match self.search(query).await {
        Ok(paper) => self.record_and_fetch(query, paper).await?,
        Err(ScholarError::NotFound) => return Err(ScholarError::NotFound),
        Err(ScholarError::Io(e)) => return Err(ScholarError::Io(e)),
        Err(e) => {
          warn!("Lookup failed for {query:?}: {e}");
          ItemReport {
            query:   query.clone(),
            title:   None,
            outcome: ItemOutcome::Failed(e.to_string()),
          }
        },
      };
      self.report.items.push(item);
    }
    debug!(
      "Processed {} queries: {} PDFs downloaded, {} failed",
      self.report.items.len(),
      self.report.downloaded(),
      self.report.failed()
    );
    Ok(self.report.clone())
  }

  /// Moves to `stage`.
  fn enter(&mut self, stage: Stage) {
    trace!("{:?} -> {:?}", self.stage, stage);
    self.stage = stage;
  }

  /// Searches for `query` and fetches its citation.
  async fn search(&mut self, query: &Query) -> Result<PaperRecord, ScholarError> {
    self.enter(Stage::Searching);
    writeln!(self.out, "Searching for: {query}")?;

    let result = self.lookup.find(query.as_str()).await;
    if let Err(ScholarError::NotFound) = result {
      error!("Could not access results for {query:?}: CAPTCHA or paper does not exist");
    }
    if result.is_err() {
      self.enter(Stage::Idle);
    }
    result
  }

  /// Checks `paper`, records its citation and downloads its PDF.
  async fn record_and_fetch(
    &mut self,
    query: &Query,
    paper: PaperRecord,
  ) -> Result<ItemReport, ScholarError> {
    self.enter(Stage::Verifying);
    self.lookup.verify(query.as_str(), &paper);
    writeln!(self.out, "{}", paper.citation_text)?;
    if let Some(sink) = &self.options.citation_sink {
      if let Err(e) = append_citation(sink, &paper.citation_text).await {
        warn!("Could not append citation to {}: {e}", sink.display());
      }
    }

    self.enter(Stage::Fetching);
    let outcome = match self.fetcher.fetch_optional(paper.pdf_url.as_deref(), &paper.title).await {
      Ok(outcome) => {
        match &outcome {
          FetchOutcome::Success { path, bytes } =>
            debug!("Saved {} ({bytes} bytes)", path.display()),
          FetchOutcome::TooSmall { bytes } =>
            warn!("PDF may be too small ({bytes} bytes): {}", paper.title),
          FetchOutcome::ConnectionFailure { url, reason } =>
            warn!("Invalid PDF URL: {url} ({reason})"),
          FetchOutcome::NoUrl => trace!("Nothing to download for {}", paper.title),
        }
        ItemOutcome::Fetched(outcome)
      },
      Err(e) => {
        warn!("Could not save PDF for {}: {e}", paper.title);
        ItemOutcome::Failed(e.to_string())
      },
    };
    writeln!(self.out)?;
    self.enter(Stage::Idle);

    Ok(ItemReport { query: query.clone(), title: Some(paper.title), outcome })
  }

  /// Waits a random 50 to 100 seconds.
  async fn pause(&mut self) -> Result<(), ScholarError> {
    let wait = settings::random_pause(SLOW_PAUSE_SECS);
    writeln!(self.out, "Waiting {:4.0} seconds", wait.as_secs_f64())?;
    self.sleeper.sleep(wait).await;
    Ok(())
  }
}

/// Appends `text` to the file at `path` exactly as given.
async fn append_citation(path: &Path, text: &str) -> Result<(), ScholarError> {
  let mut file = tokio::fs::OpenOptions::new().create(true).append(true).open(path).await?;
  file.write_all(text.as_bytes()).await?;
  file.flush().await?;
  Ok(())
}
