//! A library for finding papers on Google Scholar, collecting their BibTeX citations and
//! downloading their PDFs.
//!
//! The pipeline for a single query is linear: search, take the first result, fetch its citation
//! text, then try to download the PDF it links to. [`runner::BatchRunner`] drives that pipeline
//! for one or many queries and keeps going when an individual download fails.
//!
//! # Example
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use scholar::{
//!   clients::{HttpTransport, ScholarClient, TokioSleeper},
//!   lookup::PaperLookup,
//!   paper::Query,
//!   pdf::PdfFetcher,
//!   runner::{BatchRunner, RunOptions},
//!   settings::Settings,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!   let settings = Settings::default();
//!   let lookup = PaperLookup::new(Box::new(ScholarClient::new(&settings)?), Arc::new(TokioSleeper));
//!   let fetcher = PdfFetcher::new(Box::new(HttpTransport::new(&settings)?), &settings.download_dir);
//!   let mut runner =
//!     BatchRunner::new(lookup, fetcher, Arc::new(TokioSleeper), RunOptions::default(), std::io::stdout());
//!
//!   runner.run_single(&Query::new("Attention is all you need")).await?;
//!   Ok(())
//! }
//! ```

#![warn(missing_docs, clippy::missing_docs_in_private_items)]
use std::{
  io::Write,
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use async_trait::async_trait;
use tracing::{debug, error, trace, warn};
#[cfg(test)] use tracing_test::traced_test;
use url::Url;

pub mod clients;
pub mod errors;
pub mod format;
pub mod lookup;
pub mod matching;
pub mod paper;
pub mod pdf;
pub mod runner;
pub mod settings;

use clients::{ScholarBackend, Sleeper, Transport};
use errors::ScholarError;
use paper::{PaperRecord, Query, SearchHit};
use settings::Settings;
