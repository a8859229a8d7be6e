use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use clap::{builder::ArgAction, CommandFactory, Parser};
use console::{style, Emoji};
use errors::ScholarDlError;
use scholar::{
  clients::{HttpTransport, ScholarClient, TokioSleeper},
  lookup::PaperLookup,
  paper::Query,
  pdf::{FetchOutcome, PdfFetcher},
  runner::{BatchRunner, ItemOutcome, RunOptions, RunReport},
  settings::{Settings, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT},
};
use tracing::{debug, trace};
use tracing_subscriber::EnvFilter;

pub mod errors;

static BOOKS: Emoji<'_, '_> = Emoji("📚 ", "");
static PAPER: Emoji<'_, '_> = Emoji("📄 ", "");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✨ ", "");

#[derive(Parser)]
#[command(author, version, about = "Papers and BibTeX from Google Scholar")]
struct Cli {
  /// Verbose mode (-v, -vv, -vvv)
  #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging verbosity"
    )]
  verbose: u8,

  /// Enter a single paper search query
  #[arg(long, conflicts_with = "from_file")]
  search: Option<String>,

  /// Read search strings, one per line, from a file
  #[arg(long)]
  from_file: Option<PathBuf>,

  /// Append the BibTeX output to a file
  #[arg(long)]
  bib_output: Option<PathBuf>,

  /// Go much slower in an attempt to avoid CAPTCHAs
  #[arg(long)]
  slow: bool,

  /// Directory downloaded PDFs are written to
  #[arg(long, default_value = ".", env = "SCHOLAR_DOWNLOAD_DIR")]
  dir: PathBuf,

  /// Base URL of Google Scholar, or of a mirror
  #[arg(long, default_value = DEFAULT_BASE_URL, env = "SCHOLAR_BASE_URL")]
  base_url: String,

  /// Timeout for each request, in seconds
  #[arg(long, default_value_t = DEFAULT_TIMEOUT.as_secs(), env = "SCHOLAR_TIMEOUT_SECS")]
  timeout: u64,

  /// User agent sent with every request
  #[arg(long, default_value = DEFAULT_USER_AGENT, env = "SCHOLAR_USER_AGENT", hide_default_value = true)]
  user_agent: String,
}

/// Setup logging with the specified verbosity level
fn setup_logging(verbosity: u8) {
  let filter = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_file(true)
    .with_line_number(true)
    .with_target(true)
    .init();
}

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  setup_logging(cli.verbose);

  match run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("{} {}", style(WARNING).red(), style(&e).red().bold());
      e.exit_code()
    },
  }
}

async fn run(cli: Cli) -> Result<(), ScholarDlError> {
  let queries = match (&cli.search, &cli.from_file) {
    (Some(search), _) => vec![Query::new(search.as_str())],
    (None, Some(path)) => {
      let queries = Query::read_list(path).await?;
      if queries.is_empty() {
        println!("{} No queries found in: {}", style(WARNING).yellow(), style(path.display()).yellow());
        return Ok(());
      }
      println!(
        "{} Read {} queries from: {}",
        style(BOOKS).cyan(),
        style(queries.len()).yellow(),
        style(path.display()).yellow()
      );
      queries
    },
    (None, None) => {
      Cli::command().print_help()?;
      return Ok(());
    },
  };

  let settings = Settings::default()
    .with_base_url(&cli.base_url)?
    .with_timeout(Duration::from_secs(cli.timeout))
    .with_user_agent(cli.user_agent)
    .with_download_dir(cli.dir);
  debug!("Using settings: {settings:?}");

  let options = RunOptions { citation_sink: cli.bib_output, slow: cli.slow };
  let lookup = PaperLookup::new(Box::new(ScholarClient::new(&settings)?), Arc::new(TokioSleeper));
  let fetcher = PdfFetcher::new(Box::new(HttpTransport::new(&settings)?), &settings.download_dir)
    .with_scholar_base(settings.base_url.clone());
  let mut runner = BatchRunner::new(lookup, fetcher, Arc::new(TokioSleeper), options, std::io::stdout());

  let result = if cli.search.is_some() {
    runner.run_single(&queries[0]).await
  } else {
    runner.run(&queries).await
  };
  trace!("Run report: {:?}", runner.report());

  print_summary(runner.report());
  result?;
  Ok(())
}

/// Prints one line per processed query.
fn print_summary(report: &RunReport) {
  for item in &report.items {
    let title = item.title.as_deref().unwrap_or(item.query.as_str());
    match &item.outcome {
      ItemOutcome::Fetched(FetchOutcome::Success { path, .. }) => println!(
        "{} {} {}",
        style(SUCCESS).green(),
        style(title).white().bold(),
        style(path.display()).blue().underlined()
      ),
      ItemOutcome::Fetched(outcome) => println!(
        "{} {} {}",
        style(PAPER).yellow(),
        style(title).white().bold(),
        style(outcome).yellow()
      ),
      ItemOutcome::Failed(reason) =>
        println!("{} {} {}", style(WARNING).red(), style(title).white().bold(), style(reason).red()),
    }
  }
}
