//! Error types for the scholar-dl CLI application.
//!
//! Every error that reaches `main` ends the process; [`ScholarDlError::exit_code`] decides the
//! status it ends with:
//!
//! - `1` when Scholar could not be searched (CAPTCHA or no results) or anything else failed
//! - `2` when the `--from-file` input does not exist

use std::process::ExitCode;

use scholar::errors::ScholarError;
use thiserror::Error;

/// Errors that can occur during CLI operations.
#[derive(Error, Debug)]
pub enum ScholarDlError {
  /// Errors from the underlying scholar library
  #[error(transparent)]
  Scholar(#[from] ScholarError),

  /// Errors writing to the terminal
  #[error(transparent)]
  IO(#[from] std::io::Error),
}

impl ScholarDlError {
  /// The numeric exit status for this error.
  pub fn status(&self) -> u8 {
    match self {
      ScholarDlError::Scholar(ScholarError::InputFileMissing(_)) => 2,
      _ => 1,
    }
  }

  /// The process exit status for this error.
  pub fn exit_code(&self) -> ExitCode { ExitCode::from(self.status()) }
}
