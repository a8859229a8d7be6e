//! Turning paper titles into file names.
//!
//! Titles come straight from search results, so they may contain path separators, characters
//! that some filesystems reject, or nothing usable at all. [`file_stem`] maps any title onto a
//! single safe path component while keeping it recognisable.
//!
//! # Examples
//!
//! ```
//! use scholar::format;
//!
//! assert_eq!(format::file_stem("Attention Is All You Need", None), "Attention Is All You Need");
//! assert_eq!(format::file_stem("TCP/IP: A History", None), "TCP_IP_ A History");
//! assert_eq!(format::file_stem("This Is A Very Long Document Title", Some(20)), "This Is A Very Long");
//! ```

use lazy_static::lazy_static;
use regex::Regex;

use crate::settings::MAX_FILE_STEM_LEN;

/// Stem used when nothing of the title survives sanitizing.
const FALLBACK_STEM: &str = "untitled";

/// Formats a title for use as a file name, without extension.
///
/// - Runs of whitespace collapse into one space
/// - Path separators, `: * ? " < > |` and other control characters become `_`
/// - Leading dots are dropped, so the result is never hidden or a relative path
/// - The result is cut at a word boundary to at most `max_length` bytes (default
///   [`MAX_FILE_STEM_LEN`]); a single word longer than that is cut at a character boundary
///
/// ```
/// use scholar::format::file_stem;
///
/// assert_eq!(file_stem("../../etc/passwd", None), "_.._etc_passwd");
/// assert_eq!(file_stem("  ", None), "untitled");
/// ```
pub fn file_stem(title: &str, max_length: Option<usize>) -> String {
  lazy_static! {
      static ref ILLEGAL: Regex = Regex::new(r#"[/\\:*?"<>|\p{Cc}]"#).unwrap();
  }

  // Collapse first so tabs and newlines become spaces rather than underscores.
  let collapsed = title.split_whitespace().collect::<Vec<&str>>().join(" ");
  let replaced = ILLEGAL.replace_all(&collapsed, "_");
  let stem = replaced.trim_start_matches('.').trim();

  let max_length = max_length.unwrap_or(MAX_FILE_STEM_LEN);
  let truncated =
    if stem.len() <= max_length { stem.to_string() } else { truncate(stem, max_length) };

  if truncated.is_empty() {
    FALLBACK_STEM.to_string()
  } else {
    truncated
  }
}

/// Cuts `stem` to `max_length` bytes, preferring word boundaries.
fn truncate(stem: &str, max_length: usize) -> String {
  let mut result = String::new();
  for word in stem.split(' ') {
    let separator = usize::from(!result.is_empty());
    if result.len() + separator + word.len() > max_length {
      break;
    }
    if separator == 1 {
      result.push(' ');
    }
    result.push_str(word);
  }

  if result.is_empty() {
    let end = stem
      .char_indices()
      .map(|(i, c)| i + c.len_utf8())
      .take_while(|&end| end <= max_length)
      .last()
      .unwrap_or(0);
    result.push_str(&stem[..end]);
  }
  result
}
