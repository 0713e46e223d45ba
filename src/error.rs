//! # Error Types
//!
//! This module defines all error types for the UltraStar txt parser.
//!
//! Two severities exist:
//! - `TxtParseError` - fatal for the whole file; the caller should skip the song.
//! - `NoteLineError` - a single malformed note or line break line; the parser
//!   logs a warning, drops the line and continues.

use thiserror::Error;

/// Fatal parse error for a whole txt file.
///
/// # Example
/// ```
/// # use ultrastar_txt::TxtParseError;
/// let err = TxtParseError::NoNotes;
/// assert_eq!(err.to_string(), "no notes in file");
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxtParseError {
    /// One of `#TITLE`, `#ARTIST` or `#BPM` is absent from the header block.
    #[error("missing required headers")]
    MissingRequiredHeaders,

    /// The body contains no parsable notes at all.
    #[error("no notes in file")]
    NoNotes,
}

/// Recoverable error for a single malformed line in the note body.
///
/// Never escapes the parser; the offending line is logged and discarded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NoteLineError {
    #[error("invalid note: '{0}'")]
    InvalidNote(String),

    #[error("invalid line break: '{0}'")]
    InvalidLineBreak(String),
}
