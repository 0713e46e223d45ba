//! Parser, fixer and canonical serializer for UltraStar song txt files.
//!
//! A txt file is a block of `#KEY:VALUE` headers followed by time-tagged
//! note events. [`parse`] turns the raw text into a typed [`SongTxt`];
//! [`SongTxt::fix`] repairs well-known upstream data-quality defects in
//! place (merged duet tracks, timestamps not starting at zero, too-low BPM,
//! overlapping notes, inconsistent spacing and capitalization); the
//! [`std::fmt::Display`] impl of [`SongTxt`] is the canonical serialization.
//!
//! This crate does no I/O: it consumes an already-decoded string and an
//! opaque meta tags value, and produces text.

pub mod bpm;
pub mod error;
pub mod headers;
pub mod languages;
pub mod logging;
pub mod meta_tags;
pub mod notes;
pub mod song;
pub mod text;
pub mod tracks;

pub use bpm::{BeatsPerMinute, MINIMUM_BPM};
pub use error::{NoteLineError, TxtParseError};
pub use headers::Headers;
pub use logging::{FacadeLog, Log, MemoryLog};
pub use meta_tags::{MedleyTag, MetaTags};
pub use notes::{Line, LineBreak, Note, NoteKind};
pub use song::{SongTxt, SyncedLyric};
pub use tracks::Tracks;

/// Parse a song txt string into a typed [`SongTxt`].
/// This is the main entry point for the library.
pub fn parse(value: &str, log: &dyn Log) -> Result<SongTxt, TxtParseError> {
    SongTxt::parse(value, log)
}

/// Parse a song txt string, returning `None` if it is unusable.
pub fn try_parse(value: &str, log: &dyn Log) -> Option<SongTxt> {
    SongTxt::try_parse(value, log)
}

/// Serialize a parsed song back to its canonical text form.
pub fn to_txt(song_txt: &SongTxt) -> String {
    song_txt.to_string()
}
