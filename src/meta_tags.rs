//! Meta tags embedded by the remote song database.
//!
//! The full meta tag string lives in the `#VIDEO` header and is parsed by a
//! collaborator. This core only reads the handful of fields needed to restore
//! missing headers, so the type is a plain value with public fields that the
//! caller attaches to a parsed song.

use serde::Serialize;

/// Beat range marking a shortened playback window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MedleyTag {
    pub start: i32,
    pub end: i32,
}

/// Fields of the meta tags value consumed by this crate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetaTags {
    pub player1: Option<String>,
    pub player2: Option<String>,
    pub preview: Option<f64>,
    pub medley: Option<MedleyTag>,
}
