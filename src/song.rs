//! # Parsed song txt aggregate
//!
//! [`SongTxt`] owns the headers and note tracks of one parsed file and runs
//! the fix pipeline over them. The pipeline order is fixed: structural fixes
//! (relative timings, duet split, missing headers) come first, then numeric
//! normalization (first timestamp, BPM, overlaps, line breaks, pitches), then
//! text cleanup (apostrophes, spaces, capitalization, language). Each step
//! is a pure in-place transformation; the pipeline never fails on a typed
//! model.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::error::TxtParseError;
use crate::headers::Headers;
use crate::logging::Log;
use crate::meta_tags::MetaTags;
use crate::tracks::Tracks;

/// A parsed .txt file of an UltraStar song.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SongTxt {
    pub headers: Headers,
    pub notes: Tracks,
    pub meta_tags: MetaTags,
}

/// One lyric line with the millisecond it starts at.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncedLyric {
    pub text: String,
    pub millis: i64,
}

impl SongTxt {
    /// Parses a whole txt file. Line-level defects are logged and skipped;
    /// only missing required headers or a file without notes fail.
    pub fn parse(value: &str, log: &dyn Log) -> Result<SongTxt, TxtParseError> {
        let mut lines: VecDeque<&str> = value.lines().filter(|line| !line.is_empty()).collect();
        let headers = Headers::parse(&mut lines, log)?;
        let notes = Tracks::parse(&mut lines, log)?;
        if !lines.is_empty() {
            log.warn(&format!("trailing text in song txt: '{lines:?}'"));
        }
        Ok(SongTxt {
            headers,
            notes,
            meta_tags: MetaTags::default(),
        })
    }

    /// Like [`SongTxt::parse`], but swallows the error for callers that only
    /// care whether the file is usable.
    pub fn try_parse(value: &str, log: &dyn Log) -> Option<SongTxt> {
        Self::parse(value, log).ok()
    }

    /// Attaches the meta tags value parsed from the `#VIDEO` header by a
    /// collaborator.
    pub fn with_meta_tags(mut self, meta_tags: MetaTags) -> SongTxt {
        self.meta_tags = meta_tags;
        self
    }

    /// Runs all fixes in their required order.
    pub fn fix(&mut self, log: &dyn Log) {
        let was_relative = self.headers.relative.is_some();
        self.fix_relative_songs(log);
        if !was_relative {
            self.notes.maybe_split_duet_notes();
        }
        self.restore_missing_headers();
        self.fix_first_timestamp(log);
        self.fix_low_bpm(log);
        self.notes.fix_overlapping_and_touching_notes(log);
        self.notes.fix_linebreaks(log);
        self.notes.fix_pitch_values(log);
        self.notes.fix_apostrophes_and_quotation_marks(log);
        self.headers.fix_apostrophes_and_quotation_marks(log);
        self.notes.fix_spaces(log);
        self.notes.fix_all_caps(log);
        self.notes.fix_first_words_capitalization(log);
        self.headers.fix_language(log);
    }

    /// Sanitizes upstream issues and prepares the txt for local usage.
    pub fn sanitize(&mut self, log: &dyn Log) {
        self.headers.reset_file_location_headers();
        self.fix(log);
    }

    /// Minimum song length based on last beat, BPM and GAP, as `"MM:SS"`.
    pub fn minimum_song_length(&self) -> String {
        let beats_secs = self.headers.bpm.beats_to_secs(self.notes.end());
        let minimum_secs = (beats_secs + self.headers.gap as f64 / 1000.0).round_ties_even() as i64;
        format!("{:02}:{:02}", minimum_secs / 60, minimum_secs % 60)
    }

    /// Plain lyric text, with a `[P1]:`/`[P2]:` section per performer for
    /// duets.
    pub fn unsynchronized_lyrics(&self) -> String {
        let join = |track: &[crate::notes::Line]| {
            track
                .iter()
                .map(|line| line.text().trim_end().to_owned())
                .collect::<Vec<_>>()
                .join("\n")
        };
        match &self.notes.track_2 {
            Some(track_2) => format!(
                "[{}]:\n{}\n\n[{}]:\n{}",
                self.headers.p1.as_deref().unwrap_or("P1"),
                join(&self.notes.track_1),
                self.headers.p2.as_deref().unwrap_or("P2"),
                join(track_2)
            ),
            None => join(&self.notes.track_1),
        }
    }

    /// Lyric lines with their start offsets in milliseconds.
    pub fn synchronized_lyrics(&self) -> Vec<SyncedLyric> {
        self.notes
            .all_lines()
            .map(|line| SyncedLyric {
                text: line.text(),
                millis: (self.headers.bpm.beats_to_ms(line.start()) + self.headers.gap as f64)
                    .round_ties_even() as i64,
            })
            .collect()
    }

    /// Rewrites relative timings as absolute by cumulatively summing offsets,
    /// then drops `#RELATIVE`. Relative timings don't support duets, so the
    /// first break-less line ends the pass.
    fn fix_relative_songs(&mut self, log: &dyn Log) {
        if self.headers.relative.is_none() {
            return;
        }
        let mut offset = 0;
        for line in self.notes.all_lines_mut() {
            for note in &mut line.notes {
                note.start += offset;
            }
            let Some(line_break) = line.line_break.as_mut() else {
                break;
            };
            line_break.previous_line_out_time += offset;
            if let Some(next_line_in_time) = line_break.next_line_in_time.as_mut() {
                *next_line_in_time += offset;
            }
            offset = line_break
                .next_line_in_time
                .filter(|&time| time != 0)
                .unwrap_or(line_break.previous_line_out_time);
        }
        self.headers.relative = None;
        log.debug("FIX: Changed relative to absolute timings.");
    }

    /// Populates `#P1`/`#P2` for duets and copies preview/medley values from
    /// the meta tags into headers.
    fn restore_missing_headers(&mut self) {
        if self.notes.track_2.is_some() {
            self.headers.p1 = Some(
                self.meta_tags
                    .player1
                    .clone()
                    .unwrap_or_else(|| "P1".to_owned()),
            );
            self.headers.p2 = Some(
                self.meta_tags
                    .player2
                    .clone()
                    .unwrap_or_else(|| "P2".to_owned()),
            );
        }
        if let Some(preview) = self.meta_tags.preview {
            if preview != 0.0 {
                self.headers.previewstart = Some(preview);
            }
        }
        if let Some(medley) = self.meta_tags.medley {
            self.headers.medleystartbeat = Some(medley.start);
            self.headers.medleyendbeat = Some(medley.end);
        }
    }

    /// Shifts all notes so the first note starts at beat zero and adjusts
    /// `#GAP` accordingly.
    fn fix_first_timestamp(&mut self, log: &dyn Log) {
        let offset = self.notes.start();
        if offset == 0 {
            self.headers.gap = round_to_nearest_ten(self.headers.gap as f64);
            return;
        }
        for line in self.notes.all_lines_mut() {
            line.shift(-offset);
        }
        self.headers.apply_to_medley_tags(|beats| beats - offset);
        let offset_ms = self.headers.bpm.beats_to_ms(offset);
        self.headers.gap = round_to_nearest_ten(self.headers.gap as f64 + offset_ms);
        log.debug("FIX: Set first timestamp to zero and adjusted #GAP accordingly.");
    }

    /// (Repeatedly) doubles the BPM value and all note timings until the BPM
    /// is above the minimum.
    fn fix_low_bpm(&mut self, log: &dyn Log) {
        if !self.headers.bpm.is_too_low() {
            return;
        }
        let factor = self.headers.bpm.make_large_enough();
        if factor == 1 {
            log.warn(&format!(
                "BPM of {} is too low, but cannot be raised by doubling.",
                self.headers.bpm
            ));
            return;
        }
        self.headers.apply_to_medley_tags(|beats| beats * factor);
        for line in self.notes.all_lines_mut() {
            line.multiply(factor);
        }
        log.debug(&format!(
            "FIX: Increased BPM to {} (factor: {factor})",
            self.headers.bpm
        ));
    }
}

impl fmt::Display for SongTxt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n{}", self.headers, self.notes)
    }
}

fn round_to_nearest_ten(value: f64) -> i64 {
    ((value / 10.0).round_ties_even() * 10.0) as i64
}
