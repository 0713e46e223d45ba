//! # Track assembly and note-level fixes
//!
//! Lines are grouped into one or two tracks. Most uploads only carry explicit
//! `P1`/`P2` markers when the txt was authored as a duet; merged duets are
//! detected heuristically by [`Tracks::maybe_split_duet_notes`], which looks
//! for the point where the line break timeline jumps backward (the second
//! performer restarting earlier).
//!
//! The fix methods on [`Tracks`] are the note-level stages of the fix
//! pipeline; see `song` for the full ordering.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::error::TxtParseError;
use crate::logging::Log;
use crate::notes::{Line, Note};
use crate::text::{capitalize_first_word, replace_false_apostrophes};

/// All lines for player 1, and player 2 if applicable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tracks {
    pub track_1: Vec<Line>,
    pub track_2: Option<Vec<Line>>,
}

impl Tracks {
    pub fn parse(lines: &mut VecDeque<&str>, log: &dyn Log) -> Result<Tracks, TxtParseError> {
        let track_1 = player_lines(lines, log);
        if track_1.is_empty() {
            return Err(TxtParseError::NoNotes);
        }
        let track_2 = Some(player_lines(lines, log)).filter(|track| !track.is_empty());
        Ok(Tracks { track_1, track_2 })
    }

    /// Try to detect a second player's notes merged into track 1.
    ///
    /// Scans line break out-times in order; at the first backward jump, the
    /// line is split at the jump value and everything from there on becomes
    /// track 2. If either side of the split would be empty, nothing happens;
    /// the heuristic may under-detect duets by design.
    pub fn maybe_split_duet_notes(&mut self) {
        if self.track_2.is_some() {
            return;
        }
        let Some(first_break) = self.track_1[0].line_break else {
            // only one line
            return;
        };
        let mut last_out_time = first_break.previous_line_out_time;
        for idx in 0..self.track_1.len() {
            let Some(line_break) = self.track_1[idx].line_break else {
                return;
            };
            if line_break.previous_line_out_time < last_out_time {
                // line break has an earlier start beat than the previous one
                if let Some((first, second)) =
                    split_duet_line(&self.track_1[idx], line_break.previous_line_out_time)
                {
                    let mut track_2 = vec![second];
                    track_2.extend(self.track_1.split_off(idx + 1));
                    self.track_1.truncate(idx);
                    self.track_1.push(first);
                    self.track_2 = Some(track_2);
                }
                return;
            }
            last_out_time = line_break.previous_line_out_time;
        }
    }

    /// First start beat over all tracks.
    pub fn start(&self) -> i32 {
        match &self.track_2 {
            Some(track_2) => self.track_1[0].start().min(track_2[0].start()),
            None => self.track_1[0].start(),
        }
    }

    /// Last end beat over all tracks.
    pub fn end(&self) -> i32 {
        let track_1_end = self.track_1[self.track_1.len() - 1].end();
        match &self.track_2 {
            Some(track_2) => track_1_end.max(track_2[track_2.len() - 1].end()),
            None => track_1_end,
        }
    }

    pub fn all_tracks(&self) -> impl Iterator<Item = &Vec<Line>> {
        std::iter::once(&self.track_1).chain(self.track_2.iter())
    }

    pub fn all_tracks_mut(&mut self) -> impl Iterator<Item = &mut Vec<Line>> {
        std::iter::once(&mut self.track_1).chain(self.track_2.iter_mut())
    }

    pub fn all_lines(&self) -> impl Iterator<Item = &Line> {
        self.all_tracks().flat_map(|track| track.iter())
    }

    pub fn all_lines_mut(&mut self) -> impl Iterator<Item = &mut Line> {
        self.all_tracks_mut().flat_map(|track| track.iter_mut())
    }

    pub fn all_notes(&self) -> impl Iterator<Item = &Note> {
        self.all_lines().flat_map(|line| line.notes.iter())
    }

    pub fn all_notes_mut(&mut self) -> impl Iterator<Item = &mut Note> {
        self.all_lines_mut().flat_map(|line| line.notes.iter_mut())
    }

    /// Ensures every temporally consecutive note pair is in order and
    /// separated by at least one beat.
    pub fn fix_overlapping_and_touching_notes(&mut self, log: &dyn Log) {
        for track in self.all_tracks_mut() {
            for line_idx in 0..track.len() {
                let note_count = track[line_idx].notes.len();
                for note_idx in 0..note_count {
                    if note_idx + 1 < note_count {
                        let (head, tail) = track[line_idx].notes.split_at_mut(note_idx + 1);
                        fix_note_pair(&mut head[note_idx], &mut tail[0], log);
                    } else if track[line_idx].line_break.is_some() && line_idx + 1 < track.len() {
                        let (head, tail) = track.split_at_mut(line_idx + 1);
                        if let (Some(current), Some(next)) =
                            (head[line_idx].notes.last_mut(), tail[0].notes.first_mut())
                        {
                            fix_note_pair(current, next, log);
                        }
                    }
                }
            }
        }
    }

    /// Recomputes each break's single timing value from the gap between the
    /// current line end and the next line start; the paired in-time is
    /// dropped.
    pub fn fix_linebreaks(&mut self, log: &dyn Log) {
        for track in self.all_tracks_mut() {
            for idx in 0..track.len().saturating_sub(1) {
                let next_line_start = track[idx + 1].start();
                let line_end = track[idx].end();
                if let Some(line_break) = track[idx].line_break.as_mut() {
                    line_break.next_line_in_time = None;
                    let gap = next_line_start - line_end;
                    line_break.previous_line_out_time = if gap < 2 {
                        next_line_start
                    } else if gap == 2 {
                        line_end + 1
                    } else {
                        line_end + 2
                    };
                }
            }
        }
        log.debug("FIX: Linebreaks corrected (USDX style).");
    }

    /// Shifts all pitches by whole octaves toward zero if they are at least
    /// two octaves off.
    pub fn fix_pitch_values(&mut self, log: &dyn Log) {
        let Some(min_pitch) = self.all_notes().map(|note| note.pitch).min() else {
            return;
        };
        let octave_shift = min_pitch.div_euclid(12);
        if octave_shift.abs() >= 2 {
            for note in self.all_notes_mut() {
                note.pitch -= octave_shift * 12;
            }
            log.debug(&format!(
                "FIX: pitch values normalized (shifted by {octave_shift} octaves)."
            ));
        }
    }

    pub fn fix_apostrophes_and_quotation_marks(&mut self, log: &dyn Log) {
        let mut notes_fixed = 0;
        for note in self.all_notes_mut() {
            let corrected = replace_false_apostrophes(&note.text);
            if corrected != note.text {
                note.text = corrected;
                notes_fixed += 1;
            }
        }
        if notes_fixed > 0 {
            log.debug(&format!("FIX: {notes_fixed} apostrophes in lyrics corrected."));
        }
    }

    /// Ensures inter-word spaces are always at the end of a syllable.
    pub fn fix_spaces(&mut self, log: &dyn Log) {
        for line in self.all_lines_mut() {
            if let Some(first) = line.notes.first_mut() {
                first.left_trim_text();
            }
            // a leading space belongs to the end of the previous syllable
            for idx in 1..line.notes.len() {
                if line.notes[idx].text.starts_with(' ') {
                    line.notes[idx - 1].right_trim_text_and_add_space();
                    line.notes[idx].left_trim_text();
                }
                if line.notes[idx].text.ends_with(' ') {
                    line.notes[idx].right_trim_text_and_add_space();
                }
            }
            // the last syllable ends with a space so syllable highlighting is
            // complete and lines concatenate cleanly
            if let Some(last) = line.notes.last_mut() {
                last.right_trim_text_and_add_space();
            }
        }
        log.debug("FIX: Inter-word spaces corrected.");
    }

    pub fn is_all_caps(&self) -> bool {
        !self
            .all_notes()
            .any(|note| note.text.chars().any(char::is_lowercase))
    }

    pub fn fix_all_caps(&mut self, log: &dyn Log) {
        if self.is_all_caps() {
            for note in self.all_notes_mut() {
                note.text = note.text.to_lowercase();
            }
            self.fix_first_words_capitalization(log);
            log.debug("FIX: ALL CAPS lyrics corrected.");
        }
    }

    pub fn fix_first_words_capitalization(&mut self, log: &dyn Log) {
        let mut lines_capitalized = 0;
        for line in self.all_lines_mut() {
            let Some(first) = line.notes.first_mut() else {
                continue;
            };
            if capitalize_first_word(&mut first.text) {
                lines_capitalized += 1;
            }
        }
        if lines_capitalized > 0 {
            log.debug(&format!(
                "FIX: Capitalization corrected for {lines_capitalized} lines."
            ));
        }
    }
}

impl fmt::Display for Tracks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let track_lines = |track: &[Line]| {
            track
                .iter()
                .map(Line::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        };
        match &self.track_2 {
            Some(track_2) => write!(
                f,
                "P1\n{}\nP2\n{}\nE",
                track_lines(&self.track_1),
                track_lines(track_2)
            ),
            None => write!(f, "{}\nE", track_lines(&self.track_1)),
        }
    }
}

fn player_lines(lines: &mut VecDeque<&str>, log: &dyn Log) -> Vec<Line> {
    let mut track: Vec<Line> = Vec::new();
    if lines.front().is_some_and(|line| line.starts_with('P')) {
        lines.pop_front();
    }
    while !lines.is_empty() {
        let line = Line::parse(lines, log);
        let is_last = line.is_last();
        if !line.notes.is_empty() {
            track.push(line);
        }
        if is_last {
            // end of file or player block
            break;
        }
    }
    // ensure there is no trailing line break, e.g. because the last note was invalid
    if let Some(last) = track.last_mut() {
        last.line_break = None;
    }
    track
}

/// Splits a line at the point where the second performer's notes begin, i.e.
/// at the first note starting before `cutoff`. `None` if either part would
/// be empty.
fn split_duet_line(line: &Line, cutoff: i32) -> Option<(Line, Line)> {
    let idx = line.notes.iter().position(|note| note.start < cutoff)?;
    if idx == 0 {
        return None;
    }
    let first = Line {
        notes: line.notes[..idx].to_vec(),
        line_break: None,
    };
    let second = Line {
        notes: line.notes[idx..].to_vec(),
        line_break: line.line_break,
    };
    Some((first, second))
}

fn fix_note_pair(current: &mut Note, next: &mut Note, log: &dyn Log) {
    let mut fixed = false;
    if current.start > next.start {
        current.swap_timings(next);
        fixed = true;
    }
    let gap = current.gap(next);
    if gap <= 0 {
        current.shorten(1 - gap);
        fixed = true;
    }
    let gap = current.gap(next);
    if gap <= 0 {
        // current note cannot be shortened to leave a gap of one beat
        next.shift_start(1 - gap);
        fixed = true;
    }
    if fixed {
        log.debug(&format!("FIX: Gap after note {} fixed.", current.start));
    }
}
