//! # Note and line break grammar
//!
//! One physical line of the note body is either a track terminator (`E`,
//! `P2`), a line break (`- START[ END][ TRAILING]`) or a note
//! (`KIND START DURATION PITCH[ TEXT]` with `KIND` one of `: * F R G`).
//! [`Line::parse`] consumes lines from a deque until a break or terminator;
//! a break whose trailing content is not numeric pushes that content back to
//! the front of the deque, since some breaks are not newline-terminated from
//! their value.

use std::collections::VecDeque;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::error::NoteLineError;
use crate::logging::Log;

static NOTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(:|\*|F|R|G):? +(-?\d+) +(\d+) +(-?\d+)(?: (.*))?$").unwrap());
static LINE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^- *(-?\d+) *(-?\d+)? *(.+)?$").unwrap());

/// Scoring category of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NoteKind {
    Regular,
    Golden,
    Freestyle,
    Rap,
    GoldenRap,
}

impl NoteKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            ":" => Some(Self::Regular),
            "*" => Some(Self::Golden),
            "F" => Some(Self::Freestyle),
            "R" => Some(Self::Rap),
            "G" => Some(Self::GoldenRap),
            _ => None,
        }
    }

    pub fn tag(self) -> char {
        match self {
            Self::Regular => ':',
            Self::Golden => '*',
            Self::Freestyle => 'F',
            Self::Rap => 'R',
            Self::GoldenRap => 'G',
        }
    }
}

/// A single note with its timing, pitch and syllable text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
    pub kind: NoteKind,
    pub start: i32,
    pub duration: i32,
    pub pitch: i32,
    pub text: String,
}

impl Note {
    pub fn parse(value: &str, log: &dyn Log) -> Result<Note, NoteLineError> {
        let invalid = || NoteLineError::InvalidNote(value.to_owned());
        let caps = NOTE_RE.captures(value).ok_or_else(|| invalid())?;
        let kind = NoteKind::from_tag(&caps[1]).ok_or_else(|| invalid())?;
        let start: i32 = caps[2].parse().map_err(|_| invalid())?;
        let duration: i32 = caps[3].parse().map_err(|_| invalid())?;
        let pitch: i32 = caps[4].parse().map_err(|_| invalid())?;
        let mut text = caps
            .get(5)
            .map(|m| m.as_str().to_owned())
            .unwrap_or_default();
        // non-freestyle notes must carry visible text; '~' marks a sustained sound
        if kind != NoteKind::Freestyle && text.trim().is_empty() {
            text = format!("~{text}");
        }
        if duration == 0 {
            log.warn(&format!("zero-length note: '{value}'"));
        }
        if text.trim() == "-" {
            text = text.replace('-', "~");
        }
        Ok(Note {
            kind,
            start,
            duration,
            pitch,
            text,
        })
    }

    /// Start beat + duration (NOT last beat of the note).
    pub fn end(&self) -> i32 {
        self.start + self.duration
    }

    /// Shift note start and shorten duration accordingly.
    pub fn shift_start(&mut self, beats: i32) {
        self.start += beats;
        self.duration = (self.duration - beats).max(1);
    }

    pub fn shorten(&mut self, beats: i32) {
        self.duration = (self.duration - beats).max(1);
    }

    pub fn left_trim_text(&mut self) {
        self.text = self.text.trim_start().to_owned();
    }

    /// Ensure the note ends with a single space.
    pub fn right_trim_text_and_add_space(&mut self) {
        self.text = format!("{} ", self.text.trim_end());
    }

    /// Number of empty beats between this note and `other`.
    pub fn gap(&self, other: &Note) -> i32 {
        other.start - self.end()
    }

    /// Swap start and duration of two notes, leaving text and pitch in place.
    pub fn swap_timings(&mut self, other: &mut Note) {
        std::mem::swap(&mut self.start, &mut other.start);
        std::mem::swap(&mut self.duration, &mut other.duration);
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.kind.tag(),
            self.start,
            self.duration,
            self.pitch,
            self.text
        )
    }
}

/// Beat timing of the gap between two lines, with a single value or an
/// additional in-time for the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LineBreak {
    pub previous_line_out_time: i32,
    pub next_line_in_time: Option<i32>,
}

impl LineBreak {
    /// Some line breaks aren't terminated by a newline. If this is the case,
    /// the rest of the line is returned for re-parsing.
    pub fn parse(value: &str) -> Result<(LineBreak, Option<&str>), NoteLineError> {
        let invalid = || NoteLineError::InvalidLineBreak(value.to_owned());
        let caps = LINE_BREAK_RE.captures(value).ok_or_else(|| invalid())?;
        let previous_line_out_time: i32 = caps[1].parse().map_err(|_| invalid())?;
        let next_line_in_time = match caps.get(2) {
            Some(m) => Some(m.as_str().parse().map_err(|_| invalid())?),
            None => None,
        };
        let rest = caps.get(3).map(|m| m.as_str());
        Ok((
            LineBreak {
                previous_line_out_time,
                next_line_in_time,
            },
            rest,
        ))
    }

    pub fn shift(&mut self, offset: i32) {
        self.previous_line_out_time += offset;
        if let Some(next_line_in_time) = self.next_line_in_time.as_mut() {
            *next_line_in_time += offset;
        }
    }

    pub fn multiply(&mut self, factor: i32) {
        self.previous_line_out_time *= factor;
        if let Some(next_line_in_time) = self.next_line_in_time.as_mut() {
            *next_line_in_time *= factor;
        }
    }
}

impl fmt::Display for LineBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.next_line_in_time {
            Some(next_line_in_time) => {
                write!(f, "- {} {next_line_in_time}", self.previous_line_out_time)
            }
            None => write!(f, "- {}", self.previous_line_out_time),
        }
    }
}

/// A run of notes sung without interruption, ended by a line break or a
/// track terminator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Line {
    pub notes: Vec<Note>,
    /// Break to the next line; `None` if this is the last line of a track.
    pub line_break: Option<LineBreak>,
}

impl Line {
    /// Consumes a stream of notes until a line or document terminator.
    pub fn parse<'a>(lines: &mut VecDeque<&'a str>, log: &dyn Log) -> Line {
        let mut notes = Vec::new();
        let mut line_break = None;
        let mut terminated = false;
        while let Some(raw_line) = lines.pop_front() {
            let txt_line = raw_line.trim_start();
            if matches!(txt_line.trim_end(), "E" | "P2") {
                terminated = true;
                break;
            }
            if txt_line.starts_with('-') {
                match LineBreak::parse(txt_line) {
                    Ok((parsed_break, rest)) => {
                        line_break = Some(parsed_break);
                        if let Some(rest) = rest {
                            lines.push_front(rest);
                        }
                        terminated = true;
                        break;
                    }
                    Err(err) => {
                        log.warn(&err.to_string());
                        continue;
                    }
                }
            }
            match Note::parse(txt_line, log) {
                Ok(note) => notes.push(note),
                Err(err) => log.warn(&err.to_string()),
            }
        }
        if !terminated {
            log.warn("unterminated line");
        }
        Line { notes, line_break }
    }

    /// True if this line is the last line of its track.
    pub fn is_last(&self) -> bool {
        self.line_break.is_none()
    }

    pub fn start(&self) -> i32 {
        self.notes[0].start
    }

    pub fn end(&self) -> i32 {
        self.notes[self.notes.len() - 1].end()
    }

    pub fn shift(&mut self, offset: i32) {
        for note in &mut self.notes {
            note.start += offset;
        }
        if let Some(line_break) = self.line_break.as_mut() {
            line_break.shift(offset);
        }
    }

    pub fn multiply(&mut self, factor: i32) {
        for note in &mut self.notes {
            note.start *= factor;
            note.duration *= factor;
        }
        if let Some(line_break) = self.line_break.as_mut() {
            line_break.multiply(factor);
        }
    }

    /// Lyric text of the line, with sustain markers removed.
    pub fn text(&self) -> String {
        self.notes
            .iter()
            .map(|note| note.text.replace('~', ""))
            .collect()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let notes: Vec<String> = self.notes.iter().map(Note::to_string).collect();
        write!(f, "{}", notes.join("\n"))?;
        if let Some(line_break) = &self.line_break {
            write!(f, "\n{line_break}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;

    fn parse_note(value: &str) -> Result<Note, NoteLineError> {
        Note::parse(value, &MemoryLog::new())
    }

    #[test]
    fn test_parse_regular_note() {
        let note = parse_note(": 10 4 7 hello").unwrap();
        assert_eq!(note.kind, NoteKind::Regular);
        assert_eq!(note.start, 10);
        assert_eq!(note.duration, 4);
        assert_eq!(note.pitch, 7);
        assert_eq!(note.text, "hello");
    }

    #[test]
    fn test_parse_all_note_kinds() {
        assert_eq!(parse_note("* 0 1 0 a").unwrap().kind, NoteKind::Golden);
        assert_eq!(parse_note("F 0 1 0 a").unwrap().kind, NoteKind::Freestyle);
        assert_eq!(parse_note("R 0 1 0 a").unwrap().kind, NoteKind::Rap);
        assert_eq!(parse_note("G 0 1 0 a").unwrap().kind, NoteKind::GoldenRap);
    }

    #[test]
    fn test_parse_note_with_stray_colon() {
        let note = parse_note(":: 10 4 7 hello").unwrap();
        assert_eq!(note.kind, NoteKind::Regular);
    }

    #[test]
    fn test_parse_note_negative_start_and_pitch() {
        let note = parse_note(": -5 4 -12 low").unwrap();
        assert_eq!(note.start, -5);
        assert_eq!(note.pitch, -12);
    }

    #[test]
    fn test_parse_note_without_text_gets_filler() {
        let note = parse_note(": 10 4 7").unwrap();
        assert_eq!(note.text, "~");
    }

    #[test]
    fn test_parse_note_whitespace_text_gets_filler() {
        let note = parse_note(": 10 4 7  ").unwrap();
        assert_eq!(note.text, "~ ");
    }

    #[test]
    fn test_parse_freestyle_may_be_textless() {
        let note = parse_note("F 10 4 7").unwrap();
        assert_eq!(note.text, "");
    }

    #[test]
    fn test_parse_dash_text_becomes_sustain_marker() {
        let note = parse_note(": 10 4 7 -").unwrap();
        assert_eq!(note.text, "~");
    }

    #[test]
    fn test_parse_note_non_numeric_start_fails() {
        assert_eq!(
            parse_note(": abc 1 0 text").unwrap_err(),
            NoteLineError::InvalidNote(": abc 1 0 text".to_owned())
        );
    }

    #[test]
    fn test_parse_note_negative_duration_fails() {
        assert!(parse_note(": 1 -1 0 text").is_err());
    }

    #[test]
    fn test_zero_length_note_warns() {
        let log = MemoryLog::new();
        Note::parse(": 10 0 7 hey", &log).unwrap();
        assert_eq!(log.messages_at("warn"), ["zero-length note: ': 10 0 7 hey'"]);
    }

    #[test]
    fn test_note_display() {
        assert_eq!(parse_note(": 10 4 7 hello").unwrap().to_string(), ": 10 4 7 hello");
        assert_eq!(parse_note("* 2 1 -3 Go").unwrap().to_string(), "* 2 1 -3 Go");
    }

    #[test]
    fn test_swap_timings_leaves_text_and_pitch() {
        let mut first = parse_note(": 10 4 7 one").unwrap();
        let mut second = parse_note(": 2 1 3 two").unwrap();
        first.swap_timings(&mut second);
        assert_eq!((first.start, first.duration, first.pitch), (2, 1, 7));
        assert_eq!((second.start, second.duration, second.pitch), (10, 4, 3));
        assert_eq!(first.text, "one");
        assert_eq!(second.text, "two");
    }

    #[test]
    fn test_parse_line_break_single_value() {
        let (line_break, rest) = LineBreak::parse("- 16").unwrap();
        assert_eq!(line_break.previous_line_out_time, 16);
        assert_eq!(line_break.next_line_in_time, None);
        assert_eq!(rest, None);
    }

    #[test]
    fn test_parse_line_break_two_values() {
        let (line_break, rest) = LineBreak::parse("- 10 12").unwrap();
        assert_eq!(line_break.previous_line_out_time, 10);
        assert_eq!(line_break.next_line_in_time, Some(12));
        assert_eq!(rest, None);
    }

    #[test]
    fn test_parse_line_break_with_trailing_text() {
        let (line_break, rest) = LineBreak::parse("- 16 : 20 2 5 next").unwrap();
        assert_eq!(line_break.previous_line_out_time, 16);
        assert_eq!(line_break.next_line_in_time, None);
        assert_eq!(rest, Some(": 20 2 5 next"));
    }

    #[test]
    fn test_parse_line_break_invalid() {
        assert!(LineBreak::parse("- x").is_err());
    }

    #[test]
    fn test_line_break_display() {
        let (with_end, _) = LineBreak::parse("- 10 12").unwrap();
        assert_eq!(with_end.to_string(), "- 10 12");
        let (without_end, _) = LineBreak::parse("- 16").unwrap();
        assert_eq!(without_end.to_string(), "- 16");
    }

    #[test]
    fn test_parse_line_until_break() {
        let mut lines: VecDeque<&str> = vec![": 0 2 0 Hi ", ": 4 2 0 there", "- 8", ": 10 2 0 next"].into();
        let line = Line::parse(&mut lines, &MemoryLog::new());
        assert_eq!(line.notes.len(), 2);
        assert_eq!(line.line_break.map(|b| b.previous_line_out_time), Some(8));
        // the next line is still queued
        assert_eq!(lines.len(), 1);
    }

    #[test]
    fn test_parse_line_requeues_break_trailing_text() {
        let mut lines: VecDeque<&str> = vec![": 0 2 0 Hi", "- 8 : 10 2 0 next"].into();
        let first = Line::parse(&mut lines, &MemoryLog::new());
        assert_eq!(first.notes.len(), 1);
        let second = Line::parse(&mut lines, &MemoryLog::new());
        assert_eq!(second.notes.len(), 1);
        assert_eq!(second.notes[0].start, 10);
        assert_eq!(second.notes[0].text, "next");
    }

    #[test]
    fn test_parse_line_drops_malformed_note() {
        let mut lines: VecDeque<&str> = vec![": 0 2 0 Hi", ": abc 1 0 text", ": 4 2 0 there", "E"].into();
        let log = MemoryLog::new();
        let line = Line::parse(&mut lines, &log);
        assert_eq!(line.notes.len(), 2);
        assert_eq!(log.messages_at("warn"), ["invalid note: ': abc 1 0 text'"]);
    }

    #[test]
    fn test_parse_line_warns_when_unterminated() {
        let mut lines: VecDeque<&str> = vec![": 0 2 0 Hi"].into();
        let log = MemoryLog::new();
        let line = Line::parse(&mut lines, &log);
        assert_eq!(line.notes.len(), 1);
        assert!(line.is_last());
        assert_eq!(log.messages_at("warn"), ["unterminated line"]);
    }

    #[test]
    fn test_line_text_strips_sustain_markers() {
        let mut lines: VecDeque<&str> = vec![": 0 2 0 So", ": 2 2 0 ~", ": 4 2 0  long", "E"].into();
        let line = Line::parse(&mut lines, &MemoryLog::new());
        assert_eq!(line.text(), "So long");
    }
}
