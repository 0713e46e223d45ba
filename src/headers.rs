//! # Header block parsing and serialization
//!
//! The leading `#KEY:VALUE` lines of a txt file map to typed fields on
//! [`Headers`]. Parsing is tolerant: lines without a colon are reported and
//! skipped, empty values are silently dropped, and bad numeric values only
//! discard that one header. Only missing `#TITLE`, `#ARTIST` or `#BPM` fail
//! the whole file.
//!
//! Unknown keys are kept in insertion order so locally added headers survive
//! a rewrite. Serialization emits known headers in one canonical order,
//! followed by the unknown keys.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::bpm::BeatsPerMinute;
use crate::error::TxtParseError;
use crate::languages::LANGUAGE_TRANSLATIONS;
use crate::logging::Log;
use crate::text::replace_false_apostrophes;

/// Typed headers of an UltraStar txt file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Headers {
    /// Headers with keys this crate does not know, in insertion order.
    pub unknown: Vec<(String, String)>,
    pub title: String,
    pub artist: String,
    pub bpm: BeatsPerMinute,
    /// Milliseconds between audio start and beat zero.
    pub gap: i64,
    pub version: Option<String>,
    pub language: Option<String>,
    pub edition: Option<String>,
    pub genre: Option<String>,
    pub album: Option<String>,
    pub year: Option<String>,
    pub creator: Option<String>,
    pub mp3: Option<String>,
    pub audio: Option<String>,
    pub audiourl: Option<String>,
    pub vocals: Option<String>,
    pub instrumental: Option<String>,
    pub cover: Option<String>,
    pub coverurl: Option<String>,
    pub background: Option<String>,
    pub backgroundurl: Option<String>,
    pub video: Option<String>,
    pub videourl: Option<String>,
    pub videogap: Option<f64>,
    pub start: Option<f64>,
    pub end: Option<i64>,
    pub previewstart: Option<f64>,
    pub relative: Option<String>,
    pub p1: Option<String>,
    pub p2: Option<String>,
    pub medleystartbeat: Option<i32>,
    pub medleyendbeat: Option<i32>,
    /// Not rewritten, as it depends on the chosen encoding.
    pub encoding: Option<String>,
    pub comment: Option<String>,
    pub providedby: Option<String>,
    pub resolution: Option<String>,
    pub tags: Option<String>,
}

#[derive(Default)]
struct RequiredSeen {
    title: bool,
    artist: bool,
    bpm: bool,
}

struct InvalidValue;

impl Headers {
    /// Consumes lines from the front of the deque while they are headers.
    pub fn parse(lines: &mut VecDeque<&str>, log: &dyn Log) -> Result<Headers, TxtParseError> {
        let mut headers = Headers::default();
        let mut seen = RequiredSeen::default();
        while lines.front().is_some_and(|line| line.starts_with('#')) {
            let Some(line) = lines.pop_front() else {
                break;
            };
            let line = &line[1..];
            let Some((key, value)) = line.split_once(':') else {
                log.warn(&format!("header without value: '{line}'"));
                continue;
            };
            if value.is_empty() {
                continue;
            }
            if set_header_value(&mut headers, &mut seen, key, value).is_err() {
                log.warn(&format!("invalid header value: '{line}'"));
            }
        }
        if !(seen.title && seen.artist && seen.bpm) {
            return Err(TxtParseError::MissingRequiredHeaders);
        }
        Ok(headers)
    }

    pub fn artist_title_str(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }

    /// Clear all tags with local file locations.
    pub fn reset_file_location_headers(&mut self) {
        self.mp3 = None;
        self.audio = None;
        self.vocals = None;
        self.instrumental = None;
        self.video = None;
        self.cover = None;
        self.background = None;
    }

    pub fn fix_apostrophes_and_quotation_marks(&mut self, log: &dyn Log) {
        let mut fixed = false;
        let mut fix_value = |value: &mut String| {
            let corrected = replace_false_apostrophes(value);
            if *value != corrected {
                *value = corrected;
                fixed = true;
            }
        };
        fix_value(&mut self.artist);
        fix_value(&mut self.title);
        for field in [
            &mut self.language,
            &mut self.genre,
            &mut self.p1,
            &mut self.p2,
            &mut self.album,
        ] {
            if let Some(value) = field {
                fix_value(value);
            }
        }
        if fixed {
            log.debug("FIX: Apostrophes in song header corrected.");
        }
    }

    pub fn apply_to_medley_tags(&mut self, func: impl Fn(i32) -> i32) {
        if let Some(beat) = self.medleystartbeat {
            if beat != 0 {
                self.medleystartbeat = Some(func(beat));
            }
        }
        if let Some(beat) = self.medleyendbeat {
            if beat != 0 {
                self.medleyendbeat = Some(func(beat));
            }
        }
    }

    /// Splits `#LANGUAGE` on `;`, `/`, `|` and `,`, canonicalizes each entry
    /// and rejoins with `", "`.
    pub fn fix_language(&mut self, log: &dyn Log) {
        let Some(old_language) = self.language.clone() else {
            log.debug("No #LANGUAGE tag found. Consider adding it.");
            return;
        };
        let languages: Vec<&str> = old_language
            .split([';', '/', '|', ','])
            .map(str::trim)
            .map(|language| {
                LANGUAGE_TRANSLATIONS
                    .get(language.to_lowercase().as_str())
                    .copied()
                    .unwrap_or(language)
            })
            .collect();
        let language = languages.join(", ");
        if old_language != language {
            log.debug(&format!("FIX: Language corrected to {language}."));
        }
        self.language = Some(language);
    }
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out: Vec<String> = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                out.push(format!("#{}:{value}", key.to_uppercase()));
            }
        };
        push("version", self.version.clone());
        push("title", Some(self.title.clone()));
        push("artist", Some(self.artist.clone()));
        push("language", self.language.clone());
        push("edition", self.edition.clone());
        push("genre", self.genre.clone());
        push("year", self.year.clone());
        push("creator", self.creator.clone());
        push("mp3", self.mp3.clone());
        push("audio", self.audio.clone());
        push("audiourl", self.audiourl.clone());
        push("vocals", self.vocals.clone());
        push("instrumental", self.instrumental.clone());
        push("cover", self.cover.clone());
        push("coverurl", self.coverurl.clone());
        push("background", self.background.clone());
        push("backgroundurl", self.backgroundurl.clone());
        push("video", self.video.clone());
        push("videourl", self.videourl.clone());
        push("videogap", self.videogap.map(format_float));
        push("resolution", self.resolution.clone());
        push("start", self.start.map(format_float));
        push("end", self.end.map(|value| value.to_string()));
        push("relative", self.relative.clone());
        push("previewstart", self.previewstart.map(format_float));
        push("medleystartbeat", self.medleystartbeat.map(|b| b.to_string()));
        push("medleyendbeat", self.medleyendbeat.map(|b| b.to_string()));
        push("bpm", Some(self.bpm.to_string()));
        push("gap", Some(self.gap.to_string()));
        push("p1", self.p1.clone());
        push("p2", self.p2.clone());
        push("album", self.album.clone());
        push("comment", self.comment.clone());
        push("providedby", self.providedby.clone());
        push("tags", self.tags.clone());
        for (key, value) in &self.unknown {
            out.push(format!("#{}:{value}", key.to_uppercase()));
        }
        write!(f, "{}", out.join("\n"))
    }
}

/// Formats a float the way the txt format expects, always keeping a decimal
/// point (`10.0`, not `10`).
fn format_float(value: f64) -> String {
    format!("{value:?}")
}

fn parse_float(value: &str) -> Result<f64, InvalidValue> {
    value.replace(',', ".").parse().map_err(|_| InvalidValue)
}

fn set_header_value(
    headers: &mut Headers,
    seen: &mut RequiredSeen,
    key: &str,
    value: &str,
) -> Result<(), InvalidValue> {
    // only the verbatim AUTHOR key is an alias; #author is just unknown
    let key = if key == "AUTHOR" {
        "creator".to_owned()
    } else {
        key.to_lowercase()
    };
    match key.as_str() {
        "title" => {
            headers.title = value.strip_suffix(" [DUET]").unwrap_or(value).to_owned();
            seen.title = true;
        }
        "artist" => {
            headers.artist = value.to_owned();
            seen.artist = true;
        }
        "bpm" => {
            headers.bpm = BeatsPerMinute::parse(value).map_err(|_| InvalidValue)?;
            seen.bpm = true;
        }
        "version" => headers.version = Some(value.to_owned()),
        "language" => headers.language = Some(value.to_owned()),
        "edition" => headers.edition = Some(value.to_owned()),
        "genre" => headers.genre = Some(value.to_owned()),
        "album" => headers.album = Some(value.to_owned()),
        "year" => headers.year = Some(value.to_owned()),
        "creator" => headers.creator = Some(value.to_owned()),
        "mp3" => headers.mp3 = Some(value.to_owned()),
        "audio" => headers.audio = Some(value.to_owned()),
        "audiourl" => headers.audiourl = Some(value.to_owned()),
        "vocals" => headers.vocals = Some(value.to_owned()),
        "instrumental" => headers.instrumental = Some(value.to_owned()),
        "cover" => headers.cover = Some(value.to_owned()),
        "coverurl" => headers.coverurl = Some(value.to_owned()),
        "background" => headers.background = Some(value.to_owned()),
        "backgroundurl" => headers.backgroundurl = Some(value.to_owned()),
        "video" => headers.video = Some(value.to_owned()),
        "videourl" => headers.videourl = Some(value.to_owned()),
        "relative" => headers.relative = Some(value.to_owned()),
        "p1" => headers.p1 = Some(value.to_owned()),
        "p2" => headers.p2 = Some(value.to_owned()),
        "encoding" => headers.encoding = Some(value.to_owned()),
        "comment" => headers.comment = Some(value.to_owned()),
        "providedby" => headers.providedby = Some(value.to_owned()),
        "resolution" => headers.resolution = Some(value.to_owned()),
        "tags" => headers.tags = Some(value.to_owned()),
        // given in (fractional) seconds, with a decimal comma or point
        "videogap" | "start" | "previewstart" => {
            let parsed = parse_float(value)?;
            if parsed != 0.0 {
                match key.as_str() {
                    "videogap" => headers.videogap = Some(parsed),
                    "start" => headers.start = Some(parsed),
                    _ => headers.previewstart = Some(parsed),
                }
            }
        }
        // given in milliseconds, but may carry a decimal separator upstream
        "gap" => headers.gap = parse_float(value)?.round_ties_even() as i64,
        "end" => headers.end = Some(parse_float(value)?.round_ties_even() as i64),
        // given in beats, so integers
        "medleystartbeat" => {
            headers.medleystartbeat = Some(value.parse().map_err(|_| InvalidValue)?)
        }
        "medleyendbeat" => headers.medleyendbeat = Some(value.parse().map_err(|_| InvalidValue)?),
        _ => push_unknown(&mut headers.unknown, &key, value),
    }
    Ok(())
}

fn push_unknown(unknown: &mut Vec<(String, String)>, key: &str, value: &str) {
    if let Some(entry) = unknown.iter_mut().find(|(existing, _)| existing == key) {
        entry.1 = value.to_owned();
    } else {
        unknown.push((key.to_owned(), value.to_owned()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::MemoryLog;

    fn parse_headers(text: &str) -> Result<Headers, TxtParseError> {
        let mut lines: VecDeque<&str> = text.lines().filter(|line| !line.is_empty()).collect();
        Headers::parse(&mut lines, &MemoryLog::new())
    }

    #[test]
    fn test_parse_minimal_headers() {
        let headers = parse_headers("#TITLE:title\n#ARTIST:artist\n#BPM:250").unwrap();
        assert_eq!(headers.title, "title");
        assert_eq!(headers.artist, "artist");
        assert_eq!(headers.bpm.value(), 250.0);
        assert_eq!(headers.gap, 0);
    }

    #[test]
    fn test_parse_missing_required_header_fails() {
        let result = parse_headers("#TITLE:title\n#BPM:250");
        assert_eq!(result.unwrap_err(), TxtParseError::MissingRequiredHeaders);
    }

    #[test]
    fn test_parse_author_alias() {
        let headers =
            parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#AUTHOR:someone").unwrap();
        assert_eq!(headers.creator.as_deref(), Some("someone"));
    }

    #[test]
    fn test_parse_lowercase_author_is_not_aliased() {
        let headers =
            parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#author:someone").unwrap();
        assert_eq!(headers.creator, None);
        assert_eq!(
            headers.unknown,
            vec![("author".to_owned(), "someone".to_owned())]
        );
    }

    #[test]
    fn test_parse_strips_duet_suffix_from_title() {
        let headers = parse_headers("#TITLE:Islands In The Stream [DUET]\n#ARTIST:a\n#BPM:250")
            .unwrap();
        assert_eq!(headers.title, "Islands In The Stream");
    }

    #[test]
    fn test_parse_gap_with_decimal_comma() {
        let headers = parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#GAP:104,5").unwrap();
        assert_eq!(headers.gap, 104);
    }

    #[test]
    fn test_parse_zero_videogap_dropped() {
        let headers = parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#VIDEOGAP:0.0").unwrap();
        assert_eq!(headers.videogap, None);
    }

    #[test]
    fn test_parse_skips_empty_values() {
        let headers = parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#LANGUAGE:").unwrap();
        assert_eq!(headers.language, None);
    }

    #[test]
    fn test_parse_warns_on_header_without_colon() {
        let mut lines: VecDeque<&str> =
            vec!["#TITLE:t", "#NOCOLON", "#ARTIST:a", "#BPM:250"].into();
        let log = MemoryLog::new();
        let headers = Headers::parse(&mut lines, &log).unwrap();
        assert_eq!(headers.title, "t");
        assert_eq!(log.messages_at("warn"), ["header without value: 'NOCOLON'"]);
    }

    #[test]
    fn test_parse_warns_on_invalid_numeric_value() {
        let mut lines: VecDeque<&str> =
            vec!["#TITLE:t", "#ARTIST:a", "#BPM:250", "#MEDLEYSTARTBEAT:abc"].into();
        let log = MemoryLog::new();
        let headers = Headers::parse(&mut lines, &log).unwrap();
        assert_eq!(headers.medleystartbeat, None);
        assert_eq!(
            log.messages_at("warn"),
            ["invalid header value: 'MEDLEYSTARTBEAT:abc'"]
        );
    }

    #[test]
    fn test_unknown_headers_preserved_in_order() {
        let headers =
            parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#ZZZ:1\n#AAA:2").unwrap();
        assert_eq!(
            headers.unknown,
            vec![("zzz".to_owned(), "1".to_owned()), ("aaa".to_owned(), "2".to_owned())]
        );
        let serialized = headers.to_string();
        assert!(serialized.ends_with("#ZZZ:1\n#AAA:2"));
    }

    #[test]
    fn test_repeated_unknown_header_overwrites() {
        let headers = parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#ZZZ:1\n#ZZZ:2").unwrap();
        assert_eq!(headers.unknown, vec![("zzz".to_owned(), "2".to_owned())]);
    }

    #[test]
    fn test_serialization_canonical_order() {
        let headers = parse_headers(
            "#GAP:1000\n#BPM:250\n#ARTIST:artist\n#TITLE:title\n#LANGUAGE:English",
        )
        .unwrap();
        assert_eq!(
            headers.to_string(),
            "#TITLE:title\n#ARTIST:artist\n#LANGUAGE:English\n#BPM:250\n#GAP:1000"
        );
    }

    #[test]
    fn test_serialization_keeps_float_point() {
        let headers =
            parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#VIDEOGAP:2,0").unwrap();
        assert!(headers.to_string().contains("#VIDEOGAP:2.0"));
    }

    #[test]
    fn test_reset_file_location_headers() {
        let mut headers = parse_headers(
            "#TITLE:t\n#ARTIST:a\n#BPM:250\n#MP3:a.mp3\n#VIDEO:a.mp4\n#COVER:a.jpg\n#COVERURL:http://x",
        )
        .unwrap();
        headers.reset_file_location_headers();
        assert_eq!(headers.mp3, None);
        assert_eq!(headers.video, None);
        assert_eq!(headers.cover, None);
        // remote locations survive
        assert_eq!(headers.coverurl.as_deref(), Some("http://x"));
    }

    #[test]
    fn test_fix_language_canonicalizes_and_joins() {
        let mut headers =
            parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#LANGUAGE:englisch; deutsch/french")
                .unwrap();
        headers.fix_language(&MemoryLog::new());
        assert_eq!(headers.language.as_deref(), Some("English, German, French"));
    }

    #[test]
    fn test_fix_language_keeps_unknown_entries() {
        let mut headers =
            parse_headers("#TITLE:t\n#ARTIST:a\n#BPM:250\n#LANGUAGE:Klingon").unwrap();
        headers.fix_language(&MemoryLog::new());
        assert_eq!(headers.language.as_deref(), Some("Klingon"));
    }

    #[test]
    fn test_fix_apostrophes_in_headers() {
        let mut headers =
            parse_headers("#TITLE:Don`t Stop\n#ARTIST:O'Brien\n#BPM:250").unwrap();
        headers.fix_apostrophes_and_quotation_marks(&MemoryLog::new());
        assert_eq!(headers.title, "Don’t Stop");
        assert_eq!(headers.artist, "O’Brien");
    }
}
