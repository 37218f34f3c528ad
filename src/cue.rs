use encoding_rs::{Encoding, SHIFT_JIS, UTF_8, WINDOWS_1252};
use std::fs;
use std::path::Path;

use crate::Result;
use crate::track::{CueSheet, CueTime, Track};

// Tried in order; the first strict decode wins. WINDOWS_1252 also covers the
// latin-1 label, which encoding_rs folds into the same decoder.
const ENCODING_FALLBACK: &[&Encoding] = &[UTF_8, WINDOWS_1252, SHIFT_JIS];

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub(crate) struct ParsedCue {
    pub(crate) sheet: CueSheet,
    pub(crate) encoding: &'static str,
}

/// Reads and parses a cue sheet. `Err` means the file could not be read or
/// decoded; `Ok(None)` means no audio tracks were recovered. Callers treat
/// both as "skip this sheet".
pub(crate) fn parse_cue_file(path: &Path) -> Result<Option<ParsedCue>> {
    let bytes = fs::read(path)
        .map_err(|err| format!("could not read cue file {}: {}", path.display(), err))?;
    let (text, encoding) = decode_cue_bytes(&bytes)
        .ok_or_else(|| format!("could not decode cue file {}", path.display()))?;
    Ok(parse_cue_text(&text).map(|sheet| ParsedCue {
        sheet,
        encoding: encoding.name(),
    }))
}

fn decode_cue_bytes(bytes: &[u8]) -> Option<(String, &'static Encoding)> {
    for &encoding in ENCODING_FALLBACK {
        let body = if encoding == UTF_8 {
            bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
        } else {
            bytes
        };
        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(body) {
            return Some((text.into_owned(), encoding));
        }
    }
    None
}

// Track context between a TRACK directive and the next one (or end of input).
// A context that never saw an INDEX 01 is dropped on finalization.
#[derive(Debug)]
struct PendingTrack {
    number: u32,
    title: Option<String>,
    performer: Option<String>,
    index: Option<CueTime>,
}

impl PendingTrack {
    fn new(number: u32) -> Self {
        Self {
            number,
            title: None,
            performer: None,
            index: None,
        }
    }

    fn finalize(self, album_performer: &str) -> Option<Track> {
        let start = self.index?;
        let title = match self.title {
            Some(title) if !title.is_empty() => title,
            _ => format!("Track {}", self.number),
        };
        let performer = match self.performer {
            Some(performer) if !performer.is_empty() => performer,
            _ => album_performer.to_string(),
        };
        Some(Track {
            number: self.number,
            title,
            performer,
            start,
        })
    }
}

pub(crate) fn parse_cue_text(text: &str) -> Option<CueSheet> {
    let mut album_title = String::new();
    let mut album_performer = String::new();
    let mut referenced_file: Option<String> = None;
    let mut tracks: Vec<Track> = Vec::new();
    let mut pending: Option<PendingTrack> = None;
    let mut seen_track = false;

    for raw in text.lines() {
        let line = raw.trim();

        if let Some(rest) = directive(line, "FILE") {
            // Single-FILE-sheet assumption: only the first FILE directive
            // before any TRACK is honored.
            if !seen_track
                && referenced_file.is_none()
                && let Some(name) = parse_file_directive(rest)
            {
                referenced_file = Some(name.to_string());
            }
            continue;
        }

        if let Some(rest) = directive(line, "TRACK") {
            if let Some(number) = parse_track_directive(rest) {
                if let Some(done) = pending.take().and_then(|t| t.finalize(&album_performer)) {
                    tracks.push(done);
                }
                pending = Some(PendingTrack::new(number));
                seen_track = true;
            }
            continue;
        }

        if let Some(rest) = directive(line, "TITLE") {
            if let Some(value) = quoted(rest) {
                match pending.as_mut() {
                    Some(track) => track.title = Some(value.to_string()),
                    None => album_title = value.to_string(),
                }
            }
            continue;
        }

        if let Some(rest) = directive(line, "PERFORMER") {
            if let Some(value) = quoted(rest) {
                match pending.as_mut() {
                    Some(track) => track.performer = Some(value.to_string()),
                    None => album_performer = value.to_string(),
                }
            }
            continue;
        }

        if let Some(rest) = directive(line, "INDEX")
            && let Some(track) = pending.as_mut()
            && let Some(time) = parse_index_directive(rest)
        {
            track.index = Some(time);
        }
    }

    if let Some(done) = pending.take().and_then(|t| t.finalize(&album_performer)) {
        tracks.push(done);
    }

    if tracks.is_empty() {
        return None;
    }

    Some(CueSheet {
        album_title,
        album_performer,
        referenced_file,
        tracks,
    })
}

fn directive<'a>(line: &'a str, keyword: &str) -> Option<&'a str> {
    let bytes = line.as_bytes();
    if bytes.len() <= keyword.len() {
        return None;
    }
    if !bytes[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes()) {
        return None;
    }
    if !bytes[keyword.len()].is_ascii_whitespace() {
        return None;
    }
    Some(line[keyword.len()..].trim_start())
}

// First quoted string on the line; embedded quotes are not supported.
fn quoted(rest: &str) -> Option<&str> {
    let open = rest.find('"')?;
    let tail = &rest[open + 1..];
    let close = tail.find('"')?;
    Some(&tail[..close])
}

// FILE "<name>" <type>
fn parse_file_directive(rest: &str) -> Option<&str> {
    let open = rest.find('"')?;
    let tail = &rest[open + 1..];
    let close = tail.find('"')?;
    let name = &tail[..close];
    if name.is_empty() || tail[close + 1..].trim().is_empty() {
        return None;
    }
    Some(name)
}

// TRACK <n> AUDIO
fn parse_track_directive(rest: &str) -> Option<u32> {
    let mut parts = rest.split_whitespace();
    let number = parts.next()?.parse().ok()?;
    let mode = parts.next()?;
    mode.eq_ignore_ascii_case("AUDIO").then_some(number)
}

// INDEX 01 <mm:ss:ff>; other index numbers are ignored.
fn parse_index_directive(rest: &str) -> Option<CueTime> {
    let mut parts = rest.split_whitespace();
    let number: u32 = parts.next()?.parse().ok()?;
    if number != 1 {
        return None;
    }
    CueTime::parse(parts.next()?)
}
