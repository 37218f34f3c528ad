use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cue::parse_cue_file;

#[derive(Debug, Clone)]
pub(crate) struct AlbumPair {
    pub(crate) audio: PathBuf,
    pub(crate) cue: PathBuf,
}

pub(crate) struct ScanOutcome {
    pub(crate) pairs: Vec<AlbumPair>,
    pub(crate) warnings: Vec<String>,
}

/// Walks `root`, groups cue sheets by directory and resolves each to at most
/// one album-length audio file.
pub(crate) fn find_album_pairs(root: &Path) -> ScanOutcome {
    let mut warnings = Vec::new();
    let mut cues_by_dir: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warnings.push(format!("scan: {}", err));
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if !has_extension(path, "cue") {
            continue;
        }
        let dir = path.parent().unwrap_or(root).to_path_buf();
        cues_by_dir.entry(dir).or_default().push(path.to_path_buf());
    }

    let mut pairs = Vec::new();
    for (dir, cues) in cues_by_dir {
        let cue = select_cue(&dir, &cues, &mut warnings);
        if let Some(audio) = resolve_audio(&dir, &cue, &mut warnings) {
            pairs.push(AlbumPair { audio, cue });
        }
    }

    ScanOutcome { pairs, warnings }
}

// A directory normally holds one cue sheet. With several, prefer one named
// after the flac rip; otherwise the first in stable order.
fn select_cue(dir: &Path, cues: &[PathBuf], warnings: &mut Vec<String>) -> PathBuf {
    if cues.len() == 1 {
        return cues[0].clone();
    }

    let chosen = cues
        .iter()
        .find(|path| file_name_str(path).to_ascii_lowercase().contains("flac"))
        .unwrap_or(&cues[0])
        .clone();

    let discarded: Vec<String> = cues
        .iter()
        .filter(|path| **path != chosen)
        .map(|path| file_name_str(path).to_string())
        .collect();
    warnings.push(format!(
        "multiple cue files in {}: using {}, ignoring {}",
        dir.display(),
        file_name_str(&chosen),
        discarded.join(", ")
    ));

    chosen
}

fn resolve_audio(dir: &Path, cue: &Path, warnings: &mut Vec<String>) -> Option<PathBuf> {
    let candidates = audio_candidates(dir);

    if let Some(hit) = match_exact_stem(cue, &candidates) {
        return Some(hit);
    }

    // Parsing is only needed once the cheap stem match has failed.
    let referenced = match parse_cue_file(cue) {
        Ok(parsed) => parsed.and_then(|p| p.sheet.referenced_file),
        Err(err) => {
            warnings.push(err);
            None
        }
    };
    if let Some(hit) = match_referenced_file(dir, referenced.as_deref()) {
        return Some(hit);
    }

    if let Some(hit) = match_stem_containment(cue, &candidates) {
        return Some(hit);
    }

    warnings.push(format!(
        "no album audio file found for {}",
        cue.display()
    ));
    None
}

// Album-length flac files in the directory, already-split tracks excluded.
fn audio_candidates(dir: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    let Ok(read_dir) = fs::read_dir(dir) else {
        return candidates;
    };
    for entry in read_dir.flatten() {
        let path = entry.path();
        if !path.is_file() || !has_extension(&path, "flac") {
            continue;
        }
        if looks_like_track_file(file_name_str(&path)) {
            continue;
        }
        candidates.push(path);
    }
    candidates.sort();
    candidates
}

fn match_exact_stem(cue: &Path, candidates: &[PathBuf]) -> Option<PathBuf> {
    let cue_stem = file_stem_str(cue)?;
    candidates
        .iter()
        .find(|path| file_stem_str(path) == Some(cue_stem))
        .cloned()
}

fn match_referenced_file(dir: &Path, referenced: Option<&str>) -> Option<PathBuf> {
    let name = referenced?;
    if looks_like_track_file(name) {
        return None;
    }
    let path = dir.join(name);
    path.is_file().then_some(path)
}

// Last-resort heuristic: a candidate whose stem appears inside the cue
// filename. Order-dependent, so it runs after the stronger strategies.
fn match_stem_containment(cue: &Path, candidates: &[PathBuf]) -> Option<PathBuf> {
    let cue_name = file_name_str(cue).to_ascii_lowercase();
    candidates
        .iter()
        .find(|path| {
            file_stem_str(path)
                .is_some_and(|stem| cue_name.contains(&stem.to_ascii_lowercase()))
        })
        .cloned()
}

/// Filenames shaped like a single ripped track ("01 - Intro.flac",
/// "Track 05.flac"). These must never be picked as the source to split.
pub(crate) fn looks_like_track_file(name: &str) -> bool {
    let digits = name.chars().take_while(|c| c.is_ascii_digit()).count();
    if (1..=2).contains(&digits) {
        let rest = name[digits..].trim_start_matches(' ');
        let skipped_space = rest.len() != name.len() - digits;
        if let Some(ch) = rest.chars().next() {
            if ch == '.' || ch == '-' {
                return true;
            }
            if skipped_space && ch.is_alphanumeric() {
                return true;
            }
        }
    }

    let lower = name.to_ascii_lowercase();
    if let Some(rest) = lower.strip_prefix("track") {
        let rest = rest.trim_start_matches(' ');
        if rest.chars().next().is_some_and(|c| c.is_ascii_digit()) {
            return true;
        }
    }

    false
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted))
}

fn file_name_str(path: &Path) -> &str {
    path.file_name().and_then(|name| name.to_str()).unwrap_or("")
}

fn file_stem_str(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}
