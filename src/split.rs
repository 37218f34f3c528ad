use indicatif::ProgressBar;
use std::fs;
use std::path::{Path, PathBuf};

use crate::Result;
use crate::cue::parse_cue_file;
use crate::ffmpeg::{self, ExtractRequest};
use crate::pair::AlbumPair;
use crate::track::CueSheet;

/// Per-album working state. Computed independently; nothing here depends on
/// other albums' outcomes.
pub(crate) struct Album {
    pub(crate) audio: PathBuf,
    pub(crate) cue: PathBuf,
    pub(crate) sheet: Option<CueSheet>,
    pub(crate) encoding: Option<&'static str>,
    pub(crate) output_dir: PathBuf,
    pub(crate) already_split: bool,
}

pub(crate) fn build_albums(
    pairs: Vec<AlbumPair>,
    base: &Path,
    output_root: Option<&Path>,
    warnings: &mut Vec<String>,
) -> Vec<Album> {
    pairs
        .into_iter()
        .map(|pair| {
            let (sheet, encoding) = match parse_cue_file(&pair.cue) {
                Ok(Some(parsed)) => (Some(parsed.sheet), Some(parsed.encoding)),
                Ok(None) => (None, None),
                Err(err) => {
                    warnings.push(err);
                    (None, None)
                }
            };

            let album_dir = pair.audio.parent().unwrap_or(base).to_path_buf();
            let output_dir = resolve_output_dir(&album_dir, base, output_root);
            let already_split = sheet
                .as_ref()
                .is_some_and(|sheet| is_already_split(sheet, &output_dir));

            Album {
                audio: pair.audio,
                cue: pair.cue,
                sheet,
                encoding,
                output_dir,
                already_split,
            }
        })
        .collect()
}

// Mirror the album's path under the output root; albums outside the scan base
// land in the root itself.
fn resolve_output_dir(album_dir: &Path, base: &Path, output_root: Option<&Path>) -> PathBuf {
    match output_root {
        Some(root) => match album_dir.strip_prefix(base) {
            Ok(rel) => root.join(rel),
            Err(_) => root.to_path_buf(),
        },
        None => album_dir.to_path_buf(),
    }
}

pub(crate) fn is_already_split(sheet: &CueSheet, output_dir: &Path) -> bool {
    if !output_dir.exists() {
        return false;
    }
    sheet
        .output_filenames()
        .all(|name| output_dir.join(name).exists())
}

#[derive(Debug, Default)]
pub(crate) struct SplitOutcome {
    pub(crate) extracted: usize,
    pub(crate) failed: usize,
    pub(crate) warnings: Vec<String>,
}

/// Extracts every track of the album sequentially. A failed track is counted
/// and does not abort the rest of the album.
pub(crate) fn split_album(
    album: &Album,
    sheet: &CueSheet,
    progress: &ProgressBar,
) -> Result<SplitOutcome> {
    fs::create_dir_all(&album.output_dir).map_err(|err| {
        format!(
            "failed to create output directory {}: {}",
            album.output_dir.display(),
            err
        )
    })?;

    let total_seconds = ffmpeg::probe_duration(&album.audio);
    let count = sheet.tracks.len();
    let mut outcome = SplitOutcome::default();

    for (index, track) in sheet.tracks.iter().enumerate() {
        let duration = match sheet.track_duration(index, total_seconds) {
            Some(duration) if duration < 0.0 => {
                outcome.warnings.push(format!(
                    "track {} has a negative length, splitting to end of input",
                    track.number
                ));
                None
            }
            other => other,
        };

        let output = album.output_dir.join(track.output_filename(count));
        let request = ExtractRequest {
            input: &album.audio,
            output: &output,
            start_seconds: track.start_seconds(),
            duration,
            title: &track.title,
            artist: &track.performer,
            album: &sheet.album_title,
            track_number: track.number,
            track_total: count,
        };

        match ffmpeg::extract_track(&request) {
            Ok(()) => outcome.extracted += 1,
            Err(err) => {
                outcome.failed += 1;
                outcome.warnings.push(err);
            }
        }
        progress.inc(1);
    }

    Ok(outcome)
}
