use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::path::Path;

use crate::Result;
use crate::cli::display_path;
use crate::split::{Album, SplitOutcome};
use crate::track::{CueSheet, Track};

pub(crate) fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{}", warning.yellow());
    }
}

pub(crate) fn print_header(base: &Path, total: usize, done: usize, pending: usize, execute: bool) {
    let base_name = base
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| base.display().to_string());

    println!();
    println!(
        "{} in {}",
        format!("Found {} album(s)", total).bold(),
        format!("{}/", base_name).blue()
    );
    if done > 0 && !execute {
        println!(
            "{}, {}",
            format!("{} already split", done).green(),
            format!("{} pending", pending).yellow()
        );
    }
    println!();
}

pub(crate) fn print_unparseable(index: usize, album: &Album, base: &Path) {
    let folder = album_folder(album, base);
    println!("{} {}", format!("{:2}.", index).dimmed(), format!("{}/", folder).blue());
    println!(
        "    {}",
        format!(
            "Could not parse {}, skipping",
            display_path(Some(base), &album.cue).display()
        )
        .red()
        .bold()
    );
}

pub(crate) fn print_album(
    index: usize,
    album: &Album,
    sheet: &CueSheet,
    base: &Path,
    verbose: bool,
    execute: bool,
) {
    let title = if sheet.album_title.is_empty() {
        "(unknown album)"
    } else {
        sheet.album_title.as_str()
    };
    let artist = if sheet.album_performer.is_empty() {
        "(unknown artist)"
    } else {
        sheet.album_performer.as_str()
    };
    let folder = album_folder(album, base);
    let duration = format_album_duration(&sheet.tracks);
    let track_count = sheet.tracks.len();

    if album.already_split && !execute {
        println!("{}", format!("{:2}. {}", index, title).green());
        println!(
            "    {}",
            format!("{} | {} tracks | ~{}", artist, track_count, duration).green()
        );
        println!("    {}", format!("{}/", folder).green());
    } else {
        println!("{} {}", format!("{:2}.", index).dimmed(), title.cyan().bold());
        println!(
            "    {} {} {} tracks {} ~{}",
            artist.dimmed(),
            "|".dimmed(),
            track_count,
            "|".dimmed(),
            duration
        );
        println!("    {}", format!("{}/", folder).blue());
    }

    if let Some(encoding) = album.encoding
        && verbose
    {
        println!("    {}", format!("cue encoding: {}", encoding).dimmed());
    }

    if verbose {
        print_track_listing(sheet);
    }
}

fn print_track_listing(sheet: &CueSheet) {
    for (index, track) in sheet.tracks.iter().enumerate() {
        let length = match sheet.track_duration(index, None) {
            Some(duration) if duration >= 0.0 => format_track_duration(duration),
            _ => "?".to_string(),
        };
        println!(
            "        {} {} {}",
            format!("{:2}.", track.number).dimmed(),
            track.title,
            format!("| {} | {}", track.start, length).dimmed()
        );
    }
}

pub(crate) fn print_split_result(outcome: &SplitOutcome, track_count: usize) {
    if outcome.failed > 0 {
        println!(
            "    {} {}",
            format!("{} tracks", outcome.extracted).green(),
            format!("({} errors)", outcome.failed).red().bold()
        );
    } else {
        println!("    {}", format!("{} tracks extracted", track_count).green());
    }
}

fn album_folder(album: &Album, base: &Path) -> String {
    let dir = album.audio.parent().unwrap_or(base);
    display_path(Some(base), dir).display().to_string()
}

// Rough album length, estimated from the last track's start offset.
pub(crate) fn format_album_duration(tracks: &[Track]) -> String {
    let total = match tracks.last() {
        Some(track) => track.start_seconds() as u64,
        None => return "?".to_string(),
    };
    if total < 60 {
        return "?".to_string();
    }
    let (minutes, seconds) = (total / 60, total % 60);
    if minutes >= 60 {
        let (hours, minutes) = (minutes / 60, minutes % 60);
        return format!("{}h {}m {}s", hours, minutes, seconds);
    }
    format!("{}m {}s", minutes, seconds)
}

pub(crate) fn format_track_duration(seconds: f64) -> String {
    let total = seconds as u64;
    format!("{}m {}s", total / 60, total % 60)
}

pub(crate) fn make_progress_bar(total_tracks: u64) -> ProgressBar {
    let pb = ProgressBar::with_draw_target(
        Some(total_tracks),
        ProgressDrawTarget::stderr_with_hz(10),
    );
    let style = ProgressStyle::with_template(
        "    {spinner} {bar:20.cyan/blue} {pos}/{len} {msg}",
    )
    .unwrap()
    .progress_chars("=>-");
    pb.set_style(style);
    pb.set_message("splitting");
    pb
}

pub(crate) fn finish_progress(progress: ProgressBar) {
    progress.finish_and_clear();
}

pub(crate) fn confirm(prompt: &str, default: bool, yes: bool) -> Result<bool> {
    if yes {
        return Ok(default);
    }
    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|err| format!("failed to read confirmation: {}", err))
}

pub(crate) fn print_footer(pending: usize, execute: bool) {
    if execute {
        println!("{}", "Done.".green());
    } else if pending > 0 {
        println!(
            "{} Run with {} to split {} album(s).",
            "Dry run complete.".dimmed(),
            "--execute".bold(),
            pending
        );
    } else {
        println!("{}", "All albums already split.".green());
    }
}
