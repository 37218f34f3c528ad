use clap::Parser;
use owo_colors::OwoColorize;
use std::fs;

use crate::Result;
use crate::cli::Args;
use crate::ffmpeg;
use crate::pair::find_album_pairs;
use crate::split::{Album, build_albums, split_album};
use crate::ui;

pub fn run() -> Result<()> {
    let args = Args::parse();

    if !args.directory.exists() {
        return Err(format!(
            "directory does not exist: {}",
            args.directory.display()
        ));
    }
    if !args.directory.is_dir() {
        return Err(format!("not a directory: {}", args.directory.display()));
    }
    if !ffmpeg::ffmpeg_available() {
        return Err("ffmpeg is not installed or not in PATH".to_string());
    }

    let base = args
        .directory
        .canonicalize()
        .map_err(|err| format!("failed to resolve {}: {}", args.directory.display(), err))?;

    let scan = find_album_pairs(&base);
    ui::print_warnings(&scan.warnings);
    if scan.pairs.is_empty() {
        println!("No FLAC + CUE pairs found.");
        return Ok(());
    }

    let mut warnings = Vec::new();
    let albums = build_albums(scan.pairs, &base, args.output.as_deref(), &mut warnings);
    ui::print_warnings(&warnings);

    let done = albums.iter().filter(|album| album.already_split).count();
    let pending = albums.len() - done;
    ui::print_header(&base, albums.len(), done, pending, args.execute);

    for (index, album) in albums.iter().enumerate() {
        let Some(sheet) = album.sheet.as_ref() else {
            ui::print_unparseable(index + 1, album, &base);
            println!();
            continue;
        };

        ui::print_album(index + 1, album, sheet, &base, args.verbose, args.execute);

        let mut album_ok = true;
        if args.execute && !album.already_split {
            let progress = ui::make_progress_bar(sheet.tracks.len() as u64);
            match split_album(album, sheet, &progress) {
                Ok(outcome) => {
                    ui::finish_progress(progress);
                    ui::print_warnings(&outcome.warnings);
                    ui::print_split_result(&outcome, sheet.tracks.len());
                    album_ok = outcome.failed == 0;
                }
                Err(err) => {
                    ui::finish_progress(progress);
                    eprintln!("{}", err.red());
                    album_ok = false;
                }
            }
        } else if args.execute && album.already_split {
            println!("    {}", "Already split, skipping".dimmed());
        }

        if args.delete && album.audio.exists() {
            handle_delete(album, album_ok, args.execute, args.yes)?;
        }
        println!();
    }

    ui::print_footer(pending, args.execute);
    Ok(())
}

// Source deletion is gated on a clean split for the album; a partial album
// always keeps its source.
fn handle_delete(album: &Album, album_ok: bool, execute: bool, yes: bool) -> Result<()> {
    if execute {
        if !album_ok {
            println!("    {}", "Errors during split, keeping source".yellow());
            return Ok(());
        }
        delete_source(album);
        return Ok(());
    }

    if album.already_split {
        if ui::confirm("    Delete original FLAC?", true, yes)? {
            delete_source(album);
        }
    } else if yes {
        println!("    {}", "Not yet split, keeping source".dimmed());
    } else {
        println!("    {}", "Not yet split".yellow());
        if ui::confirm("    Delete anyway?", false, yes)? {
            delete_source(album);
        }
    }
    Ok(())
}

fn delete_source(album: &Album) {
    match fs::remove_file(&album.audio) {
        Ok(()) => println!(
            "    {} {}",
            "Deleted".red().bold(),
            album.audio.display().to_string().red()
        ),
        Err(err) => eprintln!(
            "{}",
            format!("failed to delete {}: {}", album.audio.display(), err).yellow()
        ),
    }
}
