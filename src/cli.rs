use clap::Parser;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub(crate) struct Args {
    /// Directory to search for FLAC + CUE pairs
    #[arg(value_name = "DIR")]
    pub(crate) directory: PathBuf,

    /// Actually perform the split (default is a dry run)
    #[arg(long)]
    pub(crate) execute: bool,

    /// Output root for split files (default: alongside each source)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub(crate) output: Option<PathBuf>,

    /// Delete original album files after splitting (cue files are kept)
    #[arg(long)]
    pub(crate) delete: bool,

    /// Show per-track listings
    #[arg(short = 'v', long)]
    pub(crate) verbose: bool,

    /// Auto-select the default answer for prompts
    #[arg(short = 'y', long)]
    pub(crate) yes: bool,
}

pub(crate) fn display_path(base: Option<&Path>, path: &Path) -> PathBuf {
    if let Some(base) = base
        && let Ok(rel) = path.strip_prefix(base)
    {
        if rel.as_os_str().is_empty() {
            return PathBuf::from(".");
        }
        return rel.to_path_buf();
    }
    path.to_path_buf()
}
