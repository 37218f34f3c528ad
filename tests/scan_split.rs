#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const CUE: &str = r#"PERFORMER "Artist"
TITLE "Album"
FILE "album.flac" WAVE
  TRACK 01 AUDIO
    TITLE "A"
    INDEX 01 00:00:00
  TRACK 02 AUDIO
    TITLE "B"
    INDEX 01 02:00:00
"#;

// Stub ffmpeg: log arguments, create the output file, succeed. The real
// binary is never needed; the tool only observes exit status and paths.
const FFMPEG_OK: &str = r#"#!/bin/sh
if [ -n "$FFMPEG_LOG" ]; then
  for arg in "$@"; do printf '%s\n' "$arg" >> "$FFMPEG_LOG"; done
fi
if [ "$#" -gt 1 ]; then
  for last in "$@"; do :; done
  : > "$last"
fi
exit 0
"#;

// Variant that fails for the second track's output.
const FFMPEG_FAIL_SECOND: &str = r#"#!/bin/sh
if [ "$#" -gt 1 ]; then
  for last in "$@"; do :; done
  case "$last" in
    *"02."*) exit 1 ;;
  esac
  : > "$last"
fi
exit 0
"#;

// ffprobe is unavailable; the last track must stay open-ended.
const FFPROBE_FAIL: &str = "#!/bin/sh\nexit 1\n";

fn write_stub(dir: &Path, name: &str, body: &str) {
    let path = dir.join(name);
    fs::write(&path, body).expect("failed to write stub");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("failed to chmod stub");
}

fn stub_bin(ffmpeg_body: &str) -> TempDir {
    let dir = TempDir::new().expect("failed to create stub dir");
    write_stub(dir.path(), "ffmpeg", ffmpeg_body);
    write_stub(dir.path(), "ffprobe", FFPROBE_FAIL);
    dir
}

fn album_dir() -> TempDir {
    let dir = TempDir::new().expect("failed to create album dir");
    fs::write(dir.path().join("album.cue"), CUE).expect("failed to write cue");
    fs::write(dir.path().join("album.flac"), b"not really flac").expect("failed to write flac");
    dir
}

fn run_tool(dir: &Path, stub: &Path, log: Option<&Path>, extra: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_flac-cue-scan"));
    command.arg(dir).args(extra).env("PATH", stub);
    if let Some(log) = log {
        command.env("FFMPEG_LOG", log);
    }
    command.output().expect("failed to run flac-cue-scan")
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command failed\nstatus: {:?}\nstdout:\n{}\nstderr:\n{}",
        output.status.code(),
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

fn logged_args(log: &Path) -> Vec<String> {
    match fs::read_to_string(log) {
        Ok(text) => text.lines().map(str::to_string).collect(),
        Err(_) => Vec::new(),
    }
}

#[test]
fn dry_run_lists_album_without_invoking_ffmpeg() {
    let stub = stub_bin(FFMPEG_OK);
    let album = album_dir();
    let log = album.path().join("ffmpeg.log");

    let output = run_tool(album.path(), stub.path(), Some(&log), &[]);
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Found 1 album(s)"));
    assert!(stdout.contains("Album"));
    assert!(stdout.contains("Dry run complete."));

    assert!(!album.path().join("01. A.flac").exists());
    assert!(!album.path().join("02. B.flac").exists());

    // Only the startup version check may reach the stub.
    let args = logged_args(&log);
    assert!(!args.iter().any(|arg| arg == "-i"));
}

#[test]
fn execute_splits_with_duration_cap_on_first_track_only() {
    let stub = stub_bin(FFMPEG_OK);
    let album = album_dir();
    let log = album.path().join("ffmpeg.log");

    let output = run_tool(album.path(), stub.path(), Some(&log), &["--execute"]);
    assert_success(&output);

    assert!(album.path().join("01. A.flac").is_file());
    assert!(album.path().join("02. B.flac").is_file());

    let args = logged_args(&log);
    let caps: Vec<&String> = args
        .iter()
        .zip(args.iter().skip(1))
        .filter(|(flag, _)| *flag == "-t")
        .map(|(_, value)| value)
        .collect();
    assert_eq!(caps, ["120.000"]);
    assert!(args.iter().any(|arg| arg == "title=A"));
    assert!(args.iter().any(|arg| arg == "title=B"));
    assert!(args.iter().any(|arg| arg == "artist=Artist"));
    assert!(args.iter().any(|arg| arg == "album=Album"));
    assert!(args.iter().any(|arg| arg == "track=1/2"));
}

#[test]
fn execute_skips_already_split_album() {
    let stub = stub_bin(FFMPEG_OK);
    let album = album_dir();
    fs::write(album.path().join("01. A.flac"), b"").unwrap();
    fs::write(album.path().join("02. B.flac"), b"").unwrap();
    let log = album.path().join("ffmpeg.log");

    let output = run_tool(album.path(), stub.path(), Some(&log), &["--execute"]);
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Already split, skipping"));
    let args = logged_args(&log);
    assert!(!args.iter().any(|arg| arg == "-i"));
}

#[test]
fn failed_track_keeps_source_under_delete() {
    let stub = stub_bin(FFMPEG_FAIL_SECOND);
    let album = album_dir();

    let output = run_tool(
        album.path(),
        stub.path(),
        None,
        &["--execute", "--delete", "--yes"],
    );
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("keeping source"));
    assert!(album.path().join("album.flac").is_file());
    assert!(album.path().join("album.cue").is_file());
}

#[test]
fn clean_split_deletes_source_under_delete() {
    let stub = stub_bin(FFMPEG_OK);
    let album = album_dir();

    let output = run_tool(
        album.path(),
        stub.path(),
        None,
        &["--execute", "--delete", "--yes"],
    );
    assert_success(&output);

    assert!(!album.path().join("album.flac").exists());
    assert!(album.path().join("album.cue").is_file());
    assert!(album.path().join("01. A.flac").is_file());
}

#[test]
fn mirrored_output_root() {
    let stub = stub_bin(FFMPEG_OK);
    let base = TempDir::new().unwrap();
    let nested = base.path().join("Artist/Album");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("album.cue"), CUE).unwrap();
    fs::write(nested.join("album.flac"), b"").unwrap();
    let out = TempDir::new().unwrap();
    let out_arg: PathBuf = out.path().join("split");

    let output = run_tool(
        base.path(),
        stub.path(),
        None,
        &["--execute", "-o", out_arg.to_str().unwrap()],
    );
    assert_success(&output);

    assert!(out_arg.join("Artist/Album/01. A.flac").is_file());
    assert!(out_arg.join("Artist/Album/02. B.flac").is_file());
}

#[test]
fn unparseable_sheet_is_reported_and_skipped() {
    let stub = stub_bin(FFMPEG_OK);
    let album = TempDir::new().unwrap();
    // TRACK without INDEX 01 yields no tracks, so the sheet is unusable.
    fs::write(
        album.path().join("album.cue"),
        "TITLE \"X\"\nTRACK 01 AUDIO\n",
    )
    .unwrap();
    fs::write(album.path().join("album.flac"), b"").unwrap();
    let log = album.path().join("ffmpeg.log");

    let output = run_tool(album.path(), stub.path(), Some(&log), &["--execute"]);
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Could not parse"));
    let args = logged_args(&log);
    assert!(!args.iter().any(|arg| arg == "-i"));
}

#[test]
fn empty_tree_reports_nothing_found() {
    let stub = stub_bin(FFMPEG_OK);
    let empty = TempDir::new().unwrap();

    let output = run_tool(empty.path(), stub.path(), None, &[]);
    assert_success(&output);
    assert!(
        String::from_utf8_lossy(&output.stdout).contains("No FLAC + CUE pairs found.")
    );
}

#[test]
fn missing_directory_exits_nonzero() {
    let stub = stub_bin(FFMPEG_OK);
    let output = run_tool(Path::new("/does/not/exist"), stub.path(), None, &[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}
