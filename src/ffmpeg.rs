use std::path::Path;
use std::process::{Command, Stdio};

use crate::Result;

pub(crate) fn ffmpeg_available() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Total duration of an audio file in seconds, via ffprobe. Any failure
/// degrades to `None` and the caller's open-ended last-track policy.
pub(crate) fn probe_duration(path: &Path) -> Option<f64> {
    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(path)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let parsed: serde_json::Value = serde_json::from_slice(&output.stdout).ok()?;
    parsed["format"]["duration"].as_str()?.parse().ok()
}

pub(crate) struct ExtractRequest<'a> {
    pub(crate) input: &'a Path,
    pub(crate) output: &'a Path,
    pub(crate) start_seconds: f64,
    pub(crate) duration: Option<f64>,
    pub(crate) title: &'a str,
    pub(crate) artist: &'a str,
    pub(crate) album: &'a str,
    pub(crate) track_number: u32,
    pub(crate) track_total: usize,
}

/// One blocking ffmpeg invocation per track. Duration is omitted for an
/// open-ended final track; ffmpeg then truncates at end of input.
pub(crate) fn extract_track(request: &ExtractRequest) -> Result<()> {
    let mut command = Command::new("ffmpeg");
    command.arg("-i").arg(request.input);
    command.arg("-ss").arg(format!("{:.3}", request.start_seconds));
    if let Some(duration) = request.duration {
        command.arg("-t").arg(format!("{:.3}", duration));
    }
    command
        .args(["-c:a", "flac", "-compression_level", "8"])
        .arg("-metadata")
        .arg(format!("title={}", request.title))
        .arg("-metadata")
        .arg(format!("artist={}", request.artist))
        .arg("-metadata")
        .arg(format!("album={}", request.album))
        .arg("-metadata")
        .arg(format!("track={}/{}", request.track_number, request.track_total))
        .arg("-y")
        .arg(request.output)
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    let status = command
        .status()
        .map_err(|err| format!("failed to run ffmpeg: {}", err))?;
    if !status.success() {
        return Err(format!(
            "ffmpeg exited with {} for {}",
            status,
            request.output.display()
        ));
    }
    Ok(())
}
