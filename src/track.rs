use std::fmt;

/// A `mm:ss:ff` cue timestamp. Frames are 1/75 of a second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CueTime {
    pub(crate) minutes: u32,
    pub(crate) seconds: u32,
    pub(crate) frames: u32,
}

impl CueTime {
    pub(crate) fn parse(value: &str) -> Option<Self> {
        let mut parts = value.split(':');
        let minutes = parts.next()?.trim().parse().ok()?;
        let seconds = parts.next()?.trim().parse().ok()?;
        let frames = match parts.next() {
            Some(part) => part.trim().parse().ok()?,
            None => 0,
        };
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            minutes,
            seconds,
            frames,
        })
    }

    pub(crate) fn as_seconds(&self) -> f64 {
        f64::from(self.minutes) * 60.0 + f64::from(self.seconds) + f64::from(self.frames) / 75.0
    }
}

impl fmt::Display for CueTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.minutes, self.seconds, self.frames)
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Track {
    pub(crate) number: u32,
    pub(crate) title: String,
    pub(crate) performer: String,
    pub(crate) start: CueTime,
}

impl Track {
    pub(crate) fn start_seconds(&self) -> f64 {
        self.start.as_seconds()
    }

    /// Output name for this track: zero-padded number, sanitized title.
    pub(crate) fn output_filename(&self, track_count: usize) -> String {
        let width = std::cmp::max(2, track_count.to_string().len());
        format!(
            "{:0width$}. {}.flac",
            self.number,
            sanitize_title(&self.title),
            width = width
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct CueSheet {
    pub(crate) album_title: String,
    pub(crate) album_performer: String,
    pub(crate) referenced_file: Option<String>,
    pub(crate) tracks: Vec<Track>,
}

impl CueSheet {
    /// Length of track `index` in seconds. The last track is open-ended
    /// unless the caller supplies the total audio duration.
    pub(crate) fn track_duration(&self, index: usize, total_seconds: Option<f64>) -> Option<f64> {
        let track = self.tracks.get(index)?;
        let end = match self.tracks.get(index + 1) {
            Some(next) => next.start_seconds(),
            None => total_seconds?,
        };
        Some(end - track.start_seconds())
    }

    pub(crate) fn output_filenames(&self) -> impl Iterator<Item = String> + '_ {
        let count = self.tracks.len();
        self.tracks.iter().map(move |track| track.output_filename(count))
    }
}

pub(crate) fn sanitize_title(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => out.push('_'),
            _ => out.push(ch),
        }
    }
    out.trim_end_matches(['.', ' ']).to_string()
}
