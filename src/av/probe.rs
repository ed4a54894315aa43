//! Read-only media inspection via ffprobe.

use regex::Regex;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use crate::av::cmd::CommandRunner;
use crate::error::AppError;

static CODEC_RE: OnceLock<Regex> = OnceLock::new();

fn codec_re() -> &'static Regex {
    // Tolerates both `codec_name=h264` and `codec_name=h264[extra]`.
    CODEC_RE.get_or_init(|| Regex::new(r"codec_name=([^\[\r\n]+)").unwrap())
}

pub struct MediaProbe {
    runner: Arc<dyn CommandRunner>,
    timeout: Option<Duration>,
}

impl MediaProbe {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Option<Duration>) -> Self {
        Self { runner, timeout }
    }

    /// Duration of a media file in whole seconds, truncated. Blank probe
    /// output means "no duration available" and maps to 0 rather than an
    /// error; anything non-numeric is a parse failure.
    pub async fn duration(&self, path: &Path) -> Result<u64, AppError> {
        let command = format!(
            "ffprobe -v error -show_entries format=duration -of default=noprint_wrappers=1:nokey=1 \"{}\"",
            path.display()
        );
        let output = self.runner.run(&command, self.timeout).await?;

        let trimmed = output.trim();
        if trimmed.is_empty() {
            return Ok(0);
        }
        let seconds: f64 = trimmed
            .parse()
            .map_err(|_| AppError::Parse(format!("duration not numeric: {:?}", trimmed)))?;
        Ok(seconds.trunc() as u64)
    }

    /// Codec identifier of the first video stream, e.g. `h264` or `hevc`.
    pub async fn codec(&self, path: &Path) -> Result<String, AppError> {
        let command = format!(
            "ffprobe -v error -select_streams v:0 -show_entries stream=codec_name \"{}\"",
            path.display()
        );
        let output = self.runner.run(&command, self.timeout).await?;

        let captures = codec_re()
            .captures(&output)
            .ok_or_else(|| AppError::Parse(format!("no codec_name line in: {:?}", output)))?;
        Ok(captures[1].trim().to_string())
    }
}
