//! ffmpeg invocations: thumbnails, compatibility re-encoding and HLS
//! packaging.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::av::cmd::CommandRunner;
use crate::error::AppError;
use crate::paths::IMAGE_SUFFIX;

/// Intermediate single-file transport stream, deleted after segmentation.
pub const TS_NAME: &str = "index.ts";
/// Playlist descriptor written next to the segments.
pub const M3U8_NAME: &str = "index.m3u8";
/// Merged result the comparison script leaves in its output folder.
pub const OUTPUT_NAME: &str = "output.mp4";
/// First segment produced by the 4-digit naming scheme.
pub const FIRST_TS_NAME: &str = "0000.ts";
/// Codec identifier that triggers compatibility re-encoding.
pub const CODEC_HEVC: &str = "hevc";
/// Suffix given to the source while it is being re-encoded in place.
pub const TEMP_SUFFIX: &str = "_temp";

const SEGMENT_SECONDS: u32 = 10;
const THUMBNAIL_WIDTH: u32 = 200;

pub struct Transcoder {
    runner: Arc<dyn CommandRunner>,
    timeout: Option<Duration>,
}

impl Transcoder {
    pub fn new(runner: Arc<dyn CommandRunner>, timeout: Option<Duration>) -> Self {
        Self { runner, timeout }
    }

    /// Scale an existing image to a fixed width, height proportional.
    /// The output lands next to the source with the thumbnail suffix
    /// appended; no check that it was actually produced.
    pub async fn create_image_thumbnail(&self, image_path: &Path) -> Result<(), AppError> {
        let command = format!(
            "ffmpeg -i \"{}\" -vf scale={}:-1 \"{}{}\"",
            image_path.display(),
            THUMBNAIL_WIDTH,
            image_path.display(),
            IMAGE_SUFFIX
        );
        self.runner.run(&command, self.timeout).await?;
        Ok(())
    }

    /// Extract the first decodable frame of a video as an image. The
    /// destination folder is created if missing.
    pub async fn create_video_thumbnail(
        &self,
        video_path: &Path,
        image_path: &Path,
    ) -> Result<(), AppError> {
        if let Some(parent) = image_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let command = format!(
            "ffmpeg -i \"{}\" -frames:v 1 -q:v 2 \"{}\"",
            video_path.display(),
            image_path.display()
        );
        self.runner.run(&command, self.timeout).await?;
        Ok(())
    }

    /// Re-encode a source into H.264 at a fixed quality target,
    /// overwriting any existing destination.
    pub async fn convert_hevc_to_mp4(
        &self,
        temp_path: &Path,
        video_path: &Path,
    ) -> Result<(), AppError> {
        let command = format!(
            "ffmpeg -i \"{}\" -c:v libx264 -crf 20 \"{}\" -y",
            temp_path.display(),
            video_path.display()
        );
        self.runner.run(&command, self.timeout).await?;
        Ok(())
    }

    /// Split a video into fixed-duration transport-stream segments plus a
    /// playlist. Two steps: repackage into one annexb `.ts` (normalizes
    /// frame boundaries for splitting), then segment it. The intermediate
    /// file is scratch state and gets removed afterwards.
    pub async fn convert_video_to_hls(
        &self,
        output_folder: &Path,
        video_path: &Path,
    ) -> Result<(), AppError> {
        let ts_path = output_folder.join(TS_NAME);
        let m3u8_path = output_folder.join(M3U8_NAME);

        let repackage = format!(
            "ffmpeg -y -i \"{}\" -vcodec copy -acodec copy -bsf:v h264_mp4toannexb \"{}\"",
            video_path.display(),
            ts_path.display()
        );
        self.runner.run(&repackage, self.timeout).await?;

        let segment = format!(
            "ffmpeg -i \"{}\" -c copy -map 0 -f segment -segment_list \"{}\" -segment_time {} {}/%04d.ts",
            ts_path.display(),
            m3u8_path.display(),
            SEGMENT_SECONDS,
            output_folder.display()
        );
        self.runner.run(&segment, self.timeout).await?;

        if let Err(e) = tokio::fs::remove_file(&ts_path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                return Err(e.into());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::cmd::MockCommandRunner;
    use mockall::Sequence;
    use std::path::PathBuf;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_image_thumbnail_command() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd == "ffmpeg -i \"pic.jpg\" -vf scale=200:-1 \"pic.jpg.png\"")
            .returning(|_, _| Ok(String::new()));
        let transcoder = Transcoder::new(Arc::new(runner), None);
        transcoder
            .create_image_thumbnail(&PathBuf::from("pic.jpg"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_video_thumbnail_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let image_path = dir.path().join("image").join("20250101").join("a.png");

        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd.contains("-frames:v 1 -q:v 2"))
            .returning(|_, _| Ok(String::new()));

        let transcoder = Transcoder::new(Arc::new(runner), None);
        transcoder
            .create_video_thumbnail(&PathBuf::from("a.mp4"), &image_path)
            .await
            .unwrap();

        assert!(image_path.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_hevc_reencode_command() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| {
                cmd == "ffmpeg -i \"a.mp4_temp\" -c:v libx264 -crf 20 \"a.mp4\" -y"
            })
            .returning(|_, _| Ok(String::new()));
        let transcoder = Transcoder::new(Arc::new(runner), None);
        transcoder
            .convert_hevc_to_mp4(&PathBuf::from("a.mp4_temp"), &PathBuf::from("a.mp4"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_hls_runs_both_steps_and_removes_intermediate() {
        let dir = tempdir().unwrap();
        let out = dir.path().to_path_buf();
        let ts_path = out.join(TS_NAME);
        std::fs::write(&ts_path, b"scratch").unwrap();

        let mut runner = MockCommandRunner::new();
        let mut seq = Sequence::new();
        runner
            .expect_run()
            .withf(|cmd, _| cmd.contains("-bsf:v h264_mp4toannexb"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(String::new()));
        runner
            .expect_run()
            .withf(|cmd, _| cmd.contains("-segment_time 10") && cmd.contains("%04d.ts"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(String::new()));

        let transcoder = Transcoder::new(Arc::new(runner), None);
        transcoder
            .convert_video_to_hls(&out, &PathBuf::from("src.mp4"))
            .await
            .unwrap();

        assert!(!ts_path.exists());
    }

    #[tokio::test]
    async fn test_hls_tolerates_missing_intermediate() {
        let dir = tempdir().unwrap();

        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(2).returning(|_, _| Ok(String::new()));

        let transcoder = Transcoder::new(Arc::new(runner), None);
        transcoder
            .convert_video_to_hls(dir.path(), &PathBuf::from("src.mp4"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_hls_failure_propagates() {
        let dir = tempdir().unwrap();

        let mut runner = MockCommandRunner::new();
        runner.expect_run().times(1).returning(|cmd, _| {
            Err(AppError::CommandFailed {
                code: 1,
                command: cmd.to_string(),
            })
        });

        let transcoder = Transcoder::new(Arc::new(runner), None);
        let err = transcoder
            .convert_video_to_hls(dir.path(), &PathBuf::from("src.mp4"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::CommandFailed { code: 1, .. }));
    }
}
