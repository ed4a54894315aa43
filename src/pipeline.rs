//! Request orchestration: the upload flow and the compare-and-package
//! flow. Each request is one synchronous chain of external-tool calls;
//! uniqueness of the randomly named upload paths stands in for locking.

use std::path::PathBuf;
use std::sync::Arc;

use crate::av::cmd::CommandRunner;
use crate::av::compare::{merged_output_dir, ComparisonInvoker};
use crate::av::probe::MediaProbe;
use crate::av::transcode::{Transcoder, CODEC_HEVC, FIRST_TS_NAME, OUTPUT_NAME, TEMP_SUFFIX};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::paths::{
    check_path, date_partition, file_suffix, random_name, thumbnail_rel_path, IMAGE_SUFFIX,
    RANDOM_NAME_LEN,
};

/// Destination of an upload, derived before any bytes are written.
#[derive(Debug, Clone)]
pub struct UploadTarget {
    /// Path relative to the video root, returned to the caller.
    pub rel_path: String,
    /// Absolute path the handler streams the body into.
    pub abs_path: PathBuf,
}

pub struct UploadPipeline {
    config: Arc<AppConfig>,
    probe: MediaProbe,
    transcoder: Transcoder,
    comparer: ComparisonInvoker,
}

impl UploadPipeline {
    pub fn new(config: Arc<AppConfig>, runner: Arc<dyn CommandRunner>) -> Self {
        let timeout = config.command_timeout;
        Self {
            probe: MediaProbe::new(runner.clone(), timeout),
            transcoder: Transcoder::new(runner.clone(), timeout),
            comparer: ComparisonInvoker::new(
                runner,
                config.python_bin.clone(),
                config.script_path.clone(),
                timeout,
            ),
            config,
        }
    }

    /// Derive the date-partitioned destination for an upload and create
    /// its folder. The original suffix is kept verbatim; the stem becomes
    /// an opaque random name.
    pub async fn prepare_upload(&self, original_name: &str) -> Result<UploadTarget, AppError> {
        let suffix = file_suffix(original_name).ok_or(AppError::InvalidFilename)?;

        let day = date_partition();
        let folder = self.config.video_dir().join(&day);
        tokio::fs::create_dir_all(&folder).await?;

        let rel_path = format!("{}/{}{}", day, random_name(RANDOM_NAME_LEN), suffix);
        let abs_path = self.config.video_dir().join(&rel_path);
        Ok(UploadTarget { rel_path, abs_path })
    }

    /// Post-store step: probe the stored file and derive its thumbnail at
    /// the mirrored image path. Thumbnail failure is policy-gated; by
    /// default it is logged and the upload still succeeds.
    pub async fn finish_upload(&self, target: &UploadTarget) -> Result<(), AppError> {
        let duration = match self.probe.duration(&target.abs_path).await {
            Ok(secs) => secs,
            Err(e) => {
                tracing::warn!(error = %e, "duration probe failed");
                0
            }
        };
        tracing::info!(rel_path = %target.rel_path, duration_secs = duration, "stored upload");

        let image_path = self
            .config
            .image_dir()
            .join(thumbnail_rel_path(&target.rel_path));

        if let Err(e) = self
            .transcoder
            .create_video_thumbnail(&target.abs_path, &image_path)
            .await
        {
            if self.config.fail_upload_on_thumbnail_error {
                return Err(e);
            }
            tracing::warn!(error = %e, rel_path = %target.rel_path, "thumbnail generation failed");
        }
        Ok(())
    }

    /// Run the comparison script over two previously uploaded videos,
    /// then package its merged output as HLS and thumbnail the first
    /// segment. Returns the relative output folder with a trailing slash.
    pub async fn compare_and_package(
        &self,
        source1: &str,
        source2: &str,
    ) -> Result<String, AppError> {
        check_path(source1)?;
        check_path(source2)?;

        let video_dir = self.config.video_dir();
        self.comparer
            .compare(&video_dir.join(source1), &video_dir.join(source2))
            .await?;

        let out_rel = merged_output_dir(source1, source2)?;
        let out_dir = video_dir.join(&out_rel);
        let merged = out_dir.join(OUTPUT_NAME);

        self.package_hls(&out_dir, &merged).await?;

        let first_ts = out_dir.join(FIRST_TS_NAME);
        let image_path = self
            .config
            .image_dir()
            .join(format!("{}{}", out_rel, IMAGE_SUFFIX));
        self.transcoder
            .create_video_thumbnail(&first_ts, &image_path)
            .await?;

        Ok(format!("{}/", out_rel))
    }

    /// Codec normalization followed by segmentation. HEVC sources are
    /// re-encoded to H.264 in place via a `_temp` rename before splitting;
    /// the consumed source video is removed once segments exist.
    async fn package_hls(
        &self,
        out_dir: &std::path::Path,
        video_path: &std::path::Path,
    ) -> Result<(), AppError> {
        let codec = self.probe.codec(video_path).await?;
        if codec == CODEC_HEVC {
            let temp_path = PathBuf::from(format!("{}{}", video_path.display(), TEMP_SUFFIX));
            tokio::fs::rename(video_path, &temp_path).await?;
            self.transcoder
                .convert_hevc_to_mp4(&temp_path, video_path)
                .await?;
            tokio::fs::remove_file(&temp_path).await?;
        }

        self.transcoder
            .convert_video_to_hls(out_dir, video_path)
            .await?;

        // Consumed source; a failed delete is not worth failing the request.
        if let Err(e) = tokio::fs::remove_file(video_path).await {
            tracing::warn!(error = %e, path = %video_path.display(), "could not remove merged source");
        }
        Ok(())
    }
}
