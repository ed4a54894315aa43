//! Environment configuration for the server.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Runtime configuration, loaded once at startup and passed to every
/// component. Components never read the environment themselves.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Root directory holding the image/, video/ and scripts/ subfolders
    pub asset_root: PathBuf,
    /// Interpreter used to run the comparison script
    pub python_bin: String,
    /// Path to the comparison/merge script
    pub script_path: PathBuf,
    /// Optional bound on external command runtime. None = unbounded,
    /// matching the original behavior.
    pub command_timeout: Option<Duration>,
    /// Whether a failed thumbnail generation fails the whole upload.
    /// Defaults to false: log and continue.
    pub fail_upload_on_thumbnail_error: bool,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let asset_root =
            PathBuf::from(env::var("ASSET_ROOT").unwrap_or_else(|_| String::from("./assets")));
        let script_path = env::var("COMPARE_SCRIPT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| asset_root.join("scripts").join("run.py"));

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("3000")),
            asset_root,
            python_bin: env::var("PYTHON_BIN").unwrap_or_else(|_| String::from("python")),
            script_path,
            command_timeout: env::var("COMMAND_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(Duration::from_secs),
            fail_upload_on_thumbnail_error: env::var("FAIL_UPLOAD_ON_THUMBNAIL_ERROR")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    pub fn image_dir(&self) -> PathBuf {
        self.asset_root.join("image")
    }

    pub fn video_dir(&self) -> PathBuf {
        self.asset_root.join("video")
    }

    pub fn scripts_dir(&self) -> PathBuf {
        self.asset_root.join("scripts")
    }

    /// Build a config rooted at an arbitrary directory, used by tests.
    pub fn with_root(root: &Path) -> Self {
        Self {
            addr: String::from("127.0.0.1"),
            port: String::from("3000"),
            asset_root: root.to_path_buf(),
            python_bin: String::from("python"),
            script_path: root.join("scripts").join("run.py"),
            command_timeout: None,
            fail_upload_on_thumbnail_error: false,
        }
    }
}

/// Create the asset subdirectories if they do not exist. Called once from
/// main before any component touches the filesystem.
pub async fn bootstrap_dirs(config: &AppConfig) -> std::io::Result<()> {
    tokio::fs::create_dir_all(config.image_dir()).await?;
    tokio::fs::create_dir_all(config.video_dir()).await?;
    tokio::fs::create_dir_all(config.scripts_dir()).await?;
    Ok(())
}
