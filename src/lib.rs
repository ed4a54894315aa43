//! Calloway - video compare & HLS packaging server
//!
//! A thin HTTP façade over ffmpeg/ffprobe and an external comparison
//! script:
//! - av/: shell execution, probing, transcoding, script invocation
//! - pipeline: the upload and compare-and-package orchestration
//! - http/: axum handlers and the response envelope
//! - config: environment configuration, validated at startup
//! - paths: suffix/partition/traversal helpers

pub mod av;
pub mod config;
pub mod error;
pub mod http;
pub mod paths;
pub mod pipeline;

pub use config::AppConfig;
pub use error::AppError;
