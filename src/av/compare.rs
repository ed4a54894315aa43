//! Invocation of the external comparison/merge script.
//!
//! The script is an opaque collaborator: given two source videos it
//! writes `output.mp4` into a folder named by concatenating the two
//! input stems, under the same date partition as the first input. The
//! caller derives the same folder name and picks the result up from
//! there; nothing else about the script is inspected.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::av::cmd::CommandRunner;
use crate::error::AppError;
use crate::paths::partition_and_stem;

pub struct ComparisonInvoker {
    runner: Arc<dyn CommandRunner>,
    python_bin: String,
    script_path: PathBuf,
    timeout: Option<Duration>,
}

impl ComparisonInvoker {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        python_bin: String,
        script_path: PathBuf,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            runner,
            python_bin,
            script_path,
            timeout,
        }
    }

    /// Run the comparison script against two absolute source paths.
    /// Blocks until the script exits; output is only logged.
    pub async fn compare(&self, source1: &Path, source2: &Path) -> Result<(), AppError> {
        let command = format!(
            "{} \"{}\" --folder1 \"{}\" --folder2 \"{}\"",
            self.python_bin,
            self.script_path.display(),
            source1.display(),
            source2.display()
        );
        let output = self.runner.run(&command, self.timeout).await?;
        tracing::info!(%output, "comparison script finished");
        Ok(())
    }
}

/// Folder the script writes its merged result into, relative to the video
/// root: `<date>/<stem1><stem2>`. The name is deterministic because the
/// script derives the same folder from its own arguments; the caller must
/// match it exactly.
pub fn merged_output_dir(rel1: &str, rel2: &str) -> Result<String, AppError> {
    let (date, stem1) = partition_and_stem(rel1)?;
    let (_, stem2) = partition_and_stem(rel2)?;
    Ok(format!("{}/{}{}", date, stem1, stem2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::av::cmd::MockCommandRunner;

    #[tokio::test]
    async fn test_compare_command_shape() {
        let mut runner = MockCommandRunner::new();
        runner
            .expect_run()
            .withf(|cmd, _| {
                cmd == "python \"/assets/scripts/run.py\" --folder1 \"/assets/video/20250101/a.mp4\" --folder2 \"/assets/video/20250101/b.mp4\""
            })
            .times(1)
            .returning(|_, _| Ok(String::new()));

        let invoker = ComparisonInvoker::new(
            Arc::new(runner),
            String::from("python"),
            PathBuf::from("/assets/scripts/run.py"),
            None,
        );
        invoker
            .compare(
                &PathBuf::from("/assets/video/20250101/a.mp4"),
                &PathBuf::from("/assets/video/20250101/b.mp4"),
            )
            .await
            .unwrap();
    }

    #[test]
    fn test_output_dir_concatenates_stems() {
        let out = merged_output_dir("20250101/a.mp4", "20250101/b.mp4").unwrap();
        assert_eq!(out, "20250101/ab");
    }

    #[test]
    fn test_output_dir_uses_first_partition() {
        let out = merged_output_dir("20250101/left.mov", "20250102/right.mp4").unwrap();
        assert_eq!(out, "20250101/leftright");
    }

    #[test]
    fn test_output_dir_requires_partitioned_inputs() {
        assert!(merged_output_dir("a.mp4", "20250101/b.mp4").is_err());
        assert!(merged_output_dir("20250101/a.mp4", "nosuffix").is_err());
    }
}
