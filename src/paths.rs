//! Path derivation helpers: suffixes, random names, date partitions and
//! traversal checks.

use rand::distributions::Alphanumeric;
use rand::Rng;
use std::path::{Component, Path};

use crate::error::AppError;

/// Length of the opaque file names generated for uploads.
pub const RANDOM_NAME_LEN: usize = 20;

/// File suffix appended to thumbnails.
pub const IMAGE_SUFFIX: &str = ".png";

/// Extract the suffix (including the dot) from a file name.
/// `clip.MOV` -> `.MOV`. Case is preserved.
pub fn file_suffix(file_name: &str) -> Option<&str> {
    let idx = file_name.rfind('.')?;
    if idx == 0 && file_name.len() == 1 {
        return None;
    }
    Some(&file_name[idx..])
}

/// Generate an opaque alphanumeric file name of `len` characters.
pub fn random_name(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Today's date partition in `yyyyMMdd` form.
pub fn date_partition() -> String {
    chrono::Local::now().format("%Y%m%d").to_string()
}

/// Reject relative paths that could escape the asset root.
pub fn check_path(rel_path: &str) -> Result<(), AppError> {
    let path = Path::new(rel_path);
    for component in path.components() {
        if matches!(component, Component::ParentDir) {
            return Err(AppError::PathTraversal);
        }
    }
    Ok(())
}

/// Mirror a relative video path into the image tree: drop the suffix,
/// append the thumbnail suffix. `20250101/abc.mp4` -> `20250101/abc.png`.
pub fn thumbnail_rel_path(video_rel: &str) -> String {
    let stem = match video_rel.rfind('.') {
        Some(idx) => &video_rel[..idx],
        None => video_rel,
    };
    format!("{}{}", stem, IMAGE_SUFFIX)
}

/// Split a relative path like `20250101/abc.mp4` into its date partition
/// and file stem.
pub fn partition_and_stem(rel_path: &str) -> Result<(&str, &str), AppError> {
    let slash = rel_path.rfind('/').ok_or(AppError::InvalidFilename)?;
    let (date, file_name) = (&rel_path[..slash], &rel_path[slash + 1..]);
    let dot = file_name.rfind('.').ok_or(AppError::InvalidFilename)?;
    if date.is_empty() || dot == 0 {
        return Err(AppError::InvalidFilename);
    }
    Ok((date, &file_name[..dot]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_preserves_case() {
        assert_eq!(file_suffix("clip.MOV"), Some(".MOV"));
        assert_eq!(file_suffix("a.b.mp4"), Some(".mp4"));
        assert_eq!(file_suffix("noext"), None);
    }

    #[test]
    fn test_random_name_is_alphanumeric() {
        let name = random_name(RANDOM_NAME_LEN);
        assert_eq!(name.len(), RANDOM_NAME_LEN);
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_date_partition_shape() {
        let day = date_partition();
        assert_eq!(day.len(), 8);
        assert!(day.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_parent_dir_rejected() {
        assert!(check_path("../etc/passwd").is_err());
        assert!(check_path("20250101/../../secret").is_err());
        assert!(check_path("20250101/abc.mp4").is_ok());
    }

    #[test]
    fn test_thumbnail_path_mirrors_stem() {
        assert_eq!(thumbnail_rel_path("20250101/abc.mp4"), "20250101/abc.png");
        assert_eq!(thumbnail_rel_path("20250101/ab/0000.ts"), "20250101/ab/0000.png");
    }

    #[test]
    fn test_partition_and_stem() {
        let (date, stem) = partition_and_stem("20250101/a.mp4").unwrap();
        assert_eq!(date, "20250101");
        assert_eq!(stem, "a");
        assert!(partition_and_stem("no_partition.mp4").is_err());
        assert!(partition_and_stem("20250101/nosuffix").is_err());
    }
}
