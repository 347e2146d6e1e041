//! Directory scan: find the eligible images in the input directory.
//!
//! Only direct entries are considered. Subdirectories (including a results
//! directory left by an earlier run) and files whose extension is not on the
//! allow-list are ignored. No sorting is applied: files are returned in the
//! order the operating system lists them, and that order is the processing
//! order of the whole run.

use crate::config::BatchConfig;
use crate::error::OcrStatsError;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// An image discovered by the scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    /// Full path to the image.
    pub path: PathBuf,
    /// File name as listed in the directory.
    pub file_name: String,
}

impl InputFile {
    /// File name without its extension, used to name the per-file report.
    pub fn stem(&self) -> &str {
        Path::new(&self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.file_name)
    }
}

/// List eligible images in `config.input_dir`, preserving listing order.
pub async fn scan_directory(config: &BatchConfig) -> Result<Vec<InputFile>, OcrStatsError> {
    let dir = &config.input_dir;
    let access_err = |source: std::io::Error| OcrStatsError::DirectoryAccess {
        path: dir.clone(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(access_err)?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(access_err)? {
        let path = entry.path();
        // Follows symlinks, so a link to an image counts as an image.
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            warn!("Skipping non-UTF-8 file name: {}", path.display());
            continue;
        };

        let eligible = Path::new(&file_name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| config.accepts_extension(ext));

        if eligible {
            files.push(InputFile { path, file_name });
        }
    }

    debug!("Scan of {} found {} eligible files", dir.display(), files.len());
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn names(files: &[InputFile]) -> Vec<String> {
        let mut v: Vec<String> = files.iter().map(|f| f.file_name.clone()).collect();
        v.sort();
        v
    }

    #[tokio::test]
    async fn filters_by_extension_case_insensitively() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "B.PNG", "c.jpg", "notes.txt", "png"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("sub.png")).unwrap();

        let config = BatchConfig::builder(dir.path()).build().unwrap();
        let files = scan_directory(&config).await.unwrap();
        assert_eq!(names(&files), vec!["B.PNG", "a.png"]);
    }

    #[tokio::test]
    async fn honours_custom_allow_list() {
        let dir = TempDir::new().unwrap();
        for name in ["a.png", "b.jpg", "c.jpeg", "d.gif"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let config = BatchConfig::builder(dir.path())
            .extensions(["jpg", "jpeg"])
            .build()
            .unwrap();
        let files = scan_directory(&config).await.unwrap();
        assert_eq!(names(&files), vec!["b.jpg", "c.jpeg"]);
    }

    #[tokio::test]
    async fn missing_directory_is_a_directory_access_error() {
        let dir = TempDir::new().unwrap();
        let config = BatchConfig::builder(dir.path().join("missing"))
            .build()
            .unwrap();
        let err = scan_directory(&config).await.unwrap_err();
        assert!(matches!(err, OcrStatsError::DirectoryAccess { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn non_utf8_names_are_skipped() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("ok.png"), b"x").unwrap();
        let bad = dir.path().join(OsStr::from_bytes(b"bad\xff.png"));
        if std::fs::write(&bad, b"x").is_err() {
            // Filesystem refuses non-UTF-8 names; nothing to check.
            return;
        }

        let config = BatchConfig::builder(dir.path()).build().unwrap();
        let files = scan_directory(&config).await.unwrap();
        assert_eq!(names(&files), vec!["ok.png"]);
    }

    #[test]
    fn stem_strips_extension_of_any_case() {
        let f = InputFile {
            path: PathBuf::from("imgs/Scan.01.PNG"),
            file_name: "Scan.01.PNG".into(),
        };
        assert_eq!(f.stem(), "Scan.01");
    }
}
