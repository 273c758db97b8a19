//! Retention and size maintenance for rotated log files.
//!
//! The rolling engine handles date-based file switching; this rotator
//! covers what remains: renaming an oversized current file out of the way
//! and deleting archived files that fall outside the retention window.

use chrono::{DateTime, Duration, Utc};
use std::io;
use std::path::{Path, PathBuf};

/// Size- and age-based maintenance for a directory of log files.
#[derive(Debug, Clone)]
pub struct LogRotator {
    retention_days: u32,
    max_file_size: u64,
}

impl LogRotator {
    /// Rotator keeping files for `retention_days` and renaming any file
    /// that grows past `max_file_size` bytes.
    pub const fn new(retention_days: u32, max_file_size: u64) -> Self {
        Self {
            retention_days,
            max_file_size,
        }
    }

    /// Retention window in days.
    pub const fn retention_days(&self) -> u32 {
        self.retention_days
    }

    /// Size limit in bytes.
    pub const fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Whether the file exists and exceeds the size limit.
    pub async fn should_rotate(&self, log_path: impl AsRef<Path>) -> io::Result<bool> {
        let log_path = log_path.as_ref();

        if !log_path.exists() {
            return Ok(false);
        }

        let metadata = tokio::fs::metadata(log_path).await?;
        Ok(metadata.len() >= self.max_file_size)
    }

    /// Rename the file with a timestamp suffix when it exceeds the size
    /// limit. The writer recreates the file on its next rollover.
    pub async fn rotate_if_needed(&self, log_path: impl AsRef<Path>) -> io::Result<Option<PathBuf>> {
        let log_path = log_path.as_ref();

        if !self.should_rotate(log_path).await? {
            return Ok(None);
        }

        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let rotated = match log_path.extension() {
            Some(ext) => {
                log_path.with_extension(format!("{}.{stamp}", ext.to_string_lossy()))
            }
            None => PathBuf::from(format!("{}.{stamp}", log_path.display())),
        };

        tokio::fs::rename(log_path, &rotated).await?;
        Ok(Some(rotated))
    }

    /// Delete `.log` files (current and archived) older than the retention
    /// window. Returns the number of files removed. A missing directory is
    /// treated as nothing to clean.
    pub async fn cleanup_old_logs(&self, log_dir: impl AsRef<Path>) -> io::Result<usize> {
        let log_dir = log_dir.as_ref();

        if !log_dir.exists() {
            return Ok(0);
        }

        let cutoff = Utc::now() - Duration::days(i64::from(self.retention_days));
        let mut deleted = 0;
        let mut entries = tokio::fs::read_dir(log_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();

            if !is_log_file(&path) {
                continue;
            }

            let metadata = tokio::fs::metadata(&path).await?;
            let modified: DateTime<Utc> = metadata.modified()?.into();

            if modified < cutoff {
                tokio::fs::remove_file(&path).await?;
                deleted += 1;
            }
        }

        Ok(deleted)
    }

    /// Long-running cleanup loop; spawn it alongside a file sink. Errors
    /// are reported through `on_error` and do not stop the loop.
    pub async fn run_periodic_cleanup(
        &self,
        log_dir: impl AsRef<Path>,
        interval: std::time::Duration,
        on_error: impl Fn(&io::Error),
    ) {
        let log_dir = log_dir.as_ref().to_path_buf();
        let mut ticker = tokio::time::interval(interval);

        loop {
            ticker.tick().await;

            if let Err(err) = self.cleanup_old_logs(&log_dir).await {
                on_error(&err);
            }
        }
    }
}

// Matches both live files (x.log) and size-rotated ones (x.log.20260830_120000):
// one of the last two extensions must be exactly "log", so lookalike names
// such as logo.png or login.txt never qualify.
fn is_log_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.rsplit('.').take(2).any(|segment| segment == "log"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_should_rotate_when_file_exceeds_size() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let mut file = std::fs::File::create(&log_path).unwrap();
        file.write_all(&[0u8; 2048]).unwrap();
        drop(file);

        let rotator = LogRotator::new(30, 1024);
        assert!(rotator.should_rotate(&log_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_should_not_rotate_small_or_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("test.log");

        let rotator = LogRotator::new(30, 1024);
        assert!(!rotator.should_rotate(&log_path).await.unwrap());

        std::fs::write(&log_path, b"small").unwrap();
        assert!(!rotator.should_rotate(&log_path).await.unwrap());
    }

    #[tokio::test]
    async fn test_rotate_if_needed_renames_with_timestamp() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");

        std::fs::write(&log_path, [0u8; 2048]).unwrap();

        let rotator = LogRotator::new(30, 1024);
        let rotated = rotator.rotate_if_needed(&log_path).await.unwrap();

        assert!(!log_path.exists());
        let rotated = rotated.unwrap();
        assert!(rotated.exists());
        assert!(rotated
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("app.log."));
    }

    #[tokio::test]
    async fn test_rotate_if_needed_leaves_small_file_alone() {
        let temp_dir = TempDir::new().unwrap();
        let log_path = temp_dir.path().join("app.log");

        std::fs::write(&log_path, b"small").unwrap();

        let rotator = LogRotator::new(30, 1024);
        assert!(rotator.rotate_if_needed(&log_path).await.unwrap().is_none());
        assert!(log_path.exists());
    }

    #[tokio::test]
    async fn test_cleanup_deletes_expired_log_files_only() {
        let temp_dir = TempDir::new().unwrap();

        std::fs::write(temp_dir.path().join("old.log"), b"old").unwrap();
        std::fs::write(temp_dir.path().join("app.log.20240101_120000"), b"old").unwrap();
        std::fs::write(temp_dir.path().join("notes.txt"), b"keep").unwrap();

        // Zero-day retention expires everything written before "now".
        let rotator = LogRotator::new(0, 1024);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let deleted = rotator.cleanup_old_logs(temp_dir.path()).await.unwrap();
        assert_eq!(deleted, 2);
        assert!(temp_dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_cleanup_handles_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nonexistent");

        let rotator = LogRotator::new(30, 1024);
        assert_eq!(rotator.cleanup_old_logs(&missing).await.unwrap(), 0);
    }

    #[test]
    fn test_is_log_file_patterns() {
        assert!(is_log_file(Path::new("/x/app.log")));
        assert!(is_log_file(Path::new("/x/2026-08-30.access.log")));
        assert!(is_log_file(Path::new("/x/app.log.20260830_120000")));
        assert!(!is_log_file(Path::new("/x/data.txt")));
        assert!(!is_log_file(Path::new("/x/archive.json")));
        assert!(!is_log_file(Path::new("/x/logo.png")));
        assert!(!is_log_file(Path::new("/x/login.txt")));
        assert!(!is_log_file(Path::new("/x/logfile")));
    }

    #[tokio::test]
    async fn test_cleanup_spares_lookalike_names() {
        let temp_dir = TempDir::new().unwrap();

        std::fs::write(temp_dir.path().join("logo.png"), b"keep").unwrap();
        std::fs::write(temp_dir.path().join("login.txt"), b"keep").unwrap();
        std::fs::write(temp_dir.path().join("app.log"), b"old").unwrap();

        let rotator = LogRotator::new(0, 1024);
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;

        let deleted = rotator.cleanup_old_logs(temp_dir.path()).await.unwrap();
        assert_eq!(deleted, 1);
        assert!(temp_dir.path().join("logo.png").exists());
        assert!(temp_dir.path().join("login.txt").exists());
        assert!(!temp_dir.path().join("app.log").exists());
    }
}
