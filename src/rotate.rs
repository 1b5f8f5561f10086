//! Size-based rotation of log files
//!
//! A file at or above `max_size` bytes is renamed to
//! `<path>.<YYYY-MM-DDTHH-MM-SS-mmmZ>` (stepped forward a millisecond while
//! that name is taken), an empty file takes its place, the
//! archive is optionally gzipped, and archives beyond `max_files` are pruned
//! newest first. No lock is held across these steps; a crash between rename
//! and recreate only leaves an extra archive behind.

use crate::core::{Clock, LoggerError, Result, SystemClock};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// strftime form of the archive suffix
pub const ARCHIVE_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H-%M-%S-%3fZ";

const COMPRESS_BUFFER_SIZE: usize = 64 * 1024;

/// Milliseconds tried past `now` before giving up on a free archive name
const MAX_ARCHIVE_ATTEMPTS: u32 = 1000;

/// Filesystem operations used by rotation
#[async_trait]
pub trait LogFs: Send + Sync {
    /// Size in bytes, or `None` when the file does not exist
    async fn file_size(&self, path: &Path) -> io::Result<Option<u64>>;

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create `path` empty, truncating any existing content
    async fn create_empty(&self, path: &Path) -> io::Result<()>;

    /// File names (not paths) in `dir`
    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>>;

    async fn remove(&self, path: &Path) -> io::Result<()>;

    /// Gzip `path` to `<path>.gz`, remove the original and return the new path
    async fn compress(&self, path: &Path) -> io::Result<PathBuf>;
}

/// [`LogFs`] over `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

#[async_trait]
impl LogFs for TokioFs {
    async fn file_size(&self, path: &Path) -> io::Result<Option<u64>> {
        match tokio::fs::metadata(path).await {
            Ok(meta) => Ok(Some(meta.len())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        tokio::fs::rename(from, to).await
    }

    async fn create_empty(&self, path: &Path) -> io::Result<()> {
        tokio::fs::write(path, b"").await
    }

    async fn list_dir(&self, dir: &Path) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(dir).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    async fn remove(&self, path: &Path) -> io::Result<()> {
        tokio::fs::remove_file(path).await
    }

    async fn compress(&self, path: &Path) -> io::Result<PathBuf> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || gzip_file(&path))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
    }
}

/// Stream `path` through a gzip encoder into a temporary file, then move it
/// into place. The original is removed only after the archive is complete.
fn gzip_file(path: &Path) -> io::Result<PathBuf> {
    use std::fs::File;
    use std::io::{BufReader, BufWriter};

    let gz_path = append_extension(path, "gz");
    let tmp_path = append_extension(path, "gz.tmp");

    let result = (|| {
        let mut reader = BufReader::with_capacity(COMPRESS_BUFFER_SIZE, File::open(path)?);
        let output = BufWriter::with_capacity(COMPRESS_BUFFER_SIZE, File::create(&tmp_path)?);
        let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::default());
        io::copy(&mut reader, &mut encoder)?;
        encoder.finish()?.into_inner().map_err(|e| e.into_error())?;
        std::fs::rename(&tmp_path, &gz_path)
    })();

    if let Err(e) = result {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e);
    }
    std::fs::remove_file(path)?;
    Ok(gz_path)
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationConfig {
    /// Folder scanned for archives during cleanup
    pub log_folder: PathBuf,
    pub max_size: u64,
    pub max_files: usize,
    pub compress: bool,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            log_folder: PathBuf::from(crate::config::DEFAULT_LOG_FOLDER),
            max_size: 10 * 1024 * 1024,
            max_files: 5,
            compress: false,
        }
    }
}

pub struct RotationManager {
    fs: Arc<dyn LogFs>,
    clock: Arc<dyn Clock>,
}

impl RotationManager {
    /// Manager over the real filesystem and clock
    pub fn new() -> Self {
        Self::with_deps(Arc::new(TokioFs), Arc::new(SystemClock))
    }

    pub fn with_deps(fs: Arc<dyn LogFs>, clock: Arc<dyn Clock>) -> Self {
        Self { fs, clock }
    }

    /// Rotate `path` when it has reached `config.max_size`.
    ///
    /// Returns `false` when the file is missing or still small. Failures of
    /// the rotation itself are `Rotate` errors; a failed cleanup afterwards
    /// surfaces as `Cleanup` and leaves the completed rotation in place.
    pub async fn check_and_rotate(&self, path: &Path, config: &RotationConfig) -> Result<bool> {
        let rotate_err = |e: io::Error| LoggerError::rotate(path.display().to_string(), e);

        let Some(size) = self.fs.file_size(path).await.map_err(rotate_err)? else {
            return Ok(false);
        };
        if size < config.max_size {
            return Ok(false);
        }

        let archive = self
            .free_archive_path(path, self.clock.now())
            .await
            .map_err(rotate_err)?;
        self.fs.rename(path, &archive).await.map_err(rotate_err)?;
        self.fs.create_empty(path).await.map_err(rotate_err)?;
        if config.compress {
            self.fs.compress(&archive).await.map_err(rotate_err)?;
        }

        self.cleanup_old_archives(&config.log_folder, config).await?;
        Ok(true)
    }

    /// First archive name at or after `now` with neither a plain nor a
    /// gzipped file behind it
    async fn free_archive_path(&self, path: &Path, now: DateTime<Utc>) -> io::Result<PathBuf> {
        let mut at = now;
        for _ in 0..MAX_ARCHIVE_ATTEMPTS {
            let archive = archive_path(path, at);
            if self.fs.file_size(&archive).await?.is_none()
                && self
                    .fs
                    .file_size(&append_extension(&archive, "gz"))
                    .await?
                    .is_none()
            {
                return Ok(archive);
            }
            at += chrono::Duration::milliseconds(1);
        }
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("no free archive name for {}", path.display()),
        ))
    }

    /// Delete archives in `folder` beyond the newest `config.max_files`.
    ///
    /// Age comes from the timestamp embedded in each archive name. Returns the
    /// deleted paths, oldest last.
    pub async fn cleanup_old_archives(
        &self,
        folder: &Path,
        config: &RotationConfig,
    ) -> Result<Vec<PathBuf>> {
        let names = self.fs.list_dir(folder).await.map_err(LoggerError::cleanup)?;

        let mut archives: Vec<(DateTime<Utc>, PathBuf)> = names
            .iter()
            .filter_map(|name| archive_timestamp(name).map(|ts| (ts, folder.join(name))))
            .collect();
        archives.sort_by(|a, b| b.0.cmp(&a.0));

        let mut deleted = Vec::new();
        for (_, path) in archives.into_iter().skip(config.max_files) {
            self.fs.remove(&path).await.map_err(LoggerError::cleanup)?;
            deleted.push(path);
        }
        Ok(deleted)
    }
}

impl Default for RotationManager {
    fn default() -> Self {
        Self::new()
    }
}

/// `<path>.<timestamp>` for a rotation at `now`
pub fn archive_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    append_extension(path, &now.format(ARCHIVE_TIMESTAMP_FORMAT).to_string())
}

fn archive_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\.(\d{4})-(\d{2})-(\d{2})T(\d{2})-(\d{2})-(\d{2})(?:-(\d{1,9}))?Z(?:\.gz)?$").ok()
    })
    .as_ref()
}

/// Timestamp embedded in an archive file name, `None` for other files
pub fn archive_timestamp(name: &str) -> Option<DateTime<Utc>> {
    let caps = archive_regex()?.captures(name)?;
    let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let millis = match caps.get(7) {
        Some(frac) => {
            let digits = frac.as_str();
            let padded: String = digits.chars().chain("000".chars()).take(3).collect();
            padded.parse::<u32>().ok()?
        }
        None => 0,
    };

    NaiveDate::from_ymd_opt(year, num(2)?, num(3)?)?
        .and_hms_milli_opt(num(4)?, num(5)?, num(6)?, millis)
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FixedClock;
    use chrono::TimeZone;
    use parking_lot::Mutex;
    use std::io::Read;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 12, h, m, s).single().unwrap()
    }

    fn manager(now: DateTime<Utc>) -> RotationManager {
        RotationManager::with_deps(Arc::new(TokioFs), Arc::new(FixedClock(now)))
    }

    fn config(folder: &Path, max_size: u64, max_files: usize) -> RotationConfig {
        RotationConfig {
            log_folder: folder.to_path_buf(),
            max_size,
            max_files,
            compress: false,
        }
    }

    #[test]
    fn test_archive_path_format() {
        let now = Utc
            .with_ymd_and_hms(2025, 6, 12, 10, 20, 30)
            .single()
            .unwrap()
            + chrono::Duration::milliseconds(123);
        let archive = archive_path(Path::new("/var/log/app.log"), now);
        assert_eq!(
            archive,
            PathBuf::from("/var/log/app.log.2025-06-12T10-20-30-123Z")
        );
        assert_eq!(
            archive_timestamp(&archive.to_string_lossy()),
            Some(now)
        );
    }

    #[test]
    fn test_archive_timestamp_rejects_other_files() {
        assert!(archive_timestamp("app.log").is_none());
        assert!(archive_timestamp("app.log.2025-06-12").is_none());
        assert!(archive_timestamp("app.log.2025-06-12T10-20-30Z").is_some());
        assert!(archive_timestamp("app.log.2025-06-12T10-20-30-001Z.gz").is_some());
    }

    #[tokio::test]
    async fn test_rotates_at_max_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, vec![b'x'; 2048]).unwrap();

        let rotated = manager(at(10, 0, 0))
            .check_and_rotate(&path, &config(dir.path(), 1024, 5))
            .await
            .unwrap();

        assert!(rotated);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
        let archive = dir.path().join("app.log.2025-06-12T10-00-00-000Z");
        assert_eq!(std::fs::metadata(&archive).unwrap().len(), 2048);
    }

    #[tokio::test]
    async fn test_same_instant_rotations_keep_both_archives() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let manager = manager(at(10, 0, 0));
        let cfg = config(dir.path(), 1024, 5);

        std::fs::write(&path, vec![b'x'; 2048]).unwrap();
        assert!(manager.check_and_rotate(&path, &cfg).await.unwrap());
        std::fs::write(&path, vec![b'y'; 1500]).unwrap();
        assert!(manager.check_and_rotate(&path, &cfg).await.unwrap());

        let first = dir.path().join("app.log.2025-06-12T10-00-00-000Z");
        let second = dir.path().join("app.log.2025-06-12T10-00-00-001Z");
        assert_eq!(std::fs::read(&first).unwrap(), vec![b'x'; 2048]);
        assert_eq!(std::fs::read(&second).unwrap(), vec![b'y'; 1500]);
    }

    #[tokio::test]
    async fn test_small_or_missing_file_is_left_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let manager = manager(at(10, 0, 0));
        let cfg = config(dir.path(), 1024, 5);

        assert!(!manager.check_and_rotate(&path, &cfg).await.unwrap());

        std::fs::write(&path, vec![b'x'; 1023]).unwrap();
        assert!(!manager.check_and_rotate(&path, &cfg).await.unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_cleanup_deletes_oldest() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "app.log.2025-06-10T08-00-00-000Z",
            "app.log.2025-06-12T08-00-00-000Z",
            "app.log.2025-06-11T08-00-00-000Z",
            "app.log",
        ] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }

        let deleted = manager(at(10, 0, 0))
            .cleanup_old_archives(dir.path(), &config(dir.path(), 1024, 2))
            .await
            .unwrap();

        assert_eq!(
            deleted,
            vec![dir.path().join("app.log.2025-06-10T08-00-00-000Z")]
        );
        assert!(dir.path().join("app.log").exists());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_cleanup_of_missing_folder_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = manager(at(10, 0, 0))
            .cleanup_old_archives(&missing, &config(&missing, 1024, 2))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "LOG_CLEANUP_FAILED");
    }

    #[tokio::test]
    async fn test_compressed_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        std::fs::write(&path, "line\n".repeat(400)).unwrap();

        let cfg = RotationConfig {
            compress: true,
            ..config(dir.path(), 1024, 5)
        };
        assert!(manager(at(11, 0, 0)).check_and_rotate(&path, &cfg).await.unwrap());

        let gz = dir.path().join("app.log.2025-06-12T11-00-00-000Z.gz");
        let mut decoded = String::new();
        flate2::read::GzDecoder::new(std::fs::File::open(&gz).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "line\n".repeat(400));
        assert!(!dir.path().join("app.log.2025-06-12T11-00-00-000Z").exists());
    }

    /// Real filesystem except that `rename` fails
    struct RenameFails {
        calls: Mutex<Vec<&'static str>>,
    }

    #[async_trait]
    impl LogFs for RenameFails {
        async fn file_size(&self, path: &Path) -> io::Result<Option<u64>> {
            self.calls.lock().push("size");
            Ok(path.ends_with("app.log").then_some(4096))
        }

        async fn rename(&self, _from: &Path, _to: &Path) -> io::Result<()> {
            self.calls.lock().push("rename");
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
        }

        async fn create_empty(&self, _path: &Path) -> io::Result<()> {
            self.calls.lock().push("create");
            Ok(())
        }

        async fn list_dir(&self, _dir: &Path) -> io::Result<Vec<String>> {
            self.calls.lock().push("list");
            Ok(Vec::new())
        }

        async fn remove(&self, _path: &Path) -> io::Result<()> {
            Ok(())
        }

        async fn compress(&self, path: &Path) -> io::Result<PathBuf> {
            Ok(path.to_path_buf())
        }
    }

    #[tokio::test]
    async fn test_rename_failure_is_a_rotate_error() {
        let fs = Arc::new(RenameFails {
            calls: Mutex::new(Vec::new()),
        });
        let manager = RotationManager::with_deps(fs.clone(), Arc::new(FixedClock(at(9, 0, 0))));
        let err = manager
            .check_and_rotate(Path::new("/logs/app.log"), &config(Path::new("/logs"), 1024, 2))
            .await
            .unwrap_err();

        assert_eq!(err.code(), "LOG_ROTATE_FAILED");
        assert!(err.to_string().contains("read-only"));
        assert_eq!(*fs.calls.lock(), vec!["size", "size", "size", "rename"]);
    }
}
