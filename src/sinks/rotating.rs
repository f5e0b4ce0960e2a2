//! Rotating file sink with size-capped files and backup pruning
//!
//! The active file is sealed and renamed to a timestamped backup when a
//! write would push it past the size cap. Sealed backups are optionally
//! gzip-compressed, pruned down to the backup-count limit and pruned by
//! age.

use crate::core::error::{LoggerError, Result};
use chrono::{DateTime, Duration, Local, NaiveDateTime};
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Timestamp layout embedded in backup file names
const BACKUP_TIME_LAYOUT: &str = "%Y-%m-%dT%H-%M-%S%.3f";

/// Configuration for the rotating file sink
///
/// # Examples
///
/// ```
/// use service_kit::sinks::RotationPolicy;
///
/// let policy = RotationPolicy::new()
///     .max_size_mb(64)
///     .max_backups(7)
///     .max_age_days(14)
///     .compress(true);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPolicy {
    /// Size cap for the active file in bytes
    max_bytes: u64,
    /// Backups kept beyond the active file; 0 keeps all
    max_backups: usize,
    /// Backups older than this are deleted; 0 keeps all
    max_age_days: u64,
    /// Whether sealed backups are gzip-compressed
    compress: bool,
}

impl Default for RotationPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 128 * 1024 * 1024,
            max_backups: 300,
            max_age_days: 30,
            compress: true,
        }
    }
}

impl RotationPolicy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the size cap in megabytes
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_bytes = megabytes * 1024 * 1024;
        self
    }

    /// Set the size cap in raw bytes
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_bytes = bytes;
        self
    }

    /// Set the backup-count limit; 0 disables count pruning
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn max_backups(mut self, count: usize) -> Self {
        self.max_backups = count;
        self
    }

    /// Set the backup age limit in days; 0 disables age pruning
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn max_age_days(mut self, days: u64) -> Self {
        self.max_age_days = days;
        self
    }

    /// Enable gzip compression of sealed backups
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn compress(mut self, enabled: bool) -> Self {
        self.compress = enabled;
        self
    }

    #[must_use]
    pub fn max_file_size(&self) -> u64 {
        self.max_bytes
    }
}

struct RotatorState {
    writer: Option<BufWriter<File>>,
    size: u64,
}

/// Size-rotated file sink
///
/// # Examples
///
/// ```no_run
/// use service_kit::sinks::{RotatingFileSink, RotationPolicy};
///
/// let policy = RotationPolicy::new().max_size_mb(128).max_backups(30);
/// let sink = RotatingFileSink::open("/var/log/app/access.log", policy).unwrap();
/// ```
pub struct RotatingFileSink {
    path: PathBuf,
    policy: RotationPolicy,
    state: Mutex<RotatorState>,
}

impl RotatingFileSink {
    /// Open the active file in create-or-append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file
    /// cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P, policy: RotationPolicy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                LoggerError::io_operation(
                    "create log directory",
                    format!("Failed to create directory '{}'", parent.display()),
                    e,
                )
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::sink_open(path.display().to_string(), format!("Failed to open: {}", e))
            })?;

        let size = file
            .metadata()
            .map_err(|e| {
                LoggerError::sink_open(
                    path.display().to_string(),
                    format!("Cannot access file metadata: {}", e),
                )
            })?
            .len();

        Ok(Self {
            path,
            policy,
            state: Mutex::new(RotatorState {
                writer: Some(BufWriter::new(file)),
                size,
            }),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn policy(&self) -> &RotationPolicy {
        &self.policy
    }

    /// Current size of the active file in bytes
    #[must_use]
    pub fn current_size(&self) -> u64 {
        self.state.lock().size
    }

    /// Write one encoded record.
    ///
    /// When the record would push the active file past the size cap, the
    /// file is sealed first and the whole record goes to the fresh file,
    /// so no record is ever split or duplicated across a boundary.
    ///
    /// # Errors
    ///
    /// Returns an error for a record larger than the size cap itself, or
    /// when the active file cannot be written.
    pub fn write(&self, buf: &[u8]) -> Result<()> {
        let len = buf.len() as u64;
        if len > self.policy.max_bytes {
            return Err(LoggerError::RecordTooLarge {
                size: buf.len(),
                max: self.policy.max_bytes,
            });
        }

        let mut state = self.state.lock();

        if state.size + len > self.policy.max_bytes {
            if let Err(e) = self.rotate(&mut state) {
                // Keep logging into the current file rather than lose the
                // record; reset size tracking so we do not retry every write.
                eprintln!("[LOGGER WARN] Rotation failed: {}. Continuing with current file.", e);
                if state.writer.is_none() {
                    let (writer, size) = Self::reopen(&self.path)?;
                    state.writer = Some(writer);
                    state.size = size;
                } else {
                    state.size = 0;
                }
            }
        }

        let writer = state
            .writer
            .as_mut()
            .ok_or_else(|| LoggerError::other("Rotating writer not initialized"))?;
        writer.write_all(buf).map_err(|e| {
            LoggerError::io_operation(
                "writing record",
                format!("Failed to write to '{}'", self.path.display()),
                e,
            )
        })?;
        state.size += len;
        Ok(())
    }

    pub fn flush(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(ref mut writer) = state.writer {
            writer.flush().map_err(|e| {
                LoggerError::io_operation(
                    "flushing sink",
                    format!("Failed to flush '{}'", self.path.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }

    /// Seal the active file and start a fresh one.
    fn rotate(&self, state: &mut RotatorState) -> Result<()> {
        if let Some(mut writer) = state.writer.take() {
            writer.flush().map_err(|e| {
                LoggerError::rotation(
                    self.path.display().to_string(),
                    format!("Failed to flush before rotation: {}", e),
                )
            })?;
            // Writer drops here, releasing the file handle before rename
        }

        let backup = self.next_backup_path(&Local::now());
        fs::rename(&self.path, &backup).map_err(|e| {
            LoggerError::rotation(
                self.path.display().to_string(),
                format!("Failed to seal active file: {}", e),
            )
        })?;

        if self.policy.compress {
            self.compress_backup(&backup)?;
        }

        self.prune_backups();

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                LoggerError::rotation(
                    self.path.display().to_string(),
                    format!("Failed to create new active file: {}", e),
                )
            })?;

        state.writer = Some(BufWriter::new(file));
        state.size = 0;
        Ok(())
    }

    fn reopen(path: &Path) -> Result<(BufWriter<File>, u64)> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                LoggerError::sink_open(
                    path.display().to_string(),
                    format!("Failed to reopen after rotation failure: {}", e),
                )
            })?;
        let size = file.metadata().map(|m| m.len()).unwrap_or(0);
        Ok((BufWriter::new(file), size))
    }

    fn stem_and_ext(&self) -> (String, String) {
        let stem = self
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("app")
            .to_string();
        let ext = self
            .path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("log")
            .to_string();
        (stem, ext)
    }

    /// Backup path `{stem}-{timestamp}.{ext}`; a numeric suffix is probed
    /// when rotations land in the same millisecond.
    fn next_backup_path(&self, now: &DateTime<Local>) -> PathBuf {
        let (stem, ext) = self.stem_and_ext();
        let dir = self.path.parent().map(Path::to_path_buf).unwrap_or_default();
        let stamp = now.format(BACKUP_TIME_LAYOUT);

        let candidate = dir.join(format!("{}-{}.{}", stem, stamp, ext));
        if !candidate.exists() && !Self::gz_path(&candidate).exists() {
            return candidate;
        }
        let mut n = 1;
        loop {
            let candidate = dir.join(format!("{}-{}-{}.{}", stem, stamp, n, ext));
            if !candidate.exists() && !Self::gz_path(&candidate).exists() {
                return candidate;
            }
            n += 1;
        }
    }

    fn gz_path(path: &Path) -> PathBuf {
        PathBuf::from(format!("{}.gz", path.display()))
    }

    /// Compress a sealed backup in place, streaming through a temp file.
    ///
    /// The original is removed only after the compressed file has been
    /// fully written and atomically renamed, so a failure mid-way never
    /// loses record bytes.
    fn compress_backup(&self, path: &Path) -> Result<()> {
        use std::io::{BufReader, Read};

        let gz_path = Self::gz_path(path);
        let tmp_path = PathBuf::from(format!("{}.tmp", gz_path.display()));

        let input = File::open(path).map_err(|e| {
            LoggerError::io_operation(
                "compress backup",
                format!("Failed to open sealed file: {}", path.display()),
                e,
            )
        })?;
        let mut reader = BufReader::with_capacity(64 * 1024, input);

        let output = File::create(&tmp_path).map_err(|e| {
            LoggerError::io_operation(
                "compress backup",
                format!("Failed to create temporary file: {}", tmp_path.display()),
                e,
            )
        })?;
        let mut encoder = flate2::write::GzEncoder::new(
            BufWriter::with_capacity(64 * 1024, output),
            flate2::Compression::default(),
        );

        let mut buffer = vec![0u8; 64 * 1024];
        loop {
            let n = reader.read(&mut buffer).map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                LoggerError::io_operation(
                    "compress backup",
                    format!("Failed to read sealed file: {}", path.display()),
                    e,
                )
            })?;
            if n == 0 {
                break;
            }
            encoder.write_all(&buffer[..n]).map_err(|e| {
                let _ = fs::remove_file(&tmp_path);
                LoggerError::io_operation("compress backup", "Failed to compress chunk".to_string(), e)
            })?;
        }

        encoder.finish().map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            LoggerError::io_operation("compress backup", "Failed to finish compression".to_string(), e)
        })?;

        fs::rename(&tmp_path, &gz_path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            LoggerError::io_operation(
                "compress backup",
                format!("Failed to rename compressed file to: {}", gz_path.display()),
                e,
            )
        })?;

        if let Err(e) = fs::remove_file(path) {
            eprintln!(
                "[LOGGER WARN] Compression succeeded but failed to remove sealed file {}: {}. \
                 Both versions exist until the next rotation.",
                path.display(),
                e
            );
        }

        Ok(())
    }

    /// Delete backups beyond the count limit and backups past the age
    /// limit, newest first. Failures are reported and skipped.
    fn prune_backups(&self) {
        let mut backups = self.list_backups();
        // Newest first
        backups.sort_by(|a, b| b.1.cmp(&a.1));

        let cutoff = if self.policy.max_age_days > 0 {
            Some(Local::now().naive_local() - Duration::days(self.policy.max_age_days as i64))
        } else {
            None
        };

        for (idx, (path, stamp)) in backups.iter().enumerate() {
            let over_count = self.policy.max_backups > 0 && idx >= self.policy.max_backups;
            let over_age = cutoff.map_or(false, |c| *stamp < c);
            if !over_count && !over_age {
                continue;
            }
            if let Err(e) = fs::remove_file(path) {
                eprintln!(
                    "[LOGGER WARN] Failed to remove old backup {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }

    /// Enumerate backup files next to the active file, with the age taken
    /// from the file-name timestamp or the mtime as a fallback.
    fn list_backups(&self) -> Vec<(PathBuf, NaiveDateTime)> {
        let (stem, ext) = self.stem_and_ext();
        let prefix = format!("{}-", stem);
        let plain_suffix = format!(".{}", ext);
        let gz_suffix = format!(".{}.gz", ext);

        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Vec::new(),
        };

        let mut backups = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(&prefix) {
                continue;
            }
            let stamp_str = if let Some(s) = name
                .strip_prefix(&prefix)
                .and_then(|s| s.strip_suffix(&gz_suffix))
            {
                s
            } else if let Some(s) = name
                .strip_prefix(&prefix)
                .and_then(|s| s.strip_suffix(&plain_suffix))
            {
                s
            } else {
                continue;
            };

            let stamp = NaiveDateTime::parse_from_str(stamp_str, BACKUP_TIME_LAYOUT)
                .ok()
                .or_else(|| {
                    entry
                        .metadata()
                        .ok()
                        .and_then(|m| m.modified().ok())
                        .map(|t| DateTime::<Local>::from(t).naive_local())
                });
            if let Some(stamp) = stamp {
                backups.push((entry.path(), stamp));
            }
        }
        backups
    }
}

impl Drop for RotatingFileSink {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        if let Some(mut writer) = state.writer.take() {
            let _ = writer.flush();
        }
    }
}
