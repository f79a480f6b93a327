use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use chrono::Local;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::caption::model::CaptionFormat;
use crate::errors::CaptionError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().exists() && path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Check that `path` carries the extension of `format`
    pub fn validate_extension<P: AsRef<Path>>(path: P, format: CaptionFormat) -> Result<(), CaptionError> {
        let path = path.as_ref();
        if CaptionFormat::from_path(path) == Some(format) {
            Ok(())
        } else {
            Err(CaptionError::InvalidExtension {
                path: path.to_path_buf(),
                expected: format,
            })
        }
    }

    // @generates: Sibling path with the target format's extension
    pub fn caption_output_path<P: AsRef<Path>>(input_file: P, target: CaptionFormat) -> PathBuf {
        input_file.as_ref().with_extension(target.extension())
    }

    /// Find files whose extension maps to `format` in a directory tree
    pub fn find_caption_files<P: AsRef<Path>>(dir: P, format: CaptionFormat) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() && CaptionFormat::from_path(path) == Some(format) {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a whole caption file. The handle is closed before returning.
    pub fn read_caption<P: AsRef<Path>>(path: P) -> Result<String, CaptionError> {
        let path = path.as_ref();
        fs::read_to_string(path).map_err(|source| CaptionError::UnreadableInput {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write `content` to `path` through a temporary file in the same
    /// directory, then rename it into place.
    ///
    /// Readers never observe a partially written file, and a failure leaves
    /// any previous file at `path` untouched.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<(), CaptionError> {
        let path = path.as_ref();
        let unwritable = |source| CaptionError::UnwritableOutput {
            path: path.to_path_buf(),
            source,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(unwritable)?;

        let mut temp = NamedTempFile::new_in(dir).map_err(unwritable)?;
        temp.write_all(content.as_bytes()).map_err(unwritable)?;
        temp.as_file().sync_all().map_err(unwritable)?;
        temp.persist(path).map_err(|e| unwritable(e.error))?;

        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
