//! File system utility functions
//!
//! Provides safe file operations with proper error handling.

use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, instrument};

/// Utility struct for file system operations
#[derive(Debug)]
pub struct FileSystemUtils;

impl FileSystemUtils {
    /// Create a new file system utilities instance
    pub fn new() -> Self {
        Self
    }

    /// Create directories recursively
    #[instrument(skip(self))]
    pub fn create_dir_all<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> io::Result<()> {
        let path = path.as_ref();
        debug!("Creating directory: {}", path.display());
        fs::create_dir_all(path)
    }

    /// Write content to a file, creating parent directories if needed
    #[instrument(skip(self, contents))]
    pub fn write_file<P: AsRef<Path> + std::fmt::Debug, C: AsRef<[u8]>>(
        &self,
        path: P,
        contents: C,
    ) -> io::Result<()> {
        let path = path.as_ref();

        debug!("Writing file: {}", path.display());

        // Create parent directories if they don't exist
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }

        fs::write(path, contents)?;
        debug!("File written successfully");
        Ok(())
    }

    /// Write content to a file only when it differs from what is on disk
    ///
    /// Leaves an up-to-date file completely untouched (no write, mtime
    /// preserved) so downstream build systems see no change. Returns
    /// `true` when the file was written.
    #[instrument(skip(self, contents))]
    pub fn write_if_changed<P: AsRef<Path> + std::fmt::Debug, C: AsRef<[u8]>>(
        &self,
        path: P,
        contents: C,
    ) -> io::Result<bool> {
        let path = path.as_ref();
        let contents = contents.as_ref();

        if path.is_file() {
            match fs::read(path) {
                Ok(existing) if existing == contents => {
                    debug!("File is up to date, skipping write: {}", path.display());
                    return Ok(false);
                }
                Ok(_) => debug!("File content differs, rewriting: {}", path.display()),
                // Unreadable existing file: fall through and overwrite
                Err(e) => debug!("Could not read existing file ({}), rewriting", e),
            }
        }

        self.write_file(path, contents)?;
        Ok(true)
    }

    /// Read file contents as string
    #[instrument(skip(self))]
    pub fn read_file_to_string<P: AsRef<Path> + std::fmt::Debug>(
        &self,
        path: P,
    ) -> io::Result<String> {
        let path = path.as_ref();
        debug!("Reading file: {}", path.display());
        fs::read_to_string(path)
    }

    /// Check if a path exists and is a file
    pub fn is_file<P: AsRef<Path>>(&self, path: P) -> bool {
        path.as_ref().is_file()
    }

    /// Get file size in bytes
    #[instrument(skip(self))]
    pub fn file_size<P: AsRef<Path> + std::fmt::Debug>(&self, path: P) -> io::Result<u64> {
        let path = path.as_ref();
        let metadata = fs::metadata(path)?;
        Ok(metadata.len())
    }
}

impl Default for FileSystemUtils {
    fn default() -> Self {
        Self::new()
    }
}
