//! Git revision lookup
//!
//! Resolves the commit hash embedded in the generated version header.
//! Strictly best-effort: source tarballs without history and hosts
//! without a git binary are normal, so every failure degrades to a
//! sentinel instead of propagating.

use crate::utils::process::ProcessRunner;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Sentinel revision used when the commit hash cannot be resolved
pub const UNKNOWN_REVISION: &str = "unknown";

/// Number of hash characters kept for display and embedding
pub const SHORT_HASH_LEN: usize = 16;

/// Best-effort resolver for the current source revision
#[derive(Debug)]
pub struct GitInfo {
    runner: ProcessRunner,
    git_dir: Option<PathBuf>,
    hash_length: usize,
}

impl GitInfo {
    /// Create a new revision resolver
    ///
    /// When `git_dir` is `None`, git's own working-directory discovery
    /// applies.
    pub fn new(git_dir: Option<PathBuf>, hash_length: usize, debug: bool) -> Self {
        Self {
            runner: ProcessRunner::new(debug),
            git_dir,
            hash_length,
        }
    }

    /// Resolve the current commit hash, truncated to the configured length
    ///
    /// Never fails: a missing git binary, absent history, or an invalid
    /// git directory all yield [`UNKNOWN_REVISION`].
    #[instrument(skip(self))]
    pub fn revision(&self) -> String {
        let mut args: Vec<String> = Vec::new();
        if let Some(dir) = &self.git_dir {
            args.push("--git-dir".to_string());
            args.push(dir.to_string_lossy().into_owned());
        }
        args.push("rev-parse".to_string());
        args.push("HEAD".to_string());

        let args_str: Vec<&str> = args.iter().map(String::as_str).collect();
        match self.runner.run_command_with_output("git", &args_str) {
            Ok(output) => {
                let hash = short_hash(&output.stdout, self.hash_length);
                if hash.is_empty() {
                    debug!("git returned an empty revision, using sentinel");
                    UNKNOWN_REVISION.to_string()
                } else {
                    debug!("Resolved revision: {}", hash);
                    hash
                }
            }
            Err(e) => {
                debug!("Revision lookup failed ({}), using sentinel", e);
                UNKNOWN_REVISION.to_string()
            }
        }
    }
}

/// Trim and truncate raw `git rev-parse` output to a display hash
pub fn short_hash(raw: &str, length: usize) -> String {
    raw.trim().chars().take(length).collect()
}
