//! Version header generation
//!
//! Renders the engine's `version.hpp` build-config header from the
//! version components and the current git revision, and writes it with
//! a content comparison so an unchanged header never retriggers
//! downstream rebuilds.

use crate::{
    error::{Result, ToolError},
    utils::fs::FileSystemUtils,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

/// Complete version information embedded in the generated header
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionInfo {
    /// SemVer major component
    pub major: u32,
    /// SemVer minor component
    pub minor: u32,
    /// SemVer patch component
    pub patch: u32,
    /// Prerelease suffix; empty when the build has none
    pub suffix: String,
    /// Short revision hash, or the `unknown` sentinel
    pub revision: String,
}

impl VersionInfo {
    /// Assemble version information from components
    pub fn new(
        major: u32,
        minor: u32,
        patch: u32,
        suffix: Option<String>,
        revision: String,
    ) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: suffix.unwrap_or_default(),
            revision,
        }
    }

    /// Combined human-readable version, e.g. `1.2.3-beta (git-0123abcd)`
    ///
    /// The suffix separator is omitted when the suffix is empty.
    pub fn display_string(&self) -> String {
        let separator = if self.suffix.is_empty() { "" } else { "-" };
        format!(
            "{}.{}.{}{}{} (git-{})",
            self.major, self.minor, self.patch, separator, self.suffix, self.revision
        )
    }
}

/// Result of a version header generation run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The output file was created or rewritten
    Written,
    /// The on-disk file already matched, nothing was touched
    Unchanged,
}

/// Generator for the `version.hpp` build-config header
#[derive(Debug)]
pub struct VersionGenerator {
    fs_utils: FileSystemUtils,
}

impl VersionGenerator {
    /// Create a new version header generator
    pub fn new() -> Self {
        Self {
            fs_utils: FileSystemUtils::new(),
        }
    }

    /// Render the header and write it out if its content changed
    ///
    /// Creates missing parent directories. The write is skipped
    /// entirely when the file already holds the rendered bytes.
    #[instrument(skip(self, info, output_file))]
    pub fn generate<P: AsRef<Path>>(
        &self,
        info: &VersionInfo,
        output_file: P,
    ) -> Result<WriteOutcome> {
        let output_file = output_file.as_ref();
        debug!(
            "Generating version header for {} at: {}",
            info.display_string(),
            output_file.display()
        );

        let content = self.render(info);
        let wrote = self
            .fs_utils
            .write_if_changed(output_file, content.as_bytes())
            .map_err(|e| ToolError::file_system("write", output_file.to_path_buf(), e))?;

        let outcome = if wrote {
            WriteOutcome::Written
        } else {
            WriteOutcome::Unchanged
        };

        debug!("Version header {:?}: {:?}", output_file, outcome);
        Ok(outcome)
    }

    /// Render the fixed header template for the given version
    ///
    /// Pure: identical inputs produce byte-identical output.
    fn render(&self, info: &VersionInfo) -> String {
        format!(
            r#"// GENERATED FILE, DO NOT EDIT
#pragma once

namespace voxen::Version
{{

// Voxen version, follows SemVer 2.0.0
constexpr inline int MAJOR = {major};
constexpr inline int MINOR = {minor};
constexpr inline int PATCH = {patch};

// Optional prerelease suffix
constexpr inline char SUFFIX[] = "{suffix}";
// Partial hash of Git commit, can be `unknown`
constexpr inline char GIT_HASH[] = "{revision}";

// All components of version combined, usable for logging/display
constexpr inline char STRING[] = "{display}";

}}
"#,
            major = info.major,
            minor = info.minor,
            patch = info.patch,
            suffix = info.suffix,
            revision = info.revision,
            display = info.display_string(),
        )
    }
}

impl Default for VersionGenerator {
    fn default() -> Self {
        Self::new()
    }
}
