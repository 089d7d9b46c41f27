//! Core functionality for the Voxen tooling
//!
//! Contains the main logic for generating the version header and for
//! maintaining the bundled Vulkan headers.

pub mod headers;
pub mod version;

pub use headers::{HeaderUpdater, UpdateSummary};
pub use version::{VersionGenerator, VersionInfo, WriteOutcome};
