//! Utility modules for common functionality
//!
//! Provides reusable utilities for file operations, process execution,
//! and git revision lookup.

pub mod fs;
pub mod git;
pub mod process;

pub use fs::FileSystemUtils;
pub use git::GitInfo;
pub use process::ProcessRunner;
