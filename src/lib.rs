//! # Voxen Tooling
//!
//! Build and maintenance tooling for the Voxen engine tree. This library
//! provides functionality to generate the engine's version header from
//! SemVer components and the git revision, and to refresh the bundled
//! Vulkan headers from the Khronos upstream.
//!
//! ## Features
//!
//! - Version header generation with content-comparing writes, so an
//!   unchanged header never retriggers downstream rebuilds
//! - Git revision lookup with a graceful `unknown` fallback outside a
//!   repository
//! - Vulkan header download, platform patching and declaration
//!   annotation in one fail-fast sequence
//! - Manifest-driven header lists with built-in defaults
//! - Professional error handling and logging
//!
//! ## Example
//!
//! ```no_run
//! use voxen_tools::core::{VersionGenerator, VersionInfo};
//!
//! let info = VersionInfo::new(1, 2, 3, None, "0123456789abcdef".to_string());
//! let generator = VersionGenerator::new();
//! generator.generate(&info, "include/voxen/version.hpp")?;
//! # Ok::<(), voxen_tools::error::ToolError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod utils;

use anyhow::Result;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging with appropriate verbosity
pub fn setup_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true)
                .compact(),
        )
        .with(filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
