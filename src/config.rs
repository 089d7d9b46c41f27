//! Configuration management for the Voxen tooling
//!
//! Centralizes configuration options and provides validation. Header
//! maintenance settings carry built-in defaults matching the engine's
//! 3rdparty layout and the Khronos upstream; a JSON manifest can
//! override any subset of them.

use crate::{cli::Args, error::ToolError, utils::git::SHORT_HASH_LEN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Enable debug logging
    pub debug: bool,
    /// Version header generation settings
    pub version: VersionConfig,
    /// Vulkan header maintenance settings
    pub headers: HeadersConfig,
}

/// Version header generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionConfig {
    /// Output path of the generated header
    pub output_file: PathBuf,
    /// SemVer major component
    pub major: u32,
    /// SemVer minor component
    pub minor: u32,
    /// SemVer patch component
    pub patch: u32,
    /// Optional prerelease suffix
    pub suffix: Option<String>,
    /// Explicit git directory; `None` lets git discover it from the cwd
    pub git_dir: Option<PathBuf>,
    /// Number of revision hash characters embedded in the header
    pub hash_length: usize,
}

/// Vulkan header maintenance configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadersConfig {
    /// Directory receiving the core API headers
    pub api_dir: PathBuf,
    /// Sibling directory receiving the video codec headers
    pub video_dir: PathBuf,
    /// Upstream base URL for the core API headers
    pub api_base_url: String,
    /// Upstream base URL for the video codec headers
    pub video_base_url: String,
    /// Platform header that receives the local patch
    pub platform_header: String,
    /// Patch file applied to the platform header, relative to `api_dir`
    pub platform_patch: String,
    /// Core API headers, downloaded and annotated in order
    pub api_headers: Vec<String>,
    /// Video codec headers, downloaded verbatim in order
    pub video_headers: Vec<String>,
    /// Declaration-terminator pattern rewritten during annotation
    pub annotate_pattern: String,
    /// Replacement carrying the calling-convention macro
    pub annotate_replacement: String,
    /// External download tool
    pub download_cmd: String,
    /// Arguments passed to the download tool before `<url> -o <path>`
    pub download_args: Vec<String>,
    /// External patch tool
    pub patch_cmd: String,
    /// Arguments passed to the patch tool before `<target> <patch-file>`
    pub patch_args: Vec<String>,
    /// Whether the video codec headers are fetched at all
    pub include_video: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            version: VersionConfig::default(),
            headers: HeadersConfig::default(),
        }
    }
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("version.hpp"),
            major: 0,
            minor: 0,
            patch: 0,
            suffix: None,
            git_dir: None,
            hash_length: SHORT_HASH_LEN,
        }
    }
}

impl Default for HeadersConfig {
    fn default() -> Self {
        Self {
            api_dir: PathBuf::from("3rdparty/vulkan-headers/vulkan"),
            video_dir: PathBuf::from("3rdparty/vulkan-headers/vk_video"),
            api_base_url:
                "https://raw.githubusercontent.com/KhronosGroup/Vulkan-Headers/main/include/vulkan"
                    .to_string(),
            video_base_url:
                "https://raw.githubusercontent.com/KhronosGroup/Vulkan-Headers/main/include/vk_video"
                    .to_string(),
            platform_header: "vk_platform.h".to_string(),
            platform_patch: "vk_platform_patch.diff".to_string(),
            api_headers: vec![
                "vulkan.h".to_string(),
                "vulkan_core.h".to_string(),
                "vulkan_wayland.h".to_string(),
                "vulkan_win32.h".to_string(),
                "vulkan_xcb.h".to_string(),
                "vulkan_xlib_xrandr.h".to_string(),
                "vulkan_xlib.h".to_string(),
            ],
            video_headers: vec![
                "vulkan_video_codecs_common.h".to_string(),
                "vulkan_video_codec_h264std.h".to_string(),
                "vulkan_video_codec_h264std_decode.h".to_string(),
                "vulkan_video_codec_h264std_encode.h".to_string(),
                "vulkan_video_codec_h265std.h".to_string(),
                "vulkan_video_codec_h265std_decode.h".to_string(),
                "vulkan_video_codec_h265std_encode.h".to_string(),
                "vulkan_video_codec_av1std.h".to_string(),
                "vulkan_video_codec_av1std_decode.h".to_string(),
                "vulkan_video_codec_av1std_encode.h".to_string(),
            ],
            annotate_pattern: r"\);".to_string(),
            annotate_replacement: ") VKAPI_NOEXCEPT;".to_string(),
            download_cmd: "curl".to_string(),
            download_args: vec!["-f".to_string(), "-sS".to_string(), "-L".to_string()],
            patch_cmd: "patch".to_string(),
            patch_args: vec!["--no-backup-if-mismatch".to_string()],
            include_video: true,
        }
    }
}

impl Config {
    /// Create configuration from command line arguments
    pub fn from_args(args: &Args) -> Result<Self, ToolError> {
        let mut config = Self {
            debug: args.debug,
            ..Self::default()
        };

        match &args.command {
            crate::cli::Command::Version {
                output_file,
                major,
                minor,
                patch,
                suffix,
                git_dir,
            } => {
                config.version.output_file = output_file.clone();
                config.version.major = *major;
                config.version.minor = *minor;
                config.version.patch = *patch;
                config.version.suffix = suffix.clone();
                config.version.git_dir = git_dir.clone();
            }
            crate::cli::Command::Headers { manifest, skip_video } => {
                if let Some(path) = manifest {
                    config.headers = HeadersConfig::load(path)?;
                }
                if *skip_video {
                    config.headers.include_video = false;
                }
            }
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ToolError> {
        if self.version.hash_length == 0 || self.version.hash_length > 40 {
            return Err(ToolError::validation(format!(
                "Revision hash length must be within 1..=40, got {}",
                self.version.hash_length
            )));
        }

        self.headers.validate()
    }
}

impl HeadersConfig {
    /// Load a manifest file, filling unspecified fields with the defaults
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ToolError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ToolError::config_with_source(
                format!("Failed to read header manifest {}", path.display()),
                e,
            )
        })?;

        serde_json::from_str(&content).map_err(|e| {
            ToolError::config_with_source(
                format!("Failed to parse header manifest {}", path.display()),
                e,
            )
        })
    }

    /// Upstream URL of a core API header
    pub fn api_url(&self, header: &str) -> String {
        format!("{}/{}", self.api_base_url.trim_end_matches('/'), header)
    }

    /// Upstream URL of a video codec header
    pub fn video_url(&self, header: &str) -> String {
        format!("{}/{}", self.video_base_url.trim_end_matches('/'), header)
    }

    /// Get download command with arguments
    pub fn get_download_cmd(&self) -> (String, Vec<String>) {
        (self.download_cmd.clone(), self.download_args.clone())
    }

    /// Get patch command with arguments
    pub fn get_patch_cmd(&self) -> (String, Vec<String>) {
        (self.patch_cmd.clone(), self.patch_args.clone())
    }

    /// Validate header maintenance settings
    fn validate(&self) -> Result<(), ToolError> {
        if self.api_headers.is_empty() {
            return Err(ToolError::validation("API header list is empty"));
        }

        if self.api_base_url.trim().is_empty() || self.video_base_url.trim().is_empty() {
            return Err(ToolError::validation("Upstream base URL is empty"));
        }

        if self.platform_header.trim().is_empty() || self.platform_patch.trim().is_empty() {
            return Err(ToolError::validation(
                "Platform header and patch file names must be set",
            ));
        }

        if self.include_video && self.video_headers.is_empty() {
            return Err(ToolError::validation(
                "Video header list is empty; pass --skip-video to disable the video set",
            ));
        }

        if self.annotate_pattern.trim().is_empty() {
            return Err(ToolError::validation("Annotation pattern is empty"));
        }

        Ok(())
    }
}
