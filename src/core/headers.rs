//! Vulkan header maintenance
//!
//! Downloads the engine's bundled Vulkan headers from the Khronos
//! upstream, applies the local platform patch, and annotates API
//! declarations with the engine's calling-convention macro. The flow is
//! strictly sequential and fail-fast: the first failing step aborts the
//! run and every later file stays untouched. No retries, no rollback.

use crate::{
    config::Config,
    error::{Result, ToolError},
    utils::{fs::FileSystemUtils, process::ProcessRunner},
};
use regex::Regex;
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

/// Header updater driving the download/patch/annotate sequence
pub struct HeaderUpdater {
    config: Config,
    process_runner: ProcessRunner,
    fs_utils: FileSystemUtils,
    annotate_re: Regex,
}

/// Summary of a header maintenance run
#[derive(Debug, Default)]
pub struct UpdateSummary {
    /// Headers downloaded (platform + API + video)
    pub downloaded: usize,
    /// Files patched with the local diff
    pub patched: usize,
    /// Files run through the annotation rewrite
    pub annotated_files: usize,
    /// Individual declaration terminators rewritten
    pub annotations: usize,
    /// Header files found on disk but absent from the manifest
    pub strays: usize,
}

impl std::fmt::Display for UpdateSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Updated {} headers: {} patched, {} annotated ({} declarations), {} stray file(s)",
            self.downloaded, self.patched, self.annotated_files, self.annotations, self.strays
        )
    }
}

impl HeaderUpdater {
    /// Create a new header updater with the given configuration
    pub fn new(config: Config) -> Result<Self> {
        let annotate_re = Regex::new(&config.headers.annotate_pattern).map_err(|e| {
            ToolError::config_with_source(
                format!(
                    "Invalid annotation pattern `{}`",
                    config.headers.annotate_pattern
                ),
                e,
            )
        })?;

        Ok(Self {
            process_runner: ProcessRunner::new(config.debug),
            fs_utils: FileSystemUtils::new(),
            annotate_re,
            config,
        })
    }

    /// Run the full update sequence
    ///
    /// Order matches the upstream layout: the platform header with its
    /// local patch first, then the API headers with annotation, then
    /// the video codec headers verbatim.
    #[instrument(skip(self))]
    pub fn update(&self) -> Result<UpdateSummary> {
        let headers = &self.config.headers;
        let mut summary = UpdateSummary::default();

        info!("Updating Vulkan headers in {}", headers.api_dir.display());

        self.check_required_tools()?;

        let patch_file = headers.api_dir.join(&headers.platform_patch);
        if !self.fs_utils.is_file(&patch_file) {
            return Err(ToolError::validation(format!(
                "Patch file not found: {}",
                patch_file.display()
            )));
        }

        self.fs_utils
            .create_dir_all(&headers.api_dir)
            .map_err(|e| ToolError::file_system("create", headers.api_dir.clone(), e))?;
        if headers.include_video {
            self.fs_utils
                .create_dir_all(&headers.video_dir)
                .map_err(|e| ToolError::file_system("create", headers.video_dir.clone(), e))?;
        }

        // Platform header first: it carries the local patch
        let platform_path = headers.api_dir.join(&headers.platform_header);
        self.download(&headers.api_url(&headers.platform_header), &platform_path)?;
        summary.downloaded += 1;

        self.apply_patch(&platform_path, &patch_file)?;
        summary.patched += 1;

        for header in &headers.api_headers {
            let path = headers.api_dir.join(header);
            self.download(&headers.api_url(header), &path)?;
            summary.downloaded += 1;

            summary.annotations += self.annotate(&path)?;
            summary.annotated_files += 1;
        }

        if headers.include_video {
            for header in &headers.video_headers {
                self.download(&headers.video_url(header), &headers.video_dir.join(header))?;
                summary.downloaded += 1;
            }
        } else {
            debug!("Video codec headers disabled, skipping");
        }

        summary.strays = self.scan_strays();

        Ok(summary)
    }

    /// Verify the external tools are reachable before touching anything
    fn check_required_tools(&self) -> Result<()> {
        let headers = &self.config.headers;
        let mut missing = Vec::new();

        if !self.process_runner.command_exists(&headers.download_cmd) {
            missing.push(headers.download_cmd.as_str());
        }
        if !self.process_runner.command_exists(&headers.patch_cmd) {
            missing.push(headers.patch_cmd.as_str());
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ToolError::validation(format!(
                "Required tool(s) not found on PATH: {}",
                missing.join(", ")
            )))
        }
    }

    /// Download one header via the external download tool
    #[instrument(skip(self))]
    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        info!("Downloading {} -> {}", url, dest.display());

        let (cmd, mut args) = self.config.headers.get_download_cmd();
        args.push(url.to_string());
        args.push("-o".to_string());
        args.push(dest.to_string_lossy().into_owned());

        let args_str: Vec<&str> = args.iter().map(String::as_str).collect();
        self.process_runner
            .run_command(&cmd, &args_str)
            .map_err(|e| ToolError::download_with_source("Download failed", url, e))?;

        if let Ok(size) = self.fs_utils.file_size(dest) {
            debug!("Downloaded {} bytes to {}", size, dest.display());
        }

        Ok(())
    }

    /// Apply the local patch file to a downloaded header
    #[instrument(skip(self))]
    fn apply_patch(&self, target: &Path, patch_file: &Path) -> Result<()> {
        info!("Patching {}", target.display());

        let (cmd, mut args) = self.config.headers.get_patch_cmd();
        args.push(target.to_string_lossy().into_owned());
        args.push(patch_file.to_string_lossy().into_owned());

        let args_str: Vec<&str> = args.iter().map(String::as_str).collect();
        self.process_runner
            .run_command(&cmd, &args_str)
            .map_err(|e| {
                ToolError::patch_with_source("Patch application failed", target.to_path_buf(), e)
            })
    }

    /// Rewrite declaration terminators with the calling-convention macro
    ///
    /// Returns the number of rewritten terminators; the file is left
    /// untouched when nothing matched.
    #[instrument(skip(self))]
    fn annotate(&self, path: &Path) -> Result<usize> {
        info!("Annotating declarations in {}", path.display());

        let content = self
            .fs_utils
            .read_file_to_string(path)
            .map_err(|e| ToolError::file_system("read", path.to_path_buf(), e))?;

        let (annotated, count) = self.annotate_content(&content);

        if count > 0 {
            self.fs_utils
                .write_file(path, annotated.as_bytes())
                .map_err(|e| ToolError::file_system("write", path.to_path_buf(), e))?;
        }

        debug!("Annotated {} declaration(s) in {}", count, path.display());
        Ok(count)
    }

    /// Apply the substitution to a header body, at most once per line
    fn annotate_content(&self, content: &str) -> (String, usize) {
        let replacement = self.config.headers.annotate_replacement.as_str();
        let mut count = 0usize;
        let mut lines = Vec::new();

        for line in content.split('\n') {
            match self.annotate_re.replace(line, replacement) {
                Cow::Owned(rewritten) => {
                    count += 1;
                    lines.push(rewritten);
                }
                Cow::Borrowed(_) => lines.push(line.to_string()),
            }
        }

        (lines.join("\n"), count)
    }

    /// Warn about header files next to the managed set that the
    /// manifest does not name (leftovers from older upstream lists)
    #[instrument(skip(self))]
    fn scan_strays(&self) -> usize {
        let headers = &self.config.headers;

        let mut expected: HashSet<&str> = HashSet::new();
        expected.insert(headers.platform_header.as_str());
        expected.extend(headers.api_headers.iter().map(String::as_str));

        let mut strays = self.scan_dir_strays(&headers.api_dir, &expected);

        if headers.include_video {
            let video_expected: HashSet<&str> =
                headers.video_headers.iter().map(String::as_str).collect();
            strays += self.scan_dir_strays(&headers.video_dir, &video_expected);
        }

        strays
    }

    /// Count and report unexpected `*.h` files in one directory
    fn scan_dir_strays(&self, dir: &Path, expected: &HashSet<&str>) -> usize {
        let pattern = format!("{}/*.h", dir.display());
        let mut strays = 0usize;

        match glob::glob(&pattern) {
            Ok(paths) => {
                for path in paths.flatten() {
                    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                        if !expected.contains(name) {
                            warn!("Stray header not in the manifest: {}", path.display());
                            strays += 1;
                        }
                    }
                }
            }
            Err(e) => warn!("Invalid glob pattern {}: {}", pattern, e),
        }

        strays
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn updater(config: Config) -> HeaderUpdater {
        HeaderUpdater::new(config).unwrap()
    }

    #[test]
    fn test_annotate_content_rewrites_terminators() {
        let updater = updater(Config::default());
        let content = "void vkVoidFn(void);\nVKAPI_ATTR void VKAPI_CALL vkCmdDraw(VkCommandBuffer commandBuffer);\n";

        let (annotated, count) = updater.annotate_content(content);

        assert_eq!(count, 2);
        assert!(annotated.contains("void vkVoidFn(void) VKAPI_NOEXCEPT;"));
        assert!(annotated.contains("vkCmdDraw(VkCommandBuffer commandBuffer) VKAPI_NOEXCEPT;"));
        assert!(annotated.ends_with('\n'));
    }

    #[test]
    fn test_annotate_content_first_match_per_line() {
        let updater = updater(Config::default());

        let (annotated, count) = updater.annotate_content("foo(a); bar(b);");

        // Matches sed without /g: only the first terminator of a line
        assert_eq!(count, 1);
        assert_eq!(annotated, "foo(a) VKAPI_NOEXCEPT; bar(b);");
    }

    #[test]
    fn test_annotate_content_no_matches() {
        let updater = updater(Config::default());
        let content = "#ifndef VULKAN_H_\n#define VULKAN_H_\n#include \"vk_platform.h\"\n";

        let (annotated, count) = updater.annotate_content(content);

        assert_eq!(count, 0);
        assert_eq!(annotated, content);
    }

    #[test]
    fn test_annotate_content_stable_on_second_pass() {
        let updater = updater(Config::default());

        let (first, count) = updater.annotate_content("void vkVoidFn(void);\n");
        assert_eq!(count, 1);

        let (second, count) = updater.annotate_content(&first);
        assert_eq!(count, 0);
        assert_eq!(second, first);
    }

    #[test]
    fn test_invalid_annotate_pattern_is_rejected() {
        let mut config = Config::default();
        config.headers.annotate_pattern = "(".to_string();

        assert!(matches!(
            HeaderUpdater::new(config),
            Err(ToolError::Config { .. })
        ));
    }

    #[test]
    fn test_update_summary_display() {
        let summary = UpdateSummary {
            downloaded: 8,
            patched: 1,
            annotated_files: 7,
            annotations: 4131,
            strays: 0,
        };

        assert_eq!(
            summary.to_string(),
            "Updated 8 headers: 1 patched, 7 annotated (4131 declarations), 0 stray file(s)"
        );
    }

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        let mut perms = fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).unwrap();
        path
    }

    /// Config wired to stub download/patch scripts inside the temp dir.
    ///
    /// The download stub writes two canned declarations, or exits
    /// nonzero for URLs containing `FAIL`. The patch stub appends a
    /// marker line to its target.
    #[cfg(unix)]
    fn stub_config(temp: &TempDir) -> Config {
        let tools = temp.path().join("tools");
        fs::create_dir_all(&tools).unwrap();

        let download = write_script(
            &tools,
            "stub-download.sh",
            r#"#!/bin/sh
case "$1" in
  *FAIL*) exit 22 ;;
esac
printf 'void vkVoidFn(void);\nVKAPI_ATTR void VKAPI_CALL vkCmdDraw(VkCommandBuffer commandBuffer);\n' > "$3"
"#,
        );
        let patch = write_script(
            &tools,
            "stub-patch.sh",
            r#"#!/bin/sh
printf '// patched\n' >> "$1"
"#,
        );

        let api_dir = temp.path().join("vulkan");
        fs::create_dir_all(&api_dir).unwrap();
        fs::write(api_dir.join("vk_platform_patch.diff"), "--- stub diff\n").unwrap();

        let mut config = Config::default();
        config.headers.api_dir = api_dir;
        config.headers.video_dir = temp.path().join("vk_video");
        config.headers.api_base_url = "https://upstream.test/vulkan".to_string();
        config.headers.video_base_url = "https://upstream.test/vk_video".to_string();
        config.headers.api_headers = vec!["vulkan.h".to_string(), "vulkan_core.h".to_string()];
        config.headers.video_headers = vec!["vulkan_video_codecs_common.h".to_string()];
        config.headers.download_cmd = download.to_string_lossy().into_owned();
        config.headers.download_args = vec![];
        config.headers.patch_cmd = patch.to_string_lossy().into_owned();
        config.headers.patch_args = vec![];
        config
    }

    #[cfg(unix)]
    #[test]
    fn test_update_happy_path() {
        let temp = TempDir::new().unwrap();
        let config = stub_config(&temp);
        let api_dir = config.headers.api_dir.clone();
        let video_dir = config.headers.video_dir.clone();

        let summary = updater(config).update().unwrap();

        assert_eq!(summary.downloaded, 4);
        assert_eq!(summary.patched, 1);
        assert_eq!(summary.annotated_files, 2);
        assert_eq!(summary.annotations, 4);
        assert_eq!(summary.strays, 0);

        // Platform header: patched, never annotated
        let platform = fs::read_to_string(api_dir.join("vk_platform.h")).unwrap();
        assert!(platform.contains("// patched"));
        assert!(platform.contains("void vkVoidFn(void);"));
        assert!(!platform.contains("VKAPI_NOEXCEPT"));

        // API headers: annotated
        let core = fs::read_to_string(api_dir.join("vulkan_core.h")).unwrap();
        assert!(core.contains("void vkVoidFn(void) VKAPI_NOEXCEPT;"));

        // Video header: downloaded verbatim
        let video = fs::read_to_string(video_dir.join("vulkan_video_codecs_common.h")).unwrap();
        assert!(!video.contains("VKAPI_NOEXCEPT"));
    }

    #[cfg(unix)]
    #[test]
    fn test_update_halts_at_first_failure() {
        let temp = TempDir::new().unwrap();
        let mut config = stub_config(&temp);
        config.headers.api_headers = vec![
            "vulkan.h".to_string(),
            "FAIL_core.h".to_string(),
            "vulkan_xcb.h".to_string(),
        ];
        let api_dir = config.headers.api_dir.clone();
        let video_dir = config.headers.video_dir.clone();

        let result = updater(config).update();

        assert!(matches!(result, Err(ToolError::Download { .. })));

        // Steps before the failure ran...
        assert!(api_dir.join("vk_platform.h").is_file());
        assert!(api_dir.join("vulkan.h").is_file());
        // ...nothing at or after it was written
        assert!(!api_dir.join("FAIL_core.h").exists());
        assert!(!api_dir.join("vulkan_xcb.h").exists());
        assert!(!video_dir.join("vulkan_video_codecs_common.h").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_update_halts_when_patch_fails() {
        let temp = TempDir::new().unwrap();
        let mut config = stub_config(&temp);
        // Upstream drift: the local diff no longer applies
        let failing_patch = write_script(
            &temp.path().join("tools"),
            "stub-patch-reject.sh",
            r#"#!/bin/sh
exit 1
"#,
        );
        config.headers.patch_cmd = failing_patch.to_string_lossy().into_owned();
        let api_dir = config.headers.api_dir.clone();
        let video_dir = config.headers.video_dir.clone();

        let result = updater(config).update();

        assert!(matches!(result, Err(ToolError::Patch { .. })));

        // The platform download ran...
        assert!(api_dir.join("vk_platform.h").is_file());
        // ...no API or video header was written after the failing patch
        assert!(!api_dir.join("vulkan.h").exists());
        assert!(!api_dir.join("vulkan_core.h").exists());
        assert!(!video_dir.join("vulkan_video_codecs_common.h").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_update_requires_patch_file() {
        let temp = TempDir::new().unwrap();
        let config = stub_config(&temp);
        let api_dir = config.headers.api_dir.clone();
        fs::remove_file(api_dir.join("vk_platform_patch.diff")).unwrap();

        let result = updater(config).update();

        assert!(matches!(result, Err(ToolError::Validation { .. })));
        // Failed before the first download
        assert!(!api_dir.join("vk_platform.h").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_update_skip_video() {
        let temp = TempDir::new().unwrap();
        let mut config = stub_config(&temp);
        config.headers.include_video = false;
        let video_dir = config.headers.video_dir.clone();

        let summary = updater(config).update().unwrap();

        assert_eq!(summary.downloaded, 3);
        assert!(!video_dir.exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_update_reports_stray_headers() {
        let temp = TempDir::new().unwrap();
        let config = stub_config(&temp);
        // Leftover from an older upstream list
        fs::write(config.headers.api_dir.join("vk_sdk_platform.h"), "// old\n").unwrap();

        let summary = updater(config).update().unwrap();

        assert_eq!(summary.strays, 1);
    }

    #[test]
    fn test_update_requires_tools_on_path() {
        let temp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.headers.api_dir = temp.path().join("vulkan");
        config.headers.video_dir = temp.path().join("vk_video");
        config.headers.download_cmd = "definitely_not_a_real_tool_5321".to_string();

        let result = updater(config).update();

        assert!(matches!(result, Err(ToolError::Validation { .. })));
        assert!(!temp.path().join("vulkan").exists());
    }
}
