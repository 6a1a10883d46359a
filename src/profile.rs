//! Release profile: the structured form of the configure/build command lines.
//!
//! Every literal the release build used to hard-code (platform label, build
//! type, generator, parallelism, feature toggles) lives here as a field with
//! a default matching the historical value.

use anyhow::{bail, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub const DEFAULT_PLATFORM_LABEL: &str = "terminal";
pub const DEFAULT_BUILD_TYPE: &str = "Release";
pub const DEFAULT_GENERATOR: &str = "Ninja";
pub const DEFAULT_PARALLEL: u32 = 8;
pub const DEFAULT_PROGRAM: &str = "cmake";

/// Root directory (relative to the project root) holding all build trees.
pub const BUILD_ROOT: &str = "build";

/// Define owned by the profile itself; it may not appear in `defines`.
const BUILD_TYPE_DEFINE: &str = "CMAKE_BUILD_TYPE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseProfile {
    /// Middle path segment under `build/`.
    pub platform_label: String,
    /// Value of `CMAKE_BUILD_TYPE`, also the last path segment.
    pub build_type: String,
    /// CMake generator name passed as `-G<generator>`.
    pub generator: String,
    /// Job count passed as `--parallel <n>`.
    pub parallel: u32,
    /// Project feature toggles passed as `-D<KEY>=<VALUE>`, in key order.
    pub defines: BTreeMap<String, String>,
    pub configure_program: String,
    pub build_program: String,
}

impl Default for ReleaseProfile {
    fn default() -> Self {
        let mut defines = BTreeMap::new();
        defines.insert("YOCTO_EMBREE".to_string(), "OFF".to_string());

        Self {
            platform_label: DEFAULT_PLATFORM_LABEL.to_string(),
            build_type: DEFAULT_BUILD_TYPE.to_string(),
            generator: DEFAULT_GENERATOR.to_string(),
            parallel: DEFAULT_PARALLEL,
            defines,
            configure_program: DEFAULT_PROGRAM.to_string(),
            build_program: DEFAULT_PROGRAM.to_string(),
        }
    }
}

impl ReleaseProfile {
    /// Build directory relative to the project root, e.g. `build/terminal/Release`.
    pub fn build_subdir(&self) -> PathBuf {
        PathBuf::from(BUILD_ROOT)
            .join(&self.platform_label)
            .join(&self.build_type)
    }

    /// The project root as seen from inside the build directory.
    ///
    /// One `..` per component of [`Self::build_subdir`], so `../../..` for
    /// the default layout.
    pub fn source_dir_arg(&self) -> String {
        let depth = self.build_subdir().components().count();
        vec![".."; depth].join("/")
    }

    /// The tool that actually executes the generated build files.
    ///
    /// Used by preflight; `None` for generators we don't know a binary for.
    pub fn generator_tool(&self) -> Option<(&'static str, &'static str)> {
        match self.generator.as_str() {
            "Ninja" | "Ninja Multi-Config" => Some(("ninja", "ninja-build")),
            "Unix Makefiles" => Some(("make", "make")),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        validate_segment("platform_label", &self.platform_label)?;
        validate_segment("build_type", &self.build_type)?;

        if self.generator.trim().is_empty() {
            bail!("generator must not be empty");
        }
        if self.parallel == 0 {
            bail!("parallel must be at least 1");
        }
        if self.configure_program.trim().is_empty() {
            bail!("configure_program must not be empty");
        }
        if self.build_program.trim().is_empty() {
            bail!("build_program must not be empty");
        }

        for key in self.defines.keys() {
            if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                bail!(
                    "invalid define '{}': keys must be non-empty and contain only ASCII letters, digits or '_'",
                    key
                );
            }
            if key == BUILD_TYPE_DEFINE {
                bail!(
                    "define '{}' is controlled by build_type and cannot be set directly",
                    BUILD_TYPE_DEFINE
                );
            }
        }

        Ok(())
    }
}

fn validate_segment(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} must not be empty");
    }
    if value == "." || value == ".." || value.contains('/') || value.contains('\\') {
        bail!("{field} must be a single directory name, got '{}'", value);
    }
    Ok(())
}
