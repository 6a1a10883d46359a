use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::profile::ReleaseProfile;
use crate::release::ExitPolicy;

pub const CONFIG_FILENAME: &str = "release.toml";

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub profile: ReleaseProfile,
    pub policy: ExitPolicy,
    /// File the values came from; `None` when defaults were used.
    pub source: Option<PathBuf>,
}

impl Default for LoadedConfig {
    fn default() -> Self {
        Self {
            profile: ReleaseProfile::default(),
            policy: ExitPolicy::Propagate,
            source: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReleaseToml {
    release: ReleaseSectionToml,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReleaseSectionToml {
    platform_label: Option<String>,
    build_type: Option<String>,
    generator: Option<String>,
    parallel: Option<u32>,
    ignore_exit_status: Option<bool>,
    configure_program: Option<String>,
    build_program: Option<String>,
    defines: Option<BTreeMap<String, String>>,
}

/// Load `release.toml` from the project root, falling back to defaults when absent.
pub fn load_project_config(project_root: &Path) -> Result<LoadedConfig> {
    let path = project_root.join(CONFIG_FILENAME);
    if !path.is_file() {
        return Ok(LoadedConfig::default());
    }
    load_config_file(&path)
}

/// Load an explicit config file. Unlike [`load_project_config`], a missing file is an error.
pub fn load_config_file(path: &Path) -> Result<LoadedConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading release config '{}'", path.display()))?;
    let mut loaded = parse_config(&raw)
        .with_context(|| format!("parsing release config '{}'", path.display()))?;
    loaded.source = Some(path.to_path_buf());
    Ok(loaded)
}

fn parse_config(raw: &str) -> Result<LoadedConfig> {
    let parsed: ReleaseToml = toml::from_str(raw)?;
    let section = parsed.release;

    let mut profile = ReleaseProfile::default();
    if let Some(label) = section.platform_label {
        profile.platform_label = label.trim().to_string();
    }
    if let Some(build_type) = section.build_type {
        profile.build_type = build_type.trim().to_string();
    }
    if let Some(generator) = section.generator {
        profile.generator = generator.trim().to_string();
    }
    if let Some(parallel) = section.parallel {
        profile.parallel = parallel;
    }
    if let Some(program) = section.configure_program {
        profile.configure_program = program;
    }
    if let Some(program) = section.build_program {
        profile.build_program = program;
    }
    // A defines table replaces the defaults wholesale so features can be re-enabled.
    if let Some(defines) = section.defines {
        profile.defines = defines;
    }

    profile.validate()?;

    let policy = if section.ignore_exit_status.unwrap_or(false) {
        ExitPolicy::Ignore
    } else {
        ExitPolicy::Propagate
    };

    Ok(LoadedConfig {
        profile,
        policy,
        source: None,
    })
}
