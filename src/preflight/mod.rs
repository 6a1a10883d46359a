//! Preflight checks for release builds.
//!
//! Validates that the host has the configure/build tools before the build
//! directory is touched, so a missing `cmake` or `ninja` shows up as one clear
//! message instead of a spawn failure halfway through.
//!
//! # Example
//!
//! ```rust
//! use yocto_release::preflight::{command_exists, check_required_tools};
//!
//! if !command_exists("cmake") {
//!     println!("cmake not installed");
//! }
//!
//! let tools = &[("cmake", "cmake"), ("ninja", "ninja-build")];
//! if let Err(e) = check_required_tools(tools) {
//!     eprintln!("{}", e);
//! }
//! ```

use anyhow::{bail, Result};

use crate::profile::ReleaseProfile;

/// Check if a command exists in PATH.
pub fn command_exists(cmd: &str) -> bool {
    which::which(cmd).is_ok()
}

/// Check that specific tools are available.
///
/// # Arguments
///
/// * `tools` - Slice of (command, package) tuples
///
/// # Returns
///
/// * `Ok(())` if all tools are found
/// * `Err` with list of missing tools and their packages
pub fn check_required_tools(tools: &[(&str, &str)]) -> Result<()> {
    let mut missing = Vec::new();

    for (tool, package) in tools {
        if !command_exists(tool) {
            missing.push((*tool, *package));
        }
    }

    if !missing.is_empty() {
        let msg = missing
            .iter()
            .map(|(t, p)| format!("  {} (install: {})", t, p))
            .collect::<Vec<_>>()
            .join("\n");
        bail!("Missing required host tools:\n{}", msg);
    }

    Ok(())
}

/// Tools a release run with `profile` needs, as (command, package) tuples.
pub fn release_tools(profile: &ReleaseProfile) -> Vec<(&str, &str)> {
    let mut tools: Vec<(&str, &str)> = vec![(profile.configure_program.as_str(), "cmake")];
    if profile.build_program != profile.configure_program {
        tools.push((profile.build_program.as_str(), "cmake"));
    }
    if let Some(tool) = profile.generator_tool() {
        tools.push(tool);
    }
    tools
}

/// Check everything [`release_tools`] lists.
pub fn check_release_tools(profile: &ReleaseProfile) -> Result<()> {
    check_required_tools(&release_tools(profile))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        // 'sh' should exist on any Unix system
        assert!(command_exists("sh"));
        assert!(!command_exists("definitely_not_a_real_command_12345"));
    }

    #[test]
    fn test_check_required_tools_success() {
        let tools = &[("sh", "coreutils"), ("ls", "coreutils")];
        assert!(check_required_tools(tools).is_ok());
    }

    #[test]
    fn test_check_required_tools_failure_lists_package() {
        let tools = &[("nonexistent_command_xyz", "fake-package")];
        let err = check_required_tools(tools).unwrap_err();
        assert!(err.to_string().contains("nonexistent_command_xyz (install: fake-package)"));
    }

    #[test]
    fn test_release_tools_default() {
        let profile = ReleaseProfile::default();
        assert_eq!(
            release_tools(&profile),
            vec![("cmake", "cmake"), ("ninja", "ninja-build")]
        );
    }

    #[test]
    fn test_release_tools_distinct_build_program() {
        let profile = ReleaseProfile {
            build_program: "cmake3".into(),
            generator: "Xcode".into(),
            ..ReleaseProfile::default()
        };
        assert_eq!(
            release_tools(&profile),
            vec![("cmake", "cmake"), ("cmake3", "cmake")]
        );
    }
}
