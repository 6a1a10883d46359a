//! Command lines for the two external steps.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::profile::ReleaseProfile;

pub const CLEAN_FIRST_FLAG: &str = "--clean-first";

/// One external tool call: program, arguments and working directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// `cmake <root> -G<generator> -DCMAKE_BUILD_TYPE=<type> -D<KEY>=<VALUE>...`
pub fn configure_invocation(profile: &ReleaseProfile, build_dir: &Path) -> Invocation {
    let mut args = vec![
        profile.source_dir_arg(),
        format!("-G{}", profile.generator),
        format!("-DCMAKE_BUILD_TYPE={}", profile.build_type),
    ];
    args.extend(
        profile
            .defines
            .iter()
            .map(|(key, value)| format!("-D{}={}", key, value)),
    );

    Invocation {
        program: profile.configure_program.clone(),
        args,
        cwd: build_dir.to_path_buf(),
    }
}

/// `cmake --build . --parallel <n> [--clean-first]`
pub fn build_invocation(profile: &ReleaseProfile, build_dir: &Path, clear: bool) -> Invocation {
    let mut args = vec![
        "--build".to_string(),
        ".".to_string(),
        "--parallel".to_string(),
        profile.parallel.to_string(),
    ];
    if clear {
        args.push(CLEAN_FIRST_FLAG.to_string());
    }

    Invocation {
        program: profile.build_program.clone(),
        args,
        cwd: build_dir.to_path_buf(),
    }
}
