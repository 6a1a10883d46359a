//! Executing invocations.
//!
//! [`CommandRunner`] is the seam between the release driver and the host.
//! The working directory always travels with the [`Invocation`]; nothing
//! here touches the process-wide current directory.

use anyhow::{Context, Result};
use serde::Serialize;
use std::process::{Command, Stdio};

use crate::invocation::Invocation;

/// Exit of an external tool. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToolExit {
    pub code: Option<i32>,
}

impl ToolExit {
    pub const SUCCESS: ToolExit = ToolExit { code: Some(0) };

    pub fn from_code(code: i32) -> Self {
        Self { code: Some(code) }
    }

    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

pub trait CommandRunner {
    /// Run `invocation` to completion.
    ///
    /// Returns `Err` only when the tool could not be started at all; a tool
    /// that ran and failed is reported through [`ToolExit`].
    fn run(&mut self, invocation: &Invocation) -> Result<ToolExit>;

    /// Runners that only report what they would do. Their runs leave no record.
    fn is_dry_run(&self) -> bool {
        false
    }
}

/// Runs tools on the host with inherited stdout/stderr.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolExit> {
        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| {
                format!(
                    "Failed to execute '{}' in '{}'",
                    invocation.program,
                    invocation.cwd.display()
                )
            })?;

        Ok(ToolExit {
            code: status.code(),
        })
    }
}

/// Prints each command instead of running it.
#[derive(Debug, Default)]
pub struct DryRunRunner;

impl CommandRunner for DryRunRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ToolExit> {
        println!("  (cd {} && {})", invocation.cwd.display(), invocation);
        Ok(ToolExit::SUCCESS)
    }

    fn is_dry_run(&self) -> bool {
        true
    }
}
