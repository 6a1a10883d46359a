//! The release driver: ensure the build directory, configure, build.
//!
//! The working directory is handed to each tool explicitly, so
//! [`run_release_with`] never changes the process's current directory and
//! is safe to call from tests or alongside other work.

use std::error::Error;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::config::load_project_config;
use crate::invocation::{build_invocation, configure_invocation, Invocation};
use crate::lock::BuildDirLock;
use crate::preflight::check_release_tools;
use crate::profile::ReleaseProfile;
use crate::record::{now_utc_rfc3339, write_record, ReleaseRecord, RunStatus, StepRecord};
use crate::runner::{CommandRunner, SystemRunner, ToolExit};

/// What to do when a tool exits non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExitPolicy {
    /// Stop and fail the run.
    #[default]
    Propagate,
    /// Run both steps and report success regardless (the old script's behavior).
    Ignore,
}

/// A tool ran and failed. Carried inside `anyhow::Error`; use
/// `err.downcast_ref::<ReleaseError>()` to tell the steps apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseError {
    ConfigureFailed { code: Option<i32> },
    BuildFailed { code: Option<i32> },
}

impl ReleaseError {
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ReleaseError::ConfigureFailed { code } | ReleaseError::BuildFailed { code } => *code,
        }
    }
}

impl fmt::Display for ReleaseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            ReleaseError::ConfigureFailed { .. } => "configure",
            ReleaseError::BuildFailed { .. } => "build",
        };
        match self.exit_code() {
            Some(code) => write!(f, "{step} step failed with exit code {code}"),
            None => write!(f, "{step} step was terminated by a signal"),
        }
    }
}

impl Error for ReleaseError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub build_dir: PathBuf,
    pub configure: ToolExit,
    pub build: ToolExit,
}

/// Release build of the project in the current directory.
///
/// Reads `release.toml` if present, checks host tools, then runs the real
/// tools via [`SystemRunner`].
pub fn run_release(clear: bool) -> Result<ReleaseOutcome> {
    let project_root = std::env::current_dir().context("resolving current directory")?;
    let config = load_project_config(&project_root)?;
    check_release_tools(&config.profile)?;

    run_release_with(
        &project_root,
        &config.profile,
        clear,
        config.policy,
        &mut SystemRunner,
    )
}

/// Release build of `project_root` with an explicit profile, policy and runner.
///
/// Once the build directory exists, every outcome (success, tool failure,
/// tool that could not be started) leaves a run record behind, except for
/// dry runs, which never touch it.
pub fn run_release_with(
    project_root: &Path,
    profile: &ReleaseProfile,
    clear: bool,
    policy: ExitPolicy,
    runner: &mut dyn CommandRunner,
) -> Result<ReleaseOutcome> {
    profile.validate()?;

    let build_dir = project_root.join(profile.build_subdir());
    fs::create_dir_all(&build_dir)
        .with_context(|| format!("creating build directory '{}'", build_dir.display()))?;

    let _lock = BuildDirLock::acquire(&build_dir)?;
    let run = RunRecorder {
        build_dir: &build_dir,
        started_at_utc: now_utc_rfc3339(),
        clear,
        policy,
        persist: !runner.is_dry_run(),
    };

    let configure = configure_invocation(profile, &build_dir);
    let build = build_invocation(profile, &build_dir, clear);

    println!("[release] configuring in {}", build_dir.display());
    let configure_exit = match runner.run(&configure) {
        Ok(exit) => exit,
        Err(err) => {
            run.finish(RunStatus::SpawnFailed, (&configure, None), None);
            return Err(err);
        }
    };

    if !configure_exit.success() && policy == ExitPolicy::Propagate {
        run.finish(
            RunStatus::ConfigureFailed,
            (&configure, Some(configure_exit)),
            None,
        );
        return Err(anyhow::Error::new(ReleaseError::ConfigureFailed {
            code: configure_exit.code,
        }))
        .with_context(|| format!("configuring '{}'", build_dir.display()));
    }

    println!(
        "[release] building with {} jobs{}",
        profile.parallel,
        if clear { " (clean first)" } else { "" }
    );
    let build_exit = match runner.run(&build) {
        Ok(exit) => exit,
        Err(err) => {
            run.finish(
                RunStatus::SpawnFailed,
                (&configure, Some(configure_exit)),
                Some((&build, None)),
            );
            return Err(err);
        }
    };

    let status = if !configure_exit.success() {
        RunStatus::ConfigureFailed
    } else if !build_exit.success() {
        RunStatus::BuildFailed
    } else {
        RunStatus::Success
    };
    run.finish(
        status,
        (&configure, Some(configure_exit)),
        Some((&build, Some(build_exit))),
    );

    if !build_exit.success() && policy == ExitPolicy::Propagate {
        return Err(anyhow::Error::new(ReleaseError::BuildFailed {
            code: build_exit.code,
        }))
        .with_context(|| format!("building '{}'", build_dir.display()));
    }

    if status != RunStatus::Success {
        eprintln!("[release] warning: tool failures ignored ({:?})", status);
    } else {
        println!("[release] done: {}", build_dir.display());
    }

    Ok(ReleaseOutcome {
        build_dir,
        configure: configure_exit,
        build: build_exit,
    })
}

/// Per-run fields shared by every record written for one run.
struct RunRecorder<'a> {
    build_dir: &'a Path,
    started_at_utc: String,
    clear: bool,
    policy: ExitPolicy,
    persist: bool,
}

impl RunRecorder<'_> {
    /// Write the run record. A failure here is reported but never changes the result.
    ///
    /// A step's exit is `None` when its tool could not be started.
    fn finish(
        &self,
        status: RunStatus,
        configure: (&Invocation, Option<ToolExit>),
        build: Option<(&Invocation, Option<ToolExit>)>,
    ) {
        if !self.persist {
            return;
        }

        let record = ReleaseRecord {
            started_at_utc: self.started_at_utc.clone(),
            finished_at_utc: now_utc_rfc3339(),
            clear: self.clear,
            ignore_exit_status: self.policy == ExitPolicy::Ignore,
            status,
            configure: StepRecord {
                invocation: configure.0,
                exit: configure.1,
            },
            build: build.map(|(invocation, exit)| StepRecord { invocation, exit }),
        };

        if let Err(err) = write_record(self.build_dir, &record) {
            eprintln!("[release] warning: {:#}", err);
        }
    }
}
