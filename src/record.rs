//! Run record written into the build directory after each release run.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::invocation::Invocation;
use crate::runner::ToolExit;

pub const RECORD_FILENAME: &str = "release-run.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
    ConfigureFailed,
    BuildFailed,
    /// A tool could not be started at all.
    SpawnFailed,
}

#[derive(Debug, Serialize)]
pub struct StepRecord<'a> {
    pub invocation: &'a Invocation,
    /// `None` when the tool could not be started.
    pub exit: Option<ToolExit>,
}

#[derive(Debug, Serialize)]
pub struct ReleaseRecord<'a> {
    pub started_at_utc: String,
    pub finished_at_utc: String,
    pub clear: bool,
    pub ignore_exit_status: bool,
    pub status: RunStatus,
    pub configure: StepRecord<'a>,
    /// Absent when the build step never ran (configure failed or could not start).
    pub build: Option<StepRecord<'a>>,
}

pub fn record_path(build_dir: &Path) -> PathBuf {
    build_dir.join(RECORD_FILENAME)
}

pub fn write_record(build_dir: &Path, record: &ReleaseRecord<'_>) -> Result<PathBuf> {
    let path = record_path(build_dir);
    write_json_atomic(&path, record)
        .with_context(|| format!("writing release run record '{}'", path.display()))?;
    Ok(path)
}

/// Status of the last run recorded in `build_dir`, if any.
pub fn read_last_status(build_dir: &Path) -> Result<Option<RunStatus>> {
    #[derive(Deserialize)]
    struct StatusOnly {
        status: RunStatus,
    }

    let path = record_path(build_dir);
    if !path.is_file() {
        return Ok(None);
    }
    let bytes =
        fs::read(&path).with_context(|| format!("reading release run record '{}'", path.display()))?;
    let parsed: StatusOnly = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing release run record '{}'", path.display()))?;
    Ok(Some(parsed.status))
}

pub fn now_utc_rfc3339() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        now.year(),
        now.month() as u8,
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("path without parent '{}'", path.display()))?;
    fs::create_dir_all(parent)
        .with_context(|| format!("creating parent directory '{}'", parent.display()))?;
    let tmp = path.with_extension(format!("tmp-{}", std::process::id()));
    let payload = serde_json::to_vec_pretty(value).with_context(|| "serializing run record")?;
    fs::write(&tmp, payload).with_context(|| format!("writing temp file '{}'", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| {
        format!(
            "renaming temp file '{}' to '{}'",
            tmp.display(),
            path.display()
        )
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn invocation(dir: &Path) -> Invocation {
        Invocation {
            program: "cmake".into(),
            args: vec!["--build".into(), ".".into()],
            cwd: dir.to_path_buf(),
        }
    }

    #[test]
    fn test_write_and_read_status() {
        let temp = TempDir::new().unwrap();
        let inv = invocation(temp.path());
        let record = ReleaseRecord {
            started_at_utc: now_utc_rfc3339(),
            finished_at_utc: now_utc_rfc3339(),
            clear: true,
            ignore_exit_status: false,
            status: RunStatus::BuildFailed,
            configure: StepRecord {
                invocation: &inv,
                exit: Some(ToolExit::SUCCESS),
            },
            build: Some(StepRecord {
                invocation: &inv,
                exit: Some(ToolExit::from_code(2)),
            }),
        };

        let path = write_record(temp.path(), &record).unwrap();
        assert_eq!(path, temp.path().join(RECORD_FILENAME));

        let json: serde_json::Value =
            serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(json["status"], "build_failed");
        assert_eq!(json["clear"], true);
        assert_eq!(json["build"]["exit"]["code"], 2);

        assert_eq!(
            read_last_status(temp.path()).unwrap(),
            Some(RunStatus::BuildFailed)
        );
    }

    #[test]
    fn test_read_last_status_missing() {
        let temp = TempDir::new().unwrap();
        assert_eq!(read_last_status(temp.path()).unwrap(), None);
    }

    #[test]
    fn test_timestamp_shape() {
        let ts = now_utc_rfc3339();
        assert_eq!(ts.len(), 20);
        assert!(ts.ends_with('Z'));
        assert_eq!(&ts[10..11], "T");
    }
}
