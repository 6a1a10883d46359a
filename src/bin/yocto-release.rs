use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use yocto_release::config::{load_config_file, load_project_config, LoadedConfig};
use yocto_release::preflight::check_release_tools;
use yocto_release::{run_release_with, CommandRunner, DryRunRunner, ExitPolicy, SystemRunner};

#[derive(Debug, Default)]
struct Args {
    clear: bool,
    dry_run: bool,
    ignore_exit_status: bool,
    config: Option<PathBuf>,
    project_root: Option<PathBuf>,
}

fn usage() -> &'static str {
    "Usage:\n  yocto-release [--clear] [--dry-run] [--ignore-exit-status] [--config <path>] [--project-root <dir>]\n\n  --clear               clean rebuild (cmake --build ... --clean-first)\n  --dry-run             print the commands instead of running them\n  --ignore-exit-status  finish even if configure or build fails\n  --config <path>       release config (default: <project-root>/release.toml if present)\n  --project-root <dir>  project to build (default: current directory)"
}

fn main() -> Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let Some(args) = parse_args(&raw)? else {
        println!("{}", usage());
        return Ok(());
    };

    let project_root = match args.project_root {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolving current directory")?,
    };

    let config = load_config(args.config, &project_root)?;
    if let Some(source) = &config.source {
        println!("[release] config: {}", source.display());
    }

    let policy = if args.ignore_exit_status {
        ExitPolicy::Ignore
    } else {
        config.policy
    };

    let mut system = SystemRunner;
    let mut dry = DryRunRunner;
    let runner: &mut dyn CommandRunner = if args.dry_run {
        &mut dry
    } else {
        check_release_tools(&config.profile)?;
        &mut system
    };

    run_release_with(&project_root, &config.profile, args.clear, policy, runner)?;
    Ok(())
}

fn load_config(explicit: Option<PathBuf>, project_root: &std::path::Path) -> Result<LoadedConfig> {
    match explicit {
        Some(path) => load_config_file(&path),
        None => load_project_config(project_root),
    }
}

/// `Ok(None)` means help was requested.
fn parse_args(raw: &[String]) -> Result<Option<Args>> {
    let mut args = Args::default();
    let mut iter = raw.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--clear" => args.clear = true,
            "--dry-run" => args.dry_run = true,
            "--ignore-exit-status" => args.ignore_exit_status = true,
            "--config" => {
                let Some(value) = iter.next() else {
                    bail!("--config requires a path\n\n{}", usage());
                };
                args.config = Some(PathBuf::from(value));
            }
            "--project-root" => {
                let Some(value) = iter.next() else {
                    bail!("--project-root requires a directory\n\n{}", usage());
                };
                args.project_root = Some(PathBuf::from(value));
            }
            "-h" | "--help" => return Ok(None),
            other => bail!("unexpected argument '{}'\n\n{}", other, usage()),
        }
    }

    Ok(Some(args))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_args_defaults() {
        let args = parse_args(&[]).unwrap().unwrap();
        assert!(!args.clear);
        assert!(!args.dry_run);
        assert!(!args.ignore_exit_status);
        assert!(args.config.is_none());
    }

    #[test]
    fn test_flags() {
        let args = parse_args(&strings(&["--clear", "--dry-run", "--config", "r.toml"]))
            .unwrap()
            .unwrap();
        assert!(args.clear);
        assert!(args.dry_run);
        assert_eq!(args.config, Some(PathBuf::from("r.toml")));
    }

    #[test]
    fn test_help() {
        assert!(parse_args(&strings(&["--help"])).unwrap().is_none());
    }

    #[test]
    fn test_rejects_unknown_and_missing_values() {
        assert!(parse_args(&strings(&["--jobs"])).is_err());
        assert!(parse_args(&strings(&["--config"])).is_err());
    }
}
