//! Release-mode build driver for a CMake project.
//!
//! Ensures `build/<platform>/<build-type>` exists, configures the project
//! from there and builds it in parallel, optionally as a clean rebuild.
//!
//! # Architecture
//!
//! ```text
//! yocto-release (binary)
//!     │
//!     ├── config     release.toml -> ReleaseProfile + ExitPolicy
//!     ├── preflight  cmake / generator tool present in PATH
//!     │
//!     └── release::run_release_with
//!             ├── fs::create_dir_all(build dir)
//!             ├── lock       exclusive lock on the build dir
//!             ├── invocation configure + build command lines
//!             ├── runner     CommandRunner (system, dry-run, test fakes)
//!             └── record     release-run.json
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use yocto_release::{run_release_with, ExitPolicy, ReleaseProfile, SystemRunner};
//! use std::path::Path;
//!
//! let outcome = run_release_with(
//!     Path::new("."),
//!     &ReleaseProfile::default(),
//!     true,
//!     ExitPolicy::Propagate,
//!     &mut SystemRunner,
//! )?;
//! println!("built in {}", outcome.build_dir.display());
//! ```

pub mod config;
pub mod invocation;
pub mod lock;
pub mod preflight;
pub mod profile;
pub mod record;
pub mod release;
pub mod runner;

pub use invocation::Invocation;
pub use profile::ReleaseProfile;
pub use release::{run_release, run_release_with, ExitPolicy, ReleaseError, ReleaseOutcome};
pub use runner::{CommandRunner, DryRunRunner, SystemRunner, ToolExit};
