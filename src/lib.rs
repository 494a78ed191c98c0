//! archstrap: guided disk-partitioning and installation sequencer.
//!
//! Three forward-only stages: preflight validation, disk sequencing, system
//! bootstrap. The library exposes the pure planning logic and the stage
//! entry points; the binary wires them to interactive prompts.

pub mod bootstrap;
pub mod cli;
pub mod context;
pub mod disk;
pub mod error;
pub mod executor;
pub mod preflight;
pub mod profile;
pub mod prompt;
pub mod tool;

pub use cli::{Cli, Stage};
pub use context::InstallContext;
pub use disk::{DiskOp, MountTable, PartitionPlan, PartitionRole, TargetDisk};
pub use error::{BootstrapError, CommandError, DiskError, InstallError, PreflightError};
pub use executor::CommandExt;
pub use profile::Profile;
pub use tool::{Tool, Toolbox};
