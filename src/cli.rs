//! Command line interface.
//!
//! The normal invocation takes no flags: everything is collected through
//! interactive prompts. The flags that do exist cover resumption after a
//! partial failure and headless profile loading.

use clap::Parser;
use std::path::PathBuf;
use strum::{Display, EnumIter, EnumString};

/// The three forward-only stages of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Stage {
    Preflight,
    Disk,
    Bootstrap,
}

/// Guided disk-partitioning and installation sequencer for UEFI Arch systems.
#[derive(Debug, Parser)]
#[command(name = "archstrap", version, about)]
pub struct Cli {
    /// Load the installation profile from a JSON file instead of prompting.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Resume a partially completed run from the given stage.
    ///
    /// Resuming at `bootstrap` skips re-partitioning and rediscovers the
    /// mount table from /proc/mounts; it refuses to continue if the expected
    /// mounts are not present.
    #[arg(long, value_name = "STAGE", default_value = "preflight")]
    pub resume_from: Stage,

    /// Working root the new system is mounted under.
    #[arg(long, value_name = "PATH", default_value = "/mnt")]
    pub mount_root: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_invocation_is_flagless() {
        let cli = Cli::parse_from(["archstrap"]);
        assert_eq!(cli.resume_from, Stage::Preflight);
        assert_eq!(cli.mount_root, PathBuf::from("/mnt"));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_resume_from_parses_stage_names() {
        let cli = Cli::parse_from(["archstrap", "--resume-from", "bootstrap"]);
        assert_eq!(cli.resume_from, Stage::Bootstrap);

        let cli = Cli::parse_from(["archstrap", "--resume-from", "disk"]);
        assert_eq!(cli.resume_from, Stage::Disk);
    }

    #[test]
    fn test_resume_from_rejects_unknown_stage() {
        assert!(Cli::try_parse_from(["archstrap", "--resume-from", "cleanup"]).is_err());
    }

    #[test]
    fn test_stage_ordering_is_forward() {
        assert!(Stage::Preflight < Stage::Disk);
        assert!(Stage::Disk < Stage::Bootstrap);
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::Disk.to_string(), "disk");
        assert_eq!("preflight".parse::<Stage>().unwrap(), Stage::Preflight);
    }
}
