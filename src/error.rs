//! Error taxonomy for the installation sequencer.
//!
//! Three stage-level error types (`PreflightError`, `DiskError`,
//! `BootstrapError`) plus the low-level `CommandError` produced by the
//! command executor. Nothing is caught and retried: every failure propagates
//! up to `main` through `InstallError` and terminates the run.

use std::path::PathBuf;
use std::process::ExitStatus;
use thiserror::Error;

/// Failure of a single external command invocation.
///
/// Produced exclusively by [`crate::executor::CommandExt`]; stage code wraps
/// it in the appropriate stage error instead of inspecting exit codes itself.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    BadExitStatus { program: String, status: ExitStatus },

    #[error("{program} produced non-UTF-8 output")]
    InvalidUtf8 { program: String },
}

/// Failures detected before any mutation of the target disk.
///
/// Every variant is safe to abort from: preflight has no side effects.
#[derive(Error, Debug)]
pub enum PreflightError {
    #[error("root privileges required (running as uid {0})")]
    InsufficientPrivilege(u32),

    #[error("UEFI firmware not detected ({0} missing); legacy BIOS is not supported")]
    UnsupportedFirmware(PathBuf),

    #[error("no network connectivity after {attempts} attempts against {host}")]
    NoConnectivity { host: String, attempts: u32 },

    #[error("{0} is not an existing block device")]
    InvalidDevice(PathBuf),

    #[error("required tool not found on PATH: {0}")]
    MissingTool(&'static str),

    #[error("destructive operation not confirmed (expected the exact token {expected:?})")]
    NotConfirmed { expected: &'static str },

    #[error("failed to read {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while partitioning, formatting, or mounting the target disk.
///
/// Once these occur the disk may be in an intermediate state; no cleanup is
/// attempted.
#[derive(Error, Debug)]
pub enum DiskError {
    #[error(
        "disk too small: {disk_mib} MiB cannot hold a 512 MiB ESP plus {swap_mib} MiB swap \
         and a non-empty root"
    )]
    DiskTooSmall { disk_mib: u64, swap_mib: u64 },

    #[error("partitioning failed")]
    Partitioning(#[source] CommandError),

    #[error("formatting failed")]
    Formatting(#[source] CommandError),

    #[error("mounting failed")]
    Mounting(#[source] CommandError),

    #[error("failed to create mount point {path}: {source}")]
    MountPoint {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to probe {path}: {source}")]
    Probe {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures while installing and configuring the new system.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("pacstrap failed")]
    Pacstrap(#[source] CommandError),

    #[error("fstab generation failed")]
    Fstab(#[source] CommandError),

    #[error("failed to write fstab at {path}: {source}")]
    FstabWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("second-stage configuration failed inside the new root")]
    Chroot(#[source] CommandError),

    #[error("failed to stage the setup script at {path}: {source}")]
    ScriptWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unmounting the new root failed")]
    Unmount(#[source] CommandError),

    #[error("mount table incomplete: expected both EFI and root mounts")]
    IncompleteMountTable,
}

/// Umbrella error for the whole run; `main` reports it and exits non-zero.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("preflight failed: {0}")]
    Preflight(#[from] PreflightError),

    #[error("disk sequencing failed: {0}")]
    Disk(#[from] DiskError),

    #[error("bootstrap failed: {0}")]
    Bootstrap(#[from] BootstrapError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for sequencer operations.
pub type Result<T, E = InstallError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preflight_error_display() {
        let err = PreflightError::InsufficientPrivilege(1000);
        assert_eq!(
            err.to_string(),
            "root privileges required (running as uid 1000)"
        );

        let err = PreflightError::NotConfirmed { expected: "YES" };
        assert!(err.to_string().contains("\"YES\""));
    }

    #[test]
    fn test_disk_too_small_display() {
        let err = DiskError::DiskTooSmall {
            disk_mib: 1024,
            swap_mib: 2048,
        };
        let msg = err.to_string();
        assert!(msg.contains("1024 MiB"));
        assert!(msg.contains("2048 MiB swap"));
    }

    #[test]
    fn test_install_error_conversion() {
        let err: InstallError = PreflightError::MissingTool("parted").into();
        assert!(matches!(err, InstallError::Preflight(_)));

        let err: InstallError = BootstrapError::IncompleteMountTable.into();
        assert!(matches!(err, InstallError::Bootstrap(_)));
    }
}
