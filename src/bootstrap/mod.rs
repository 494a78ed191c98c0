//! System Bootstrapper.
//!
//! Installs the base package set onto the mounted root, persists the mount
//! table as fstab, runs the second-stage configuration inside the new root,
//! and finally unmounts everything recursively. Strictly sequential,
//! fail-fast, no rollback.

pub mod chroot;
pub mod fstab;
pub mod packages;

pub use chroot::{render_setup_script, run_in_target, DEFAULT_PASSWORD};
pub use packages::BASE_PACKAGES;

use crate::context::InstallContext;
use crate::error::BootstrapError;
use crate::executor::CommandExt;
use crate::tool::Toolbox;
use tracing::{info, warn};

/// Reject a mount table that is missing either the EFI or root entry.
/// Guards both the normal path and `--resume-from bootstrap`.
pub fn ensure_table_complete(table: &crate::disk::MountTable) -> Result<(), BootstrapError> {
    if table.is_complete() {
        Ok(())
    } else {
        Err(BootstrapError::IncompleteMountTable)
    }
}

/// Run the full bootstrap against a completed mount table.
pub fn bootstrap(ctx: &InstallContext, tools: &Toolbox) -> Result<(), BootstrapError> {
    ensure_table_complete(&ctx.mount_table)?;
    let root = ctx.mount_root.as_path();

    info!(packages = BASE_PACKAGES.len(), "installing base system");
    tools
        .pacstrap
        .command()
        .arg(root)
        .args(BASE_PACKAGES)
        .run_checked()
        .map_err(BootstrapError::Pacstrap)?;

    fstab::generate(&tools.genfstab, root)?;

    let script = render_setup_script(&ctx.profile);
    run_in_target(&tools.arch_chroot, root, &script)?;

    warn!(
        user = %ctx.profile.username,
        "user created with the placeholder password {DEFAULT_PASSWORD:?}; change it after first boot"
    );

    info!(root = %root.display(), "unmounting the new root");
    tools
        .umount
        .command()
        .arg("-R")
        .arg(root)
        .run_checked()
        .map_err(BootstrapError::Unmount)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk::{MountTable, PartitionRole};
    use std::path::PathBuf;

    #[test]
    fn test_gate_refuses_empty_table() {
        let err = ensure_table_complete(&MountTable::new()).unwrap_err();
        assert!(matches!(err, BootstrapError::IncompleteMountTable));
    }

    #[test]
    fn test_gate_refuses_root_only_table() {
        let mut table = MountTable::new();
        table.record(PartitionRole::Root, PathBuf::from("/mnt"));
        assert!(ensure_table_complete(&table).is_err());
    }

    #[test]
    fn test_gate_accepts_complete_table() {
        let mut table = MountTable::new();
        table.record(PartitionRole::Root, PathBuf::from("/mnt"));
        table.record(PartitionRole::Efi, PathBuf::from("/mnt/boot/efi"));
        ensure_table_complete(&table).expect("complete table passes the gate");
    }
}
