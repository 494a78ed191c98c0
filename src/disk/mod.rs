//! Disk Sequencer.
//!
//! Turns a [`PartitionPlan`] into an ordered run of `parted`/`mkfs`/`mount`
//! invocations and records the resulting [`MountTable`]. The plan itself is
//! pure ([`plan`]); this module is the only place the disk is actually
//! written.
//!
//! There is no cleanup on failure: once the GPT label is written the disk is
//! in an undefined intermediate state until the sequence completes. The only
//! gate is the preflight confirmation that precedes this stage.

pub mod device;
pub mod mount_table;
pub mod plan;

pub use device::TargetDisk;
pub use mount_table::{MountTable, PartitionRole};
pub use plan::{DiskOp, PartitionPlan};

use crate::error::DiskError;
use crate::executor::CommandExt;
use crate::tool::Toolbox;
use std::path::Path;
use tracing::{info, warn};

/// Execute the plan against the target disk, mounting the new filesystems
/// under `mount_root`.
///
/// Returns the mount table consumed by the bootstrapper. Every external
/// command failure aborts the sequence immediately.
pub fn partition(
    disk: &TargetDisk,
    plan: &PartitionPlan,
    mount_root: &Path,
    tools: &Toolbox,
) -> Result<MountTable, DiskError> {
    // compute() upholds this; a violated plan must never reach the disk.
    if !plan.is_well_formed() {
        return Err(DiskError::DiskTooSmall {
            disk_mib: plan.disk_mib,
            swap_mib: plan.swap_mib(),
        });
    }

    warn!(disk = %disk.path().display(), "writing a fresh partition table; existing data is gone");

    let mut table = MountTable::new();
    for op in plan.render_ops(disk, mount_root) {
        execute_op(disk, &op, tools, &mut table)?;
    }

    info!(
        root = %mount_root.display(),
        swap_mib = plan.swap_mib(),
        root_mib = plan.root_mib(),
        "disk sequencing complete"
    );
    Ok(table)
}

fn execute_op(
    disk: &TargetDisk,
    op: &DiskOp,
    tools: &Toolbox,
    table: &mut MountTable,
) -> Result<(), DiskError> {
    match op {
        DiskOp::WriteGptLabel => {
            info!("writing GPT label");
            tools
                .parted
                .command()
                .arg("-s")
                .arg(disk.path())
                .args(["mklabel", "gpt"])
                .run_checked()
                .map_err(DiskError::Partitioning)
        }
        DiskOp::CreatePartition {
            index,
            name,
            fs_hint,
            start_mib,
            end_mib,
        } => {
            let end = match end_mib {
                Some(mib) => format!("{mib}MiB"),
                None => "100%".to_string(),
            };
            info!(index, name, %end, "creating partition");
            tools
                .parted
                .command()
                .arg("-s")
                .arg(disk.path())
                .args(["mkpart", name, fs_hint])
                .arg(format!("{start_mib}MiB"))
                .arg(end)
                .run_checked()
                .map_err(DiskError::Partitioning)
        }
        DiskOp::SetEspFlag => tools
            .parted
            .command()
            .arg("-s")
            .arg(disk.path())
            .args(["set", "1", "esp", "on"])
            .run_checked()
            .map_err(DiskError::Partitioning),
        DiskOp::FormatEsp { device } => {
            info!(device = %device.display(), "formatting ESP as FAT32");
            tools
                .mkfs_fat
                .command()
                .arg("-F32")
                .arg(device)
                .run_checked()
                .map_err(DiskError::Formatting)
        }
        DiskOp::InitSwap { device } => {
            info!(device = %device.display(), "initializing swap");
            tools
                .mkswap
                .command()
                .arg(device)
                .run_checked()
                .map_err(DiskError::Formatting)?;
            tools
                .swapon
                .command()
                .arg(device)
                .run_checked()
                .map_err(DiskError::Formatting)
        }
        DiskOp::FormatRoot { device } => {
            info!(device = %device.display(), "formatting root as ext4");
            tools
                .mkfs_ext4
                .command()
                .arg("-F")
                .arg(device)
                .run_checked()
                .map_err(DiskError::Formatting)
        }
        DiskOp::MountRoot { device, target } => {
            info!(device = %device.display(), target = %target.display(), "mounting root");
            std::fs::create_dir_all(target).map_err(|source| DiskError::MountPoint {
                path: target.clone(),
                source,
            })?;
            tools
                .mount
                .command()
                .arg(device)
                .arg(target)
                .run_checked()
                .map_err(DiskError::Mounting)?;
            table.record(PartitionRole::Root, target.clone());
            Ok(())
        }
        DiskOp::MountEsp { device, target } => {
            info!(device = %device.display(), target = %target.display(), "mounting ESP");
            std::fs::create_dir_all(target).map_err(|source| DiskError::MountPoint {
                path: target.clone(),
                source,
            })?;
            tools
                .mount
                .command()
                .arg(device)
                .arg(target)
                .run_checked()
                .map_err(DiskError::Mounting)?;
            table.record(PartitionRole::Efi, target.clone());
            Ok(())
        }
    }
}
