//! Runtime mapping of partition roles to mount points.
//!
//! Built incrementally as the sequencer mounts each partition; consumed by
//! the bootstrapper and, when resuming, rediscovered from `/proc/mounts`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use strum::{Display, EnumIter, EnumString};

/// Mountable partition roles of the fixed layout. Swap is activated, not
/// mounted, so it never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[derive(Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum PartitionRole {
    Root,
    Efi,
}

/// Role -> mount point mapping.
#[derive(Debug, Clone, Default)]
pub struct MountTable {
    entries: BTreeMap<PartitionRole, PathBuf>,
}

impl MountTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mount. Later records for the same role win; the sequencer
    /// only ever records each role once.
    pub fn record(&mut self, role: PartitionRole, target: PathBuf) {
        self.entries.insert(role, target);
    }

    pub fn get(&self, role: PartitionRole) -> Option<&Path> {
        self.entries.get(&role).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Both EFI and root must be mounted before the bootstrapper may run.
    pub fn is_complete(&self) -> bool {
        self.entries.contains_key(&PartitionRole::Root)
            && self.entries.contains_key(&PartitionRole::Efi)
    }

    /// Rebuild the table from `/proc/mounts` text for a given working root.
    ///
    /// Used by `--resume-from bootstrap`: a previous run already partitioned
    /// and mounted, so the table is recovered instead of re-partitioning.
    pub fn discover(mount_root: &Path, mounts_text: &str) -> Self {
        let mut table = Self::new();
        let efi_point = mount_root.join("boot/efi");

        for line in mounts_text.lines() {
            let mut fields = line.split_whitespace();
            let (Some(_device), Some(target)) = (fields.next(), fields.next()) else {
                continue;
            };
            // /proc/mounts octal-escapes spaces; mount roots with spaces in
            // their path are not supported here.
            let target = Path::new(target);
            if target == mount_root {
                table.record(PartitionRole::Root, target.to_path_buf());
            } else if target == efi_point {
                table.record(PartitionRole::Efi, target.to_path_buf());
            }
        }

        table
    }
}
