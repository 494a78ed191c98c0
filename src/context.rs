//! Explicit installation context.
//!
//! The state shared across stages travels in one value instead of ambient
//! globals: the operator profile, the working mount root, and the mount
//! table accumulated by the disk sequencer. The target disk and partition
//! plan are inputs to the disk stage alone, not shared state.

use crate::disk::MountTable;
use crate::profile::Profile;
use std::path::PathBuf;

/// State threaded from the disk sequencer into the bootstrapper.
#[derive(Debug, Clone)]
pub struct InstallContext {
    /// Operator-supplied configuration, read-only after collection.
    pub profile: Profile,
    /// Working root the new system is mounted under.
    pub mount_root: PathBuf,
    /// Role -> mount point map, filled by the disk sequencer (or rediscovered
    /// from /proc/mounts when resuming).
    pub mount_table: MountTable,
}

impl InstallContext {
    pub fn new(profile: Profile, mount_root: PathBuf) -> Self {
        Self {
            profile,
            mount_root,
            mount_table: MountTable::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_empty_mount_table() {
        let ctx = InstallContext::new(Profile::default(), PathBuf::from("/mnt"));
        assert!(ctx.mount_table.is_empty());
        assert_eq!(ctx.mount_root, PathBuf::from("/mnt"));
    }
}
