//! Partition plan computation.
//!
//! Pure logic, no I/O: given the disk capacity and the machine's RAM the
//! plan fixes three contiguous partitions (ESP, swap, root) and renders the
//! ordered operation list the sequencer executes. Keeping the plan free of
//! side effects lets every invariant be unit-tested against simulated
//! devices.

use crate::disk::TargetDisk;
use crate::error::DiskError;
use std::path::PathBuf;

/// Start offset of the first partition. GPT metadata and alignment live
/// below this.
pub const ESP_START_MIB: u64 = 1;
/// Fixed size of the EFI System Partition.
pub const ESP_SIZE_MIB: u64 = 512;
/// RAM size above which swap stops growing 1:1.
const SWAP_KNEE_MIB: u64 = 8192;

/// Swap sizing policy: RAM-sized up to 8 GiB, then half of the excess on
/// top of 8 GiB. Integer arithmetic throughout.
pub fn swap_size_mib(ram_mib: u64) -> u64 {
    if ram_mib <= SWAP_KNEE_MIB {
        ram_mib
    } else {
        SWAP_KNEE_MIB + (ram_mib - SWAP_KNEE_MIB) / 2
    }
}

/// Parse `MemTotal` out of `/proc/meminfo` text, in MiB.
pub fn parse_meminfo_mib(text: &str) -> Option<u64> {
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix("MemTotal:") {
            let kib: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
            return Some(kib / 1024);
        }
    }
    None
}

/// Read the machine's RAM size in MiB from `/proc/meminfo`.
pub fn ram_size_mib() -> Result<u64, DiskError> {
    let path = PathBuf::from("/proc/meminfo");
    let text = std::fs::read_to_string(&path).map_err(|source| DiskError::Probe {
        path: path.clone(),
        source,
    })?;
    parse_meminfo_mib(&text).ok_or_else(|| DiskError::Probe {
        path,
        source: std::io::Error::new(std::io::ErrorKind::InvalidData, "MemTotal not found"),
    })
}

/// The fixed three-partition layout, boundaries in MiB from the start of
/// the disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionPlan {
    /// ESP spans [esp_start, swap_start).
    pub esp_start_mib: u64,
    /// Swap spans [swap_start, root_start).
    pub swap_start_mib: u64,
    /// Root spans [root_start, disk end].
    pub root_start_mib: u64,
    /// Reported disk capacity.
    pub disk_mib: u64,
}

impl PartitionPlan {
    /// Compute the layout for a disk and RAM size.
    ///
    /// Fails with `DiskTooSmall` unless the root region is non-empty.
    pub fn compute(disk_mib: u64, ram_mib: u64) -> Result<Self, DiskError> {
        let swap_mib = swap_size_mib(ram_mib);
        let swap_start_mib = ESP_START_MIB + ESP_SIZE_MIB;
        let root_start_mib = swap_start_mib + swap_mib;

        if root_start_mib >= disk_mib {
            return Err(DiskError::DiskTooSmall { disk_mib, swap_mib });
        }

        Ok(Self {
            esp_start_mib: ESP_START_MIB,
            swap_start_mib,
            root_start_mib,
            disk_mib,
        })
    }

    pub fn swap_mib(&self) -> u64 {
        self.root_start_mib - self.swap_start_mib
    }

    pub fn root_mib(&self) -> u64 {
        self.disk_mib - self.root_start_mib
    }

    /// Boundaries strictly increasing and within capacity. `compute` can
    /// never violate this; the sequencer asserts it anyway before writing
    /// the partition table.
    pub fn is_well_formed(&self) -> bool {
        self.esp_start_mib < self.swap_start_mib
            && self.swap_start_mib < self.root_start_mib
            && self.root_start_mib < self.disk_mib
    }
}

/// One atomic disk operation. The plan renders to an ordered list of these;
/// the sequencer executes them in order and aborts on the first failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiskOp {
    /// `parted -s <disk> mklabel gpt`; destroys the existing layout.
    WriteGptLabel,
    /// `parted -s <disk> mkpart <name> <fs> <start>MiB <end>` for one of the
    /// three partitions. `end_mib` of `None` means 100% of the disk.
    CreatePartition {
        index: u8,
        name: &'static str,
        fs_hint: &'static str,
        start_mib: u64,
        end_mib: Option<u64>,
    },
    /// `parted -s <disk> set 1 esp on`.
    SetEspFlag,
    /// `mkfs.fat -F32 <partition>`.
    FormatEsp { device: PathBuf },
    /// `mkswap <partition>` then `swapon <partition>`.
    InitSwap { device: PathBuf },
    /// `mkfs.ext4 -F <partition>`.
    FormatRoot { device: PathBuf },
    /// `mount <partition> <target>`, recorded in the mount table.
    MountRoot { device: PathBuf, target: PathBuf },
    /// Create `<root>/boot/efi` and mount the ESP there.
    MountEsp { device: PathBuf, target: PathBuf },
}

impl PartitionPlan {
    /// Render the ordered operation sequence for this plan.
    ///
    /// Ordering invariant: the GPT label is written first, partitions are
    /// created in on-disk order, formatting precedes mounting, and the root
    /// is mounted before the ESP directory beneath it can exist.
    pub fn render_ops(&self, disk: &TargetDisk, mount_root: &std::path::Path) -> Vec<DiskOp> {
        let esp = disk.partition_path(1);
        let swap = disk.partition_path(2);
        let root = disk.partition_path(3);

        vec![
            DiskOp::WriteGptLabel,
            DiskOp::CreatePartition {
                index: 1,
                name: "esp",
                fs_hint: "fat32",
                start_mib: self.esp_start_mib,
                end_mib: Some(self.swap_start_mib),
            },
            DiskOp::SetEspFlag,
            DiskOp::CreatePartition {
                index: 2,
                name: "swap",
                fs_hint: "linux-swap",
                start_mib: self.swap_start_mib,
                end_mib: Some(self.root_start_mib),
            },
            DiskOp::CreatePartition {
                index: 3,
                name: "root",
                fs_hint: "ext4",
                start_mib: self.root_start_mib,
                end_mib: None,
            },
            DiskOp::FormatEsp { device: esp.clone() },
            DiskOp::InitSwap { device: swap },
            DiskOp::FormatRoot {
                device: root.clone(),
            },
            DiskOp::MountRoot {
                device: root,
                target: mount_root.to_path_buf(),
            },
            DiskOp::MountEsp {
                device: esp,
                target: mount_root.join("boot/efi"),
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_policy_at_and_below_knee() {
        assert_eq!(swap_size_mib(2048), 2048);
        assert_eq!(swap_size_mib(8192), 8192);
    }

    #[test]
    fn test_swap_policy_above_knee() {
        assert_eq!(swap_size_mib(16384), 12288);
        // integer-division boundary: one MiB over the knee rounds down
        assert_eq!(swap_size_mib(8193), 8192);
        assert_eq!(swap_size_mib(8194), 8193);
    }

    #[test]
    fn test_parse_meminfo() {
        let text = "MemTotal:       16315784 kB\nMemFree:         1164 kB\n";
        assert_eq!(parse_meminfo_mib(text), Some(15933));
        assert_eq!(parse_meminfo_mib("MemFree: 12 kB\n"), None);
        assert_eq!(parse_meminfo_mib("MemTotal: garbage\n"), None);
    }

    #[test]
    fn test_plan_boundaries() {
        // 64 GiB disk, 4 GiB RAM
        let plan = PartitionPlan::compute(64 * 1024, 4096).unwrap();
        assert_eq!(plan.esp_start_mib, 1);
        assert_eq!(plan.swap_start_mib, 513);
        assert_eq!(plan.root_start_mib, 513 + 4096);
        assert_eq!(plan.swap_mib(), 4096);
        // root is the remainder: ~59.5 GiB
        assert_eq!(plan.root_mib(), 64 * 1024 - 4609);
        assert!(plan.is_well_formed());
    }

    #[test]
    fn test_plan_rejects_tiny_disk() {
        let err = PartitionPlan::compute(1024, 2048).unwrap_err();
        assert!(matches!(err, DiskError::DiskTooSmall { .. }));
        // exactly zero root space is also rejected
        assert!(PartitionPlan::compute(513 + 2048, 2048).is_err());
        // one MiB of root is enough
        assert!(PartitionPlan::compute(513 + 2048 + 1, 2048).is_ok());
    }

    #[test]
    fn test_render_ops_order_and_targets() {
        let disk = TargetDisk::with_size("/dev/nvme0n1", 64 * 1024).unwrap();
        let plan = PartitionPlan::compute(disk.size_mib(), 4096).unwrap();
        let ops = plan.render_ops(&disk, std::path::Path::new("/mnt"));

        assert!(matches!(ops[0], DiskOp::WriteGptLabel));
        // GPT label precedes every mkpart; formats precede mounts
        let first_format = ops
            .iter()
            .position(|op| matches!(op, DiskOp::FormatEsp { .. }))
            .unwrap();
        let last_mkpart = ops
            .iter()
            .rposition(|op| matches!(op, DiskOp::CreatePartition { .. }))
            .unwrap();
        assert!(last_mkpart < first_format);

        match ops.last().unwrap() {
            DiskOp::MountEsp { device, target } => {
                assert_eq!(device, &PathBuf::from("/dev/nvme0n1p1"));
                assert_eq!(target, &PathBuf::from("/mnt/boot/efi"));
            }
            other => panic!("last op must mount the ESP, got {other:?}"),
        }
    }
}
