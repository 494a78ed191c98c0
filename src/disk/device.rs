//! The target block device.

use crate::error::DiskError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Kernel sector size used by `/sys/block/<name>/size`.
const SECTOR_BYTES: u64 = 512;

/// The disk the installation destroys and installs onto.
///
/// Selected once, immutable afterward.
#[derive(Debug, Clone)]
pub struct TargetDisk {
    path: PathBuf,
    name: String,
    size_mib: u64,
}

impl TargetDisk {
    /// Build a disk description without touching the system (tests,
    /// simulated devices).
    pub fn with_size(path: impl Into<PathBuf>, size_mib: u64) -> Result<Self, DiskError> {
        let path = path.into();
        let name = device_name(&path)?;
        Ok(Self {
            path,
            name,
            size_mib,
        })
    }

    /// Probe a real device: size comes from `/sys/block/<name>/size`
    /// (512-byte sectors).
    pub fn probe(path: &Path) -> Result<Self, DiskError> {
        let canonical = path.canonicalize().map_err(|source| DiskError::Probe {
            path: path.to_path_buf(),
            source,
        })?;
        let name = device_name(&canonical)?;

        let size_path = Path::new("/sys/block").join(&name).join("size");
        let text = fs::read_to_string(&size_path).map_err(|source| DiskError::Probe {
            path: size_path.clone(),
            source,
        })?;
        let sectors: u64 = text.trim().parse().map_err(|_| DiskError::Probe {
            path: size_path,
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "unparsable sector count"),
        })?;

        let size_mib = sectors * SECTOR_BYTES / (1024 * 1024);
        debug!(device = %name, size_mib, "probed target disk");

        Ok(Self {
            path: canonical,
            name,
            size_mib,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_mib(&self) -> u64 {
        self.size_mib
    }

    /// Path of partition `index` on this disk.
    ///
    /// Devices whose name ends in a digit (nvme0n1, mmcblk0) take a `p`
    /// infix before the partition number; everything else is suffixed
    /// directly (sda -> sda1).
    pub fn partition_path(&self, index: u8) -> PathBuf {
        let file = if self.name.ends_with(|c: char| c.is_ascii_digit()) {
            format!("{}p{}", self.name, index)
        } else {
            format!("{}{}", self.name, index)
        };
        PathBuf::from("/dev").join(file)
    }
}

fn device_name(path: &Path) -> Result<String, DiskError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(String::from)
        .ok_or_else(|| DiskError::Probe {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "no device name"),
        })
}
