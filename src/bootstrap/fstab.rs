//! Persisted mount table generation.
//!
//! `genfstab -U` probes every filesystem mounted beneath the new root and
//! emits UUID-keyed entries; the output is appended to `<root>/etc/fstab`.

use crate::error::BootstrapError;
use crate::executor::CommandExt;
use crate::tool::Tool;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Generate and persist the fstab for everything mounted under `root`.
pub fn generate(genfstab: &Tool, root: &Path) -> Result<(), BootstrapError> {
    let entries = genfstab
        .command()
        .arg("-U")
        .arg(root)
        .run_output()
        .map_err(BootstrapError::Fstab)?;

    let path = root.join("etc/fstab");
    append(&path, &entries)?;

    info!(path = %path.display(), "fstab written");
    Ok(())
}

fn append(path: &Path, entries: &str) -> Result<(), BootstrapError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| BootstrapError::FstabWrite {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(entries.as_bytes())
        .map_err(|source| BootstrapError::FstabWrite {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fstab");
        std::fs::write(&path, "# header\n").unwrap();

        append(&path, "UUID=abcd / ext4 rw 0 1\n").unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# header\n"));
        assert!(text.contains("UUID=abcd / ext4 rw 0 1"));
    }

    #[test]
    fn test_append_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fstab");
        append(&path, "UUID=abcd / ext4 rw 0 1\n").unwrap();
        assert!(path.exists());
    }
}
