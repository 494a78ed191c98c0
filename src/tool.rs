//! PATH resolution for required external tools.
//!
//! Every binary the sequencer shells out to is resolved up front so a missing
//! tool surfaces during preflight, not halfway through a destructive stage.

use crate::error::PreflightError;
use std::path::PathBuf;
use std::process::Command;

/// A resolved external tool.
#[derive(Debug, Clone)]
pub struct Tool {
    name: &'static str,
    exec: PathBuf,
}

impl Tool {
    /// Resolve `name` on PATH, failing with `MissingTool` if absent.
    pub fn find(name: &'static str) -> Result<Self, PreflightError> {
        let exec = which::which(name).map_err(|_| PreflightError::MissingTool(name))?;
        Ok(Self { name, exec })
    }

    /// Start building an invocation of this tool.
    pub fn command(&self) -> Command {
        Command::new(&self.exec)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// The full set of external tools the sequencer invokes, resolved once by
/// preflight and threaded through the later stages.
#[derive(Debug, Clone)]
pub struct Toolbox {
    pub parted: Tool,
    pub mkfs_fat: Tool,
    pub mkfs_ext4: Tool,
    pub mkswap: Tool,
    pub swapon: Tool,
    pub mount: Tool,
    pub umount: Tool,
    pub pacstrap: Tool,
    pub genfstab: Tool,
    pub arch_chroot: Tool,
}

impl Toolbox {
    /// Resolve every required tool, short-circuiting on the first miss.
    pub fn resolve() -> Result<Self, PreflightError> {
        Ok(Self {
            parted: Tool::find("parted")?,
            mkfs_fat: Tool::find("mkfs.fat")?,
            mkfs_ext4: Tool::find("mkfs.ext4")?,
            mkswap: Tool::find("mkswap")?,
            swapon: Tool::find("swapon")?,
            mount: Tool::find("mount")?,
            umount: Tool::find("umount")?,
            pacstrap: Tool::find("pacstrap")?,
            genfstab: Tool::find("genfstab")?,
            arch_chroot: Tool::find("arch-chroot")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_existing_tool() {
        // `ls` exists on any test machine
        let tool = Tool::find("ls").expect("ls should be on PATH");
        assert_eq!(tool.name(), "ls");
        assert!(tool.exec.is_absolute());
    }

    #[test]
    fn test_find_missing_tool() {
        let err = Tool::find("definitely_not_a_real_binary_2718").unwrap_err();
        assert!(matches!(err, PreflightError::MissingTool(_)));
    }

    #[test]
    fn test_command_uses_resolved_path() {
        let tool = Tool::find("ls").expect("ls should be on PATH");
        let cmd = tool.command();
        assert_eq!(cmd.get_program(), tool.exec.as_os_str());
    }
}
