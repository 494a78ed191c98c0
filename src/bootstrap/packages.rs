//! The base package manifest handed to pacstrap.
//!
//! Dependency resolution is the package manager's job; this is just the
//! declarative list the sequencer consumes.

/// Base system plus networking, sudo, an editor, and the UEFI bootloader.
pub const BASE_PACKAGES: [&str; 10] = [
    "base",
    "linux",
    "linux-firmware",
    "e2fsprogs",
    "dosfstools",
    "networkmanager",
    "sudo",
    "vim",
    "grub",
    "efibootmgr",
];
