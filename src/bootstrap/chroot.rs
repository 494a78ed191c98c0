//! Second-stage configuration inside the new root.
//!
//! Two separate concerns, each testable on its own:
//! - [`render_setup_script`]: pure template substitution, profile values in,
//!   shell text out.
//! - [`run_in_target`]: stage the script under the new root, execute it via
//!   `arch-chroot`, remove it afterward.

use crate::error::BootstrapError;
use crate::executor::CommandExt;
use crate::profile::Profile;
use crate::tool::Tool;
use std::path::Path;
use tracing::{info, warn};

/// Placeholder password for the primary user. The operator is warned to
/// change it on first boot.
pub const DEFAULT_PASSWORD: &str = "changeme";

/// File name the script is staged under inside the new root.
const SCRIPT_NAME: &str = "archstrap-setup.sh";

/// Render the second-stage shell procedure from the profile.
///
/// The script runs with the new root as its filesystem root, so every path
/// in it is relative to the installed system.
pub fn render_setup_script(profile: &Profile) -> String {
    let charset = profile
        .locale
        .split_once('.')
        .map(|(_, cs)| cs)
        .unwrap_or("UTF-8");

    format!(
        r#"#!/bin/bash
set -euo pipefail

ln -sf /usr/share/zoneinfo/{timezone} /etc/localtime
hwclock --systohc

echo '{locale} {charset}' >> /etc/locale.gen
locale-gen
echo 'LANG={locale}' > /etc/locale.conf

echo '{hostname}' > /etc/hostname
cat > /etc/hosts <<'HOSTS'
127.0.0.1	localhost
::1		localhost
127.0.1.1	{hostname}.localdomain	{hostname}
HOSTS

systemctl enable NetworkManager

useradd -m -G wheel {username}
echo '{username}:{password}' | chpasswd
echo '%wheel ALL=(ALL:ALL) ALL' > /etc/sudoers.d/10-wheel
chmod 0440 /etc/sudoers.d/10-wheel

grub-install --target=x86_64-efi --efi-directory=/boot/efi --bootloader-id=GRUB
grub-mkconfig -o /boot/grub/grub.cfg
"#,
        timezone = profile.timezone,
        locale = profile.locale,
        charset = charset,
        hostname = profile.hostname,
        username = profile.username,
        password = DEFAULT_PASSWORD,
    )
}

/// Write `script` under `root` and execute it with the new root as the
/// execution context. The staged file is removed on success.
pub fn run_in_target(
    arch_chroot: &Tool,
    root: &Path,
    script: &str,
) -> Result<(), BootstrapError> {
    let staged = root.join(SCRIPT_NAME);
    std::fs::write(&staged, script).map_err(|source| BootstrapError::ScriptWrite {
        path: staged.clone(),
        source,
    })?;

    info!(root = %root.display(), "running second-stage configuration");
    arch_chroot
        .command()
        .arg(root)
        .args(["bash", &format!("/{SCRIPT_NAME}")])
        .run_checked()
        .map_err(BootstrapError::Chroot)?;

    if let Err(e) = std::fs::remove_file(&staged) {
        warn!(path = %staged.display(), error = %e, "could not remove staged setup script");
    }
    Ok(())
}
