//! Preflight Validator.
//!
//! Runs every safety check before the sequencer is allowed to touch the
//! target disk, in a fixed order, short-circuiting on the first failure:
//!
//! 1. effective uid is root
//! 2. firmware exposes UEFI variables (legacy BIOS unsupported)
//! 3. network reachability (bounded TCP probe)
//! 4. the target path names an existing block device
//! 5. every external tool resolves on PATH
//! 6. the operator types the exact destruction token
//!
//! Preflight has no side effects; failing any check is always safe.

use crate::error::PreflightError;
use crate::prompt;
use crate::tool::Toolbox;
use std::io::{BufRead, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, TcpStream};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Knobs for the environment probes, overridable in tests.
#[derive(Debug, Clone)]
pub struct PreflightOptions {
    /// Path checked for UEFI variable support.
    pub efi_vars: PathBuf,
    /// Host probed for connectivity. Port 443 is firewall-friendly;
    /// ICMP would need raw sockets or shelling out to ping.
    pub probe_addr: SocketAddr,
    /// Number of connection attempts before giving up.
    pub probe_attempts: u32,
    /// Timeout for each attempt.
    pub probe_timeout: Duration,
}

impl Default for PreflightOptions {
    fn default() -> Self {
        Self {
            efi_vars: PathBuf::from("/sys/firmware/efi/efivars"),
            // archlinux.org
            probe_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::new(95, 217, 163, 246)), 443),
            probe_attempts: 3,
            probe_timeout: Duration::from_secs(5),
        }
    }
}

/// Check 1: effective privilege must be root.
pub fn check_privilege() -> Result<(), PreflightError> {
    let euid = nix::unistd::geteuid();
    if euid.is_root() {
        Ok(())
    } else {
        Err(PreflightError::InsufficientPrivilege(euid.as_raw()))
    }
}

/// Check 2: the firmware must expose UEFI variables.
pub fn check_firmware(efi_vars: &Path) -> Result<(), PreflightError> {
    if efi_vars.exists() {
        debug!(path = %efi_vars.display(), "UEFI variables present");
        Ok(())
    } else {
        Err(PreflightError::UnsupportedFirmware(efi_vars.to_path_buf()))
    }
}

/// Check 3: bounded network reachability probe.
pub fn check_connectivity(
    addr: SocketAddr,
    attempts: u32,
    timeout: Duration,
) -> Result<(), PreflightError> {
    for attempt in 1..=attempts {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => {
                info!(%addr, attempt, "network reachable");
                return Ok(());
            }
            Err(e) => warn!(%addr, attempt, error = %e, "connectivity probe failed"),
        }
    }
    Err(PreflightError::NoConnectivity {
        host: addr.to_string(),
        attempts,
    })
}

/// Check 4: the target path must name an existing whole block device.
///
/// Whole disks appear under `/sys/block/<name>`; a partition or an arbitrary
/// file does not.
pub fn check_block_device(disk: &Path) -> Result<(), PreflightError> {
    let canonical = disk
        .canonicalize()
        .map_err(|_| PreflightError::InvalidDevice(disk.to_path_buf()))?;
    let name = canonical
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| PreflightError::InvalidDevice(disk.to_path_buf()))?;

    let sys = Path::new("/sys/block").join(name);
    if sys.exists() {
        Ok(())
    } else {
        Err(PreflightError::InvalidDevice(disk.to_path_buf()))
    }
}

/// Run every preflight check in order.
///
/// On success returns the resolved [`Toolbox`] so later stages never probe
/// PATH again. The confirmation prompt is the final gate: a refusal aborts
/// before any partition-table write is even constructed.
pub fn validate<R: BufRead, W: Write>(
    disk: &Path,
    opts: &PreflightOptions,
    input: &mut R,
    output: &mut W,
) -> Result<Toolbox, PreflightError> {
    check_privilege()?;
    check_firmware(&opts.efi_vars)?;
    check_connectivity(opts.probe_addr, opts.probe_attempts, opts.probe_timeout)?;
    check_block_device(disk)?;
    let toolbox = Toolbox::resolve()?;

    let confirmed = prompt::confirm_destruction(input, output, &disk.display().to_string())
        .map_err(|source| PreflightError::Probe {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
    if !confirmed {
        return Err(PreflightError::NotConfirmed {
            expected: prompt::CONFIRM_TOKEN,
        });
    }

    info!(disk = %disk.display(), "preflight passed");
    Ok(toolbox)
}
