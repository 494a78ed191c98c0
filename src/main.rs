//! archstrap entry point.
//!
//! Wires the interactive prompts to the three stages and decides, from
//! `--resume-from`, where the run starts. Control only ever flows forward;
//! any error terminates the process with a non-zero status.

use anyhow::Context as _;
use archstrap::bootstrap;
use archstrap::cli::{Cli, Stage};
use archstrap::context::InstallContext;
use archstrap::disk::{self, MountTable, PartitionPlan, TargetDisk};
use archstrap::preflight::{self, PreflightOptions};
use archstrap::profile::Profile;
use archstrap::prompt;
use archstrap::tool::Toolbox;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut input = stdin.lock();
    let mut output = stdout.lock();

    if let Err(e) = run(&cli, &mut input, &mut output) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn run<R: BufRead, W: Write>(cli: &Cli, input: &mut R, output: &mut W) -> anyhow::Result<()> {
    let profile = match &cli.config {
        Some(path) => {
            let profile = Profile::load_from_file(path)?;
            info!(path = %path.display(), "profile loaded");
            profile
        }
        None => Profile::collect(input, output).context("failed to collect the profile")?,
    };

    if cli.resume_from == Stage::Bootstrap {
        return resume_bootstrap(profile, &cli.mount_root);
    }
    // Preflight has no side effects, so resuming at the disk stage still
    // runs every check, including the destruction confirmation.

    let disk_path = ask_disk_path(input, output)?;
    let tools = preflight::validate(&disk_path, &PreflightOptions::default(), input, output)?;

    let disk = TargetDisk::probe(&disk_path)?;
    let ram_mib = disk::plan::ram_size_mib()?;
    let plan = PartitionPlan::compute(disk.size_mib(), ram_mib)?;
    info!(
        disk = %disk.path().display(),
        disk_mib = disk.size_mib(),
        ram_mib,
        swap_mib = plan.swap_mib(),
        "computed partition plan"
    );

    let mut ctx = InstallContext::new(profile, cli.mount_root.clone());
    ctx.mount_table = disk::partition(&disk, &plan, &ctx.mount_root, &tools)?;

    bootstrap::bootstrap(&ctx, &tools)?;
    writeln!(
        output,
        "Installation finished. Reboot into the new system and change the \
         password of {:?} (currently {:?}).",
        ctx.profile.username,
        bootstrap::DEFAULT_PASSWORD
    )?;
    Ok(())
}

/// Resume after the disk stage already completed: rediscover the mount table
/// instead of re-partitioning, then bootstrap.
fn resume_bootstrap(profile: Profile, mount_root: &Path) -> anyhow::Result<()> {
    preflight::check_privilege()?;
    let tools = Toolbox::resolve()?;

    let mounts = std::fs::read_to_string("/proc/mounts").context("failed to read /proc/mounts")?;
    let table = MountTable::discover(mount_root, &mounts);
    info!(entries = table.len(), root = %mount_root.display(), "rediscovered mount table");

    let mut ctx = InstallContext::new(profile, mount_root.to_path_buf());
    ctx.mount_table = table;
    bootstrap::bootstrap(&ctx, &tools)?;
    Ok(())
}

fn ask_disk_path<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> anyhow::Result<PathBuf> {
    let answer = prompt::ask_validated(input, output, "Target disk", "/dev/sda", |s| {
        s.starts_with("/dev/")
    })
    .context("failed to read the target disk path")?;
    Ok(PathBuf::from(answer))
}
