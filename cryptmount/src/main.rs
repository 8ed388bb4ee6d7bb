// SPDX-License-Identifier: GPL-3.0-only

//! cryptmount - attach an encrypted partition to softraid and mount it
//!
//! The encrypted RAID partition (`--disk0`) and the filesystem on the
//! decrypted logical disk (`--disk1`) are given by DUID, which stays the
//! same across boots, unlike the `/dev` names that `bioctl` and `mount`
//! need. The DUIDs are translated with `sysctl hw.disknames` on every run.

mod config;
mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use clap::builder::NonEmptyStringValueParser;
use cryptmount_sys::{Orchestrator, SystemRunner};
use cryptmount_types::{DEFAULT_MOUNT_OPTIONS, DiskSpec, MountRequest};
use tracing::{error, info};

use crate::config::Config;

const LONG_ABOUT: &str = "\
Attach an encrypted partition to softraid, then check and mount the \
filesystem on the decrypted disk. With -u, unmount the filesystem and \
detach the disk instead.

Disks are given as DUID.PART, where DUID is the 16 hex digit disklabel \
unique identifier and PART a single partition letter \
(e.g. a3a6acb427840bc0.a).

--disk0 names the encrypted RAID partition on the physical disk (e.g. a \
USB drive), attached to softraid0 with bioctl. --disk1 names the FFS \
partition on the decrypted logical disk, mounted on --dir.

Steps that are already done (disk attached, filesystem mounted) are \
skipped, so the command can safely be repeated.";

#[derive(Debug, Parser)]
#[command(name = "cryptmount", version)]
#[command(about = "Attach a softraid crypto volume by DUID and mount its filesystem")]
#[command(long_about = LONG_ABOUT)]
struct Args {
    /// Encrypted RAID partition to attach to softraid (DUID.PART)
    #[arg(long, value_name = "DISKSPEC", value_parser = DiskSpec::parse)]
    disk0: DiskSpec,

    /// FFS partition on the decrypted logical disk (DUID.PART)
    #[arg(long, value_name = "DISKSPEC", value_parser = DiskSpec::parse)]
    disk1: DiskSpec,

    /// Directory to mount the filesystem on
    #[arg(long, value_name = "DIRECTORY", value_parser = NonEmptyStringValueParser::new())]
    dir: String,

    /// Options for mount [default: "-o softdep"]
    #[arg(long, value_name = "OPTIONS", allow_hyphen_values = true)]
    mountopts: Option<String>,

    /// Unmount the filesystem and detach the disk
    #[arg(short = 'u', long = "unmount")]
    unmount: bool,

    /// Configuration file [default: /etc/cryptmount.toml if present]
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log every query and its result
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let mount_options = args
        .mountopts
        .or(config.mount_options)
        .unwrap_or_else(|| DEFAULT_MOUNT_OPTIONS.to_string());

    let request =
        MountRequest::new(args.disk0, args.disk1, args.dir).with_mount_options(mount_options);
    let orchestrator = Orchestrator::new(SystemRunner, config.tools);

    let outcome = if args.unmount {
        orchestrator.unmount(&request)?
    } else {
        orchestrator.mount(&request)?
    };

    if outcome.was_noop() {
        info!("Nothing to do: {} is {}", request.logical, outcome.stage);
    } else {
        info!(
            "{} is {} ({} step(s) performed)",
            request.logical,
            outcome.stage,
            outcome.performed.len()
        );
    }

    Ok(())
}
