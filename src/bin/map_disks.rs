use anyhow::Result;
use clap::error::ErrorKind;
use clap::{ArgAction, Parser};
use log::{LevelFilter, debug, info};
use pve_disk_map::disks::{DiskClassifier, UnattachedPolicy};
use pve_disk_map::filter::LineFilter;
use pve_disk_map::host::ProxmoxClient;
use pve_disk_map::inventory::collect_disks;
use pve_disk_map::report::{Mode, render};
use pve_disk_map::settings::{Credentials, DEFAULT_CREDENTIAL_FILE};
use std::path::PathBuf;
use std::process::exit;

/// Print manifest of nodes/vms/storage devices.
#[derive(Parser, Debug)]
#[clap(about, version, author)]
struct Args {
    /// Be verbose, (multiples okay)
    #[clap(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Print `qm move_disk` commands
    #[clap(short, long = "move")]
    move_disks: bool,

    /// Storage pool to move disks to, required with --move
    #[clap(short, long)]
    target: Option<String>,

    /// Use alternate credentials file
    #[clap(short = 'f', long, default_value = DEFAULT_CREDENTIAL_FILE)]
    credfile: PathBuf,

    /// Print only lines NOT matching the filter
    #[clap(short, long, action = ArgAction::Count)]
    negate: u8,

    /// Leave out drives with no media attached
    #[clap(long)]
    skip_unattached: bool,

    /// Regex patterns, a line is printed if any of them matches
    filter: Vec<String>,
}

impl Args {
    fn mode(&self) -> Result<Mode, &'static str> {
        match (self.move_disks, &self.target) {
            (false, _) => Ok(Mode::List),
            (true, Some(t)) if !t.is_empty() => Ok(Mode::Move { target: t.clone() }),
            (true, _) => Err("--move requires a --target storage pool"),
        }
    }

    fn unattached(&self) -> UnattachedPolicy {
        if self.skip_unattached {
            UnattachedPolicy::Skip
        } else {
            UnattachedPolicy::Include
        }
    }
}

/// Map the -v count onto the 30 - 10 * n scale, floor 1
fn log_level(verbose: u8) -> LevelFilter {
    let level = 30i32.saturating_sub(10 * verbose as i32).max(1);
    match level {
        30.. => LevelFilter::Warn,
        20..=29 => LevelFilter::Info,
        10..=19 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn usage_error(msg: impl std::fmt::Display) -> ! {
    println!("Error: {}", msg);
    exit(1)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = match Args::try_parse() {
        Ok(a) => a,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            println!("{}\nError parsing arguments.\n", e);
            exit(1);
        }
    };

    env_logger::Builder::new()
        .filter_level(log_level(args.verbose))
        .parse_default_env()
        .init();

    let mode = args.mode().unwrap_or_else(|e| usage_error(e));
    let filter = LineFilter::new(&args.filter, args.negate > 0)
        .unwrap_or_else(|e| usage_error(format!("{:#}", e)));
    debug!("mode={:?} filter={:?}", mode, filter.pattern());

    let creds = Credentials::load(&args.credfile)?;
    let base = creds.api_base()?;
    info!("Connecting to {}", base);
    let client = ProxmoxClient::login(base, &creds).await?;

    let disks = collect_disks(&client, &DiskClassifier::new(args.unattached())).await?;
    for line in render(&disks, &mode, &filter) {
        println!("{}", line);
    }
    Ok(())
}
