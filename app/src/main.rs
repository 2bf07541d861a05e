#[macro_use]
extern crate clap;

use std::sync::atomic::Ordering;
use std::time::Duration;

use anyhow::{anyhow, Result};
use tracing::{error, info, warn};

use tripwire_api as api;
use tripwire_rx_libpcap as rx;
use rx::{CaptureSession, InterfaceCatalog, InterfaceRecord};

mod commands;
mod config;
mod logging;
mod stats;
mod threadings;

use commands::CliArg;

/// One line of the `--list-interfaces` output
fn describe_interface(record: &InterfaceRecord) -> String {
    let mut line = record.name.clone();
    if !record.description.is_empty() {
        line.push_str(&format!(" ({})", record.description));
    }
    line.push_str(if record.up { " [UP]" } else { " [DOWN]" });
    if record.loopback {
        line.push_str(" [LOOPBACK]");
    }
    if !record.addresses.is_empty() {
        let addresses: Vec<String> = record.addresses.iter().map(|a| a.to_string()).collect();
        line.push_str(&format!(" {}", addresses.join(", ")));
    }
    if record.is_suitable() {
        line.push_str(" (RECOMMENDED)");
    }
    line
}

fn list_interfaces() -> Result<()> {
    let mut catalog = InterfaceCatalog::new();
    catalog.discover()?;
    println!("Available network interfaces:");
    for record in catalog.list_sorted() {
        println!("  {}", describe_interface(record));
    }
    Ok(())
}

fn generate_config(matches: &clap::ArgMatches) -> Result<()> {
    let path = config::config_path(matches);
    let mut catalog = InterfaceCatalog::new();
    if let Err(e) = catalog.discover() {
        eprintln!("{}, using placeholder interface name", e);
    }
    let interface = config::generate_default_config(path, &catalog)?;
    println!("Default configuration written to {} (interface: {})", path, interface);
    Ok(())
}

fn main() -> Result<()> {
    let root_cmd = commands::new_root_command();
    let matches = root_cmd.get_matches();

    if matches.is_present(CliArg::ListInterfaces.as_str()) {
        return list_interfaces();
    }
    if matches.is_present(CliArg::GenerateConfig.as_str()) {
        return generate_config(&matches);
    }

    let cfg = config::parse_args(&matches)?;
    logging::init(&cfg)?;

    signal_hook::flag::register(signal_hook::consts::SIGTERM, cfg.exit.clone())?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, cfg.exit.clone())?;

    info!(
        host = cfg.hostname.as_str(),
        config = cfg.fpath.as_str(),
        version = api::API_VERSION,
        "Starting tripwire"
    );

    let mut catalog = InterfaceCatalog::new();
    catalog.discover()?;
    info!(count = catalog.len(), "Discovered network interfaces");

    let mut sessions = vec![];
    for iface in &cfg.interfaces {
        let mut session = match CaptureSession::for_interface(&catalog, iface.clone()) {
            Ok(s) => s,
            Err(e) => {
                warn!(interface = iface.name.as_str(), "{}, skipping", e);
                continue;
            }
        };
        if let Err(e) = session.start() {
            error!(interface = iface.name.as_str(), "{}, skipping", e);
            continue;
        }
        sessions.push(session);
    }

    if sessions.is_empty() {
        return Err(anyhow!("No capture session could be started"));
    }

    // start one consumer per session
    let mut pkt_handles = vec![];
    for (i, session) in sessions.iter().enumerate() {
        let thread = threadings::PktThread::new(i, session.interface_name(), session.frames());
        let builder = std::thread::Builder::new().name(thread.name());
        pkt_handles.push(builder.spawn(move || thread.spawn())?);
    }

    let reporter = stats::StatsReporter::new(
        cfg.exit.clone(),
        Duration::from_secs(cfg.stats_interval),
        sessions.iter().map(|s| s.stats_handle()).collect(),
    );
    let builder = std::thread::Builder::new().name(reporter.name());
    let stats_handle = builder.spawn(move || reporter.spawn())?;

    while !cfg.exit.load(Ordering::Relaxed) {
        if sessions.iter().all(|s| !s.is_running()) {
            warn!("Every acquisition thread has exited");
            cfg.exit.store(true, Ordering::SeqCst);
            break;
        }
        std::thread::sleep(Duration::from_millis(100));
    }

    info!("Shutting down");
    for session in &mut sessions {
        session.stop();
    }

    for handle in pkt_handles {
        if let Err(e) = handle.join() {
            error!("{:?}", e);
        }
    }
    if let Err(e) = stats_handle.join() {
        error!("{:?}", e);
    }

    Ok(())
}
