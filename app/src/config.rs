use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Result};

use tripwire_api as api;
use tripwire_rx_libpcap as rx;
use api::config::{Config, DEFAULT_STATS_INTERVAL, PLACEHOLDER_INTERFACE};
use rx::InterfaceCatalog;

use super::commands::CliArg;
use super::logging;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Parse command line arguments and set configuration
pub fn parse_args(matches: &clap::ArgMatches) -> Result<Config> {
    let mut config: Config = Default::default();
    let hn = hostname::get()?;
    let hn = hn
        .to_str()
        .ok_or_else(|| anyhow!("Hostname {:?} is not a valid UTF-8 string", hn))?;
    config.hostname = hn.to_string();

    let fpath = config_path(matches).to_string();
    parse_config_file(&fpath, &mut config)?;
    config.fpath = fpath;

    set_config_by_cli_args(&mut config, matches);

    Ok(config)
}

pub fn config_path<'a>(matches: &'a clap::ArgMatches) -> &'a str {
    matches
        .value_of(CliArg::Config.as_str())
        .unwrap_or(DEFAULT_CONFIG_PATH)
}

fn parse_config_file(config_file: &str, config: &mut Config) -> Result<()> {
    let cfg_path = Path::new(config_file);
    if !cfg_path.exists() {
        return Err(anyhow!(
            "\"{}\" does not exist! Use --generate-config to create a default configuration file",
            config_file
        ));
    }

    let mut s = String::new();
    File::open(cfg_path)?.read_to_string(&mut s)?;
    config.doc = api::config::load_from_str(&s)?;

    // the configured subscriber depends on what is being parsed here
    tracing::subscriber::with_default(logging::bootstrap_subscriber(), || load_settings(config));

    if config.interfaces.is_empty() {
        return Err(anyhow!("No interface configured in {}", config_file));
    }

    Ok(())
}

fn load_settings(config: &mut Config) {
    config.interfaces = config.get_interfaces();
    config.log_level = config.get_str("logging.level", "info");
    config.log_format = config.get_str("logging.format", "json");
    config.log_file = config.get_str("logging.file", "");
    config.log_console = config.get_boolean("logging.console", true);
    config.stats_interval =
        config.get_integer("stats.interval", DEFAULT_STATS_INTERVAL, 1, 3600) as u64;
}

/// Use command arguments overrides config file settings
fn set_config_by_cli_args(config: &mut Config, matches: &clap::ArgMatches) {
    config.quiet = matches.is_present(CliArg::Quiet.as_str());
    config.verbose_mode = matches.is_present(CliArg::Verbose.as_str());
}

/// Interface a generated configuration captures on
pub fn default_interface(catalog: &InterfaceCatalog) -> String {
    catalog
        .suitable_interfaces()
        .into_iter()
        .next()
        .unwrap_or_else(|| String::from(PLACEHOLDER_INTERFACE))
}

/// Write a default configuration file, an existing file is never overwritten
pub fn generate_default_config(path: &str, catalog: &InterfaceCatalog) -> Result<String> {
    if Path::new(path).exists() {
        return Err(anyhow!("\"{}\" already exists, not overwriting it", path));
    }

    let interface = default_interface(catalog);
    std::fs::write(path, api::config::default_document(&interface)?)?;
    Ok(interface)
}
