use std::sync::{atomic::AtomicBool, Arc};

use anyhow::{anyhow, Result};
use tracing::warn;
use yaml_rust::yaml::Hash;
use yaml_rust::{YamlEmitter, YamlLoader};

pub const DEFAULT_TIMEOUT: &str = "1s";
/// OS capture buffer size in bytes
pub const DEFAULT_BUFFER_SIZE: i64 = 1048576;
pub const DEFAULT_STATS_INTERVAL: i64 = 10;
/// Interface name written to generated configuration files when nothing suitable exists
pub const PLACEHOLDER_INTERFACE: &str = "YOUR_INTERFACE_HERE";

#[derive(Default, Clone)]
pub struct Config {
    pub exit: Arc<AtomicBool>,
    /// Configure file dist location
    pub fpath: String,
    pub hostname: String,
    /// Interfaces to capture on
    pub interfaces: Vec<SessionConfig>,
    pub log_level: String,
    pub log_format: String,
    /// Log file path, empty string disables file output
    pub log_file: String,
    pub log_console: bool,
    pub quiet: bool,
    /// Stats report interval in seconds
    pub stats_interval: u64,
    pub verbose_mode: bool,
    pub doc: Yaml,
}

impl Config {
    pub fn get_integer(&self, key: &str, default: i64, min: i64, max: i64) -> i64 {
        get_integer(&self.doc.as_ref(), key, default, min, max)
    }

    pub fn get_str(&self, key: &str, default: &str) -> String {
        get_str(&self.doc.as_ref(), key, default)
    }

    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        get_boolean(&self.doc.as_ref(), key, default)
    }

    /// Read every entry of the `interfaces` sequence
    pub fn get_interfaces(&self) -> Vec<SessionConfig> {
        let mut result = vec![];
        match &self.doc.as_ref()["interfaces"] {
            yaml_rust::Yaml::Array(a) => {
                for element in a {
                    match SessionConfig::from_yaml(element) {
                        Ok(cfg) => result.push(cfg),
                        Err(e) => warn!("Skipping interface entry: {}", e),
                    }
                }
            }
            yaml_rust::Yaml::BadValue => warn!("Option interfaces not found, no interface configured"),
            _ => warn!("Wrong value type for interfaces, expecting array"),
        }
        result
    }

    /// Log level after command line overrides
    pub fn effective_log_level(&self) -> &str {
        if self.verbose_mode {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            self.log_level.as_str()
        }
    }
}

/// Settings of a single capture session
#[derive(Clone, Debug, PartialEq)]
pub struct SessionConfig {
    /// Network interface name
    pub name: String,
    pub promiscuous: bool,
    /// Read timeout of the capture handle, e.g. "1s", "250ms"
    pub timeout: String,
    /// OS level capture buffer size in bytes, 0 keeps the libpcap default
    pub buffer_size: i32,
    /// Keep the raw bytes of every frame in the published record
    pub retain_raw: bool,
}

impl SessionConfig {
    pub fn new<S: Into<String>>(name: S) -> Self {
        SessionConfig {
            name: name.into(),
            promiscuous: true,
            timeout: String::from(DEFAULT_TIMEOUT),
            buffer_size: DEFAULT_BUFFER_SIZE as i32,
            retain_raw: false,
        }
    }

    pub fn from_yaml(doc: &yaml_rust::Yaml) -> Result<Self> {
        let name = get_str_without_default(doc, "name")?;
        if name.is_empty() {
            return Err(anyhow!("Interface name could not be empty"));
        }

        Ok(SessionConfig {
            promiscuous: get_boolean(doc, "promiscuous", true),
            timeout: get_str(doc, "timeout", DEFAULT_TIMEOUT),
            buffer_size: get_integer(
                doc,
                "buffer_size",
                DEFAULT_BUFFER_SIZE,
                0,
                i32::MAX as i64,
            ) as i32,
            retain_raw: get_boolean(doc, "retain_raw", false),
            name,
        })
    }

    pub fn to_yaml(&self) -> yaml_rust::Yaml {
        let mut hash = Hash::new();
        hash.insert(
            yaml_rust::Yaml::String(String::from("name")),
            yaml_rust::Yaml::String(self.name.clone()),
        );
        hash.insert(
            yaml_rust::Yaml::String(String::from("promiscuous")),
            yaml_rust::Yaml::Boolean(self.promiscuous),
        );
        hash.insert(
            yaml_rust::Yaml::String(String::from("timeout")),
            yaml_rust::Yaml::String(self.timeout.clone()),
        );
        hash.insert(
            yaml_rust::Yaml::String(String::from("buffer_size")),
            yaml_rust::Yaml::Integer(self.buffer_size as i64),
        );
        hash.insert(
            yaml_rust::Yaml::String(String::from("retain_raw")),
            yaml_rust::Yaml::Boolean(self.retain_raw),
        );
        yaml_rust::Yaml::Hash(hash)
    }
}

/// Parse a YAML document, only the first document of the stream is used
pub fn load_from_str(s: &str) -> Result<Yaml> {
    let mut docs = YamlLoader::load_from_str(s)?;
    if docs.is_empty() {
        return Err(anyhow!("Configuration file is empty"));
    }
    Ok(Yaml(docs.swap_remove(0)))
}

/// Render a default configuration document capturing on a single interface
pub fn default_document(interface: &str) -> Result<String> {
    let mut doc = Hash::new();
    doc.insert(
        yaml_rust::Yaml::String(String::from("interfaces")),
        yaml_rust::Yaml::Array(vec![SessionConfig::new(interface).to_yaml()]),
    );
    let scalars = [
        ("logging.level", yaml_rust::Yaml::String(String::from("info"))),
        ("logging.format", yaml_rust::Yaml::String(String::from("json"))),
        (
            "logging.file",
            yaml_rust::Yaml::String(String::from("logs/tripwire.json")),
        ),
        ("logging.console", yaml_rust::Yaml::Boolean(true)),
        ("stats.interval", yaml_rust::Yaml::Integer(DEFAULT_STATS_INTERVAL)),
    ];
    for (key, value) in scalars {
        doc.insert(yaml_rust::Yaml::String(String::from(key)), value);
    }

    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump(&yaml_rust::Yaml::Hash(doc))
        .map_err(|e| anyhow!("Failed to render configuration: {:?}", e))?;
    out.push('\n');
    Ok(out)
}

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
/// Simple wrapper struct to implement Default trait for yaml_rust::Yaml
pub struct Yaml(pub yaml_rust::Yaml);

impl Default for Yaml {
    fn default() -> Self {
        Self(yaml_rust::Yaml::Null)
    }
}

impl AsRef<yaml_rust::Yaml> for Yaml {
    fn as_ref(&self) -> &yaml_rust::Yaml {
        &self.0
    }
}

impl AsMut<yaml_rust::Yaml> for Yaml {
    fn as_mut(&mut self) -> &mut yaml_rust::Yaml {
        &mut self.0
    }
}

fn get_str(doc: &yaml_rust::Yaml, key: &str, default: &str) -> String {
    match &doc[key] {
        yaml_rust::Yaml::String(s) => s.clone(),
        yaml_rust::Yaml::BadValue => {
            warn!(
                "Option {} not found or bad string value, set {} to {}",
                key, key, default
            );
            default.to_string()
        }
        _ => {
            warn!(
                "Wrong value type for {}, expecting string, set {} to {}",
                key, key, default
            );
            default.to_string()
        }
    }
}

fn get_str_without_default(doc: &yaml_rust::Yaml, key: &str) -> Result<String> {
    match &doc[key] {
        yaml_rust::Yaml::String(s) => Ok(s.clone()),
        yaml_rust::Yaml::BadValue => Err(anyhow!("Option {} not found or bad string value", key,)),
        _ => Err(anyhow!("Wrong value type for {}, expecting string", key,)),
    }
}

fn get_boolean(doc: &yaml_rust::Yaml, key: &str, default: bool) -> bool {
    match doc[key] {
        yaml_rust::Yaml::Boolean(b) => b,
        yaml_rust::Yaml::BadValue => {
            warn!(
                "Option {} not found or bad boolean value, set {} to {}",
                key, key, default
            );
            default
        }
        _ => {
            warn!(
                "Wrong value type for {}, expecting boolean, set {} to {}",
                key, key, default
            );
            default
        }
    }
}

fn get_integer(doc: &yaml_rust::Yaml, key: &str, default: i64, min: i64, max: i64) -> i64 {
    match doc[key] {
        yaml_rust::Yaml::Integer(i) => {
            if i < min || i > max {
                warn!(
                    "Option {} is less/greater than min/max value {}/{}, set {} to {}",
                    key, min, max, key, default
                );
                default
            } else {
                i
            }
        }
        yaml_rust::Yaml::BadValue => {
            warn!(
                "Option {} not found or bad integer value, set {} to {}",
                key, key, default
            );
            default
        }
        _ => {
            warn!(
                "Wrong value type for {}, expecting integer, set {} to {}",
                key, key, default
            );
            default
        }
    }
}
