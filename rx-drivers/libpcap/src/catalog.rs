use std::collections::HashMap;
use std::net::IpAddr;

use tripwire_api as api;
use api::error::{BoxError, CaptureError};

/// Metadata of one host interface
#[derive(Clone, Debug, PartialEq)]
pub struct InterfaceRecord {
    pub name: String,
    pub description: String,
    pub addresses: Vec<IpAddr>,
    pub up: bool,
    pub loopback: bool,
}

impl InterfaceRecord {
    /// Up, not a loopback device and bound to at least one address
    #[inline]
    pub fn is_suitable(&self) -> bool {
        self.up && !self.loopback && !self.addresses.is_empty()
    }
}

/// Enumerates the interfaces visible to the host
pub trait InterfaceSource {
    fn enumerate(&self) -> Result<Vec<InterfaceRecord>, BoxError>;
}

/// libpcap device list
#[derive(Clone, Copy, Debug, Default)]
pub struct PcapDevices;

impl InterfaceSource for PcapDevices {
    fn enumerate(&self) -> Result<Vec<InterfaceRecord>, BoxError> {
        let devices = pcap::Device::list()?;
        Ok(devices
            .into_iter()
            .map(|dev| InterfaceRecord {
                description: dev.desc.unwrap_or_default(),
                addresses: dev.addresses.iter().map(|a| a.addr).collect(),
                up: dev.flags.is_up(),
                loopback: dev.flags.is_loopback(),
                name: dev.name,
            })
            .collect())
    }
}

#[derive(Debug, Default)]
pub struct InterfaceCatalog {
    records: HashMap<String, InterfaceRecord>,
}

impl InterfaceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover the host's interfaces through libpcap
    pub fn discover(&mut self) -> Result<(), CaptureError> {
        self.discover_from(&PcapDevices)
    }

    /// Replace the catalog with a fresh enumeration, on failure the current content is kept
    pub fn discover_from(&mut self, source: &dyn InterfaceSource) -> Result<(), CaptureError> {
        let records = source.enumerate().map_err(CaptureError::DiscoveryFailed)?;
        self.records = records
            .into_iter()
            .map(|r| (r.name.clone(), r))
            .collect();
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&InterfaceRecord, CaptureError> {
        self.records
            .get(name)
            .ok_or_else(|| CaptureError::InterfaceNotFound(String::from(name)))
    }

    /// All records in no particular order
    pub fn list(&self) -> Vec<&InterfaceRecord> {
        self.records.values().collect()
    }

    pub fn list_sorted(&self) -> Vec<&InterfaceRecord> {
        let mut records = self.list();
        records.sort_by(|a, b| a.name.cmp(&b.name));
        records
    }

    /// Check that an interface can be captured on
    pub fn validate(&self, name: &str) -> Result<(), CaptureError> {
        let record = self.get(name)?;
        if !record.up {
            return Err(CaptureError::InterfaceDown(String::from(name)));
        }
        if record.loopback {
            return Err(CaptureError::InterfaceIsLoopback(String::from(name)));
        }
        Ok(())
    }

    /// Names of the suitable interfaces, sorted
    pub fn suitable_interfaces(&self) -> Vec<String> {
        self.list_sorted()
            .into_iter()
            .filter(|r| r.is_suitable())
            .map(|r| r.name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub struct FixedSource(pub Vec<InterfaceRecord>);

    impl InterfaceSource for FixedSource {
        fn enumerate(&self) -> Result<Vec<InterfaceRecord>, BoxError> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    impl InterfaceSource for FailingSource {
        fn enumerate(&self) -> Result<Vec<InterfaceRecord>, BoxError> {
            Err("permission denied".into())
        }
    }

    pub fn record(name: &str, up: bool, loopback: bool, addresses: &[&str]) -> InterfaceRecord {
        InterfaceRecord {
            name: String::from(name),
            description: String::new(),
            addresses: addresses.iter().map(|a| a.parse().unwrap()).collect(),
            up,
            loopback,
        }
    }

    pub fn host() -> Vec<InterfaceRecord> {
        vec![
            record("wlan0", true, false, &["192.168.1.20"]),
            record("lo", true, true, &["127.0.0.1", "::1"]),
            record("eth1", false, false, &["10.1.0.2"]),
            record("eth0", true, false, &["10.0.0.1", "fe80::1"]),
            record("docker0", true, false, &[]),
        ]
    }

    fn catalog() -> InterfaceCatalog {
        let mut catalog = InterfaceCatalog::new();
        catalog.discover_from(&FixedSource(host())).unwrap();
        catalog
    }

    #[test]
    fn get() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.get("eth0").unwrap().addresses.len(), 2);
        assert!(matches!(
            catalog.get("eth9"),
            Err(CaptureError::InterfaceNotFound(name)) if name == "eth9"
        ));
    }

    #[test]
    fn validate() {
        let catalog = catalog();
        for r in catalog.list() {
            let ok = catalog.validate(&r.name).is_ok();
            assert_eq!(ok, r.up && !r.loopback, "{}", r.name);
        }
        assert!(matches!(
            catalog.validate("eth1"),
            Err(CaptureError::InterfaceDown(_))
        ));
        assert!(matches!(
            catalog.validate("lo"),
            Err(CaptureError::InterfaceIsLoopback(_))
        ));
        assert!(matches!(
            catalog.validate("nope"),
            Err(CaptureError::InterfaceNotFound(_))
        ));
        // no address is still a valid capture target
        assert!(catalog.validate("docker0").is_ok());
    }

    #[test]
    fn suitable_interfaces() {
        let catalog = catalog();
        assert_eq!(catalog.suitable_interfaces(), vec!["eth0", "wlan0"]);

        let mut reversed = host();
        reversed.reverse();
        let mut other = InterfaceCatalog::new();
        other.discover_from(&FixedSource(reversed)).unwrap();
        assert_eq!(other.suitable_interfaces(), catalog.suitable_interfaces());
    }

    #[test]
    fn list_sorted() {
        let catalog = catalog();
        let names: Vec<&str> = catalog
            .list_sorted()
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["docker0", "eth0", "eth1", "lo", "wlan0"]);
    }

    #[test]
    fn discovery_replaces_catalog() {
        let mut catalog = catalog();
        catalog
            .discover_from(&FixedSource(vec![record("eth2", true, false, &["10.2.0.1"])]))
            .unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.get("eth0").is_err());
    }

    #[test]
    fn failed_discovery_keeps_catalog() {
        let mut catalog = catalog();
        let err = catalog.discover_from(&FailingSource).unwrap_err();
        assert!(matches!(err, CaptureError::DiscoveryFailed(_)));
        assert!(!err.is_recoverable());
        assert_eq!(catalog.len(), 5);
    }
}
