use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;
use std::path::PathBuf;

use crate::dhcp::DhcpConfiguration;
use crate::dns::ForwarderConfig;
use crate::log::Log;
use crate::macaddr::MacAddr;
use crate::parse;

pub const DEFAULT_GATEWAY_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 65, 1);
pub const DEFAULT_LOWEST_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 65, 2);
pub const DEFAULT_HIGHEST_IP: Ipv4Addr = Ipv4Addr::new(192, 168, 65, 254);
pub const DEFAULT_MTU: usize = 1500;
pub const DEFAULT_PORT_MAX_IDLE_TIME: u64 = 300;
pub const DEFAULT_SERVER_MACADDR: MacAddr = MacAddr::new([0xF6, 0x16, 0x36, 0xBC, 0xF9, 0xC6]);
pub const DEFAULT_HOST_NAME: &str = "vpnkit.host";

/// Name resolution strategy: delegate to the host system resolver or to the
/// configured upstream DNS forwarders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Resolver {
    Host,
    Upstream,
}

impl fmt::Display for Resolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolver::Host => write!(f, "Host"),
            Resolver::Upstream => write!(f, "Upstream"),
        }
    }
}

/// Full set of tunables for a single running proxy instance. Built once at
/// startup from `Sources` and read-only afterwards.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Configuration {
    pub server_macaddr: MacAddr,
    pub max_connections: Option<usize>,
    pub dns: ForwarderConfig,
    pub dns_path: Option<PathBuf>,
    pub resolver: Resolver,
    pub domain: Option<String>,
    pub allowed_bind_addresses: Vec<Ipv4Addr>,
    pub gateway_ip: Ipv4Addr,
    pub lowest_ip: Ipv4Addr,
    pub highest_ip: Ipv4Addr,
    pub extra_dns: Vec<Ipv4Addr>,
    pub dhcp_json_path: Option<PathBuf>,
    pub dhcp_configuration: Option<DhcpConfiguration>,
    pub mtu: usize,
    pub http_intercept: Option<serde_json::Value>,
    pub http_intercept_path: Option<PathBuf>,
    pub port_max_idle_time: u64,
    pub host_names: Vec<String>,
}

impl Default for Configuration {
    fn default() -> Configuration {
        Configuration {
            server_macaddr: DEFAULT_SERVER_MACADDR,
            max_connections: None,
            dns: ForwarderConfig::default(),
            dns_path: None,
            resolver: Resolver::Host,
            domain: None,
            allowed_bind_addresses: Vec::new(),
            gateway_ip: DEFAULT_GATEWAY_IP,
            lowest_ip: DEFAULT_LOWEST_IP,
            highest_ip: DEFAULT_HIGHEST_IP,
            extra_dns: Vec::new(),
            dhcp_json_path: None,
            dhcp_configuration: None,
            mtu: DEFAULT_MTU,
            http_intercept: None,
            http_intercept_path: None,
            port_max_idle_time: DEFAULT_PORT_MAX_IDLE_TIME,
            host_names: vec![DEFAULT_HOST_NAME.to_string()],
        }
    }
}

/// Raw textual inputs, one per configurable field. `None` marks an absent
/// source and the default applies. The path fields record where the blobs
/// came from, the blob fields carry their contents.
#[derive(Debug, Default)]
pub struct Sources {
    pub server_macaddr: Option<String>,
    pub max_connections: Option<String>,
    pub dns: Option<String>,
    pub dns_path: Option<PathBuf>,
    pub resolver: Option<String>,
    pub domain: Option<String>,
    pub allowed_bind_addresses: Option<String>,
    pub gateway_ip: Option<String>,
    pub lowest_ip: Option<String>,
    pub highest_ip: Option<String>,
    pub extra_dns: Option<String>,
    pub dhcp_json: Option<String>,
    pub dhcp_json_path: Option<PathBuf>,
    pub mtu: Option<String>,
    pub http_intercept: Option<String>,
    pub http_intercept_path: Option<PathBuf>,
    pub port_max_idle_time: Option<String>,
    pub host_names: Option<String>,
}

impl Configuration {
    /// Apply the tolerant parsers field by field. An absent or invalid source
    /// falls back to the default; construction itself never fails.
    pub fn from_sources(log: &dyn Log, sources: &Sources) -> Configuration {
        let defaults = Configuration::default();
        Configuration {
            server_macaddr: match &sources.server_macaddr {
                Some(raw) => parse::macaddr(log, raw, defaults.server_macaddr),
                None => defaults.server_macaddr,
            },
            max_connections: parse::int(log, sources.max_connections.as_deref()),
            dns: match &sources.dns {
                Some(raw) => parse::dns(log, raw).unwrap_or(defaults.dns),
                None => defaults.dns,
            },
            dns_path: sources.dns_path.clone(),
            // an absent source keeps the default (Host); an explicit value
            // goes through the classifier, where anything but "host" selects
            // the upstream forwarder
            resolver: match sources.resolver.as_deref() {
                Some(raw) => parse::resolver(Some(raw)),
                None => defaults.resolver,
            },
            domain: sources.domain.as_deref().map(|raw| raw.trim().to_string()),
            allowed_bind_addresses: match &sources.allowed_bind_addresses {
                Some(raw) => parse::ipv4_list(log, raw, &defaults.allowed_bind_addresses),
                None => defaults.allowed_bind_addresses,
            },
            gateway_ip: match &sources.gateway_ip {
                Some(raw) => parse::ipv4(log, raw, defaults.gateway_ip),
                None => defaults.gateway_ip,
            },
            lowest_ip: match &sources.lowest_ip {
                Some(raw) => parse::ipv4(log, raw, defaults.lowest_ip),
                None => defaults.lowest_ip,
            },
            highest_ip: match &sources.highest_ip {
                Some(raw) => parse::ipv4(log, raw, defaults.highest_ip),
                None => defaults.highest_ip,
            },
            extra_dns: match &sources.extra_dns {
                Some(raw) => parse::ipv4_list(log, raw, &defaults.extra_dns),
                None => defaults.extra_dns,
            },
            dhcp_json_path: sources.dhcp_json_path.clone(),
            dhcp_configuration: sources
                .dhcp_json
                .as_deref()
                .and_then(|raw| DhcpConfiguration::of_string(log, raw)),
            mtu: parse::int(log, sources.mtu.as_deref()).unwrap_or(defaults.mtu),
            http_intercept: sources.http_intercept.as_deref().and_then(|raw| parse::json(log, raw)),
            http_intercept_path: sources.http_intercept_path.clone(),
            port_max_idle_time: parse::int(log, sources.port_max_idle_time.as_deref())
                .unwrap_or(defaults.port_max_idle_time),
            host_names: match &sources.host_names {
                Some(raw) => raw
                    .split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect(),
                None => defaults.host_names,
            },
        }
    }
}

pub(crate) fn join<T: fmt::Display>(items: &[T]) -> String {
    items.iter().map(|item| item.to_string()).collect::<Vec<String>>().join(",")
}

fn display_opt<T: fmt::Display>(value: &Option<T>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "None".to_string(),
    }
}

fn display_path(value: &Option<PathBuf>) -> String {
    match value {
        Some(path) => path.display().to_string(),
        None => "None".to_string(),
    }
}

/// Diagnostic rendering for logs only, deliberately not parseable back.
impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "server_macaddr = {}, max_connections = {}, dns = [{}], dns_path = {}, resolver = {}, \
             domain = {}, allowed_bind_addresses = {}, gateway_ip = {}, lowest_ip = {}, highest_ip = {}, \
             extra_dns = {}, dhcp_json_path = {}, dhcp_configuration = {}, mtu = {}, http_intercept = {}, \
             http_intercept_path = {}, port_max_idle_time = {}, host_names = {}",
            self.server_macaddr,
            display_opt(&self.max_connections),
            self.dns,
            display_path(&self.dns_path),
            self.resolver,
            display_opt(&self.domain),
            join(&self.allowed_bind_addresses),
            self.gateway_ip,
            self.lowest_ip,
            self.highest_ip,
            join(&self.extra_dns),
            display_path(&self.dhcp_json_path),
            display_opt(&self.dhcp_configuration),
            self.mtu,
            display_opt(&self.http_intercept),
            display_path(&self.http_intercept_path),
            self.port_max_idle_time,
            self.host_names.join(",")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::Recorder;

    #[test]
    fn test_default_literals() {
        let config = Configuration::default();
        assert_eq!(config.gateway_ip, Ipv4Addr::new(192, 168, 65, 1));
        assert_eq!(config.lowest_ip, Ipv4Addr::new(192, 168, 65, 2));
        assert_eq!(config.highest_ip, Ipv4Addr::new(192, 168, 65, 254));
        assert_eq!(config.mtu, 1500);
        assert_eq!(config.port_max_idle_time, 300);
        assert_eq!(config.server_macaddr.to_string(), "F6:16:36:BC:F9:C6");
        assert_eq!(config.host_names, vec!["vpnkit.host".to_string()]);
        assert_eq!(config.resolver, Resolver::Host);
        assert_eq!(config.dns, ForwarderConfig::default());
        assert_eq!(config.max_connections, None);
        assert!(config.extra_dns.is_empty());
        assert!(config.allowed_bind_addresses.is_empty());
    }

    #[test]
    fn test_default_display() {
        let rendered = Configuration::default().to_string();
        assert!(rendered.contains("mtu = 1500"));
        assert!(rendered.contains("max_connections = None"));
        assert!(rendered.contains("dns_path = None"));
        assert!(rendered.contains("domain = None"));
        assert!(rendered.contains("dhcp_json_path = None"));
        assert!(rendered.contains("dhcp_configuration = None"));
        assert!(rendered.contains("http_intercept = None"));
        assert!(rendered.contains("http_intercept_path = None"));
        assert!(rendered.contains("resolver = Host"));
        assert!(rendered.contains("host_names = vpnkit.host"));
    }

    #[test]
    fn test_display_has_no_round_trip() {
        // the rendering is for operator eyes; nothing feeds it back into a
        // parser and it is not valid input for any of them
        let rendered = Configuration::default().to_string();
        assert!(serde_json::from_str::<serde_json::Value>(&rendered).is_err());
    }

    #[test]
    fn test_from_sources_empty_is_default() {
        let log = Recorder::new();
        let config = Configuration::from_sources(&log, &Sources::default());
        assert_eq!(config, Configuration::default());
        assert!(log.errors().is_empty());
    }

    #[test]
    fn test_from_sources_overrides() {
        let log = Recorder::new();
        let sources = Sources {
            server_macaddr: Some("02:00:00:00:00:01".to_string()),
            max_connections: Some("2000".to_string()),
            dns: Some("nameserver 8.8.8.8\nsearch example.com".to_string()),
            dns_path: Some(PathBuf::from("/etc/vmnet/dns.conf")),
            resolver: Some("upstream".to_string()),
            domain: Some(" example.com ".to_string()),
            allowed_bind_addresses: Some("127.0.0.1,10.0.0.1".to_string()),
            gateway_ip: Some("10.0.0.254".to_string()),
            extra_dns: Some("1.1.1.1".to_string()),
            dhcp_json: Some(r#"{"searchDomains":["a.com"]}"#.to_string()),
            mtu: Some("9000".to_string()),
            http_intercept: Some(r#"{"ports":[80]}"#.to_string()),
            port_max_idle_time: Some("60".to_string()),
            host_names: Some("vm.host, vm.local".to_string()),
            ..Sources::default()
        };
        let config = Configuration::from_sources(&log, &sources);
        assert_eq!(config.server_macaddr, MacAddr::new([2, 0, 0, 0, 0, 1]));
        assert_eq!(config.max_connections, Some(2000));
        assert_eq!(config.dns.servers, vec![Ipv4Addr::new(8, 8, 8, 8)]);
        assert_eq!(config.dns.search, vec!["example.com".to_string()]);
        assert_eq!(config.dns_path, Some(PathBuf::from("/etc/vmnet/dns.conf")));
        assert_eq!(config.resolver, Resolver::Upstream);
        assert_eq!(config.domain, Some("example.com".to_string()));
        assert_eq!(
            config.allowed_bind_addresses,
            vec![Ipv4Addr::new(127, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 1)]
        );
        assert_eq!(config.gateway_ip, Ipv4Addr::new(10, 0, 0, 254));
        assert_eq!(config.lowest_ip, DEFAULT_LOWEST_IP);
        assert_eq!(config.extra_dns, vec![Ipv4Addr::new(1, 1, 1, 1)]);
        assert_eq!(
            config.dhcp_configuration,
            Some(DhcpConfiguration {
                search_domains: vec!["a.com".to_string()],
                domain_name: None,
            })
        );
        assert_eq!(config.mtu, 9000);
        assert_eq!(config.http_intercept.unwrap()["ports"][0], 80);
        assert_eq!(config.port_max_idle_time, 60);
        assert_eq!(config.host_names, vec!["vm.host".to_string(), "vm.local".to_string()]);
        assert!(log.errors().is_empty());
    }

    #[test]
    fn test_from_sources_invalid_falls_back() {
        let log = Recorder::new();
        let sources = Sources {
            gateway_ip: Some("bogus".to_string()),
            mtu: Some("abc".to_string()),
            extra_dns: Some("1.2.3.4,bad".to_string()),
            max_connections: Some("many".to_string()),
            dhcp_json: Some("not json".to_string()),
            ..Sources::default()
        };
        let config = Configuration::from_sources(&log, &sources);
        assert_eq!(config.gateway_ip, DEFAULT_GATEWAY_IP);
        assert_eq!(config.mtu, DEFAULT_MTU);
        assert!(config.extra_dns.is_empty());
        assert_eq!(config.max_connections, None);
        assert_eq!(config.dhcp_configuration, None);
        assert_eq!(log.errors().len(), 5);
    }

    #[test]
    fn test_resolver_source_absent_keeps_host() {
        let log = Recorder::new();
        let config = Configuration::from_sources(&log, &Sources::default());
        assert_eq!(config.resolver, Resolver::Host);
        let sources = Sources {
            resolver: Some("HOST".to_string()),
            ..Sources::default()
        };
        let config2 = Configuration::from_sources(&log, &sources);
        assert_eq!(config2.resolver, Resolver::Upstream);
        assert!(log.errors().is_empty());
    }
}
