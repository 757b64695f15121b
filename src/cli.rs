use clap::Parser;
use std::fs;
use std::path::PathBuf;

use crate::config::Sources;
use crate::log::Log;

/// vmnet proxy - user-space network proxy between VM workloads and the host network
#[derive(Debug, Parser)]
#[command(version)]
pub struct Cli {
    /// MAC address of the virtual server interface
    #[arg(long, env = "VMNET_PROXY_SERVER_MACADDR")]
    pub server_macaddr: Option<String>,

    /// Maximum number of concurrent connections, unlimited when omitted
    #[arg(long, env = "VMNET_PROXY_MAX_CONNECTIONS")]
    pub max_connections: Option<String>,

    /// File containing DNS forwarder configuration text
    #[arg(long, env = "VMNET_PROXY_DNS")]
    pub dns: Option<PathBuf>,

    /// Name resolution strategy: "host" delegates to the host resolver, anything else uses the upstream forwarders
    #[arg(long, env = "VMNET_PROXY_RESOLVER")]
    pub resolver: Option<String>,

    /// Local domain suffix
    #[arg(long, env = "VMNET_PROXY_DOMAIN")]
    pub domain: Option<String>,

    /// Comma separated IPv4 addresses permitted for inbound binds
    #[arg(long, env = "VMNET_PROXY_ALLOWED_BIND_ADDRESSES")]
    pub allowed_bind_addresses: Option<String>,

    /// IPv4 address of the virtual gateway
    #[arg(long, env = "VMNET_PROXY_GATEWAY_IP")]
    pub gateway_ip: Option<String>,

    /// Lowest IPv4 address of the client pool
    #[arg(long, env = "VMNET_PROXY_LOWEST_IP")]
    pub lowest_ip: Option<String>,

    /// Highest IPv4 address of the client pool
    #[arg(long, env = "VMNET_PROXY_HIGHEST_IP")]
    pub highest_ip: Option<String>,

    /// Comma separated additional DNS servers advertised to clients
    #[arg(long, env = "VMNET_PROXY_EXTRA_DNS")]
    pub extra_dns: Option<String>,

    /// File containing DHCP options as JSON
    #[arg(long, env = "VMNET_PROXY_DHCP_JSON")]
    pub dhcp_json: Option<PathBuf>,

    /// MTU of the virtual link
    #[arg(long, env = "VMNET_PROXY_MTU")]
    pub mtu: Option<String>,

    /// File containing HTTP interception rules as JSON, passed through to the interception layer
    #[arg(long, env = "VMNET_PROXY_HTTP_INTERCEPT")]
    pub http_intercept: Option<PathBuf>,

    /// Seconds before an idle forwarded port is reaped
    #[arg(long, env = "VMNET_PROXY_PORT_MAX_IDLE_TIME")]
    pub port_max_idle_time: Option<String>,

    /// Comma separated DNS names this instance answers as
    #[arg(long, env = "VMNET_PROXY_HOST_NAMES")]
    pub host_names: Option<String>,
}

impl Cli {
    /// Assemble raw sources for configuration construction. File-backed
    /// sources are read here; an unreadable file is logged and treated as
    /// absent, so startup continues on defaults.
    pub fn sources(&self, log: &dyn Log) -> Sources {
        Sources {
            server_macaddr: self.server_macaddr.clone(),
            max_connections: self.max_connections.clone(),
            dns: read_source(log, &self.dns),
            dns_path: self.dns.clone(),
            resolver: self.resolver.clone(),
            domain: self.domain.clone(),
            allowed_bind_addresses: self.allowed_bind_addresses.clone(),
            gateway_ip: self.gateway_ip.clone(),
            lowest_ip: self.lowest_ip.clone(),
            highest_ip: self.highest_ip.clone(),
            extra_dns: self.extra_dns.clone(),
            dhcp_json: read_source(log, &self.dhcp_json),
            dhcp_json_path: self.dhcp_json.clone(),
            mtu: self.mtu.clone(),
            http_intercept: read_source(log, &self.http_intercept),
            http_intercept_path: self.http_intercept.clone(),
            port_max_idle_time: self.port_max_idle_time.clone(),
            host_names: self.host_names.clone(),
        }
    }
}

fn read_source(log: &dyn Log, path: &Option<PathBuf>) -> Option<String> {
    let path = path.as_ref()?;
    match fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(err) => {
            log.error(&format!("unable to read {}: {}", path.display(), err));
            None
        }
    }
}

pub fn parse() -> Cli {
    Cli::parse()
}
