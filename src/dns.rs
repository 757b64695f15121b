use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// Upstream DNS forwarder settings, parsed from a resolv.conf style text:
///
/// ```text
/// # comment
/// nameserver 8.8.8.8
/// search example.com internal.example.com
/// assume-offline-after-drops 3
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ForwarderConfig {
    pub servers: Vec<Ipv4Addr>,
    pub search: Vec<String>,
    pub assume_offline_after_drops: Option<u32>,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub enum Error {
    UnknownDirective(String),
    BadOperand(String),
}

impl ForwarderConfig {
    pub fn of_string(raw: &str) -> Result<ForwarderConfig, Error> {
        let mut config = ForwarderConfig::default();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (directive, operands) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            match directive {
                "nameserver" => {
                    let ip = operands
                        .trim()
                        .parse::<Ipv4Addr>()
                        .map_err(|err| Error::BadOperand(format!("{}: {}", line, err)))?;
                    config.servers.push(ip);
                }
                "search" => {
                    config.search.extend(operands.split_whitespace().map(str::to_string));
                }
                "assume-offline-after-drops" => {
                    let drops = operands
                        .trim()
                        .parse::<u32>()
                        .map_err(|err| Error::BadOperand(format!("{}: {}", line, err)))?;
                    config.assume_offline_after_drops = Some(drops);
                }
                _ => return Err(Error::UnknownDirective(line.to_string())),
            }
        }
        Ok(config)
    }
}

impl fmt::Display for ForwarderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let servers: Vec<String> = self.servers.iter().map(|ip| ip.to_string()).collect();
        let drops = match self.assume_offline_after_drops {
            Some(drops) => drops.to_string(),
            None => "None".to_string(),
        };
        write!(
            f,
            "servers = {} search = {} assume_offline_after_drops = {}",
            servers.join(","),
            self.search.join(","),
            drops
        )
    }
}
