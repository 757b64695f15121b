use serde::{Deserialize, Serialize};
use std::fmt;

use crate::log::Log;

/// DHCP options advertised to clients, parsed from a JSON blob of the shape
/// `{"searchDomains": ["example.com"], "domainName": "example.com"}`.
/// Both keys are optional independently; unknown keys are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpConfiguration {
    #[serde(default, rename = "searchDomains")]
    pub search_domains: Vec<String>,
    #[serde(default, rename = "domainName")]
    pub domain_name: Option<String>,
}

impl DhcpConfiguration {
    /// A present key with a wrong-typed value is treated the same way as
    /// malformed JSON text: logged and discarded.
    pub fn of_string(log: &dyn Log, raw: &str) -> Option<DhcpConfiguration> {
        match serde_json::from_str(raw) {
            Ok(config) => Some(config),
            Err(err) => {
                log.error(&format!("unable to parse DHCP configuration [{}]: {}", raw, err));
                None
            }
        }
    }
}

impl fmt::Display for DhcpConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let domain_name = match &self.domain_name {
            Some(name) => name.as_str(),
            None => "None",
        };
        write!(
            f,
            "search_domains = {} domain_name = {}",
            self.search_domains.join(","),
            domain_name
        )
    }
}
