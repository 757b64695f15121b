//! Tolerant field parsers: a malformed input never aborts startup, it is
//! logged and replaced by the supplied default. The one deliberate exception
//! is `int`, whose fallback is always `None` rather than a caller default;
//! callers depend on that distinction.

use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::config::{join, Resolver};
use crate::dns;
use crate::log::Log;
use crate::macaddr::MacAddr;

pub fn ipv4(log: &dyn Log, raw: &str, default: Ipv4Addr) -> Ipv4Addr {
    match raw.trim().parse::<Ipv4Addr>() {
        Ok(ip) => ip,
        Err(err) => {
            log.error(&format!(
                "unable to parse IPv4 address [{}]: {}, using default {}",
                raw, err, default
            ));
            default
        }
    }
}

/// All-or-nothing: one bad segment discards the whole list in favour of the
/// default. Empty segments are dropped, order and duplicates are preserved.
pub fn ipv4_list(log: &dyn Log, raw: &str, default: &[Ipv4Addr]) -> Vec<Ipv4Addr> {
    let segments: Vec<&str> = raw.split(',').map(str::trim).filter(|s| !s.is_empty()).collect();
    let mut ips = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment.parse::<Ipv4Addr>() {
            Ok(ip) => ips.push(ip),
            Err(err) => {
                log.error(&format!(
                    "unable to parse IPv4 list [{}]: bad entry [{}]: {}, using default [{}]",
                    raw,
                    segment,
                    err,
                    join(default)
                ));
                return default.to_vec();
            }
        }
    }
    ips
}

/// `None` in means `None` out without a log; a present but malformed value is
/// logged and yields `None`, never a caller default.
pub fn int<T>(log: &dyn Log, raw: Option<&str>) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = raw?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(err) => {
            log.error(&format!("unable to parse integer [{}]: {}", raw, err));
            None
        }
    }
}

/// Total classifier, not a failure mode: only the exact literal "host" selects
/// the host resolver, everything else is upstream and nothing is logged.
pub fn resolver(raw: Option<&str>) -> Resolver {
    match raw.map(str::trim) {
        Some("host") => Resolver::Host,
        _ => Resolver::Upstream,
    }
}

pub fn dns(log: &dyn Log, raw: &str) -> Option<dns::ForwarderConfig> {
    match dns::ForwarderConfig::of_string(raw) {
        Ok(config) => Some(config),
        Err(err) => {
            log.error(&format!(
                "unable to parse DNS forwarder configuration [{}]: {:?}",
                raw, err
            ));
            None
        }
    }
}

/// Accepts any JSON value and passes it through unexamined.
pub fn json(log: &dyn Log, raw: &str) -> Option<serde_json::Value> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            log.error(&format!("unable to parse JSON [{}]: {}", raw, err));
            None
        }
    }
}

pub fn macaddr(log: &dyn Log, raw: &str, default: MacAddr) -> MacAddr {
    match raw.trim().parse::<MacAddr>() {
        Ok(mac) => mac,
        Err(err) => {
            log.error(&format!(
                "unable to parse MAC address [{}]: {}, using default {}",
                raw, err, default
            ));
            default
        }
    }
}
