use anyhow::anyhow;

use crate::log::Log;

mod cli;
mod config;
mod dhcp;
mod dns;
mod log;
mod macaddr;
mod parse;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .try_init()
        .map_err(|err| anyhow!("unable to initialise tracing: {}", err))?;

    let args = cli::parse();
    let log = log::Tracing;
    let sources = args.sources(&log);
    let configuration = config::Configuration::from_sources(&log, &sources);
    log.info(&format!(
        "starting {} v{} with {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        configuration
    ));
    Ok(())
}
