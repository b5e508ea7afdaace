use clap::Args;
use color_eyre::eyre::{Result, WrapErr};
use onelease_dhcp4::{BytePrefix, DecisionEngine, HwAddr, OneleaseConfig};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct DeriveArgs {
    /// Client hardware address, e.g. 02:00:0a:14:1e:28
    pub mac: String,

    /// Hook parameters file (JSON)
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Override the byte prefix from the parameters file
    #[arg(long)]
    pub byte_prefix: Option<String>,
}

/// Print the candidate address a client would be offered
pub fn run_derive(args: &DeriveArgs, config: OneleaseConfig) -> Result<()> {
    let mut config = config;
    if let Some(prefix) = &args.byte_prefix {
        let prefix: BytePrefix = prefix.parse().wrap_err("Invalid --byte-prefix")?;
        config = config.with_byte_prefix(prefix);
    }

    let hwaddr: HwAddr = args.mac.parse()?;
    let engine = DecisionEngine::new(Arc::new(config));

    match engine.candidate_for(&hwaddr) {
        Some(candidate) => println!("{}", candidate),
        None => println!("no candidate"),
    }
    Ok(())
}
