use clap::Args;
use color_eyre::eyre::Result;
use onelease_dhcp4::OneleaseConfig;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Hook parameters file (JSON)
    pub params: PathBuf,
}

/// Print the effective configuration of an already validated parameters file
pub fn run_check(args: &CheckArgs, config: &OneleaseConfig) -> Result<()> {
    println!("Parameters: {}", args.params.display());
    println!("Enabled: {}", config.enabled);
    println!("Byte prefix: {}", config.byte_prefix);
    if config.subnets.is_empty() {
        println!("Subnets: (unrestricted)");
    } else {
        println!("Subnets: {}", config.subnets);
    }
    println!("Logger: {}", config.logger_name);
    if config.debug {
        println!("Debug log: {}", config.debug_logfile.display());
    } else {
        println!("Debug log: off");
    }
    Ok(())
}
