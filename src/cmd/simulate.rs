use clap::Args;
use color_eyre::eyre::{eyre, Result};
use dhcproto::v4::Message;
use onelease_dhcp4::{CalloutHandle, Callouts, HwAddr, Lease4, NextStep, OneleaseConfig, Pool4, Subnet4};
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Valid lifetime given to the simulated lease
const SIMULATED_LIFETIME: u32 = 3600;

#[derive(Args, Debug)]
pub struct SimulateArgs {
    /// Client hardware address, e.g. 02:00:0a:14:1e:28
    pub mac: String,

    /// Hook parameters file (JSON)
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Subnet the server selected for the client, e.g. 10.20.30.0/24
    #[arg(long)]
    pub subnet: String,

    /// Allocation pool START-END; repeatable. Defaults to every host address
    #[arg(long = "pool")]
    pub pools: Vec<String>,

    /// Address the server's own allocator picked. Defaults to the first pool address
    #[arg(long)]
    pub lease: Option<Ipv4Addr>,
}

/// Run one receive → select → send transaction against an in-memory subnet
pub fn run_simulate(args: &SimulateArgs, config: OneleaseConfig) -> Result<()> {
    let hwaddr: HwAddr = args.mac.parse()?;

    let mut subnet: Subnet4 = args.subnet.parse()?;
    if args.pools.is_empty() {
        subnet = subnet.with_host_pool();
    }
    for pool in &args.pools {
        subnet = subnet.with_pool(pool.parse::<Pool4>()?);
    }

    let allocated = match args.lease {
        Some(addr) => addr,
        None => subnet
            .pools()
            .first()
            .map(|pool| pool.start)
            .ok_or_else(|| eyre!("Subnet {} has no pools", subnet))?,
    };
    let mut lease = Lease4::new(allocated, hwaddr.clone(), SIMULATED_LIFETIME);

    debug!(subnet = %subnet, lease = %lease, "Simulating transaction");

    let callouts = Callouts::new(Arc::new(config));
    let mut handle = CalloutHandle::new();

    let query = Message::new(
        Ipv4Addr::UNSPECIFIED,
        Ipv4Addr::UNSPECIFIED,
        Ipv4Addr::UNSPECIFIED,
        Ipv4Addr::UNSPECIFIED,
        hwaddr.as_bytes(),
    );
    let candidate = callouts.pkt4_receive(&mut handle, &query);
    let decision = callouts.lease4_select(&mut handle, &subnet, &mut lease);

    let yiaddr = if handle.next_step() == NextStep::Skip {
        Ipv4Addr::UNSPECIFIED
    } else {
        lease.addr
    };
    let response = Message::new(
        Ipv4Addr::UNSPECIFIED,
        yiaddr,
        Ipv4Addr::UNSPECIFIED,
        Ipv4Addr::UNSPECIFIED,
        hwaddr.as_bytes(),
    );
    callouts.pkt4_send(&handle, &response);
    callouts.unload();

    match candidate {
        Some(addr) => println!("Candidate: {}", addr),
        None => println!("Candidate: none"),
    }
    println!("Decision: {}", decision);
    println!("Lease: {}", lease);
    println!(
        "Next step: {}",
        match handle.next_step() {
            NextStep::Continue => "continue",
            NextStep::Skip => "skip",
        }
    );
    Ok(())
}
