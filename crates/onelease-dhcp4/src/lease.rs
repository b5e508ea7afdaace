//! Host lease records

use crate::hwaddr::HwAddr;
use std::fmt;
use std::net::Ipv4Addr;

/// Lease the host is about to hand out or renew
///
/// The hook may rewrite the address or decline the lease. It never stores
/// or persists it.
pub trait LeaseRecord {
    /// Currently assigned address
    fn address(&self) -> Ipv4Addr;

    /// Replace the assigned address
    fn set_address(&mut self, addr: Ipv4Addr);

    /// Mark the lease declined for `probation_period` seconds
    fn decline(&mut self, probation_period: u32);
}

/// Lease state as tracked by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LeaseState {
    #[default]
    Default,
    Declined,
}

impl fmt::Display for LeaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeaseState::Default => f.write_str("default"),
            LeaseState::Declined => f.write_str("declined"),
        }
    }
}

/// In-memory DHCPv4 lease
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease4 {
    pub addr: Ipv4Addr,
    pub hwaddr: HwAddr,
    /// Valid lifetime in seconds
    pub valid_lifetime: u32,
    pub state: LeaseState,
}

impl Lease4 {
    pub fn new(addr: Ipv4Addr, hwaddr: HwAddr, valid_lifetime: u32) -> Self {
        Self {
            addr,
            hwaddr,
            valid_lifetime,
            state: LeaseState::Default,
        }
    }

    pub fn is_declined(&self) -> bool {
        self.state == LeaseState::Declined
    }
}

impl LeaseRecord for Lease4 {
    fn address(&self) -> Ipv4Addr {
        self.addr
    }

    fn set_address(&mut self, addr: Ipv4Addr) {
        self.addr = addr;
    }

    /// A declined lease no longer belongs to any client
    fn decline(&mut self, probation_period: u32) {
        self.hwaddr = HwAddr::default();
        self.valid_lifetime = probation_period;
        self.state = LeaseState::Declined;
    }
}

impl fmt::Display for Lease4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "address={} hwaddr={} valid_lifetime={} state={}",
            self.addr, self.hwaddr, self.valid_lifetime, self.state
        )
    }
}
