//! Subnet restrictions and target-subnet validation
//!
//! Two separate checks guard a candidate address:
//!
//! * the hook's own [`SubnetSet`], configured once at load time, and
//! * the per-request [`TargetSubnet`] handed over by the host, checked with
//!   [`accepts`].

use crate::error::{OneleaseError, Result};
use ipnetwork::Ipv4Network;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// IPv4 network restriction from the hook parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubnetPrefix(Ipv4Network);

impl SubnetPrefix {
    /// Parse `a.b.c.d/n`
    ///
    /// The address must be a non-zero IPv4 address and the length must be
    /// in `1..=32`.
    pub fn parse(text: &str) -> Result<Self> {
        let invalid = || OneleaseError::InvalidPrefix(text.to_string());

        let pos = text.rfind('/').ok_or_else(invalid)?;
        if pos == 0 || pos == text.len() - 1 {
            return Err(invalid());
        }

        let addr: Ipv4Addr = text[..pos].parse().map_err(|_| invalid())?;
        let len: u8 = text[pos + 1..].parse().map_err(|_| invalid())?;
        if addr.is_unspecified() || len == 0 || len > 32 {
            return Err(invalid());
        }

        Ipv4Network::new(addr, len).map(Self).map_err(|_| invalid())
    }

    pub fn network(&self) -> Ipv4Network {
        self.0
    }

    /// Whether `addr` lies between the network and broadcast addresses
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.0.contains(addr)
    }
}

impl FromStr for SubnetPrefix {
    type Err = OneleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for SubnetPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0.ip(), self.0.prefix())
    }
}

/// Ordered set of [`SubnetPrefix`] restrictions
///
/// An empty set means no restriction is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubnetSet(Vec<SubnetPrefix>);

impl SubnetSet {
    pub fn new(prefixes: Vec<SubnetPrefix>) -> Self {
        Self(prefixes)
    }

    /// Parse every entry, failing on the first invalid one
    pub fn parse<S: AsRef<str>>(entries: &[S]) -> Result<Self> {
        entries
            .iter()
            .map(|entry| SubnetPrefix::parse(entry.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SubnetPrefix> {
        self.0.iter()
    }

    /// Whether `addr` is allowed by this set
    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        self.0.is_empty() || self.0.iter().any(|prefix| prefix.contains(addr))
    }
}

impl fmt::Display for SubnetSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, prefix) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", prefix)?;
        }
        Ok(())
    }
}

/// Subnet the host selected for the current transaction
pub trait TargetSubnet {
    /// Whether `addr` is inside the subnet's address range
    fn in_range(&self, addr: Ipv4Addr) -> bool;

    /// Whether `addr` is inside one of the subnet's allocation pools
    fn in_pool(&self, addr: Ipv4Addr) -> bool;
}

/// Whether `candidate` may be assigned from `subnet`
///
/// Both the range and the pool are checked even though a host pool normally
/// lies inside its subnet; a host whose pool check stops implying the range
/// check must not widen what this hook assigns.
pub fn accepts(candidate: Ipv4Addr, subnet: &dyn TargetSubnet) -> bool {
    subnet.in_range(candidate) && subnet.in_pool(candidate)
}

/// Inclusive address pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pool4 {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

impl Pool4 {
    pub fn new(start: Ipv4Addr, end: Ipv4Addr) -> Result<Self> {
        if u32::from(start) > u32::from(end) {
            return Err(OneleaseError::InvalidPool(format!("{}-{}", start, end)));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        (self.start..=self.end).contains(&addr)
    }
}

impl FromStr for Pool4 {
    type Err = OneleaseError;

    /// Parse `start-end`
    fn from_str(s: &str) -> Result<Self> {
        let (start, end) = s
            .split_once('-')
            .ok_or_else(|| OneleaseError::InvalidPool(s.to_string()))?;
        Self::new(parse_addr(start)?, parse_addr(end)?)
    }
}

/// Parse one dotted-quad address, trimming surrounding whitespace
fn parse_addr(text: &str) -> Result<Ipv4Addr> {
    let text = text.trim();
    text.parse()
        .map_err(|_| OneleaseError::InvalidAddress(text.to_string()))
}

impl fmt::Display for Pool4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// In-memory host subnet with its pools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subnet4 {
    network: Ipv4Network,
    pools: Vec<Pool4>,
}

impl Subnet4 {
    /// Create a subnet without pools
    pub fn new(network: Ipv4Network) -> Self {
        Self {
            network,
            pools: Vec::new(),
        }
    }

    /// Add an allocation pool
    pub fn with_pool(mut self, pool: Pool4) -> Self {
        self.pools.push(pool);
        self
    }

    /// Add a pool spanning every host address of the subnet
    pub fn with_host_pool(self) -> Self {
        let pool = self.host_range();
        self.with_pool(pool)
    }

    pub fn network(&self) -> Ipv4Network {
        self.network
    }

    pub fn pools(&self) -> &[Pool4] {
        &self.pools
    }

    /// First and last usable host address
    ///
    /// /31 and /32 networks have no network or broadcast address to skip.
    pub fn host_range(&self) -> Pool4 {
        let first = u32::from(self.network.network());
        let last = u32::from(self.network.broadcast());
        let (start, end) = if self.network.prefix() >= 31 {
            (first, last)
        } else {
            (first + 1, last - 1)
        };
        Pool4 {
            start: Ipv4Addr::from(start),
            end: Ipv4Addr::from(end),
        }
    }
}

impl FromStr for Subnet4 {
    type Err = OneleaseError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<Ipv4Network>()
            .map(Self::new)
            .map_err(|_| OneleaseError::InvalidPrefix(s.to_string()))
    }
}

impl TargetSubnet for Subnet4 {
    fn in_range(&self, addr: Ipv4Addr) -> bool {
        self.network.contains(addr)
    }

    fn in_pool(&self, addr: Ipv4Addr) -> bool {
        self.pools.iter().any(|pool| pool.contains(addr))
    }
}

impl fmt::Display for Subnet4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    #[test]
    fn test_prefix_parse() {
        let prefix = SubnetPrefix::parse("192.168.0.0/24").unwrap();
        assert_eq!(prefix.network().prefix(), 24);
        assert_eq!(prefix.to_string(), "192.168.0.0/24");

        let host = SubnetPrefix::parse("10.0.0.1/32").unwrap();
        assert!(host.contains(ip("10.0.0.1")));
        assert!(!host.contains(ip("10.0.0.2")));
    }

    #[test]
    fn test_prefix_parse_rejects() {
        for text in [
            "10.0.0.0",
            "/24",
            "10.0.0.0/",
            "0.0.0.0/8",
            "10.0.0.0/0",
            "10.0.0.0/33",
            "10.0.0.0/x",
            "10.0.0/24",
            "fe80::/64",
            "10.0.0.0/24/8",
        ] {
            assert!(
                matches!(SubnetPrefix::parse(text), Err(OneleaseError::InvalidPrefix(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_prefix_unaligned_base_is_masked() {
        let prefix = SubnetPrefix::parse("10.20.30.77/24").unwrap();
        assert!(prefix.contains(ip("10.20.30.0")));
        assert!(prefix.contains(ip("10.20.30.255")));
        assert!(!prefix.contains(ip("10.20.31.0")));
        assert_eq!(prefix.to_string(), "10.20.30.77/24");
    }

    #[test]
    fn test_empty_set_contains_everything() {
        let set = SubnetSet::default();
        assert!(set.contains(ip("10.20.30.40")));
        assert!(set.contains(ip("255.255.255.255")));
        assert_eq!(set.to_string(), "");
    }

    #[test]
    fn test_set_contains() {
        let set = SubnetSet::parse(&["192.168.0.0/24", "10.20.0.0/16"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(ip("10.20.30.40")));
        assert!(set.contains(ip("192.168.0.1")));
        assert!(!set.contains(ip("192.168.1.1")));
        assert!(!set.contains(ip("10.21.0.1")));
        assert_eq!(set.to_string(), "192.168.0.0/24, 10.20.0.0/16");
    }

    #[test]
    fn test_set_parse_fails_on_any_bad_entry() {
        let err = SubnetSet::parse(&["192.168.0.0/24", "0.0.0.0/8"]).unwrap_err();
        assert_eq!(err.to_string(), "unable to parse invalid IPv4 prefix 0.0.0.0/8");
    }

    #[test]
    fn test_pool_parse() {
        let pool: Pool4 = "10.20.30.1-10.20.30.254".parse().unwrap();
        assert!(pool.contains(ip("10.20.30.1")));
        assert!(pool.contains(ip("10.20.30.254")));
        assert!(!pool.contains(ip("10.20.30.255")));
        assert_eq!(pool.to_string(), "10.20.30.1-10.20.30.254");

        assert!("10.20.30.9-10.20.30.1".parse::<Pool4>().is_err());
        assert!(matches!(
            "10.20.30.9-10.20.30.1".parse::<Pool4>(),
            Err(OneleaseError::InvalidPool(_))
        ));
        assert!(matches!(
            "10.20.30.1".parse::<Pool4>(),
            Err(OneleaseError::InvalidPool(_))
        ));
    }

    #[test]
    fn test_pool_reports_bad_address_half() {
        let err = "10.20.30.1-10.20.300.9".parse::<Pool4>().unwrap_err();
        assert!(matches!(err, OneleaseError::InvalidAddress(ref a) if a == "10.20.300.9"));
        assert_eq!(err.to_string(), "invalid IPv4 address: 10.20.300.9");
    }

    #[test]
    fn test_subnet_host_range() {
        let subnet: Subnet4 = "10.20.30.0/24".parse().unwrap();
        let range = subnet.host_range();
        assert_eq!(range.start, ip("10.20.30.1"));
        assert_eq!(range.end, ip("10.20.30.254"));

        let host: Subnet4 = "10.0.0.7/32".parse().unwrap();
        assert_eq!(host.host_range().start, ip("10.0.0.7"));
        assert_eq!(host.host_range().end, ip("10.0.0.7"));
    }

    #[test]
    fn test_subnet_without_pool_accepts_nothing() {
        let subnet: Subnet4 = "10.20.30.0/24".parse().unwrap();
        assert!(subnet.in_range(ip("10.20.30.40")));
        assert!(!subnet.in_pool(ip("10.20.30.40")));
        assert!(!accepts(ip("10.20.30.40"), &subnet));
    }

    #[test]
    fn test_accepts_requires_range_and_pool() {
        let subnet = "10.20.30.0/24"
            .parse::<Subnet4>()
            .unwrap()
            .with_pool("10.20.30.1-10.20.30.39".parse().unwrap())
            .with_pool("10.20.30.41-10.20.30.254".parse().unwrap());

        assert!(accepts(ip("10.20.30.1"), &subnet));
        assert!(!accepts(ip("10.20.30.40"), &subnet));
        assert!(!accepts(ip("10.20.31.40"), &subnet));
    }

    struct PoolWiderThanRange;

    impl TargetSubnet for PoolWiderThanRange {
        fn in_range(&self, addr: Ipv4Addr) -> bool {
            addr.octets()[..3] == [10, 20, 30]
        }

        fn in_pool(&self, _addr: Ipv4Addr) -> bool {
            true
        }
    }

    #[test]
    fn test_accepts_checks_range_even_when_pool_is_wider() {
        let subnet = PoolWiderThanRange;
        assert!(accepts(ip("10.20.30.40"), &subnet));
        assert!(!accepts(ip("172.16.0.1"), &subnet));
    }
}
