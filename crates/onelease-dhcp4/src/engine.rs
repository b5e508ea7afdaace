//! Lease override decision
//!
//! One transaction walks through the following states:
//!
//! ```text
//!  Start ──gate──▶ Gated ──derive──▶ Derived          (receive callout)
//!                                       │
//!                                       ▼             (select / renew callout)
//!                                   Validated ──▶ Overridden
//!                                       │    └──▶ Declined
//!                                       └───────▶ PassedThrough
//! ```
//!
//! Every terminal state is a normal outcome for the host. The only visible
//! differences are whether the lease address changed and whether the host
//! was told to skip its remaining default processing.

use crate::config::OneleaseConfig;
use crate::context::{NextStep, TransactionContext, CANDIDATE_KEY, HWADDR_KEY};
use crate::hwaddr::{derive_candidate, HwAddr};
use crate::lease::LeaseRecord;
use crate::subnet::{accepts, TargetSubnet};
use std::fmt;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Probation period given to leases this hook declines
pub const DECLINE_PROBATION_PERIOD: u32 = 0;

/// Host extension point the engine is running at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPoint {
    Pkt4Receive,
    Lease4Select,
    Lease4Renew,
    Pkt4Send,
}

impl HookPoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookPoint::Pkt4Receive => "pkt4_receive",
            HookPoint::Lease4Select => "lease4_select",
            HookPoint::Lease4Renew => "lease4_renew",
            HookPoint::Pkt4Send => "pkt4_send",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the host's own allocation was left alone
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Overriding is switched off in the configuration
    Disabled,

    /// The receive callout did not record this key for the transaction
    MissingContext(String),

    /// The gate did not match or derivation produced no candidate
    EmptyCandidate,

    /// The recorded candidate is not an IPv4 address
    MalformedCandidate(String),

    /// The candidate is outside every configured hook subnet
    OutsideSubnetSet(Ipv4Addr),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => f.write_str("hook disabled"),
            SkipReason::MissingContext(key) => write!(f, "no context entry {}", key),
            SkipReason::EmptyCandidate => f.write_str("empty candidate"),
            SkipReason::MalformedCandidate(text) => write!(f, "malformed candidate {:?}", text),
            SkipReason::OutsideSubnetSet(addr) => {
                write!(f, "{} outside configured subnet set", addr)
            }
        }
    }
}

/// Outcome of one lease selection or renewal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The lease now carries the derived address
    Overridden {
        original: Ipv4Addr,
        assigned: Ipv4Addr,
    },

    /// The derived address does not fit the target subnet; the lease was
    /// declined and the host told to skip its remaining steps
    Declined { candidate: Ipv4Addr },

    /// Normal allocation stands
    PassedThrough(SkipReason),
}

impl Decision {
    pub fn is_override(&self) -> bool {
        matches!(self, Decision::Overridden { .. })
    }

    pub fn is_decline(&self) -> bool {
        matches!(self, Decision::Declined { .. })
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Decision::PassedThrough(_))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Overridden { original, assigned } => {
                write!(f, "override {} -> {}", original, assigned)
            }
            Decision::Declined { candidate } => write!(f, "decline {}", candidate),
            Decision::PassedThrough(reason) => write!(f, "pass through ({})", reason),
        }
    }
}

/// Derives candidates and decides lease overrides
///
/// Holds nothing but the shared configuration, so one engine serves every
/// transaction concurrently.
#[derive(Debug, Clone)]
pub struct DecisionEngine {
    config: Arc<OneleaseConfig>,
}

impl DecisionEngine {
    pub fn new(config: Arc<OneleaseConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OneleaseConfig {
        &self.config
    }

    /// Gate and derive in one step
    pub fn candidate_for(&self, hwaddr: &HwAddr) -> Option<Ipv4Addr> {
        let gate = self.config.byte_prefix.matches(hwaddr);
        derive_candidate(hwaddr, gate)
    }

    /// Start → Derived: record the hardware address and candidate text
    pub fn record(&self, ctx: &mut TransactionContext, hwaddr: &HwAddr) -> Option<Ipv4Addr> {
        let candidate = self.candidate_for(hwaddr);
        let candidate_text = candidate.map(|addr| addr.to_string()).unwrap_or_default();

        debug!(
            logger = %self.config.logger_name,
            point = %HookPoint::Pkt4Receive,
            hwaddr = %hwaddr,
            candidate = %candidate_text,
            "Derived candidate address"
        );

        ctx.set(HWADDR_KEY, hwaddr.to_string());
        ctx.set(CANDIDATE_KEY, candidate_text);
        candidate
    }

    /// Derived → terminal state at a lease selection or renewal point
    pub fn decide(
        &self,
        point: HookPoint,
        ctx: &TransactionContext,
        subnet: &dyn TargetSubnet,
        lease: &mut dyn LeaseRecord,
        next_step: &mut NextStep,
    ) -> Decision {
        if !self.config.enabled {
            return Decision::PassedThrough(SkipReason::Disabled);
        }

        let (hwaddr, candidate_text) = match (ctx.get(HWADDR_KEY), ctx.get(CANDIDATE_KEY)) {
            (Ok(hwaddr), Ok(candidate)) => (hwaddr, candidate),
            (Err(_), _) => {
                return Decision::PassedThrough(SkipReason::MissingContext(HWADDR_KEY.into()))
            }
            (_, Err(_)) => {
                return Decision::PassedThrough(SkipReason::MissingContext(CANDIDATE_KEY.into()))
            }
        };

        let candidate = match self.parse_candidate(point, hwaddr, candidate_text) {
            Ok(candidate) => candidate,
            Err(reason) => return Decision::PassedThrough(reason),
        };

        if !self.config.subnets.contains(candidate) {
            debug!(
                logger = %self.config.logger_name,
                point = %point,
                hwaddr = %hwaddr,
                candidate = %candidate,
                subnets = %self.config.subnets,
                "Skipped: outside configured subnet set"
            );
            return Decision::PassedThrough(SkipReason::OutsideSubnetSet(candidate));
        }

        if accepts(candidate, subnet) {
            // Conflict detection against other leases stays with the host
            let original = lease.address();
            lease.set_address(candidate);

            info!(
                logger = %self.config.logger_name,
                point = %point,
                hwaddr = %hwaddr,
                candidate = %candidate,
                original = %original,
                "Lease address overridden"
            );
            Decision::Overridden {
                original,
                assigned: candidate,
            }
        } else {
            *next_step = NextStep::Skip;
            lease.decline(DECLINE_PROBATION_PERIOD);

            warn!(
                logger = %self.config.logger_name,
                point = %point,
                hwaddr = %hwaddr,
                candidate = %candidate,
                "Rejected: candidate outside target subnet range or pools"
            );
            Decision::Declined { candidate }
        }
    }

    fn parse_candidate(
        &self,
        point: HookPoint,
        hwaddr: &str,
        text: &str,
    ) -> Result<Ipv4Addr, SkipReason> {
        if text.is_empty() {
            debug!(
                logger = %self.config.logger_name,
                point = %point,
                hwaddr = %hwaddr,
                "Skipped: empty candidate"
            );
            return Err(SkipReason::EmptyCandidate);
        }

        text.parse().map_err(|_| {
            debug!(
                logger = %self.config.logger_name,
                point = %point,
                hwaddr = %hwaddr,
                candidate = %text,
                "Skipped: malformed candidate"
            );
            SkipReason::MalformedCandidate(text.to_string())
        })
    }
}
