//! Host extension points
//!
//! The host calls these, in order, for every DHCPv4 exchange:
//!
//! | callout | reads | writes |
//! |---------|-------|--------|
//! | [`Callouts::pkt4_receive`] | query `chaddr` | context |
//! | [`Callouts::lease4_select`] / [`Callouts::lease4_renew`] | context, subnet | lease, next step |
//! | [`Callouts::pkt4_send`] | context, response `yiaddr` | nothing |
//!
//! All of them leave the host free to finish its own processing; the worst
//! this hook does on bad input is nothing.

use crate::config::{HookParameters, OneleaseConfig};
use crate::context::{CalloutHandle, CANDIDATE_KEY, HWADDR_KEY};
use crate::engine::{Decision, DecisionEngine, HookPoint};
use crate::error::Result;
use crate::hwaddr::HwAddr;
use crate::lease::LeaseRecord;
use crate::subnet::TargetSubnet;
use dhcproto::v4::Message;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::{debug, info};

/// What the final callout saw for one transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendSummary {
    pub hwaddr: String,
    pub candidate: String,
    pub leased: Ipv4Addr,
}

/// Loaded hook library
#[derive(Debug, Clone)]
pub struct Callouts {
    engine: DecisionEngine,
}

impl Callouts {
    /// Validate parameters and build the hook
    pub fn load(params: HookParameters) -> Result<Self> {
        let config = OneleaseConfig::from_parameters(params)?;
        Ok(Self::new(Arc::new(config)))
    }

    pub fn new(config: Arc<OneleaseConfig>) -> Self {
        let callouts = Self {
            engine: DecisionEngine::new(config),
        };
        let config = callouts.config();
        info!(
            logger = %config.logger_name,
            enabled = config.enabled,
            byte_prefix = %config.byte_prefix,
            subnets = %config.subnets,
            "onelease hook loaded"
        );
        callouts
    }

    pub fn config(&self) -> &OneleaseConfig {
        self.engine.config()
    }

    pub fn engine(&self) -> &DecisionEngine {
        &self.engine
    }

    /// Library unload marker
    pub fn unload(&self) {
        info!(logger = %self.config().logger_name, "onelease hook unloaded");
    }

    /// Record the client's hardware address and derived candidate
    pub fn pkt4_receive(&self, handle: &mut CalloutHandle, query: &Message) -> Option<Ipv4Addr> {
        if !self.config().observes() {
            return None;
        }

        let hwaddr = HwAddr::from(query.chaddr());
        self.engine.record(handle.context_mut(), &hwaddr)
    }

    /// Decide a freshly selected lease
    pub fn lease4_select(
        &self,
        handle: &mut CalloutHandle,
        subnet: &dyn TargetSubnet,
        lease: &mut dyn LeaseRecord,
    ) -> Decision {
        self.decide(HookPoint::Lease4Select, handle, subnet, lease)
    }

    /// Decide a renewed lease, exactly as for a selected one
    pub fn lease4_renew(
        &self,
        handle: &mut CalloutHandle,
        subnet: &dyn TargetSubnet,
        lease: &mut dyn LeaseRecord,
    ) -> Decision {
        self.decide(HookPoint::Lease4Renew, handle, subnet, lease)
    }

    /// Report what was derived next to what the host actually leased
    ///
    /// Returns `None` when the context is incomplete.
    pub fn pkt4_send(&self, handle: &CalloutHandle, response: &Message) -> Option<SendSummary> {
        if !self.config().observes() {
            return None;
        }

        let ctx = handle.context();
        let hwaddr = ctx.get(HWADDR_KEY).ok()?;
        let candidate = ctx.get(CANDIDATE_KEY).ok()?;
        let leased = response.yiaddr();

        debug!(
            logger = %self.config().logger_name,
            point = %HookPoint::Pkt4Send,
            hwaddr = %hwaddr,
            candidate = %candidate,
            leased = %leased,
            "Response sent"
        );

        Some(SendSummary {
            hwaddr: hwaddr.to_string(),
            candidate: candidate.to_string(),
            leased,
        })
    }

    fn decide(
        &self,
        point: HookPoint,
        handle: &mut CalloutHandle,
        subnet: &dyn TargetSubnet,
        lease: &mut dyn LeaseRecord,
    ) -> Decision {
        let (ctx, next_step) = handle.parts_mut();
        self.engine.decide(point, ctx, subnet, lease, next_step)
    }
}
