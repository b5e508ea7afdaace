//! onelease DHCPv4 hook
//!
//! This crate lets a DHCPv4 server hand out addresses that are derived
//! from the client's hardware address instead of picked from a pool. A
//! client whose MAC starts with the configured two-byte prefix gets the
//! address spelled by the remaining four bytes, provided that address fits
//! the subnet the server chose for it.
//!
//! # Outcomes
//!
//! ## Override
//! The candidate is inside the target subnet and one of its pools. The
//! lease address is replaced with the candidate.
//!
//! ## Decline
//! The candidate falls outside the target subnet's range or pools. The
//! lease is declined and the server is told to skip its remaining steps.
//!
//! ## Pass-through
//! No candidate, a candidate outside the hook's own subnet list, or missing
//! per-transaction context. The server's own allocation stands.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                 Callouts                            │
//! │  pkt4_receive → lease4_select/renew → pkt4_send     │
//! └─────────────────────────────────────────────────────┘
//!          │                    │
//!          ▼                    ▼
//! ┌──────────────────┐  ┌───────────────────────────────┐
//! │ TransactionCtx   │  │         DecisionEngine        │
//! │ hwaddr_str       │◀─│  BytePrefix → derive_candidate │
//! │ oneaddr_str      │  │  SubnetSet → accepts()         │
//! └──────────────────┘  └───────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use onelease_dhcp4::{CalloutHandle, Callouts, Lease4, OneleaseConfig, Subnet4};
//! use std::sync::Arc;
//!
//! let config = OneleaseConfig::from_json_str(r#"{"byte-prefix": "02:00"}"#)?;
//! let callouts = Callouts::new(Arc::new(config));
//!
//! let mut handle = CalloutHandle::new();
//! callouts.pkt4_receive(&mut handle, &query);
//! let decision = callouts.lease4_select(&mut handle, &subnet, &mut lease);
//! callouts.pkt4_send(&handle, &response);
//! ```

pub mod callouts;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod hwaddr;
pub mod lease;
pub mod subnet;

pub use callouts::*;
pub use config::*;
pub use context::*;
pub use engine::*;
pub use error::*;
pub use hwaddr::*;
pub use lease::*;
pub use subnet::*;
