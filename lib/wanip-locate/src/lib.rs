/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

//! Discovery and caching of the host's public IP address.
//!
//! A set of DNS based "what is my IP" providers is queried in parallel,
//! the first valid answer is folded into a single cached slot, and the
//! slot is served to readers through non-blocking lock probes so that
//! frequent callers never stall behind an in-flight refresh.

pub use hickory_proto::rr::{DNSClass, RecordType};
pub use ip_network::IpNetwork;

mod config;
pub use config::{ProviderConfig, WanIpServiceConfig};

mod error;
pub use error::QueryError;

mod exchange;
pub use exchange::{DnsExchange, UdpExchange};

mod query;

mod aggregate;

mod cache;
pub use cache::UpdateOutcome;

mod handle;
pub use handle::WanIpService;

mod stats;
pub use stats::{WanIpSnapshot, WanIpStats};
