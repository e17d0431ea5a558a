/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use ip_network::IpNetwork;
use log::warn;

use crate::aggregate::first_valid;
use crate::cache::{AddressCache, ReadState, UpdateOutcome};
use crate::config::{ProviderConfig, WanIpServiceConfig};
use crate::exchange::DnsExchange;
use crate::stats::WanIpStats;

/// An owned public address cache with its provider fan-out.
///
/// There is no global instance: whoever needs the address owns (or
/// shares) a service value and calls [`WanIpService::refresh`] and the
/// read methods on it. All methods take `&self`, so a single instance
/// can be shared behind an `Arc` across tasks.
pub struct WanIpService<E: DnsExchange> {
    providers: Vec<ProviderConfig>,
    query_timeout: Duration,
    exchange: Arc<E>,
    cache: AddressCache,
    stats: Arc<WanIpStats>,
}

impl<E> WanIpService<E>
where
    E: DnsExchange + Send + Sync + 'static,
{
    pub fn new(config: WanIpServiceConfig, exchange: E) -> Self {
        WanIpService {
            providers: config.providers,
            query_timeout: config.query_timeout,
            exchange: Arc::new(exchange),
            cache: AddressCache::default(),
            stats: Arc::new(WanIpStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<WanIpStats> {
        Arc::clone(&self.stats)
    }

    /// Non-blocking read of the cached address.
    ///
    /// `None` means no address has been cached yet, or a refresh holds
    /// the slot right now. Callers must not be made to wait, so there is
    /// no blocking variant.
    pub fn fetch_current(&self) -> Option<IpAddr> {
        self.stats.add_read_total();
        match self.cache.read() {
            ReadState::Hit(addr) => {
                self.stats.add_read_hit();
                Some(addr)
            }
            ReadState::Empty => {
                self.stats.add_read_miss();
                None
            }
            ReadState::Busy => {
                self.stats.add_read_busy();
                None
            }
        }
    }

    /// Non-blocking read narrowed to a network prefix of the given
    /// length, as used for EDNS client subnet hints. A prefix length
    /// that is not valid for the cached address family yields `None`.
    pub fn fetch_prefix(&self, prefix_len: u8) -> Option<IpNetwork> {
        let addr = self.fetch_current()?;
        IpNetwork::new_truncate(addr, prefix_len).ok()
    }

    /// Race all configured providers and fold the first valid answer
    /// into the cache.
    ///
    /// Only one refresh runs at a time; a second call arriving while one
    /// is in flight gets [`UpdateOutcome::Busy`] immediately instead of
    /// queuing behind it. A cycle in which no provider answers leaves
    /// the previously cached address untouched.
    pub async fn refresh(&self) -> UpdateOutcome {
        self.stats.add_refresh_total();
        let Some(guard) = self.cache.try_exclusive() else {
            self.stats.add_refresh_busy();
            return UpdateOutcome::Busy;
        };

        match first_valid(
            &self.providers,
            &self.exchange,
            self.query_timeout,
            &self.stats,
        )
        .await
        {
            Some(addr) => {
                let outcome = guard.commit(addr);
                match outcome {
                    UpdateOutcome::Refreshed(_) => self.stats.add_refresh_changed(),
                    _ => self.stats.add_refresh_unchanged(),
                }
                outcome
            }
            None => {
                self.stats.add_refresh_no_answer();
                warn!("public address refresh got no usable answer from any provider");
                UpdateOutcome::NoAnswer
            }
        }
    }
}
