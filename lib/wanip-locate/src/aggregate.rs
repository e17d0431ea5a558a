/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::config::ProviderConfig;
use crate::exchange::DnsExchange;
use crate::query::query_provider;
use crate::stats::WanIpStats;

/// Race one query per provider and return the first valid answer to
/// complete, in wall-clock order rather than launch order.
///
/// The channel capacity equals the fan-out size, so a task can always
/// deliver its result and run to completion even after the consumer has
/// returned. Losers of the race are left to finish unobserved.
pub(crate) async fn first_valid<E>(
    providers: &[ProviderConfig],
    exchange: &Arc<E>,
    timeout: Duration,
    stats: &Arc<WanIpStats>,
) -> Option<IpAddr>
where
    E: DnsExchange + Send + Sync + 'static,
{
    if providers.is_empty() {
        return None;
    }

    let (rsp_sender, mut rsp_receiver) = mpsc::channel(providers.len());
    for provider in providers {
        let provider = provider.clone();
        let exchange = Arc::clone(exchange);
        let stats = Arc::clone(stats);
        let sender = rsp_sender.clone();
        tokio::spawn(async move {
            let r = query_provider(exchange.as_ref(), &provider, timeout, &stats).await;
            let _ = sender.send(r).await;
        });
    }
    // end-of-results is signaled once every task sender is gone
    drop(rsp_sender);

    while let Some(r) = rsp_receiver.recv().await {
        if let Some(addr) = r {
            return Some(addr);
        }
    }
    None
}
