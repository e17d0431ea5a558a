/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use hickory_proto::rr::{RData, Record};
use log::debug;

use crate::config::ProviderConfig;
use crate::exchange::DnsExchange;
use crate::stats::WanIpStats;

/// Ask one provider for our public address, exactly once.
///
/// Transport and protocol failures are logged and downgraded to `None`:
/// a provider that fails simply contributes no candidate to the running
/// refresh cycle.
pub(crate) async fn query_provider<E: DnsExchange>(
    exchange: &E,
    provider: &ProviderConfig,
    timeout: Duration,
    stats: &WanIpStats,
) -> Option<IpAddr> {
    stats.add_query_total();
    match exchange.exchange(provider, timeout).await {
        Ok(answers) => {
            let addr = extract_address(&answers);
            if addr.is_none() {
                stats.add_query_no_answer();
                debug!("provider {}: no usable address in answer", provider.name());
            }
            addr
        }
        Err(e) => {
            stats.add_query_failed();
            debug!("provider {}: query failed: {e}", provider.name());
            None
        }
    }
}

/// Scan the answer records in returned order and take the first one that
/// parses as an address. A and AAAA payloads are used directly, a TXT
/// payload's first character-string is parsed as an IP; records that do
/// not parse are skipped.
fn extract_address(answers: &[Record]) -> Option<IpAddr> {
    for record in answers {
        match record.data() {
            RData::A(a) => return Some(IpAddr::V4(a.0)),
            RData::AAAA(aaaa) => return Some(IpAddr::V6(aaaa.0)),
            RData::TXT(txt) => {
                let Some(data) = txt.txt_data().first() else {
                    continue;
                };
                let Ok(s) = std::str::from_utf8(data) else {
                    continue;
                };
                if let Ok(addr) = IpAddr::from_str(s) {
                    return Some(addr);
                }
            }
            _ => {}
        }
    }
    None
}
