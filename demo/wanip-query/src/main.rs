/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::time::Duration;

use anyhow::anyhow;
use clap::{Arg, Command, value_parser};

use wanip_locate::{UdpExchange, UpdateOutcome, WanIpService, WanIpServiceConfig};

const ARG_PREFIX: &str = "prefix";
const ARG_TIMEOUT: &str = "timeout";

fn build_cli_args() -> Command {
    Command::new(env!("CARGO_PKG_NAME"))
        .arg(
            Arg::new(ARG_PREFIX)
                .help("Narrow the address to a network prefix of this length")
                .long(ARG_PREFIX)
                .num_args(1)
                .value_parser(value_parser!(u8)),
        )
        .arg(
            Arg::new(ARG_TIMEOUT)
                .help("Per provider query timeout in seconds")
                .long(ARG_TIMEOUT)
                .num_args(1)
                .value_parser(value_parser!(u64)),
        )
}

fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    let mut config = WanIpServiceConfig::default();
    if let Some(timeout) = args.get_one::<u64>(ARG_TIMEOUT) {
        config.set_query_timeout(Duration::from_secs(*timeout));
    }
    let prefix_len = args.get_one::<u8>(ARG_PREFIX).copied();

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(async move {
        let service = WanIpService::new(config, UdpExchange::default());
        match service.refresh().await {
            UpdateOutcome::Refreshed(addr) | UpdateOutcome::Unchanged(addr) => {
                println!("public address: {addr}");
                if let Some(prefix_len) = prefix_len {
                    match service.fetch_prefix(prefix_len) {
                        Some(network) => println!("client subnet: {network}"),
                        None => {
                            return Err(anyhow!(
                                "prefix length {prefix_len} is not valid for {addr}"
                            ));
                        }
                    }
                }
                Ok(())
            }
            UpdateOutcome::NoAnswer => Err(anyhow!("no provider returned a usable answer")),
            UpdateOutcome::Busy => Err(anyhow!("another refresh is already in progress")),
        }
    })
}
