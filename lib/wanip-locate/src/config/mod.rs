/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use anyhow::anyhow;
use hickory_proto::rr::{DNSClass, Name, RecordType};

#[cfg(feature = "yaml")]
mod yaml;

const DNS_PORT: u16 = 53;

/// One upstream "what is my IP" lookup target. Fixed after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
    name: String,
    server: SocketAddr,
    domain: Name,
    r_type: RecordType,
    r_class: DNSClass,
}

impl ProviderConfig {
    pub fn new(
        name: impl Into<String>,
        server: SocketAddr,
        domain: &str,
        r_type: RecordType,
        r_class: DNSClass,
    ) -> anyhow::Result<Self> {
        let mut domain =
            Name::from_ascii(domain).map_err(|e| anyhow!("invalid domain name {domain}: {e}"))?;
        domain.set_fqdn(true);
        Ok(ProviderConfig {
            name: name.into(),
            server,
            domain,
            r_type,
            r_class,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn server(&self) -> SocketAddr {
        self.server
    }

    pub fn domain(&self) -> &Name {
        &self.domain
    }

    pub fn r_type(&self) -> RecordType {
        self.r_type
    }

    pub fn r_class(&self) -> DNSClass {
        self.r_class
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WanIpServiceConfig {
    pub(crate) providers: Vec<ProviderConfig>,
    pub(crate) query_timeout: Duration,
}

impl Default for WanIpServiceConfig {
    fn default() -> Self {
        WanIpServiceConfig {
            providers: stock_providers(),
            query_timeout: Duration::from_secs(5),
        }
    }
}

impl WanIpServiceConfig {
    pub fn set_providers(&mut self, providers: Vec<ProviderConfig>) {
        self.providers = providers;
    }

    pub fn add_provider(&mut self, provider: ProviderConfig) {
        self.providers.push(provider);
    }

    pub fn set_query_timeout(&mut self, time: Duration) {
        self.query_timeout = time;
    }

    pub fn providers(&self) -> &[ProviderConfig] {
        &self.providers
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }
}

/// The two stock services: one TXT/CHAOS based, one A/INET based,
/// queried over plain DNS on the standard port.
fn stock_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(
            "cloudflare",
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)), DNS_PORT),
            "whoami.cloudflare",
            RecordType::TXT,
            DNSClass::CH,
        )
        .expect("invalid stock provider"),
        ProviderConfig::new(
            "opendns",
            SocketAddr::new(IpAddr::V4(Ipv4Addr::new(208, 67, 222, 222)), DNS_PORT),
            "myip.opendns.com",
            RecordType::A,
            DNSClass::IN,
        )
        .expect("invalid stock provider"),
    ]
}
