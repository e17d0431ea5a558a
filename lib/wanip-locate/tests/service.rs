/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::collections::{HashMap, VecDeque};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Builder;
use tokio::sync::Semaphore;

use hickory_proto::rr::rdata::{A, AAAA, TXT};
use hickory_proto::rr::{DNSClass, Name, RData, Record, RecordType};

use wanip_locate::{
    DnsExchange, ProviderConfig, QueryError, UpdateOutcome, WanIpService, WanIpServiceConfig,
};

fn provider(name: &str) -> ProviderConfig {
    ProviderConfig::new(
        name,
        "127.0.0.1:5300".parse().unwrap(),
        "myip.example.net",
        RecordType::A,
        DNSClass::IN,
    )
    .unwrap()
}

fn config_with(providers: Vec<ProviderConfig>) -> WanIpServiceConfig {
    let mut config = WanIpServiceConfig::default();
    config.set_providers(providers);
    config.set_query_timeout(Duration::from_secs(1));
    config
}

fn a_record(addr: Ipv4Addr) -> Record {
    Record::from_rdata(
        Name::from_ascii("myip.example.net.").unwrap(),
        60,
        RData::A(A(addr)),
    )
}

fn aaaa_record(addr: Ipv6Addr) -> Record {
    Record::from_rdata(
        Name::from_ascii("myip.example.net.").unwrap(),
        60,
        RData::AAAA(AAAA(addr)),
    )
}

fn txt_record(s: &str) -> Record {
    Record::from_rdata(
        Name::from_ascii("myip.example.net.").unwrap(),
        60,
        RData::TXT(TXT::new(vec![s.to_string()])),
    )
}

/// Replays a per-provider queue of canned answer sections, with an
/// optional artificial delay per provider. An exhausted or missing queue
/// acts as a transport failure.
#[derive(Default)]
struct ScriptedExchange {
    delays: HashMap<String, Duration>,
    scripts: Mutex<HashMap<String, VecDeque<Vec<Record>>>>,
}

impl ScriptedExchange {
    fn script(mut self, provider: &str, delay: Duration, answers: Vec<Vec<Record>>) -> Self {
        self.delays.insert(provider.to_string(), delay);
        self.scripts
            .lock()
            .unwrap()
            .insert(provider.to_string(), answers.into());
        self
    }
}

impl DnsExchange for ScriptedExchange {
    async fn exchange(
        &self,
        provider: &ProviderConfig,
        _timeout: Duration,
    ) -> Result<Vec<Record>, QueryError> {
        let delay = self.delays.get(provider.name()).copied().unwrap_or_default();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        let answers = {
            let mut scripts = self.scripts.lock().unwrap();
            scripts
                .get_mut(provider.name())
                .and_then(|queue| queue.pop_front())
        };
        answers.ok_or(QueryError::Timeout)
    }
}

/// Holds every exchange until a permit is released, so tests can observe
/// the service while a refresh is in flight.
struct GatedExchange {
    gate: Arc<Semaphore>,
    addr: Ipv4Addr,
}

impl DnsExchange for GatedExchange {
    async fn exchange(
        &self,
        _provider: &ProviderConfig,
        _timeout: Duration,
    ) -> Result<Vec<Record>, QueryError> {
        let permit = self.gate.acquire().await.map_err(|_| QueryError::Timeout)?;
        permit.forget();
        Ok(vec![a_record(self.addr)])
    }
}

#[test]
fn fastest_valid_answer_wins() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let addr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 5));
        // the provider listed first is slower and has no usable answer
        let exchange = ScriptedExchange::default()
            .script("slow", Duration::from_millis(50), vec![vec![]])
            .script(
                "fast",
                Duration::from_millis(10),
                vec![vec![a_record(Ipv4Addr::new(198, 51, 100, 5))]],
            );
        let service = WanIpService::new(
            config_with(vec![provider("slow"), provider("fast")]),
            exchange,
        );

        assert!(service.fetch_current().is_none());
        assert_eq!(service.refresh().await, UpdateOutcome::Refreshed(addr));
        assert_eq!(service.fetch_current(), Some(addr));
    });
}

#[test]
fn completion_order_beats_registry_order() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let fast_addr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 5));
        // both providers answer validly with different addresses; the
        // slower one is listed first, so a launch-order consumer would
        // pick the wrong winner
        let exchange = ScriptedExchange::default()
            .script(
                "slow",
                Duration::from_millis(50),
                vec![vec![a_record(Ipv4Addr::new(203, 0, 113, 77))]],
            )
            .script(
                "fast",
                Duration::from_millis(10),
                vec![vec![a_record(Ipv4Addr::new(198, 51, 100, 5))]],
            );
        let service = WanIpService::new(
            config_with(vec![provider("slow"), provider("fast")]),
            exchange,
        );

        assert_eq!(service.refresh().await, UpdateOutcome::Refreshed(fast_addr));
        assert_eq!(service.fetch_current(), Some(fast_addr));
    });
}

#[test]
fn all_providers_failing_leave_cache_untouched() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let addr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 5));
        // first cycle succeeds on one provider, later cycles get nothing:
        // "empty" answers one round, then transport errors
        let exchange = ScriptedExchange::default()
            .script(
                "one",
                Duration::ZERO,
                vec![vec![a_record(Ipv4Addr::new(198, 51, 100, 5))], vec![]],
            )
            .script("two", Duration::ZERO, vec![vec![]]);
        let service =
            WanIpService::new(config_with(vec![provider("one"), provider("two")]), exchange);

        assert_eq!(service.refresh().await, UpdateOutcome::Refreshed(addr));
        assert_eq!(service.refresh().await, UpdateOutcome::NoAnswer);
        assert_eq!(service.refresh().await, UpdateOutcome::NoAnswer);
        // the old valid value survives failed cycles
        assert_eq!(service.fetch_current(), Some(addr));

        let stats = service.stats().snapshot();
        assert_eq!(stats.refresh_total, 3);
        assert_eq!(stats.refresh_changed, 1);
        assert_eq!(stats.refresh_no_answer, 2);
        assert_eq!(stats.query_total, 6);
    });
}

#[test]
fn unchanged_upstream_answer_reported() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let addr = IpAddr::V4(Ipv4Addr::new(203, 0, 113, 77));
        let answers = vec![
            vec![txt_record("203.0.113.77")],
            vec![txt_record("203.0.113.77")],
        ];
        let exchange = ScriptedExchange::default().script("txt", Duration::ZERO, answers);
        let service = WanIpService::new(config_with(vec![provider("txt")]), exchange);

        assert_eq!(service.refresh().await, UpdateOutcome::Refreshed(addr));
        assert_eq!(service.refresh().await, UpdateOutcome::Unchanged(addr));
        assert_eq!(service.fetch_current(), Some(addr));

        let stats = service.stats().snapshot();
        assert_eq!(stats.refresh_changed, 1);
        assert_eq!(stats.refresh_unchanged, 1);
    });
}

#[test]
fn prefix_narrowing() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let exchange = ScriptedExchange::default().script(
            "v4",
            Duration::ZERO,
            vec![vec![a_record(Ipv4Addr::new(203, 0, 113, 77))]],
        );
        let service = WanIpService::new(config_with(vec![provider("v4")]), exchange);
        assert!(service.refresh().await.address().is_some());
        assert_eq!(
            service.fetch_prefix(24),
            Some("203.0.113.0/24".parse().unwrap())
        );
        // prefix length not valid for an IPv4 address
        assert!(service.fetch_prefix(64).is_none());

        let exchange = ScriptedExchange::default().script(
            "v6",
            Duration::ZERO,
            vec![vec![aaaa_record(Ipv6Addr::from_str("2001:db8::1").unwrap())]],
        );
        let service = WanIpService::new(config_with(vec![provider("v6")]), exchange);
        assert!(service.refresh().await.address().is_some());
        assert_eq!(
            service.fetch_prefix(64),
            Some("2001:db8::/64".parse().unwrap())
        );
    });
}

#[test]
fn concurrent_refresh_and_read_fail_fast() {
    let rt = Builder::new_current_thread().enable_all().build().unwrap();
    rt.block_on(async {
        let addr = IpAddr::V4(Ipv4Addr::new(198, 51, 100, 5));
        let gate = Arc::new(Semaphore::new(0));
        let exchange = GatedExchange {
            gate: Arc::clone(&gate),
            addr: Ipv4Addr::new(198, 51, 100, 5),
        };
        let service = Arc::new(WanIpService::new(
            config_with(vec![provider("gated")]),
            exchange,
        ));

        let service_r = Arc::clone(&service);
        let first = tokio::spawn(async move { service_r.refresh().await });
        // let the first refresh take the slot and block on its provider
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(service.refresh().await, UpdateOutcome::Busy);
        assert!(service.fetch_current().is_none());

        gate.add_permits(1);
        assert_eq!(first.await.unwrap(), UpdateOutcome::Refreshed(addr));
        assert_eq!(service.fetch_current(), Some(addr));

        let stats = service.stats().snapshot();
        assert_eq!(stats.refresh_busy, 1);
        assert_eq!(stats.read_total, 2);
        assert_eq!(stats.read_busy, 1);
        assert_eq!(stats.read_hit, 1);
    });
}
