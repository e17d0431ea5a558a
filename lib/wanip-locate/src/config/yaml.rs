/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use hickory_proto::rr::{DNSClass, RecordType};
use humanize_rs::ParseError;
use yaml_rust::{Yaml, yaml};

use super::{DNS_PORT, ProviderConfig, WanIpServiceConfig};

impl WanIpServiceConfig {
    pub fn parse_yaml(value: &Yaml) -> anyhow::Result<Self> {
        match value {
            Yaml::Hash(map) => {
                let mut config = WanIpServiceConfig::default();

                foreach_kv(map, |k, v| match k {
                    "providers" => {
                        config.providers = as_providers(v)?;
                        Ok(())
                    }
                    "query_timeout" => {
                        let time = as_duration(v)
                            .context(format!("invalid humanize duration value for key {k}"))?;
                        config.set_query_timeout(time);
                        Ok(())
                    }
                    _ => Err(anyhow!("invalid key {k}")),
                })?;

                if config.providers.is_empty() {
                    return Err(anyhow!("no providers set"));
                }
                Ok(config)
            }
            _ => Err(anyhow!(
                "yaml type for 'wan ip service config' should be 'map'"
            )),
        }
    }
}

fn as_providers(value: &Yaml) -> anyhow::Result<Vec<ProviderConfig>> {
    let Yaml::Array(seq) = value else {
        return Err(anyhow!("yaml type for 'providers' should be 'array'"));
    };
    let mut providers = Vec::with_capacity(seq.len());
    for (i, v) in seq.iter().enumerate() {
        let provider = as_provider(v).context(format!("invalid provider value #{i}"))?;
        providers.push(provider);
    }
    Ok(providers)
}

fn as_provider(value: &Yaml) -> anyhow::Result<ProviderConfig> {
    let Yaml::Hash(map) = value else {
        return Err(anyhow!("yaml type for 'provider' should be 'map'"));
    };

    let mut name: Option<String> = None;
    let mut server: Option<SocketAddr> = None;
    let mut domain: Option<String> = None;
    let mut r_type = RecordType::A;
    let mut r_class = DNSClass::IN;

    foreach_kv(map, |k, v| match k {
        "name" => {
            name = Some(as_string(v)?);
            Ok(())
        }
        "server" => {
            server = Some(as_sockaddr(v)?);
            Ok(())
        }
        "domain" => {
            domain = Some(as_string(v)?);
            Ok(())
        }
        "type" => {
            let s = as_string(v)?;
            r_type = RecordType::from_str(&s.to_uppercase())
                .map_err(|e| anyhow!("invalid record type {s}: {e}"))?;
            Ok(())
        }
        "class" => {
            let s = as_string(v)?;
            r_class = DNSClass::from_str(&s.to_uppercase())
                .map_err(|e| anyhow!("invalid record class {s}: {e}"))?;
            Ok(())
        }
        _ => Err(anyhow!("invalid key {k}")),
    })?;

    let name = name.ok_or_else(|| anyhow!("no provider name set"))?;
    let server = server.ok_or_else(|| anyhow!("no server address set"))?;
    let domain = domain.ok_or_else(|| anyhow!("no query domain set"))?;
    ProviderConfig::new(name, server, &domain, r_type, r_class)
}

fn foreach_kv<F>(map: &yaml::Hash, mut f: F) -> anyhow::Result<()>
where
    F: FnMut(&str, &Yaml) -> anyhow::Result<()>,
{
    for (k, v) in map.iter() {
        if let Yaml::String(key) = k {
            f(key, v).context(format!("failed to parse value of key {key}"))?;
        } else {
            return Err(anyhow!("key in hash should be string"));
        }
    }
    Ok(())
}

fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        Yaml::Integer(i) => Ok(i.to_string()),
        _ => Err(anyhow!(
            "yaml value type for 'string' should be 'string' or 'integer'"
        )),
    }
}

fn as_sockaddr(v: &Yaml) -> anyhow::Result<SocketAddr> {
    if let Yaml::String(s) = v {
        if let Ok(addr) = SocketAddr::from_str(s) {
            return Ok(addr);
        }
        // a bare IP gets the standard DNS port
        if let Ok(ip) = IpAddr::from_str(s) {
            return Ok(SocketAddr::new(ip, DNS_PORT));
        }
        Err(anyhow!("invalid socket address {s}"))
    } else {
        Err(anyhow!(
            "yaml value type for 'socket address' should be 'string'"
        ))
    }
}

fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                if let Ok(u) = u64::from_str(value) {
                    Ok(Duration::from_secs(u))
                } else {
                    Err(anyhow!("invalid duration string"))
                }
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            if let Ok(u) = u64::try_from(*value) {
                Ok(Duration::from_secs(u))
            } else {
                Err(anyhow!("out of range duration value"))
            }
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer'"
        )),
    }
}
