/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::future::Future;
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::Record;
use hickory_proto::xfer::DnsResponse;

use crate::config::ProviderConfig;
use crate::error::QueryError;

/// Max size for the UDP receive buffer as recommended by
/// [RFC6891](https://datatracker.ietf.org/doc/html/rfc6891#section-6.2.5).
const MAX_RECEIVE_BUFFER_SIZE: usize = 4_096;

/// One request/response exchange with a provider's DNS server.
///
/// The cache and aggregation layers are generic over this trait, so tests
/// can substitute scripted collaborators for the real network client.
pub trait DnsExchange {
    /// Send the provider's question to its server once and return the
    /// parsed answer section. Any retry or timeout policy beyond
    /// `timeout` is up to the implementation.
    fn exchange(
        &self,
        provider: &ProviderConfig,
        timeout: Duration,
    ) -> impl Future<Output = Result<Vec<Record>, QueryError>> + Send;
}

/// The stock exchange over plain DNS on UDP.
#[derive(Clone, Debug, Default)]
pub struct UdpExchange {
    bind_addr: Option<SocketAddr>,
}

impl UdpExchange {
    pub fn new(bind_addr: Option<SocketAddr>) -> Self {
        UdpExchange { bind_addr }
    }
}

impl DnsExchange for UdpExchange {
    async fn exchange(
        &self,
        provider: &ProviderConfig,
        timeout: Duration,
    ) -> Result<Vec<Record>, QueryError> {
        tokio::time::timeout(timeout, udp_send_recv(provider, self.bind_addr))
            .await
            .map_err(|_| QueryError::Timeout)?
    }
}

async fn udp_send_recv(
    provider: &ProviderConfig,
    bind_addr: Option<SocketAddr>,
) -> Result<Vec<Record>, QueryError> {
    let mut query = Query::query(provider.domain().clone(), provider.r_type());
    query.set_query_class(provider.r_class());

    let mut request = Message::new();
    request.set_id(fastrand::u16(..));
    request.set_message_type(MessageType::Query);
    request.set_op_code(OpCode::Query);
    request.set_recursion_desired(true);
    request.add_query(query.clone());

    let socket = udp_connect(provider.server(), bind_addr).map_err(QueryError::SendFailed)?;
    let socket = tokio::net::UdpSocket::from_std(socket).map_err(QueryError::SendFailed)?;

    let bytes = request.to_vec().map_err(QueryError::BadQuery)?;
    let nw = socket.send(&bytes).await.map_err(QueryError::SendFailed)?;
    if nw != bytes.len() {
        return Err(QueryError::TruncatedSend(nw, bytes.len()));
    }

    loop {
        let mut recv_buf = vec![0; MAX_RECEIVE_BUFFER_SIZE];

        let nr = socket
            .recv(&mut recv_buf)
            .await
            .map_err(QueryError::RecvFailed)?;
        recv_buf.truncate(nr);
        let Ok(response) = DnsResponse::from_buffer(recv_buf) else {
            continue;
        };
        if response.id() != request.id() {
            continue;
        }
        if !response.queries().iter().all(|rq| rq.eq(&query)) {
            continue;
        }

        let code = response.response_code();
        if code != ResponseCode::NoError {
            return Err(QueryError::Rejected(code));
        }
        return Ok(response.answers().to_vec());
    }
}

fn udp_connect(
    name_server: SocketAddr,
    bind_addr: Option<SocketAddr>,
) -> io::Result<std::net::UdpSocket> {
    let bind_addr = bind_addr.unwrap_or_else(|| match name_server {
        SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
        SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
    });
    let sock = std::net::UdpSocket::bind(bind_addr)?;
    sock.set_nonblocking(true)?;
    sock.connect(name_server)?;
    Ok(sock)
}
