/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;

use hickory_proto::ProtoError;
use hickory_proto::op::ResponseCode;
use thiserror::Error;

/// Failure of a single question/answer exchange with one provider.
///
/// These never cross the aggregation boundary: a failed provider simply
/// contributes no candidate to the running refresh cycle.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("malformed DNS query: {0}")]
    BadQuery(ProtoError),
    #[error("failed to send query: {0}")]
    SendFailed(io::Error),
    #[error("not all bytes of query sent, {0} of {1}")]
    TruncatedSend(usize, usize),
    #[error("failed to recv response: {0}")]
    RecvFailed(io::Error),
    #[error("server rejected query: {0:?}")]
    Rejected(ResponseCode),
    #[error("timeout while contacting server")]
    Timeout,
}

impl QueryError {
    pub fn get_type(&self) -> &str {
        match self {
            QueryError::BadQuery(_) => "BadQuery",
            QueryError::SendFailed(_) => "SendFailed",
            QueryError::TruncatedSend(_, _) => "TruncatedSend",
            QueryError::RecvFailed(_) => "RecvFailed",
            QueryError::Rejected(_) => "Rejected",
            QueryError::Timeout => "Timeout",
        }
    }
}
