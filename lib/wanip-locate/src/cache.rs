/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::net::IpAddr;

use tokio::sync::{RwLock, RwLockWriteGuard};

/// Final state of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// another refresh already holds the cache slot
    Busy,
    /// no provider returned a usable address, the cache was left as is
    NoAnswer,
    /// the first valid answer matched the cached address
    Unchanged(IpAddr),
    /// the cache now holds a new address
    Refreshed(IpAddr),
}

impl UpdateOutcome {
    pub fn address(&self) -> Option<IpAddr> {
        match self {
            UpdateOutcome::Busy | UpdateOutcome::NoAnswer => None,
            UpdateOutcome::Unchanged(addr) | UpdateOutcome::Refreshed(addr) => Some(*addr),
        }
    }
}

pub(crate) enum ReadState {
    Hit(IpAddr),
    Empty,
    Busy,
}

/// The single shared slot holding the last-known public address.
///
/// Both access paths probe the lock and fail fast instead of queuing:
/// under contention a caller gets a definitive "not now" rather than
/// latency. Once the slot holds a valid address it is only ever replaced
/// by another valid address.
#[derive(Default)]
pub(crate) struct AddressCache {
    slot: RwLock<Option<IpAddr>>,
}

impl AddressCache {
    pub(crate) fn read(&self) -> ReadState {
        match self.slot.try_read() {
            Ok(slot) => match *slot {
                Some(addr) => ReadState::Hit(addr),
                None => ReadState::Empty,
            },
            Err(_) => ReadState::Busy,
        }
    }

    /// Probe for the exclusive update section. The returned guard keeps
    /// readers and competing updates out until it is dropped.
    pub(crate) fn try_exclusive(&self) -> Option<UpdateGuard<'_>> {
        let slot = self.slot.try_write().ok()?;
        Some(UpdateGuard { slot })
    }
}

pub(crate) struct UpdateGuard<'a> {
    slot: RwLockWriteGuard<'a, Option<IpAddr>>,
}

impl UpdateGuard<'_> {
    pub(crate) fn commit(mut self, addr: IpAddr) -> UpdateOutcome {
        if *self.slot == Some(addr) {
            UpdateOutcome::Unchanged(addr)
        } else {
            *self.slot = Some(addr);
            UpdateOutcome::Refreshed(addr)
        }
    }
}
