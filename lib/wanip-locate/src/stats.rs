/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct WanIpStats {
    query_total: AtomicU64,
    query_failed: AtomicU64,
    query_no_answer: AtomicU64,
    refresh_total: AtomicU64,
    refresh_busy: AtomicU64,
    refresh_no_answer: AtomicU64,
    refresh_changed: AtomicU64,
    refresh_unchanged: AtomicU64,
    read_total: AtomicU64,
    read_hit: AtomicU64,
    read_busy: AtomicU64,
    read_miss: AtomicU64,
}

#[derive(Default)]
pub struct WanIpSnapshot {
    pub query_total: u64,
    pub query_failed: u64,
    pub query_no_answer: u64,
    pub refresh_total: u64,
    pub refresh_busy: u64,
    pub refresh_no_answer: u64,
    pub refresh_changed: u64,
    pub refresh_unchanged: u64,
    pub read_total: u64,
    pub read_hit: u64,
    pub read_busy: u64,
    pub read_miss: u64,
}

impl WanIpStats {
    pub fn snapshot(&self) -> WanIpSnapshot {
        WanIpSnapshot {
            query_total: self.query_total.load(Ordering::Relaxed),
            query_failed: self.query_failed.load(Ordering::Relaxed),
            query_no_answer: self.query_no_answer.load(Ordering::Relaxed),
            refresh_total: self.refresh_total.load(Ordering::Relaxed),
            refresh_busy: self.refresh_busy.load(Ordering::Relaxed),
            refresh_no_answer: self.refresh_no_answer.load(Ordering::Relaxed),
            refresh_changed: self.refresh_changed.load(Ordering::Relaxed),
            refresh_unchanged: self.refresh_unchanged.load(Ordering::Relaxed),
            read_total: self.read_total.load(Ordering::Relaxed),
            read_hit: self.read_hit.load(Ordering::Relaxed),
            read_busy: self.read_busy.load(Ordering::Relaxed),
            read_miss: self.read_miss.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn add_query_total(&self) {
        self.query_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_failed(&self) {
        self.query_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_query_no_answer(&self) {
        self.query_no_answer.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_refresh_total(&self) {
        self.refresh_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_refresh_busy(&self) {
        self.refresh_busy.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_refresh_no_answer(&self) {
        self.refresh_no_answer.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_refresh_changed(&self) {
        self.refresh_changed.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_refresh_unchanged(&self) {
        self.refresh_unchanged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_read_total(&self) {
        self.read_total.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_read_hit(&self) {
        self.read_hit.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_read_busy(&self) {
        self.read_busy.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_read_miss(&self) {
        self.read_miss.fetch_add(1, Ordering::Relaxed);
    }
}
