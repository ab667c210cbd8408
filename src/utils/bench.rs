//! Timing records for queries and backend calls.
//!
//! Each finished [`Timer`] becomes one JSON line on [`DEV_TARGET`]. While a
//! [`Capture`] is alive, records from the same thread are also kept so tests
//! can inspect them without going through the global logger.

use super::logger::DEV_TARGET;
use serde::Serialize;
use std::cell::RefCell;
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Layer {
    Client,
    Backend,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BenchRecord {
    pub layer: Layer,
    pub op: &'static str,
    pub kind: String,
    pub duration_us: u64,
    /// Items returned, counted or submitted.
    pub count: usize,
    #[serde(skip_serializing_if = "is_zero")]
    pub failures: usize,
}

const fn is_zero(n: &usize) -> bool {
    *n == 0
}

thread_local! {
    static CAPTURED: RefCell<Option<Vec<BenchRecord>>> = const { RefCell::new(None) };
}

/// Keeps this thread's records until dropped.
#[derive(Debug)]
pub struct Capture {
    _private: (),
}

impl Capture {
    #[must_use]
    pub fn start() -> Self {
        CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
        Self { _private: () }
    }

    /// Records so far, oldest first; the buffer is left empty.
    #[must_use]
    pub fn take(&self) -> Vec<BenchRecord> {
        CAPTURED.with(|c| c.borrow_mut().as_mut().map(std::mem::take).unwrap_or_default())
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        CAPTURED.with(|c| *c.borrow_mut() = None);
    }
}

#[derive(Debug)]
#[must_use = "a timer records nothing until finished"]
pub struct Timer {
    layer: Layer,
    op: &'static str,
    kind: String,
    started: Instant,
}

pub fn start(layer: Layer, op: &'static str, kind: &str) -> Timer {
    Timer { layer, op, kind: kind.to_string(), started: Instant::now() }
}

impl Timer {
    pub fn finish(self, count: usize, failures: usize) {
        let duration_us = u64::try_from(self.started.elapsed().as_micros()).unwrap_or(u64::MAX);
        emit(BenchRecord { layer: self.layer, op: self.op, kind: self.kind, duration_us, count, failures });
    }
}

fn emit(record: BenchRecord) {
    if log::log_enabled!(target: DEV_TARGET, log::Level::Trace) {
        match serde_json::to_string(&record) {
            Ok(line) => log::trace!(target: DEV_TARGET, "{line}"),
            Err(e) => log::warn!("bench record not serializable: {e}"),
        }
    }
    CAPTURED.with(|c| {
        if let Some(buf) = c.borrow_mut().as_mut() {
            buf.push(record);
        }
    });
}
