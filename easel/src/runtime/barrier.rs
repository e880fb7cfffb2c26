use log::warn;

/// Outcome of a single gate decrement.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GateEvent {
    Held,
    Released,
}

/// Counting gate that holds the lifecycle in its preload phase until every
/// issued load has completed.
///
/// The gate releases exactly once, on the decrement that takes the pending
/// count from 1 to 0. A preload that issues no loads never decrements, so
/// callers must also ask `release_if_idle` once the synchronous preload
/// callback has returned; relying on decrements alone would deadlock the
/// zero-request case.
#[derive(Debug, Default)]
pub struct PreloadGate {
    pending: u32,
    released: bool,
}

impl PreloadGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn released(&self) -> bool {
        self.released
    }

    pub fn increment(&mut self) -> u32 {
        if self.released {
            warn!("preload gate incremented after release; load is ungated");
            return self.pending;
        }

        self.pending += 1;
        self.pending
    }

    pub fn decrement(&mut self) -> GateEvent {
        if self.pending == 0 {
            warn!("preload gate decremented below zero");
            return GateEvent::Held;
        }

        self.pending -= 1;

        if self.pending == 0 && !self.released {
            self.released = true;
            return GateEvent::Released;
        }

        GateEvent::Held
    }

    /// The post-callback zero check: releases immediately when no loads were
    /// issued. Returns true only on the releasing call.
    pub fn release_if_idle(&mut self) -> bool {
        if self.pending == 0 && !self.released {
            self.released = true;
            return true;
        }

        false
    }
}
