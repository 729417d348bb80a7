//! Liveness / readiness flags.
//!
//! Two orthogonal signals: readiness is toggled for draining, liveness for
//! simulating a wedged process. Nothing orders one relative to the other.

use std::sync::atomic::{AtomicBool, Ordering};

/// Atomically toggled probe flags. Both start `true`.
#[derive(Debug)]
pub struct ProbeState {
    live: AtomicBool,
    ready: AtomicBool,
}

impl Default for ProbeState {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeState {
    pub fn new() -> Self {
        Self {
            live: AtomicBool::new(true),
            ready: AtomicBool::new(true),
        }
    }

    pub fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::Release);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Release);
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_live_and_ready() {
        let p = ProbeState::new();
        assert!(p.is_live());
        assert!(p.is_ready());
    }

    #[test]
    fn flags_are_independent() {
        let p = ProbeState::new();
        p.set_ready(false);
        assert!(p.is_live());
        assert!(!p.is_ready());

        p.set_live(false);
        p.set_ready(true);
        assert!(!p.is_live());
        assert!(p.is_ready());
    }

    #[test]
    fn toggles_never_stick() {
        let p = ProbeState::new();
        for _ in 0..3 {
            p.set_ready(false);
            assert!(!p.is_ready());
            p.set_ready(true);
            assert!(p.is_ready());
        }
    }
}
