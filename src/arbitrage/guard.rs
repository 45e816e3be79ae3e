//! Single-flight trade guard
//!
//! At most one trade attempt holds the guard. Acquisition is a
//! compare-and-swap; release happens when the permit drops, so every exit
//! path of a trade (success, abort, error, cancellation) leaves the guard
//! free.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    TradeInFlight,
}

#[derive(Debug, Clone, Default)]
pub struct TradeGuard {
    in_flight: Arc<AtomicBool>,
}

impl TradeGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` while another attempt holds the guard
    pub fn try_acquire(&self) -> Option<TradePermit> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| TradePermit {
                in_flight: self.in_flight.clone(),
            })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn state(&self) -> MonitorState {
        if self.is_in_flight() {
            MonitorState::TradeInFlight
        } else {
            MonitorState::Idle
        }
    }
}

/// Held for the whole duration of a trade attempt
#[derive(Debug)]
#[must_use = "the guard is released as soon as the permit is dropped"]
pub struct TradePermit {
    in_flight: Arc<AtomicBool>,
}

impl Drop for TradePermit {
    fn drop(&mut self) {
        self.in_flight.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight() {
        let guard = TradeGuard::new();
        assert_eq!(guard.state(), MonitorState::Idle);

        let permit = guard.try_acquire().expect("first acquire");
        assert_eq!(guard.state(), MonitorState::TradeInFlight);
        assert!(guard.try_acquire().is_none());

        drop(permit);
        assert_eq!(guard.state(), MonitorState::Idle);
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_released_on_early_return() {
        fn attempt(guard: &TradeGuard) -> Result<(), &'static str> {
            let _permit = guard.try_acquire().ok_or("busy")?;
            Err("submission failed")
        }

        let guard = TradeGuard::new();
        assert!(attempt(&guard).is_err());
        assert!(!guard.is_in_flight());
    }

    #[test]
    fn test_clones_share_state() {
        let guard = TradeGuard::new();
        let other = guard.clone();
        let _permit = guard.try_acquire().expect("acquire");
        assert!(other.is_in_flight());
        assert!(other.try_acquire().is_none());
    }
}
