//! Scheduler primitives for the alternating poll loop
//!
//! The loop itself lives in the firmware main; what it needs from here is
//! the slot selection, the interval and a cooperative stop flag.

use core::sync::atomic::{AtomicBool, Ordering};

/// Seconds between poll iterations.
pub const POLL_INTERVAL_SECS: u64 = 5;

/// Which fetch/render pair a loop iteration runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollSlot {
    GameServer,
    PanelService,
}

impl PollSlot {
    /// Slot for a given iteration count: even ticks poll the game server,
    /// odd ticks the panel. Only parity matters, so the counter is free
    /// to wrap.
    pub fn for_tick(tick: u32) -> Self {
        if tick % 2 == 0 {
            PollSlot::GameServer
        } else {
            PollSlot::PanelService
        }
    }
}

/// Cooperative cancellation flag, checked once per loop iteration.
///
/// Nothing on the device sets it today; it is the seam an external
/// supervisor would use to stop the loop cleanly.
pub struct CancelToken(AtomicBool);

impl CancelToken {
    pub const fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_alternate_by_parity() {
        for tick in 0..1_000u32 {
            let expected = if tick % 2 == 0 {
                PollSlot::GameServer
            } else {
                PollSlot::PanelService
            };
            assert_eq!(PollSlot::for_tick(tick), expected);
        }
    }

    #[test]
    fn parity_survives_counter_wrap() {
        assert_eq!(PollSlot::for_tick(u32::MAX), PollSlot::PanelService);
        assert_eq!(PollSlot::for_tick(u32::MAX.wrapping_add(1)), PollSlot::GameServer);
    }

    #[test]
    fn cancel_token_latches() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        token.cancel();
        assert!(token.is_cancelled());
    }
}
