//! Network connectivity manager
//!
//! One bounded cycle of join-then-poll is a connectivity attempt; the
//! manager runs attempts until the link is up or the retry budget is
//! exhausted, drawing every transition to the display as it goes. It runs
//! once at startup and is the sole gate before the poll loop starts.

use core::net::Ipv4Addr;

use embedded_hal_async::delay::DelayNs;
use log::{info, warn};

use crate::display::{DisplayError, StatusDisplay};
use crate::screens;

/// Seconds spent polling the link after each join initiation before the
/// attempt counts as failed.
const JOIN_POLL_SECS: u32 = 10;

/// Link state as seen by the manager. Transient, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

/// What the caller does when the retry budget is exhausted.
///
/// The reference device proceeds into the poll loop without a confirmed
/// link and lives with per-iteration connection errors; `Halt` is the
/// conservative alternative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinFailurePolicy {
    /// Enter the poll loop anyway; every fetch surfaces its own error.
    ProceedDegraded,
    /// Stop before the poll loop.
    Halt,
}

/// Wireless join primitive.
///
/// `join` only initiates; completion is observed through `is_joined`,
/// which reports true once the link is fully usable (associated and
/// addressed).
pub trait WirelessLink {
    /// Driver-level failure for `activate`/`join`. A failure ends the
    /// current attempt, nothing more.
    type Error: core::fmt::Debug;

    /// Bring the interface up. Idempotent across attempts.
    fn activate(&mut self) -> Result<(), Self::Error>;

    /// Start joining the given network.
    fn join(&mut self, ssid: &str, password: &str) -> Result<(), Self::Error>;

    /// Whether the link is fully usable.
    fn is_joined(&mut self) -> bool;

    /// Current interface address, when joined.
    fn address_info(&mut self) -> Option<Ipv4Addr>;
}

/// Join parameters and retry budget.
pub struct ConnectConfig<'a> {
    pub ssid: &'a str,
    pub password: &'a str,
    pub max_retries: u32,
    pub retry_delay_secs: u32,
}

/// Join the network with bounded retry and on-screen feedback.
///
/// Every state transition updates the display synchronously before
/// control returns. Display faults are logged and never derail the join
/// itself.
pub async fn connect<L, D, T>(
    link: &mut L,
    display: &mut D,
    delay: &mut T,
    config: &ConnectConfig<'_>,
) -> ConnectivityState
where
    L: WirelessLink,
    D: StatusDisplay,
    T: DelayNs,
{
    let mut state = ConnectivityState::Disconnected;
    let mut retries = 0;

    while state != ConnectivityState::Connected && retries < config.max_retries {
        if link.is_joined() {
            state = ConnectivityState::Connected;
            break;
        }

        state = ConnectivityState::Connecting;
        show(display, state);
        info!(
            "joining {} (attempt {}/{})",
            config.ssid,
            retries + 1,
            config.max_retries
        );

        state = join_attempt(link, delay, config).await;
        if state != ConnectivityState::Connected {
            warn!("join attempt {} timed out", retries + 1);
            show(display, state);
            delay.delay_ms(config.retry_delay_secs * 1_000).await;
            retries += 1;
        }
    }

    if state == ConnectivityState::Connected {
        if let Some(address) = link.address_info() {
            info!("network up, address {}", address);
        }
    } else {
        state = ConnectivityState::Failed;
        warn!("unable to join after {} attempts", config.max_retries);
    }
    show(display, state);
    state
}

/// One bounded join + poll cycle. Returns `Connected` or `Disconnected`.
async fn join_attempt<L, T>(
    link: &mut L,
    delay: &mut T,
    config: &ConnectConfig<'_>,
) -> ConnectivityState
where
    L: WirelessLink,
    T: DelayNs,
{
    if let Err(e) = link.activate() {
        warn!("interface activation failed: {:?}", e);
        return ConnectivityState::Disconnected;
    }
    if let Err(e) = link.join(config.ssid, config.password) {
        warn!("join initiation failed: {:?}", e);
        return ConnectivityState::Disconnected;
    }

    for _ in 0..JOIN_POLL_SECS {
        if link.is_joined() {
            return ConnectivityState::Connected;
        }
        delay.delay_ms(1_000).await;
    }

    // Attempt timed out without the link coming up.
    ConnectivityState::Disconnected
}

/// Project a connectivity state onto the display, logging instead of
/// failing when the panel itself is unreachable.
fn show<D: StatusDisplay>(display: &mut D, state: ConnectivityState) {
    let screen: fn(&mut D) -> Result<(), DisplayError> = match state {
        ConnectivityState::Connecting => screens::connecting,
        // The reference device blanks the screen on success and leaves
        // the first poll iteration to draw over it.
        ConnectivityState::Connected => D::clear,
        ConnectivityState::Disconnected => screens::connect_failed,
        ConnectivityState::Failed => screens::connect_exhausted,
    };
    if let Err(e) = screen(display) {
        warn!("status screen draw failed: {:?}", e);
    }
}

#[cfg(test)]
mod tests {
    use core::future::Future;
    use core::pin::pin;
    use core::task::{Context, Poll, Waker};

    use super::*;

    /// The mock delay completes immediately, so these futures never
    /// actually pend.
    fn block_on<F: Future>(future: F) -> F::Output {
        let mut future = pin!(future);
        let waker = Waker::noop();
        let mut cx = Context::from_waker(waker);
        loop {
            if let Poll::Ready(output) = future.as_mut().poll(&mut cx) {
                return output;
            }
        }
    }

    struct MockDelay {
        ms: heapless::Vec<u32, 128>,
    }

    impl MockDelay {
        fn new() -> Self {
            Self {
                ms: heapless::Vec::new(),
            }
        }
    }

    impl DelayNs for MockDelay {
        async fn delay_ns(&mut self, _ns: u32) {}

        async fn delay_ms(&mut self, ms: u32) {
            let _ = self.ms.push(ms);
        }
    }

    struct MockDisplay {
        texts: heapless::Vec<(heapless::String<24>, i32, i32), 16>,
        cleared: usize,
    }

    impl MockDisplay {
        fn new() -> Self {
            Self {
                texts: heapless::Vec::new(),
                cleared: 0,
            }
        }

        fn text_at(&self, x: i32, y: i32) -> Option<&str> {
            self.texts
                .iter()
                .find(|(_, tx, ty)| *tx == x && *ty == y)
                .map(|(text, _, _)| text.as_str())
        }
    }

    impl StatusDisplay for MockDisplay {
        fn clear(&mut self) -> Result<(), DisplayError> {
            self.texts.clear();
            self.cleared += 1;
            Ok(())
        }

        fn draw_text(&mut self, text: &str, x: i32, y: i32) -> Result<(), DisplayError> {
            let mut line = heapless::String::new();
            line.push_str(text).map_err(|_| DisplayError::BufferOverflow)?;
            self.texts
                .push((line, x, y))
                .map_err(|_| DisplayError::BufferOverflow)?;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), DisplayError> {
            Ok(())
        }
    }

    /// Never comes up, counts what the manager asked of it.
    struct DeadLink {
        join_calls: u32,
    }

    impl WirelessLink for DeadLink {
        type Error = &'static str;

        fn activate(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn join(&mut self, _ssid: &str, _password: &str) -> Result<(), Self::Error> {
            self.join_calls += 1;
            Ok(())
        }

        fn is_joined(&mut self) -> bool {
            false
        }

        fn address_info(&mut self) -> Option<Ipv4Addr> {
            None
        }
    }

    /// Comes up partway through the given attempt.
    struct LateLink {
        join_calls: u32,
        succeed_on_attempt: u32,
        polls: u32,
        polls_needed: u32,
    }

    impl WirelessLink for LateLink {
        type Error = &'static str;

        fn activate(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }

        fn join(&mut self, _ssid: &str, _password: &str) -> Result<(), Self::Error> {
            self.join_calls += 1;
            self.polls = 0;
            Ok(())
        }

        fn is_joined(&mut self) -> bool {
            if self.join_calls < self.succeed_on_attempt {
                return false;
            }
            self.polls += 1;
            self.polls > self.polls_needed
        }

        fn address_info(&mut self) -> Option<Ipv4Addr> {
            Some(Ipv4Addr::new(192, 168, 1, 42))
        }
    }

    fn config(max_retries: u32) -> ConnectConfig<'static> {
        ConnectConfig {
            ssid: "testnet",
            password: "hunter2",
            max_retries,
            retry_delay_secs: 5,
        }
    }

    #[test]
    fn hopeless_link_gets_exactly_max_retries_attempts() {
        let mut link = DeadLink { join_calls: 0 };
        let mut display = MockDisplay::new();
        let mut delay = MockDelay::new();

        let state = block_on(connect(&mut link, &mut display, &mut delay, &config(3)));

        assert_eq!(state, ConnectivityState::Failed);
        assert_eq!(link.join_calls, 3);
        // Ten one-second polls per attempt, one retry delay after each.
        assert_eq!(delay.ms.iter().filter(|&&ms| ms == 1_000).count(), 30);
        assert_eq!(delay.ms.iter().filter(|&&ms| ms == 5_000).count(), 3);
        assert_eq!(display.text_at(0, 30), Some("Unable to connect"));
    }

    #[test]
    fn second_attempt_success_stops_retrying() {
        let mut link = LateLink {
            join_calls: 0,
            succeed_on_attempt: 2,
            polls: 0,
            polls_needed: 3,
        };
        let mut display = MockDisplay::new();
        let mut delay = MockDelay::new();

        let state = block_on(connect(&mut link, &mut display, &mut delay, &config(5)));

        assert_eq!(state, ConnectivityState::Connected);
        assert_eq!(link.join_calls, 2);
        // The display ends blanked, not stuck on a failure screen.
        assert!(display.texts.is_empty());
        assert!(display.cleared > 0);
    }

    #[test]
    fn already_joined_link_connects_without_an_attempt() {
        let mut link = LateLink {
            join_calls: 1,
            succeed_on_attempt: 1,
            polls: 1,
            polls_needed: 0,
        };
        let mut display = MockDisplay::new();
        let mut delay = MockDelay::new();

        let state = block_on(connect(&mut link, &mut display, &mut delay, &config(5)));

        assert_eq!(state, ConnectivityState::Connected);
        assert_eq!(link.join_calls, 1);
        assert!(delay.ms.is_empty());
    }
}
