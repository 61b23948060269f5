//! Fixed-layout screens
//!
//! Each function maps one fetch outcome onto a sequence of draw calls and
//! ends with a single flush. Coordinates are fixed pixel positions on the
//! 128x64 surface; percentages always carry two decimals.

use core::fmt::Write;

use heapless::String;

use crate::display::{DisplayError, StatusDisplay};
use crate::fetch::FetchError;
use crate::mcstatus::GameSnapshot;
use crate::panel::PanelSnapshot;

const SEPARATOR: &str = "------------------";

/// Longest line that can be formatted for the 128 px surface.
type Line = String<24>;

fn format_line(args: core::fmt::Arguments<'_>) -> Result<Line, DisplayError> {
    let mut line = Line::new();
    line.write_fmt(args).map_err(|_| DisplayError::BufferOverflow)?;
    Ok(line)
}

/// Game-server screen. The status enum renders through its fixed display
/// name; failures arrive as an Error-status snapshot, so this screen has
/// no separate error branch.
pub fn game_status<D: StatusDisplay>(
    display: &mut D,
    snapshot: &GameSnapshot,
) -> Result<(), DisplayError> {
    display.clear()?;
    display.draw_text("MC Server Status", 0, 5)?;
    display.draw_text(SEPARATOR, 0, 15)?;
    display.draw_text("Server:", 0, 30)?;
    display.draw_text(snapshot.status.as_str(), 60, 30)?;
    display.draw_text("Players:", 0, 45)?;
    let players = format_line(format_args!("{}/{}", snapshot.online, snapshot.max))?;
    display.draw_text(&players, 65, 45)?;
    display.flush()
}

/// Panel screen, dispatching on the fetch outcome. An API-reported error
/// keeps the title block; transport and decode failures collapse to the
/// single-line connection error screen.
pub fn panel_status<D: StatusDisplay>(
    display: &mut D,
    outcome: &Result<PanelSnapshot, FetchError>,
) -> Result<(), DisplayError> {
    match outcome {
        Ok(snapshot) => panel_data(display, snapshot),
        Err(FetchError::Api(code)) => panel_api_error(display, *code),
        Err(_) => connection_error(display),
    }
}

fn panel_data<D: StatusDisplay>(
    display: &mut D,
    snapshot: &PanelSnapshot,
) -> Result<(), DisplayError> {
    display.clear()?;
    display.draw_text("MCSManager Data", 0, 5)?;
    display.draw_text(SEPARATOR, 0, 15)?;
    let cpu = format_line(format_args!("CPU: {:.2}%", snapshot.cpu_percent))?;
    display.draw_text(&cpu, 0, 25)?;
    let mem = format_line(format_args!("Mem: {:.2}%", snapshot.mem_percent))?;
    display.draw_text(&mem, 0, 40)?;
    let instances = format_line(format_args!(
        "Instance: {}/{}",
        snapshot.running, snapshot.total
    ))?;
    display.draw_text(&instances, 0, 55)?;
    display.flush()
}

fn panel_api_error<D: StatusDisplay>(display: &mut D, code: u16) -> Result<(), DisplayError> {
    display.clear()?;
    display.draw_text("MCSManager Data", 0, 5)?;
    display.draw_text(SEPARATOR, 0, 15)?;
    let error = format_line(format_args!("API Error: {}", code))?;
    display.draw_text(&error, 10, 40)?;
    display.flush()
}

/// Single-line screen for transport-level failures.
pub fn connection_error<D: StatusDisplay>(display: &mut D) -> Result<(), DisplayError> {
    display.clear()?;
    display.draw_text("Connection Error", 0, 30)?;
    display.flush()
}

/// Shown while a join attempt is in flight.
pub fn connecting<D: StatusDisplay>(display: &mut D) -> Result<(), DisplayError> {
    display.clear()?;
    display.draw_text("Connecting...", 20, 30)?;
    display.flush()
}

/// Shown after a join attempt times out.
pub fn connect_failed<D: StatusDisplay>(display: &mut D) -> Result<(), DisplayError> {
    display.clear()?;
    display.draw_text("[ERROR]", 32, 18)?;
    display.draw_text("Connection", 20, 30)?;
    display.draw_text("Failed", 36, 40)?;
    display.flush()
}

/// Shown once the retry budget is exhausted; stays up until the first
/// poll iteration replaces it.
pub fn connect_exhausted<D: StatusDisplay>(display: &mut D) -> Result<(), DisplayError> {
    display.clear()?;
    display.draw_text("Unable to connect", 0, 30)?;
    display.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mcstatus::ServerStatus;

    struct MockDisplay {
        texts: heapless::Vec<(Line, i32, i32), 16>,
        cleared: usize,
        flushed: usize,
    }

    impl MockDisplay {
        fn new() -> Self {
            Self {
                texts: heapless::Vec::new(),
                cleared: 0,
                flushed: 0,
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
            let mut line = Line::new();
            line.push_str(text).map_err(|_| DisplayError::BufferOverflow)?;
            self.texts
                .push((line, x, y))
                .map_err(|_| DisplayError::BufferOverflow)?;
            Ok(())
        }

        fn flush(&mut self) -> Result<(), DisplayError> {
            self.flushed += 1;
            Ok(())
        }
    }

    #[test]
    fn game_screen_layout() {
        let mut display = MockDisplay::new();
        let snapshot = GameSnapshot {
            status: ServerStatus::Online,
            online: 4,
            max: 20,
        };

        game_status(&mut display, &snapshot).unwrap();

        assert_eq!(display.text_at(0, 5), Some("MC Server Status"));
        assert_eq!(display.text_at(0, 15), Some(SEPARATOR));
        assert_eq!(display.text_at(0, 30), Some("Server:"));
        assert_eq!(display.text_at(60, 30), Some("Online"));
        assert_eq!(display.text_at(65, 45), Some("4/20"));
        assert_eq!(display.flushed, 1);
    }

    #[test]
    fn game_screen_shows_error_status_name() {
        let mut display = MockDisplay::new();

        game_status(&mut display, &GameSnapshot::unreachable()).unwrap();

        assert_eq!(display.text_at(60, 30), Some("Error"));
        assert_eq!(display.text_at(65, 45), Some("0/0"));
    }

    #[test]
    fn percentages_carry_two_decimals() {
        let mut display = MockDisplay::new();
        let snapshot = PanelSnapshot {
            cpu_percent: 42.0,
            mem_percent: 17.0,
            running: 3,
            total: 5,
        };

        panel_status(&mut display, &Ok(snapshot)).unwrap();

        assert_eq!(display.text_at(0, 25), Some("CPU: 42.00%"));
        assert_eq!(display.text_at(0, 40), Some("Mem: 17.00%"));
        assert_eq!(display.text_at(0, 55), Some("Instance: 3/5"));
        assert_eq!(display.flushed, 1);
    }

    #[test]
    fn api_error_keeps_title_block() {
        let mut display = MockDisplay::new();

        panel_status(&mut display, &Err(FetchError::Api(500))).unwrap();

        assert_eq!(display.text_at(0, 5), Some("MCSManager Data"));
        assert_eq!(display.text_at(10, 40), Some("API Error: 500"));
    }

    #[test]
    fn transport_failure_is_a_single_line() {
        let mut display = MockDisplay::new();

        panel_status(&mut display, &Err(FetchError::Transport)).unwrap();

        assert_eq!(display.texts.len(), 1);
        assert_eq!(display.text_at(0, 30), Some("Connection Error"));
        assert_eq!(display.flushed, 1);
    }

    #[test]
    fn malformed_body_renders_like_transport_failure() {
        let mut display = MockDisplay::new();

        panel_status(&mut display, &Err(FetchError::Malformed)).unwrap();

        assert_eq!(display.text_at(0, 30), Some("Connection Error"));
    }
}
