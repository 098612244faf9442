//! Terminal implementations of the session's host capabilities.

use std::time::{Duration, Instant};

use scriptedit_session::{FlashLevel, Notifier, SessionHost};

/// How long a flash stays on the status line.
const FLASH_TTL: Duration = Duration::from_secs(4);

/// The modal's owner. There is no script list behind the terminal modal,
/// so a refresh request is only logged.
#[derive(Debug, Default)]
pub struct TerminalHost {
    pub closed: bool,
}

impl SessionHost for TerminalHost {
    fn on_cancel(&mut self) {
        self.closed = true;
    }

    fn refetch_host_scripts(&mut self) {
        log::debug!("script list refresh requested (no list in terminal host)");
    }
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub level: FlashLevel,
    pub message: String,
    shown_at: Instant,
}

/// One-line notification area at the bottom of the screen.
#[derive(Debug, Default)]
pub struct FlashLine {
    current: Option<Flash>,
}

impl FlashLine {
    /// The flash still within its display window, if any.
    pub fn visible(&self, now: Instant) -> Option<&Flash> {
        self.current
            .as_ref()
            .filter(|f| now.duration_since(f.shown_at) < FLASH_TTL)
    }

    /// Most recent flash regardless of age (printed after the TUI exits).
    pub fn last(&self) -> Option<&Flash> {
        self.current.as_ref()
    }
}

impl Notifier for FlashLine {
    fn render_flash(&mut self, level: FlashLevel, message: &str) {
        match level {
            FlashLevel::Success => log::info!("flash: {}", message),
            FlashLevel::Error => log::warn!("flash: {}", message),
        }
        self.current = Some(Flash {
            level,
            message: message.to_string(),
            shown_at: Instant::now(),
        });
    }
}
