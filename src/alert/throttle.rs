//! Alert rate limiting.
//!
//! However often motion is detected, the notifier is invoked at most once
//! per silence window. The first alert always goes through.

use super::Notifier;
use std::time::{Duration, Instant};

/// Gatekeeper between motion events and the notifier.
pub struct AlertThrottle {
    /// Minimum wall time between two fired alerts.
    min_silence: Duration,
    /// When the last alert fired; `None` means never.
    last_alert_at: Option<Instant>,
    notifier: Box<dyn Notifier>,
}

impl AlertThrottle {
    /// Creates a throttle that has never fired.
    pub fn new(min_silence: Duration, notifier: Box<dyn Notifier>) -> Self {
        Self {
            min_silence,
            last_alert_at: None,
            notifier,
        }
    }

    /// Notifies with `message` unless an alert fired within the silence
    /// window before `now`. Returns whether it fired.
    pub fn try_alert(&mut self, now: Instant, message: &str) -> bool {
        if let Some(last) = self.last_alert_at {
            let elapsed = now.saturating_duration_since(last);
            if elapsed <= self.min_silence {
                tracing::debug!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    silence_ms = self.min_silence.as_millis() as u64,
                    "Alert suppressed by throttle"
                );
                return false;
            }
        }

        self.last_alert_at = Some(now);
        self.notifier.notify(message);
        tracing::info!(alert = message, "Alert fired");
        true
    }

    /// When the last alert fired.
    pub fn last_alert_at(&self) -> Option<Instant> {
        self.last_alert_at
    }

    /// The configured silence window.
    pub fn min_silence(&self) -> Duration {
        self.min_silence
    }

    /// Forgets the last alert so the next attempt fires.
    pub fn reset(&mut self) {
        self.last_alert_at = None;
    }
}

impl std::fmt::Debug for AlertThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlertThrottle")
            .field("min_silence", &self.min_silence)
            .field("last_alert_at", &self.last_alert_at)
            .finish_non_exhaustive()
    }
}
