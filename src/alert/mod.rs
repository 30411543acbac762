//! Alert delivery and rate limiting.
//!
//! Motion events are funnelled through an [`AlertThrottle`] so the
//! external [`Notifier`] is invoked at most once per silence window.

mod notifier;
mod throttle;

pub use notifier::{CommandNotifier, FanoutNotifier, LogNotifier, Notifier};
pub use throttle::AlertThrottle;
