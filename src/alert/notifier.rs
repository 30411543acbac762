//! Alert delivery.
//!
//! The detector only knows how to hand a message to a [`Notifier`].
//! Whether that ends up in a log, a speech synthesizer or a push service
//! is up to the implementation.

use std::process::Command;

/// One-way sink for alert messages.
pub trait Notifier {
    /// Delivers `message`. Failures are the notifier's own concern.
    fn notify(&mut self, message: &str);
}

impl<F> Notifier for F
where
    F: FnMut(&str),
{
    fn notify(&mut self, message: &str) {
        self(message)
    }
}

/// Writes alerts to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        let at = chrono::Local::now();
        tracing::warn!(at = %at.format("%Y-%m-%d %H:%M:%S"), "{}", message);
    }
}

/// Runs an external program with the message as its last argument.
///
/// Pointing this at a text-to-speech tool (`espeak`, `say`, `spd-say`)
/// speaks the alert aloud. The child is not awaited on the caller's
/// thread.
#[derive(Debug, Clone)]
pub struct CommandNotifier {
    program: String,
    args: Vec<String>,
}

impl CommandNotifier {
    /// Creates a notifier for `program` with fixed leading `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Builds the command for one message without running it.
    pub fn command(&self, message: &str) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args).arg(message);
        command
    }
}

impl Notifier for CommandNotifier {
    fn notify(&mut self, message: &str) {
        match self.command(message).spawn() {
            Ok(mut child) => {
                std::thread::spawn(move || {
                    if let Err(e) = child.wait() {
                        tracing::warn!(error = %e, "Alert command did not exit cleanly");
                    }
                });
                tracing::debug!(program = %self.program, "Alert command spawned");
            }
            Err(e) => {
                tracing::warn!(program = %self.program, error = %e, "Failed to run alert command");
            }
        }
    }
}

/// Delivers every alert to each wrapped notifier in order.
#[derive(Default)]
pub struct FanoutNotifier {
    targets: Vec<Box<dyn Notifier>>,
}

impl FanoutNotifier {
    /// Creates a fan-out with no targets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target.
    pub fn with(mut self, target: impl Notifier + 'static) -> Self {
        self.targets.push(Box::new(target));
        self
    }

    /// Number of targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True when there are no targets.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Notifier for FanoutNotifier {
    fn notify(&mut self, message: &str) {
        for target in &mut self.targets {
            target.notify(message);
        }
    }
}
