//! Render diagnostics.
//!
//! Warnings never interrupt rendering; they are handed to a [`Reporter`] and
//! rendering carries on. A failed render also reports one `error:` line
//! before returning its error. A `Vec<String>` collects them (tests, per-descriptor
//! buffers during parallel rendering) and [`LogReporter`] forwards them to
//! `tracing`.

use tracing::Level;

/// Receiver for render diagnostics.
pub trait Reporter {
    fn report(&mut self, message: &str);
}

impl Reporter for Vec<String> {
    fn report(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Emits every report as a `tracing` event and counts them.
///
/// Reports starting with `error:` are logged at ERROR, everything else at
/// WARN.
#[derive(Debug, Default)]
pub struct LogReporter {
    count: usize,
}

impl LogReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of diagnostics reported so far.
    pub fn count(&self) -> usize {
        self.count
    }
}

impl Reporter for LogReporter {
    fn report(&mut self, message: &str) {
        self.count += 1;
        if level_of(message) == Level::ERROR {
            tracing::error!("{message}");
        } else {
            tracing::warn!("{message}");
        }
    }
}

fn level_of(message: &str) -> Level {
    if message.starts_with("error:") {
        Level::ERROR
    } else {
        Level::WARN
    }
}

/// Replay buffered messages into another reporter, in order.
pub fn replay(messages: &[String], into: &mut dyn Reporter) {
    for message in messages {
        into.report(message);
    }
}
