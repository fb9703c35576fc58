use std::cell::RefCell;

/// Severity levels for diagnostic messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// A recoverable problem: unknown names, bad operands, oversized
    /// ranges. Evaluation continues with `undef`.
    Warning,
    /// Program output produced by `echo()` expressions.
    Echo,
    /// A fatal problem reported by an embedding host. The core itself
    /// signals fatal conditions through [`EvalError`](crate::error::EvalError)
    /// instead of printing them.
    Error,
}

/// A single diagnostic message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The message severity.
    pub level: Level,
    /// The message text, without a level prefix.
    pub text:  String,
}

/// Receives diagnostic messages during evaluation.
///
/// The evaluator is single-threaded and the sink is assumed single-writer;
/// implementations take `&self` (like [`log::Log`]) and use interior
/// mutability when they accumulate state.
pub trait MessageSink {
    /// Delivers one message to the sink.
    fn print(&self, message: &Message);
}

/// The default sink, forwarding messages to the [`log`] crate.
///
/// Warnings become `log::warn!` records and echo output becomes
/// `log::info!` records under the `echo` target, so a host's logger
/// configuration decides where they end up.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn print(&self, message: &Message) {
        match message.level {
            Level::Warning => log::warn!("{}", message.text),
            Level::Echo => log::info!(target: "echo", "{}", message.text),
            Level::Error => log::error!("{}", message.text),
        }
    }
}

/// A sink that records every message it receives.
///
/// Used by tests and by hosts that surface diagnostics in their own UI
/// instead of a log stream.
///
/// ## Example
/// ```
/// use carve::diag::{CapturedMessages, Level, Message, MessageSink};
///
/// let sink = CapturedMessages::default();
/// sink.print(&Message { level: Level::Warning,
///                       text:  "something odd".to_string(), });
///
/// assert_eq!(sink.take().len(), 1);
/// assert!(sink.take().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct CapturedMessages {
    messages: RefCell<Vec<Message>>,
}

impl CapturedMessages {
    /// Removes and returns every recorded message.
    #[must_use]
    pub fn take(&self) -> Vec<Message> {
        self.messages.take()
    }

    /// Returns the number of recorded messages without draining them.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    /// Tests whether no messages have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }
}

impl MessageSink for CapturedMessages {
    fn print(&self, message: &Message) {
        self.messages.borrow_mut().push(message.clone());
    }
}
