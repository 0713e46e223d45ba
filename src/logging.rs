//! Logging capability for parse and fix functions.
//!
//! Parsing is tolerant: malformed lines are reported and skipped rather than
//! failing the whole file, and every fix step reports what it changed. Both
//! kinds of messages go through the [`Log`] trait, which callers pass
//! explicitly into every parse/fix function. There is no global logging state
//! in this crate; [`FacadeLog`] bridges to the `log` crate for applications
//! that already use that facade.

use std::cell::RefCell;

/// Fire-and-forget message sink passed into all parse and fix functions.
pub trait Log {
    fn error(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn info(&self, msg: &str);
    fn debug(&self, msg: &str);
}

/// Forwards all messages to the `log` crate macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct FacadeLog;

impl Log for FacadeLog {
    fn error(&self, msg: &str) {
        log::error!("{msg}");
    }

    fn warn(&self, msg: &str) {
        log::warn!("{msg}");
    }

    fn info(&self, msg: &str) {
        log::info!("{msg}");
    }

    fn debug(&self, msg: &str) {
        log::debug!("{msg}");
    }
}

/// Collects messages in memory so callers can inspect them afterwards.
///
/// Mainly useful in tests asserting that a malformed line was reported.
#[derive(Debug, Default)]
pub struct MemoryLog {
    messages: RefCell<Vec<String>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    /// Messages logged at a given level, e.g. `"warn"`.
    pub fn messages_at(&self, level: &str) -> Vec<String> {
        let prefix = format!("{level}: ");
        self.messages
            .borrow()
            .iter()
            .filter_map(|msg| msg.strip_prefix(&prefix).map(str::to_owned))
            .collect()
    }

    fn push(&self, level: &str, msg: &str) {
        self.messages.borrow_mut().push(format!("{level}: {msg}"));
    }
}

impl Log for MemoryLog {
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }

    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }

    fn info(&self, msg: &str) {
        self.push("info", msg);
    }

    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
}
