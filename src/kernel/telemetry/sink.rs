use std::sync::Mutex;
use tracing::Level;

use crate::kernel::event::Channel;

/// Receives finished trace lines. One call per line; implementations must
/// not split a line across writes.
pub trait LogSink: Send + Sync {
    fn enabled(&self, channel: Channel, level: Level) -> bool;
    fn write_line(&self, channel: Channel, level: Level, line: &str);
}

// tracing needs the target and level as constants at each call site.
macro_rules! dispatch_level {
    ($mac:ident, $target:literal, $level:expr $(, $arg:expr)*) => {
        if $level == Level::ERROR {
            tracing::$mac!(target: $target, Level::ERROR $(, $arg)*)
        } else if $level == Level::WARN {
            tracing::$mac!(target: $target, Level::WARN $(, $arg)*)
        } else if $level == Level::INFO {
            tracing::$mac!(target: $target, Level::INFO $(, $arg)*)
        } else if $level == Level::DEBUG {
            tracing::$mac!(target: $target, Level::DEBUG $(, $arg)*)
        } else {
            tracing::$mac!(target: $target, Level::TRACE $(, $arg)*)
        }
    };
}

/// Forwards trace lines to the active `tracing` subscriber, one event per
/// line, under the targets `gc::start`, `gc` and `gc::cpu`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn enabled(&self, channel: Channel, level: Level) -> bool {
        match channel {
            Channel::Start => dispatch_level!(enabled, "gc::start", level),
            Channel::End => dispatch_level!(enabled, "gc", level),
            Channel::Cpu => dispatch_level!(enabled, "gc::cpu", level),
        }
    }

    fn write_line(&self, channel: Channel, level: Level, line: &str) {
        match channel {
            Channel::Start => dispatch_level!(event, "gc::start", level, "{}", line),
            Channel::End => dispatch_level!(event, "gc", level, "{}", line),
            Channel::Cpu => dispatch_level!(event, "gc::cpu", level, "{}", line),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedLine {
    pub channel: Channel,
    pub level: Level,
    pub text: String,
}

/// Keeps every line in memory. Channels can be switched off to model a
/// subscriber that filters them out.
#[derive(Debug)]
pub struct MemorySink {
    lines: Mutex<Vec<CapturedLine>>,
    max_level: Level,
    disabled: Vec<Channel>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            max_level: Level::TRACE,
            disabled: Vec::new(),
        }
    }

    /// Only lines at `level` or more severe are enabled.
    pub fn with_max_level(mut self, level: Level) -> Self {
        self.max_level = level;
        self
    }

    pub fn without_channel(mut self, channel: Channel) -> Self {
        self.disabled.push(channel);
        self
    }

    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn texts(&self, channel: Channel) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.channel == channel)
            .map(|l| l.text)
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.clear();
        }
    }
}

impl Default for MemorySink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for MemorySink {
    fn enabled(&self, channel: Channel, level: Level) -> bool {
        // tracing orders levels by verbosity: ERROR is the smallest.
        level <= self.max_level && !self.disabled.contains(&channel)
    }

    fn write_line(&self, channel: Channel, level: Level, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(CapturedLine { channel, level, text: line.to_string() });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_sink_levels() {
        let sink = MemorySink::new().with_max_level(Level::INFO);
        assert!(sink.enabled(Channel::End, Level::INFO));
        assert!(sink.enabled(Channel::End, Level::WARN));
        assert!(!sink.enabled(Channel::End, Level::DEBUG));
    }

    #[test]
    fn test_memory_sink_disabled_channel() {
        let sink = MemorySink::new().without_channel(Channel::Cpu);
        assert!(!sink.enabled(Channel::Cpu, Level::INFO));
        assert!(sink.enabled(Channel::Start, Level::INFO));
    }

    #[test]
    fn test_tracing_sink_without_subscriber() {
        // No subscriber installed: nothing is enabled and writes are dropped.
        let sink = TracingSink;
        assert!(!sink.enabled(Channel::End, Level::INFO));
        sink.write_line(Channel::End, Level::INFO, "Pause Young 1.000ms");
    }
}
