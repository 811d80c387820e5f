use serde::{Serialize, Deserialize};

/// Title marker for a full (stop-the-world, whole heap) collection pause.
pub const FULL_PAUSE_MARKER: &str = "Pause Full";

/// What kind of bracketed event is being traced. Drives which diagnostics
/// the logger collects at the end of the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// Young or mixed pause.
    Pause,
    /// Full collection pause; eligible for the fault-location dump.
    FullPause,
    /// Sub-phase or concurrent phase of a collection.
    Phase,
}

impl EventKind {
    /// Classifies a title for callers that only have a title to go by.
    pub fn from_title(title: &str) -> Self {
        if title.contains(FULL_PAUSE_MARKER) {
            EventKind::FullPause
        } else if title.starts_with("Pause") {
            EventKind::Pause
        } else {
            EventKind::Phase
        }
    }

    pub fn is_full_pause(&self) -> bool {
        *self == EventKind::FullPause
    }
}

/// Output channel a trace line is written to. Start and end lines go to
/// separate channels so each stays coherent when events interleave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Start,
    End,
    Cpu,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_title() {
        assert_eq!(EventKind::from_title("Pause Full"), EventKind::FullPause);
        assert_eq!(EventKind::from_title("GC(3) Pause Full (System.gc())"), EventKind::FullPause);
        assert_eq!(EventKind::from_title("Pause Young"), EventKind::Pause);
        assert_eq!(EventKind::from_title("Phase 1: Mark live objects"), EventKind::Phase);
        // Marker is case sensitive
        assert_eq!(EventKind::from_title("pause full"), EventKind::Phase);
    }
}
