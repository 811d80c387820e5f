use std::sync::OnceLock;
use std::time::Instant;
use serde::{Serialize, Deserialize};

/// Monotonic timestamp in nanoseconds since a process-wide epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Ticks {
    pub nanos: u64,
}

pub const NANOS_PER_MILLI: u64 = 1_000_000;

fn epoch() -> Instant {
    static EPOCH: OnceLock<Instant> = OnceLock::new();
    *EPOCH.get_or_init(Instant::now)
}

impl Ticks {
    pub fn now() -> Self {
        let nanos = epoch().elapsed().as_nanos();
        Ticks { nanos: u64::try_from(nanos).unwrap_or(u64::MAX) }
    }

    pub fn from_nanos(nanos: u64) -> Self {
        Ticks { nanos }
    }

    pub fn from_micros(micros: u64) -> Self {
        Ticks { nanos: micros.saturating_mul(1_000) }
    }

    /// Counter delta to `other`, zero if `other` is earlier.
    pub fn since(&self, earlier: Ticks) -> u64 {
        self.nanos.saturating_sub(earlier.nanos)
    }
}

/// Converts a tick delta to fractional milliseconds.
pub fn counter_to_millis(delta: u64) -> f64 {
    delta as f64 / NANOS_PER_MILLI as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_to_millis() {
        assert_eq!(counter_to_millis(12_500_000), 12.5);
        assert_eq!(counter_to_millis(0), 0.0);
    }

    #[test]
    fn test_since_saturates() {
        let a = Ticks::from_nanos(10);
        let b = Ticks::from_nanos(4);
        assert_eq!(a.since(b), 6);
        assert_eq!(b.since(a), 0);
    }

    #[test]
    fn test_now_is_monotonic() {
        let a = Ticks::now();
        let b = Ticks::now();
        assert!(b >= a);
    }
}
