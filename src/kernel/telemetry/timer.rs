use serde::Serialize;

use crate::kernel::time::{counter_to_millis, Ticks};

pub const MAX_PHASES: usize = 64;
pub const MAX_PHASE_LEVELS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseRecord {
    pub name: String,
    /// Nesting depth; 0 is a top-level pause.
    pub level: usize,
    pub start: Ticks,
    pub end: Option<Ticks>,
}

impl PhaseRecord {
    pub fn duration_ms(&self) -> Option<f64> {
        self.end.map(|end| counter_to_millis(end.since(self.start)))
    }
}

/// Timeline of one collection: its start and end plus the nested phases
/// registered in between. Phases past [`MAX_PHASES`] or deeper than
/// [`MAX_PHASE_LEVELS`] are dropped.
#[derive(Debug, Default)]
pub struct GcTimer {
    gc_start: Option<Ticks>,
    gc_end: Option<Ticks>,
    phases: Vec<PhaseRecord>,
    open: Vec<usize>,
    dropped: usize,
}

impl GcTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_gc_start(&mut self, time: Ticks) {
        self.gc_start = Some(time);
        self.gc_end = None;
        self.phases.clear();
        self.open.clear();
        self.dropped = 0;
    }

    pub fn register_gc_end(&mut self, time: Ticks) {
        while !self.open.is_empty() {
            self.register_gc_phase_end(time);
        }
        self.gc_end = Some(time);
    }

    pub fn register_gc_phase_start(&mut self, name: &str, time: Ticks) {
        if self.phases.len() >= MAX_PHASES || self.open.len() >= MAX_PHASE_LEVELS {
            self.dropped += 1;
            tracing::debug!(target: "gc::phases", phase = name, "phase table full, dropping phase");
            return;
        }
        self.open.push(self.phases.len());
        self.phases.push(PhaseRecord {
            name: name.to_string(),
            level: self.open.len() - 1,
            start: time,
            end: None,
        });
    }

    pub fn register_gc_phase_end(&mut self, time: Ticks) {
        if self.dropped > 0 {
            // Unwind a phase that never made it into the table.
            self.dropped -= 1;
            return;
        }
        if let Some(index) = self.open.pop() {
            self.phases[index].end = Some(time);
        }
    }

    pub fn gc_start(&self) -> Option<Ticks> {
        self.gc_start
    }

    pub fn gc_end(&self) -> Option<Ticks> {
        self.gc_end
    }

    pub fn phases(&self) -> &[PhaseRecord] {
        &self.phases
    }

    pub fn longest_pause_ms(&self) -> f64 {
        self.pauses().fold(0.0, f64::max)
    }

    pub fn sum_of_pauses_ms(&self) -> f64 {
        self.pauses().sum()
    }

    fn pauses(&self) -> impl Iterator<Item = f64> + '_ {
        self.phases
            .iter()
            .filter(|p| p.level == 0)
            .filter_map(|p| p.duration_ms())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Ticks {
        Ticks::from_nanos(v * 1_000_000)
    }

    #[test]
    fn test_nested_phases() {
        let mut timer = GcTimer::new();
        timer.register_gc_start(ms(0));
        timer.register_gc_phase_start("Pause Young", ms(0));
        timer.register_gc_phase_start("Evacuate", ms(1));
        timer.register_gc_phase_end(ms(3));
        timer.register_gc_phase_end(ms(4));
        timer.register_gc_phase_start("Pause Remark", ms(10));
        timer.register_gc_phase_end(ms(16));
        timer.register_gc_end(ms(20));

        let phases = timer.phases();
        assert_eq!(phases.len(), 3);
        assert_eq!(phases[1].level, 1);
        assert_eq!(phases[1].duration_ms(), Some(2.0));
        assert_eq!(timer.longest_pause_ms(), 6.0);
        assert_eq!(timer.sum_of_pauses_ms(), 10.0);
        assert_eq!(timer.gc_end(), Some(ms(20)));
    }

    #[test]
    fn test_gc_end_closes_open_phases() {
        let mut timer = GcTimer::new();
        timer.register_gc_start(ms(0));
        timer.register_gc_phase_start("Pause Full", ms(0));
        timer.register_gc_phase_start("Mark", ms(1));
        timer.register_gc_end(ms(5));
        assert!(timer.phases().iter().all(|p| p.end == Some(ms(5))));
    }

    #[test]
    fn test_overflowing_levels_are_dropped() {
        let mut timer = GcTimer::new();
        timer.register_gc_start(ms(0));
        for i in 0..MAX_PHASE_LEVELS + 2 {
            timer.register_gc_phase_start("nested", ms(i as u64));
        }
        for _ in 0..MAX_PHASE_LEVELS + 2 {
            timer.register_gc_phase_end(ms(20));
        }
        assert_eq!(timer.phases().len(), MAX_PHASE_LEVELS);
        assert!(timer.phases().iter().all(|p| p.end.is_some()));
    }
}
