use crate::kernel::time::Ticks;
use super::logger::GcTraceTimeLogger;
use super::timer::GcTimer;

/// Scope guard around one traced event.
///
/// Starts the logger (and the timer phase, if a timer is attached) on
/// construction and ends both exactly once: on [`finish`](Self::finish),
/// [`finish_at`](Self::finish_at), or drop. A logger with no enabled
/// channel is skipped entirely.
pub struct GcTraceTime<'a> {
    logger: GcTraceTimeLogger<'a>,
    timer: Option<&'a mut GcTimer>,
    enabled: bool,
    finished: bool,
}

impl<'a> GcTraceTime<'a> {
    pub fn new(logger: GcTraceTimeLogger<'a>, timer: Option<&'a mut GcTimer>) -> Self {
        Self::begin(logger, timer, Ticks::now())
    }

    pub fn begin(
        mut logger: GcTraceTimeLogger<'a>,
        mut timer: Option<&'a mut GcTimer>,
        start: Ticks,
    ) -> Self {
        if let Some(timer) = timer.as_deref_mut() {
            timer.register_gc_phase_start(logger.title(), start);
        }
        let enabled = logger.is_enabled();
        if enabled {
            logger.log_start(start);
        }
        Self { logger, timer, enabled, finished: false }
    }

    pub fn logger(&self) -> &GcTraceTimeLogger<'a> {
        &self.logger
    }

    pub fn finish(self) {
        self.finish_at(Ticks::now());
    }

    pub fn finish_at(mut self, end: Ticks) {
        self.end(end);
    }

    fn end(&mut self, end: Ticks) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Some(timer) = self.timer.as_deref_mut() {
            timer.register_gc_phase_end(end);
        }
        if self.enabled {
            self.logger.log_end(end);
        }
    }
}

impl Drop for GcTraceTime<'_> {
    fn drop(&mut self) {
        self.end(Ticks::now());
    }
}
