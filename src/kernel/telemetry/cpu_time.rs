use tracing::Level;

use crate::kernel::event::Channel;
use crate::kernel::probe::{ProcessClock, ProcessTimes};
use super::sink::LogSink;
use super::tracer::GcTracer;

const INVALID_TIMES: &str = "TraceCpuTime: read_process_times() returned invalid result";

/// Measures process CPU time from construction to end of scope.
///
/// Reports once, either through [`finish`](Self::finish) or on drop:
/// one `User=..s Sys=..s Real=..s` line on the cpu channel and, when a
/// tracer was supplied, the same sample forwarded to it. A failed clock
/// read at either end logs a warning and reports nothing.
pub struct GcTraceCpuTime<'a> {
    active: bool,
    starting: ProcessTimes,
    clock: &'a dyn ProcessClock,
    sink: &'a dyn LogSink,
    tracer: Option<&'a dyn GcTracer>,
}

impl<'a> GcTraceCpuTime<'a> {
    pub fn new(
        clock: &'a dyn ProcessClock,
        sink: &'a dyn LogSink,
        tracer: Option<&'a dyn GcTracer>,
    ) -> Self {
        let mut active = sink.enabled(Channel::Cpu, Level::INFO)
            || tracer.map_or(false, |t| t.should_report_cpu_time_event());
        let mut starting = ProcessTimes::default();

        if active {
            match clock.read_process_times() {
                Ok(times) => starting = times,
                Err(_) => {
                    warn_invalid(sink);
                    active = false;
                }
            }
        }

        Self { active, starting, clock, sink, tracer }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Ends the measurement now instead of at end of scope.
    pub fn finish(mut self) {
        self.report();
    }

    fn report(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;

        match self.clock.read_process_times() {
            Ok(now) => {
                let delta = now.since(&self.starting);
                if self.sink.enabled(Channel::Cpu, Level::INFO) {
                    let line = format!(
                        "User={:3.2}s Sys={:3.2}s Real={:3.2}s",
                        delta.user, delta.system, delta.real
                    );
                    self.sink.write_line(Channel::Cpu, Level::INFO, &line);
                }
                if let Some(tracer) = self.tracer {
                    tracer.report_cpu_time_event(delta.user, delta.system, delta.real);
                }
            }
            Err(_) => warn_invalid(self.sink),
        }
    }
}

fn warn_invalid(sink: &dyn LogSink) {
    if sink.enabled(Channel::Cpu, Level::WARN) {
        sink.write_line(Channel::Cpu, Level::WARN, INVALID_TIMES);
    }
}

impl Drop for GcTraceCpuTime<'_> {
    fn drop(&mut self) {
        self.report();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::probe::ProbeError;
    use crate::kernel::telemetry::recorder::CpuTimeRecorder;
    use crate::kernel::telemetry::sink::MemorySink;
    use crate::testing::ScriptedClock;

    #[test]
    fn test_reports_deltas_on_drop() {
        let clock = ScriptedClock::readings(&[(10.0, 4.0, 1.0), (15.0, 6.0, 2.0)]);
        let sink = MemorySink::new();
        let recorder = CpuTimeRecorder::new();
        {
            let _cpu = GcTraceCpuTime::new(&clock, &sink, Some(&recorder));
        }
        assert_eq!(sink.texts(Channel::Cpu), vec!["User=2.00s Sys=1.00s Real=5.00s"]);
        assert_eq!(recorder.samples().len(), 1);
        assert_eq!(recorder.samples()[0].real, 5.0);
    }

    #[test]
    fn test_finish_reports_once() {
        let clock = ScriptedClock::readings(&[(0.0, 0.0, 0.0), (1.0, 0.5, 0.25)]);
        let sink = MemorySink::new();
        let recorder = CpuTimeRecorder::new();
        let cpu = GcTraceCpuTime::new(&clock, &sink, Some(&recorder));
        cpu.finish();
        assert_eq!(clock.calls(), 2);
        assert_eq!(recorder.samples().len(), 1);
        assert_eq!(sink.texts(Channel::Cpu).len(), 1);
    }

    #[test]
    fn test_start_failure_deactivates() {
        let clock = ScriptedClock::new(vec![Err(ProbeError::InvalidTimes)]);
        let sink = MemorySink::new();
        let recorder = CpuTimeRecorder::new();
        {
            let cpu = GcTraceCpuTime::new(&clock, &sink, Some(&recorder));
            assert!(!cpu.is_active());
        }
        assert_eq!(clock.calls(), 1);
        assert!(recorder.samples().is_empty());
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, Level::WARN);
        assert_eq!(lines[0].text, INVALID_TIMES);
    }

    #[test]
    fn test_end_failure_suppresses_report() {
        let clock = ScriptedClock::new(vec![
            Ok(ProcessTimes { real: 1.0, user: 1.0, system: 1.0 }),
            Err(ProbeError::InvalidTimes),
        ]);
        let sink = MemorySink::new();
        let recorder = CpuTimeRecorder::new();
        drop(GcTraceCpuTime::new(&clock, &sink, Some(&recorder)));
        assert!(recorder.samples().is_empty());
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].level, Level::WARN);
    }

    #[test]
    fn test_inactive_without_channel_or_tracer_request() {
        let clock = ScriptedClock::readings(&[(0.0, 0.0, 0.0)]);
        let sink = MemorySink::new().without_channel(Channel::Cpu);
        let recorder = CpuTimeRecorder::new().set_report_cpu_time(false);
        {
            let cpu = GcTraceCpuTime::new(&clock, &sink, Some(&recorder));
            assert!(!cpu.is_active());
        }
        assert_eq!(clock.calls(), 0);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_tracer_request_activates_with_channel_off() {
        let clock = ScriptedClock::readings(&[(0.0, 0.0, 0.0), (2.0, 1.0, 0.0)]);
        let sink = MemorySink::new().without_channel(Channel::Cpu);
        let recorder = CpuTimeRecorder::new();
        drop(GcTraceCpuTime::new(&clock, &sink, Some(&recorder)));
        assert_eq!(recorder.samples().len(), 1);
        assert!(sink.lines().is_empty());
    }
}
