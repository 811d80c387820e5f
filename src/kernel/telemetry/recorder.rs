use std::collections::VecDeque;
use std::sync::Mutex;
use serde::{Serialize, Deserialize};

use super::metrics::{compute_snapshot, CpuTimeSnapshot};
use super::tracer::GcTracer;

pub const DEFAULT_MAX_SAMPLES: usize = 10_000;

/// One completed CPU time measurement, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CpuTimeSample {
    pub user: f64,
    pub system: f64,
    pub real: f64,
}

/// Keeps the most recent CPU time samples reported by the tracers.
#[derive(Debug)]
pub struct CpuTimeRecorder {
    buffer: Mutex<VecDeque<CpuTimeSample>>,
    max_samples: usize,
    report_cpu_time: bool,
}

impl CpuTimeRecorder {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_SAMPLES)
    }

    pub fn with_capacity(max_samples: usize) -> Self {
        let max_samples = max_samples.max(1);
        Self {
            buffer: Mutex::new(VecDeque::with_capacity(max_samples.min(DEFAULT_MAX_SAMPLES))),
            max_samples,
            report_cpu_time: true,
        }
    }

    /// When false the recorder no longer asks tracers to measure on its
    /// behalf; samples from tracers active for other reasons are still kept.
    pub fn set_report_cpu_time(mut self, report: bool) -> Self {
        self.report_cpu_time = report;
        self
    }

    pub fn record(&self, sample: CpuTimeSample) {
        if let Ok(mut buffer) = self.buffer.lock() {
            if buffer.len() >= self.max_samples {
                buffer.pop_front();
            }
            buffer.push_back(sample);
        }
    }

    pub fn samples(&self) -> Vec<CpuTimeSample> {
        self.buffer
            .lock()
            .map(|b| b.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> CpuTimeSnapshot {
        self.buffer
            .lock()
            .map(|b| compute_snapshot(&b))
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.clear();
        }
    }
}

impl Default for CpuTimeRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl GcTracer for CpuTimeRecorder {
    fn should_report_cpu_time_event(&self) -> bool {
        self.report_cpu_time
    }

    fn report_cpu_time_event(&self, user_time: f64, system_time: f64, real_time: f64) {
        self.record(CpuTimeSample { user: user_time, system: system_time, real: real_time });
    }
}
