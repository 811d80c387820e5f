use std::collections::VecDeque;
use serde::Serialize;

use super::recorder::CpuTimeSample;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CpuTimeSnapshot {
    pub samples: u64,
    pub total_user_secs: f64,
    pub total_system_secs: f64,
    pub total_real_secs: f64,
    pub avg_real_secs: f64,
    pub max_real_secs: f64,
}

impl CpuTimeSnapshot {
    /// Share of wall time spent on CPU across all samples, summed over threads.
    pub fn cpu_utilization(&self) -> f64 {
        if self.total_real_secs > 0.0 {
            (self.total_user_secs + self.total_system_secs) / self.total_real_secs
        } else {
            0.0
        }
    }
}

pub fn compute_snapshot(samples: &VecDeque<CpuTimeSample>) -> CpuTimeSnapshot {
    let mut snap = CpuTimeSnapshot::default();

    for sample in samples {
        snap.samples += 1;
        snap.total_user_secs += sample.user;
        snap.total_system_secs += sample.system;
        snap.total_real_secs += sample.real;
        if sample.real > snap.max_real_secs {
            snap.max_real_secs = sample.real;
        }
    }

    if snap.samples > 0 {
        snap.avg_real_secs = snap.total_real_secs / snap.samples as f64;
    }

    snap
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_snapshot() {
        let snap = compute_snapshot(&VecDeque::new());
        assert_eq!(snap, CpuTimeSnapshot::default());
        assert_eq!(snap.cpu_utilization(), 0.0);
    }

    #[test]
    fn test_totals_and_max() {
        let samples: VecDeque<_> = vec![
            CpuTimeSample { user: 1.0, system: 0.5, real: 2.0 },
            CpuTimeSample { user: 3.0, system: 0.5, real: 4.0 },
        ]
        .into();
        let snap = compute_snapshot(&samples);
        assert_eq!(snap.samples, 2);
        assert_eq!(snap.total_user_secs, 4.0);
        assert_eq!(snap.total_system_secs, 1.0);
        assert_eq!(snap.avg_real_secs, 3.0);
        assert_eq!(snap.max_real_secs, 4.0);
        assert!((snap.cpu_utilization() - 5.0 / 6.0).abs() < 1e-9);
    }
}
