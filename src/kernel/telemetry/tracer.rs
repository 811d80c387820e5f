/// Aggregates per-event reports over a collector's lifetime.
pub trait GcTracer: Send + Sync {
    /// Whether a CPU time sample is wanted even when the cpu log channel is off.
    fn should_report_cpu_time_event(&self) -> bool;

    fn report_cpu_time_event(&self, user_time: f64, system_time: f64, real_time: f64);
}
