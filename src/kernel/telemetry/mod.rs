//! Event bracketing and CPU time tracing for collection pauses.
//!
//! # HOT PATH INVARIANT
//! Everything here runs inside a collection pause. No locks are taken on the
//! logger path, nothing blocks, and each output is a single formatted line.
//!
//! # FAILURE INVARIANT
//! A probe that fails degrades the output (a 0, a missing block, a warning
//! line). It never reaches the caller.

pub mod context;
pub mod cpu_time;
pub mod logger;
pub mod metrics;
pub mod recorder;
pub mod sink;
pub mod timer;
pub mod trace_time;
pub mod tracer;

pub use context::TraceContext;
pub use cpu_time::GcTraceCpuTime;
pub use logger::GcTraceTimeLogger;
pub use recorder::{CpuTimeRecorder, CpuTimeSample};
pub use sink::{LogSink, MemorySink, TracingSink};
pub use timer::GcTimer;
pub use trace_time::GcTraceTime;
pub use tracer::GcTracer;
