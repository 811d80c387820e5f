pub mod config;
pub mod demo;
pub mod kernel;
pub mod logging;
pub mod testing;

pub use config::TraceConfig;
pub use kernel::cause::GcCause;
pub use kernel::event::{Channel, EventKind};
pub use kernel::telemetry::{
    CpuTimeRecorder, GcTimer, GcTraceCpuTime, GcTraceTime, GcTraceTimeLogger, TraceContext,
};
pub use kernel::time::Ticks;
