pub mod cause;
pub mod event;
pub mod probe;
pub mod telemetry;
pub mod time;
