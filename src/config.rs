use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::Level;

use crate::kernel::telemetry::recorder::DEFAULT_MAX_SAMPLES;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Record heap occupancy and major faults around each event.
    pub log_heap_usage: bool,
    /// Whether the recorder asks tracers for CPU samples when the cpu
    /// channel is off.
    pub report_cpu_time: bool,
    pub max_cpu_samples: usize,
    /// Level the event logger writes its start and end lines at.
    pub log_level: String,
    /// Read faults through the patched-kernel syscalls. Off unless the host
    /// is known to run that kernel.
    pub fault_syscalls: bool,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            log_heap_usage: false,
            report_cpu_time: true,
            max_cpu_samples: DEFAULT_MAX_SAMPLES,
            log_level: "info".to_string(),
            fault_syscalls: false,
        }
    }
}

impl TraceConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: TraceConfig = serde_json::from_str(json)?;
        config.level()?;
        Ok(config)
    }

    /// Defaults overridden by any `GCTRACE_*` variables that are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = TraceConfig::default();

        if let Some(v) = lookup("GCTRACE_LOG_HEAP_USAGE") {
            config.log_heap_usage = parse_bool("GCTRACE_LOG_HEAP_USAGE", &v)?;
        }
        if let Some(v) = lookup("GCTRACE_REPORT_CPU_TIME") {
            config.report_cpu_time = parse_bool("GCTRACE_REPORT_CPU_TIME", &v)?;
        }
        if let Some(v) = lookup("GCTRACE_MAX_CPU_SAMPLES") {
            config.max_cpu_samples = v.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: "GCTRACE_MAX_CPU_SAMPLES",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("GCTRACE_FAULT_SYSCALLS") {
            config.fault_syscalls = parse_bool("GCTRACE_FAULT_SYSCALLS", &v)?;
        }
        if let Some(v) = lookup("GCTRACE_LOG_LEVEL") {
            config.log_level = v;
        }

        config.level()?;
        Ok(config)
    }

    pub fn level(&self) -> Result<Level, ConfigError> {
        Level::from_str(self.log_level.trim()).map_err(|_| ConfigError::InvalidValue {
            key: "log_level",
            value: self.log_level.clone(),
        })
    }
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue { key, value: value.to_string() }),
    }
}
