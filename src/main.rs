use anyhow::Context;
use tokio::time::Duration;

use gctrace::demo::{run_pauses, SimulatedHeap};
use gctrace::{TraceConfig, TraceContext};

const HEAP_CAPACITY: usize = 256 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    gctrace::logging::init("gc=info,gc::cpu=info,gc::start=debug")
        .context("installing tracing subscriber")?;

    let config = TraceConfig::from_env().context("reading GCTRACE_* environment")?;
    let pauses: usize = match std::env::args().nth(1) {
        Some(arg) => arg.parse().with_context(|| format!("invalid pause count {arg:?}"))?,
        None => 8,
    };

    tracing::info!(?config, pauses, "gctrace demo starting");

    let heap = SimulatedHeap::new(HEAP_CAPACITY);
    let mut ctx = TraceContext::host(&heap);
    if config.fault_syscalls {
        ctx = ctx.with_host_fault_syscalls();
    }
    let summary = run_pauses(&config, ctx, &heap, pauses, Duration::from_millis(50)).await?;

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
