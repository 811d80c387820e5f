use gctrace::kernel::probe::FAULT_INDEX_ENTRIES;
use gctrace::kernel::telemetry::MemorySink;
use gctrace::testing::{FixedHeap, ScriptedDiagnostics, ScriptedFaults};
use gctrace::{Channel, GcCause, GcTimer, GcTraceTime, GcTraceTimeLogger, Ticks, TraceContext};

const MIB: usize = 1024 * 1024;

#[test]
fn test_young_pause_without_heap_logging() {
    let heap = FixedHeap::new(64 * MIB, 128 * MIB);
    let sink = MemorySink::new();
    let ctx = TraceContext::unsupported(&heap, &sink);

    let mut logger = GcTraceTimeLogger::new("Pause Young", GcCause::NoGc, false, ctx);
    logger.log_start(Ticks::from_nanos(0));
    logger.log_end(Ticks::from_micros(12_500));

    assert_eq!(sink.texts(Channel::Start), vec!["Pause Young"]);
    assert_eq!(sink.texts(Channel::End), vec!["Pause Young 12.500ms"]);
}

#[test]
fn test_full_pause_with_heap_logging_and_dump() {
    let heap = FixedHeap::new(100 * MIB, 256 * MIB);
    let faults = ScriptedFaults::counts(&[10, 15]);
    let diagnostics = ScriptedDiagnostics::succeeding(|i| (i as u64) * 4096);
    let sink = MemorySink::new();
    let ctx = TraceContext::unsupported(&heap, &sink)
        .with_faults(&faults)
        .with_diagnostics(&diagnostics);

    let mut logger = GcTraceTimeLogger::new("Pause Full", GcCause::JavaLangSystemGc, true, ctx);
    logger.log_start(Ticks::from_nanos(0));
    heap.set_used(40 * MIB);
    logger.log_end(Ticks::from_micros(50_250));

    assert_eq!(sink.texts(Channel::Start), vec!["Pause Full (System.gc())"]);
    let end = sink.texts(Channel::End);
    assert_eq!(end.len(), 2);
    assert_eq!(end[0], "Pause Full (System.gc()) 100M->40M(256M) majflt(10->15) 50.250ms");

    let dump = end[1].strip_prefix("faulty page index: ").expect("dump prefix");
    let entries: Vec<&str> = dump.split(',').collect();
    assert_eq!(entries.len(), FAULT_INDEX_ENTRIES);
    assert_eq!(entries[1], "4096");
    assert_eq!(diagnostics.resets(), 1);
}

#[test]
fn test_elapsed_matches_tick_delta() {
    let heap = FixedHeap::new(0, 0);
    let sink = MemorySink::new();
    let ctx = TraceContext::unsupported(&heap, &sink);

    for (start, end, expected) in [
        (0u64, 0u64, "0.000ms"),
        (1_000, 2_000, "0.001ms"),
        (5_000_000, 1_005_000_000, "1000.000ms"),
        (7, 1_234_567, "1.235ms"),
    ] {
        sink.clear();
        let mut logger = GcTraceTimeLogger::new("Pause Young", GcCause::NoGc, false, ctx);
        logger.log_start(Ticks::from_nanos(start));
        logger.log_end(Ticks::from_nanos(end));
        assert_eq!(sink.texts(Channel::End), vec![format!("Pause Young {}", expected)]);
    }
}

#[test]
fn test_fault_read_failure_keeps_event_alive() {
    let heap = FixedHeap::new(8 * MIB, 16 * MIB);
    let faults = ScriptedFaults::new(vec![
        Ok(gctrace::kernel::probe::FaultCounters { majflt: 4, majflt_in_region: 2 }),
        Err(gctrace::kernel::probe::ProbeError::Syscall { call: "get_swap_stats", errno: 38 }),
    ]);
    let sink = MemorySink::new();
    let ctx = TraceContext::unsupported(&heap, &sink).with_faults(&faults);

    let mut logger = GcTraceTimeLogger::new("Pause Young", GcCause::AllocationFailure, true, ctx);
    logger.log_start(Ticks::from_nanos(0));
    logger.log_end(Ticks::from_nanos(1_000_000));

    assert_eq!(
        sink.texts(Channel::End),
        vec!["Pause Young (Allocation Failure) 8M->8M(16M) majflt(4->4) 1.000ms"]
    );
}

#[test]
fn test_interleaved_events_keep_lines_whole() {
    let heap = FixedHeap::new(0, 0);
    let sink = MemorySink::new();
    let ctx = TraceContext::unsupported(&heap, &sink);
    let mut timer = GcTimer::new();
    timer.register_gc_start(Ticks::from_nanos(0));

    let outer = GcTraceTime::begin(
        GcTraceTimeLogger::new("Pause Young", GcCause::NoGc, false, ctx),
        Some(&mut timer),
        Ticks::from_nanos(0),
    );
    let mut inner = GcTraceTimeLogger::new("Concurrent Mark", GcCause::NoGc, false, ctx);
    inner.log_start(Ticks::from_nanos(100_000));
    outer.finish_at(Ticks::from_nanos(2_000_000));
    inner.log_end(Ticks::from_nanos(3_100_000));
    timer.register_gc_end(Ticks::from_nanos(3_100_000));

    assert_eq!(sink.texts(Channel::Start), vec!["Pause Young", "Concurrent Mark"]);
    assert_eq!(
        sink.texts(Channel::End),
        vec!["Pause Young 2.000ms", "Concurrent Mark 3.000ms"]
    );
    assert_eq!(timer.sum_of_pauses_ms(), 2.0);
}
