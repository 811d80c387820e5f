use std::borrow::Cow;
use std::fmt::Write;

use tracing::Level;

use crate::kernel::cause::GcCause;
use crate::kernel::event::{Channel, EventKind};
use crate::kernel::probe::{ProbeError, FAULT_INDEX_ENTRIES};
use crate::kernel::time::{counter_to_millis, Ticks};
use super::context::TraceContext;

pub const M: usize = 1024 * 1024;

/// Brackets one collection event and writes a start line and an end line.
///
/// With heap usage logging on, the start snapshot (heap occupancy and the
/// major-fault counter) is taken once in [`log_start`](Self::log_start) and
/// reported next to the end snapshot in [`log_end`](Self::log_end). Probe
/// failures never reach the caller. A failed fault read keeps the last value
/// read for this event, or 0 if there is none.
pub struct GcTraceTimeLogger<'a> {
    title: Cow<'a, str>,
    cause: GcCause,
    kind: EventKind,
    log_heap_usage: bool,
    level: Level,
    start: Ticks,
    heap_usage_before: Option<usize>,
    majflt_before: Option<u32>,
    ctx: TraceContext<'a>,
}

impl<'a> GcTraceTimeLogger<'a> {
    /// The event kind is derived from the title.
    pub fn new(
        title: impl Into<Cow<'a, str>>,
        cause: GcCause,
        log_heap_usage: bool,
        ctx: TraceContext<'a>,
    ) -> Self {
        let title = title.into();
        let kind = EventKind::from_title(&title);
        Self {
            title,
            cause,
            kind,
            log_heap_usage,
            level: Level::INFO,
            start: Ticks::default(),
            heap_usage_before: None,
            majflt_before: None,
            ctx,
        }
    }

    pub fn with_kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// False when neither the start nor the end channel would be written.
    pub fn is_enabled(&self) -> bool {
        self.ctx.sink.enabled(Channel::Start, self.level)
            || self.ctx.sink.enabled(Channel::End, self.level)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn heap_usage_before(&self) -> Option<usize> {
        self.heap_usage_before
    }

    pub fn majflt_before(&self) -> Option<u32> {
        self.majflt_before
    }

    pub fn log_start(&mut self, start: Ticks) {
        self.start = start;

        if self.ctx.sink.enabled(Channel::Start, self.level) {
            let line = self.header();
            self.ctx.sink.write_line(Channel::Start, self.level, &line);
        }

        if self.log_heap_usage {
            self.heap_usage_before = Some(self.ctx.heap.used());
            if let Some(majflt) = self.read_majflt() {
                self.majflt_before = Some(majflt);
            }
        }
    }

    pub fn log_end(&mut self, end: Ticks) {
        let duration_ms = counter_to_millis(end.since(self.start));

        if self.ctx.sink.enabled(Channel::End, self.level) {
            let mut line = self.header();

            if let Some(before) = self.heap_usage_before {
                let heap = self.ctx.heap;
                let used = heap.used();
                let capacity = heap.capacity();
                let majflt = self.read_majflt();
                let _ = write!(
                    line,
                    " {}M->{}M({}M) majflt({}->{})",
                    before / M,
                    used / M,
                    capacity / M,
                    self.majflt_before.unwrap_or(0),
                    majflt.or(self.majflt_before).unwrap_or(0),
                );
            }

            let _ = write!(line, " {:.3}ms", duration_ms);
            self.ctx.sink.write_line(Channel::End, self.level, &line);
        }

        if self.log_heap_usage && self.kind.is_full_pause() {
            self.dump_fault_indices();
        }
    }

    fn header(&self) -> String {
        let mut line = String::with_capacity(self.title.len() + 96);
        line.push_str(&self.title);
        if !self.cause.is_no_gc() {
            let _ = write!(line, " ({})", self.cause);
        }
        line
    }

    fn read_majflt(&self) -> Option<u32> {
        match self.ctx.faults.read_fault_stats() {
            Ok(stats) => Some(stats.majflt),
            Err(e) => {
                tracing::debug!(target: "gc::probe", error = %e, "major fault counter unavailable");
                None
            }
        }
    }

    fn dump_fault_indices(&self) {
        match FaultIndexBuffer::acquire() {
            Ok(mut buffer) => match self.ctx.diagnostics.read_fault_indices(&mut buffer.entries) {
                Ok(()) => {
                    if self.ctx.sink.enabled(Channel::End, self.level) {
                        let line = buffer.render();
                        self.ctx.sink.write_line(Channel::End, self.level, &line);
                    }
                }
                Err(e) => {
                    tracing::debug!(target: "gc::probe", error = %e, "fault index dump unavailable");
                }
            },
            Err(e) => {
                tracing::debug!(target: "gc::probe", error = %e, "fault index dump skipped");
            }
        }

        if let Err(e) = self.ctx.diagnostics.reset_sampling() {
            tracing::debug!(target: "gc::probe", error = %e, "fault index reset failed");
        }
    }
}

impl std::fmt::Debug for GcTraceTimeLogger<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GcTraceTimeLogger")
            .field("title", &self.title)
            .field("cause", &self.cause)
            .field("kind", &self.kind)
            .field("log_heap_usage", &self.log_heap_usage)
            .field("start", &self.start)
            .field("heap_usage_before", &self.heap_usage_before)
            .field("majflt_before", &self.majflt_before)
            .finish()
    }
}

/// Scratch space for one fault-location dump. Lives for a single
/// `log_end` call and is freed on drop.
struct FaultIndexBuffer {
    entries: Box<[u64; FAULT_INDEX_ENTRIES]>,
}

impl FaultIndexBuffer {
    fn acquire() -> Result<Self, ProbeError> {
        let mut entries: Vec<u64> = Vec::new();
        entries
            .try_reserve_exact(FAULT_INDEX_ENTRIES)
            .map_err(|_| ProbeError::Allocation(FAULT_INDEX_ENTRIES))?;
        entries.resize(FAULT_INDEX_ENTRIES, 0);
        let entries: Box<[u64; FAULT_INDEX_ENTRIES]> = entries
            .into_boxed_slice()
            .try_into()
            .map_err(|_| ProbeError::Allocation(FAULT_INDEX_ENTRIES))?;

        Ok(Self { entries })
    }

    fn render(&self) -> String {
        let mut line = String::with_capacity(20 + FAULT_INDEX_ENTRIES * 8);
        line.push_str("faulty page index: ");
        for (i, index) in self.entries.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            let _ = write!(line, "{}", index);
        }
        line
    }
}
