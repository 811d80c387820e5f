use super::{
    FaultCounters, FaultDiagnostics, FaultStats, ProbeError, ProcessClock, ProcessTimes,
    FAULT_INDEX_ENTRIES,
};

/// Entry points added by the fault-sampling kernel patch. Mainline Linux
/// 6.6+ assigns these numbers to `fchmodat2` (452) and `futex_wait` (455),
/// so nothing here may run unless the caller has opted in.
#[cfg(all(target_os = "linux", target_pointer_width = "64"))]
mod patched {
    use super::{FaultCounters, ProbeError, FAULT_INDEX_ENTRIES};

    // int sys_get_swap_stats(struct swap_stats *stats);
    const SYS_GET_SWAP_STATS: libc::c_long = 452;
    // int faulty_page_index(unsigned int mode, unsigned long *indices);
    const SYS_FAULTY_PAGE_INDEX: libc::c_long = 455;
    const FAULTY_PAGE_RESET: libc::c_uint = 2;
    const FAULTY_PAGE_DUMP: libc::c_uint = 3;

    // The dump writes `unsigned long` entries straight into the caller's u64 slots.
    const _: () = assert!(std::mem::size_of::<libc::c_ulong>() == std::mem::size_of::<u64>());

    #[repr(C)]
    #[derive(Default)]
    struct SwapStats {
        majflt: libc::c_uint,
        majflt_in_region: libc::c_uint,
    }

    fn last_errno() -> i32 {
        std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
    }

    pub(super) fn get_swap_stats() -> Result<FaultCounters, ProbeError> {
        let mut stats = SwapStats::default();
        // SAFETY: only sound on a kernel carrying the fault-sampling patch,
        // where 452 takes a single `struct swap_stats *` and writes at most
        // size_of::<SwapStats>() bytes. HostProbe only gets here after an
        // explicit opt-in.
        let rc = unsafe { libc::syscall(SYS_GET_SWAP_STATS, &mut stats as *mut SwapStats) };
        if rc != 0 {
            return Err(ProbeError::Syscall { call: "get_swap_stats", errno: last_errno() });
        }
        Ok(FaultCounters {
            majflt: stats.majflt,
            majflt_in_region: stats.majflt_in_region,
        })
    }

    pub(super) fn dump(indices: &mut [u64; FAULT_INDEX_ENTRIES]) -> Result<(), ProbeError> {
        // SAFETY: only sound on the patched kernel, where dump mode fills
        // FAULT_INDEX_ENTRIES `unsigned long` slots. On this target an
        // `unsigned long` is exactly a u64 (asserted above).
        let rc = unsafe {
            libc::syscall(
                SYS_FAULTY_PAGE_INDEX,
                FAULTY_PAGE_DUMP,
                indices.as_mut_ptr() as *mut libc::c_ulong,
            )
        };
        if rc != 0 {
            return Err(ProbeError::Syscall { call: "faulty_page_index", errno: last_errno() });
        }
        Ok(())
    }

    pub(super) fn reset() -> Result<(), ProbeError> {
        // SAFETY: only sound on the patched kernel, where reset mode ignores
        // the buffer argument.
        let rc = unsafe {
            libc::syscall(
                SYS_FAULTY_PAGE_INDEX,
                FAULTY_PAGE_RESET,
                std::ptr::null_mut::<libc::c_ulong>(),
            )
        };
        if rc != 0 {
            return Err(ProbeError::Syscall { call: "faulty_page_index", errno: last_errno() });
        }
        Ok(())
    }
}

#[cfg(not(all(target_os = "linux", target_pointer_width = "64")))]
mod patched {
    use super::{FaultCounters, ProbeError, FAULT_INDEX_ENTRIES};

    pub(super) fn get_swap_stats() -> Result<FaultCounters, ProbeError> {
        Err(ProbeError::Unsupported("get_swap_stats"))
    }

    pub(super) fn dump(_indices: &mut [u64; FAULT_INDEX_ENTRIES]) -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("faulty_page_index"))
    }

    pub(super) fn reset() -> Result<(), ProbeError> {
        Err(ProbeError::Unsupported("faulty_page_index"))
    }
}

/// Probes backed by the running host.
///
/// The process clock always reads the host. The fault sources use syscalls
/// that exist only on kernels built with the fault-sampling patch, and their
/// numbers belong to unrelated calls on mainline kernels. They stay
/// `Unsupported` unless the probe is built with
/// [`with_fault_syscalls`](Self::with_fault_syscalls); on targets other than
/// 64-bit Linux they are `Unsupported` regardless.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostProbe {
    fault_syscalls: bool,
}

impl HostProbe {
    pub const fn new() -> Self {
        HostProbe { fault_syscalls: false }
    }

    /// Issue the fault syscalls. Only for hosts known to run the patched kernel.
    pub const fn with_fault_syscalls() -> Self {
        HostProbe { fault_syscalls: true }
    }

    pub fn fault_syscalls(&self) -> bool {
        self.fault_syscalls
    }
}

impl FaultStats for HostProbe {
    fn read_fault_stats(&self) -> Result<FaultCounters, ProbeError> {
        if !self.fault_syscalls {
            return Err(ProbeError::Unsupported("get_swap_stats"));
        }
        patched::get_swap_stats()
    }
}

impl FaultDiagnostics for HostProbe {
    fn read_fault_indices(&self, indices: &mut [u64; FAULT_INDEX_ENTRIES]) -> Result<(), ProbeError> {
        if !self.fault_syscalls {
            return Err(ProbeError::Unsupported("faulty_page_index"));
        }
        patched::dump(indices)
    }

    fn reset_sampling(&self) -> Result<(), ProbeError> {
        if !self.fault_syscalls {
            return Err(ProbeError::Unsupported("faulty_page_index"));
        }
        patched::reset()
    }
}

#[cfg(unix)]
fn timeval_secs(tv: libc::timeval) -> f64 {
    tv.tv_sec as f64 + tv.tv_usec as f64 / 1_000_000.0
}

impl ProcessClock for HostProbe {
    #[cfg(unix)]
    fn read_process_times(&self) -> Result<ProcessTimes, ProbeError> {
        // SAFETY: rusage is plain old data; all-zero is a valid value.
        let mut usage: libc::rusage = unsafe { std::mem::zeroed() };
        // SAFETY: `usage` is a valid, writable rusage.
        if unsafe { libc::getrusage(libc::RUSAGE_SELF, &mut usage) } != 0 {
            return Err(ProbeError::InvalidTimes);
        }
        // SAFETY: timespec is plain old data; all-zero is a valid value.
        let mut now: libc::timespec = unsafe { std::mem::zeroed() };
        // SAFETY: `now` is a valid, writable timespec.
        if unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut now) } != 0 {
            return Err(ProbeError::InvalidTimes);
        }
        Ok(ProcessTimes {
            real: now.tv_sec as f64 + now.tv_nsec as f64 / 1_000_000_000.0,
            user: timeval_secs(usage.ru_utime),
            system: timeval_secs(usage.ru_stime),
        })
    }

    #[cfg(not(unix))]
    fn read_process_times(&self) -> Result<ProcessTimes, ProbeError> {
        Err(ProbeError::Unsupported("process times"))
    }
}
