//! Welcome to `ressim`!
//!
//! Four small, deterministic engines that replay classic operating-system
//! resource-management algorithms step by step:
//!
//! 1. CPU scheduling ([`algo::cpu`]): FCFS, SJF, SRTF, Round Robin, and
//!    non-preemptive/preemptive Priority.
//! 2. Contiguous memory allocation ([`algo::memory`]): first, best and worst fit.
//! 3. Page replacement ([`algo::paging`]): FIFO, LRU and Optimal.
//! 4. Disk head scheduling ([`algo::disk`]): FCFS, SCAN and C-SCAN.
//!
//! Every engine consumes an immutable workload snapshot and hands back a
//! fully materialized result. Nothing is retained between calls.

mod process;

pub mod algo;
pub mod analyze;
pub mod workload;
pub mod helpe;

pub use crate::helpe::*;

/// The CPU scheduler's unit of work. A [`Process`] shows up at
/// [`arrival_time`](Process::arrival_time) and needs
/// [`burst_time`](Process::burst_time) ticks of processor time in total.
///
/// > ***ATTENTION:*** [`priority`](Process::priority) follows the Unix
/// > convention: a *lower* number means a *more urgent* process. It is
/// > ignored by every policy except the two Priority variants.
///
/// Processes handed to an engine are never mutated. Schedulers derive a
/// private working copy that tracks the remaining burst.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Process {
    /// Caller-assigned, must be unique within a workload.
    pub id:             ProcessId,
    pub arrival_time:   Ticks,
    /// Must be at least 1.
    pub burst_time:     Ticks,
    pub priority:       Priority,
}

/// A request for a contiguous chunk of `size` address units, to be
/// served in the order it appears in its workload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryRequest {
    pub id:     RequestId,
    pub size:   Ticks,
}
