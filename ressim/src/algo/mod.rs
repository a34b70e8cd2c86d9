pub mod cpu;
pub mod memory;
pub mod paging;
pub mod disk;

use crate::helpe::*;

// Every variant of an engine gets its own call on its own copy of the
// input, so the runs are independent and can go to rayon's pool. An
// indexed `par_iter` collects in order, which keeps the output in the
// canonical `ALL` order regardless of which run finishes first.

/// Runs all six CPU policies on the same workload. `quantum` is handed
/// to every run, and is required because Round Robin is among them.
pub fn compare_cpu(
    processes:  &[Process],
    quantum:    Option<Ticks>,
) -> Result<Vec<(CpuAlgorithm, Schedule)>, SimError> {
    CpuAlgorithm::ALL
        .par_iter()
        .map(|&algo| run_cpu_schedule(processes, algo, quantum).map(|s| (algo, s)))
        .collect()
}

pub fn compare_memory(
    total_memory:   Ticks,
    requests:       &[MemoryRequest],
) -> Result<Vec<(FitStrategy, MemoryLayout)>, SimError> {
    FitStrategy::ALL
        .par_iter()
        .map(|&fit| run_memory_allocation(total_memory, requests, fit).map(|l| (fit, l)))
        .collect()
}

/// FIFO, LRU and Optimal on one reference stream.
pub fn compare_paging<P>(
    frames_count:   usize,
    references:     &[P],
) -> Result<Vec<(ReplacementPolicy, PagingOutcome<P>)>, SimError>
where P: Clone + Eq + Hash + Send + Sync {
    ReplacementPolicy::ALL
        .par_iter()
        .map(|&policy| run_page_replacement(frames_count, references, policy).map(|o| (policy, o)))
        .collect()
}

pub fn compare_disk(
    initial:        Ticks,
    requests:       &[Ticks],
    max_cylinders:  Ticks,
) -> Result<Vec<(DiskAlgorithm, HeadPath)>, SimError> {
    DiskAlgorithm::ALL
        .par_iter()
        .map(|&algo| run_disk_schedule(initial, requests, max_cylinders, algo).map(|h| (algo, h)))
        .collect()
}
