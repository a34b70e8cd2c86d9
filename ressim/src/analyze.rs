//! Checks on finished runs. The engines `debug_assert!` these after
//! every run, and the tests lean on them for their properties.

use crate::helpe::*;

/// Returns `true` if the timeline starts at 0, has no gaps, holds no
/// empty blocks and never shows the same slot twice in a row.
pub fn timeline_is_valid(timeline: &[ExecutionBlock]) -> bool {
    if let Some(first) = timeline.first() {
        if first.start != 0 { return false; }
    }
    if timeline.iter().any(|b| b.end <= b.start) { return false; }

    timeline.iter()
        .tuple_windows()
        .all(|(a, b)| a.end == b.start && a.slot != b.slot)
}

/// Cross-checks a [Schedule] against the processes it was built from:
///
/// - every process completed exactly once, and nothing else did
/// - turnaround = completion - arrival, waiting = turnaround - burst
/// - each process held the processor for exactly its burst, never
///   before its arrival, and finished in its last block
/// - the clock stopped at the last completion
pub fn metrics_are_consistent(processes: &[Process], schedule: &Schedule) -> bool {
    if schedule.metrics.len() != processes.len() { return false; }

    let mut served: HashMap<ProcessId, Ticks> = HashMap::with_capacity(processes.len());
    let mut last_end: HashMap<ProcessId, Ticks> = HashMap::with_capacity(processes.len());
    for b in &schedule.timeline {
        if let Slot::Process(id) = b.slot {
            *served.entry(id).or_insert(0) += b.duration();
            last_end.insert(id, b.end);
        }
    }

    let all_ok = processes.iter().all(|p| {
        let Some(m) = schedule.metrics.get(&p.id) else { return false; };
        let first_start = schedule.timeline.iter()
            .find(|b| b.slot == Slot::Process(p.id))
            .map(|b| b.start);

        m.completion_time >= p.arrival_time + p.burst_time
            && m.turnaround_time == m.completion_time - p.arrival_time
            && m.waiting_time + p.burst_time == m.turnaround_time
            && served.get(&p.id) == Some(&p.burst_time)
            && last_end.get(&p.id) == Some(&m.completion_time)
            && first_start.is_some_and(|s| s >= p.arrival_time)
    });
    let final_tick = schedule.metrics.values()
        .map(|m| m.completion_time)
        .max()
        .unwrap_or(0);

    all_ok && final_tick == schedule.total_time
}

/// Returns `true` if `blocks` tile `[0, total_memory)` exactly: in
/// address order, no gaps, no overlaps, no empty blocks, and owners on
/// allocated blocks only.
pub fn partition_is_valid(blocks: &[MemoryBlock], total_memory: Ticks) -> bool {
    let mut cursor = 0;
    for b in blocks {
        if b.start != cursor || b.size == 0 || b.allocated != b.owner.is_some() {
            return false;
        }
        cursor = b.end();
    }

    cursor == total_memory
}

/// Returns `true` if the run has one step per reference, each step has
/// all frames, the referenced page is resident after its step, and the
/// fault tally adds up.
pub fn history_is_complete<P: PartialEq>(
    references:     &[P],
    frames_count:   usize,
    outcome:        &PagingOutcome<P>,
) -> bool {
    outcome.history.len() == references.len()
        && outcome.history.iter()
            .zip(references)
            .all(|(step, page)| {
                step.frames.len() == frames_count && step.frames.iter().any(|f| f.as_ref() == Some(page))
            })
        && outcome.history.iter().filter(|s| s.is_fault).count() == outcome.fault_count
}

/// Sum of absolute distances between consecutive stops.
#[inline(always)]
pub fn path_cost(path: &[Ticks]) -> Ticks {
    path.iter()
        .tuple_windows()
        .map(|(a, b)| a.abs_diff(*b))
        .sum()
}
