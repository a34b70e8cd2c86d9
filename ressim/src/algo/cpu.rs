use crate::helpe::*;

/// Who holds the processor during an [ExecutionBlock].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Slot {
    Idle,
    Process(ProcessId),
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Idle          => f.write_str("IDLE"),
            Slot::Process(id)   => write!(f, "P{id}"),
        }
    }
}

/// One Gantt-chart bar: `slot` held the processor over `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutionBlock {
    pub slot:   Slot,
    pub start:  Ticks,
    pub end:    Ticks,
}

impl ExecutionBlock {
    #[inline(always)]
    pub fn duration(&self) -> Ticks {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProcessMetrics {
    pub completion_time:    Ticks,
    pub turnaround_time:    Ticks,
    pub waiting_time:       Ticks,
}

/// Everything a CPU scheduling run produces.
#[derive(Debug, Clone, Serialize)]
pub struct Schedule {
    pub algorithm:      CpuAlgorithm,
    pub timeline:       Vec<ExecutionBlock>,
    /// Keyed by process id, iterated in order of completion.
    pub metrics:        IndexMap<ProcessId, ProcessMetrics>,
    pub avg_waiting:    f64,
    pub avg_turnaround: f64,
    pub total_time:     Ticks,
}

impl Schedule {
    fn new(
        algorithm:  CpuAlgorithm,
        timeline:   Vec<ExecutionBlock>,
        metrics:    IndexMap<ProcessId, ProcessMetrics>,
        total_time: Ticks,
    ) -> Self {
        let (avg_waiting, avg_turnaround) = if metrics.is_empty() {
            (0.0, 0.0)
        } else {
            let n = metrics.len() as f64;
            let (wt, tat) = metrics.values()
                .fold((0, 0), |(wt, tat), m| (wt + m.waiting_time, tat + m.turnaround_time));

            (wt as f64 / n, tat as f64 / n)
        };

        Self {
            algorithm,
            timeline,
            metrics,
            avg_waiting,
            avg_turnaround,
            total_time,
        }
    }

    /// Ticks during which some process held the processor.
    pub fn busy_time(&self) -> Ticks {
        self.timeline.iter()
            .filter(|b| b.slot != Slot::Idle)
            .map(ExecutionBlock::duration)
            .sum()
    }

    /// How many times the processor switched from one process to another.
    /// Idle gaps do not count.
    pub fn context_switches(&self) -> usize {
        self.timeline.iter()
            .filter(|b| b.slot != Slot::Idle)
            .tuple_windows()
            .filter(|(a, b)| a.slot != b.slot)
            .count()
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Algorithm:\t{}", self.algorithm)?;
        let bars = self.timeline.iter()
            .map(|b| format!("{}[{}-{}]", b.slot, b.start, b.end))
            .join(" ");
        writeln!(f, "Timeline:\t{bars}")?;
        writeln!(f, "PID\tCT\tTAT\tWT")?;
        for (id, m) in self.metrics.iter().sorted_by_key(|(id, _)| **id) {
            writeln!(f, "P{id}\t{}\t{}\t{}", m.completion_time, m.turnaround_time, m.waiting_time)?;
        }
        writeln!(f, "Avg. waiting:\t{:.2}", self.avg_waiting)?;
        writeln!(f, "Avg. turnaround:\t{:.2}", self.avg_turnaround)?;
        write!(f, "Total time:\t{}", self.total_time)
    }
}

/// The scheduler's private, mutable view of a [Process].
struct Runnable<'a> {
    descr:      &'a Process,
    remaining:  Ticks,
}

impl<'a> Runnable<'a> {
    fn new(descr: &'a Process) -> Self {
        Self {
            descr,
            remaining: descr.burst_time,
        }
    }

    #[inline(always)]
    fn is_ready_at(&self, t: Ticks) -> bool {
        self.remaining > 0 && self.descr.has_arrived_by(t)
    }
}

/// Ranks two ready processes. `Less` means the first one should run.
type Comparator = fn(&Runnable, &Runnable) -> Ordering;

fn by_arrival_then_id(a: &Runnable, b: &Runnable) -> Ordering {
    a.descr.arrival_time.cmp(&b.descr.arrival_time)
        .then(a.descr.id.cmp(&b.descr.id))
}

fn by_burst_then_arrival(a: &Runnable, b: &Runnable) -> Ordering {
    a.descr.burst_time.cmp(&b.descr.burst_time)
        .then(a.descr.arrival_time.cmp(&b.descr.arrival_time))
}

fn by_remaining(a: &Runnable, b: &Runnable) -> Ordering {
    a.remaining.cmp(&b.remaining)
}

fn by_priority_then_arrival(a: &Runnable, b: &Runnable) -> Ordering {
    a.descr.priority.cmp(&b.descr.priority)
        .then(a.descr.arrival_time.cmp(&b.descr.arrival_time))
}

/// Appends `[start, end)` to the timeline, stretching the last block
/// instead if it belongs to the same slot and ends at `start`.
#[inline(always)]
fn push_block(timeline: &mut Vec<ExecutionBlock>, slot: Slot, start: Ticks, end: Ticks) {
    debug_assert!(end > start, "Empty block requested");
    if let Some(last) = timeline.last_mut() {
        if last.slot == slot && last.end == start {
            last.end = end;
            return;
        }
    }
    timeline.push(ExecutionBlock { slot, start, end });
}

/// Computes the execution timeline and per-process metrics of
/// `processes` under `algorithm`.
///
/// `quantum` is only consulted (and then required) by Round Robin.
/// An empty process set yields an all-zero [Schedule].
pub fn run_cpu_schedule(
    processes:  &[Process],
    algorithm:  CpuAlgorithm,
    quantum:    Option<Ticks>,
) -> Result<Schedule, SimError> {
    let quantum = if let CpuAlgorithm::RoundRobin = algorithm {
        Some(check_quantum(quantum)?)
    } else { None };
    check_processes(processes)?;
    debug!(%algorithm, processes = processes.len(), ?quantum, "CPU scheduling started");

    let preemptive = algorithm.is_preemptive();
    let (timeline, metrics, total_time) = match (algorithm, quantum) {
        (CpuAlgorithm::RoundRobin, Some(q)) => round_robin(processes, q),
        (CpuAlgorithm::RoundRobin, None)    => return Err(SimError::MissingQuantum),
        (CpuAlgorithm::Fcfs, _)             => select_and_run(processes, by_arrival_then_id, preemptive),
        (CpuAlgorithm::Sjf, _)              => select_and_run(processes, by_burst_then_arrival, preemptive),
        (CpuAlgorithm::Srtf, _)             => select_and_run(processes, by_remaining, preemptive),
        (CpuAlgorithm::Priority, _)
        | (CpuAlgorithm::PreemptivePriority, _)
                                            => select_and_run(processes, by_priority_then_arrival, preemptive),
    };
    let res = Schedule::new(algorithm, timeline, metrics, total_time);
    debug_assert!(timeline_is_valid(&res.timeline), "Bad timeline built");
    debug_assert!(metrics_are_consistent(processes, &res), "Bad metrics derived");
    debug!(%algorithm, total_time, avg_waiting = res.avg_waiting, "CPU scheduling finished");

    Ok(res)
}

/// The skeleton shared by every policy but Round Robin.
///
/// At each decision point the ready processes are scanned left to right
/// in input order, and a candidate replaces the current pick only if
/// `better` ranks it strictly ahead. Full ties therefore go to whoever
/// was seen first.
///
/// Non-preemptive policies run their pick to completion. Preemptive ones
/// run it for a single tick and decide again.
fn select_and_run(
    processes:  &[Process],
    better:     Comparator,
    preemptive: bool,
) -> (Vec<ExecutionBlock>, IndexMap<ProcessId, ProcessMetrics>, Ticks) {
    let mut pool: Vec<Runnable> = processes.iter()
        .map(Runnable::new)
        .collect();
    let mut timeline = vec![];
    let mut metrics = IndexMap::with_capacity(pool.len());
    let mut clock = 0;

    while metrics.len() < pool.len() {
        let mut pick: Option<usize> = None;
        for (idx, cand) in pool.iter().enumerate() {
            if !cand.is_ready_at(clock) { continue; }
            match pick {
                Some(best) if !better(cand, &pool[best]).is_lt() => {},
                _ => { pick = Some(idx); }
            }
        }

        let Some(idx) = pick else {
            // Nobody is ready: everyone unfinished arrives later.
            let Some(next) = pool.iter()
                .filter(|r| r.remaining > 0)
                .map(|r| r.descr.arrival_time)
                .min() else { break; };
            push_block(&mut timeline, Slot::Idle, clock, next);
            clock = next;
            continue;
        };

        let running = &mut pool[idx];
        let slice = if preemptive { 1 } else { running.remaining };
        push_block(&mut timeline, Slot::Process(running.descr.id), clock, clock + slice);
        trace!(pid = running.descr.id, start = clock, slice, "dispatch");
        clock += slice;
        running.remaining -= slice;
        if running.remaining == 0 {
            metrics.insert(running.descr.id, running.descr.metrics_at(clock));
        }
    }

    (timeline, metrics, clock)
}

/// Round Robin over a FIFO ready queue. Processes that arrive while a
/// slice runs (or exactly when it ends) are queued ahead of the process
/// being preempted.
fn round_robin(
    processes:  &[Process],
    quantum:    Ticks,
) -> (Vec<ExecutionBlock>, IndexMap<ProcessId, ProcessMetrics>, Ticks) {
    let mut arrivals: VecDeque<Runnable> = processes.iter()
        .sorted_by(|a, b| a.arrival_time.cmp(&b.arrival_time).then(a.id.cmp(&b.id)))
        .map(Runnable::new)
        .collect();
    let mut ready: VecDeque<Runnable> = VecDeque::with_capacity(arrivals.len());
    let mut timeline = vec![];
    let mut metrics = IndexMap::with_capacity(arrivals.len());
    let mut clock = 0;

    fn admit<'a>(arrivals: &mut VecDeque<Runnable<'a>>, ready: &mut VecDeque<Runnable<'a>>, t: Ticks) {
        while arrivals.front().is_some_and(|r| r.descr.has_arrived_by(t)) {
            ready.extend(arrivals.pop_front());
        }
    }

    loop {
        admit(&mut arrivals, &mut ready, clock);
        let Some(mut running) = ready.pop_front() else {
            match arrivals.front() {
                Some(next) => {
                    let next = next.descr.arrival_time;
                    push_block(&mut timeline, Slot::Idle, clock, next);
                    clock = next;
                    continue;
                },
                None => { break; }
            }
        };

        let slice = running.remaining.min(quantum);
        push_block(&mut timeline, Slot::Process(running.descr.id), clock, clock + slice);
        trace!(pid = running.descr.id, start = clock, slice, "dispatch");
        clock += slice;
        running.remaining -= slice;
        // Newcomers first, then the preempted process.
        admit(&mut arrivals, &mut ready, clock);
        if running.remaining > 0 {
            ready.push_back(running);
        } else {
            metrics.insert(running.descr.id, running.descr.metrics_at(clock));
        }
    }

    (timeline, metrics, clock)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(id: ProcessId, arrival: Ticks, burst: Ticks, priority: Priority) -> Process {
        Process::new(id, arrival, burst, priority)
    }

    fn bars(s: &Schedule) -> Vec<(Slot, Ticks, Ticks)> {
        s.timeline.iter().map(|b| (b.slot, b.start, b.end)).collect()
    }

    fn classic() -> Vec<Process> {
        vec![p(1, 0, 7, 0), p(2, 2, 4, 0), p(3, 4, 1, 0), p(4, 5, 4, 0)]
    }

    #[test]
    fn fcfs_runs_in_arrival_order() {
        let s = run_cpu_schedule(&[p(1, 0, 5, 0), p(2, 1, 3, 0)], CpuAlgorithm::Fcfs, None).unwrap();
        assert_eq!(bars(&s), vec![(Slot::Process(1), 0, 5), (Slot::Process(2), 5, 8)]);
        assert_eq!(s.metrics[&1u32].waiting_time, 0);
        assert_eq!(s.metrics[&2u32].waiting_time, 4);
        assert_eq!(s.total_time, 8);
    }

    #[test]
    fn fcfs_breaks_arrival_ties_by_id() {
        let s = run_cpu_schedule(&[p(5, 0, 1, 0), p(2, 0, 1, 0)], CpuAlgorithm::Fcfs, None).unwrap();
        assert_eq!(bars(&s), vec![(Slot::Process(2), 0, 1), (Slot::Process(5), 1, 2)]);
    }

    #[test]
    fn idle_gap_jumps_to_next_arrival() {
        let s = run_cpu_schedule(&[p(1, 2, 3, 0), p(2, 9, 1, 0)], CpuAlgorithm::Fcfs, None).unwrap();
        assert_eq!(bars(&s), vec![
            (Slot::Idle, 0, 2),
            (Slot::Process(1), 2, 5),
            (Slot::Idle, 5, 9),
            (Slot::Process(2), 9, 10),
        ]);
        assert_eq!(s.busy_time(), 4);
    }

    #[test]
    fn sjf_picks_shortest_burst_then_earliest_arrival() {
        let s = run_cpu_schedule(&classic(), CpuAlgorithm::Sjf, None).unwrap();
        assert_eq!(bars(&s), vec![
            (Slot::Process(1), 0, 7),
            (Slot::Process(3), 7, 8),
            (Slot::Process(2), 8, 12),
            (Slot::Process(4), 12, 16),
        ]);
        assert_eq!(s.avg_waiting, 4.0);
    }

    #[test]
    fn srtf_preempts_and_merges_unit_blocks() {
        let s = run_cpu_schedule(&classic(), CpuAlgorithm::Srtf, None).unwrap();
        assert_eq!(bars(&s), vec![
            (Slot::Process(1), 0, 2),
            (Slot::Process(2), 2, 4),
            (Slot::Process(3), 4, 5),
            (Slot::Process(2), 5, 7),
            (Slot::Process(4), 7, 11),
            (Slot::Process(1), 11, 16),
        ]);
        assert_eq!(s.metrics[&1u32].waiting_time, 9);
        assert_eq!(s.avg_waiting, 3.0);
        assert_eq!(s.context_switches(), 5);
    }

    #[test]
    fn srtf_ties_go_to_first_seen() {
        let s = run_cpu_schedule(&[p(1, 0, 3, 0), p(2, 1, 2, 0)], CpuAlgorithm::Srtf, None).unwrap();
        assert_eq!(bars(&s), vec![(Slot::Process(1), 0, 3), (Slot::Process(2), 3, 5)]);

        let s = run_cpu_schedule(&[p(2, 0, 2, 0), p(1, 0, 2, 0)], CpuAlgorithm::Srtf, None).unwrap();
        assert_eq!(bars(&s)[0], (Slot::Process(2), 0, 2));
    }

    #[test]
    fn round_robin_queues_newcomers_before_the_preempted() {
        let procs = [p(1, 0, 5, 0), p(2, 1, 3, 0), p(3, 2, 1, 0)];
        let s = run_cpu_schedule(&procs, CpuAlgorithm::RoundRobin, Some(2)).unwrap();
        assert_eq!(bars(&s), vec![
            (Slot::Process(1), 0, 2),
            (Slot::Process(2), 2, 4),
            (Slot::Process(3), 4, 5),
            (Slot::Process(1), 5, 7),
            (Slot::Process(2), 7, 8),
            (Slot::Process(1), 8, 9),
        ]);
        assert_eq!(s.metrics.keys().copied().collect::<Vec<_>>(), vec![3, 2, 1]);
        assert_eq!(s.metrics[&1u32].waiting_time, 4);
        assert_eq!(s.metrics[&2u32].waiting_time, 4);
        assert_eq!(s.metrics[&3u32].waiting_time, 2);
    }

    #[test]
    fn lone_round_robin_process_is_one_block() {
        let s = run_cpu_schedule(&[p(1, 0, 5, 0)], CpuAlgorithm::RoundRobin, Some(2)).unwrap();
        assert_eq!(bars(&s), vec![(Slot::Process(1), 0, 5)]);
    }

    #[test]
    fn round_robin_idles_until_next_arrival() {
        let s = run_cpu_schedule(&[p(1, 3, 2, 0)], CpuAlgorithm::RoundRobin, Some(4)).unwrap();
        assert_eq!(bars(&s), vec![(Slot::Idle, 0, 3), (Slot::Process(1), 3, 5)]);
    }

    #[test]
    fn priority_variants() {
        let procs = [p(1, 0, 4, 3), p(2, 1, 3, 1), p(3, 2, 2, 2)];
        let s = run_cpu_schedule(&procs, CpuAlgorithm::Priority, None).unwrap();
        assert_eq!(bars(&s), vec![
            (Slot::Process(1), 0, 4),
            (Slot::Process(2), 4, 7),
            (Slot::Process(3), 7, 9),
        ]);

        let s = run_cpu_schedule(&procs, CpuAlgorithm::PreemptivePriority, None).unwrap();
        assert_eq!(bars(&s), vec![
            (Slot::Process(1), 0, 1),
            (Slot::Process(2), 1, 4),
            (Slot::Process(3), 4, 6),
            (Slot::Process(1), 6, 9),
        ]);
    }

    #[test]
    fn priority_ties_go_to_earliest_arrival() {
        let procs = [p(1, 2, 1, 1), p(2, 1, 1, 1), p(3, 0, 3, 0)];
        let s = run_cpu_schedule(&procs, CpuAlgorithm::Priority, None).unwrap();
        assert_eq!(bars(&s), vec![
            (Slot::Process(3), 0, 3),
            (Slot::Process(2), 3, 4),
            (Slot::Process(1), 4, 5),
        ]);
    }

    #[test]
    fn empty_workload_is_all_zeros() {
        for algo in CpuAlgorithm::ALL {
            let s = run_cpu_schedule(&[], algo, Some(1)).unwrap();
            assert!(s.timeline.is_empty());
            assert!(s.metrics.is_empty());
            assert_eq!(s.avg_waiting, 0.0);
            assert_eq!(s.avg_turnaround, 0.0);
            assert_eq!(s.total_time, 0);
        }
    }

    #[test]
    fn bad_configurations_are_rejected() {
        let procs = [p(1, 0, 1, 0)];
        assert!(matches!(run_cpu_schedule(&procs, CpuAlgorithm::RoundRobin, None), Err(SimError::MissingQuantum)));
        assert!(matches!(run_cpu_schedule(&procs, CpuAlgorithm::RoundRobin, Some(0)), Err(SimError::ZeroQuantum)));
        assert!(matches!(run_cpu_schedule(&[p(1, 0, 0, 0)], CpuAlgorithm::Fcfs, None), Err(SimError::Process(_))));
        // Quantum is irrelevant outside Round Robin.
        assert!(run_cpu_schedule(&procs, CpuAlgorithm::Sjf, Some(0)).is_ok());
    }
}
