use crate::helpe::*;
use rand::Rng;

/// Checks a set of processes before it reaches the CPU scheduler.
/// A successfully checked set is guaranteed to be compliant with all
/// of the scheduler's assumptions. These are:
/// - no process has a zero burst
/// - no two processes share an id
///
/// Arrival times need no checking, [Ticks] cannot go negative.
pub fn check_processes(processes: &[Process]) -> Result<(), ProcessError> {
    let mut seen: HashSet<ProcessId> = HashSet::with_capacity(processes.len());
    for p in processes {
        if p.burst_time == 0 {
            return Err(ProcessError {
                message: String::from("Process with 0 burst found!"),
                culprit: p.clone(),
            });
        } else if !seen.insert(p.id) {
            return Err(ProcessError {
                message: String::from("Duplicate process id found!"),
                culprit: p.clone(),
            });
        }
    }

    Ok(())
}

/// Round robin cannot run without a positive quantum.
pub fn check_quantum(quantum: Option<Ticks>) -> Result<Ticks, SimError> {
    match quantum {
        None    => Err(SimError::MissingQuantum),
        Some(0) => Err(SimError::ZeroQuantum),
        Some(q) => Ok(q),
    }
}

pub fn check_memory(total_memory: Ticks, requests: &[MemoryRequest]) -> Result<(), SimError> {
    if total_memory == 0 {
        return Err(SimError::ZeroMemory);
    }
    if let Some(r) = requests.iter().find(|r| r.size == 0) {
        return Err(SimError::ZeroSizeRequest { id: r.id });
    }

    Ok(())
}

pub fn check_frames(frames_count: usize) -> Result<(), SimError> {
    if frames_count == 0 {
        Err(SimError::ZeroFrames)
    } else { Ok(()) }
}

/// The head and every request must lie within `[0, max_cylinders)`.
pub fn check_disk(
    head:           Ticks,
    requests:       &[Ticks],
    max_cylinders:  Ticks,
) -> Result<(), SimError> {
    if max_cylinders == 0 {
        return Err(SimError::ZeroCylinders);
    }
    if head >= max_cylinders {
        return Err(SimError::HeadOutOfRange { head, max: max_cylinders });
    }
    if let Some(&cylinder) = requests.iter().find(|&&c| c >= max_cylinders) {
        return Err(SimError::CylinderOutOfRange { cylinder, max: max_cylinders });
    }

    Ok(())
}

//---START RANDOM WORKLOADS
// Used by `compare` when no input file is given. Callers seed the
// generator, so the same seed always yields the same workload.

/// `count` processes with ids `1..=count`, arrivals spread over twice as
/// many ticks as there are processes, bursts in `1..=10`, priorities in
/// `0..=5`.
pub fn random_processes<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Process> {
    (0..count)
        .map(|i| Process::new(
            i as ProcessId + 1,
            rng.gen_range(0..=2 * count),
            rng.gen_range(1..=10),
            rng.gen_range(0..=5),
        ))
        .collect()
}

/// `count` requests with ids `1..=count`, each at most a quarter of
/// `total_memory` (and at least 1).
pub fn random_requests<R: Rng + ?Sized>(
    rng:            &mut R,
    count:          usize,
    total_memory:   Ticks,
) -> Vec<MemoryRequest> {
    let max_size = (total_memory / 4).max(1);
    (0..count)
        .map(|i| MemoryRequest::new(i as RequestId + 1, rng.gen_range(1..=max_size)))
        .collect()
}
//---END RANDOM WORKLOADS
