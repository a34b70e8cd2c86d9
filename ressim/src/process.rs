use crate::helpe::*;

impl Process {
    pub fn new(
        id:             ProcessId,
        arrival_time:   Ticks,
        burst_time:     Ticks,
        priority:       Priority,
    ) -> Self {
        Self {
            id,
            arrival_time,
            burst_time,
            priority,
        }
    }

    /// Returns `true` if the process is in the system at moment `t`.
    /// A process arriving exactly at `t` counts as arrived.
    #[inline(always)]
    pub fn has_arrived_by(&self, t: Ticks) -> bool {
        self.arrival_time <= t
    }

    /// Derives the metrics of a process that ran to completion at
    /// moment `completion`.
    ///
    /// A completion earlier than `arrival + burst` is impossible for a
    /// correct scheduler, and would underflow here.
    #[inline(always)]
    pub fn metrics_at(&self, completion: Ticks) -> ProcessMetrics {
        debug_assert!(completion >= self.arrival_time + self.burst_time, "Finished too early!");
        let turnaround_time = completion - self.arrival_time;

        ProcessMetrics {
            completion_time:    completion,
            turnaround_time,
            waiting_time:       turnaround_time - self.burst_time,
        }
    }
}

impl MemoryRequest {
    pub fn new(id: RequestId, size: Ticks) -> Self {
        Self {
            id,
            size,
        }
    }
}
