use crate::helpe::*;

/// A piece of the linear address space `[start, start + size)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryBlock {
    pub start:      Ticks,
    pub size:       Ticks,
    pub allocated:  bool,
    pub owner:      Option<RequestId>,
}

impl MemoryBlock {
    #[inline(always)]
    pub fn free(start: Ticks, size: Ticks) -> Self {
        Self {
            start,
            size,
            allocated:  false,
            owner:      None,
        }
    }

    #[inline(always)]
    pub fn end(&self) -> Ticks {
        self.start + self.size
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    /// The request now owns the block starting at `start`.
    Placed { start: Ticks },
    /// No free block was large enough. Nothing changed.
    Failed,
}

/// What happened to one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AllocationRecord {
    pub request:    RequestId,
    pub size:       Ticks,
    pub strategy:   FitStrategy,
    pub outcome:    Outcome,
}

impl AllocationRecord {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Placed { .. })
    }
}

impl fmt::Display for AllocationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Outcome::Placed { start }   => write!(
                f,
                "OK: request {} ({}u) placed at {start} via {} fit",
                self.request, self.size, self.strategy,
            ),
            Outcome::Failed             => write!(
                f,
                "FAIL: request {} ({}u): insufficient contiguous space",
                self.request, self.size,
            ),
        }
    }
}

/// The final partition of `[0, total_memory)` plus the per-request log.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryLayout {
    pub strategy:       FitStrategy,
    pub total_memory:   Ticks,
    pub blocks:         Vec<MemoryBlock>,
    pub log:            Vec<AllocationRecord>,
}

impl MemoryLayout {
    pub fn allocated_total(&self) -> Ticks {
        self.blocks.iter()
            .filter(|b| b.allocated)
            .map(|b| b.size)
            .sum()
    }

    pub fn free_total(&self) -> Ticks {
        self.total_memory - self.allocated_total()
    }

    pub fn largest_free(&self) -> Ticks {
        self.blocks.iter()
            .filter(|b| !b.allocated)
            .map(|b| b.size)
            .max()
            .unwrap_or(0)
    }

    /// `1 - largest_free / free_total`: 0 when all free space is one
    /// block (or there is none), approaching 1 as it shatters.
    pub fn external_fragmentation(&self) -> f64 {
        match self.free_total() {
            0       => 0.0,
            free    => 1.0 - self.largest_free() as f64 / free as f64,
        }
    }

    pub fn failures(&self) -> usize {
        self.log.iter()
            .filter(|r| !r.is_ok())
            .count()
    }
}

impl fmt::Display for MemoryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Strategy:\t{} fit", self.strategy)?;
        for b in &self.blocks {
            match b.owner {
                Some(id)    => writeln!(f, "[{:>6}, {:>6})\tR{id}", b.start, b.end())?,
                None        => writeln!(f, "[{:>6}, {:>6})\tfree", b.start, b.end())?,
            }
        }
        for rec in &self.log {
            writeln!(f, "{rec}")?;
        }
        write!(
            f,
            "Allocated:\t{} / {}\nExternal fragmentation:\t{:.2}%",
            self.allocated_total(),
            self.total_memory,
            self.external_fragmentation() * 100.0,
        )
    }
}

/// Serves `requests` in list order out of a `total_memory`-sized address
/// space that starts out as one free block.
///
/// A hit splits the chosen block into an allocated head of exactly the
/// requested size and, if anything is left, a free tail right after it.
/// A miss is logged and leaves the partition alone. Free neighbours are
/// never merged: nothing is ever released during a run.
pub fn run_memory_allocation(
    total_memory:   Ticks,
    requests:       &[MemoryRequest],
    strategy:       FitStrategy,
) -> Result<MemoryLayout, SimError> {
    check_memory(total_memory, requests)?;
    debug!(%strategy, total_memory, requests = requests.len(), "Memory allocation started");

    let mut blocks = vec![MemoryBlock::free(0, total_memory)];
    let mut log = Vec::with_capacity(requests.len());
    for req in requests {
        let outcome = match find_block(&blocks, req.size, strategy) {
            Some(idx) => {
                let target = blocks[idx];
                blocks[idx] = MemoryBlock {
                    start:      target.start,
                    size:       req.size,
                    allocated:  true,
                    owner:      Some(req.id),
                };
                if target.size > req.size {
                    blocks.insert(idx + 1, MemoryBlock::free(
                        target.start + req.size,
                        target.size - req.size,
                    ));
                }
                debug_assert!(partition_is_valid(&blocks, total_memory), "Partition broken by split");

                Outcome::Placed { start: target.start }
            },
            None => Outcome::Failed,
        };
        let rec = AllocationRecord {
            request: req.id,
            size: req.size,
            strategy,
            outcome,
        };
        trace!("{rec}");
        log.push(rec);
    }

    Ok(MemoryLayout {
        strategy,
        total_memory,
        blocks,
        log,
    })
}

/// Index of the free block that `strategy` picks for `size` units.
/// Blocks are scanned in address order; on equal sizes the first one
/// found wins.
fn find_block(blocks: &[MemoryBlock], size: Ticks, strategy: FitStrategy) -> Option<usize> {
    let mut candidates = blocks.iter()
        .enumerate()
        .filter(|(_, b)| !b.allocated && b.size >= size);

    let found = match strategy {
        FitStrategy::First  => candidates.next(),
        FitStrategy::Best   => candidates.reduce(|best, cand| {
            if cand.1.size < best.1.size { cand } else { best }
        }),
        FitStrategy::Worst  => candidates.reduce(|best, cand| {
            if cand.1.size > best.1.size { cand } else { best }
        }),
    };

    found.map(|(idx, _)| idx)
}
