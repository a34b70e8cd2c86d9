pub use std::{
    collections::{HashMap, HashSet, VecDeque},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    cmp::Ordering,
    hash::Hash,
    str::FromStr,
    fmt,
};
pub use thiserror::Error;
pub use itertools::Itertools;
pub use rayon::prelude::*;
pub use indexmap::IndexMap;
pub use clap::{Parser, Subcommand, ValueEnum};
pub use serde::Serialize;
pub use tracing::{debug, trace};

pub use crate::{MemoryRequest, Process,
    workload::*,
    analyze::*,
    algo::{
        cpu::{run_cpu_schedule, ExecutionBlock, ProcessMetrics, Schedule, Slot},
        memory::{run_memory_allocation, AllocationRecord, MemoryBlock, MemoryLayout, Outcome},
        paging::{run_page_replacement, HistoryStep, PagingOutcome},
        disk::{run_disk_schedule, HeadPath},
        compare_cpu,
        compare_memory,
        compare_paging,
        compare_disk,
    },
};

/// The unit for measuring everything: logical time, addresses, block
/// sizes and cylinder numbers alike. The engines never mix them up, so
/// one alias keeps the arithmetic free of conversions.
pub type Ticks = usize;

pub type ProcessId = u32;
pub type RequestId = u32;

/// Lower is more urgent.
pub type Priority = i64;

//---START ALGORITHM SELECTORS
// Shared by the library API and the command line.

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Debug)]
pub enum CpuAlgorithm {
    /// First come, first served
    Fcfs,
    /// Shortest job first (non-preemptive)
    Sjf,
    /// Shortest remaining time first (preemptive SJF)
    Srtf,
    /// Round robin with a fixed time quantum
    #[value(name = "rr", alias = "round-robin")]
    RoundRobin,
    /// Priority, non-preemptive
    Priority,
    /// Priority, preemptive
    #[value(name = "p-priority")]
    PreemptivePriority,
}

impl CpuAlgorithm {
    pub const ALL: [CpuAlgorithm; 6] = [
        CpuAlgorithm::Fcfs,
        CpuAlgorithm::Sjf,
        CpuAlgorithm::Srtf,
        CpuAlgorithm::RoundRobin,
        CpuAlgorithm::Priority,
        CpuAlgorithm::PreemptivePriority,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CpuAlgorithm::Fcfs                  => "FCFS",
            CpuAlgorithm::Sjf                   => "SJF",
            CpuAlgorithm::Srtf                  => "SRTF",
            CpuAlgorithm::RoundRobin            => "RR",
            CpuAlgorithm::Priority              => "Priority",
            CpuAlgorithm::PreemptivePriority    => "P-Priority",
        }
    }

    /// Whether the policy re-evaluates its choice after every tick.
    pub fn is_preemptive(&self) -> bool {
        matches!(self, CpuAlgorithm::Srtf | CpuAlgorithm::PreemptivePriority)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Debug)]
pub enum FitStrategy {
    /// First free block that is large enough
    First,
    /// Smallest free block that is large enough
    Best,
    /// Largest free block that is large enough
    Worst,
}

impl FitStrategy {
    pub const ALL: [FitStrategy; 3] = [FitStrategy::First, FitStrategy::Best, FitStrategy::Worst];

    pub fn label(&self) -> &'static str {
        match self {
            FitStrategy::First  => "FIRST",
            FitStrategy::Best   => "BEST",
            FitStrategy::Worst  => "WORST",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Debug)]
pub enum ReplacementPolicy {
    /// Evict the page that was loaded earliest
    Fifo,
    /// Evict the least recently referenced page
    Lru,
    /// Evict the page whose next use lies farthest ahead
    Optimal,
}

impl ReplacementPolicy {
    pub const ALL: [ReplacementPolicy; 3] = [
        ReplacementPolicy::Fifo,
        ReplacementPolicy::Lru,
        ReplacementPolicy::Optimal,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ReplacementPolicy::Fifo     => "FIFO",
            ReplacementPolicy::Lru      => "LRU",
            ReplacementPolicy::Optimal  => "Optimal",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Serialize, Debug)]
pub enum DiskAlgorithm {
    /// Serve requests in arrival order
    Fcfs,
    /// Elevator: sweep up to the last cylinder, then back down
    Scan,
    /// Circular elevator: sweep up, wrap around to 0, sweep up again
    #[value(name = "c-scan")]
    CScan,
}

impl DiskAlgorithm {
    pub const ALL: [DiskAlgorithm; 3] = [DiskAlgorithm::Fcfs, DiskAlgorithm::Scan, DiskAlgorithm::CScan];

    pub fn label(&self) -> &'static str {
        match self {
            DiskAlgorithm::Fcfs     => "FCFS",
            DiskAlgorithm::Scan     => "SCAN",
            DiskAlgorithm::CScan    => "C-SCAN",
        }
    }
}

macro_rules! display_by_label {
    ($($t:ty),*) => {
        $(impl fmt::Display for $t {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_by_label!(CpuAlgorithm, FitStrategy, ReplacementPolicy, DiskAlgorithm);
//---END ALGORITHM SELECTORS

//---START ERRORS
#[derive(Error, Debug)]
#[error("{message}\n{:?}", culprit)]
/// Appears while checking the processes handed to the CPU scheduler.
pub struct ProcessError {
    pub message: String,
    pub culprit: Process,
}

/// Everything that makes a configuration unusable. Raised before any
/// simulation starts; an engine that got going always finishes.
#[derive(Error, Debug)]
pub enum SimError {
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error("Round robin needs a time quantum")]
    MissingQuantum,
    #[error("Time quantum must be at least 1")]
    ZeroQuantum,
    #[error("Total memory must be at least 1")]
    ZeroMemory,
    #[error("Memory request {id} asks for 0 units")]
    ZeroSizeRequest { id: RequestId },
    #[error("At least one page frame is needed")]
    ZeroFrames,
    #[error("The disk must have at least one cylinder")]
    ZeroCylinders,
    #[error("Head position {head} is outside [0, {max})")]
    HeadOutOfRange { head: Ticks, max: Ticks },
    #[error("Requested cylinder {cylinder} is outside [0, {max})")]
    CylinderOutOfRange { cylinder: Ticks, max: Ticks },
}

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("line {line}: expected {expected} columns, found {found}")]
    Columns { line: usize, expected: usize, found: usize },
    #[error("line {line}: bad {field} `{raw}` ({reason})")]
    Field { line: usize, field: &'static str, raw: String, reason: String },
    #[error("entry {index}: bad value `{raw}` ({reason})")]
    Entry { index: usize, raw: String, reason: String },
}
//---END ERRORS

//---START EXTERNAL INTERFACES
// The types listed below read workloads from files. To support another
// format, implement `WorkloadGen` for it.

/// Defines the interface for reading workloads.
pub trait WorkloadGen<T> {
    type Item;

    fn new(path: PathBuf) -> Self;
    /// Either the whole workload is read, or some arbitrary type that
    /// implements [std::error::Error] explains why not.
    fn read_items(&self) -> Result<Vec<Self::Item>, Box<dyn std::error::Error>>;
    /// Turns one decoded record into a workload item.
    fn gen_single(&self, d: T) -> Self::Item;
}

/// Reads the data rows of a header-prefixed CSV file. Blank lines are
/// skipped. Each row is returned with its 1-based line number.
fn read_csv_rows(
    path:       &Path,
    columns:    usize,
) -> Result<Vec<(usize, Vec<String>)>, Box<dyn std::error::Error>> {
    let fd = std::fs::File::open(path)?;
    let reader = BufReader::new(fd);
    let mut res = vec![];
    for (idx, line) in reader.lines()
        .enumerate()
        // First line is the header!
        .skip(1) {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let cells: Vec<String> = line.split(',')
            .map(|c| c.trim().to_string())
            .collect();
        if cells.len() < columns {
            return Err(Box::new(ParseError::Columns {
                line:       idx + 1,
                expected:   columns,
                found:      cells.len(),
            }));
        }
        res.push((idx + 1, cells));
    }

    Ok(res)
}

fn parse_field<T>(raw: &str, line: usize, field: &'static str) -> Result<T, ParseError>
where T: FromStr, T::Err: fmt::Display {
    raw.parse::<T>()
        .map_err(|e| ParseError::Field {
            line,
            field,
            raw:    raw.to_string(),
            reason: e.to_string(),
        })
}

/// Process tables: `id,arrival,burst,priority`, one header line.
pub struct ProcessCSVParser {
    pub path: PathBuf,
}

pub const PROCESS_FIELDS_NUM: usize = 4;

/// One decoded row: id, arrival, burst, priority.
pub type ProcessRecord = (ProcessId, Ticks, Ticks, Priority);

impl WorkloadGen<ProcessRecord> for ProcessCSVParser {
    type Item = Process;

    fn new(path: PathBuf) -> Self {
        Self {
            path
        }
    }

    fn read_items(&self) -> Result<Vec<Process>, Box<dyn std::error::Error>> {
        let mut res = vec![];
        for (line, cells) in read_csv_rows(&self.path, PROCESS_FIELDS_NUM)? {
            let record = (
                parse_field(&cells[0], line, "id")?,
                parse_field(&cells[1], line, "arrival")?,
                parse_field(&cells[2], line, "burst")?,
                parse_field(&cells[3], line, "priority")?,
            );
            res.push(self.gen_single(record));
        }

        Ok(res)
    }

    fn gen_single(&self, (id, arrival, burst, priority): ProcessRecord) -> Process {
        Process::new(id, arrival, burst, priority)
    }
}

/// Memory request lists: `id,size`, one header line.
pub struct RequestCSVParser {
    pub path: PathBuf,
}

pub const REQUEST_FIELDS_NUM: usize = 2;

/// One decoded row: id, size.
pub type RequestRecord = (RequestId, Ticks);

impl WorkloadGen<RequestRecord> for RequestCSVParser {
    type Item = MemoryRequest;

    fn new(path: PathBuf) -> Self {
        Self {
            path
        }
    }

    fn read_items(&self) -> Result<Vec<MemoryRequest>, Box<dyn std::error::Error>> {
        let mut res = vec![];
        for (line, cells) in read_csv_rows(&self.path, REQUEST_FIELDS_NUM)? {
            let record = (
                parse_field(&cells[0], line, "id")?,
                parse_field(&cells[1], line, "size")?,
            );
            res.push(self.gen_single(record));
        }

        Ok(res)
    }

    fn gen_single(&self, (id, size): RequestRecord) -> MemoryRequest {
        MemoryRequest::new(id, size)
    }
}

pub fn read_from_path<T, B>(file_path: PathBuf) -> Result<Vec<T::Item>, Box<dyn std::error::Error>>
where T: WorkloadGen<B> {
    let parser = T::new(file_path);

    parser.read_items()
}

/// Parses a comma-separated list such as `"82, 170, 43"`. Whitespace
/// around entries is trimmed and empty entries are dropped.
pub fn parse_list<T>(raw: &str) -> Result<Vec<T>, ParseError>
where T: FromStr, T::Err: fmt::Display {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(idx, tok)| {
            tok.parse::<T>()
                .map_err(|e| ParseError::Entry {
                    index:  idx + 1,
                    raw:    tok.to_string(),
                    reason: e.to_string(),
                })
        })
        .collect()
}
//---END EXTERNAL INTERFACES

/// Installs the global `tracing` subscriber used by the binaries.
/// `RUST_LOG` wins over `verbose` when set.
pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback));
    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_err() {
        eprintln!("WARNING: logging was already initialized!");
    }
}
