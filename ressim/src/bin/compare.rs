use ressim::*;
use rand::{rngs::StdRng, SeedableRng};
use tracing::info;

/// Runs every variant of one engine on the same workload, side by side
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    engine:     Engine,

    /// Print the results as JSON instead of a table
    #[arg(long, global = true, default_value_t = false)]
    json:       bool,

    /// Log every decision the engines take
    #[arg(short, long, global = true, default_value_t = false)]
    verbose:    bool,
}

#[derive(Subcommand, Debug)]
enum Engine {
    /// All six CPU scheduling policies
    Cpu {
        /// CSV file with `id,arrival,burst,priority` rows (header first)
        #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
        #[arg(required_unless_present = "random")]
        input:      Option<PathBuf>,

        /// Time quantum given to Round Robin
        #[arg(short, long, default_value_t = 2)]
        #[arg(value_parser = clap::value_parser!(Ticks))]
        quantum:    Ticks,

        /// Generate this many random processes instead of reading a file
        #[arg(long, conflicts_with = "input")]
        random:     Option<usize>,

        /// Seed for `--random`
        #[arg(short, long, default_value_t = 42)]
        seed:       u64,
    },
    /// First, best and worst fit
    Memory {
        /// Size of the address space
        #[arg(short, long)]
        #[arg(value_parser = clap::value_parser!(Ticks))]
        total:      Ticks,

        /// CSV file with `id,size` rows (header first)
        #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
        #[arg(required_unless_present = "random")]
        input:      Option<PathBuf>,

        /// Generate this many random requests instead of reading a file
        #[arg(long, conflicts_with = "input")]
        random:     Option<usize>,

        /// Seed for `--random`
        #[arg(short, long, default_value_t = 42)]
        seed:       u64,
    },
    /// FIFO, LRU and Optimal page replacement
    Paging {
        /// Number of page frames
        #[arg(short, long)]
        frames:     usize,

        /// Comma-separated page references
        #[arg(short, long)]
        refs:       String,
    },
    /// FCFS, SCAN and C-SCAN disk scheduling
    Disk {
        /// Initial head position
        #[arg(short = 'H', long)]
        #[arg(value_parser = clap::value_parser!(Ticks))]
        head:       Ticks,

        /// Comma-separated cylinder requests
        #[arg(short, long)]
        requests:   String,

        /// Number of cylinders on the disk
        #[arg(short, long, default_value_t = 200)]
        #[arg(value_parser = clap::value_parser!(Ticks))]
        cylinders:  Ticks,
    },
}

fn load_or_generate<T>(
    input:      Option<PathBuf>,
    random:     Option<usize>,
    seed:       u64,
    read:       impl FnOnce(PathBuf) -> Result<Vec<T>, Box<dyn std::error::Error>>,
    generate:   impl FnOnce(&mut StdRng, usize) -> Vec<T>,
) -> anyhow::Result<Vec<T>> {
    match (input, random) {
        (Some(path), _)     => read(path).map_err(|e| anyhow::anyhow!("{e}")),
        (None, Some(n))     => {
            info!("Generating {n} random items (seed {seed})");
            Ok(generate(&mut StdRng::seed_from_u64(seed), n))
        },
        (None, None)        => Err(anyhow::anyhow!("Either an input file or --random is needed")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Args::parse();
    init_logging(cli.verbose);
    let started = std::time::Instant::now();

    match cli.engine {
        Engine::Cpu { input, quantum, random, seed } => {
            let processes = load_or_generate(
                input,
                random,
                seed,
                read_from_path::<ProcessCSVParser, ProcessRecord>,
                random_processes::<StdRng>,
            )?;
            let runs = compare_cpu(&processes, Some(quantum))?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                println!("Algorithm\tAvg. WT\tAvg. TAT\tTotal\tSwitches");
                for (algo, s) in &runs {
                    println!(
                        "{:<10}\t{:.2}\t{:.2}\t\t{}\t{}",
                        algo.to_string(), s.avg_waiting, s.avg_turnaround, s.total_time, s.context_switches(),
                    );
                }
                if let Some((algo, s)) = runs.iter()
                    .min_by(|a, b| a.1.avg_waiting.total_cmp(&b.1.avg_waiting)) {
                    println!("Lowest average waiting time: {algo} ({:.2})", s.avg_waiting);
                }
            }
        },
        Engine::Memory { total, input, random, seed } => {
            let requests = load_or_generate(
                input,
                random,
                seed,
                read_from_path::<RequestCSVParser, RequestRecord>,
                |rng, n| random_requests(rng, n, total),
            )?;
            let runs = compare_memory(total, &requests)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                println!("Fit\tAllocated\tFailed\tFragmentation");
                for (fit, l) in &runs {
                    println!(
                        "{fit}\t{}\t\t{}\t{:.2}%",
                        l.allocated_total(), l.failures(), l.external_fragmentation() * 100.0,
                    );
                }
            }
        },
        Engine::Paging { frames, refs } => {
            let references: Vec<String> = parse_list(&refs)?;
            let runs = compare_paging(frames, &references)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                println!("Policy\tFaults\tHit ratio");
                for (policy, o) in &runs {
                    println!("{policy}\t{}\t{:.2}%", o.fault_count, o.hit_ratio() * 100.0);
                }
            }
        },
        Engine::Disk { head, requests, cylinders } => {
            let requests: Vec<Ticks> = parse_list(&requests)?;
            let runs = compare_disk(head, &requests, cylinders)?;
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&runs)?);
            } else {
                println!("Algorithm\tSeek cost\tAvg. seek");
                for (algo, h) in &runs {
                    println!("{algo}\t\t{}\t\t{:.2}", h.seek_cost, h.avg_seek());
                }
            }
        },
    }

    info!("Total comparison time: {} μs", started.elapsed().as_micros());

    Ok(())
}
