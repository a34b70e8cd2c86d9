use ressim::*;
use tracing::info;

/// Replays one OS resource-management algorithm on a small workload
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    engine:     Engine,

    /// Print the result as JSON instead of text
    #[arg(long, global = true, default_value_t = false)]
    json:       bool,

    /// Log every decision the engine takes
    #[arg(short, long, global = true, default_value_t = false)]
    verbose:    bool,
}

#[derive(Subcommand, Debug)]
enum Engine {
    /// CPU scheduling
    Cpu {
        /// CSV file with `id,arrival,burst,priority` rows (header first)
        #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
        input:      PathBuf,

        /// Scheduling policy
        #[arg(value_enum)]
        algorithm:  CpuAlgorithm,

        /// Time quantum (Round Robin only)
        #[arg(short, long)]
        #[arg(value_parser = clap::value_parser!(Ticks))]
        quantum:    Option<Ticks>,
    },
    /// Contiguous memory allocation
    Memory {
        /// Size of the address space
        #[arg(short, long)]
        #[arg(value_parser = clap::value_parser!(Ticks))]
        total:      Ticks,

        /// CSV file with `id,size` rows (header first)
        #[arg(short, long, value_parser = clap::value_parser!(PathBuf))]
        input:      PathBuf,

        /// Fit strategy
        #[arg(value_enum)]
        fit:        FitStrategy,
    },
    /// Page replacement
    Paging {
        /// Number of page frames
        #[arg(short, long)]
        frames:     usize,

        /// Comma-separated page references, e.g. "1, 2, 3, 4, 1, 2"
        #[arg(short, long)]
        refs:       String,

        /// Eviction policy
        #[arg(value_enum)]
        policy:     ReplacementPolicy,
    },
    /// Disk head scheduling
    Disk {
        /// Initial head position
        #[arg(short = 'H', long)]
        #[arg(value_parser = clap::value_parser!(Ticks))]
        head:       Ticks,

        /// Comma-separated cylinder requests, e.g. "82, 170, 43"
        #[arg(short, long)]
        requests:   String,

        /// Number of cylinders on the disk
        #[arg(short, long, default_value_t = 200)]
        #[arg(value_parser = clap::value_parser!(Ticks))]
        cylinders:  Ticks,

        /// Seek strategy
        #[arg(value_enum)]
        algorithm:  DiskAlgorithm,
    },
}

fn emit<T: Serialize + std::fmt::Display>(res: &T, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(res)?);
    } else {
        println!("{res}");
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Args::parse();
    init_logging(cli.verbose);
    let started = std::time::Instant::now();

    match cli.engine {
        Engine::Cpu { input, algorithm, quantum } => {
            let processes = read_from_path::<ProcessCSVParser, ProcessRecord>(input)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            info!("Read {} processes", processes.len());
            emit(&run_cpu_schedule(&processes, algorithm, quantum)?, cli.json)?;
        },
        Engine::Memory { total, input, fit } => {
            let requests = read_from_path::<RequestCSVParser, RequestRecord>(input)
                .map_err(|e| anyhow::anyhow!("{e}"))?;
            info!("Read {} memory requests", requests.len());
            emit(&run_memory_allocation(total, &requests, fit)?, cli.json)?;
        },
        Engine::Paging { frames, refs, policy } => {
            let references: Vec<String> = parse_list(&refs)?;
            emit(&run_page_replacement(frames, &references, policy)?, cli.json)?;
        },
        Engine::Disk { head, requests, cylinders, algorithm } => {
            let requests: Vec<Ticks> = parse_list(&requests)?;
            emit(&run_disk_schedule(head, &requests, cylinders, algorithm)?, cli.json)?;
        },
    }

    info!("Total simulation time: {} μs", started.elapsed().as_micros());

    Ok(())
}
