use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use epidemic_core::{InfectionScan, RunSummary, SimConfig, World};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

const WARMUP_STEPS: usize = 10;
const BENCHMARK_STEPS: usize = 200;
const SAMPLE_EVERY: usize = 100;

#[derive(Parser)]
#[command(name = "epidemic")]
#[command(about = "Spatial epidemic simulation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single simulation from a config file
    Run {
        /// Path to config file (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Output directory for summary.json (optional)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Number of frames to simulate
        #[arg(long, default_value_t = 1000)]
        steps: usize,

        /// Record counts every N frames
        #[arg(long, default_value_t = SAMPLE_EVERY)]
        sample_every: usize,
    },
    /// Measure frames per second for several population sizes
    Benchmark,
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: &Path) -> Result<SimConfig> {
    let file = File::open(path)
        .with_context(|| format!("failed to open config file {}", path.display()))?;
    let config: SimConfig =
        serde_json::from_reader(BufReader::new(file)).context("failed to parse config")?;
    config.validate().context("config validation error")?;
    Ok(config)
}

fn write_summary(out_dir: &Path, summary: &RunSummary) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir).context("failed to create output directory")?;
    let summary_path = out_dir.join("summary.json");
    let file = File::create(&summary_path).context("failed to create summary file")?;
    serde_json::to_writer_pretty(file, summary).context("failed to write summary")?;
    Ok(summary_path)
}

fn benchmark_config(num_agents: usize, infection_scan: InfectionScan) -> SimConfig {
    SimConfig {
        num_agents,
        init_infected: (num_agents / 40).max(1),
        population_cap: Some(num_agents + num_agents / 10),
        infection_scan,
        ..SimConfig::default()
    }
}

fn run_benchmark(num_agents: usize, infection_scan: InfectionScan) -> Result<()> {
    let config = benchmark_config(num_agents, infection_scan);
    let mut world = World::new(config).context("benchmark world initialization failed")?;

    for _ in 0..WARMUP_STEPS {
        world.step();
    }

    let start = Instant::now();
    let mut last = world.counts();
    for _ in 0..BENCHMARK_STEPS {
        last = world.step();
    }
    let elapsed = start.elapsed().as_secs_f64();
    let avg_step_us = elapsed * 1_000_000.0 / BENCHMARK_STEPS as f64;
    let steps_per_sec = if elapsed > 0.0 {
        BENCHMARK_STEPS as f64 / elapsed
    } else {
        f64::INFINITY
    };

    println!("--- {num_agents} agents ({infection_scan:?}) ---");
    println!("  Avg step:      {avg_step_us:.0} us ({steps_per_sec:.1} steps/sec)");
    println!(
        "  Final frame:   S={} I={} R={} D={} Q={} total={}",
        last.susceptible, last.infected, last.recovered, last.dead, last.quarantined, last.total
    );
    println!();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = SimConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p epidemic-cli --release -- benchmark");
                eprintln!();
            }
            println!("=== Epidemic Engine Benchmark ===");
            println!("Warmup: {WARMUP_STEPS} steps, Benchmark: {BENCHMARK_STEPS} steps");
            println!();

            let sizes = [200, 1_000, 5_000, 20_000];
            for scan in [InfectionScan::BruteForce, InfectionScan::SpatialIndex] {
                println!("=== Scan: {scan:?} ===");
                for num_agents in sizes {
                    // Quadratic scan is too slow to be worth timing at the top size.
                    if scan == InfectionScan::BruteForce && num_agents > 5_000 {
                        continue;
                    }
                    run_benchmark(num_agents, scan)?;
                }
            }
        }
        Commands::Run {
            config,
            out,
            steps,
            sample_every,
        } => {
            let sim_config = load_config(&config)?;
            info!(path = %config.display(), steps, "loaded config");

            let mut world = World::new(sim_config).context("failed to initialize world")?;
            let summary = world
                .run_experiment(steps, sample_every)
                .context("experiment failed")?;

            let last = summary.final_counts;
            println!(
                "Run complete at frame {}: S={} I={} R={} D={} Q={} total={}",
                last.frame,
                last.susceptible,
                last.infected,
                last.recovered,
                last.dead,
                last.quarantined,
                last.total
            );
            println!(
                "Peak infectious: {} at frame {}",
                summary.peak_infectious, summary.peak_frame
            );

            if let Some(out_dir) = out {
                let path = write_summary(&out_dir, &summary)?;
                println!("Summary saved to {}", path.display());
            }
        }
    }
    Ok(())
}
