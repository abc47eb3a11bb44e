// Tokenomics Benchmark Runner v0.1.0: Monte Carlo scenario validation
// Seedable ChaCha8 PRNG, per-round invariant audit, optional JSONL time series
//
// Usage:
//   cargo run --release --bin bench                          # All scenarios (10 runs each)
//   cargo run --release --bin bench -- --runs 3              # Quick mode
//   cargo run --release --bin bench -- FROZEN                # Filter by name, label or category
//   cargo run --release --bin bench -- --params params.json  # Partial parameter overrides
//   cargo run --release --bin bench -- --time-series         # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42             # Custom base seed

mod metrics;
mod monte_carlo;
mod report;
mod scenarios;
mod time_series;

use clap::Parser;
use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tokenomics_engine::SimulationParams;
use tracing::info;
use tracing_subscriber::EnvFilter;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "bench")]
#[command(about = "Monte Carlo benchmark runner for the tokenomics engine")]
struct Args {
    /// Runs per scenario
    #[arg(long, default_value_t = 10)]
    runs: usize,

    /// Base seed; run i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// JSON file with parameter overrides
    #[arg(long)]
    params: Option<PathBuf>,

    /// Write per-round JSONL under <out-dir>/time-series
    #[arg(long)]
    time_series: bool,

    /// Output directory for reports
    #[arg(long, default_value = "benchmark-results")]
    out_dir: PathBuf,

    /// Only run scenarios whose name, label or category contains this
    filter: Option<String>,
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let args = Args::parse();

    let base_params = match &args.params {
        Some(path) => {
            info!(path = %path.display(), "loading parameter overrides");
            SimulationParams::from_json_file(path)?
        }
        None => SimulationParams::default(),
    };
    base_params.validate()?;

    let all_scenarios = scenarios();
    let to_run: Vec<&Scenario> = match &args.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", args.filter);
        std::process::exit(1);
    }

    let ts_dir = args.time_series.then(|| args.out_dir.join("time-series"));

    println!("\n  Tokenomics Benchmark Runner v{}", env!("CARGO_PKG_VERSION"));
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", args.runs, args.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<28} {:>5} {:>9} {:>7} {:>12} {:>14} {:>8} {:>8}",
        "Scenario", "Pass%", "Rounds", "BOTs", "Value", "Supply", "Burn%", "Time");
    println!("  {}", "-".repeat(100));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(
            scenario,
            &base_params,
            args.runs,
            args.seed,
            ts_dir.as_deref(),
        )?;

        let status = if report.pass_rate >= 1.0 { "PASS" } else { "FAIL" };

        println!("  {:<28} {:>4}% {:>9.0} {:>7.0} {:>6.4}±{:<5.4} {:>14.0} {:>7.3}% {:>6.0}ms  {}",
            report.label,
            (report.pass_rate * 100.0) as u32,
            report.rounds.mean,
            report.final_bots.mean,
            report.final_token_value.mean,
            report.final_token_value.half_width(),
            report.final_token_supply.mean,
            report.burned_percent.mean,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= 1.0).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(100));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    for report in &mc_reports {
        println!("  {} (seed {})\n", report.label, args.seed);
        print_milestones(&report.milestones);
        println!();
        print_ap_statistics(&report.ap_statistics);
        println!();
    }

    // ─── Write JSON Report ──────────────────────────────────────────────

    let timestamp = SystemTime::now().duration_since(UNIX_EPOCH)?.as_millis().to_string();

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: env!("CARGO_PKG_VERSION"),
        prng: "ChaCha8Rng",
        n_runs_per_scenario: args.runs,
        base_seed: args.seed,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: mc_reports,
    };

    std::fs::create_dir_all(&args.out_dir)?;
    let path = args.out_dir.join(format!("bench-{}.json", timestamp));
    std::fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}
