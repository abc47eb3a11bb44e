// Monte Carlo Infrastructure: N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N-1, computing mean ± 95% CI

use tokenomics_engine::summary::DEFAULT_MILESTONES;
use tokenomics_engine::*;
use tracing::{debug, warn};

use crate::metrics::{InvariantAuditor, MarketTracker};
use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::path::Path;
use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    base_params: &SimulationParams,
    seed: u64,
    time_series_dir: Option<&Path>,
) -> Result<(BenchResult, SimulationOutcome), SimulationError> {
    let start = Instant::now();
    let params = scenario.params(base_params);
    let mut sim = TokenomicsSimulation::with_params(params.clone(), seed)?;

    let mut auditor = InvariantAuditor::new(&params);
    let mut market = MarketTracker::new();

    while let Some(record) = sim.step_round()? {
        auditor.record_round(record);
        market.record_round(record);
    }

    if let Some(dir) = time_series_dir {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        match TimeSeriesRecorder::new(seed).write_jsonl(&path, sim.results()) {
            Ok(lines) => debug!(path = %path.display(), lines, "time series written"),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to write time series"),
        }
    }

    let elapsed = start.elapsed();
    let elapsed_ms = elapsed.as_millis();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);

    let outcome = sim.into_outcome();
    let burn = outcome.records.burn_statistics(params.initial_token_supply);
    let rounds = outcome.records.len();
    let last = outcome.records.last();

    let final_bots = last.map_or(params.initial_bots, |r| r.total_bots);
    let failures = evaluate(scenario, &auditor, final_bots);

    let result = BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass: failures.is_empty(),
        failures,
        rounds,
        reached_target_hours: outcome.reached_target_hours,
        final_hours: last.map_or(0.0, |r| r.cumulative_hours),
        final_bots,
        final_active_bots: outcome.final_active_bots,
        final_token_value: last.map_or(0.0, |r| r.token_value),
        final_token_supply: outcome.final_token_supply,
        final_market_cap: last.map_or(0.0, |r| r.market_cap),
        final_token_rate: last.map_or(0.0, |r| r.token_rate),
        peak_token_value: market.peak_token_value,
        total_minted: outcome.total_minted,
        burn,
        usd_sold: market.usd_sold,
        usd_purchased: market.usd_purchased,
        team_buyback: market.team_buyback,
        uptrend_rounds: market.uptrend_rounds,
        min_sentiment: market.min_sentiment,
        max_sentiment: market.max_sentiment,
        elapsed_ms,
        rounds_per_sec: rounds as f64 / elapsed_secs,
    };

    Ok((result, outcome))
}

/// Failure reasons for one run; empty means the run passed.
fn evaluate(scenario: &Scenario, auditor: &InvariantAuditor, final_bots: u64) -> Vec<String> {
    let criteria = &scenario.criteria;
    let mut failures = Vec::new();

    if criteria.require_monotonic_hours && auditor.non_monotonic_hours > 0 {
        failures.push(format!("{} rounds without time progress", auditor.non_monotonic_hours));
    }
    if criteria.require_bounds && !auditor.bounds_hold() {
        failures.push(format!(
            "bounds broken: sentiment {} rate {} active {}",
            auditor.sentiment_out_of_bounds, auditor.rate_out_of_bounds, auditor.active_above_total,
        ));
    }
    if criteria.require_non_negative_supply && auditor.negative_supply > 0 {
        failures.push(format!("{} rounds with negative supply", auditor.negative_supply));
    }
    if criteria.require_burn_cap && auditor.burn_cap_breaches > 0 {
        failures.push(format!("{} burn cap breaches", auditor.burn_cap_breaches));
    }
    if let Some(min) = criteria.min_final_bots {
        if final_bots < min {
            failures.push(format!("final bots {} below {}", final_bots, min));
        }
    }
    if let Some(max) = criteria.max_final_bots {
        if final_bots > max {
            failures.push(format!("final bots {} above {}", final_bots, max));
        }
    }
    failures
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats. Milestones and AP
/// statistics come from the first seed.
pub fn run_monte_carlo(
    scenario: &Scenario,
    base_params: &SimulationParams,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&Path>,
) -> Result<MonteCarloReport, SimulationError> {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));
    let params = scenario.params(base_params);

    let mut results = Vec::with_capacity(n_runs);
    let mut first: Option<SimulationOutcome> = None;
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        let (result, outcome) = run_single(scenario, base_params, seed, ts_dir.as_deref())?;
        if !result.pass {
            warn!(scenario = scenario.name, seed, failures = ?result.failures, "run failed");
        }
        results.push(result);
        if first.is_none() {
            first = Some(outcome);
        }
    }

    let (milestones, ap_statistics) = match &first {
        Some(outcome) => (
            outcome.records.milestones(&params, outcome.final_token_supply, &DEFAULT_MILESTONES),
            outcome.records.ap_type_totals(),
        ),
        None => (Vec::new(), Default::default()),
    };

    Ok(aggregate(scenario, results, milestones, ap_statistics))
}

fn stats_of<F: Fn(&BenchResult) -> f64>(results: &[BenchResult], metric: F) -> Stats {
    Stats::from_samples(&results.iter().map(metric).collect::<Vec<_>>())
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(
    scenario: &Scenario,
    results: Vec<BenchResult>,
    milestones: Vec<tokenomics_engine::summary::Milestone>,
    ap_statistics: std::collections::BTreeMap<ApType, tokenomics_engine::summary::ApTypeTotals>,
) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n > 0 { passed as f64 / n as f64 } else { 0.0 };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        rounds: stats_of(&results, |r| r.rounds as f64),
        final_bots: stats_of(&results, |r| r.final_bots as f64),
        final_token_value: stats_of(&results, |r| r.final_token_value),
        final_token_supply: stats_of(&results, |r| r.final_token_supply),
        final_market_cap: stats_of(&results, |r| r.final_market_cap),
        total_burned: stats_of(&results, |r| r.burn.total_burned),
        burned_percent: stats_of(&results, |r| r.burn.burned_percent_of_issued),
        usd_sold: stats_of(&results, |r| r.usd_sold),
        usd_purchased: stats_of(&results, |r| r.usd_purchased),
        team_buyback: stats_of(&results, |r| r.team_buyback),
        elapsed_ms: stats_of(&results, |r| r.elapsed_ms as f64),
        rounds_per_sec: stats_of(&results, |r| r.rounds_per_sec),
        milestones,
        ap_statistics,
        individual_runs: results,
    }
}
