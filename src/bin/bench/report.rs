// Benchmark Report Types and Console Tables
// Structured output for independent analysis of tokenomics parameter sets

use serde::Serialize;
use std::collections::BTreeMap;
use tokenomics_engine::summary::{ApTypeTotals, BurnStatistics, Milestone};
use tokenomics_engine::ApType;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        let n = samples.len();
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n: 0 };
        }
        let mean = samples.iter().sum::<f64>() / n as f64;
        let variance = if n > 1 {
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };
        let std_dev = variance.sqrt();
        let stderr = std_dev / (n as f64).sqrt();
        let z = 1.96; // 95% CI
        Self {
            mean,
            std_dev,
            ci_lower: mean - z * stderr,
            ci_upper: mean + z * stderr,
            min: samples.iter().cloned().fold(f64::INFINITY, f64::min),
            max: samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
            n,
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BenchResult {
    pub scenario: String,
    pub name: String,
    pub category: String,
    pub seed: u64,
    pub pass: bool,
    pub failures: Vec<String>,
    pub rounds: usize,
    pub reached_target_hours: bool,
    pub final_hours: f64,
    pub final_bots: u64,
    pub final_active_bots: u64,
    pub final_token_value: f64,
    pub final_token_supply: f64,
    pub final_market_cap: f64,
    pub final_token_rate: f64,
    pub peak_token_value: f64,
    pub total_minted: f64,
    pub burn: BurnStatistics,
    pub usd_sold: f64,
    pub usd_purchased: f64,
    pub team_buyback: f64,
    pub uptrend_rounds: u32,
    pub min_sentiment: f64,
    pub max_sentiment: f64,
    pub elapsed_ms: u128,
    pub rounds_per_sec: f64,
}

// ─── Monte Carlo Report (per-scenario aggregation) ──────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub scenario_name: String,
    pub label: String,
    pub category: String,
    pub n_runs: usize,
    pub pass_rate: f64,
    pub rounds: Stats,
    pub final_bots: Stats,
    pub final_token_value: Stats,
    pub final_token_supply: Stats,
    pub final_market_cap: Stats,
    pub total_burned: Stats,
    pub burned_percent: Stats,
    pub usd_sold: Stats,
    pub usd_purchased: Stats,
    pub team_buyback: Stats,
    pub elapsed_ms: Stats,
    pub rounds_per_sec: Stats,
    /// Milestone table of the first seed.
    pub milestones: Vec<Milestone>,
    /// AP statistics of the first seed.
    pub ap_statistics: BTreeMap<ApType, ApTypeTotals>,
    pub individual_runs: Vec<BenchResult>,
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct BenchReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub n_runs_per_scenario: usize,
    pub base_seed: u64,
    pub summary: Summary,
    pub scenarios: Vec<MonteCarloReport>,
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub pass_rate: f64,
}

// ─── Console Tables ─────────────────────────────────────────────────────────

fn format_roi(hours: Option<f64>) -> String {
    match hours {
        None => "N/A".to_string(),
        Some(h) if h > 24.0 => format!("{:.1} days", h / 24.0),
        Some(h) => format!("{:.1} hours", h),
    }
}

pub fn print_milestones(milestones: &[Milestone]) {
    println!("    {:<9} {:>7} {:>14} {:>11} {:>12} {:>12} {:>10} {:>14} {:>14}",
        "Period", "BOTs", "Token Supply", "Value", "Sold (USD)", "Bought (USD)", "Buyback", "Market Cap", "Min. ROI");
    println!("    {}", "-".repeat(113));
    for m in milestones {
        println!("    {:<9} {:>7} {:>14.0} {:>11.4} {:>12.2} {:>12.2} {:>10.2} {:>14.2} {:>14}",
            m.label,
            m.total_bots,
            m.approximate_supply,
            m.token_value,
            m.usd_sold,
            m.usd_purchased,
            m.team_buyback_to_date,
            m.market_cap,
            format_roi(m.minimum_roi_hours),
        );
    }
}

pub fn print_ap_statistics(totals: &BTreeMap<ApType, ApTypeTotals>) {
    println!("    {:<9} {:>12} {:>14} {:>14} {:>14} {:>9}",
        "AP Type", "Distribution", "Self Points", "Giving Points", "Total Points", "% Total");
    println!("    {}", "-".repeat(77));
    for (ap_type, t) in totals {
        println!("    {:<9} {:>12.1} {:>14.1} {:>14.1} {:>14.1} {:>8.2}%",
            ap_type.label(),
            t.final_distribution,
            t.self_points,
            t.giving_points,
            t.total_points,
            t.share_percent,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_from_samples() {
        let stats = Stats::from_samples(&[2.0, 4.0, 6.0]);
        assert!((stats.mean - 4.0).abs() < 1e-12);
        assert!((stats.std_dev - 2.0).abs() < 1e-12);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 6.0);
        assert!(stats.ci_lower < 4.0 && stats.ci_upper > 4.0);
    }

    #[test]
    fn test_stats_empty() {
        let stats = Stats::from_samples(&[]);
        assert_eq!(stats.n, 0);
        assert_eq!(stats.half_width(), 0.0);
    }

    #[test]
    fn test_format_roi() {
        assert_eq!(format_roi(None), "N/A");
        assert_eq!(format_roi(Some(12.0)), "12.0 hours");
        assert_eq!(format_roi(Some(48.0)), "2.0 days");
    }
}
