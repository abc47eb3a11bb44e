// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - AP Usage Model

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::market::draw_uniform;
use crate::params::{ApType, ApTypeConfig, SimulationParams};

const USAGE_RATE_FLOOR: f64 = 0.1;
const USAGE_RATE_BELOW: f64 = 0.2;
const USAGE_RATE_ABOVE: f64 = 0.1;

// ─── Per-Type Result ─────────────────────────────────────────────────────────

/// One AP type's activity in one round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ApUsage {
    pub distributed: f64,
    pub used: f64,
    pub self_points: f64,
    pub giving_points: f64,
    /// Self points per active bot per hour.
    pub earnings_per_hour: f64,
}

impl ApUsage {
    pub fn total_points(&self) -> f64 {
        self.self_points + self.giving_points
    }
}

/// Range from which each bot's usage rate is drawn.
pub fn usage_rate_bounds(usage_probability: f64) -> (f64, f64) {
    (
        (usage_probability - USAGE_RATE_BELOW).max(USAGE_RATE_FLOOR),
        (usage_probability + USAGE_RATE_ABOVE).min(1.0),
    )
}

/// Draw one usage rate per active bot and evaluate the round. Every bot
/// consumes one sample, even when the range is degenerate.
pub fn ap_usage<R: Rng + ?Sized>(
    config: &ApTypeConfig,
    active_bots: u64,
    round_duration: f64,
    rng: &mut R,
) -> ApUsage {
    let (low, high) = usage_rate_bounds(config.usage_probability);
    let rates: Vec<f64> = (0..active_bots)
        .map(|_| draw_uniform(rng, low, high))
        .collect();
    usage_from_rates(config, &rates, round_duration)
}

/// Evaluate a round from explicit per-bot usage rates.
///
/// Giving points count whole AP only: each bot's usage is floored before the
/// giving reward applies.
pub fn usage_from_rates(config: &ApTypeConfig, rates: &[f64], round_duration: f64) -> ApUsage {
    let participants = rates.len();
    let distributed = config.distribution * participants as f64;
    let used: f64 = rates.iter().map(|rate| config.distribution * rate).sum();
    let self_points: f64 = rates
        .iter()
        .map(|rate| config.distribution * rate * config.earning)
        .sum();

    let giving_points = if participants > 1 && config.giving > 0.0 {
        let whole_units: f64 = rates
            .iter()
            .map(|rate| (config.distribution * rate).floor())
            .sum();
        whole_units * config.giving
    } else {
        0.0
    };

    let earnings_per_hour = if participants > 0 && round_duration > 0.0 {
        self_points / participants as f64 / round_duration
    } else {
        0.0
    };

    ApUsage {
        distributed,
        used,
        self_points,
        giving_points,
        earnings_per_hour,
    }
}

// ─── Round Aggregation ───────────────────────────────────────────────────────

/// All AP types for one round, summed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApRoundTotals {
    pub per_type: BTreeMap<ApType, ApUsage>,
    pub distributed: f64,
    pub used: f64,
    pub self_points: f64,
    pub giving_points: f64,
    /// Sum (not mean) of per-type earnings per hour.
    pub earnings_per_hour: f64,
    /// Self plus giving points, after the early-stage bonus.
    pub total_points: f64,
}

/// Run every configured AP type in column order and sum the results.
pub fn round_ap_totals<R: Rng + ?Sized>(
    params: &SimulationParams,
    total_bots: u64,
    active_bots: u64,
    round_duration: f64,
    rng: &mut R,
) -> ApRoundTotals {
    let mut totals = ApRoundTotals::default();
    for (&ap_type, config) in &params.ap_types {
        let usage = ap_usage(config, active_bots, round_duration, rng);
        totals.distributed += usage.distributed;
        totals.used += usage.used;
        totals.self_points += usage.self_points;
        totals.giving_points += usage.giving_points;
        totals.earnings_per_hour += usage.earnings_per_hour;
        totals.per_type.insert(ap_type, usage);
    }
    let points = totals.self_points + totals.giving_points;
    totals.total_points = apply_early_stage_bonus(params, total_bots, points);
    totals
}

/// While the population is below the threshold, points gain
/// `points * (multiplier - 1)` on top. A multiplier of 1 is a no-op.
pub fn apply_early_stage_bonus(params: &SimulationParams, total_bots: u64, points: f64) -> f64 {
    if total_bots < params.early_stage_bot_threshold {
        points + points * (params.early_stage_bonus_multiplier - 1.0)
    } else {
        points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_giving_points_truncate_per_bot() {
        let config = ApTypeConfig::new(10.0, 1.0, 2.0, 0.6);
        let usage = usage_from_rates(&config, &[0.5, 0.7], 1.0);
        // floor(5.0) + floor(7.0) = 12 whole AP, times giving 2
        assert_eq!(usage.giving_points, 24.0);
    }

    #[test]
    fn test_giving_truncation_drops_fractions() {
        let config = ApTypeConfig::new(10.0, 1.0, 2.0, 0.6);
        let usage = usage_from_rates(&config, &[0.55, 0.79], 1.0);
        // 5.5 -> 5, 7.9 -> 7
        assert_eq!(usage.giving_points, 24.0);
        assert!((usage.used - 13.4).abs() < 1e-9);
    }

    #[test]
    fn test_single_participant_gives_nothing() {
        let config = ApTypeConfig::new(10.0, 1.0, 2.0, 0.6);
        let usage = usage_from_rates(&config, &[0.9], 2.0);
        assert_eq!(usage.giving_points, 0.0);
        assert!((usage.self_points - 9.0).abs() < 1e-9);
        assert!((usage.earnings_per_hour - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_giving_reward_gives_nothing() {
        let config = ApTypeConfig::new(1.0, 2.0, 0.0, 0.4);
        let usage = usage_from_rates(&config, &[0.3, 0.4, 0.5], 1.0);
        assert_eq!(usage.giving_points, 0.0);
    }

    #[test]
    fn test_self_points_and_distribution() {
        let config = ApTypeConfig::new(20.0, 0.5, 0.1, 0.9);
        let usage = usage_from_rates(&config, &[0.8, 1.0], 0.5);
        assert_eq!(usage.distributed, 40.0);
        assert!((usage.used - 36.0).abs() < 1e-9);
        assert!((usage.self_points - 18.0).abs() < 1e-9);
        // 18 points / 2 bots / 0.5 h
        assert!((usage.earnings_per_hour - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_participants_is_all_zero() {
        let config = ApTypeConfig::new(10.0, 1.0, 2.0, 0.7);
        assert_eq!(usage_from_rates(&config, &[], 1.0), ApUsage::default());
    }

    #[test]
    fn test_usage_rate_bounds_clamp() {
        assert_eq!(usage_rate_bounds(0.05), (0.1, 0.15000000000000002));
        let (low, high) = usage_rate_bounds(0.95);
        assert!((low - 0.75).abs() < 1e-12);
        assert_eq!(high, 1.0);
    }

    #[test]
    fn test_drawn_rates_stay_in_bounds() {
        let config = ApTypeConfig::new(10.0, 1.0, 2.0, 0.7);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let usage = ap_usage(&config, 1_000, 1.0, &mut rng);
        let (low, high) = usage_rate_bounds(0.7);
        assert!(usage.used >= 10.0 * low * 1_000.0);
        assert!(usage.used <= 10.0 * high * 1_000.0);
        assert_eq!(usage.distributed, 10_000.0);
    }

    #[test]
    fn test_degenerate_range_still_consumes_samples() {
        // probability 0 collapses the range to [0.1, 0.1]
        let config = ApTypeConfig::new(10.0, 1.0, 2.0, 0.0);
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let usage = ap_usage(&config, 4, 1.0, &mut rng);
        assert!((usage.used - 4.0).abs() < 1e-12);

        let mut reference = ChaCha8Rng::seed_from_u64(17);
        for _ in 0..4 {
            let _: f64 = reference.gen();
        }
        assert_eq!(rng.gen::<u64>(), reference.gen::<u64>());
    }

    #[test]
    fn test_round_totals_sum_types() {
        let params = SimulationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let totals = round_ap_totals(&params, 500, 400, 1.0, &mut rng);
        assert_eq!(totals.per_type.len(), 6);
        let self_sum: f64 = totals.per_type.values().map(|u| u.self_points).sum();
        let eph_sum: f64 = totals.per_type.values().map(|u| u.earnings_per_hour).sum();
        assert!((totals.self_points - self_sum).abs() < 1e-6);
        assert!((totals.earnings_per_hour - eph_sum).abs() < 1e-9);
        assert!((totals.total_points - (totals.self_points + totals.giving_points)).abs() < 1e-6);
    }

    #[test]
    fn test_early_stage_bonus() {
        let mut params = SimulationParams::default();
        params.early_stage_bonus_multiplier = 1.0;
        assert_eq!(apply_early_stage_bonus(&params, 10, 50.0), 50.0);
        params.early_stage_bonus_multiplier = 2.0;
        assert_eq!(apply_early_stage_bonus(&params, 10, 50.0), 100.0);
        assert_eq!(apply_early_stage_bonus(&params, 100, 50.0), 50.0);
        // shipped default multiplier 0 zeroes early points
        params.early_stage_bonus_multiplier = 0.0;
        assert_eq!(apply_early_stage_bonus(&params, 10, 50.0), 0.0);
    }
}
