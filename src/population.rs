// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Population / Activity Model

use rand::Rng;

use crate::params::SimulationParams;

/// Shortest possible round, in hours.
pub const MIN_ROUND_HOURS: f64 = 0.05;

const DURATION_SCALE: f64 = 0.024;
const DURATION_EXPONENT: f64 = 0.6;

/// Wall-clock length of a round for the given population.
///
/// Larger populations take longer per round: `max(0.05, 0.024 * n^0.6)`.
pub fn round_duration(bot_count: u64) -> f64 {
    (DURATION_SCALE * (bot_count as f64).powf(DURATION_EXPONENT)).max(MIN_ROUND_HOURS)
}

/// Logistic adoption target at `hours` since launch.
pub fn theoretical_bots(params: &SimulationParams, hours: f64) -> f64 {
    let x = -params.growth_steepness * (hours - params.mid_point_hours) / params.growth_target_hours;
    params.max_bots / (1.0 + x.exp())
}

/// Number of bots joining during a round of `elapsed_hours` ending at
/// `cumulative_hours`.
///
/// Draw order: one jitter sample in `[0.9, 1.1)`; then, inside an early
/// adoption phase, one trial sample and (on success) one grant sample in
/// `[1, 3)`. A frozen window returns before drawing anything.
pub fn bot_growth<R: Rng + ?Sized>(
    params: &SimulationParams,
    elapsed_hours: f64,
    cumulative_hours: f64,
    rng: &mut R,
) -> u64 {
    if let Some(window) = params.frozen_growth {
        if window.contains(cumulative_hours) {
            return 0;
        }
    }

    let now = theoretical_bots(params, cumulative_hours);
    let prev = theoretical_bots(params, cumulative_hours - elapsed_hours);
    let theoretical_increase = (now - prev).max(0.0);
    let growth = theoretical_increase * rng.gen_range(0.9..1.1);

    let phase = params
        .early_adoption
        .iter()
        .find(|phase| cumulative_hours < phase.until_hours);

    match phase {
        Some(phase) => {
            if rng.gen::<f64>() < phase.trial_rate_per_hour * elapsed_hours {
                let granted: f64 = rng.gen_range(1.0..3.0);
                granted.max(growth.floor()).round() as u64
            } else {
                0
            }
        }
        None => growth.floor().max(0.0) as u64,
    }
}

/// Bots still active after linear activity decay.
///
/// At least one bot stays active while any exist; an empty population has no
/// active bots.
pub fn active_bots(params: &SimulationParams, total_bots: u64, cumulative_hours: f64) -> u64 {
    if total_bots == 0 {
        return 0;
    }
    let activity = (1.0 - params.activity_decay_per_hour * cumulative_hours).max(params.min_activity);
    ((total_bots as f64 * activity).floor() as u64).clamp(1, total_bots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{EarlyAdoptionPhase, FrozenGrowthWindow};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_round_duration_floor() {
        assert_eq!(round_duration(0), MIN_ROUND_HOURS);
        assert_eq!(round_duration(1), MIN_ROUND_HOURS);
        // 0.024 * 3^0.6 ~= 0.0464 still below the floor
        assert_eq!(round_duration(3), MIN_ROUND_HOURS);
    }

    #[test]
    fn test_round_duration_grows_with_population() {
        let mut last = round_duration(1);
        for n in [10u64, 100, 1_000, 10_000, 300_000] {
            let d = round_duration(n);
            assert!(d > last, "duration must increase: n={n} d={d} last={last}");
            last = d;
        }
        // 0.024 * 1000^0.6 = 0.024 * 63.0957
        assert!((round_duration(1_000) - 1.514_30).abs() < 1e-4);
    }

    #[test]
    fn test_round_duration_strictly_increasing_past_floor() {
        let mut last = round_duration(5);
        for n in 6..2_000u64 {
            let d = round_duration(n);
            assert!(d > last);
            last = d;
        }
    }

    #[test]
    fn test_theoretical_bots_midpoint_is_half() {
        let params = SimulationParams::default();
        let mid = theoretical_bots(&params, params.mid_point_hours);
        assert!((mid - params.max_bots / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_frozen_window_blocks_growth() {
        let params = SimulationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for hours in [4500.5, 5000.0, 5499.9] {
            assert_eq!(bot_growth(&params, 10.0, hours, &mut rng), 0);
        }
    }

    #[test]
    fn test_frozen_window_draws_nothing() {
        let params = SimulationParams {
            frozen_growth: Some(FrozenGrowthWindow::always()),
            ..SimulationParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut untouched = ChaCha8Rng::seed_from_u64(9);
        bot_growth(&params, 1.0, 10.0, &mut rng);
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn test_early_phase_certain_trial_grants_at_least_one() {
        let params = SimulationParams {
            early_adoption: vec![EarlyAdoptionPhase {
                until_hours: 1_000.0,
                trial_rate_per_hour: 10.0,
            }],
            frozen_growth: None,
            ..SimulationParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            let grown = bot_growth(&params, 0.5, 100.0, &mut rng);
            assert!((1..=3).contains(&grown), "grown={grown}");
        }
    }

    #[test]
    fn test_early_phase_impossible_trial_grants_nothing() {
        let params = SimulationParams {
            early_adoption: vec![EarlyAdoptionPhase {
                until_hours: 1_000.0,
                trial_rate_per_hour: 0.0,
            }],
            frozen_growth: None,
            ..SimulationParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(bot_growth(&params, 0.5, 100.0, &mut rng), 0);
        }
    }

    #[test]
    fn test_late_growth_tracks_sigmoid() {
        let params = SimulationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let (elapsed, hours) = (10.0, params.mid_point_hours);
        let expected = theoretical_bots(&params, hours) - theoretical_bots(&params, hours - elapsed);
        let grown = bot_growth(&params, elapsed, hours, &mut rng) as f64;
        assert!(grown >= (expected * 0.9).floor() && grown <= (expected * 1.1).ceil());
        assert!(grown > 0.0);
    }

    #[test]
    fn test_active_bots_decay_and_floor() {
        let params = SimulationParams::default();
        assert_eq!(active_bots(&params, 100, 0.0), 100);
        // 1 - 0.0001 * 1000 = 0.9
        assert_eq!(active_bots(&params, 100, 1_000.0), 90);
        // clamped to min activity 0.2
        assert_eq!(active_bots(&params, 100, 100_000.0), 20);
        // never below one while bots exist
        assert_eq!(active_bots(&params, 2, 100_000.0), 1);
        assert_eq!(active_bots(&params, 0, 10.0), 0);
    }

    #[test]
    fn test_active_never_exceeds_total() {
        let params = SimulationParams::default();
        for total in 0..200u64 {
            for hours in [0.0, 10.0, 5_000.0, 20_000.0] {
                assert!(active_bots(&params, total, hours) <= total);
            }
        }
    }
}
