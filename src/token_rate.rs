// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Token Rate Controller

//! Adaptive point-to-token conversion rate.
//!
//! The rate relaxes toward `max_token_rate` while the population grows and
//! toward `min_token_rate` otherwise. There is no integral or derivative
//! term: each round moves a fixed fraction of the remaining distance to one
//! of the two bounds.

use serde::{Deserialize, Serialize};

use crate::params::SimulationParams;

/// Rounds shorter than this keep the base rate.
pub const MIN_ADJUSTMENT_ROUND_HOURS: f64 = 3.0;

const GROWTH_RELAXATION_EXPONENT: f64 = -0.03;
const DECLINE_RELAXATION_BASE: f64 = 0.8;
const DECLINE_RELAXATION_EXPONENT: f64 = 0.17;

// ---------------------------------------------------------------------------
// Pure transition
// ---------------------------------------------------------------------------

/// One controller step.
///
/// `history` holds the total-bot counts of earlier rounds, oldest first. The
/// short-term change compares `current_total` with the latest entry.
pub fn next_token_rate(
    params: &SimulationParams,
    current_total: u64,
    history: &[u64],
    previous_rate: f64,
    round_duration: f64,
) -> f64 {
    if history.len() < 2 || round_duration < MIN_ADJUSTMENT_ROUND_HOURS {
        return params.base_token_rate;
    }

    let previous_total = history.last().copied().unwrap_or(0).max(1) as f64;
    let short_term_change = (current_total as f64 - previous_total) / previous_total;

    let (min, max) = (params.min_token_rate, params.max_token_rate);
    let next = if short_term_change > params.significant_change_threshold {
        max - (max - previous_rate) * GROWTH_RELAXATION_EXPONENT.exp()
    } else {
        min + (previous_rate - min) * DECLINE_RELAXATION_BASE.powf(DECLINE_RELAXATION_EXPONENT)
    };
    next.clamp(min, max)
}

// ---------------------------------------------------------------------------
// TokenRateController - current rate plus bounded bot-count history
// ---------------------------------------------------------------------------

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TokenRateController {
    rate: f64,
    history: Vec<u64>,
    window: usize,
}

impl TokenRateController {
    pub fn new(params: &SimulationParams) -> Self {
        let window = params.history_window();
        Self {
            rate: params.base_token_rate,
            history: Vec::with_capacity(window + 1),
            window,
        }
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn history(&self) -> &[u64] {
        &self.history
    }

    /// Advance the rate for this round, then record `total_bots`.
    pub fn update(&mut self, params: &SimulationParams, total_bots: u64, round_duration: f64) -> f64 {
        self.rate = next_token_rate(params, total_bots, &self.history, self.rate, round_duration);
        push_and_trim(&mut self.history, total_bots, self.window);
        self.rate
    }
}

fn push_and_trim<T>(window: &mut Vec<T>, value: T, max_len: usize) {
    window.push(value);
    if window.len() > max_len {
        window.remove(0);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
