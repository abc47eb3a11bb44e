// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Type Definitions

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ap_usage::ApUsage;
use crate::market::TeamBuyback;
use crate::params::{ApType, SimulationParams};
use crate::token_rate::TokenRateController;

/// Per-AP-type slice of one round.
pub type ApBreakdown = BTreeMap<ApType, ApUsage>;

// ─── SimulationState ─────────────────────────────────────────────────────────

/// Working set carried from round to round. Owned by the round loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationState {
    pub round: u32,
    pub total_bots: u64,
    pub active_bots: u64,
    pub cumulative_hours: f64,
    pub token_supply: f64,
    pub backing_pool: f64,
    pub market_sentiment: f64,
    pub initial_token_value: f64,
    pub previous_token_value: f64,
    /// Recent token values, oldest first, at most `2 * trend_window_size`.
    pub value_history: Vec<f64>,
    pub token_rate: TokenRateController,
    pub buyback: TeamBuyback,
}

impl SimulationState {
    pub fn new(params: &SimulationParams) -> Self {
        Self {
            round: 0,
            total_bots: params.initial_bots,
            active_bots: params.initial_bots,
            cumulative_hours: 0.0,
            token_supply: params.initial_token_supply,
            backing_pool: params.initial_backing_pool(),
            market_sentiment: params.initial_market_sentiment,
            initial_token_value: params.base_price,
            previous_token_value: params.base_price,
            value_history: vec![params.base_price],
            token_rate: TokenRateController::new(params),
            buyback: TeamBuyback::new(params),
        }
    }
}

// ─── RoundRecord ─────────────────────────────────────────────────────────────

/// One row of the result sequence. Never mutated after it is emitted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    pub round: u32,
    pub round_duration: f64,
    pub cumulative_hours: f64,
    pub total_bots: u64,
    pub active_bots: u64,
    pub new_bots: u64,

    // AP pipeline
    pub ap_distributed: f64,
    pub ap_used: f64,
    pub total_points: f64,
    pub earnings_per_hour: f64,
    pub token_rate: f64,

    // Token flows
    /// USD leaving the pool through sales.
    pub nbt_out: f64,
    /// USD entering the pool from NFT sales.
    pub nbt_in: f64,
    pub tokens_issued: f64,
    pub tokens_sold: f64,
    pub usd_sold: f64,
    pub tokens_purchased: f64,
    pub usd_purchased: f64,
    pub team_buyback_usd: f64,

    // Market
    pub market_sentiment: f64,
    pub in_uptrend: bool,
    pub inflation_rate: f64,
    pub annualized_inflation_rate: f64,
    pub token_value: f64,
    pub market_cap: f64,
    pub nft_price: f64,
    #[serde(with = "infinite_as_null")]
    pub minimum_roi_hours: f64,
    pub token_supply: f64,
    pub backing_pool: f64,

    // Utility and burn
    pub ap_purchase_tokens_spent: f64,
    pub external_post_tokens_spent: f64,
    /// Burn before the 1% cap.
    pub burn_candidate: f64,
    pub tokens_burned: f64,
    pub ap_purchase_users: u64,
    pub external_post_usages: u64,

    pub ap_breakdown: ApBreakdown,
}

impl RoundRecord {
    pub fn roi_is_finite(&self) -> bool {
        self.minimum_roi_hours.is_finite()
    }
}

/// JSON has no infinity; an unreachable ROI is written as `null`.
mod infinite_as_null {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_some(value)
        } else {
            serializer.serialize_none()
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

// ─── ResultSequence ──────────────────────────────────────────────────────────

/// Append-only list of round records, one per completed round.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSequence(Vec<RoundRecord>);

impl ResultSequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, record: RoundRecord) {
        self.0.push(record);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&RoundRecord> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RoundRecord> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[RoundRecord] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<RoundRecord> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ResultSequence {
    type Item = &'a RoundRecord;
    type IntoIter = std::slice::Iter<'a, RoundRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ─── SimulationOutcome ───────────────────────────────────────────────────────

/// Everything a reporting collaborator needs after a finished run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutcome {
    pub records: ResultSequence,
    pub final_token_supply: f64,
    pub final_active_bots: u64,
    pub total_minted: f64,
    pub total_burned: f64,
    /// True when the run stopped on the hour target rather than the round cap.
    pub reached_target_hours: bool,
}
