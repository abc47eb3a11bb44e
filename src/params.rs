// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Parameter Bundle

//! Immutable configuration for one simulation run.
//!
//! A [`SimulationParams`] is built once (defaults, JSON overrides, or field
//! edits), validated by the round loop constructor, and then only ever read.
//! Every model function takes it by reference.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

// ─── AP Types ────────────────────────────────────────────────────────────────

/// Closed set of activity-point kinds. Declaration order is report column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApType {
    Post,
    Comment,
    Like,
    Upvote,
    Downvote,
    Banvote,
}

impl ApType {
    pub const ALL: [ApType; 6] = [
        ApType::Post,
        ApType::Comment,
        ApType::Like,
        ApType::Upvote,
        ApType::Downvote,
        ApType::Banvote,
    ];

    /// Upper-case column label ("POST", "COMMENT", ...).
    pub fn label(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Comment => "COMMENT",
            Self::Like => "LIKE",
            Self::Upvote => "UPVOTE",
            Self::Downvote => "DOWNVOTE",
            Self::Banvote => "BANVOTE",
        }
    }
}

/// Per-type AP economics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApTypeConfig {
    /// AP handed to each active bot per round.
    pub distribution: f64,
    /// Points per AP consumed by the holder.
    pub earning: f64,
    /// Points per whole AP redirected to other bots.
    pub giving: f64,
    /// Base probability that a bot uses this AP type.
    pub usage_probability: f64,
    /// Reputation gate carried from the product config. Not used by the dynamics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_required: Option<u32>,
}

impl ApTypeConfig {
    pub fn new(distribution: f64, earning: f64, giving: f64, usage_probability: f64) -> Self {
        Self {
            distribution,
            earning,
            giving,
            usage_probability,
            reputation_required: None,
        }
    }

    /// The larger of the two per-AP rewards; basis for AP and POST pricing.
    pub fn reward_ceiling(&self) -> f64 {
        self.earning.max(self.giving)
    }
}

/// Default AP table of the production economy.
pub fn default_ap_types() -> BTreeMap<ApType, ApTypeConfig> {
    let mut table = BTreeMap::new();
    table.insert(ApType::Post, ApTypeConfig::new(1.0, 2.0, 0.0, 0.4));
    table.insert(ApType::Comment, ApTypeConfig::new(10.0, 1.0, 2.0, 0.7));
    table.insert(ApType::Like, ApTypeConfig::new(20.0, 0.5, 0.1, 0.9));
    table.insert(ApType::Upvote, ApTypeConfig::new(5.0, 1.0, 3.0, 0.6));
    table.insert(ApType::Downvote, ApTypeConfig::new(2.0, 0.5, 0.0, 0.3));
    table.insert(
        ApType::Banvote,
        ApTypeConfig {
            reputation_required: Some(5),
            ..ApTypeConfig::new(1.0, 2.0, 0.0, 0.05)
        },
    );
    table
}

// ─── Growth Regimes ──────────────────────────────────────────────────────────

/// Open interval of cumulative hours during which no bots join.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrozenGrowthWindow {
    pub start_hours: f64,
    pub end_hours: f64,
}

impl FrozenGrowthWindow {
    /// Freeze growth for the entire run. Bounds stay finite so the window
    /// survives a JSON round trip.
    pub fn always() -> Self {
        Self {
            start_hours: 0.0,
            end_hours: f64::MAX,
        }
    }

    pub fn contains(&self, cumulative_hours: f64) -> bool {
        cumulative_hours > self.start_hours && cumulative_hours < self.end_hours
    }
}

/// Early-adoption throttle: before `until_hours`, growth is granted only when a
/// per-round trial with probability `trial_rate_per_hour * elapsed_hours` passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarlyAdoptionPhase {
    pub until_hours: f64,
    pub trial_rate_per_hour: f64,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Configuration rejected before the first round.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("AP type {ap_type:?}: {field} must be non-negative (got {value})")]
    NegativeApField {
        ap_type: ApType,
        field: &'static str,
        value: f64,
    },

    #[error("AP type {ap_type:?}: usage probability {value} outside [0, 1]")]
    UsageProbabilityOutOfRange { ap_type: ApType, value: f64 },

    #[error("AP table is empty")]
    NoApTypes,

    #[error("token rate bounds out of order: min {min} > max {max}")]
    RateBoundsInverted { min: f64, max: f64 },

    #[error("base token rate {base} outside [{min}, {max}]")]
    BaseRateOutOfBounds { base: f64, min: f64, max: f64 },

    #[error("{0} must be greater than zero")]
    ZeroLimit(&'static str),

    #[error("base price must be positive (got {0})")]
    NonPositiveBasePrice(f64),

    #[error("initial market sentiment {0} outside [0.1, 0.9]")]
    SentimentOutOfRange(f64),

    #[error("trend needs {needed} history entries but the window holds {window}")]
    TrendLongerThanWindow { needed: usize, window: usize },

    #[error("frozen growth window ends ({end}) before it starts ({start})")]
    FrozenWindowInverted { start: f64, end: f64 },
}

// ─── Simulation Parameters ───────────────────────────────────────────────────

/// All tunable constants of one run. Missing JSON fields take the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    // Supply and pricing
    pub initial_token_supply: f64,
    /// NFT price at zero bots (USD); also the initial token value.
    pub base_price: f64,
    pub increase_factor: f64,
    pub initial_liquidity: f64,

    // Run limits
    pub max_rounds: u32,
    pub target_hours: f64,

    // Population
    pub initial_bots: u64,
    pub max_bots: f64,
    pub growth_target_hours: f64,
    pub mid_point_hours: f64,
    pub growth_steepness: f64,
    pub frozen_growth: Option<FrozenGrowthWindow>,
    pub early_adoption: Vec<EarlyAdoptionPhase>,
    pub activity_decay_per_hour: f64,
    pub min_activity: f64,

    // AP economy
    pub ap_types: BTreeMap<ApType, ApTypeConfig>,
    pub early_stage_bot_threshold: u64,
    pub early_stage_bonus_multiplier: f64,

    // Sell side
    pub base_sell_probability: f64,
    pub max_sell_percentage: f64,
    pub sell_probability_increase_with_price: f64,
    pub price_threshold_for_increased_selling: f64,
    pub market_sentiment_volatility: f64,
    pub initial_market_sentiment: f64,

    // Buy side
    pub bot_threshold_for_buy_pressure: u64,
    pub base_buy_probability: f64,
    pub uptrend_buy_multiplier: f64,
    pub price_increase_threshold: f64,
    pub consecutive_increases_for_trend: usize,
    pub new_user_buy_factor: f64,
    pub average_token_purchase_usd: f64,
    pub max_purchase_variance: f64,
    pub whale_probability: f64,
    pub whale_multiplier: f64,

    // Team buyback
    pub team_buyback_total: f64,
    pub team_buyback_start_hour: f64,
    pub team_buyback_duration: f64,
    pub team_buyback_noise: f64,

    // Utility consumption
    pub additional_ap_purchase_base_rate: f64,
    pub additional_ap_purchase_variance: f64,
    pub additional_ap_purchase_price_factor: f64,
    pub market_sentiment_effect_on_purchase: f64,
    pub token_burn_percentage: f64,
    pub external_post_user_ratio: f64,
    pub external_post_usage_base_rate: f64,
    pub external_post_price_factor: f64,

    // Conversion rate controller
    pub base_token_rate: f64,
    pub min_token_rate: f64,
    pub max_token_rate: f64,
    pub trend_window_size: usize,
    pub significant_change_threshold: f64,
    // Legacy proportional-controller gains, kept for config compatibility.
    pub user_growth_sensitivity: f64,
    pub user_decline_sensitivity: f64,
    pub smoothing_factor: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_token_supply: 10_000_000.0,
            base_price: 40.0,
            increase_factor: 0.2,
            initial_liquidity: 2000.0,

            max_rounds: 50_000,
            target_hours: 8760.0 * 2.0,

            initial_bots: 3,
            max_bots: 300_000.0,
            growth_target_hours: 8760.0 * 2.0,
            mid_point_hours: 4380.0 * 2.0,
            growth_steepness: 5.0,
            frozen_growth: Some(FrozenGrowthWindow {
                start_hours: 4500.0,
                end_hours: 5500.0,
            }),
            early_adoption: vec![
                EarlyAdoptionPhase {
                    until_hours: 24.0 * 90.0,
                    trial_rate_per_hour: 0.15,
                },
                EarlyAdoptionPhase {
                    until_hours: 24.0 * 180.0,
                    trial_rate_per_hour: 0.4,
                },
            ],
            activity_decay_per_hour: 0.0001,
            min_activity: 0.2,

            ap_types: default_ap_types(),
            early_stage_bot_threshold: 100,
            early_stage_bonus_multiplier: 0.0,

            base_sell_probability: 0.05,
            max_sell_percentage: 0.2,
            sell_probability_increase_with_price: 0.02,
            price_threshold_for_increased_selling: 2.0,
            market_sentiment_volatility: 0.2,
            initial_market_sentiment: 0.5,

            bot_threshold_for_buy_pressure: 50,
            base_buy_probability: 0.03,
            uptrend_buy_multiplier: 3.0,
            price_increase_threshold: 0.05,
            consecutive_increases_for_trend: 3,
            new_user_buy_factor: 0.3,
            average_token_purchase_usd: 100.0,
            max_purchase_variance: 0.7,
            whale_probability: 0.01,
            whale_multiplier: 10.0,

            team_buyback_total: 2000.0,
            team_buyback_start_hour: 50.0,
            team_buyback_duration: 200.0,
            team_buyback_noise: 0.3,

            additional_ap_purchase_base_rate: 0.4,
            additional_ap_purchase_variance: 0.1,
            additional_ap_purchase_price_factor: 3.0,
            market_sentiment_effect_on_purchase: 0.5,
            token_burn_percentage: 1.0,
            external_post_user_ratio: 0.4,
            external_post_usage_base_rate: 0.4,
            external_post_price_factor: 1.0,

            base_token_rate: 1.0,
            min_token_rate: 0.6,
            max_token_rate: 1.0,
            trend_window_size: 5,
            significant_change_threshold: 0.0001,
            user_growth_sensitivity: 0.05,
            user_decline_sensitivity: 1.2,
            smoothing_factor: 0.3,
        }
    }
}

impl SimulationParams {
    /// Parse a (possibly partial) JSON document over the defaults.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    /// Load a (possibly partial) JSON document from disk.
    pub fn from_json_file(path: &Path) -> Result<Self, crate::simulation::SimulationError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&content)?)
    }

    /// Backing pool at round zero: initial NFT sales plus seeded liquidity.
    pub fn initial_backing_pool(&self) -> f64 {
        self.base_price * self.initial_bots as f64 + self.initial_liquidity
    }

    /// Length of the sliding bot-count and token-value histories.
    pub fn history_window(&self) -> usize {
        self.trend_window_size * 2
    }

    /// Reject configurations the round loop cannot run.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.ap_types.is_empty() {
            return Err(ParamsError::NoApTypes);
        }
        for (&ap_type, cfg) in &self.ap_types {
            for (field, value) in [
                ("distribution", cfg.distribution),
                ("earning", cfg.earning),
                ("giving", cfg.giving),
            ] {
                if value < 0.0 {
                    return Err(ParamsError::NegativeApField { ap_type, field, value });
                }
            }
            if !(0.0..=1.0).contains(&cfg.usage_probability) {
                return Err(ParamsError::UsageProbabilityOutOfRange {
                    ap_type,
                    value: cfg.usage_probability,
                });
            }
        }
        if self.min_token_rate > self.max_token_rate {
            return Err(ParamsError::RateBoundsInverted {
                min: self.min_token_rate,
                max: self.max_token_rate,
            });
        }
        if self.base_token_rate < self.min_token_rate || self.base_token_rate > self.max_token_rate {
            return Err(ParamsError::BaseRateOutOfBounds {
                base: self.base_token_rate,
                min: self.min_token_rate,
                max: self.max_token_rate,
            });
        }
        if self.target_hours <= 0.0 {
            return Err(ParamsError::ZeroLimit("target_hours"));
        }
        if self.max_rounds == 0 {
            return Err(ParamsError::ZeroLimit("max_rounds"));
        }
        if self.trend_window_size == 0 {
            return Err(ParamsError::ZeroLimit("trend_window_size"));
        }
        if self.consecutive_increases_for_trend == 0 {
            return Err(ParamsError::ZeroLimit("consecutive_increases_for_trend"));
        }
        if self.consecutive_increases_for_trend + 1 > self.history_window() {
            return Err(ParamsError::TrendLongerThanWindow {
                needed: self.consecutive_increases_for_trend + 1,
                window: self.history_window(),
            });
        }
        if self.base_price <= 0.0 {
            return Err(ParamsError::NonPositiveBasePrice(self.base_price));
        }
        if !(0.1..=0.9).contains(&self.initial_market_sentiment) {
            return Err(ParamsError::SentimentOutOfRange(self.initial_market_sentiment));
        }
        if let Some(window) = self.frozen_growth {
            if window.end_hours < window.start_hours {
                return Err(ParamsError::FrozenWindowInverted {
                    start: window.start_hours,
                    end: window.end_hours,
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
