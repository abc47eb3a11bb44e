// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Utility Consumption Model

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::market::{draw_symmetric, TokenFlow};
use crate::params::{ApType, ApTypeConfig, SimulationParams};

/// Below this token value, spending scales down with the value.
pub const SOFT_SHUTOFF_VALUE: f64 = 0.001;
/// Largest share of the pre-burn supply one round may burn.
pub const MAX_BURN_FRACTION: f64 = 0.01;

const POST_SENTIMENT_EFFECT: f64 = 0.3;
const POST_USAGE_SPREAD: f64 = 0.05;
const POST_FEE_DIVISOR: f64 = 50.0;
const MAX_PURCHASE_QUANTITY: u32 = 5;

// ─── Pricing ─────────────────────────────────────────────────────────────────

/// Token price of one additional AP of the given type.
pub fn ap_unit_price(params: &SimulationParams, config: &ApTypeConfig) -> f64 {
    config.reward_ceiling() * params.additional_ap_purchase_price_factor
}

/// Token fee for one external POST usage.
pub fn external_post_fee(params: &SimulationParams) -> f64 {
    let distribution: f64 = params.ap_types.values().map(|c| c.distribution).sum();
    let rewards: f64 = params.ap_types.values().map(ApTypeConfig::reward_ceiling).sum();
    distribution * rewards * params.external_post_price_factor / POST_FEE_DIVISOR
}

/// Spending multiplier at near-zero token value. Scales rather than clamps.
pub fn soft_shutoff(spend: f64, token_value: f64) -> f64 {
    if token_value < SOFT_SHUTOFF_VALUE {
        spend * token_value * 1000.0
    } else {
        spend
    }
}

// ─── Additional AP purchases ─────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApPurchases {
    pub purchase_rate: f64,
    pub purchasing_users: u64,
    /// AP units bought per type.
    pub units: BTreeMap<ApType, u64>,
    pub tokens_spent: f64,
}

/// Sentiment-adjusted purchase rate with one symmetric noise draw, floored
/// at zero.
pub fn draw_purchase_rate<R: Rng + ?Sized>(params: &SimulationParams, sentiment: f64, rng: &mut R) -> f64 {
    let adjusted = params.additional_ap_purchase_base_rate
        * (1.0 + (sentiment - 0.5) * params.market_sentiment_effect_on_purchase);
    (adjusted + draw_symmetric(rng, params.additional_ap_purchase_variance)).max(0.0)
}

/// Active bots buying extra AP with tokens.
///
/// Draw order: the purchase rate, then per AP type (column order) and per
/// purchasing user one trial and, on success, one quantity in `1..=5`.
pub fn simulate_ap_purchases<R: Rng + ?Sized>(
    params: &SimulationParams,
    active_bots: u64,
    token_value: f64,
    sentiment: f64,
    rng: &mut R,
) -> ApPurchases {
    let purchase_rate = draw_purchase_rate(params, sentiment, rng);
    let purchasing_users = (active_bots as f64 * purchase_rate).floor() as u64;

    let mut units = BTreeMap::new();
    let mut tokens_spent = 0.0;
    for (&ap_type, config) in &params.ap_types {
        let price = ap_unit_price(params, config);
        let mut bought = 0u64;
        for _ in 0..purchasing_users {
            if rng.gen::<f64>() < config.usage_probability {
                let quantity = rng.gen_range(1..=MAX_PURCHASE_QUANTITY);
                bought += u64::from(quantity);
                tokens_spent += price * f64::from(quantity);
            }
        }
        units.insert(ap_type, bought);
    }

    ApPurchases {
        purchase_rate,
        purchasing_users,
        units,
        tokens_spent: soft_shutoff(tokens_spent, token_value),
    }
}

// ─── External POST usage ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PostUsage {
    pub external_users: u64,
    pub usages: u64,
    pub tokens_spent: f64,
}

/// Users without a bot paying per POST. One noise draw.
pub fn simulate_external_post_usage<R: Rng + ?Sized>(
    params: &SimulationParams,
    total_bots: u64,
    token_value: f64,
    sentiment: f64,
    rng: &mut R,
) -> PostUsage {
    let external_users = (total_bots as f64 * params.external_post_user_ratio).floor() as u64;
    let adjusted = params.external_post_usage_base_rate * (1.0 + (sentiment - 0.5) * POST_SENTIMENT_EFFECT);
    let usage_rate = (adjusted + draw_symmetric(rng, POST_USAGE_SPREAD)).max(0.0);
    let usages = (external_users as f64 * usage_rate).floor() as u64;

    PostUsage {
        external_users,
        usages,
        tokens_spent: soft_shutoff(usages as f64 * external_post_fee(params), token_value),
    }
}

// ─── Burn ────────────────────────────────────────────────────────────────────

/// Result of one round's purchase-and-burn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BurnOutcome {
    /// Spend times burn percentage, before the cap.
    pub candidate: f64,
    /// Tokens actually removed from supply.
    pub burned: f64,
    /// Burned tokens at the current value, folded into purchase statistics.
    pub purchase_equivalent: TokenFlow,
}

/// Burn `(ap_spend + post_spend) * burn_percentage`, capped at 1% of
/// `token_supply`. The supply is not touched here; callers subtract
/// `burned`.
pub fn apply_burn(
    params: &SimulationParams,
    ap_spend: f64,
    post_spend: f64,
    token_supply: f64,
    token_value: f64,
) -> BurnOutcome {
    let candidate = (ap_spend + post_spend) * params.token_burn_percentage;
    if candidate <= 0.0 {
        return BurnOutcome::default();
    }
    let burned = candidate.min(token_supply.max(0.0) * MAX_BURN_FRACTION);
    let purchase_equivalent = if token_value > 0.0 {
        TokenFlow {
            tokens: burned,
            usd: burned * token_value,
        }
    } else {
        TokenFlow::default()
    };
    BurnOutcome {
        candidate,
        burned,
        purchase_equivalent,
    }
}
