// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Market Model

//! Price formation and trader behavior.
//!
//! Everything here is a free function over explicit inputs plus a caller
//! supplied random stream, except [`TeamBuyback`], which carries the
//! remaining budget between rounds.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::params::SimulationParams;

pub const SENTIMENT_FLOOR: f64 = 0.1;
pub const SENTIMENT_CEILING: f64 = 0.9;

const MIN_SELL_FRACTION: f64 = 0.05;
const SENTIMENT_DAMPENING: f64 = 0.5;
const BUYBACK_DECLINE_BOOST: f64 = 2.0;

// ─── Pricing ─────────────────────────────────────────────────────────────────

/// NFT price for a population of `bot_count`. Fractional counts are allowed
/// for the mid-round average price.
pub fn nft_price(params: &SimulationParams, bot_count: f64) -> f64 {
    params.base_price * (1.0 + params.increase_factor * (bot_count.max(0.0) / 100.0).sqrt())
}

/// Backing pool per circulating token; the base price when supply is empty.
pub fn token_value(params: &SimulationParams, backing_pool: f64, token_supply: f64) -> f64 {
    if token_supply > 0.0 {
        backing_pool / token_supply
    } else {
        params.base_price
    }
}

/// Hours until a bot's earnings pay back its NFT, or `+inf` when it earns
/// nothing.
pub fn minimum_roi_time(nft_price: f64, points_per_hour: f64, token_rate: f64, token_value: f64) -> f64 {
    let usd_per_hour = points_per_hour * token_rate * token_value;
    if usd_per_hour <= 0.0 {
        f64::INFINITY
    } else {
        nft_price / usd_per_hour
    }
}

// ─── Flows ───────────────────────────────────────────────────────────────────

/// Tokens moved in one direction and their USD equivalent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenFlow {
    pub tokens: f64,
    pub usd: f64,
}

impl TokenFlow {
    pub fn merge(self, other: TokenFlow) -> TokenFlow {
        TokenFlow {
            tokens: self.tokens + other.tokens,
            usd: self.usd + other.usd,
        }
    }
}

/// Probability that an active bot sells this round.
pub fn sell_probability(params: &SimulationParams, token_value: f64, initial_token_value: f64, sentiment: f64) -> f64 {
    let price_ratio = if initial_token_value > 0.0 {
        token_value / initial_token_value
    } else {
        1.0
    };
    let modifier = ((price_ratio - params.price_threshold_for_increased_selling)
        * params.sell_probability_increase_with_price)
        .max(0.0);
    params.base_sell_probability + modifier * (1.0 - sentiment)
}

/// Sell side: each selling bot dumps a random fraction of the average
/// holding. One draw per seller.
pub fn simulate_sales<R: Rng + ?Sized>(
    params: &SimulationParams,
    active_bots: u64,
    token_value: f64,
    initial_token_value: f64,
    token_supply: f64,
    sentiment: f64,
    rng: &mut R,
) -> TokenFlow {
    if active_bots == 0 {
        return TokenFlow::default();
    }
    let probability = sell_probability(params, token_value, initial_token_value, sentiment);
    let sellers = (active_bots as f64 * probability).floor().max(0.0) as u64;
    let holding = token_supply / active_bots as f64;

    let mut tokens = 0.0;
    for _ in 0..sellers {
        let fraction = draw_uniform(rng, MIN_SELL_FRACTION, params.max_sell_percentage);
        tokens += holding * fraction;
    }
    TokenFlow {
        tokens,
        usd: tokens * token_value,
    }
}

/// True when the last `consecutive` steps of `history` each rose by more
/// than `threshold`. Walks backward and stops at the first failing step.
pub fn detect_uptrend(history: &[f64], consecutive: usize, threshold: f64) -> bool {
    if history.len() < consecutive + 1 {
        return false;
    }
    let run = history
        .windows(2)
        .rev()
        .take(consecutive)
        .take_while(|pair| pair[1] > pair[0] * (1.0 + threshold))
        .count();
    run >= consecutive
}

/// Buy side from existing and newly joined bots. Below the buy-pressure
/// threshold nothing is drawn. Two draws per buyer: variance, then whale.
pub fn simulate_purchases<R: Rng + ?Sized>(
    params: &SimulationParams,
    total_bots: u64,
    new_bots: u64,
    token_value: f64,
    sentiment: f64,
    in_uptrend: bool,
    rng: &mut R,
) -> TokenFlow {
    if total_bots < params.bot_threshold_for_buy_pressure {
        return TokenFlow::default();
    }

    let mut probability = params.base_buy_probability * sentiment;
    if in_uptrend {
        probability *= params.uptrend_buy_multiplier;
    }
    let existing = total_bots.saturating_sub(new_bots);
    let existing_buyers = (existing as f64 * probability).floor() as u64;
    let new_buyers = (new_bots as f64 * params.new_user_buy_factor).floor() as u64;

    let mut usd = 0.0;
    for _ in 0..existing_buyers + new_buyers {
        let variance = draw_symmetric(rng, params.max_purchase_variance);
        let mut amount = params.average_token_purchase_usd * (1.0 + variance);
        if rng.gen::<f64>() < params.whale_probability {
            amount *= params.whale_multiplier;
        }
        usd += amount;
    }

    TokenFlow {
        tokens: if token_value > 0.0 { usd / token_value } else { 0.0 },
        usd,
    }
}

// ─── Team Buyback ────────────────────────────────────────────────────────────

/// Scheduled, budget-capped price support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBuyback {
    remaining: f64,
    per_hour: f64,
    start_hour: f64,
    end_hour: f64,
    noise: f64,
}

impl TeamBuyback {
    pub fn new(params: &SimulationParams) -> Self {
        let per_hour = if params.team_buyback_duration > 0.0 {
            params.team_buyback_total / params.team_buyback_duration
        } else {
            0.0
        };
        Self {
            remaining: params.team_buyback_total.max(0.0),
            per_hour,
            start_hour: params.team_buyback_start_hour,
            end_hour: params.team_buyback_start_hour + params.team_buyback_duration,
            noise: params.team_buyback_noise,
        }
    }

    pub fn remaining(&self) -> f64 {
        self.remaining
    }

    pub fn is_active(&self, cumulative_hours: f64) -> bool {
        self.remaining > 0.0 && cumulative_hours >= self.start_hour && cumulative_hours <= self.end_hour
    }

    /// Spend this round's allocation. Draws one noise sample only while the
    /// window is open and budget remains.
    pub fn execute<R: Rng + ?Sized>(
        &mut self,
        cumulative_hours: f64,
        round_duration: f64,
        previous_value: f64,
        token_value: f64,
        rng: &mut R,
    ) -> TokenFlow {
        if !self.is_active(cumulative_hours) {
            return TokenFlow::default();
        }

        let base = self.per_hour * round_duration;
        let decline = if previous_value > 0.0 {
            ((previous_value - token_value) / previous_value).max(0.0)
        } else {
            0.0
        };
        let boost = 1.0 + decline * BUYBACK_DECLINE_BOOST;
        let noise = draw_uniform(rng, 1.0 - self.noise, 1.0 + self.noise);

        let usd = self.remaining.min(base * boost * noise).max(0.0);
        self.remaining -= usd;

        TokenFlow {
            tokens: if token_value > 0.0 { usd / token_value } else { 0.0 },
            usd,
        }
    }
}

// ─── Sentiment ───────────────────────────────────────────────────────────────

/// Half the relative value change plus symmetric noise, clamped to
/// `[0.1, 0.9]`.
pub fn update_sentiment<R: Rng + ?Sized>(
    params: &SimulationParams,
    previous: f64,
    value_change: f64,
    rng: &mut R,
) -> f64 {
    let noise = draw_symmetric(rng, params.market_sentiment_volatility);
    (previous + value_change * SENTIMENT_DAMPENING + noise).clamp(SENTIMENT_FLOOR, SENTIMENT_CEILING)
}

// ─── Sampling helpers ────────────────────────────────────────────────────────

/// Uniform sample in `[low, high)`; degenerate ranges return `low` and still
/// consume one sample so the stream position does not depend on parameters.
pub(crate) fn draw_uniform<R: Rng + ?Sized>(rng: &mut R, low: f64, high: f64) -> f64 {
    let unit: f64 = rng.gen();
    if high > low {
        low + (high - low) * unit
    } else {
        low
    }
}

pub(crate) fn draw_symmetric<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    draw_uniform(rng, -spread.abs(), spread.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_nft_price_at_zero_and_hundred() {
        let params = SimulationParams::default();
        assert_eq!(nft_price(&params, 0.0), 40.0);
        // 40 * (1 + 0.2 * 1)
        assert!((nft_price(&params, 100.0) - 48.0).abs() < 1e-12);
    }

    #[test]
    fn test_nft_price_monotone() {
        let params = SimulationParams::default();
        let mut last = nft_price(&params, 0.0);
        for n in 1..5_000 {
            let price = nft_price(&params, n as f64);
            assert!(price >= last);
            last = price;
        }
    }

    #[test]
    fn test_token_value_falls_back_to_base_price() {
        let params = SimulationParams::default();
        assert_eq!(token_value(&params, 1_000.0, 0.0), 40.0);
        assert_eq!(token_value(&params, 1_000.0, 500.0), 2.0);
    }

    #[test]
    fn test_minimum_roi_time() {
        assert_eq!(minimum_roi_time(40.0, 0.0, 1.0, 0.5), f64::INFINITY);
        assert_eq!(minimum_roi_time(40.0, 10.0, 1.0, 0.0), f64::INFINITY);
        assert!((minimum_roi_time(40.0, 10.0, 0.5, 2.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_uptrend_strict_run() {
        assert!(detect_uptrend(&[100.0, 101.0, 102.0, 103.0], 3, 0.0));
        assert!(!detect_uptrend(&[100.0, 101.0, 100.5, 103.0], 3, 0.0));
    }

    #[test]
    fn test_uptrend_needs_enough_history() {
        assert!(!detect_uptrend(&[101.0, 102.0, 103.0], 3, 0.0));
        assert!(!detect_uptrend(&[], 3, 0.0));
    }

    #[test]
    fn test_uptrend_only_checks_latest_steps() {
        // earlier dip is outside the three-step run
        assert!(detect_uptrend(&[100.0, 90.0, 91.0, 92.0, 93.0], 3, 0.0));
        // threshold of 5% rejects 1% steps
        assert!(!detect_uptrend(&[100.0, 101.0, 102.0, 103.0], 3, 0.05));
    }

    #[test]
    fn test_sell_probability_rises_above_price_threshold() {
        let params = SimulationParams::default();
        assert_eq!(sell_probability(&params, 40.0, 40.0, 0.5), 0.05);
        // ratio 3 -> (3 - 2) * 0.02 * (1 - 0.5)
        assert!((sell_probability(&params, 120.0, 40.0, 0.5) - 0.06).abs() < 1e-12);
    }

    #[test]
    fn test_sales_bounded_by_fraction_range() {
        let params = SimulationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let flow = simulate_sales(&params, 1_000, 1.0, 40.0, 1_000_000.0, 0.5, &mut rng);
        // 50 sellers, 1000 tokens average holding
        assert!(flow.tokens >= 50.0 * 1_000.0 * 0.05);
        assert!(flow.tokens <= 50.0 * 1_000.0 * 0.2);
        assert_eq!(flow.usd, flow.tokens);
    }

    #[test]
    fn test_no_buy_pressure_below_threshold() {
        let params = SimulationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut untouched = ChaCha8Rng::seed_from_u64(2);
        let flow = simulate_purchases(&params, 49, 10, 1.0, 0.9, true, &mut rng);
        assert_eq!(flow, TokenFlow::default());
        assert_eq!(rng.gen::<u64>(), untouched.gen::<u64>());
    }

    #[test]
    fn test_purchases_convert_at_token_value() {
        let params = SimulationParams {
            whale_probability: 0.0,
            max_purchase_variance: 0.0,
            ..SimulationParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        // existing 1000 * (0.03 * 0.5) = 15 buyers, new 10 * 0.3 = 3 buyers
        let flow = simulate_purchases(&params, 1_010, 10, 2.0, 0.5, false, &mut rng);
        assert!((flow.usd - 1_800.0).abs() < 1e-9);
        assert!((flow.tokens - 900.0).abs() < 1e-9);
    }

    #[test]
    fn test_uptrend_multiplies_buyers() {
        let params = SimulationParams {
            whale_probability: 0.0,
            max_purchase_variance: 0.0,
            ..SimulationParams::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let flow = simulate_purchases(&params, 1_000, 0, 1.0, 0.5, true, &mut rng);
        // floor(1000 * 0.045) = 45 buyers
        assert!((flow.usd - 4_500.0).abs() < 1e-9);
    }

    #[test]
    fn test_buyback_outside_window_is_idle() {
        let params = SimulationParams::default();
        let mut buyback = TeamBuyback::new(&params);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        assert_eq!(buyback.execute(10.0, 1.0, 1.0, 1.0, &mut rng), TokenFlow::default());
        assert_eq!(buyback.execute(251.0, 1.0, 1.0, 1.0, &mut rng), TokenFlow::default());
        assert_eq!(buyback.remaining(), 2_000.0);
    }

    #[test]
    fn test_buyback_noise_band_and_decline_boost() {
        let params = SimulationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(8);

        let mut flat = TeamBuyback::new(&params);
        let spent = flat.execute(60.0, 1.0, 1.0, 1.0, &mut rng).usd;
        // 10 USD/h base, noise in [0.7, 1.3]
        assert!((7.0..=13.0).contains(&spent));

        let mut falling = TeamBuyback::new(&params);
        let spent = falling.execute(60.0, 1.0, 1.0, 0.5, &mut rng).usd;
        // 50% decline doubles the base
        assert!((14.0..=26.0).contains(&spent));
    }

    #[test]
    fn test_buyback_never_exceeds_budget() {
        let params = SimulationParams::default();
        let mut buyback = TeamBuyback::new(&params);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        let mut spent = 0.0;
        let mut hour = 50.0;
        while hour <= 250.0 {
            spent += buyback.execute(hour, 5.0, 1.0, 0.1, &mut rng).usd;
            hour += 5.0;
        }
        assert!(spent <= 2_000.0 + 1e-9);
        assert!(buyback.remaining() >= 0.0);
    }

    #[test]
    fn test_sentiment_stays_clamped() {
        let params = SimulationParams::default();
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let mut sentiment = 0.5;
        for step in 0..1_000 {
            let change = if step % 2 == 0 { 5.0 } else { -5.0 };
            sentiment = update_sentiment(&params, sentiment, change, &mut rng);
            assert!((SENTIMENT_FLOOR..=SENTIMENT_CEILING).contains(&sentiment));
        }
    }
}
