// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Round Loop

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};
use wasm_bindgen::prelude::*;

use crate::ap_usage::round_ap_totals;
use crate::ledger::{LedgerError, TokenLedger};
use crate::market::{self, SENTIMENT_CEILING, SENTIMENT_FLOOR};
use crate::params::{ParamsError, SimulationParams};
use crate::population;
use crate::types::*;
use crate::utility::{self, MAX_BURN_FRACTION};

const BUYBACK_LOG_INTERVAL: u32 = 100;

// ─── Errors ──────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("invalid parameters: {0}")]
    Params(#[from] ParamsError),

    #[error("ledger mismatch: {0}")]
    Ledger(#[from] LedgerError),

    #[error("failed to read parameters: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse parameters: {0}")]
    Json(#[from] serde_json::Error),
}

// ─── TokenomicsSimulation struct ─────────────────────────────────────────────

#[wasm_bindgen]
pub struct TokenomicsSimulation {
    pub(crate) params: SimulationParams,
    pub(crate) state: SimulationState,
    pub(crate) records: ResultSequence,
    pub(crate) ledger: TokenLedger,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) seed: u64,
    pub(crate) finished: bool,
    pub(crate) reached_target_hours: bool,
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl TokenomicsSimulation {
    /// Validate `params` and set up round zero. All randomness comes from one
    /// ChaCha8 stream seeded with `seed`.
    pub fn with_params(params: SimulationParams, seed: u64) -> Result<Self, SimulationError> {
        params.validate()?;
        let state = SimulationState::new(&params);
        let ledger = TokenLedger::new(state.token_supply, state.backing_pool)?;
        Ok(Self {
            params,
            state,
            records: ResultSequence::new(),
            ledger,
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
            finished: false,
            reached_target_hours: false,
        })
    }

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn results(&self) -> &ResultSequence {
        &self.records
    }

    pub fn ledger(&self) -> &TokenLedger {
        &self.ledger
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Play one round. Returns `None` once the hour target or the round cap
    /// has been reached.
    pub fn step_round(&mut self) -> Result<Option<&RoundRecord>, SimulationError> {
        if self.finished {
            return Ok(None);
        }

        let record = self.play_round()?;
        self.records.push(record);

        if self.state.cumulative_hours >= self.params.target_hours {
            self.reached_target_hours = true;
            info!(
                target_hours = self.params.target_hours,
                round = self.state.round,
                "simulation reached target time"
            );
            self.finish();
        } else if self.state.round >= self.params.max_rounds {
            info!(max_rounds = self.params.max_rounds, "simulation reached round cap");
            self.finish();
        }

        Ok(self.records.last())
    }

    /// Play rounds until the run ends.
    pub fn run(&mut self) -> Result<&ResultSequence, SimulationError> {
        while !self.finished {
            self.step_round()?;
        }
        Ok(&self.records)
    }

    pub fn into_outcome(self) -> SimulationOutcome {
        SimulationOutcome {
            final_token_supply: self.state.token_supply,
            final_active_bots: self.state.active_bots,
            total_minted: self.ledger.total_minted(),
            total_burned: self.ledger.total_burned(),
            reached_target_hours: self.reached_target_hours,
            records: self.records,
        }
    }

    fn finish(&mut self) {
        self.finished = true;
        let stats = self.records.burn_statistics(self.params.initial_token_supply);
        info!(
            total_burned = stats.total_burned,
            burned_percent = stats.burned_percent_of_issued,
            ap_purchase_spend = stats.ap_purchase_spend,
            post_spend = stats.post_spend,
            "token burn statistics"
        );
    }

    fn play_round(&mut self) -> Result<RoundRecord, SimulationError> {
        let params = &self.params;
        let state = &mut self.state;
        let rng = &mut self.rng;

        // 1. Round duration
        state.round += 1;
        let duration = population::round_duration(state.total_bots);
        state.cumulative_hours += duration;

        // 2. Population
        let new_bots = population::bot_growth(params, duration, state.cumulative_hours, rng);
        state.total_bots += new_bots;
        state.active_bots = population::active_bots(params, state.total_bots, state.cumulative_hours);
        let total = state.total_bots;
        let active = state.active_bots;

        // 3. NFT sales at the mid-round average price
        let nft_price = market::nft_price(params, total as f64);
        let nbt_in = if new_bots > 0 {
            market::nft_price(params, total as f64 - new_bots as f64 / 2.0) * new_bots as f64
        } else {
            0.0
        };
        state.backing_pool += nbt_in;
        self.ledger.deposit(nbt_in)?;

        // 4. Conversion rate
        let token_rate = state.token_rate.update(params, total, duration);

        // 5. AP usage
        let ap = round_ap_totals(params, total, active, duration, rng);

        // 6. Minting
        let tokens_issued = ap.total_points * token_rate;
        let previous_supply = state.token_supply;
        state.token_supply += tokens_issued;
        self.ledger.mint(tokens_issued)?;

        // 7. Value after minting
        let mut value = market::token_value(params, state.backing_pool, state.token_supply);

        // 8. Sell side
        let sold = market::simulate_sales(
            params,
            active,
            value,
            state.initial_token_value,
            state.token_supply,
            state.market_sentiment,
            rng,
        );
        state.backing_pool -= sold.usd;
        self.ledger.withdraw(sold.usd)?;
        value = market::token_value(params, state.backing_pool, state.token_supply);

        // 9. Trend
        let in_uptrend = market::detect_uptrend(
            &state.value_history,
            params.consecutive_increases_for_trend,
            params.price_increase_threshold,
        );

        // 10. Buy side and team buyback
        let bought = market::simulate_purchases(
            params,
            total,
            new_bots,
            value,
            state.market_sentiment,
            in_uptrend,
            rng,
        );
        let buyback = state.buyback.execute(
            state.cumulative_hours,
            duration,
            state.previous_token_value,
            value,
            rng,
        );
        if state.round % BUYBACK_LOG_INTERVAL == 0 && buyback.usd > 0.0 {
            info!(
                hours = state.cumulative_hours,
                usd = buyback.usd,
                tokens = buyback.tokens,
                remaining = state.buyback.remaining(),
                "team buyback"
            );
        }
        let mut purchased = bought.merge(buyback);
        state.backing_pool += purchased.usd;
        self.ledger.deposit(purchased.usd)?;

        // 11. Value after trading
        value = market::token_value(params, state.backing_pool, state.token_supply);

        // 12. Utility spend and burn
        let ap_purchases = utility::simulate_ap_purchases(params, active, value, state.market_sentiment, rng);
        let post = utility::simulate_external_post_usage(params, total, value, state.market_sentiment, rng);
        let supply_before_burn = state.token_supply;
        let burn = utility::apply_burn(
            params,
            ap_purchases.tokens_spent,
            post.tokens_spent,
            state.token_supply,
            value,
        );
        state.token_supply -= burn.burned;
        self.ledger.burn(burn.burned)?;
        purchased = purchased.merge(burn.purchase_equivalent);
        let ap_purchase_users = if burn.candidate > 0.0 {
            let rate = utility::draw_purchase_rate(params, state.market_sentiment, rng);
            (active as f64 * rate).floor() as u64
        } else {
            0
        };

        // 13. Value after burn
        value = market::token_value(params, state.backing_pool, state.token_supply);

        // 14. Sentiment
        let change = if state.previous_token_value > 0.0 {
            (value - state.previous_token_value) / state.previous_token_value
        } else {
            0.0
        };
        state.market_sentiment = market::update_sentiment(params, state.market_sentiment, change, rng);
        state.previous_token_value = value;

        // 15. Value history
        state.value_history.push(value);
        if state.value_history.len() > params.history_window() {
            state.value_history.remove(0);
        }

        // 16. Derived metrics
        let market_cap = value * state.token_supply;
        let (inflation_rate, annualized_inflation_rate) = if previous_supply > 0.0 {
            let rate = tokens_issued / previous_supply * 100.0;
            (rate, rate * params.target_hours / duration)
        } else {
            (0.0, 0.0)
        };
        let minimum_roi_hours = market::minimum_roi_time(nft_price, ap.earnings_per_hour, token_rate, value);

        self.ledger.reconcile(state.token_supply, state.backing_pool)?;

        debug_assert!(state.active_bots <= state.total_bots);
        debug_assert!(state.token_supply >= 0.0, "negative supply {}", state.token_supply);
        debug_assert!(burn.burned <= supply_before_burn * MAX_BURN_FRACTION + f64::EPSILON);
        debug_assert!((SENTIMENT_FLOOR..=SENTIMENT_CEILING).contains(&state.market_sentiment));
        debug_assert!((params.min_token_rate..=params.max_token_rate).contains(&token_rate));

        debug!(
            round = state.round,
            hours = state.cumulative_hours,
            bots = total,
            active,
            token_value = value,
            "round complete"
        );

        // 17. Record
        Ok(RoundRecord {
            round: state.round,
            round_duration: duration,
            cumulative_hours: state.cumulative_hours,
            total_bots: total,
            active_bots: active,
            new_bots,
            ap_distributed: ap.distributed,
            ap_used: ap.used,
            total_points: ap.total_points,
            earnings_per_hour: ap.earnings_per_hour,
            token_rate,
            nbt_out: sold.usd,
            nbt_in,
            tokens_issued,
            tokens_sold: sold.tokens,
            usd_sold: sold.usd,
            tokens_purchased: purchased.tokens,
            usd_purchased: purchased.usd,
            team_buyback_usd: buyback.usd,
            market_sentiment: state.market_sentiment,
            in_uptrend,
            inflation_rate,
            annualized_inflation_rate,
            token_value: value,
            market_cap,
            nft_price,
            minimum_roi_hours,
            token_supply: state.token_supply,
            backing_pool: state.backing_pool,
            ap_purchase_tokens_spent: ap_purchases.tokens_spent,
            external_post_tokens_spent: post.tokens_spent,
            burn_candidate: burn.candidate,
            tokens_burned: burn.burned,
            ap_purchase_users,
            external_post_usages: post.usages,
            ap_breakdown: ap.per_type,
        })
    }
}

/// Run a full simulation with `params` and `seed`.
pub fn run_simulation(params: SimulationParams, seed: u64) -> Result<SimulationOutcome, SimulationError> {
    let mut sim = TokenomicsSimulation::with_params(params, seed)?;
    sim.run()?;
    Ok(sim.into_outcome())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::FrozenGrowthWindow;

    fn frozen(max_rounds: u32) -> SimulationParams {
        SimulationParams {
            max_rounds,
            frozen_growth: Some(FrozenGrowthWindow::always()),
            ..SimulationParams::default()
        }
    }

    #[test]
    fn test_rejects_invalid_params() {
        let params = SimulationParams {
            max_rounds: 0,
            ..SimulationParams::default()
        };
        assert!(matches!(
            TokenomicsSimulation::with_params(params, 1),
            Err(SimulationError::Params(ParamsError::ZeroLimit("max_rounds")))
        ));
    }

    #[test]
    fn test_stops_at_round_cap() {
        let mut sim = TokenomicsSimulation::with_params(frozen(7), 42).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.results().len(), 7);
        assert!(sim.is_finished());
        assert!(sim.step_round().unwrap().is_none());
        assert_eq!(sim.results().len(), 7);
    }

    #[test]
    fn test_stops_at_target_hours() {
        let params = SimulationParams {
            target_hours: 1.01,
            ..frozen(1_000)
        };
        let outcome = run_simulation(params, 3).unwrap();
        // three bots take 0.05 h per round
        assert_eq!(outcome.records.len(), 21);
        assert!(outcome.reached_target_hours);
        assert!(outcome.records.last().unwrap().cumulative_hours >= 1.01);
    }

    #[test]
    fn test_first_round_values() {
        let mut sim = TokenomicsSimulation::with_params(frozen(1), 5).unwrap();
        let record = sim.step_round().unwrap().unwrap().clone();
        assert_eq!(record.round, 1);
        assert_eq!(record.round_duration, 0.05);
        assert_eq!(record.total_bots, 3);
        assert_eq!(record.nbt_in, 0.0);
        // short history keeps the base rate
        assert_eq!(record.token_rate, 1.0);
        // below the early-stage threshold the default multiplier zeroes points
        assert_eq!(record.total_points, 0.0);
        assert_eq!(record.tokens_issued, 0.0);
        assert_eq!(record.ap_breakdown.len(), 6);
    }

    #[test]
    fn test_round_replays_model_calls_in_order() {
        // 400 bots clear the buy-pressure and early-stage thresholds
        let params = SimulationParams {
            initial_bots: 400,
            ..frozen(1)
        };
        let seed = 2024;
        let mut sim = TokenomicsSimulation::with_params(params.clone(), seed).unwrap();
        let record = sim.step_round().unwrap().unwrap().clone();

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = SimulationState::new(&params);

        let duration = population::round_duration(state.total_bots);
        let hours = duration;
        let new_bots = population::bot_growth(&params, duration, hours, &mut rng);
        let total = state.total_bots + new_bots;
        let active = population::active_bots(&params, total, hours);

        let rate = state.token_rate.update(&params, total, duration);
        let ap = round_ap_totals(&params, total, active, duration, &mut rng);
        state.token_supply += ap.total_points * rate;
        let mut value = market::token_value(&params, state.backing_pool, state.token_supply);

        let sold = market::simulate_sales(
            &params,
            active,
            value,
            state.initial_token_value,
            state.token_supply,
            state.market_sentiment,
            &mut rng,
        );
        state.backing_pool -= sold.usd;
        value = market::token_value(&params, state.backing_pool, state.token_supply);

        let in_uptrend = market::detect_uptrend(
            &state.value_history,
            params.consecutive_increases_for_trend,
            params.price_increase_threshold,
        );
        let bought = market::simulate_purchases(
            &params,
            total,
            new_bots,
            value,
            state.market_sentiment,
            in_uptrend,
            &mut rng,
        );
        let buyback = state.buyback.execute(hours, duration, state.previous_token_value, value, &mut rng);
        let mut purchased = bought.merge(buyback);
        state.backing_pool += purchased.usd;
        value = market::token_value(&params, state.backing_pool, state.token_supply);

        let ap_purchases =
            utility::simulate_ap_purchases(&params, active, value, state.market_sentiment, &mut rng);
        let post =
            utility::simulate_external_post_usage(&params, total, value, state.market_sentiment, &mut rng);
        let burn = utility::apply_burn(
            &params,
            ap_purchases.tokens_spent,
            post.tokens_spent,
            state.token_supply,
            value,
        );
        state.token_supply -= burn.burned;
        purchased = purchased.merge(burn.purchase_equivalent);
        let ap_purchase_users = if burn.candidate > 0.0 {
            let rate = utility::draw_purchase_rate(&params, state.market_sentiment, &mut rng);
            (active as f64 * rate).floor() as u64
        } else {
            0
        };
        value = market::token_value(&params, state.backing_pool, state.token_supply);

        let change = (value - state.previous_token_value) / state.previous_token_value;
        let sentiment = market::update_sentiment(&params, state.market_sentiment, change, &mut rng);

        // every stage of the round drew from the stream
        assert!(record.tokens_sold > 0.0);
        assert!(record.usd_purchased > 0.0);
        assert!(record.tokens_burned > 0.0);
        assert!(record.ap_purchase_users > 0);

        assert_eq!(record.tokens_sold, sold.tokens);
        assert_eq!(record.usd_purchased, purchased.usd);
        assert_eq!(record.tokens_purchased, purchased.tokens);
        assert_eq!(record.tokens_burned, burn.burned);
        assert_eq!(record.external_post_usages, post.usages);
        assert_eq!(record.ap_purchase_users, ap_purchase_users);
        assert_eq!(record.market_sentiment, sentiment);
        assert_eq!(record.token_value, value);
        assert_eq!(sim.state().token_supply, state.token_supply);
    }

    #[test]
    fn test_history_trimmed() {
        let mut sim = TokenomicsSimulation::with_params(frozen(50), 9).unwrap();
        sim.run().unwrap();
        assert_eq!(sim.state().value_history.len(), sim.params().history_window());
        assert_eq!(sim.state().token_rate.history().len(), sim.params().history_window());
    }

    #[test]
    fn test_ledger_tracks_state() {
        let params = SimulationParams {
            max_rounds: 300,
            ..SimulationParams::default()
        };
        let mut sim = TokenomicsSimulation::with_params(params, 77).unwrap();
        sim.run().unwrap();
        let supply = sim.state().token_supply;
        assert!((sim.ledger().supply() - supply).abs() <= 1e-6 * supply + 1e-6);
        let issued: f64 = sim.results().iter().map(|r| r.tokens_issued).sum();
        assert!((sim.ledger().total_minted() - issued).abs() <= 1e-6 * issued + 1e-6);
    }
}
