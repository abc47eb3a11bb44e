// Per-Round Metric Trackers: invariant audit and market extremes
// Fed one RoundRecord at a time so a run never needs a second pass

use tokenomics_engine::market::{SENTIMENT_CEILING, SENTIMENT_FLOOR};
use tokenomics_engine::utility::MAX_BURN_FRACTION;
use tokenomics_engine::{RoundRecord, SimulationParams};

const BURN_CAP_SLACK: f64 = 1e-9;

// ─── Invariant Auditor ──────────────────────────────────────────────────────

/// Counts rounds that break an invariant of the round loop.
pub struct InvariantAuditor {
    pub non_monotonic_hours: u32,
    pub sentiment_out_of_bounds: u32,
    pub rate_out_of_bounds: u32,
    pub negative_supply: u32,
    pub burn_cap_breaches: u32,
    pub active_above_total: u32,
    last_hours: f64,
    min_rate: f64,
    max_rate: f64,
}

impl InvariantAuditor {
    pub fn new(params: &SimulationParams) -> Self {
        Self {
            non_monotonic_hours: 0,
            sentiment_out_of_bounds: 0,
            rate_out_of_bounds: 0,
            negative_supply: 0,
            burn_cap_breaches: 0,
            active_above_total: 0,
            last_hours: 0.0,
            min_rate: params.min_token_rate,
            max_rate: params.max_token_rate,
        }
    }

    pub fn record_round(&mut self, record: &RoundRecord) {
        if record.cumulative_hours <= self.last_hours {
            self.non_monotonic_hours += 1;
        }
        self.last_hours = record.cumulative_hours;

        if !(SENTIMENT_FLOOR..=SENTIMENT_CEILING).contains(&record.market_sentiment) {
            self.sentiment_out_of_bounds += 1;
        }
        if !(self.min_rate..=self.max_rate).contains(&record.token_rate) {
            self.rate_out_of_bounds += 1;
        }
        if record.token_supply < 0.0 {
            self.negative_supply += 1;
        }
        // supply before the burn is the recorded supply plus what was burned
        let pre_burn_supply = record.token_supply + record.tokens_burned;
        if record.tokens_burned > pre_burn_supply * MAX_BURN_FRACTION + BURN_CAP_SLACK {
            self.burn_cap_breaches += 1;
        }
        if record.active_bots > record.total_bots {
            self.active_above_total += 1;
        }
    }

    pub fn bounds_hold(&self) -> bool {
        self.sentiment_out_of_bounds == 0 && self.rate_out_of_bounds == 0 && self.active_above_total == 0
    }
}

// ─── Market Extremes ────────────────────────────────────────────────────────

/// Running totals and extremes of the market side.
pub struct MarketTracker {
    pub usd_sold: f64,
    pub usd_purchased: f64,
    pub team_buyback: f64,
    pub uptrend_rounds: u32,
    pub min_sentiment: f64,
    pub max_sentiment: f64,
    pub peak_token_value: f64,
}

impl MarketTracker {
    pub fn new() -> Self {
        Self {
            usd_sold: 0.0,
            usd_purchased: 0.0,
            team_buyback: 0.0,
            uptrend_rounds: 0,
            min_sentiment: f64::INFINITY,
            max_sentiment: f64::NEG_INFINITY,
            peak_token_value: 0.0,
        }
    }

    pub fn record_round(&mut self, record: &RoundRecord) {
        self.usd_sold += record.usd_sold;
        self.usd_purchased += record.usd_purchased;
        self.team_buyback += record.team_buyback_usd;
        if record.in_uptrend {
            self.uptrend_rounds += 1;
        }
        self.min_sentiment = self.min_sentiment.min(record.market_sentiment);
        self.max_sentiment = self.max_sentiment.max(record.market_sentiment);
        self.peak_token_value = self.peak_token_value.max(record.token_value);
    }
}
