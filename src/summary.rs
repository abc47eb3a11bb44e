// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Result Queries

//! Read-only queries over a finished [`ResultSequence`].
//!
//! These back the milestone and AP tables of the bench runner. Nothing here
//! formats output; callers decide how to render.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::params::{ApType, SimulationParams};
use crate::types::{ResultSequence, RoundRecord};

/// Checkpoints reported after a run: 1 day, 1 week, 1 month, 3 months,
/// 6 months, 1 year.
pub const DEFAULT_MILESTONES: [(&str, f64); 6] = [
    ("1 day", 24.0),
    ("1 week", 168.0),
    ("1 month", 744.0),
    ("3 months", 2232.0),
    ("6 months", 4380.0),
    ("1 year", 8760.0),
];

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub label: String,
    pub hours: f64,
    pub round: u32,
    pub total_bots: u64,
    /// Linear interpolation between initial and final supply.
    pub approximate_supply: f64,
    pub token_value: f64,
    pub usd_sold: f64,
    pub usd_purchased: f64,
    pub team_buyback_to_date: f64,
    pub market_cap: f64,
    /// `None` when the participant never recovers the NFT price.
    pub minimum_roi_hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApTypeTotals {
    pub self_points: f64,
    pub giving_points: f64,
    pub total_points: f64,
    /// Percent of all points across types.
    pub share_percent: f64,
    /// Distribution per round at the final active-bot count.
    pub final_distribution: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BurnStatistics {
    pub total_burned: f64,
    /// Percent of initial supply plus everything issued.
    pub burned_percent_of_issued: f64,
    pub ap_purchase_spend: f64,
    pub post_spend: f64,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

impl ResultSequence {
    /// Row whose cumulative hours are closest to `hours`; the earliest wins
    /// ties.
    pub fn nearest_by_hours(&self, hours: f64) -> Option<&RoundRecord> {
        let mut best: Option<(&RoundRecord, f64)> = None;
        for record in self {
            let distance = (record.cumulative_hours - hours).abs();
            match best {
                Some((_, d)) if d <= distance => {}
                _ => best = Some((record, distance)),
            }
        }
        best.map(|(record, _)| record)
    }

    pub fn milestones(
        &self,
        params: &SimulationParams,
        final_supply: f64,
        checkpoints: &[(&str, f64)],
    ) -> Vec<Milestone> {
        checkpoints
            .iter()
            .filter_map(|&(label, hours)| {
                let row = self.nearest_by_hours(hours)?;
                Some(Milestone {
                    label: label.to_string(),
                    hours,
                    round: row.round,
                    total_bots: row.total_bots,
                    approximate_supply: approximate_supply(params, final_supply, hours),
                    token_value: row.token_value,
                    usd_sold: row.usd_sold,
                    usd_purchased: row.usd_purchased,
                    team_buyback_to_date: team_buyback_to_date(params, hours),
                    market_cap: row.market_cap,
                    minimum_roi_hours: row.roi_is_finite().then_some(row.minimum_roi_hours),
                })
            })
            .collect()
    }

    /// Points per AP type summed over all rounds, in column order.
    pub fn ap_type_totals(&self) -> BTreeMap<ApType, ApTypeTotals> {
        let mut totals: BTreeMap<ApType, ApTypeTotals> = BTreeMap::new();
        for record in self {
            for (&ap_type, usage) in &record.ap_breakdown {
                let entry = totals.entry(ap_type).or_default();
                entry.self_points += usage.self_points;
                entry.giving_points += usage.giving_points;
                entry.total_points += usage.total_points();
            }
        }

        let grand_total: f64 = totals.values().map(|t| t.total_points).sum();
        let last = self.last();
        for (ap_type, entry) in totals.iter_mut() {
            entry.share_percent = if grand_total > 0.0 {
                entry.total_points / grand_total * 100.0
            } else {
                0.0
            };
            entry.final_distribution = last
                .and_then(|record| record.ap_breakdown.get(ap_type))
                .map_or(0.0, |usage| usage.distributed);
        }
        totals
    }

    pub fn burn_statistics(&self, initial_supply: f64) -> BurnStatistics {
        let total_burned: f64 = self.iter().map(|r| r.burn_candidate).sum();
        let issued: f64 = self.iter().map(|r| r.tokens_issued).sum();
        let denominator = initial_supply + issued;
        BurnStatistics {
            total_burned,
            burned_percent_of_issued: if denominator > 0.0 {
                total_burned / denominator * 100.0
            } else {
                0.0
            },
            ap_purchase_spend: self.iter().map(|r| r.ap_purchase_tokens_spent).sum(),
            post_spend: self.iter().map(|r| r.external_post_tokens_spent).sum(),
        }
    }
}

/// Supply at `hours` assuming linear issuance over the target horizon.
pub fn approximate_supply(params: &SimulationParams, final_supply: f64, hours: f64) -> f64 {
    let proportion = if params.target_hours > 0.0 {
        (hours / params.target_hours).min(1.0)
    } else {
        0.0
    };
    params.initial_token_supply + (final_supply - params.initial_token_supply) * proportion
}

/// Scheduled (not realized) buyback spend up to `hours`.
pub fn team_buyback_to_date(params: &SimulationParams, hours: f64) -> f64 {
    let start = params.team_buyback_start_hour;
    let end = start + params.team_buyback_duration;
    if hours <= start {
        0.0
    } else if hours >= end {
        params.team_buyback_total
    } else {
        params.team_buyback_total * (hours - start) / params.team_buyback_duration
    }
}
