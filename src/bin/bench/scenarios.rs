// Scenario Definitions: parameter overlays on top of the base bundle
// Zero engine changes: every scenario is a horizon plus a configure function

use tokenomics_engine::params::{FrozenGrowthWindow, SimulationParams};

// ─── Scenario Configuration ─────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    /// Simulated hours before the run stops.
    pub target_hours: f64,
    pub max_rounds: u32,
    /// Overlay applied to the base parameters after the horizon is set.
    pub configure: Option<fn(&mut SimulationParams)>,
    pub criteria: PassCriteria,
}

impl Scenario {
    pub fn params(&self, base: &SimulationParams) -> SimulationParams {
        let mut params = base.clone();
        params.target_hours = self.target_hours;
        params.max_rounds = self.max_rounds;
        if let Some(configure) = self.configure {
            configure(&mut params);
        }
        params
    }
}

pub struct PassCriteria {
    pub require_monotonic_hours: bool,
    pub require_bounds: bool,
    pub require_non_negative_supply: bool,
    pub require_burn_cap: bool,
    pub min_final_bots: Option<u64>,
    pub max_final_bots: Option<u64>,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            require_monotonic_hours: true,
            require_bounds: true,
            require_non_negative_supply: true,
            require_burn_cap: true,
            min_final_bots: None,
            max_final_bots: None,
        }
    }
}

// ─── Overlays ───────────────────────────────────────────────────────────────

fn freeze_growth(params: &mut SimulationParams) {
    params.frozen_growth = Some(FrozenGrowthWindow::always());
}

fn no_buyback(params: &mut SimulationParams) {
    params.team_buyback_total = 0.0;
}

fn high_burn(params: &mut SimulationParams) {
    params.additional_ap_purchase_base_rate *= 2.0;
}

fn early_bonus(params: &mut SimulationParams) {
    params.early_stage_bonus_multiplier = 2.0;
}

// ─── Scenario Table ─────────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario { name: "BASELINE", label: "Baseline (6 months)", category: "reference",
            target_hours: 4380.0, max_rounds: 50_000,
            configure: None,
            criteria: PassCriteria { min_final_bots: Some(3), ..Default::default() } },
        Scenario { name: "FROZEN_GROWTH", label: "Frozen Growth", category: "population",
            target_hours: 500.0, max_rounds: 50_000,
            configure: Some(freeze_growth),
            criteria: PassCriteria { min_final_bots: Some(3), max_final_bots: Some(3), ..Default::default() } },
        Scenario { name: "NO_BUYBACK", label: "No Team Buyback", category: "market",
            target_hours: 744.0, max_rounds: 50_000,
            configure: Some(no_buyback),
            criteria: PassCriteria::default() },
        Scenario { name: "HIGH_BURN", label: "High AP Purchase Burn", category: "utility",
            target_hours: 2232.0, max_rounds: 50_000,
            configure: Some(high_burn),
            criteria: PassCriteria::default() },
        Scenario { name: "EARLY_BONUS", label: "Early-Stage Bonus x2", category: "issuance",
            target_hours: 744.0, max_rounds: 50_000,
            configure: Some(early_bonus),
            criteria: PassCriteria::default() },
    ]
}
