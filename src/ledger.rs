// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Neobots Tokenomics Simulation Suite - Shadow Ledger

//! Exact-decimal shadow of the token supply and backing pool.
//!
//! The round loop runs in `f64`. Every mint, burn, deposit and withdrawal is
//! mirrored here in [`Decimal`], and at the end of each round the two are
//! reconciled:
//!
//! ```text
//! |f64 - decimal| <= ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE * |decimal|
//! ```
//!
//! Drift beyond the bound means a flow was applied to one side only.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

const ABSOLUTE_TOLERANCE: Decimal = dec!(0.000001);
const RELATIVE_TOLERANCE: Decimal = dec!(0.000001);

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LedgerError {
    #[error("token supply drifted: ledger {ledger}, simulation {simulated}")]
    SupplyDrift { ledger: Decimal, simulated: Decimal },

    #[error("backing pool drifted: ledger {ledger}, simulation {simulated}")]
    PoolDrift { ledger: Decimal, simulated: Decimal },

    #[error("{0} overflowed the decimal range")]
    Overflow(&'static str),

    #[error("non-finite amount for {0}")]
    NonFinite(&'static str),
}

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

pub fn to_decimal(value: f64, what: &'static str) -> Result<Decimal, LedgerError> {
    if !value.is_finite() {
        return Err(LedgerError::NonFinite(what));
    }
    Decimal::from_f64(value).ok_or(LedgerError::Overflow(what))
}

pub fn from_decimal(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
// TokenLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenLedger {
    supply: Decimal,
    pool: Decimal,
    minted: Decimal,
    burned: Decimal,
}

impl TokenLedger {
    pub fn new(initial_supply: f64, initial_pool: f64) -> Result<Self, LedgerError> {
        Ok(Self {
            supply: to_decimal(initial_supply, "initial supply")?,
            pool: to_decimal(initial_pool, "initial pool")?,
            minted: Decimal::ZERO,
            burned: Decimal::ZERO,
        })
    }

    pub fn supply(&self) -> f64 {
        from_decimal(self.supply)
    }

    pub fn pool(&self) -> f64 {
        from_decimal(self.pool)
    }

    pub fn total_minted(&self) -> f64 {
        from_decimal(self.minted)
    }

    pub fn total_burned(&self) -> f64 {
        from_decimal(self.burned)
    }

    pub fn mint(&mut self, tokens: f64) -> Result<(), LedgerError> {
        let amount = to_decimal(tokens, "mint")?;
        self.supply = self.supply.checked_add(amount).ok_or(LedgerError::Overflow("supply"))?;
        self.minted = self.minted.checked_add(amount).ok_or(LedgerError::Overflow("minted"))?;
        Ok(())
    }

    pub fn burn(&mut self, tokens: f64) -> Result<(), LedgerError> {
        let amount = to_decimal(tokens, "burn")?;
        self.supply = self.supply.checked_sub(amount).ok_or(LedgerError::Overflow("supply"))?;
        self.burned = self.burned.checked_add(amount).ok_or(LedgerError::Overflow("burned"))?;
        Ok(())
    }

    pub fn deposit(&mut self, usd: f64) -> Result<(), LedgerError> {
        let amount = to_decimal(usd, "deposit")?;
        self.pool = self.pool.checked_add(amount).ok_or(LedgerError::Overflow("pool"))?;
        Ok(())
    }

    pub fn withdraw(&mut self, usd: f64) -> Result<(), LedgerError> {
        let amount = to_decimal(usd, "withdrawal")?;
        self.pool = self.pool.checked_sub(amount).ok_or(LedgerError::Overflow("pool"))?;
        Ok(())
    }

    /// Compare the simulation's running `f64` totals with the ledger.
    pub fn reconcile(&self, supply: f64, pool: f64) -> Result<(), LedgerError> {
        let simulated = to_decimal(supply, "supply")?;
        if drifted(self.supply, simulated) {
            return Err(LedgerError::SupplyDrift {
                ledger: self.supply,
                simulated,
            });
        }
        let simulated = to_decimal(pool, "pool")?;
        if drifted(self.pool, simulated) {
            return Err(LedgerError::PoolDrift {
                ledger: self.pool,
                simulated,
            });
        }
        Ok(())
    }
}

fn drifted(ledger: Decimal, simulated: Decimal) -> bool {
    let bound = ABSOLUTE_TOLERANCE + RELATIVE_TOLERANCE * ledger.abs();
    (ledger - simulated).abs() > bound
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flows_track_supply_and_pool() {
        let mut ledger = TokenLedger::new(10_000_000.0, 2_120.0).unwrap();
        ledger.mint(125.5).unwrap();
        ledger.burn(25.5).unwrap();
        ledger.deposit(80.0).unwrap();
        ledger.withdraw(200.0).unwrap();
        assert_eq!(ledger.supply(), 10_000_100.0);
        assert_eq!(ledger.pool(), 2_000.0);
        assert_eq!(ledger.total_minted(), 125.5);
        assert_eq!(ledger.total_burned(), 25.5);
    }

    #[test]
    fn test_reconcile_accepts_float_rounding() {
        let mut ledger = TokenLedger::new(0.0, 0.0).unwrap();
        let mut supply = 0.0;
        for _ in 0..1_000 {
            ledger.mint(0.1).unwrap();
            supply += 0.1;
        }
        assert!(ledger.reconcile(supply, 0.0).is_ok());
    }

    #[test]
    fn test_reconcile_rejects_one_sided_flow() {
        let mut ledger = TokenLedger::new(1_000.0, 500.0).unwrap();
        ledger.deposit(10.0).unwrap();
        assert!(matches!(
            ledger.reconcile(1_000.0, 500.0),
            Err(LedgerError::PoolDrift { .. })
        ));
        assert!(matches!(
            ledger.reconcile(1_001.0, 510.0),
            Err(LedgerError::SupplyDrift { .. })
        ));
        assert!(ledger.reconcile(1_000.0, 510.0).is_ok());
    }

    #[test]
    fn test_non_finite_amounts_rejected() {
        let mut ledger = TokenLedger::new(1.0, 1.0).unwrap();
        assert_eq!(ledger.mint(f64::NAN), Err(LedgerError::NonFinite("mint")));
        assert_eq!(ledger.deposit(f64::INFINITY), Err(LedgerError::NonFinite("deposit")));
    }

    #[test]
    fn test_serde_roundtrip() {
        let mut ledger = TokenLedger::new(100.0, 50.0).unwrap();
        ledger.mint(3.0).unwrap();
        let json = serde_json::to_string(&ledger).unwrap();
        let restored: TokenLedger = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, ledger);
    }
}
