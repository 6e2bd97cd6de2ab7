// Copyright (C) 2026 Parity Technologies (UK) Ltd.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Conversion of minimal-unit amounts to whole tokens, and the alert decision.
//!
//! Amounts stay integers: a magnitude is split into whole tokens and a
//! four-digit fraction, and the float threshold is converted once into the
//! same fixed-point scale before comparing.

use primitive_types::U256;

/// Fraction digits kept when converting to whole-token units.
pub const FRACTION_DIGITS: u32 = 4;
const FRACTION_SCALE: u64 = 10_000;

fn pow10(exp: u32) -> Option<U256> {
    U256::from(10u8).checked_pow(U256::from(exp))
}

/// An amount in whole tokens with four fraction digits, truncated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HumanAmount {
    pub whole: U256,
    /// Ten-thousandths, always below 10 000.
    pub frac: u64,
}

impl HumanAmount {
    /// `whole = amount / 10^decimals`,
    /// `frac = (amount % 10^decimals) * 10^4 / 10^decimals`.
    pub fn from_minimal(amount: U256, decimals: u8) -> Self {
        let decimals = u32::from(decimals);
        // 10^decimals above U256::MAX means every amount is below one token.
        let (whole, remainder) = match pow10(decimals) {
            Some(divisor) => (amount / divisor, amount % divisor),
            None => (U256::zero(), amount),
        };

        let frac = if decimals >= FRACTION_DIGITS {
            pow10(decimals - FRACTION_DIGITS)
                .map(|divisor| remainder / divisor)
                .unwrap_or_default()
        } else {
            remainder * U256::from(10u64.pow(FRACTION_DIGITS - decimals))
        };

        Self {
            whole,
            frac: frac.low_u64(),
        }
    }

    /// The amount in ten-thousandths of a token.
    pub fn scaled(&self) -> U256 {
        self.whole
            .saturating_mul(U256::from(FRACTION_SCALE))
            .saturating_add(U256::from(self.frac))
    }

    /// `true` when the amount is at least `threshold` whole tokens.
    pub fn meets(&self, threshold: f64) -> bool {
        self.scaled() >= threshold_units(threshold)
    }
}

/// A whole-token threshold in ten-thousandths, rounded up.
///
/// Thresholds that are a whole number of ten-thousandths up to float noise
/// (`0.0001 * 10^4 = 1.0000000000000002`) round to that number.
pub fn threshold_units(threshold: f64) -> U256 {
    if threshold.is_nan() || threshold <= 0.0 {
        return U256::zero();
    }

    let scaled = threshold * FRACTION_SCALE as f64;
    let rounded = scaled.round();
    let units = if (scaled - rounded).abs() <= 1e-6 * rounded.max(1.0) {
        rounded
    } else {
        scaled.ceil()
    };

    // Float to int casts saturate.
    U256::from(units as u128)
}

/// Alert gating shared by every reconciliation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPolicy {
    pub enabled: bool,
    pub min_change: f64,
}

impl AlertPolicy {
    pub fn new(enabled: bool, min_change: f64) -> Self {
        Self {
            enabled,
            min_change,
        }
    }

    /// Alert iff notifications are on globally and for the account, and the
    /// change is at least the threshold (inclusive).
    pub fn should_alert(&self, delta: U256, decimals: u8, account_notify: bool) -> bool {
        self.enabled
            && account_notify
            && !delta.is_zero()
            && HumanAmount::from_minimal(delta, decimals).meets(self.min_change)
    }
}

impl From<&config::NotifyConfig> for AlertPolicy {
    fn from(notify: &config::NotifyConfig) -> Self {
        Self::new(notify.enabled, notify.min_balance_change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minimal() {
        let amount = HumanAmount::from_minimal(U256::from(1_000_001_000_000u64), 10);
        assert_eq!(amount.whole, U256::from(100u8));
        assert_eq!(amount.frac, 1);

        let amount = HumanAmount::from_minimal(U256::from(1_234_567u64), 6);
        assert_eq!(amount.whole, U256::from(1u8));
        assert_eq!(amount.frac, 2345);
    }

    #[test]
    fn test_from_minimal_small_decimals() {
        let amount = HumanAmount::from_minimal(U256::from(1_234u64), 2);
        assert_eq!(amount.whole, U256::from(12u8));
        assert_eq!(amount.frac, 3400);

        let amount = HumanAmount::from_minimal(U256::from(5u8), 0);
        assert_eq!(amount.whole, U256::from(5u8));
        assert_eq!(amount.frac, 0);
    }

    #[test]
    fn test_from_minimal_huge_decimals() {
        let amount = HumanAmount::from_minimal(U256::MAX, 255);
        assert_eq!(amount.whole, U256::zero());
        assert_eq!(amount.frac, 0);

        let amount = HumanAmount::from_minimal(U256::MAX, 18);
        assert!(amount.frac < 10_000);
    }

    #[test]
    fn test_threshold_units() {
        assert_eq!(threshold_units(0.0001), U256::from(1u8));
        assert_eq!(threshold_units(1.5), U256::from(15_000u32));
        assert_eq!(threshold_units(0.00015), U256::from(2u8));
        assert_eq!(threshold_units(0.0), U256::zero());
        assert_eq!(threshold_units(f64::NAN), U256::zero());
        assert_eq!(threshold_units(0.3), U256::from(3_000u32));
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let policy = AlertPolicy::new(true, 0.0001);
        // 100.0000 -> 100.0001 at 10 decimals
        let delta = U256::from(1_000_001_000_000u64) - U256::from(1_000_000_000_000u64);
        assert_eq!(delta, U256::from(1_000_000u32));
        assert!(policy.should_alert(delta, 10, true));
        assert!(!policy.should_alert(delta - 1, 10, true));
    }

    #[test]
    fn test_threshold_truncates_below_precision() {
        // 0.00009 DOT truncates to 0.0000
        let policy = AlertPolicy::new(true, 0.0001);
        assert!(!policy.should_alert(U256::from(900_000u32), 10, true));
    }

    #[test]
    fn test_alert_gates() {
        let delta = U256::from(10u64.pow(12));
        assert!(!AlertPolicy::new(false, 0.0001).should_alert(delta, 10, true));
        assert!(!AlertPolicy::new(true, 0.0001).should_alert(delta, 10, false));
        assert!(!AlertPolicy::new(true, 101.0).should_alert(delta, 10, true));
        assert!(AlertPolicy::new(true, 100.0).should_alert(delta, 10, true));
        assert!(!AlertPolicy::new(true, 0.0).should_alert(U256::zero(), 10, true));
    }
}
