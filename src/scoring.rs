//! Weighted-average scoring over DAO and treasury features.
//!
//! Every function here is pure, never panics on well-formed input, and
//! clamps its result into [0,1]. Zero denominators (empty portfolio, zero
//! proposals/members) substitute the neutral 0.5 instead of erroring; these
//! are advisory scores, not financial commitments. The one exception is
//! `diversification`, whose documented contract for an empty portfolio is an
//! explicit "no data" error rather than a silent neutral.

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::AnalystError;
use crate::schemas::Portfolio;

/// Per-symbol volatility proxy. In production this would come from real
/// market data; the constants mirror the usual tiers (stables, majors, DeFi).
static RISK_TABLE: Lazy<HashMap<&'static str, f32>> = Lazy::new(|| {
    HashMap::from([
        ("USDC", 0.1),
        ("USDT", 0.1),
        ("DAI", 0.1),
        ("ETH", 0.6),
        ("BTC", 0.7),
        ("UNI", 0.8),
        ("AAVE", 0.8),
        ("COMP", 0.8),
    ])
});

/// Per-symbol liquidity proxy, same layout as [`RISK_TABLE`].
static LIQUIDITY_TABLE: Lazy<HashMap<&'static str, f32>> = Lazy::new(|| {
    HashMap::from([
        ("USDC", 1.0),
        ("USDT", 1.0),
        ("DAI", 1.0),
        ("ETH", 0.9),
        ("BTC", 0.9),
        ("UNI", 0.7),
        ("AAVE", 0.6),
        ("COMP", 0.6),
    ])
});

/// Lookup default for symbols absent from either table.
const UNKNOWN_SYMBOL_SCORE: f32 = 0.5;

/// Neutral stand-in when a denominator is zero.
pub const NEUTRAL_SCORE: f32 = 0.5;

pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Historical pass rate; an empty history counts as zero successes over one
/// proposal rather than a division by zero.
pub fn success_rate(passed: u32, total: u32) -> f32 {
    passed as f32 / total.max(1) as f32
}

/// Recent-proposal activity normalized so that 10 proposals in the window
/// saturate the signal.
pub fn activity_level(recent_proposals: u32) -> f32 {
    (recent_proposals as f32 / 10.0).min(1.0)
}

/// Governance health: 0.3 success rate + 0.4 participation + 0.3 activity.
pub fn governance_score(success_rate: f32, participation: f32, activity: f32) -> f32 {
    clamp01(success_rate * 0.3 + participation * 0.4 + activity * 0.3)
}

/// Financial health: 0.4 diversification + 0.4 inverted risk + 0.2 liquidity.
/// Risk is inverted because lower risk is better.
pub fn financial_score(diversification: f32, risk: f32, liquidity: f32) -> f32 {
    clamp01(diversification * 0.4 + (1.0 - risk) * 0.4 + liquidity * 0.2)
}

/// Community health: 0.4 active-member ratio + 0.4 engagement + 0.2 sentiment.
pub fn community_score(active_ratio: f32, engagement: f32, sentiment: f32) -> f32 {
    clamp01(active_ratio * 0.4 + engagement * 0.4 + sentiment * 0.2)
}

/// Overall health is the unweighted mean of the three pillar scores.
pub fn overall_health(governance: f32, financial: f32, community: f32) -> f32 {
    clamp01((governance + financial + community) / 3.0)
}

/// Diversification as 1 − HHI, where HHI is the sum of squared value shares.
/// A single-asset portfolio scores 0; N equal holdings approach 1 as N grows.
///
/// An empty (or zero-valued) portfolio has no meaningful concentration and
/// signals `NoData` instead of dividing by zero.
pub fn diversification(portfolio: &Portfolio) -> Result<f32, AnalystError> {
    let total = portfolio.total_value();
    if total <= 0.0 {
        return Err(AnalystError::NoData(
            "No treasury data available".to_string(),
        ));
    }
    let hhi: f64 = portfolio
        .assets
        .iter()
        .map(|a| {
            let share = a.value_usd / total;
            share * share
        })
        .sum();
    Ok(clamp01((1.0 - hhi) as f32))
}

/// Value-weighted average of the per-symbol risk table.
pub fn treasury_risk(portfolio: &Portfolio) -> f32 {
    weighted_table_score(portfolio, &RISK_TABLE)
}

/// Value-weighted average of the per-symbol liquidity table.
pub fn liquidity(portfolio: &Portfolio) -> f32 {
    weighted_table_score(portfolio, &LIQUIDITY_TABLE)
}

fn weighted_table_score(portfolio: &Portfolio, table: &HashMap<&'static str, f32>) -> f32 {
    let total = portfolio.total_value();
    if total <= 0.0 {
        return NEUTRAL_SCORE;
    }
    let weighted: f64 = portfolio
        .assets
        .iter()
        .map(|a| {
            let per_symbol = *table
                .get(a.symbol.as_str())
                .unwrap_or(&UNKNOWN_SYMBOL_SCORE);
            (a.value_usd / total) * per_symbol as f64
        })
        .sum();
    clamp01(weighted as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::AssetHolding;

    fn sample_portfolio() -> Portfolio {
        Portfolio::new(vec![
            AssetHolding::new("USDC", 1_000_000.0),
            AssetHolding::new("ETH", 800_000.0),
            AssetHolding::new("UNI", 400_000.0),
            AssetHolding::new("AAVE", 300_000.0),
        ])
    }

    #[test]
    fn governance_score_weights() {
        // 0.3*0.5 + 0.4*0.68 + 0.3*0.8 = 0.662
        let g = governance_score(0.5, 0.68, 0.8);
        assert!((g - 0.662).abs() < 1e-4);
    }

    #[test]
    fn financial_score_inverts_risk() {
        // Risk 1.0 contributes nothing; risk 0.0 contributes the full 0.4.
        let risky = financial_score(0.5, 1.0, 0.5);
        let safe = financial_score(0.5, 0.0, 0.5);
        assert!((safe - risky - 0.4).abs() < 1e-6);
    }

    #[test]
    fn overall_health_is_arithmetic_mean() {
        let o = overall_health(0.3, 0.6, 0.9);
        assert!((o - 0.6).abs() < 1e-6);
    }

    #[test]
    fn success_rate_handles_zero_total() {
        assert_eq!(success_rate(0, 0), 0.0);
        assert!((success_rate(32, 45) - 32.0 / 45.0).abs() < 1e-6);
    }

    #[test]
    fn activity_level_saturates_at_ten() {
        assert!((activity_level(8) - 0.8).abs() < 1e-6);
        assert_eq!(activity_level(25), 1.0);
    }

    #[test]
    fn diversification_single_asset_is_zero() {
        let p = Portfolio::new(vec![AssetHolding::new("ETH", 1_000_000.0)]);
        let d = diversification(&p).unwrap();
        assert!(d.abs() < 1e-6, "single asset means HHI = 1, got {d}");
    }

    #[test]
    fn diversification_four_equal_holdings() {
        let p = Portfolio::new(vec![
            AssetHolding::new("A", 100.0),
            AssetHolding::new("B", 100.0),
            AssetHolding::new("C", 100.0),
            AssetHolding::new("D", 100.0),
        ]);
        // 1 - 4 * 0.25^2 = 0.75
        let d = diversification(&p).unwrap();
        assert!((d - 0.75).abs() < 1e-5);
    }

    #[test]
    fn diversification_empty_portfolio_signals_no_data() {
        let err = diversification(&Portfolio::default()).unwrap_err();
        assert!(matches!(err, AnalystError::NoData(_)));
    }

    #[test]
    fn sample_portfolio_matches_reference_numbers() {
        let p = sample_portfolio();
        // Shares: 0.4 / 0.32 / 0.16 / 0.12; HHI = 0.3024.
        let d = diversification(&p).unwrap();
        assert!((d - 0.6976).abs() < 1e-4, "diversification {d}");

        let r = treasury_risk(&p);
        // 0.4*0.1 + 0.32*0.6 + 0.16*0.8 + 0.12*0.8 = 0.456
        assert!((r - 0.456).abs() < 1e-4, "risk {r}");

        let l = liquidity(&p);
        // 0.4*1.0 + 0.32*0.9 + 0.16*0.7 + 0.12*0.6 = 0.872
        assert!((l - 0.872).abs() < 1e-4, "liquidity {l}");
    }

    #[test]
    fn risk_and_liquidity_are_scale_invariant() {
        let p = sample_portfolio();
        let doubled = Portfolio::new(
            p.assets
                .iter()
                .map(|a| AssetHolding::new(a.symbol.clone(), a.value_usd * 2.0))
                .collect(),
        );
        assert!((treasury_risk(&p) - treasury_risk(&doubled)).abs() < 1e-6);
        assert!((liquidity(&p) - liquidity(&doubled)).abs() < 1e-6);
    }

    #[test]
    fn unknown_symbols_score_neutral() {
        let p = Portfolio::new(vec![AssetHolding::new("WEIRDCOIN", 500.0)]);
        assert!((treasury_risk(&p) - 0.5).abs() < 1e-6);
        assert!((liquidity(&p) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn empty_portfolio_risk_and_liquidity_are_neutral() {
        let p = Portfolio::default();
        assert_eq!(treasury_risk(&p), NEUTRAL_SCORE);
        assert_eq!(liquidity(&p), NEUTRAL_SCORE);
    }

    #[test]
    fn scores_stay_bounded_for_randomized_inputs() {
        // Cheap property sweep over a deterministic grid of inputs,
        // including the degenerate corners.
        for a in [0.0f32, 0.1, 0.5, 0.9, 1.0] {
            for b in [0.0f32, 0.3, 0.7, 1.0] {
                for c in [0.0f32, 0.5, 1.0] {
                    for v in [
                        governance_score(a, b, c),
                        financial_score(a, b, c),
                        community_score(a, b, c),
                        overall_health(a, b, c),
                    ] {
                        assert!((0.0..=1.0).contains(&v), "out of range: {v}");
                    }
                }
            }
        }
    }

    #[test]
    fn scoring_is_idempotent() {
        let p = sample_portfolio();
        assert_eq!(treasury_risk(&p), treasury_risk(&p));
        assert_eq!(
            diversification(&p).unwrap(),
            diversification(&p).unwrap()
        );
    }
}
