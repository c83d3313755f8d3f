// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::FinancialData;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal_macros::dec;

const VALUE_DP: u32 = 6;

/// One simulated market move. The seed fixes every drawn delta, so the same
/// tick applied to the same document always produces the same prices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketTick {
    pub seed: u64,
    /// Largest relative move per holding, e.g. 0.005 for ±0.5%.
    pub max_drift: Decimal,
}

impl MarketTick {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            max_drift: dec!(0.005),
        }
    }
}

fn draw_factor(rng: &mut StdRng, bound: f64) -> Decimal {
    if bound <= 0.0 {
        return Decimal::ONE;
    }
    let delta = rng.gen_range(-bound..=bound);
    Decimal::ONE + Decimal::from_f64(delta).unwrap_or_default().round_dp(VALUE_DP)
}

/// Moves every holding's current value and every quoted watchlist price by
/// its own delta. Account balances are recomputed by the reducer afterwards.
pub(super) fn apply(data: &mut FinancialData, tick: &MarketTick) {
    let mut rng = StdRng::seed_from_u64(tick.seed);
    let bound = tick.max_drift.abs().to_f64().unwrap_or(0.0);
    for holding in data.portfolios.iter_mut().flat_map(|p| p.holdings.iter_mut()) {
        let factor = draw_factor(&mut rng, bound);
        // A value that would overflow keeps its last mark.
        if let Some(v) = holding.current_value.checked_mul(factor) {
            holding.current_value = v.round_dp(VALUE_DP);
        }
    }
    for item in data.watchlist.iter_mut() {
        if let Some(price) = item.price.as_mut() {
            let factor = draw_factor(&mut rng, bound);
            if let Some(p) = price.checked_mul(factor) {
                *price = p.round_dp(VALUE_DP);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Holding, Portfolio};

    fn data() -> FinancialData {
        let holding = |id: &str, value: Decimal| Holding {
            id: id.into(),
            symbol: id.to_uppercase(),
            name: id.into(),
            quantity: dec!(10),
            avg_cost: dec!(10),
            current_value: value,
            zakat_class: Default::default(),
            realized_pnl: Decimal::ZERO,
            asset_class: None,
            goal_id: None,
        };
        FinancialData {
            portfolios: vec![Portfolio {
                id: "p1".into(),
                name: "Core".into(),
                account_id: "inv".into(),
                holdings: vec![holding("a", dec!(1000)), holding("b", dec!(250))],
            }],
            ..Default::default()
        }
    }

    #[test]
    fn moves_stay_within_drift() {
        for seed in 0..200 {
            let mut d = data();
            apply(&mut d, &MarketTick::new(seed));
            for (h, start) in d.portfolios[0].holdings.iter().zip([dec!(1000), dec!(250)]) {
                let ratio = h.current_value / start;
                assert!(ratio >= dec!(0.995) && ratio <= dec!(1.005), "seed {} ratio {}", seed, ratio);
            }
        }
    }

    #[test]
    fn same_seed_same_prices() {
        let mut a = data();
        let mut b = data();
        apply(&mut a, &MarketTick::new(7));
        apply(&mut b, &MarketTick::new(7));
        assert_eq!(a, b);
    }

    #[test]
    fn zero_drift_is_identity() {
        let mut d = data();
        let tick = MarketTick {
            seed: 1,
            max_drift: Decimal::ZERO,
        };
        apply(&mut d, &tick);
        assert_eq!(d, data());
    }
}
