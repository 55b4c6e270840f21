//! 價格對齊：讓零件報價總額收斂到板材成本總額
//!
//! 每次計算都從 `cost_of_goods` 冷啟動，以固定步長（差額 / 1000）同步調整所有零件
//! 的 `matched_to_sheet_cost_price`，直到差額不超過 1 或達到迭代上限。

use rust_decimal::Decimal;

use quote_core::{LaserCutPart, Quote, SheetSettingsProvider};

use crate::markup::CostContributors;
use crate::nest_cost::NestCostCalculator;

/// 收斂容許誤差（金額）
pub const RECONCILE_TOLERANCE: Decimal = Decimal::ONE;

/// 迭代上限
pub const MAX_RECONCILE_ITERATIONS: usize = 200;

/// 步長除數
const STEP_DIVISOR: Decimal = Decimal::ONE_THOUSAND;

/// 對齊結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// 板材成本目標
    pub target_total: Decimal,
    /// 最後的零件報價總額
    pub item_total: Decimal,
    /// 最後的差額（兩位小數）
    pub difference: Decimal,
    pub iterations: usize,
    /// 差額是否在容許誤差內
    pub converged: bool,
    /// 是否因數值溢位提前中止
    pub diverged: bool,
}

/// 價格對齊器
pub struct PriceReconciler {
    profit_margin: Decimal,
    overhead: Decimal,
}

impl PriceReconciler {
    /// 以零件加成參數（分數）建立
    pub fn new(profit_margin: Decimal, overhead: Decimal) -> Self {
        Self {
            profit_margin,
            overhead,
        }
    }

    /// 零件報價總額：Σ 逐項加成單價 × 數量（使用對齊後成本基礎）
    ///
    /// 溢位或加成飽和時回傳 `None`。
    pub fn aggregate_item_cost(&self, parts: &[&mut LaserCutPart]) -> Option<Decimal> {
        parts.iter().try_fold(Decimal::ZERO, |total, part| {
            let unit = CostContributors::from_part(part, true)
                .marked_up(self.profit_margin, self.overhead);
            if unit == Decimal::MAX {
                return None;
            }
            unit.checked_mul(part.quantity)
                .and_then(|line| total.checked_add(line))
        })
    }

    /// 對齊零件成本基礎到目標總額
    pub fn reconcile(&self, mut parts: Vec<&mut LaserCutPart>, target_total: Decimal) -> ReconcileOutcome {
        for part in parts.iter_mut() {
            part.matched_to_sheet_cost_price = part.cost_of_goods;
        }

        let mut outcome = ReconcileOutcome {
            target_total,
            item_total: Decimal::ZERO,
            difference: Decimal::ZERO,
            iterations: 0,
            converged: false,
            diverged: false,
        };

        let Some(mut item_total) = self.aggregate_item_cost(&parts) else {
            outcome.diverged = true;
            return self.finish(outcome);
        };
        let Some(mut difference) = rounded_difference(item_total, target_total) else {
            outcome.diverged = true;
            return self.finish(outcome);
        };

        while difference.abs() > RECONCILE_TOLERANCE && outcome.iterations < MAX_RECONCILE_ITERATIONS {
            let step = difference.abs() / STEP_DIVISOR;
            let adjustment = if difference > Decimal::ZERO { -step } else { step };

            let mut overflowed = false;
            for part in parts.iter_mut() {
                match part.matched_to_sheet_cost_price.checked_add(adjustment) {
                    Some(value) => part.matched_to_sheet_cost_price = value,
                    None => overflowed = true,
                }
            }
            outcome.iterations += 1;

            let next = if overflowed {
                None
            } else {
                self.aggregate_item_cost(&parts)
                    .and_then(|total| rounded_difference(total, target_total).map(|diff| (total, diff)))
            };
            match next {
                Some((total, diff)) => {
                    item_total = total;
                    difference = diff;
                }
                None => {
                    outcome.diverged = true;
                    break;
                }
            }
        }

        outcome.item_total = item_total;
        outcome.difference = difference;
        outcome.converged = !outcome.diverged && difference.abs() <= RECONCILE_TOLERANCE;
        self.finish(outcome)
    }

    fn finish(&self, outcome: ReconcileOutcome) -> ReconcileOutcome {
        if outcome.converged {
            tracing::debug!(
                "價格對齊完成：迭代 {} 次，差額 {}",
                outcome.iterations,
                outcome.difference
            );
        } else {
            tracing::warn!(
                "價格對齊未收斂：迭代 {} 次，差額 {}，溢位中止 {}",
                outcome.iterations,
                outcome.difference,
                outcome.diverged
            );
        }
        outcome
    }

    /// 對齊整份報價的零件到板材成本總額
    pub fn reconcile_quote(
        quote: &mut Quote,
        sheet_settings: &dyn SheetSettingsProvider,
    ) -> ReconcileOutcome {
        let target_total = NestCostCalculator::total_sheet_cost(quote, sheet_settings);
        let reconciler = Self::new(
            quote.settings.item_profit_margin_fraction(),
            quote.settings.item_overhead_fraction(),
        );
        let parts: Vec<&mut LaserCutPart> = quote.laser_cut_parts_mut().collect();
        reconciler.reconcile(parts, target_total)
    }

    /// 反向對齊：找出讓板材總額最接近零件總額的整數板材利潤率（0..=100）
    ///
    /// 差額相同時取較小的利潤率。
    pub fn match_sheet_profit_margin(
        quote: &Quote,
        sheet_settings: &dyn SheetSettingsProvider,
        item_total: Decimal,
    ) -> u32 {
        let mut best_margin = 0;
        let mut best_difference: Option<Decimal> = None;

        for margin in 0..=100u32 {
            let sheet_total = NestCostCalculator::total_sheet_cost_with_margin(
                quote,
                sheet_settings,
                Decimal::new(i64::from(margin), 2),
            );
            let difference = (sheet_total - item_total).abs();
            if best_difference.map_or(true, |best| difference < best) {
                best_difference = Some(difference);
                best_margin = margin;
            }
        }

        tracing::debug!("板材利潤率反向對齊結果: {}%", best_margin);
        best_margin
    }
}

fn rounded_difference(item_total: Decimal, target_total: Decimal) -> Option<Decimal> {
    item_total.checked_sub(target_total).map(|diff| diff.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::markup;
    use quote_core::{Nest, QuoteSettings, Sheet, SheetSettings};

    fn default_reconciler() -> PriceReconciler {
        PriceReconciler::new(Decimal::new(30, 2), Decimal::new(18, 2))
    }

    fn part(quantity: i64, cost_of_goods: i64) -> LaserCutPart {
        LaserCutPart::new("A", Decimal::from(quantity)).with_cost_of_goods(Decimal::from(cost_of_goods))
    }

    #[test]
    fn test_converges_within_tolerance() {
        let reconciler = default_reconciler();
        let mut parts = vec![part(300, 10), part(200, 4)];
        // 初始總額約 300×19.23 + 200×7.69 ≈ 7307；目標低 200
        let target = Decimal::from(7100);

        let outcome = reconciler.reconcile(parts.iter_mut().collect(), target);

        assert!(outcome.converged);
        assert!(!outcome.diverged);
        assert!(outcome.iterations > 0);
        assert!((outcome.item_total - target).abs() <= Decimal::ONE + Decimal::new(1, 2));
        assert!(parts[0].matched_to_sheet_cost_price < Decimal::from(10));
        // 所有零件同步調整相同金額
        assert_eq!(
            parts[0].cost_of_goods - parts[0].matched_to_sheet_cost_price,
            parts[1].cost_of_goods - parts[1].matched_to_sheet_cost_price
        );
    }

    #[test]
    fn test_rerun_is_idempotent() {
        let reconciler = default_reconciler();
        let mut parts = vec![part(300, 10), part(200, 4)];
        let target = Decimal::from(7500);

        let first = reconciler.reconcile(parts.iter_mut().collect(), target);
        let first_matched = parts[0].matched_to_sheet_cost_price;
        let second = reconciler.reconcile(parts.iter_mut().collect(), target);

        assert_eq!(first, second);
        assert_eq!(parts[0].matched_to_sheet_cost_price, first_matched);
    }

    #[test]
    fn test_already_within_tolerance() {
        let reconciler = PriceReconciler::new(Decimal::ZERO, Decimal::ZERO);
        let mut parts = vec![part(2, 50)];

        let outcome = reconciler.reconcile(parts.iter_mut().collect(), Decimal::new(10050, 2));

        assert!(outcome.converged);
        assert_eq!(outcome.iterations, 0);
        assert_eq!(parts[0].matched_to_sheet_cost_price, Decimal::from(50));
    }

    #[test]
    fn test_iteration_cap_keeps_best_effort_state() {
        // 總數量很小，每次只修正 0.2% 差額
        let reconciler = PriceReconciler::new(Decimal::ZERO, Decimal::ZERO);
        let mut parts = vec![part(2, 50)];

        let outcome = reconciler.reconcile(parts.iter_mut().collect(), Decimal::from(90));

        assert!(!outcome.converged);
        assert!(!outcome.diverged);
        assert_eq!(outcome.iterations, MAX_RECONCILE_ITERATIONS);
        assert!(outcome.difference > Decimal::ONE);
        assert!(outcome.difference < Decimal::from(10));
        assert!(parts[0].matched_to_sheet_cost_price < Decimal::from(50));
    }

    #[test]
    fn test_runaway_divergence_stops_early() {
        // 總數量過大，每次修正都過衝並放大差額
        let reconciler = default_reconciler();
        let mut parts = vec![part(5000, 10)];

        let outcome = reconciler.reconcile(parts.iter_mut().collect(), Decimal::from(50_000));

        assert!(outcome.diverged);
        assert!(!outcome.converged);
        assert!(outcome.iterations < MAX_RECONCILE_ITERATIONS);
    }

    #[test]
    fn test_aggregate_uses_contributor_markup() {
        let reconciler = default_reconciler();
        let mut parts = vec![part(3, 10).with_process_costs(Decimal::from(2), Decimal::from(5))];
        parts[0].matched_to_sheet_cost_price = Decimal::from(10);

        let (margin, overhead) = (Decimal::new(30, 2), Decimal::new(18, 2));
        let unit = markup(Decimal::from(10), margin, overhead)
            + markup(Decimal::from(2), margin, overhead)
            + markup(Decimal::from(5), margin, overhead);

        let refs: Vec<&mut LaserCutPart> = parts.iter_mut().collect();
        assert_eq!(
            reconciler.aggregate_item_cost(&refs),
            Some(unit * Decimal::from(3))
        );
    }

    #[test]
    fn test_match_sheet_profit_margin() {
        let sheet_settings = SheetSettings::new()
            .with_price_per_pound("Mild Steel", Decimal::new(55, 2))
            .with_pounds_per_square_foot("Mild Steel", "12 Gauge", Decimal::new(4375, 3));
        let settings = QuoteSettings::default().with_sheet_markup(Decimal::ZERO, Decimal::from(30));
        let quote = Quote::new("Q", settings).with_nest(
            Nest::new(
                "N1",
                Sheet::new("Mild Steel", "12 Gauge", Decimal::from(96), Decimal::from(48)),
            )
            .with_sheets(Decimal::ONE, Decimal::ZERO)
            .with_part(LaserCutPart::new("A", Decimal::ONE)),
        );

        // 板材成本 77；77 / (1 - 0.23) = 100
        let margin = PriceReconciler::match_sheet_profit_margin(&quote, &sheet_settings, Decimal::from(100));
        assert_eq!(margin, 23);
    }
}
