//! 成本加成（管銷費用 + 利潤率）

use rust_decimal::Decimal;

use quote_core::LaserCutPart;

/// 固定點迭代次數
const MARKUP_ITERATIONS: usize = 10;

/// 利潤率為 100% 時代替 `1 - margin` 的極小分母
const ZERO_MARGIN_DENOMINATOR: Decimal = Decimal::from_parts(1, 0, 0, false, 8);

/// 成本加成
///
/// 以 `p = (cost + p × overhead) / (1 - margin)` 從 `p = 0` 迭代固定次數。
/// 利潤率與管銷為分數（0.3 = 30%），超過 1 的值仍會計算，結果由呼叫端負責。
/// 溢位時飽和為 `Decimal::MAX`。
pub fn markup(cost: Decimal, profit_margin: Decimal, overhead: Decimal) -> Decimal {
    let denominator = Decimal::ONE - profit_margin;
    let mut price = Decimal::ZERO;

    for _ in 0..MARKUP_ITERATIONS {
        let carried = price.checked_mul(overhead);
        let next = if denominator.is_zero() {
            carried
                .and_then(|carried| carried.checked_div(ZERO_MARGIN_DENOMINATOR))
                .and_then(|carried| cost.checked_add(carried))
        } else {
            carried
                .and_then(|carried| cost.checked_add(carried))
                .and_then(|numerator| numerator.checked_div(denominator))
        };

        match next {
            Some(next) => price = next,
            None => return Decimal::MAX,
        }
    }

    price
}

/// 逐項相加，任一項為 `None` 或相加溢位時飽和為 `Decimal::MAX`
pub fn saturating_total(values: impl IntoIterator<Item = Option<Decimal>>) -> Decimal {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |total, value| {
            value.and_then(|value| total.checked_add(value))
        })
        .unwrap_or(Decimal::MAX)
}

/// 單價 × 數量，溢位時飽和為 `Decimal::MAX`
pub fn saturating_line_total(unit_price: Decimal, quantity: Decimal) -> Decimal {
    unit_price.checked_mul(quantity).unwrap_or(Decimal::MAX)
}

/// 零件的各項成本來源
///
/// 單價是逐項加成後加總，不是加總後再加成。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CostContributors {
    /// 材料 + 切割（或對齊板材後的成本基礎）
    pub cost_of_goods: Decimal,
    pub bend_cost: Decimal,
    pub labor_cost: Decimal,
    pub primer_cost: Decimal,
    pub paint_cost: Decimal,
    pub powder_cost: Decimal,
}

impl CostContributors {
    /// 從零件取出成本來源
    pub fn from_part(part: &LaserCutPart, match_to_sheet: bool) -> Self {
        Self {
            cost_of_goods: part.cost_basis(match_to_sheet),
            bend_cost: part.bend_cost,
            labor_cost: part.labor_cost,
            primer_cost: part.cost_for_primer,
            paint_cost: part.cost_for_paint,
            powder_cost: part.cost_for_powder_coating,
        }
    }

    /// 成本來源陣列
    pub fn as_array(&self) -> [Decimal; 6] {
        [
            self.cost_of_goods,
            self.bend_cost,
            self.labor_cost,
            self.primer_cost,
            self.paint_cost,
            self.powder_cost,
        ]
    }

    /// 未加成的成本合計
    pub fn base_total(&self) -> Decimal {
        self.as_array().iter().copied().sum()
    }

    /// 逐項加成後的單價（未四捨五入，溢位時飽和）
    pub fn marked_up(&self, profit_margin: Decimal, overhead: Decimal) -> Decimal {
        saturating_total(
            self.as_array()
                .iter()
                .map(|&contributor| Some(markup(contributor, profit_margin, overhead))),
        )
    }

    /// 報價單價（兩位小數）
    pub fn unit_price(&self, profit_margin: Decimal, overhead: Decimal) -> Decimal {
        self.marked_up(profit_margin, overhead).round_dp(2)
    }
}
