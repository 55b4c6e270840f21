//! 排版成本：切割成本、板材材料成本、零件成本基礎

use rust_decimal::Decimal;

use quote_core::{LaserCutPart, Nest, Quote, QuoteSettings, SheetSettingsProvider};

use crate::markup::{markup, saturating_total};

const SECONDS_PER_HOUR: Decimal = Decimal::from_parts(3600, 0, 0, false, 0);

/// 單一排版的成本明細
#[derive(Debug, Clone, PartialEq)]
pub struct NestCost {
    pub nest_name: String,
    /// 切割成本
    pub cutting_cost: Decimal,
    /// 板材材料成本（已乘張數）
    pub sheet_cost: Decimal,
    /// 加成後的板材總成本
    pub marked_up_cost: Decimal,
}

impl NestCost {
    pub fn base_cost(&self) -> Decimal {
        self.cutting_cost + self.sheet_cost
    }
}

/// 排版成本計算器
pub struct NestCostCalculator;

impl NestCostCalculator {
    /// 切割成本 = 每張切割時間 × 張數 / 3600 × 每小時成本
    pub fn cutting_cost(nest: &Nest, cost_per_hour: Decimal) -> Decimal {
        nest.total_cutting_time() / SECONDS_PER_HOUR * cost_per_hour
    }

    /// 切割方式每小時成本
    ///
    /// 以板材設定中切割方式的成本為準；設定裡沒有該切割方式時沿用報價設定的 `laser_cutting_cost`。
    pub fn cost_per_hour(settings: &QuoteSettings, sheet_settings: &dyn SheetSettingsProvider) -> Decimal {
        let cost = sheet_settings.laser_cost(&settings.laser_cutting_method);
        if cost.is_zero() {
            settings.laser_cutting_cost
        } else {
            cost
        }
    }

    /// 板材材料成本 = 張數 × 單張重量 × 每磅單價
    pub fn sheet_cost(nest: &Nest, sheet_settings: &dyn SheetSettingsProvider) -> Decimal {
        nest.sheet().cost(sheet_settings) * nest.sheet_count
    }

    /// 零件成本基礎 = 加工時間 × 每小時成本 / 3600 + 重量 × 每磅單價
    pub fn part_cost_of_goods(
        part: &LaserCutPart,
        cost_per_hour: Decimal,
        sheet_settings: &dyn SheetSettingsProvider,
    ) -> Decimal {
        part.machine_time * cost_per_hour / SECONDS_PER_HOUR
            + part.weight * sheet_settings.price_per_pound(&part.material)
    }

    /// 計算單一排版的成本明細
    pub fn nest_cost(
        nest: &Nest,
        settings: &QuoteSettings,
        sheet_settings: &dyn SheetSettingsProvider,
        sheet_profit_margin: Decimal,
    ) -> NestCost {
        let cutting_cost = Self::cutting_cost(nest, Self::cost_per_hour(settings, sheet_settings));
        let sheet_cost = Self::sheet_cost(nest, sheet_settings);
        let marked_up_cost = markup(
            cutting_cost + sheet_cost,
            sheet_profit_margin,
            settings.sheet_overhead_fraction(),
        );

        NestCost {
            nest_name: nest.name.clone(),
            cutting_cost,
            sheet_cost,
            marked_up_cost,
        }
    }

    /// 報價中所有有零件的排版成本（空排版不列入）
    pub fn quote_nest_costs(
        quote: &Quote,
        sheet_settings: &dyn SheetSettingsProvider,
    ) -> Vec<NestCost> {
        let sheet_profit_margin = quote.settings.sheet_profit_margin_fraction();
        quote
            .nests_with_parts()
            .into_iter()
            .map(|nest| Self::nest_cost(nest, &quote.settings, sheet_settings, sheet_profit_margin))
            .collect()
    }

    /// 加成後的板材總成本（以指定的板材利潤率計算）
    pub fn total_sheet_cost_with_margin(
        quote: &Quote,
        sheet_settings: &dyn SheetSettingsProvider,
        sheet_profit_margin: Decimal,
    ) -> Decimal {
        saturating_total(quote.nests_with_parts().into_iter().map(|nest| {
            Some(Self::nest_cost(nest, &quote.settings, sheet_settings, sheet_profit_margin).marked_up_cost)
        }))
    }

    /// 加成後的板材總成本（使用報價設定）
    pub fn total_sheet_cost(quote: &Quote, sheet_settings: &dyn SheetSettingsProvider) -> Decimal {
        Self::total_sheet_cost_with_margin(
            quote,
            sheet_settings,
            quote.settings.sheet_profit_margin_fraction(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::{SheetSettings, Sheet};

    fn sheet_settings() -> SheetSettings {
        SheetSettings::new()
            .with_price_per_pound("Mild Steel", Decimal::new(55, 2))
            .with_pounds_per_square_foot("Mild Steel", "12 Gauge", Decimal::new(4375, 3))
            .with_laser_cost("CO2", Decimal::from(150))
    }

    fn nest() -> Nest {
        Nest::new(
            "N1",
            Sheet::new("Mild Steel", "12 Gauge", Decimal::from(96), Decimal::from(48)),
        )
        .with_sheets(Decimal::from(3), Decimal::from(1200))
        .with_part(LaserCutPart::new("A", Decimal::from(10)))
    }

    #[test]
    fn test_cutting_cost() {
        // 3 張 × 1200 秒 = 1 小時
        assert_eq!(
            NestCostCalculator::cutting_cost(&nest(), Decimal::from(150)),
            Decimal::from(150)
        );
    }

    #[test]
    fn test_sheet_cost_for_full_sheet() {
        let settings = sheet_settings();
        let expected = Decimal::from(48 * 96) / Decimal::from(144)
            * Decimal::new(4375, 3)
            * Decimal::new(55, 2)
            * Decimal::from(3);

        assert_eq!(NestCostCalculator::sheet_cost(&nest(), &settings), expected);
        assert_eq!(expected, Decimal::from(231));
    }

    #[test]
    fn test_part_cost_of_goods() {
        let part = LaserCutPart::new("A", Decimal::ONE)
            .with_material("Mild Steel", "12 Gauge")
            .with_weight_and_machine_time(Decimal::from(2), Decimal::from(72));

        // 72 秒 × 150 / 3600 = 3；2 磅 × 0.55 = 1.1
        assert_eq!(
            NestCostCalculator::part_cost_of_goods(&part, Decimal::from(150), &sheet_settings()),
            Decimal::new(41, 1)
        );
    }

    #[test]
    fn test_empty_nests_are_excluded() {
        let quote = Quote::new("Q", QuoteSettings::default())
            .with_nest(nest())
            .with_nest(Nest::new(
                "EMPTY",
                Sheet::new("Mild Steel", "12 Gauge", Decimal::from(96), Decimal::from(48)),
            ));

        let costs = NestCostCalculator::quote_nest_costs(&quote, &sheet_settings());
        assert_eq!(costs.len(), 1);
        assert_eq!(costs[0].nest_name, "N1");
        assert_eq!(costs[0].base_cost(), Decimal::from(381));
    }

    #[test]
    fn test_cutting_cost_follows_cutting_method() {
        let sheet_settings = sheet_settings().with_laser_cost("Nitrogen", Decimal::from(300));
        let nest = nest();

        let co2 = NestCostCalculator::nest_cost(
            &nest,
            &QuoteSettings::default(),
            &sheet_settings,
            Decimal::ZERO,
        );
        let nitrogen = NestCostCalculator::nest_cost(
            &nest,
            &QuoteSettings::default().with_laser_cutting_method("Nitrogen"),
            &sheet_settings,
            Decimal::ZERO,
        );

        assert_eq!(co2.cutting_cost, Decimal::from(150));
        assert_eq!(nitrogen.cutting_cost, Decimal::from(300));
    }

    #[test]
    fn test_unknown_cutting_method_keeps_manual_cost() {
        let settings = QuoteSettings::default()
            .with_laser_cutting_method("Fiber")
            .with_laser_cutting_cost(Decimal::from(90));

        assert_eq!(
            NestCostCalculator::cost_per_hour(&settings, &sheet_settings()),
            Decimal::from(90)
        );
    }

    #[test]
    fn test_total_sheet_cost_applies_sheet_markup() {
        let settings = QuoteSettings::default().with_sheet_markup(Decimal::ZERO, Decimal::from(20));
        let quote = Quote::new("Q", settings).with_nest(nest());

        // (150 + 231) / 0.8
        assert_eq!(
            NestCostCalculator::total_sheet_cost(&quote, &sheet_settings()),
            Decimal::new(47625, 2)
        );
    }
}
