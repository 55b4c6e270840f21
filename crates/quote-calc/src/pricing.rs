//! 報價計算器

use rayon::prelude::*;
use rust_decimal::Decimal;

use quote_core::{
    Component, LaserCutPart, Nest, PaintInventoryProvider, Quote, QuoteSettings,
    SheetSettingsProvider,
};

use crate::markup::{markup, saturating_line_total, saturating_total, CostContributors};
use crate::nest_cost::NestCostCalculator;
use crate::reconcile::PriceReconciler;
use crate::{PricingResult, QuoteWarning};

/// 報價計算器
///
/// 設定變更後呼叫 `recalculate`，所有計算在呼叫端執行緒上完成後才回傳。
pub struct QuotePriceCalculator<'a> {
    /// 板材設定
    sheet_settings: &'a dyn SheetSettingsProvider,

    /// 塗裝庫存
    paint_inventory: &'a dyn PaintInventoryProvider,
}

impl<'a> QuotePriceCalculator<'a> {
    /// 創建新的報價計算器
    pub fn new(
        sheet_settings: &'a dyn SheetSettingsProvider,
        paint_inventory: &'a dyn PaintInventoryProvider,
    ) -> Self {
        Self {
            sheet_settings,
            paint_inventory,
        }
    }

    /// 重新計算整份報價
    pub fn recalculate(&self, quote: &mut Quote) -> PricingResult {
        let start_time = std::time::Instant::now();
        tracing::info!(
            "開始報價計算：{}，排版 {} 個，外購件 {} 筆",
            quote.name,
            quote.nests.len(),
            quote.components.len()
        );

        let mut result = PricingResult::empty();

        // Step 0: 切割方式每小時成本
        self.sync_laser_cutting_cost(quote, &mut result);

        // Step 1: 零件成本基礎與塗裝成本
        tracing::debug!("Step 1: 零件成本");
        self.update_part_costs(quote);
        self.check_material_prices(quote, &mut result);

        // Step 2: 零件價格對齊板材成本
        let settings = quote.settings.clone();
        if settings.match_item_to_sheet_cost {
            tracing::debug!("Step 2: 價格對齊");
            let outcome = PriceReconciler::reconcile_quote(quote, self.sheet_settings);
            if outcome.diverged {
                result.add_warning(QuoteWarning::error(
                    quote.name.clone(),
                    format!("價格對齊數值發散，保留第 {} 次迭代結果", outcome.iterations),
                ));
            } else if !outcome.converged {
                result.add_warning(QuoteWarning::warning(
                    quote.name.clone(),
                    format!(
                        "價格對齊未收斂：{} 次迭代後差額 {}",
                        outcome.iterations, outcome.difference
                    ),
                ));
            }
            result.reconciliation = Some(outcome);
        }

        // Step 3: 零件單價
        tracing::debug!("Step 3: 零件單價");
        for part in quote.laser_cut_parts_mut() {
            part.price = Self::part_unit_price(part, &settings);
        }
        result.laser_cut_parts_total = Self::laser_cut_parts_total(quote);

        // Step 4: 外購件
        tracing::debug!("Step 4: 外購件");
        result.components_total = saturating_total(
            quote
                .components
                .iter()
                .map(|component| Some(Self::component_line_price(component, &settings))),
        );

        // Step 5: 板材成本對齊零件價格
        if settings.match_sheet_cost_to_item {
            tracing::debug!("Step 5: 反向對齊板材利潤率");
            let margin = PriceReconciler::match_sheet_profit_margin(
                quote,
                self.sheet_settings,
                result.item_total(),
            );
            quote.settings.sheet_profit_margin = Decimal::from(margin);
            result.matched_sheet_profit_margin = Some(margin);
        }

        result.nest_costs = NestCostCalculator::quote_nest_costs(quote, self.sheet_settings);
        result.sheet_total = NestCostCalculator::total_sheet_cost(quote, self.sheet_settings);
        Self::check_saturation(quote, &mut result);
        result.calculation_time_ms = Some(start_time.elapsed().as_millis());

        tracing::info!(
            "報價計算完成，零件 {}，外購件 {}，板材 {}，耗時 {:?}",
            result.laser_cut_parts_total,
            result.components_total,
            result.sheet_total,
            start_time.elapsed()
        );

        result
    }

    /// 更新所有零件的成本基礎與塗裝成本（各排版並行）
    pub fn update_part_costs(&self, quote: &mut Quote) {
        let settings = &quote.settings;
        let update = |nest: &mut Nest| {
            for part in &mut nest.laser_cut_parts {
                self.update_part_cost(part, settings);
            }
        };

        update(&mut quote.custom_nest);
        quote.nests.par_iter_mut().for_each(update);
    }

    /// 更新單一零件的成本基礎與塗裝成本
    pub fn update_part_cost(&self, part: &mut LaserCutPart, settings: &QuoteSettings) {
        part.coating.primer_overspray = settings.primer_overspray;
        part.coating.paint_overspray = settings.paint_overspray;
        part.coating.powder_transfer_efficiency = settings.transfer_efficiency;

        part.cost_of_goods = NestCostCalculator::part_cost_of_goods(
            part,
            NestCostCalculator::cost_per_hour(settings, self.sheet_settings),
            self.sheet_settings,
        );
        part.cost_for_primer = self.paint_inventory.primer_cost(part);
        part.cost_for_paint = self.paint_inventory.paint_cost(part);
        part.cost_for_powder_coating = self
            .paint_inventory
            .powder_cost(part, settings.mil_thickness);
    }

    /// 零件單價（逐項加成後四捨五入到兩位小數）
    pub fn part_unit_price(part: &LaserCutPart, settings: &QuoteSettings) -> Decimal {
        CostContributors::from_part(part, settings.match_item_to_sheet_cost).unit_price(
            settings.item_profit_margin_fraction(),
            settings.item_overhead_fraction(),
        )
    }

    /// 外購件報價金額（單價四捨五入後 × 數量，再依設定加成；溢位時飽和）
    pub fn component_line_price(component: &Component, settings: &QuoteSettings) -> Decimal {
        let base = saturating_line_total(
            component.converted_price(settings.exchange_rate).round_dp(2),
            component.quantity,
        );
        if settings.components_use_markup() {
            let (profit_margin, overhead) = settings.component_markup_fractions();
            markup(base, profit_margin, overhead)
        } else {
            base
        }
    }

    /// 零件報價合計（溢位時飽和）
    pub fn laser_cut_parts_total(quote: &Quote) -> Decimal {
        saturating_total(
            quote
                .laser_cut_parts()
                .map(|part| part.price.checked_mul(part.quantity)),
        )
    }

    /// 單一排版的零件報價合計（溢位時飽和）
    pub fn nest_parts_total(nest: &Nest) -> Decimal {
        saturating_total(
            nest.laser_cut_parts
                .iter()
                .map(|part| part.price.checked_mul(part.quantity)),
        )
    }

    /// 依切割方式更新報價的每小時切割成本
    fn sync_laser_cutting_cost(&self, quote: &mut Quote, result: &mut PricingResult) {
        let method = &quote.settings.laser_cutting_method;
        let cost = self.sheet_settings.laser_cost(method);
        if cost.is_zero() {
            result.add_warning(QuoteWarning::info(
                quote.name.clone(),
                format!(
                    "切割方式 {} 沒有每小時成本，沿用 {}",
                    method, quote.settings.laser_cutting_cost
                ),
            ));
        } else if cost != quote.settings.laser_cutting_cost {
            tracing::debug!("切割方式 {} 每小時成本 {} -> {}", method, quote.settings.laser_cutting_cost, cost);
            quote.settings.laser_cutting_cost = cost;
        }
    }

    /// 金額溢位時記錄錯誤，合計保持飽和值
    fn check_saturation(quote: &Quote, result: &mut PricingResult) {
        for part in quote.laser_cut_parts() {
            if part.price == Decimal::MAX {
                result.add_warning(QuoteWarning::error(
                    part.name.clone(),
                    "加成後單價溢位，已設為上限".to_string(),
                ));
            }
        }

        let totals = [
            ("零件合計", result.laser_cut_parts_total),
            ("外購件合計", result.components_total),
            ("板材合計", result.sheet_total),
        ];
        for (label, total) in totals {
            if total == Decimal::MAX {
                tracing::warn!("{} {} 溢位", quote.name, label);
                result.add_warning(QuoteWarning::error(
                    quote.name.clone(),
                    format!("{}溢位，已設為上限", label),
                ));
            }
        }
    }

    /// 材質沒有單價的零件只記錄提示
    fn check_material_prices(&self, quote: &Quote, result: &mut PricingResult) {
        for part in quote.laser_cut_parts() {
            if part.weight > Decimal::ZERO
                && self.sheet_settings.price_per_pound(&part.material).is_zero()
            {
                result.add_warning(QuoteWarning::info(
                    part.name.clone(),
                    format!("材質 {} 沒有每磅單價，材料成本以 0 計算", part.material),
                ));
            }
        }
    }
}
