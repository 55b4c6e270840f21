//! 庫存與報價成本彙總

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use quote_core::{
    ComponentsInventory, LaserCutPart, PriceableItem, Quote, SheetSettingsProvider,
    SheetsInventory,
};

use crate::markup::saturating_line_total;

/// 庫存成本彙總
pub struct InventoryAggregates;

impl InventoryAggregates {
    /// 外購件庫存總成本
    pub fn components_stock_cost(inventory: &ComponentsInventory, exchange_rate: Decimal) -> Decimal {
        inventory
            .components
            .iter()
            .map(|component| component.stock_cost(exchange_rate))
            .sum()
    }

    /// 單一分類的外購件庫存成本
    pub fn components_category_stock_cost(
        inventory: &ComponentsInventory,
        category: &str,
        exchange_rate: Decimal,
    ) -> Decimal {
        inventory
            .components
            .iter()
            .filter(|component| component.has_category(category))
            .map(|component| component.stock_cost(exchange_rate))
            .sum()
    }

    /// 分類名稱包含指定文字的外購件庫存成本（每個外購件只計一次）
    pub fn components_similar_categories_stock_cost(
        inventory: &ComponentsInventory,
        text: &str,
        exchange_rate: Decimal,
    ) -> Decimal {
        inventory
            .components
            .iter()
            .filter(|component| component.categories.iter().any(|c| c.contains(text)))
            .map(|component| component.stock_cost(exchange_rate))
            .sum()
    }

    /// 分類的單位成本（每個外購件：單價 × 分類用量）
    pub fn components_category_unit_cost(
        inventory: &ComponentsInventory,
        category: &str,
        exchange_rate: Decimal,
    ) -> Decimal {
        inventory
            .components
            .iter()
            .filter(|component| component.has_category(category))
            .map(|component| component.unit_cost_for_category(category, exchange_rate))
            .sum()
    }

    /// 各分類的外購件庫存成本
    pub fn components_stock_cost_by_category(
        inventory: &ComponentsInventory,
        exchange_rate: Decimal,
    ) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        for component in &inventory.components {
            for category in &component.categories {
                *totals.entry(category.clone()).or_insert(Decimal::ZERO) +=
                    component.stock_cost(exchange_rate);
            }
        }
        totals
    }

    /// 單一分類的板材庫存成本（以板材設定計價）
    pub fn sheets_category_stock_cost(
        inventory: &SheetsInventory,
        category: &str,
        sheet_settings: &dyn SheetSettingsProvider,
    ) -> Decimal {
        inventory
            .sheets
            .iter()
            .filter(|sheet| sheet.has_category(category))
            .map(|sheet| (sheet.cost(sheet_settings) * sheet.quantity).max(Decimal::ZERO))
            .sum()
    }

    /// 板材庫存總成本
    pub fn sheets_stock_cost(
        inventory: &SheetsInventory,
        sheet_settings: &dyn SheetSettingsProvider,
    ) -> Decimal {
        inventory
            .sheets
            .iter()
            .map(|sheet| (sheet.cost(sheet_settings) * sheet.quantity).max(Decimal::ZERO))
            .sum()
    }

    /// 單一分類的雷射切割零件庫存成本
    pub fn laser_cut_category_stock_cost(parts: &[LaserCutPart], category: &str) -> Decimal {
        parts
            .iter()
            .filter(|part| part.has_category(category))
            .map(|part| part.total_cost_in_stock())
            .sum()
    }

    /// 重切零件庫存成本
    pub fn laser_cut_recut_stock_cost(parts: &[LaserCutPart]) -> Decimal {
        parts
            .iter()
            .filter(|part| part.recut)
            .map(|part| part.total_cost_in_stock())
            .sum()
    }

    /// 報價零件金額依 `材質;厚度` 分組
    pub fn quote_cost_by_material(quote: &Quote) -> BTreeMap<String, Decimal> {
        let mut totals = BTreeMap::new();
        for part in quote.laser_cut_parts() {
            let line = saturating_line_total(part.price, part.quantity);
            let total = totals.entry(part.material_key()).or_insert(Decimal::ZERO);
            *total = total.checked_add(line).unwrap_or(Decimal::MAX);
        }
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::{Component, Nest, QuoteSettings, Sheet, SheetSettings};

    fn components() -> ComponentsInventory {
        ComponentsInventory::new()
            .with_component(
                Component::new("BOLT", Decimal::from(100), Decimal::new(10, 2))
                    .with_category("Hardware", Decimal::from(4))
                    .with_category("Frame Hardware", Decimal::from(2)),
            )
            .with_component(
                Component::new("MOTOR", Decimal::from(2), Decimal::from(100))
                    .with_exchange_rate(true)
                    .with_category("Electrical", Decimal::ONE),
            )
            .with_component(
                Component::new("SCRAP", Decimal::from(-3), Decimal::from(5))
                    .with_category("Hardware", Decimal::ONE),
            )
    }

    #[test]
    fn test_components_stock_cost() {
        let rate = Decimal::new(13, 1);
        let inventory = components();

        // 10 + 260 + 0（負庫存視為 0）
        assert_eq!(
            InventoryAggregates::components_stock_cost(&inventory, rate),
            Decimal::from(270)
        );
        assert_eq!(
            InventoryAggregates::components_category_stock_cost(&inventory, "Hardware", rate),
            Decimal::from(10)
        );
    }

    #[test]
    fn test_similar_categories_count_each_component_once() {
        let inventory = components();

        assert_eq!(
            InventoryAggregates::components_similar_categories_stock_cost(
                &inventory,
                "Hardware",
                Decimal::ONE
            ),
            Decimal::from(10)
        );
    }

    #[test]
    fn test_category_unit_cost() {
        let inventory = components();

        // BOLT 0.10 × 4 + SCRAP 5 × 1
        assert_eq!(
            InventoryAggregates::components_category_unit_cost(&inventory, "Hardware", Decimal::ONE),
            Decimal::new(540, 2)
        );
    }

    #[test]
    fn test_stock_cost_by_category() {
        let totals = InventoryAggregates::components_stock_cost_by_category(&components(), Decimal::ONE);

        assert_eq!(totals["Hardware"], Decimal::from(10));
        assert_eq!(totals["Frame Hardware"], Decimal::from(10));
        assert_eq!(totals["Electrical"], Decimal::from(200));
    }

    #[test]
    fn test_sheet_stock_cost() {
        let settings = SheetSettings::new()
            .with_price_per_pound("Mild Steel", Decimal::new(55, 2))
            .with_pounds_per_square_foot("Mild Steel", "12 Gauge", Decimal::new(4375, 3));
        let inventory = SheetsInventory::new().with_sheet(
            Sheet::new("Mild Steel", "12 Gauge", Decimal::from(96), Decimal::from(48))
                .with_quantity(Decimal::from(4))
                .with_category("Steel"),
        );

        assert_eq!(
            InventoryAggregates::sheets_category_stock_cost(&inventory, "Steel", &settings),
            Decimal::from(308)
        );
        assert_eq!(
            InventoryAggregates::sheets_stock_cost(&inventory, &settings),
            Decimal::from(308)
        );
    }

    #[test]
    fn test_laser_cut_stock_costs() {
        let mut plain = LaserCutPart::new("A", Decimal::from(10)).with_category("Brackets");
        plain.price = Decimal::from(3);
        let mut recut = LaserCutPart::new("B", Decimal::from(2)).with_recut(1);
        recut.price = Decimal::from(7);
        let parts = vec![plain, recut];

        assert_eq!(
            InventoryAggregates::laser_cut_category_stock_cost(&parts, "Brackets"),
            Decimal::from(30)
        );
        assert_eq!(
            InventoryAggregates::laser_cut_recut_stock_cost(&parts),
            Decimal::from(14)
        );
    }

    #[test]
    fn test_quote_cost_by_material() {
        let sheet = Sheet::new("Mild Steel", "12 Gauge", Decimal::from(96), Decimal::from(48));
        let mut part = LaserCutPart::new("A", Decimal::from(4));
        part.price = Decimal::new(250, 2);
        let quote = Quote::new("Q", QuoteSettings::default())
            .with_nest(Nest::new("N1", sheet).with_part(part));

        let totals = InventoryAggregates::quote_cost_by_material(&quote);
        assert_eq!(totals["Mild Steel;12 Gauge"], Decimal::from(10));
    }
}
