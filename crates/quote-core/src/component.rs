//! 外購件模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::item::{ItemKind, PriceableItem};
use crate::order::{Order, StockItem};
use crate::parse::parse_decimal;
use crate::{Result, UNSAVED_ID};

/// 外購件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    pub id: i64,

    /// 料號
    pub part_number: String,

    /// 品名
    pub part_name: String,

    /// 庫存數量
    pub quantity: Decimal,

    /// 單價（原幣）
    pub price: Decimal,

    /// 價格是否需要乘上匯率
    pub use_exchange_rate: bool,

    /// 分類
    pub categories: Vec<String>,

    /// 分類 -> 每單位用量（未設定為 1）
    pub category_quantities: BTreeMap<String, Decimal>,

    /// 最後一次數量異動紀錄
    pub latest_change_quantity: String,

    /// 最後一次價格異動紀錄
    pub latest_change_price: String,

    /// 待到貨訂單
    pub orders: Vec<Order>,

    pub shelf_number: String,

    pub notes: String,

    /// 低庫存警示（紅 / 黃）
    pub red_quantity_limit: Decimal,
    pub yellow_quantity_limit: Decimal,
}

impl Component {
    /// 創建新的外購件
    pub fn new(part_number: impl Into<String>, quantity: Decimal, price: Decimal) -> Self {
        Self {
            id: UNSAVED_ID,
            part_number: part_number.into(),
            part_name: String::new(),
            quantity,
            price,
            use_exchange_rate: false,
            categories: Vec::new(),
            category_quantities: BTreeMap::new(),
            latest_change_quantity: "Nothing recorded".to_string(),
            latest_change_price: "Nothing recorded".to_string(),
            orders: Vec::new(),
            shelf_number: String::new(),
            notes: String::new(),
            red_quantity_limit: Decimal::from(10),
            yellow_quantity_limit: Decimal::from(20),
        }
    }

    /// 建構器模式：設置品名
    pub fn with_part_name(mut self, part_name: impl Into<String>) -> Self {
        self.part_name = part_name.into();
        self
    }

    /// 建構器模式：價格使用外幣
    pub fn with_exchange_rate(mut self, use_exchange_rate: bool) -> Self {
        self.use_exchange_rate = use_exchange_rate;
        self
    }

    /// 建構器模式：添加分類與每單位用量
    pub fn with_category(mut self, category: impl Into<String>, quantity: Decimal) -> Self {
        let category = category.into();
        self.category_quantities.insert(category.clone(), quantity);
        if !self.categories.contains(&category) {
            self.categories.push(category);
        }
        self
    }

    /// 建構器模式：設置 ID
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// 分類下每單位用量（未設定為 1）
    pub fn category_quantity(&self, category: &str) -> Decimal {
        self.category_quantities
            .get(category)
            .copied()
            .unwrap_or(Decimal::ONE)
    }

    pub fn set_category_quantity(&mut self, category: &str, quantity: Decimal) {
        self.category_quantities.insert(category.to_string(), quantity);
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }

    /// 移除分類（同時移除用量）
    pub fn remove_category(&mut self, category: &str) {
        self.categories.retain(|c| c != category);
        self.category_quantities.remove(category);
    }

    /// 換算後單價
    pub fn converted_price(&self, exchange_rate: Decimal) -> Decimal {
        if self.use_exchange_rate {
            self.price * exchange_rate
        } else {
            self.price
        }
    }

    /// 庫存總成本（不小於 0）
    pub fn stock_cost(&self, exchange_rate: Decimal) -> Decimal {
        (self.converted_price(exchange_rate) * self.quantity).max(Decimal::ZERO)
    }

    /// 分類下的單位成本（單價 × 每單位用量）
    pub fn unit_cost_for_category(&self, category: &str, exchange_rate: Decimal) -> Decimal {
        self.converted_price(exchange_rate) * self.category_quantity(category)
    }

    /// 以文字設置單價，解析失敗時保留原值
    pub fn try_set_price_text(&mut self, text: &str) -> Result<()> {
        self.price = parse_decimal(text)?;
        Ok(())
    }

    /// 以文字設置數量，解析失敗時保留原值
    pub fn try_set_quantity_text(&mut self, text: &str) -> Result<()> {
        self.quantity = parse_decimal(text)?;
        Ok(())
    }
}

impl PriceableItem for Component {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.part_number
    }

    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.price
    }

    fn kind(&self) -> ItemKind {
        ItemKind::Component
    }
}

impl StockItem for Component {
    fn orders(&self) -> &[Order] {
        &self.orders
    }

    fn orders_mut(&mut self) -> &mut Vec<Order> {
        &mut self.orders
    }

    fn set_quantity(&mut self, quantity: Decimal) {
        self.quantity = quantity;
    }

    fn latest_change_quantity(&self) -> &str {
        &self.latest_change_quantity
    }

    fn set_latest_change_quantity(&mut self, change: String) {
        self.latest_change_quantity = change;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::QuoteError;

    #[test]
    fn test_create_component() {
        let component = Component::new("BOLT-M8", Decimal::from(100), Decimal::new(25, 2))
            .with_part_name("M8 Hex Bolt")
            .with_category("Hardware", Decimal::from(4));

        assert_eq!(component.name(), "BOLT-M8");
        assert_eq!(component.category_quantity("Hardware"), Decimal::from(4));
        assert_eq!(component.category_quantity("Frames"), Decimal::ONE);
        assert!(component.has_category("Hardware"));
    }

    #[test]
    fn test_exchange_rate() {
        let rate = Decimal::new(13, 1);
        let component =
            Component::new("MOTOR", Decimal::from(2), Decimal::from(100)).with_exchange_rate(true);

        assert_eq!(component.converted_price(rate), Decimal::from(130));
        assert_eq!(component.stock_cost(rate), Decimal::from(260));
    }

    #[test]
    fn test_unit_cost_for_category() {
        let component = Component::new("WASHER", Decimal::from(50), Decimal::new(10, 2))
            .with_category("Assembly A", Decimal::from(8));

        assert_eq!(
            component.unit_cost_for_category("Assembly A", Decimal::ONE),
            Decimal::new(80, 2)
        );
    }

    #[test]
    fn test_negative_stock_cost_clamped() {
        let component = Component::new("NUT", Decimal::from(-5), Decimal::from(2));
        assert_eq!(component.stock_cost(Decimal::ONE), Decimal::ZERO);
    }

    #[test]
    fn test_invalid_text_keeps_prior_value() {
        let mut component = Component::new("NUT", Decimal::from(5), Decimal::from(2));

        assert!(component.try_set_price_text("$3.50").is_ok());
        assert_eq!(component.price, Decimal::new(350, 2));

        let result = component.try_set_quantity_text("twelve");
        assert!(matches!(result, Err(QuoteError::InvalidNumber(_))));
        assert_eq!(component.quantity, Decimal::from(5));
    }

    #[test]
    fn test_remove_category() {
        let mut component = Component::new("PIN", Decimal::ONE, Decimal::ONE)
            .with_category("A", Decimal::from(2));
        component.remove_category("A");

        assert!(!component.has_category("A"));
        assert_eq!(component.category_quantity("A"), Decimal::ONE);
    }
}
