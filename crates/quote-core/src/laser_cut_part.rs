//! 雷射切割零件模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::item::{ItemKind, PriceableItem};
use crate::UNSAVED_ID;

/// 零件塗裝設定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoatingSettings {
    pub uses_primer: bool,
    pub primer_name: Option<String>,
    /// 底漆噴塗損耗（%）
    pub primer_overspray: Decimal,

    pub uses_paint: bool,
    pub paint_name: Option<String>,
    /// 面漆噴塗損耗（%）
    pub paint_overspray: Decimal,

    pub uses_powder: bool,
    pub powder_name: Option<String>,
    /// 粉體轉移效率（%）
    pub powder_transfer_efficiency: Decimal,
}

impl Default for CoatingSettings {
    fn default() -> Self {
        Self {
            uses_primer: false,
            primer_name: None,
            primer_overspray: Decimal::new(6667, 2),
            uses_paint: false,
            paint_name: None,
            paint_overspray: Decimal::new(6667, 2),
            uses_powder: false,
            powder_name: None,
            powder_transfer_efficiency: Decimal::new(6667, 2),
        }
    }
}

impl CoatingSettings {
    /// 是否有任何塗裝
    pub fn is_coated(&self) -> bool {
        self.uses_primer || self.uses_paint || self.uses_powder
    }
}

/// 雷射切割零件
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserCutPart {
    pub id: i64,

    /// 零件名稱
    pub name: String,

    /// 報價數量
    pub quantity: Decimal,

    /// 材質（跟隨所屬排版的板材）
    pub material: String,

    /// 厚度（跟隨所屬排版的板材）
    pub gauge: String,

    /// 重量（磅）
    pub weight: Decimal,

    /// 加工時間（秒）
    pub machine_time: Decimal,

    /// 表面積（平方英吋，單面）
    pub surface_area: Decimal,

    /// 每張板材可排數量
    pub quantity_in_nest: Option<Decimal>,

    pub coating: CoatingSettings,

    /// 折彎成本
    pub bend_cost: Decimal,

    /// 人工成本
    pub labor_cost: Decimal,

    /// 材料 + 切割成本
    pub cost_of_goods: Decimal,

    /// 對齊板材成本後的成本基礎
    pub matched_to_sheet_cost_price: Decimal,

    pub cost_for_primer: Decimal,
    pub cost_for_paint: Decimal,
    pub cost_for_powder_coating: Decimal,

    /// 計算後單價
    pub price: Decimal,

    /// 是否為重切零件
    pub recut: bool,

    /// 重切次數
    pub recut_count: u32,

    /// 分類
    pub categories: Vec<String>,
}

impl LaserCutPart {
    /// 創建新的雷射切割零件
    pub fn new(name: impl Into<String>, quantity: Decimal) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            quantity,
            material: String::new(),
            gauge: String::new(),
            weight: Decimal::ZERO,
            machine_time: Decimal::ZERO,
            surface_area: Decimal::ZERO,
            quantity_in_nest: None,
            coating: CoatingSettings::default(),
            bend_cost: Decimal::ZERO,
            labor_cost: Decimal::ZERO,
            cost_of_goods: Decimal::ZERO,
            matched_to_sheet_cost_price: Decimal::ZERO,
            cost_for_primer: Decimal::ZERO,
            cost_for_paint: Decimal::ZERO,
            cost_for_powder_coating: Decimal::ZERO,
            price: Decimal::ZERO,
            recut: false,
            recut_count: 0,
            categories: Vec::new(),
        }
    }

    /// 建構器模式：設置材質與厚度
    pub fn with_material(mut self, material: impl Into<String>, gauge: impl Into<String>) -> Self {
        self.material = material.into();
        self.gauge = gauge.into();
        self
    }

    /// 建構器模式：設置重量（磅）與加工時間（秒）
    pub fn with_weight_and_machine_time(mut self, weight: Decimal, machine_time: Decimal) -> Self {
        self.weight = weight;
        self.machine_time = machine_time;
        self
    }

    /// 建構器模式：設置折彎與人工成本
    pub fn with_process_costs(mut self, bend_cost: Decimal, labor_cost: Decimal) -> Self {
        self.bend_cost = bend_cost;
        self.labor_cost = labor_cost;
        self
    }

    /// 建構器模式：設置成本基礎
    pub fn with_cost_of_goods(mut self, cost_of_goods: Decimal) -> Self {
        self.cost_of_goods = cost_of_goods;
        self
    }

    /// 建構器模式：設置表面積
    pub fn with_surface_area(mut self, surface_area: Decimal) -> Self {
        self.surface_area = surface_area;
        self
    }

    /// 建構器模式：設置每張板材可排數量
    pub fn with_quantity_in_nest(mut self, quantity_in_nest: Decimal) -> Self {
        self.quantity_in_nest = Some(quantity_in_nest);
        self
    }

    /// 建構器模式：標記為重切零件
    pub fn with_recut(mut self, recut_count: u32) -> Self {
        self.recut = true;
        self.recut_count = recut_count;
        self
    }

    /// 建構器模式：添加分類
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// 加成用的成本基礎
    pub fn cost_basis(&self, match_to_sheet: bool) -> Decimal {
        if match_to_sheet {
            self.matched_to_sheet_cost_price
        } else {
            self.cost_of_goods
        }
    }

    /// 塗裝成本合計
    pub fn coating_cost(&self) -> Decimal {
        self.cost_for_primer + self.cost_for_paint + self.cost_for_powder_coating
    }

    /// `材質;厚度` 分組鍵
    pub fn material_key(&self) -> String {
        format!("{};{}", self.material, self.gauge)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

impl PriceableItem for LaserCutPart {
    fn id(&self) -> i64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn quantity(&self) -> Decimal {
        self.quantity
    }

    fn unit_price(&self) -> Decimal {
        self.price
    }

    fn kind(&self) -> ItemKind {
        ItemKind::LaserCutPart
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_part() {
        let part = LaserCutPart::new("BRACKET-01", Decimal::from(4))
            .with_material("Mild Steel", "12 Gauge")
            .with_weight_and_machine_time(Decimal::new(25, 1), Decimal::from(90))
            .with_category("Brackets");

        assert_eq!(part.id, UNSAVED_ID);
        assert_eq!(part.quantity, Decimal::from(4));
        assert_eq!(part.material_key(), "Mild Steel;12 Gauge");
        assert!(part.has_category("Brackets"));
        assert!(!part.coating.is_coated());
    }

    #[test]
    fn test_cost_basis() {
        let mut part = LaserCutPart::new("PLATE", Decimal::ONE).with_cost_of_goods(Decimal::from(10));
        part.matched_to_sheet_cost_price = Decimal::from(7);

        assert_eq!(part.cost_basis(false), Decimal::from(10));
        assert_eq!(part.cost_basis(true), Decimal::from(7));
    }

    #[test]
    fn test_total_cost_clamped() {
        let mut part = LaserCutPart::new("PLATE", Decimal::from(-2));
        part.price = Decimal::from(5);

        assert_eq!(part.total_cost_in_stock(), Decimal::ZERO);
    }
}
