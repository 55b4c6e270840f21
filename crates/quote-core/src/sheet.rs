//! 板材模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::item::{ItemKind, PriceableItem};
use crate::order::{Order, StockItem};
use crate::sheet_settings::SheetSettingsProvider;
use crate::UNSAVED_ID;

/// 板材
///
/// 材質、厚度與尺寸只能透過 setter 修改，顯示名稱隨之更新。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "SheetRecord")]
pub struct Sheet {
    pub id: i64,

    /// 材質
    material: String,

    /// 厚度
    thickness: String,

    /// 長度（英吋）
    length: Decimal,

    /// 寬度（英吋）
    width: Decimal,

    /// 庫存數量
    pub quantity: Decimal,

    /// 計算後單價
    pub price: Decimal,

    /// 最後一次數量異動紀錄
    pub latest_change_quantity: String,

    /// 是否已送出低庫存警告
    pub has_sent_warning: bool,

    pub red_quantity_limit: Decimal,
    pub yellow_quantity_limit: Decimal,

    pub orders: Vec<Order>,

    pub categories: Vec<String>,

    pub notes: String,

    /// 顯示名稱快取
    #[serde(skip)]
    name: String,
}

/// 板材的儲存格式（不含顯示名稱）
#[derive(Deserialize)]
struct SheetRecord {
    id: i64,
    material: String,
    thickness: String,
    length: Decimal,
    width: Decimal,
    quantity: Decimal,
    price: Decimal,
    latest_change_quantity: String,
    has_sent_warning: bool,
    red_quantity_limit: Decimal,
    yellow_quantity_limit: Decimal,
    orders: Vec<Order>,
    categories: Vec<String>,
    notes: String,
}

impl From<SheetRecord> for Sheet {
    fn from(record: SheetRecord) -> Self {
        let mut sheet = Self {
            id: record.id,
            material: record.material,
            thickness: record.thickness,
            length: record.length,
            width: record.width,
            quantity: record.quantity,
            price: record.price,
            latest_change_quantity: record.latest_change_quantity,
            has_sent_warning: record.has_sent_warning,
            red_quantity_limit: record.red_quantity_limit,
            yellow_quantity_limit: record.yellow_quantity_limit,
            orders: record.orders,
            categories: record.categories,
            notes: record.notes,
            name: String::new(),
        };
        sheet.refresh_name();
        sheet
    }
}

impl Sheet {
    /// 創建新的板材
    pub fn new(
        material: impl Into<String>,
        thickness: impl Into<String>,
        length: Decimal,
        width: Decimal,
    ) -> Self {
        let mut sheet = Self {
            id: UNSAVED_ID,
            material: material.into(),
            thickness: thickness.into(),
            length,
            width,
            quantity: Decimal::ZERO,
            price: Decimal::ZERO,
            latest_change_quantity: "Nothing recorded".to_string(),
            has_sent_warning: false,
            red_quantity_limit: Decimal::from(4),
            yellow_quantity_limit: Decimal::from(10),
            orders: Vec::new(),
            categories: Vec::new(),
            notes: String::new(),
            name: String::new(),
        };
        sheet.refresh_name();
        sheet
    }

    /// 建構器模式：設置庫存數量
    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    /// 建構器模式：添加分類
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// 建構器模式：設置 ID
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    pub fn thickness(&self) -> &str {
        &self.thickness
    }

    pub fn length(&self) -> Decimal {
        self.length
    }

    pub fn width(&self) -> Decimal {
        self.width
    }

    pub fn set_material(&mut self, material: impl Into<String>) {
        self.material = material.into();
        self.refresh_name();
    }

    pub fn set_thickness(&mut self, thickness: impl Into<String>) {
        self.thickness = thickness.into();
        self.refresh_name();
    }

    pub fn set_dimensions(&mut self, length: Decimal, width: Decimal) {
        self.length = length;
        self.width = width;
        self.refresh_name();
    }

    fn refresh_name(&mut self) {
        self.name = format!(
            "{} {} {}",
            self.thickness,
            self.material,
            self.dimension_text()
        );
    }

    /// 尺寸文字 `長x寬`（三位小數）
    pub fn dimension_text(&self) -> String {
        format!("{:.3}x{:.3}", self.length, self.width)
    }

    /// 面積（平方英尺）
    pub fn area_square_feet(&self) -> Decimal {
        self.length * self.width / Decimal::from(144)
    }

    /// 單張重量（磅）
    pub fn weight(&self, settings: &dyn SheetSettingsProvider) -> Decimal {
        self.area_square_feet() * settings.pounds_per_square_foot(&self.material, &self.thickness)
    }

    /// 單張材料成本
    pub fn cost(&self, settings: &dyn SheetSettingsProvider) -> Decimal {
        settings.price_per_pound(&self.material) * self.weight(settings)
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

impl PriceableItem for Sheet {
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
        ItemKind::Sheet
    }
}

impl StockItem for Sheet {
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

    fn on_stock_increased(&mut self) {
        self.has_sent_warning = false;
    }
}
