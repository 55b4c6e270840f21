//! 採購單、供應商、送貨地址

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::UNSAVED_ID;

/// 供應商
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub notes: String,
}

impl Vendor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            notes: String::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

/// 送貨地址
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub notes: String,
}

impl ShippingAddress {
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            address: address.into(),
            phone: String::new(),
            email: String::new(),
            website: String::new(),
            notes: String::new(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }
}

/// 採購單類型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseOrderStatus {
    PurchaseOrder,
    Quote,
    ReleaseOrder,
}

impl PurchaseOrderStatus {
    /// 顯示前綴
    pub fn prefix(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::PurchaseOrder => "PO",
            PurchaseOrderStatus::Quote => "QUOTE",
            PurchaseOrderStatus::ReleaseOrder => "RO",
        }
    }
}

/// 運送方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShippingMethod {
    HoldForPickup,
    PickUp,
    BruderDelivery,
    FedEx,
    Mail,
    SendByCourier,
    GardwineCollect,
    PrePaid,
    MotopakCollect,
    MotopakPrePaid,
    GreyhoundCollect,
    RosenorthCollect,
    Collect,
    WillCall,
}

impl ShippingMethod {
    /// 所有運送方式（顯示順序）
    pub const ALL: [ShippingMethod; 14] = [
        ShippingMethod::HoldForPickup,
        ShippingMethod::PickUp,
        ShippingMethod::BruderDelivery,
        ShippingMethod::FedEx,
        ShippingMethod::Mail,
        ShippingMethod::SendByCourier,
        ShippingMethod::GardwineCollect,
        ShippingMethod::PrePaid,
        ShippingMethod::MotopakCollect,
        ShippingMethod::MotopakPrePaid,
        ShippingMethod::GreyhoundCollect,
        ShippingMethod::RosenorthCollect,
        ShippingMethod::Collect,
        ShippingMethod::WillCall,
    ];
}

/// 採購單表頭
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    pub vendor: Vendor,
    pub shipping_address: Option<ShippingAddress>,
    /// 同一供應商內唯一且遞增
    pub purchase_order_number: i64,
    pub status: PurchaseOrderStatus,
    pub shipping_method: ShippingMethod,
    pub order_date: NaiveDate,
    pub notes: String,
    pub is_draft: bool,
}

/// 採購單明細
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoLine {
    /// 外購件 / 板材 ID
    pub item_id: i64,
    /// 預計訂購數量（與庫存數量無關）
    pub order_quantity: Decimal,
}

/// 採購單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: i64,
    pub meta_data: MetaData,
    pub components: Vec<PoLine>,
    pub sheets: Vec<PoLine>,
}

impl PurchaseOrder {
    /// 創建新的採購單（尚未儲存）
    pub fn new(vendor: Vendor, purchase_order_number: i64, order_date: NaiveDate) -> Self {
        Self {
            id: UNSAVED_ID,
            meta_data: MetaData {
                vendor,
                shipping_address: None,
                purchase_order_number,
                status: PurchaseOrderStatus::PurchaseOrder,
                shipping_method: ShippingMethod::PickUp,
                order_date,
                notes: String::new(),
                is_draft: false,
            },
            components: Vec::new(),
            sheets: Vec::new(),
        }
    }

    /// 建構器模式：設置類型
    pub fn with_status(mut self, status: PurchaseOrderStatus) -> Self {
        self.meta_data.status = status;
        self
    }

    /// 建構器模式：設置運送方式與地址
    pub fn with_shipping(mut self, method: ShippingMethod, address: ShippingAddress) -> Self {
        self.meta_data.shipping_method = method;
        self.meta_data.shipping_address = Some(address);
        self
    }

    /// 建構器模式：添加外購件明細
    pub fn with_component(mut self, component_id: i64, order_quantity: Decimal) -> Self {
        self.set_component_order_quantity(component_id, order_quantity);
        self
    }

    /// 建構器模式：添加板材明細
    pub fn with_sheet(mut self, sheet_id: i64, order_quantity: Decimal) -> Self {
        self.set_sheet_order_quantity(sheet_id, order_quantity);
        self
    }

    pub fn vendor_name(&self) -> &str {
        &self.meta_data.vendor.name
    }

    pub fn purchase_order_number(&self) -> i64 {
        self.meta_data.purchase_order_number
    }

    pub fn set_component_order_quantity(&mut self, component_id: i64, order_quantity: Decimal) {
        set_line(&mut self.components, component_id, order_quantity);
    }

    pub fn set_sheet_order_quantity(&mut self, sheet_id: i64, order_quantity: Decimal) {
        set_line(&mut self.sheets, sheet_id, order_quantity);
    }

    /// 外購件訂購數量（沒有明細為 0）
    pub fn component_order_quantity(&self, component_id: i64) -> Decimal {
        line_quantity(&self.components, component_id)
    }

    /// 板材訂購數量（沒有明細為 0）
    pub fn sheet_order_quantity(&self, sheet_id: i64) -> Decimal {
        line_quantity(&self.sheets, sheet_id)
    }

    pub fn remove_component(&mut self, component_id: i64) -> bool {
        remove_line(&mut self.components, component_id)
    }

    pub fn remove_sheet(&mut self, sheet_id: i64) -> bool {
        remove_line(&mut self.sheets, sheet_id)
    }

    /// 所有明細數量歸零
    pub fn reset_order_quantities(&mut self) {
        for line in self.components.iter_mut().chain(self.sheets.iter_mut()) {
            line.order_quantity = Decimal::ZERO;
        }
    }
}

impl fmt::Display for PurchaseOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} #{}",
            self.meta_data.status.prefix(),
            self.meta_data.purchase_order_number
        )
    }
}

fn set_line(lines: &mut Vec<PoLine>, item_id: i64, order_quantity: Decimal) {
    match lines.iter_mut().find(|line| line.item_id == item_id) {
        Some(line) => line.order_quantity = order_quantity,
        None => lines.push(PoLine {
            item_id,
            order_quantity,
        }),
    }
}

fn line_quantity(lines: &[PoLine], item_id: i64) -> Decimal {
    lines
        .iter()
        .find(|line| line.item_id == item_id)
        .map(|line| line.order_quantity)
        .unwrap_or(Decimal::ZERO)
}

fn remove_line(lines: &mut Vec<PoLine>, item_id: i64) -> bool {
    let before = lines.len();
    lines.retain(|line| line.item_id != item_id);
    lines.len() != before
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purchase_order() -> PurchaseOrder {
        PurchaseOrder::new(
            Vendor::new("Acme Steel").with_id(3),
            12,
            NaiveDate::from_ymd_opt(2025, 11, 1).unwrap(),
        )
    }

    #[test]
    fn test_display_name() {
        let po = purchase_order();
        assert_eq!(po.to_string(), "PO #12");
        assert_eq!(
            po.clone().with_status(PurchaseOrderStatus::Quote).to_string(),
            "QUOTE #12"
        );
        assert_eq!(
            po.with_status(PurchaseOrderStatus::ReleaseOrder).to_string(),
            "RO #12"
        );
    }

    #[test]
    fn test_line_items() {
        let mut po = purchase_order()
            .with_component(1, Decimal::from(5))
            .with_sheet(9, Decimal::from(2));

        // 更新既有明細而不是新增
        po.set_component_order_quantity(1, Decimal::from(8));
        assert_eq!(po.components.len(), 1);
        assert_eq!(po.component_order_quantity(1), Decimal::from(8));
        assert_eq!(po.component_order_quantity(2), Decimal::ZERO);
        assert_eq!(po.sheet_order_quantity(9), Decimal::from(2));

        assert!(po.remove_sheet(9));
        assert!(!po.remove_sheet(9));
    }

    #[test]
    fn test_reset_quantities() {
        let mut po = purchase_order()
            .with_component(1, Decimal::from(5))
            .with_sheet(9, Decimal::from(2));
        po.reset_order_quantities();

        assert_eq!(po.component_order_quantity(1), Decimal::ZERO);
        assert_eq!(po.sheet_order_quantity(9), Decimal::ZERO);
        assert_eq!(po.id, UNSAVED_ID);
    }

    #[test]
    fn test_shipping_methods() {
        assert_eq!(ShippingMethod::ALL.len(), 14);
        assert_eq!(
            serde_json::to_string(&ShippingMethod::HoldForPickup).unwrap(),
            "\"HOLD_FOR_PICKUP\""
        );
    }
}
