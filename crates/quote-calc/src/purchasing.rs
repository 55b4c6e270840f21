//! 採購單管理與套用

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use quote_core::{
    is_persisted, ComponentsInventory, InventoryStore, ItemKind, Order, PoLine, PriceableItem,
    PurchaseOrder, QuoteError, ShippingAddress, SheetsInventory, StockItem, Vendor,
};

use crate::QuoteWarning;

/// 套用採購單後建立的訂單
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedOrder {
    pub kind: ItemKind,
    pub item_id: i64,
    pub order_id: Uuid,
    pub quantity: Decimal,
}

/// 套用採購單結果
#[derive(Debug, Clone)]
pub struct ApplyOrdersReport {
    pub purchase_order_id: i64,
    pub created: Vec<CreatedOrder>,
    pub warnings: Vec<QuoteWarning>,
}

impl ApplyOrdersReport {
    fn new(purchase_order_id: i64) -> Self {
        Self {
            purchase_order_id,
            created: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

/// 訂單與其所屬項目
#[derive(Debug, Clone)]
pub struct LinkedOrder<'a> {
    pub kind: ItemKind,
    pub item_name: &'a str,
    pub order: &'a Order,
}

/// 採購單管理器
#[derive(Debug, Clone, Default)]
pub struct PurchaseOrderManager {
    pub purchase_orders: Vec<PurchaseOrder>,
    pub vendors: Vec<Vendor>,
    pub shipping_addresses: Vec<ShippingAddress>,
}

impl PurchaseOrderManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 以載入結果整批取代
    pub fn replace_all(
        &mut self,
        vendors: Vec<Vendor>,
        purchase_orders: Vec<PurchaseOrder>,
        shipping_addresses: Vec<ShippingAddress>,
    ) {
        self.vendors = vendors;
        self.purchase_orders = purchase_orders;
        self.shipping_addresses = shipping_addresses;
    }

    pub fn add_purchase_order(&mut self, purchase_order: PurchaseOrder) {
        self.purchase_orders.push(purchase_order);
    }

    pub fn remove_purchase_order(&mut self, id: i64) -> quote_core::Result<PurchaseOrder> {
        let index = self
            .purchase_orders
            .iter()
            .position(|po| po.id == id)
            .ok_or_else(|| QuoteError::ItemNotFound(format!("purchase order {}", id)))?;
        Ok(self.purchase_orders.remove(index))
    }

    pub fn get_purchase_order(&self, id: i64) -> Option<&PurchaseOrder> {
        self.purchase_orders.iter().find(|po| po.id == id)
    }

    pub fn get_purchase_order_mut(&mut self, id: i64) -> Option<&mut PurchaseOrder> {
        self.purchase_orders.iter_mut().find(|po| po.id == id)
    }

    pub fn get_vendor(&self, name: &str) -> Option<&Vendor> {
        self.vendors.iter().find(|vendor| vendor.name == name)
    }

    pub fn get_shipping_address(&self, name: &str) -> Option<&ShippingAddress> {
        self.shipping_addresses
            .iter()
            .find(|address| address.name == name)
    }

    /// 供應商目前最大的採購單號（沒有為 0）
    pub fn latest_purchase_order_number(&self, vendor_name: &str) -> i64 {
        self.purchase_orders
            .iter()
            .filter(|po| po.vendor_name() == vendor_name)
            .map(|po| po.purchase_order_number())
            .max()
            .unwrap_or(0)
    }

    /// 供應商下一個採購單號
    pub fn next_purchase_order_number(&self, vendor_name: &str) -> i64 {
        self.latest_purchase_order_number(vendor_name) + 1
    }

    /// 依供應商分組
    pub fn purchase_orders_by_vendor(&self) -> BTreeMap<&str, Vec<&PurchaseOrder>> {
        let mut grouped: BTreeMap<&str, Vec<&PurchaseOrder>> = BTreeMap::new();
        for po in &self.purchase_orders {
            grouped.entry(po.vendor_name()).or_default().push(po);
        }
        grouped
    }

    /// 供應商名稱包含文字的採購單（不分大小寫）
    pub fn find_by_vendor(&self, text: &str) -> Vec<&PurchaseOrder> {
        let text = text.to_lowercase();
        self.purchase_orders
            .iter()
            .filter(|po| po.vendor_name().to_lowercase().contains(&text))
            .collect()
    }

    /// 採購單 ID 索引
    pub fn index_by_id(&self) -> HashMap<i64, &PurchaseOrder> {
        self.purchase_orders.iter().map(|po| (po.id, po)).collect()
    }

    /// 由訂單反查採購單
    pub fn resolve<'a>(&'a self, order: &Order) -> Option<&'a PurchaseOrder> {
        order
            .purchase_order_id
            .and_then(|id| self.get_purchase_order(id))
    }

    /// 採購單 ID -> 連結到它的所有訂單
    pub fn link_orders<'a>(
        &self,
        components: &'a ComponentsInventory,
        sheets: &'a SheetsInventory,
    ) -> HashMap<i64, Vec<LinkedOrder<'a>>> {
        let index = self.index_by_id();
        let mut linked: HashMap<i64, Vec<LinkedOrder<'a>>> = HashMap::new();

        let component_orders = components.components.iter().flat_map(|component| {
            component.orders.iter().map(move |order| LinkedOrder {
                kind: ItemKind::Component,
                item_name: component.name(),
                order,
            })
        });
        let sheet_orders = sheets.sheets.iter().flat_map(|sheet| {
            sheet.orders.iter().map(move |order| LinkedOrder {
                kind: ItemKind::Sheet,
                item_name: sheet.name(),
                order,
            })
        });

        for entry in component_orders.chain(sheet_orders) {
            if let Some(id) = entry.order.purchase_order_id {
                if index.contains_key(&id) {
                    linked.entry(id).or_default().push(entry);
                }
            }
        }
        linked
    }

    /// 套用採購單：每個數量大於 0 的明細建立一張待到貨訂單，之後明細數量歸零
    ///
    /// 尚未儲存（ID ≤ 0）的採購單不會建立任何訂單，只回傳 Error 等級警告。
    /// 訂單不會帶著 `UNSAVED_ID` 作為採購單 ID，否則重新載入後無法連結。
    pub fn apply_orders(
        &mut self,
        purchase_order_id: i64,
        components: &mut ComponentsInventory,
        sheets: &mut SheetsInventory,
        expected_arrival_time: NaiveDate,
        today: NaiveDate,
    ) -> quote_core::Result<ApplyOrdersReport> {
        let po = self
            .get_purchase_order_mut(purchase_order_id)
            .ok_or_else(|| QuoteError::ItemNotFound(format!("purchase order {}", purchase_order_id)))?;
        let name = po.to_string();
        let mut report = ApplyOrdersReport::new(purchase_order_id);

        if !is_persisted(po.id) {
            report.warnings.push(QuoteWarning::error(
                name,
                "採購單尚未儲存，無法建立訂單".to_string(),
            ));
            return Ok(report);
        }

        let make_order = |line: &PoLine| {
            Order::new(line.order_quantity, expected_arrival_time, today)
                .with_notes("")
                .with_purchase_order_id(purchase_order_id)
        };

        for line in po.components.iter().filter(|line| line.order_quantity > Decimal::ZERO) {
            match components.get_by_id_mut(line.item_id) {
                Some(component) => {
                    let order = make_order(line);
                    report.created.push(CreatedOrder {
                        kind: ItemKind::Component,
                        item_id: line.item_id,
                        order_id: order.id,
                        quantity: order.quantity,
                    });
                    component.add_order(order);
                }
                None => report.warnings.push(QuoteWarning::warning(
                    name.clone(),
                    format!("找不到外購件 {}", line.item_id),
                )),
            }
        }

        for line in po.sheets.iter().filter(|line| line.order_quantity > Decimal::ZERO) {
            match sheets.get_by_id_mut(line.item_id) {
                Some(sheet) => {
                    let order = make_order(line);
                    report.created.push(CreatedOrder {
                        kind: ItemKind::Sheet,
                        item_id: line.item_id,
                        order_id: order.id,
                        quantity: order.quantity,
                    });
                    sheet.add_order(order);
                }
                None => report.warnings.push(QuoteWarning::warning(
                    name.clone(),
                    format!("找不到板材 {}", line.item_id),
                )),
            }
        }

        po.reset_order_quantities();

        if report.created.is_empty() {
            report.warnings.push(QuoteWarning::warning(
                name.clone(),
                "沒有訂購數量大於 0 的明細".to_string(),
            ));
        }
        tracing::info!("{} 已套用，建立訂單 {} 筆", name, report.created.len());

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::{Component, PurchaseOrderStatus, Sheet};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, day).unwrap()
    }

    fn inventories() -> (ComponentsInventory, SheetsInventory) {
        let components = ComponentsInventory::new()
            .with_component(Component::new("A", Decimal::from(10), Decimal::ONE).with_id(1))
            .with_component(Component::new("B", Decimal::from(3), Decimal::ONE).with_id(2));
        let sheets = SheetsInventory::new().with_sheet(
            Sheet::new("Mild Steel", "12 Gauge", Decimal::from(96), Decimal::from(48)).with_id(7),
        );
        (components, sheets)
    }

    fn manager() -> PurchaseOrderManager {
        let acme = Vendor::new("Acme Steel").with_id(1);
        let bolts = Vendor::new("Bolt Supply").with_id(2);

        let mut po = PurchaseOrder::new(acme.clone(), 4, date(1))
            .with_component(1, Decimal::from(5))
            .with_component(2, Decimal::ZERO);
        po.id = 42;

        let mut older = PurchaseOrder::new(acme.clone(), 3, date(1));
        older.id = 41;

        let mut quote = PurchaseOrder::new(bolts.clone(), 9, date(1))
            .with_status(PurchaseOrderStatus::Quote)
            .with_sheet(7, Decimal::from(2));
        quote.id = 43;

        let mut manager = PurchaseOrderManager::new();
        manager.replace_all(vec![acme, bolts], vec![po, older, quote], Vec::new());
        manager
    }

    #[test]
    fn test_apply_orders_skips_zero_lines() {
        let mut manager = manager();
        let (mut components, mut sheets) = inventories();

        let report = manager
            .apply_orders(42, &mut components, &mut sheets, date(20), date(14))
            .unwrap();

        assert_eq!(report.created.len(), 1);
        assert!(report.warnings.is_empty());

        let a = components.get_by_id(1).unwrap();
        assert_eq!(a.orders.len(), 1);
        assert_eq!(a.orders[0].purchase_order_id, Some(42));
        assert_eq!(a.orders[0].quantity, Decimal::from(5));
        assert_eq!(a.orders[0].order_pending_date, date(14));
        assert!(components.get_by_id(2).unwrap().orders.is_empty());

        // 明細數量歸零
        assert_eq!(
            manager.get_purchase_order(42).unwrap().component_order_quantity(1),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_reapply_is_no_op_with_warning() {
        let mut manager = manager();
        let (mut components, mut sheets) = inventories();

        manager
            .apply_orders(42, &mut components, &mut sheets, date(20), date(14))
            .unwrap();
        let report = manager
            .apply_orders(42, &mut components, &mut sheets, date(20), date(14))
            .unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(components.get_by_id(1).unwrap().orders.len(), 1);
    }

    #[test]
    fn test_apply_sheet_orders() {
        let mut manager = manager();
        let (mut components, mut sheets) = inventories();

        let report = manager
            .apply_orders(43, &mut components, &mut sheets, date(20), date(14))
            .unwrap();

        assert_eq!(report.created[0].kind, ItemKind::Sheet);
        assert_eq!(sheets.get_by_id(7).unwrap().orders[0].purchase_order_id, Some(43));
    }

    #[test]
    fn test_unsaved_purchase_order_is_not_applied() {
        let mut manager = PurchaseOrderManager::new();
        manager.add_purchase_order(
            PurchaseOrder::new(Vendor::new("Acme Steel"), 1, date(1)).with_component(1, Decimal::ONE),
        );
        let (mut components, mut sheets) = inventories();

        let report = manager
            .apply_orders(-1, &mut components, &mut sheets, date(20), date(14))
            .unwrap();

        assert!(report.created.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(components.get_by_id(1).unwrap().orders.is_empty());
    }

    #[test]
    fn test_unknown_purchase_order() {
        let mut manager = manager();
        let (mut components, mut sheets) = inventories();

        let result = manager.apply_orders(99, &mut components, &mut sheets, date(20), date(14));
        assert!(matches!(result, Err(QuoteError::ItemNotFound(_))));
    }

    #[test]
    fn test_purchase_order_numbers() {
        let manager = manager();

        assert_eq!(manager.latest_purchase_order_number("Acme Steel"), 4);
        assert_eq!(manager.next_purchase_order_number("Acme Steel"), 5);
        assert_eq!(manager.next_purchase_order_number("New Vendor"), 1);
    }

    #[test]
    fn test_grouping_and_search() {
        let manager = manager();

        let grouped = manager.purchase_orders_by_vendor();
        assert_eq!(grouped["Acme Steel"].len(), 2);
        assert_eq!(grouped["Bolt Supply"].len(), 1);

        assert_eq!(manager.find_by_vendor("acme").len(), 2);
        assert_eq!(manager.find_by_vendor("SUPPLY").len(), 1);
        assert!(manager.find_by_vendor("nobody").is_empty());
    }

    #[test]
    fn test_resolve_and_link_orders() {
        let mut manager = manager();
        let (mut components, mut sheets) = inventories();
        manager
            .apply_orders(42, &mut components, &mut sheets, date(20), date(14))
            .unwrap();

        let order = components.get_by_id(1).unwrap().orders[0].clone();
        assert_eq!(manager.resolve(&order).unwrap().to_string(), "PO #4");

        let linked = manager.link_orders(&components, &sheets);
        assert_eq!(linked[&42].len(), 1);
        assert_eq!(linked[&42][0].item_name, "A");
        assert!(!linked.contains_key(&43));
    }
}
