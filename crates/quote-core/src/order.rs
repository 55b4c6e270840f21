//! 待到貨訂單模型

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::item::PriceableItem;

/// 未填寫備註時的預設文字
pub const DEFAULT_ORDER_NOTES: &str = "No notes provided";

/// 訂單狀態
///
/// 完成與取消的訂單會從所屬項目中移除，因此不會出現在已存在的訂單上。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// 剛建立，尚未到貨
    Pending,
    /// 已部分到貨
    PartiallyFulfilled,
}

/// 待到貨訂單
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// 訂單ID（在所屬項目內唯一）
    pub id: Uuid,

    /// 所屬採購單ID（僅為反向參照，不擁有採購單）
    pub purchase_order_id: Option<i64>,

    /// 預計到貨日
    pub expected_arrival_time: NaiveDate,

    /// 尚未到貨數量
    pub quantity: Decimal,

    /// 下單日期
    pub order_pending_date: NaiveDate,

    /// 備註
    pub notes: String,

    /// 已到貨數量
    #[serde(default)]
    pub received_quantity: Decimal,
}

impl Order {
    /// 創建新的待到貨訂單
    pub fn new(
        quantity: Decimal,
        expected_arrival_time: NaiveDate,
        order_pending_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            purchase_order_id: None,
            expected_arrival_time,
            quantity,
            order_pending_date,
            notes: DEFAULT_ORDER_NOTES.to_string(),
            received_quantity: Decimal::ZERO,
        }
    }

    /// 建構器模式：設置備註（空白時使用預設文字）
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.set_notes(notes);
        self
    }

    /// 建構器模式：連結採購單
    pub fn with_purchase_order_id(mut self, purchase_order_id: i64) -> Self {
        self.purchase_order_id = Some(purchase_order_id);
        self
    }

    /// 設置備註
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        let notes = notes.into();
        self.notes = if notes.trim().is_empty() {
            DEFAULT_ORDER_NOTES.to_string()
        } else {
            notes
        };
    }

    /// 目前狀態
    pub fn status(&self) -> OrderStatus {
        if self.received_quantity > Decimal::ZERO {
            OrderStatus::PartiallyFulfilled
        } else {
            OrderStatus::Pending
        }
    }

    /// 是否來自採購單
    pub fn is_from_purchase_order(&self) -> bool {
        self.purchase_order_id.is_some()
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Order is pending since: {}\nQuantity ordered: {}\nExpected to arrive at: {}\nNotes:\n{}",
            self.order_pending_date, self.quantity, self.expected_arrival_time, self.notes
        )
    }
}

/// 可下單的庫存項目（外購件與板材）
///
/// 每張訂單同一時間只屬於一個項目。
pub trait StockItem: PriceableItem {
    fn orders(&self) -> &[Order];

    fn orders_mut(&mut self) -> &mut Vec<Order>;

    /// 設置庫存數量
    fn set_quantity(&mut self, quantity: Decimal);

    /// 最後一次數量異動紀錄
    fn latest_change_quantity(&self) -> &str;

    fn set_latest_change_quantity(&mut self, change: String);

    /// 庫存增加後的鉤子（板材用於重置低庫存警告）
    fn on_stock_increased(&mut self) {}

    /// 添加訂單
    fn add_order(&mut self, order: Order) {
        self.orders_mut().push(order);
    }

    /// 移除訂單
    fn remove_order(&mut self, order_id: Uuid) -> Option<Order> {
        let orders = self.orders_mut();
        let index = orders.iter().position(|order| order.id == order_id)?;
        Some(orders.remove(index))
    }

    /// 查找訂單
    fn find_order(&self, order_id: Uuid) -> Option<&Order> {
        self.orders().iter().find(|order| order.id == order_id)
    }

    fn find_order_mut(&mut self, order_id: Uuid) -> Option<&mut Order> {
        self.orders_mut().iter_mut().find(|order| order.id == order_id)
    }

    /// 所有待到貨數量合計
    fn pending_quantity(&self) -> Decimal {
        self.orders().iter().map(|order| order.quantity).sum()
    }
}
