//! 訂單帳本：待到貨訂單的建立、更新、取消與到貨入庫

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use uuid::Uuid;

use quote_core::{Order, QuoteError, StockItem};

use crate::QuoteWarning;

/// 對訂單的操作
#[derive(Debug, Clone, PartialEq)]
pub enum OrderAction {
    /// 修改備註、數量（與預計到貨日），不影響庫存
    Update {
        notes: String,
        quantity: Decimal,
        expected_arrival_time: Option<NaiveDate>,
    },
    /// 取消訂單，不影響庫存
    Cancel,
    /// 到貨入庫（可部分到貨，也允許超量）
    AddIncomingQuantity { quantity: Decimal },
}

/// 操作後的訂單狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    Updated,
    Cancelled,
    PartiallyFulfilled,
    Fulfilled,
}

/// 訂單操作結果
#[derive(Debug, Clone)]
pub struct OrderTransition {
    pub order_id: Uuid,
    pub kind: TransitionKind,
    /// 操作前庫存
    pub stock_before: Decimal,
    /// 操作後庫存
    pub stock_after: Decimal,
    /// 訂單剩餘數量（已移除的訂單為最後的剩餘值，可能為負）
    pub remaining: Decimal,
    /// 移除的訂單（取消或完成）
    pub removed_order: Option<Order>,
    pub warnings: Vec<QuoteWarning>,
}

/// 訂單帳本
pub struct OrderLedger {
    /// 操作者（寫入異動紀錄）
    actor: String,
}

impl OrderLedger {
    pub fn new(actor: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
        }
    }

    /// 手動建立待到貨訂單（不連結採購單）
    pub fn create_order<I: StockItem>(
        item: &mut I,
        quantity: Decimal,
        expected_arrival_time: NaiveDate,
        order_pending_date: NaiveDate,
        notes: &str,
    ) -> Uuid {
        let order = Order::new(quantity, expected_arrival_time, order_pending_date).with_notes(notes);
        let order_id = order.id;
        tracing::info!("{} 新增待到貨訂單，數量 {}", item.name(), quantity);
        item.add_order(order);
        order_id
    }

    /// 對項目上的訂單執行操作
    pub fn apply<I: StockItem>(
        &self,
        item: &mut I,
        order_id: Uuid,
        action: OrderAction,
        at: NaiveDateTime,
    ) -> quote_core::Result<OrderTransition> {
        let stock_before = item.quantity();
        let order = item
            .find_order_mut(order_id)
            .ok_or(QuoteError::OrderNotFound(order_id))?;

        match action {
            OrderAction::Update {
                notes,
                quantity,
                expected_arrival_time,
            } => {
                order.set_notes(notes);
                order.quantity = quantity;
                if let Some(date) = expected_arrival_time {
                    order.expected_arrival_time = date;
                }
                tracing::debug!("{} 訂單已更新，數量 {}", item.name(), quantity);

                Ok(OrderTransition {
                    order_id,
                    kind: TransitionKind::Updated,
                    stock_before,
                    stock_after: stock_before,
                    remaining: quantity,
                    removed_order: None,
                    warnings: Vec::new(),
                })
            }
            OrderAction::Cancel => {
                let removed = item.remove_order(order_id);
                let remaining = removed.as_ref().map(|order| order.quantity).unwrap_or_default();
                tracing::info!("{} 訂單已取消", item.name());

                Ok(OrderTransition {
                    order_id,
                    kind: TransitionKind::Cancelled,
                    stock_before,
                    stock_after: stock_before,
                    remaining,
                    removed_order: removed,
                    warnings: Vec::new(),
                })
            }
            OrderAction::AddIncomingQuantity { quantity } => {
                let ordered = order.quantity;
                let remaining = ordered - quantity;
                let mut warnings = Vec::new();
                if quantity > ordered {
                    warnings.push(QuoteWarning::warning(
                        item.name().to_string(),
                        format!("到貨數量 {} 超過待到貨數量 {}", quantity, ordered),
                    ));
                }

                let removed_order = if remaining <= Decimal::ZERO {
                    item.remove_order(order_id)
                } else {
                    if let Some(order) = item.find_order_mut(order_id) {
                        order.quantity = remaining;
                        order.received_quantity += quantity;
                    }
                    None
                };

                let stock_after = stock_before + quantity;
                item.set_quantity(stock_after);
                item.set_latest_change_quantity(self.audit_entry(stock_before, stock_after, at));
                if quantity > Decimal::ZERO {
                    item.on_stock_increased();
                }

                let kind = if removed_order.is_some() {
                    TransitionKind::Fulfilled
                } else {
                    TransitionKind::PartiallyFulfilled
                };
                tracing::info!(
                    "{} 到貨 {}，庫存 {} -> {}，訂單剩餘 {}",
                    item.name(),
                    quantity,
                    stock_before,
                    stock_after,
                    remaining
                );

                Ok(OrderTransition {
                    order_id,
                    kind,
                    stock_before,
                    stock_after,
                    remaining,
                    removed_order,
                    warnings,
                })
            }
        }
    }

    /// 以目前時間執行操作
    pub fn apply_now<I: StockItem>(
        &self,
        item: &mut I,
        order_id: Uuid,
        action: OrderAction,
    ) -> quote_core::Result<OrderTransition> {
        self.apply(item, order_id, action, chrono::Local::now().naive_local())
    }

    fn audit_entry(&self, old: Decimal, new: Decimal, at: NaiveDateTime) -> String {
        format!(
            "{} - Used: Order pending - add quantity\nChanged from {} to {} at {}",
            self.actor,
            old,
            new,
            at.format("%B %d %A %Y %I:%M:%S %p")
        )
    }
}
