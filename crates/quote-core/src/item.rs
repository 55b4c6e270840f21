//! 可計價項目

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 項目種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKind {
    /// 外購件
    Component,
    /// 板材
    Sheet,
    /// 雷射切割零件
    LaserCutPart,
}

/// 可計價項目（外購件、板材、雷射切割零件共用）
pub trait PriceableItem {
    /// 持久化 ID（-1 代表尚未儲存）
    fn id(&self) -> i64;

    /// 顯示名稱
    fn name(&self) -> &str;

    /// 庫存 / 報價數量
    fn quantity(&self) -> Decimal;

    /// 計算後單價
    fn unit_price(&self) -> Decimal;

    fn kind(&self) -> ItemKind;

    /// 總金額（單價 × 數量），庫存成本報表中負值視為 0
    fn total_cost_in_stock(&self) -> Decimal {
        (self.unit_price() * self.quantity()).max(Decimal::ZERO)
    }
}
