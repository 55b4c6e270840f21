//! # Quote Calculation Engine
//!
//! 報價成本計算、價格對齊、庫存彙總、訂單與採購單處理

pub mod aggregates;
pub mod ledger;
pub mod markup;
pub mod nest_cost;
pub mod pricing;
pub mod purchasing;
pub mod reconcile;

// Re-export 主要類型
pub use aggregates::InventoryAggregates;
pub use ledger::{OrderAction, OrderLedger, OrderTransition};
pub use markup::{markup, saturating_line_total, saturating_total, CostContributors};
pub use nest_cost::{NestCost, NestCostCalculator};
pub use pricing::QuotePriceCalculator;
pub use purchasing::{ApplyOrdersReport, PurchaseOrderManager};
pub use reconcile::{PriceReconciler, ReconcileOutcome};

use rust_decimal::Decimal;

/// 報價計算結果
#[derive(Debug, Clone)]
pub struct PricingResult {
    /// 雷射切割零件報價合計
    pub laser_cut_parts_total: Decimal,

    /// 外購件報價合計
    pub components_total: Decimal,

    /// 加成後的板材成本合計
    pub sheet_total: Decimal,

    /// 各排版成本明細
    pub nest_costs: Vec<NestCost>,

    /// 價格對齊結果（未啟用時為 None）
    pub reconciliation: Option<ReconcileOutcome>,

    /// 反向對齊選出的板材利潤率（未啟用時為 None）
    pub matched_sheet_profit_margin: Option<u32>,

    /// 警告信息
    pub warnings: Vec<QuoteWarning>,

    /// 計算耗時（毫秒）
    pub calculation_time_ms: Option<u128>,
}

impl PricingResult {
    /// 創建空的計算結果
    pub fn empty() -> Self {
        Self {
            laser_cut_parts_total: Decimal::ZERO,
            components_total: Decimal::ZERO,
            sheet_total: Decimal::ZERO,
            nest_costs: Vec::new(),
            reconciliation: None,
            matched_sheet_profit_margin: None,
            warnings: Vec::new(),
            calculation_time_ms: None,
        }
    }

    /// 零件與外購件報價合計（溢位時飽和）
    pub fn item_total(&self) -> Decimal {
        self.laser_cut_parts_total
            .checked_add(self.components_total)
            .unwrap_or(Decimal::MAX)
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: QuoteWarning) {
        self.warnings.push(warning);
    }
}

/// 計算警告（不中斷處理）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteWarning {
    /// 相關項目（零件名稱、料號、採購單名稱）
    pub subject: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl QuoteWarning {
    pub fn new(subject: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            subject,
            message,
            severity,
        }
    }

    pub fn info(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Info)
    }

    pub fn warning(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Warning)
    }

    pub fn error(subject: String, message: String) -> Self {
        Self::new(subject, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
