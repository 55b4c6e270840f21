//! # ShopQuote
//!
//! 鈑金加工報價與採購訂單核心
//!
//! - [`quote_core`]：資料模型（報價、排版、零件、外購件、板材、訂單、採購單）
//! - [`quote_calc`]：成本加成、排版成本、價格對齊、庫存彙總、訂單帳本
//! - [`quote_sync`]：與遠端儲存之間的非同步邊界

pub use quote_calc;
pub use quote_core;
pub use quote_sync;

/// 常用類型
pub mod prelude {
    pub use quote_calc::{
        markup, InventoryAggregates, OrderAction, OrderLedger, PriceReconciler, PricingResult,
        PurchaseOrderManager, QuotePriceCalculator, QuoteWarning, WarningSeverity,
    };
    pub use quote_core::{
        Component, ComponentsInventory, InventoryStore, LaserCutPart, Nest, Order, PaintInventory,
        PriceableItem, PurchaseOrder, Quote, QuoteSettings, Sheet, SheetSettings, SheetsInventory,
        StockItem, Vendor,
    };
    pub use quote_sync::{InMemorySyncService, PurchaseOrderSync, SyncError, SyncService};
}
