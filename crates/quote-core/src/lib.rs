//! # Quote Core
//!
//! 核心資料模型與類型定義（報價、庫存項目、訂單、採購單）

pub mod component;
pub mod inventory;
pub mod item;
pub mod laser_cut_part;
pub mod nest;
pub mod order;
pub mod paint;
pub mod parse;
pub mod purchase_order;
pub mod quote;
pub mod settings;
pub mod sheet;
pub mod sheet_settings;

// Re-export 主要類型
pub use component::Component;
pub use inventory::{ComponentsInventory, InventoryStore, SheetsInventory};
pub use item::{ItemKind, PriceableItem};
pub use laser_cut_part::{CoatingSettings, LaserCutPart};
pub use nest::{Nest, CUSTOM_NEST_NAME};
pub use order::{Order, OrderStatus, StockItem, DEFAULT_ORDER_NOTES};
pub use paint::{Paint, PaintInventory, PaintInventoryProvider, Powder, Primer};
pub use parse::parse_decimal;
pub use purchase_order::{
    MetaData, PoLine, PurchaseOrder, PurchaseOrderStatus, ShippingAddress, ShippingMethod,
    Vendor,
};
pub use quote::Quote;
pub use settings::QuoteSettings;
pub use sheet::Sheet;
pub use sheet_settings::{SheetSettings, SheetSettingsProvider};

/// 尚未持久化的實體 ID
pub const UNSAVED_ID: i64 = -1;

/// 報價核心錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum QuoteError {
    #[error("無效的數值輸入: '{0}'")]
    InvalidNumber(String),

    #[error("找不到項目: {0}")]
    ItemNotFound(String),

    #[error("找不到訂單: {0}")]
    OrderNotFound(uuid::Uuid),

    #[error("項目已存在: {0}")]
    DuplicateItem(String),

    #[error("無效的報價設定: {0}")]
    InvalidSettings(String),

    #[error("序列化錯誤: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuoteError>;

/// 判斷 ID 是否已持久化（ID <= 0 視為尚未儲存）
pub fn is_persisted(id: i64) -> bool {
    id > 0
}
