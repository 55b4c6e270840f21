//! # Quote Sync
//!
//! 與遠端儲存之間的非同步邊界：
//!
//! ```text
//! PurchaseOrderSync ──► StepChain ──► TimeoutService (10 s) ──► SyncService
//!        │                                                     (InMemorySyncService)
//!        ├── EntitySequencer（同一實體的寫入排隊）
//!        └── DirtyTracker（未儲存變更）
//! ```

pub mod chain;
pub mod dirty_tracking;
pub mod error;
pub mod purchase_orders;
pub mod sequencer;
pub mod service;

// Re-export 主要類型
pub use chain::StepChain;
pub use dirty_tracking::DirtyTracker;
pub use error::{SyncError, SyncResult};
pub use purchase_orders::{LoadReport, PurchaseOrderSync};
pub use sequencer::{EntitySequencer, SequenceGuard};
pub use service::{
    from_record, to_record, with_timeout, EntityKind, InMemorySyncService, Record, SyncService,
    TimeoutService, REQUEST_TIMEOUT,
};
