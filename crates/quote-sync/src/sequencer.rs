//! 同一實體的寫入排序
//!
//! 每個 `(種類, ID)` 一把非同步鎖與一個遞增版本號。尚未儲存的實體（ID <= 0）共用同一組，
//! 因此彼此之間也會排隊。

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use quote_core::UNSAVED_ID;

use crate::service::EntityKind;

#[derive(Clone, Default)]
struct Slot {
    lock: Arc<AsyncMutex<()>>,
    version: Arc<AtomicU64>,
}

/// 持有期間同一實體的其他寫入會等待
pub struct SequenceGuard {
    _guard: OwnedMutexGuard<()>,
    version: u64,
}

impl SequenceGuard {
    /// 這次寫入的版本號
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// 實體寫入排序器
#[derive(Default)]
pub struct EntitySequencer {
    slots: Mutex<HashMap<(EntityKind, i64), Slot>>,
}

impl EntitySequencer {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, kind: EntityKind, id: i64) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let key = if id > 0 { id } else { UNSAVED_ID };
        slots.entry((kind, key)).or_default().clone()
    }

    /// 取得寫入權並配發下一個版本號
    pub async fn acquire(&self, kind: EntityKind, id: i64) -> SequenceGuard {
        let slot = self.slot(kind, id);
        let guard = slot.lock.lock_owned().await;
        let version = slot.version.fetch_add(1, Ordering::SeqCst) + 1;
        SequenceGuard {
            _guard: guard,
            version,
        }
    }

    /// 目前已配發的最大版本號（未寫入過為 0）
    pub fn version(&self, kind: EntityKind, id: i64) -> u64 {
        self.slot(kind, id).version.load(Ordering::SeqCst)
    }
}
