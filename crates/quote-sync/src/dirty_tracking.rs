//! 未儲存變更追蹤

use std::collections::BTreeSet;

use crate::service::EntityKind;

/// 未儲存變更追蹤器
pub struct DirtyTracker {
    dirty_entities: BTreeSet<(EntityKind, i64)>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self {
            dirty_entities: BTreeSet::new(),
        }
    }

    /// 標記實體有未儲存變更
    pub fn mark_dirty(&mut self, kind: EntityKind, id: i64) {
        self.dirty_entities.insert((kind, id));
    }

    /// 儲存完成後清除標記
    pub fn mark_clean(&mut self, kind: EntityKind, id: i64) -> bool {
        self.dirty_entities.remove(&(kind, id))
    }

    pub fn is_dirty(&self, kind: EntityKind, id: i64) -> bool {
        self.dirty_entities.contains(&(kind, id))
    }

    /// 清除所有標記
    pub fn clear(&mut self) {
        self.dirty_entities.clear();
    }

    /// 所有有未儲存變更的實體（依種類、ID 排序）
    pub fn dirty_entities(&self) -> Vec<(EntityKind, i64)> {
        self.dirty_entities.iter().copied().collect()
    }

    /// 某種實體中有未儲存變更的 ID
    pub fn dirty_of_kind(&self, kind: EntityKind) -> Vec<i64> {
        self.dirty_entities
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, id)| *id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.dirty_entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirty_entities.is_empty()
    }
}

impl Default for DirtyTracker {
    fn default() -> Self {
        Self::new()
    }
}
