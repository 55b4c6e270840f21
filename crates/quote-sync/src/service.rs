//! 遠端儲存服務介面與逾時包裝

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{SyncError, SyncResult};

/// 每個請求的固定逾時
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// 同步的資料快照
pub type Record = Map<String, Value>;

/// 可同步的實體種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Component,
    Sheet,
    PurchaseOrder,
    Vendor,
    ShippingAddress,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Component => "component",
            EntityKind::Sheet => "sheet",
            EntityKind::PurchaseOrder => "purchase order",
            EntityKind::Vendor => "vendor",
            EntityKind::ShippingAddress => "shipping address",
        };
        f.write_str(name)
    }
}

/// 遠端儲存服務
///
/// `id <= 0` 表示尚未儲存，`save` 會配發新的正整數 ID 並回傳。
#[async_trait]
pub trait SyncService: Send + Sync {
    async fn save(&self, kind: EntityKind, id: i64, record: Record) -> SyncResult<i64>;

    async fn load_all(&self, kind: EntityKind) -> SyncResult<Vec<(i64, Record)>>;

    async fn delete(&self, kind: EntityKind, id: i64) -> SyncResult<()>;
}

/// 以固定時限執行請求，逾時回傳 `SyncError::Timeout`
pub async fn with_timeout<T, F>(limit: Duration, operation: &str, future: F) -> SyncResult<T>
where
    F: Future<Output = SyncResult<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!("{} 逾時（{:?}）", operation, limit);
            Err(SyncError::Timeout {
                operation: operation.to_string(),
                seconds: limit.as_secs(),
            })
        }
    }
}

/// 為每個請求加上逾時的服務包裝
pub struct TimeoutService<S> {
    inner: S,
    limit: Duration,
}

impl<S: SyncService> TimeoutService<S> {
    pub fn new(inner: S) -> Self {
        Self::with_limit(inner, REQUEST_TIMEOUT)
    }

    pub fn with_limit(inner: S, limit: Duration) -> Self {
        Self { inner, limit }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: SyncService> SyncService for TimeoutService<S> {
    async fn save(&self, kind: EntityKind, id: i64, record: Record) -> SyncResult<i64> {
        let operation = format!("save {} #{}", kind, id);
        with_timeout(self.limit, &operation, self.inner.save(kind, id, record)).await
    }

    async fn load_all(&self, kind: EntityKind) -> SyncResult<Vec<(i64, Record)>> {
        let operation = format!("load {}", kind);
        with_timeout(self.limit, &operation, self.inner.load_all(kind)).await
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> SyncResult<()> {
        let operation = format!("delete {} #{}", kind, id);
        with_timeout(self.limit, &operation, self.inner.delete(kind, id)).await
    }
}

/// 序列化為快照
pub fn to_record<T: Serialize>(value: &T) -> SyncResult<Record> {
    match serde_json::to_value(value)? {
        Value::Object(record) => Ok(record),
        other => Err(SyncError::Decode(format!("預期 JSON 物件，得到 {}", other))),
    }
}

/// 由快照還原，以儲存端的 ID 為準
pub fn from_record<T: DeserializeOwned>(id: i64, mut record: Record) -> SyncResult<T> {
    record.insert("id".to_string(), Value::from(id));
    Ok(serde_json::from_value(Value::Object(record))?)
}

#[derive(Default)]
struct MemoryState {
    next_id: i64,
    records: BTreeMap<(EntityKind, i64), Record>,
    failing: HashSet<EntityKind>,
}

/// 記憶體內的儲存服務（測試與示範用）
#[derive(Default)]
pub struct InMemorySyncService {
    state: Mutex<MemoryState>,
    latency: Option<Duration>,
}

impl InMemorySyncService {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每個請求延遲回應
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// 讓某種實體的請求回傳連線錯誤
    pub async fn set_failing(&self, kind: EntityKind, failing: bool) {
        let mut state = self.state.lock().await;
        if failing {
            state.failing.insert(kind);
        } else {
            state.failing.remove(&kind);
        }
    }

    pub async fn record(&self, kind: EntityKind, id: i64) -> Option<Record> {
        self.state.lock().await.records.get(&(kind, id)).cloned()
    }

    pub async fn count(&self, kind: EntityKind) -> usize {
        self.state
            .lock()
            .await
            .records
            .keys()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    async fn simulate_latency(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn check_available(state: &MemoryState, kind: EntityKind) -> SyncResult<()> {
    if state.failing.contains(&kind) {
        return Err(SyncError::Connection(format!("{} 服務無法連線", kind)));
    }
    Ok(())
}

#[async_trait]
impl SyncService for InMemorySyncService {
    async fn save(&self, kind: EntityKind, id: i64, mut record: Record) -> SyncResult<i64> {
        self.simulate_latency().await;
        let mut state = self.state.lock().await;
        check_available(&state, kind)?;

        let id = if id > 0 {
            state.next_id = state.next_id.max(id);
            id
        } else {
            state.next_id += 1;
            state.next_id
        };
        record.insert("id".to_string(), Value::from(id));
        state.records.insert((kind, id), record);
        debug!("已儲存 {} #{}", kind, id);
        Ok(id)
    }

    async fn load_all(&self, kind: EntityKind) -> SyncResult<Vec<(i64, Record)>> {
        self.simulate_latency().await;
        let state = self.state.lock().await;
        check_available(&state, kind)?;

        Ok(state
            .records
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|((_, id), record)| (*id, record.clone()))
            .collect())
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> SyncResult<()> {
        self.simulate_latency().await;
        let mut state = self.state.lock().await;
        check_available(&state, kind)?;

        state
            .records
            .remove(&(kind, id))
            .map(|_| ())
            .ok_or(SyncError::NotFound { kind, id })
    }
}
