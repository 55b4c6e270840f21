//! 採購單同步：儲存鏈與載入鏈

use serde::de::DeserializeOwned;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info, warn};

use quote_calc::PurchaseOrderManager;
use quote_core::{
    ComponentsInventory, InventoryStore, PoLine, PurchaseOrder, ShippingAddress, SheetsInventory,
    Vendor,
};

use crate::chain::StepChain;
use crate::dirty_tracking::DirtyTracker;
use crate::error::{SyncError, SyncResult};
use crate::sequencer::EntitySequencer;
use crate::service::{from_record, to_record, EntityKind, Record, SyncService, TimeoutService};

/// 載入結果統計
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    pub vendors: usize,
    pub purchase_orders: usize,
    pub shipping_addresses: usize,
    /// 連結到採購單的待到貨訂單數
    pub linked_orders: usize,
}

/// 採購單同步器
pub struct PurchaseOrderSync<S> {
    service: TimeoutService<S>,
    sequencer: EntitySequencer,
    dirty: Mutex<DirtyTracker>,
}

impl<S: SyncService> PurchaseOrderSync<S> {
    pub fn new(service: S) -> Self {
        Self::from_service(TimeoutService::new(service))
    }

    /// 自訂請求時限
    pub fn with_timeout(service: S, limit: Duration) -> Self {
        Self::from_service(TimeoutService::with_limit(service, limit))
    }

    fn from_service(service: TimeoutService<S>) -> Self {
        Self {
            service,
            sequencer: EntitySequencer::new(),
            dirty: Mutex::new(DirtyTracker::new()),
        }
    }

    pub fn service(&self) -> &S {
        self.service.inner()
    }

    /// 目前已完成的儲存版本
    pub fn version(&self, kind: EntityKind, id: i64) -> u64 {
        self.sequencer.version(kind, id)
    }

    pub fn mark_dirty(&self, kind: EntityKind, id: i64) {
        self.tracker().mark_dirty(kind, id);
    }

    pub fn dirty_entities(&self) -> Vec<(EntityKind, i64)> {
        self.tracker().dirty_entities()
    }

    fn tracker(&self) -> std::sync::MutexGuard<'_, DirtyTracker> {
        self.dirty.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 儲存採購單：採購單 → 外購件 → 板材
    ///
    /// 尚未儲存的採購單在第一步取得 ID。之後的步驟失敗時 ID 仍會寫回。
    pub async fn save_purchase_order(
        &self,
        purchase_order: &mut PurchaseOrder,
        components: &ComponentsInventory,
        sheets: &SheetsInventory,
    ) -> SyncResult<i64> {
        let guard = self
            .sequencer
            .acquire(EntityKind::PurchaseOrder, purchase_order.id)
            .await;
        debug!("{} 儲存版本 {}", purchase_order, guard.version());

        let original_id = purchase_order.id;
        let po_record = to_record(&*purchase_order)?;
        let component_records = line_records(&purchase_order.components, components)?;
        let sheet_records = line_records(&purchase_order.sheets, sheets)?;
        let component_ids: Vec<i64> = component_records.iter().map(|(id, _)| *id).collect();
        let sheet_ids: Vec<i64> = sheet_records.iter().map(|(id, _)| *id).collect();

        let mut assigned_id = original_id;
        let result = {
            let service = &self.service;
            let assigned = &mut assigned_id;

            StepChain::new(format!("save {}", purchase_order))
                .then("save purchase order", move || async move {
                    *assigned = service
                        .save(EntityKind::PurchaseOrder, original_id, po_record)
                        .await?;
                    Ok(())
                })
                .then("update components", move || async move {
                    save_all(service, EntityKind::Component, component_records).await
                })
                .then("update sheets", move || async move {
                    save_all(service, EntityKind::Sheet, sheet_records).await
                })
                .run()
                .await
        };

        purchase_order.id = assigned_id;
        result?;

        let mut tracker = self.tracker();
        tracker.mark_clean(EntityKind::PurchaseOrder, original_id);
        tracker.mark_clean(EntityKind::PurchaseOrder, assigned_id);
        for id in component_ids {
            tracker.mark_clean(EntityKind::Component, id);
        }
        for id in sheet_ids {
            tracker.mark_clean(EntityKind::Sheet, id);
        }

        info!("{} 已儲存（ID {}）", purchase_order, assigned_id);
        Ok(assigned_id)
    }

    /// 載入：供應商 → 採購單 → 送貨地址，整批取代管理器內容後連結訂單
    pub async fn load(
        &self,
        manager: &mut PurchaseOrderManager,
        components: &ComponentsInventory,
        sheets: &SheetsInventory,
    ) -> SyncResult<LoadReport> {
        let mut vendors: Vec<Vendor> = Vec::new();
        let mut purchase_orders: Vec<PurchaseOrder> = Vec::new();
        let mut shipping_addresses: Vec<ShippingAddress> = Vec::new();

        {
            let service = &self.service;
            let (vendors, purchase_orders, shipping_addresses) =
                (&mut vendors, &mut purchase_orders, &mut shipping_addresses);

            StepChain::new("load purchase orders")
                .then("load vendors", move || async move {
                    *vendors = load_kind(service, EntityKind::Vendor).await?;
                    Ok(())
                })
                .then("load purchase orders", move || async move {
                    *purchase_orders = load_kind(service, EntityKind::PurchaseOrder).await?;
                    Ok(())
                })
                .then("load shipping addresses", move || async move {
                    *shipping_addresses = load_kind(service, EntityKind::ShippingAddress).await?;
                    Ok(())
                })
                .run()
                .await?;
        }

        let mut report = LoadReport {
            vendors: vendors.len(),
            purchase_orders: purchase_orders.len(),
            shipping_addresses: shipping_addresses.len(),
            linked_orders: 0,
        };
        manager.replace_all(vendors, purchase_orders, shipping_addresses);
        report.linked_orders = manager
            .link_orders(components, sheets)
            .values()
            .map(Vec::len)
            .sum();

        info!(
            "載入 {} 個供應商、{} 張採購單、{} 個送貨地址，連結 {} 張訂單",
            report.vendors, report.purchase_orders, report.shipping_addresses, report.linked_orders
        );
        Ok(report)
    }

    pub async fn save_vendor(&self, vendor: &mut Vendor) -> SyncResult<i64> {
        let _guard = self.sequencer.acquire(EntityKind::Vendor, vendor.id).await;
        vendor.id = self
            .service
            .save(EntityKind::Vendor, vendor.id, to_record(&*vendor)?)
            .await?;
        Ok(vendor.id)
    }

    pub async fn save_shipping_address(&self, address: &mut ShippingAddress) -> SyncResult<i64> {
        let _guard = self
            .sequencer
            .acquire(EntityKind::ShippingAddress, address.id)
            .await;
        address.id = self
            .service
            .save(EntityKind::ShippingAddress, address.id, to_record(&*address)?)
            .await?;
        Ok(address.id)
    }

    /// 刪除採購單（遠端成功後才移除本地資料）
    pub async fn delete_purchase_order(
        &self,
        manager: &mut PurchaseOrderManager,
        id: i64,
    ) -> SyncResult<PurchaseOrder> {
        let not_found = || SyncError::NotFound {
            kind: EntityKind::PurchaseOrder,
            id,
        };
        if manager.get_purchase_order(id).is_none() {
            return Err(not_found());
        }

        let _guard = self.sequencer.acquire(EntityKind::PurchaseOrder, id).await;
        self.service.delete(EntityKind::PurchaseOrder, id).await?;
        manager.remove_purchase_order(id).map_err(|_| not_found())
    }
}

/// 採購明細對應項目的快照（找不到的項目略過）
fn line_records<T>(lines: &[PoLine], inventory: &T) -> SyncResult<Vec<(i64, Record)>>
where
    T: InventoryStore,
    T::Item: serde::Serialize,
{
    let mut records = Vec::with_capacity(lines.len());
    for line in lines {
        match inventory.get_by_id(line.item_id) {
            Some(item) => records.push((line.item_id, to_record(item)?)),
            None => warn!("採購明細的項目 #{} 不在庫存中", line.item_id),
        }
    }
    Ok(records)
}

async fn save_all<S: SyncService>(
    service: &S,
    kind: EntityKind,
    records: Vec<(i64, Record)>,
) -> SyncResult<()> {
    for (id, record) in records {
        service.save(kind, id, record).await?;
    }
    Ok(())
}

async fn load_kind<S, T>(service: &S, kind: EntityKind) -> SyncResult<Vec<T>>
where
    S: SyncService,
    T: DeserializeOwned + Send,
{
    service
        .load_all(kind)
        .await?
        .into_iter()
        .map(|(id, record)| from_record(id, record))
        .collect()
}
