//! 庫存集合（外購件、板材）

use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::item::PriceableItem;
use crate::sheet::Sheet;
use crate::{QuoteError, Result};

/// 庫存存取介面
///
/// 核心只透過此介面查詢，不負責持久化。
pub trait InventoryStore {
    type Item: PriceableItem;

    fn items(&self) -> &[Self::Item];

    fn items_mut(&mut self) -> &mut Vec<Self::Item>;

    /// 項目是否屬於分類
    fn in_category(item: &Self::Item, category: &str) -> bool;

    fn get_by_id(&self, id: i64) -> Option<&Self::Item> {
        self.items().iter().find(|item| item.id() == id)
    }

    fn get_by_id_mut(&mut self, id: i64) -> Option<&mut Self::Item> {
        self.items_mut().iter_mut().find(|item| item.id() == id)
    }

    fn get_by_name(&self, name: &str) -> Option<&Self::Item> {
        self.items().iter().find(|item| item.name() == name)
    }

    fn get_by_name_mut(&mut self, name: &str) -> Option<&mut Self::Item> {
        self.items_mut().iter_mut().find(|item| item.name() == name)
    }

    /// 添加項目（同名拒絕）
    fn add(&mut self, item: Self::Item) -> Result<()> {
        if self.get_by_name(item.name()).is_some() {
            return Err(QuoteError::DuplicateItem(item.name().to_string()));
        }
        self.items_mut().push(item);
        Ok(())
    }

    /// 依名稱移除項目
    fn remove(&mut self, name: &str) -> Result<Self::Item> {
        let items = self.items_mut();
        let index = items
            .iter()
            .position(|item| item.name() == name)
            .ok_or_else(|| QuoteError::ItemNotFound(name.to_string()))?;
        Ok(items.remove(index))
    }

    fn list_by_category(&self, category: &str) -> Vec<&Self::Item> {
        self.items()
            .iter()
            .filter(|item| Self::in_category(item, category))
            .collect()
    }
}

/// 外購件庫存
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentsInventory {
    pub components: Vec<Component>,
    pub categories: Vec<String>,
}

impl ComponentsInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_component(mut self, component: Component) -> Self {
        for category in &component.categories {
            if !self.categories.contains(category) {
                self.categories.push(category.clone());
            }
        }
        self.components.push(component);
        self
    }
}

impl InventoryStore for ComponentsInventory {
    type Item = Component;

    fn items(&self) -> &[Component] {
        &self.components
    }

    fn items_mut(&mut self) -> &mut Vec<Component> {
        &mut self.components
    }

    fn in_category(item: &Component, category: &str) -> bool {
        item.has_category(category)
    }
}

/// 板材庫存
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetsInventory {
    pub sheets: Vec<Sheet>,
    pub categories: Vec<String>,
}

impl SheetsInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        for category in &sheet.categories {
            if !self.categories.contains(category) {
                self.categories.push(category.clone());
            }
        }
        self.sheets.push(sheet);
        self
    }
}

impl InventoryStore for SheetsInventory {
    type Item = Sheet;

    fn items(&self) -> &[Sheet] {
        &self.sheets
    }

    fn items_mut(&mut self) -> &mut Vec<Sheet> {
        &mut self.sheets
    }

    fn in_category(item: &Sheet, category: &str) -> bool {
        item.has_category(category)
    }
}
