//! 報價模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::component::Component;
use crate::laser_cut_part::LaserCutPart;
use crate::nest::Nest;
use crate::settings::QuoteSettings;
use crate::sheet::Sheet;
use crate::{QuoteError, Result};

/// 報價
///
/// 持有排版、自訂排版、外購件與成本設定。集合只能透過 `&mut Quote` 修改。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub name: String,

    pub settings: QuoteSettings,

    /// 實際排版
    pub nests: Vec<Nest>,

    /// 沒有實際排版的零件
    pub custom_nest: Nest,

    pub components: Vec<Component>,

    /// 是否有未儲存的變更
    #[serde(skip)]
    pub unsaved_changes: bool,
}

impl Quote {
    /// 創建新的報價
    pub fn new(name: impl Into<String>, settings: QuoteSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            nests: Vec::new(),
            custom_nest: Nest::custom(default_custom_sheet()),
            components: Vec::new(),
            unsaved_changes: false,
        }
    }

    /// 建構器模式：添加排版
    pub fn with_nest(mut self, nest: Nest) -> Self {
        self.add_nest(nest);
        self
    }

    /// 建構器模式：添加外購件
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// 添加排版（切割方式跟隨報價）
    pub fn add_nest(&mut self, mut nest: Nest) {
        nest.cutting_method = self.settings.laser_cutting_method.clone();
        self.nests.push(nest);
        self.unsaved_changes = true;
    }

    /// 依名稱移除排版
    pub fn remove_nest(&mut self, name: &str) -> Result<Nest> {
        let index = self
            .nests
            .iter()
            .position(|nest| nest.name == name)
            .ok_or_else(|| QuoteError::ItemNotFound(name.to_string()))?;
        self.unsaved_changes = true;
        Ok(self.nests.remove(index))
    }

    /// 清除所有排版並重置自訂排版
    pub fn clear_nests(&mut self) {
        self.nests.clear();
        self.custom_nest = Nest::custom(default_custom_sheet());
        self.unsaved_changes = true;
    }

    /// 添加零件到自訂排版
    pub fn add_laser_cut_part_to_custom_nest(&mut self, part: LaserCutPart) {
        self.custom_nest.add_laser_cut_part(part);
        self.unsaved_changes = true;
    }

    /// 從自訂排版移除零件
    pub fn remove_laser_cut_part_from_custom_nest(&mut self, name: &str) -> Result<LaserCutPart> {
        let part = self
            .custom_nest
            .remove_laser_cut_part(name)
            .ok_or_else(|| QuoteError::ItemNotFound(name.to_string()))?;
        self.unsaved_changes = true;
        Ok(part)
    }

    /// 從所屬排版移除零件
    ///
    /// 實際排版因此變空時一併移除；自訂排版永遠保留。
    pub fn remove_laser_cut_part(&mut self, nest_name: &str, part_name: &str) -> Result<LaserCutPart> {
        if self.custom_nest.name == nest_name {
            return self.remove_laser_cut_part_from_custom_nest(part_name);
        }

        let index = self
            .nests
            .iter()
            .position(|nest| nest.name == nest_name)
            .ok_or_else(|| QuoteError::ItemNotFound(nest_name.to_string()))?;
        let part = self.nests[index]
            .remove_laser_cut_part(part_name)
            .ok_or_else(|| QuoteError::ItemNotFound(part_name.to_string()))?;

        if self.nests[index].is_empty() {
            self.nests.remove(index);
        }
        self.unsaved_changes = true;
        Ok(part)
    }

    /// 添加外購件
    pub fn add_component(&mut self, component: Component) {
        self.components.push(component);
        self.unsaved_changes = true;
    }

    /// 依料號移除外購件
    pub fn remove_component(&mut self, part_number: &str) -> Result<Component> {
        let index = self
            .components
            .iter()
            .position(|component| component.part_number == part_number)
            .ok_or_else(|| QuoteError::ItemNotFound(part_number.to_string()))?;
        self.unsaved_changes = true;
        Ok(self.components.remove(index))
    }

    pub fn clear_components(&mut self) {
        self.components.clear();
        self.unsaved_changes = true;
    }

    /// 變更切割方式，所有排版跟隨
    pub fn set_laser_cutting_method(&mut self, method: impl Into<String>) {
        let method = method.into();
        for nest in std::iter::once(&mut self.custom_nest).chain(self.nests.iter_mut()) {
            nest.cutting_method = method.clone();
        }
        self.settings.laser_cutting_method = method;
        self.unsaved_changes = true;
    }

    /// 依名稱排序排版
    pub fn sort_nests(&mut self) {
        self.nests.sort_by(|a, b| natural_cmp(&a.name, &b.name));
    }

    /// 有零件的排版（含自訂排版）
    pub fn nests_with_parts(&self) -> Vec<&Nest> {
        std::iter::once(&self.custom_nest)
            .chain(self.nests.iter())
            .filter(|nest| !nest.is_empty())
            .collect()
    }

    /// 所有零件（自訂排版在前）
    pub fn laser_cut_parts(&self) -> impl Iterator<Item = &LaserCutPart> {
        self.custom_nest
            .laser_cut_parts
            .iter()
            .chain(self.nests.iter().flat_map(|nest| nest.laser_cut_parts.iter()))
    }

    pub fn laser_cut_parts_mut(&mut self) -> impl Iterator<Item = &mut LaserCutPart> {
        self.custom_nest
            .laser_cut_parts
            .iter_mut()
            .chain(
                self.nests
                    .iter_mut()
                    .flat_map(|nest| nest.laser_cut_parts.iter_mut()),
            )
    }

    /// 依名稱合併所有排版的零件（數量加總，名稱排序）
    pub fn group_laser_cut_parts(&self) -> Vec<LaserCutPart> {
        let mut grouped: BTreeMap<&str, LaserCutPart> = BTreeMap::new();
        for part in self.laser_cut_parts() {
            grouped
                .entry(part.name.as_str())
                .and_modify(|existing| existing.quantity += part.quantity)
                .or_insert_with(|| part.clone());
        }
        grouped.into_values().collect()
    }

    /// 零件總數量
    pub fn total_laser_cut_part_quantity(&self) -> Decimal {
        self.laser_cut_parts().map(|part| part.quantity).sum()
    }
}

fn default_custom_sheet() -> Sheet {
    Sheet::new("Mild Steel", "12 Gauge", Decimal::from(120), Decimal::from(60))
}

/// 自然排序：數字段以數值比較（`N2` < `N10`）
fn natural_cmp(a: &str, b: &str) -> std::cmp::Ordering {
    fn chunks(s: &str) -> Vec<(bool, String)> {
        let mut out: Vec<(bool, String)> = Vec::new();
        for c in s.chars() {
            let digit = c.is_ascii_digit();
            match out.last_mut() {
                Some((is_digit, chunk)) if *is_digit == digit => chunk.push(c),
                _ => out.push((digit, c.to_string())),
            }
        }
        out
    }

    let (left, right) = (chunks(a), chunks(b));
    for ((l_digit, l), (r_digit, r)) in left.iter().zip(right.iter()) {
        let ordering = if *l_digit && *r_digit {
            let l_trim = l.trim_start_matches('0');
            let r_trim = r.trim_start_matches('0');
            l_trim.len().cmp(&r_trim.len()).then_with(|| l_trim.cmp(r_trim))
        } else {
            l.to_lowercase().cmp(&r.to_lowercase())
        };
        if ordering != std::cmp::Ordering::Equal {
            return ordering;
        }
    }
    left.len().cmp(&right.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Sheet {
        Sheet::new("Mild Steel", "12 Gauge", Decimal::from(96), Decimal::from(48))
    }

    fn quote() -> Quote {
        Quote::new("Q-1001", QuoteSettings::default())
            .with_nest(
                Nest::new("N10", sheet())
                    .with_part(LaserCutPart::new("A", Decimal::from(2)))
                    .with_part(LaserCutPart::new("B", Decimal::from(1))),
            )
            .with_nest(Nest::new("N2", sheet()).with_part(LaserCutPart::new("A", Decimal::from(5))))
    }

    #[test]
    fn test_new_quote_has_custom_nest() {
        let quote = Quote::new("Q", QuoteSettings::default());
        assert!(quote.custom_nest.is_custom);
        assert_eq!(quote.custom_nest.name, "Custom");
        assert!(quote.nests_with_parts().is_empty());
    }

    #[test]
    fn test_group_laser_cut_parts() {
        let mut quote = quote();
        quote.add_laser_cut_part_to_custom_nest(LaserCutPart::new("C", Decimal::from(3)));

        let grouped = quote.group_laser_cut_parts();
        let names: Vec<&str> = grouped.iter().map(|part| part.name.as_str()).collect();

        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(grouped[0].quantity, Decimal::from(7));
        assert_eq!(quote.total_laser_cut_part_quantity(), Decimal::from(11));
    }

    #[test]
    fn test_removing_last_part_removes_nest() {
        let mut quote = quote();

        quote.remove_laser_cut_part("N2", "A").unwrap();
        assert_eq!(quote.nests.len(), 1);

        quote.remove_laser_cut_part("N10", "A").unwrap();
        assert_eq!(quote.nests.len(), 1);
        assert!(quote.unsaved_changes);
    }

    #[test]
    fn test_custom_nest_is_never_removed() {
        let mut quote = quote();
        quote.add_laser_cut_part_to_custom_nest(LaserCutPart::new("C", Decimal::ONE));

        quote.remove_laser_cut_part("Custom", "C").unwrap();
        assert!(quote.custom_nest.is_empty());
        assert!(quote.custom_nest.is_custom);
    }

    #[test]
    fn test_cutting_method_cascades_to_nests() {
        let mut quote = quote();
        assert!(quote.nests.iter().all(|nest| nest.cutting_method == "CO2"));

        quote.set_laser_cutting_method("Nitrogen");

        assert_eq!(quote.settings.laser_cutting_method, "Nitrogen");
        assert_eq!(quote.custom_nest.cutting_method, "Nitrogen");
        assert!(quote.nests.iter().all(|nest| nest.cutting_method == "Nitrogen"));
    }

    #[test]
    fn test_sort_nests_naturally() {
        let mut quote = quote();
        quote.sort_nests();
        let names: Vec<&str> = quote.nests.iter().map(|nest| nest.name.as_str()).collect();
        assert_eq!(names, vec!["N2", "N10"]);
    }

    #[test]
    fn test_clear_nests() {
        let mut quote = quote();
        quote.add_laser_cut_part_to_custom_nest(LaserCutPart::new("C", Decimal::ONE));
        quote.clear_nests();

        assert!(quote.nests.is_empty());
        assert!(quote.custom_nest.is_empty());
    }

    #[test]
    fn test_components() {
        let mut quote = quote();
        quote.add_component(Component::new("BOLT", Decimal::from(4), Decimal::ONE));

        assert!(quote.remove_component("NUT").is_err());
        assert_eq!(quote.remove_component("BOLT").unwrap().part_number, "BOLT");
        assert!(quote.components.is_empty());
    }
}
