//! 排版模型：一張板材（重複 `sheet_count` 張）上排入的雷射切割零件

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::laser_cut_part::LaserCutPart;
use crate::sheet::Sheet;
use crate::UNSAVED_ID;

/// 自訂排版名稱
pub const CUSTOM_NEST_NAME: &str = "Custom";

/// 排版
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nest {
    pub id: i64,

    /// 排版名稱
    pub name: String,

    /// 切割方式（由報價設定同步）
    pub cutting_method: String,

    /// 使用的板材（只能透過 `set_sheet_*` / `replace_sheet` 修改）
    sheet: Sheet,

    /// 板材張數
    pub sheet_count: Decimal,

    /// 每張切割時間（秒）
    pub sheet_cut_time: Decimal,

    /// 排入的零件
    pub laser_cut_parts: Vec<LaserCutPart>,

    /// 是否為報價內的自訂排版
    pub is_custom: bool,

    pub notes: String,
}

impl Nest {
    /// 創建新的排版
    pub fn new(name: impl Into<String>, sheet: Sheet) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.into(),
            cutting_method: "CO2".to_string(),
            sheet,
            sheet_count: Decimal::ONE,
            sheet_cut_time: Decimal::ZERO,
            laser_cut_parts: Vec::new(),
            is_custom: false,
            notes: String::new(),
        }
    }

    /// 創建自訂排版（沒有實際排版的零件放這裡，不消耗板材）
    pub fn custom(sheet: Sheet) -> Self {
        let mut nest = Self::new(CUSTOM_NEST_NAME, sheet);
        nest.sheet_count = Decimal::ZERO;
        nest.is_custom = true;
        nest
    }

    /// 建構器模式：設置板材張數與每張切割時間
    pub fn with_sheets(mut self, sheet_count: Decimal, sheet_cut_time: Decimal) -> Self {
        self.sheet_count = sheet_count;
        self.sheet_cut_time = sheet_cut_time;
        self
    }

    pub fn sheet(&self) -> &Sheet {
        &self.sheet
    }

    /// 建構器模式：排入零件
    pub fn with_part(mut self, part: LaserCutPart) -> Self {
        self.add_laser_cut_part(part);
        self
    }

    /// 排入零件（材質與厚度跟隨板材）
    pub fn add_laser_cut_part(&mut self, mut part: LaserCutPart) {
        part.material = self.sheet.material().to_string();
        part.gauge = self.sheet.thickness().to_string();
        self.laser_cut_parts.push(part);
    }

    /// 依名稱移除零件
    pub fn remove_laser_cut_part(&mut self, name: &str) -> Option<LaserCutPart> {
        let index = self.laser_cut_parts.iter().position(|part| part.name == name)?;
        Some(self.laser_cut_parts.remove(index))
    }

    /// 變更板材材質，同步到所有零件
    pub fn set_sheet_material(&mut self, material: impl Into<String>) {
        self.sheet.set_material(material);
        self.sync_parts_to_sheet();
    }

    /// 變更板材厚度，同步到所有零件
    pub fn set_sheet_thickness(&mut self, thickness: impl Into<String>) {
        self.sheet.set_thickness(thickness);
        self.sync_parts_to_sheet();
    }

    /// 更換板材，同步到所有零件
    pub fn replace_sheet(&mut self, sheet: Sheet) {
        self.sheet = sheet;
        self.sync_parts_to_sheet();
    }

    fn sync_parts_to_sheet(&mut self) {
        for part in &mut self.laser_cut_parts {
            part.material = self.sheet.material().to_string();
            part.gauge = self.sheet.thickness().to_string();
        }
    }

    pub fn is_empty(&self) -> bool {
        self.laser_cut_parts.is_empty()
    }

    /// 總切割時間（秒）
    pub fn total_cutting_time(&self) -> Decimal {
        self.sheet_cut_time * self.sheet_count
    }

    /// 總切割時間 `HHh MMm SSs`
    pub fn formatted_total_cutting_time(&self) -> String {
        format_duration(self.total_cutting_time())
    }

    /// 每張切割時間 `HHh MMm SSs`
    pub fn formatted_sheet_cut_time(&self) -> String {
        format_duration(self.sheet_cut_time)
    }

    /// 顯示名稱
    pub fn display_name(&self) -> String {
        format!(
            "{} {} {} {}",
            self.sheet.thickness(),
            self.sheet.material(),
            self.sheet.dimension_text(),
            self.name
        )
    }

    /// 重切零件摘要；沒有重切零件時為 `None`
    pub fn recut_summary(&self) -> Option<String> {
        let lines: Vec<String> = self
            .laser_cut_parts
            .iter()
            .filter(|part| part.recut)
            .map(|part| {
                let plural = if part.recut_count == 1 { "" } else { "s" };
                format!("{} has {} recut{}", part.name, part.recut_count, plural)
            })
            .collect();

        if lines.is_empty() {
            None
        } else {
            Some(lines.join("\n"))
        }
    }

    /// 依名稱排序零件
    pub fn sort_laser_cut_parts(&mut self) {
        self.laser_cut_parts.sort_by(|a, b| a.name.cmp(&b.name));
    }
}

/// 秒數格式化為 `HHh MMm SSs`（不足一秒捨去）
pub fn format_duration(seconds: Decimal) -> String {
    let total = seconds.trunc().to_i64().unwrap_or(0).max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{:02}h {:02}m {:02}s", hours, minutes, secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet() -> Sheet {
        Sheet::new("Mild Steel", "12 Gauge", Decimal::from(96), Decimal::from(48))
    }

    #[test]
    fn test_parts_follow_sheet() {
        let nest = Nest::new("N1", sheet()).with_part(LaserCutPart::new("A", Decimal::from(3)));

        assert_eq!(nest.laser_cut_parts[0].material, "Mild Steel");
        assert_eq!(nest.laser_cut_parts[0].gauge, "12 Gauge");
    }

    #[test]
    fn test_material_change_cascades() {
        let mut nest = Nest::new("N1", sheet())
            .with_part(LaserCutPart::new("A", Decimal::from(3)))
            .with_part(LaserCutPart::new("B", Decimal::from(7)));

        nest.set_sheet_material("Stainless Steel 304");
        nest.set_sheet_thickness("14 Gauge");

        for part in &nest.laser_cut_parts {
            assert_eq!(part.material, "Stainless Steel 304");
            assert_eq!(part.gauge, "14 Gauge");
        }
        // 數量不受影響
        assert_eq!(nest.laser_cut_parts[0].quantity, Decimal::from(3));
        assert_eq!(nest.laser_cut_parts[1].quantity, Decimal::from(7));
    }

    #[test]
    fn test_cutting_time() {
        let nest = Nest::new("N1", sheet()).with_sheets(Decimal::from(3), Decimal::from(1325));

        assert_eq!(nest.total_cutting_time(), Decimal::from(3975));
        assert_eq!(nest.formatted_total_cutting_time(), "01h 06m 15s");
        assert_eq!(nest.formatted_sheet_cut_time(), "00h 22m 05s");
    }

    #[test]
    fn test_display_name() {
        let nest = Nest::new("BRACKETS", sheet());
        assert_eq!(
            nest.display_name(),
            "12 Gauge Mild Steel 96.000x48.000 BRACKETS"
        );
    }

    #[test]
    fn test_recut_summary() {
        let mut nest = Nest::new("N1", sheet()).with_part(LaserCutPart::new("A", Decimal::ONE));
        assert_eq!(nest.recut_summary(), None);

        nest.add_laser_cut_part(LaserCutPart::new("B", Decimal::ONE).with_recut(1));
        nest.add_laser_cut_part(LaserCutPart::new("C", Decimal::ONE).with_recut(2));
        assert_eq!(
            nest.recut_summary().unwrap(),
            "B has 1 recut\nC has 2 recuts"
        );
    }

    #[test]
    fn test_remove_part() {
        let mut nest = Nest::new("N1", sheet()).with_part(LaserCutPart::new("A", Decimal::ONE));

        assert!(nest.remove_laser_cut_part("missing").is_none());
        assert!(nest.remove_laser_cut_part("A").is_some());
        assert!(nest.is_empty());
    }
}
