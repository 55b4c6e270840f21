//! 板材設定（材質單價、單位面積重量、雷射成本）

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 板材設定提供者
///
/// 查不到的材質或厚度一律回傳 0，由呼叫端決定如何呈現。
pub trait SheetSettingsProvider: Send + Sync {
    /// 材質每磅單價
    fn price_per_pound(&self, material: &str) -> Decimal;

    /// 材質在指定厚度下每平方英尺重量（磅）
    fn pounds_per_square_foot(&self, material: &str, thickness: &str) -> Decimal;

    /// 切割方式每小時成本
    fn laser_cost(&self, cutting_method: &str) -> Decimal;

    /// 所有材質名稱
    fn materials(&self) -> Vec<String>;

    /// 所有厚度名稱
    fn thicknesses(&self) -> Vec<String>;
}

/// 記憶體內的板材設定表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SheetSettings {
    /// 材質 -> 每磅單價
    pub price_per_pound: BTreeMap<String, Decimal>,

    /// 材質 -> 厚度 -> 每平方英尺重量
    pub pounds_per_square_foot: BTreeMap<String, BTreeMap<String, Decimal>>,

    /// 切割方式 -> 每小時成本
    pub cost_for_laser: BTreeMap<String, Decimal>,

    /// 厚度清單（保持輸入順序）
    pub thicknesses: Vec<String>,
}

impl SheetSettings {
    /// 創建空的板材設定
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置材質單價
    pub fn with_price_per_pound(mut self, material: impl Into<String>, price: Decimal) -> Self {
        self.price_per_pound.insert(material.into(), price);
        self
    }

    /// 建構器模式：設置材質厚度重量
    pub fn with_pounds_per_square_foot(
        mut self,
        material: impl Into<String>,
        thickness: impl Into<String>,
        pounds: Decimal,
    ) -> Self {
        let thickness = thickness.into();
        if !self.thicknesses.contains(&thickness) {
            self.thicknesses.push(thickness.clone());
        }
        self.pounds_per_square_foot
            .entry(material.into())
            .or_default()
            .insert(thickness, pounds);
        self
    }

    /// 建構器模式：設置切割方式成本
    pub fn with_laser_cost(mut self, cutting_method: impl Into<String>, cost: Decimal) -> Self {
        self.cost_for_laser.insert(cutting_method.into(), cost);
        self
    }
}

impl SheetSettingsProvider for SheetSettings {
    fn price_per_pound(&self, material: &str) -> Decimal {
        self.price_per_pound
            .get(material)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn pounds_per_square_foot(&self, material: &str, thickness: &str) -> Decimal {
        self.pounds_per_square_foot
            .get(material)
            .and_then(|by_thickness| by_thickness.get(thickness))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn laser_cost(&self, cutting_method: &str) -> Decimal {
        self.cost_for_laser
            .get(cutting_method)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    fn materials(&self) -> Vec<String> {
        let mut materials: Vec<String> = self.price_per_pound.keys().cloned().collect();
        for material in self.pounds_per_square_foot.keys() {
            if !materials.contains(material) {
                materials.push(material.clone());
            }
        }
        materials.sort();
        materials
    }

    fn thicknesses(&self) -> Vec<String> {
        self.thicknesses.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_settings() -> SheetSettings {
        SheetSettings::new()
            .with_price_per_pound("Mild Steel", Decimal::new(55, 2))
            .with_price_per_pound("Aluminium", Decimal::new(210, 2))
            .with_pounds_per_square_foot("Mild Steel", "12 Gauge", Decimal::new(4375, 3))
            .with_pounds_per_square_foot("Mild Steel", "14 Gauge", Decimal::new(3125, 3))
            .with_laser_cost("CO2", Decimal::from(150))
    }

    #[test]
    fn test_lookup_known_values() {
        let settings = sample_settings();

        assert_eq!(settings.price_per_pound("Mild Steel"), Decimal::new(55, 2));
        assert_eq!(
            settings.pounds_per_square_foot("Mild Steel", "12 Gauge"),
            Decimal::new(4375, 3)
        );
        assert_eq!(settings.laser_cost("CO2"), Decimal::from(150));
    }

    #[test]
    fn test_unknown_values_are_zero() {
        let settings = sample_settings();

        assert_eq!(settings.price_per_pound("Unobtainium"), Decimal::ZERO);
        assert_eq!(
            settings.pounds_per_square_foot("Aluminium", "12 Gauge"),
            Decimal::ZERO
        );
        assert_eq!(settings.laser_cost("Nitrogen"), Decimal::ZERO);
    }

    #[test]
    fn test_enumerations() {
        let settings = sample_settings();

        assert_eq!(settings.materials(), vec!["Aluminium", "Mild Steel"]);
        assert_eq!(settings.thicknesses(), vec!["12 Gauge", "14 Gauge"]);
    }
}
