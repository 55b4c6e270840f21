//! 塗裝庫存（底漆、面漆、粉體）與塗裝成本

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::laser_cut_part::LaserCutPart;

/// 塗裝成本提供者
pub trait PaintInventoryProvider: Send + Sync {
    /// 零件底漆成本
    fn primer_cost(&self, part: &LaserCutPart) -> Decimal;

    /// 零件面漆成本
    fn paint_cost(&self, part: &LaserCutPart) -> Decimal;

    /// 零件粉體塗裝成本
    fn powder_cost(&self, part: &LaserCutPart, mil_thickness: Decimal) -> Decimal;

    fn primer_names(&self) -> Vec<String>;

    fn paint_names(&self) -> Vec<String>;

    fn powder_names(&self) -> Vec<String>;
}

/// 底漆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Primer {
    pub name: String,
    /// 每加侖單價
    pub price_per_gallon: Decimal,
    /// 每加侖覆蓋面積（平方英尺）
    pub average_coverage: Decimal,
}

/// 面漆
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paint {
    pub name: String,
    /// 每加侖單價
    pub price_per_gallon: Decimal,
    /// 每加侖覆蓋面積（平方英尺）
    pub average_coverage: Decimal,
}

/// 粉體
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Powder {
    pub name: String,
    /// 每磅單價
    pub price_per_pound: Decimal,
    /// 比重
    pub gravity: Decimal,
}

/// 粉體理論覆蓋常數（平方英尺 / 磅，比重 1、膜厚 1 mil）
const POWDER_COVERAGE_CONSTANT: Decimal = Decimal::from_parts(1923, 0, 0, false, 1);

/// 記憶體內的塗裝庫存
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaintInventory {
    pub primers: Vec<Primer>,
    pub paints: Vec<Paint>,
    pub powders: Vec<Powder>,
}

impl PaintInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primer(mut self, primer: Primer) -> Self {
        self.primers.push(primer);
        self
    }

    pub fn with_paint(mut self, paint: Paint) -> Self {
        self.paints.push(paint);
        self
    }

    pub fn with_powder(mut self, powder: Powder) -> Self {
        self.powders.push(powder);
        self
    }

    pub fn get_primer(&self, name: &str) -> Option<&Primer> {
        self.primers.iter().find(|primer| primer.name == name)
    }

    pub fn get_paint(&self, name: &str) -> Option<&Paint> {
        self.paints.iter().find(|paint| paint.name == name)
    }

    pub fn get_powder(&self, name: &str) -> Option<&Powder> {
        self.powders.iter().find(|powder| powder.name == name)
    }
}

/// 雙面塗裝面積（平方英尺）
fn coated_square_feet(part: &LaserCutPart) -> Decimal {
    part.surface_area * Decimal::TWO / Decimal::from(144)
}

/// 液體塗料成本：單價 × 用量（加侖）× (1 + 噴塗損耗)
fn liquid_coating_cost(
    part: &LaserCutPart,
    price_per_gallon: Decimal,
    average_coverage: Decimal,
    overspray_percent: Decimal,
) -> Decimal {
    let Some(gallons) = coated_square_feet(part).checked_div(average_coverage) else {
        return Decimal::ZERO;
    };
    let overspray = overspray_percent / Decimal::ONE_HUNDRED + Decimal::ONE;
    price_per_gallon * gallons * overspray
}

impl PaintInventoryProvider for PaintInventory {
    fn primer_cost(&self, part: &LaserCutPart) -> Decimal {
        if !part.coating.uses_primer {
            return Decimal::ZERO;
        }
        part.coating
            .primer_name
            .as_deref()
            .and_then(|name| self.get_primer(name))
            .map(|primer| {
                liquid_coating_cost(
                    part,
                    primer.price_per_gallon,
                    primer.average_coverage,
                    part.coating.primer_overspray,
                )
            })
            .unwrap_or(Decimal::ZERO)
    }

    fn paint_cost(&self, part: &LaserCutPart) -> Decimal {
        if !part.coating.uses_paint {
            return Decimal::ZERO;
        }
        part.coating
            .paint_name
            .as_deref()
            .and_then(|name| self.get_paint(name))
            .map(|paint| {
                liquid_coating_cost(
                    part,
                    paint.price_per_gallon,
                    paint.average_coverage,
                    part.coating.paint_overspray,
                )
            })
            .unwrap_or(Decimal::ZERO)
    }

    fn powder_cost(&self, part: &LaserCutPart, mil_thickness: Decimal) -> Decimal {
        if !part.coating.uses_powder {
            return Decimal::ZERO;
        }
        let Some(powder) = part
            .coating
            .powder_name
            .as_deref()
            .and_then(|name| self.get_powder(name))
        else {
            return Decimal::ZERO;
        };

        let efficiency = part.coating.powder_transfer_efficiency / Decimal::ONE_HUNDRED;
        let coverage = POWDER_COVERAGE_CONSTANT
            .checked_div(powder.gravity * mil_thickness)
            .map(|coverage| coverage * efficiency);

        match coverage.and_then(|coverage| coated_square_feet(part).checked_div(coverage)) {
            Some(pounds_needed) => pounds_needed * powder.price_per_pound,
            None => Decimal::ZERO,
        }
    }

    fn primer_names(&self) -> Vec<String> {
        self.primers.iter().map(|primer| primer.name.clone()).collect()
    }

    fn paint_names(&self) -> Vec<String> {
        self.paints.iter().map(|paint| paint.name.clone()).collect()
    }

    fn powder_names(&self) -> Vec<String> {
        self.powders.iter().map(|powder| powder.name.clone()).collect()
    }
}
