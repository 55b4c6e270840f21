//! 報價設定模型
//!
//! 所有成本計算都顯式接收此設定，不使用全域狀態。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{QuoteError, Result};

/// 報價全域成本參數
///
/// 百分比欄位以百分數儲存（`18.0` 代表 18%），計算時透過 `*_fraction` 轉換。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuoteSettings {
    /// 雷射切割方式（CO2 / Nitrogen）
    pub laser_cutting_method: String,

    /// 雷射切割每小時成本
    pub laser_cutting_cost: Decimal,

    /// 零件管銷費用（%）
    pub item_overhead: Decimal,

    /// 零件利潤率（%）
    pub item_profit_margin: Decimal,

    /// 零件價格對齊板材成本
    pub match_item_to_sheet_cost: bool,

    /// 板材管銷費用（%）
    pub sheet_overhead: Decimal,

    /// 板材利潤率（%）
    pub sheet_profit_margin: Decimal,

    /// 板材成本對齊零件價格
    pub match_sheet_cost_to_item: bool,

    /// 外購件是否套用管銷費用
    pub component_use_overhead: bool,

    /// 外購件是否套用利潤率
    pub component_use_profit_margin: bool,

    /// 底漆噴塗損耗（%）
    pub primer_overspray: Decimal,

    /// 面漆噴塗損耗（%）
    pub paint_overspray: Decimal,

    /// 粉體塗裝轉移效率（%）
    pub transfer_efficiency: Decimal,

    /// 粉體塗裝膜厚（mil）
    pub mil_thickness: Decimal,

    /// 匯率（外購件使用外幣報價時）
    pub exchange_rate: Decimal,
}

impl Default for QuoteSettings {
    fn default() -> Self {
        Self {
            laser_cutting_method: "CO2".to_string(),
            laser_cutting_cost: Decimal::from(150),
            item_overhead: Decimal::from(18),
            item_profit_margin: Decimal::from(30),
            match_item_to_sheet_cost: false,
            sheet_overhead: Decimal::from(18),
            sheet_profit_margin: Decimal::from(30),
            match_sheet_cost_to_item: false,
            component_use_overhead: false,
            component_use_profit_margin: false,
            primer_overspray: Decimal::new(6667, 2),
            paint_overspray: Decimal::new(6667, 2),
            transfer_efficiency: Decimal::new(6667, 2),
            mil_thickness: Decimal::from(2),
            exchange_rate: Decimal::new(13, 1),
        }
    }
}

impl QuoteSettings {
    /// 創建預設設定
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 載入設定（缺少的欄位使用預設值）
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// 輸出為 JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 建構器模式：設置零件管銷與利潤率（%）
    pub fn with_item_markup(mut self, overhead: Decimal, profit_margin: Decimal) -> Self {
        self.item_overhead = overhead;
        self.item_profit_margin = profit_margin;
        self
    }

    /// 建構器模式：設置板材管銷與利潤率（%）
    pub fn with_sheet_markup(mut self, overhead: Decimal, profit_margin: Decimal) -> Self {
        self.sheet_overhead = overhead;
        self.sheet_profit_margin = profit_margin;
        self
    }

    /// 建構器模式：設置雷射切割每小時成本
    pub fn with_laser_cutting_cost(mut self, cost_per_hour: Decimal) -> Self {
        self.laser_cutting_cost = cost_per_hour;
        self
    }

    /// 建構器模式：設置切割方式
    pub fn with_laser_cutting_method(mut self, method: impl Into<String>) -> Self {
        self.laser_cutting_method = method.into();
        self
    }

    /// 建構器模式：啟用零件價格對齊板材成本
    pub fn with_match_item_to_sheet_cost(mut self, enabled: bool) -> Self {
        self.match_item_to_sheet_cost = enabled;
        self
    }

    /// 建構器模式：啟用板材成本對齊零件價格
    pub fn with_match_sheet_cost_to_item(mut self, enabled: bool) -> Self {
        self.match_sheet_cost_to_item = enabled;
        self
    }

    /// 建構器模式：外購件是否套用管銷 / 利潤率
    pub fn with_component_markup(mut self, use_overhead: bool, use_profit_margin: bool) -> Self {
        self.component_use_overhead = use_overhead;
        self.component_use_profit_margin = use_profit_margin;
        self
    }

    /// 建構器模式：設置粉體塗裝膜厚
    pub fn with_mil_thickness(mut self, mil_thickness: Decimal) -> Self {
        self.mil_thickness = mil_thickness;
        self
    }

    /// 建構器模式：設置匯率
    pub fn with_exchange_rate(mut self, exchange_rate: Decimal) -> Self {
        self.exchange_rate = exchange_rate;
        self
    }

    pub fn item_overhead_fraction(&self) -> Decimal {
        percent_to_fraction(self.item_overhead)
    }

    pub fn item_profit_margin_fraction(&self) -> Decimal {
        percent_to_fraction(self.item_profit_margin)
    }

    pub fn sheet_overhead_fraction(&self) -> Decimal {
        percent_to_fraction(self.sheet_overhead)
    }

    pub fn sheet_profit_margin_fraction(&self) -> Decimal {
        percent_to_fraction(self.sheet_profit_margin)
    }

    /// 外購件實際使用的（利潤率, 管銷）分數，未啟用者為 0
    pub fn component_markup_fractions(&self) -> (Decimal, Decimal) {
        let profit_margin = if self.component_use_profit_margin {
            self.item_profit_margin_fraction()
        } else {
            Decimal::ZERO
        };
        let overhead = if self.component_use_overhead {
            self.item_overhead_fraction()
        } else {
            Decimal::ZERO
        };
        (profit_margin, overhead)
    }

    /// 外購件是否需要加成
    pub fn components_use_markup(&self) -> bool {
        self.component_use_overhead || self.component_use_profit_margin
    }

    /// 驗證設定
    ///
    /// 百分比超過 100 仍然接受（加成結果由呼叫端負責），只拒絕負值。
    pub fn validate(&self) -> Result<()> {
        let non_negative = [
            ("laser_cutting_cost", self.laser_cutting_cost),
            ("item_overhead", self.item_overhead),
            ("item_profit_margin", self.item_profit_margin),
            ("sheet_overhead", self.sheet_overhead),
            ("sheet_profit_margin", self.sheet_profit_margin),
            ("primer_overspray", self.primer_overspray),
            ("paint_overspray", self.paint_overspray),
            ("transfer_efficiency", self.transfer_efficiency),
            ("mil_thickness", self.mil_thickness),
            ("exchange_rate", self.exchange_rate),
        ];

        for (name, value) in non_negative {
            if value.is_sign_negative() && !value.is_zero() {
                return Err(QuoteError::InvalidSettings(format!(
                    "{} 不可為負值: {}",
                    name, value
                )));
            }
        }

        if self.laser_cutting_method.trim().is_empty() {
            return Err(QuoteError::InvalidSettings("未指定切割方式".to_string()));
        }

        Ok(())
    }
}

/// 百分數轉分數
pub fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / Decimal::ONE_HUNDRED
}
