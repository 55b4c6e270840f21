//! 數值文字解析
//!
//! 使用者輸入的價格與數量可能帶有貨幣符號、千分位或英吋/英尺記號。

use rust_decimal::Decimal;
use std::str::FromStr;

use crate::{QuoteError, Result};

/// 解析數值文字（忽略 `$`、`,`、`"`、`'` 與前後空白）
pub fn parse_decimal(text: &str) -> Result<Decimal> {
    let cleaned: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '"' | '\''))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        return Err(QuoteError::InvalidNumber(text.to_string()));
    }

    Decimal::from_str(cleaned)
        .or_else(|_| Decimal::from_scientific(cleaned))
        .map_err(|_| QuoteError::InvalidNumber(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("12", Decimal::from(12))]
    #[case("$1,234.50", Decimal::new(123450, 2))]
    #[case(" 48\" ", Decimal::from(48))]
    #[case("-3.5", Decimal::new(-35, 1))]
    #[case("1e3", Decimal::from(1000))]
    fn test_parse_valid(#[case] text: &str, #[case] expected: Decimal) {
        assert_eq!(parse_decimal(text).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("$")]
    #[case("abc")]
    #[case("1.2.3")]
    fn test_parse_invalid(#[case] text: &str) {
        assert!(matches!(
            parse_decimal(text),
            Err(QuoteError::InvalidNumber(_))
        ));
    }
}
