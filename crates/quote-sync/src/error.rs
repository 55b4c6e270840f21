//! # Sync Error Types
//!
//! 與遠端儲存同步時的錯誤類型
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Transport            Remote              Chain          │
//! │  Timeout              HttpStatus          StepFailed     │
//! │  Connection           NotFound                           │
//! │                       Decode                             │
//! └──────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::service::EntityKind;

/// 同步錯誤
#[derive(Debug, Error)]
pub enum SyncError {
    /// 請求逾時（不自動重試）
    #[error("{operation} 逾時（{seconds} 秒）")]
    Timeout { operation: String, seconds: u64 },

    #[error("連線失敗: {0}")]
    Connection(String),

    /// 遠端回應非成功狀態
    #[error("遠端回應狀態 {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("資料解碼失敗: {0}")]
    Decode(String),

    #[error("找不到 {kind} #{id}")]
    NotFound { kind: EntityKind, id: i64 },

    /// 步驟鏈中斷，`index` 從 0 起算
    #[error("步驟 {index}（{step}）失敗: {source}")]
    StepFailed {
        index: usize,
        step: String,
        #[source]
        source: Box<SyncError>,
    },
}

impl From<serde_json::Error> for SyncError {
    fn from(err: serde_json::Error) -> Self {
        SyncError::Decode(err.to_string())
    }
}

impl SyncError {
    /// 呼叫端可選擇重試的錯誤：連線失敗、逾時、5xx
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Timeout { .. } | SyncError::Connection(_) => true,
            SyncError::HttpStatus { status, .. } => *status >= 500,
            SyncError::StepFailed { source, .. } => source.is_retryable(),
            SyncError::Decode(_) | SyncError::NotFound { .. } => false,
        }
    }

    /// 步驟鏈中失敗的步驟索引
    pub fn failed_step(&self) -> Option<usize> {
        match self {
            SyncError::StepFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(SyncError::Timeout { operation: "save".into(), seconds: 10 }, true)]
    #[case(SyncError::Connection("refused".into()), true)]
    #[case(SyncError::HttpStatus { status: 503, message: "busy".into() }, true)]
    #[case(SyncError::HttpStatus { status: 404, message: "missing".into() }, false)]
    #[case(SyncError::Decode("bad json".into()), false)]
    fn test_is_retryable(#[case] error: SyncError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }

    #[test]
    fn test_step_failed_wraps_source() {
        let error = SyncError::StepFailed {
            index: 1,
            step: "update components".into(),
            source: Box::new(SyncError::Connection("reset".into())),
        };

        assert_eq!(error.failed_step(), Some(1));
        assert!(error.is_retryable());
        assert!(error.to_string().contains("update components"));
    }

    #[test]
    fn test_from_serde_error() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert!(matches!(SyncError::from(err), SyncError::Decode(_)));
    }
}
