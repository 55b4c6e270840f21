//! 依序執行的非同步步驟鏈
//!
//! 第 N+1 步只在第 N 步完成後開始；第一個失敗即中止，回報失敗步驟的索引。

use std::future::Future;
use std::pin::Pin;
use tracing::{debug, error, info};

use crate::error::{SyncError, SyncResult};

type StepFuture<'a> = Pin<Box<dyn Future<Output = SyncResult<()>> + Send + 'a>>;
type Step<'a> = Box<dyn FnOnce() -> StepFuture<'a> + Send + 'a>;

/// 步驟鏈
pub struct StepChain<'a> {
    name: String,
    steps: Vec<(String, Step<'a>)>,
}

impl<'a> StepChain<'a> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    /// 加入下一個步驟
    pub fn then<F, Fut>(mut self, step: impl Into<String>, f: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = SyncResult<()>> + Send + 'a,
    {
        self.steps
            .push((step.into(), Box::new(move || Box::pin(f()) as StepFuture<'a>)));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// 執行全部步驟，回傳完成的步驟數
    pub async fn run(self) -> SyncResult<usize> {
        let total = self.steps.len();
        info!("開始執行 {}（{} 個步驟）", self.name, total);

        for (index, (step, f)) in self.steps.into_iter().enumerate() {
            debug!("{} Step {}: {}", self.name, index + 1, step);
            if let Err(source) = f().await {
                error!("{} 在步驟 {}（{}）中止: {}", self.name, index, step, source);
                return Err(SyncError::StepFailed {
                    index,
                    step,
                    source: Box::new(source),
                });
            }
        }

        info!("{} 完成", self.name);
        Ok(total)
    }
}
