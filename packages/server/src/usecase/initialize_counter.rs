//! UseCase: 起動時のカウンタ初期化

use std::sync::Arc;

use crate::domain::{CounterStore, StoreError};

/// 共有カウンタが存在しなければ 0 で作成するユースケース
pub struct InitializeCounterUseCase {
    counter: Arc<dyn CounterStore>,
}

impl InitializeCounterUseCase {
    /// 新しい InitializeCounterUseCase を作成
    pub fn new(counter: Arc<dyn CounterStore>) -> Self {
        Self { counter }
    }

    /// 初期化を実行
    ///
    /// 複数インスタンスが同時に起動しても、どちらも 0 を書くだけなので結果は同じ。
    /// 既存の値は上書きしない。
    pub async fn execute(&self) -> Result<(), StoreError> {
        if self.counter.initialize().await? {
            tracing::info!("Connection count initialized to 0");
        } else if let Some(count) = self.counter.get().await? {
            tracing::info!("Connection count already present: {}", count);
        }
        Ok(())
    }
}
