//! ObjectStore port - Blob ストレージ（S3 互換 / in-memory）
//!
//! タスク試行のログ全文を 1 オブジェクトとして保存します。
//!
//! # 実装
//! - InMemoryObjectStore（開発用・テスト用）
//! - 本番用の SDK 実装は別クレートに置く想定

use async_trait::async_trait;

use crate::domain::{RemoteUrl, StoreError};

/// HEAD の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectMeta {
    pub size: usize,
}

/// ObjectStore は `scheme://bucket/key` でアドレスされるオブジェクトを読み書きする
///
/// # 設計原則
/// - 同じ key への書き込みは上書き（追記はハンドラ側で read-modify-write）
/// - key がなければ `StoreError::NotFound`、bucket がなければ `StoreError::NoSuchBucket`
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn head(&self, url: &RemoteUrl) -> Result<ObjectMeta, StoreError>;

    async fn get(&self, url: &RemoteUrl) -> Result<Vec<u8>, StoreError>;

    async fn put(&self, url: &RemoteUrl, body: Vec<u8>) -> Result<(), StoreError>;
}

#[async_trait]
impl<S: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<S> {
    async fn head(&self, url: &RemoteUrl) -> Result<ObjectMeta, StoreError> {
        (**self).head(url).await
    }

    async fn get(&self, url: &RemoteUrl) -> Result<Vec<u8>, StoreError> {
        (**self).get(url).await
    }

    async fn put(&self, url: &RemoteUrl, body: Vec<u8>) -> Result<(), StoreError> {
        (**self).put(url, body).await
    }
}
