//! InMemoryObjectStore - 開発用のオブジェクトストア
//!
//! # 学習ポイント
//! - bucket → key → bytes の 2 段 HashMap
//! - bucket は明示的に作る（存在しない bucket へのアクセスは NoSuchBucket）
//! - `set_unreachable` で通信障害を再現できる

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{RemoteUrl, StoreError};
use crate::ports::{ObjectMeta, ObjectStore};

type Buckets = HashMap<String, HashMap<String, Vec<u8>>>;

pub struct InMemoryObjectStore {
    buckets: Arc<Mutex<Buckets>>,
    unreachable: AtomicBool,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self {
            buckets: Arc::new(Mutex::new(HashMap::new())),
            unreachable: AtomicBool::new(false),
        }
    }

    pub async fn create_bucket(&self, bucket: &str) {
        self.buckets
            .lock()
            .await
            .entry(bucket.to_string())
            .or_default();
    }

    /// true にすると以降の全操作が `StoreError::Transport` になる
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::Relaxed);
    }

    /// Number of objects across all buckets.
    pub async fn object_count(&self) -> usize {
        self.buckets.lock().await.values().map(HashMap::len).sum()
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.unreachable.load(Ordering::Relaxed) {
            return Err(StoreError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn head(&self, url: &RemoteUrl) -> Result<ObjectMeta, StoreError> {
        self.check_reachable()?;
        let buckets = self.buckets.lock().await;
        let bucket = buckets
            .get(url.bucket())
            .ok_or(StoreError::NoSuchBucket { operation: "HeadObject" })?;
        bucket
            .get(url.key())
            .map(|body| ObjectMeta { size: body.len() })
            .ok_or(StoreError::NotFound { operation: "HeadObject" })
    }

    async fn get(&self, url: &RemoteUrl) -> Result<Vec<u8>, StoreError> {
        self.check_reachable()?;
        let buckets = self.buckets.lock().await;
        let bucket = buckets
            .get(url.bucket())
            .ok_or(StoreError::NoSuchBucket { operation: "GetObject" })?;
        bucket
            .get(url.key())
            .cloned()
            .ok_or(StoreError::NotFound { operation: "GetObject" })
    }

    async fn put(&self, url: &RemoteUrl, body: Vec<u8>) -> Result<(), StoreError> {
        self.check_reachable()?;
        let mut buckets = self.buckets.lock().await;
        let bucket = buckets
            .get_mut(url.bucket())
            .ok_or(StoreError::NoSuchBucket { operation: "PutObject" })?;
        bucket.insert(url.key().to_string(), body);
        Ok(())
    }
}
