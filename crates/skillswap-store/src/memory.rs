//! In-process store
//!
//! Holds the whole tree in memory and notifies subscribers as soon as a
//! write touches their path. Clones share the same tree.

use crate::path::StorePath;
use crate::subscription::{publish, Snapshot, SnapshotSender, Subscription};
use crate::{tree, RemoteStore, Result};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::debug;

struct Watcher {
    path: StorePath,
    tx: SnapshotSender,
}

#[derive(Default)]
struct Inner {
    root: RwLock<Value>,
    watchers: Mutex<Vec<Watcher>>,
    push_counter: AtomicU64,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing tree
    pub fn with_data(data: Value) -> Self {
        let store = Self::new();
        *store.inner.root.write() = tree::normalize(data).unwrap_or(Value::Null);
        store
    }

    /// Copy of the whole tree
    pub fn dump(&self) -> Value {
        self.inner.root.read().clone()
    }

    /// Synchronous read, for callers outside an async context
    pub fn read(&self, path: &StorePath) -> Option<Value> {
        tree::get(&self.inner.root.read(), path)
    }

    pub fn subscriber_count(&self) -> usize {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| !w.tx.is_closed());
        watchers.len()
    }

    fn write<F>(&self, path: &StorePath, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Value) -> Result<()>,
    {
        {
            let mut root = self.inner.root.write();
            apply(&mut root)?;
        }
        self.notify(path);
        Ok(())
    }

    fn notify(&self, changed: &StorePath) {
        let mut watchers = self.inner.watchers.lock();
        watchers.retain(|w| !w.tx.is_closed());

        let root = self.inner.root.read();
        for watcher in watchers.iter().filter(|w| w.path.overlaps(changed)) {
            let snapshot = Snapshot::new(watcher.path.clone(), tree::get(&root, &watcher.path));
            if publish(&watcher.tx, snapshot) {
                debug!("Notified subscriber of {} after write to {}", watcher.path, changed);
            }
        }
    }

    fn next_push_key(&self) -> String {
        // Millisecond prefix keeps keys in creation order
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let seq = self.inner.push_counter.fetch_add(1, Ordering::Relaxed);
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        format!("{:012x}{:04x}{}", millis, seq & 0xffff, &suffix[..8])
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn get(&self, path: &StorePath) -> Result<Option<Value>> {
        Ok(self.read(path))
    }

    async fn set(&self, path: &StorePath, value: Value) -> Result<()> {
        self.write(path, |root| {
            tree::set(root, path, value);
            Ok(())
        })
    }

    async fn update(&self, path: &StorePath, fields: Map<String, Value>) -> Result<()> {
        self.write(path, |root| Ok(tree::update(root, path, fields)?))
    }

    async fn remove(&self, path: &StorePath) -> Result<()> {
        self.write(path, |root| {
            tree::remove(root, path);
            Ok(())
        })
    }

    async fn push(&self, path: &StorePath, value: Value) -> Result<String> {
        let key = self.next_push_key();
        let target = path.child(&key)?;
        self.write(&target, |root| {
            tree::set(root, &target, value);
            Ok(())
        })?;
        Ok(key)
    }

    fn subscribe(&self, path: &StorePath) -> Subscription {
        // Same lock order as `notify`: a write either lands before the first
        // snapshot is read or notifies this watcher afterwards
        let mut watchers = self.inner.watchers.lock();
        let (tx, rx) = watch::channel(None);
        tx.send_replace(Some(Snapshot::new(path.clone(), self.read(path))));
        watchers.push(Watcher {
            path: path.clone(),
            tx,
        });
        Subscription::new(path.clone(), rx, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RemoteStoreExt;
    use serde_json::json;

    fn p(s: &str) -> StorePath {
        StorePath::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_point_operations() {
        let store = MemoryStore::new();
        store.set(&p("users/u1"), json!({"name": "A"})).await.unwrap();
        assert_eq!(
            store.get(&p("users/u1/name")).await.unwrap(),
            Some(json!("A"))
        );
        assert!(store.exists(&p("users/u1")).await.unwrap());

        store.remove(&p("users/u1")).await.unwrap();
        assert_eq!(store.get(&p("users")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_push_keys_are_ordered() {
        let store = MemoryStore::new();
        let first = store.push(&p("notifications/u1"), json!({"n": 1})).await.unwrap();
        let second = store.push(&p("notifications/u1"), json!({"n": 2})).await.unwrap();
        assert_ne!(first, second);
        assert!(first < second);

        let all = store.get(&p("notifications/u1")).await.unwrap().unwrap();
        assert_eq!(all.as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_subscription_sees_initial_and_changes() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(&p("favorites/u1"));

        let initial = sub.next().await.unwrap();
        assert!(!initial.exists());

        store.set(&p("favorites/u1/t1"), json!("t1")).await.unwrap();
        let added = sub.next().await.unwrap();
        assert_eq!(added.value(), Some(&json!({"t1": "t1"})));

        // Unrelated writes do not wake the subscriber
        store.set(&p("users/u1"), json!({"name": "A"})).await.unwrap();
        store.remove(&p("favorites/u1/t1")).await.unwrap();
        let removed = sub.next().await.unwrap();
        assert!(!removed.exists());
    }

    #[tokio::test]
    async fn test_dropped_subscription_is_released() {
        let store = MemoryStore::new();
        let sub = store.subscribe(&p("users"));
        assert_eq!(store.subscriber_count(), 1);
        drop(sub);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_parent_subscription_sees_child_write() {
        let store = MemoryStore::with_data(json!({"users": {"u1": {"name": "A"}}}));
        let mut sub = store.subscribe(&p("users"));
        sub.next().await.unwrap();

        let mut fields = Map::new();
        fields.insert("bio".to_string(), json!("hello"));
        store.update(&p("users/u1"), fields).await.unwrap();

        let snapshot = sub.next().await.unwrap();
        assert_eq!(
            snapshot.value(),
            Some(&json!({"u1": {"name": "A", "bio": "hello"}}))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_subscribe_during_concurrent_writes() {
        let path = p("favorites/u1");
        for round in 0..200 {
            let store = MemoryStore::new();
            let writer = {
                let store = store.clone();
                tokio::spawn(async move {
                    for i in 0..20 {
                        let key = format!("favorites/u1/t{}", i);
                        store.set(&p(&key), json!(key)).await.unwrap();
                        tokio::task::yield_now().await;
                    }
                })
            };

            let mut subs = Vec::new();
            for _ in 0..15 {
                subs.push(store.subscribe(&path));
                tokio::task::yield_now().await;
            }
            writer.await.unwrap();

            let settled = store.read(&path);
            for sub in &subs {
                let latest = sub.latest().and_then(|s| s.into_value());
                assert_eq!(latest, settled, "stale subscription in round {}", round);
            }
        }
    }
}
