//! Change subscriptions
//!
//! A [`Subscription`] yields a [`Snapshot`] of its path whenever the value
//! there changes, starting with the current value. Dropping it unsubscribes.

use crate::path::StorePath;
use crate::Result;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The value at a path at one point in time
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    path: StorePath,
    value: Option<Value>,
}

impl Snapshot {
    pub fn new(path: StorePath, value: Option<Value>) -> Self {
        Snapshot { path, value }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&Value> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<Value> {
        self.value
    }

    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.value
            .as_ref()
            .map(|v| serde_json::from_value(v.clone()))
            .transpose()
            .map_err(Into::into)
    }
}

pub(crate) type SnapshotSender = watch::Sender<Option<Snapshot>>;

/// Publish `snapshot` unless subscribers already hold the same value
pub(crate) fn publish(tx: &SnapshotSender, snapshot: Snapshot) -> bool {
    tx.send_if_modified(|current| {
        if current.as_ref() == Some(&snapshot) {
            false
        } else {
            *current = Some(snapshot);
            true
        }
    })
}

/// Live view of one path
pub struct Subscription {
    path: StorePath,
    rx: watch::Receiver<Option<Snapshot>>,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub(crate) fn new(
        path: StorePath,
        rx: watch::Receiver<Option<Snapshot>>,
        task: Option<JoinHandle<()>>,
    ) -> Self {
        Subscription { path, rx, task }
    }

    pub fn path(&self) -> &StorePath {
        &self.path
    }

    /// Last delivered snapshot, if the first value has arrived
    pub fn latest(&self) -> Option<Snapshot> {
        self.rx.borrow().clone()
    }

    /// Wait for the next change
    ///
    /// Returns `None` once the store side has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(snapshot) = self.rx.borrow_and_update().clone() {
                return Some(snapshot);
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("path", &self.path)
            .field("polling", &self.task.is_some())
            .finish()
    }
}
