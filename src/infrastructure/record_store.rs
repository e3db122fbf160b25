use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::domain::errors::DomainError;

/// The durable collections, in lock-acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Products,
    Inventory,
    Orders,
    Sequences,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Products,
        Collection::Inventory,
        Collection::Orders,
        Collection::Sequences,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Inventory => "inventory",
            Collection::Orders => "orders",
            Collection::Sequences => "sequences",
        }
    }

    fn file_name(self) -> String {
        format!("{}.json", self.name())
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection '{collection}' does not exist yet")]
    Missing { collection: Collection },
    #[error("collection '{collection}' is corrupt: {source}")]
    Corrupt {
        collection: Collection,
        #[source]
        source: serde_json::Error,
    },
    #[error("{operation} failed for collection '{collection}': {source}")]
    Io {
        collection: Collection,
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },
}

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<StoreError> for DomainError {
    fn from(e: StoreError) -> Self {
        log::error!("record store: {e}");
        match e {
            StoreError::Missing { collection }
            | StoreError::Corrupt { collection, .. }
            | StoreError::Io { collection, .. } => {
                DomainError::StorageUnavailable(format!("collection '{collection}'"))
            }
        }
    }
}

// ── Store ────────────────────────────────────────────────────────────────────

/// File-backed collections, one JSON array per file.
///
/// Every read-modify-write must go through [`RecordStore::lock`]; the guard
/// holds the collection's mutex until it is dropped, so concurrent mutations
/// of the same collection apply one after another. Operations spanning
/// several collections take their guards in [`Collection`] order.
pub struct RecordStore {
    dir: PathBuf,
    locks: HashMap<Collection, Mutex<()>>,
}

impl RecordStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let locks = Collection::ALL
            .into_iter()
            .map(|c| (c, Mutex::new(())))
            .collect();
        Self {
            dir: dir.into(),
            locks,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn lock(&self, collection: Collection) -> CollectionGuard<'_> {
        let permit = self.locks[&collection].lock().await;
        CollectionGuard {
            store: self,
            collection,
            _permit: permit,
        }
    }

    /// One-shot read under the collection lock.
    pub async fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, StoreError> {
        self.lock(collection).await.load().await
    }

    /// One-shot read that treats a missing file as an empty collection.
    pub async fn load_or_default<T: DeserializeOwned>(
        &self,
        collection: Collection,
    ) -> Result<Vec<T>, StoreError> {
        self.lock(collection).await.load_or_default().await
    }

    /// One-shot replace under the collection lock.
    pub async fn save<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> Result<(), StoreError> {
        self.lock(collection).await.save(records).await
    }

    fn path(&self, collection: Collection) -> PathBuf {
        self.dir.join(collection.file_name())
    }

    async fn read<T: DeserializeOwned>(&self, collection: Collection) -> Result<Vec<T>, StoreError> {
        let bytes = match tokio::fs::read(self.path(collection)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::Missing { collection })
            }
            Err(source) => {
                return Err(StoreError::Io {
                    collection,
                    operation: "load",
                    source,
                })
            }
        };
        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt { collection, source })
    }

    async fn write<T: Serialize>(
        &self,
        collection: Collection,
        records: &[T],
    ) -> Result<(), StoreError> {
        let io_err = |operation: &'static str| {
            move |source: std::io::Error| StoreError::Io {
                collection,
                operation,
                source,
            }
        };

        let bytes = serde_json::to_vec_pretty(records).map_err(|e| StoreError::Io {
            collection,
            operation: "serialise",
            source: e.into(),
        })?;

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(io_err("create_dir"))?;

        // Write beside the target, then rename over it, so readers only ever
        // see a complete array.
        let target = self.path(collection);
        let tmp = self
            .dir
            .join(format!(".{}.tmp.{}", collection.file_name(), Uuid::new_v4()));
        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(&bytes).await?;
            file.sync_all().await
        }
        .await;
        if let Err(source) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err("save")(source));
        }
        if let Err(source) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(io_err("rename")(source));
        }
        Ok(())
    }
}

/// Exclusive access to one collection for the guard's lifetime.
pub struct CollectionGuard<'a> {
    store: &'a RecordStore,
    collection: Collection,
    _permit: MutexGuard<'a, ()>,
}

impl CollectionGuard<'_> {
    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub async fn load<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        self.store.read(self.collection).await
    }

    pub async fn load_or_default<T: DeserializeOwned>(&self) -> Result<Vec<T>, StoreError> {
        match self.store.read(self.collection).await {
            Err(StoreError::Missing { .. }) => Ok(Vec::new()),
            other => other,
        }
    }

    pub async fn save<T: Serialize>(&self, records: &[T]) -> Result<(), StoreError> {
        self.store.write(self.collection, records).await
    }
}
