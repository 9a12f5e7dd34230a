use anyhow::Context;
use slatedb::Db;
use slatedb::object_store::local::LocalFileSystem;
use slatedb::object_store::path::Path;
use std::sync::Arc;
use tracing::info;

/// Persistent key/value store backed by SlateDB on a local filesystem.
/// In production this would use S3/R2/MinIO via the `object_store` crate.
///
/// Values are opaque bytes: the store never inspects, re-encodes, or
/// truncates what it is given, which is what lets third-party payloads
/// round-trip exactly.
#[derive(Clone)]
pub struct StateStore {
    db: Db,
}

impl StateStore {
    /// Open (or create) a state store rooted at `path` on the local filesystem.
    pub async fn new(path: &str) -> anyhow::Result<Self> {
        info!("Opening state store at {}", path);

        // The object store refuses to open a missing directory
        std::fs::create_dir_all(path)
            .with_context(|| format!("failed to create data directory {path}"))?;

        let object_store = Arc::new(
            LocalFileSystem::new_with_prefix(path).context("failed to create local object store")?,
        );
        let db = Db::open(Path::from("/"), object_store)
            .await
            .context("failed to open SlateDB")?;
        Ok(Self { db })
    }

    /// Store a value under the given key.
    pub async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        self.db
            .put(key.as_bytes(), value)
            .await
            .context("state store put failed")?;
        Ok(())
    }

    /// Retrieve the value for a key, or `None` if it does not exist.
    pub async fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let value = self
            .db
            .get(key.as_bytes())
            .await
            .context("state store get failed")?;
        Ok(value.map(|bytes| bytes.to_vec()))
    }

    /// Delete a key from the store.
    pub async fn delete(&self, key: &str) -> anyhow::Result<()> {
        self.db
            .delete(key.as_bytes())
            .await
            .context("state store delete failed")?;
        Ok(())
    }

    /// List all key-value pairs whose keys start with `prefix`, as
    /// `(key_string, raw_bytes)`.
    pub async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let mut results = Vec::new();
        let mut iter = self
            .db
            .scan_prefix(prefix.as_bytes())
            .await
            .context("state store scan failed")?;

        while let Ok(Some(kv)) = iter.next().await {
            let key = String::from_utf8_lossy(&kv.key).to_string();
            results.push((key, kv.value.to_vec()));
        }
        Ok(results)
    }

    /// Gracefully close the state store.
    pub async fn close(self) -> anyhow::Result<()> {
        info!("Closing state store");
        self.db.close().await.context("state store close failed")
    }
}
