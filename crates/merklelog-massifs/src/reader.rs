//! Storage readers for massif and seal blobs.
//!
//! Blobs are addressed by tenant and massif index:
//!
//! ```text
//! v1/mmrs/<tenant>/0/massifs/<index:016>.log
//! v1/mmrs/<tenant>/0/massifseals/<index:016>.sth
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};

use merklelog_canonical::TenantId;
use tracing::debug;

use crate::errors::StorageError;

/// Container that holds the public logs.
pub const DEFAULT_CONTAINER: &str = "merklelogs";

/// Object path of a massif blob.
pub fn massif_path(tenant: &TenantId, massif_index: u32) -> String {
    format!("v1/mmrs/{}/0/massifs/{:016}.log", tenant, massif_index)
}

/// Object path of the seal for a massif.
pub fn seal_path(tenant: &TenantId, massif_index: u32) -> String {
    format!("v1/mmrs/{}/0/massifseals/{:016}.sth", tenant, massif_index)
}

/// Read access to a tenant's massifs and their seals.
///
/// Implementations must give up once `timeout` has elapsed and report
/// [`StorageError::Timeout`]. They never retry.
pub trait MassifReader {
    /// Fetches the blob of massif `massif_index`.
    fn get_massif(
        &self,
        tenant: &TenantId,
        massif_index: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, StorageError>;

    /// Fetches the latest seal of massif `massif_index`.
    fn get_seal(
        &self,
        tenant: &TenantId,
        massif_index: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, StorageError>;
}

/// Where the CLI reads blobs from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReaderConfig {
    /// A local mirror of the blob layout.
    Directory(PathBuf),
    /// Blob storage reachable over HTTP.
    Http {
        /// Base URL of the storage account.
        base_url: String,
        /// Container holding the logs.
        container: String,
    },
}

impl ReaderConfig {
    /// Builds the configured reader.
    pub fn open(&self) -> Result<Box<dyn MassifReader>, StorageError> {
        Ok(match self {
            ReaderConfig::Directory(root) => Box::new(DirMassifReader::new(root.clone())),
            ReaderConfig::Http {
                base_url,
                container,
            } => Box::new(HttpMassifReader::new(base_url, container)?),
        })
    }
}

/// Reads blobs from a directory laid out like the object store.
#[derive(Debug, Clone)]
pub struct DirMassifReader {
    root: PathBuf,
}

impl DirMassifReader {
    /// Creates a reader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn read(&self, path: String, timeout: Duration) -> Result<Vec<u8>, StorageError> {
        let started = Instant::now();
        let full = self.root.join(&path);
        debug!(path = %full.display(), "reading blob");
        let bytes = match fs::read(&full) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound { path })
            }
            Err(e) => return Err(e.into()),
        };
        if started.elapsed() > timeout {
            return Err(StorageError::Timeout { path });
        }
        Ok(bytes)
    }
}

impl MassifReader for DirMassifReader {
    fn get_massif(
        &self,
        tenant: &TenantId,
        massif_index: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, StorageError> {
        self.read(massif_path(tenant, massif_index), timeout)
    }

    fn get_seal(
        &self,
        tenant: &TenantId,
        massif_index: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, StorageError> {
        self.read(seal_path(tenant, massif_index), timeout)
    }
}

/// Reads blobs over HTTP with a blocking client.
#[derive(Debug, Clone)]
pub struct HttpMassifReader {
    client: reqwest::blocking::Client,
    base_url: String,
    container: String,
}

impl HttpMassifReader {
    /// Creates a reader for `<base_url>/<container>/<path>`.
    pub fn new(base_url: &str, container: &str) -> Result<Self, StorageError> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .map_err(|e| StorageError::Http {
                path: base_url.to_string(),
                reason: format!("failed to create client: {}", e),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            container: container.trim_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.container, path)
    }

    fn fetch(&self, path: String, timeout: Duration) -> Result<Vec<u8>, StorageError> {
        let url = self.url(&path);
        debug!(%url, "fetching blob");
        let response = self
            .client
            .get(&url)
            .timeout(timeout)
            .send()
            .map_err(|e| transport_error(path.clone(), e))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(StorageError::NotFound { path });
        }
        if !status.is_success() {
            return Err(StorageError::Http {
                path,
                reason: format!("status {}", status),
            });
        }
        let body = response
            .bytes()
            .map_err(|e| transport_error(path, e))?;
        Ok(body.to_vec())
    }
}

fn transport_error(path: String, e: reqwest::Error) -> StorageError {
    if e.is_timeout() {
        StorageError::Timeout { path }
    } else {
        StorageError::Http {
            path,
            reason: e.to_string(),
        }
    }
}

impl MassifReader for HttpMassifReader {
    fn get_massif(
        &self,
        tenant: &TenantId,
        massif_index: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, StorageError> {
        self.fetch(massif_path(tenant, massif_index), timeout)
    }

    fn get_seal(
        &self,
        tenant: &TenantId,
        massif_index: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, StorageError> {
        self.fetch(seal_path(tenant, massif_index), timeout)
    }
}

/// In-memory blob store. Counts every fetch and can simulate latency.
#[derive(Debug, Default)]
pub struct MemoryMassifStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
    fetches: AtomicUsize,
    latency: Option<Duration>,
}

impl MemoryMassifStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every fetch takes `latency`; fetches whose timeout is shorter fail.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Stores a massif blob.
    pub fn put_massif(&self, tenant: &TenantId, massif_index: u32, blob: Vec<u8>) {
        self.put(massif_path(tenant, massif_index), blob);
    }

    /// Stores a seal blob.
    pub fn put_seal(&self, tenant: &TenantId, massif_index: u32, blob: Vec<u8>) {
        self.put(seal_path(tenant, massif_index), blob);
    }

    /// Number of fetches served or attempted so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Writes every stored blob under `root` using the object layout.
    pub fn export(&self, root: &std::path::Path) -> Result<(), StorageError> {
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        for (path, blob) in blobs.iter() {
            let full = root.join(path);
            if let Some(parent) = full.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(full, blob)?;
        }
        Ok(())
    }

    fn put(&self, path: String, blob: Vec<u8>) {
        let mut blobs = self.blobs.write().unwrap_or_else(|e| e.into_inner());
        blobs.insert(path, blob);
    }

    fn fetch(&self, path: String, timeout: Duration) -> Result<Vec<u8>, StorageError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if matches!(self.latency, Some(latency) if latency > timeout) {
            return Err(StorageError::Timeout { path });
        }
        let blobs = self.blobs.read().unwrap_or_else(|e| e.into_inner());
        blobs
            .get(&path)
            .cloned()
            .ok_or(StorageError::NotFound { path })
    }
}

impl MassifReader for MemoryMassifStore {
    fn get_massif(
        &self,
        tenant: &TenantId,
        massif_index: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, StorageError> {
        self.fetch(massif_path(tenant, massif_index), timeout)
    }

    fn get_seal(
        &self,
        tenant: &TenantId,
        massif_index: u32,
        timeout: Duration,
    ) -> Result<Vec<u8>, StorageError> {
        self.fetch(seal_path(tenant, massif_index), timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tenant() -> TenantId {
        TenantId::parse("tenant/6ea5cd00-c711-3649-6914-7b125928bbb4").unwrap()
    }

    #[test]
    fn paths_follow_the_object_layout() {
        assert_eq!(
            massif_path(&tenant(), 3),
            "v1/mmrs/tenant/6ea5cd00-c711-3649-6914-7b125928bbb4/0/massifs/0000000000000003.log"
        );
        assert_eq!(
            seal_path(&tenant(), 0),
            "v1/mmrs/tenant/6ea5cd00-c711-3649-6914-7b125928bbb4/0/massifseals/0000000000000000.sth"
        );
    }

    #[test]
    fn memory_store_counts_and_times_out() {
        let store = MemoryMassifStore::new();
        store.put_massif(&tenant(), 0, vec![1, 2, 3]);
        let timeout = Duration::from_secs(1);
        assert_eq!(store.get_massif(&tenant(), 0, timeout).unwrap(), vec![1, 2, 3]);
        assert!(matches!(
            store.get_seal(&tenant(), 0, timeout),
            Err(StorageError::NotFound { .. })
        ));
        assert_eq!(store.fetch_count(), 2);

        let slow = MemoryMassifStore::new().with_latency(Duration::from_secs(60));
        slow.put_massif(&tenant(), 0, vec![1]);
        assert!(matches!(
            slow.get_massif(&tenant(), 0, Duration::from_secs(30)),
            Err(StorageError::Timeout { .. })
        ));
    }

    #[test]
    fn http_reader_builds_container_urls() {
        let reader = HttpMassifReader::new("https://example.org/", "/merklelogs/").unwrap();
        assert_eq!(
            reader.url(&massif_path(&tenant(), 1)),
            "https://example.org/merklelogs/v1/mmrs/tenant/6ea5cd00-c711-3649-6914-7b125928bbb4/0/massifs/0000000000000001.log"
        );
    }
}
