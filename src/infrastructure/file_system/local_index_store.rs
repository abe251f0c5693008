use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::ports::IndexStore;
use crate::application::ports::index_store::IndexStoreError;
use crate::domain::entities::VectorIndex;
use crate::domain::value_objects::IndexChecksum;

pub const SNAPSHOT_FILE: &str = "index.snapshot";
const SNAPSHOT_FORMAT: &str = "manualqa-index";
const SNAPSHOT_VERSION: u32 = 1;

/// First line of a snapshot file. The JSON payload follows it.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotHeader {
    format: String,
    version: u32,
    checksum: String,
    payload_len: usize,
}

/// Stores each index as a single checksummed snapshot file inside its
/// location directory.
#[derive(Debug, Clone, Default)]
pub struct LocalIndexStore;

impl LocalIndexStore {
    pub fn new() -> Self {
        Self
    }

    pub fn snapshot_path(location: &Path) -> PathBuf {
        location.join(SNAPSHOT_FILE)
    }

    async fn write_atomically(target: &Path, bytes: &[u8]) -> io::Result<()> {
        let dir = target.parent().unwrap_or(Path::new("."));
        let tmp_path = dir.join(format!(".{SNAPSHOT_FILE}.{}.tmp", Uuid::new_v4()));

        let result = async {
            let mut file = fs::File::create(&tmp_path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            fs::rename(&tmp_path, target).await
        }
        .await;

        if result.is_err() {
            let _ = fs::remove_file(&tmp_path).await;
        }
        result
    }
}

fn corrupt(location: &Path, reason: impl Into<String>) -> IndexStoreError {
    IndexStoreError::Corrupt {
        location: location.to_path_buf(),
        reason: reason.into(),
    }
}

fn encode(index: &VectorIndex) -> Result<Vec<u8>, IndexStoreError> {
    let non_finite = index
        .entries()
        .iter()
        .any(|e| e.vector.iter().any(|v| !v.is_finite()));
    if non_finite {
        return Err(IndexStoreError::Write(io::Error::new(
            ErrorKind::InvalidData,
            "index contains non-finite vector components",
        )));
    }

    let payload = serde_json::to_vec(index)
        .map_err(|e| IndexStoreError::Write(io::Error::other(e)))?;
    let header = SnapshotHeader {
        format: SNAPSHOT_FORMAT.to_string(),
        version: SNAPSHOT_VERSION,
        checksum: IndexChecksum::of(&payload).as_str().to_string(),
        payload_len: payload.len(),
    };

    let mut bytes = serde_json::to_vec(&header)
        .map_err(|e| IndexStoreError::Write(io::Error::other(e)))?;
    bytes.push(b'\n');
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

fn decode(location: &Path, raw: &[u8]) -> Result<VectorIndex, IndexStoreError> {
    let newline = raw
        .iter()
        .position(|b| *b == b'\n')
        .ok_or_else(|| corrupt(location, "missing snapshot header"))?;
    let (header_bytes, rest) = raw.split_at(newline);
    let payload = &rest[1..];

    let header: SnapshotHeader = serde_json::from_slice(header_bytes)
        .map_err(|e| corrupt(location, format!("unreadable header: {e}")))?;

    if header.format != SNAPSHOT_FORMAT {
        return Err(corrupt(
            location,
            format!("unknown snapshot format {:?}", header.format),
        ));
    }
    if header.version != SNAPSHOT_VERSION {
        return Err(corrupt(
            location,
            format!(
                "unsupported snapshot version {} (expected {SNAPSHOT_VERSION})",
                header.version
            ),
        ));
    }
    if header.payload_len != payload.len() {
        return Err(corrupt(
            location,
            format!(
                "payload is {} bytes, header says {}",
                payload.len(),
                header.payload_len
            ),
        ));
    }

    let checksum = IndexChecksum::parse(&header.checksum)
        .map_err(|e| corrupt(location, format!("invalid checksum: {e}")))?;
    if !checksum.verifies(payload) {
        return Err(corrupt(location, "checksum mismatch"));
    }

    let index: VectorIndex = serde_json::from_slice(payload)
        .map_err(|e| corrupt(location, format!("unreadable payload: {e}")))?;
    index
        .validate()
        .map_err(|e| corrupt(location, e.to_string()))?;

    Ok(index)
}

#[async_trait]
impl IndexStore for LocalIndexStore {
    async fn save(&self, index: &VectorIndex, location: &Path) -> Result<(), IndexStoreError> {
        let bytes = encode(index)?;

        fs::create_dir_all(location)
            .await
            .map_err(IndexStoreError::Write)?;
        let target = Self::snapshot_path(location);
        Self::write_atomically(&target, &bytes)
            .await
            .map_err(IndexStoreError::Write)?;

        info!(
            location = %location.display(),
            entries = index.len(),
            bytes = bytes.len(),
            "saved index snapshot"
        );
        Ok(())
    }

    async fn load(&self, location: &Path) -> Result<VectorIndex, IndexStoreError> {
        let path = Self::snapshot_path(location);

        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(IndexStoreError::NotFound(location.to_path_buf()));
            }
            Err(e) => return Err(IndexStoreError::Read(e)),
        };

        let index = decode(location, &raw).inspect_err(|e| {
            warn!(location = %location.display(), error = %e, "rejected index snapshot");
        })?;

        debug!(
            location = %location.display(),
            entries = index.len(),
            dimension = index.dimension(),
            "loaded index snapshot"
        );
        Ok(index)
    }

    async fn exists(&self, location: &Path) -> bool {
        fs::try_exists(Self::snapshot_path(location))
            .await
            .unwrap_or(false)
    }
}
