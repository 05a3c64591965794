//! On-disk artifacts for a [`DocumentStore`](crate::DocumentStore).
//!
//! The index artifact is a little-endian binary blob:
//!
//! ```text
//! "NIX1" | version u32 | dimension u32 | count u64 | documents crc32 u32
//!        | count*dimension f32 | crc32 u32
//! ```
//!
//! The trailing checksum covers every byte before it. The header also pins
//! the CRC32 of the documents artifact saved alongside, so a pair mixed
//! from two different saves fails to load. Documents are stored as
//! versioned JSON. Both artifacts are written to a temp file and renamed
//! into place.

use crate::error::{Result, VectorStoreError};
use crate::flat_index::VectorIndex;
use serde::{Deserialize, Serialize};
use std::path::Path;

const INDEX_MAGIC: &[u8; 4] = b"NIX1";
const INDEX_FORMAT_VERSION: u32 = 2;
const HEADER_LEN: usize = 4 + 4 + 4 + 8 + 4;
const CRC_LEN: usize = 4;

pub const DOCUMENTS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedDocuments {
    schema_version: u32,
    documents: Vec<String>,
}

#[derive(Debug)]
pub(crate) struct DecodedIndex {
    pub index: VectorIndex,
    pub documents_crc: u32,
}

pub(crate) fn documents_checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

pub(crate) fn encode_index(index: &VectorIndex, documents_crc: u32) -> Result<Vec<u8>> {
    let values = index.as_slice();
    let dimension = u32::try_from(index.dimension()).map_err(|_| {
        VectorStoreError::InvalidArgument(format!(
            "dimension {} does not fit the index format",
            index.dimension()
        ))
    })?;

    let mut out = Vec::with_capacity(HEADER_LEN + values.len() * 4 + CRC_LEN);
    out.extend_from_slice(INDEX_MAGIC);
    out.extend_from_slice(&INDEX_FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&dimension.to_le_bytes());
    out.extend_from_slice(&(index.len() as u64).to_le_bytes());
    out.extend_from_slice(&documents_crc.to_le_bytes());
    for value in values {
        out.extend_from_slice(&value.to_le_bytes());
    }
    let crc = crc32fast::hash(&out);
    out.extend_from_slice(&crc.to_le_bytes());
    Ok(out)
}

pub(crate) fn decode_index(bytes: &[u8]) -> Result<DecodedIndex> {
    if bytes.len() < HEADER_LEN + CRC_LEN {
        return Err(corrupt("index artifact is truncated"));
    }
    if &bytes[0..4] != INDEX_MAGIC {
        return Err(corrupt("index artifact has an unknown magic"));
    }

    let (payload, footer) = bytes.split_at(bytes.len() - CRC_LEN);
    let stored_crc = u32::from_le_bytes(read_array(footer)?);
    let computed_crc = crc32fast::hash(payload);
    if stored_crc != computed_crc {
        return Err(corrupt(&format!(
            "index checksum mismatch: expected {stored_crc:#010x}, got {computed_crc:#010x}"
        )));
    }

    let version = u32::from_le_bytes(read_array(&payload[4..8])?);
    if version != INDEX_FORMAT_VERSION {
        return Err(corrupt(&format!(
            "unsupported index format version {version} (expected {INDEX_FORMAT_VERSION})"
        )));
    }
    let dimension = u32::from_le_bytes(read_array(&payload[8..12])?) as usize;
    let count = u64::from_le_bytes(read_array(&payload[12..20])?);
    let documents_crc = u32::from_le_bytes(read_array(&payload[20..24])?);

    let body = &payload[HEADER_LEN..];
    let expected_len = usize::try_from(count)
        .ok()
        .and_then(|count| count.checked_mul(dimension))
        .and_then(|values| values.checked_mul(4));
    if expected_len != Some(body.len()) {
        return Err(corrupt(&format!(
            "index body is {} bytes, header declares {count} vectors of dimension {dimension}",
            body.len()
        )));
    }

    let mut values = Vec::with_capacity(body.len() / 4);
    for chunk in body.chunks_exact(4) {
        let value = f32::from_le_bytes(read_array(chunk)?);
        if !value.is_finite() {
            return Err(corrupt("index contains a non-finite value"));
        }
        values.push(value);
    }
    let index = VectorIndex::from_rows(dimension, values).map_err(|err| match err {
        VectorStoreError::ZeroDimension => corrupt("index artifact records dimension 0"),
        other => other,
    })?;
    Ok(DecodedIndex {
        index,
        documents_crc,
    })
}

pub(crate) fn encode_documents(documents: &[String]) -> Result<Vec<u8>> {
    let persisted = PersistedDocuments {
        schema_version: DOCUMENTS_SCHEMA_VERSION,
        documents: documents.to_vec(),
    };
    Ok(serde_json::to_vec_pretty(&persisted)?)
}

pub(crate) fn decode_documents(bytes: &[u8]) -> Result<Vec<String>> {
    let persisted: PersistedDocuments = serde_json::from_slice(bytes)
        .map_err(|err| corrupt(&format!("documents artifact is not valid JSON: {err}")))?;
    if persisted.schema_version != DOCUMENTS_SCHEMA_VERSION {
        return Err(corrupt(&format!(
            "unsupported documents schema_version {} (expected {DOCUMENTS_SCHEMA_VERSION})",
            persisted.schema_version
        )));
    }
    Ok(persisted.documents)
}

/// Read a whole artifact, reporting a missing file as `NotFound`.
pub(crate) async fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(bytes),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Err(
            VectorStoreError::NotFound(format!("artifact {}", path.display())),
        ),
        Err(err) => Err(err.into()),
    }
}

pub(crate) async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);
    tokio::fs::write(&tmp, bytes).await?;
    if let Err(err) = tokio::fs::rename(&tmp, path).await {
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(err.into());
    }
    Ok(())
}

fn read_array<const N: usize>(bytes: &[u8]) -> Result<[u8; N]> {
    bytes
        .try_into()
        .map_err(|_| corrupt("index artifact field has the wrong width"))
}

fn corrupt(message: &str) -> VectorStoreError {
    VectorStoreError::CorruptData(message.to_string())
}
