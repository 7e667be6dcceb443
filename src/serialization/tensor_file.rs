//! `SafeTensors`-style named-tensor container.

use crate::error::{Result, TrazadorError};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

const METADATA_KEY: &str = "__metadata__";

/// Metadata for a single tensor.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TensorMetadata {
    /// Data type; only "F32" is supported.
    dtype: String,
    /// Tensor shape.
    shape: Vec<usize>,
    /// `[start, end)` byte range in the raw data section.
    data_offsets: [usize; 2],
}

#[derive(Debug, Clone)]
struct TensorEntry {
    shape: Vec<usize>,
    values: Vec<f32>,
}

/// An in-memory collection of named F32 tensors plus a string metadata
/// map, loadable from and savable to the on-disk format described in the
/// module docs.
///
/// `BTreeMap` storage keeps the JSON header deterministic (sorted keys).
#[derive(Debug, Clone, Default)]
pub struct TensorFile {
    tensors: BTreeMap<String, TensorEntry>,
    metadata: BTreeMap<String, String>,
}

impl TensorFile {
    /// Creates an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a 2-D tensor under `name`.
    pub fn add_matrix(&mut self, name: &str, matrix: &Matrix<f32>) {
        let (rows, cols) = matrix.shape();
        self.tensors.insert(
            name.to_string(),
            TensorEntry {
                shape: vec![rows, cols],
                values: matrix.as_slice().to_vec(),
            },
        );
    }

    /// Sets one user-metadata entry.
    pub fn set_metadata(&mut self, key: &str, value: String) {
        self.metadata.insert(key.to_string(), value);
    }

    /// Looks up one user-metadata entry.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Retrieves a named tensor as a matrix.
    ///
    /// # Errors
    ///
    /// `FormatError` if the tensor is absent or not 2-D.
    pub fn matrix(&self, name: &str) -> Result<Matrix<f32>> {
        let entry = self
            .tensors
            .get(name)
            .ok_or_else(|| TrazadorError::format(format!("tensor '{name}' not found")))?;
        let &[rows, cols] = entry.shape.as_slice() else {
            return Err(TrazadorError::format(format!(
                "tensor '{name}' has rank {}, expected 2",
                entry.shape.len()
            )));
        };
        Ok(Matrix::from_vec(rows, cols, entry.values.clone())?)
    }

    /// Serializes the container to `path`.
    ///
    /// # Errors
    ///
    /// Propagates I/O and JSON failures.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut header: BTreeMap<String, serde_json::Value> = BTreeMap::new();
        let mut offset = 0usize;
        for (name, entry) in &self.tensors {
            let nbytes = entry.values.len() * 4;
            let meta = TensorMetadata {
                dtype: "F32".to_string(),
                shape: entry.shape.clone(),
                data_offsets: [offset, offset + nbytes],
            };
            header.insert(name.clone(), serde_json::to_value(&meta)?);
            offset += nbytes;
        }
        if !self.metadata.is_empty() {
            header.insert(
                METADATA_KEY.to_string(),
                serde_json::to_value(&self.metadata)?,
            );
        }

        let header_json = serde_json::to_vec(&header)?;
        let mut bytes = Vec::with_capacity(8 + header_json.len() + offset);
        bytes.extend_from_slice(&(header_json.len() as u64).to_le_bytes());
        bytes.extend_from_slice(&header_json);
        for entry in self.tensors.values() {
            for v in &entry.values {
                bytes.extend_from_slice(&v.to_le_bytes());
            }
        }
        fs::write(path, bytes)?;
        Ok(())
    }

    /// Loads a container from `path`.
    ///
    /// # Errors
    ///
    /// `Io` if the file is missing, `FormatError` if the header or data
    /// section is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)?;
        if bytes.len() < 8 {
            return Err(TrazadorError::format("file shorter than its header"));
        }
        let header_len = u64::from_le_bytes(
            bytes[..8]
                .try_into()
                .map_err(|_| TrazadorError::format("unreadable header length"))?,
        ) as usize;
        let data_start = 8 + header_len;
        if bytes.len() < data_start {
            return Err(TrazadorError::format("truncated metadata section"));
        }

        let header: BTreeMap<String, serde_json::Value> =
            serde_json::from_slice(&bytes[8..data_start])?;
        let data = &bytes[data_start..];

        let mut tensors = BTreeMap::new();
        let mut metadata = BTreeMap::new();
        for (name, value) in header {
            if name == METADATA_KEY {
                metadata = serde_json::from_value(value)?;
                continue;
            }
            let meta: TensorMetadata = serde_json::from_value(value)?;
            if meta.dtype != "F32" {
                return Err(TrazadorError::format(format!(
                    "tensor '{name}' has dtype {}, only F32 is supported",
                    meta.dtype
                )));
            }
            let [start, end] = meta.data_offsets;
            if end < start || end > data.len() || (end - start) % 4 != 0 {
                return Err(TrazadorError::format(format!(
                    "tensor '{name}' has invalid data offsets [{start}, {end})"
                )));
            }
            let expected: usize = meta.shape.iter().product();
            let count = (end - start) / 4;
            if count != expected {
                return Err(TrazadorError::format(format!(
                    "tensor '{name}' holds {count} values but its shape implies {expected}"
                )));
            }
            let values: Vec<f32> = data[start..end]
                .chunks_exact(4)
                .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
                .collect();
            tensors.insert(
                name,
                TensorEntry {
                    shape: meta.shape,
                    values,
                },
            );
        }

        Ok(Self { tensors, metadata })
    }
}
