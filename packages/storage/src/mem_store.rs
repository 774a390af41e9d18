use std::path::{Path, PathBuf};

use crate::codec::Codec;
use crate::error::Result;
use crate::value::Value;

/// A whole-file, whole-map persisted side-file: load the entire encoded map
/// into memory on open, mutate it freely, `flush` to rewrite it in full.
///
/// This is the shape a `KVStore`'s index side-file needs (small, read once,
/// rewritten wholesale on every `commit`) — generalized from a dict-like
/// store that happened to always hold exactly `{config, free_index, index}`
/// into a `Value::Map` of arbitrary top-level keys.
pub struct MemStore {
    path: PathBuf,
    codec: Codec,
    data: Vec<(String, Value)>,
}

impl MemStore {
    /// Open (or, if absent, create empty) the side-file at `path`.
    pub fn open(path: impl Into<PathBuf>, codec: Codec) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let bytes = std::fs::read(&path)?;
            if bytes.is_empty() {
                Vec::new()
            } else {
                match codec.decode(&bytes)? {
                    Value::Map(pairs) => pairs,
                    _ => return Err(crate::error::StorageError::BadFormat(
                        "side-file root is not a map".into(),
                    )),
                }
            }
        } else {
            Vec::new()
        };
        Ok(MemStore { path, codec, data })
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or overwrite a top-level key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.data.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.data.push((key, value));
        }
    }

    /// Merge several top-level keys at once, same semantics as `set` per key.
    pub fn update(&mut self, pairs: impl IntoIterator<Item = (String, Value)>) {
        for (key, value) in pairs {
            self.set(key, value);
        }
    }

    /// Rewrite the side-file with the current in-memory contents.
    pub fn flush(&self) -> Result<()> {
        let bytes = self.codec.encode(&Value::Map(self.data.clone()));
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
