use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::cache::LRUCache;
use crate::codec::Codec;
use crate::error::{Result, StorageError};
use crate::free_index::{FreeIndex, Placement};
use crate::mem_store::MemStore;
use crate::value::Value;

const DATA_FILE_NAME: &str = "data.rvdata";
const INDEX_FILE_NAME: &str = "index.rvidx";
const DEFAULT_CACHE_CAPACITY: usize = 25;

/// Disk-persisted key-value store: a flat append/reuse data file plus a
/// side-file holding `{config, free_index, index}`, an in-process free-space
/// index, and an LRU read cache in front of it.
///
/// The side-file's `index` map is the sole source of truth for which byte
/// ranges in the data file are live; dead regions are tracked by
/// `free_index` and, where there's room for a valid record header, marked
/// with a filler record on disk for forensic readability — but correctness
/// never depends on scanning the data file for those markers.
pub struct KVStore {
    doc_path: PathBuf,
    codec: Codec,
    file: File,
    free_index: FreeIndex,
    cache: LRUCache<Value>,
    index: IndexMap<String, (u64, u64)>,
    mem: MemStore,
}

impl KVStore {
    /// Open (creating if absent) the store rooted at `doc_path`.
    pub fn open(doc_path: impl Into<PathBuf>, codec: Codec) -> Result<Self> {
        Self::open_with_cache(doc_path, codec, DEFAULT_CACHE_CAPACITY)
    }

    pub fn open_with_cache(
        doc_path: impl Into<PathBuf>,
        codec: Codec,
        cache_capacity: usize,
    ) -> Result<Self> {
        let doc_path = doc_path.into();
        std::fs::create_dir_all(&doc_path)?;

        let data_path = doc_path.join(DATA_FILE_NAME);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&data_path)?;

        let mem = MemStore::open(doc_path.join(INDEX_FILE_NAME), codec)?;

        let free_index = match mem.get("free_index") {
            Some(Value::Map(pairs)) => {
                let map = pairs
                    .iter()
                    .filter_map(|(k, v)| v.as_int().map(|len| (k.clone(), len as u64)))
                    .collect();
                FreeIndex::from_string_map(&map)
            }
            _ => FreeIndex::new(),
        };

        let index = match mem.get("index") {
            Some(Value::Map(pairs)) => pairs
                .iter()
                .filter_map(|(k, v)| match v {
                    Value::Tuple(parts) | Value::List(parts) if parts.len() == 2 => {
                        let pos = parts[0].as_int()? as u64;
                        let len = parts[1].as_int()? as u64;
                        Some((k.clone(), (pos, len)))
                    }
                    _ => None,
                })
                .collect(),
            _ => IndexMap::new(),
        };

        Ok(KVStore {
            doc_path,
            codec,
            file,
            free_index,
            cache: LRUCache::new(cache_capacity),
            index,
            mem,
        })
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn keys(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    pub fn exists(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    fn wrap(value: Value) -> Value {
        Value::Map(vec![(String::new(), value)])
    }

    fn unwrap(value: Value) -> Result<Value> {
        match value {
            Value::Map(mut pairs) if pairs.len() == 1 && pairs[0].0.is_empty() => {
                Ok(pairs.remove(0).1)
            }
            _ => Err(StorageError::BadFormat("malformed record envelope".into())),
        }
    }

    pub fn get(&mut self, key: &str) -> Result<Option<Value>> {
        if !self.index.contains_key(key) {
            return Ok(None);
        }
        if let Some(cached) = self.cache.get(key) {
            return Ok(Some(cached.clone()));
        }
        let (position, length) = self.index[key];
        self.file.seek(SeekFrom::Start(position))?;
        let mut buf = vec![0u8; length as usize];
        self.file.read_exact(&mut buf)?;
        let value = Self::unwrap(self.codec.decode(&buf)?)?;
        self.cache.put(key.to_string(), value.clone());
        Ok(Some(value))
    }

    /// Set a single key, rewriting the side-file afterward.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        let key = key.into();
        self.update_one(&key, value)?;
        self.save_index()?;
        Ok(())
    }

    /// Set several keys in one pass, rewriting the side-file once at the end.
    pub fn add(&mut self, pairs: impl IntoIterator<Item = (String, Value)>) -> Result<()> {
        for (key, value) in pairs {
            self.update_one(&key, value)?;
        }
        self.save_index()?;
        Ok(())
    }

    fn update_one(&mut self, key: &str, value: Value) -> Result<()> {
        let encoded = self.codec.encode(&Self::wrap(value.clone()));
        let encoded_len = encoded.len() as u64;

        if let Some(&(position, existing_len)) = self.index.get(key) {
            if encoded_len <= existing_len {
                self.file.seek(SeekFrom::Start(position))?;
                self.file.write_all(&encoded)?;
                self.index.insert(key.to_string(), (position, encoded_len));

                let remainder = existing_len - encoded_len;
                if remainder > 0 {
                    match Value::filler(remainder as u32) {
                        Some(filler) => {
                            self.free_index.add(position + encoded_len, remainder);
                            let filler_bytes = self.codec.encode(&filler);
                            self.file.seek(SeekFrom::Start(position + encoded_len))?;
                            self.file.write_all(&filler_bytes)?;
                        }
                        // Remainder too small to host a filler record's own
                        // header: leave it as unaddressable slack inside the
                        // live record rather than writing a corrupt filler.
                        None => {
                            self.index
                                .insert(key.to_string(), (position, existing_len));
                        }
                    }
                }
            } else {
                self.remove_one(key)?;
                self.write_new(key, &encoded)?;
            }
        } else {
            self.write_new(key, &encoded)?;
        }

        self.cache.put(key.to_string(), value);
        Ok(())
    }

    fn write_new(&mut self, key: &str, encoded: &[u8]) -> Result<()> {
        let encoded_len = encoded.len() as u64;
        let position = match self.free_index.find_space(encoded_len) {
            Placement::At(pos) => pos,
            Placement::Eof => self.file.seek(SeekFrom::End(0))?,
        };
        self.file.seek(SeekFrom::Start(position))?;
        self.file.write_all(encoded)?;
        self.index.insert(key.to_string(), (position, encoded_len));
        Ok(())
    }

    /// Reclaim one key's span without touching the side-file — callers that
    /// want the side-file persisted call `commit`/`save_index` themselves.
    fn remove_one(&mut self, key: &str) -> Result<()> {
        let Some((position, length)) = self.index.shift_remove(key) else {
            return Ok(());
        };
        self.cache.delete(key);
        self.free_index.add(position, length);
        if let Some(filler) = Value::filler(length as u32) {
            let filler_bytes = self.codec.encode(&filler);
            self.file.seek(SeekFrom::Start(position))?;
            self.file.write_all(&filler_bytes)?;
        }
        Ok(())
    }

    /// Delete one or more keys. Returns whether every given key was present.
    pub fn delete(&mut self, keys: &[impl AsRef<str>]) -> Result<bool> {
        let mut all_present = true;
        for key in keys {
            let key = key.as_ref();
            if self.index.contains_key(key) {
                self.remove_one(key)?;
            } else {
                all_present = false;
            }
        }
        self.save_index()?;
        Ok(all_present)
    }

    /// Rewrite the data file with only live records, eliminating every
    /// free/filler span. Returns the full decoded key/value set.
    pub fn compact(&mut self) -> Result<Vec<(String, Value)>> {
        let compact_path = self.doc_path.join("compact.rvdata");
        let mut new_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&compact_path)?;

        let mut new_index = IndexMap::new();
        let mut result = Vec::with_capacity(self.index.len());

        for (key, &(old_position, length)) in self.index.iter() {
            self.file.seek(SeekFrom::Start(old_position))?;
            let mut buf = vec![0u8; length as usize];
            self.file.read_exact(&mut buf)?;
            let value = Self::unwrap(self.codec.decode(&buf)?)?;

            let new_position = new_file.stream_position()?;
            new_file.write_all(&buf)?;
            new_index.insert(key.clone(), (new_position, length));
            result.push((key.clone(), value));
        }

        new_file.flush()?;
        drop(new_file);
        let data_path = self.doc_path.join(DATA_FILE_NAME);
        std::fs::rename(&compact_path, &data_path)?;
        self.file = OpenOptions::new().read(true).write(true).open(&data_path)?;

        self.index = new_index;
        self.free_index.clear();
        self.save_index()?;

        Ok(result)
    }

    fn save_index(&mut self) -> Result<()> {
        let index_value = Value::Map(
            self.index
                .iter()
                .map(|(k, &(pos, len))| {
                    (k.clone(), Value::Tuple(vec![Value::Int(pos as i64), Value::Int(len as i64)]))
                })
                .collect(),
        );
        let free_index_value = Value::Map(
            self.free_index
                .to_string_map()
                .into_iter()
                .map(|(k, v)| (k, Value::Int(v as i64)))
                .collect(),
        );
        let config_value = self
            .mem
            .get("config")
            .cloned()
            .unwrap_or_else(|| Value::Map(vec![("data_encoding".into(), Value::Str(self.codec.as_str().into()))]));

        self.mem.update([
            ("config".to_string(), config_value),
            ("free_index".to_string(), free_index_value),
            ("index".to_string(), index_value),
        ]);
        self.mem.flush()
    }

    /// Persist the in-memory index and free-space map to the side-file.
    pub fn commit(&mut self) -> Result<()> {
        self.save_index()
    }

    /// Set a top-level value in the side-file's `config` map (e.g. `vec_model`).
    pub fn set_config(&mut self, key: impl Into<String>, value: Value) -> Result<()> {
        let mut config = match self.mem.get("config") {
            Some(Value::Map(pairs)) => pairs.clone(),
            _ => Vec::new(),
        };
        let key = key.into();
        if let Some(slot) = config.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            config.push((key, value));
        }
        self.mem.set("config", Value::Map(config));
        self.save_index()
    }

    pub fn get_config(&self, key: &str) -> Option<&Value> {
        self.mem.get("config")?.map_get(key)
    }

    /// Write the full, compacted data set to a standalone JSON file.
    pub fn to_json(&mut self, output_path: impl AsRef<Path>) -> Result<()> {
        let data = self.compact()?;
        let value = Value::Map(data);
        let bytes = Codec::Json.encode(&value);
        std::fs::write(output_path, bytes)?;
        Ok(())
    }

    /// Load key/value pairs from a JSON file produced by `to_json` (or any
    /// JSON object) into this store.
    pub fn to_db(&mut self, json_path: impl AsRef<Path>) -> Result<()> {
        let bytes = std::fs::read(json_path)?;
        let decoded = Codec::Json.decode(&bytes)?;
        let Value::Map(pairs) = decoded else {
            return Err(StorageError::BadFormat("json root is not an object".into()));
        };
        self.add(pairs)
    }
}
