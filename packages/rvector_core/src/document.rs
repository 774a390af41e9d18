use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use sha2::{Digest, Sha256};

use embeddings::EmbeddingProvider;
use storage::{Codec, KVStore, Value};
use vector::Metric;

use crate::error::{Result, RvectorError};
use crate::id_allocator::IdAllocator;

const INDEX_STORE_DIR: &str = "index.rvstore";
const DATA_STORE_DIR: &str = "data.rvstore";
const VEC_STORE_DIR: &str = "vec.rvstore";
const VEC_MODEL_KEY: &str = "vec_model";

/// Which of a document's three sub-stores an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFile {
    Data,
    Vec,
    Index,
}

impl DocFile {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "data" => Some(DocFile::Data),
            "vec" => Some(DocFile::Vec),
            "index" => Some(DocFile::Index),
            _ => None,
        }
    }
}

/// A single text (or list of texts) to push in one call.
#[derive(Debug, Clone)]
pub enum TextInput {
    One(String),
    Many(Vec<String>),
}

/// How `push` should populate the `vec` store for this batch.
#[derive(Debug, Clone)]
pub enum EmbeddingMode {
    /// Call the `EmbeddingProvider` for every entry in the batch.
    Generate,
    /// Use these vectors as-is, one per entry, in input order.
    Provided(Vec<Vec<f64>>),
    /// Store an empty vector for every entry (no embedding at all).
    None,
}

#[derive(Debug, Clone)]
pub struct PushRequest {
    pub data: Option<TextInput>,
    /// Structured caller input, JSON-stringified into a single text entry
    /// (never split per-element, even when it's a JSON array).
    pub datax: Option<serde_json::Value>,
    pub uid: Vec<Option<String>>,
    pub metadata: Vec<Vec<(String, Value)>>,
    pub embeddings: EmbeddingMode,
    pub log_time: bool,
}

impl Default for PushRequest {
    fn default() -> Self {
        Self {
            data: None,
            datax: None,
            uid: Vec::new(),
            metadata: Vec::new(),
            embeddings: EmbeddingMode::Generate,
            log_time: false,
        }
    }
}

impl PushRequest {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            data: Some(TextInput::One(text.into())),
            ..Self::default()
        }
    }

    pub fn texts(texts: Vec<String>) -> Self {
        Self {
            data: Some(TextInput::Many(texts)),
            ..Self::default()
        }
    }

    pub fn structured(value: serde_json::Value) -> Self {
        Self {
            datax: Some(value),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct PullRequest {
    pub ids: Vec<u64>,
    pub uid: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub docfile: DocFile,
    /// Metadata equality/prefix filter (`time`/`date` match by substring
    /// containment, every other key by exact equality).
    pub filter: HashMap<String, Value>,
    /// Restrict `docfile == Data` results to entries whose text contains
    /// this substring.
    pub data_contains: Option<String>,
    /// `false` = admit on any filter key matching; `true` = every key must
    /// match.
    pub match_all: bool,
    pub apply_filter: bool,
}

impl Default for PullRequest {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            uid: None,
            time: None,
            date: None,
            docfile: DocFile::Data,
            filter: HashMap::new(),
            data_contains: None,
            match_all: false,
            apply_filter: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub topn: usize,
    pub metric: Metric,
    pub ids: Vec<u64>,
    pub uid: Option<String>,
    pub time: Option<String>,
    pub date: Option<String>,
    pub filter: HashMap<String, Value>,
    pub data_contains: Option<String>,
    pub match_all: bool,
    /// Re-apply the full filter set (including `data_contains`) against the
    /// `data` store after ranking, instead of filtering candidates before
    /// the similarity pass.
    pub filter_after_ranking: bool,
    /// Apply `data_contains` to the pre-ranking `vec`-store candidate pull
    /// rather than deferring it to the post-ranking `data` pull.
    pub contains_before_ranking: bool,
    pub include_embeddings: bool,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            topn: 10,
            metric: Metric::DotProduct,
            ids: Vec::new(),
            uid: None,
            time: None,
            date: None,
            filter: HashMap::new(),
            data_contains: None,
            match_all: false,
            filter_after_ranking: false,
            contains_before_ranking: false,
            include_embeddings: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchResult {
    pub ids: Vec<u64>,
    pub data: Vec<Value>,
    pub sim_score: Vec<f64>,
    pub index: Vec<Value>,
    pub embeddings: Option<Vec<Value>>,
}

#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub name: String,
    pub path: PathBuf,
    pub entry_count: usize,
    pub vec_model: Option<String>,
}

/// A document: three coordinated `KVStore`s (`index`, `data`, `vec`) under
/// one directory, plus the id space and content-hash set that let `push`
/// dedup identical payloads and recycle deleted ids.
pub struct Document {
    dir: PathBuf,
    name: String,
    index_store: KVStore,
    data_store: KVStore,
    vec_store: KVStore,
    allocator: IdAllocator,
    hid_set: HashSet<String>,
}

impl Document {
    pub fn open(doc_dir: impl Into<PathBuf>, name: impl Into<String>, codec: Codec) -> Result<Self> {
        let doc_dir = doc_dir.into();
        let name = name.into();
        std::fs::create_dir_all(&doc_dir)?;

        let mut index_store = KVStore::open(doc_dir.join(INDEX_STORE_DIR), codec)?;
        let data_store = KVStore::open(doc_dir.join(DATA_STORE_DIR), codec)?;
        let vec_store = KVStore::open(doc_dir.join(VEC_STORE_DIR), codec)?;

        let live_keys = data_store.keys();
        let live_ids = live_keys.iter().filter_map(|k| k.parse::<u64>().ok());
        let allocator = IdAllocator::from_live_ids(live_ids);

        let mut hid_set = HashSet::new();
        for key in &live_keys {
            if let Some(entry) = index_store.get(key)? {
                if let Some(hid) = entry.map_get("hid").and_then(Value::as_str) {
                    hid_set.insert(hid.to_string());
                }
            }
        }

        Ok(Self {
            dir: doc_dir,
            name,
            index_store,
            data_store,
            vec_store,
            allocator,
            hid_set,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &std::path::Path {
        &self.dir
    }

    pub fn len(&self) -> usize {
        self.data_store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data_store.is_empty()
    }

    /// Reclaim dead-space in all three sub-stores by rewriting their data
    /// files to hold only live records.
    pub fn compact(&mut self) -> Result<()> {
        self.index_store.compact()?;
        self.data_store.compact()?;
        self.vec_store.compact()?;
        Ok(())
    }

    pub fn info(&mut self) -> Result<DocumentInfo> {
        let vec_model = self
            .index_store
            .get(VEC_MODEL_KEY)?
            .and_then(|v| v.as_str().map(str::to_string));
        Ok(DocumentInfo {
            name: self.name.clone(),
            path: self.dir.clone(),
            entry_count: self.data_store.len(),
            vec_model,
        })
    }

    fn store_mut(&mut self, docfile: DocFile) -> &mut KVStore {
        match docfile {
            DocFile::Data => &mut self.data_store,
            DocFile::Vec => &mut self.vec_store,
            DocFile::Index => &mut self.index_store,
        }
    }

    pub fn push(&mut self, provider: &dyn EmbeddingProvider, req: PushRequest) -> Result<Vec<u64>> {
        let texts: Vec<String> = match (req.data, req.datax) {
            (Some(_), Some(_)) => {
                return Err(RvectorError::BadArgument(
                    "exactly one of `data` or `datax` may be provided".into(),
                ))
            }
            (None, None) => {
                return Err(RvectorError::BadArgument(
                    "one of `data` or `datax` must be provided".into(),
                ))
            }
            (Some(TextInput::One(s)), None) => vec![s],
            (Some(TextInput::Many(v)), None) => v,
            (None, Some(value)) => vec![serde_json::to_string(&value)
                .map_err(|e| RvectorError::BadArgument(e.to_string()))?],
        };

        let n = texts.len();
        if n == 0 {
            return Ok(Vec::new());
        }

        let mut uid = req.uid;
        uid.resize(n, None);
        let mut metadata = req.metadata;
        metadata.resize(n, Vec::new());

        let (embeddings, used_provider) = match req.embeddings {
            EmbeddingMode::Generate => (provider.encode(&texts)?, true),
            EmbeddingMode::Provided(vectors) => {
                if vectors.len() != n {
                    return Err(RvectorError::BadArgument(format!(
                        "provided {} embeddings for {n} entries",
                        vectors.len()
                    )));
                }
                (vectors, false)
            }
            EmbeddingMode::None => (vec![Vec::new(); n], false),
        };

        let doc_name = self.name.clone();
        let mut ids = Vec::with_capacity(n);
        let mut index_batch = Vec::with_capacity(n);
        let mut data_batch = Vec::with_capacity(n);
        let mut vec_batch = Vec::with_capacity(n);
        // Entries assigned earlier in this same batch aren't visible to
        // `data_store`/`index_store` yet (the batch is only written after
        // this loop), so a repeat within one `push` call has to be deduped
        // against this in-flight map before falling back to the on-disk scan.
        let mut in_flight: HashMap<String, (String, u64)> = HashMap::new();

        for i in 0..n {
            let text = &texts[i];
            let hid = content_hash(text);

            let existing_id = match in_flight.get(&hid) {
                Some((seen_text, seen_id)) if seen_text == text => Some(*seen_id),
                _ if self.hid_set.contains(&hid) => self.find_existing_id(&hid, text)?,
                _ => None,
            };
            let id = existing_id.unwrap_or_else(|| self.allocator.gen());
            self.hid_set.insert(hid.clone());
            in_flight.insert(hid.clone(), (text.clone(), id));

            let mut entry = vec![
                ("doc".to_string(), Value::Str(doc_name.clone())),
                ("hid".to_string(), Value::Str(hid)),
            ];
            if req.log_time {
                let now = time::OffsetDateTime::now_utc();
                entry.push(("time".to_string(), Value::Str(format_time(now))));
                entry.push(("date".to_string(), Value::Str(format_date(now))));
            }
            if let Some(u) = &uid[i] {
                entry.push(("uid".to_string(), Value::Str(u.clone())));
            }
            entry.extend(metadata[i].iter().cloned());

            let key = id.to_string();
            index_batch.push((key.clone(), Value::Map(entry)));
            data_batch.push((key.clone(), Value::Str(text.clone())));
            vec_batch.push((key, Value::from(embeddings[i].clone())));
            ids.push(id);
        }

        self.index_store.add(index_batch)?;
        self.data_store.add(data_batch)?;
        self.vec_store.add(vec_batch)?;

        if used_provider {
            self.index_store
                .set(VEC_MODEL_KEY, Value::Str(provider.model_name().to_string()))?;
        }

        self.index_store.commit()?;
        self.data_store.commit()?;
        self.vec_store.commit()?;

        Ok(ids)
    }

    /// Linear scan for a live entry sharing `hid` whose stored text equals
    /// `text` exactly, the same cost-profile tradeoff the push contract
    /// accepts in exchange for exact-duplicate id reuse (P6).
    fn find_existing_id(&mut self, hid: &str, text: &str) -> Result<Option<u64>> {
        for key in self.data_store.keys() {
            let Some(entry) = self.index_store.get(&key)? else {
                continue;
            };
            if entry.map_get("hid").and_then(Value::as_str) != Some(hid) {
                continue;
            }
            let Some(data_value) = self.data_store.get(&key)? else {
                continue;
            };
            if data_value.as_str() == Some(text) {
                if let Ok(id) = key.parse() {
                    return Ok(Some(id));
                }
            }
        }
        Ok(None)
    }

    pub fn pull(&mut self, req: PullRequest) -> Result<Vec<(u64, Value)>> {
        let no_filters = req.ids.is_empty()
            && req.uid.is_none()
            && req.time.is_none()
            && req.date.is_none()
            && req.filter.is_empty()
            && req.data_contains.is_none();

        if !req.apply_filter || no_filters {
            return self.pull_all(req.docfile);
        }

        if !req.ids.is_empty() {
            return self.pull_by_id(&req.ids, req.docfile, req.data_contains.as_deref());
        }

        let mut filter = req.filter.clone();
        if let Some(uid) = &req.uid {
            filter.entry("uid".to_string()).or_insert_with(|| Value::Str(uid.clone()));
        }
        if let Some(t) = &req.time {
            filter.entry("time".to_string()).or_insert_with(|| Value::Str(t.clone()));
        }
        if let Some(d) = &req.date {
            filter.entry("date".to_string()).or_insert_with(|| Value::Str(d.clone()));
        }

        let ids = self.search_idx(&filter, req.match_all)?;
        self.pull_by_id(&ids, req.docfile, req.data_contains.as_deref())
    }

    fn pull_all(&mut self, docfile: DocFile) -> Result<Vec<(u64, Value)>> {
        let keys = self.store_mut(docfile).keys();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.store_mut(docfile).get(&key)? {
                if let Ok(id) = key.parse() {
                    out.push((id, value));
                }
            }
        }
        Ok(out)
    }

    fn pull_by_id(
        &mut self,
        ids: &[u64],
        docfile: DocFile,
        data_contains: Option<&str>,
    ) -> Result<Vec<(u64, Value)>> {
        let mut out = Vec::with_capacity(ids.len());
        for &id in ids {
            let key = id.to_string();
            let Some(value) = self.store_mut(docfile).get(&key)? else {
                continue;
            };
            if docfile == DocFile::Data {
                if let Some(needle) = data_contains {
                    match value.as_str() {
                        Some(s) if s.contains(needle) => {}
                        _ => continue,
                    }
                }
            }
            out.push((id, value));
        }
        Ok(out)
    }

    fn search_idx(&mut self, filter: &HashMap<String, Value>, match_all: bool) -> Result<Vec<u64>> {
        let mut ids = Vec::new();
        for key in self.data_store.keys() {
            let Some(entry) = self.index_store.get(&key)? else {
                continue;
            };
            if metadata_filter(filter, &entry, match_all) {
                if let Ok(id) = key.parse() {
                    ids.push(id);
                }
            }
        }
        Ok(ids)
    }

    pub fn search(&mut self, provider: &dyn EmbeddingProvider, req: SearchRequest) -> Result<SearchResult> {
        let prefilter_contains = if req.contains_before_ranking {
            req.data_contains.clone()
        } else {
            None
        };

        let candidates = self.pull(PullRequest {
            ids: req.ids.clone(),
            uid: req.uid.clone(),
            time: req.time.clone(),
            date: req.date.clone(),
            docfile: DocFile::Vec,
            filter: req.filter.clone(),
            data_contains: prefilter_contains,
            match_all: req.match_all,
            apply_filter: !req.filter_after_ranking,
        })?;

        if candidates.is_empty() {
            return Ok(SearchResult {
                ids: Vec::new(),
                data: Vec::new(),
                sim_score: Vec::new(),
                index: Vec::new(),
                embeddings: req.include_embeddings.then(Vec::new),
            });
        }

        let dataset_ids: Vec<u64> = candidates.iter().map(|(id, _)| *id).collect();
        let dataset: Vec<Vec<f64>> = candidates.iter().map(|(_, v)| value_as_floats(v)).collect();

        let mut query_vec = provider.encode(&[req.query.clone()])?;
        let query_vec = query_vec
            .pop()
            .ok_or_else(|| RvectorError::EmbeddingFailed("provider returned no vector for the query".into()))?;

        let (idx_order, scores) = vector::search_vectors(&query_vec, &dataset, req.metric);
        let top_positions = vector::top_k(&idx_order, req.topn);
        let top_ids: Vec<u64> = top_positions.iter().map(|&p| dataset_ids[p]).collect();

        let res_data = if req.filter_after_ranking {
            self.pull(PullRequest {
                ids: top_ids,
                docfile: DocFile::Data,
                data_contains: req.data_contains.clone(),
                apply_filter: true,
                ..PullRequest::default()
            })?
        } else {
            self.pull_by_id(&top_ids, DocFile::Data, req.data_contains.as_deref())?
        };

        let mut result = SearchResult {
            ids: Vec::with_capacity(res_data.len()),
            data: Vec::with_capacity(res_data.len()),
            sim_score: Vec::with_capacity(res_data.len()),
            index: Vec::with_capacity(res_data.len()),
            embeddings: req.include_embeddings.then(Vec::new),
        };

        for (id, data_value) in res_data {
            let dataset_pos = dataset_ids.iter().position(|&d| d == id).unwrap_or(0);
            result.ids.push(id);
            result.data.push(data_value);
            result.sim_score.push(scores[dataset_pos]);
            result
                .index
                .push(self.index_store.get(&id.to_string())?.unwrap_or_else(|| Value::Map(Vec::new())));
            if req.include_embeddings {
                if let Some(embeds) = result.embeddings.as_mut() {
                    let v = candidates
                        .iter()
                        .find(|(cid, _)| *cid == id)
                        .map(|(_, v)| v.clone())
                        .unwrap_or_else(|| Value::List(Vec::new()));
                    embeds.push(v);
                }
            }
        }

        Ok(result)
    }

    pub fn delete(&mut self, ids: &[u64]) -> Result<Vec<u64>> {
        if ids.is_empty() {
            return Err(RvectorError::BadArgument("at least one id must be provided".into()));
        }
        // Only recycle ids this document actually held — a duplicate or
        // never-issued id in the request must not be pushed onto the
        // allocator's free stack, or a later gen() could hand the same id
        // to two live entries at once.
        let live: Vec<u64> = ids
            .iter()
            .copied()
            .filter(|id| self.data_store.exists(&id.to_string()))
            .collect();
        let keys: Vec<String> = ids.iter().map(u64::to_string).collect();
        self.index_store.delete(&keys)?;
        self.data_store.delete(&keys)?;
        self.vec_store.delete(&keys)?;
        for id in live {
            self.allocator.delete(id);
        }
        self.index_store.commit()?;
        self.data_store.commit()?;
        self.vec_store.commit()?;
        Ok(ids.to_vec())
    }
}

fn content_hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

fn value_as_floats(value: &Value) -> Vec<f64> {
    match value {
        Value::List(items) => items.iter().filter_map(Value::as_float).collect(),
        _ => Vec::new(),
    }
}

fn format_time(t: time::OffsetDateTime) -> String {
    format!("{:02}:{:02}:{:02}", t.hour(), t.minute(), t.second())
}

fn format_date(t: time::OffsetDateTime) -> String {
    format!("{:02}-{:02}-{}", t.day(), u8::from(t.month()), t.year())
}

fn metadata_filter(filter: &HashMap<String, Value>, entry: &Value, match_all: bool) -> bool {
    if filter.is_empty() {
        return false;
    }
    let mut any_matched = false;
    for (key, query_value) in filter {
        let Some(entry_value) = entry.map_get(key) else {
            return false;
        };
        let matched = if key == "time" || key == "date" {
            matches!((query_value.as_str(), entry_value.as_str()), (Some(q), Some(d)) if d.contains(q))
        } else {
            query_value == entry_value
        };
        if match_all {
            if !matched {
                return false;
            }
        } else if matched {
            any_matched = true;
        }
    }
    if match_all {
        true
    } else {
        any_matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embeddings::DeterministicEmbeddingProvider;
    use tempfile::tempdir;

    fn open_doc(dir: &std::path::Path) -> Document {
        Document::open(dir, "test-doc", Codec::Binary).unwrap()
    }

    // S1
    #[test]
    fn push_dedups_exact_repeats_within_a_batch() {
        let dir = tempdir().unwrap();
        let mut doc = open_doc(dir.path());
        let provider = DeterministicEmbeddingProvider::new(8);
        let ids = doc
            .push(&provider, PushRequest::texts(vec!["alpha".into(), "beta".into(), "alpha".into()]))
            .unwrap();
        assert_eq!(ids, vec![1, 2, 1]);
        let mut keys = doc.data_store.keys();
        keys.sort();
        assert_eq!(keys, vec!["1".to_string(), "2".to_string()]);
    }

    // S2
    #[test]
    fn delete_then_push_recycles_the_freed_id() {
        let dir = tempdir().unwrap();
        let mut doc = open_doc(dir.path());
        let provider = DeterministicEmbeddingProvider::new(8);
        doc.push(&provider, PushRequest::texts(vec!["alpha".into(), "beta".into()]))
            .unwrap();
        doc.delete(&[1]).unwrap();
        let recycled = doc.push(&provider, PushRequest::text("gamma")).unwrap();
        assert_eq!(recycled, vec![1]);
        let grown = doc.push(&provider, PushRequest::text("delta")).unwrap();
        assert_eq!(grown, vec![3]);
    }

    // S3 / P8
    #[test]
    fn pull_with_metadata_filter_returns_only_matching_tag() {
        let dir = tempdir().unwrap();
        let mut doc = open_doc(dir.path());
        let provider = DeterministicEmbeddingProvider::new(8);

        for (text, tag) in [("a1", "a"), ("a2", "a"), ("b1", "b"), ("b2", "b")] {
            doc.push(
                &provider,
                PushRequest {
                    metadata: vec![vec![("tag".to_string(), Value::Str(tag.to_string()))]],
                    ..PushRequest::text(text)
                },
            )
            .unwrap();
        }

        let mut filter = HashMap::new();
        filter.insert("tag".to_string(), Value::Str("a".to_string()));
        let pulled = doc
            .pull(PullRequest {
                docfile: DocFile::Data,
                filter,
                match_all: false,
                ..PullRequest::default()
            })
            .unwrap();
        assert_eq!(pulled.len(), 2);
        assert!(pulled.iter().all(|(id, _)| *id == 1 || *id == 2));
    }

    #[test]
    fn metadata_filter_rejects_entries_missing_the_key() {
        let entry = Value::Map(vec![("doc".to_string(), Value::Str("d".into()))]);
        let mut filter = HashMap::new();
        filter.insert("tag".to_string(), Value::Str("a".into()));
        assert!(!metadata_filter(&filter, &entry, false));
        assert!(!metadata_filter(&filter, &entry, true));
    }

    #[test]
    fn search_returns_closest_by_euclidean_distance() {
        let dir = tempdir().unwrap();
        let mut doc = open_doc(dir.path());
        let provider = DeterministicEmbeddingProvider::new(3);

        for (text, vector) in [
            ("near", vec![1.0, 0.0, 0.0]),
            ("far", vec![0.0, 1.0, 0.0]),
            ("middle", vec![0.7, 0.3, 0.0]),
        ] {
            doc.push(
                &provider,
                PushRequest {
                    embeddings: EmbeddingMode::Provided(vec![vector]),
                    ..PushRequest::text(text)
                },
            )
            .unwrap();
        }

        let result = doc
            .search(
                &provider,
                SearchRequest {
                    query: "anything".into(),
                    topn: 2,
                    metric: Metric::Euclidean,
                    ..SearchRequest::default()
                },
            )
            .unwrap();
        assert_eq!(result.ids.len(), 2);
        assert_eq!(result.sim_score.len(), 2);
        assert!(result.ids.contains(&1));
        assert!(result.ids.contains(&3));
    }

    #[test]
    fn delete_requires_at_least_one_id() {
        let dir = tempdir().unwrap();
        let mut doc = open_doc(dir.path());
        assert!(matches!(doc.delete(&[]), Err(RvectorError::BadArgument(_))));
    }

    #[test]
    fn push_rejects_both_data_and_datax() {
        let dir = tempdir().unwrap();
        let mut doc = open_doc(dir.path());
        let provider = DeterministicEmbeddingProvider::new(4);
        let req = PushRequest {
            data: Some(TextInput::One("x".into())),
            datax: Some(serde_json::json!({"a": 1})),
            ..PushRequest::default()
        };
        assert!(matches!(doc.push(&provider, req), Err(RvectorError::BadArgument(_))));
    }

    #[test]
    fn push_rejects_neither_data_nor_datax() {
        let dir = tempdir().unwrap();
        let mut doc = open_doc(dir.path());
        let provider = DeterministicEmbeddingProvider::new(4);
        assert!(matches!(
            doc.push(&provider, PushRequest::default()),
            Err(RvectorError::BadArgument(_))
        ));
    }

    #[test]
    fn reopen_recovers_hid_set_and_allocator_state() {
        let dir = tempdir().unwrap();
        let provider = DeterministicEmbeddingProvider::new(4);
        {
            let mut doc = open_doc(dir.path());
            doc.push(&provider, PushRequest::text("alpha")).unwrap();
        }
        let mut reopened = open_doc(dir.path());
        let ids = reopened.push(&provider, PushRequest::text("alpha")).unwrap();
        assert_eq!(ids, vec![1]);
    }
}
