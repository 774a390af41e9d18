use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom, Write};

use embeddings::DeterministicEmbeddingProvider;
use rvector_core::{Database, DocFile, Document, PullRequest, PushRequest, RvectorError, SearchRequest};
use storage::{Codec, Value};
use tempfile::tempdir;
use vector::Metric;

#[test]
fn database_lifecycle_across_reopen() {
    let root = tempdir().unwrap();
    let provider = DeterministicEmbeddingProvider::new(16);

    {
        let mut db = Database::open(root.path(), Codec::Binary).unwrap();
        db.get_db(Some("notes"), None).unwrap();
        db.get_doc(Some("journal"))
            .unwrap()
            .push(&provider, PushRequest::texts(vec!["hello".into(), "world".into()]))
            .unwrap();
    }

    let mut db = Database::open(root.path(), Codec::Binary).unwrap();
    db.get_db(Some("notes"), None).unwrap();
    let doc = db.get_doc(Some("journal")).unwrap();
    assert_eq!(doc.len(), 2);
    let pulled = doc
        .pull(PullRequest {
            docfile: DocFile::Data,
            ..PullRequest::default()
        })
        .unwrap();
    assert_eq!(pulled.len(), 2);
}

#[test]
fn clean_up_across_multiple_databases_and_documents() {
    let root = tempdir().unwrap();
    let provider = DeterministicEmbeddingProvider::new(16);
    let mut db = Database::open(root.path(), Codec::Binary).unwrap();

    db.get_db(Some("alpha"), None).unwrap();
    db.get_doc(Some("populated"))
        .unwrap()
        .push(&provider, PushRequest::text("keep me"))
        .unwrap();
    db.get_doc(Some("empty")).unwrap();

    db.get_db(Some("beta"), None).unwrap();
    db.get_doc(Some("also-empty")).unwrap();

    db.clean_up(None).unwrap();

    db.get_db(Some("alpha"), None).unwrap();
    assert_eq!(db.get_docs().unwrap(), vec!["populated".to_string()]);

    // "beta" held only an empty document, so clean_up should have removed
    // the document and then the now-empty database itself.
    assert!(!db.get_dbs().unwrap().contains(&format!("beta{}", configs::types::DB_EXT)));
}

#[test]
fn metadata_all_match_requires_every_filter_key() {
    let dir = tempdir().unwrap();
    let provider = DeterministicEmbeddingProvider::new(16);
    let mut doc = Document::open(dir.path(), "doc", Codec::Binary).unwrap();

    doc.push(
        &provider,
        PushRequest {
            metadata: vec![vec![
                ("tag".to_string(), Value::Str("a".into())),
                ("lang".to_string(), Value::Str("en".into())),
            ]],
            ..PushRequest::text("one")
        },
    )
    .unwrap();
    doc.push(
        &provider,
        PushRequest {
            metadata: vec![vec![("tag".to_string(), Value::Str("a".into()))]],
            ..PushRequest::text("two")
        },
    )
    .unwrap();

    let mut filter = HashMap::new();
    filter.insert("tag".to_string(), Value::Str("a".into()));
    filter.insert("lang".to_string(), Value::Str("en".into()));

    let all_match = doc
        .pull(PullRequest {
            docfile: DocFile::Data,
            filter: filter.clone(),
            match_all: true,
            ..PullRequest::default()
        })
        .unwrap();
    assert_eq!(all_match.len(), 1);
    assert_eq!(all_match[0].0, 1);

    let any_match = doc
        .pull(PullRequest {
            docfile: DocFile::Data,
            filter,
            match_all: false,
            ..PullRequest::default()
        })
        .unwrap();
    assert_eq!(any_match.len(), 2);
}

#[test]
fn search_reports_scores_for_the_requested_metric() {
    let dir = tempdir().unwrap();
    let provider = DeterministicEmbeddingProvider::new(3);
    let mut doc = Document::open(dir.path(), "doc", Codec::Binary).unwrap();

    for (text, vector) in [
        ("close", vec![1.0, 0.0, 0.0]),
        ("far", vec![-1.0, 0.0, 0.0]),
    ] {
        doc.push(
            &provider,
            PushRequest {
                embeddings: rvector_core::EmbeddingMode::Provided(vec![vector]),
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
                topn: 1,
                metric: Metric::DotProduct,
                ..SearchRequest::default()
            },
        )
        .unwrap();
    assert_eq!(result.ids, vec![1]);
    assert_eq!(result.sim_score.len(), 1);
}

// S6: a corrupted side-file must surface as BadFormat, never silently lose
// or misinterpret data.
#[test]
fn corrupted_side_file_surfaces_as_bad_format_on_reopen() {
    let dir = tempdir().unwrap();
    let provider = DeterministicEmbeddingProvider::new(8);
    {
        let mut doc = Document::open(dir.path(), "doc", Codec::Binary).unwrap();
        doc.push(&provider, PushRequest::text("alpha")).unwrap();
    }

    let side_file = dir.path().join("index.rvstore").join("index.rvidx");
    let mut file = std::fs::OpenOptions::new().write(true).open(&side_file).unwrap();
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut first_byte = [0u8; 1];
    std::fs::File::open(&side_file)
        .unwrap()
        .read_exact(&mut first_byte)
        .unwrap();
    file.write_all(&[first_byte[0] ^ 0xFF]).unwrap();
    drop(file);

    let reopened = Document::open(dir.path(), "doc", Codec::Binary);
    assert!(matches!(reopened, Err(RvectorError::BadFormat(_)) | Err(RvectorError::Io(_))));
}
