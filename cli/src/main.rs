use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use configs::types::DEFAULT_EMBEDDING_DIMENSION;
use configs::{AppConfig, CliConfig, Command};
use embeddings::{DeterministicEmbeddingProvider, EmbeddingProvider, OnnxEmbeddingProvider};
use rvector_core::{DocFile, Database, Document, EmbeddingMode, PullRequest, PushRequest, SearchRequest};
use storage::Codec;
use vector::Metric;

fn main() -> Result<()> {
    let cli = CliConfig::from_args();
    let mut app_config = AppConfig::from_env();
    if let Some(path) = &cli.storage_path {
        app_config.storage_path = path.clone();
    }
    let log_level = if cli.log_level.is_empty() {
        app_config.log_level.clone()
    } else {
        cli.log_level.clone()
    };
    logger::init(&log_level);

    let codec = Codec::parse(&app_config.data_encoding).unwrap_or(Codec::Binary);
    let mut database = Database::open(&app_config.storage_path, codec)?;
    database.get_db(Some(&cli.db), None)?;

    let provider = build_provider(&app_config.embedding_model);

    match cli.command {
        Some(command) => {
            let doc = database.get_doc(cli.doc.as_deref())?;
            run_command(doc, provider.as_ref(), command)
        }
        None => run_interactive(&mut database, provider.as_ref(), cli.doc.as_deref()),
    }
}

/// Prefer a real ONNX encoder; fall back to the offline deterministic
/// stand-in when the model can't be fetched (no network, cold cache miss,
/// ...) so the shell stays usable without a working internet connection.
fn build_provider(model: &str) -> Box<dyn EmbeddingProvider> {
    match OnnxEmbeddingProvider::from_hub(model, DEFAULT_EMBEDDING_DIMENSION) {
        Ok(provider) => Box::new(provider),
        Err(err) => {
            tracing::warn!(%err, model, "falling back to the deterministic embedding provider");
            Box::new(DeterministicEmbeddingProvider::new(DEFAULT_EMBEDDING_DIMENSION))
        }
    }
}

fn run_command(doc: &mut Document, provider: &dyn EmbeddingProvider, command: Command) -> Result<()> {
    match command {
        Command::Push { text, uid, no_embed } => cmd_push(doc, provider, text, uid, no_embed),
        Command::Pull { ids, docfile } => cmd_pull(doc, ids, &docfile),
        Command::Search { query, topn, by } => cmd_search(doc, provider, query, topn, &by),
        Command::Delete { ids } => cmd_delete(doc, ids),
        Command::Info => cmd_info(doc),
    }
}

fn cmd_push(
    doc: &mut Document,
    provider: &dyn EmbeddingProvider,
    text: Vec<String>,
    uid: Option<String>,
    no_embed: bool,
) -> Result<()> {
    if text.is_empty() {
        bail!("push requires at least one --text value");
    }
    let uid = vec![uid; text.len()];
    let embeddings = if no_embed {
        EmbeddingMode::None
    } else {
        EmbeddingMode::Generate
    };
    let ids = doc.push(
        provider,
        PushRequest {
            uid,
            embeddings,
            ..PushRequest::texts(text)
        },
    )?;
    println!("pushed {} entries: {:?}", ids.len(), ids);
    Ok(())
}

fn cmd_pull(doc: &mut Document, ids: Vec<u64>, docfile: &str) -> Result<()> {
    let docfile = DocFile::parse(docfile).with_context(|| format!("unknown docfile `{docfile}`"))?;
    let entries = doc.pull(PullRequest {
        ids,
        docfile,
        ..PullRequest::default()
    })?;
    for (id, value) in entries {
        println!("{id}: {value:?}");
    }
    Ok(())
}

fn cmd_search(doc: &mut Document, provider: &dyn EmbeddingProvider, query: String, topn: usize, by: &str) -> Result<()> {
    let metric = Metric::parse(by).with_context(|| format!("unknown metric `{by}` (expected dp, cs, or ed)"))?;
    let result = doc.search(
        provider,
        SearchRequest {
            query,
            topn,
            metric,
            ..SearchRequest::default()
        },
    )?;
    for ((id, data), score) in result.ids.iter().zip(result.data.iter()).zip(result.sim_score.iter()) {
        println!("{id}\t{score:.4}\t{data:?}");
    }
    Ok(())
}

fn cmd_delete(doc: &mut Document, ids: Vec<u64>) -> Result<()> {
    if ids.is_empty() {
        bail!("delete requires at least one --id value");
    }
    let deleted = doc.delete(&ids)?;
    println!("deleted {} entries: {:?}", deleted.len(), deleted);
    Ok(())
}

fn cmd_info(doc: &mut Document) -> Result<()> {
    let info = doc.info()?;
    println!(
        "doc={} path={} entries={} vec_model={}",
        info.name,
        info.path.display(),
        info.entry_count,
        info.vec_model.as_deref().unwrap_or("<unset>")
    );
    Ok(())
}

/// Fallback REPL for anything not given as argv, grounded on the shell
/// prefix-grammar the original offers: `push <text...>`, `pull [id...]`,
/// `search <query> [topn] [by]`, `delete <id...>`, `info`, `exit`.
fn run_interactive(database: &mut Database, provider: &dyn EmbeddingProvider, doc_name: Option<&str>) -> Result<()> {
    let stdin = io::stdin();
    print!("rvector> ");
    io::stdout().flush().ok();
    for line in stdin.lock().lines() {
        let line = line?;
        let words: Vec<&str> = line.split_whitespace().collect();
        let doc = database.get_doc(doc_name)?;
        match words.as_slice() {
            [] => {}
            ["exit"] | ["quit"] => break,
            ["info"] => {
                if let Err(err) = cmd_info(doc) {
                    eprintln!("error: {err}");
                }
            }
            ["push", rest @ ..] if !rest.is_empty() => {
                if let Err(err) = cmd_push(doc, provider, vec![rest.join(" ")], None, false) {
                    eprintln!("error: {err}");
                }
            }
            ["pull", rest @ ..] => {
                let ids: Vec<u64> = rest.iter().filter_map(|s| s.parse().ok()).collect();
                if let Err(err) = cmd_pull(doc, ids, "data") {
                    eprintln!("error: {err}");
                }
            }
            ["search", query, rest @ ..] => {
                let topn = rest.first().and_then(|s| s.parse().ok()).unwrap_or(10);
                if let Err(err) = cmd_search(doc, provider, query.to_string(), topn, "dp") {
                    eprintln!("error: {err}");
                }
            }
            ["delete", rest @ ..] => {
                let ids: Vec<u64> = rest.iter().filter_map(|s| s.parse().ok()).collect();
                if let Err(err) = cmd_delete(doc, ids) {
                    eprintln!("error: {err}");
                }
            }
            _ => eprintln!("unrecognized command: {line}"),
        }
        print!("rvector> ");
        io::stdout().flush().ok();
    }
    Ok(())
}
