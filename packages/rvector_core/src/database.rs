use std::collections::HashMap;
use std::path::{Path, PathBuf};

use configs::types::{DB_EXT, DEFAULT_DOC_NAME};
use storage::Codec;

use crate::document::Document;
use crate::error::{Result, RvectorError};

#[derive(Debug, Clone)]
pub struct DatabaseInfo {
    pub db: String,
    pub db_path: PathBuf,
    pub doc_list: Vec<String>,
}

/// Root-directory manager: owns a storage root (normally `~/.rvector`),
/// tracks which database directory is "current", and caches the `Document`s
/// opened against it. One `Database` plays the role the Python original's
/// single hardcoded root played, generalized to an arbitrary root path.
pub struct Database {
    root: PathBuf,
    codec: Codec,
    current_db: String,
    docs: HashMap<String, Document>,
}

impl Database {
    pub fn open(root: impl Into<PathBuf>, codec: Codec) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            codec,
            current_db: String::new(),
            docs: HashMap::new(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn current_db(&self) -> &str {
        &self.current_db
    }

    fn current_db_path(&self) -> PathBuf {
        self.root.join(&self.current_db)
    }

    fn dir_name(name: &str) -> String {
        if name.ends_with(DB_EXT) {
            name.to_string()
        } else {
            format!("{name}{DB_EXT}")
        }
    }

    /// Switch the current database, creating its directory if absent.
    /// Exactly one of `db`/`db_path` may be given; with neither, a fixed
    /// default database is selected.
    pub fn get_db(&mut self, db: Option<&str>, db_path: Option<&Path>) -> Result<PathBuf> {
        let path = match (db, db_path) {
            (Some(_), Some(_)) => {
                return Err(RvectorError::BadArgument(
                    "exactly one of `db` or `db_path` may be provided".into(),
                ))
            }
            (Some(name), None) => self.root.join(Self::dir_name(name)),
            (None, Some(path)) => path.to_path_buf(),
            (None, None) => self.root.join(Self::dir_name("default")),
        };
        std::fs::create_dir_all(&path)?;
        self.current_db = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("default")
            .to_string();
        self.docs.clear();
        Ok(path)
    }

    /// Open (or return the cached handle to) a document within the current
    /// database, opening the default database first if none is selected
    /// yet.
    pub fn get_doc(&mut self, name: Option<&str>) -> Result<&mut Document> {
        if self.current_db.is_empty() {
            self.get_db(None, None)?;
        }
        let name = name.unwrap_or(DEFAULT_DOC_NAME).to_string();
        if !self.docs.contains_key(&name) {
            let doc_dir = self.current_db_path().join(&name);
            let doc = Document::open(doc_dir, name.clone(), self.codec)?;
            self.docs.insert(name.clone(), doc);
        }
        Ok(self.docs.get_mut(&name).expect("just inserted"))
    }

    /// List the document names that exist on disk under the current
    /// database, regardless of whether they're currently cached open.
    pub fn get_docs(&mut self) -> Result<Vec<String>> {
        if self.current_db.is_empty() {
            self.get_db(None, None)?;
        }
        list_subdirs(&self.current_db_path())
    }

    /// List the database directory names under the storage root.
    pub fn get_dbs(&self) -> Result<Vec<String>> {
        list_subdirs(&self.root)
    }

    pub fn del_doc(&mut self, name: &str) -> Result<()> {
        if self.current_db.is_empty() {
            return Err(RvectorError::BadArgument("no database selected".into()));
        }
        self.docs.remove(name);
        let doc_dir = self.current_db_path().join(name);
        if doc_dir.exists() {
            std::fs::remove_dir_all(&doc_dir)?;
        }
        Ok(())
    }

    pub fn del_db(&mut self, name: &str) -> Result<()> {
        let dir_name = Self::dir_name(name);
        let db_path = self.root.join(&dir_name);
        if db_path.exists() {
            std::fs::remove_dir_all(&db_path)?;
        }
        if dir_name == self.current_db {
            self.current_db.clear();
            self.docs.clear();
        }
        Ok(())
    }

    /// For every document in the targeted database(s) (all of them when
    /// `db` is `None`): delete it if it holds no entries, otherwise compact
    /// its three sub-stores. A database left with no documents afterward is
    /// itself removed.
    pub fn clean_up(&mut self, db: Option<&str>) -> Result<()> {
        let targets = match db {
            Some(name) => vec![Self::dir_name(name)],
            None => self.get_dbs()?,
        };

        for db_name in targets {
            let db_path = self.root.join(&db_name);
            if !db_path.exists() {
                continue;
            }
            for doc_name in list_subdirs(&db_path)? {
                let doc_dir = db_path.join(&doc_name);
                let mut doc = Document::open(doc_dir.clone(), doc_name.clone(), self.codec)?;
                if doc.is_empty() {
                    drop(doc);
                    self.docs.remove(&doc_name);
                    std::fs::remove_dir_all(&doc_dir)?;
                } else {
                    doc.compact()?;
                    self.docs.insert(doc_name, doc);
                }
            }
            if list_subdirs(&db_path)?.is_empty() {
                std::fs::remove_dir_all(&db_path)?;
                if db_name == self.current_db {
                    self.current_db.clear();
                }
            }
        }
        Ok(())
    }

    pub fn info(&mut self) -> Result<DatabaseInfo> {
        if self.current_db.is_empty() {
            self.get_db(None, None)?;
        }
        Ok(DatabaseInfo {
            db: self.current_db.clone(),
            db_path: self.current_db_path(),
            doc_list: self.get_docs()?,
        })
    }
}

fn list_subdirs(dir: &Path) -> Result<Vec<String>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}
