//! Document/database layer: composes the storage engine, the vector
//! similarity ranker, and an embedding provider into the `push`/`pull`/
//! `search`/`delete` operations a document exposes, plus the root-directory
//! management (`Database`) that groups documents into databases.

pub mod database;
pub mod document;
pub mod error;
pub mod id_allocator;

pub use database::{Database, DatabaseInfo};
pub use document::{
    DocFile, Document, DocumentInfo, EmbeddingMode, PullRequest, PushRequest, SearchRequest,
    SearchResult, TextInput,
};
pub use error::{Result, RvectorError};
pub use id_allocator::IdAllocator;
