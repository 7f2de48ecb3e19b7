//! Document collections backing the remote persistence variant.
//!
//! # Responsibility
//! - Model a document database: collections addressed by slash-separated
//!   paths (`employees`, `employees/<id>/tasks`) holding JSON documents.
//! - Offer a SQLite-backed store and an in-memory store.
//!
//! # Invariants
//! - `list` returns a full collection in insertion order; no pagination.
//! - `set` upserts and keeps the document's original position.
//! - `delete` on a missing document is a no-op.
//! - Writes made inside `atomic` either all land or none do.

use crate::repo::backend::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// One stored document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Value,
}

/// Collection-oriented document storage contract.
pub trait DocumentStore {
    fn list(&self, collection: &str) -> RepoResult<Vec<Document>>;
    fn get(&self, collection: &str, id: &str) -> RepoResult<Option<Document>>;
    fn set(&self, collection: &str, id: &str, body: &Value) -> RepoResult<()>;
    fn delete(&self, collection: &str, id: &str) -> RepoResult<()>;

    /// Runs `apply` as one batch; an error undoes every write it made.
    fn atomic(&self, apply: &mut dyn FnMut() -> RepoResult<()>) -> RepoResult<()>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for &S {
    fn list(&self, collection: &str) -> RepoResult<Vec<Document>> {
        (**self).list(collection)
    }

    fn get(&self, collection: &str, id: &str) -> RepoResult<Option<Document>> {
        (**self).get(collection, id)
    }

    fn set(&self, collection: &str, id: &str, body: &Value) -> RepoResult<()> {
        (**self).set(collection, id, body)
    }

    fn delete(&self, collection: &str, id: &str) -> RepoResult<()> {
        (**self).delete(collection, id)
    }

    fn atomic(&self, apply: &mut dyn FnMut() -> RepoResult<()>) -> RepoResult<()> {
        (**self).atomic(apply)
    }
}

/// SQLite-backed document store over the `documents` table.
pub struct SqliteDocumentStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDocumentStore<'conn> {
    /// Constructs a store from a migrated connection.
    ///
    /// # Errors
    /// - `InvalidData` when the `documents` table is missing.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'documents'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::InvalidData(
                "documents table missing; open the database with open_db".to_string(),
            ));
        }
        Ok(Self { conn })
    }
}

impl DocumentStore for SqliteDocumentStore<'_> {
    fn list(&self, collection: &str) -> RepoResult<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT doc_id, body
             FROM documents
             WHERE collection = ?1
             ORDER BY rowid ASC;",
        )?;
        let mut rows = stmt.query([collection])?;
        let mut documents = Vec::new();
        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let body: String = row.get(1)?;
            documents.push(parse_document(collection, id, &body)?);
        }
        Ok(documents)
    }

    fn get(&self, collection: &str, id: &str) -> RepoResult<Option<Document>> {
        let body = self
            .conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND doc_id = ?2;",
                params![collection, id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        body.map(|body| parse_document(collection, id.to_string(), &body))
            .transpose()
    }

    fn set(&self, collection: &str, id: &str, body: &Value) -> RepoResult<()> {
        let encoded = serde_json::to_string(body)?;
        self.conn.execute(
            "INSERT INTO documents (collection, doc_id, body) VALUES (?1, ?2, ?3)
             ON CONFLICT(collection, doc_id) DO UPDATE SET
                body = excluded.body,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![collection, id, encoded],
        )?;
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> RepoResult<()> {
        self.conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND doc_id = ?2;",
            params![collection, id],
        )?;
        Ok(())
    }

    fn atomic(&self, apply: &mut dyn FnMut() -> RepoResult<()>) -> RepoResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        apply()?;
        tx.commit()?;
        Ok(())
    }
}

fn parse_document(collection: &str, id: String, body: &str) -> RepoResult<Document> {
    let body = serde_json::from_str(body).map_err(|err| {
        RepoError::InvalidData(format!(
            "document `{collection}/{id}` holds invalid JSON: {err}"
        ))
    })?;
    Ok(Document { id, body })
}

/// In-memory document store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RefCell<BTreeMap<String, Vec<Document>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the paths of collections that currently hold documents.
    pub fn collection_paths(&self) -> Vec<String> {
        self.collections
            .borrow()
            .iter()
            .filter(|(_, documents)| !documents.is_empty())
            .map(|(path, _)| path.clone())
            .collect()
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn list(&self, collection: &str) -> RepoResult<Vec<Document>> {
        Ok(self
            .collections
            .borrow()
            .get(collection)
            .cloned()
            .unwrap_or_default())
    }

    fn get(&self, collection: &str, id: &str) -> RepoResult<Option<Document>> {
        Ok(self
            .collections
            .borrow()
            .get(collection)
            .and_then(|documents| documents.iter().find(|doc| doc.id == id).cloned()))
    }

    fn set(&self, collection: &str, id: &str, body: &Value) -> RepoResult<()> {
        let mut collections = self.collections.borrow_mut();
        let documents = collections.entry(collection.to_string()).or_default();
        match documents.iter_mut().find(|doc| doc.id == id) {
            Some(existing) => existing.body = body.clone(),
            None => documents.push(Document {
                id: id.to_string(),
                body: body.clone(),
            }),
        }
        Ok(())
    }

    fn delete(&self, collection: &str, id: &str) -> RepoResult<()> {
        if let Some(documents) = self.collections.borrow_mut().get_mut(collection) {
            documents.retain(|doc| doc.id != id);
        }
        Ok(())
    }

    fn atomic(&self, apply: &mut dyn FnMut() -> RepoResult<()>) -> RepoResult<()> {
        let snapshot = self.collections.borrow().clone();
        let result = apply();
        if result.is_err() {
            *self.collections.borrow_mut() = snapshot;
        }
        result
    }
}
