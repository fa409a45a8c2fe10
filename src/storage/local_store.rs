// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded key/value store backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `session_keys`: key → value (UTF-8 strings)

use std::path::Path;

use redb::{Database, ReadableDatabase, TableDefinition};

/// Single table: key → value.
const SESSION_KEYS: TableDefinition<&str, &str> = TableDefinition::new("session_keys");

#[derive(Debug, thiserror::Error)]
pub enum LocalStoreError {
    #[error("redb error: {0}")]
    Redb(#[from] redb::Error),

    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),
}

pub type LocalStoreResult<T> = Result<T, LocalStoreError>;

/// Embedded ACID key/value store.
pub struct LocalStore {
    db: Database,
}

impl LocalStore {
    /// Open (or create) the store at the given path.
    pub fn open(path: impl AsRef<Path>) -> LocalStoreResult<Self> {
        let path = path.as_ref();
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create the table so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(SESSION_KEYS)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> LocalStoreResult<Option<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SESSION_KEYS)?;
        Ok(table.get(key)?.map(|v| v.value().to_string()))
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> LocalStoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION_KEYS)?;
            table.insert(key, value)?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> LocalStoreResult<()> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(SESSION_KEYS)?;
            table.remove(key)?;
        }
        write_txn.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{IS_AUTHENTICATED_KEY, MONERIUM_TOKEN_KEY};

    fn temp_store() -> (tempfile::TempDir, LocalStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::open(&dir.path().join("session.redb")).unwrap();
        (dir, store)
    }

    #[test]
    fn set_get_remove_roundtrip() {
        let (_dir, store) = temp_store();

        assert_eq!(store.get(IS_AUTHENTICATED_KEY).unwrap(), None);

        store.set(IS_AUTHENTICATED_KEY, "true").unwrap();
        assert_eq!(
            store.get(IS_AUTHENTICATED_KEY).unwrap().as_deref(),
            Some("true")
        );

        store.remove(IS_AUTHENTICATED_KEY).unwrap();
        assert_eq!(store.get(IS_AUTHENTICATED_KEY).unwrap(), None);
    }

    #[test]
    fn remove_absent_key_is_ok() {
        let (_dir, store) = temp_store();
        store.remove(MONERIUM_TOKEN_KEY).unwrap();
    }

    #[test]
    fn values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.redb");

        {
            let store = LocalStore::open(&path).unwrap();
            store.set(MONERIUM_TOKEN_KEY, "refresh-token").unwrap();
        }

        let store = LocalStore::open(&path).unwrap();
        assert_eq!(
            store.get(MONERIUM_TOKEN_KEY).unwrap().as_deref(),
            Some("refresh-token")
        );
    }
}
