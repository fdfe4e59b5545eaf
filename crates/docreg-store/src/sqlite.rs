//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for the registry. It uses rusqlite
//! with bundled SQLite behind a single mutex-guarded connection.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, Connection, OptionalExtension};

use docreg_core::{ContentHash, DocumentId, DocumentKey, DocumentRecord, Height, Principal};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// Key of the admin scalar in `registry_meta`.
const ADMIN_KEY: &str = "admin";

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. Every trait method holds the lock for
/// its whole duration, so each call is one atomic step.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        tracing::debug!(path = %path.display(), "opened sqlite store");
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Execute an operation on the connection.
    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(StoreError::poisoned)?;
        f(&conn)
    }

    /// Execute an operation that needs mutable access (transactions).
    fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock().map_err(StoreError::poisoned)?;
        f(&mut conn)
    }
}

/// A documents row before its columns are checked.
struct DocumentRow {
    hash: Vec<u8>,
    registered_at: i64,
    jurisdiction: Option<String>,
    metadata_locator: Option<String>,
}

impl DocumentRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            hash: row.get("hash")?,
            registered_at: row.get("registered_at")?,
            jurisdiction: row.get("jurisdiction")?,
            metadata_locator: row.get("metadata_locator")?,
        })
    }

    fn into_record(self) -> Result<DocumentRecord> {
        Ok(DocumentRecord {
            hash: hash_from_blob(&self.hash, "hash")?,
            registered_at: height_from_sql(self.registered_at),
            jurisdiction: self.jurisdiction,
            metadata_locator: self.metadata_locator,
        })
    }
}

fn hash_from_blob(bytes: &[u8], column: &str) -> Result<ContentHash> {
    ContentHash::try_from(bytes).map_err(|_| {
        StoreError::InvalidData(format!(
            "{} has {} bytes, expected 32",
            column,
            bytes.len()
        ))
    })
}

// Heights are stored bit-for-bit in the signed INTEGER column, so
// registered_at must never be compared or ordered in SQL.
fn height_to_sql(height: Height) -> i64 {
    height.get() as i64
}

fn height_from_sql(value: i64) -> Height {
    Height(value as u64)
}

impl Store for SqliteStore {
    fn insert_document(&self, key: &DocumentKey, record: &DocumentRecord) -> Result<InsertResult> {
        let registered_at = height_to_sql(record.registered_at);

        self.with_conn(|conn| {
            // OR IGNORE keeps the first record; the row count tells us which
            // case we hit.
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO documents (
                    owner, document_id, hash, registered_at, jurisdiction, metadata_locator
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    key.owner.as_str(),
                    key.document_id.as_str(),
                    record.hash.as_bytes().as_slice(),
                    registered_at,
                    record.jurisdiction.as_deref(),
                    record.metadata_locator.as_deref(),
                ],
            )?;

            Ok(if inserted == 0 {
                InsertResult::AlreadyExists
            } else {
                InsertResult::Inserted
            })
        })
    }

    fn get_document(&self, key: &DocumentKey) -> Result<Option<DocumentRecord>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT hash, registered_at, jurisdiction, metadata_locator
                     FROM documents WHERE owner = ?1 AND document_id = ?2",
                    params![key.owner.as_str(), key.document_id.as_str()],
                    DocumentRow::from_row,
                )
                .optional()?;

            row.map(DocumentRow::into_record).transpose()
        })
    }

    fn has_document(&self, key: &DocumentKey) -> Result<bool> {
        self.with_conn(|conn| {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM documents WHERE owner = ?1 AND document_id = ?2)",
                params![key.owner.as_str(), key.document_id.as_str()],
                |row| row.get(0),
            )?;
            Ok(exists)
        })
    }

    fn documents_by_owner(&self, owner: &Principal) -> Result<Vec<(DocumentId, DocumentRecord)>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT document_id, hash, registered_at, jurisdiction, metadata_locator
                 FROM documents WHERE owner = ?1
                 ORDER BY document_id",
            )?;

            let rows = stmt
                .query_map(params![owner.as_str()], |row| {
                    let id: String = row.get("document_id")?;
                    Ok((id, DocumentRow::from_row(row)?))
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter()
                .map(|(id, row)| -> Result<(DocumentId, DocumentRecord)> {
                    let id = DocumentId::new(id)
                        .map_err(|e| StoreError::InvalidData(e.to_string()))?;
                    Ok((id, row.into_record()?))
                })
                .collect()
        })
    }

    fn document_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    fn set_successor(&self, old: &ContentHash, new: &ContentHash) -> Result<Option<ContentHash>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let previous: Option<Vec<u8>> = tx
                .query_row(
                    "SELECT new_hash FROM versions WHERE old_hash = ?1",
                    params![old.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            tx.execute(
                "INSERT INTO versions (old_hash, new_hash) VALUES (?1, ?2)
                 ON CONFLICT(old_hash) DO UPDATE SET new_hash = excluded.new_hash",
                params![old.as_bytes().as_slice(), new.as_bytes().as_slice()],
            )?;

            tx.commit()?;

            previous
                .map(|bytes| hash_from_blob(&bytes, "new_hash"))
                .transpose()
        })
    }

    fn get_successor(&self, hash: &ContentHash) -> Result<Option<ContentHash>> {
        self.with_conn(|conn| {
            let successor: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT new_hash FROM versions WHERE old_hash = ?1",
                    params![hash.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;

            successor
                .map(|bytes| hash_from_blob(&bytes, "new_hash"))
                .transpose()
        })
    }

    fn load_admin(&self) -> Result<Option<Principal>> {
        self.with_conn(|conn| {
            let admin: Option<String> = conn
                .query_row(
                    "SELECT value FROM registry_meta WHERE key = ?1",
                    params![ADMIN_KEY],
                    |row| row.get(0),
                )
                .optional()?;

            admin
                .map(|s| Principal::new(s).map_err(|e| StoreError::InvalidData(e.to_string())))
                .transpose()
        })
    }

    fn store_admin(&self, admin: &Principal) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO registry_meta (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![ADMIN_KEY, admin.as_str()],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(owner: &str, id: &str) -> DocumentKey {
        DocumentKey::new(Principal::new(owner).unwrap(), DocumentId::new(id).unwrap())
    }

    fn h(n: u8) -> ContentHash {
        ContentHash::from_bytes([n; 32])
    }

    #[test]
    fn test_insert_and_get_document() {
        let store = SqliteStore::open_memory().unwrap();
        let k = key("ST2USER", "abcd1234");
        let record = DocumentRecord::new(h(1), Height(1000))
            .with_jurisdiction(Some("NG".into()))
            .with_metadata_locator(Some("ipfs://hash".into()));

        let result = store.insert_document(&k, &record).unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let retrieved = store.get_document(&k).unwrap().unwrap();
        assert_eq!(retrieved, record);
        assert!(store.has_document(&k).unwrap());
    }

    #[test]
    fn test_insert_once() {
        let store = SqliteStore::open_memory().unwrap();
        let k = key("ST2USER", "abcd1234");

        let r1 = store
            .insert_document(&k, &DocumentRecord::new(h(1), Height(1)))
            .unwrap();
        assert_eq!(r1, InsertResult::Inserted);

        let r2 = store
            .insert_document(&k, &DocumentRecord::new(h(2), Height(2)))
            .unwrap();
        assert_eq!(r2, InsertResult::AlreadyExists);

        let kept = store.get_document(&k).unwrap().unwrap();
        assert_eq!(kept.hash, h(1));
        assert_eq!(kept.registered_at, Height(1));
    }

    #[test]
    fn test_absent_optionals_roundtrip_as_none() {
        let store = SqliteStore::open_memory().unwrap();
        let k = key("U1", "D1");
        let record = DocumentRecord::new(h(1), Height(5)).with_jurisdiction(Some(String::new()));
        store.insert_document(&k, &record).unwrap();

        let back = store.get_document(&k).unwrap().unwrap();
        assert_eq!(back.jurisdiction.as_deref(), Some(""));
        assert_eq!(back.metadata_locator, None);
    }

    #[test]
    fn test_full_height_range_roundtrips() {
        let store = SqliteStore::open_memory().unwrap();
        let heights = [0, i64::MAX as u64, i64::MAX as u64 + 1, u64::MAX];

        for (i, height) in heights.iter().enumerate() {
            let k = key("U1", &format!("D{}", i));
            store
                .insert_document(&k, &DocumentRecord::new(h(1), Height(*height)))
                .unwrap();
            assert_eq!(
                store.get_document(&k).unwrap().unwrap().registered_at,
                Height(*height)
            );
        }
    }

    #[test]
    fn test_documents_by_owner() {
        let store = SqliteStore::open_memory().unwrap();
        store
            .insert_document(&key("U1", "b"), &DocumentRecord::new(h(2), Height(2)))
            .unwrap();
        store
            .insert_document(&key("U1", "a"), &DocumentRecord::new(h(1), Height(1)))
            .unwrap();
        store
            .insert_document(&key("U2", "a"), &DocumentRecord::new(h(3), Height(3)))
            .unwrap();

        let docs = store
            .documents_by_owner(&Principal::new("U1").unwrap())
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].0.as_str(), "a");
        assert_eq!(docs[1].1.hash, h(2));
        assert_eq!(store.document_count().unwrap(), 3);
    }

    #[test]
    fn test_successor_upsert() {
        let store = SqliteStore::open_memory().unwrap();

        assert_eq!(store.set_successor(&h(1), &h(2)).unwrap(), None);
        assert_eq!(store.get_successor(&h(1)).unwrap(), Some(h(2)));

        assert_eq!(store.set_successor(&h(1), &h(4)).unwrap(), Some(h(2)));
        assert_eq!(store.get_successor(&h(1)).unwrap(), Some(h(4)));
        assert_eq!(store.get_successor(&h(2)).unwrap(), None);
    }

    #[test]
    fn test_admin_upsert() {
        let store = SqliteStore::open_memory().unwrap();
        assert_eq!(store.load_admin().unwrap(), None);

        store.store_admin(&Principal::new("ST1ADMIN").unwrap()).unwrap();
        store.store_admin(&Principal::new("ST3NEWADMIN").unwrap()).unwrap();
        assert_eq!(
            store.load_admin().unwrap().unwrap().as_str(),
            "ST3NEWADMIN"
        );
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .insert_document(&key("U1", "D1"), &DocumentRecord::new(h(1), Height(7)))
                .unwrap();
            store.set_successor(&h(1), &h(2)).unwrap();
            store.store_admin(&Principal::new("A1").unwrap()).unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(
            store.get_document(&key("U1", "D1")).unwrap().unwrap().registered_at,
            Height(7)
        );
        assert_eq!(store.get_successor(&h(1)).unwrap(), Some(h(2)));
        assert_eq!(store.load_admin().unwrap().unwrap().as_str(), "A1");
    }
}
