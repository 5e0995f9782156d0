//! Raw key-value backends.
//!
//! # Responsibility
//! - Define the flat string-to-string store contract that the namespacer
//!   builds on (the native counterpart of browser local storage).
//! - Provide an in-memory backend with an optional quota and a persistent
//!   SQLite backend.
//!
//! # Invariants
//! - Backends know nothing about prefixes or JSON; values are opaque text.
//! - `set_item` replaces the whole value for a key.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

mod memory;
mod sqlite;

pub use memory::MemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

pub type KvResult<T> = Result<T, KvError>;

/// Backend-level failure. Only the namespacer sees these.
#[derive(Debug)]
pub enum KvError {
    Db(DbError),
    QuotaExceeded {
        key: String,
        required_bytes: usize,
        quota_bytes: usize,
    },
}

impl Display for KvError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::QuotaExceeded {
                key,
                required_bytes,
                quota_bytes,
            } => write!(
                f,
                "quota exceeded writing `{key}`: {required_bytes} bytes required, {quota_bytes} allowed"
            ),
        }
    }
}

impl Error for KvError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::QuotaExceeded { .. } => None,
        }
    }
}

impl From<DbError> for KvError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for KvError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Flat, shared key-value container.
///
/// Implementations use interior mutability so one backend can be shared by
/// the namespacer and by callers that inspect unrelated keys.
pub trait KeyValueStore: Send + Sync {
    fn get_item(&self, key: &str) -> KvResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> KvResult<()>;
    fn remove_item(&self, key: &str) -> KvResult<()>;
    /// Every key currently present, including ones owned by other prefixes.
    fn keys(&self) -> KvResult<Vec<String>>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_item(&self, key: &str) -> KvResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> KvResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> KvResult<()> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> KvResult<Vec<String>> {
        (**self).keys()
    }
}
