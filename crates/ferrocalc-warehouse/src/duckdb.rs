//! `DuckDB` connection pool management.
//!
//! The pool opens the database file once. Further connections are cloned
//! from that root connection, so every pooled connection shares one database
//! instance and sees the others' committed writes.

use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ::duckdb::Connection;

struct PoolInner {
    db_path: PathBuf,
    max_pool_size: usize,
    root: Mutex<Connection>,
    idle: Mutex<Vec<Connection>>,
}

/// A connection pool manager for `DuckDB` connections.
#[derive(Clone)]
pub struct DuckDbConnectionManager {
    inner: Arc<PoolInner>,
}

impl DuckDbConnectionManager {
    /// Opens the database at `path` and prepares a pool of at most
    /// `max_pool_size` idle connections.
    ///
    /// # Errors
    /// Returns an error if the database file cannot be opened or configured.
    pub fn open(path: impl Into<PathBuf>, max_pool_size: usize) -> Result<Self, ::duckdb::Error> {
        let db_path = path.into();
        let root = Connection::open(db_path.as_path())?;
        configure_connection(&root)?;

        Ok(Self {
            inner: Arc::new(PoolInner {
                db_path,
                max_pool_size: max_pool_size.max(1),
                root: Mutex::new(root),
                idle: Mutex::new(Vec::new()),
            }),
        })
    }

    /// Acquire a connection from the pool, cloning a new one when none is idle.
    ///
    /// # Errors
    /// Returns an error if a new connection cannot be created or configured.
    pub fn acquire(&self) -> Result<PooledConnection, ::duckdb::Error> {
        let idle = lock(&self.inner.idle).pop();

        let connection = match idle {
            Some(connection) => connection,
            None => {
                let connection = lock(&self.inner.root).try_clone()?;
                configure_connection(&connection)?;
                connection
            }
        };

        Ok(PooledConnection {
            pool: Arc::clone(&self.inner),
            connection: Some(connection),
            discarded: false,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        self.inner.db_path.as_path()
    }

    /// Number of idle connections currently held by the pool.
    #[must_use]
    pub fn idle_count(&self) -> usize {
        lock(&self.inner.idle).len()
    }
}

/// A pooled connection that returns to the pool when dropped.
pub struct PooledConnection {
    pool: Arc<PoolInner>,
    connection: Option<Connection>,
    discarded: bool,
}

impl PooledConnection {
    /// Close this connection on drop instead of returning it to the pool.
    ///
    /// Used when the connection may still hold an open transaction.
    pub fn discard(&mut self) {
        self.discarded = true;
    }
}

impl Deref for PooledConnection {
    type Target = Connection;

    fn deref(&self) -> &Self::Target {
        match self.connection.as_ref() {
            Some(connection) => connection,
            None => unreachable!("connection is only taken in drop"),
        }
    }
}

impl DerefMut for PooledConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self.connection.as_mut() {
            Some(connection) => connection,
            None => unreachable!("connection is only taken in drop"),
        }
    }
}

impl Drop for PooledConnection {
    fn drop(&mut self) {
        let Some(connection) = self.connection.take() else {
            return;
        };
        if self.discarded {
            return;
        }

        let mut idle = lock(&self.pool.idle);
        if idle.len() < self.pool.max_pool_size {
            idle.push(connection);
        }
    }
}

// A panic while holding the lock cannot leave the Vec or Connection half-updated.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn configure_connection(connection: &Connection) -> Result<(), ::duckdb::Error> {
    connection.execute_batch("PRAGMA disable_progress_bar;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn released_connections_are_reused_up_to_the_cap() {
        let temp = tempdir().expect("tempdir");
        let manager =
            DuckDbConnectionManager::open(temp.path().join("pool.duckdb"), 1).expect("open");

        let first = manager.acquire().expect("first");
        let second = manager.acquire().expect("second");
        drop(first);
        drop(second);

        assert_eq!(manager.idle_count(), 1);
    }

    #[test]
    fn cloned_connections_share_the_database() {
        let temp = tempdir().expect("tempdir");
        let manager =
            DuckDbConnectionManager::open(temp.path().join("pool.duckdb"), 2).expect("open");

        let writer = manager.acquire().expect("writer");
        let reader = manager.acquire().expect("reader");
        writer
            .execute_batch("CREATE TABLE t (v INTEGER); INSERT INTO t VALUES (7);")
            .expect("write");

        let value: i64 = reader
            .query_row("SELECT v FROM t", [], |row| row.get(0))
            .expect("read");
        assert_eq!(value, 7);
    }

    #[test]
    fn discarded_connections_are_not_reused() {
        let temp = tempdir().expect("tempdir");
        let manager =
            DuckDbConnectionManager::open(temp.path().join("pool.duckdb"), 2).expect("open");

        let mut broken = manager.acquire().expect("broken");
        broken.execute_batch("BEGIN TRANSACTION").expect("begin");
        broken.discard();
        drop(broken);
        assert_eq!(manager.idle_count(), 0);

        drop(manager.acquire().expect("healthy"));
        assert_eq!(manager.idle_count(), 1);
    }
}
