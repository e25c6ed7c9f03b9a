use super::{Connection, OpenFlags, DEFAULT_STATEMENT_CACHE_CAPACITY};
use crate::Result;
use std::{path::Path, time::Duration};

/// Options for building a [`Connection`].
#[derive(Clone, Debug)]
pub struct ConnectionBuilder {
    flags: OpenFlags,
    busy_timeout: Option<Duration>,
    statement_cache_capacity: usize,
}

impl ConnectionBuilder {
    /// Create a new connection builder.
    ///
    /// # Example
    ///
    /// ```
    /// let conn = bsqlite::ConnectionBuilder::new()
    ///     .open_memory()?;
    /// # bsqlite::Result::<()>::Ok(())
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self {
            flags: OpenFlags::default(),
            busy_timeout: None,
            statement_cache_capacity: DEFAULT_STATEMENT_CACHE_CAPACITY,
        }
    }

    /// Replace the open flags.
    ///
    /// By default, `READ_WRITE | CREATE`.
    #[inline]
    pub fn flags(mut self, flags: OpenFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Allow writing to the database.
    ///
    /// If `false`, database is opened in read-only mode.
    ///
    /// By default, `true`.
    #[inline]
    pub fn write(mut self, write: bool) -> Self {
        self.flags.set(OpenFlags::READ_WRITE, write);
        self.flags.set(OpenFlags::READ_ONLY, !write);
        self
    }

    /// Create the database if it does not already exist.
    ///
    /// Does not do anything unless [`write`](Self::write) is also `true`.
    ///
    /// By default, `true`.
    #[inline]
    pub fn create(mut self, create: bool) -> Self {
        self.flags.set(OpenFlags::CREATE, create);
        self
    }

    /// Set whether shared cache will be used. Shared cache usage is
    /// discouraged by SQLite3 docs.
    ///
    /// By default, `false`.
    #[inline]
    pub fn shared_cache(mut self, shared_cache: bool) -> Self {
        self.flags.set(OpenFlags::SHARED_CACHE, shared_cache);
        self.flags.set(OpenFlags::PRIVATE_CACHE, !shared_cache);
        self
    }

    /// Set whether SQLite serializes every call on the connection.
    ///
    /// By default, `false`.
    #[inline]
    pub fn full_mutex(mut self, full_mutex: bool) -> Self {
        self.flags.set(OpenFlags::FULL_MUTEX, full_mutex);
        self.flags.set(OpenFlags::NO_MUTEX, !full_mutex);
        self
    }

    /// Set how long to wait for a lock held by another connection before
    /// failing with [`DatabaseBusy`](crate::ErrorKind::DatabaseBusy).
    ///
    /// By default, SQLite does not wait.
    #[inline]
    pub fn busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = Some(busy_timeout);
        self
    }

    /// Set the statement cache capacity. `0` disables the cache.
    ///
    /// By default, `32`.
    ///
    /// # Example
    ///
    /// ```
    /// let conn = bsqlite::ConnectionBuilder::new()
    ///     .statement_cache_capacity(1024)
    ///     .open_memory()?;
    /// # bsqlite::Result::<()>::Ok(())
    /// ```
    #[inline]
    pub fn statement_cache_capacity(mut self, statement_cache_capacity: usize) -> Self {
        self.statement_cache_capacity = statement_cache_capacity;
        self
    }

    /// Open a database from a filesystem path.
    ///
    /// The path will not be interpreted as an URI, unlike [`open_uri`](Self::open_uri).
    ///
    /// # Example
    ///
    /// ```no_run
    /// let conn = bsqlite::ConnectionBuilder::new()
    ///     .open("/path/FileOfMyDatabase.sqlite3")?;
    /// # bsqlite::Result::<()>::Ok(())
    /// ```
    pub fn open(self, path: impl AsRef<Path>) -> Result<Connection> {
        let flags = self.flags - OpenFlags::URI;
        self.open_with(path.as_ref(), flags)
    }

    /// Open a database from a URI.
    ///
    /// # Example
    ///
    /// ```no_run
    /// let conn = bsqlite::ConnectionBuilder::new()
    ///     .open_uri("file:/path/FileOfMyDatabase.sqlite3?mode=ro")?;
    /// # bsqlite::Result::<()>::Ok(())
    /// ```
    pub fn open_uri(self, uri: &str) -> Result<Connection> {
        let flags = self.flags | OpenFlags::URI;
        self.open_with(Path::new(uri), flags)
    }

    /// Open a private in-memory database.
    pub fn open_memory(self) -> Result<Connection> {
        let flags = self.flags | OpenFlags::MEMORY;
        self.open_with(Path::new(":memory:"), flags)
    }

    fn open_with(self, path: &Path, mut flags: OpenFlags) -> Result<Connection> {
        if flags.contains(OpenFlags::READ_ONLY) {
            flags.remove(OpenFlags::CREATE);
        }
        let connection = Connection::open_with(path, flags, self.statement_cache_capacity)?;
        if let Some(busy_timeout) = self.busy_timeout {
            connection.set_busy_timeout(busy_timeout)?;
        }
        Ok(connection)
    }
}

impl Default for ConnectionBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}
