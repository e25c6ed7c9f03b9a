bitflags::bitflags! {
    /// Flags for opening a database, see
    /// [`sqlite3_open_v2`](https://www.sqlite.org/c3ref/open.html).
    ///
    /// The default is `READ_WRITE | CREATE`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct OpenFlags: i32 {
        /// Open for reading only. The database must exist.
        const READ_ONLY = libsqlite3_sys::SQLITE_OPEN_READONLY;
        /// Open for reading and writing if the file permissions allow it.
        const READ_WRITE = libsqlite3_sys::SQLITE_OPEN_READWRITE;
        /// Create the database if it does not exist. Requires `READ_WRITE`.
        const CREATE = libsqlite3_sys::SQLITE_OPEN_CREATE;
        /// Interpret the path as a URI.
        const URI = libsqlite3_sys::SQLITE_OPEN_URI;
        /// Open an in-memory database.
        const MEMORY = libsqlite3_sys::SQLITE_OPEN_MEMORY;
        /// Multi-thread mode: the connection must not be used from two
        /// threads at once.
        const NO_MUTEX = libsqlite3_sys::SQLITE_OPEN_NOMUTEX;
        /// Serialized mode: SQLite locks the connection around every call.
        const FULL_MUTEX = libsqlite3_sys::SQLITE_OPEN_FULLMUTEX;
        /// Use the shared cache. Discouraged by the SQLite docs.
        const SHARED_CACHE = libsqlite3_sys::SQLITE_OPEN_SHAREDCACHE;
        /// Use a private cache even if shared cache is enabled globally.
        const PRIVATE_CACHE = libsqlite3_sys::SQLITE_OPEN_PRIVATECACHE;
    }
}

impl Default for OpenFlags {
    #[inline]
    fn default() -> Self {
        Self::READ_WRITE | Self::CREATE
    }
}
