use self::statement_cache::StatementCache;
use crate::{
    convert::ToParam,
    raw::{InterruptTarget, RawConnection, RawStatement, TraceCallback},
    Error, ErrorKind, Result, Statement,
};
use std::{
    ffi::CString,
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

mod builder;
mod flags;
mod statement_cache;

pub use self::{builder::*, flags::*};

pub(crate) const DEFAULT_STATEMENT_CACHE_CAPACITY: usize = 32;

/// A SQLite3 connection.
///
/// All operations block the calling thread until SQLite returns. A
/// connection can be moved to another thread but not shared; the only
/// operation meant to be used from another thread while it runs is
/// interrupting, through an [`InterruptHandle`].
///
/// # Example
///
/// ```
/// let mut conn = bsqlite::Connection::builder().open_memory()?;
/// conn.exec("CREATE TABLE person (name TEXT, age INTEGER)", &[])?;
/// conn.exec(
///     "INSERT INTO person (name, age) VALUES (?, ?)",
///     bsqlite::params!["Jeremy", 50],
/// )?;
/// assert_eq!(conn.count("SELECT COUNT(*) FROM person", &[])?, 1);
/// # bsqlite::Result::<()>::Ok(())
/// ```
pub struct Connection {
    handle: Option<RawConnection>,
    path: PathBuf,
    flags: OpenFlags,

    /// Amount of `begin` calls not yet matched by `end`.
    transaction_depth: u32,

    cache: StatementCache,
    interrupt: Arc<Mutex<InterruptTarget>>,

    /// Must outlive its registration on `handle`.
    trace: Option<Box<TraceCallback>>,
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("path", &self.path)
            .field("flags", &self.flags)
            .field("open", &self.is_open())
            .finish_non_exhaustive()
    }
}

impl Connection {
    pub(crate) fn open_with(path: &Path, flags: OpenFlags, cache_capacity: usize) -> Result<Self> {
        let path_str = path.to_str().ok_or_else(|| {
            Error::new(ErrorKind::InvalidPath, "path must be convertible to utf-8")
        })?;
        let c_path = CString::new(path_str).map_err(|_| {
            Error::new(
                ErrorKind::InvalidPath,
                "path cannot contain nul characters",
            )
        })?;

        tracing::info!(
            version = crate::library_version(),
            path = %path.display(),
            ?flags,
            "opening database"
        );
        let handle = match RawConnection::open(&c_path, flags.bits()) {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to open database");
                return Err(e);
            }
        };

        Ok(Self {
            interrupt: InterruptTarget::shared(&handle),
            handle: Some(handle),
            path: path.to_owned(),
            flags,

            transaction_depth: 0,

            cache: StatementCache::new(cache_capacity),
            trace: None,
        })
    }

    /// Open the database at `path`.
    ///
    /// Use [`Connection::builder`] for more options.
    pub fn open(path: impl AsRef<Path>, flags: OpenFlags) -> Result<Self> {
        Self::open_with(path.as_ref(), flags, DEFAULT_STATEMENT_CACHE_CAPACITY)
    }

    /// Open the database at `path` for reading and writing, creating it
    /// if needed.
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(path, OpenFlags::default())
    }

    /// Create a new [`ConnectionBuilder`].
    ///
    /// Shorthand for [`ConnectionBuilder::new`].
    pub fn builder() -> ConnectionBuilder {
        ConnectionBuilder::new()
    }

    /// Close the connection.
    ///
    /// Cached statements are finalized before the handle is released.
    /// Fails with [`NotOpened`](ErrorKind::NotOpened) if already closed.
    /// If SQLite refuses to close, the connection stays open and
    /// [`CloseFailed`](ErrorKind::CloseFailed) is returned.
    pub fn close(&mut self) -> Result<()> {
        let handle = self.handle.take().ok_or(ErrorKind::NotOpened)?;
        self.cache.clear();

        let mut target = lock(&self.interrupt);
        match handle.close() {
            Ok(()) => {
                target.clear();
                drop(target);

                self.transaction_depth = 0;
                self.trace = None;
                tracing::info!(path = %self.path.display(), "closed database");
                Ok(())
            }
            Err((handle, e)) => {
                drop(target);

                tracing::warn!(path = %self.path.display(), error = %e, "failed to close database");
                self.handle = Some(handle);
                Err(e)
            }
        }
    }

    /// Whether the connection is open.
    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Path the connection was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flags the connection was opened with.
    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// Set how long to wait for a lock held by another connection before
    /// failing with [`DatabaseBusy`](ErrorKind::DatabaseBusy).
    ///
    /// Needed whenever more than one connection writes the same file.
    pub fn set_busy_timeout(&self, busy_timeout: Duration) -> Result<()> {
        self.raw()?.set_busy_timeout(busy_timeout)
    }

    /// Rows modified by the most recent statement.
    pub fn changes(&self) -> Result<i64> {
        Ok(self.raw()?.changes())
    }

    /// Rows modified since the connection was opened.
    pub fn total_changes(&self) -> Result<i64> {
        Ok(self.raw()?.total_changes())
    }

    /// Execute `sql`.
    ///
    /// Without parameters, `sql` may hold several statements separated by
    /// `;`. With parameters, it must hold exactly one statement, which is
    /// prepared without the cache, bound and stepped once.
    ///
    /// # Example
    ///
    /// ```
    /// # let conn = bsqlite::Connection::builder().open_memory()?;
    /// conn.exec(
    ///     r#"CREATE TABLE user (user_id INT, secret TEXT);
    ///        CREATE TABLE product (key TEXT);"#,
    ///     &[],
    /// )?;
    /// conn.exec("INSERT INTO product (key) VALUES (?)", bsqlite::params!["apple"])?;
    /// # bsqlite::Result::<()>::Ok(())
    /// ```
    pub fn exec(&self, sql: &str, params: &[&dyn ToParam]) -> Result<()> {
        if params.is_empty() {
            return self.raw()?.exec(sql);
        }

        let mut statement = self.prepare(sql)?;
        statement.bind(params)?.step()?;
        Ok(())
    }

    /// Prepare a statement, bypassing the statement cache.
    ///
    /// Fails with [`NoStatementPrepared`](ErrorKind::NoStatementPrepared) if
    /// `sql` holds no statement, and with
    /// [`TooManyStatements`](ErrorKind::TooManyStatements) if it holds more
    /// than one.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        Ok(Statement::new(self.prepare_raw(sql)?))
    }

    fn prepare_raw(&self, sql: &str) -> Result<RawStatement> {
        let handle = self.raw()?;
        let Some((statement, consumed)) = handle.prepare(sql)? else {
            return Err(Error::new(
                ErrorKind::NoStatementPrepared,
                "sql does not contain a statement",
            ));
        };

        // A tail holding only whitespace and comments prepares to nothing.
        let tail = sql.get(consumed..).unwrap_or_default();
        if !tail.trim().is_empty() && !matches!(handle.prepare(tail), Ok(None)) {
            return Err(Error::new(
                ErrorKind::TooManyStatements,
                "sql contains more than one statement",
            ));
        }

        tracing::trace!(sql, "prepared statement");
        Ok(statement)
    }

    /// Run a cached statement.
    ///
    /// The statement prepared from `sql` is taken from the cache, or
    /// prepared and cached on first use. `params` are bound positionally and
    /// `f` drives the execution. The statement is reset afterwards, whether
    /// binding or `f` failed or not.
    ///
    /// A cached statement is never shared between two executions.
    ///
    /// # Example
    ///
    /// ```
    /// # let mut conn = bsqlite::Connection::builder().open_memory()?;
    /// # conn.exec("CREATE TABLE user (user_id INT, secret TEXT)", &[])?;
    /// # conn.exec("INSERT INTO user (user_id, secret) VALUES (1, ':)')", &[])?;
    /// let secrets: Vec<String> = conn.query(
    ///     "SELECT secret FROM user WHERE user_id = ?",
    ///     bsqlite::params![1],
    ///     |statement| statement.fetch_rows(|row| row.column(0)),
    /// )?;
    /// assert_eq!(secrets, [":)"]);
    /// # bsqlite::Result::<()>::Ok(())
    /// ```
    pub fn query<T>(
        &mut self,
        sql: &str,
        params: &[&dyn ToParam],
        f: impl FnOnce(&mut Statement<'_>) -> Result<T>,
    ) -> Result<T> {
        let raw = match self.cache.take(sql) {
            Some(raw) => {
                tracing::trace!(sql, "statement cache hit");
                raw
            }
            None => self.prepare_raw(sql)?,
        };

        let mut statement = Statement::new(raw);
        let result = statement.bind(params).and_then(f);
        let reset = statement.reset();
        self.cache.insert(sql, statement.into_raw());

        let value = result?;
        reset?;
        Ok(value)
    }

    /// Run a cached statement to completion, discarding rows.
    pub fn execute(&mut self, sql: &str, params: &[&dyn ToParam]) -> Result<()> {
        self.query(sql, params, |statement| statement.execute())
    }

    /// Run a cached statement and decode its first row with `f`.
    ///
    /// Fails with [`NotFound`](ErrorKind::NotFound) if there are no rows.
    pub fn query_row<T>(
        &mut self,
        sql: &str,
        params: &[&dyn ToParam],
        f: impl FnOnce(&Statement<'_>) -> Result<T>,
    ) -> Result<T> {
        self.query(sql, params, |statement| statement.fetch_one(f))
    }

    /// Run a cached statement and read the integer in the first column of
    /// its first row, or `0` if there are no rows or the value is `NULL`.
    pub fn count(&mut self, sql: &str, params: &[&dyn ToParam]) -> Result<i64> {
        self.query(sql, params, |statement| {
            Ok(statement
                .fetch_row(|row| row.column::<Option<i64>>(0))?
                .flatten()
                .unwrap_or(0))
        })
    }

    /// Amount of statements currently in the statement cache.
    pub fn cached_statements(&self) -> usize {
        self.cache.len()
    }

    /// Open a transaction scope.
    ///
    /// Scopes nest: only the outermost `begin` issues `BEGIN`, and only the
    /// matching outermost [`end`](Self::end) issues `COMMIT`.
    ///
    /// If SQLite already left the transaction the open scopes belonged to,
    /// they are discarded and a new transaction is started.
    pub fn begin(&mut self) -> Result<()> {
        if self.transaction_depth > 0 && self.raw()?.is_autocommit() {
            tracing::warn!(
                path = %self.path.display(),
                depth = self.transaction_depth,
                "transaction was rolled back by sqlite, starting a new one"
            );
            self.transaction_depth = 0;
        }
        if self.transaction_depth == 0 {
            self.raw()?.exec("BEGIN;")?;
            tracing::debug!(path = %self.path.display(), "transaction started");
        }
        self.transaction_depth += 1;
        Ok(())
    }

    /// Close a transaction scope opened by [`begin`](Self::begin).
    ///
    /// Closing the outermost scope commits. Fails with
    /// [`Misuse`](ErrorKind::Misuse) if no scope is open. If `COMMIT` fails
    /// the scope stays open.
    ///
    /// If SQLite already rolled the transaction back on its own, for example
    /// after an interrupted write, every scope is discarded and
    /// [`OperationAborted`](ErrorKind::OperationAborted) is returned.
    pub fn end(&mut self) -> Result<()> {
        let handle = self.raw()?;
        match self.transaction_depth {
            0 => Err(Error::new(
                ErrorKind::Misuse,
                "end called without a matching begin",
            )),
            depth if handle.is_autocommit() => {
                self.transaction_depth = 0;
                tracing::debug!(path = %self.path.display(), depth, "transaction already rolled back");
                Err(Error::new(
                    ErrorKind::OperationAborted,
                    "transaction was rolled back by sqlite",
                ))
            }
            1 => {
                handle.exec("COMMIT;")?;
                self.transaction_depth = 0;
                tracing::debug!(path = %self.path.display(), "transaction committed");
                Ok(())
            }
            _ => {
                self.transaction_depth -= 1;
                Ok(())
            }
        }
    }

    /// Abandon every open transaction scope, rolling back the transaction.
    ///
    /// SQLite may already have rolled back on its own, for example after an
    /// interrupted write; `ROLLBACK` is only issued if a transaction is
    /// still active.
    pub fn rollback(&mut self) -> Result<()> {
        let handle = self.raw()?;
        if !handle.is_autocommit() {
            handle.exec("ROLLBACK;")?;
            tracing::debug!(path = %self.path.display(), "transaction rolled back");
        }
        self.transaction_depth = 0;
        Ok(())
    }

    /// Amount of open transaction scopes.
    pub fn transaction_depth(&self) -> u32 {
        self.transaction_depth
    }

    /// Whether SQLite is outside of any transaction.
    pub fn is_autocommit(&self) -> Result<bool> {
        Ok(self.raw()?.is_autocommit())
    }

    /// Names of all tables, in catalog order.
    pub fn table_names(&self) -> Result<Vec<String>> {
        self.prepare("SELECT tbl_name FROM sqlite_master WHERE type = 'table'")?
            .fetch_rows(|row| row.column(0))
    }

    /// Read `PRAGMA user_version`. `0` on a new database.
    pub fn user_version(&mut self) -> Result<i32> {
        self.query_row("PRAGMA user_version", &[], |row| row.column(0))
    }

    /// Write `PRAGMA user_version`.
    pub fn set_user_version(&self, version: i32) -> Result<()> {
        self.raw()?
            .exec(&format!("PRAGMA user_version = {version}"))
    }

    /// Interrupt the running operation, if any.
    ///
    /// The operation fails with
    /// [`OperationInterrupted`](ErrorKind::OperationInterrupted) at its next
    /// checkpoint. Work already committed is not affected. To interrupt from
    /// another thread, use [`interrupt_handle`](Self::interrupt_handle).
    pub fn cancel(&self) {
        if let Some(handle) = &self.handle {
            handle.interrupt();
        }
    }

    /// Get a handle that interrupts this connection from any thread.
    pub fn interrupt_handle(&self) -> InterruptHandle {
        InterruptHandle {
            target: self.interrupt.clone(),
        }
    }

    /// Call `f` with the SQL text of every statement SQLite starts running,
    /// replacing any previous callback.
    ///
    /// A panic inside `f` is caught and logged; it does not reach the
    /// statement being traced.
    pub fn set_trace(&mut self, f: impl FnMut(&str) + Send + 'static) -> Result<()> {
        let handle = self.raw()?;
        let callback: TraceCallback = Box::new(f);
        let mut callback = Box::new(callback);
        unsafe { handle.set_trace(Some(&mut *callback as *mut TraceCallback))? };
        self.trace = Some(callback);
        Ok(())
    }

    /// Remove the callback installed by [`set_trace`](Self::set_trace).
    pub fn clear_trace(&mut self) -> Result<()> {
        unsafe { self.raw()?.set_trace(None)? };
        self.trace = None;
        Ok(())
    }

    fn raw(&self) -> Result<&RawConnection> {
        self.handle
            .as_ref()
            .ok_or_else(|| ErrorKind::NotOpened.into())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.is_open() {
            return;
        }
        if let Err(e) = self.close() {
            tracing::error!(path = %self.path.display(), error = %e, "leaking unclosable database");
            if let Some(handle) = &self.handle {
                let _ = unsafe { handle.set_trace(None) };
            }
        }
    }
}

/// Interrupt handle for a connection.
///
/// Can be sent to and used from any thread. Once the connection is closed,
/// interrupting does nothing.
#[derive(Clone)]
pub struct InterruptHandle {
    target: Arc<Mutex<InterruptTarget>>,
}

impl fmt::Debug for InterruptHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("InterruptHandle").finish_non_exhaustive()
    }
}

impl InterruptHandle {
    /// Interrupt.
    ///
    /// Interrupting an operation is inherently prone to race conditions:
    /// an operation that has not started yet is not affected.
    pub fn interrupt(&self) {
        lock(&self.target).interrupt();
    }
}

fn lock(target: &Mutex<InterruptTarget>) -> MutexGuard<'_, InterruptTarget> {
    target.lock().unwrap_or_else(PoisonError::into_inner)
}
