use crate::{
    raw::{self, RawStatement},
    Error, ErrorKind, Result,
};
use std::{
    ffi::{c_char, c_int, c_uint, c_void, CStr, CString},
    panic::{self, AssertUnwindSafe},
    ptr::{self, NonNull},
    sync::{Arc, Mutex},
    time::Duration,
};

pub(crate) type TraceCallback = Box<dyn FnMut(&str) + Send>;

/// Owner of a `sqlite3` handle.
///
/// The handle is released by [`RawConnection::close`], never implicitly.
pub(crate) struct RawConnection {
    inner: NonNull<libsqlite3_sys::sqlite3>,
}

// SAFETY: `open` refuses to run on a single-thread SQLite build. In
// multi-thread or serialized mode a handle may move between threads as long
// as it is used by one thread at a time, which `!Sync` guarantees.
unsafe impl Send for RawConnection {}

impl RawConnection {
    pub(crate) fn open(path: &CStr, flags: i32) -> Result<Self> {
        if unsafe { libsqlite3_sys::sqlite3_threadsafe() } == 0 {
            return Err(Error::new(
                ErrorKind::Misuse,
                "sqlite was compiled without thread safety",
            ));
        }

        let mut handle = ptr::null_mut();
        let result = unsafe {
            libsqlite3_sys::sqlite3_open_v2(path.as_ptr(), &mut handle, flags, ptr::null())
        };
        let handle = NonNull::new(handle).ok_or(ErrorKind::OutOfMemory)?;

        let connection = Self { inner: handle };

        if let Err(e) = raw::check(connection.get(), result) {
            // SQLite hands out a handle even when opening fails.
            unsafe { libsqlite3_sys::sqlite3_close(connection.get()) };
            return Err(e);
        }

        Ok(connection)
    }

    pub(crate) fn get(&self) -> *mut libsqlite3_sys::sqlite3 {
        self.inner.as_ptr()
    }

    /// Closes the handle. On failure the handle stays valid and is given back.
    pub(crate) fn close(self) -> Result<(), (Self, Error)> {
        match unsafe { libsqlite3_sys::sqlite3_close(self.get()) } {
            libsqlite3_sys::SQLITE_OK => Ok(()),
            code => {
                let cause = raw::last_error(self.get(), code);
                let error = Error::new(
                    ErrorKind::CloseFailed,
                    format!("failed to close connection: {}", cause.message()),
                );
                Err((self, error))
            }
        }
    }

    pub(crate) fn exec(&self, sql: &str) -> Result<()> {
        let sql = CString::new(sql)
            .map_err(|_| Error::new(ErrorKind::Misuse, "sql cannot contain nul characters"))?;
        raw::check(self.get(), unsafe {
            libsqlite3_sys::sqlite3_exec(
                self.get(),
                sql.as_ptr(),
                None,
                ptr::null_mut(),
                ptr::null_mut(),
            )
        })?;
        Ok(())
    }

    /// Prepares the first statement of `sql`.
    ///
    /// Returns the statement and the amount of bytes consumed, or `None` if
    /// `sql` holds no statement.
    pub(crate) fn prepare(&self, sql: &str) -> Result<Option<(RawStatement, usize)>> {
        let mut handle = ptr::null_mut();
        let mut sql_tail = ptr::null();
        raw::check(self.get(), unsafe {
            libsqlite3_sys::sqlite3_prepare_v2(
                self.get(),
                sql.as_ptr() as _,
                sql.len().try_into().map_err(|_| ErrorKind::TooLarge)?,
                &mut handle,
                &mut sql_tail,
            )
        })?;

        let consumed = if sql_tail.is_null() {
            sql.len()
        } else {
            unsafe { sql_tail.offset_from(sql.as_ptr() as *const c_char) as usize }
        };
        let Some(statement) = NonNull::new(handle) else {
            return Ok(None);
        };
        let statement = unsafe { RawStatement::from(statement, self.inner) };

        Ok(Some((statement, consumed)))
    }

    pub(crate) fn set_busy_timeout(&self, duration: Duration) -> Result<()> {
        raw::check(self.get(), unsafe {
            libsqlite3_sys::sqlite3_busy_timeout(
                self.get(),
                duration.as_millis().try_into().unwrap_or(c_int::MAX),
            )
        })?;
        Ok(())
    }

    pub(crate) fn interrupt(&self) {
        unsafe { libsqlite3_sys::sqlite3_interrupt(self.get()) };
    }

    pub(crate) fn changes(&self) -> i64 {
        unsafe { libsqlite3_sys::sqlite3_changes(self.get()) }.into()
    }

    pub(crate) fn total_changes(&self) -> i64 {
        unsafe { libsqlite3_sys::sqlite3_total_changes(self.get()) }.into()
    }

    pub(crate) fn is_autocommit(&self) -> bool {
        unsafe { libsqlite3_sys::sqlite3_get_autocommit(self.get()) != 0 }
    }

    /// Installs or removes the statement trace hook.
    ///
    /// # Safety
    ///
    /// `callback` must stay valid until the hook is replaced or the handle
    /// is closed.
    pub(crate) unsafe fn set_trace(&self, callback: Option<*mut TraceCallback>) -> Result<()> {
        unsafe extern "C" fn api_callback(
            event: c_uint,
            userdata: *mut c_void,
            _statement: *mut c_void,
            sql: *mut c_void,
        ) -> c_int {
            if event != libsqlite3_sys::SQLITE_TRACE_STMT as c_uint
                || userdata.is_null()
                || sql.is_null()
            {
                return 0;
            }
            let f = unsafe { &mut *(userdata as *mut TraceCallback) };
            let sql = unsafe { CStr::from_ptr(sql as *const c_char) }.to_string_lossy();
            if panic::catch_unwind(AssertUnwindSafe(|| f(&sql))).is_err() {
                tracing::error!(%sql, "trace callback panicked");
            }
            0
        }

        let code = match callback {
            Some(f) => unsafe {
                libsqlite3_sys::sqlite3_trace_v2(
                    self.get(),
                    libsqlite3_sys::SQLITE_TRACE_STMT as c_uint,
                    Some(api_callback),
                    f as *mut c_void,
                )
            },
            None => unsafe {
                libsqlite3_sys::sqlite3_trace_v2(self.get(), 0, None, ptr::null_mut())
            },
        };
        raw::check(self.get(), code)?;
        Ok(())
    }
}

/// Target of [`InterruptHandle`](crate::InterruptHandle).
///
/// Cleared under the lock before the handle is closed, so an interrupt never
/// reaches a released handle.
pub(crate) struct InterruptTarget(Option<NonNull<libsqlite3_sys::sqlite3>>);

// `sqlite3_interrupt` may be called from any thread.
unsafe impl Send for InterruptTarget {}

impl InterruptTarget {
    pub(crate) fn shared(connection: &RawConnection) -> Arc<Mutex<Self>> {
        Arc::new(Mutex::new(Self(Some(connection.inner))))
    }

    pub(crate) fn interrupt(&self) {
        if let Some(db) = self.0 {
            unsafe { libsqlite3_sys::sqlite3_interrupt(db.as_ptr()) };
        }
    }

    pub(crate) fn clear(&mut self) {
        self.0 = None;
    }
}
