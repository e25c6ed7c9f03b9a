use crate::{error::Response, raw, ErrorKind, Result};
use std::{
    ffi::{c_int, CStr},
    ptr::NonNull,
    slice,
};

/// Owner of a `sqlite3_stmt` handle, finalized on drop.
///
/// `db` is a non-owning pointer to the connection the statement was prepared
/// on, used only to read error messages.
pub(crate) struct RawStatement {
    handle: NonNull<libsqlite3_sys::sqlite3_stmt>,
    db: NonNull<libsqlite3_sys::sqlite3>,
}

// SAFETY: same as `RawConnection`; a statement only moves together with the
// connection that owns its cache.
unsafe impl Send for RawStatement {}

impl RawStatement {
    pub(super) unsafe fn from(
        handle: NonNull<libsqlite3_sys::sqlite3_stmt>,
        db: NonNull<libsqlite3_sys::sqlite3>,
    ) -> Self {
        Self { handle, db }
    }

    fn get(&self) -> *mut libsqlite3_sys::sqlite3_stmt {
        self.handle.as_ptr()
    }

    fn check(&self, code: c_int) -> Result<Response> {
        raw::check(self.db.as_ptr(), code)
    }

    pub(crate) fn step(&mut self) -> Result<Response> {
        self.check(unsafe { libsqlite3_sys::sqlite3_step(self.get()) })
    }

    pub(crate) fn reset(&mut self) -> Result<()> {
        self.check(unsafe { libsqlite3_sys::sqlite3_reset(self.get()) })?;
        Ok(())
    }

    pub(crate) fn clear_bindings(&mut self) -> Result<()> {
        self.check(unsafe { libsqlite3_sys::sqlite3_clear_bindings(self.get()) })?;
        Ok(())
    }

    pub(crate) fn bind_int(&mut self, position: c_int, value: i32) -> Result<()> {
        self.check(unsafe { libsqlite3_sys::sqlite3_bind_int(self.get(), position, value) })?;
        Ok(())
    }

    pub(crate) fn bind_int64(&mut self, position: c_int, value: i64) -> Result<()> {
        self.check(unsafe { libsqlite3_sys::sqlite3_bind_int64(self.get(), position, value) })?;
        Ok(())
    }

    pub(crate) fn bind_double(&mut self, position: c_int, value: f64) -> Result<()> {
        self.check(unsafe { libsqlite3_sys::sqlite3_bind_double(self.get(), position, value) })?;
        Ok(())
    }

    /// Binds text. SQLite copies the bytes before returning.
    pub(crate) fn bind_text(&mut self, position: c_int, value: &str) -> Result<()> {
        self.check(unsafe {
            libsqlite3_sys::sqlite3_bind_text(
                self.get(),
                position,
                value.as_ptr() as _,
                value.len().try_into().map_err(|_| ErrorKind::TooLarge)?,
                libsqlite3_sys::SQLITE_TRANSIENT(),
            )
        })?;
        Ok(())
    }

    /// Binds a blob. SQLite copies the bytes before returning.
    pub(crate) fn bind_blob(&mut self, position: c_int, value: &[u8]) -> Result<()> {
        self.check(unsafe {
            libsqlite3_sys::sqlite3_bind_blob(
                self.get(),
                position,
                value.as_ptr() as _,
                value.len().try_into().map_err(|_| ErrorKind::TooLarge)?,
                libsqlite3_sys::SQLITE_TRANSIENT(),
            )
        })?;
        Ok(())
    }

    pub(crate) fn bind_null(&mut self, position: c_int) -> Result<()> {
        self.check(unsafe { libsqlite3_sys::sqlite3_bind_null(self.get(), position) })?;
        Ok(())
    }

    pub(crate) fn parameter_count(&self) -> usize {
        usize::try_from(unsafe { libsqlite3_sys::sqlite3_bind_parameter_count(self.get()) })
            .unwrap_or(0)
    }

    pub(crate) fn column_count(&self) -> usize {
        usize::try_from(unsafe { libsqlite3_sys::sqlite3_column_count(self.get()) }).unwrap_or(0)
    }

    pub(crate) fn column_type(&self, idx: c_int) -> c_int {
        unsafe { libsqlite3_sys::sqlite3_column_type(self.get(), idx) }
    }

    pub(crate) fn column_int(&self, idx: c_int) -> i32 {
        unsafe { libsqlite3_sys::sqlite3_column_int(self.get(), idx) }
    }

    pub(crate) fn column_int64(&self, idx: c_int) -> i64 {
        unsafe { libsqlite3_sys::sqlite3_column_int64(self.get(), idx) }
    }

    pub(crate) fn column_double(&self, idx: c_int) -> f64 {
        unsafe { libsqlite3_sys::sqlite3_column_double(self.get(), idx) }
    }

    pub(crate) fn column_text(&self, idx: c_int) -> &[u8] {
        let ptr = unsafe { libsqlite3_sys::sqlite3_column_text(self.get(), idx) };
        if ptr.is_null() {
            return &[];
        }
        let size = unsafe { libsqlite3_sys::sqlite3_column_bytes(self.get(), idx) };
        unsafe { slice::from_raw_parts(ptr, usize::try_from(size).unwrap_or(0)) }
    }

    pub(crate) fn column_blob(&self, idx: c_int) -> &[u8] {
        let ptr = unsafe { libsqlite3_sys::sqlite3_column_blob(self.get(), idx) };
        if ptr.is_null() {
            return &[];
        }
        let size = unsafe { libsqlite3_sys::sqlite3_column_bytes(self.get(), idx) };
        unsafe { slice::from_raw_parts(ptr as *const u8, usize::try_from(size).unwrap_or(0)) }
    }

    pub(crate) fn sql(&self) -> &str {
        let ptr = unsafe { libsqlite3_sys::sqlite3_sql(self.get()) };
        if ptr.is_null() {
            return "";
        }
        unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("")
    }

    /// Finalizes, reporting the error of the last failed step if any.
    pub(crate) fn finalize(self) -> Result<()> {
        let code = unsafe { libsqlite3_sys::sqlite3_finalize(self.get()) };
        let db = self.db;
        std::mem::forget(self);
        raw::check(db.as_ptr(), code)?;
        Ok(())
    }
}

impl Drop for RawStatement {
    fn drop(&mut self) {
        unsafe { libsqlite3_sys::sqlite3_finalize(self.get()) };
    }
}
