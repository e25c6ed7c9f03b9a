//! Thin owners of the native SQLite handles.
//!
//! Every status code returned by SQLite goes through [`check`].

mod connection;
mod statement;

pub(crate) use self::{connection::*, statement::*};

use crate::{error::Response, Error, Result};
use std::ffi::{c_int, CStr};

/// Classifies `code`, turning anything other than ok/row/done into an
/// [`Error`] carrying the current error message of `db`.
pub(crate) fn check(db: *mut libsqlite3_sys::sqlite3, code: c_int) -> Result<Response> {
    match Response::from_code(code) {
        Response::Error(code) => Err(last_error(db, code)),
        response => Ok(response),
    }
}

pub(crate) fn last_error(db: *mut libsqlite3_sys::sqlite3, code: c_int) -> Error {
    if db.is_null() {
        return Error::from_code(code, None);
    }

    let error_message = unsafe { libsqlite3_sys::sqlite3_errmsg(db) };

    let error_message = if !error_message.is_null() {
        Some(unsafe { CStr::from_ptr(error_message).to_string_lossy().into() })
    } else {
        None
    };
    Error::from_code(code, error_message)
}

/// Version of the linked SQLite library.
pub fn library_version() -> &'static str {
    let version = unsafe { libsqlite3_sys::sqlite3_libversion() };
    if version.is_null() {
        return "";
    }
    unsafe { CStr::from_ptr(version) }.to_str().unwrap_or("")
}
