//! Types and traits for converting from and to SQLite data types.
//!
//! # Converting from SQLite to Rust
//!
//! The trait [`FromColumn`] decodes a column of the current row into a Rust
//! type. The storage class of the column must match the one the type
//! expects, see the [`FromColumn`] documentation. This trait can be
//! implemented for custom types, usually by decoding a provided type first
//! and converting the result.
//!
//! # Converting from Rust to SQLite
//!
//! The trait [`ToParam`] binds a Rust value to a parameter slot of a
//! prepared statement. It is object safe, so parameter lists are plain
//! slices of `&dyn ToParam`, usually created with [`params!`].
//!
//! A type implementing both traits round-trips: binding a value and reading
//! it back yields an equal value.
//!
//! [`params!`]: crate::params!

mod from_column;
mod timestamp;
mod to_param;

pub use self::{from_column::*, timestamp::*, to_param::*};

/// Storage class of a column value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ColumnType {
    /// A signed integer.
    Integer,
    /// A floating point number.
    Float,
    /// A string.
    Text,
    /// A binary blob.
    Blob,
    /// A null.
    Null,
}

impl ColumnType {
    pub(crate) fn from_code(code: i32) -> Self {
        match code {
            libsqlite3_sys::SQLITE_INTEGER => Self::Integer,
            libsqlite3_sys::SQLITE_FLOAT => Self::Float,
            libsqlite3_sys::SQLITE_TEXT => Self::Text,
            libsqlite3_sys::SQLITE_BLOB => Self::Blob,
            _ => Self::Null,
        }
    }
}
