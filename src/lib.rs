//! # bsqlite - Blocking SQLite for Rust
//!
//! This library provides a small, synchronous API for accessing SQLite
//! databases.
//!
//! It wraps `libsqlite3` directly. Statements run via
//! [`Connection::query`] are prepared once and kept in a per-connection
//! cache, keyed by their exact SQL text.
//!
//! # Usage
//!
//! Add to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! bsqlite = { version = "0.1.0", features = [ "bundled" ] }
//! ```
//!
//! Unless you are writing a library, you probably want to enable the `bundled`
//! feature, which automatically compiles SQLite.
//! See [Cargo features](#cargo-features) for more.
//!
//! Start by creating a [`Connection`] via [`Connection::builder`].
//!
//! # Example
//!
//! ```
//! use bsqlite::params;
//!
//! let mut conn = bsqlite::Connection::builder().open_memory()?;
//! conn.exec("CREATE TABLE fruit (name TEXT, amount INTEGER)", &[])?;
//!
//! conn.begin()?;
//! for (name, amount) in [("apple", 3), ("orange", 5)] {
//!     conn.execute("INSERT INTO fruit (name, amount) VALUES (?, ?)", params![name, amount])?;
//! }
//! conn.end()?;
//!
//! let total = conn.count("SELECT SUM(amount) FROM fruit", &[])?;
//! assert_eq!(total, 8);
//! # bsqlite::Result::<()>::Ok(())
//! ```
//!
//! # Threads
//!
//! A [`Connection`] is [`Send`] but not [`Sync`]: it can be moved to another
//! thread, together with its statement cache, but is used by one thread at a
//! time. [`Statement`]s borrow their connection and stay where it is. The
//! only operation meant to run concurrently is interrupting, via
//! [`InterruptHandle`].
//!
//! # Logging
//!
//! Events are emitted through [`tracing`]: opening and closing at `info`,
//! transactions at `debug`, statement preparation and cache hits at `trace`.
//!
//! # Cargo features
//!
//! * `bundled` (disabled by default): automatically compiles and statically
//!   links an up to date version of SQLite to the library. This is a very
//!   good choice for most applications.

#![warn(missing_docs, unreachable_pub)]
#![deny(unsafe_op_in_unsafe_fn)]

#[macro_use]
mod macros;
mod connection;
pub mod convert;
mod error;
mod raw;
mod statement;

pub use self::{
    connection::{Connection, ConnectionBuilder, InterruptHandle, OpenFlags},
    error::{Error, ErrorKind, Response},
    raw::library_version,
    statement::{Statement, Step},
};

/// Alias for `Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
