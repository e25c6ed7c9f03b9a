use std::{fmt, io};

/// Library error.
#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    code: Option<i32>,
    message: String,
}

impl Error {
    pub(crate) fn from_code(code: i32, message: Option<String>) -> Self {
        let kind = ErrorKind::from_code(code);
        Self {
            kind,
            code: Some(code),
            message: message.unwrap_or_else(|| kind.to_string()),
        }
    }

    pub(crate) fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: kind.code(),
            message: message.into(),
        }
    }

    /// Returns the kind of the error.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the raw SQLite result code, including extended bits.
    ///
    /// `None` for error kinds that have no SQLite counterpart.
    pub fn code(&self) -> Option<i32> {
        self.code
    }

    /// Returns the message of the error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the operation was stopped by an interrupt.
    ///
    /// See [`Connection::cancel`](crate::Connection::cancel).
    pub fn is_interrupted(&self) -> bool {
        self.kind == ErrorKind::OperationInterrupted
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "sqlite error {}: {} ({})", code, self.kind, self.message),
            None => write!(f, "sqlite error: {} ({})", self.kind, self.message),
        }
    }
}

impl std::error::Error for Error {}

impl From<Error> for io::Error {
    fn from(v: Error) -> io::Error {
        io::Error::new(v.kind.into(), v)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            code: kind.code(),
            message: kind.to_string(),
        }
    }
}

/// Classification of a raw SQLite status code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Response {
    /// `SQLITE_OK`.
    Ok,
    /// `SQLITE_ROW`: column data is available.
    Row,
    /// `SQLITE_DONE`: the statement finished.
    Done,
    /// Any other code.
    Error(i32),
}

impl Response {
    /// Classifies a status code returned by SQLite.
    pub const fn from_code(code: i32) -> Self {
        match code {
            libsqlite3_sys::SQLITE_OK => Self::Ok,
            libsqlite3_sys::SQLITE_ROW => Self::Row,
            libsqlite3_sys::SQLITE_DONE => Self::Done,
            code => Self::Error(code),
        }
    }
}

macro_rules! error_kind {
    (
        $(
            $(#[doc = $doc:expr])*
            #[message = $message:expr]
            $(#[io = $error_kind:ident])?
            $variant:ident $(= $code:ident)?,
        )*
    ) => {
        /// Library error kind.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[non_exhaustive]
        pub enum ErrorKind {
            $(
                $(#[doc = $doc])*
                $variant,
            )*
        }

        impl ErrorKind {
            /// Converts the error kind from a SQLite error code.
            pub const fn from_code(code: i32) -> Self {
                match code & 0xFF {
                    $(
                        $(libsqlite3_sys::$code => Self::$variant,)?
                    )*
                    _ => Self::Generic,
                }
            }

            /// Converts the error kind into a SQLite error code.
            pub const fn code(self) -> Option<i32> {
                match self {
                    $(
                        $(Self::$variant => Some(libsqlite3_sys::$code),)?
                    )*
                    _ => None,
                }
            }
        }

        impl fmt::Display for ErrorKind {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                match self {
                    $(
                        Self::$variant => f.write_str($message),
                    )*
                }
            }
        }

        impl From<ErrorKind> for io::ErrorKind {
            fn from(v: ErrorKind) -> io::ErrorKind {
                match v {
                    $(
                        $(ErrorKind::$variant => io::ErrorKind::$error_kind,)?
                    )*
                    _ => io::ErrorKind::Other,
                }
            }
        }
    };
}

error_kind! {
    /// Generic error.
    #[message = "generic error"]
    Generic = SQLITE_ERROR,

    /// Internal library error.
    #[message = "internal malfunction"]
    InternalMalfunction = SQLITE_INTERNAL,

    /// Unable to access the database.
    #[message = "permission denied"]
    #[io = PermissionDenied]
    PermissionDenied = SQLITE_PERM,

    /// The operation has been aborted.
    #[message = "operation aborted"]
    #[io = Interrupted]
    OperationAborted = SQLITE_ABORT,

    /// Database is locked by another connection and the busy timeout expired.
    #[message = "database busy"]
    DatabaseBusy = SQLITE_BUSY,

    /// A table is locked by another statement of the same connection.
    #[message = "database locked"]
    DatabaseLocked = SQLITE_LOCKED,

    /// Out of memory.
    #[message = "out of memory"]
    #[io = OutOfMemory]
    OutOfMemory = SQLITE_NOMEM,

    /// Tried to write to a database which is read only.
    #[message = "database is read only"]
    #[io = PermissionDenied]
    ReadOnly = SQLITE_READONLY,

    /// The operation has been interrupted.
    #[message = "operation interrupted"]
    #[io = Interrupted]
    OperationInterrupted = SQLITE_INTERRUPT,

    /// System I/O error.
    #[message = "i/o error"]
    SystemIoFailure = SQLITE_IOERR,

    /// Database is corrupted.
    #[message = "corrupted database"]
    #[io = InvalidData]
    DatabaseCorrupt = SQLITE_CORRUPT,

    /// Unknown file control opcode.
    #[message = "unknown opcode"]
    #[io = Unsupported]
    UnknownOpcode = SQLITE_NOTFOUND,

    /// Disk is full.
    #[message = "disk full"]
    DiskFull = SQLITE_FULL,

    /// Cannot open the database.
    #[message = "cannot open database"]
    CannotOpen = SQLITE_CANTOPEN,

    /// Error in the file locking protocol.
    #[message = "file locking protocol error"]
    FileLockingProtocolFailed = SQLITE_PROTOCOL,

    /// Schema has changed.
    #[message = "schema has changed"]
    #[io = InvalidData]
    SchemaChanged = SQLITE_SCHEMA,

    /// String or blob is too large.
    #[message = "string or blob is too large"]
    #[io = InvalidData]
    TooLarge = SQLITE_TOOBIG,

    /// Constraint violation.
    #[message = "constraint violation"]
    #[io = InvalidData]
    ConstraintViolation = SQLITE_CONSTRAINT,

    /// Datatype mismatch.
    #[message = "datatype mismatch"]
    #[io = InvalidData]
    DatatypeMismatch = SQLITE_MISMATCH,

    /// Library has been misused.
    #[message = "library misuse"]
    #[io = InvalidInput]
    Misuse = SQLITE_MISUSE,

    /// No support for large files.
    #[message = "lfs not supported"]
    #[io = Unsupported]
    LfsUnsupported = SQLITE_NOLFS,

    /// Statement is not authorized.
    #[message = "unauthorized statement"]
    #[io = PermissionDenied]
    Unauthorized = SQLITE_AUTH,

    /// Out of range.
    #[message = "out of range"]
    #[io = InvalidInput]
    OutOfRange = SQLITE_RANGE,

    /// Not a database.
    #[message = "not a database"]
    #[io = InvalidData]
    NotADatabase = SQLITE_NOTADB,

    /// Invalid path.
    #[message = "invalid database path"]
    #[io = InvalidInput]
    InvalidPath,

    /// The connection is not open.
    #[message = "connection is not open"]
    #[io = NotConnected]
    NotOpened,

    /// The SQL text did not contain a statement.
    #[message = "no statement prepared"]
    #[io = InvalidInput]
    NoStatementPrepared,

    /// The SQL text contained more than one statement.
    #[message = "too many statements"]
    #[io = InvalidInput]
    TooManyStatements,

    /// SQLite refused to close the connection.
    #[message = "failed to close connection"]
    CloseFailed,

    /// The query returned no rows.
    #[message = "no rows returned"]
    #[io = NotFound]
    NotFound,
}
