use crate::{convert::ColumnType, Error, ErrorKind, Result, Statement};
use std::str;

/// Decode a column of the current row into a Rust type.
///
/// # Default implementations
///
/// | SQL storage class | Rust type(s)                                       |
/// |-------------------|----------------------------------------------------|
/// | `INTEGER`         | `i64`                                              |
/// | `INTEGER`         | `bool, i8, i16, i32, isize, u8, u16, u32`          |
/// | `REAL`            | `f64, f32`                                         |
/// | `TEXT`            | `String`                                           |
/// | `BLOB`            | `Vec<u8>`                                          |
/// | any               | [`DateTime<Utc>`](chrono::DateTime)                |
///
/// Reading a column whose storage class differs from the expected one fails
/// with [`DatatypeMismatch`](ErrorKind::DatatypeMismatch); no implicit
/// conversion happens. Narrow integer types decode as `i64` first and fail
/// with [`OutOfRange`](ErrorKind::OutOfRange) if the value does not fit.
///
/// If `T` implements [`FromColumn`], so does [`Option<T>`], decoding `NULL`
/// as `None`.
pub trait FromColumn: Sized {
    /// Reads the column at the zero based `index`.
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self>;
}

pub(crate) fn expect_type(
    statement: &Statement<'_>,
    index: usize,
    expected: ColumnType,
) -> Result<()> {
    let found = statement.column_type(index)?;
    if found == expected {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::DatatypeMismatch,
            format!("column {index} is {found:?}, expected {expected:?}"),
        ))
    }
}

impl<T> FromColumn for Option<T>
where
    T: FromColumn,
{
    #[inline]
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
        if statement.is_null(index)? {
            Ok(None)
        } else {
            T::from_column(statement, index).map(Some)
        }
    }
}

impl FromColumn for i64 {
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
        expect_type(statement, index, ColumnType::Integer)?;
        statement.column_i64(index)
    }
}

macro_rules! impl_int {
    ($($x: ty),*) => {
        $(
            impl FromColumn for $x {
                fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
                    i64::from_column(statement, index)?
                        .try_into()
                        .map_err(|_| ErrorKind::OutOfRange.into())
                }
            }
        )*
    };
}

impl_int!(i8, i16, i32, isize, u8, u16, u32);

impl FromColumn for bool {
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
        Ok(i64::from_column(statement, index)? != 0)
    }
}

impl FromColumn for f64 {
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
        expect_type(statement, index, ColumnType::Float)?;
        statement.column_f64(index)
    }
}

impl FromColumn for f32 {
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
        Ok(f64::from_column(statement, index)? as f32)
    }
}

impl FromColumn for String {
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
        expect_type(statement, index, ColumnType::Text)?;
        str::from_utf8(statement.column_text(index)?)
            .map(str::to_owned)
            .map_err(|_| Error::new(ErrorKind::DatatypeMismatch, "text is not valid utf-8"))
    }
}

impl FromColumn for Vec<u8> {
    fn from_column(statement: &Statement<'_>, index: usize) -> Result<Self> {
        expect_type(statement, index, ColumnType::Blob)?;
        Ok(statement.column_blob(index)?.to_vec())
    }
}
