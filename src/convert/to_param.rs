use crate::{ErrorKind, Result, Statement};

/// Bind Rust values to statement parameters.
///
/// # Default implementations
///
/// | Rust type(s)                         | SQL storage class |
/// |--------------------------------------|-------------------|
/// | `bool, i8, i16, i32, u8, u16`        | `INTEGER` (32 bit)|
/// | `i64, u32, isize`                    | `INTEGER` (64 bit)|
/// | `f64, f32`                           | `REAL`            |
/// | `str, String`                        | `TEXT`            |
/// | `[u8], [u8; N], Vec<u8>`             | `BLOB`            |
/// | [`DateTime<Utc>`](chrono::DateTime)  | `TEXT`            |
/// | [`()`](primitive@unit)               | `NULL`            |
///
/// [`Option<T>`] binds either as `T` or as `NULL`. References bind as the
/// value they point to.
///
/// Text and blobs are copied by SQLite while binding, so the value does not
/// need to outlive the call.
pub trait ToParam {
    /// Binds `self` at the one based parameter `index`.
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()>;
}

impl<T> ToParam for &T
where
    T: ToParam + ?Sized,
{
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        (**self).bind_param(statement, index)
    }
}

macro_rules! impl_int32 {
    ($($x: ty),*) => {
        $(
            impl ToParam for $x {
                #[inline]
                fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
                    statement.bind_i32(index, i32::from(*self))
                }
            }
        )*
    };
}

impl_int32!(i8, i16, i32, u8, u16);

macro_rules! impl_int64 {
    ($($x: ty),*) => {
        $(
            impl ToParam for $x {
                #[inline]
                fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
                    let value = i64::try_from(*self).map_err(|_| ErrorKind::OutOfRange)?;
                    statement.bind_i64(index, value)
                }
            }
        )*
    };
}

impl_int64!(i64, u32, isize);

impl ToParam for bool {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        i32::from(*self).bind_param(statement, index)
    }
}

impl ToParam for f64 {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_f64(index, *self)
    }
}

impl ToParam for f32 {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_f64(index, f64::from(*self))
    }
}

impl ToParam for str {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_text(index, self)
    }
}

impl ToParam for String {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_text(index, self)
    }
}

impl ToParam for [u8] {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_blob(index, self)
    }
}

impl<const N: usize> ToParam for [u8; N] {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_blob(index, self)
    }
}

impl ToParam for Vec<u8> {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_blob(index, self)
    }
}

impl<T> ToParam for Option<T>
where
    T: ToParam,
{
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        match self {
            Some(inner) => inner.bind_param(statement, index),
            None => statement.bind_null(index),
        }
    }
}

impl ToParam for () {
    #[inline]
    fn bind_param(&self, statement: &mut Statement<'_>, index: usize) -> Result<()> {
        statement.bind_null(index)
    }
}
