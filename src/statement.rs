use crate::{
    convert::{ColumnType, FromColumn, ToParam},
    error::Response,
    raw::RawStatement,
    Connection, Error, ErrorKind, Result,
};
use std::{ffi::c_int, fmt, marker::PhantomData};

/// Outcome of [`Statement::step`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Step {
    /// A row is available; read it with [`Statement::column`].
    Row,
    /// The statement finished executing.
    Done,
}

/// Prepared statement.
///
/// Created by [`Connection::prepare`], or lent to the closure of
/// [`Connection::query`] from the statement cache. A statement borrows its
/// connection and can never outlive it.
///
/// Column values read after [`step`](Self::step) returns [`Step::Row`] are
/// valid until the next `step` or `reset`.
pub struct Statement<'conn> {
    raw: RawStatement,
    connection: PhantomData<&'conn Connection>,
}

impl fmt::Debug for Statement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql())
            .finish_non_exhaustive()
    }
}

impl<'conn> Statement<'conn> {
    pub(crate) fn new(raw: RawStatement) -> Self {
        Self {
            raw,
            connection: PhantomData,
        }
    }

    pub(crate) fn into_raw(self) -> RawStatement {
        self.raw
    }

    /// SQL text the statement was prepared from.
    pub fn sql(&self) -> &str {
        self.raw.sql()
    }

    /// Binds `params` positionally, the first one at index 1.
    ///
    /// Stops at the first parameter that fails to bind. Parameters bound
    /// before the failure stay bound until [`reset`](Self::reset).
    pub fn bind(&mut self, params: &[&dyn ToParam]) -> Result<&mut Self> {
        for (i, param) in params.iter().enumerate() {
            param.bind_param(self, i + 1)?;
        }
        Ok(self)
    }

    /// Advances to the next row.
    pub fn step(&mut self) -> Result<Step> {
        match self.raw.step()? {
            Response::Row => Ok(Step::Row),
            _ => Ok(Step::Done),
        }
    }

    /// Steps until the statement is done, discarding rows.
    pub fn execute(&mut self) -> Result<()> {
        while self.step()? == Step::Row {}
        Ok(())
    }

    /// Returns the statement to its initial state and clears all bindings.
    ///
    /// Can be called after a failed step; the error of that step is not
    /// reported again.
    pub fn reset(&mut self) -> Result<()> {
        // Only ever repeats the error of the last step.
        let _ = self.raw.reset();
        self.raw.clear_bindings()
    }

    /// Finalizes the statement, reporting the error of the last failed
    /// step if any.
    pub fn finalize(self) -> Result<()> {
        self.raw.finalize()
    }

    /// Steps once, decoding the row with `f` if there is one.
    ///
    /// Returns `None` without calling `f` if the statement is done.
    pub fn fetch_row<T>(&mut self, f: impl FnOnce(&Self) -> Result<T>) -> Result<Option<T>> {
        match self.step()? {
            Step::Row => f(self).map(Some),
            Step::Done => Ok(None),
        }
    }

    /// Like [`fetch_row`](Self::fetch_row), but fails with
    /// [`NotFound`](ErrorKind::NotFound) if there is no row.
    pub fn fetch_one<T>(&mut self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.fetch_row(f)?
            .ok_or_else(|| Error::from(ErrorKind::NotFound))
    }

    /// Steps until done, decoding every row with `f`.
    pub fn fetch_rows<T>(&mut self, mut f: impl FnMut(&Self) -> Result<T>) -> Result<Vec<T>> {
        let mut rows = Vec::new();
        while self.step()? == Step::Row {
            rows.push(f(self)?);
        }
        Ok(rows)
    }

    /// Decodes the column at the zero based `index` of the current row.
    ///
    /// # Example
    ///
    /// ```
    /// # fn main() -> bsqlite::Result<()> {
    /// let mut conn = bsqlite::Connection::builder().open_memory()?;
    /// let value = conn.query("SELECT 3.5", &[], |statement| {
    ///     statement.fetch_one(|row| row.column::<f64>(0))
    /// })?;
    /// assert_eq!(value, 3.5);
    /// # Ok(())
    /// # }
    /// ```
    pub fn column<T: FromColumn>(&self, index: usize) -> Result<T> {
        T::from_column(self, index)
    }

    /// Amount of columns in the result.
    pub fn column_count(&self) -> usize {
        self.raw.column_count()
    }

    /// Amount of parameters the statement takes.
    pub fn parameter_count(&self) -> usize {
        self.raw.parameter_count()
    }

    /// Storage class of the column at `index` in the current row.
    pub fn column_type(&self, index: usize) -> Result<ColumnType> {
        let index = self.column_index(index)?;
        Ok(ColumnType::from_code(self.raw.column_type(index)))
    }

    /// Whether the column at `index` in the current row is `NULL`.
    pub fn is_null(&self, index: usize) -> Result<bool> {
        Ok(self.column_type(index)? == ColumnType::Null)
    }

    /// Reads the column as a 32 bit integer, without checking its type.
    pub fn column_i32(&self, index: usize) -> Result<i32> {
        Ok(self.raw.column_int(self.column_index(index)?))
    }

    /// Reads the column as a 64 bit integer, without checking its type.
    pub fn column_i64(&self, index: usize) -> Result<i64> {
        Ok(self.raw.column_int64(self.column_index(index)?))
    }

    /// Reads the column as a float, without checking its type.
    pub fn column_f64(&self, index: usize) -> Result<f64> {
        Ok(self.raw.column_double(self.column_index(index)?))
    }

    /// Reads the column as text bytes, without checking its type.
    pub fn column_text(&self, index: usize) -> Result<&[u8]> {
        Ok(self.raw.column_text(self.column_index(index)?))
    }

    /// Reads the column as a blob, without checking its type.
    pub fn column_blob(&self, index: usize) -> Result<&[u8]> {
        Ok(self.raw.column_blob(self.column_index(index)?))
    }

    /// Binds a 32 bit integer at the one based `index`.
    pub fn bind_i32(&mut self, index: usize, value: i32) -> Result<()> {
        let index = parameter_index(index)?;
        self.raw.bind_int(index, value)
    }

    /// Binds a 64 bit integer at the one based `index`.
    pub fn bind_i64(&mut self, index: usize, value: i64) -> Result<()> {
        let index = parameter_index(index)?;
        self.raw.bind_int64(index, value)
    }

    /// Binds a float at the one based `index`.
    pub fn bind_f64(&mut self, index: usize, value: f64) -> Result<()> {
        let index = parameter_index(index)?;
        self.raw.bind_double(index, value)
    }

    /// Binds a copy of `value` at the one based `index`.
    pub fn bind_text(&mut self, index: usize, value: &str) -> Result<()> {
        let index = parameter_index(index)?;
        self.raw.bind_text(index, value)
    }

    /// Binds a copy of `value` at the one based `index`.
    pub fn bind_blob(&mut self, index: usize, value: &[u8]) -> Result<()> {
        let index = parameter_index(index)?;
        self.raw.bind_blob(index, value)
    }

    /// Binds `NULL` at the one based `index`.
    pub fn bind_null(&mut self, index: usize) -> Result<()> {
        let index = parameter_index(index)?;
        self.raw.bind_null(index)
    }

    fn column_index(&self, index: usize) -> Result<c_int> {
        if index >= self.column_count() {
            return Err(Error::new(
                ErrorKind::OutOfRange,
                format!("column {index} out of range"),
            ));
        }
        c_int::try_from(index).map_err(|_| ErrorKind::OutOfRange.into())
    }
}

fn parameter_index(index: usize) -> Result<c_int> {
    c_int::try_from(index).map_err(|_| ErrorKind::OutOfRange.into())
}
