/// Creates a positional parameter list.
///
/// Expands to a `&[&dyn ToParam]`, borrowing every argument. Any type
/// implementing [`ToParam`](crate::convert::ToParam) can be used.
///
/// ```
/// # use bsqlite::params;
/// #
/// params!(1, 2.5, "three", vec![4u8], None::<i64>)
/// # ;
/// ```
///
/// # Using parameters
///
/// Every parameter has a position, starting at 1. Inside the SQL query, `?`
/// references the next parameter and `?NNN` references the parameter at
/// position `NNN`.
///
/// See also [the SQLite documentation](https://www.sqlite.org/lang_expr.html#parameters).
///
/// # Example
///
/// ```
/// fn insert_user_data(
///     connection: &mut bsqlite::Connection,
///     name: String,
///     email: String,
/// ) -> bsqlite::Result<()> {
///     connection.execute(
///         "INSERT INTO users (name, email) VALUES (?, ?)",
///         bsqlite::params!(name, email),
///     )
/// }
/// ```
#[macro_export]
macro_rules! params {
    () => {
        &[] as &[&dyn $crate::convert::ToParam]
    };

    ( $( $param:expr ),+ $(,)? ) => {
        &[ $( &$param as &dyn $crate::convert::ToParam ),+ ] as &[&dyn $crate::convert::ToParam]
    };
}
