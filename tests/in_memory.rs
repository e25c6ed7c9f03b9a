use bsqlite::{convert::ColumnType, params, Connection, ErrorKind, Step};
use std::{
    sync::{Arc, Mutex},
    thread,
};

fn open() -> Connection {
    Connection::builder().open_memory().unwrap()
}

fn record_trace(conn: &mut Connection) -> Arc<Mutex<Vec<String>>> {
    let traced = Arc::new(Mutex::new(Vec::new()));
    conn.set_trace({
        let traced = traced.clone();
        move |sql| {
            traced
                .lock()
                .unwrap()
                .push(sql.trim_end_matches(';').to_owned())
        }
    })
    .unwrap();
    traced
}

#[test]
fn query() {
    let mut conn = open();

    conn.exec("CREATE TABLE test (key INTEGER, value INTEGER)", &[])
        .unwrap();
    for (key, value) in [(1, 1), (2, 2), (2, 3)] {
        conn.execute(
            "INSERT INTO test (key, value) VALUES (?, ?)",
            params!(key, value),
        )
        .unwrap();
    }

    let values: Vec<i64> = conn
        .query("SELECT value FROM test WHERE key = ?", params!(2), |statement| {
            statement.fetch_rows(|row| row.column(0))
        })
        .unwrap();
    assert_eq!(values, [2, 3]);
    assert_eq!(conn.cached_statements(), 2);
}

#[test]
fn update() {
    let mut conn = open();

    conn.exec("CREATE TABLE test (key INTEGER, value INTEGER)", &[])
        .unwrap();
    conn.exec("INSERT INTO test (key, value) VALUES (1, 1), (2, 2), (2, 3)", &[])
        .unwrap();
    assert_eq!(conn.total_changes().unwrap(), 3);

    conn.execute("UPDATE test SET value = value + 10 WHERE key = ?", params!(2))
        .unwrap();
    assert_eq!(conn.changes().unwrap(), 2);
    assert_eq!(conn.total_changes().unwrap(), 5);

    let sum = conn.count("SELECT SUM(value) FROM test", &[]).unwrap();
    assert_eq!(sum, 1 + 12 + 13);
}

#[test]
fn cached_statement_has_no_residual_bindings() {
    let mut conn = open();

    let first = conn
        .query_row("SELECT ?, ?", params!(1, 2), |row| {
            Ok((row.column::<i64>(0)?, row.column::<Option<i64>>(1)?))
        })
        .unwrap();
    assert_eq!(first, (1, Some(2)));

    let second = conn
        .query_row("SELECT ?, ?", params!(3), |row| {
            Ok((row.column::<i64>(0)?, row.column::<Option<i64>>(1)?))
        })
        .unwrap();
    assert_eq!(second, (3, None));

    assert_eq!(conn.cached_statements(), 1);
}

#[test]
fn statement_is_reset_after_failure() {
    let mut conn = open();

    conn.exec("CREATE TABLE test (value INTEGER)", &[]).unwrap();
    conn.exec("INSERT INTO test (value) VALUES (1), (2)", &[])
        .unwrap();

    let e = conn
        .query("SELECT value FROM test", &[], |statement| {
            statement.fetch_row(|row| row.column::<String>(0))
        })
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::DatatypeMismatch);

    let values: Vec<i64> = conn
        .query("SELECT value FROM test", &[], |statement| {
            statement.fetch_rows(|row| row.column(0))
        })
        .unwrap();
    assert_eq!(values, [1, 2]);
}

#[test]
fn statement_cache_capacity() {
    let mut conn = Connection::builder()
        .statement_cache_capacity(2)
        .open_memory()
        .unwrap();

    for value in 0..4 {
        let sql = format!("SELECT {value}");
        assert_eq!(conn.count(&sql, &[]).unwrap(), value);
    }
    assert_eq!(conn.cached_statements(), 2);

    let mut conn = Connection::builder()
        .statement_cache_capacity(0)
        .open_memory()
        .unwrap();
    assert_eq!(conn.count("SELECT 1", &[]).unwrap(), 1);
    assert_eq!(conn.cached_statements(), 0);
}

#[test]
fn count() {
    let mut conn = open();

    conn.exec("CREATE TABLE test (value INTEGER)", &[]).unwrap();
    assert_eq!(conn.count("SELECT value FROM test", &[]).unwrap(), 0);

    conn.exec("INSERT INTO test (value) VALUES (?)", params!(42))
        .unwrap();
    assert_eq!(conn.count("SELECT COUNT(*) FROM test", &[]).unwrap(), 1);
    assert_eq!(conn.count("SELECT value FROM test", &[]).unwrap(), 42);
}

#[test]
fn count_null() {
    let mut conn = open();

    conn.exec("CREATE TABLE test (value INTEGER)", &[]).unwrap();
    assert_eq!(conn.count("SELECT SUM(value) FROM test", &[]).unwrap(), 0);
    assert_eq!(conn.count("SELECT NULL", &[]).unwrap(), 0);
}

#[test]
fn query_row_not_found() {
    let mut conn = open();

    conn.exec("CREATE TABLE test (value INTEGER)", &[]).unwrap();
    let e = conn
        .query_row("SELECT value FROM test", &[], |row| row.column::<i64>(0))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::NotFound);
}

#[test]
fn prepare() {
    let conn = open();

    let mut statement = conn.prepare("SELECT ?1 + 1, 'a'").unwrap();
    assert_eq!(statement.sql(), "SELECT ?1 + 1, 'a'");
    assert_eq!(statement.parameter_count(), 1);
    assert_eq!(statement.column_count(), 2);

    statement.bind(params!(41)).unwrap();
    assert_eq!(statement.step().unwrap(), Step::Row);
    assert_eq!(statement.column_type(0).unwrap(), ColumnType::Integer);
    assert_eq!(statement.column_type(1).unwrap(), ColumnType::Text);
    assert_eq!(statement.column::<i64>(0).unwrap(), 42);
    assert_eq!(statement.column_text(1).unwrap(), b"a");
    assert_eq!(
        statement.column::<i64>(2).unwrap_err().kind(),
        ErrorKind::OutOfRange
    );
    assert_eq!(statement.step().unwrap(), Step::Done);

    statement.reset().unwrap();
    assert_eq!(statement.step().unwrap(), Step::Row);
    assert!(statement.is_null(0).unwrap());
    statement.finalize().unwrap();

    assert_eq!(conn.cached_statements(), 0);
}

#[test]
fn prepare_errors() {
    let conn = open();

    let e = conn.prepare("").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::NoStatementPrepared);
    let e = conn.prepare("  -- nothing here").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::NoStatementPrepared);

    let e = conn.prepare("SELECT 1; SELECT 2").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TooManyStatements);
    conn.prepare("SELECT 1;  ").unwrap();

    let e = conn.prepare("SELECT * FROM missing").unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Generic);
    assert_eq!(e.code(), Some(1));
    assert!(e.message().contains("missing"));
}

#[test]
fn exec_with_params_requires_one_statement() {
    let conn = open();

    conn.exec("CREATE TABLE a (v INTEGER); CREATE TABLE b (v INTEGER)", &[])
        .unwrap();
    let e = conn
        .exec(
            "INSERT INTO a (v) VALUES (?); INSERT INTO b (v) VALUES (?)",
            params!(1, 2),
        )
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TooManyStatements);

    let e = conn
        .exec(
            "CREATE TABLE c (v INTEGER); INSERT INTO c (v) VALUES (?)",
            params!(1),
        )
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::TooManyStatements);
    assert!(!conn.table_names().unwrap().contains(&"c".to_owned()));

    conn.exec("INSERT INTO a (v) VALUES (?); -- trailing comment", params!(1))
        .unwrap();
}

#[test]
fn constraint_violation() {
    let mut conn = open();

    conn.exec("CREATE TABLE test (key INTEGER PRIMARY KEY)", &[])
        .unwrap();
    conn.execute("INSERT INTO test (key) VALUES (?)", params!(1))
        .unwrap();
    let e = conn
        .execute("INSERT INTO test (key) VALUES (?)", params!(1))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::ConstraintViolation);

    conn.execute("INSERT INTO test (key) VALUES (?)", params!(2))
        .unwrap();
    assert_eq!(conn.count("SELECT COUNT(*) FROM test", &[]).unwrap(), 2);
}

#[test]
fn nested_transactions() {
    let mut conn = open();
    conn.exec("CREATE TABLE test (value INTEGER)", &[]).unwrap();
    let traced = record_trace(&mut conn);

    conn.begin().unwrap();
    conn.begin().unwrap();
    assert_eq!(conn.transaction_depth(), 2);
    conn.execute("INSERT INTO test (value) VALUES (?)", params!(1))
        .unwrap();
    conn.end().unwrap();
    assert!(!conn.is_autocommit().unwrap());
    conn.end().unwrap();
    assert_eq!(conn.transaction_depth(), 0);
    assert!(conn.is_autocommit().unwrap());

    let commands: Vec<String> = traced
        .lock()
        .unwrap()
        .iter()
        .filter(|sql| matches!(sql.as_str(), "BEGIN" | "COMMIT" | "ROLLBACK"))
        .cloned()
        .collect();
    assert_eq!(commands, ["BEGIN", "COMMIT"]);
}

#[test]
fn end_without_begin() {
    let mut conn = open();
    let traced = record_trace(&mut conn);

    let e = conn.end().unwrap_err();
    assert_eq!(e.kind(), ErrorKind::Misuse);
    assert_eq!(conn.transaction_depth(), 0);
    assert!(traced.lock().unwrap().is_empty());

    conn.begin().unwrap();
    conn.end().unwrap();
    assert_eq!(*traced.lock().unwrap(), ["BEGIN", "COMMIT"]);
}

#[test]
fn rollback() {
    let mut conn = open();
    conn.exec("CREATE TABLE test (value INTEGER)", &[]).unwrap();

    conn.begin().unwrap();
    conn.begin().unwrap();
    conn.execute("INSERT INTO test (value) VALUES (?)", params!(1))
        .unwrap();
    conn.rollback().unwrap();

    assert_eq!(conn.transaction_depth(), 0);
    assert!(conn.is_autocommit().unwrap());
    assert_eq!(conn.count("SELECT COUNT(*) FROM test", &[]).unwrap(), 0);

    conn.rollback().unwrap();
}

#[test]
fn clear_trace() {
    let mut conn = open();
    let traced = record_trace(&mut conn);

    conn.exec("SELECT 1", &[]).unwrap();
    conn.clear_trace().unwrap();
    conn.exec("SELECT 2", &[]).unwrap();

    assert_eq!(*traced.lock().unwrap(), ["SELECT 1"]);
}

#[test]
fn trace_callback_panic_is_contained() {
    let mut conn = open();
    conn.set_trace(|_| panic!("trace callback failure")).unwrap();

    assert_eq!(conn.count("SELECT 1", &[]).unwrap(), 1);
}

#[test]
fn moves_between_threads() {
    fn assert_send<T: Send>() {}
    assert_send::<Connection>();

    let mut conn = open();
    conn.exec("CREATE TABLE test (value INTEGER)", &[]).unwrap();
    conn.execute("INSERT INTO test (value) VALUES (?)", params!(5))
        .unwrap();
    let traced = record_trace(&mut conn);

    let mut conn = thread::spawn(move || {
        conn.execute("INSERT INTO test (value) VALUES (?)", params!(6))
            .unwrap();
        assert_eq!(conn.count("SELECT SUM(value) FROM test", &[]).unwrap(), 11);
        conn
    })
    .join()
    .unwrap();

    assert_eq!(conn.count("SELECT COUNT(*) FROM test", &[]).unwrap(), 2);
    assert_eq!(conn.cached_statements(), 3);
    assert_eq!(traced.lock().unwrap().len(), 3);
    conn.close().unwrap();
}

#[test]
fn cancel_without_running_statement() {
    let mut conn = open();

    conn.cancel();
    assert_eq!(conn.count("SELECT 1", &[]).unwrap(), 1);
}

#[test]
fn library_version() {
    let version = bsqlite::library_version();
    assert!(version.starts_with("3."));
}
