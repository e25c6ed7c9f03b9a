use bsqlite::{
    convert::{distant_past, FromColumn, ToParam},
    params, Connection, ErrorKind,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::fmt::Debug;

fn open() -> Connection {
    let conn = Connection::builder().open_memory().unwrap();
    conn.exec(
        "CREATE TABLE value (i INTEGER, f REAL, t TEXT, b BLOB, n)",
        &[],
    )
    .unwrap();
    conn
}

fn round_trip<T>(conn: &mut Connection, column: &str, value: T)
where
    T: ToParam + FromColumn + PartialEq + Debug,
{
    conn.exec("DELETE FROM value", &[]).unwrap();
    conn.execute(
        &format!("INSERT INTO value ({column}) VALUES (?)"),
        params!(value),
    )
    .unwrap();
    let decoded: T = conn
        .query_row(&format!("SELECT {column} FROM value"), &[], |row| {
            row.column(0)
        })
        .unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn integers() {
    let mut conn = open();

    for value in [0, 1, -1, i64::MIN, i64::MAX] {
        round_trip(&mut conn, "i", value);
    }
    for value in [0, -1, i32::MIN, i32::MAX] {
        round_trip(&mut conn, "i", value);
    }
    round_trip(&mut conn, "i", i16::MIN);
    round_trip(&mut conn, "i", i8::MAX);
    round_trip(&mut conn, "i", u8::MAX);
    round_trip(&mut conn, "i", u16::MAX);
    round_trip(&mut conn, "i", u32::MAX);
    round_trip(&mut conn, "i", isize::MIN);
    round_trip(&mut conn, "i", true);
    round_trip(&mut conn, "i", false);
}

#[test]
fn narrowing_out_of_range() {
    let mut conn = open();

    let e = conn
        .query_row("SELECT ?", params!(300), |row| row.column::<u8>(0))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::OutOfRange);

    let e = conn
        .query_row("SELECT ?", params!(-1), |row| row.column::<u32>(0))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::OutOfRange);
}

#[test]
fn floats() {
    let mut conn = open();

    for value in [0.0, -0.5, 3.5, f64::MAX, f64::MIN_POSITIVE] {
        round_trip(&mut conn, "f", value);
    }
    round_trip(&mut conn, "f", 1.25f32);
}

#[test]
fn text() {
    let mut conn = open();

    round_trip(&mut conn, "t", String::new());
    round_trip(&mut conn, "t", String::from("hello"));
    round_trip(&mut conn, "t", String::from("ünïcödé ✓"));
    round_trip(&mut conn, "t", String::from("nul\0inside"));
}

#[test]
fn blobs() {
    let mut conn = open();

    round_trip(&mut conn, "b", Vec::<u8>::new());
    round_trip(&mut conn, "b", vec![0u8, 1, 2, 255]);
}

#[test]
fn options() {
    let mut conn = open();

    round_trip(&mut conn, "n", None::<i64>);
    round_trip(&mut conn, "n", Some(5i64));
    round_trip(&mut conn, "n", Some(String::from("five")));
    round_trip(&mut conn, "n", None::<Vec<u8>>);
}

#[test]
fn timestamps() {
    let mut conn = open();

    let value = Utc.with_ymd_and_hms(2022, 6, 29, 12, 34, 56).unwrap() + Duration::milliseconds(789);
    round_trip(&mut conn, "t", value);
    round_trip(&mut conn, "t", distant_past());

    let stored: String = conn
        .query_row("SELECT t FROM value", &[], |row| row.column(0))
        .unwrap();
    assert_eq!(stored, "0001-01-01T00:00:00.000Z");
}

#[test]
fn timestamp_sentinel() {
    let mut conn = open();

    let null: DateTime<Utc> = conn
        .query_row("SELECT NULL", &[], |row| row.column(0))
        .unwrap();
    assert_eq!(null, distant_past());

    let garbage: DateTime<Utc> = conn
        .query_row("SELECT 'not a timestamp'", &[], |row| row.column(0))
        .unwrap();
    assert_eq!(garbage, distant_past());

    let missing: Option<DateTime<Utc>> = conn
        .query_row("SELECT NULL", &[], |row| row.column(0))
        .unwrap();
    assert_eq!(missing, None);
}

#[test]
fn storage_class_mismatch() {
    let mut conn = open();

    let e = conn
        .query_row("SELECT 'text'", &[], |row| row.column::<i64>(0))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::DatatypeMismatch);

    let e = conn
        .query_row("SELECT 1", &[], |row| row.column::<f64>(0))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::DatatypeMismatch);

    let e = conn
        .query_row("SELECT x'00'", &[], |row| row.column::<String>(0))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::DatatypeMismatch);

    let e = conn
        .query_row("SELECT NULL", &[], |row| row.column::<Vec<u8>>(0))
        .unwrap_err();
    assert_eq!(e.kind(), ErrorKind::DatatypeMismatch);
}

#[test]
fn unit_binds_null() {
    let mut conn = open();

    let is_null = conn
        .query_row("SELECT ? IS NULL", params!(()), |row| row.column::<bool>(0))
        .unwrap();
    assert!(is_null);
}
