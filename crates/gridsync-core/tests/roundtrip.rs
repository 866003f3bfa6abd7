mod common;

use chrono::NaiveDate;
use common::{text_at, typed_grid};
use gridsync_core::{
    Collection, MemoryTransport, NumberFormatType, Orientation, RawCell, ReadOutcome, Record,
    SheetTarget, SyncOptions, SyncSession, Value,
};

fn session(
    grid: gridsync_core::RawGrid,
    options: SyncOptions,
) -> SyncSession<MemoryTransport> {
    let transport = MemoryTransport::new("sheet-id").with_sheet("Data", grid);
    SyncSession::new(transport, SheetTarget::new("sheet-id").with_sheet("Data"), options)
}

fn loaded(outcome: ReadOutcome) -> Collection {
    match outcome {
        ReadOutcome::Loaded(decoded) => decoded.collection,
        ReadOutcome::Empty => panic!("expected data"),
    }
}

#[test]
fn unmodified_collection_round_trips() {
    let original = typed_grid(&[&["name", "age"], &["Al", "30"], &["Bo", "41"]]);
    let mut s = session(original.clone(), SyncOptions::default());
    let collection = loaded(s.read().unwrap());

    let result = s.write(&collection).unwrap();
    assert!(result.accepted);
    assert_eq!(result.updated_record_count, 2);
    assert_eq!(s.transport().sheet_grid("Data").unwrap(), original);
    assert_eq!(loaded(s.read().unwrap()), collection);
}

#[test]
fn fewer_records_erase_stale_rows() {
    let original = typed_grid(&[&["name", "age"], &["Al", "30"], &["Bo", "41"], &["Cy", "7"]]);
    let mut s = session(original, SyncOptions::default());
    s.read().unwrap();

    let one = Collection::Records(vec![Record::from([
        ("name", Value::from("Al")),
        ("age", Value::from(31.0)),
    ])]);
    s.write(&one).unwrap();

    let sheet = s.transport().sheet_grid("Data").unwrap();
    assert_eq!(sheet.len(), 2);
    assert_eq!(text_at(&sheet, 1, 1), "31");
    assert_eq!(s.state().record_count, 1);
}

#[test]
fn dropped_field_erases_its_column() {
    let original = typed_grid(&[&["name", "age"], &["Al", "30"]]);
    let mut s = session(original, SyncOptions::default());
    s.read().unwrap();

    let names = Collection::Records(vec![
        Record::from([("name", "Al")]),
        Record::from([("name", "Bo")]),
    ]);
    s.write(&names).unwrap();

    let sheet = s.transport().sheet_grid("Data").unwrap();
    assert_eq!(text_at(&sheet, 0, 1), "");
    assert_eq!(text_at(&sheet, 1, 1), "");
    assert_eq!(text_at(&sheet, 2, 0), "Bo");
    assert_eq!(s.state().width, 1);
}

#[test]
fn rows_write_lands_at_the_read_offset() {
    let original = typed_grid(&[
        &[],
        &["", "name", "age"],
        &["", "Al", "30"],
        &[],
        &[],
        &["note"],
    ]);
    let mut s = session(original, SyncOptions::default());
    let mut collection = loaded(s.read().unwrap());
    if let Collection::Records(records) = &mut collection {
        records.push(Record::from([("name", Value::from("Dee")), ("age", Value::from(5.0))]));
    }
    s.write(&collection).unwrap();

    let sheet = s.transport().sheet_grid("Data").unwrap();
    assert_eq!(text_at(&sheet, 1, 1), "name");
    assert_eq!(text_at(&sheet, 3, 1), "Dee");
    assert_eq!(text_at(&sheet, 3, 0), "");
    assert_eq!(text_at(&sheet, 5, 0), "note");
}

#[test]
fn columns_write_lands_at_the_read_offset() {
    let original = typed_grid(&[&[], &["", "name", "Al", "Bo"], &["", "age", "30", "41"]]);
    let options = SyncOptions::default().with_orientation(Orientation::Columns);
    let mut s = session(original, options);
    s.read().unwrap();

    let one = Collection::Records(vec![Record::from([
        ("name", Value::from("Cy")),
        ("age", Value::from(7.0)),
    ])]);
    s.write(&one).unwrap();

    let sheet = s.transport().sheet_grid("Data").unwrap();
    assert_eq!(text_at(&sheet, 1, 1), "name");
    assert_eq!(text_at(&sheet, 1, 2), "Cy");
    assert_eq!(text_at(&sheet, 1, 3), "");
    assert_eq!(text_at(&sheet, 2, 2), "7");
    assert_eq!(text_at(&sheet, 2, 3), "");
    assert_eq!(text_at(&sheet, 0, 0), "");
}

#[test]
fn transformed_keys_write_original_headings() {
    let original = typed_grid(&[&["Full Name", "Age"], &["Al", "30"]]);
    let options = SyncOptions::default().with_transform_headings(true);
    let mut s = session(original, options);
    let collection = loaded(s.read().unwrap());
    assert_eq!(
        collection.as_records().unwrap()[0].keys().collect::<Vec<_>>(),
        ["full_name", "age"]
    );

    s.write(&collection).unwrap();
    let sheet = s.transport().sheet_grid("Data").unwrap();
    assert_eq!(text_at(&sheet, 0, 0), "Full Name");
    assert_eq!(text_at(&sheet, 0, 1), "Age");
}

#[test]
fn dates_survive_a_round_trip() {
    let original = vec![
        vec![RawCell::from("name"), RawCell::from("born")],
        vec![
            RawCell::from("Al"),
            RawCell::temporal(44000.0, NumberFormatType::Date, "6/18/2020"),
        ],
    ];
    let mut s = session(original, SyncOptions::default());
    let collection = loaded(s.read().unwrap());
    s.write(&collection).unwrap();

    let reread = loaded(s.read().unwrap());
    assert_eq!(
        reread.as_records().unwrap()[0].get("born"),
        Some(&Value::Date(NaiveDate::from_ymd_opt(2020, 6, 18).unwrap()))
    );
}

#[test]
fn empty_collection_blanks_previous_rows_but_keeps_headings() {
    let original = typed_grid(&[&["name", "age"], &["Al", "30"], &["Bo", "41"]]);
    let mut s = session(original, SyncOptions::default());
    s.read().unwrap();

    let result = s.write(&Collection::Records(vec![])).unwrap();
    assert!(result.accepted);
    assert_eq!(result.updated_record_count, 0);
    let sheet = s.transport().sheet_grid("Data").unwrap();
    assert_eq!(sheet.len(), 1);
    assert_eq!(text_at(&sheet, 0, 1), "age");
}

#[test]
fn simple_collection_keeps_its_heading_and_erases_stale_values() {
    let original = typed_grid(&[&["Age"], &["30"], &["41"], &["52"]]);
    let options = SyncOptions::default().with_transform_headings(true);
    let mut s = session(original, options);
    assert_eq!(
        loaded(s.read().unwrap()),
        Collection::Column {
            heading: "age".into(),
            values: vec![Value::from(30.0), Value::from(41.0), Value::from(52.0)],
        }
    );

    let result = s
        .write(&Collection::Column {
            heading: "age".into(),
            values: vec![Value::from(30.0)],
        })
        .unwrap();
    assert!(result.accepted);
    assert_eq!(result.updated_record_count, 1);

    let sheet = s.transport().sheet_grid("Data").unwrap();
    assert_eq!(text_at(&sheet, 0, 0), "Age");
    assert_eq!(text_at(&sheet, 1, 0), "30");
    assert_eq!(text_at(&sheet, 2, 0), "");
    assert_eq!(text_at(&sheet, 3, 0), "");
    assert_eq!(s.state().record_count, 1);
}

#[test]
fn simple_collection_written_across_a_row() {
    let original = typed_grid(&[&["Age", "30", "41"]]);
    let options = SyncOptions::default().with_orientation(Orientation::Columns);
    let mut s = session(original, options);
    assert_eq!(loaded(s.read().unwrap()).len(), 2);

    s.write(&Collection::Column {
        heading: "Age".into(),
        values: vec![Value::from(7.0)],
    })
    .unwrap();

    let sheet = s.transport().sheet_grid("Data").unwrap();
    assert_eq!(text_at(&sheet, 0, 0), "Age");
    assert_eq!(text_at(&sheet, 0, 1), "7");
    assert_eq!(text_at(&sheet, 0, 2), "");
}
