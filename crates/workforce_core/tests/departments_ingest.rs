mod common;

use common::*;
use workforce_core::error::{DUPLICATE_RECORD_MSG, INVALID_DATA_FORMAT_MSG};
use workforce_core::{count_records, list_ids, to_delimited_bytes, Department, EntityKind, ErrorKind};

#[test]
fn creates_departments_under_and_over_batch_size() {
    let conn = memory_db();
    let (service, _) = service(&conn, BATCH_SIZE);
    let size = BATCH_SIZE * 16 / 10;
    let limit = BATCH_SIZE / 2;
    let records = departments(size);

    assert_eq!(service.ingest_departments_batch(&records[..limit]).unwrap(), limit);
    assert_eq!(
        service.ingest_departments_batch(&records[limit..]).unwrap(),
        size - limit
    );

    assert_eq!(list_ids(&conn, EntityKind::Department).unwrap(), ids(&records));
}

#[test]
fn creates_departments_from_delimited_file() {
    let conn = memory_db();
    let (service, _) = service(&conn, BATCH_SIZE);
    let size = BATCH_SIZE * 16 / 10;
    let limit = BATCH_SIZE / 2;
    let records = departments(size);

    let first = to_delimited_bytes(&records[..limit], Department::COLUMNS).unwrap();
    let second = to_delimited_bytes(&records[limit..], Department::COLUMNS).unwrap();
    assert_eq!(service.ingest_departments_file(&first).unwrap(), limit);
    assert_eq!(service.ingest_departments_file(&second).unwrap(), size - limit);

    assert_eq!(count_records(&conn, EntityKind::Department).unwrap(), size as u64);
}

#[test]
fn exact_batch_size_is_one_chunk() {
    let conn = memory_db();
    let (service, log) = service(&conn, BATCH_SIZE);

    assert_eq!(
        service.ingest_departments_batch(&departments(BATCH_SIZE)).unwrap(),
        BATCH_SIZE
    );
    let flushes = log
        .events()
        .iter()
        .filter(|(_, message)| message.contains("event=chunk_flush"))
        .count();
    assert_eq!(flushes, 1);
}

#[test]
fn duplicate_id_rolls_back_whole_call() {
    for size in [BATCH_SIZE / 2, BATCH_SIZE * 3 / 2] {
        let conn = memory_db();
        let (service, _) = service(&conn, BATCH_SIZE);

        let err = service
            .ingest_departments_batch(&departments_with_duplicate_id(size))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateRecord);
        assert_eq!(err.to_string(), DUPLICATE_RECORD_MSG);
        assert_eq!(count_records(&conn, EntityKind::Department).unwrap(), 0);
    }
}

#[test]
fn duplicate_name_rolls_back_whole_call() {
    for size in [BATCH_SIZE / 2, BATCH_SIZE * 3 / 2] {
        let conn = memory_db();
        let (service, _) = service(&conn, BATCH_SIZE);

        let bytes =
            to_delimited_bytes(&departments_with_duplicate_name(size), Department::COLUMNS)
                .unwrap();
        let err = service.ingest_departments_file(&bytes).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateRecord);
        assert_eq!(count_records(&conn, EntityKind::Department).unwrap(), 0);
    }
}

#[test]
fn duplicate_against_committed_rows_keeps_earlier_call() {
    let conn = memory_db();
    let (service, _) = service(&conn, 10);
    service.ingest_departments_batch(&departments(5)).unwrap();

    let err = service.ingest_departments_batch(&departments(8)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateRecord);
    assert_eq!(count_records(&conn, EntityKind::Department).unwrap(), 5);
}

#[test]
fn json_payload_to_file_entry_point_is_invalid_data() {
    for size in [BATCH_SIZE / 2, BATCH_SIZE * 3 / 2] {
        let conn = memory_db();
        let (service, _) = service(&conn, BATCH_SIZE);

        let err = service
            .ingest_departments_file(&to_json_bytes(&departments_with_duplicate_name(size)))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDataFormat);
        assert_eq!(err.to_string(), INVALID_DATA_FORMAT_MSG);
        assert_eq!(count_records(&conn, EntityKind::Department).unwrap(), 0);
    }
}

#[test]
fn empty_name_is_rejected_by_storage() {
    let conn = memory_db();
    let (service, _) = service(&conn, BATCH_SIZE);
    let mut records = departments(3);
    records.push(workforce_core::RawRecord::new().with("id", "9").with("name", "  "));

    let err = service.ingest_departments_batch(&records).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidDataFormat);
    assert_eq!(count_records(&conn, EntityKind::Department).unwrap(), 0);
}

#[test]
fn empty_input_commits_nothing_and_returns_zero() {
    let conn = memory_db();
    let (service, _) = service(&conn, BATCH_SIZE);
    assert_eq!(service.ingest_departments_batch(&[]).unwrap(), 0);
    assert_eq!(service.ingest_departments_file(b"").unwrap(), 0);
}
