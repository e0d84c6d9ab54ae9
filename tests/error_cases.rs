mod common;

use common::MockRecordWriter;
use mockall::Sequence;
use rand::{SeedableRng, rngs::StdRng};

use testdata_loader::{
    BatchError,
    item::fake::token_generator::TokenGenerator,
    loader::{JobExecution, LoadJobBuilder},
};

fn run_job(
    writer: &mut MockRecordWriter,
    records: u64,
    chunk: u64,
    initialize: bool,
) -> Result<JobExecution, BatchError> {
    LoadJobBuilder::new()
        .records(records)
        .length(8)
        .chunk(chunk)
        .initialize(initialize)
        .generator(TokenGenerator::new(StdRng::seed_from_u64(3)))
        .build(writer)
        .run()
}

fn write_error() -> BatchError {
    BatchError::ItemWriter("duplicate key value violates unique constraint".to_string())
}

#[test]
fn insert_error_rolls_back_and_stops() {
    let mut writer = MockRecordWriter::new();
    let mut written = 0;

    writer.expect_begin().times(2).returning(|| Ok(()));
    writer.expect_write().times(5).returning(move |_| {
        written += 1;
        if written == 5 { Err(write_error()) } else { Ok(()) }
    });
    writer.expect_commit().times(1).returning(|| Ok(()));
    writer.expect_rollback().times(1).returning(|| Ok(()));
    writer.expect_execute_schema().never();

    let result = run_job(&mut writer, 10, 3, false);

    match result {
        Err(BatchError::Insert {
            index, committed, ..
        }) => {
            assert_eq!(index, 4);
            assert_eq!(committed, 3);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn commit_error_rolls_back_and_stops() {
    let mut writer = MockRecordWriter::new();
    let mut seq = Sequence::new();

    writer
        .expect_begin()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    writer
        .expect_write()
        .times(3)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    writer
        .expect_commit()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Err(BatchError::ItemWriter("connection reset".to_string())));
    writer
        .expect_rollback()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));

    let err = run_job(&mut writer, 10, 3, false).unwrap_err();

    assert!(matches!(
        err,
        BatchError::Commit {
            index: 2,
            committed: 0,
            ..
        }
    ));
    assert_eq!(err.committed(), Some(0));
}

#[test]
fn rollback_error_does_not_hide_insert_error() {
    let mut writer = MockRecordWriter::new();

    writer.expect_begin().times(1).returning(|| Ok(()));
    writer.expect_write().times(1).returning(|_| Err(write_error()));
    writer
        .expect_rollback()
        .times(1)
        .returning(|| Err(BatchError::ItemWriter("connection closed".to_string())));

    let err = run_job(&mut writer, 3, 3, false).unwrap_err();

    assert!(matches!(err, BatchError::Insert { index: 0, .. }));
    assert!(err.to_string().contains("duplicate key"));
}

#[test]
fn begin_error_stops_without_writing() {
    let mut writer = MockRecordWriter::new();

    writer.expect_begin().times(1).returning(|| {
        Err(BatchError::ItemWriter("too many connections".to_string()))
    });
    writer.expect_write().never();
    writer.expect_rollback().never();

    let err = run_job(&mut writer, 3, 3, false).unwrap_err();

    assert!(matches!(
        err,
        BatchError::Begin {
            index: 0,
            committed: 0,
            ..
        }
    ));
}

#[test]
fn initialization_runs_before_first_transaction() {
    let mut writer = MockRecordWriter::new();
    let mut seq = Sequence::new();

    writer
        .expect_execute_schema()
        .withf(|statement| statement == "DROP TABLE IF EXISTS testdata")
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    writer
        .expect_execute_schema()
        .withf(|statement| statement.starts_with("CREATE TABLE testdata"))
        .times(1)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    writer
        .expect_begin()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    writer
        .expect_write()
        .withf(|record| record.data.len() == 8 && record.id.len() == 36)
        .times(2)
        .in_sequence(&mut seq)
        .returning(|_| Ok(()));
    writer
        .expect_commit()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));

    let execution = run_job(&mut writer, 2, 3, true).unwrap();

    assert!(execution.initialized);
    assert_eq!(execution.write_count, 2);
    assert_eq!(execution.commit_count, 1);
}

#[test]
fn initialization_error_prevents_loading() {
    let mut writer = MockRecordWriter::new();

    writer
        .expect_execute_schema()
        .times(1)
        .returning(|_| Err(BatchError::Initialization("permission denied".to_string())));
    writer.expect_begin().never();

    let result = run_job(&mut writer, 10, 3, true);

    assert!(matches!(result, Err(BatchError::Initialization(_))));
}

#[test]
fn zero_records_touch_nothing() {
    // Any call on the mock would panic.
    let mut writer = MockRecordWriter::new();

    let execution = run_job(&mut writer, 0, 1000, false).unwrap();

    assert_eq!(execution.write_count, 0);
    assert_eq!(execution.commit_count, 0);
}
