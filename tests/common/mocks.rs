//! Mock version of a database record writer.
use mockall::mock;

use testdata_loader::{
    BatchError,
    core::item::{ItemWriter, SchemaExecutor},
    item::fake::Record,
};

mock! {
    pub RecordWriter {}
    impl ItemWriter<Record> for RecordWriter {
        fn begin(&mut self) -> Result<(), BatchError>;
        fn write(&mut self, item: &Record) -> Result<(), BatchError>;
        fn commit(&mut self) -> Result<(), BatchError>;
        fn rollback(&mut self) -> Result<(), BatchError>;
    }
    impl SchemaExecutor for RecordWriter {
        fn execute_schema(&mut self, statement: &str) -> Result<(), BatchError>;
    }
}
