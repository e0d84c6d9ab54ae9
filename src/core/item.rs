use crate::error::BatchError;

/// Result returned by every [`ItemWriter`] operation.
pub type ItemWriterResult = Result<(), BatchError>;

/// Source of items for a step, one item at a time.
pub trait ItemReader<R> {
    /// Returns the next item, or `None` once the source is exhausted.
    fn read(&mut self) -> Option<Result<R, BatchError>>;
}

/// Transactional destination of a step.
///
/// The step opens a transaction with [`begin`](ItemWriter::begin), writes each
/// item of the chunk individually and then calls [`commit`](ItemWriter::commit).
/// On any failure it calls [`rollback`](ItemWriter::rollback), which must be a
/// no-op when no transaction is open.
pub trait ItemWriter<W> {
    fn begin(&mut self) -> ItemWriterResult;
    fn write(&mut self, item: &W) -> ItemWriterResult;
    fn commit(&mut self) -> ItemWriterResult;
    fn rollback(&mut self) -> ItemWriterResult;
}

/// Executes schema statements (DDL) outside of any transaction.
pub trait SchemaExecutor {
    fn execute_schema(&mut self, statement: &str) -> Result<(), BatchError>;
}
