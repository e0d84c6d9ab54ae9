use log::{debug, error, info};
use uuid::Uuid;

use crate::BatchError;

use super::{
    build_name,
    item::{ItemReader, ItemWriter},
};

/// Default number of items committed per transaction.
pub const DEFAULT_CHUNK_SIZE: u64 = 1000;

/// Counters of a completed step.
#[derive(Debug)]
pub struct StepExecution {
    /// Unique identifier for this step instance
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Number of items read from the reader
    pub read_count: u64,
    /// Number of items durably written (committed)
    pub write_count: u64,
    /// Number of committed transactions
    pub commit_count: u64,
}

impl StepExecution {
    fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            read_count: 0,
            write_count: 0,
            commit_count: 0,
        }
    }
}

/// Reads items one at a time and writes each of them inside a transaction
/// that is committed every `chunk_size` items and after the last item.
///
/// The step is fail-fast: the first write or commit error rolls back the
/// open transaction and ends the step, so only fully committed chunks persist.
pub struct ChunkOrientedStep<'a, I> {
    name: String,
    /// Component responsible for reading items from the source
    reader: &'a mut dyn ItemReader<I>,
    /// Component responsible for writing items to the destination
    writer: &'a mut dyn ItemWriter<I>,
    /// Number of items written in each transaction
    chunk_size: u64,
}

impl<I> ChunkOrientedStep<'_, I> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn execute(&mut self) -> Result<StepExecution, BatchError> {
        let mut execution = StepExecution::new(&self.name);
        info!("Start of step: {}, id: {}", execution.name, execution.id);

        let mut index: u64 = 0;
        let mut pending: u64 = 0;
        let mut in_transaction = false;

        loop {
            let item = match self.reader.read() {
                Some(Ok(item)) => item,
                Some(Err(err)) => {
                    error!("Error occured during read item {}: {}", index, err);
                    if in_transaction {
                        self.rollback(index);
                    }
                    return Err(err);
                }
                None => break,
            };
            execution.read_count += 1;

            if index % self.chunk_size == 0 {
                info!("BEGIN ({})", index);
                if let Err(err) = self.writer.begin() {
                    error!("Unable to begin transaction at record {}: {}", index, err);
                    return Err(BatchError::Begin {
                        index,
                        committed: execution.write_count,
                        source: Box::new(err),
                    });
                }
                in_transaction = true;
            }

            if let Err(err) = self.writer.write(&item) {
                error!("ItemWriter error at record {}: {}", index, err);
                self.rollback(index);
                return Err(BatchError::Insert {
                    index,
                    committed: execution.write_count,
                    source: Box::new(err),
                });
            }
            debug!("Record {} written", index);
            pending += 1;

            if index % self.chunk_size == self.chunk_size - 1 {
                self.commit(index, pending, &mut execution)?;
                pending = 0;
                in_transaction = false;
            }

            index += 1;
        }

        // Final partial chunk
        if in_transaction {
            self.commit(index - 1, pending, &mut execution)?;
        }

        info!(
            "End of step: {}, {} records in {} transactions",
            execution.name, execution.write_count, execution.commit_count
        );

        Ok(execution)
    }

    fn commit(
        &mut self,
        index: u64,
        pending: u64,
        execution: &mut StepExecution,
    ) -> Result<(), BatchError> {
        info!("COMMIT ({})", index);
        match self.writer.commit() {
            Ok(()) => {
                execution.write_count += pending;
                execution.commit_count += 1;
                Ok(())
            }
            Err(err) => {
                error!("Commit error at record {}: {}", index, err);
                // Some engines already rolled back; make sure nothing stays open.
                self.rollback(index);
                Err(BatchError::Commit {
                    index,
                    committed: execution.write_count,
                    source: Box::new(err),
                })
            }
        }
    }

    fn rollback(&mut self, index: u64) {
        info!("ROLLBACK ({})", index);
        if let Err(err) = self.writer.rollback() {
            error!("Rollback error at record {}: {}", index, err);
        }
    }
}

pub struct StepBuilder<'a, I> {
    name: String,
    reader: Option<&'a mut dyn ItemReader<I>>,
    writer: Option<&'a mut dyn ItemWriter<I>>,
    chunk_size: u64,
}

impl<'a, I> StepBuilder<'a, I> {
    pub fn new() -> StepBuilder<'a, I> {
        Self {
            name: build_name(),
            reader: None,
            writer: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn name(mut self, name: &str) -> StepBuilder<'a, I> {
        self.name = name.to_string();
        self
    }

    pub fn reader(mut self, reader: &'a mut impl ItemReader<I>) -> StepBuilder<'a, I> {
        self.reader = Some(reader);
        self
    }

    pub fn writer(mut self, writer: &'a mut impl ItemWriter<I>) -> StepBuilder<'a, I> {
        self.writer = Some(writer);
        self
    }

    /// Sets the commit interval.
    pub fn chunk(mut self, chunk_size: u64) -> StepBuilder<'a, I> {
        self.chunk_size = chunk_size;
        self
    }

    pub fn build(self) -> Result<ChunkOrientedStep<'a, I>, BatchError> {
        if self.chunk_size == 0 {
            return Err(BatchError::Configuration(
                "chunk size must be at least 1".to_string(),
            ));
        }

        let reader = self
            .reader
            .ok_or_else(|| BatchError::Configuration("a step requires a reader".to_string()))?;
        let writer = self
            .writer
            .ok_or_else(|| BatchError::Configuration("a step requires a writer".to_string()))?;

        Ok(ChunkOrientedStep {
            name: self.name,
            reader,
            writer,
            chunk_size: self.chunk_size,
        })
    }
}

impl<I> Default for StepBuilder<'_, I> {
    fn default() -> Self {
        Self::new()
    }
}
