use log::info;
use uuid::Uuid;

use crate::{
    BatchError,
    config::{Backend, LoaderConfig},
    core::{
        item::{ItemWriter, SchemaExecutor},
        step::{DEFAULT_CHUNK_SIZE, StepBuilder},
    },
    item::fake::{
        DEFAULT_LENGTH, DEFAULT_TABLE, Record, record_reader::RecordReader,
        token_generator::TokenGenerator,
    },
};

/// Type alias for job execution results.
pub type JobResult<T> = Result<T, BatchError>;

/// Outcome of a successful load.
#[derive(Debug)]
pub struct JobExecution {
    /// Unique identifier of this run
    pub id: Uuid,
    pub name: String,
    /// Whether the target table was dropped and recreated first
    pub initialized: bool,
    /// Number of rows committed
    pub write_count: u64,
    /// Number of committed transactions
    pub commit_count: u64,
}

/// Loads random records into one table, optionally recreating it first.
///
/// # Examples
///
/// ```no_run
/// use testdata_loader::item::fake::Record;
/// use testdata_loader::item::rdbc::RecordBinder;
/// use testdata_loader::item::rdbc::postgres_writer::PostgresItemWriterBuilder;
/// use testdata_loader::loader::LoadJobBuilder;
///
/// # fn example() -> Result<(), testdata_loader::BatchError> {
/// let binder = RecordBinder;
/// let mut writer = PostgresItemWriterBuilder::<Record>::new()
///     .dsn("host=127.0.0.1 user=postgres dbname=postgres sslmode=disable")
///     .table("testdata")
///     .add_column("id")
///     .add_column("data")
///     .item_binder(&binder)
///     .build()?;
///
/// let execution = LoadJobBuilder::new()
///     .records(2500)
///     .length(10)
///     .initialize(true)
///     .build(&mut writer)
///     .run()?;
///
/// assert_eq!(execution.commit_count, 3);
/// # Ok(())
/// # }
/// ```
pub struct LoadJob<'a, W> {
    id: Uuid,
    name: String,
    writer: &'a mut W,
    table: String,
    records: u64,
    length: usize,
    chunk_size: u64,
    initialize: bool,
    generator: TokenGenerator,
}

impl<W> LoadJob<'_, W>
where
    W: ItemWriter<Record> + SchemaExecutor,
{
    pub fn run(self) -> JobResult<JobExecution> {
        let LoadJob {
            id,
            name,
            writer,
            table,
            records,
            length,
            chunk_size,
            initialize,
            generator,
        } = self;

        info!("Start of job: {}, id: {}", name, id);

        if initialize {
            initialize_table(&mut *writer, &table)?;
        }

        let mut reader = RecordReader::new(generator, records, length);
        let step_name = format!("load-{}", table);
        let mut step = StepBuilder::new()
            .name(&step_name)
            .reader(&mut reader)
            .writer(writer)
            .chunk(chunk_size)
            .build()?;
        let step_execution = step.execute()?;

        info!("End of job: {}, id: {}", name, id);

        Ok(JobExecution {
            id,
            name,
            initialized: initialize,
            write_count: step_execution.write_count,
            commit_count: step_execution.commit_count,
        })
    }
}

/// Drops the target table if it exists and creates it empty.
pub fn initialize_table(writer: &mut impl SchemaExecutor, table: &str) -> JobResult<()> {
    info!("starting table initialize");
    writer.execute_schema(&Record::drop_table_statement(table))?;
    writer.execute_schema(&Record::create_table_statement(table))?;
    info!("table initialized");
    Ok(())
}

pub struct LoadJobBuilder {
    name: Option<String>,
    table: String,
    records: u64,
    length: usize,
    chunk_size: u64,
    initialize: bool,
    generator: Option<TokenGenerator>,
}

impl LoadJobBuilder {
    pub fn new() -> Self {
        Self {
            name: None,
            table: DEFAULT_TABLE.to_string(),
            records: 1000,
            length: DEFAULT_LENGTH,
            chunk_size: DEFAULT_CHUNK_SIZE,
            initialize: false,
            generator: None,
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new()
            .table(&config.table)
            .records(config.records)
            .length(config.length)
            .chunk(config.batch_size)
            .initialize(config.init)
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn table(mut self, table: &str) -> Self {
        self.table = table.to_string();
        self
    }

    pub fn records(mut self, records: u64) -> Self {
        self.records = records;
        self
    }

    pub fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn chunk(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Drop and recreate the table before loading.
    pub fn initialize(mut self, initialize: bool) -> Self {
        self.initialize = initialize;
        self
    }

    /// Uses the given generator instead of one seeded from the clock.
    pub fn generator(mut self, generator: TokenGenerator) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn build<W>(self, writer: &mut W) -> LoadJob<'_, W> {
        let name = self
            .name
            .unwrap_or_else(|| format!("testdata-loader-{}", self.table));
        LoadJob {
            id: Uuid::new_v4(),
            name,
            writer,
            table: self.table,
            records: self.records,
            length: self.length,
            chunk_size: self.chunk_size,
            initialize: self.initialize,
            generator: self.generator.unwrap_or_else(TokenGenerator::from_time),
        }
    }
}

impl Default for LoadJobBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Connects to the database named by the configuration and runs the load.
pub fn run(config: &LoaderConfig) -> JobResult<JobExecution> {
    match config.backend() {
        Backend::Postgres => run_postgres(config),
        Backend::Sqlite => run_sqlite(config),
    }
}

#[cfg(feature = "rdbc-postgres")]
fn run_postgres(config: &LoaderConfig) -> JobResult<JobExecution> {
    use crate::item::rdbc::{RecordBinder, postgres_writer::PostgresItemWriterBuilder};

    let binder = RecordBinder;
    let mut writer = PostgresItemWriterBuilder::<Record>::new()
        .dsn(&config.dsn)
        .table(&config.table)
        .add_column(Record::COLUMNS[0])
        .add_column(Record::COLUMNS[1])
        .item_binder(&binder)
        .build()?;

    LoadJobBuilder::from_config(config).build(&mut writer).run()
}

#[cfg(not(feature = "rdbc-postgres"))]
fn run_postgres(_config: &LoaderConfig) -> JobResult<JobExecution> {
    Err(BatchError::Configuration(
        "PostgreSQL support requires the rdbc-postgres feature".to_string(),
    ))
}

#[cfg(feature = "rdbc-sqlite")]
fn run_sqlite(config: &LoaderConfig) -> JobResult<JobExecution> {
    use crate::item::rdbc::{RecordBinder, sqlite_writer::SqliteItemWriterBuilder};

    let binder = RecordBinder;
    let mut writer = SqliteItemWriterBuilder::<Record>::new()
        .dsn(&config.dsn)
        .table(&config.table)
        .add_column(Record::COLUMNS[0])
        .add_column(Record::COLUMNS[1])
        .item_binder(&binder)
        .build()?;

    LoadJobBuilder::from_config(config).build(&mut writer).run()
}

#[cfg(not(feature = "rdbc-sqlite"))]
fn run_sqlite(_config: &LoaderConfig) -> JobResult<JobExecution> {
    Err(BatchError::Configuration(
        "SQLite support requires the rdbc-sqlite feature".to_string(),
    ))
}
