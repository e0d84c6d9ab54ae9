use std::str::FromStr;

use log::{debug, error, info, warn};
use sqlx::{
    Pool, QueryBuilder, Sqlite, Transaction,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tokio::runtime::Runtime;

use crate::BatchError;
use crate::core::item::{ItemWriter, ItemWriterResult, SchemaExecutor};
use crate::item::rdbc::{DatabaseItemBinder, build_runtime};

/// Builds SQLite connection options from a `sqlite:` URL, creating the file if missing.
pub fn connect_options(dsn: &str) -> Result<SqliteConnectOptions, BatchError> {
    if !dsn.starts_with("sqlite:") {
        return Err(BatchError::Configuration(format!(
            "invalid DSN: \"{}\" is not a sqlite: URL",
            dsn
        )));
    }
    SqliteConnectOptions::from_str(dsn)
        .map(|options| options.create_if_missing(true))
        .map_err(|e| BatchError::Configuration(format!("invalid DSN: {}", e)))
}

/// A transactional writer inserting one item per statement into a SQLite table.
///
/// Mirrors [`PostgresItemWriter`](crate::item::rdbc::postgres_writer::PostgresItemWriter)
/// for local databases: one pooled connection, blocking calls, rollback on drop.
pub struct SqliteItemWriter<'a, O> {
    transaction: Option<Transaction<'static, Sqlite>>,
    pool: Pool<Sqlite>,
    table: String,
    columns: Vec<&'a str>,
    item_binder: &'a dyn DatabaseItemBinder<O, Sqlite>,
    runtime: Runtime,
}

impl<O> ItemWriter<O> for SqliteItemWriter<'_, O> {
    fn begin(&mut self) -> ItemWriterResult {
        if self.transaction.is_some() {
            return Err(BatchError::ItemWriter(
                "a transaction is already open".to_string(),
            ));
        }

        let transaction = self.runtime.block_on(self.pool.begin()).map_err(|e| {
            BatchError::ItemWriter(format!("SQLite begin failed: {}", e))
        })?;
        self.transaction = Some(transaction);
        Ok(())
    }

    fn write(&mut self, item: &O) -> ItemWriterResult {
        let transaction = self
            .transaction
            .as_mut()
            .ok_or_else(|| BatchError::ItemWriter("no open transaction".to_string()))?;

        let mut query_builder = QueryBuilder::<Sqlite>::new("INSERT INTO ");
        query_builder.push(&self.table);
        query_builder.push(" (");
        query_builder.push(self.columns.join(","));
        query_builder.push(") ");
        query_builder.push_values(std::iter::once(item), |b, item| {
            self.item_binder.bind(item, b);
        });

        let result = self
            .runtime
            .block_on(async { query_builder.build().execute(&mut **transaction).await });

        match result {
            Ok(_) => {
                debug!("Inserted 1 row into SQLite table {}", self.table);
                Ok(())
            }
            Err(e) => {
                error!(
                    "Failed to write item to SQLite table {}: {}",
                    self.table, e
                );
                Err(BatchError::ItemWriter(format!(
                    "SQLite write failed: {}",
                    e
                )))
            }
        }
    }

    fn commit(&mut self) -> ItemWriterResult {
        let transaction = self
            .transaction
            .take()
            .ok_or_else(|| BatchError::ItemWriter("no open transaction".to_string()))?;

        self.runtime
            .block_on(transaction.commit())
            .map_err(|e| BatchError::ItemWriter(format!("SQLite commit failed: {}", e)))
    }

    fn rollback(&mut self) -> ItemWriterResult {
        match self.transaction.take() {
            Some(transaction) => self
                .runtime
                .block_on(transaction.rollback())
                .map_err(|e| BatchError::ItemWriter(format!("SQLite rollback failed: {}", e))),
            None => {
                debug!("No open transaction to roll back");
                Ok(())
            }
        }
    }
}

impl<O> SchemaExecutor for SqliteItemWriter<'_, O> {
    fn execute_schema(&mut self, statement: &str) -> Result<(), BatchError> {
        if self.transaction.is_some() {
            return Err(BatchError::Initialization(
                "schema statements cannot run inside an open transaction".to_string(),
            ));
        }

        debug!("Executing: {}", statement);
        self.runtime
            .block_on(sqlx::query(statement).execute(&self.pool))
            .map(|_| ())
            .map_err(|e| BatchError::Initialization(format!("{}: {}", statement, e)))
    }
}

impl<O> Drop for SqliteItemWriter<'_, O> {
    fn drop(&mut self) {
        if let Some(transaction) = self.transaction.take() {
            warn!("Rolling back open transaction on table {}", self.table);
            if let Err(e) = self.runtime.block_on(transaction.rollback()) {
                error!("Rollback on drop failed: {}", e);
            }
        }
        self.runtime.block_on(self.pool.close());
    }
}

/// Builder connecting a [`SqliteItemWriter`].
///
/// # Examples
///
/// ```no_run
/// use testdata_loader::item::fake::Record;
/// use testdata_loader::item::rdbc::RecordBinder;
/// use testdata_loader::item::rdbc::sqlite_writer::SqliteItemWriterBuilder;
///
/// # fn example() -> Result<(), testdata_loader::BatchError> {
/// let binder = RecordBinder;
/// let writer = SqliteItemWriterBuilder::<Record>::new()
///     .dsn("sqlite://testdata.db")
///     .table("testdata")
///     .add_column("id")
///     .add_column("data")
///     .item_binder(&binder)
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct SqliteItemWriterBuilder<'a, O> {
    dsn: Option<&'a str>,
    options: Option<SqliteConnectOptions>,
    table: Option<&'a str>,
    columns: Vec<&'a str>,
    item_binder: Option<&'a dyn DatabaseItemBinder<O, Sqlite>>,
}

impl<'a, O> SqliteItemWriterBuilder<'a, O> {
    pub fn new() -> Self {
        Self {
            dsn: None,
            options: None,
            table: None,
            columns: Vec::new(),
            item_binder: None,
        }
    }

    /// Sets the DSN, parsed when the writer is built.
    pub fn dsn(mut self, dsn: &'a str) -> Self {
        self.dsn = Some(dsn);
        self
    }

    /// Sets already parsed connection options; takes precedence over [`dsn`](Self::dsn).
    pub fn connect_options(mut self, options: SqliteConnectOptions) -> Self {
        self.options = Some(options);
        self
    }

    pub fn table(mut self, table: &'a str) -> Self {
        self.table = Some(table);
        self
    }

    pub fn add_column(mut self, column: &'a str) -> Self {
        self.columns.push(column);
        self
    }

    pub fn item_binder(mut self, item_binder: &'a dyn DatabaseItemBinder<O, Sqlite>) -> Self {
        self.item_binder = Some(item_binder);
        self
    }

    /// Connects to the database and returns the writer.
    pub fn build(self) -> Result<SqliteItemWriter<'a, O>, BatchError> {
        let table = self
            .table
            .ok_or_else(|| BatchError::Configuration("Table name is mandatory".to_string()))?;
        if self.columns.is_empty() {
            return Err(BatchError::Configuration(
                "One or more columns are required".to_string(),
            ));
        }
        let item_binder = self
            .item_binder
            .ok_or_else(|| BatchError::Configuration("An item binder is required".to_string()))?;
        let options = match (self.options, self.dsn) {
            (Some(options), _) => options,
            (None, Some(dsn)) => connect_options(dsn)?,
            (None, None) => {
                return Err(BatchError::Configuration("A DSN is required".to_string()));
            }
        };

        let runtime = build_runtime()?;
        let pool = runtime
            .block_on(
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .connect_with(options),
            )
            .map_err(|e| BatchError::Connection(format!("SQLite: {}", e)))?;
        info!("Connected to SQLite, target table {}", table);

        Ok(SqliteItemWriter {
            transaction: None,
            pool,
            table: table.to_string(),
            columns: self.columns,
            item_binder,
            runtime,
        })
    }
}

impl<O> Default for SqliteItemWriterBuilder<'_, O> {
    fn default() -> Self {
        Self::new()
    }
}
