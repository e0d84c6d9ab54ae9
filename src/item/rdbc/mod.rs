use sqlx::{Database, query_builder::Separated};
use tokio::runtime::{Builder, Runtime};

use crate::{BatchError, item::fake::Record};

#[cfg(feature = "rdbc-postgres")]
pub mod postgres_writer;

#[cfg(feature = "rdbc-sqlite")]
pub mod sqlite_writer;

/// Trait for binding item data to database query parameters.
///
/// This trait is generic over the database type, allowing the same item type to
/// be written to PostgreSQL or SQLite by the matching item writer.
///
/// # Type Parameters
///
/// * `O` - The item type to bind
/// * `DB` - The SQLx database type (e.g., `Postgres`, `Sqlite`)
///
/// # Examples
///
/// ```no_run
/// use testdata_loader::item::rdbc::DatabaseItemBinder;
/// use sqlx::{query_builder::Separated, Postgres};
///
/// struct User {
///     id: i32,
///     name: String,
/// }
///
/// struct UserBinder;
/// impl DatabaseItemBinder<User, Postgres> for UserBinder {
///     fn bind(&self, item: &User, mut query_builder: Separated<Postgres, &str>) {
///         query_builder.push_bind(item.id);
///         query_builder.push_bind(item.name.clone());
///     }
/// }
/// ```
pub trait DatabaseItemBinder<O, DB: Database> {
    /// Binds the properties of an item to a separated query builder.
    ///
    /// # Arguments
    ///
    /// * `item` - The item whose properties should be bound.
    /// * `query_builder` - The separated query builder to bind parameters to.
    fn bind(&self, item: &O, query_builder: Separated<DB, &str>);
}

/// Binds a [`Record`] as `(id, data)`, matching [`Record::COLUMNS`].
#[derive(Default)]
pub struct RecordBinder;

#[cfg(feature = "rdbc-postgres")]
impl DatabaseItemBinder<Record, sqlx::Postgres> for RecordBinder {
    fn bind(&self, item: &Record, mut query_builder: Separated<sqlx::Postgres, &str>) {
        query_builder.push_bind(item.id.clone());
        query_builder.push_bind(item.data.clone());
    }
}

#[cfg(feature = "rdbc-sqlite")]
impl DatabaseItemBinder<Record, sqlx::Sqlite> for RecordBinder {
    fn bind(&self, item: &Record, mut query_builder: Separated<sqlx::Sqlite, &str>) {
        query_builder.push_bind(item.id.clone());
        query_builder.push_bind(item.data.clone());
    }
}

/// Runtime driving the sqlx futures of a writer from synchronous code.
pub(crate) fn build_runtime() -> Result<Runtime, BatchError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| BatchError::Connection(format!("unable to start runtime: {}", e)))
}
