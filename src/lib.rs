#![cfg_attr(docsrs, feature(doc_cfg))]

/*!
 # testdata-loader

 Populates a database table with synthetic test rows. Every row pairs a fresh
 v4 UUID with a random string of letters, and rows are inserted one statement
 at a time inside transactions committed every `batch_size` rows.

 ## Core Concepts

- **Job:** a [`loader::LoadJob`] optionally drops and recreates the target table, then runs one step.
- **Step:** a [`core::step::ChunkOrientedStep`] reads items one at a time and writes each of them
  inside a transaction that is committed every chunk. The first failure rolls back the open
  transaction and stops the step.
- **ItemReader:** [`item::fake::record_reader::RecordReader`] produces records whose payload comes
  from [`item::fake::token_generator::TokenGenerator`].
- **ItemWriter:** the RDBC writers insert into PostgreSQL or SQLite through sqlx.

 ## Features

| **Feature**   | **Description**                                               |
|---------------|---------------------------------------------------------------|
| rdbc-postgres | Enables the PostgreSQL `ItemWriter` (default)                 |
| rdbc-sqlite   | Enables the SQLite `ItemWriter`, selected by `sqlite:` DSNs   |
| full          | Enables all available features                                |

 ## Getting Started

```text
DSN='user=postgres password=postgres host=127.0.0.1 port=5432 dbname=postgres sslmode=disable' \
    testdata-loader --init --records 2500 --length 10
```

Or from code, with any writer:

```rust
# use rand::{rngs::StdRng, SeedableRng};
# use testdata_loader::{
#     core::item::{ItemWriter, ItemWriterResult, SchemaExecutor},
#     item::fake::{token_generator::TokenGenerator, Record},
#     loader::LoadJobBuilder,
#     BatchError,
# };
#[derive(Default)]
struct CountingWriter {
    rows: u64,
}

impl ItemWriter<Record> for CountingWriter {
    fn begin(&mut self) -> ItemWriterResult { Ok(()) }
    fn write(&mut self, _item: &Record) -> ItemWriterResult { self.rows += 1; Ok(()) }
    fn commit(&mut self) -> ItemWriterResult { Ok(()) }
    fn rollback(&mut self) -> ItemWriterResult { Ok(()) }
}

impl SchemaExecutor for CountingWriter {
    fn execute_schema(&mut self, _statement: &str) -> Result<(), BatchError> { Ok(()) }
}

fn main() -> Result<(), BatchError> {
    let mut writer = CountingWriter::default();

    let execution = LoadJobBuilder::new()
        .records(2500)
        .length(10)
        .generator(TokenGenerator::new(StdRng::seed_from_u64(7)))
        .build(&mut writer)
        .run()?;

    assert_eq!(execution.commit_count, 3);
    assert_eq!(writer.rows, 2500);
    Ok(())
}
```

 ## License
 Licensed under either of

 -   Apache License, Version 2.0
     ([LICENSE-APACHE](LICENSE-APACHE) or <http://www.apache.org/licenses/LICENSE-2.0>)
 -   MIT license
     ([LICENSE-MIT](LICENSE-MIT) or <http://opensource.org/licenses/MIT>)

 at your option.
 */

/// Command line flags and run configuration
pub mod config;

/// Core module for batch operations
pub mod core;

/// Error types for batch operations
pub mod error;

#[doc(inline)]
pub use error::*;

/// Set of items readers / writers
pub mod item;

/// Load job and backend selection
pub mod loader;
