/// This module provides the random record generator and its item reader.
pub mod fake;

#[cfg(feature = "rdbc")]
/// This module provides transactional RDBC (PostgreSQL, SQLite) item writers.
pub mod rdbc;
