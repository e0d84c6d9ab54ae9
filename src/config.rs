use std::env;

use clap::Parser;

use crate::{
    BatchError,
    core::step::DEFAULT_CHUNK_SIZE,
    item::fake::{DEFAULT_LENGTH, DEFAULT_TABLE},
};

/// Environment variable holding the database connection string.
pub const DSN_ENV: &str = "DSN";

const DSN_EXAMPLE: &str =
    "user=username password=string host=127.0.0.1 port=5432 dbname=postgres sslmode=disable";

/// Longest identifier PostgreSQL keeps without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Command line flags.
#[derive(Debug, Parser)]
#[command(
    name = "testdata-loader",
    version,
    about = "Populate a database table with random test rows",
    after_help = "The DSN environment variable selects the database, e.g. DSN='user=username password=string host=127.0.0.1 port=5432 dbname=postgres sslmode=disable'"
)]
pub struct Args {
    /// Enable verbose output
    #[arg(long)]
    pub verbose: bool,

    /// Drop and create the test table
    #[arg(long)]
    pub init: bool,

    /// Number of records to generate
    #[arg(long, default_value_t = 1000)]
    pub records: u64,

    /// Record length
    #[arg(long, default_value_t = DEFAULT_LENGTH)]
    pub length: usize,

    /// Number of records committed per transaction
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE, value_parser = clap::value_parser!(u64).range(1..))]
    pub batch_size: u64,

    /// Target table
    #[arg(long, default_value = DEFAULT_TABLE)]
    pub table: String,
}

/// Database selected by the DSN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

/// Validated settings of one run.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    pub dsn: String,
    pub init: bool,
    pub records: u64,
    pub length: usize,
    pub batch_size: u64,
    pub table: String,
}

impl LoaderConfig {
    /// Combines the flags with the `DSN` environment variable.
    pub fn from_env(args: Args) -> Result<Self, BatchError> {
        Self::new(args, env::var(DSN_ENV).ok())
    }

    pub fn new(args: Args, dsn: Option<String>) -> Result<Self, BatchError> {
        let dsn = dsn
            .filter(|dsn| !dsn.trim().is_empty())
            .ok_or_else(|| {
                BatchError::Configuration(format!(
                    "{} environment variable required. {}",
                    DSN_ENV, DSN_EXAMPLE
                ))
            })?;

        if args.batch_size == 0 {
            return Err(BatchError::Configuration(
                "batch size must be at least 1".to_string(),
            ));
        }
        validate_identifier(&args.table)?;

        Ok(Self {
            dsn,
            init: args.init,
            records: args.records,
            length: args.length,
            batch_size: args.batch_size,
            table: args.table,
        })
    }

    pub fn backend(&self) -> Backend {
        if self.dsn.starts_with("sqlite:") {
            Backend::Sqlite
        } else {
            Backend::Postgres
        }
    }
}

/// Checks that `name` can be used unquoted as a table name.
pub fn validate_identifier(name: &str) -> Result<(), BatchError> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest && name.len() <= MAX_IDENTIFIER_LEN {
        Ok(())
    } else {
        Err(BatchError::Configuration(format!(
            "invalid table name \"{}\"",
            name
        )))
    }
}

/// Splits a libpq style `key=value key2='quoted value'` string into pairs.
///
/// Whitespace around `=` is ignored. Values may be single-quoted to contain
/// spaces; inside or outside quotes a backslash escapes the next character.
pub fn parse_key_value_dsn(dsn: &str) -> Result<Vec<(String, String)>, BatchError> {
    let mut pairs = Vec::new();
    let mut chars = dsn.chars().peekable();

    loop {
        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.peek().is_none() {
            break;
        }

        let mut key = String::new();
        while let Some(c) = chars.next_if(|c| *c != '=' && !c.is_whitespace()) {
            key.push(c);
        }
        if key.is_empty() {
            return Err(BatchError::Configuration(
                "missing key before \"=\" in DSN".to_string(),
            ));
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        if chars.next() != Some('=') {
            return Err(BatchError::Configuration(format!(
                "missing \"=\" after \"{}\" in DSN",
                key
            )));
        }
        while chars.next_if(|c| c.is_whitespace()).is_some() {}

        let mut value = String::new();
        if chars.next_if_eq(&'\'').is_some() {
            loop {
                match chars.next() {
                    Some('\'') => break,
                    Some('\\') => {
                        if let Some(escaped) = chars.next() {
                            value.push(escaped);
                        }
                    }
                    Some(c) => value.push(c),
                    None => {
                        return Err(BatchError::Configuration(format!(
                            "unterminated quoted value for \"{}\" in DSN",
                            key
                        )));
                    }
                }
            }
        } else {
            while let Some(c) = chars.next_if(|c| !c.is_whitespace()) {
                if c == '\\' {
                    if let Some(escaped) = chars.next() {
                        value.push(escaped);
                    }
                } else {
                    value.push(c);
                }
            }
        }

        pairs.push((key, value));
    }

    Ok(pairs)
}
