use thiserror::Error;

#[derive(Error, Debug)]
/// Batch error
pub enum BatchError {
    #[error("Configuration: {0}")]
    Configuration(String),

    #[error("Connection: {0}")]
    Connection(String),

    #[error("Table initialization: {0}")]
    Initialization(String),

    #[error("ItemReader from: {0}")]
    ItemReader(String),

    #[error("ItemWriter from: {0}")]
    ItemWriter(String),

    /// A transaction could not be opened for the batch starting at `index`.
    #[error("Begin failed at record {index} ({committed} records committed): {source}")]
    Begin {
        index: u64,
        committed: u64,
        #[source]
        source: Box<BatchError>,
    },

    /// The insert of record `index` failed and its batch was rolled back.
    #[error("Insert failed at record {index} ({committed} records committed): {source}")]
    Insert {
        index: u64,
        committed: u64,
        #[source]
        source: Box<BatchError>,
    },

    /// The commit of the batch ending at record `index` failed.
    #[error("Commit failed at record {index} ({committed} records committed): {source}")]
    Commit {
        index: u64,
        committed: u64,
        #[source]
        source: Box<BatchError>,
    },
}

impl BatchError {
    /// Number of records durably committed before the run stopped, when known.
    pub fn committed(&self) -> Option<u64> {
        match self {
            BatchError::Begin { committed, .. }
            | BatchError::Insert { committed, .. }
            | BatchError::Commit { committed, .. } => Some(*committed),
            _ => None,
        }
    }
}
