/// Generation of synthetic test records.
///
/// A [`Record`] pairs a v4 UUID with a random alphabetic token produced by
/// [`token_generator::TokenGenerator`]. [`record_reader::RecordReader`] exposes
/// a bounded stream of records as an `ItemReader`.
///
/// # Examples
///
/// ```
/// use rand::{rngs::StdRng, SeedableRng};
/// use testdata_loader::core::item::ItemReader;
/// use testdata_loader::item::fake::record_reader::RecordReader;
/// use testdata_loader::item::fake::token_generator::TokenGenerator;
///
/// let generator = TokenGenerator::new(StdRng::seed_from_u64(42));
/// let mut reader = RecordReader::new(generator, 2, 16);
///
/// let record = reader.read().unwrap().unwrap();
/// assert_eq!(record.id.len(), 36);
/// assert_eq!(record.data.len(), 16);
/// assert!(reader.read().is_some());
/// assert!(reader.read().is_none());
/// ```
pub mod record_reader;

pub mod token_generator;

/// Default name of the target table.
pub const DEFAULT_TABLE: &str = "testdata";

/// Default length of a record payload.
pub const DEFAULT_LENGTH: usize = 512;

/// One row of the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Canonical hyphenated UUID, 36 characters
    pub id: String,
    /// Random alphabetic payload
    pub data: String,
}

impl Record {
    /// Columns written for each record, in bind order.
    pub const COLUMNS: [&'static str; 2] = ["id", "data"];

    pub fn drop_table_statement(table: &str) -> String {
        format!("DROP TABLE IF EXISTS {}", table)
    }

    pub fn create_table_statement(table: &str) -> String {
        format!(
            "CREATE TABLE {} (id varchar(36), data text, PRIMARY KEY (id))",
            table
        )
    }
}

#[cfg(test)]
mod tests {
    use super::Record;

    #[test]
    fn schema_statements_target_given_table() {
        assert_eq!(
            Record::drop_table_statement("testdata"),
            "DROP TABLE IF EXISTS testdata"
        );
        assert_eq!(
            Record::create_table_statement("other"),
            "CREATE TABLE other (id varchar(36), data text, PRIMARY KEY (id))"
        );
    }
}
