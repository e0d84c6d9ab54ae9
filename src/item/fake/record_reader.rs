use log::debug;
use rand::{RngCore, rngs::StdRng};
use uuid::Uuid;

use crate::{core::item::ItemReader, error::BatchError};

use super::{Record, token_generator::TokenGenerator};

/// Produces a fixed number of [`Record`]s with fresh identifiers and random payloads.
pub struct RecordReader<R: RngCore = StdRng> {
    generator: TokenGenerator<R>,
    count: u64,
    length: usize,
}

impl<R: RngCore> RecordReader<R> {
    pub fn new(generator: TokenGenerator<R>, number_of_items: u64, length: usize) -> Self {
        Self {
            generator,
            count: number_of_items,
            length,
        }
    }

    /// Records still to be produced.
    pub fn remaining(&self) -> u64 {
        self.count
    }
}

impl<R: RngCore> ItemReader<Record> for RecordReader<R> {
    fn read(&mut self) -> Option<Result<Record, BatchError>> {
        if self.count == 0 {
            return None;
        }
        self.count -= 1;

        let record = Record {
            id: Uuid::new_v4().to_string(),
            data: self.generator.generate(self.length),
        };
        debug!("Record: {}", record.id);
        Some(Ok(record))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;

    use super::*;

    #[test]
    fn reads_requested_number_of_records() {
        let generator = TokenGenerator::new(StdRng::seed_from_u64(1));
        let mut reader = RecordReader::new(generator, 3, 10);
        assert_eq!(reader.remaining(), 3);

        let mut ids = HashSet::new();
        while let Some(result) = reader.read() {
            let record = result.unwrap();
            assert_eq!(record.data.len(), 10);
            assert!(record.data.bytes().all(|b| b.is_ascii_alphabetic()));
            assert!(Uuid::parse_str(&record.id).is_ok());
            assert_eq!(record.id.len(), 36);
            ids.insert(record.id);
        }

        assert_eq!(ids.len(), 3);
        assert_eq!(reader.remaining(), 0);
        assert!(reader.read().is_none());
    }

    #[test]
    fn empty_reader_yields_nothing() {
        let generator = TokenGenerator::new(StdRng::seed_from_u64(1));
        let mut reader = RecordReader::new(generator, 0, 10);
        assert!(reader.read().is_none());
    }

    #[test]
    fn zero_length_payloads_are_empty() {
        let generator = TokenGenerator::new(StdRng::seed_from_u64(1));
        let mut reader = RecordReader::new(generator, 1, 0);
        assert_eq!(reader.read().unwrap().unwrap().data, "");
    }
}
