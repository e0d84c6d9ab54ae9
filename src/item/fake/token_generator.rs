use std::time::{SystemTime, UNIX_EPOCH};

use rand::{RngCore, SeedableRng, rngs::StdRng};

const ALPHABET: &[u8; 52] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const GROUP_BITS: u32 = 6;
const GROUP_MASK: u64 = (1 << GROUP_BITS) - 1;
/// Groups taken from each draw; the top 4 bits are never used.
const GROUPS_PER_DRAW: u32 = 63 / GROUP_BITS;

/// Generates fixed-length strings drawn uniformly from `[a-zA-Z]`.
///
/// Each 64-bit draw of the underlying source is split into ten 6-bit groups.
/// A group below 52 selects a letter; groups 52 to 63 are rejected, which keeps
/// every letter equally likely while needing roughly one draw per ten letters.
///
/// The generator owns its source and is meant for a single caller.
pub struct TokenGenerator<R: RngCore = StdRng> {
    rng: R,
}

impl TokenGenerator<StdRng> {
    /// Creates a generator seeded once from the current time in nanoseconds.
    pub fn from_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or_default();
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> TokenGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Returns a string of exactly `length` letters.
    pub fn generate(&mut self, length: usize) -> String {
        let mut token = String::with_capacity(length);
        if length == 0 {
            return token;
        }

        let mut cache = self.rng.next_u64();
        let mut remain = GROUPS_PER_DRAW;
        while token.len() < length {
            if remain == 0 {
                cache = self.rng.next_u64();
                remain = GROUPS_PER_DRAW;
            }
            let idx = (cache & GROUP_MASK) as usize;
            if idx < ALPHABET.len() {
                token.push(ALPHABET[idx] as char);
            }
            cache >>= GROUP_BITS;
            remain -= 1;
        }
        token
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Replays a fixed list of draws and counts how many were taken.
    struct ReplayRng {
        draws: Vec<u64>,
        taken: usize,
    }

    impl ReplayRng {
        fn new(draws: Vec<u64>) -> Self {
            Self { draws, taken: 0 }
        }
    }

    impl RngCore for ReplayRng {
        fn next_u32(&mut self) -> u32 {
            self.next_u64() as u32
        }

        fn next_u64(&mut self) -> u64 {
            let value = self.draws[self.taken % self.draws.len()];
            self.taken += 1;
            value
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            for chunk in dst.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }
    }

    /// Packs 6-bit groups into one draw, first group in the lowest bits.
    fn pack(groups: &[u64]) -> u64 {
        groups
            .iter()
            .enumerate()
            .fold(0, |acc, (i, group)| acc | (group << (6 * i)))
    }

    #[test]
    fn zero_length_is_empty_and_draws_nothing() {
        let mut generator = TokenGenerator::new(ReplayRng::new(vec![0]));
        assert_eq!(generator.generate(0), "");
        assert_eq!(generator.rng.taken, 0);
    }

    #[test]
    fn groups_map_to_alphabet_in_order() {
        let draw = pack(&[0, 1, 25, 26, 27, 51, 2, 3, 4, 5]);
        let mut generator = TokenGenerator::new(ReplayRng::new(vec![draw]));

        assert_eq!(generator.generate(10), "abzABZcdef");
        assert_eq!(generator.rng.taken, 1);
    }

    #[test]
    fn out_of_range_groups_are_rejected() {
        let draw = pack(&[52, 0, 63, 1, 60, 51, 53, 2, 62, 3]);
        let mut generator = TokenGenerator::new(ReplayRng::new(vec![draw]));

        assert_eq!(generator.generate(5), "abZcd");
        assert_eq!(generator.rng.taken, 1);
    }

    #[test]
    fn new_draw_after_ten_groups() {
        let all_rejected = u64::MAX;
        let second = pack(&[2, 3]);
        let mut generator = TokenGenerator::new(ReplayRng::new(vec![all_rejected, second]));

        assert_eq!(generator.generate(2), "cd");
        assert_eq!(generator.rng.taken, 2);
    }

    #[test]
    fn unused_high_bits_are_ignored() {
        let draw = pack(&[7; 10]) | (0b1111 << 60);
        let mut generator = TokenGenerator::new(ReplayRng::new(vec![draw, pack(&[8])]));

        assert_eq!(generator.generate(11), "hhhhhhhhhhi");
    }

    #[test]
    fn tokens_have_requested_length_and_alphabet() {
        let mut generator = TokenGenerator::new(StdRng::seed_from_u64(0x5eed));

        for length in [1usize, 2, 9, 10, 11, 63, 512, 4096] {
            let token = generator.generate(length);
            assert_eq!(token.len(), length);
            assert_eq!(token.chars().count(), length);
            assert!(token.bytes().all(|b| b.is_ascii_alphabetic()), "{}", token);
        }
    }

    #[test]
    fn letters_are_uniformly_distributed() {
        let mut generator = TokenGenerator::new(StdRng::seed_from_u64(20240917));
        let samples_per_letter = 2000usize;
        let samples = ALPHABET.len() * samples_per_letter;

        let mut counts = [0usize; 52];
        for _ in 0..samples {
            let letter = generator.generate(1).as_bytes()[0];
            let position = ALPHABET.iter().position(|b| *b == letter).unwrap();
            counts[position] += 1;
        }

        let expected = samples_per_letter as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|count| {
                let diff = *count as f64 - expected;
                diff * diff / expected
            })
            .sum();

        // 51 degrees of freedom: p = 0.001 is at 86.7, p = 0.00005 near 100.
        assert!(chi_square < 100.0, "chi-square {} for {:?}", chi_square, counts);
        assert!(counts.iter().all(|count| *count > 0));
    }

    #[test]
    fn time_seeded_generators_produce_tokens() {
        let mut generator = TokenGenerator::from_time();
        let token = generator.generate(32);
        assert_eq!(token.len(), 32);
    }
}
