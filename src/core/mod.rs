use rand::distr::{Alphanumeric, SampleString};

pub mod item;

pub mod step;

/// Generates a random name consisting of alphanumeric characters.
///
/// Used for steps and jobs that were not given an explicit name.
fn build_name() -> String {
    Alphanumeric.sample_string(&mut rand::rng(), 8)
}
