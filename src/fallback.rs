//! Model-free base value: fixed day/season/location tables plus a small
//! noise term that is reproducible per input.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use xxhash_rust::xxh64::xxh64;

use crate::types::{CategoricalInput, DayOfWeek, Location, Season};

pub const NOISE_RANGE: i32 = 10;

/// Unrecognised day: 50.
pub fn day_base(day: Option<DayOfWeek>) -> i32 {
    match day {
        Some(DayOfWeek::Monday) => 65,
        Some(DayOfWeek::Tuesday) => 52,
        Some(DayOfWeek::Wednesday) => 58,
        Some(DayOfWeek::Thursday) => 55,
        Some(DayOfWeek::Friday) => 78,
        Some(DayOfWeek::Saturday) => 42,
        Some(DayOfWeek::Sunday) => 38,
        None => 50,
    }
}

pub fn season_delta(season: Option<Season>) -> i32 {
    match season {
        Some(Season::Spring) => 5,
        Some(Season::Summer) => 8,
        Some(Season::Autumn) => -3,
        Some(Season::Winter) => -8,
        None => 0,
    }
}

pub fn location_delta(location: Option<Location>) -> i32 {
    match location {
        Some(Location::East) => 12,
        Some(Location::West) => 8,
        Some(Location::North) => -5,
        Some(Location::South) => 2,
        None => 0,
    }
}

/// Stable across processes and platforms (xxh64, seed 0).
pub fn seed_for(key: &str) -> u64 {
    xxh64(key.as_bytes(), 0)
}

/// Integer in [-10, 10] drawn from a ChaCha8 stream seeded by `key`.
pub fn deterministic_noise(key: &str) -> i32 {
    let mut rng = ChaCha8Rng::seed_from_u64(seed_for(key));
    rng.gen_range(-NOISE_RANGE..=NOISE_RANGE)
}

/// Table value without the noise term. Only recognised values contribute;
/// the encoder's index-0 fallback plays no part here.
pub fn table_base(input: &CategoricalInput) -> i32 {
    day_base(input.known_day) + season_delta(input.known_season) + location_delta(input.known_location)
}

pub fn fallback(input: &CategoricalInput) -> f64 {
    (table_base(input) + deterministic_noise(&input.seed_key)) as f64
}
