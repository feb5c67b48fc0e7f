//! Record identifiers.
//!
//! Ids are `{unix-millis}-{9 base36 chars}`. There is no global uniqueness
//! guarantee; collisions within one user's session are negligible.

use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Generate an id for a record created at `now`.
pub fn generate_id(now: DateTime<Utc>) -> String {
    generate_id_with(now, &mut rand::rng())
}

/// Generate an id using a caller-provided RNG.
pub fn generate_id_with<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
        .collect();
    format!("{}-{suffix}", now.timestamp_millis())
}
