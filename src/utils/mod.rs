//! Identifier and timestamp helpers shared by the modules.

use anyhow::Context;
use rand::Rng;
use time::{macros::format_description, OffsetDateTime};

/// Length of generated record identifiers
pub const ID_LENGTH: usize = 16;

const ID_ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789_-";

/// Random URL-safe identifier of [`ID_LENGTH`] characters.
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LENGTH)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}

/// Current UTC time as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
pub fn now_iso8601() -> anyhow::Result<String> {
    format_timestamp(OffsetDateTime::now_utc())
}

pub fn format_timestamp(at: OffsetDateTime) -> anyhow::Result<String> {
    at.format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
    .with_context(|| "failed to format timestamp")
}
