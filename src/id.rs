//! Record identifiers and timestamps.

use chrono::{DateTime, Duration, Utc};
use ulid::Ulid;

/// Generate an id that is not in `taken`.
///
/// Ids are lowercase ULIDs; retrying on the (practically impossible) clash
/// keeps ids unique within a collection.
pub fn generate_id<'a, I>(taken: I) -> String
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    loop {
        let candidate = Ulid::new().to_string().to_ascii_lowercase();
        if !taken.clone().into_iter().any(|id| id == candidate) {
            return candidate;
        }
    }
}

/// Timestamp for a record modification that must sort after `previous`.
pub fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}
