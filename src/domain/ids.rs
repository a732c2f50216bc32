use chrono::{DateTime, Utc};

/// Millisecond timestamp id, bumped forward until it is not taken.
pub fn fresh_id(now: DateTime<Utc>, is_taken: impl Fn(&str) -> bool) -> String {
    let mut candidate = now.timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !is_taken(&id) {
            return id;
        }
        candidate += 1;
    }
}
