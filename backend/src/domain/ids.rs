use std::collections::HashSet;
use uuid::Uuid;

pub const SHORT_ID_LENGTH: usize = 8;

/// Eight lowercase hex characters taken from a random UUID
pub fn new_short_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(SHORT_ID_LENGTH);
    id
}

/// A short id that does not collide with any of `existing`
pub fn unique_short_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = existing.into_iter().collect();
    loop {
        let id = new_short_id();
        if !taken.contains(id.as_str()) {
            return id;
        }
    }
}
