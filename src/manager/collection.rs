//! Folds applied to a manager's collection once the backend has confirmed a call.

use std::collections::HashSet;

use serde_json::Value;

use crate::resource::Resource;

/// Replace everything with a fresh listing. A duplicated id keeps its first occurrence.
pub(crate) fn replace_all<T: Resource>(items: &mut Vec<T>, fresh: Vec<T>) {
    let mut seen = HashSet::new();
    *items = fresh
        .into_iter()
        .filter(|r| seen.insert(r.id().to_string()))
        .collect();
}

/// Put a created resource at the front, dropping any stale entry with the same id.
pub(crate) fn prepend<T: Resource>(items: &mut Vec<T>, created: T) {
    items.retain(|r| r.id() != created.id());
    items.insert(0, created);
}

/// Swap in `updated` at its current position. Returns false if the id is not held.
pub(crate) fn replace<T: Resource>(items: &mut [T], updated: T) -> bool {
    match items.iter_mut().find(|r| r.id() == updated.id()) {
        Some(slot) => {
            *slot = updated;
            true
        }
        None => false,
    }
}

pub(crate) fn remove<T: Resource>(items: &mut Vec<T>, id: &str) -> bool {
    let before = items.len();
    items.retain(|r| r.id() != id);
    items.len() != before
}

/// Shallow merge: every top-level field in `returned` overwrites the existing
/// one, fields it omits keep their old value.
pub(crate) fn merge_fields<T: Resource>(
    existing: &T,
    returned: Value,
) -> Result<T, serde_json::Error> {
    let mut base = serde_json::to_value(existing)?;
    match (&mut base, returned) {
        (Value::Object(fields), Value::Object(patch)) => {
            for (key, value) in patch {
                fields.insert(key, value);
            }
            serde_json::from_value(base)
        }
        (_, other) => serde_json::from_value(other),
    }
}
