//! "Updated" field extraction
//!
//! Looks up a dot-delimited path inside an entity and exposes the value
//! under the top-level `_updated` key.

use crate::types::{Entity, JsonValue, UPDATED_KEY};

/// Look up a dot-delimited path inside a JSON value
///
/// Object keys are matched exactly; a numeric segment indexes into an array.
/// Any missing segment yields `None`.
pub fn lookup_path<'a>(value: &'a JsonValue, path: &str) -> Option<&'a JsonValue> {
    let segments: Vec<&str> = path.split('.').collect();
    lookup_segments(value, &segments)
}

fn lookup_segments<'a>(value: &'a JsonValue, segments: &[&str]) -> Option<&'a JsonValue> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value);
    };

    let child = match value {
        JsonValue::Object(map) => map.get(*head),
        JsonValue::Array(items) => head.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }?;

    lookup_segments(child, rest)
}

/// Look up a dot-delimited path inside an entity
pub fn lookup_entity_path<'a>(entity: &'a Entity, path: &str) -> Option<&'a JsonValue> {
    let segments: Vec<&str> = path.split('.').collect();
    let (head, rest) = segments.split_first()?;
    lookup_segments(entity.get(*head)?, rest)
}

/// Set `_updated` from `since_path`, or pass the entity through when unset
pub fn annotate_updated(mut entity: Entity, since_path: Option<&str>) -> Entity {
    if let Some(path) = since_path {
        let updated = lookup_entity_path(&entity, path)
            .cloned()
            .unwrap_or(JsonValue::Null);
        entity.insert(UPDATED_KEY.to_string(), updated);
    }
    entity
}
