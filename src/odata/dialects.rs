//! Dialect normalizer implementations
//!
//! Each normalizer handles one response shape of the upstream list API.

use super::types::{Page, PageNormalizer};
use crate::types::{Cursor, Dialect, Entity, JsonValue};
use serde_json::Map;
use tracing::warn;

/// Cursor key of the `odata=verbose` shape, nested under `d`
pub const VERBOSE_NEXT_KEY: &str = "__next";
/// Cursor key used by OData v3 minimal metadata
pub const NEXT_LINK_KEY: &str = "odata.nextLink";
/// Cursor key used by OData v4
pub const ODATA_NEXT_LINK_KEY: &str = "@odata.nextLink";

/// Build the normalizer for a configured dialect
pub fn normalizer_for(dialect: Dialect) -> Box<dyn PageNormalizer> {
    match dialect {
        Dialect::Auto => Box::new(AutoDetect),
        Dialect::Verbose => Box::new(VerboseDialect),
        Dialect::NextLink => Box::new(ValueDialect::new(NEXT_LINK_KEY)),
        Dialect::OdataNextLink => Box::new(ValueDialect::new(ODATA_NEXT_LINK_KEY)),
    }
}

// ============================================================================
// Shape A: `d` / `d.results`
// ============================================================================

/// Verbose shape: `{"d": {"results": [...], "__next": "..."}}` or `{"d": {...}}`
#[derive(Debug, Clone, Copy, Default)]
pub struct VerboseDialect;

impl VerboseDialect {
    fn normalize_object(mut body: Map<String, JsonValue>) -> Page {
        match body.remove("d") {
            Some(d) => verbose_page(d),
            None => Page::empty(),
        }
    }
}

impl PageNormalizer for VerboseDialect {
    fn normalize(&self, body: JsonValue) -> Page {
        match body {
            JsonValue::Object(map) => Self::normalize_object(map),
            _ => Page::empty(),
        }
    }
}

fn verbose_page(d: JsonValue) -> Page {
    match d {
        JsonValue::Object(mut d) => {
            if matches!(d.get("results"), Some(JsonValue::Array(_))) {
                let next = take_cursor(&mut d, VERBOSE_NEXT_KEY);
                let results = match d.remove("results") {
                    Some(JsonValue::Array(items)) => items,
                    _ => Vec::new(),
                };
                Page::new(into_entities(results), next)
            } else {
                // A single-entity response
                Page::new(vec![d], None)
            }
        }
        JsonValue::Array(items) => Page::new(into_entities(items), None),
        _ => Page::empty(),
    }
}

// ============================================================================
// Shapes B and C: `value`
// ============================================================================

/// Value shape: `{"value": [...], "<cursor_key>": "..."}`
#[derive(Debug, Clone, Copy)]
pub struct ValueDialect {
    cursor_key: &'static str,
}

impl ValueDialect {
    /// Create a value-shape normalizer reading the cursor from `cursor_key`
    pub fn new(cursor_key: &'static str) -> Self {
        Self { cursor_key }
    }
}

impl PageNormalizer for ValueDialect {
    fn normalize(&self, body: JsonValue) -> Page {
        match body {
            JsonValue::Object(mut map) => {
                let next = take_cursor(&mut map, self.cursor_key);
                value_page(&mut map, next)
            }
            _ => Page::empty(),
        }
    }
}

fn value_page(map: &mut Map<String, JsonValue>, next: Option<Cursor>) -> Page {
    match map.remove("value") {
        Some(JsonValue::Array(items)) => Page::new(into_entities(items), next),
        _ => Page::empty(),
    }
}

// ============================================================================
// Auto-detection
// ============================================================================

/// Detects the shape of every response
///
/// Precedence is fixed: `d` wins over `value`, and under `value` the
/// `odata.nextLink` cursor wins over `@odata.nextLink`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDetect;

impl PageNormalizer for AutoDetect {
    fn normalize(&self, body: JsonValue) -> Page {
        let JsonValue::Object(mut map) = body else {
            return Page::empty();
        };

        if map.contains_key("d") {
            return VerboseDialect::normalize_object(map);
        }

        if map.contains_key("value") {
            let next = take_cursor(&mut map, NEXT_LINK_KEY)
                .or_else(|| take_cursor(&mut map, ODATA_NEXT_LINK_KEY));
            return value_page(&mut map, next);
        }

        Page::empty()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn take_cursor(map: &mut Map<String, JsonValue>, key: &str) -> Option<Cursor> {
    match map.remove(key) {
        Some(JsonValue::String(raw)) => Cursor::new(raw),
        _ => None,
    }
}

fn into_entities(items: Vec<JsonValue>) -> Vec<Entity> {
    items
        .into_iter()
        .filter_map(|item| match item {
            JsonValue::Object(entity) => Some(entity),
            other => {
                warn!("Skipping non-object list item: {other}");
                None
            }
        })
        .collect()
}
