//! Template-variable substitution
//!
//! Stored values may carry literal `{name}` tokens bound from matched
//! request data. Substitution walks every string field of the filtered
//! items and replaces each bound token textually. Literal `{` in payloads
//! collides with tokens; callers should escape braces in literal content.

use crate::model::DataItem;
use serde_json::Value;
use std::collections::HashMap;

/// Bindings collected during qualifier matching, `name → value`
pub type Bindings = HashMap<String, String>;

/// Substitute every bound `{name}` token across the items' string fields.
///
/// Substitution failures are non-fatal: on a round-trip error the item is
/// kept unsubstituted and a warning is logged.
pub fn substitute_variables(items: Vec<DataItem>, bindings: &Bindings) -> Vec<DataItem> {
    if bindings.is_empty() {
        return items;
    }

    items
        .into_iter()
        .map(|item| match substitute_item(&item, bindings) {
            Ok(substituted) => substituted,
            Err(e) => {
                tracing::warn!(error = %e, "template substitution failed; keeping item unsubstituted");
                item
            }
        })
        .collect()
}

fn substitute_item(item: &DataItem, bindings: &Bindings) -> serde_json::Result<DataItem> {
    let mut value = serde_json::to_value(item)?;
    substitute_value(&mut value, bindings);
    serde_json::from_value(value)
}

fn substitute_value(value: &mut Value, bindings: &Bindings) {
    match value {
        Value::String(s) => {
            for (name, bound) in bindings {
                let token = format!("{{{}}}", name);
                if s.contains(&token) {
                    *s = s.replace(&token, bound);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                substitute_value(item, bindings);
            }
        }
        Value::Object(map) => {
            for (_, v) in map.iter_mut() {
                substitute_value(v, bindings);
            }
        }
        _ => {}
    }
}

/// Whether the serialized form of the items contains a literal token.
///
/// The serialized-identifier partial match inspects stored data as text for
/// `{0}` / `{1}` before binding the stripped suffix.
pub fn data_contains_token(items: &[DataItem], token: &str) -> bool {
    serde_json::to_string(items)
        .map(|text| text.contains(token))
        .unwrap_or(false)
}
