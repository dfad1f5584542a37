//! Request-qualifier matching for the resolver pipeline
//!
//! A stored data item matches a request when every one of the item's
//! qualifiers is satisfied by a request qualifier with the same AI: either
//! literally, or by binding a `{name}` template pattern to the requested
//! value. Request-only qualifiers are ignored.

use crate::model::Qualifier;
use crate::template::Bindings;

/// Match a candidate document qualifier map against the request qualifiers.
///
/// Returns the template bindings collected along the way, or `None` when
/// any document qualifier goes unsatisfied.
pub fn match_qualifiers(request: &[Qualifier], document: &[Qualifier]) -> Option<Bindings> {
    let mut bindings = Bindings::new();

    for doc_q in document {
        let requested = request.iter().find(|r| r.ai == doc_q.ai)?;
        match doc_q.template_name() {
            Some(name) => {
                bindings.insert(name.to_string(), requested.value.clone());
            }
            None => {
                if doc_q.value != requested.value {
                    return None;
                }
            }
        }
    }

    Some(bindings)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(ai: &str, value: &str) -> Qualifier {
        Qualifier::new(ai, value)
    }

    #[test]
    fn literal_match() {
        let bindings = match_qualifiers(&[q("10", "LOT01")], &[q("10", "LOT01")]).unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn literal_mismatch() {
        assert!(match_qualifiers(&[q("10", "LOT02")], &[q("10", "LOT01")]).is_none());
    }

    #[test]
    fn template_binds_requested_value() {
        let bindings = match_qualifiers(&[q("10", "LOT01")], &[q("10", "{lot}")]).unwrap();
        assert_eq!(bindings.get("lot").map(String::as_str), Some("LOT01"));
    }

    #[test]
    fn missing_request_key_fails() {
        assert!(match_qualifiers(&[q("21", "S1")], &[q("10", "{lot}")]).is_none());
    }

    #[test]
    fn request_only_keys_are_allowed() {
        let bindings =
            match_qualifiers(&[q("10", "LOT01"), q("21", "S1")], &[q("10", "LOT01")]).unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn empty_document_qualifiers_always_match() {
        let bindings = match_qualifiers(&[q("10", "LOT01")], &[]).unwrap();
        assert!(bindings.is_empty());
    }

    #[test]
    fn multiple_templates_bind_independently() {
        let bindings = match_qualifiers(
            &[q("10", "LOT01"), q("21", "SER9")],
            &[q("10", "{lot}"), q("21", "{serial}")],
        )
        .unwrap();
        assert_eq!(bindings.get("lot").map(String::as_str), Some("LOT01"));
        assert_eq!(bindings.get("serial").map(String::as_str), Some("SER9"));
    }
}
