//! Linkset formatter and `Link` header generation
//!
//! Serializes a matched document into its JSON-LD linkset form and builds
//! the `Link` header advertised on every resolver response.

use crate::model::{DataItem, LinksetEntry};
use dlink_vocab::{namespaces, voc};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

/// Build the `Link` header value for an identifier.
///
/// Carries the linkset self-link plus the mandatory JSON-LD context link.
/// Non-Latin-1 characters are escaped as `\uXXXX` so the value stays a
/// legal header.
pub fn link_header(fqdn: &str, identifier: &str) -> String {
    let value = format!(
        "<https://{fqdn}{identifier}?linkType=linkset>; rel=\"application/linkset\"; \
         type=\"application/linkset+json\"; title=\"Linkset for {identifier}\", \
         <{context}>; rel=\"{rel}\"; type=\"application/ld+json\"",
        context = namespaces::CONTEXT_DOCUMENT,
        rel = namespaces::JSON_LD_CONTEXT_REL,
    );
    escape_non_latin1(&value)
}

/// Serialize the filtered items into the JSON-LD linkset body.
pub fn format_linkset(fqdn: &str, identifier: &str, items: &[DataItem]) -> Value {
    let anchor = format!("https://{fqdn}{identifier}");
    let (ai, value) = first_segment_pair(identifier).unwrap_or(("", ""));

    let mut context = Map::new();
    context.insert("gs1".to_string(), json!(voc::BASE));
    context.insert("schema".to_string(), json!(namespaces::SCHEMA));
    context.insert("linkset".to_string(), json!(namespaces::LINKSET));
    if ai == dlink_vocab::ai::GTIN {
        context.insert(
            "gtin".to_string(),
            json!({"@id": "gs1:gtin", "@type": "@id"}),
        );
    }

    let mut body = Map::new();
    body.insert("@context".to_string(), Value::Object(context));
    body.insert("@id".to_string(), json!(anchor));
    body.insert("@type".to_string(), json!(voc::DIGITAL_LINK));
    body.insert("gs1:elementStrings".to_string(), json!([identifier]));
    if ai == dlink_vocab::ai::GTIN {
        body.insert("gtin".to_string(), json!(value));
    }

    // Aggregate linkTypes across the filtered items, first-seen key order
    let mut aggregated: IndexMap<&str, Vec<&LinksetEntry>> = IndexMap::new();
    for item in items {
        for (key, entries) in &item.linkset.link_types {
            aggregated.entry(key.as_str()).or_default().extend(entries);
        }
    }

    let mut linkset_object = Map::new();
    linkset_object.insert("anchor".to_string(), json!(anchor));
    for (key, entries) in aggregated {
        let formatted: Vec<Value> = entries
            .iter()
            .map(|e| format_entry(fqdn, e))
            .collect();
        linkset_object.insert(key.to_string(), Value::Array(formatted));
    }
    body.insert(
        "linkset".to_string(),
        Value::Array(vec![Value::Object(linkset_object)]),
    );

    Value::Object(body)
}

/// Body of a 300 Multiple Choices response.
pub fn multiple_choices_body(entries: &[LinksetEntry]) -> Value {
    let list: Vec<Value> = entries
        .iter()
        .map(|e| {
            let mut obj = Map::new();
            obj.insert("href".to_string(), json!(e.href));
            if let Some(t) = &e.media_type {
                obj.insert("type".to_string(), json!(t));
            }
            if !e.hreflang.is_empty() {
                obj.insert("hreflang".to_string(), json!(e.hreflang));
            }
            obj.insert("title".to_string(), json!(e.title));
            Value::Object(obj)
        })
        .collect();
    json!({ "linkset": list })
}

/// Format one linkset entry, normalizing the href and dropping empty fields.
fn format_entry(fqdn: &str, entry: &LinksetEntry) -> Value {
    let href = if entry.href.contains("://") {
        entry.href.clone()
    } else {
        format!("https://{}/{}", fqdn, entry.href.trim_start_matches('/'))
    };

    let mut obj = Map::new();
    obj.insert("href".to_string(), json!(href));
    if !entry.title.is_empty() {
        obj.insert("title".to_string(), json!(entry.title));
    }
    if let Some(t) = &entry.media_type {
        obj.insert("type".to_string(), json!(t));
    }
    let hreflang: Vec<&String> = entry.hreflang.iter().filter(|l| *l != "und").collect();
    if !hreflang.is_empty() {
        obj.insert("hreflang".to_string(), json!(hreflang));
    }
    if !entry.context.is_empty() {
        obj.insert("context".to_string(), json!(entry.context));
    }
    Value::Object(obj)
}

/// First `(ai, value)` pair of an identifier path.
pub fn first_segment_pair(identifier: &str) -> Option<(&str, &str)> {
    let mut segments = identifier.split('/').filter(|s| !s.is_empty());
    Some((segments.next()?, segments.next()?))
}

/// Escape characters outside Latin-1 as `\uXXXX` escape sequences.
fn escape_non_latin1(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if (ch as u32) <= 0xFF {
            escaped.push(ch);
        } else {
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                escaped.push_str(&format!("\\u{:04X}", unit));
            }
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LinksetSection;

    fn items_with(key: &str, entries: Vec<LinksetEntry>) -> Vec<DataItem> {
        let mut link_types = IndexMap::new();
        link_types.insert(key.to_string(), entries);
        vec![DataItem {
            qualifiers: vec![],
            linkset: LinksetSection {
                item_description: None,
                link_types,
            },
        }]
    }

    fn entry(href: &str) -> LinksetEntry {
        LinksetEntry {
            href: href.to_string(),
            title: "Product info".to_string(),
            media_type: None,
            hreflang: vec![],
            context: vec![],
        }
    }

    #[test]
    fn link_header_shape() {
        let header = link_header("id.example.org", "/01/09506000134376");
        assert!(header.starts_with(
            "<https://id.example.org/01/09506000134376?linkType=linkset>; rel=\"application/linkset\""
        ));
        assert!(header.contains("type=\"application/linkset+json\""));
        assert!(header.contains("title=\"Linkset for /01/09506000134376\""));
        assert!(header.contains(namespaces::JSON_LD_CONTEXT_REL));
    }

    #[test]
    fn link_header_escapes_non_latin1() {
        let header = link_header("id.example.org", "/01/1/21/\u{4e2d}");
        assert!(!header.contains('\u{4e2d}'));
        assert!(header.contains("\\u4E2D"));
    }

    #[test]
    fn gtin_identifier_gets_context_and_field() {
        let items = items_with(voc::PIP, vec![entry("https://a.example/pip")]);
        let body = format_linkset("id.example.org", "/01/09506000134376", &items);
        assert_eq!(body["gtin"], json!("09506000134376"));
        assert_eq!(body["@context"]["gtin"]["@id"], json!("gs1:gtin"));
        assert_eq!(body["@type"], json!("gs1:DigitalLink"));
        assert_eq!(
            body["gs1:elementStrings"],
            json!(["/01/09506000134376"])
        );
    }

    #[test]
    fn non_gtin_identifier_omits_gtin() {
        let items = items_with(voc::PIP, vec![entry("https://a.example/pip")]);
        let body = format_linkset("id.example.org", "/8004/0950600013430", &items);
        assert!(body.get("gtin").is_none());
        assert!(body["@context"].get("gtin").is_none());
    }

    #[test]
    fn relative_hrefs_are_absolutized() {
        let items = items_with(
            voc::PIP,
            vec![entry("/local/page"), entry("bare/page"), entry("https://a.example/x")],
        );
        let body = format_linkset("id.example.org", "/01/09506000134376", &items);
        let links = &body["linkset"][0][voc::PIP];
        assert_eq!(links[0]["href"], json!("https://id.example.org/local/page"));
        assert_eq!(links[1]["href"], json!("https://id.example.org/bare/page"));
        assert_eq!(links[2]["href"], json!("https://a.example/x"));
    }

    #[test]
    fn und_hreflang_is_filtered() {
        let mut e = entry("https://a.example/x");
        e.hreflang = vec!["und".to_string(), "en".to_string()];
        let items = items_with(voc::PIP, vec![e]);
        let body = format_linkset("id.example.org", "/01/09506000134376", &items);
        assert_eq!(body["linkset"][0][voc::PIP][0]["hreflang"], json!(["en"]));
    }

    #[test]
    fn multiple_choices_shape() {
        let mut e1 = entry("https://a.example/1");
        e1.hreflang = vec!["en".to_string()];
        let e2 = entry("https://a.example/2");
        let body = multiple_choices_body(&[e1, e2]);
        let list = body["linkset"].as_array().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0]["href"], json!("https://a.example/1"));
        assert_eq!(list[0]["hreflang"], json!(["en"]));
        assert!(list[1].get("hreflang").is_none());
    }
}
