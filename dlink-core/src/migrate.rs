//! One-shot v2 → v3 entry conversion
//!
//! Legacy v2 records keep identifier key, qualifier path, and a flat list
//! of responses. Conversion builds the v3 anchor, projects each active
//! response into a [`LinkV3`], and carries the default-linktype flag onto
//! the entry.

use crate::model::{Entry, LinkV3};
use crate::path::parse_qualifier_path;
use serde::{Deserialize, Serialize};

/// Legacy v2 record as submitted to the migration endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Entry {
    pub identification_key_type: String,
    pub identification_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifier_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub responses: Vec<V2Response>,
}

/// One legacy response row inside a [`V2Entry`]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Response {
    pub link_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iana_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_title: Option<String>,
    pub target_url: String,
    #[serde(default)]
    pub default_link_type: bool,
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

/// Convert legacy v2 entries into v3 [`Entry`] records. No persistence
/// happens here; callers decide what to do with the result.
pub fn migrate_v2(entries: &[V2Entry]) -> Vec<Entry> {
    entries
        .iter()
        .filter(|e| e.active)
        .filter_map(convert_entry)
        .collect()
}

fn convert_entry(v2: &V2Entry) -> Option<Entry> {
    let qualifier_path = v2.qualifier_path.as_deref().unwrap_or("");
    let anchor = format!(
        "/{}/{}{}",
        v2.identification_key_type, v2.identification_key, qualifier_path
    );

    let qualifiers = parse_qualifier_path(qualifier_path);

    let mut default_linktype = None;
    let mut links = Vec::new();
    for response in v2.responses.iter().filter(|r| r.active) {
        let linktype = prefix_linktype(&response.link_type);
        if response.default_link_type && default_linktype.is_none() {
            default_linktype = Some(linktype.clone());
        }
        links.push(LinkV3 {
            linktype,
            href: response.target_url.clone(),
            title: response.link_title.clone().unwrap_or_default(),
            media_type: response.mime_type.clone(),
            hreflang: response.iana_language.clone().map(|lang| vec![lang]),
            context: response.context.clone().map(|c| vec![c]),
        });
    }

    if links.is_empty() {
        return None;
    }

    Some(Entry {
        anchor,
        item_description: v2.item_description.clone(),
        default_linktype,
        qualifiers: if qualifiers.is_empty() {
            None
        } else {
            Some(qualifiers)
        },
        links,
    })
}

/// v2 linktypes are bare terms; give them the `gs1:` prefix unless already
/// prefixed or absolute.
fn prefix_linktype(linktype: &str) -> String {
    if linktype.starts_with("gs1:") || linktype.starts_with("http") {
        linktype.to_string()
    } else {
        format!("gs1:{}", linktype)
    }
}
