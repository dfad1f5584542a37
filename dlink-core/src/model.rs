//! Documented wire and storage shapes
//!
//! Every shape here has an explicit serde derive; dynamic JSON is confined
//! to `linkTypes` values and qualifier maps as the storage contract allows.

use indexmap::IndexMap;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Flat storage key derived from an anchor
///
/// `/01/123/21/X` maps to `01_123_21_X`. The mapping is total and bijective
/// over paths with no internal empty segments; construction normally goes
/// through [`crate::path::path_to_id`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Wrap an already-flat id (underscore-separated segments)
    pub fn new(id: impl Into<String>) -> Self {
        DocumentId(id.into())
    }

    /// The raw flat form used as the store partition key
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the raw flat form
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single-key `{ai: value}` mapping refining an anchor
///
/// Serialized as a one-entry JSON object. The value may be a literal or a
/// template pattern `{name}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Qualifier {
    /// Application Identifier, e.g. `10` or `21`
    pub ai: String,
    /// Literal value or `{name}` template pattern
    pub value: String,
}

impl Qualifier {
    pub fn new(ai: impl Into<String>, value: impl Into<String>) -> Self {
        Qualifier {
            ai: ai.into(),
            value: value.into(),
        }
    }

    /// Template name if the value is a `{name}` pattern
    pub fn template_name(&self) -> Option<&str> {
        self.value
            .strip_prefix('{')
            .and_then(|rest| rest.strip_suffix('}'))
    }
}

impl Serialize for Qualifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.ai, &self.value)?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for Qualifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct QualifierVisitor;

        impl<'de> Visitor<'de> for QualifierVisitor {
            type Value = Qualifier;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a single-key {ai: value} object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Qualifier, A::Error> {
                let (ai, value): (String, String) = map
                    .next_entry()?
                    .ok_or_else(|| serde::de::Error::custom("qualifier object is empty"))?;
                if map.next_entry::<String, String>()?.is_some() {
                    return Err(serde::de::Error::custom(
                        "qualifier object must have exactly one key",
                    ));
                }
                Ok(Qualifier { ai, value })
            }
        }

        deserializer.deserialize_map(QualifierVisitor)
    }
}

/// Immutable record submitted by Data-Entry clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Identifying path `/ai/value[/ai/value]*`
    pub anchor: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
    /// IRI or `gs1:` prefixed term selecting the default redirect linktype
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_linktype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qualifiers: Option<Vec<Qualifier>>,
    pub links: Vec<LinkV3>,
}

/// A typed link inside a submitted [`Entry`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkV3 {
    /// Link-type term: full IRI, `gs1:` CURIE, or bare vocabulary term
    pub linktype: String,
    pub href: String,
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hreflang: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<String>>,
}

/// Stored document, keyed by [`DocumentId`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverDocument {
    /// Flat anchor form; also the store partition key
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_linktype: Option<String>,
    pub data: Vec<DataItem>,
}

/// One qualifier-set's worth of links inside a stored document
///
/// The merge engine maintains at most one `DataItem` per distinct
/// qualifier multiset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataItem {
    #[serde(default)]
    pub qualifiers: Vec<Qualifier>,
    pub linkset: LinksetSection,
}

/// The linkset payload of a [`DataItem`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinksetSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
    /// Fully expanded link-type IRI → ordered entries; insertion order is
    /// significant (`defaultLink` first, `defaultLinkMulti` second)
    pub link_types: IndexMap<String, Vec<LinksetEntry>>,
}

/// A stored link under a link-type key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinksetEntry {
    pub href: String,
    pub title: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hreflang: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<String>,
}

impl From<&LinkV3> for LinksetEntry {
    fn from(link: &LinkV3) -> Self {
        LinksetEntry {
            href: link.href.clone(),
            title: link.title.clone(),
            media_type: link.media_type.clone(),
            hreflang: link.hreflang.clone().unwrap_or_default(),
            context: link.context.clone().unwrap_or_default(),
        }
    }
}
