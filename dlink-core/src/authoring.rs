//! Authoring engine: submitted entries → storage documents
//!
//! Converts client [`Entry`] records into [`ResolverDocument`]s ready for
//! upsert. Link-type keys are expanded to full IRIs, links grouped by key,
//! and the default-link keys pulled to the front of the map.

use crate::error::{CoreError, Result};
use crate::model::{DataItem, Entry, LinksetEntry, LinksetSection, ResolverDocument};
use crate::path::path_to_id;
use dlink_vocab::voc;
use indexmap::IndexMap;

/// Convert a single entry into a one-item document.
///
/// Fails with a validation error when the anchor is empty or the entry has
/// no links.
pub fn author_entry(entry: &Entry) -> Result<ResolverDocument> {
    let id = path_to_id(&entry.anchor)
        .map_err(|_| CoreError::validation("entry has an empty anchor"))?;

    if entry.links.is_empty() {
        return Err(CoreError::validation(format!(
            "entry {} has no links",
            entry.anchor
        )));
    }

    // Group links by expanded key, first-seen order; within a key the
    // first link per href wins so stored href values stay unique
    let mut grouped: IndexMap<String, Vec<LinksetEntry>> = IndexMap::new();
    for link in &entry.links {
        let key = dlink_vocab::expand_linktype(&link.linktype);
        let slot = grouped.entry(key).or_default();
        if !slot.iter().any(|e| e.href == link.href) {
            slot.push(LinksetEntry::from(link));
        }
    }

    let link_types = order_link_types(grouped);

    let item = DataItem {
        qualifiers: entry.qualifiers.clone().unwrap_or_default(),
        linkset: LinksetSection {
            item_description: entry.item_description.clone(),
            link_types,
        },
    };

    Ok(ResolverDocument {
        id,
        default_linktype: entry.default_linktype.clone(),
        data: vec![item],
    })
}

/// Convert an ordered sequence of entries into upsert-ready documents.
///
/// Entries sharing an anchor collapse into one document: their `data`
/// arrays concatenate in submission order and the first non-null
/// `defaultLinktype` wins.
pub fn author_documents(entries: &[Entry]) -> Result<Vec<ResolverDocument>> {
    let mut docs = Vec::with_capacity(entries.len());
    for entry in entries {
        docs.push(author_entry(entry)?);
    }
    Ok(group_documents(docs))
}

/// Collapse documents sharing an id, preserving first-seen id order.
pub fn group_documents(docs: Vec<ResolverDocument>) -> Vec<ResolverDocument> {
    let mut grouped: IndexMap<String, ResolverDocument> = IndexMap::new();
    for doc in docs {
        match grouped.get_mut(doc.id.as_str()) {
            Some(existing) => {
                existing.data.extend(doc.data);
                if existing.default_linktype.is_none() {
                    existing.default_linktype = doc.default_linktype;
                }
            }
            None => {
                grouped.insert(doc.id.as_str().to_string(), doc);
            }
        }
    }
    grouped.into_values().collect()
}

/// Re-order link-type keys: `defaultLink` first (truncated to its first
/// entry), `defaultLinkMulti` second (all entries), remaining keys in their
/// first-seen order.
fn order_link_types(
    mut grouped: IndexMap<String, Vec<LinksetEntry>>,
) -> IndexMap<String, Vec<LinksetEntry>> {
    let mut ordered = IndexMap::with_capacity(grouped.len());

    if let Some(mut entries) = grouped.shift_remove(voc::DEFAULT_LINK) {
        entries.truncate(1);
        ordered.insert(voc::DEFAULT_LINK.to_string(), entries);
    }
    if let Some(entries) = grouped.shift_remove(voc::DEFAULT_LINK_MULTI) {
        ordered.insert(voc::DEFAULT_LINK_MULTI.to_string(), entries);
    }
    ordered.extend(grouped);
    ordered
}
