//! Merge engine for qualifier-aware upserts
//!
//! A newly-authored document merges into whatever already exists under the
//! same id. Data items pair up by qualifier-multiset equality; within a
//! matched item, linkset entries merge by href so repeated submissions stay
//! idempotent.

use crate::model::{DataItem, Qualifier, ResolverDocument};
use std::collections::HashMap;

/// Result of merging a new document against the stored state
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    /// The document to write back
    pub document: ResolverDocument,
    /// True when no prior document existed under the id
    pub created: bool,
}

/// Merge a newly-authored document `new_doc` into `existing`.
///
/// Each incoming item either merges into the base item with an equal
/// qualifier multiset or is appended, preserving the one-item-per-
/// qualifier-multiset invariant. First creation merges into an empty
/// document, so a batch carrying repeated qualifier sets collapses the
/// same way an update would.
pub fn merge_documents(
    new_doc: ResolverDocument,
    existing: Option<ResolverDocument>,
) -> MergeOutcome {
    let created = existing.is_none();
    let mut base = existing.unwrap_or_else(|| ResolverDocument {
        id: new_doc.id.clone(),
        default_linktype: None,
        data: Vec::new(),
    });

    for new_item in new_doc.data {
        match base
            .data
            .iter_mut()
            .find(|item| qualifiers_equal(&item.qualifiers, &new_item.qualifiers))
        {
            Some(matched) => merge_into(matched, new_item),
            None => base.data.push(new_item),
        }
    }

    base.default_linktype = new_doc.default_linktype.or(base.default_linktype);

    MergeOutcome {
        document: base,
        created,
    }
}

/// Merge one incoming item into its qualifier-matched counterpart.
fn merge_into(target: &mut DataItem, incoming: DataItem) {
    if incoming.linkset.item_description.is_some() {
        target.linkset.item_description = incoming.linkset.item_description;
    }

    for (key, entries) in incoming.linkset.link_types {
        let slot = target.linkset.link_types.entry(key).or_default();
        for entry in entries {
            if !slot.iter().any(|e| e.href == entry.href) {
                slot.push(entry);
            }
        }
    }
}

/// Qualifier lists match as multisets of single-key mappings: same length,
/// every entry pairable bijectively with an equal entry on the other side.
/// Order is irrelevant; multiplicities matter.
pub fn qualifiers_equal(a: &[Qualifier], b: &[Qualifier]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut counts: HashMap<&Qualifier, i32> = HashMap::new();
    for q in a {
        *counts.entry(q).or_insert(0) += 1;
    }
    for q in b {
        match counts.get_mut(q) {
            Some(n) => *n -= 1,
            None => return false,
        }
    }
    counts.values().all(|&n| n == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DocumentId, LinksetEntry, LinksetSection};
    use indexmap::IndexMap;

    fn entry(href: &str) -> LinksetEntry {
        LinksetEntry {
            href: href.to_string(),
            title: "t".to_string(),
            media_type: None,
            hreflang: vec![],
            context: vec![],
        }
    }

    fn item(qualifiers: Vec<Qualifier>, key: &str, hrefs: &[&str]) -> DataItem {
        let mut link_types = IndexMap::new();
        link_types.insert(key.to_string(), hrefs.iter().map(|h| entry(h)).collect());
        DataItem {
            qualifiers,
            linkset: LinksetSection {
                item_description: None,
                link_types,
            },
        }
    }

    fn doc(id: &str, data: Vec<DataItem>) -> ResolverDocument {
        ResolverDocument {
            id: DocumentId::new(id),
            default_linktype: None,
            data,
        }
    }

    #[test]
    fn first_upsert_creates() {
        let new = doc("01_1", vec![item(vec![], "k", &["https://a.example/"])]);
        let out = merge_documents(new.clone(), None);
        assert!(out.created);
        assert_eq!(out.document, new);
    }

    #[test]
    fn first_upsert_collapses_repeated_qualifier_sets() {
        // One authored document can carry two items with the same
        // qualifier multiset (same anchor submitted twice in a batch);
        // creation must still leave one item with unique hrefs.
        let q = vec![Qualifier::new("10", "L1")];
        let new = doc(
            "01_1",
            vec![
                item(q.clone(), "k", &["https://a.example/1"]),
                item(q, "k", &["https://a.example/1", "https://a.example/2"]),
            ],
        );
        let out = merge_documents(new, None);
        assert!(out.created);
        assert_eq!(out.document.data.len(), 1);
        let hrefs: Vec<&str> = out.document.data[0].linkset.link_types["k"]
            .iter()
            .map(|e| e.href.as_str())
            .collect();
        assert_eq!(hrefs, vec!["https://a.example/1", "https://a.example/2"]);
    }

    #[test]
    fn merge_is_idempotent_by_href() {
        let new = doc("01_1", vec![item(vec![], "k", &["https://a.example/"])]);
        let out = merge_documents(new.clone(), Some(new.clone()));
        assert!(!out.created);
        assert_eq!(out.document.data.len(), 1);
        assert_eq!(out.document.data[0].linkset.link_types["k"].len(), 1);
    }

    #[test]
    fn unmatched_qualifiers_append_item() {
        let existing = doc("01_1", vec![item(vec![], "k", &["https://a.example/1"])]);
        let new = doc(
            "01_1",
            vec![item(
                vec![Qualifier::new("10", "L1")],
                "k",
                &["https://a.example/2"],
            )],
        );
        let out = merge_documents(new, Some(existing));
        assert_eq!(out.document.data.len(), 2);
    }

    #[test]
    fn matched_qualifiers_merge_new_hrefs() {
        let q = vec![Qualifier::new("10", "L1"), Qualifier::new("21", "S1")];
        let existing = doc("01_1", vec![item(q.clone(), "k", &["https://a.example/1"])]);
        // Same multiset, different order
        let q_rev = vec![Qualifier::new("21", "S1"), Qualifier::new("10", "L1")];
        let new = doc(
            "01_1",
            vec![item(q_rev, "k", &["https://a.example/1", "https://a.example/2"])],
        );
        let out = merge_documents(new, Some(existing));
        assert_eq!(out.document.data.len(), 1);
        let hrefs: Vec<&str> = out.document.data[0].linkset.link_types["k"]
            .iter()
            .map(|e| e.href.as_str())
            .collect();
        assert_eq!(hrefs, vec!["https://a.example/1", "https://a.example/2"]);
    }

    #[test]
    fn merge_adds_missing_linktype_keys() {
        let existing = doc("01_1", vec![item(vec![], "k1", &["https://a.example/1"])]);
        let new = doc("01_1", vec![item(vec![], "k2", &["https://a.example/2"])]);
        let out = merge_documents(new, Some(existing));
        let lt = &out.document.data[0].linkset.link_types;
        assert!(lt.contains_key("k1"));
        assert!(lt.contains_key("k2"));
    }

    #[test]
    fn item_description_prefers_incoming() {
        let mut existing = doc("01_1", vec![item(vec![], "k", &["https://a.example/1"])]);
        existing.data[0].linkset.item_description = Some("old".to_string());

        let mut new = doc("01_1", vec![item(vec![], "k", &["https://a.example/1"])]);
        new.data[0].linkset.item_description = Some("new".to_string());
        let out = merge_documents(new, Some(existing.clone()));
        assert_eq!(
            out.document.data[0].linkset.item_description.as_deref(),
            Some("new")
        );

        // Incoming without a description keeps the existing one
        let bare = doc("01_1", vec![item(vec![], "k", &["https://a.example/1"])]);
        let out = merge_documents(bare, Some(existing));
        assert_eq!(
            out.document.data[0].linkset.item_description.as_deref(),
            Some("old")
        );
    }

    #[test]
    fn default_linktype_prefers_incoming() {
        let mut existing = doc("01_1", vec![item(vec![], "k", &["https://a.example/1"])]);
        existing.default_linktype = Some("gs1:pip".to_string());
        let mut new = doc("01_1", vec![item(vec![], "k", &["https://a.example/2"])]);
        new.default_linktype = Some("gs1:epil".to_string());
        let out = merge_documents(new, Some(existing.clone()));
        assert_eq!(out.document.default_linktype.as_deref(), Some("gs1:epil"));

        let bare = doc("01_1", vec![item(vec![], "k", &["https://a.example/3"])]);
        let out = merge_documents(bare, Some(existing));
        assert_eq!(out.document.default_linktype.as_deref(), Some("gs1:pip"));
    }

    #[test]
    fn multiset_semantics_respect_multiplicity() {
        let a = vec![Qualifier::new("10", "L1"), Qualifier::new("10", "L1")];
        let b = vec![Qualifier::new("10", "L1")];
        assert!(!qualifiers_equal(&a, &b));
        let c = vec![Qualifier::new("10", "L1"), Qualifier::new("10", "L1")];
        assert!(qualifiers_equal(&a, &c));
    }

    #[test]
    fn repeated_merges_keep_single_item_per_multiset() {
        let q = vec![Qualifier::new("10", "L1")];
        let mut state: Option<ResolverDocument> = None;
        for _ in 0..3 {
            let new = doc("01_1", vec![item(q.clone(), "k", &["https://a.example/1"])]);
            state = Some(merge_documents(new, state).document);
        }
        let final_doc = state.unwrap();
        assert_eq!(final_doc.data.len(), 1);
        assert_eq!(final_doc.data[0].linkset.link_types["k"].len(), 1);
    }
}
