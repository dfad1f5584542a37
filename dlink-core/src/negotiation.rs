//! Hierarchical content negotiation
//!
//! Matched linkset entries are narrowed over (language, context, media
//! type) with a defined fallback chain. Output order always preserves the
//! input order of the entries that passed the winning filter.

use crate::model::LinksetEntry;

/// Language tag used when a request or entry declares no language
pub const UNDEFINED_LANG: &str = "und";

/// Negotiation criteria extracted from the request
#[derive(Debug, Clone, Default)]
pub struct Criteria {
    /// `Accept-Language` tags in header order
    pub accept_languages: Vec<String>,
    /// Requested `context` query parameter
    pub context: Option<String>,
    /// `Accept` media types in header order
    pub media_types: Vec<String>,
    /// Whether the client named a linktype explicitly
    pub has_explicit_linktype: bool,
}

/// Strip `;q=...` suffixes and surrounding whitespace from a header list.
pub fn clean_header_list(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| match v.split_once(";q=") {
            Some((head, _)) => head.trim().to_string(),
            None => v.trim().to_string(),
        })
        .filter(|v| !v.is_empty())
        .collect()
}

/// Negotiate the response entries.
///
/// Evaluates the fallback chain in order and returns the first non-empty
/// result; with all-default criteria and no explicit linktype the first
/// entry wins outright.
pub fn negotiate(entries: &[LinksetEntry], criteria: &Criteria) -> Vec<LinksetEntry> {
    if entries.is_empty() {
        return Vec::new();
    }

    let languages = clean_header_list(&criteria.accept_languages);
    let media_types = clean_header_list(&criteria.media_types);
    let context = criteria
        .context
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    if !criteria.has_explicit_linktype
        && is_default_languages(&languages)
        && context.is_none()
        && is_default_media(&media_types)
    {
        return vec![entries[0].clone()];
    }

    let stages = [
        // 1. language AND context AND media type
        select(entries, |e| {
            matches_any_language(e, &languages)
                && matches_context(e, context)
                && matches_media(e, &media_types)
        }),
        // 2. language AND context
        select(entries, |e| {
            matches_any_language(e, &languages) && matches_context(e, context)
        }),
        // 3. language AND media type
        select(entries, |e| {
            matches_any_language(e, &languages) && matches_media(e, &media_types)
        }),
        // 4. context AND media type
        select(entries, |e| {
            matches_context(e, context) && matches_media(e, &media_types)
        }),
        // 5. language only, in header order
        match_languages_ordered(entries, &languages),
        // 6. context only
        select(entries, |e| matches_context(e, context)),
        // 7. undefined-language entries
        select(entries, |e| e.hreflang.iter().any(|l| l == UNDEFINED_LANG)),
        // 8. media type only
        select(entries, |e| matches_media(e, &media_types)),
        // 9. undefined-type entries
        select(entries, |e| e.media_type.as_deref() == Some(UNDEFINED_LANG)),
    ];

    for stage in stages {
        if !stage.is_empty() {
            return stage;
        }
    }

    vec![entries[0].clone()]
}

fn select(entries: &[LinksetEntry], pred: impl Fn(&LinksetEntry) -> bool) -> Vec<LinksetEntry> {
    entries.iter().filter(|e| pred(e)).cloned().collect()
}

/// Ordered language matching: iterate the accepted tags; per tag prefer
/// exact (case-insensitive) `hreflang` hits, otherwise accumulate entries
/// whose `hreflang` starts with `tag-`. The first non-empty accumulation
/// wins.
fn match_languages_ordered(entries: &[LinksetEntry], languages: &[String]) -> Vec<LinksetEntry> {
    for tag in languages {
        let exact: Vec<LinksetEntry> = entries
            .iter()
            .filter(|e| e.hreflang.iter().any(|l| l.eq_ignore_ascii_case(tag)))
            .cloned()
            .collect();
        if !exact.is_empty() {
            return exact;
        }

        let prefix = format!("{}-", tag.to_ascii_lowercase());
        let prefixed: Vec<LinksetEntry> = entries
            .iter()
            .filter(|e| {
                e.hreflang
                    .iter()
                    .any(|l| l.to_ascii_lowercase().starts_with(&prefix))
            })
            .cloned()
            .collect();
        if !prefixed.is_empty() {
            return prefixed;
        }
    }
    Vec::new()
}

fn matches_any_language(entry: &LinksetEntry, languages: &[String]) -> bool {
    languages.iter().any(|tag| {
        let prefix = format!("{}-", tag.to_ascii_lowercase());
        entry.hreflang.iter().any(|l| {
            l.eq_ignore_ascii_case(tag) || l.to_ascii_lowercase().starts_with(&prefix)
        })
    })
}

fn matches_context(entry: &LinksetEntry, context: Option<&str>) -> bool {
    match context {
        Some(requested) => entry
            .context
            .iter()
            .any(|c| c.eq_ignore_ascii_case(requested)),
        None => false,
    }
}

fn matches_media(entry: &LinksetEntry, media_types: &[String]) -> bool {
    media_types.iter().any(|requested| {
        if requested == "*/*" {
            return true;
        }
        let Some(entry_type) = entry.media_type.as_deref() else {
            return false;
        };
        if entry_type.eq_ignore_ascii_case(requested) {
            return true;
        }
        match requested.strip_suffix("/*") {
            Some(family) => entry_type
                .to_ascii_lowercase()
                .starts_with(&format!("{}/", family.to_ascii_lowercase())),
            None => false,
        }
    })
}

fn is_default_languages(languages: &[String]) -> bool {
    languages.is_empty() || (languages.len() == 1 && languages[0] == UNDEFINED_LANG)
}

fn is_default_media(media_types: &[String]) -> bool {
    media_types
        .iter()
        .all(|m| matches!(m.as_str(), "*/*" | "text/*" | "application/*"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(href: &str, hreflang: &[&str], context: &[&str], mtype: Option<&str>) -> LinksetEntry {
        LinksetEntry {
            href: href.to_string(),
            title: "t".to_string(),
            media_type: mtype.map(|m| m.to_string()),
            hreflang: hreflang.iter().map(|s| s.to_string()).collect(),
            context: context.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn criteria(langs: &[&str], context: Option<&str>, media: &[&str]) -> Criteria {
        Criteria {
            accept_languages: langs.iter().map(|s| s.to_string()).collect(),
            context: context.map(|s| s.to_string()),
            media_types: media.iter().map(|s| s.to_string()).collect(),
            has_explicit_linktype: true,
        }
    }

    #[test]
    fn default_shortcut_returns_first_entry() {
        let entries = vec![
            entry("https://a.example/1", &["en"], &[], None),
            entry("https://a.example/2", &["fr"], &[], None),
        ];
        let c = Criteria {
            accept_languages: vec![UNDEFINED_LANG.to_string()],
            context: None,
            media_types: vec!["*/*".to_string()],
            has_explicit_linktype: false,
        };
        let result = negotiate(&entries, &c);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].href, "https://a.example/1");
    }

    #[test]
    fn explicit_linktype_disables_shortcut() {
        let entries = vec![
            entry("https://a.example/1", &["en"], &[], None),
            entry("https://a.example/2", &["und"], &[], None),
        ];
        let c = criteria(&["und"], None, &[]);
        // No shortcut: filter 7 (und entries) fires
        let result = negotiate(&entries, &c);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].href, "https://a.example/2");
    }

    #[test]
    fn q_values_are_stripped() {
        let cleaned = clean_header_list(&[
            "en-GB;q=0.7".to_string(),
            "  en-US;q=0.6 ".to_string(),
            "fr".to_string(),
        ]);
        assert_eq!(cleaned, vec!["en-GB", "en-US", "fr"]);
    }

    #[test]
    fn exact_language_beats_prefix() {
        let entries = vec![
            entry("https://a.example/gb", &["en-GB"], &[], None),
            entry("https://a.example/us", &["en-US"], &[], None),
        ];
        let c = criteria(&["en-US"], None, &[]);
        let result = negotiate(&entries, &c);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].href, "https://a.example/us");
    }

    #[test]
    fn header_order_decides_language_fallback() {
        // Accept-Language: en-IE;q=0.9,en;q=0.8,en-GB;q=0.7,en-US;q=0.6
        let entries = vec![
            entry("https://a.example/gb", &["en-GB"], &[], None),
            entry("https://a.example/us", &["en-US"], &[], None),
        ];
        let c = criteria(
            &["en-IE;q=0.9", "en;q=0.8", "en-GB;q=0.7", "en-US;q=0.6"],
            None,
            &[],
        );
        let result = negotiate(&entries, &c);
        assert_eq!(result[0].href, "https://a.example/gb");
    }

    #[test]
    fn context_match_is_case_insensitive() {
        let entries = vec![
            entry("https://a.example/1", &[], &["GB"], None),
            entry("https://a.example/2", &[], &["US"], None),
        ];
        let c = criteria(&[], Some("gb"), &[]);
        let result = negotiate(&entries, &c);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].href, "https://a.example/1");
    }

    #[test]
    fn media_family_wildcard() {
        let entries = vec![
            entry("https://a.example/pdf", &[], &[], Some("application/pdf")),
            entry("https://a.example/html", &[], &[], Some("text/html")),
        ];
        let c = criteria(&[], None, &["image/*", "text/*"]);
        let result = negotiate(&entries, &c);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].href, "https://a.example/html");
    }

    #[test]
    fn language_and_context_beats_context_only() {
        let entries = vec![
            entry("https://a.example/1", &["fr"], &["gb"], None),
            entry("https://a.example/2", &["en"], &["gb"], None),
        ];
        let c = criteria(&["en"], Some("gb"), &[]);
        let result = negotiate(&entries, &c);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].href, "https://a.example/2");
    }

    #[test]
    fn und_entries_catch_unmatched_languages() {
        let entries = vec![
            entry("https://a.example/1", &["fr"], &[], None),
            entry("https://a.example/2", &["und"], &[], None),
        ];
        let c = criteria(&["de"], None, &[]);
        let result = negotiate(&entries, &c);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].href, "https://a.example/2");
    }

    #[test]
    fn final_fallback_is_first_entry() {
        let entries = vec![
            entry("https://a.example/1", &["fr"], &[], Some("text/html")),
            entry("https://a.example/2", &["de"], &[], Some("text/html")),
        ];
        let c = criteria(&["ja"], Some("jp"), &["image/png"]);
        let result = negotiate(&entries, &c);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].href, "https://a.example/1");
    }

    #[test]
    fn winning_filter_preserves_input_order() {
        let entries = vec![
            entry("https://a.example/1", &["en-GB"], &[], None),
            entry("https://a.example/2", &["en-US"], &[], None),
            entry("https://a.example/3", &["en-AU"], &[], None),
        ];
        let c = criteria(&["en"], None, &[]);
        let result = negotiate(&entries, &c);
        let hrefs: Vec<&str> = result.iter().map(|e| e.href.as_str()).collect();
        assert_eq!(
            hrefs,
            vec![
                "https://a.example/1",
                "https://a.example/2",
                "https://a.example/3"
            ]
        );
    }
}
