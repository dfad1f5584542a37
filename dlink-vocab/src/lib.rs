//! GS1 Vocabulary Constants for the dlink resolver
//!
//! This crate provides a centralized location for GS1 Web Vocabulary IRIs,
//! JSON-LD namespace bases, and error-type IRIs used throughout the
//! resolver ecosystem.
//!
//! # Organization
//!
//! Constants are organized by concern:
//! - `voc` - GS1 Web Vocabulary (https://gs1.org/voc/)
//! - `namespaces` - JSON-LD `@context` namespace bases
//! - `errors` - RFC-7807 error type IRIs for API responses

pub mod errors;

/// GS1 Web Vocabulary constants
pub mod voc {
    /// Base IRI of the GS1 Web Vocabulary
    pub const BASE: &str = "https://gs1.org/voc/";

    /// CURIE prefix expanded against [`BASE`]
    pub const CURIE_PREFIX: &str = "gs1:";

    /// gs1:defaultLink IRI - the single default redirect target
    pub const DEFAULT_LINK: &str = "https://gs1.org/voc/defaultLink";

    /// gs1:defaultLinkMulti IRI - ordered multi-target default set
    pub const DEFAULT_LINK_MULTI: &str = "https://gs1.org/voc/defaultLinkMulti";

    /// gs1:pip IRI - product information page, the resolver-wide fallback linktype
    pub const PIP: &str = "https://gs1.org/voc/pip";

    /// gs1:DigitalLink IRI - JSON-LD `@type` of a resolved identifier
    pub const DIGITAL_LINK: &str = "gs1:DigitalLink";
}

/// JSON-LD `@context` namespace bases
pub mod namespaces {
    /// schema.org base
    pub const SCHEMA: &str = "https://schema.org/";

    /// RFC 9264 linkset namespace
    pub const LINKSET: &str = "https://www.ietf.org/rfc/rfc9264.html#";

    /// Link relation identifying a JSON-LD context document
    pub const JSON_LD_CONTEXT_REL: &str = "http://www.w3.org/ns/json-ld#context";

    /// Context document advertised alongside every linkset link
    pub const CONTEXT_DOCUMENT: &str = "https://ref.gs1.org/resolver/context.jsonld";
}

/// Application Identifiers with special resolver handling
pub mod ai {
    /// GTIN - value is a 13 or 14 digit trade item number
    pub const GTIN: &str = "01";

    /// SSCC - serialized shipping container code
    pub const SSCC: &str = "00";

    /// GRAI - global returnable asset identifier
    pub const GRAI: &str = "8003";

    /// GIAI - global individual asset identifier
    pub const GIAI: &str = "8004";

    /// AIs whose values are serialized identifiers admitting prefix-based
    /// document storage (shortened lookup with template remainder binding).
    pub const SERIALIZED: &[&str] = &[GRAI, GIAI, SSCC];
}

/// Expand a link-type term to its full GS1 Web Vocabulary IRI.
///
/// - `gs1:X` becomes `https://gs1.org/voc/X`
/// - anything starting with `http` is kept verbatim
/// - a bare term `X` becomes `https://gs1.org/voc/X`
pub fn expand_linktype(term: &str) -> String {
    if let Some(suffix) = term.strip_prefix(voc::CURIE_PREFIX) {
        format!("{}{}", voc::BASE, suffix)
    } else if term.starts_with("http") {
        term.to_string()
    } else {
        format!("{}{}", voc::BASE, term)
    }
}

/// Contract a full GS1 Web Vocabulary IRI back to its `gs1:` CURIE form.
///
/// IRIs outside the vocabulary base are returned unchanged.
pub fn contract_linktype(iri: &str) -> String {
    match iri.strip_prefix(voc::BASE) {
        Some(suffix) => format!("{}{}", voc::CURIE_PREFIX, suffix),
        None => iri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_curie() {
        assert_eq!(expand_linktype("gs1:pip"), "https://gs1.org/voc/pip");
    }

    #[test]
    fn expand_bare_term() {
        assert_eq!(
            expand_linktype("certificationInfo"),
            "https://gs1.org/voc/certificationInfo"
        );
    }

    #[test]
    fn expand_keeps_absolute() {
        assert_eq!(
            expand_linktype("https://example.com/voc/custom"),
            "https://example.com/voc/custom"
        );
        assert_eq!(
            expand_linktype("http://example.com/voc/custom"),
            "http://example.com/voc/custom"
        );
    }

    #[test]
    fn contract_roundtrip() {
        assert_eq!(contract_linktype("https://gs1.org/voc/pip"), "gs1:pip");
        assert_eq!(
            contract_linktype("https://example.com/other"),
            "https://example.com/other"
        );
    }
}
