//! Link-type normalization
//!
//! Requested link types arrive as `*`, `all`, full IRIs, `gs1:` CURIEs, or
//! bare vocabulary terms. Stored keys are always fully expanded IRIs, so
//! everything except the wildcard forms normalizes to an IRI.

/// Wildcard forms that collapse into the linkset branch of the pipeline
pub const WILDCARDS: &[&str] = &["*", "all"];

/// Normalize a requested link type to a fully expanded IRI.
///
/// - `*` and `all` pass through unchanged
/// - `http://` / `https://` values pass through unchanged
/// - `gs1:X` expands to the vocabulary base
/// - a bare term `X` expands to the vocabulary base
///
/// The function is idempotent: normalizing an already-normalized value
/// returns it unchanged.
pub fn normalize_linktype(linktype: &str) -> String {
    if WILDCARDS.contains(&linktype) {
        return linktype.to_string();
    }
    dlink_vocab::expand_linktype(linktype)
}

/// Whether a requested link type selects the whole linkset (step 9 of the
/// pipeline): `all` or `linkset`, case-insensitive.
pub fn is_linkset_request(linktype: &str) -> bool {
    linktype.eq_ignore_ascii_case("all") || linktype.eq_ignore_ascii_case("linkset")
}

/// Whether a requested link type is a wildcard (`*` or `all`).
pub fn is_wildcard(linktype: &str) -> bool {
    linktype == "*" || linktype.eq_ignore_ascii_case("all")
}
