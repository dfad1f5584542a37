//! RFC-7807 problem type IRIs
//!
//! These IRI strings populate the `type` member of RFC-7807 problem
//! responses emitted by the HTTP boundary.
//!
//! # Example Usage
//!
//! ```json
//! {
//!   "type": "https://ref.gs1.org/resolver/errors#validation",
//!   "title": "Bad Request",
//!   "status": 400,
//!   "detail": "identifier failed GS1 Digital Link syntax check"
//! }
//! ```

/// Namespace all problem types live under
pub const BASE: &str = "https://ref.gs1.org/resolver/errors#";

/// Request shape or GS1 syntax violation (400)
pub const VALIDATION: &str = "https://ref.gs1.org/resolver/errors#validation";

/// Document, qualifier, or linktype not found (404)
pub const NOT_FOUND: &str = "https://ref.gs1.org/resolver/errors#not-found";

/// Conditional write denied after retries (409)
pub const CONFLICT: &str = "https://ref.gs1.org/resolver/errors#conflict";

/// Missing or invalid bearer token (401)
pub const UNAUTHORIZED: &str = "https://ref.gs1.org/resolver/errors#unauthorized";

/// Document store unreachable or timed out (503)
pub const UPSTREAM_UNAVAILABLE: &str =
    "https://ref.gs1.org/resolver/errors#upstream-unavailable";

/// Everything else (500)
pub const INTERNAL: &str = "https://ref.gs1.org/resolver/errors#internal";
