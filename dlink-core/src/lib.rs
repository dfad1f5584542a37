//! Core engines of the dlink resolver
//!
//! Pure (no I/O) building blocks shared by the Resolver read path and the
//! Data-Entry write path:
//!
//! - `model` - the documented wire and storage shapes
//! - `path` - anchor ↔ document-id codec
//! - `linktype` - link-type IRI normalization
//! - `authoring` - submitted entries → storage documents
//! - `matching` - request-qualifier matching with template binding
//! - `merge` - qualifier-aware document merge for upserts
//! - `negotiation` - hierarchical content negotiation
//! - `template` - `{name}` template-variable substitution
//! - `linkset` - JSON-LD linkset body and `Link` header formatting
//! - `migrate` - one-shot v2 → v3 entry conversion

pub mod authoring;
pub mod error;
pub mod linkset;
pub mod linktype;
pub mod matching;
pub mod merge;
pub mod migrate;
pub mod model;
pub mod negotiation;
pub mod path;
pub mod template;

pub use error::{CoreError, Result};
pub use model::{
    DataItem, DocumentId, Entry, LinkV3, LinksetEntry, LinksetSection, Qualifier,
    ResolverDocument,
};
pub use path::{id_to_path, parse_qualifier_path, path_to_id};
