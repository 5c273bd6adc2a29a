//! Core data model for media metadata resolution.
//!
//! Everything the resolver, store, and reconciler exchange lives here:
//! identities and id hints, the normalized provider record shapes, the
//! persisted record shape, and the "empty means unknown" rules that the
//! fill-only merge policy depends on.

pub mod empty;
pub mod error;
pub mod identity;
pub mod media_type;
pub mod parsed;
pub mod record;

pub use empty::IsEmpty;
pub use error::{IdentityError, ParsedNameError};
pub use identity::{IdHint, MediaIdentity, ResolveRequest, extract_default_id};
pub use media_type::{MediaType, MediaTypeParseError};
pub use parsed::{NumberOrList, ParsedName};
pub use record::{
    CanonicalRecord, Collection, Episode, EpisodeRecord, RecordId, RecordRef, Season, ShardId,
    StoredRecord,
};
