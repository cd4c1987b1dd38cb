// Two handler tiers: public (no session) and session (signed cookie
// required, enforced by the session middleware before any repository call).
pub mod public;
pub mod session;

use crate::error::ApiError;
use crate::store::TaxonomyKind;

/// Resolve a URL segment like "editors" to a taxonomy kind. Unknown
/// segments are a 404, the same as any other missing collection.
pub(crate) fn parse_kind(segment: &str) -> Result<TaxonomyKind, ApiError> {
    TaxonomyKind::from_collection(segment)
        .ok_or_else(|| ApiError::not_found(format!("no such collection: {}", segment)))
}
