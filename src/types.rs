//! Common type definitions shared across the crate.
//!
//! Account identifiers are UUIDs behind the [`UserId`] alias so that store,
//! token, and API code agree on one type without pulling in each other's
//! modules.

use uuid::Uuid;

/// Account identifier.
pub type UserId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs.
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}
