//! API models for account data.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Role claims attached to an account.
///
/// Only carried, never enforced here: permission evaluation happens in the
/// services that consume the access token.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Platform administration
    Admin,
    /// Curates the media catalogue (movies, series, actors)
    ContentManager,
    /// Regular viewer account
    StandardUser,
}
