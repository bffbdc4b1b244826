//! API request and response data models.
//!
//! These structures define the public API contract, separate from the store
//! records so the wire format and storage representation can evolve
//! independently. All models carry `utoipa` annotations for the generated
//! API docs.

pub mod auth;
pub mod users;
