//! Authentication and session subsystem.
//!
//! Four operations - register, login, logout, refresh - built from four
//! components:
//!
//! - [`password`]: salted one-way hashing of account credentials (Argon2id)
//! - [`token`]: signing and verification of the two token classes
//!   (15-minute access tokens, 7-day renewal tokens)
//! - [`cookie`]: the hardened cookie carrying the renewal token
//! - [`service`]: the orchestrator sequencing the above against the
//!   credential store
//! - [`current_user`]: extractor authenticating bearer access tokens
//!
//! Sessions are stateless: the server holds no record of issued tokens, and
//! validity is decided entirely by signature and expiry.

pub mod cookie;
pub mod current_user;
pub mod password;
pub mod service;
pub mod token;
