//! Character metadata node for the Yamete Kudasai collection.
//!
//! Serves profile records for each ERC-721 token, keeps each record's owner in
//! step with the token contract, and accepts profile edits only when they are
//! signed (`personal_sign`) by the token's current owner.

pub mod api;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod models;
pub mod ownership;
pub mod policy;
pub mod service;
pub mod storage;

pub use errors::{CharacterError, CharacterResult};
pub use service::CharacterService;
