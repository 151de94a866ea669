//! Hermes record schemas.
//!
//! Stored record shapes for channels and users, plus the write-time
//! validation that decides which writes a store accepts.

pub mod models;
pub mod schema;

pub use models::{Channel, RecordId, User};
pub use schema::{ChannelDraft, Draft, Schema, UserDraft, ValidationError};
