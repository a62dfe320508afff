//! Caller authentication for the key endpoints.
//!
//! # Purpose
//! Turns the request's `Authorization` header into a [`zonekeys::Principal`].
pub mod bearer;
