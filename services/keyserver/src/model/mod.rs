//! Key server data model.
//!
//! # Purpose
//! Zone records as held by the store and the summaries exposed over HTTP.
mod zone;

pub use zone::{Zone, ZoneDefinition, ZoneSummary};
