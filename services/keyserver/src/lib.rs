//! Key server library crate.
//!
//! # Purpose
//! Exposes the token key HTTP surface, caller authentication, configuration,
//! zone storage and observability wiring for use by the binary and tests.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;
