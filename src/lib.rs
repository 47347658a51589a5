//! Word lookup service.
//!
//! Serves word records from a per-language document store and falls back to
//! an external translation provider when a word or a target language is
//! missing.

pub mod config;
pub mod models;
pub mod repository;
pub mod server;
pub mod store;
pub mod translation;
