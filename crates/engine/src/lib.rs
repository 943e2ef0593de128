//! Cardstack publishing engine.
//!
//! Taxonomy-consistent content management core for a small collectibles
//! storefront: posts, pages, testimonials, and a navigation menu with
//! draft/published workflows. The `cardstack` binary wires these modules
//! into an HTTP admin API.

pub mod config;
pub mod db;
pub mod error;
pub mod file;
pub mod models;
pub mod routes;
pub mod schema;
pub mod services;
pub mod slug;
pub mod state;
pub mod text;
