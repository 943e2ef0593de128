//! Engine services.
//!
//! The services own all multi-statement mutations and their transactions;
//! models stay single-query. The publisher is the top-level coordinator
//! composing the taxonomy store, association manager, and navigation
//! synchronizer.

pub mod associations;
pub mod navigation;
pub mod publisher;
pub mod taxonomy;

pub use publisher::{ContentInput, ImageUpload, PublishOutcome, Publisher};
pub use taxonomy::TaxonomyKind;
