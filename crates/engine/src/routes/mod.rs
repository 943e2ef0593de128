//! HTTP route modules.

pub mod files;
pub mod health;
pub mod items;
pub mod navigation;
pub mod settings;
pub mod taxonomy;
pub mod testimonials;
