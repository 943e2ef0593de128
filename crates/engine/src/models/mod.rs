//! Database models.

pub mod content_item;
pub mod navigation_item;
pub mod settings;
pub mod taxonomy;
pub mod testimonial;

pub use content_item::{ContentItem, ContentKind};
pub use navigation_item::NavigationItem;
pub use settings::{PublishSettings, SiteSettings};
pub use taxonomy::{Category, Tag, TermWithCount};
pub use testimonial::Testimonial;
