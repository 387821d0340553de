//! Local image cache module

pub mod store;

pub use store::{ImageCache, clear_image_cache};
