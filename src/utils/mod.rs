//! Utility functions

mod sanitize;

pub use sanitize::{cache_file_name, has_image_extension};
