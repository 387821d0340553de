//! Music gallery: records, enrichment and refresh cycles

pub mod controller;
pub mod fetcher;
pub mod record;
pub mod worker;

pub use controller::{GalleryController, GalleryView};
pub use fetcher::Enricher;
pub use record::{EnrichmentStatus, Record};
pub use worker::WorkerEvent;
