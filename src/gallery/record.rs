//! Listen records and the shared list they live in

use parking_lot::RwLock;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::ImageCache;

/// Progress of one enrichment step for a record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EnrichmentStatus {
    #[default]
    Pending,
    Ready,
    Failed(String),
}

impl EnrichmentStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, EnrichmentStatus::Pending)
    }
}

impl fmt::Display for EnrichmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentStatus::Pending => write!(f, "pending"),
            EnrichmentStatus::Ready => write!(f, "ready"),
            EnrichmentStatus::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Metadata fetched for a song, always applied as a whole
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Enrichment {
    pub image_url: String,
    pub description: String,
    /// Site the listen came from, e.g. Spotify
    pub attribution: String,
    pub artist: String,
    pub audio_url: String,
}

/// One music listen
///
/// Records are values: enrichment produces a new `Record` which the worker
/// publishes into the [`RecordStore`], readers only ever see snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: String,
    pub source_url: String,
    pub title: String,
    pub enrichment: Option<Enrichment>,
    pub metadata: EnrichmentStatus,
    pub image: EnrichmentStatus,
}

impl Record {
    /// A freshly parsed, unenriched record
    pub fn new(id: &str, source_url: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            source_url: source_url.to_string(),
            title: title.to_string(),
            enrichment: None,
            metadata: EnrichmentStatus::Pending,
            image: EnrichmentStatus::Pending,
        }
    }

    pub fn image_url(&self) -> Option<&str> {
        self.enrichment.as_ref().map(|e| e.image_url.as_str())
    }

    pub fn description(&self) -> Option<&str> {
        self.enrichment.as_ref().map(|e| e.description.as_str())
    }

    pub fn attribution(&self) -> Option<&str> {
        self.enrichment.as_ref().map(|e| e.attribution.as_str())
    }

    pub fn artist(&self) -> Option<&str> {
        self.enrichment.as_ref().map(|e| e.artist.as_str())
    }

    pub fn audio_url(&self) -> Option<&str> {
        self.enrichment.as_ref().map(|e| e.audio_url.as_str())
    }

    /// Where this record's image is cached
    pub fn local_image_path(&self, cache: &ImageCache) -> PathBuf {
        cache.image_path(&self.id)
    }

    pub fn with_enrichment(&self, enrichment: Enrichment) -> Self {
        Self {
            enrichment: Some(enrichment),
            metadata: EnrichmentStatus::Ready,
            ..self.clone()
        }
    }

    pub fn with_metadata_status(&self, status: EnrichmentStatus) -> Self {
        Self {
            metadata: status,
            ..self.clone()
        }
    }

    pub fn with_image_status(&self, status: EnrichmentStatus) -> Self {
        Self {
            image: status,
            ..self.clone()
        }
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

/// The record list of one refresh cycle
///
/// Cloning shares the same list. Each cycle gets a new store, so a worker
/// left over from a previous cycle can only touch its own list.
#[derive(Debug, Clone, Default)]
pub struct RecordStore {
    records: Arc<RwLock<Vec<Record>>>,
}

impl RecordStore {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Copy of the current list
    pub fn snapshot(&self) -> Vec<Record> {
        self.records.read().clone()
    }

    /// Current value of the first record with `id`
    pub fn get(&self, id: &str) -> Option<Record> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Replace every record with `id` by `update(record)`
    ///
    /// The same song can be listened to several times; all of its listens
    /// share one enrichment. Returns false when no record has that id.
    pub fn update<F>(&self, id: &str, update: F) -> bool
    where
        F: Fn(&Record) -> Record,
    {
        let mut records = self.records.write();
        let mut found = false;
        for record in records.iter_mut().filter(|r| r.id == id) {
            *record = update(record);
            found = true;
        }
        found
    }
}
