//! Sequential enrichment worker
//!
//! One background task drains a FIFO of work items, one at a time:
//! - `Metadata(id)` fetches the song object and publishes the enrichment
//! - `Image(id)` downloads the enriched record's image into the cache
//! - `ClearCache` removes cached image files
//!
//! Every finished item produces exactly one [`WorkerEvent`] on the listener
//! channel, until the worker is stopped.

use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{Notify, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::fetcher::Enricher;
use super::record::{EnrichmentStatus, RecordStore};

/// A unit of work for the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkItem {
    Metadata(String),
    Image(String),
    ClearCache,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Nothing queued
    Idle,
    /// Draining the queue
    Running,
    /// Terminal, rejects work and sends no more events
    Stopped,
}

/// What a finished work item changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerEvent {
    Metadata { id: String, status: EnrichmentStatus },
    Image { id: String, status: EnrichmentStatus },
    CacheCleared { removed: usize },
}

impl WorkerEvent {
    /// Record affected by this event, if any
    pub fn record_id(&self) -> Option<&str> {
        match self {
            WorkerEvent::Metadata { id, .. } | WorkerEvent::Image { id, .. } => Some(id),
            WorkerEvent::CacheCleared { .. } => None,
        }
    }
}

struct Queue {
    items: VecDeque<WorkItem>,
    state: WorkerState,
}

struct Shared {
    queue: Mutex<Queue>,
    wake: Notify,
}

/// Handle to a running enrichment worker
pub struct EnrichmentWorker {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl EnrichmentWorker {
    /// Start a worker enriching records of `store`
    pub fn spawn(
        enricher: Enricher,
        store: RecordStore,
        events: mpsc::UnboundedSender<WorkerEvent>,
    ) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                items: VecDeque::new(),
                state: WorkerState::Idle,
            }),
            wake: Notify::new(),
        });

        let task = tokio::spawn(run(shared.clone(), enricher, store, events));

        Self { shared, task }
    }

    /// Append an item to the queue
    ///
    /// Returns false (and drops the item) once the worker is stopped.
    pub fn submit(&self, item: WorkItem) -> bool {
        {
            let mut queue = self.shared.queue.lock();
            if queue.state == WorkerState::Stopped {
                debug!("Worker stopped, dropping {:?}", item);
                return false;
            }
            queue.items.push_back(item);
        }
        self.shared.wake.notify_one();
        true
    }

    /// Drop every queued image download, then queue a cache clear
    ///
    /// Returns the number of image items removed, or `None` when the worker
    /// is stopped and nothing was queued.
    pub fn cancel_pending_image_fetches(&self) -> Option<usize> {
        let removed = {
            let mut queue = self.shared.queue.lock();
            if queue.state == WorkerState::Stopped {
                return None;
            }
            let before = queue.items.len();
            queue
                .items
                .retain(|item| !matches!(item, WorkItem::Image(_)));
            queue.items.push_back(WorkItem::ClearCache);
            before - (queue.items.len() - 1)
        };

        debug!("Cancelled {} pending image fetches", removed);
        self.shared.wake.notify_one();
        Some(removed)
    }

    /// Stop the worker
    ///
    /// The item in flight runs to completion but its event is not sent;
    /// everything still queued is discarded.
    pub fn stop(&self) {
        let discarded = {
            let mut queue = self.shared.queue.lock();
            queue.state = WorkerState::Stopped;
            let discarded = queue.items.len();
            queue.items.clear();
            discarded
        };
        debug!("Worker stopped, discarded {} queued items", discarded);
        self.shared.wake.notify_one();
    }

    pub fn state(&self) -> WorkerState {
        self.shared.queue.lock().state
    }

    /// Number of items waiting to start
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().items.len()
    }

    /// Wait for the background task to exit (only returns after `stop`)
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!("Enrichment worker panicked: {}", e);
        }
    }
}

async fn run(
    shared: Arc<Shared>,
    enricher: Enricher,
    store: RecordStore,
    events: mpsc::UnboundedSender<WorkerEvent>,
) {
    loop {
        let next = {
            let mut queue = shared.queue.lock();
            if queue.state == WorkerState::Stopped {
                break;
            }
            let next = queue.items.pop_front();
            queue.state = if next.is_some() {
                WorkerState::Running
            } else {
                WorkerState::Idle
            };
            next
        };

        let Some(item) = next else {
            shared.wake.notified().await;
            continue;
        };

        let event = process(&enricher, &store, item).await;

        // Checked under the lock so that no event can follow a stop
        {
            let queue = shared.queue.lock();
            if queue.state == WorkerState::Stopped {
                debug!("Worker stopped mid-item, suppressing {:?}", event);
                break;
            }
            if events.send(event).is_err() {
                debug!("Worker listener dropped");
            }
        }
    }
}

async fn process(enricher: &Enricher, store: &RecordStore, item: WorkItem) -> WorkerEvent {
    match item {
        WorkItem::Metadata(id) => {
            let status = enrich_metadata(enricher, store, &id).await;
            WorkerEvent::Metadata { id, status }
        }
        WorkItem::Image(id) => {
            let status = fetch_image(enricher, store, &id).await;
            WorkerEvent::Image { id, status }
        }
        WorkItem::ClearCache => {
            let removed = match enricher.clear_image_cache().await {
                Ok(removed) => removed,
                Err(e) => {
                    warn!("Failed to clear image cache: {}", e);
                    0
                }
            };
            WorkerEvent::CacheCleared { removed }
        }
    }
}

async fn enrich_metadata(enricher: &Enricher, store: &RecordStore, id: &str) -> EnrichmentStatus {
    let Some(record) = store.get(id) else {
        return EnrichmentStatus::Failed("record not in list".into());
    };
    if record.enrichment.is_some() {
        debug!("Song {} already enriched", id);
        return EnrichmentStatus::Ready;
    }

    match enricher.fetch_metadata(id).await {
        Ok(enrichment) => {
            store.update(id, |r| r.with_enrichment(enrichment.clone()));
            debug!("Enriched song {}", id);
            EnrichmentStatus::Ready
        }
        Err(e) => {
            warn!("Failed to fetch song info for {}: {} ({})", id, e, e.kind());
            let status = EnrichmentStatus::Failed(e.to_string());
            store.update(id, |r| r.with_metadata_status(status.clone()));
            status
        }
    }
}

async fn fetch_image(enricher: &Enricher, store: &RecordStore, id: &str) -> EnrichmentStatus {
    let Some(record) = store.get(id) else {
        return EnrichmentStatus::Failed("record not in list".into());
    };

    let status = match record.image_url() {
        None => EnrichmentStatus::Failed("no image url".into()),
        Some(url) => {
            let dest = record.local_image_path(enricher.cache());
            match enricher.fetch_and_store_image(url, &dest).await {
                Ok(bytes) => {
                    debug!("Cached image for {} ({} bytes)", id, bytes);
                    EnrichmentStatus::Ready
                }
                Err(e) => {
                    warn!("Failed to download song image {}: {} ({})", url, e, e.kind());
                    EnrichmentStatus::Failed(e.to_string())
                }
            }
        }
    };

    store.update(id, |r| r.with_image_status(status.clone()));
    status
}
