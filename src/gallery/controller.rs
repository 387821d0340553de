//! Gallery refresh orchestration

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::fetcher::Enricher;
use super::record::{Record, RecordStore};
use super::worker::{EnrichmentWorker, WorkItem, WorkerEvent};
use crate::graph::FetchError;

/// Whatever displays the gallery
pub trait GalleryView {
    /// A new list replaced the previous one
    fn show(&mut self, records: &[Record]);

    /// A work item finished; `records` is the current list
    fn update(&mut self, event: &WorkerEvent, records: &[Record]);
}

/// Owns the record list of the current cycle and the worker enriching it
pub struct GalleryController {
    enricher: Enricher,
    store: RecordStore,
    worker: Option<EnrichmentWorker>,
    events: Option<mpsc::UnboundedReceiver<WorkerEvent>>,
    outstanding: usize,
}

impl GalleryController {
    pub fn new(enricher: Enricher) -> Self {
        Self {
            enricher,
            store: RecordStore::default(),
            worker: None,
            events: None,
            outstanding: 0,
        }
    }

    /// Start a new refresh cycle
    ///
    /// Stops the previous cycle's worker, fetches the listen list, shows it
    /// unenriched and queues a cache clear plus one metadata and one image
    /// fetch per record. Returns the number of records.
    ///
    /// If the listen list cannot be fetched the current list is kept and the
    /// error is returned.
    pub async fn refresh(&mut self, view: &mut dyn GalleryView) -> Result<usize, FetchError> {
        if let Some(worker) = self.worker.take() {
            debug!("Stopping previous enrichment worker");
            worker.stop();
        }
        self.events = None;
        self.outstanding = 0;

        let records = match self.enricher.fetch_listens().await {
            Ok(records) => records,
            Err(e) => {
                warn!("Failed to fetch music listens: {}", e);
                return Err(e);
            }
        };
        info!("Fetched {} listens", records.len());

        self.store = RecordStore::new(records);
        if self.store.is_empty() {
            info!("No music listens to enrich");
        }
        view.show(&self.store.snapshot());

        let (tx, rx) = mpsc::unbounded_channel();
        let worker = EnrichmentWorker::spawn(self.enricher.clone(), self.store.clone(), tx);

        if worker.cancel_pending_image_fetches().is_some() {
            self.outstanding += 1;
        }
        for record in self.store.snapshot() {
            for item in [
                WorkItem::Metadata(record.id.clone()),
                WorkItem::Image(record.id.clone()),
            ] {
                if worker.submit(item) {
                    self.outstanding += 1;
                }
            }
        }
        debug!("Queued {} work items", self.outstanding);

        self.worker = Some(worker);
        self.events = Some(rx);
        Ok(self.store.len())
    }

    /// Wait for the next worker event of this cycle and pass it to the view
    ///
    /// Returns `None` once every queued item has reported back.
    pub async fn next_event(&mut self, view: &mut dyn GalleryView) -> Option<WorkerEvent> {
        if self.outstanding == 0 {
            return None;
        }
        let event = self.events.as_mut()?.recv().await?;
        self.outstanding -= 1;
        view.update(&event, &self.store.snapshot());
        Some(event)
    }

    /// Drain events until the cycle is fully enriched
    pub async fn run_until_idle(&mut self, view: &mut dyn GalleryView) {
        while self.next_event(view).await.is_some() {}
        info!("Gallery enrichment finished");
    }

    /// Work items queued in this cycle that have not reported back yet
    pub fn outstanding(&self) -> usize {
        self.outstanding
    }

    /// Snapshot of the current list
    pub fn records(&self) -> Vec<Record> {
        self.store.snapshot()
    }

    /// Stop enrichment for the current cycle
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.stop();
        }
        self.events = None;
        self.outstanding = 0;
    }
}
