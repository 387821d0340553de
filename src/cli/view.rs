//! Terminal rendering of the gallery

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::cache::ImageCache;
use crate::gallery::{EnrichmentStatus, GalleryView, Record, WorkerEvent};

/// Prints each record once its image step has finished
pub struct TerminalView {
    cache: ImageCache,
    progress: Option<ProgressBar>,
}

impl TerminalView {
    pub fn new(cache: ImageCache) -> Self {
        Self {
            cache,
            progress: None,
        }
    }

    /// Clear the progress bar and print a summary of `records`
    pub fn finish(&mut self, records: &[Record]) {
        if let Some(progress) = self.progress.take() {
            progress.finish_and_clear();
        }

        let enriched = records.iter().filter(|r| r.enrichment.is_some()).count();
        let cached = records
            .iter()
            .filter(|r| r.image == EnrichmentStatus::Ready)
            .count();
        let failed = records
            .iter()
            .filter(|r| {
                matches!(r.metadata, EnrichmentStatus::Failed(_))
                    || matches!(r.image, EnrichmentStatus::Failed(_))
            })
            .count();

        println!();
        println!("{}", "Gallery ready".green().bold());
        println!("  Listens: {}", records.len());
        println!("  Enriched: {}", enriched);
        println!("  Images cached: {}", cached);
        if failed > 0 {
            println!("  {}", format!("Failed: {}", failed).yellow());
        }
        println!("  Cache: {}", self.cache.dir().display());
    }

    fn row(&self, record: &Record) -> String {
        let title = record.title.bold();
        let detail = match (record.artist(), record.attribution()) {
            (Some(artist), Some(site)) => format!(" - {} ({})", artist, site),
            _ => String::new(),
        };

        let image = match &record.image {
            EnrichmentStatus::Ready => {
                let path: PathBuf = record.local_image_path(&self.cache);
                path.display().to_string().dimmed().to_string()
            }
            EnrichmentStatus::Failed(reason) => format!("no image: {}", reason).yellow().to_string(),
            EnrichmentStatus::Pending => "image pending".dimmed().to_string(),
        };

        let marker = match (&record.metadata, &record.image) {
            (EnrichmentStatus::Ready, EnrichmentStatus::Ready) => "✓".green(),
            (EnrichmentStatus::Failed(_), _) | (_, EnrichmentStatus::Failed(_)) => "!".yellow(),
            _ => "·".normal(),
        };

        let mut row = format!("{} {}{}  {}", marker, title, detail, image);
        if let Some(audio) = record.audio_url() {
            row.push_str(&format!("\n    Listen: {}", audio.underline()));
        }
        row
    }
}

impl GalleryView for TerminalView {
    fn show(&mut self, records: &[Record]) {
        if let Some(progress) = self.progress.take() {
            progress.finish_and_clear();
        }

        println!("{}", format!("Found {} listens", records.len()).cyan());

        let progress = ProgressBar::new(records.len() as u64 * 2 + 1);
        progress.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        self.progress = Some(progress);
    }

    fn update(&mut self, event: &WorkerEvent, records: &[Record]) {
        let Some(progress) = &self.progress else {
            return;
        };
        progress.inc(1);

        let record = event
            .record_id()
            .and_then(|id| records.iter().find(|r| r.id == id));

        match (event, record) {
            (WorkerEvent::CacheCleared { removed }, _) => {
                progress.set_message(format!("cleared {} cached images", removed));
            }
            (WorkerEvent::Metadata { .. }, Some(record)) => {
                progress.set_message(record.title.clone());
            }
            (WorkerEvent::Image { .. }, Some(record)) => {
                progress.println(self.row(record));
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gallery::record::Enrichment;

    fn record() -> Record {
        Record::new("42", "http://x/42", "Song").with_enrichment(Enrichment {
            image_url: "http://img/42.jpg".into(),
            description: "d".into(),
            attribution: "Spotify".into(),
            artist: "Artist".into(),
            audio_url: "http://audio/42".into(),
        })
    }

    #[test]
    fn test_row_shows_audio_link() {
        let view = TerminalView::new(ImageCache::new(PathBuf::from("/tmp/musicdash")));
        let row = view.row(&record().with_image_status(EnrichmentStatus::Ready));

        assert!(row.contains("Song"));
        assert!(row.contains("Artist (Spotify)"));
        assert!(row.contains("http://audio/42"));
        assert!(row.contains("/tmp/musicdash/42"));
    }

    #[test]
    fn test_row_without_enrichment() {
        let view = TerminalView::new(ImageCache::new(PathBuf::from("/tmp/musicdash")));
        let failed = Record::new("7", "http://x/7", "Other")
            .with_metadata_status(EnrichmentStatus::Failed("timeout".into()))
            .with_image_status(EnrichmentStatus::Failed("no image url".into()));

        let row = view.row(&failed);

        assert!(row.contains("no image: no image url"));
        assert!(!row.contains("Listen:"));
    }
}
