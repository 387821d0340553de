//! Translating Graph responses into records, enrichments and cached images

use std::io;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

use super::record::{Enrichment, Record};
use crate::cache::ImageCache;
use crate::graph::{
    FetchError, GraphApi, ListenEntry, ListenEnvelope, Profile, ProfileResponse, SongObject,
};

/// Graph path listing the user's music listens
pub const LISTENS_PATH: &[&str] = &["me", "music.listens"];

/// Graph path of the current user
pub const PROFILE_PATH: &[&str] = &["me"];

/// Issues the Graph calls needed to build and enrich the gallery
#[derive(Clone)]
pub struct Enricher {
    api: Arc<dyn GraphApi>,
    cache: ImageCache,
}

impl Enricher {
    pub fn new(api: Arc<dyn GraphApi>, cache: ImageCache) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Fetch the user's listens as unenriched records
    pub async fn fetch_listens(&self) -> Result<Vec<Record>, FetchError> {
        let body = self.api.request(LISTENS_PATH, &[]).await?;
        parse_listen_list(&body)
    }

    /// Fetch the song object behind a listen
    pub async fn fetch_metadata(&self, id: &str) -> Result<Enrichment, FetchError> {
        let body = self.api.request(&[id], &[]).await?;
        parse_song_object(&body)
    }

    /// Download `url` and store it at `dest`
    pub async fn fetch_and_store_image(&self, url: &str, dest: &Path) -> Result<u64, FetchError> {
        let body = self.api.download(url).await?;
        self.cache.store(dest, body).await
    }

    pub async fn clear_image_cache(&self) -> io::Result<usize> {
        self.cache.clear().await
    }

    /// Fetch the user's name and picture
    pub async fn fetch_profile(&self) -> Result<Profile, FetchError> {
        let body = self
            .api
            .request(PROFILE_PATH, &[("fields", "name,picture")])
            .await?;
        let response: ProfileResponse = serde_json::from_str(&body)?;
        Ok(response.into())
    }
}

/// Parse a `me/music.listens` body into records, in listen order
///
/// Entries that do not have the expected `data.song.{id,url,title}` shape
/// are skipped. Only an envelope without a `data` array is an error.
pub fn parse_listen_list(json: &str) -> Result<Vec<Record>, FetchError> {
    let envelope: ListenEnvelope = serde_json::from_str(json)?;
    let total = envelope.data.len();

    let records: Vec<Record> = envelope
        .data
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ListenEntry>(value) {
            Ok(entry) => {
                let song = entry.data.song;
                Some(Record::new(&song.id, &song.url, &song.title))
            }
            Err(e) => {
                debug!("Skipping malformed listen: {}", e);
                None
            }
        })
        .collect();

    debug!("Parsed {} of {} listens", records.len(), total);
    Ok(records)
}

/// Parse a song object into an enrichment
///
/// Either every field is present and the enrichment is returned, or
/// nothing is.
pub fn parse_song_object(json: &str) -> Result<Enrichment, FetchError> {
    let song: SongObject = serde_json::from_str(json)?;

    let image_url = song
        .image
        .into_iter()
        .next()
        .ok_or(FetchError::MissingField("image[0].url"))?
        .url;
    let artist = song
        .data
        .musician
        .into_iter()
        .next()
        .ok_or(FetchError::MissingField("data.musician[0].name"))?
        .name;
    let audio_url = song
        .audio
        .into_iter()
        .next()
        .ok_or(FetchError::MissingField("audio[0].url"))?
        .url;

    Ok(Enrichment {
        image_url,
        description: song.description,
        attribution: song.site_name,
        artist,
        audio_url,
    })
}
