//! On-disk cover image cache

use futures::StreamExt;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::task;
use tracing::debug;

use crate::graph::{ByteStream, FetchError};
use crate::utils::{cache_file_name, has_image_extension};

/// Suffix of in-progress downloads, never an image extension
const PARTIAL_SUFFIX: &str = ".part";

/// Directory holding one downloaded image per record
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Local path for a record's image, derived from its id
    pub fn image_path(&self, id: &str) -> PathBuf {
        self.dir.join(cache_file_name(id))
    }

    /// Write a downloaded image to `dest`
    pub async fn store(&self, dest: &Path, body: ByteStream) -> Result<u64, FetchError> {
        store_stream(dest, body).await
    }

    /// Delete every image-like file in the cache directory
    pub async fn clear(&self) -> io::Result<usize> {
        clear_image_cache(&self.dir).await
    }
}

/// Stream `body` into a temporary file next to `dest`, then rename it over `dest`
///
/// Readers only ever see a complete file at `dest`. If the stream fails or
/// turns out empty, the temporary file is removed and any previous image at
/// `dest` is left untouched.
pub async fn store_stream(dest: &Path, mut body: ByteStream) -> Result<u64, FetchError> {
    let parent = dest.parent().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} has no parent directory", dest.display()),
        )
    })?;
    fs::create_dir_all(parent).await?;

    let dir = parent.to_path_buf();
    let (file, temp_path) = task::spawn_blocking(move || {
        tempfile::Builder::new()
            .prefix(".download-")
            .suffix(PARTIAL_SUFFIX)
            .tempfile_in(dir)
    })
    .await
    .map_err(io::Error::other)??
    .into_parts();
    let mut file = fs::File::from_std(file);

    // temp_path removes the file on drop, so every early return cleans up
    let mut written: u64 = 0;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    if written == 0 {
        return Err(FetchError::MissingField("image body"));
    }

    file.flush().await?;
    file.sync_all().await?;
    drop(file);

    let target = dest.to_path_buf();
    task::spawn_blocking(move || temp_path.persist(target))
        .await
        .map_err(io::Error::other)?
        .map_err(|e| e.error)?;
    debug!("Stored {} bytes at {}", written, dest.display());
    Ok(written)
}

/// Delete every file in `dir` whose name ends in an image extension
///
/// A missing directory counts as already clear. Returns the number of
/// deleted files.
pub async fn clear_image_cache(dir: &Path) -> io::Result<usize> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e),
    };

    let mut removed = 0;
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }
        if has_image_extension(&entry.file_name().to_string_lossy()) {
            fs::remove_file(entry.path()).await?;
            removed += 1;
        }
    }

    debug!("Cleared {} cached images from {}", removed, dir.display());
    Ok(removed)
}
