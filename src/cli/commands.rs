//! CLI command handlers

use anyhow::{Context, Result};
use clap_complete::generate;
use colored::Colorize;
use std::io;
use std::sync::Arc;
use tracing::debug;

use super::view::TerminalView;
use super::{ConfigAction, GlobalArgs};
use crate::cache::{ImageCache, clear_image_cache};
use crate::config::{Config, Overrides};
use crate::gallery::{Enricher, GalleryController};
use crate::graph::{GraphClient, Session};

/// Effective config: stored file plus command-line / environment overrides
fn load_config(global: &GlobalArgs) -> Result<Config> {
    let config = Config::load()?.with_overrides(Overrides {
        endpoint: global.endpoint.clone(),
        cache_dir: global.cache_dir.clone(),
    });
    debug!("Using endpoint {} and cache {}", config.endpoint, config.cache_dir.display());
    Ok(config)
}

/// Build the session every Graph call runs under
fn session(global: &GlobalArgs) -> Result<Session> {
    let token = global.access_token.as_deref().unwrap_or_default();
    let session = Session::new(token, global.expires_at);

    if !session.is_valid() {
        anyhow::bail!(
            "No valid Graph session. Pass --access-token or set GRAPH_ACCESS_TOKEN \
             (and GRAPH_ACCESS_EXPIRES if the token expires)."
        );
    }
    if let Some(expiry) = session.expires_at() {
        debug!("Access token expires at {}", expiry);
    }
    Ok(session)
}

fn enricher(global: &GlobalArgs, config: &Config) -> Result<Enricher> {
    let client = GraphClient::new(&config.endpoint, session(global)?)?;
    let cache = ImageCache::new(config.cache_dir.clone());
    Ok(Enricher::new(Arc::new(client), cache))
}

/// Handle the `gallery` command
pub async fn gallery(global: &GlobalArgs, refreshes: u32) -> Result<()> {
    let config = load_config(global)?;
    let enricher = enricher(global, &config)?;
    let mut view = TerminalView::new(enricher.cache().clone());
    let mut controller = GalleryController::new(enricher);

    println!("{}", "Fetching music listens...".cyan());

    for cycle in 1..=refreshes.max(1) {
        debug!("Refresh cycle {}", cycle);
        controller
            .refresh(&mut view)
            .await
            .context("Failed to fetch music listens")?;
        controller.run_until_idle(&mut view).await;
    }

    view.finish(&controller.records());
    controller.stop();
    Ok(())
}

/// Handle the `profile` command
pub async fn profile(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;
    let enricher = enricher(global, &config)?;

    let profile = enricher
        .fetch_profile()
        .await
        .context("Failed to fetch profile")?;

    println!("{} {}", "Signed in as".green(), profile.name.bold());
    match profile.picture_url {
        Some(url) => println!("  Picture: {}", url),
        None => println!("  {}", "No profile picture".yellow()),
    }
    Ok(())
}

/// Handle the `song` command
pub async fn song(global: &GlobalArgs, id: &str) -> Result<()> {
    let config = load_config(global)?;
    let enricher = enricher(global, &config)?;

    let song = enricher
        .fetch_metadata(id)
        .await
        .with_context(|| format!("Failed to fetch song {}", id))?;

    println!("{} {}", song.artist.bold(), format!("({})", song.attribution).dimmed());
    if !song.description.is_empty() {
        println!("  {}", song.description);
    }
    println!("  Listen: {}", song.audio_url.cyan());
    println!("  Image: {}", song.image_url);

    let cached = enricher.cache().image_path(id);
    if cached.exists() {
        println!("  Cached: {}", cached.display());
    }
    Ok(())
}

/// Handle the `clear-cache` command
pub async fn clear_cache(global: &GlobalArgs) -> Result<()> {
    let config = load_config(global)?;

    let removed = clear_image_cache(&config.cache_dir)
        .await
        .with_context(|| format!("Failed to clear {}", config.cache_dir.display()))?;

    println!(
        "Removed {} cached image(s) from {}",
        removed,
        config.cache_dir.display()
    );
    Ok(())
}

/// Handle the `config` command
pub fn config(global: &GlobalArgs, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(global)?;
            println!("{}", "Configuration".green().bold());
            println!("  File: {}", Config::config_path()?.display());
            println!("  Endpoint: {}", config.endpoint);
            println!("  Cache: {}", config.cache_dir.display());
        }
        ConfigAction::SetEndpoint { url } => {
            url::Url::parse(&url).with_context(|| format!("Invalid endpoint {}", url))?;
            let mut config = Config::load()?;
            config.endpoint = url;
            config.save()?;
            println!("Endpoint set to {}", config.endpoint.cyan());
        }
        ConfigAction::SetCacheDir { path } => {
            let mut config = Config::load()?;
            config.cache_dir = path;
            config.save()?;
            println!("Cache directory set to {}", config.cache_dir.display());
        }
    }
    Ok(())
}

/// Handle the `completion` command
pub fn completion(shell: clap_complete::Shell) {
    let mut cmd = <super::Cli as clap::CommandFactory>::command();
    generate(shell, &mut cmd, "musicdash", &mut io::stdout());
}
