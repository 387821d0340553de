//! CLI module for musicdash

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
pub mod view;

#[derive(Parser, Debug)]
#[command(name = "musicdash", about = "Browse your music listens with cover art")]
#[command(version, author)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Session and location settings shared by all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Graph API access token
    #[arg(long, global = true, env = "GRAPH_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    /// Token expiry as a unix timestamp (0 = never)
    #[arg(long, global = true, env = "GRAPH_ACCESS_EXPIRES")]
    pub expires_at: Option<i64>,

    /// Graph API endpoint (overrides the config file)
    #[arg(long, global = true, env = "GRAPH_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Image cache directory (overrides the config file)
    #[arg(long, global = true, env = "MUSICDASH_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch your music listens, enrich them and cache their cover art
    Gallery {
        /// Number of consecutive refresh cycles to run
        #[arg(long, default_value = "1")]
        refreshes: u32,
    },

    /// Show the name and picture of the signed-in user
    Profile,

    /// Show one song's metadata and its audio link
    Song {
        /// Graph object id of the song
        id: String,
    },

    /// Delete cached cover images
    ClearCache,

    /// Show or change stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Store the Graph API endpoint
    SetEndpoint {
        /// Base URL, e.g. https://graph.facebook.com
        url: String,
    },

    /// Store the image cache directory
    SetCacheDir {
        path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_parses() {
        let cli = Cli::try_parse_from(["musicdash", "--access-token", "abc"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.global.access_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_song_takes_id() {
        let cli = Cli::try_parse_from(["musicdash", "song", "42"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Song { id }) if id == "42"));
    }

    #[test]
    fn test_gallery_refreshes() {
        let cli = Cli::try_parse_from(["musicdash", "gallery", "--refreshes", "3"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Gallery { refreshes: 3 })));
    }
}
