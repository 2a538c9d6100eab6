//! Configuration for the resolver module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp based resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Path to the yt-dlp binary.
    #[serde(default = "default_yt_dlp_path")]
    pub yt_dlp_path: PathBuf,

    /// yt-dlp format selector for the audio track.
    #[serde(default = "default_format")]
    pub format: String,

    /// User agent for media requests when yt-dlp does not supply one.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Additional yt-dlp arguments.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_yt_dlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_format() -> String {
    "bestaudio[ext=m4a]/bestaudio/best".to_string()
}

fn default_user_agent() -> String {
    format!("tunegrab/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            yt_dlp_path: default_yt_dlp_path(),
            format: default_format(),
            user_agent: default_user_agent(),
            extra_args: Vec::new(),
        }
    }
}

impl ResolverConfig {
    /// Creates a config with a custom yt-dlp path.
    pub fn with_path(yt_dlp_path: PathBuf) -> Self {
        Self {
            yt_dlp_path,
            ..Default::default()
        }
    }
}
