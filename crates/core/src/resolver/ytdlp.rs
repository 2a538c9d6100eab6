//! yt-dlp based resolver implementation.

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use serde::Deserialize;
use std::collections::HashMap;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

use super::config::ResolverConfig;
use super::error::ResolverError;
use super::traits::Resolver;
use super::types::{AudioStream, ResolvedSource};
use super::url::is_supported_url;

/// stderr fragments yt-dlp prints for sources that exist as URLs but cannot be fetched.
const UNAVAILABLE_MARKERS: &[&str] = &[
    "Video unavailable",
    "Private video",
    "This video is not available",
    "This video has been removed",
    "members-only",
    "Sign in to confirm your age",
    "not available in your country",
    "Incomplete YouTube ID",
];

/// stderr fragments for URLs yt-dlp does not recognize at all.
const UNSUPPORTED_MARKERS: &[&str] = &["Unsupported URL", "is not a valid URL"];

/// Resolver backed by the `yt-dlp` command line tool.
pub struct YtDlpResolver {
    config: ResolverConfig,
    client: reqwest::Client,
}

impl YtDlpResolver {
    /// Creates a new resolver with the given configuration.
    pub fn new(config: ResolverConfig) -> Result<Self, ResolverError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { config, client })
    }

    /// Creates a resolver with default configuration.
    pub fn with_defaults() -> Result<Self, ResolverError> {
        Self::new(ResolverConfig::default())
    }

    /// Builds yt-dlp arguments for a metadata dump.
    fn build_args(&self, url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "-f".to_string(),
            self.config.format.clone(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push("--".to_string());
        args.push(url.to_string());
        args
    }

    /// Maps a failed yt-dlp run to an error.
    fn classify_failure(url: &str, code: Option<i32>, stderr: &str) -> ResolverError {
        let stderr = stderr.trim();
        let first_error = stderr
            .lines()
            .find(|l| l.starts_with("ERROR:"))
            .map(|l| l.trim_start_matches("ERROR:").trim().to_string());

        if UNSUPPORTED_MARKERS.iter().any(|m| stderr.contains(m)) {
            return ResolverError::UnsupportedUrl {
                url: url.to_string(),
            };
        }
        if UNAVAILABLE_MARKERS.iter().any(|m| stderr.contains(m)) {
            return ResolverError::unavailable(
                first_error.unwrap_or_else(|| "source unavailable".to_string()),
            );
        }

        ResolverError::resolve_failed(
            first_error.unwrap_or_else(|| format!("yt-dlp exited with code: {:?}", code)),
            if stderr.is_empty() {
                None
            } else {
                Some(stderr.to_string())
            },
        )
    }

    /// Parses yt-dlp JSON output into a ResolvedSource.
    fn parse_dump_output(url: &str, output: &str) -> Result<ResolvedSource, ResolverError> {
        #[derive(Deserialize)]
        struct DumpOutput {
            title: Option<String>,
            url: Option<String>,
            ext: Option<String>,
            filesize: Option<u64>,
            filesize_approx: Option<u64>,
            duration: Option<f64>,
            #[serde(default)]
            http_headers: HashMap<String, String>,
            #[serde(default)]
            requested_formats: Vec<DumpFormat>,
        }

        #[derive(Deserialize)]
        struct DumpFormat {
            url: Option<String>,
            ext: Option<String>,
            acodec: Option<String>,
            filesize: Option<u64>,
            filesize_approx: Option<u64>,
            #[serde(default)]
            http_headers: HashMap<String, String>,
        }

        let dump: DumpOutput =
            serde_json::from_str(output).map_err(|e| ResolverError::ParseError {
                reason: format!("Failed to parse yt-dlp output: {}", e),
            })?;

        let title = dump
            .title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ResolverError::ParseError {
                reason: "yt-dlp output has no title".to_string(),
            })?;

        // A merged selection lists its parts; take the audio one.
        let audio_part = dump
            .requested_formats
            .into_iter()
            .find(|f| f.acodec.as_deref().is_some_and(|c| c != "none"));

        let (media_url, container, size_hint, http_headers) = match audio_part {
            Some(part) => (
                part.url,
                part.ext,
                part.filesize.or(part.filesize_approx),
                part.http_headers,
            ),
            None => (
                dump.url,
                dump.ext,
                dump.filesize.or(dump.filesize_approx),
                dump.http_headers,
            ),
        };

        let media_url = media_url.ok_or_else(|| ResolverError::ParseError {
            reason: "yt-dlp output has no media URL".to_string(),
        })?;

        Ok(ResolvedSource {
            source_url: url.to_string(),
            title,
            container: container.unwrap_or_else(|| "m4a".to_string()),
            media_url: Some(media_url),
            http_headers,
            size_hint,
            duration_secs: dump.duration,
        })
    }
}

#[async_trait]
impl Resolver for YtDlpResolver {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn resolve(&self, url: &str) -> Result<ResolvedSource, ResolverError> {
        let url = url.trim();
        if !is_supported_url(url) {
            return Err(ResolverError::UnsupportedUrl {
                url: url.to_string(),
            });
        }

        debug!(url, "Resolving source with yt-dlp");
        let output = Command::new(&self.config.yt_dlp_path)
            .args(self.build_args(url))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    ResolverError::ToolNotFound {
                        path: self.config.yt_dlp_path.clone(),
                    }
                } else {
                    ResolverError::Io(e)
                }
            })?;

        if !output.status.success() {
            return Err(Self::classify_failure(
                url,
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let source = Self::parse_dump_output(url, &stdout)?;
        info!(
            url,
            title = %source.title,
            container = %source.container,
            size_hint = ?source.size_hint,
            "Resolved source"
        );
        Ok(source)
    }

    async fn open_audio_stream(
        &self,
        source: &ResolvedSource,
    ) -> Result<AudioStream, ResolverError> {
        let media_url = source
            .media_url
            .as_deref()
            .ok_or_else(|| ResolverError::ParseError {
                reason: "resolved source has no media URL".to_string(),
            })?;

        let mut request = self.client.get(media_url);
        for (name, value) in &source.http_headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ResolverError::HttpStatus {
                status: response.status().as_u16(),
            });
        }

        let total_bytes = response.content_length().or(source.size_hint);
        let chunks = response
            .bytes_stream()
            .map_err(std::io::Error::other)
            .boxed();

        Ok(AudioStream::new(total_bytes, chunks))
    }

    async fn validate(&self) -> Result<(), ResolverError> {
        let result = Command::new(&self.config.yt_dlp_path)
            .arg("--version")
            .output()
            .await;

        match result {
            Ok(output) if output.status.success() => Ok(()),
            Ok(output) => Err(ResolverError::resolve_failed(
                "yt-dlp --version failed",
                Some(String::from_utf8_lossy(&output.stderr).to_string()),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ResolverError::ToolNotFound {
                    path: self.config.yt_dlp_path.clone(),
                })
            }
            Err(e) => Err(ResolverError::Io(e)),
        }
    }
}
