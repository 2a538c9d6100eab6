//! Resolver module for turning a video URL into an audio byte stream.
//!
//! The `Resolver` trait is the only thing the conversion pipeline depends
//! on. `YtDlpResolver` implements it by asking `yt-dlp` for the metadata of
//! the best audio-only format and streaming that format's direct URL over
//! HTTP.
//!
//! # Example
//!
//! ```ignore
//! use tunegrab_core::resolver::{Resolver, ResolverConfig, YtDlpResolver};
//!
//! let resolver = YtDlpResolver::new(ResolverConfig::default())?;
//! resolver.validate().await?;
//!
//! let source = resolver.resolve("https://youtu.be/dQw4w9WgXcQ").await?;
//! println!("{} ({})", source.title, source.container);
//!
//! let stream = resolver.open_audio_stream(&source).await?;
//! println!("size hint: {:?}", stream.total_bytes);
//! ```

mod config;
mod error;
mod traits;
mod types;
mod url;
mod ytdlp;

pub use config::ResolverConfig;
pub use error::ResolverError;
pub use traits::Resolver;
pub use types::{AudioStream, ResolvedSource};
pub use url::{extract_video_id, is_supported_url};
pub use ytdlp::YtDlpResolver;
