pub mod config;
pub mod metrics;
pub mod pipeline;
pub mod progress;
pub mod resolver;
pub mod service;
pub mod staging;
pub mod testing;
pub mod transcoder;

pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError, ServerConfig,
};
pub use pipeline::{
    sanitize_title, ConversionError, ConversionPipeline, ConversionRequest, ConversionResult,
};
pub use progress::{ProgressPhase, ProgressReporter, ProgressSnapshot, ProgressStore};
pub use resolver::{
    is_supported_url, AudioStream, ResolvedSource, Resolver, ResolverConfig, ResolverError,
    YtDlpResolver,
};
pub use service::{ConversionService, ServiceStatus};
pub use staging::{StagedFile, StagedPurpose, StagingArea, StagingConfig, StagingStats};
pub use transcoder::{
    AudioFormat, FfmpegTranscoder, TranscodeSettings, Transcoder, TranscoderConfig,
    TranscoderError,
};
