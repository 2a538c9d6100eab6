use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::resolver::ResolverConfig;
use crate::staging::StagingConfig;
use crate::transcoder::TranscoderConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub resolver: ResolverConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound for JSON request bodies.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    3000
}

fn default_max_body_bytes() -> usize {
    64 * 1024
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.server.max_body_bytes, 64 * 1024);
    }

    #[test]
    fn test_deserialize_with_default_server() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
    }

    #[test]
    fn test_deserialize_resolver_and_transcoder() {
        let toml = r#"
[resolver]
yt_dlp_path = "/usr/local/bin/yt-dlp"
format = "bestaudio"

[transcoder]
ffmpeg_log_level = "error"
timeout_secs = 600
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.resolver.yt_dlp_path.to_str().unwrap(),
            "/usr/local/bin/yt-dlp"
        );
        assert_eq!(config.resolver.format, "bestaudio");
        assert_eq!(config.transcoder.ffmpeg_log_level, "error");
        assert_eq!(config.transcoder.timeout_secs, Some(600));
    }

    #[test]
    fn test_config_serialization_roundtrip_keeps_staging() {
        let config = Config::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.staging.prefix, config.staging.prefix);
        assert_eq!(parsed.staging.temp_dir, config.staging.temp_dir);
    }
}
