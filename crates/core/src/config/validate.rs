use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Staging prefix is not empty
/// - External tool paths are not empty
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.staging.prefix.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "staging.prefix cannot be empty".to_string(),
        ));
    }

    let tools = [
        ("resolver.yt_dlp_path", &config.resolver.yt_dlp_path),
        ("transcoder.ffmpeg_path", &config.transcoder.ffmpeg_path),
        ("transcoder.ffprobe_path", &config.transcoder.ffprobe_path),
    ];
    for (name, path) in tools {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "{} cannot be empty",
                name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use std::net::IpAddr;
    use std::path::PathBuf;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
                ..Default::default()
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_empty_prefix_fails() {
        let mut config = Config::default();
        config.staging.prefix = "  ".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_empty_ffmpeg_path_fails() {
        let mut config = Config::default();
        config.transcoder.ffmpeg_path = PathBuf::new();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("transcoder.ffmpeg_path"));
    }
}
