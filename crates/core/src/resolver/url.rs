//! URL shape checks for supported sources.

use once_cell::sync::Lazy;
use regex_lite::Regex;

static WATCH_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:https?://)?(?:www\.|m\.|music\.)?youtube\.com/(?:watch\?(?:[^#]*&)?v=|shorts/|embed/|live/|v/)([A-Za-z0-9_-]+)",
    )
    .expect("valid watch url regex")
});

static SHORT_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:https?://)?youtu\.be/([A-Za-z0-9_-]+)").expect("valid short url regex")
});

/// Extracts the video id from a supported URL.
pub fn extract_video_id(url: &str) -> Option<&str> {
    let url = url.trim();
    if url.chars().any(char::is_whitespace) {
        return None;
    }
    WATCH_URL
        .captures(url)
        .or_else(|| SHORT_URL.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Whether `url` has the shape of a supported video URL.
pub fn is_supported_url(url: &str) -> bool {
    extract_video_id(url).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url() {
        assert_eq!(extract_video_id("https://youtu.be/validid"), Some("validid"));
        assert_eq!(
            extract_video_id("youtu.be/dQw4w9WgXcQ?t=42"),
            Some("dQw4w9WgXcQ")
        );
    }

    #[test]
    fn test_watch_url() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?feature=share&v=abc_-123"),
            Some("abc_-123")
        );
        assert_eq!(
            extract_video_id("https://music.youtube.com/watch?v=XYZ&list=PL1"),
            Some("XYZ")
        );
        assert_eq!(
            extract_video_id("http://m.youtube.com/shorts/short01"),
            Some("short01")
        );
    }

    #[test]
    fn test_rejected_urls() {
        assert!(!is_supported_url(""));
        assert!(!is_supported_url("   "));
        assert!(!is_supported_url("not a url"));
        assert!(!is_supported_url("https://vimeo.com/12345"));
        assert!(!is_supported_url("https://youtube.com/"));
        assert!(!is_supported_url("https://youtu.be/"));
        assert!(!is_supported_url("https://evil.example/youtu.be/abc"));
        assert!(!is_supported_url("https://youtu.be/abc def"));
    }

    #[test]
    fn test_surrounding_whitespace_is_ignored() {
        assert!(is_supported_url("  https://youtu.be/validid \n"));
    }
}
