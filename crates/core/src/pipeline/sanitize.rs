//! Filename derivation from source titles.

use crate::transcoder::AudioFormat;

/// Replaces every character outside `[A-Za-z0-9]` with `_` and lowercases.
///
/// Each input `char` maps to exactly one output character, so the result
/// matches `^[a-z0-9_]*$` and applying it twice changes nothing.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// Download filename for a title in the given format.
pub fn suggested_filename(title: &str, format: AudioFormat) -> String {
    format!("{}.{}", sanitize_title(title), format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_clean(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    }

    #[test]
    fn test_sanitize_examples() {
        assert_eq!(sanitize_title("My Song!"), "my_song_");
        assert_eq!(sanitize_title("AC/DC - T.N.T."), "ac_dc___t_n_t_");
        assert_eq!(sanitize_title(""), "");
        assert_eq!(sanitize_title("Beyoncé 2024"), "beyonc__2024");
    }

    #[test]
    fn test_sanitize_is_idempotent_and_clean() {
        let titles = [
            "My Song!",
            "  leading spaces",
            "日本語のタイトル",
            "emoji 🎵 title",
            "already_clean_123",
            "Tab\tand\nnewline",
        ];
        for title in titles {
            let once = sanitize_title(title);
            assert!(is_clean(&once), "{:?} -> {:?}", title, once);
            assert_eq!(sanitize_title(&once), once);
            assert_eq!(once.chars().count(), title.chars().count());
        }
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(suggested_filename("My Song!", AudioFormat::Mp3), "my_song_.mp3");
    }
}
