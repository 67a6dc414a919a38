//! Track information as reported by `yt-dlp`, and the lookup that produces it.

use std::time::Duration;

use serde::Deserialize;
use tokio::process::Command;
use tracing::{info, warn};
use url::Url;

use super::music_manager::{MusicError, MusicResult};

/// Unified representation of metadata for a playable track.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackMetadata {
    /// The title of the track.
    pub title: String,
    /// The page URL handed back to yt-dlp for streaming.
    pub url: Option<String>,
    pub duration: Option<Duration>,
    /// Locator of the thumbnail drawn on the now-playing card.
    pub thumbnail: Option<String>,
    /// The name of the user who requested the track.
    pub requested_by: Option<String>,
}

impl Default for TrackMetadata {
    fn default() -> Self {
        Self {
            title: "Unknown Track".to_string(),
            url: None,
            duration: None,
            thumbnail: None,
            requested_by: None,
        }
    }
}

/// The subset of `yt-dlp -j` output we care about
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    id: Option<String>,
    title: Option<String>,
    webpage_url: Option<String>,
    duration: Option<f64>,
    thumbnail: Option<String>,
    extractor_key: Option<String>,
}

impl TrackMetadata {
    /// Parse the first JSON line printed by `yt-dlp -j`.
    ///
    /// Empty output means the lookup matched nothing and yields `Ok(None)`.
    pub fn from_ytdlp_output(stdout: &str, requested_by: &str) -> MusicResult<Option<Self>> {
        let Some(line) = stdout.lines().map(str::trim).find(|line| !line.is_empty()) else {
            return Ok(None);
        };

        let info: YtDlpInfo = serde_json::from_str(line).map_err(|e| {
            MusicError::AudioSourceError(format!("Failed to parse video metadata: {}", e))
        })?;

        // YouTube's hqdefault is always a 4:3 JPEG, which suits the square thumbnail box
        let thumbnail = match (info.extractor_key.as_deref(), info.id.as_deref()) {
            (Some("Youtube"), Some(id)) => Some(format!("https://img.youtube.com/vi/{}/hqdefault.jpg", id)),
            _ => info.thumbnail,
        };

        Ok(Some(Self {
            title: info.title.unwrap_or_else(|| "Unknown Title".to_string()),
            url: info.webpage_url,
            duration: info
                .duration
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(Duration::from_secs_f64),
            thumbnail,
            requested_by: Some(requested_by.to_string()),
        }))
    }
}

/// Checks whether the query is a web link rather than search text
pub fn is_url(query: &str) -> bool {
    Url::parse(query).is_ok_and(|url| matches!(url.scheme(), "http" | "https"))
}

/// What to hand to yt-dlp: links as-is, anything else as a single-result search.
pub fn lookup_target(query: &str, search_prefix: &str) -> String {
    if is_url(query) {
        query.to_string()
    } else {
        format!("{}:{}", search_prefix, query)
    }
}

/// Resolve a link or search query to the first matching track using `yt-dlp`.
pub async fn resolve(
    query: &str,
    search_prefix: &str,
    requested_by: &str,
) -> MusicResult<Option<TrackMetadata>> {
    let target = lookup_target(query, search_prefix);
    info!("Resolving track metadata for: {}", target);

    let output = Command::new("yt-dlp")
        .args(["-j", "--no-playlist", &target])
        .output()
        .await
        .map_err(|e| MusicError::AudioSourceError(format!("Failed to run yt-dlp: {}", e)))?;

    if !output.status.success() {
        warn!(
            "yt-dlp exited with {} for '{}': {}",
            output.status,
            target,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    TrackMetadata::from_ytdlp_output(&String::from_utf8_lossy(&output.stdout), requested_by)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use test_case::test_case;

    const YOUTUBE_JSON: &str = r#"{"id": "dQw4w9WgXcQ", "title": "Never Gonna Give You Up", "webpage_url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ", "duration": 212.0, "thumbnail": "https://i.ytimg.com/vi_webp/dQw4w9WgXcQ/maxresdefault.webp", "extractor_key": "Youtube"}"#;

    /// Tests parsing a YouTube result, including the hqdefault thumbnail rewrite.
    #[test]
    fn test_parse_youtube_output() {
        let metadata = TrackMetadata::from_ytdlp_output(YOUTUBE_JSON, "alice")
            .unwrap()
            .unwrap();

        assert_eq!(
            metadata,
            TrackMetadata {
                title: "Never Gonna Give You Up".to_string(),
                url: Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()),
                duration: Some(Duration::from_secs(212)),
                thumbnail: Some(
                    "https://img.youtube.com/vi/dQw4w9WgXcQ/hqdefault.jpg".to_string()
                ),
                requested_by: Some("alice".to_string()),
            }
        );
    }

    #[test]
    fn test_parse_other_extractor_keeps_thumbnail() {
        let json = r#"{"id": "123", "title": "Live set", "webpage_url": "https://soundcloud.com/a/b", "thumbnail": "https://i1.sndcdn.com/artworks-123.jpg", "extractor_key": "Soundcloud"}"#;
        let metadata = TrackMetadata::from_ytdlp_output(json, "bob").unwrap().unwrap();

        assert_eq!(
            metadata.thumbnail.as_deref(),
            Some("https://i1.sndcdn.com/artworks-123.jpg")
        );
        assert_eq!(metadata.duration, None);
    }

    #[test]
    fn test_parse_missing_title() {
        let metadata = TrackMetadata::from_ytdlp_output(r#"{"webpage_url": "https://x.test/1"}"#, "bob")
            .unwrap()
            .unwrap();
        assert_eq!(metadata.title, "Unknown Title");
    }

    #[test_case(""; "empty")]
    #[test_case("\n  \n"; "blank lines")]
    fn test_parse_empty_output_is_no_match(stdout: &str) {
        assert_matches!(TrackMetadata::from_ytdlp_output(stdout, "alice"), Ok(None));
    }

    #[test]
    fn test_parse_garbage_output() {
        assert_matches!(
            TrackMetadata::from_ytdlp_output("ERROR: something broke", "alice"),
            Err(MusicError::AudioSourceError(_))
        );
    }

    #[test_case("https://youtu.be/dQw4w9WgXcQ" => "https://youtu.be/dQw4w9WgXcQ"; "link")]
    #[test_case("never gonna give you up" => "ytsearch:never gonna give you up"; "search")]
    #[test_case("artist: song" => "ytsearch:artist: song"; "colon is not a scheme")]
    fn test_lookup_target(query: &str) -> String {
        lookup_target(query, "ytsearch")
    }
}
