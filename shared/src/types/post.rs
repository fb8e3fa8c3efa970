use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::timestamp;

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// Where a shared link points. Stored on the record at write time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Youtube,
    AppleMusic,
    #[default]
    #[serde(other)]
    Other,
}

impl Platform {
    /// Classify a URL by substring. YouTube is checked before Apple Music.
    pub fn classify(url: &str) -> Self {
        if is_youtube_url(url) {
            Self::Youtube
        } else if url.contains("music.apple.com") {
            Self::AppleMusic
        } else {
            Self::Other
        }
    }

    /// Value stored in the `platform` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "youtube",
            Self::AppleMusic => "apple_music",
            Self::Other => "other",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "youtube" => Some(Self::Youtube),
            "apple_music" => Some(Self::AppleMusic),
            "other" => Some(Self::Other),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `youtube.com` or `youtu.be` anywhere in the string.
pub fn is_youtube_url(url: &str) -> bool {
    url.contains("youtube.com") || url.contains("youtu.be")
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A `music_posts` record as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MusicPost {
    pub id: String,
    #[serde(default)]
    pub collection_id: String,
    #[serde(default)]
    pub collection_name: String,
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated: DateTime<Utc>,

    pub url: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub platform: Platform,
    /// Backend text fields come back as `""` when unset.
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub thumbnail: Option<String>,
}

/// Full field set written on create and update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostDraft {
    pub url: String,
    pub comment: String,
    pub username: String,
    pub platform: Platform,
    pub title: String,
    pub thumbnail: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youtube_wins_over_apple_music() {
        assert_eq!(
            Platform::classify("https://music.apple.com/?ref=youtube.com"),
            Platform::Youtube
        );
    }

    #[test]
    fn unknown_platform_value_reads_as_other() {
        let p: Platform = serde_json::from_str("\"soundcloud\"").unwrap();
        assert_eq!(p, Platform::Other);
    }

    #[test]
    fn parse_matches_as_str() {
        for p in [Platform::Youtube, Platform::AppleMusic, Platform::Other] {
            assert_eq!(Platform::parse(p.as_str()), Some(p));
        }
        assert_eq!(Platform::parse("spotify"), None);
    }
}
