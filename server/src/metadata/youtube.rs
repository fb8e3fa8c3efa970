use regex::Regex;
use serde::Deserialize;

/// Medium quality thumbnail for a video id.
pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{}/mqdefault.jpg", video_id)
}

/// Subset of the oEmbed JSON document.
#[derive(Debug, Deserialize)]
pub struct OEmbedResponse {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub thumbnail_url: String,
}

/// Recognises `watch?v=`, `&v=`, `/v/`, `/embed/`, `/u/x/` and `youtu.be/`
/// links. Only 11-character ids are accepted.
pub struct VideoIdMatcher(Regex);

impl VideoIdMatcher {
    pub fn new() -> Result<Self, regex::Error> {
        Regex::new(r"^.*(youtu.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*").map(Self)
    }

    pub fn video_id<'a>(&self, url: &'a str) -> Option<&'a str> {
        let id = self.0.captures(url)?.get(2)?.as_str();
        (id.len() == 11).then_some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ID: &str = "dQw4w9WgXcQ";

    fn ids() -> VideoIdMatcher {
        VideoIdMatcher::new().unwrap()
    }

    #[test]
    fn watch_url() {
        let url = format!("https://www.youtube.com/watch?v={}", ID);
        assert_eq!(ids().video_id(&url), Some(ID));
    }

    #[test]
    fn watch_url_with_extra_params() {
        let url = format!("https://www.youtube.com/watch?v={}&t=42s", ID);
        assert_eq!(ids().video_id(&url), Some(ID));
    }

    #[test]
    fn ampersand_v_param() {
        let url = format!("https://www.youtube.com/watch?feature=share&v={}", ID);
        assert_eq!(ids().video_id(&url), Some(ID));
    }

    #[test]
    fn short_link() {
        let url = format!("https://youtu.be/{}?si=abc", ID);
        assert_eq!(ids().video_id(&url), Some(ID));
    }

    #[test]
    fn embed_and_v_paths() {
        for url in [
            format!("https://www.youtube.com/embed/{}", ID),
            format!("https://www.youtube.com/v/{}", ID),
        ] {
            assert_eq!(ids().video_id(&url), Some(ID), "{}", url);
        }
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert_eq!(ids().video_id("https://youtu.be/short"), None);
        assert_eq!(
            ids().video_id("https://www.youtube.com/watch?v=waytoolongvideoid"),
            None
        );
    }

    #[test]
    fn no_marker_no_id() {
        assert_eq!(ids().video_id("https://www.youtube.com/feed/trending"), None);
    }

    #[test]
    fn thumbnail_template() {
        assert_eq!(
            thumbnail_url(ID),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/mqdefault.jpg"
        );
    }
}
