use std::collections::HashMap;

use tracing::debug;

use shared::types::{Platform, PostDraft};

use crate::metadata::MetadataExtractor;
use crate::session::Session;

pub const ANONYMOUS: &str = "Anonymous";

/// Fields of an add or update form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSubmission {
    /// Present on update.
    pub id: Option<String>,
    pub url: String,
    pub comment: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    MissingField(&'static str),
    InvalidUrl,
}

impl SubmissionError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "MISSING_FIELD",
            Self::InvalidUrl => "INVALID_URL",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::InvalidUrl => "The link must be an http(s) URL".to_string(),
        }
    }
}

impl PostSubmission {
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self, SubmissionError> {
        let non_empty = |key: &str| {
            fields
                .get(key)
                .map(|v| v.trim())
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let url = non_empty("url").ok_or(SubmissionError::MissingField("url"))?;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SubmissionError::InvalidUrl);
        }

        Ok(Self {
            id: non_empty("id"),
            url,
            comment: fields.get("comment").cloned().unwrap_or_default(),
            username: non_empty("username"),
        })
    }
}

/// Name stamped on a post: the signed-in user, then the submitted name,
/// then [`ANONYMOUS`].
pub fn resolve_username(session: Option<&Session>, submitted: Option<&str>) -> String {
    session
        .and_then(|s| s.user.username())
        .or(submitted.filter(|s| !s.trim().is_empty()))
        .unwrap_or(ANONYMOUS)
        .to_string()
}

/// Classify the link and look up its metadata. Runs on every add and update.
pub async fn build_draft(
    submission: &PostSubmission,
    session: Option<&Session>,
    extractor: &MetadataExtractor,
) -> PostDraft {
    let platform = Platform::classify(&submission.url);
    let metadata = extractor.extract(&submission.url).await;
    debug!("Submission for {} classified as {}", submission.url, platform);

    PostDraft {
        url: submission.url.clone(),
        comment: submission.comment.clone(),
        username: resolve_username(session, submission.username.as_deref()),
        platform,
        title: metadata.title,
        thumbnail: metadata.thumbnail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::types::UserRecord;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn session_for(username: &str) -> Session {
        let user: UserRecord =
            serde_json::from_value(serde_json::json!({ "id": "u1", "username": username }))
                .unwrap();
        Session {
            token: "t".into(),
            user,
        }
    }

    #[test]
    fn url_is_required() {
        let err = PostSubmission::from_fields(&fields(&[("comment", "hi")])).unwrap_err();
        assert_eq!(err, SubmissionError::MissingField("url"));
        let err = PostSubmission::from_fields(&fields(&[("url", "   ")])).unwrap_err();
        assert_eq!(err, SubmissionError::MissingField("url"));
    }

    #[test]
    fn non_http_url_is_rejected() {
        let err = PostSubmission::from_fields(&fields(&[("url", "javascript:alert(1)")]))
            .unwrap_err();
        assert_eq!(err, SubmissionError::InvalidUrl);
    }

    #[test]
    fn fields_are_read() {
        let sub = PostSubmission::from_fields(&fields(&[
            ("id", "rec1"),
            ("url", " https://youtu.be/dQw4w9WgXcQ "),
            ("comment", "  spaced  "),
            ("username", ""),
        ]))
        .unwrap();
        assert_eq!(sub.id.as_deref(), Some("rec1"));
        assert_eq!(sub.url, "https://youtu.be/dQw4w9WgXcQ");
        assert_eq!(sub.comment, "  spaced  ");
        assert_eq!(sub.username, None);
    }

    #[test]
    fn session_username_wins() {
        let s = session_for("alice");
        assert_eq!(resolve_username(Some(&s), Some("bob")), "alice");
    }

    #[test]
    fn submitted_name_is_used_without_session() {
        assert_eq!(resolve_username(None, Some("bob")), "bob");
    }

    #[test]
    fn falls_back_to_anonymous() {
        assert_eq!(resolve_username(None, None), ANONYMOUS);
        assert_eq!(resolve_username(None, Some("  ")), ANONYMOUS);

        let nameless = session_for("");
        assert_eq!(resolve_username(Some(&nameless), None), ANONYMOUS);
    }
}
