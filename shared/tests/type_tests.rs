/// Integration-level tests for the `shared` crate.
///
/// Each section tests one module; unit tests that are tightly coupled to
/// private helpers live inside the modules themselves (see `#[cfg(test)]`
/// blocks in `post.rs`, `timestamp.rs` and `server_config.rs`).
// ---------------------------------------------------------------------------
// Platform classification
// ---------------------------------------------------------------------------
#[cfg(test)]
mod platform_tests {
    use proptest::prelude::*;
    use shared::types::*;

    #[test]
    fn youtube_hosts_classify_as_youtube() {
        for url in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://m.youtube.com/embed/dQw4w9WgXcQ",
        ] {
            assert_eq!(Platform::classify(url), Platform::Youtube, "{}", url);
        }
    }

    #[test]
    fn apple_music_classifies_as_apple_music() {
        assert_eq!(
            Platform::classify("https://music.apple.com/jp/album/foo/123"),
            Platform::AppleMusic
        );
    }

    #[test]
    fn everything_else_is_other() {
        for url in ["https://open.spotify.com/track/1", "", "not a url"] {
            assert_eq!(Platform::classify(url), Platform::Other);
        }
    }

    #[test]
    fn platform_serializes_to_stored_values() {
        assert_eq!(serde_json::to_value(Platform::Youtube).unwrap(), "youtube");
        assert_eq!(
            serde_json::to_value(Platform::AppleMusic).unwrap(),
            "apple_music"
        );
        assert_eq!(serde_json::to_value(Platform::Other).unwrap(), "other");
    }

    proptest! {
        #[test]
        fn classification_is_substring_containment(prefix in ".{0,20}", suffix in ".{0,20}") {
            let yt = format!("{}youtube.com{}", prefix, suffix);
            prop_assert_eq!(Platform::classify(&yt), Platform::Youtube);

            let short = format!("{}youtu.be{}", prefix, suffix);
            prop_assert_eq!(Platform::classify(&short), Platform::Youtube);

            let apple = format!("{}music.apple.com{}", prefix, suffix);
            let expected = if apple.contains("youtube.com") || apple.contains("youtu.be") {
                Platform::Youtube
            } else {
                Platform::AppleMusic
            };
            prop_assert_eq!(Platform::classify(&apple), expected);
        }

        #[test]
        fn urls_without_markers_are_other(s in "[a-z:/.]{0,40}") {
            prop_assume!(!s.contains("youtube.com"));
            prop_assume!(!s.contains("youtu.be"));
            prop_assume!(!s.contains("music.apple.com"));
            prop_assert_eq!(Platform::classify(&s), Platform::Other);
        }
    }
}

// ---------------------------------------------------------------------------
// Post records
// ---------------------------------------------------------------------------
#[cfg(test)]
mod post_tests {
    use shared::types::*;

    const RECORD: &str = r#"{
        "id": "abc123def456ghi",
        "collectionId": "pbc_music",
        "collectionName": "music_posts",
        "created": "2024-05-01 10:00:00.000Z",
        "updated": "2024-05-02 11:30:00.500Z",
        "url": "https://youtu.be/dQw4w9WgXcQ",
        "comment": "classic",
        "username": "alice",
        "platform": "youtube",
        "title": "",
        "thumbnail": "https://img.youtube.com/vi/dQw4w9WgXcQ/mqdefault.jpg"
    }"#;

    #[test]
    fn backend_record_deserializes() {
        let post: MusicPost = serde_json::from_str(RECORD).unwrap();
        assert_eq!(post.id, "abc123def456ghi");
        assert_eq!(post.platform, Platform::Youtube);
        assert_eq!(post.username, "alice");
        assert!(post.thumbnail.is_some());
    }

    #[test]
    fn empty_title_reads_as_none() {
        let post: MusicPost = serde_json::from_str(RECORD).unwrap();
        assert_eq!(post.title, None);
        assert_eq!(post.comment, "classic");
    }

    #[test]
    fn timestamps_serialize_in_backend_form() {
        let post: MusicPost = serde_json::from_str(RECORD).unwrap();
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["created"], "2024-05-01 10:00:00.000Z");
        assert_eq!(json["updated"], "2024-05-02 11:30:00.500Z");
        assert_eq!(json["collectionName"], "music_posts");
    }

    #[test]
    fn draft_always_carries_every_field() {
        let draft = PostDraft {
            url: "https://example.com".into(),
            comment: String::new(),
            username: "Anonymous".into(),
            platform: Platform::Other,
            title: String::new(),
            thumbnail: String::new(),
        };
        let json = serde_json::to_value(&draft).unwrap();
        for key in ["url", "comment", "username", "platform", "title", "thumbnail"] {
            assert!(json.get(key).is_some(), "missing key: {}", key);
        }
        assert_eq!(json["platform"], "other");
    }

    #[test]
    fn list_result_uses_backend_casing() {
        let json = r#"{"page":1,"perPage":50,"totalItems":1,"totalPages":1,"items":[]}"#;
        let list: ListResult<MusicPost> = serde_json::from_str(json).unwrap();
        assert_eq!(list.per_page, 50);
        assert_eq!(list.total_items, 1);
        assert!(list.items.is_empty());
    }
}

// ---------------------------------------------------------------------------
// Session payload
// ---------------------------------------------------------------------------
#[cfg(test)]
mod session_tests {
    use shared::types::*;

    fn sample_payload() -> AuthPayload {
        serde_json::from_str(
            r#"{"token":"a.b.c","model":{"id":"u1","email":"a@example.com","username":"alice","verified":true}}"#,
        )
        .unwrap()
    }

    #[test]
    fn payload_keeps_unknown_model_fields() {
        let p = sample_payload();
        assert_eq!(p.model.extra.get("verified"), Some(&serde_json::json!(true)));
        let back = serde_json::to_value(&p).unwrap();
        assert_eq!(back["model"]["verified"], true);
    }

    #[test]
    fn payload_json_contains_token_and_model() {
        let json = serde_json::to_value(sample_payload()).unwrap();
        assert_eq!(json["token"], "a.b.c");
        assert_eq!(json["model"]["username"], "alice");
    }

    #[test]
    fn auth_response_converts_to_payload() {
        let resp: AuthResponse = serde_json::from_str(
            r#"{"token":"t","record":{"id":"u1","username":"bob"}}"#,
        )
        .unwrap();
        let payload = AuthPayload::from(resp);
        assert_eq!(payload.token, "t");
        assert_eq!(payload.model.username(), Some("bob"));
    }

    #[test]
    fn empty_username_is_absent() {
        let claims = TokenClaims {
            id: "u9".into(),
            token_type: "auth".into(),
            collection_id: "_pb_users_auth_".into(),
            exp: 10,
            refreshable: true,
        };
        let user = UserRecord::from_claims(&claims);
        assert_eq!(user.id, "u9");
        assert_eq!(user.username(), None);
        assert!(claims.is_expired_at(10));
        assert!(!claims.is_expired_at(9));
    }
}

// ---------------------------------------------------------------------------
// Action responses and form errors
// ---------------------------------------------------------------------------
#[cfg(test)]
mod action_tests {
    use shared::types::*;

    #[test]
    fn success_serializes_with_status_tag() {
        let json = serde_json::to_value(ActionResponse::success("Post added")).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Post added");
        assert!(json.get("redirect").is_none());
    }

    #[test]
    fn redirect_is_only_added_to_success() {
        let ok = ActionResponse::success("ok").with_redirect("/");
        assert_eq!(serde_json::to_value(&ok).unwrap()["redirect"], "/");

        let err = ActionResponse::error("X", "nope").with_redirect("/");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], "error");
        assert!(json.get("redirect").is_none());
    }

    #[test]
    fn login_errors_have_codes_and_messages() {
        for e in [
            LoginError::InvalidCredentials,
            LoginError::MissingField("email".into()),
            LoginError::BackendUnavailable,
            LoginError::InternalError,
        ] {
            assert!(!e.to_code().is_empty());
            assert!(!e.to_message().is_empty());
        }
    }

    #[test]
    fn login_data_accepts_identity_alias() {
        let d: LoginData = serde_json::from_str(r#"{"identity":"a@b.c","password":"x"}"#).unwrap();
        assert_eq!(d.email, "a@b.c");
    }

    #[test]
    fn signup_rejection_surfaces_backend_message() {
        let e = SignupError::Rejected(Some("Username is taken.".into()));
        assert_eq!(e.to_message(), "Username is taken.");
        assert_eq!(
            SignupError::Rejected(None).to_message(),
            "Failed to create account."
        );
    }

    #[test]
    fn signup_data_accepts_both_confirm_spellings() {
        let a: SignupData = serde_json::from_str(
            r#"{"email":"e","username":"u","password":"p","passwordConfirm":"p"}"#,
        )
        .unwrap();
        let b: SignupData = serde_json::from_str(
            r#"{"email":"e","username":"u","password":"p","password_confirm":"p"}"#,
        )
        .unwrap();
        assert_eq!(a.password_confirm, b.password_confirm);
    }
}
