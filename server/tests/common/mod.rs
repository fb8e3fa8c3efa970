#![allow(dead_code)]

use serde_json::{Value, json};

/// A `music_posts` record as the backend returns it.
pub fn post_record(id: &str, url: &str, username: &str, platform: &str) -> Value {
    json!({
        "id": id,
        "collectionId": "pbc_music",
        "collectionName": "music_posts",
        "created": "2024-05-01 10:00:00.000Z",
        "updated": "2024-05-01 10:00:00.000Z",
        "url": url,
        "comment": "",
        "username": username,
        "platform": platform,
        "title": "",
        "thumbnail": ""
    })
}

pub fn list_body(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({
        "page": 1,
        "perPage": 50,
        "totalItems": total,
        "totalPages": 1,
        "items": items
    })
}

pub fn auth_body(token: &str, id: &str, username: &str) -> Value {
    json!({
        "token": token,
        "record": {
            "id": id,
            "collectionId": "_pb_users_auth_",
            "collectionName": "users",
            "email": format!("{}@example.com", username),
            "username": username,
            "verified": false
        }
    })
}

pub const APPLE_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
<TITLE>Foo - Apple Music</TITLE>
<meta property="og:image" content="https://is1-ssl.mzstatic.com/image/thumb/a/{w}x{h}bb.jpg">
</head>
<body></body>
</html>"#;
