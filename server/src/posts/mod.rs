//! Reads and writes of `music_posts` records.
//!
//! Every successful write invalidates the cached feed page once; a failed
//! write leaves the cache alone.

pub mod submission;

pub use self::submission::{PostSubmission, SubmissionError, build_draft, resolve_username};

use tracing::{info, warn};

use shared::types::{ListResult, MusicPost, Platform, PostDraft};

use crate::backend::{BackendClient, BackendError, Filter, ListOptions, MUSIC_POSTS, Sort};
use crate::cache::FeedCache;

/// Path of the page that lists the newest posts.
pub const FEED_PATH: &str = "/";

pub const DEFAULT_PAGE_SIZE: u32 = 50;
pub const MAX_PAGE_SIZE: u32 = 200;

/// Parameters for a post listing.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub page: u32,
    pub per_page: u32,
    pub sort: Sort,
    pub filter: Option<Filter>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::newest(DEFAULT_PAGE_SIZE)
    }
}

impl ListQuery {
    /// First page, newest first.
    pub fn newest(per_page: u32) -> Self {
        Self {
            page: 1,
            per_page: per_page.clamp(1, MAX_PAGE_SIZE),
            sort: Sort::desc("created"),
            filter: None,
        }
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Posts submitted under `username`.
    pub fn by_user(self, username: &str) -> Self {
        self.filter(Filter::eq("username", username))
    }

    /// Free-text search over title and platform, optionally narrowed to one
    /// platform. Empty inputs add no condition.
    pub fn search(self, text: Option<&str>, platform: Option<Platform>) -> Self {
        let text = text.map(str::trim).filter(|t| !t.is_empty());

        let text_match = text.map(|t| {
            Filter::contains("title", t).or(Filter::contains("platform", t))
        });
        let platform_match = platform.map(|p| Filter::eq("platform", p.as_str()));

        match Filter::all([text_match, platform_match].into_iter().flatten()) {
            Some(f) => self.filter(f),
            None => self,
        }
    }
}

pub struct PostRepository<'a> {
    client: &'a BackendClient,
    cache: &'a FeedCache,
}

impl<'a> PostRepository<'a> {
    pub fn new(client: &'a BackendClient, cache: &'a FeedCache) -> Self {
        Self { client, cache }
    }

    pub async fn create(&self, draft: &PostDraft) -> Result<MusicPost, BackendError> {
        let post: MusicPost = self
            .client
            .collection(MUSIC_POSTS)
            .create(draft)
            .await
            .inspect_err(|e| warn!("Creating post failed: {}", e))?;
        info!("Post {} created by {}", post.id, post.username);
        self.cache.invalidate(FEED_PATH).await;
        Ok(post)
    }

    pub async fn update(&self, id: &str, draft: &PostDraft) -> Result<MusicPost, BackendError> {
        let post: MusicPost = self
            .client
            .collection(MUSIC_POSTS)
            .update(id, draft)
            .await
            .inspect_err(|e| warn!("Updating post {} failed: {}", id, e))?;
        info!("Post {} updated", post.id);
        self.cache.invalidate(FEED_PATH).await;
        Ok(post)
    }

    pub async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.client
            .collection(MUSIC_POSTS)
            .delete(id)
            .await
            .inspect_err(|e| warn!("Deleting post {} failed: {}", id, e))?;
        info!("Post {} deleted", id);
        self.cache.invalidate(FEED_PATH).await;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<MusicPost, BackendError> {
        self.client.collection(MUSIC_POSTS).get_one(id).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<ListResult<MusicPost>, BackendError> {
        let options = ListOptions {
            sort: Some(query.sort),
            filter: query.filter.clone(),
        };
        self.client
            .collection(MUSIC_POSTS)
            .get_list(query.page, query.per_page, &options)
            .await
    }
}
