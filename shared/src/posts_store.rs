//! Blog posts: filtered listing, slug lookup, and the publish lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::blob_store::{keys, BlobStore};
use crate::error::{StoreError, StoreResult};

const DEFAULT_TITLE: &str = "Untitled";
const DEFAULT_COVER_IMAGE: &str = "/images/default-cover.jpg";

// Reading speed assumed by the reading-time estimate.
const CHARS_PER_MINUTE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostCategory {
    Ai,
    Nova,
    Life,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Published,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub category: PostCategory,
    pub status: PostStatus,
    pub published_at: Option<DateTime<Utc>>,
    pub slug: String,
    pub featured_image: String,
    pub tags: Vec<String>,
    pub reading_time: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<PostCategory>,
    pub status: Option<PostStatus>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<PostCategory>,
    pub status: Option<PostStatus>,
    pub cover_image: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PostFilter {
    pub category: Option<PostCategory>,
    pub status: Option<PostStatus>,
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct PostStore {
    blob: BlobStore,
}

impl PostStore {
    pub fn new(blob: BlobStore) -> Self {
        Self { blob }
    }

    async fn load(&self) -> Vec<Post> {
        self.blob.get_or_init(keys::POSTS, Vec::new()).await.value
    }

    /// List posts newest-published first; posts that never published sort
    /// last. The limit applies after filtering and sorting.
    pub async fn list(&self, filter: PostFilter) -> Vec<Post> {
        let mut posts = self.load().await;
        if let Some(category) = filter.category {
            posts.retain(|post| post.category == category);
        }
        if let Some(status) = filter.status {
            posts.retain(|post| post.status == status);
        }
        posts.sort_by(|left, right| match (&left.published_at, &right.published_at) {
            (Some(a), Some(b)) => b.cmp(a),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        if let Some(limit) = filter.limit {
            posts.truncate(limit);
        }
        posts
    }

    pub async fn get_by_slug(&self, slug: &str) -> Option<Post> {
        self.load().await.into_iter().find(|post| post.slug == slug)
    }

    /// Create a post. Id, slug, reading time, and the publish timestamp are
    /// computed here; missing fields fall back to defaults.
    pub async fn create(&self, input: NewPostInput) -> Post {
        let title = input.title.unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let content = input.content.unwrap_or_default();
        let status = input.status.unwrap_or(PostStatus::Draft);
        let post = Post {
            id: Uuid::new_v4().to_string(),
            slug: slugify(&title),
            reading_time: estimate_reading_time(&content),
            published_at: (status == PostStatus::Published).then(Utc::now),
            excerpt: input.excerpt.unwrap_or_default(),
            category: input.category.unwrap_or(PostCategory::Ai),
            featured_image: input
                .cover_image
                .unwrap_or_else(|| DEFAULT_COVER_IMAGE.to_string()),
            tags: input.tags.unwrap_or_default(),
            title,
            content,
            status,
        };
        let mut posts = self.load().await;
        posts.push(post.clone());
        self.blob.write(keys::POSTS, &posts).await;
        post
    }

    /// Apply a patch. The publish timestamp is set on the first transition
    /// into the published state and never recomputed or cleared afterwards.
    pub async fn update(&self, id: &str, patch: PostPatch) -> StoreResult<Post> {
        let mut posts = self.load().await;
        let post = posts
            .iter_mut()
            .find(|post| post.id == id)
            .ok_or(StoreError::NotFound("post"))?;

        if let Some(title) = patch.title {
            post.title = title;
        }
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(excerpt) = patch.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(category) = patch.category {
            post.category = category;
        }
        if let Some(status) = patch.status {
            post.status = status;
        }
        if let Some(cover_image) = patch.cover_image {
            post.featured_image = cover_image;
        }
        if let Some(tags) = patch.tags {
            post.tags = tags;
        }
        if post.status == PostStatus::Published && post.published_at.is_none() {
            post.published_at = Some(Utc::now());
        }

        let updated = post.clone();
        self.blob.write(keys::POSTS, &posts).await;
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut posts = self.load().await;
        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            return Err(StoreError::NotFound("post"));
        }
        self.blob.write(keys::POSTS, &posts).await;
        Ok(())
    }
}

/// Slug from a title: lowercased, punctuation dropped, whitespace runs
/// collapsed to single hyphens. Unicode alphanumerics and underscores
/// are kept deliberately so CJK titles produce usable slugs.
fn slugify(title: &str) -> String {
    let lowered = title.trim().to_lowercase();
    let cleaned: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-' || *c == '_')
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join("-")
}

fn estimate_reading_time(content: &str) -> u32 {
    content.chars().count().div_ceil(CHARS_PER_MINUTE) as u32
}
