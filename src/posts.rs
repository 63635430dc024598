//! Editorial posts: cache-first lookups, local-merge folds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manager::{AssetOutcome, ResourceManager};
use crate::remote::{AssetFile, UploadTarget};
use crate::resource::{ErrorMessages, FoldStrategy, LookupStrategy, Patch, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub content: String,
    /// Pre-existing image URL. Ignored when a file is uploaded alongside.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl NewPost {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            image_url: None,
        }
    }

    pub fn with_image_url(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub image_url: Patch<String>,
}

impl Resource for Post {
    type CreateBody = NewPost;
    type UpdateBody = PostPatch;

    const COLLECTION: &'static str = "/posts";
    const LOOKUP: LookupStrategy = LookupStrategy::CacheFirst;
    const FOLD: FoldStrategy = FoldStrategy::LocalMerge;
    const ASSET_FIELD: Option<&'static str> = Some("imageUrl");
    const ASSET_DEFAULT: Option<&'static str> = Some("");
    const MESSAGES: ErrorMessages = ErrorMessages {
        list: "Failed to fetch posts",
        get: "Failed to fetch post",
        create: "Failed to create post",
        update: "Failed to update post",
        delete: "Failed to delete post",
        upload: "Failed to upload image",
    };

    fn id(&self) -> &str {
        &self.id
    }

    /// New posts upload to the shared image bucket; existing posts upload
    /// into their own post-scoped folder.
    fn upload_target(scope: Option<&str>) -> UploadTarget {
        match scope {
            Some(post_id) => UploadTarget::PostImages {
                post_id: post_id.to_string(),
            },
            None => UploadTarget::Image,
        }
    }
}

pub type PostManager = ResourceManager<Post>;

impl ResourceManager<Post> {
    /// Upload a new image for an existing post and point the post at it.
    pub async fn replace_image(&self, id: &str, file: AssetFile) -> AssetOutcome<Post> {
        self.update_with_asset(id, PostPatch::default(), Some(file))
            .await
    }

    /// Detach the image from a post. The asset itself stays where it is.
    pub async fn remove_image(&self, id: &str) -> Option<Post> {
        let patch = PostPatch {
            image_url: Patch::Null,
            ..Default::default()
        };
        self.update(id, patch).await
    }
}
