//! Embedded TikTok video references: always-remote lookups, refetch after every
//! confirmed update or delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::manager::ResourceManager;
use crate::resource::{ErrorMessages, FoldStrategy, LookupStrategy, Patch, Resource};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: String,
    /// Embed reference (video URL or platform id) rendered by the player.
    pub embed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewVideo {
    pub embed: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl NewVideo {
    pub fn new(embed: impl Into<String>) -> Self {
        Self {
            embed: embed.into(),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embed: Option<String>,
    #[serde(skip_serializing_if = "Patch::is_absent")]
    pub name: Patch<String>,
}

impl VideoPatch {
    pub fn embed(embed: impl Into<String>) -> Self {
        Self {
            embed: Some(embed.into()),
            ..Default::default()
        }
    }
}

impl Resource for Video {
    type CreateBody = NewVideo;
    type UpdateBody = VideoPatch;

    const COLLECTION: &'static str = "/tik-tok-videos";
    const LOOKUP: LookupStrategy = LookupStrategy::AlwaysRemote;
    const FOLD: FoldStrategy = FoldStrategy::Refetch;
    // Videos carry no asset field; an uploaded file's URL is only reported back.
    const ASSET_FIELD: Option<&'static str> = None;
    const MESSAGES: ErrorMessages = ErrorMessages {
        list: "Failed to fetch TikTok videos",
        get: "Failed to fetch TikTok video",
        create: "Failed to add TikTok video",
        update: "Failed to update TikTok video",
        delete: "Failed to delete TikTok video",
        upload: "Failed to upload image",
    };

    fn id(&self) -> &str {
        &self.id
    }
}

pub type VideoManager = ResourceManager<Video>;
