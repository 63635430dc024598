//! content-manager - Client-side managers for CMS content over a REST backend
//!
//! This crate sits between editing forms and the CMS API:
//! - A thin `RemoteClient` for list/get/create/update/delete and multipart uploads
//! - `ResourceManager<T>` holding a server-confirmed collection plus busy/error flags
//! - Two-phase "upload, then mutate" operations with explicit partial-failure outcomes
//! - `PostManager` (cache-first, local merge) and `VideoManager` (always-remote, refetch)

pub mod config;
pub mod manager;
pub mod posts;
pub mod remote;
pub mod resource;
pub mod state;
#[cfg(test)]
pub mod testutil;
pub mod videos;

pub use manager::{AssetOutcome, ResourceManager};
pub use posts::{NewPost, Post, PostManager, PostPatch};
pub use remote::{AssetFile, HttpRemote, RemoteClient, RemoteError};
pub use state::{OperationKind, OperationState, Snapshot};
pub use videos::{NewVideo, Video, VideoManager, VideoPatch};
