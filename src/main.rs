use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use content_manager::{
    config::Config,
    resource::Patch,
    AssetFile, AssetOutcome, HttpRemote, NewPost, NewVideo, PostManager, PostPatch,
    RemoteClient, VideoManager, VideoPatch,
};

/// Manage CMS posts and TikTok video embeds from the command line.
#[derive(Parser)]
#[command(name = "content-manager", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Editorial posts.
    Posts {
        #[command(subcommand)]
        action: PostAction,
    },
    /// Embedded TikTok videos.
    Videos {
        #[command(subcommand)]
        action: VideoAction,
    },
}

#[derive(Subcommand)]
enum PostAction {
    List,
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
        /// Image file to upload before creating.
        #[arg(long, conflicts_with = "image_url")]
        image: Option<PathBuf>,
        /// Already-hosted image URL.
        #[arg(long)]
        image_url: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        content: Option<String>,
        /// Replacement image file to upload first.
        #[arg(long, conflicts_with = "clear_image")]
        image: Option<PathBuf>,
        /// Detach the current image.
        #[arg(long)]
        clear_image: bool,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand)]
enum VideoAction {
    List,
    Get {
        id: String,
    },
    Create {
        #[arg(long)]
        embed: String,
        #[arg(long)]
        name: Option<String>,
    },
    Update {
        id: String,
        #[arg(long)]
        embed: Option<String>,
        #[arg(long)]
        name: Option<String>,
        /// Image file to upload before updating.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Delete {
        id: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize tracing
    let env_filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    match log_format.to_lowercase().as_str() {
        "gcp" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_stackdriver::layer())
                .init();
        }
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_span_list(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = Cli::parse();

    let config = Config::load()?;
    info!(base_url = %config.api.base_url, "Using CMS API");

    let remote: Arc<dyn RemoteClient> = Arc::new(HttpRemote::new(&config.api)?);

    match cli.command {
        Commands::Posts { action } => run_posts(remote, action).await,
        Commands::Videos { action } => run_videos(remote, action).await,
    }
}

async fn run_posts(remote: Arc<dyn RemoteClient>, action: PostAction) -> Result<()> {
    let posts = PostManager::mount(remote).await;
    if let Some(err) = posts.last_error() {
        bail!(err);
    }

    match action {
        PostAction::List => print(&posts.items()),
        PostAction::Get { id } => match posts.get_by_id(&id).await {
            Some(post) => print(&post),
            None => bail!("Post {id} not found"),
        },
        PostAction::Create {
            title,
            content,
            image,
            image_url,
        } => {
            let mut body = NewPost::new(title, content);
            body.image_url = image_url;
            let file = load_asset(image).await?;
            let outcome = posts.create_with_asset(body, file).await;
            report(outcome, posts.last_error())
        }
        PostAction::Update {
            id,
            title,
            content,
            image,
            clear_image,
        } => {
            let patch = PostPatch {
                title,
                content,
                image_url: if clear_image {
                    Patch::Null
                } else {
                    Patch::Absent
                },
            };
            let file = load_asset(image).await?;
            let outcome = posts.update_with_asset(&id, patch, file).await;
            report(outcome, posts.last_error())
        }
        PostAction::Delete { id } => {
            if !posts.delete(&id).await {
                bail!(failure(posts.last_error()));
            }
            info!(id = %id, "Deleted post");
            Ok(())
        }
    }
}

async fn run_videos(remote: Arc<dyn RemoteClient>, action: VideoAction) -> Result<()> {
    let videos = VideoManager::mount(remote).await;
    if let Some(err) = videos.last_error() {
        bail!(err);
    }

    match action {
        VideoAction::List => print(&videos.items()),
        VideoAction::Get { id } => match videos.get_by_id(&id).await {
            Some(video) => print(&video),
            None => bail!(failure(videos.last_error())),
        },
        VideoAction::Create { embed, name } => {
            let mut body = NewVideo::new(embed);
            body.name = name;
            match videos.create(body).await {
                Some(video) => print(&video),
                None => bail!(failure(videos.last_error())),
            }
        }
        VideoAction::Update {
            id,
            embed,
            name,
            image,
        } => {
            let patch = VideoPatch {
                embed,
                name: name.map(Patch::Value).unwrap_or_default(),
            };
            let file = load_asset(image).await?;
            let outcome = videos.update_with_asset(&id, patch, file).await;
            report(outcome, videos.last_error())
        }
        VideoAction::Delete { id } => {
            if !videos.delete(&id).await {
                bail!(failure(videos.last_error()));
            }
            info!(id = %id, "Deleted video");
            Ok(())
        }
    }
}

async fn load_asset(path: Option<PathBuf>) -> Result<Option<AssetFile>> {
    match path {
        Some(path) => Ok(Some(AssetFile::from_path(&path).await?)),
        None => Ok(None),
    }
}

fn report<T: Serialize>(outcome: AssetOutcome<T>, last_error: Option<String>) -> Result<()> {
    if let Some(url) = outcome.orphaned_asset_url() {
        tracing::warn!(asset_url = %url, "Uploaded asset is not referenced by any entity");
    }
    match outcome.into_resource() {
        Some(resource) => print(&resource),
        None => bail!(failure(last_error)),
    }
}

fn failure(last_error: Option<String>) -> String {
    last_error.unwrap_or_else(|| "Operation failed".to_string())
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
