//! Generic stateful manager for one resource type.
//!
//! A manager owns the local collection and the busy/error flags for its type.
//! The collection only ever changes in the continuation of a confirmed network
//! call, so it is never ahead of the server. Public methods never return
//! errors: callers read `last_error` and the flags from the snapshot.

mod collection;
mod outcome;

pub use outcome::AssetOutcome;

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::watch;

use crate::remote::{AssetFile, RemoteClient, RemoteError, UploadTarget};
use crate::resource::{FoldStrategy, LookupStrategy, Resource};
use crate::state::{OperationKind, OperationState, Snapshot};

pub struct ResourceManager<T: Resource> {
    remote: Arc<dyn RemoteClient>,
    state: watch::Sender<Snapshot<T>>,
}

impl<T: Resource> ResourceManager<T> {
    /// Create a manager with an empty collection. Nothing is fetched.
    pub fn new(remote: Arc<dyn RemoteClient>) -> Self {
        let (state, _) = watch::channel(Snapshot::default());
        Self { remote, state }
    }

    /// Create a manager and populate it with an initial listing.
    pub async fn mount(remote: Arc<dyn RemoteClient>) -> Self {
        let manager = Self::new(remote);
        manager.fetch_all().await;
        manager
    }

    // ========================================================================
    // Observation
    // ========================================================================

    pub fn snapshot(&self) -> Snapshot<T> {
        self.state.borrow().clone()
    }

    pub fn items(&self) -> Vec<T> {
        self.state.borrow().items.clone()
    }

    pub fn state(&self) -> OperationState {
        self.state.borrow().state.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.borrow().state.last_error.clone()
    }

    /// Receive a fresh snapshot every time the collection or a flag changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.state.subscribe()
    }

    // ========================================================================
    // Operations
    // ========================================================================

    /// Replace the collection with the backend's listing.
    pub async fn fetch_all(&self) -> bool {
        self.try_fetch_all().await.is_ok()
    }

    pub async fn get_by_id(&self, id: &str) -> Option<T> {
        match T::LOOKUP {
            LookupStrategy::CacheFirst => self.find_local(id),
            LookupStrategy::AlwaysRemote => {
                let result = async {
                    let value = self.remote.get_by_id(T::COLLECTION, id).await?;
                    Ok::<T, RemoteError>(serde_json::from_value(value)?)
                }
                .await;

                match result {
                    Ok(resource) => {
                        self.state.send_modify(|s| s.state.last_error = None);
                        Some(resource)
                    }
                    Err(e) => {
                        let message = describe(&e, T::MESSAGES.get);
                        tracing::warn!(collection = T::COLLECTION, id, error = %e, "Lookup failed");
                        self.state
                            .send_modify(|s| s.state.last_error = Some(message));
                        None
                    }
                }
            }
        }
    }

    pub async fn create(&self, body: T::CreateBody) -> Option<T> {
        self.try_create(&body, None).await.ok()
    }

    pub async fn update(&self, id: &str, body: T::UpdateBody) -> Option<T> {
        self.try_update(id, &body, None).await.ok()
    }

    pub async fn delete(&self, id: &str) -> bool {
        self.try_delete(id).await.is_ok()
    }

    /// Upload `file` (if any), then create with the body pointing at the uploaded asset.
    pub async fn create_with_asset(
        &self,
        body: T::CreateBody,
        file: Option<AssetFile>,
    ) -> AssetOutcome<T> {
        let asset_url = match file {
            Some(file) => match self.upload_asset(T::upload_target(None), file).await {
                Ok(url) => Some(url),
                Err(error) => return AssetOutcome::UploadFailed { error },
            },
            None => None,
        };

        match self.try_create(&body, asset_url.as_deref()).await {
            Ok(resource) => AssetOutcome::Success {
                resource,
                asset_url,
            },
            Err(error) => self.mutation_failed(asset_url, error),
        }
    }

    /// Upload `file` (if any), then update `id` with the body pointing at the uploaded asset.
    pub async fn update_with_asset(
        &self,
        id: &str,
        body: T::UpdateBody,
        file: Option<AssetFile>,
    ) -> AssetOutcome<T> {
        let asset_url = match file {
            Some(file) => match self.upload_asset(T::upload_target(Some(id)), file).await {
                Ok(url) => Some(url),
                Err(error) => return AssetOutcome::UploadFailed { error },
            },
            None => None,
        };

        match self.try_update(id, &body, asset_url.as_deref()).await {
            Ok(resource) => AssetOutcome::Success {
                resource,
                asset_url,
            },
            Err(error) => self.mutation_failed(asset_url, error),
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn find_local(&self, id: &str) -> Option<T> {
        self.state
            .borrow()
            .items
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    fn begin(&self, kind: OperationKind) {
        self.state.send_modify(|s| s.state.begin(kind));
    }

    fn succeed(&self, kind: OperationKind) {
        self.state.send_modify(|s| s.state.settle(kind, None));
    }

    /// Clear the flag for `kind` and surface `error` as `last_error`.
    fn fail(&self, kind: OperationKind, error: &RemoteError, fallback: &str) {
        let message = describe(error, fallback);
        tracing::warn!(collection = T::COLLECTION, ?kind, error = %error, "Operation failed");
        self.state
            .send_modify(|s| s.state.settle(kind, Some(message)));
    }

    async fn try_fetch_all(&self) -> Result<(), RemoteError> {
        self.begin(OperationKind::Listing);

        let result = async {
            let values = self.remote.list(T::COLLECTION).await?;
            values
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<T>, _>>()
                .map_err(RemoteError::from)
        }
        .await;

        match result {
            Ok(fresh) => {
                let count = fresh.len();
                self.state.send_modify(|s| {
                    collection::replace_all(&mut s.items, fresh);
                    s.state.settle(OperationKind::Listing, None);
                });
                tracing::debug!(collection = T::COLLECTION, count, "Fetched collection");
                Ok(())
            }
            Err(e) => {
                self.fail(OperationKind::Listing, &e, T::MESSAGES.list);
                Err(e)
            }
        }
    }

    async fn try_create(
        &self,
        body: &T::CreateBody,
        asset_url: Option<&str>,
    ) -> Result<T, RemoteError> {
        self.begin(OperationKind::Creating);

        let result = async {
            let payload = create_payload::<T>(body, asset_url)?;
            let value = self.remote.create(T::COLLECTION, payload).await?;
            Ok::<T, RemoteError>(serde_json::from_value(value)?)
        }
        .await;

        match result {
            Ok(created) => {
                tracing::debug!(collection = T::COLLECTION, id = %created.id(), "Created resource");
                let folded = created.clone();
                self.state.send_modify(|s| {
                    collection::prepend(&mut s.items, folded);
                    s.state.settle(OperationKind::Creating, None);
                });
                Ok(created)
            }
            Err(e) => {
                self.fail(OperationKind::Creating, &e, T::MESSAGES.create);
                Err(e)
            }
        }
    }

    async fn try_update(
        &self,
        id: &str,
        body: &T::UpdateBody,
        asset_url: Option<&str>,
    ) -> Result<T, RemoteError> {
        self.begin(OperationKind::Updating);

        let result = async {
            let payload = update_payload::<T>(body, asset_url)?;
            self.remote.update_partial(T::COLLECTION, id, payload).await
        }
        .await;

        let returned = match result {
            Ok(value) => value,
            Err(e) => {
                self.fail(OperationKind::Updating, &e, T::MESSAGES.update);
                return Err(e);
            }
        };

        match T::FOLD {
            FoldStrategy::LocalMerge => self.merge_update(id, returned),
            FoldStrategy::Refetch => {
                tracing::debug!(collection = T::COLLECTION, id, "Updated resource, refetching");
                self.succeed(OperationKind::Updating);
                self.fetch_all().await;

                // The write is confirmed; a partial echo falls back to the refetched entry.
                match serde_json::from_value::<T>(returned) {
                    Ok(updated) => Ok(updated),
                    Err(e) => self.find_local(id).ok_or_else(|| {
                        tracing::warn!(
                            collection = T::COLLECTION,
                            id,
                            error = %e,
                            "Updated resource missing from refetch and echo undecodable"
                        );
                        RemoteError::from(e)
                    }),
                }
            }
        }
    }

    fn merge_update(&self, id: &str, returned: Value) -> Result<T, RemoteError> {
        let merged = match self.find_local(id) {
            Some(existing) => collection::merge_fields(&existing, returned),
            None => serde_json::from_value(returned),
        };

        match merged {
            Ok(updated) => {
                let folded = updated.clone();
                self.state.send_modify(|s| {
                    if !collection::replace(&mut s.items, folded) {
                        tracing::debug!(collection = T::COLLECTION, id, "Updated resource not held locally");
                    }
                    s.state.settle(OperationKind::Updating, None);
                });
                tracing::debug!(collection = T::COLLECTION, id, "Updated resource");
                Ok(updated)
            }
            Err(e) => {
                let e = RemoteError::from(e);
                self.fail(OperationKind::Updating, &e, T::MESSAGES.update);
                Err(e)
            }
        }
    }

    async fn try_delete(&self, id: &str) -> Result<(), RemoteError> {
        self.begin(OperationKind::Deleting);

        if let Err(e) = self.remote.delete(T::COLLECTION, id).await {
            self.fail(OperationKind::Deleting, &e, T::MESSAGES.delete);
            return Err(e);
        }

        tracing::debug!(collection = T::COLLECTION, id, "Deleted resource");
        match T::FOLD {
            FoldStrategy::LocalMerge => {
                self.state.send_modify(|s| {
                    collection::remove(&mut s.items, id);
                    s.state.settle(OperationKind::Deleting, None);
                });
            }
            FoldStrategy::Refetch => {
                self.succeed(OperationKind::Deleting);
                self.fetch_all().await;
            }
        }
        Ok(())
    }

    async fn upload_asset(
        &self,
        target: UploadTarget,
        file: AssetFile,
    ) -> Result<String, RemoteError> {
        self.begin(OperationKind::UploadingAsset);

        match self.remote.upload_file(&target, file).await {
            Ok(upload) => {
                tracing::debug!(collection = T::COLLECTION, url = %upload.url, "Uploaded asset");
                self.succeed(OperationKind::UploadingAsset);
                Ok(upload.url)
            }
            Err(e) => {
                self.fail(OperationKind::UploadingAsset, &e, T::MESSAGES.upload);
                Err(e)
            }
        }
    }

    fn mutation_failed(&self, asset_url: Option<String>, error: RemoteError) -> AssetOutcome<T> {
        if let Some(ref url) = asset_url {
            tracing::warn!(
                collection = T::COLLECTION,
                asset_url = %url,
                "Mutation failed after upload; uploaded asset is orphaned"
            );
        }
        AssetOutcome::mutation_failed(asset_url, error)
    }
}

/// `last_error` text: the backend's message when it sent one, the fallback otherwise.
fn describe(error: &RemoteError, fallback: &str) -> String {
    error
        .server_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Serialize a create body, pointing the asset field at `asset_url` or its default.
fn create_payload<T: Resource>(
    body: &T::CreateBody,
    asset_url: Option<&str>,
) -> Result<Value, RemoteError> {
    let mut payload = serde_json::to_value(body)?;
    if let (Some(field), Value::Object(fields)) = (T::ASSET_FIELD, &mut payload) {
        match (asset_url, T::ASSET_DEFAULT) {
            (Some(url), _) => {
                fields.insert(field.to_string(), Value::String(url.to_string()));
            }
            (None, Some(default)) => {
                let supplied = fields
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|s| !s.is_empty());
                if !supplied {
                    fields.insert(field.to_string(), Value::String(default.to_string()));
                }
            }
            (None, None) => {}
        }
    }
    Ok(payload)
}

/// Serialize an update body. Only an uploaded asset touches the asset field.
fn update_payload<T: Resource>(
    body: &T::UpdateBody,
    asset_url: Option<&str>,
) -> Result<Value, RemoteError> {
    let mut payload = serde_json::to_value(body)?;
    if let (Some(field), Some(url), Value::Object(fields)) =
        (T::ASSET_FIELD, asset_url, &mut payload)
    {
        fields.insert(field.to_string(), Value::String(url.to_string()));
    }
    Ok(payload)
}
