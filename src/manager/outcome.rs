use crate::remote::RemoteError;

/// Result of a two-phase "upload, then mutate" call.
///
/// There is no rollback across the phases: `MutationFailedAfterUpload` means
/// the asset at `asset_url` exists remotely but nothing references it.
#[derive(Debug)]
pub enum AssetOutcome<T> {
    Success {
        resource: T,
        /// URL obtained in phase 1, `None` when no file was supplied.
        asset_url: Option<String>,
    },
    /// Phase 1 failed; the mutation was never attempted.
    UploadFailed { error: RemoteError },
    /// No file was supplied and the mutation failed.
    MutationFailed { error: RemoteError },
    /// Phase 1 succeeded, phase 2 failed. The uploaded asset is orphaned.
    MutationFailedAfterUpload {
        asset_url: String,
        error: RemoteError,
    },
}

impl<T> AssetOutcome<T> {
    pub(crate) fn mutation_failed(asset_url: Option<String>, error: RemoteError) -> Self {
        match asset_url {
            Some(asset_url) => AssetOutcome::MutationFailedAfterUpload { asset_url, error },
            None => AssetOutcome::MutationFailed { error },
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, AssetOutcome::Success { .. })
    }

    pub fn resource(&self) -> Option<&T> {
        match self {
            AssetOutcome::Success { resource, .. } => Some(resource),
            _ => None,
        }
    }

    pub fn into_resource(self) -> Option<T> {
        match self {
            AssetOutcome::Success { resource, .. } => Some(resource),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RemoteError> {
        match self {
            AssetOutcome::Success { .. } => None,
            AssetOutcome::UploadFailed { error }
            | AssetOutcome::MutationFailed { error }
            | AssetOutcome::MutationFailedAfterUpload { error, .. } => Some(error),
        }
    }

    /// URL of an uploaded asset that no entity ended up referencing.
    pub fn orphaned_asset_url(&self) -> Option<&str> {
        match self {
            AssetOutcome::MutationFailedAfterUpload { asset_url, .. } => Some(asset_url),
            _ => None,
        }
    }
}
