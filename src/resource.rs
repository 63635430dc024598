use serde::de::DeserializeOwned;
use serde::{Serialize, Serializer};

use crate::remote::UploadTarget;

/// Three-state field for partial updates.
/// `Absent` is omitted from the PATCH body, `Null` is sent as `null` (clear it).
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Patch<T> {
    /// Field was not included in the request (no change).
    #[default]
    Absent,
    /// Field is explicitly cleared.
    Null,
    /// Field is set to a new value.
    Value(T),
}

impl<T> From<Option<Option<T>>> for Patch<T> {
    fn from(v: Option<Option<T>>) -> Self {
        match v {
            None => Patch::Absent,
            Some(None) => Patch::Null,
            Some(Some(v)) => Patch::Value(v),
        }
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Absent | Patch::Null => serializer.serialize_none(),
            Patch::Value(v) => v.serialize(serializer),
        }
    }
}

/// How `get_by_id` resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupStrategy {
    /// Answer from the local collection; never touches the network.
    CacheFirst,
    /// Always ask the backend, even for ids already held locally.
    AlwaysRemote,
}

/// How a confirmed update or delete is folded into the local collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldStrategy {
    /// Merge returned fields into the existing entry / remove by id.
    LocalMerge,
    /// Discard local state and re-list the whole collection.
    Refetch,
}

/// Fallback `last_error` text per operation, used when the backend sent no message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrorMessages {
    pub list: &'static str,
    pub get: &'static str,
    pub create: &'static str,
    pub update: &'static str,
    pub delete: &'static str,
    pub upload: &'static str,
}

/// An entity type a `ResourceManager` can own.
///
/// The associated constants pin the per-type behavior. They are deliberately
/// not shared: posts and videos resolve lookups and fold mutations differently.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Body sent on create.
    type CreateBody: Serialize + Send + Sync;
    /// Partial body sent on update.
    type UpdateBody: Serialize + Send + Sync;

    /// Collection path, e.g. `/posts`.
    const COLLECTION: &'static str;
    const LOOKUP: LookupStrategy;
    const FOLD: FoldStrategy;
    /// Body field that receives an uploaded asset's URL. `None` sends the body unchanged.
    const ASSET_FIELD: Option<&'static str>;
    /// Value written into `ASSET_FIELD` on create when the caller supplied neither file nor URL.
    const ASSET_DEFAULT: Option<&'static str> = None;
    const MESSAGES: ErrorMessages;

    fn id(&self) -> &str;

    /// Upload endpoint for an asset. `scope` is the id being updated, `None` on create.
    fn upload_target(scope: Option<&str>) -> UploadTarget {
        let _ = scope;
        UploadTarget::Image
    }
}
