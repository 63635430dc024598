//! Per-manager busy flags and the snapshot handed to observers.
//!
//! Each flag is its own `Idle -> Busy -> Idle` machine. Flags are per kind, not
//! per call: two overlapping calls of the same kind share one flag, and the
//! first of them to resolve clears it.

use serde::Serialize;

/// The kinds of work a manager can have in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Listing,
    Creating,
    Updating,
    Deleting,
    UploadingAsset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationState {
    pub listing: bool,
    pub creating: bool,
    pub updating: bool,
    pub deleting: bool,
    pub uploading_asset: bool,
    pub last_error: Option<String>,
}

impl OperationState {
    pub fn is_busy(&self, kind: OperationKind) -> bool {
        match kind {
            OperationKind::Listing => self.listing,
            OperationKind::Creating => self.creating,
            OperationKind::Updating => self.updating,
            OperationKind::Deleting => self.deleting,
            OperationKind::UploadingAsset => self.uploading_asset,
        }
    }

    pub fn any_busy(&self) -> bool {
        self.listing || self.creating || self.updating || self.deleting || self.uploading_asset
    }

    pub(crate) fn begin(&mut self, kind: OperationKind) {
        *self.flag_mut(kind) = true;
    }

    /// Clear the flag for `kind` and record the outcome: `None` clears `last_error`.
    pub(crate) fn settle(&mut self, kind: OperationKind, error: Option<String>) {
        *self.flag_mut(kind) = false;
        self.last_error = error;
    }

    fn flag_mut(&mut self, kind: OperationKind) -> &mut bool {
        match kind {
            OperationKind::Listing => &mut self.listing,
            OperationKind::Creating => &mut self.creating,
            OperationKind::Updating => &mut self.updating,
            OperationKind::Deleting => &mut self.deleting,
            OperationKind::UploadingAsset => &mut self.uploading_asset,
        }
    }
}

/// What the presentation layer reads: the collection plus flags.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub state: OperationState,
}

impl<T> Default for Snapshot<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: OperationState::default(),
        }
    }
}
