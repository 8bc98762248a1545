use {
    crate::models::{BlobObject, SuiEvent},
    serde::{Deserialize, Serialize},
};

/// Publisher response to a blob upload. Exactly one of the fields is set by
/// a well-behaved publisher.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub newly_created: Option<NewlyCreated>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub already_certified: Option<AlreadyCertified>,
}

impl StoreResponse {
    /// Blob ID of the stored blob, whether it was just created or not.
    pub fn blob_id(&self) -> Option<&str> {
        match (&self.newly_created, &self.already_certified) {
            (Some(created), _) => Some(&created.blob_object.blob_id),
            (None, Some(certified)) => Some(&certified.blob_id),
            (None, None) => None,
        }
    }

    /// Epoch until which the blob is stored.
    pub fn end_epoch(&self) -> Option<u64> {
        match (&self.newly_created, &self.already_certified) {
            (Some(created), _) => Some(created.blob_object.storage.end_epoch),
            (None, Some(certified)) => Some(certified.end_epoch),
            (None, None) => None,
        }
    }

    /// Sui object ID of a newly created blob.
    pub fn object_id(&self) -> Option<&str> {
        self.newly_created
            .as_ref()
            .map(|created| created.blob_object.id.as_str())
    }
}

/// The blob was registered and certified by this upload
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewlyCreated {
    pub blob_object: BlobObject,
    /// How storage was acquired, kept as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_operation: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,
}

/// The blob was already certified before this upload
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlreadyCertified {
    pub blob_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event: Option<SuiEvent>,
    pub end_epoch: u64,
}
