use serde::{Deserialize, Serialize};

/// Represents a blob object in the Walrus network
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobObject {
    /// The Sui object ID of the blob
    pub id: String,
    pub blob_id: String,
    /// Unencoded size of the blob in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_epoch: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certified_epoch: Option<u64>,
    pub storage: BlobStorage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletable: Option<bool>,
}

/// Storage resource backing a blob
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobStorage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_epoch: Option<u64>,
    pub end_epoch: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_size: Option<u64>,
}
