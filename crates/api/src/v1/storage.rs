//! Storage config and bucket bodies.

use serde::{Deserialize, Serialize};

/// A boolean feature toggle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageFeatureFlag {
    /// Whether the feature is on.
    pub enabled: bool,
}

/// Storage feature toggles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageFeatures {
    /// Image transformation.
    #[serde(default)]
    pub image_transformation: StorageFeatureFlag,
    /// S3-compatible protocol access.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_protocol: Option<StorageFeatureFlag>,
}

/// `GET /v1/projects/{ref}/config/storage` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfigResponse {
    /// Global upload limit in bytes.
    #[serde(default)]
    pub file_size_limit: i64,
    /// Feature toggles.
    #[serde(default)]
    pub features: StorageFeatures,
}

/// `PATCH /v1/projects/{ref}/config/storage` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStorageConfigBody {
    /// Global upload limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_limit: Option<i64>,
    /// Feature toggles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<StorageFeatures>,
}

/// One entry of `GET /v1/projects/{ref}/storage/buckets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageBucketResponse {
    /// Bucket id (equal to its name for buckets created by the CLI).
    pub id: String,
    /// Bucket name.
    pub name: String,
    /// Owner id.
    #[serde(default)]
    pub owner: String,
    /// Whether objects are publicly readable.
    #[serde(default)]
    pub public: bool,
    /// Per-bucket upload limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_limit: Option<i64>,
    /// Allowed MIME types; absent means any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mime_types: Option<Vec<String>>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: String,
    /// Update timestamp.
    #[serde(default)]
    pub updated_at: String,
}

/// `PATCH /v1/projects/{ref}/storage/buckets/{id}` body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStorageBucketBody {
    /// Whether objects are publicly readable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Upload limit in bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size_limit: Option<i64>,
    /// Allowed MIME types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_mime_types: Option<Vec<String>>,
}
