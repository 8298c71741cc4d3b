//! `[storage]`: object storage and buckets.

use crate::units::SizeInBytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Storage service settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Run the storage service.
    pub enabled: bool,
    /// Upload size cap for the whole project; buckets without a limit inherit it.
    pub file_size_limit: SizeInBytes,
    /// Image resizing service.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_transformation: Option<ImageTransformation>,
    /// Buckets keyed by name.
    pub buckets: BTreeMap<String, BucketConfig>,
}

/// `[storage.image_transformation]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageTransformation {
    /// Resize images on the fly.
    pub enabled: bool,
}

/// `[storage.buckets.<name>]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BucketConfig {
    /// Readable without auth; unset keeps the remote value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Zero means "inherit `storage.file_size_limit`".
    pub file_size_limit: SizeInBytes,
    /// Accepted MIME types; empty allows all.
    pub allowed_mime_types: Vec<String>,
    /// Local directory uploaded into the bucket on seed.
    pub objects_path: String,
}

impl StorageConfig {
    /// Give every bucket without its own limit the storage-wide limit.
    pub fn inherit_bucket_limits(&mut self) {
        let limit = self.file_size_limit;
        for bucket in self.buckets.values_mut() {
            if bucket.file_size_limit.is_zero() {
                bucket.file_size_limit = limit;
            }
        }
    }
}
