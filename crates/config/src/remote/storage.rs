//! `[storage]` against the storage config and bucket endpoints.

use crate::diff::diff_with_seed;
use crate::error::ConfigError;
use crate::schema::{BucketConfig, ImageTransformation, StorageConfig};
use crate::units::SizeInBytes;
use supaconf_api::v1::{
    StorageBucketResponse, StorageConfigResponse, StorageFeatureFlag, StorageFeatures,
    UpdateStorageBucketBody, UpdateStorageConfigBody,
};

fn wire_size(size: SizeInBytes) -> i64 {
    i64::try_from(size.bytes()).unwrap_or(i64::MAX)
}

fn local_size(size: i64) -> SizeInBytes {
    SizeInBytes(u64::try_from(size).unwrap_or_default())
}

impl StorageConfig {
    /// PATCH body carrying the global limit and feature toggles.
    pub fn to_update_body(&self) -> UpdateStorageConfigBody {
        let image_transformation = StorageFeatureFlag {
            enabled: self
                .image_transformation
                .as_ref()
                .is_some_and(|feature| feature.enabled),
        };
        UpdateStorageConfigBody {
            file_size_limit: Some(wire_size(self.file_size_limit)),
            features: Some(StorageFeatures {
                image_transformation,
                s3_protocol: None,
            }),
        }
    }

    /// Seed from the remote config. An absent local feature block stays absent.
    pub fn from_remote(&mut self, remote: &StorageConfigResponse) {
        self.file_size_limit = local_size(remote.file_size_limit);
        if let Some(feature) = &mut self.image_transformation {
            *feature = ImageTransformation {
                enabled: remote.features.image_transformation.enabled,
            };
        }
    }

    /// Unified diff of local against remote; empty when in sync.
    pub fn diff_with_remote(&self, remote: &StorageConfigResponse) -> Result<String, ConfigError> {
        diff_with_seed("storage", self, |seeded| seeded.from_remote(remote))
    }
}

/// PATCH body for a bucket whose remote settings drifted, or `None` when in sync.
///
/// `public = None` locally keeps whatever the remote has. An empty MIME list
/// means "any type", which the control plane reports as absent.
pub fn bucket_update(local: &BucketConfig, remote: &StorageBucketResponse) -> Option<UpdateStorageBucketBody> {
    let limit = (!local.file_size_limit.is_zero()).then(|| wire_size(local.file_size_limit));
    let mime_types = (!local.allowed_mime_types.is_empty()).then(|| local.allowed_mime_types.clone());
    let remote_mime_types = remote
        .allowed_mime_types
        .clone()
        .filter(|types| !types.is_empty());

    let public_drift = local.public.is_some_and(|public| public != remote.public);
    let limit_drift = limit != remote.file_size_limit;
    let mime_drift = mime_types != remote_mime_types;
    if !(public_drift || limit_drift || mime_drift) {
        return None;
    }
    Some(UpdateStorageBucketBody {
        public: local.public,
        file_size_limit: limit,
        allowed_mime_types: Some(local.allowed_mime_types.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote_bucket() -> StorageBucketResponse {
        StorageBucketResponse {
            id: "avatars".to_string(),
            name: "avatars".to_string(),
            public: false,
            file_size_limit: Some(5_242_880),
            ..StorageBucketResponse::default()
        }
    }

    #[test]
    fn storage_body_carries_limit_and_features() {
        let storage = StorageConfig {
            file_size_limit: SizeInBytes(52_428_800),
            image_transformation: Some(ImageTransformation { enabled: true }),
            ..StorageConfig::default()
        };
        let body = storage.to_update_body();
        assert_eq!(body.file_size_limit, Some(52_428_800));
        assert_eq!(
            body.features.map(|features| features.image_transformation.enabled),
            Some(true)
        );
    }

    #[test]
    fn storage_limit_drift_is_reported() -> Result<(), ConfigError> {
        let storage = StorageConfig {
            enabled: true,
            file_size_limit: SizeInBytes(52_428_800),
            ..StorageConfig::default()
        };
        let remote = StorageConfigResponse {
            file_size_limit: 1024,
            ..StorageConfigResponse::default()
        };
        let diff = storage.diff_with_remote(&remote)?;
        assert!(diff.contains("-file_size_limit = \"1KiB\""), "{diff}");
        assert!(diff.contains("+file_size_limit = \"50MiB\""), "{diff}");
        Ok(())
    }

    #[test]
    fn bucket_in_sync_needs_no_update() {
        let local = BucketConfig {
            public: Some(false),
            file_size_limit: SizeInBytes(5_242_880),
            ..BucketConfig::default()
        };
        assert!(bucket_update(&local, &remote_bucket()).is_none());
    }

    #[test]
    fn bucket_drift_builds_patch() {
        let local = BucketConfig {
            public: Some(true),
            file_size_limit: SizeInBytes(5_242_880),
            allowed_mime_types: vec!["image/png".to_string()],
            ..BucketConfig::default()
        };
        let body = bucket_update(&local, &remote_bucket());
        assert_eq!(
            body,
            Some(UpdateStorageBucketBody {
                public: Some(true),
                file_size_limit: Some(5_242_880),
                allowed_mime_types: Some(vec!["image/png".to_string()]),
            })
        );
    }

    #[test]
    fn unset_public_keeps_remote_value() {
        let local = BucketConfig {
            public: None,
            file_size_limit: SizeInBytes(5_242_880),
            ..BucketConfig::default()
        };
        let remote = StorageBucketResponse {
            public: true,
            ..remote_bucket()
        };
        assert!(bucket_update(&local, &remote).is_none());
    }
}
