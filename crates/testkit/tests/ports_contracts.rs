//! Contract-style tests for the port traits using the in-memory doubles.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use supaconf_api::v1::{
    NetworkRestrictionsConfig, StorageBucketResponse, UpdateStorageBucketBody,
    UpdateStorageConfigBody,
};
use supaconf_ports::{
    FILE_MODE, FileSystemPort, FileSystemPortExt, ManagementApiPort, SharedFileSystem,
    SharedManagementApi,
};
use supaconf_shared::{ErrorCode, RequestContext, Result};
use supaconf_testkit::{FakeManagementApi, FakeProjectState, InMemoryFileSystem};

const PROJECT: &str = "abcdefghijklmnopqrst";

#[test]
fn filesystem_port_contract_smoke() -> Result<()> {
    let fs: SharedFileSystem = Arc::new(
        InMemoryFileSystem::new()
            .with_file("supabase/config.toml", "project_id = \"demo\"\n")
            .with_file("supabase/migrations/0001_init.sql", "create table t();"),
    );

    assert!(fs.exists(Path::new("supabase/config.toml"))?);
    assert!(fs.stat(Path::new("supabase/migrations"))?.is_dir());
    assert_eq!(
        fs.glob("supabase/migrations/*.sql")?,
        vec![PathBuf::from("supabase/migrations/0001_init.sql")]
    );

    fs.write_file(Path::new("supabase/.temp"), b"x", FILE_MODE)?;
    fs.remove(Path::new("supabase/.temp"))?;
    let missing = fs.read_file(Path::new("supabase/.temp")).unwrap_err();
    assert_eq!(missing.code, ErrorCode::not_found());
    Ok(())
}

#[tokio::test]
async fn management_port_contract_smoke() -> Result<()> {
    let ctx = RequestContext::new_run();
    let fake = Arc::new(FakeManagementApi::new());
    fake.insert_project(
        PROJECT,
        FakeProjectState {
            buckets: vec![StorageBucketResponse {
                id: "images".to_string(),
                name: "images".to_string(),
                ..StorageBucketResponse::default()
            }],
            ..FakeProjectState::default()
        },
    )
    .await;
    let api: SharedManagementApi = fake.clone();

    let storage = UpdateStorageConfigBody {
        file_size_limit: Some(1024),
        features: None,
    };
    assert!(api.update_storage_config(&ctx, PROJECT, &storage).await?.is_success());
    let current = api.get_storage_config(&ctx, PROJECT).await?.into_parsed().unwrap();
    assert_eq!(current.file_size_limit, 1024);

    let bucket = UpdateStorageBucketBody {
        public: Some(true),
        file_size_limit: None,
        allowed_mime_types: Some(vec!["image/png".to_string()]),
    };
    api.update_bucket(&ctx, PROJECT, "images", &bucket).await?;
    let buckets = api.list_buckets(&ctx, PROJECT).await?.into_parsed().unwrap();
    assert!(buckets[0].public);

    let restrictions = NetworkRestrictionsConfig {
        db_allowed_cidrs: Some(vec!["10.0.0.0/8".to_string()]),
        db_allowed_cidrs_v6: Some(Vec::new()),
    };
    api.apply_network_restrictions(&ctx, PROJECT, &restrictions).await?;
    api.enable_webhooks(&ctx, PROJECT).await?;

    let state = fake.project(PROJECT).await.unwrap();
    assert!(state.webhooks_enabled);
    assert_eq!(state.network_restrictions.config, restrictions);

    let calls = fake.calls().await;
    assert_eq!(calls.len(), 7);
    assert_eq!(calls[0].target, PROJECT);
    assert!(calls[0].body.is_some());
    Ok(())
}

#[tokio::test]
async fn project_lifecycle_hides_database_password() -> Result<()> {
    let ctx = RequestContext::new_run();
    let fake = FakeManagementApi::new();
    let created = fake
        .create_project(
            &ctx,
            &supaconf_api::v1::CreateProjectBody {
                name: "demo".to_string(),
                organization_id: "org".to_string(),
                db_pass: "hunter2".to_string(),
                region: "us-east-1".to_string(),
            },
        )
        .await?;
    assert_eq!(created.status_code, 201);
    let project = created.into_parsed().unwrap();
    assert_eq!(project.id.len(), 20);

    let listed = fake.list_projects(&ctx).await?.into_parsed().unwrap();
    assert_eq!(listed.len(), 1);
    let recorded = fake.calls().await;
    assert!(!recorded[0].body.as_ref().unwrap().to_string().contains("hunter2"));

    fake.delete_project(&ctx, &project.id).await?;
    assert_eq!(fake.get_project(&ctx, &project.id).await?.status_code, 404);
    Ok(())
}
