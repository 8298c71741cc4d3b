//! `[api]` against the Data API (PostgREST) config.

use super::{join_list, local_int, split_list, wire_int};
use crate::diff::diff_with_seed;
use crate::error::ConfigError;
use crate::schema::ApiConfig;
use supaconf_api::v1::{PostgrestConfigResponse, UpdatePostgrestConfigBody};

impl ApiConfig {
    /// PATCH body; a disabled API is sent as an empty `db_schema`.
    pub fn to_update_body(&self) -> UpdatePostgrestConfigBody {
        if !self.enabled {
            return UpdatePostgrestConfigBody {
                db_schema: Some(String::new()),
                ..UpdatePostgrestConfigBody::default()
            };
        }
        UpdatePostgrestConfigBody {
            db_schema: (!self.schemas.is_empty()).then(|| join_list(&self.schemas)),
            db_extra_search_path: Some(join_list(&self.extra_search_path)),
            max_rows: (self.max_rows > 0).then(|| wire_int(self.max_rows)),
            ..UpdatePostgrestConfigBody::default()
        }
    }

    /// Seed this section from a remote response.
    pub fn from_remote(&mut self, remote: &PostgrestConfigResponse) {
        self.enabled = !remote.db_schema.is_empty();
        if !self.enabled {
            return;
        }
        self.schemas = split_list(&remote.db_schema);
        self.extra_search_path = split_list(&remote.db_extra_search_path);
        self.max_rows = local_int(remote.max_rows);
    }

    /// Unified diff of local against remote; empty when in sync.
    pub fn diff_with_remote(&self, remote: &PostgrestConfigResponse) -> Result<String, ConfigError> {
        diff_with_seed("api", self, |seeded| seeded.from_remote(remote))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local() -> ApiConfig {
        ApiConfig {
            enabled: true,
            schemas: vec!["public".to_string(), "private".to_string()],
            extra_search_path: vec!["extensions".to_string(), "public".to_string()],
            max_rows: 1000,
            ..ApiConfig::default()
        }
    }

    #[test]
    fn update_body_joins_lists() {
        let body = local().to_update_body();
        assert_eq!(body.db_schema.as_deref(), Some("public,private"));
        assert_eq!(body.db_extra_search_path.as_deref(), Some("extensions,public"));
        assert_eq!(body.max_rows, Some(1000));
    }

    #[test]
    fn disabled_api_clears_schema() {
        let api = ApiConfig {
            enabled: false,
            ..local()
        };
        let body = api.to_update_body();
        assert_eq!(body.db_schema.as_deref(), Some(""));
        assert!(body.max_rows.is_none());
    }

    #[test]
    fn diff_reports_schema_and_row_drift() -> Result<(), ConfigError> {
        let remote = PostgrestConfigResponse {
            db_schema: "public".to_string(),
            db_extra_search_path: "public".to_string(),
            max_rows: 500,
            ..PostgrestConfigResponse::default()
        };
        let diff = local().diff_with_remote(&remote)?;
        assert!(diff.contains("+schemas = [\"public\", \"private\"]"), "{diff}");
        assert!(diff.contains("-max_rows = 500"), "{diff}");
        assert!(diff.contains("+max_rows = 1000"), "{diff}");
        Ok(())
    }

    #[test]
    fn matching_remote_has_no_diff() -> Result<(), ConfigError> {
        let remote = PostgrestConfigResponse {
            db_schema: "public, private".to_string(),
            db_extra_search_path: "extensions,public".to_string(),
            max_rows: 1000,
            ..PostgrestConfigResponse::default()
        };
        assert_eq!(local().diff_with_remote(&remote)?, "");
        Ok(())
    }
}
