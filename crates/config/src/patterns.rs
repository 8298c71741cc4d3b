//! Name patterns shared by the loader and validator.

use regex::Regex;
use std::sync::LazyLock;

/// Maximum project id length; docker hostnames cap out at 63 characters.
pub const MAX_PROJECT_ID_LEN: usize = 40;

/// Valid project ids.
pub const PROJECT_ID_PATTERN: &str = r"^[A-Za-z0-9_.-]{1,40}$";

/// Hosted project refs: exactly twenty lowercase letters.
pub const PROJECT_REF_PATTERN: &str = r"^[a-z]{20}$";

/// Valid storage bucket names.
pub const BUCKET_NAME_PATTERN: &str =
    r"^(\w|!|-|\.|\*|'|\(|\)| |&|\$|@|=|;|:|\+|,|\?)*$";

/// Valid function slugs.
pub const FUNCTION_SLUG_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_-]*$";

/// `env(NAME)` or `env(NAME, default)`.
pub const ENV_REFERENCE_PATTERN: &str = r"^env\(\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:,\s*(.*?)\s*)?\)$";

const INVALID_PROJECT_ID_CHARS: &str = r"[^A-Za-z0-9_.-]+";

// Every pattern is a literal, so compilation only fails if a literal above is broken.
static PROJECT_ID: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(PROJECT_ID_PATTERN).ok());
static PROJECT_REF: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(PROJECT_REF_PATTERN).ok());
static BUCKET_NAME: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(BUCKET_NAME_PATTERN).ok());
static FUNCTION_SLUG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(FUNCTION_SLUG_PATTERN).ok());
static ENV_REFERENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(ENV_REFERENCE_PATTERN).ok());
static INVALID_CHARS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(INVALID_PROJECT_ID_CHARS).ok());

fn matches(pattern: &LazyLock<Option<Regex>>, text: &str) -> bool {
    pattern.as_ref().is_some_and(|regex| regex.is_match(text))
}

/// Returns true when `id` matches [`PROJECT_ID_PATTERN`].
pub fn is_valid_project_id(id: &str) -> bool {
    matches(&PROJECT_ID, id)
}

/// Returns true when `project_ref` matches [`PROJECT_REF_PATTERN`].
pub fn is_valid_project_ref(project_ref: &str) -> bool {
    matches(&PROJECT_REF, project_ref)
}

/// Returns true when `name` matches [`BUCKET_NAME_PATTERN`].
pub fn is_valid_bucket_name(name: &str) -> bool {
    matches(&BUCKET_NAME, name)
}

/// Returns true when `slug` matches [`FUNCTION_SLUG_PATTERN`].
pub fn is_valid_function_slug(slug: &str) -> bool {
    matches(&FUNCTION_SLUG, slug)
}

/// Split an `env(...)` reference into its name and optional default.
pub fn parse_env_reference(text: &str) -> Option<(&str, Option<&str>)> {
    let captures = ENV_REFERENCE.as_ref()?.captures(text)?;
    let name = captures.get(1)?.as_str();
    let default = captures.get(2).map(|value| value.as_str());
    Some((name, default))
}

/// Coerce arbitrary text into a project id.
///
/// Runs of invalid characters become one `_`, leading `_`, `.` and `-` are
/// dropped, and the result is cut to [`MAX_PROJECT_ID_LEN`]. Applying it twice
/// gives the same result as applying it once.
pub fn sanitize_project_id(raw: &str) -> String {
    let replaced = INVALID_CHARS.as_ref().map_or_else(
        || raw.to_string(),
        |regex| regex.replace_all(raw, "_").into_owned(),
    );
    replaced
        .trim_start_matches(['_', '.', '-'])
        .chars()
        .take(MAX_PROJECT_ID_LEN)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sanitize_known_inputs() {
        assert_eq!(sanitize_project_id("_@abc"), "abc");
        assert_eq!(sanitize_project_id("a@@bc-"), "a_bc-");
        assert_eq!(sanitize_project_id(&"a".repeat(42)), "a".repeat(40));
        assert_eq!(sanitize_project_id("my project"), "my_project");
        assert_eq!(sanitize_project_id("ok.id-1"), "ok.id-1");
    }

    #[test]
    fn env_reference_forms() {
        assert_eq!(parse_env_reference("env(FOO)"), Some(("FOO", None)));
        assert_eq!(
            parse_env_reference("env( FOO , fallback value )"),
            Some(("FOO", Some("fallback value")))
        );
        assert_eq!(parse_env_reference("env(FOO,)"), Some(("FOO", Some(""))));
        assert_eq!(parse_env_reference("prefix env(FOO)"), None);
        assert_eq!(parse_env_reference("env(1FOO)"), None);
    }

    #[test]
    fn name_patterns() {
        assert!(is_valid_bucket_name("avatars (public) & more"));
        assert!(!is_valid_bucket_name("bad/name"));
        assert!(is_valid_function_slug("hello-world_2"));
        assert!(!is_valid_function_slug("2hello"));
        assert!(!is_valid_function_slug("hello.world"));
        assert!(is_valid_project_id("abc"));
        assert!(!is_valid_project_id(""));
        assert!(!is_valid_project_id(&"a".repeat(41)));
        assert!(is_valid_project_ref("abcdefghijklmnopqrst"));
        assert!(!is_valid_project_ref("not-a-ref"));
        assert!(!is_valid_project_ref("ABCDEFGHIJKLMNOPQRST"));
    }

    proptest! {
        #[test]
        fn sanitize_is_idempotent(raw in ".{0,60}") {
            let once = sanitize_project_id(&raw);
            prop_assert_eq!(sanitize_project_id(&once), once.clone());
            if !once.is_empty() {
                prop_assert!(is_valid_project_id(&once));
            }
        }
    }
}
