//! Bidirectional mapping between config sections and control-plane bodies.
//!
//! Each section gets `to_update_body` (local to request) and `from_remote`
//! (response seeded into a local copy) plus `diff_with_remote`, which renders
//! both local-shaped trees and diffs them.
//!
//! Secrets only travel outward when the cleartext is known and hashed. On the
//! way back only the hash is replaced, so drift shows up without the remote
//! cleartext ever entering the local tree.

mod api;
mod auth;
mod db;
mod storage;

pub use storage::bucket_update;

use crate::secret::Secret;
use supaconf_api::v1::Nullable;

/// Join a list for transport.
pub(crate) fn join_list(items: &[String]) -> String {
    items.join(",")
}

/// Split a transported list, trimming entries and dropping empties.
pub(crate) fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Cleartext to push, or unset when the local side cannot supply it.
pub(crate) fn push_secret(secret: &Secret) -> Nullable<String> {
    match secret.value() {
        Some(value) if secret.is_pushable() => Nullable::Value(value.to_string()),
        _ => Nullable::Unset,
    }
}

/// Adopt the remote hash when the local side holds one.
pub(crate) fn seed_secret(secret: &mut Secret, remote_hash: Option<&str>) {
    if !secret.sha256().is_empty() {
        secret.set_sha256(remote_hash.unwrap_or_default());
    }
}

pub(crate) fn wire_int(value: u32) -> i64 {
    i64::from(value)
}

pub(crate) fn local_int(value: i64) -> u32 {
    u32::try_from(value).unwrap_or_default()
}

pub(crate) fn wire_secs(value: crate::units::GoDuration) -> i64 {
    i64::try_from(value.as_secs()).unwrap_or(i64::MAX)
}

pub(crate) fn local_secs(value: i64) -> crate::units::GoDuration {
    crate::units::GoDuration::from_secs(u64::try_from(value).unwrap_or_default())
}
