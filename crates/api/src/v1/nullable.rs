//! Tri-state wrapper for optional-and-nullable JSON members.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A JSON member that is absent, explicitly `null`, or carries a value.
///
/// `null` asks the control plane to reset a field to its platform default,
/// which is why this cannot collapse into `Option<T>`. Fields using it must
/// be annotated with
/// `#[serde(default, skip_serializing_if = "Nullable::is_unset")]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Nullable<T> {
    /// The member is not present.
    #[default]
    Unset,
    /// The member is present and `null`.
    Null,
    /// The member carries a value.
    Value(T),
}

impl<T> Nullable<T> {
    /// Returns true when the member is absent.
    pub const fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns true when the member is explicitly null.
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the value when present.
    pub const fn get(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    /// Convert into an `Option`, folding unset and null together.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Value(value) => Some(value),
            Self::Unset | Self::Null => None,
        }
    }

    /// Borrow the inner value.
    pub const fn as_ref(&self) -> Nullable<&T> {
        match self {
            Self::Unset => Nullable::Unset,
            Self::Null => Nullable::Null,
            Self::Value(value) => Nullable::Value(value),
        }
    }

    /// Map the inner value, preserving unset/null.
    pub fn map<U>(self, op: impl FnOnce(T) -> U) -> Nullable<U> {
        match self {
            Self::Unset => Nullable::Unset,
            Self::Null => Nullable::Null,
            Self::Value(value) => Nullable::Value(op(value)),
        }
    }
}

impl<T: Clone> Nullable<T> {
    /// Return the value, or `fallback` when unset or null.
    pub fn value_or(&self, fallback: T) -> T {
        self.get().cloned().unwrap_or(fallback)
    }
}

impl<T: Default + Clone> Nullable<T> {
    /// Return the value, or the type's zero when unset or null.
    pub fn value_or_default(&self) -> T {
        self.get().cloned().unwrap_or_default()
    }
}

impl<T> From<T> for Nullable<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T> From<Option<T>> for Nullable<T> {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Self::Value)
    }
}

impl<T: Serialize> Serialize for Nullable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(value) => value.serialize(serializer),
            Self::Unset | Self::Null => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Nullable<T> {
    // Only reached when the member is present; absence comes from `#[serde(default)]`.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<T>::deserialize(deserializer)?.into())
    }
}
