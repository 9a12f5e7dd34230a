//! Shared object envelope: type identity plus object/list metadata.
//!
//! Every top-level persisted entity is composed of a [`TypeMeta`] (flattened
//! onto the wire, so `kind` and `apiVersion` appear as top-level fields) and
//! an [`ObjectMeta`]. The [`Object`] trait gives callers uniform access to
//! both without knowing the concrete kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// True when a value equals its type's default. Used to drop empty/zero
/// optional fields from the wire form.
pub fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}

// --- Type identity ---

/// Kind/version tag carried by every top-level object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
}

impl TypeMeta {
    /// Tag for one of the built-in extension kinds.
    pub fn for_kind(kind: &str) -> Self {
        Self {
            kind: kind.to_string(),
            api_version: pkg_constants::api::GROUP_VERSION.to_string(),
        }
    }
}

// --- Object metadata ---

/// Standard object metadata: globally addressable identity plus the
/// monotonically comparable revision token the persistence layer uses for
/// optimistic concurrency.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    /// Assigned by the persistence layer on create; opaque to everyone else.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uid: String,
    /// Monotonic per-object revision. 0 means "never persisted"; a non-zero
    /// value on a write acts as an optimistic-concurrency precondition.
    #[serde(default, skip_serializing_if = "is_default")]
    pub resource_version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, String>,
}

impl ObjectMeta {
    /// Metadata naming an object, with everything else left for the
    /// persistence layer to fill in.
    pub fn named(namespace: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            ..Default::default()
        }
    }
}

// --- List metadata ---

/// Metadata carried by `*List` wrappers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListMeta {
    /// Revision high-water mark of the listed items.
    #[serde(default, skip_serializing_if = "is_default")]
    pub resource_version: u64,
}

// --- Uniform accessors ---

/// Uniform identity/metadata accessors across all top-level entities.
pub trait Object {
    fn type_meta(&self) -> &TypeMeta;
    fn type_meta_mut(&mut self) -> &mut TypeMeta;
    fn metadata(&self) -> &ObjectMeta;
    fn metadata_mut(&mut self) -> &mut ObjectMeta;
}
