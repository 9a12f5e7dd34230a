//! The scale subresource: a uniform read/write view of "how many replicas"
//! for any controller kind that exposes one.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::meta::{Object, ObjectMeta, TypeMeta, is_default};

// --- Subresource reference ---

/// Names a target object and which subresource view of it to act on
/// (e.g. the scale view of ReplicationController "web" in "default").
///
/// Carries no referential integrity of its own; resolution happens in the
/// serving layer. `kind` and `name` must be non-empty for the reference to
/// be resolvable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubresourceReference {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub namespace: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub subresource: String,
}

impl SubresourceReference {
    /// Reference to the scale view of `kind` `namespace`/`name`.
    pub fn scale(kind: &str, namespace: &str, name: &str) -> Self {
        Self {
            kind: kind.to_string(),
            namespace: namespace.to_string(),
            name: name.to_string(),
            subresource: pkg_constants::api::SUBRESOURCE_SCALE.to_string(),
            ..Default::default()
        }
    }

    /// The subresource to resolve; empty defaults to the scale view.
    pub fn subresource_or_default(&self) -> &str {
        if self.subresource.is_empty() {
            pkg_constants::api::SUBRESOURCE_SCALE
        } else {
            &self.subresource
        }
    }
}

// --- Scale spec / status ---

/// Desired replica count. Writing it is a request to the owning controller,
/// not a guarantee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleSpec {
    #[serde(default, skip_serializing_if = "is_default")]
    pub replicas: u32,
}

/// Most recently observed replica count, populated by the controller that
/// owns the target, plus the label query over the pods it governs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleStatus {
    pub replicas: u32,
    /// Empty means "defer to the target's template-derived selector",
    /// never "match nothing".
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub selector: HashMap<String, String>,
}

// --- Scale ---

/// Projection of any controller's replica count onto one shape, so a single
/// autoscaler implementation can drive unrelated controller kinds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scale {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub spec: ScaleSpec,
    #[serde(default, skip_serializing_if = "is_default")]
    pub status: ScaleStatus,
}

impl Object for Scale {
    fn type_meta(&self) -> &TypeMeta {
        &self.type_meta
    }
    fn type_meta_mut(&mut self) -> &mut TypeMeta {
        &mut self.type_meta
    }
    fn metadata(&self) -> &ObjectMeta {
        &self.metadata
    }
    fn metadata_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_round_trips() {
        let scale = Scale {
            type_meta: TypeMeta::for_kind(pkg_constants::api::KIND_SCALE),
            metadata: ObjectMeta::named("default", "web"),
            spec: ScaleSpec { replicas: 6 },
            status: ScaleStatus {
                replicas: 4,
                selector: HashMap::from([("app".to_string(), "web".to_string())]),
            },
        };
        let json = serde_json::to_string(&scale).unwrap();
        let back: Scale = serde_json::from_str(&json).unwrap();
        assert_eq!(scale, back);
    }

    #[test]
    fn type_meta_is_inline() {
        let scale = Scale {
            type_meta: TypeMeta::for_kind(pkg_constants::api::KIND_SCALE),
            ..Default::default()
        };
        let json = serde_json::to_value(&scale).unwrap();
        assert_eq!(json["kind"], "Scale");
        assert_eq!(json["apiVersion"], "experimental/v1");
        assert!(json.get("typeMeta").is_none());
    }

    #[test]
    fn empty_selector_is_omitted_not_empty_object() {
        // Consumers distinguish "defer to the target's selector" by absence.
        let status = ScaleStatus {
            replicas: 3,
            selector: HashMap::new(),
        };
        let json = serde_json::to_value(&status).unwrap();
        assert!(json.get("selector").is_none());
        let back: ScaleStatus = serde_json::from_value(json).unwrap();
        assert!(back.selector.is_empty());
    }

    #[test]
    fn empty_subresource_defaults_to_scale() {
        let mut reference = SubresourceReference::scale("ReplicationController", "default", "web");
        assert_eq!(reference.subresource_or_default(), "scale");
        reference.subresource.clear();
        assert_eq!(reference.subresource_or_default(), "scale");
    }
}
