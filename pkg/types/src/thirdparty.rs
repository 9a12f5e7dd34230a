//! Dynamically registered resource kinds.
//!
//! A [`ThirdPartyResource`] declares a kind the control plane did not know
//! at build time, together with the schema versions clients may use for it.
//! Instances of such a kind travel through the system as
//! [`ThirdPartyResourceData`]: an ordinary object envelope around an opaque
//! byte payload that only schema-aware clients interpret.

use serde::{Deserialize, Serialize};

use crate::meta::{ListMeta, Object, ObjectMeta, TypeMeta, is_default};

// --- API version ---

/// One concrete schema version of a dynamically registered kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct APIVersion {
    /// Version name, e.g. "v1".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// API group to serve this version under. Empty means the default
    /// experimental group; the defaulting itself happens at the consuming
    /// boundary, never here.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_group: String,
}

impl APIVersion {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            api_group: String::new(),
        }
    }
}

// --- Third-party resource ---

/// Registration of a new kind and the versions clients and servers may use
/// to exchange instances of it. Deleting a registration stops future
/// serving; already-stored [`ThirdPartyResourceData`] is not purged here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyResource {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Must be non-empty with unique version names. Old versions keep
    /// working when new ones are added; transitions are additive.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<APIVersion>,
}

impl Object for ThirdPartyResource {
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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyResourceList {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: ListMeta,
    pub items: Vec<ThirdPartyResource>,
}

// --- Third-party resource data ---

/// Storage envelope for one instance of a dynamically registered kind.
///
/// `data` is an undifferentiated serialized payload, assumed to be valid
/// under some declared version of the owning registration. This layer never
/// inspects, mutates, or truncates it; shape errors surface at the consuming
/// client, not at write time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyResourceData {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: ObjectMeta,
    /// Raw payload bytes, base64 on the wire.
    #[serde(default, with = "base64_bytes", skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<u8>,
}

impl Object for ThirdPartyResourceData {
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

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyResourceDataList {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: ListMeta,
    pub items: Vec<ThirdPartyResourceData>,
}

mod base64_bytes {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_round_trips() {
        let tpr = ThirdPartyResource {
            type_meta: TypeMeta::for_kind(pkg_constants::api::KIND_THIRD_PARTY_RESOURCE),
            metadata: ObjectMeta::named("default", "cron-tab.example.com"),
            description: "cron tabs for the batch team".to_string(),
            versions: vec![APIVersion::named("v1"), APIVersion::named("v2")],
        };
        let json = serde_json::to_string(&tpr).unwrap();
        let back: ThirdPartyResource = serde_json::from_str(&json).unwrap();
        assert_eq!(tpr, back);
    }

    #[test]
    fn data_wire_field_is_named_data() {
        let data = ThirdPartyResourceData {
            type_meta: TypeMeta::for_kind(pkg_constants::api::KIND_THIRD_PARTY_RESOURCE_DATA),
            metadata: ObjectMeta::named("default", "nightly"),
            data: br#"{"schedule":"0 2 * * *"}"#.to_vec(),
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("data").is_some());
        assert!(json.get("name").is_none());
        let back: ThirdPartyResourceData = serde_json::from_value(json).unwrap();
        assert_eq!(data, back);
    }

    #[test]
    fn payload_survives_arbitrary_bytes() {
        // Not UTF-8, not JSON, not valid under any schema.
        let payload = vec![0u8, 159, 146, 150, 255, 1, 2];
        let data = ThirdPartyResourceData {
            data: payload.clone(),
            ..Default::default()
        };
        let json = serde_json::to_string(&data).unwrap();
        let back: ThirdPartyResourceData = serde_json::from_str(&json).unwrap();
        assert_eq!(back.data, payload);
    }

    #[test]
    fn empty_payload_is_omitted() {
        let data = ThirdPartyResourceData::default();
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("data").is_none());
    }
}
