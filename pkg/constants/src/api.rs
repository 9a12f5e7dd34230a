//! API group / kind constants for the extension kinds.

/// The API group third-party versions fall back to when they declare none.
pub const DEFAULT_API_GROUP: &str = "experimental";

/// Version served for the built-in extension kinds.
pub const API_VERSION_V1: &str = "v1";

/// `apiVersion` tag stamped on persisted extension objects.
pub const GROUP_VERSION: &str = "experimental/v1";

/// Name of the scale subresource view.
pub const SUBRESOURCE_SCALE: &str = "scale";

// ─── Kind names ────────────────────────────────────────────────────────────

pub const KIND_SCALE: &str = "Scale";
pub const KIND_HORIZONTAL_POD_AUTOSCALER: &str = "HorizontalPodAutoscaler";
pub const KIND_HORIZONTAL_POD_AUTOSCALER_LIST: &str = "HorizontalPodAutoscalerList";
pub const KIND_THIRD_PARTY_RESOURCE: &str = "ThirdPartyResource";
pub const KIND_THIRD_PARTY_RESOURCE_LIST: &str = "ThirdPartyResourceList";
pub const KIND_THIRD_PARTY_RESOURCE_DATA: &str = "ThirdPartyResourceData";
pub const KIND_THIRD_PARTY_RESOURCE_DATA_LIST: &str = "ThirdPartyResourceDataList";

// ─── Metric resource names ─────────────────────────────────────────────────

/// CPU, measured in cores (quantities like `500m` = half a core).
pub const RESOURCE_CPU: &str = "cpu";

/// Memory, measured in bytes (quantities like `128Mi`).
pub const RESOURCE_MEMORY: &str = "memory";
