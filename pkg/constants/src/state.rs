//! State store key layout.
//!
//! Every persisted object lives at `<prefix><namespace>/<name>`.

/// etcd-style key prefix for horizontal pod autoscalers.
pub const HPA_PREFIX: &str = "/registry/horizontalpodautoscalers/";

/// Key prefix for third-party resource registrations.
pub const THIRD_PARTY_RESOURCE_PREFIX: &str = "/registry/thirdpartyresources/";

/// Key prefix for stored third-party resource payloads.
pub const THIRD_PARTY_RESOURCE_DATA_PREFIX: &str = "/registry/thirdpartyresourcedata/";

/// Maximum length of an object name segment.
pub const MAX_NAME_LEN: usize = 63;

/// Maximum length of a dotted (qualified) third-party kind name.
pub const MAX_QUALIFIED_NAME_LEN: usize = 253;
