//! Horizontal pod autoscaler objects: declarative bounds and a consumption
//! target for one autoscaling loop. The loop itself lives elsewhere; these
//! types only carry its configuration and observed state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::meta::{ListMeta, Object, ObjectMeta, TypeMeta, is_default};
use crate::quantity::Quantity;
use crate::scale::SubresourceReference;

// --- Resource consumption ---

/// A (metric name, amount) pair. Used both as a target (desired average)
/// and as an observed current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceConsumption {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(default, skip_serializing_if = "is_default")]
    pub quantity: Quantity,
}

impl ResourceConsumption {
    pub fn new(resource: &str, quantity: Quantity) -> Self {
        Self {
            resource: resource.to_string(),
            quantity,
        }
    }
}

// --- HPA spec ---

/// What to scale, within which bounds, toward which average consumption.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPodAutoscalerSpec {
    /// The scale subresource this autoscaler drives. The loop learns current
    /// consumption from its status and writes the desired count to its spec.
    pub scale_ref: SubresourceReference,
    /// Lower bound for the replica count. Must not exceed `max_count`.
    pub min_count: u32,
    /// Upper bound for the replica count.
    pub max_count: u32,
    /// Target average consumption the loop tries to maintain by adjusting
    /// the replica count.
    pub target: ResourceConsumption,
}

// --- HPA status ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPodAutoscalerStatus {
    pub current_replicas: u32,
    /// May differ from `current_replicas`: downscaling is sometimes delayed
    /// to keep the count stable.
    pub desired_replicas: u32,
    pub current_consumption: ResourceConsumption,
    /// Set only by the scaling loop, right after it changes the target's
    /// replica count; absence means the loop has never scaled. The loop
    /// reads it back to enforce a minimum interval between scale events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_scale_timestamp: Option<DateTime<Utc>>,
}

// --- HPA ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPodAutoscaler {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub spec: HorizontalPodAutoscalerSpec,
    #[serde(default, skip_serializing_if = "is_default")]
    pub status: HorizontalPodAutoscalerStatus,
}

impl Object for HorizontalPodAutoscaler {
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

/// Collection wrapper; item order is storage order and carries no meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HorizontalPodAutoscalerList {
    #[serde(flatten)]
    pub type_meta: TypeMeta,
    #[serde(default, skip_serializing_if = "is_default")]
    pub metadata: ListMeta,
    pub items: Vec<HorizontalPodAutoscaler>,
}
