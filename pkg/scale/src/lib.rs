//! Scale subresource resolution.
//!
//! One autoscaling algorithm drives many unrelated controller kinds by going
//! through the scale projection: a [`SubresourceReference`] names a target,
//! a per-kind [`ScaleTarget`] adapter projects it onto the common
//! [`Scale`] shape, and the [`SubresourceResolver`] dispatches between them.
//! The set of resolvable kinds is runtime data; nothing here is hard-coded.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use pkg_constants::api::SUBRESOURCE_SCALE;
use pkg_types::error::ResourceError;
use pkg_types::hpa::HorizontalPodAutoscalerSpec;
use pkg_types::scale::{Scale, ScaleSpec, ScaleStatus, SubresourceReference};
use pkg_types::validate;

/// Projection of one controller kind onto the scale shape.
///
/// Implemented by whatever owns the kind's objects (the serving layer, a
/// controller, a test double). `apply_scale` is a request, not a guarantee:
/// the returned status reflects the controller's current view, which may lag
/// the spec until the controller converges.
#[async_trait]
pub trait ScaleTarget: Send + Sync {
    /// The controller kind this adapter projects, e.g. "ReplicationController".
    fn kind(&self) -> &str;

    async fn get_scale(&self, namespace: &str, name: &str) -> Result<Scale, ResourceError>;

    async fn apply_scale(
        &self,
        namespace: &str,
        name: &str,
        spec: &ScaleSpec,
    ) -> Result<ScaleStatus, ResourceError>;
}

/// Entry in the kind registry. `Reserved` parks a type name that has no
/// projection behind it; resolving against it reports `Unsupported`, not
/// "unknown kind".
enum KindEntry {
    Scalable(Arc<dyn ScaleTarget>),
    Reserved,
}

/// Resolves subresource references against the registered kinds.
#[derive(Default)]
pub struct SubresourceResolver {
    kinds: HashMap<String, KindEntry>,
}

impl SubresourceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a scale projection for its kind. A later registration for
    /// the same kind replaces the earlier one.
    pub fn register(&mut self, target: Arc<dyn ScaleTarget>) {
        debug!("Registering scale projection for kind {}", target.kind());
        self.kinds
            .insert(target.kind().to_string(), KindEntry::Scalable(target));
    }

    /// Reserve a kind name without attaching a projection.
    pub fn reserve(&mut self, kind: &str) {
        self.kinds
            .entry(kind.to_string())
            .or_insert(KindEntry::Reserved);
    }

    pub fn is_registered(&self, kind: &str) -> bool {
        self.kinds.contains_key(kind)
    }

    fn target_for(
        &self,
        reference: &SubresourceReference,
    ) -> Result<&Arc<dyn ScaleTarget>, ResourceError> {
        validate::validate_subresource_reference(reference)?;
        let subresource = reference.subresource_or_default();
        if subresource != SUBRESOURCE_SCALE {
            return Err(ResourceError::unsupported(
                &reference.kind,
                format!("the \"{subresource}\" subresource"),
            ));
        }
        match self.kinds.get(&reference.kind) {
            Some(KindEntry::Scalable(target)) => Ok(target),
            Some(KindEntry::Reserved) | None => Err(ResourceError::unsupported(
                &reference.kind,
                "the scale subresource",
            )),
        }
    }

    /// Read the scale view of the referenced object.
    pub async fn resolve(&self, reference: &SubresourceReference) -> Result<Scale, ResourceError> {
        let target = self.target_for(reference)?;
        target
            .get_scale(&reference.namespace, &reference.name)
            .await
    }

    /// Write the desired replica count through the referenced scale view.
    /// The returned status may lag the request; convergence is eventual.
    pub async fn apply(
        &self,
        reference: &SubresourceReference,
        spec: &ScaleSpec,
    ) -> Result<ScaleStatus, ResourceError> {
        let target = self.target_for(reference)?;
        target
            .apply_scale(&reference.namespace, &reference.name, spec)
            .await
    }

    /// An autoscaler whose `scaleRef` names a kind with no scale projection
    /// is misconfigured. Surfaced as a data-validity condition so writers
    /// find out up front, instead of the scaling loop silently no-op-ing.
    pub fn check_autoscaler_target(
        &self,
        spec: &HorizontalPodAutoscalerSpec,
    ) -> Result<(), ResourceError> {
        validate::validate_autoscaler_spec(spec)?;
        match self.target_for(&spec.scale_ref) {
            Ok(_) => Ok(()),
            Err(ResourceError::Unsupported { kind, detail }) => {
                Err(ResourceError::invalid_spec(format!(
                    "scaleRef kind \"{kind}\" has no {detail}"
                )))
            }
            Err(other) => Err(other),
        }
    }
}
