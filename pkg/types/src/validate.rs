//! Write-time validation for the extension kinds.
//!
//! Every violation is reported as [`ResourceError::InvalidSpec`]; nothing
//! here is retried or recovered.

use std::collections::HashSet;

use pkg_constants::state::{MAX_NAME_LEN, MAX_QUALIFIED_NAME_LEN};

use crate::error::{ResourceError, ResourceResult};
use crate::hpa::{HorizontalPodAutoscaler, HorizontalPodAutoscalerSpec};
use crate::scale::SubresourceReference;
use crate::thirdparty::{ThirdPartyResource, ThirdPartyResourceData};

/// Validate a resource name.
/// Rules: lowercase `[a-z0-9-]`, max 63 chars, no leading/trailing hyphens.
pub fn validate_name(name: &str) -> ResourceResult<()> {
    if name.is_empty() {
        return Err(ResourceError::invalid_spec("name must not be empty"));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(ResourceError::invalid_spec(format!(
            "name '{}' exceeds {} characters (got {})",
            name,
            MAX_NAME_LEN,
            name.len()
        )));
    }
    if name.starts_with('-') || name.ends_with('-') {
        return Err(ResourceError::invalid_spec(format!(
            "name '{name}' must not start or end with a hyphen"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ResourceError::invalid_spec(format!(
            "name '{name}' must contain only lowercase letters, digits, and hyphens [a-z0-9-]"
        )));
    }
    Ok(())
}

/// Validate a dotted kind name like `cron-tab.example.com`:
/// every dot-separated segment follows the plain name rules.
pub fn validate_qualified_name(name: &str) -> ResourceResult<()> {
    if name.len() > MAX_QUALIFIED_NAME_LEN {
        return Err(ResourceError::invalid_spec(format!(
            "name '{}' exceeds {} characters (got {})",
            name,
            MAX_QUALIFIED_NAME_LEN,
            name.len()
        )));
    }
    for segment in name.split('.') {
        validate_name(segment)?;
    }
    Ok(())
}

/// A reference is resolvable only when it names a kind and an object.
pub fn validate_subresource_reference(reference: &SubresourceReference) -> ResourceResult<()> {
    if reference.kind.is_empty() {
        return Err(ResourceError::invalid_spec("scaleRef.kind must not be empty"));
    }
    if reference.name.is_empty() {
        return Err(ResourceError::invalid_spec("scaleRef.name must not be empty"));
    }
    Ok(())
}

pub fn validate_autoscaler_spec(spec: &HorizontalPodAutoscalerSpec) -> ResourceResult<()> {
    validate_subresource_reference(&spec.scale_ref)?;
    if spec.min_count > spec.max_count {
        return Err(ResourceError::invalid_spec(format!(
            "minCount ({}) must not exceed maxCount ({})",
            spec.min_count, spec.max_count
        )));
    }
    if spec.target.resource.is_empty() {
        return Err(ResourceError::invalid_spec(
            "target.resource must name a metric",
        ));
    }
    if spec.target.quantity.is_negative() {
        return Err(ResourceError::invalid_spec(format!(
            "target.quantity ({}) must not be negative",
            spec.target.quantity
        )));
    }
    Ok(())
}

pub fn validate_autoscaler(hpa: &HorizontalPodAutoscaler) -> ResourceResult<()> {
    validate_name(&hpa.metadata.name)?;
    validate_name(&hpa.metadata.namespace)?;
    validate_autoscaler_spec(&hpa.spec)
}

pub fn validate_third_party_resource(resource: &ThirdPartyResource) -> ResourceResult<()> {
    validate_qualified_name(&resource.metadata.name)?;
    validate_name(&resource.metadata.namespace)?;
    if resource.versions.is_empty() {
        return Err(ResourceError::invalid_spec(
            "versions must declare at least one entry",
        ));
    }
    let mut seen = HashSet::new();
    for version in &resource.versions {
        validate_name(&version.name)?;
        if !seen.insert(version.name.as_str()) {
            return Err(ResourceError::invalid_spec(format!(
                "duplicate version name '{}'",
                version.name
            )));
        }
    }
    Ok(())
}

pub fn validate_third_party_resource_data(
    data: &ThirdPartyResourceData,
) -> ResourceResult<()> {
    validate_name(&data.metadata.name)?;
    validate_name(&data.metadata.namespace)
}
