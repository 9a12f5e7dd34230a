use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;
use uuid::Uuid;

use pkg_constants::api::{
    KIND_HORIZONTAL_POD_AUTOSCALER, KIND_HORIZONTAL_POD_AUTOSCALER_LIST,
    KIND_THIRD_PARTY_RESOURCE, KIND_THIRD_PARTY_RESOURCE_DATA,
    KIND_THIRD_PARTY_RESOURCE_DATA_LIST, KIND_THIRD_PARTY_RESOURCE_LIST,
};
use pkg_constants::state::{
    HPA_PREFIX, THIRD_PARTY_RESOURCE_DATA_PREFIX, THIRD_PARTY_RESOURCE_PREFIX,
};
use pkg_types::error::ResourceError;
use pkg_types::hpa::{HorizontalPodAutoscaler, HorizontalPodAutoscalerList};
use pkg_types::meta::{ListMeta, Object, TypeMeta};
use pkg_types::thirdparty::{
    ThirdPartyResource, ThirdPartyResourceData, ThirdPartyResourceDataList, ThirdPartyResourceList,
};
use pkg_types::validate;

use crate::client::StateStore;

/// Typed persistence for the extension kinds.
///
/// Objects live at `<prefix><namespace>/<name>`. The registry owns the parts
/// of the envelope callers must not touch: it assigns `uid` and
/// `creationTimestamp` on create and bumps `resourceVersion` on every write.
/// A non-zero incoming `resourceVersion` is treated as an
/// optimistic-concurrency precondition; zero means "no precondition"
/// (last writer wins).
#[derive(Clone)]
pub struct Registry {
    store: StateStore,
}

impl Registry {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    fn object_key(prefix: &str, namespace: &str, name: &str) -> String {
        format!("{prefix}{namespace}/{name}")
    }

    // --- Generic plumbing ---

    async fn create<T>(
        &self,
        prefix: &str,
        kind: &str,
        mut obj: T,
        validate: fn(&T) -> Result<(), ResourceError>,
    ) -> Result<T>
    where
        T: Object + Serialize,
    {
        validate(&obj)?;
        let (namespace, name) = {
            let meta = obj.metadata();
            (meta.namespace.clone(), meta.name.clone())
        };
        let key = Self::object_key(prefix, &namespace, &name);
        if self.store.get(&key).await?.is_some() {
            return Err(ResourceError::conflict(kind, &namespace, &name).into());
        }

        if obj.type_meta().kind.is_empty() {
            *obj.type_meta_mut() = TypeMeta::for_kind(kind);
        }
        let meta = obj.metadata_mut();
        meta.uid = Uuid::new_v4().to_string();
        meta.resource_version = 1;
        meta.creation_timestamp = Some(Utc::now());

        self.store.put(&key, &serde_json::to_vec(&obj)?).await?;
        info!("Created {} {}/{}", kind, namespace, name);
        Ok(obj)
    }

    async fn update<T>(
        &self,
        prefix: &str,
        kind: &str,
        mut obj: T,
        validate: fn(&T) -> Result<(), ResourceError>,
    ) -> Result<T>
    where
        T: Object + Serialize + DeserializeOwned,
    {
        validate(&obj)?;
        let (namespace, name) = {
            let meta = obj.metadata();
            (meta.namespace.clone(), meta.name.clone())
        };
        let key = Self::object_key(prefix, &namespace, &name);
        let raw = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| ResourceError::not_found(kind, &namespace, &name))?;
        let current: T = serde_json::from_slice(&raw)?;

        let incoming = obj.metadata().resource_version;
        if incoming != 0 && incoming != current.metadata().resource_version {
            return Err(ResourceError::conflict(kind, &namespace, &name).into());
        }

        if obj.type_meta().kind.is_empty() {
            *obj.type_meta_mut() = TypeMeta::for_kind(kind);
        }
        let next = current.metadata().resource_version + 1;
        let meta = obj.metadata_mut();
        meta.uid = current.metadata().uid.clone();
        meta.creation_timestamp = current.metadata().creation_timestamp;
        meta.resource_version = next;

        self.store.put(&key, &serde_json::to_vec(&obj)?).await?;
        info!("Updated {} {}/{} rv={}", kind, namespace, name, next);
        Ok(obj)
    }

    async fn fetch<T>(&self, prefix: &str, kind: &str, namespace: &str, name: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let key = Self::object_key(prefix, namespace, name);
        let raw = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| ResourceError::not_found(kind, namespace, name))?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Items in one namespace, plus the revision high-water mark for the
    /// list envelope. Corrupt entries are skipped, not fatal.
    async fn items<T>(&self, prefix: &str, namespace: &str) -> Result<(Vec<T>, u64)>
    where
        T: Object + DeserializeOwned,
    {
        let entries = self
            .store
            .list_prefix(&format!("{prefix}{namespace}/"))
            .await?;
        let mut items = Vec::new();
        let mut revision = 0;
        for (_, raw) in entries {
            let Ok(item) = serde_json::from_slice::<T>(&raw) else {
                continue;
            };
            revision = revision.max(item.metadata().resource_version);
            items.push(item);
        }
        Ok((items, revision))
    }

    async fn remove(&self, prefix: &str, kind: &str, namespace: &str, name: &str) -> Result<()> {
        let key = Self::object_key(prefix, namespace, name);
        if self.store.get(&key).await?.is_none() {
            return Err(ResourceError::not_found(kind, namespace, name).into());
        }
        self.store.delete(&key).await?;
        info!("Deleted {} {}/{}", kind, namespace, name);
        Ok(())
    }

    // --- Horizontal pod autoscalers ---

    pub async fn create_autoscaler(
        &self,
        hpa: HorizontalPodAutoscaler,
    ) -> Result<HorizontalPodAutoscaler> {
        self.create(
            HPA_PREFIX,
            KIND_HORIZONTAL_POD_AUTOSCALER,
            hpa,
            validate::validate_autoscaler,
        )
        .await
    }

    pub async fn update_autoscaler(
        &self,
        hpa: HorizontalPodAutoscaler,
    ) -> Result<HorizontalPodAutoscaler> {
        self.update(
            HPA_PREFIX,
            KIND_HORIZONTAL_POD_AUTOSCALER,
            hpa,
            validate::validate_autoscaler,
        )
        .await
    }

    pub async fn get_autoscaler(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<HorizontalPodAutoscaler> {
        self.fetch(HPA_PREFIX, KIND_HORIZONTAL_POD_AUTOSCALER, namespace, name)
            .await
    }

    pub async fn list_autoscalers(&self, namespace: &str) -> Result<HorizontalPodAutoscalerList> {
        let (items, resource_version) = self.items(HPA_PREFIX, namespace).await?;
        Ok(HorizontalPodAutoscalerList {
            type_meta: TypeMeta::for_kind(KIND_HORIZONTAL_POD_AUTOSCALER_LIST),
            metadata: ListMeta { resource_version },
            items,
        })
    }

    pub async fn delete_autoscaler(&self, namespace: &str, name: &str) -> Result<()> {
        self.remove(HPA_PREFIX, KIND_HORIZONTAL_POD_AUTOSCALER, namespace, name)
            .await
    }

    // --- Third-party resource registrations ---

    pub async fn create_third_party_resource(
        &self,
        resource: ThirdPartyResource,
    ) -> Result<ThirdPartyResource> {
        self.create(
            THIRD_PARTY_RESOURCE_PREFIX,
            KIND_THIRD_PARTY_RESOURCE,
            resource,
            validate::validate_third_party_resource,
        )
        .await
    }

    pub async fn update_third_party_resource(
        &self,
        resource: ThirdPartyResource,
    ) -> Result<ThirdPartyResource> {
        self.update(
            THIRD_PARTY_RESOURCE_PREFIX,
            KIND_THIRD_PARTY_RESOURCE,
            resource,
            validate::validate_third_party_resource,
        )
        .await
    }

    pub async fn get_third_party_resource(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ThirdPartyResource> {
        self.fetch(
            THIRD_PARTY_RESOURCE_PREFIX,
            KIND_THIRD_PARTY_RESOURCE,
            namespace,
            name,
        )
        .await
    }

    pub async fn list_third_party_resources(
        &self,
        namespace: &str,
    ) -> Result<ThirdPartyResourceList> {
        let (items, resource_version) = self
            .items(THIRD_PARTY_RESOURCE_PREFIX, namespace)
            .await?;
        Ok(ThirdPartyResourceList {
            type_meta: TypeMeta::for_kind(KIND_THIRD_PARTY_RESOURCE_LIST),
            metadata: ListMeta { resource_version },
            items,
        })
    }

    /// Removes the registration only. Stored payloads of the kind are left
    /// in place; purging them is a policy decision for the serving layer.
    pub async fn delete_third_party_resource(&self, namespace: &str, name: &str) -> Result<()> {
        self.remove(
            THIRD_PARTY_RESOURCE_PREFIX,
            KIND_THIRD_PARTY_RESOURCE,
            namespace,
            name,
        )
        .await
    }

    // --- Third-party resource data ---

    pub async fn create_third_party_resource_data(
        &self,
        data: ThirdPartyResourceData,
    ) -> Result<ThirdPartyResourceData> {
        self.create(
            THIRD_PARTY_RESOURCE_DATA_PREFIX,
            KIND_THIRD_PARTY_RESOURCE_DATA,
            data,
            validate::validate_third_party_resource_data,
        )
        .await
    }

    pub async fn update_third_party_resource_data(
        &self,
        data: ThirdPartyResourceData,
    ) -> Result<ThirdPartyResourceData> {
        self.update(
            THIRD_PARTY_RESOURCE_DATA_PREFIX,
            KIND_THIRD_PARTY_RESOURCE_DATA,
            data,
            validate::validate_third_party_resource_data,
        )
        .await
    }

    pub async fn get_third_party_resource_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ThirdPartyResourceData> {
        self.fetch(
            THIRD_PARTY_RESOURCE_DATA_PREFIX,
            KIND_THIRD_PARTY_RESOURCE_DATA,
            namespace,
            name,
        )
        .await
    }

    pub async fn list_third_party_resource_data(
        &self,
        namespace: &str,
    ) -> Result<ThirdPartyResourceDataList> {
        let (items, resource_version) = self
            .items(THIRD_PARTY_RESOURCE_DATA_PREFIX, namespace)
            .await?;
        Ok(ThirdPartyResourceDataList {
            type_meta: TypeMeta::for_kind(KIND_THIRD_PARTY_RESOURCE_DATA_LIST),
            metadata: ListMeta { resource_version },
            items,
        })
    }

    pub async fn delete_third_party_resource_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<()> {
        self.remove(
            THIRD_PARTY_RESOURCE_DATA_PREFIX,
            KIND_THIRD_PARTY_RESOURCE_DATA,
            namespace,
            name,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pkg_types::hpa::{HorizontalPodAutoscalerSpec, ResourceConsumption};
    use pkg_types::meta::ObjectMeta;
    use pkg_types::quantity::Quantity;
    use pkg_types::scale::SubresourceReference;
    use pkg_types::thirdparty::APIVersion;

    async fn test_registry() -> Registry {
        let dir = std::env::temp_dir().join(format!("expapi-test-{}", Uuid::new_v4()));
        let store = StateStore::new(dir.to_str().unwrap()).await.unwrap();
        Registry::new(store)
    }

    fn autoscaler(namespace: &str, name: &str) -> HorizontalPodAutoscaler {
        HorizontalPodAutoscaler {
            metadata: ObjectMeta::named(namespace, name),
            spec: HorizontalPodAutoscalerSpec {
                scale_ref: SubresourceReference::scale("ReplicationController", namespace, "web"),
                min_count: 2,
                max_count: 10,
                target: ResourceConsumption::new("cpu", Quantity::parse("500m").unwrap()),
            },
            ..Default::default()
        }
    }

    fn registration(namespace: &str, name: &str, versions: &[&str]) -> ThirdPartyResource {
        ThirdPartyResource {
            metadata: ObjectMeta::named(namespace, name),
            versions: versions.iter().map(|v| APIVersion::named(v)).collect(),
            ..Default::default()
        }
    }

    fn resource_error(err: &anyhow::Error) -> Option<&ResourceError> {
        err.downcast_ref::<ResourceError>()
    }

    #[tokio::test]
    async fn create_stamps_envelope() {
        let registry = test_registry().await;
        let created = registry
            .create_autoscaler(autoscaler("default", "web-hpa"))
            .await
            .unwrap();
        assert_eq!(created.type_meta.kind, "HorizontalPodAutoscaler");
        assert!(!created.metadata.uid.is_empty());
        assert_eq!(created.metadata.resource_version, 1);
        assert!(created.metadata.creation_timestamp.is_some());

        let fetched = registry.get_autoscaler("default", "web-hpa").await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn create_rejects_invalid_bounds() {
        let registry = test_registry().await;
        let mut hpa = autoscaler("default", "web-hpa");
        hpa.spec.min_count = 10;
        hpa.spec.max_count = 2;
        let err = registry.create_autoscaler(hpa).await.unwrap_err();
        assert!(matches!(
            resource_error(&err),
            Some(ResourceError::InvalidSpec(_))
        ));
    }

    #[tokio::test]
    async fn create_twice_conflicts() {
        let registry = test_registry().await;
        registry
            .create_autoscaler(autoscaler("default", "web-hpa"))
            .await
            .unwrap();
        let err = registry
            .create_autoscaler(autoscaler("default", "web-hpa"))
            .await
            .unwrap_err();
        assert!(matches!(
            resource_error(&err),
            Some(ResourceError::Conflict { .. })
        ));
    }

    #[tokio::test]
    async fn update_bumps_revision_and_rejects_stale_writers() {
        let registry = test_registry().await;
        let created = registry
            .create_autoscaler(autoscaler("default", "web-hpa"))
            .await
            .unwrap();

        let mut fresh = created.clone();
        fresh.spec.max_count = 20;
        let updated = registry.update_autoscaler(fresh).await.unwrap();
        assert_eq!(updated.metadata.resource_version, 2);
        assert_eq!(updated.metadata.uid, created.metadata.uid);

        // `created` still carries rv=1: a concurrent writer lost the race.
        let mut stale = created;
        stale.spec.max_count = 30;
        let err = registry.update_autoscaler(stale).await.unwrap_err();
        assert!(matches!(
            resource_error(&err),
            Some(ResourceError::Conflict { .. })
        ));

        // rv=0 opts out of the precondition.
        let mut blind = updated.clone();
        blind.metadata.resource_version = 0;
        blind.spec.max_count = 30;
        let blind = registry.update_autoscaler(blind).await.unwrap();
        assert_eq!(blind.metadata.resource_version, 3);
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let registry = test_registry().await;
        let err = registry.get_autoscaler("default", "ghost").await.unwrap_err();
        assert_eq!(
            resource_error(&err),
            Some(&ResourceError::not_found(
                "HorizontalPodAutoscaler",
                "default",
                "ghost"
            ))
        );
    }

    #[tokio::test]
    async fn list_is_scoped_to_namespace() {
        let registry = test_registry().await;
        registry
            .create_autoscaler(autoscaler("default", "a"))
            .await
            .unwrap();
        registry
            .create_autoscaler(autoscaler("default", "b"))
            .await
            .unwrap();
        registry
            .create_autoscaler(autoscaler("staging", "c"))
            .await
            .unwrap();

        let list = registry.list_autoscalers("default").await.unwrap();
        assert_eq!(list.items.len(), 2);
        assert_eq!(list.type_meta.kind, "HorizontalPodAutoscalerList");
        assert_eq!(list.metadata.resource_version, 1);
        assert!(list.items.iter().all(|h| h.metadata.namespace == "default"));

        let empty = registry.list_autoscalers("production").await.unwrap();
        assert!(empty.items.is_empty());
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let registry = test_registry().await;
        registry
            .create_autoscaler(autoscaler("default", "web-hpa"))
            .await
            .unwrap();
        registry.delete_autoscaler("default", "web-hpa").await.unwrap();
        let err = registry.get_autoscaler("default", "web-hpa").await.unwrap_err();
        assert!(matches!(
            resource_error(&err),
            Some(ResourceError::NotFound { .. })
        ));

        let err = registry
            .delete_autoscaler("default", "web-hpa")
            .await
            .unwrap_err();
        assert!(matches!(
            resource_error(&err),
            Some(ResourceError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn registration_rejects_duplicate_or_empty_versions() {
        let registry = test_registry().await;
        let err = registry
            .create_third_party_resource(registration("default", "cron-tab.example.com", &[]))
            .await
            .unwrap_err();
        assert!(matches!(
            resource_error(&err),
            Some(ResourceError::InvalidSpec(_))
        ));

        let err = registry
            .create_third_party_resource(registration(
                "default",
                "cron-tab.example.com",
                &["v1", "v1"],
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            resource_error(&err),
            Some(ResourceError::InvalidSpec(_))
        ));
    }

    #[tokio::test]
    async fn payload_round_trips_byte_exact() {
        let registry = test_registry().await;
        // Invalid UTF-8 and invalid JSON on purpose.
        let payload = vec![0u8, 159, 146, 150, 255, 254, 0, 7];
        let data = ThirdPartyResourceData {
            metadata: ObjectMeta::named("default", "nightly"),
            data: payload.clone(),
            ..Default::default()
        };
        registry.create_third_party_resource_data(data).await.unwrap();
        let fetched = registry
            .get_third_party_resource_data("default", "nightly")
            .await
            .unwrap();
        assert_eq!(fetched.data, payload);
    }

    #[tokio::test]
    async fn adding_a_version_leaves_stored_payloads_alone() {
        let registry = test_registry().await;
        let created = registry
            .create_third_party_resource(registration(
                "default",
                "cron-tab.example.com",
                &["v1", "v2"],
            ))
            .await
            .unwrap();

        let payload = br#"{"schedule":"0 2 * * *"}"#.to_vec();
        registry
            .create_third_party_resource_data(ThirdPartyResourceData {
                metadata: ObjectMeta::named("default", "nightly"),
                data: payload.clone(),
                ..Default::default()
            })
            .await
            .unwrap();

        let mut widened = created;
        widened.versions.push(APIVersion::named("v3"));
        registry.update_third_party_resource(widened).await.unwrap();

        let fetched = registry
            .get_third_party_resource_data("default", "nightly")
            .await
            .unwrap();
        assert_eq!(fetched.data, payload);
        assert_eq!(fetched.metadata.resource_version, 1);
    }

    #[tokio::test]
    async fn deleting_registration_keeps_payloads() {
        let registry = test_registry().await;
        registry
            .create_third_party_resource(registration("default", "cron-tab.example.com", &["v1"]))
            .await
            .unwrap();
        registry
            .create_third_party_resource_data(ThirdPartyResourceData {
                metadata: ObjectMeta::named("default", "nightly"),
                data: b"{}".to_vec(),
                ..Default::default()
            })
            .await
            .unwrap();

        registry
            .delete_third_party_resource("default", "cron-tab.example.com")
            .await
            .unwrap();
        assert!(
            registry
                .get_third_party_resource_data("default", "nightly")
                .await
                .is_ok()
        );
    }
}
