use async_trait::async_trait;
use kube::Client;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, PostParams};
use kube::core::GroupVersionKind;
use kube::discovery::ApiResource;
use tracing::{debug, instrument};

use super::{ObjectKey, ResourceStore, StoreError, StoreResult};
use crate::crd::cluster_deployment::ClusterDeployment;

pub const CLUSTER_NAME_LABEL: &str = "cluster.x-k8s.io/cluster-name";

/// `ClusterDeployment` store backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn try_default() -> StoreResult<Self> {
        let client = Client::try_default().await.map_err(map_kube_error)?;
        Ok(Self::new(client))
    }

    fn api(&self, namespace: &str) -> Api<ClusterDeployment> {
        Api::namespaced(self.client.clone(), namespace)
    }

    fn dynamic_api(
        &self,
        namespace: &str,
        gvk: &GroupVersionKind,
        plural: &str,
    ) -> Api<DynamicObject> {
        let ar = ApiResource::from_gvk_with_plural(gvk, plural);
        Api::namespaced_with(self.client.clone(), namespace, &ar)
    }

    /// List ClusterTemplate objects unstructured, so `status.valid` can be
    /// inspected without a typed schema.
    #[instrument(skip(self))]
    pub async fn list_cluster_templates(
        &self,
        namespace: &str,
    ) -> StoreResult<Vec<DynamicObject>> {
        let gvk = GroupVersionKind::gvk(
            "k0rdent.mirantis.com",
            "v1alpha1",
            "ClusterTemplate",
        );
        let list = self
            .dynamic_api(namespace, &gvk, "clustertemplates")
            .list(&ListParams::default())
            .await
            .map_err(map_kube_error)?;
        debug!(count = list.items.len(), "listed cluster templates");
        Ok(list.items)
    }

    /// List CAPI Machines belonging to the given cluster.
    #[instrument(skip(self))]
    pub async fn list_machines(
        &self,
        namespace: &str,
        cluster_name: &str,
    ) -> StoreResult<Vec<DynamicObject>> {
        let gvk = GroupVersionKind::gvk("cluster.x-k8s.io", "v1beta1", "Machine");
        let lp = ListParams::default()
            .labels(&format!("{}={}", CLUSTER_NAME_LABEL, cluster_name));
        let list = self
            .dynamic_api(namespace, &gvk, "machines")
            .list(&lp)
            .await
            .map_err(map_kube_error)?;
        Ok(list.items)
    }
}

#[async_trait]
impl ResourceStore for KubeStore {
    #[instrument(skip_all, fields(key = %ObjectKey::of(cd)))]
    async fn create(&self, cd: &ClusterDeployment) -> StoreResult<()> {
        let key = ObjectKey::of(cd);
        self.api(&key.namespace)
            .create(&PostParams::default(), cd)
            .await
            .map_err(map_kube_error)?;
        Ok(())
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn delete(&self, key: &ObjectKey) -> StoreResult<()> {
        self.api(&key.namespace)
            .delete(&key.name, &DeleteParams::background())
            .await
            .map_err(map_kube_error)?;
        Ok(())
    }

    #[instrument(skip_all, fields(key = %key))]
    async fn get(
        &self,
        key: &ObjectKey,
    ) -> StoreResult<Option<ClusterDeployment>> {
        self.api(&key.namespace)
            .get_opt(&key.name)
            .await
            .map_err(map_kube_error)
    }
}

/// Translate API errors into the store taxonomy; 404 and 409 are the
/// outcomes the lifecycle controller treats as expected.
pub fn map_kube_error(e: kube::Error) -> StoreError {
    match e {
        kube::Error::Api(resp) if resp.code == 404 => {
            StoreError::NotFound(resp.message)
        }
        kube::Error::Api(resp)
            if resp.code == 409 && resp.reason == "AlreadyExists" =>
        {
            StoreError::AlreadyExists(resp.message)
        }
        kube::Error::Api(resp) => StoreError::Backend(format!(
            "{} ({}): {}",
            resp.reason, resp.code, resp.message
        )),
        kube::Error::SerdeError(e) => StoreError::Serialization(e),
        other => StoreError::Connection(other.to_string()),
    }
}
