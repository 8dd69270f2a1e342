// Kubernetes helpers for E2E runs

use anyhow::{Result, bail};
use cd_lifecycle::store::KubeStore;
use cd_lifecycle::validation::{validate_name_prefix, validate_templates};
use cd_lifecycle::{
    Error, ObjectKey, PollOutcome, PollPolicy, ResourceStore, StoreError,
    poll_until, verify,
};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{ListParams, LogParams};
use kube::{Api, Client};
use tokio_util::sync::CancellationToken;

/// Turn a poll outcome into a result, keeping the last attempt's error as the
/// cause on timeout.
fn finish<T, E>(outcome: PollOutcome<T, E>, what: &str) -> Result<T>
where
    E: Into<anyhow::Error>,
{
    match outcome {
        PollOutcome::Converged(v) => Ok(v),
        PollOutcome::TimedOut {
            attempts,
            last: Some(e),
        } => Err(e.into().context(format!(
            "timed out waiting for {what} after {attempts} attempts"
        ))),
        PollOutcome::TimedOut { attempts, last: None } => {
            bail!("timed out waiting for {what} after {attempts} attempts")
        }
        PollOutcome::Cancelled { .. } => bail!("cancelled while waiting for {what}"),
    }
}

/// Check if a pod is ready
fn is_pod_ready(pod: &Pod) -> bool {
    pod.status
        .as_ref()
        .and_then(|s| s.conditions.as_ref())
        .map(|conditions| {
            conditions
                .iter()
                .any(|c| c.type_ == "Ready" && c.status == "True")
        })
        .unwrap_or(false)
}

/// Wait until at least one pod matching `selector` is ready.
pub async fn wait_for_pods_ready(
    client: &Client,
    namespace: &str,
    selector: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<()> {
    tracing::info!(%namespace, %selector, "waiting for pods to be ready");
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    let lp = ListParams::default().labels(selector);
    let pods = &pods;
    let lp = &lp;
    let outcome = poll_until(policy, cancel, || async move {
        let list = pods.list(lp).await?;
        let ready = list.items.iter().filter(|p| is_pod_ready(p)).count();
        tracing::debug!(ready, total = list.items.len(), "controller pods");
        if ready == 0 {
            bail!("no ready pods match {selector}");
        }
        Ok::<_, anyhow::Error>(())
    })
    .await;
    finish(outcome, "controller pods")
}

/// Lines of each container log to keep when dumping controller logs.
pub const LOG_TAIL_LINES: i64 = 100;

/// (pod, container) pairs to fetch logs for, in list order.
fn log_targets(pods: &[Pod]) -> Vec<(String, String)> {
    pods.iter()
        .filter_map(|p| Some((p.metadata.name.clone()?, p.spec.as_ref()?)))
        .flat_map(|(pod, spec)| {
            spec.containers
                .iter()
                .map(move |c| (pod.clone(), c.name.clone()))
        })
        .collect()
}

/// Log the tail of every container matching each selector. Fetch failures
/// are logged and skipped.
pub async fn dump_controller_logs(client: &Client, namespace: &str, selectors: &[String]) {
    let pods: Api<Pod> = Api::namespaced(client.clone(), namespace);
    for selector in selectors {
        let list = match pods.list(&ListParams::default().labels(selector)).await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(%selector, error = %e, "failed to list controller pods");
                continue;
            }
        };
        if list.items.is_empty() {
            tracing::debug!(%selector, "no pods match");
            continue;
        }
        for (pod, container) in log_targets(&list.items) {
            let lp = LogParams {
                container: Some(container.clone()),
                tail_lines: Some(LOG_TAIL_LINES),
                ..LogParams::default()
            };
            match pods.logs(&pod, &lp).await {
                Ok(logs) => tracing::info!(
                    %selector, %pod, %container,
                    "controller logs:\n{}", logs
                ),
                Err(e) => tracing::warn!(
                    %pod, %container, error = %e,
                    "failed to fetch controller logs"
                ),
            }
        }
    }
}

/// Every ClusterTemplate in `namespace` reports `status.valid: true`.
pub async fn wait_for_templates_valid(
    store: &KubeStore,
    namespace: &str,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<()> {
    let outcome = poll_until(policy, cancel, || async move {
        let templates = store.list_cluster_templates(namespace).await?;
        validate_templates(&templates)?;
        Ok::<_, Error>(())
    })
    .await;
    finish(outcome, "cluster templates to become valid")
}

/// Poll the object's conditions until all of them are `True`.
pub async fn wait_for_ready(
    store: &KubeStore,
    key: &ObjectKey,
    policy: PollPolicy,
    cancel: &CancellationToken,
) -> Result<()> {
    let outcome = poll_until(policy, cancel, || async move {
        let cd = store
            .get(key)
            .await?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;
        if let Err(e) = verify(&cd) {
            tracing::debug!(error = %e, "not ready yet");
            return Err(e.into());
        }
        Ok::<_, Error>(())
    })
    .await;
    finish(outcome, &format!("{key} to become ready"))
}

/// Machines of a cluster must carry the cluster name as prefix.
pub async fn validate_machines(
    store: &KubeStore,
    namespace: &str,
    cluster_name: &str,
) -> Result<usize> {
    let machines = store.list_machines(namespace, cluster_name).await?;
    for m in &machines {
        validate_name_prefix(m, cluster_name)?;
    }
    tracing::info!(count = machines.len(), %cluster_name, "machine names validated");
    Ok(machines.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{Container, PodSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn pod(name: Option<&str>, containers: &[&str]) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: name.map(str::to_string),
                ..ObjectMeta::default()
            },
            spec: Some(PodSpec {
                containers: containers
                    .iter()
                    .map(|c| Container {
                        name: c.to_string(),
                        ..Container::default()
                    })
                    .collect(),
                ..PodSpec::default()
            }),
            ..Pod::default()
        }
    }

    #[test]
    fn log_targets_cover_every_named_container() {
        let mut no_spec = pod(Some("pending"), &[]);
        no_spec.spec = None;
        let pods = vec![
            pod(Some("capa-controller-7d9"), &["manager"]),
            pod(None, &["manager"]),
            no_spec,
            pod(Some("kcm-controller-5f8"), &["manager", "kube-rbac-proxy"]),
        ];
        assert_eq!(
            log_targets(&pods),
            vec![
                ("capa-controller-7d9".to_string(), "manager".to_string()),
                ("kcm-controller-5f8".to_string(), "manager".to_string()),
                ("kcm-controller-5f8".to_string(), "kube-rbac-proxy".to_string()),
            ]
        );
    }

    #[test]
    fn ready_pod_requires_true_ready_condition() {
        use k8s_openapi::api::core::v1::{PodCondition, PodStatus};
        let mut p = pod(Some("kcm-controller"), &["manager"]);
        assert!(!is_pod_ready(&p));
        p.status = Some(PodStatus {
            conditions: Some(vec![PodCondition {
                type_: "Ready".into(),
                status: "False".into(),
                ..PodCondition::default()
            }]),
            ..PodStatus::default()
        });
        assert!(!is_pod_ready(&p));
        if let Some(c) = p
            .status
            .as_mut()
            .and_then(|s| s.conditions.as_mut())
            .and_then(|c| c.first_mut())
        {
            c.status = "True".into();
        }
        assert!(is_pod_ready(&p));
    }
}
