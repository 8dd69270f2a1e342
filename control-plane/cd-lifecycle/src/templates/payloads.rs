use std::collections::HashMap;

use super::TemplateType;

/// Read-only mapping from template category to raw payload text.
pub trait PayloadSource: Send + Sync {
    fn payload(&self, t: TemplateType) -> Option<&str>;
}

/// Payloads compiled into the binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbeddedPayloads;

impl PayloadSource for EmbeddedPayloads {
    fn payload(&self, t: TemplateType) -> Option<&str> {
        let raw = match t {
            TemplateType::AwsStandaloneCp => {
                include_str!("../../templates/aws-standalone-cp.yaml.tpl")
            }
            TemplateType::AwsHostedCp => {
                include_str!("../../templates/aws-hosted-cp.yaml.tpl")
            }
            TemplateType::AwsEks => {
                include_str!("../../templates/aws-eks.yaml.tpl")
            }
            TemplateType::AzureStandaloneCp => {
                include_str!("../../templates/azure-standalone-cp.yaml.tpl")
            }
            TemplateType::AzureHostedCp => {
                include_str!("../../templates/azure-hosted-cp.yaml.tpl")
            }
            TemplateType::AzureAks => {
                include_str!("../../templates/azure-aks.yaml.tpl")
            }
            TemplateType::GcpStandaloneCp => {
                include_str!("../../templates/gcp-standalone-cp.yaml.tpl")
            }
            TemplateType::GcpHostedCp => {
                include_str!("../../templates/gcp-hosted-cp.yaml.tpl")
            }
            TemplateType::GcpGke => {
                include_str!("../../templates/gcp-gke.yaml.tpl")
            }
            TemplateType::VSphereStandaloneCp => {
                include_str!("../../templates/vsphere-standalone-cp.yaml.tpl")
            }
            TemplateType::VSphereHostedCp => {
                include_str!("../../templates/vsphere-hosted-cp.yaml.tpl")
            }
            TemplateType::AdoptedCluster => {
                include_str!("../../templates/adopted-cluster.yaml.tpl")
            }
            TemplateType::RemoteCluster => {
                include_str!("../../templates/remote-cluster.yaml.tpl")
            }
        };
        Some(raw)
    }
}

/// Explicit payload table, for callers shipping their own manifests.
#[derive(Clone, Debug, Default)]
pub struct StaticPayloads {
    payloads: HashMap<TemplateType, String>,
}

impl StaticPayloads {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, t: TemplateType, payload: impl Into<String>) -> Self {
        self.payloads.insert(t, payload.into());
        self
    }
}

impl PayloadSource for StaticPayloads {
    fn payload(&self, t: TemplateType) -> Option<&str> {
        self.payloads.get(&t).map(String::as_str)
    }
}
