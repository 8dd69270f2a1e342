pub mod payloads;
pub mod resolver;
pub mod substitute;
pub mod variables;

use std::fmt;

pub use payloads::{EmbeddedPayloads, PayloadSource, StaticPayloads};
pub use resolver::{
    DEFAULT_NAME_PREFIX, ResolveError, TemplateResolver, generate_cluster_name,
};
pub use substitute::{SubstitutionError, substitute};
pub use variables::{ProcessEnv, VariableSet, VariableSource};

pub const ENV_CLUSTER_DEPLOYMENT_NAME: &str = "CLUSTER_DEPLOYMENT_NAME";
pub const ENV_CLUSTER_DEPLOYMENT_TEMPLATE: &str = "CLUSTER_DEPLOYMENT_TEMPLATE";
pub const ENV_CLUSTER_DEPLOYMENT_PREFIX: &str = "CLUSTER_DEPLOYMENT_PREFIX";

pub const ENV_AWS_VPC_ID: &str = "AWS_VPC_ID";
pub const ENV_AWS_SUBNETS: &str = "AWS_SUBNETS";
pub const ENV_AWS_SECURITY_GROUP_ID: &str = "AWS_SG_ID";
pub const ENV_VSPHERE_HOSTED_CP_ENDPOINT: &str =
    "VSPHERE_HOSTED_CONTROL_PLANE_ENDPOINT";

pub const PROVIDER_NAME_LABEL: &str = "cluster.x-k8s.io/provider";
pub const CONTROLLER_LABEL: &str = "app.kubernetes.io/name=kcm";

/// Control-plane topology of a cluster template.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Topology {
    StandaloneControlPlane,
    HostedControlPlane,
    /// EKS, AKS, GKE
    Managed,
    Adopted,
    Remote,
}

/// Infrastructure provider, named after its CAPI provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Provider {
    ClusterApi,
    Aws,
    Azure,
    Gcp,
    VSphere,
    Internal,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::ClusterApi => "cluster-api",
            Provider::Aws => "infrastructure-aws",
            Provider::Azure => "infrastructure-azure",
            Provider::Gcp => "infrastructure-gcp",
            Provider::VSphere => "infrastructure-vsphere",
            Provider::Internal => "infrastructure-internal",
        }
    }

    /// Label selector matching the provider's controller pods.
    pub fn label(&self) -> String {
        format!("{}={}", PROVIDER_NAME_LABEL, self.as_str())
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Selectors for every controller worth collecting logs from.
pub fn all_provider_selectors() -> Vec<String> {
    vec![
        CONTROLLER_LABEL.to_string(),
        Provider::Aws.label(),
        Provider::Azure.label(),
        Provider::ClusterApi.label(),
        Provider::VSphere.label(),
    ]
}

/// Concrete template category; one payload exists for each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TemplateType {
    AwsStandaloneCp,
    AwsHostedCp,
    AwsEks,
    AzureStandaloneCp,
    AzureHostedCp,
    AzureAks,
    GcpStandaloneCp,
    GcpHostedCp,
    GcpGke,
    VSphereStandaloneCp,
    VSphereHostedCp,
    AdoptedCluster,
    RemoteCluster,
}

impl TemplateType {
    pub const ALL: [TemplateType; 13] = [
        TemplateType::AwsStandaloneCp,
        TemplateType::AwsHostedCp,
        TemplateType::AwsEks,
        TemplateType::AzureStandaloneCp,
        TemplateType::AzureHostedCp,
        TemplateType::AzureAks,
        TemplateType::GcpStandaloneCp,
        TemplateType::GcpHostedCp,
        TemplateType::GcpGke,
        TemplateType::VSphereStandaloneCp,
        TemplateType::VSphereHostedCp,
        TemplateType::AdoptedCluster,
        TemplateType::RemoteCluster,
    ];

    /// Identifier prefix; template names carry a version suffix
    /// (e.g. `aws-standalone-cp-0-0-1`).
    pub fn prefix(&self) -> &'static str {
        match self {
            TemplateType::AwsStandaloneCp => "aws-standalone-cp",
            TemplateType::AwsHostedCp => "aws-hosted-cp",
            TemplateType::AwsEks => "aws-eks",
            TemplateType::AzureStandaloneCp => "azure-standalone-cp",
            TemplateType::AzureHostedCp => "azure-hosted-cp",
            TemplateType::AzureAks => "azure-aks",
            TemplateType::GcpStandaloneCp => "gcp-standalone-cp",
            TemplateType::GcpHostedCp => "gcp-hosted-cp",
            TemplateType::GcpGke => "gcp-gke",
            TemplateType::VSphereStandaloneCp => "vsphere-standalone-cp",
            TemplateType::VSphereHostedCp => "vsphere-hosted-cp",
            TemplateType::AdoptedCluster => "adopted-cluster",
            TemplateType::RemoteCluster => "remote-cluster",
        }
    }

    /// Classify a template identifier. The match is on a whole
    /// dash-separated prefix so `aws-eks` does not swallow `aws-eksfoo`.
    pub fn classify(template_id: &str) -> Option<Self> {
        let id = template_id.trim();
        Self::ALL.into_iter().find(|t| {
            let p = t.prefix();
            id == p
                || id
                    .strip_prefix(p)
                    .is_some_and(|rest| rest.starts_with('-'))
        })
    }

    pub fn topology(&self) -> Topology {
        use TemplateType::*;
        match self {
            AwsStandaloneCp | AzureStandaloneCp | GcpStandaloneCp
            | VSphereStandaloneCp => Topology::StandaloneControlPlane,
            AwsHostedCp | AzureHostedCp | GcpHostedCp | VSphereHostedCp => {
                Topology::HostedControlPlane
            }
            AwsEks | AzureAks | GcpGke => Topology::Managed,
            AdoptedCluster => Topology::Adopted,
            RemoteCluster => Topology::Remote,
        }
    }

    pub fn provider(&self) -> Provider {
        use TemplateType::*;
        match self {
            AwsStandaloneCp | AwsHostedCp | AwsEks => Provider::Aws,
            AzureStandaloneCp | AzureHostedCp | AzureAks => Provider::Azure,
            GcpStandaloneCp | GcpHostedCp | GcpGke => Provider::Gcp,
            VSphereStandaloneCp | VSphereHostedCp => Provider::VSphere,
            AdoptedCluster | RemoteCluster => Provider::Internal,
        }
    }

    /// Variables without defaults that must be supplied by the operator
    /// (usually exported from a previously deployed standalone cluster).
    pub fn required_vars(&self) -> &'static [&'static str] {
        match self {
            TemplateType::AwsHostedCp => &[
                ENV_AWS_VPC_ID,
                ENV_AWS_SUBNETS,
                ENV_AWS_SECURITY_GROUP_ID,
            ],
            TemplateType::VSphereHostedCp => &[ENV_VSPHERE_HOSTED_CP_ENDPOINT],
            _ => &[],
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
