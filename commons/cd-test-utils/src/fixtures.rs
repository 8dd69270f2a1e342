use cd_lifecycle::{
    ClusterDeployment, ClusterDeploymentSpec, ClusterDeploymentStatus,
    Condition, ConditionStatus,
};

pub const TEST_NAMESPACE: &str = "kcm-system";

pub fn cluster_deployment(name: &str) -> ClusterDeployment {
    let mut cd = ClusterDeployment::new(
        name,
        ClusterDeploymentSpec {
            template: "aws-standalone-cp-0-0-1".into(),
            dry_run: false,
            credential: Some("aws-cluster-identity-cred".into()),
            config: None,
        },
    );
    cd.metadata.namespace = Some(TEST_NAMESPACE.to_string());
    cd
}

pub fn with_conditions(
    mut cd: ClusterDeployment,
    conditions: Vec<Condition>,
) -> ClusterDeployment {
    cd.status = Some(ClusterDeploymentStatus {
        observed_generation: None,
        conditions: Some(conditions),
    });
    cd
}

pub fn ready() -> Condition {
    Condition::new("Ready", ConditionStatus::True, "Succeeded", "")
}

pub fn not_ready(type_: &str, reason: &str, message: &str) -> Condition {
    Condition::new(type_, ConditionStatus::False, reason, message)
}
