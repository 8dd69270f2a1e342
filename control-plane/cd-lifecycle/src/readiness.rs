//! Readiness verdict over an object's conditions.
//!
//! The verdict is all-or-nothing: every condition must be `True`. All
//! conditions are scanned so the error lists every failing dimension.
//! An object reporting no conditions at all is treated as not ready.

use kube::api::DynamicObject;
use kube::{Resource, ResourceExt};
use serde_json::Value;

use crate::crd::cluster_deployment::{ClusterDeployment, Condition};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReadinessError {
    #[error("{kind} {name} is not ready with conditions:\n{}", .failures.join("\n"))]
    NotReady {
        kind: String,
        name: String,
        failures: Vec<String>,
    },

    #[error("{kind} {name} has not reported any conditions")]
    NoConditions { kind: String, name: String },

    #[error("failed to get conditions from {kind} {name}: {reason}")]
    Extraction {
        kind: String,
        name: String,
        reason: String,
    },
}

impl ReadinessError {
    /// Per-condition diagnostic lines; empty unless `NotReady`.
    pub fn failures(&self) -> &[String] {
        match self {
            ReadinessError::NotReady { failures, .. } => failures,
            _ => &[],
        }
    }
}

/// Kind and name for diagnostics.
pub trait ObjectIdentity {
    fn object_kind(&self) -> String;
    fn object_name(&self) -> String;
}

/// Anything that can yield an ordered condition sequence.
pub trait ConditionSource: ObjectIdentity {
    fn conditions(&self) -> Result<Vec<Condition>, String>;
}

impl ObjectIdentity for ClusterDeployment {
    fn object_kind(&self) -> String {
        ClusterDeployment::kind(&()).into_owned()
    }

    fn object_name(&self) -> String {
        self.name_any()
    }
}

impl ConditionSource for ClusterDeployment {
    fn conditions(&self) -> Result<Vec<Condition>, String> {
        Ok(self
            .status
            .as_ref()
            .and_then(|s| s.conditions.clone())
            .unwrap_or_default())
    }
}

impl ObjectIdentity for DynamicObject {
    fn object_kind(&self) -> String {
        self.types
            .as_ref()
            .map(|t| t.kind.clone())
            .unwrap_or_default()
    }

    fn object_name(&self) -> String {
        self.name_any()
    }
}

impl ConditionSource for DynamicObject {
    /// Reads `status.conditions`; a missing list is an empty one.
    fn conditions(&self) -> Result<Vec<Condition>, String> {
        match self.data.get("status").and_then(|s| s.get("conditions")) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(v) => serde_json::from_value(v.clone())
                .map_err(|e| format!("malformed status.conditions: {}", e)),
        }
    }
}

pub fn format_condition(c: &Condition) -> String {
    format!(
        "Type: {}, Status: {}, Reason: {}, Message: {}",
        c.type_, c.status, c.reason, c.message
    )
}

/// `Ok(())` iff the object reports at least one condition and all of them
/// are `True`.
pub fn verify<O: ConditionSource + ?Sized>(obj: &O) -> Result<(), ReadinessError> {
    let kind = obj.object_kind();
    let name = obj.object_name();
    let conditions = obj.conditions().map_err(|reason| {
        ReadinessError::Extraction {
            kind: kind.clone(),
            name: name.clone(),
            reason,
        }
    })?;

    if conditions.is_empty() {
        return Err(ReadinessError::NoConditions { kind, name });
    }

    let failures: Vec<String> = conditions
        .iter()
        .filter(|c| !c.is_true())
        .map(format_condition)
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(ReadinessError::NotReady {
            kind,
            name,
            failures,
        })
    }
}
