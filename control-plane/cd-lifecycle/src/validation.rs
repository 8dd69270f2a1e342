//! Fail-fast checks. Unlike the readiness verdict these stop at the first
//! problem found.

use kube::ResourceExt;
use kube::api::DynamicObject;
use serde_json::Value;

use crate::readiness::ObjectIdentity;
use crate::templates::VariableSource;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must be set")]
    MissingVariable(String),

    #[error("object {kind} {name} does not have prefix: {prefix}")]
    NamePrefix {
        kind: String,
        name: String,
        prefix: String,
    },

    #[error("failed to get valid flag for template {name}: {reason}")]
    MalformedValidFlag { name: String, reason: String },

    #[error("valid flag for template {0} not found")]
    ValidFlagNotFound(String),

    #[error("template {name} is still invalid: {reason}")]
    InvalidTemplate { name: String, reason: String },
}

pub fn first_missing_var<'a>(
    vars: &dyn VariableSource,
    names: &[&'a str],
) -> Option<&'a str> {
    names.iter().copied().find(|n| !vars.is_set(n))
}

/// Every name must be present and non-empty.
pub fn require_vars(
    vars: &dyn VariableSource,
    names: &[&str],
) -> Result<(), ValidationError> {
    match first_missing_var(vars, names) {
        Some(name) => Err(ValidationError::MissingVariable(name.to_string())),
        None => Ok(()),
    }
}

pub fn validate_name_prefix<O: ObjectIdentity + ?Sized>(
    obj: &O,
    prefix: &str,
) -> Result<(), ValidationError> {
    let name = obj.object_name();
    if name.starts_with(prefix) {
        Ok(())
    } else {
        Err(ValidationError::NamePrefix {
            kind: obj.object_kind(),
            name,
            prefix: prefix.to_string(),
        })
    }
}

/// Each template must report `status.valid: true`. Stops at the first
/// template that does not.
pub fn validate_templates<'a, I>(templates: I) -> Result<(), ValidationError>
where
    I: IntoIterator<Item = &'a DynamicObject>,
{
    for t in templates {
        let name = t.name_any();
        let status = t.data.get("status");
        let valid = match status.and_then(|s| s.get("valid")) {
            None | Some(Value::Null) => {
                return Err(ValidationError::ValidFlagNotFound(name));
            }
            Some(Value::Bool(b)) => *b,
            Some(other) => {
                return Err(ValidationError::MalformedValidFlag {
                    name,
                    reason: format!("expected bool, got {}", other),
                });
            }
        };
        if !valid {
            let reason = status
                .and_then(|s| s.get("validationError"))
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(ValidationError::InvalidTemplate { name, reason });
        }
    }
    Ok(())
}
