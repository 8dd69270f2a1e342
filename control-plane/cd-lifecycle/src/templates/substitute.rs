use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::variables::VariableSource;

lazy_static! {
    // $$ | ${NAME} | ${NAME:-def} | ${NAME-def} | ${NAME:=def} | ${NAME=def} | $NAME
    static ref PLACEHOLDER: Regex = Regex::new(
        r"\$(?:(\$)|\{([A-Za-z_][A-Za-z0-9_]*)(?:(:?)([-=])([^}]*))?\}|([A-Za-z_][A-Za-z0-9_]*))"
    )
    .unwrap();
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SubstitutionError {
    #[error("unresolved variables: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

/// Replace shell-style placeholders in `input`.
///
/// A placeholder without a default whose variable is unset is an error;
/// every such name is reported, not only the first. A set-but-empty
/// variable substitutes as empty unless the `:-`/`:=` form supplies a
/// default.
pub fn substitute(
    input: &str,
    vars: &dyn VariableSource,
) -> Result<String, SubstitutionError> {
    let mut missing: Vec<String> = Vec::new();
    let out = PLACEHOLDER.replace_all(input, |caps: &Captures<'_>| {
        if caps.get(1).is_some() {
            return "$".to_string();
        }
        let (name, default) = match (caps.get(2), caps.get(6)) {
            (Some(n), _) => {
                let default = caps.get(4).map(|_| {
                    let colon = caps.get(3).is_some_and(|c| !c.is_empty());
                    (colon, caps.get(5).map_or("", |d| d.as_str()))
                });
                (n.as_str(), default)
            }
            (None, Some(n)) => (n.as_str(), None),
            (None, None) => return caps[0].to_string(),
        };
        match (vars.get(name), default) {
            (Some(v), Some((true, d))) if v.is_empty() => d.to_string(),
            (Some(v), _) => v,
            (None, Some((_, d))) => d.to_string(),
            (None, None) => {
                if !missing.iter().any(|m| m == name) {
                    missing.push(name.to_string());
                }
                String::new()
            }
        }
    });
    if missing.is_empty() {
        Ok(out.into_owned())
    } else {
        Err(SubstitutionError::Unresolved(missing))
    }
}
