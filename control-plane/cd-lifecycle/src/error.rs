use crate::lifecycle::LifecycleError;
use crate::readiness::ReadinessError;
use crate::store::StoreError;
use crate::templates::ResolveError;
use crate::validation::ValidationError;

/// How a caller should react to a failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// Bad input. Fix the environment or template and rerun.
    Configuration,
    /// Store or network trouble. Retrying may help.
    Transient,
    /// A bounded wait ran out or was cancelled.
    Convergence,
    /// The object exists but reports unhealthy conditions.
    Readiness,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Readiness(#[from] ReadinessError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Resolve(_) => ErrorClass::Configuration,
            Error::Validation(ValidationError::MissingVariable(_)) => {
                ErrorClass::Configuration
            }
            Error::Validation(_) => ErrorClass::Readiness,
            Error::Lifecycle(LifecycleError::Store { .. }) => ErrorClass::Transient,
            Error::Lifecycle(_) => ErrorClass::Convergence,
            Error::Readiness(ReadinessError::Extraction { .. }) => {
                ErrorClass::Transient
            }
            Error::Readiness(_) => ErrorClass::Readiness,
            Error::Store(StoreError::Serialization(_)) => ErrorClass::Configuration,
            Error::Store(_) => ErrorClass::Transient,
        }
    }
}
