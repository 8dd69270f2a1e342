use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepRecord {
    pub cluster_name: String,
    pub template: String,
}

/// Names and templates chosen by earlier scenario steps, threaded through
/// explicitly so a hosted-control-plane step can find the standalone
/// cluster it builds on.
#[derive(Clone, Debug, Default)]
pub struct ScenarioContext {
    steps: BTreeMap<String, StepRecord>,
    last: Option<String>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        step: impl Into<String>,
        cluster_name: impl Into<String>,
        template: impl Into<String>,
    ) {
        let step = step.into();
        self.steps.insert(
            step.clone(),
            StepRecord {
                cluster_name: cluster_name.into(),
                template: template.into(),
            },
        );
        self.last = Some(step);
    }

    pub fn step(&self, step: &str) -> Option<&StepRecord> {
        self.steps.get(step)
    }

    /// The most recently recorded step.
    pub fn current(&self) -> Option<&StepRecord> {
        self.last.as_deref().and_then(|s| self.steps.get(s))
    }

    pub fn steps(&self) -> impl Iterator<Item = (&str, &StepRecord)> {
        self.steps.iter().map(|(k, v)| (k.as_str(), v))
    }
}
