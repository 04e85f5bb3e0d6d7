use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KpiObjective {
    Minimise,
    Maximise,
    Target,
}

impl fmt::Display for KpiObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            KpiObjective::Minimise => "MINIMISE",
            KpiObjective::Maximise => "MAXIMISE",
            KpiObjective::Target => "TARGET",
        };
        write!(f, "{}", s)
    }
}

/// A named workflow output designated as an optimization objective.
///
/// `objective` is optional only so that incomplete files can be loaded and reported
/// by the verifier; optimizer engines treat a missing objective like any other
/// non-minimising one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSpecification {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub objective: Option<KpiObjective>,
    #[serde(default)]
    pub auto_scale: bool,
    #[serde(default = "default_scale_factor")]
    pub scale_factor: f64,
}

fn default_scale_factor() -> f64 {
    1.0
}

impl KpiSpecification {
    pub fn new(name: impl Into<String>, objective: KpiObjective) -> Self {
        Self {
            name: name.into(),
            objective: Some(objective),
            auto_scale: false,
            scale_factor: default_scale_factor(),
        }
    }

    pub fn minimise(name: impl Into<String>) -> Self {
        Self::new(name, KpiObjective::Minimise)
    }

    pub fn maximise(name: impl Into<String>) -> Self {
        Self::new(name, KpiObjective::Maximise)
    }

    pub fn with_auto_scale(mut self, auto_scale: bool) -> Self {
        self.auto_scale = auto_scale;
        self
    }

    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Whether this KPI is already expressed as a quantity to minimise.
    #[inline]
    pub fn is_minimised(&self) -> bool {
        self.objective == Some(KpiObjective::Minimise)
    }
}
