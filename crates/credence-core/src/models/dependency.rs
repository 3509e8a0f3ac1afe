use serde::{Deserialize, Serialize};

/// Declares that `evidence_id` was derived from `depends_on`
/// (e.g. a later narrative citing an earlier source).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependsOn {
    pub evidence_id: String,
    pub depends_on: String,
    /// 1.0 = pure restatement, 0.0 = no shared lineage.
    #[serde(default = "full_dependence")]
    pub strength: f64,
}

fn full_dependence() -> f64 {
    1.0
}

/// A set of evidence items sharing lineage with the given correlation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyGroup {
    pub members: Vec<String>,
    pub correlation: f64,
}

/// Dependency structure among the evidence of one claim.
///
/// `independence_coefficient` has no serde default: an undeclared coefficient
/// is rejected at the boundary rather than assumed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyDescriptor {
    #[serde(default)]
    pub depends_on: Vec<DependsOn>,
    #[serde(default)]
    pub groups: Vec<DependencyGroup>,
    /// 1.0 = sources fully independent, 0.0 = fully dependent.
    pub independence_coefficient: f64,
}

impl DependencyDescriptor {
    pub fn with_coefficient(independence_coefficient: f64) -> Self {
        Self {
            depends_on: Vec::new(),
            groups: Vec::new(),
            independence_coefficient,
        }
    }

    /// Full independence, no declared lineage.
    pub fn independent() -> Self {
        Self::with_coefficient(1.0)
    }

    pub fn derived(
        mut self,
        evidence_id: impl Into<String>,
        depends_on: impl Into<String>,
        strength: f64,
    ) -> Self {
        self.depends_on.push(DependsOn {
            evidence_id: evidence_id.into(),
            depends_on: depends_on.into(),
            strength,
        });
        self
    }

    pub fn group<I, S>(mut self, members: I, correlation: f64) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups.push(DependencyGroup {
            members: members.into_iter().map(Into::into).collect(),
            correlation,
        });
        self
    }
}
