use pmc_scenario_core::errors::ScenarioError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Particle loss kernel applied by the simulation driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossFunction {
    /// No particle loss
    #[default]
    #[serde(rename = "none")]
    None,
    /// The same first-order loss rate for every particle
    #[serde(rename = "constant")]
    Constant,
    /// Loss rate proportional to particle volume
    #[serde(rename = "volume")]
    Volume,
    /// Dry deposition to the ground
    #[serde(rename = "drydep")]
    DryDep,
    /// Wall loss and sedimentation in a chamber
    #[serde(rename = "chamber")]
    Chamber,
}

impl LossFunction {
    pub const ALL: [LossFunction; 5] = [
        LossFunction::None,
        LossFunction::Constant,
        LossFunction::Volume,
        LossFunction::DryDep,
        LossFunction::Chamber,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LossFunction::None => "none",
            LossFunction::Constant => "constant",
            LossFunction::Volume => "volume",
            LossFunction::DryDep => "drydep",
            LossFunction::Chamber => "chamber",
        }
    }

    /// First-order loss rate (s^-1) of a particle with volume `vol` (m^3)
    ///
    /// Only the closed-form kernels are evaluated here. Dry deposition and
    /// chamber losses depend on particle properties owned by the driver and
    /// return `None`.
    pub fn analytic_rate(&self, vol: f64) -> Option<f64> {
        match self {
            LossFunction::None => Some(0.0),
            LossFunction::Constant => Some(1e-3),
            LossFunction::Volume => Some(1e15 * vol),
            LossFunction::DryDep | LossFunction::Chamber => None,
        }
    }
}

impl FromStr for LossFunction {
    type Err = ScenarioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LossFunction::ALL
            .into_iter()
            .find(|loss| loss.as_str() == s)
            .ok_or_else(|| ScenarioError::UnknownLossFunction(s.to_string()))
    }
}

impl fmt::Display for LossFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
