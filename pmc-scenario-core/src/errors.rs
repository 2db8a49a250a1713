use thiserror::Error;

/// Error type for scenario construction and queries.
///
/// Construction validates eagerly, so everything except `IndexOutOfRange`
/// and `UnknownMode` is raised while a scenario is being built.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
    #[error("Invalid aerosol series: {0}")]
    InvalidSeries(String),
    #[error("'{block}' is missing its '{component}' component")]
    MissingSeriesComponent { block: String, component: String },
    #[error("Mode name '{0}' is declared more than once")]
    DuplicateModeName(String),
    #[error("No mode named '{0}'")]
    UnknownMode(String),
    #[error("Index {index} is out of range for {what} with {len} entries")]
    IndexOutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },
    #[error("Gas species '{0}' is not present in the gas registry")]
    UnknownGasSpecies(String),
    #[error("Aerosol species '{species}' used by mode '{mode}' is not present in the aerosol registry")]
    UnknownAerosolSpecies { mode: String, species: String },
    #[error("Unknown loss function '{0}'. Valid loss functions: none, constant, volume, drydep, chamber")]
    UnknownLossFunction(String),
    #[error("Malformed configuration at '{path}': {reason}")]
    MalformedConfig { path: String, reason: String },
}

impl ScenarioError {
    pub(crate) fn malformed(path: &str, reason: impl Into<String>) -> Self {
        ScenarioError::MalformedConfig {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(block: &str, component: &str) -> Self {
        ScenarioError::MissingSeriesComponent {
            block: block.to_string(),
            component: component.to_string(),
        }
    }

    /// Prefix structural errors with the configuration path they were found at
    pub fn at(self, path: &str) -> Self {
        match self {
            ScenarioError::InvalidProfile(reason) => {
                ScenarioError::InvalidProfile(format!("{path}: {reason}"))
            }
            ScenarioError::InvalidSeries(reason) => {
                ScenarioError::InvalidSeries(format!("{path}: {reason}"))
            }
            other => other,
        }
    }
}

/// Convenience type for `Result<T, ScenarioError>`.
pub type ScenarioResult<T> = Result<T, ScenarioError>;
