//! The scenario: every time-varying boundary condition of a simulation.
//!
//! A [`Scenario`] is built once from the nested configuration mapping and then
//! queried by the simulation driver as time advances. Construction validates
//! everything up front against the gas and aerosol registries, so queries only
//! fail for out-of-range aerosol snapshot indices.
//!
//! # Configuration
//!
//! ```json
//! {
//!     "temp_profile": [{"time": [0]}, {"temp": [273]}],
//!     "pressure_profile": [{"time": [0]}, {"pressure": [1e5]}],
//!     "height_profile": [{"time": [0]}, {"height": [1]}],
//!     "gas_emissions": [{"time": [0]}, {"rate": [0]}, {"SO2": [0]}],
//!     "gas_background": [{"time": [0]}, {"rate": [0]}, {"SO2": [0]}],
//!     "aero_emissions": [{"time": [0]}, {"rate": [0]}, {"dist": [[{"mode": {...}}]]}],
//!     "aero_background": [{"time": [0]}, {"rate": [0]}, {"dist": [[{"mode": {...}}]]}],
//!     "loss_function": "none"
//! }
//! ```

use crate::loss::LossFunction;
use log::debug;
use ndarray::ArrayView1;
use pmc_scenario_core::aero_dist::AeroDist;
use pmc_scenario_core::aero_series::AeroDistSeries;
use pmc_scenario_core::config::{as_object, as_str, parse_profile, profile_to_config, required};
use pmc_scenario_core::env_state::EnvState;
use pmc_scenario_core::errors::{ScenarioError, ScenarioResult};
use pmc_scenario_core::gas_profile::GasProfileBundle;
use pmc_scenario_core::profile::{Interpolation, Profile};
use pmc_scenario_core::registry::{AeroRegistry, GasRegistry};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

const KEYS: [&str; 8] = [
    "temp_profile",
    "pressure_profile",
    "height_profile",
    "gas_emissions",
    "gas_background",
    "aero_emissions",
    "aero_background",
    "loss_function",
];

/// Construction options that are not part of the configuration mapping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioOptions {
    /// Interpolation used for the temperature, pressure and height profiles
    pub env_interpolation: Interpolation,
}

/// Time-varying boundary conditions of a simulation
///
/// The scenario borrows the species registries it was validated against, so
/// they must outlive it. It holds no interior mutability and can be shared
/// between threads.
pub struct Scenario<'r> {
    gas_data: &'r dyn GasRegistry,
    aero_data: &'r dyn AeroRegistry,
    temp: Profile,
    pressure: Profile,
    height: Profile,
    gas: GasProfileBundle,
    aero_emissions: AeroDistSeries,
    aero_background: AeroDistSeries,
    loss_function: LossFunction,
}

impl<'r> Scenario<'r> {
    pub fn new(
        gas_data: &'r dyn GasRegistry,
        aero_data: &'r dyn AeroRegistry,
        config: &Value,
    ) -> ScenarioResult<Self> {
        Self::with_options(gas_data, aero_data, config, ScenarioOptions::default())
    }

    pub fn with_options(
        gas_data: &'r dyn GasRegistry,
        aero_data: &'r dyn AeroRegistry,
        config: &Value,
        options: ScenarioOptions,
    ) -> ScenarioResult<Self> {
        let config = as_object(config, "scenario")?;
        if let Some(key) = config.keys().find(|key| !KEYS.contains(&key.as_str())) {
            return Err(ScenarioError::MalformedConfig {
                path: key.clone(),
                reason: "unknown scenario key".to_string(),
            });
        }
        let get = |key: &str| required(config, key, "scenario");

        let interpolation = options.env_interpolation;
        let temp = parse_profile(get("temp_profile")?, "temp", "temp_profile", interpolation)?;
        let pressure = parse_profile(
            get("pressure_profile")?,
            "pressure",
            "pressure_profile",
            interpolation,
        )?;
        let height = parse_profile(get("height_profile")?, "height", "height_profile", interpolation)?;

        let gas = GasProfileBundle::from_config(
            get("gas_emissions")?,
            get("gas_background")?,
            gas_data,
        )?;

        let aero_emissions =
            AeroDistSeries::from_config(get("aero_emissions")?, "aero_emissions", aero_data)?;
        let aero_background =
            AeroDistSeries::from_config(get("aero_background")?, "aero_background", aero_data)?;

        let loss_function: LossFunction =
            as_str(get("loss_function")?, "loss_function")?.parse()?;

        debug!(
            "Scenario with {}/{}/{} temperature/pressure/height samples, {} aerosol emission and {} background snapshots, loss function {}",
            temp.len(),
            pressure.len(),
            height.len(),
            aero_emissions.n_times(),
            aero_background.n_times(),
            loss_function
        );

        Ok(Self {
            gas_data,
            aero_data,
            temp,
            pressure,
            height,
            gas,
            aero_emissions,
            aero_background,
            loss_function,
        })
    }

    /// Write temperature, pressure and height at time `t` into `env_state`
    pub fn init_env_state(&self, env_state: &mut EnvState, t: f64) {
        env_state.temp = self.temp.query(t);
        env_state.pressure = self.pressure.query(t);
        env_state.height = self.height.query(t);
    }

    /// Advance `env_state` to time `t`
    ///
    /// Unlike [`Scenario::init_env_state`] this keeps the water vapour mixing
    /// ratio constant by rescaling the relative humidity, and records `t` as
    /// the elapsed time.
    pub fn update_env_state(&self, env_state: &mut EnvState, t: f64) {
        env_state.change_conditions(self.temp.query(t), self.pressure.query(t), self.height.query(t));
        env_state.elapsed_time = t;
    }

    pub fn temperature(&self, t: f64) -> f64 {
        self.temp.query(t)
    }

    pub fn pressure(&self, t: f64) -> f64 {
        self.pressure.query(t)
    }

    pub fn height(&self, t: f64) -> f64 {
        self.height.query(t)
    }

    pub fn gas(&self) -> &GasProfileBundle {
        &self.gas
    }

    pub fn gas_emission_rate(&self, species: &str, t: f64) -> f64 {
        self.gas.emission_rate(species, t)
    }

    pub fn gas_emission_rate_scale(&self, t: f64) -> f64 {
        self.gas.emission_rate_scale(t)
    }

    pub fn gas_background_concentration(&self, species: &str, t: f64) -> f64 {
        self.gas.background_concentration(species, t)
    }

    pub fn gas_dilution_rate(&self, t: f64) -> f64 {
        self.gas.dilution_rate(t)
    }

    /// Aerosol emissions of snapshot `time_index`
    pub fn aero_emissions(
        &self,
        aero_data: &dyn AeroRegistry,
        time_index: usize,
    ) -> ScenarioResult<AeroDist> {
        self.aero_emissions.dist_at(time_index, aero_data)
    }

    /// Background (dilution) aerosol of snapshot `time_index`
    pub fn aero_background(
        &self,
        aero_data: &dyn AeroRegistry,
        time_index: usize,
    ) -> ScenarioResult<AeroDist> {
        self.aero_background.dist_at(time_index, aero_data)
    }

    pub fn aero_emissions_n_times(&self) -> usize {
        self.aero_emissions.n_times()
    }

    pub fn aero_emissions_rate_scale(&self) -> ArrayView1<'_, f64> {
        self.aero_emissions.rate_scales()
    }

    pub fn aero_emissions_time(&self) -> ArrayView1<'_, f64> {
        self.aero_emissions.times()
    }

    pub fn aero_dilution_n_times(&self) -> usize {
        self.aero_background.n_times()
    }

    pub fn aero_dilution_rate(&self) -> ArrayView1<'_, f64> {
        self.aero_background.rate_scales()
    }

    pub fn aero_dilution_time(&self) -> ArrayView1<'_, f64> {
        self.aero_background.times()
    }

    pub fn aero_emissions_series(&self) -> &AeroDistSeries {
        &self.aero_emissions
    }

    pub fn aero_background_series(&self) -> &AeroDistSeries {
        &self.aero_background
    }

    pub fn loss_function(&self) -> LossFunction {
        self.loss_function
    }

    pub fn gas_data(&self) -> &'r dyn GasRegistry {
        self.gas_data
    }

    pub fn aero_data(&self) -> &'r dyn AeroRegistry {
        self.aero_data
    }

    /// Serialise back to the configuration mapping the scenario was built from
    pub fn to_config(&self) -> Value {
        let mut config = Map::new();
        config.insert(
            "temp_profile".to_string(),
            profile_to_config(&self.temp, "temp"),
        );
        config.insert(
            "pressure_profile".to_string(),
            profile_to_config(&self.pressure, "pressure"),
        );
        config.insert(
            "height_profile".to_string(),
            profile_to_config(&self.height, "height"),
        );
        config.insert("gas_emissions".to_string(), self.gas.emissions().to_config());
        config.insert(
            "gas_background".to_string(),
            self.gas.background().to_config(),
        );
        config.insert(
            "aero_emissions".to_string(),
            self.aero_emissions.to_config(),
        );
        config.insert(
            "aero_background".to_string(),
            self.aero_background.to_config(),
        );
        config.insert(
            "loss_function".to_string(),
            Value::from(self.loss_function.as_str()),
        );
        Value::Object(config)
    }
}

impl fmt::Debug for Scenario<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("temp", &self.temp)
            .field("pressure", &self.pressure)
            .field("height", &self.height)
            .field("gas", &self.gas)
            .field("aero_emissions", &self.aero_emissions)
            .field("aero_background", &self.aero_background)
            .field("loss_function", &self.loss_function)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Scenario<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_config())
    }
}
