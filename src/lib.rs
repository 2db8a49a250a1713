//! Time-varying boundary conditions for particle-resolved aerosol simulations.
//!
//! The [`Scenario`] drives a simulation's environment (temperature, pressure
//! and mixing height), gas emissions and background, and aerosol emissions and
//! background over time. The building blocks live in [`pmc_scenario_core`] and
//! are re-exported here.
pub mod loss;
pub mod scenario;

pub use loss::LossFunction;
pub use pmc_scenario_core::errors::{ScenarioError, ScenarioResult};
pub use pmc_scenario_core::{
    aero_dist, aero_mode, aero_series, bin_grid, env_state, gas_profile, mode_set, profile,
    registry,
};
pub use scenario::{Scenario, ScenarioOptions};
