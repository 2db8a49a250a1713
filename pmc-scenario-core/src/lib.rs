//! Building blocks for time-varying aerosol simulation boundary conditions.
//!
//! Scalar conditions (temperature, pressure, mixing height and gas profiles)
//! are [`profile::Profile`]s queried at any time. Aerosol emissions and
//! background air are [`aero_series::AeroDistSeries`] of discrete snapshots,
//! each a [`mode_set::NamedModeSet`] of parametric [`aero_mode::AeroMode`]s.
pub mod aero_dist;
pub mod aero_mode;
pub mod aero_series;
pub mod bin_grid;
pub mod config;
pub mod env_state;
pub mod gas_profile;
pub mod mode_set;
pub mod profile;
pub mod registry;

pub mod errors;
