//! Aerosol distributions handed to the particle population.

use crate::aero_mode::AeroMode;
use crate::bin_grid::BinGrid;
use crate::errors::{ScenarioError, ScenarioResult};
use crate::mode_set::NamedModeSet;
use crate::registry::AeroRegistry;
use ndarray::Array1;

/// One time slot of an emission or background series, ready for use
///
/// Mode number concentrations are kept exactly as declared. The slot's rate
/// scale travels alongside them and is applied by [`AeroDist::scaled_num_conc`].
#[derive(Debug, Clone, PartialEq)]
pub struct AeroDist {
    modes: NamedModeSet,
    vol_frac: Vec<Vec<f64>>,
    vol_frac_std: Vec<Vec<f64>>,
    rate_scale: f64,
}

impl AeroDist {
    pub fn new(
        modes: &NamedModeSet,
        rate_scale: f64,
        aero_data: &dyn AeroRegistry,
    ) -> ScenarioResult<Self> {
        let vol_frac = modes
            .iter()
            .map(|mode| mode.vol_frac(aero_data))
            .collect::<ScenarioResult<Vec<_>>>()?;
        let vol_frac_std = modes
            .iter()
            .map(|mode| mode.vol_frac_std(aero_data))
            .collect::<ScenarioResult<Vec<_>>>()?;
        Ok(Self {
            modes: modes.clone(),
            vol_frac,
            vol_frac_std,
            rate_scale,
        })
    }

    pub fn n_mode(&self) -> usize {
        self.modes.mode_count()
    }

    pub fn mode(&self, i: usize) -> ScenarioResult<&AeroMode> {
        self.modes.mode_by_index(i)
    }

    pub fn mode_by_name(&self, name: &str) -> ScenarioResult<&AeroMode> {
        self.modes.mode_by_name(name)
    }

    pub fn modes(&self) -> &NamedModeSet {
        &self.modes
    }

    /// Volume fractions of mode `i`, one per registry species
    pub fn vol_frac(&self, i: usize) -> ScenarioResult<&[f64]> {
        self.vol_frac
            .get(i)
            .map(Vec::as_slice)
            .ok_or(ScenarioError::IndexOutOfRange {
                what: "aerosol distribution",
                index: i,
                len: self.vol_frac.len(),
            })
    }

    /// Standard deviations of the volume fractions of mode `i`
    pub fn vol_frac_std(&self, i: usize) -> ScenarioResult<&[f64]> {
        self.vol_frac_std
            .get(i)
            .map(Vec::as_slice)
            .ok_or(ScenarioError::IndexOutOfRange {
                what: "aerosol distribution",
                index: i,
                len: self.vol_frac_std.len(),
            })
    }

    pub fn rate_scale(&self) -> f64 {
        self.rate_scale
    }

    /// Number concentration summed over all modes (m^-3)
    pub fn total_num_conc(&self) -> f64 {
        self.modes.iter().map(AeroMode::num_conc).sum()
    }

    /// Total number concentration multiplied by the rate scale
    pub fn scaled_num_conc(&self) -> f64 {
        self.rate_scale * self.total_num_conc()
    }

    /// Binned number concentration summed over all modes (m^-3)
    pub fn num_dist(&self, bin_grid: &BinGrid) -> Array1<f64> {
        self.modes
            .iter()
            .fold(Array1::zeros(bin_grid.n_bin()), |acc, mode| {
                acc + mode.num_dist(bin_grid)
            })
    }
}
