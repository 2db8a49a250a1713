//! Environmental conditions of the simulated air parcel.

use serde::{Deserialize, Serialize};

/// Saturation vapour pressure of water over a flat surface (Pa)
pub fn sat_vapor_pressure(temp: f64) -> f64 {
    const WATER_EQ_VAP_PRESS: f64 = 611.0;
    const T0: f64 = 273.15;
    WATER_EQ_VAP_PRESS * 10f64.powf(7.45 * (temp - T0) / (temp - 38.0))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvState {
    /// Temperature (K)
    pub temp: f64,
    /// Pressure (Pa)
    pub pressure: f64,
    /// Mixing layer height (m)
    pub height: f64,
    /// Relative humidity (1)
    pub rel_humid: f64,
    /// Time since the start of the simulation (s)
    pub elapsed_time: f64,
}

impl EnvState {
    pub fn new(temp: f64, pressure: f64, height: f64, rel_humid: f64) -> Self {
        Self {
            temp,
            pressure,
            height,
            rel_humid,
            elapsed_time: 0.0,
        }
    }

    /// Move to new conditions while keeping the water vapour mixing ratio fixed
    ///
    /// Relative humidity is rescaled by the change in saturation vapour
    /// pressure and total pressure. If the old state has no usable pressure
    /// the humidity is left as it is.
    pub fn change_conditions(&mut self, temp: f64, pressure: f64, height: f64) {
        let old_sat = sat_vapor_pressure(self.temp);
        let new_sat = sat_vapor_pressure(temp);
        if self.pressure > 0.0 && new_sat > 0.0 && old_sat.is_finite() {
            self.rel_humid *= old_sat / new_sat * pressure / self.pressure;
        }
        self.temp = temp;
        self.pressure = pressure;
        self.height = height;
    }

    /// Water vapour partial pressure (Pa)
    pub fn vapor_pressure(&self) -> f64 {
        self.rel_humid * sat_vapor_pressure(self.temp)
    }
}
