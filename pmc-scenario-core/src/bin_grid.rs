//! Logarithmically spaced diameter bins.

use crate::errors::{ScenarioError, ScenarioResult};
use ndarray::Array1;

/// A set of `n_bin` diameter bins evenly spaced in `ln(D)`
#[derive(Debug, Clone, PartialEq)]
pub struct BinGrid {
    edges: Array1<f64>,
    centers: Array1<f64>,
    log_width: f64,
}

impl BinGrid {
    /// Bins spanning `[d_min, d_max]` (m)
    pub fn new(n_bin: usize, d_min: f64, d_max: f64) -> ScenarioResult<Self> {
        if n_bin == 0 {
            return Err(ScenarioError::malformed("bin_grid", "need at least one bin"));
        }
        if !(d_min > 0.0 && d_max > d_min) {
            return Err(ScenarioError::malformed(
                "bin_grid",
                format!("require 0 < d_min < d_max, got {d_min} and {d_max}"),
            ));
        }

        let log_width = (d_max / d_min).ln() / n_bin as f64;
        // Pin the outer edges so that d_min and d_max fall inside the grid
        let edges = Array1::from_iter((0..=n_bin).map(|i| match i {
            0 => d_min,
            i if i == n_bin => d_max,
            i => d_min * (log_width * i as f64).exp(),
        }));
        let centers =
            Array1::from_iter((0..n_bin).map(|i| d_min * (log_width * (i as f64 + 0.5)).exp()));

        Ok(Self {
            edges,
            centers,
            log_width,
        })
    }

    pub fn n_bin(&self) -> usize {
        self.centers.len()
    }

    /// Bin edge diameters, `n_bin + 1` values
    pub fn edges(&self) -> &Array1<f64> {
        &self.edges
    }

    /// Geometric bin centers
    pub fn centers(&self) -> &Array1<f64> {
        &self.centers
    }

    /// Width of every bin in `ln(D)`
    pub fn log_width(&self) -> f64 {
        self.log_width
    }

    /// Index of the bin containing `diam`, if it falls inside the grid
    ///
    /// The upper edge of the last bin belongs to that bin.
    pub fn find(&self, diam: f64) -> Option<usize> {
        let n_bin = self.n_bin();
        if !(diam >= self.edges[0] && diam <= self.edges[n_bin]) {
            return None;
        }
        let i = ((diam / self.edges[0]).ln() / self.log_width).floor() as usize;
        Some(i.min(n_bin - 1))
    }
}
