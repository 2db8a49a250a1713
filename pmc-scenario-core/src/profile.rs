//! Time-indexed scalar profiles.
//!
//! A [`Profile`] is an immutable series of `(time, value)` samples which can be
//! evaluated at any time. Queries outside the sampled range are clamped to the
//! first or last value.
//!
//! ```
//! use pmc_scenario_core::profile::Profile;
//!
//! let temperature = Profile::new(vec![0.0, 3600.0], vec![290.0, 295.0]).unwrap();
//! assert_eq!(temperature.query(-10.0), 290.0);
//! assert_eq!(temperature.query(1800.0), 290.0);
//! assert_eq!(temperature.query(7200.0), 295.0);
//! ```

use crate::config::NumberArray;
use crate::errors::{ScenarioError, ScenarioResult};
use ndarray::{aview1, ArrayView1};
use serde::{Deserialize, Serialize};

/// How a profile is evaluated between two samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Hold the value of the last sample at or before the query time
    #[default]
    Step,
    /// Linearly interpolate between the bracketing samples
    Linear,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    times: NumberArray,
    values: NumberArray,
    interpolation: Interpolation,
}

impl Profile {
    /// Create a step-hold profile
    ///
    /// Fails with [`ScenarioError::InvalidProfile`] if `times` is empty,
    /// the lengths of `times` and `values` differ or `times` decreases anywhere.
    pub fn new(times: Vec<f64>, values: Vec<f64>) -> ScenarioResult<Self> {
        Self::with_interpolation(times, values, Interpolation::Step)
    }

    pub fn with_interpolation(
        times: Vec<f64>,
        values: Vec<f64>,
        interpolation: Interpolation,
    ) -> ScenarioResult<Self> {
        Self::from_arrays(times.into(), values.into(), interpolation)
    }

    /// Create a profile from numbers parsed out of a configuration
    pub fn from_arrays(
        times: NumberArray,
        values: NumberArray,
        interpolation: Interpolation,
    ) -> ScenarioResult<Self> {
        if times.is_empty() {
            return Err(ScenarioError::InvalidProfile(
                "time array must contain at least one sample".to_string(),
            ));
        }
        if times.len() != values.len() {
            return Err(ScenarioError::InvalidProfile(format!(
                "{} times but {} values",
                times.len(),
                values.len()
            )));
        }
        check_non_decreasing(times.values()).map_err(ScenarioError::InvalidProfile)?;

        Ok(Self {
            times,
            values,
            interpolation,
        })
    }

    /// Evaluate the profile at time `t`
    ///
    /// Uses a binary search over the sample times so the cost is `O(log n)`.
    pub fn query(&self, t: f64) -> f64 {
        let (times, values) = (self.times.values(), self.values.values());
        // Number of samples at or before t
        let count = times.partition_point(|&time| time <= t);
        let last = times.len() - 1;

        match self.interpolation {
            Interpolation::Step => values[count.saturating_sub(1)],
            Interpolation::Linear => {
                if count == 0 {
                    values[0]
                } else if count > last {
                    values[last]
                } else {
                    let (t0, t1) = (times[count - 1], times[count]);
                    let (v0, v1) = (values[count - 1], values[count]);
                    v0 + (v1 - v0) * (t - t0) / (t1 - t0)
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        aview1(self.times.values())
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        aview1(self.values.values())
    }

    pub(crate) fn time_array(&self) -> &NumberArray {
        &self.times
    }

    pub(crate) fn value_array(&self) -> &NumberArray {
        &self.values
    }
}

/// Check that a sample grid never goes backwards in time
///
/// NaN times are rejected since they cannot be ordered.
pub(crate) fn check_non_decreasing(times: &[f64]) -> Result<(), String> {
    if let Some(time) = times.iter().find(|t| t.is_nan()) {
        return Err(format!("time array contains {time}"));
    }
    match times.windows(2).position(|w| w[1] < w[0]) {
        Some(i) => Err(format!(
            "time array decreases from {} to {} at index {}",
            times[i],
            times[i + 1],
            i + 1
        )),
        None => Ok(()),
    }
}
