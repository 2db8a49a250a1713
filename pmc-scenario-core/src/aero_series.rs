//! Time-indexed aerosol distribution series.
//!
//! Aerosol emissions and background air are described as a sequence of
//! discrete snapshots. Each snapshot has a start time, a rate scale and a set
//! of named modes. Snapshots are never blended together here; a driver picks
//! the index it needs (for example with [`AeroDistSeries::index_at`]) and
//! does any combining itself.

use crate::aero_dist::AeroDist;
use crate::aero_mode::AeroMode;
use crate::config::{as_list, as_object, component, keyed, NumberArray};
use crate::errors::{ScenarioError, ScenarioResult};
use crate::mode_set::NamedModeSet;
use crate::profile::check_non_decreasing;
use crate::registry::AeroRegistry;
use ndarray::{aview1, ArrayView1};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct AeroDistSeries {
    times: NumberArray,
    rate_scales: NumberArray,
    mode_sets: Vec<NamedModeSet>,
    /// Number of modes in each mapping of the `dist` list, per snapshot
    groups: Vec<Vec<usize>>,
}

impl AeroDistSeries {
    /// Create a series from parallel arrays
    ///
    /// Fails with [`ScenarioError::InvalidSeries`] if the arrays are empty,
    /// have different lengths or `times` decreases.
    pub fn new(
        times: Vec<f64>,
        rate_scales: Vec<f64>,
        mode_sets: Vec<NamedModeSet>,
    ) -> ScenarioResult<Self> {
        let groups = mode_sets.iter().map(|set| vec![set.mode_count()]).collect();
        Self::with_groups(times.into(), rate_scales.into(), mode_sets, groups)
    }

    fn with_groups(
        times: NumberArray,
        rate_scales: NumberArray,
        mode_sets: Vec<NamedModeSet>,
        groups: Vec<Vec<usize>>,
    ) -> ScenarioResult<Self> {
        if times.is_empty() {
            return Err(ScenarioError::InvalidSeries(
                "time array must contain at least one entry".to_string(),
            ));
        }
        if rate_scales.len() != times.len() || mode_sets.len() != times.len() {
            return Err(ScenarioError::InvalidSeries(format!(
                "{} times, {} rates and {} distributions",
                times.len(),
                rate_scales.len(),
                mode_sets.len()
            )));
        }
        check_non_decreasing(times.values()).map_err(ScenarioError::InvalidSeries)?;

        Ok(Self {
            times,
            rate_scales,
            mode_sets,
            groups,
        })
    }

    /// Parse a `[{"time": [...]}, {"rate": [...]}, {"dist": [...]}]` block
    ///
    /// Each element of `dist` is a list of mappings from mode name to mode
    /// parameters. All modes of one element form that snapshot's mode set, in
    /// the order they are written.
    pub fn from_config(
        value: &Value,
        block: &str,
        aero_data: &dyn AeroRegistry,
    ) -> ScenarioResult<Self> {
        let entries = as_list(value, block)?;
        let times =
            NumberArray::parse(component(entries, 0, "time", block)?, &format!("{block}.time"))?;
        let rate_scales =
            NumberArray::parse(component(entries, 1, "rate", block)?, &format!("{block}.rate"))?;
        let dist = as_list(
            component(entries, 2, "dist", block)?,
            &format!("{block}.dist"),
        )?;
        if entries.len() > 3 {
            return Err(ScenarioError::malformed(
                block,
                format!("expected 3 entries, got {}", entries.len()),
            ));
        }

        let mut mode_sets = Vec::with_capacity(dist.len());
        let mut groups = Vec::with_capacity(dist.len());
        for (i, slot) in dist.iter().enumerate() {
            let slot_path = format!("{block}.dist[{i}]");
            let mut modes = Vec::new();
            let mut sizes = Vec::new();
            for (j, mapping) in as_list(slot, &slot_path)?.iter().enumerate() {
                let mapping_path = format!("{slot_path}[{j}]");
                let mapping = as_object(mapping, &mapping_path)?;
                for (name, params) in mapping {
                    modes.push(AeroMode::from_config(
                        name,
                        params,
                        aero_data,
                        &format!("{mapping_path}.{name}"),
                    )?);
                }
                sizes.push(mapping.len());
            }
            mode_sets.push(NamedModeSet::new(modes)?);
            groups.push(sizes);
        }

        Self::with_groups(times, rate_scales, mode_sets, groups).map_err(|e| e.at(block))
    }

    pub fn to_config(&self) -> Value {
        let dist = self
            .mode_sets
            .iter()
            .zip(self.groups.iter())
            .map(|(set, sizes)| {
                let mut modes = set.iter();
                Value::Array(
                    sizes
                        .iter()
                        .map(|size| {
                            let mapping: Map<String, Value> = modes
                                .by_ref()
                                .take(*size)
                                .map(|mode| (mode.name().to_string(), mode.to_config()))
                                .collect();
                            Value::Object(mapping)
                        })
                        .collect(),
                )
            })
            .collect();

        Value::Array(vec![
            keyed("time", self.times.to_value()),
            keyed("rate", self.rate_scales.to_value()),
            keyed("dist", Value::Array(dist)),
        ])
    }

    pub fn n_times(&self) -> usize {
        self.times.len()
    }

    pub fn time_at(&self, i: usize) -> ScenarioResult<f64> {
        self.check_index(i).map(|i| self.times.values()[i])
    }

    pub fn rate_scale_at(&self, i: usize) -> ScenarioResult<f64> {
        self.check_index(i).map(|i| self.rate_scales.values()[i])
    }

    pub fn mode_set_at(&self, i: usize) -> ScenarioResult<&NamedModeSet> {
        self.check_index(i).map(|i| &self.mode_sets[i])
    }

    /// Materialise snapshot `i` against the aerosol registry
    pub fn dist_at(&self, i: usize, aero_data: &dyn AeroRegistry) -> ScenarioResult<AeroDist> {
        let i = self.check_index(i)?;
        AeroDist::new(&self.mode_sets[i], self.rate_scales.values()[i], aero_data)
    }

    /// Index of the last snapshot starting at or before `t`
    ///
    /// Times before the first snapshot map to index 0.
    pub fn index_at(&self, t: f64) -> usize {
        self.times
            .values()
            .partition_point(|&time| time <= t)
            .saturating_sub(1)
    }

    pub fn times(&self) -> ArrayView1<'_, f64> {
        aview1(self.times.values())
    }

    pub fn rate_scales(&self) -> ArrayView1<'_, f64> {
        aview1(self.rate_scales.values())
    }

    fn check_index(&self, i: usize) -> ScenarioResult<usize> {
        if i < self.times.len() {
            Ok(i)
        } else {
            Err(ScenarioError::IndexOutOfRange {
                what: "aerosol series",
                index: i,
                len: self.times.len(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AeroData, AeroSpecies};
    use serde_json::json;

    fn aero_data() -> AeroData {
        AeroData::new(vec![
            AeroSpecies::new("SO4", 1800.0, 0.096),
            AeroSpecies::new("H2O", 1000.0, 0.018),
        ])
    }

    fn mode(num_conc: f64) -> Value {
        json!({
            "mass_frac": [{"H2O": [1.0]}],
            "diam_type": "geometric",
            "mode_type": "log_normal",
            "num_conc": num_conc,
            "geom_mean_diam": 1e-6,
            "log10_geom_std_dev": 0.5
        })
    }

    fn time_varying() -> Value {
        json!([
            {"time": [0.0, 1.0, 2.0, 3.0, 4.0]},
            {"rate": [0.0, 10.0, 100.0, 1000.0, 10000.0]},
            {"dist": [
                [{"A": mode(1e6)}],
                [{"A": mode(2e6)}],
                [{"A": mode(3e6)}],
                [{"A": mode(4e6)}],
                [{"A": mode(5e6)}]
            ]}
        ])
    }

    #[test]
    fn time_varying_series() {
        let series = AeroDistSeries::from_config(&time_varying(), "aero_emissions", &aero_data())
            .unwrap();
        let rates = [0.0, 10.0, 100.0, 1000.0, 10000.0];
        assert_eq!(series.n_times(), 5);
        for i in 0..5 {
            assert_eq!(series.time_at(i).unwrap(), i as f64);
            assert_eq!(series.rate_scale_at(i).unwrap(), rates[i]);
            let set = series.mode_set_at(i).unwrap();
            assert_eq!(set.mode_count(), 1);
            assert_eq!(set.mode_by_index(0).unwrap().num_conc(), (i + 1) as f64 * 1e6);
        }
        assert_eq!(series.times().to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(series.rate_scales()[4], 10000.0);
    }

    #[test]
    fn out_of_range_index() {
        let series = AeroDistSeries::from_config(&time_varying(), "aero_emissions", &aero_data())
            .unwrap();
        let expected = ScenarioError::IndexOutOfRange {
            what: "aerosol series",
            index: 5,
            len: 5,
        };
        assert_eq!(series.time_at(5).unwrap_err(), expected);
        assert_eq!(series.rate_scale_at(5).unwrap_err(), expected);
        assert!(series.mode_set_at(5).is_err());
        assert!(series.dist_at(5, &aero_data()).is_err());
    }

    #[test]
    fn index_at_selects_last_started_snapshot() {
        let series = AeroDistSeries::from_config(&time_varying(), "aero_emissions", &aero_data())
            .unwrap();
        assert_eq!(series.index_at(-1.0), 0);
        assert_eq!(series.index_at(0.0), 0);
        assert_eq!(series.index_at(2.5), 2);
        assert_eq!(series.index_at(4.0), 4);
        assert_eq!(series.index_at(100.0), 4);
    }

    #[test]
    fn groups_roundtrip() {
        let value = json!([
            {"time": [0.0]},
            {"rate": [1.0]},
            {"dist": [[{"B": mode(1.0), "A": mode(2.0)}, {"C": mode(3.0)}]]}
        ]);
        let series = AeroDistSeries::from_config(&value, "aero_background", &aero_data()).unwrap();
        let set = series.mode_set_at(0).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        assert_eq!(series.to_config(), value);
    }

    #[test]
    fn integer_times_and_rates_roundtrip() {
        let value = json!([
            {"time": [0, 3600]},
            {"rate": [1, 0]},
            {"dist": [[{"A": mode(1.0)}], [{"A": mode(2.0)}]]}
        ]);
        let series = AeroDistSeries::from_config(&value, "aero_emissions", &aero_data()).unwrap();
        assert_eq!(series.time_at(1).unwrap(), 3600.0);
        assert_eq!(series.rate_scale_at(0).unwrap(), 1.0);
        assert_eq!(series.to_config(), value);
    }

    #[test]
    fn duplicate_mode_across_mappings() {
        let value = json!([
            {"time": [0.0]},
            {"rate": [1.0]},
            {"dist": [[{"A": mode(1.0)}, {"A": mode(3.0)}]]}
        ]);
        let err = AeroDistSeries::from_config(&value, "aero_background", &aero_data()).unwrap_err();
        assert_eq!(err, ScenarioError::DuplicateModeName("A".to_string()));
    }

    #[test]
    fn length_mismatch() {
        let value = json!([
            {"time": [0.0, 1.0]},
            {"rate": [1.0, 2.0]},
            {"dist": [[{"A": mode(1.0)}]]}
        ]);
        let err = AeroDistSeries::from_config(&value, "aero_emissions", &aero_data()).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidSeries(ref msg) if msg.starts_with("aero_emissions")));
    }

    #[test]
    fn empty_time_rejected() {
        let value = json!([{"time": []}, {"rate": []}, {"dist": []}]);
        let err = AeroDistSeries::from_config(&value, "aero_emissions", &aero_data()).unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidSeries(_)));
    }

    #[test]
    fn decreasing_time_rejected() {
        let err = AeroDistSeries::new(
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![NamedModeSet::default(), NamedModeSet::default()],
        )
        .unwrap_err();
        assert!(matches!(err, ScenarioError::InvalidSeries(_)));
    }

    #[test]
    fn missing_dist() {
        let value = json!([{"time": [0.0]}, {"rate": [1.0]}]);
        let err = AeroDistSeries::from_config(&value, "aero_emissions", &aero_data()).unwrap_err();
        assert_eq!(
            err,
            ScenarioError::MissingSeriesComponent {
                block: "aero_emissions".to_string(),
                component: "dist".to_string()
            }
        );
    }

    #[test]
    fn materialised_snapshot_carries_rate() {
        let series = AeroDistSeries::from_config(&time_varying(), "aero_emissions", &aero_data())
            .unwrap();
        let dist = series.dist_at(3, &aero_data()).unwrap();
        assert_eq!(dist.rate_scale(), 1000.0);
        assert_eq!(dist.mode(0).unwrap().num_conc(), 4e6);
        assert_eq!(dist.vol_frac(0).unwrap(), &[0.0, 1.0]);
    }
}
