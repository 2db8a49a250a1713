//! Gas-phase emission and background profiles.
//!
//! A gas block in the scenario configuration has the shape
//! `[{"time": [...]}, {"rate": [...]}, {"SO2": [...]}, {"NO2": [...]}, ...]`.
//! `rate` is a dimensionless scale (emissions) or a dilution rate in s^-1
//! (background), and each species array holds emission rates or background
//! mixing ratios on the same time grid.

use crate::config::{as_list, component, keyed, single_entry, NumberArray};
use crate::errors::{ScenarioError, ScenarioResult};
use crate::profile::{Interpolation, Profile};
use crate::registry::GasRegistry;
use log::debug;
use serde_json::Value;
use std::collections::HashMap;

/// One gas block: a rate profile plus per-species profiles
#[derive(Debug, Clone, PartialEq)]
pub struct GasSeries {
    rate: Profile,
    /// Species profiles in gas registry order
    species: Vec<(String, Profile)>,
    index: HashMap<String, usize>,
}

impl GasSeries {
    /// Species must be known to `gas_data`. They are stored in registry order
    /// regardless of the order they are given in.
    pub fn new(
        rate: Profile,
        species: Vec<(String, Profile)>,
        gas_data: &dyn GasRegistry,
    ) -> ScenarioResult<Self> {
        let mut ordered = Vec::with_capacity(species.len());
        for (name, profile) in species {
            let position = gas_data
                .species_index(&name)
                .ok_or_else(|| ScenarioError::UnknownGasSpecies(name.clone()))?;
            if ordered.iter().any(|(_, other, _)| other == &name) {
                return Err(ScenarioError::malformed(
                    &name,
                    "species is given more than once",
                ));
            }
            ordered.push((position, name, profile));
        }
        ordered.sort_by_key(|(position, _, _)| *position);

        let species: Vec<(String, Profile)> = ordered
            .into_iter()
            .map(|(_, name, profile)| (name, profile))
            .collect();
        let index = species
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        Ok(Self {
            rate,
            species,
            index,
        })
    }

    pub fn from_config(
        value: &Value,
        block: &str,
        gas_data: &dyn GasRegistry,
    ) -> ScenarioResult<Self> {
        let entries = as_list(value, block)?;
        let times =
            NumberArray::parse(component(entries, 0, "time", block)?, &format!("{block}.time"))?;
        let rate =
            NumberArray::parse(component(entries, 1, "rate", block)?, &format!("{block}.rate"))?;
        let rate = Profile::from_arrays(times.clone(), rate, Interpolation::Step)
            .map_err(|e| e.at(&format!("{block}.rate")))?;

        let species = entries[2..]
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let (name, values) = single_entry(entry, &format!("{block}[{}]", i + 2))?;
                if values.is_null() {
                    return Err(ScenarioError::missing(block, name));
                }
                let path = format!("{block}.{name}");
                let values = NumberArray::parse(values, &path)?;
                let profile = Profile::from_arrays(times.clone(), values, Interpolation::Step)
                    .map_err(|e| e.at(&path))?;
                Ok((name.to_string(), profile))
            })
            .collect::<ScenarioResult<Vec<_>>>()?;

        let series = Self::new(rate, species, gas_data)?;
        for name in gas_data.species_names() {
            if !series.index.contains_key(name) {
                debug!("{block}: no profile for gas species {name}, treating it as zero");
            }
        }
        Ok(series)
    }

    pub fn to_config(&self) -> Value {
        let mut entries = vec![
            keyed("time", self.rate.time_array().to_value()),
            keyed("rate", self.rate.value_array().to_value()),
        ];
        entries.extend(
            self.species
                .iter()
                .map(|(name, profile)| keyed(name, profile.value_array().to_value())),
        );
        Value::Array(entries)
    }

    pub fn rate(&self, t: f64) -> f64 {
        self.rate.query(t)
    }

    pub fn rate_profile(&self) -> &Profile {
        &self.rate
    }

    /// Value of species `name` at `t`, or zero if the block has no profile for it
    pub fn value(&self, name: &str, t: f64) -> f64 {
        self.profile(name).map_or(0.0, |profile| profile.query(t))
    }

    pub fn profile(&self, name: &str) -> Option<&Profile> {
        self.index.get(name).map(|i| &self.species[*i].1)
    }

    pub fn species_names(&self) -> impl Iterator<Item = &str> {
        self.species.iter().map(|(name, _)| name.as_str())
    }
}

/// Gas emissions and background paired together
#[derive(Debug, Clone, PartialEq)]
pub struct GasProfileBundle {
    emissions: GasSeries,
    background: GasSeries,
}

impl GasProfileBundle {
    pub fn new(emissions: GasSeries, background: GasSeries) -> Self {
        Self {
            emissions,
            background,
        }
    }

    pub fn from_config(
        emissions: &Value,
        background: &Value,
        gas_data: &dyn GasRegistry,
    ) -> ScenarioResult<Self> {
        Ok(Self::new(
            GasSeries::from_config(emissions, "gas_emissions", gas_data)?,
            GasSeries::from_config(background, "gas_background", gas_data)?,
        ))
    }

    /// Emission rate of a species at `t`, before the emission rate scale is applied
    pub fn emission_rate(&self, name: &str, t: f64) -> f64 {
        self.emissions.value(name, t)
    }

    pub fn background_concentration(&self, name: &str, t: f64) -> f64 {
        self.background.value(name, t)
    }

    pub fn emission_rate_scale(&self, t: f64) -> f64 {
        self.emissions.rate(t)
    }

    /// Rate at which background air is mixed in (s^-1)
    pub fn dilution_rate(&self, t: f64) -> f64 {
        self.background.rate(t)
    }

    pub fn emissions(&self) -> &GasSeries {
        &self.emissions
    }

    pub fn background(&self) -> &GasSeries {
        &self.background
    }
}
