//! Gas and aerosol species registries.
//!
//! Registries are owned by the host simulation. A scenario only reads species
//! names (and aerosol densities) from them, both to validate its inputs and
//! to order per-species data consistently with the rest of the simulation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An ordered, named catalogue of gas species
pub trait GasRegistry: Send + Sync {
    /// Species names in declaration order
    fn species_names(&self) -> &[String];

    /// Position of a species in declaration order
    fn species_index(&self, name: &str) -> Option<usize> {
        self.species_names().iter().position(|s| s == name)
    }

    fn n_spec(&self) -> usize {
        self.species_names().len()
    }
}

/// An ordered, named catalogue of aerosol species with physical properties
pub trait AeroRegistry: Send + Sync {
    /// Species names in declaration order
    fn species_names(&self) -> &[String];

    fn species_index(&self, name: &str) -> Option<usize> {
        self.species_names().iter().position(|s| s == name)
    }

    fn n_spec(&self) -> usize {
        self.species_names().len()
    }

    /// Density of the species at `index` (kg m^-3)
    fn density(&self, index: usize) -> f64;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GasData {
    names: Vec<String>,
}

impl GasData {
    pub fn new<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl GasRegistry for GasData {
    fn species_names(&self) -> &[String] {
        &self.names
    }
}

/// Physical properties of a single aerosol species
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AeroSpecies {
    pub name: String,
    /// Density (kg m^-3)
    pub density: f64,
    /// Number of ions in solution
    #[serde(default)]
    pub ions_in_soln: u32,
    /// Molecular weight (kg mol^-1)
    pub molec_weight: f64,
    /// Hygroscopicity parameter
    #[serde(default)]
    pub kappa: f64,
}

impl AeroSpecies {
    pub fn new(name: impl Into<String>, density: f64, molec_weight: f64) -> Self {
        Self {
            name: name.into(),
            density,
            ions_in_soln: 0,
            molec_weight,
            kappa: 0.0,
        }
    }

    pub fn with_kappa(mut self, kappa: f64) -> Self {
        self.kappa = kappa;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AeroData {
    species: Vec<AeroSpecies>,
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl AeroData {
    pub fn new(species: Vec<AeroSpecies>) -> Self {
        let names: Vec<String> = species.iter().map(|s| s.name.clone()).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self {
            species,
            names,
            index,
        }
    }

    pub fn species(&self) -> &[AeroSpecies] {
        &self.species
    }

    pub fn get(&self, name: &str) -> Option<&AeroSpecies> {
        self.index.get(name).map(|i| &self.species[*i])
    }
}

impl AeroRegistry for AeroData {
    fn species_names(&self) -> &[String] {
        &self.names
    }

    fn species_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    fn density(&self, index: usize) -> f64 {
        self.species[index].density
    }
}
