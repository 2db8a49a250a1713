//! Parametric aerosol size-distribution modes.
//!
//! A mode describes one population of particles: how many there are
//! (`num_conc`, m^-3), how their diameters are distributed and what they are
//! made of. Modes are read from the PartMC JSON mode format:
//!
//! ```json
//! {
//!     "mass_frac": [{"SO4": [0.8]}, {"BC": [0.2, 0.05]}],
//!     "diam_type": "geometric",
//!     "mode_type": "log_normal",
//!     "num_conc": 1e9,
//!     "geom_mean_diam": 5e-8,
//!     "log10_geom_std_dev": 0.24
//! }
//! ```
//!
//! Each `mass_frac` entry holds a fraction and optionally its standard deviation.

use crate::bin_grid::BinGrid;
use crate::config::{
    as_f64, as_list, as_object, as_str, component, keyed, required, single_entry, NumberArray,
};
use crate::errors::{ScenarioError, ScenarioResult};
use crate::registry::AeroRegistry;
use ndarray::Array1;
use serde_json::{Map, Value};
use std::f64::consts::{LN_10, PI};

/// How the diameters of a mode were measured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DiamType {
    Geometric,
    /// Mobility-equivalent diameters, measured at the given temperature (K)
    /// and pressure (Pa)
    Mobility { temp: f64, pressure: f64 },
}

impl DiamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiamType::Geometric => "geometric",
            DiamType::Mobility { .. } => "mobility",
        }
    }
}

/// Shape of the size distribution
///
/// Diameters are in m and number concentrations in m^-3.
#[derive(Debug, Clone, PartialEq)]
pub enum ModeShape {
    LogNormal {
        num_conc: f64,
        geom_mean_diam: f64,
        log10_geom_std_dev: f64,
    },
    /// Exponential in particle volume
    Exp { num_conc: f64, diam_at_mean_vol: f64 },
    /// Every particle has the same diameter
    Mono { num_conc: f64, diam: f64 },
    /// Tabulated number concentrations between consecutive diameter edges
    Sampled {
        diam_edges: Vec<f64>,
        num_concs: Vec<f64>,
    },
}

impl ModeShape {
    pub fn mode_type(&self) -> &'static str {
        match self {
            ModeShape::LogNormal { .. } => "log_normal",
            ModeShape::Exp { .. } => "exp",
            ModeShape::Mono { .. } => "mono",
            ModeShape::Sampled { .. } => "sampled",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MassFraction {
    pub species: String,
    pub frac: f64,
    pub std_dev: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AeroMode {
    name: String,
    shape: ModeShape,
    diam_type: DiamType,
    mass_frac: Vec<MassFraction>,
    /// Numbers as written in the configuration, keyed by parameter
    literals: Map<String, Value>,
}

/// Scalar parameters whose literals are kept for serialisation
const SCALAR_KEYS: [&str; 7] = [
    "num_conc",
    "geom_mean_diam",
    "log10_geom_std_dev",
    "diam_at_mean_vol",
    "diam",
    "temp",
    "pressure",
];

impl AeroMode {
    /// Create a mode directly from typed parameters
    ///
    /// Composition is checked against `aero_data` in the same way as
    /// [`AeroMode::from_config`].
    pub fn new(
        name: impl Into<String>,
        shape: ModeShape,
        diam_type: DiamType,
        mass_frac: Vec<MassFraction>,
        aero_data: &dyn AeroRegistry,
    ) -> ScenarioResult<Self> {
        let mode = Self {
            name: name.into(),
            shape,
            diam_type,
            mass_frac,
            literals: Map::new(),
        };
        let path = mode.name.clone();
        mode.validate(aero_data, &path)?;
        Ok(mode)
    }

    /// Parse the parameters of mode `name` from its JSON mapping
    pub fn from_config(
        name: &str,
        value: &Value,
        aero_data: &dyn AeroRegistry,
        path: &str,
    ) -> ScenarioResult<Self> {
        let params = as_object(value, path)?;
        let mut literals: Map<String, Value> = SCALAR_KEYS
            .iter()
            .filter_map(|key| match params.get(*key) {
                Some(number) if number.is_number() => Some((key.to_string(), number.clone())),
                _ => None,
            })
            .collect();

        let mass_frac = parse_mass_frac(
            required(params, "mass_frac", path)?,
            &format!("{path}.mass_frac"),
            &mut literals,
        )?;

        let diam_type = match as_str(required(params, "diam_type", path)?, path)? {
            "geometric" => DiamType::Geometric,
            "mobility" => DiamType::Mobility {
                temp: as_f64(required(params, "temp", path)?, &format!("{path}.temp"))?,
                pressure: as_f64(
                    required(params, "pressure", path)?,
                    &format!("{path}.pressure"),
                )?,
            },
            other => {
                return Err(ScenarioError::malformed(
                    &format!("{path}.diam_type"),
                    format!("unknown diameter type '{other}'"),
                ))
            }
        };

        let number = |key: &str| -> ScenarioResult<f64> {
            as_f64(required(params, key, path)?, &format!("{path}.{key}"))
        };
        let shape = match as_str(required(params, "mode_type", path)?, path)? {
            "log_normal" => ModeShape::LogNormal {
                num_conc: number("num_conc")?,
                geom_mean_diam: number("geom_mean_diam")?,
                log10_geom_std_dev: number("log10_geom_std_dev")?,
            },
            "exp" => ModeShape::Exp {
                num_conc: number("num_conc")?,
                diam_at_mean_vol: number("diam_at_mean_vol")?,
            },
            "mono" => ModeShape::Mono {
                num_conc: number("num_conc")?,
                diam: number("diam")?,
            },
            "sampled" => {
                let size_path = format!("{path}.size_dist");
                let entries = as_list(required(params, "size_dist", path)?, &size_path)?;
                let diam_edges = NumberArray::parse(
                    component(entries, 0, "diam", &size_path)?,
                    &format!("{size_path}.diam"),
                )?;
                let num_concs = NumberArray::parse(
                    component(entries, 1, "num_conc", &size_path)?,
                    &format!("{size_path}.num_conc"),
                )?;
                literals.insert("size_dist.diam".to_string(), diam_edges.to_value());
                literals.insert("size_dist.num_conc".to_string(), num_concs.to_value());
                ModeShape::Sampled {
                    diam_edges: diam_edges.values().to_vec(),
                    num_concs: num_concs.values().to_vec(),
                }
            }
            other => {
                return Err(ScenarioError::malformed(
                    &format!("{path}.mode_type"),
                    format!("unknown mode type '{other}'"),
                ))
            }
        };

        let mode = Self {
            name: name.to_string(),
            shape,
            diam_type,
            mass_frac,
            literals,
        };
        mode.validate(aero_data, path)?;
        Ok(mode)
    }

    fn validate(&self, aero_data: &dyn AeroRegistry, path: &str) -> ScenarioResult<()> {
        for fraction in &self.mass_frac {
            if aero_data.species_index(&fraction.species).is_none() {
                return Err(ScenarioError::UnknownAerosolSpecies {
                    mode: self.name.clone(),
                    species: fraction.species.clone(),
                });
            }
            if !(fraction.frac >= 0.0) {
                return Err(ScenarioError::malformed(
                    &format!("{path}.mass_frac"),
                    format!("fraction of '{}' is {}", fraction.species, fraction.frac),
                ));
            }
            if let Some(std_dev) = fraction.std_dev.filter(|s| !(*s >= 0.0)) {
                return Err(ScenarioError::malformed(
                    &format!("{path}.mass_frac"),
                    format!("standard deviation of '{}' is {std_dev}", fraction.species),
                ));
            }
        }
        if !(self.mass_frac.iter().map(|f| f.frac).sum::<f64>() > 0.0) {
            return Err(ScenarioError::malformed(
                &format!("{path}.mass_frac"),
                "mass fractions must have a positive sum",
            ));
        }

        let positive = |key: &str, value: f64| -> ScenarioResult<()> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(ScenarioError::malformed(
                    &format!("{path}.{key}"),
                    format!("must be positive, got {value}"),
                ))
            }
        };
        let non_negative = |key: &str, value: f64| -> ScenarioResult<()> {
            if value >= 0.0 {
                Ok(())
            } else {
                Err(ScenarioError::malformed(
                    &format!("{path}.{key}"),
                    format!("must not be negative, got {value}"),
                ))
            }
        };

        match &self.shape {
            ModeShape::LogNormal {
                num_conc,
                geom_mean_diam,
                log10_geom_std_dev,
            } => {
                non_negative("num_conc", *num_conc)?;
                positive("geom_mean_diam", *geom_mean_diam)?;
                positive("log10_geom_std_dev", *log10_geom_std_dev)?;
            }
            ModeShape::Exp {
                num_conc,
                diam_at_mean_vol,
            } => {
                non_negative("num_conc", *num_conc)?;
                positive("diam_at_mean_vol", *diam_at_mean_vol)?;
            }
            ModeShape::Mono { num_conc, diam } => {
                non_negative("num_conc", *num_conc)?;
                positive("diam", *diam)?;
            }
            ModeShape::Sampled {
                diam_edges,
                num_concs,
            } => {
                if diam_edges.len() != num_concs.len() + 1 {
                    return Err(ScenarioError::malformed(
                        &format!("{path}.size_dist"),
                        format!(
                            "{} diameters need {} number concentrations, got {}",
                            diam_edges.len(),
                            diam_edges.len().saturating_sub(1),
                            num_concs.len()
                        ),
                    ));
                }
                if !diam_edges.windows(2).all(|w| w[0] > 0.0 && w[1] > w[0]) {
                    return Err(ScenarioError::malformed(
                        &format!("{path}.size_dist.diam"),
                        "diameters must be positive and increasing",
                    ));
                }
                for value in num_concs {
                    non_negative("size_dist.num_conc", *value)?;
                }
            }
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shape(&self) -> &ModeShape {
        &self.shape
    }

    pub fn diam_type(&self) -> DiamType {
        self.diam_type
    }

    pub fn mass_frac(&self) -> &[MassFraction] {
        &self.mass_frac
    }

    pub fn mode_type(&self) -> &'static str {
        self.shape.mode_type()
    }

    /// Total number concentration of the mode (m^-3)
    pub fn num_conc(&self) -> f64 {
        match &self.shape {
            ModeShape::LogNormal { num_conc, .. }
            | ModeShape::Exp { num_conc, .. }
            | ModeShape::Mono { num_conc, .. } => *num_conc,
            ModeShape::Sampled { num_concs, .. } => num_concs.iter().sum(),
        }
    }

    /// Normalised volume fractions, one per species in registry order
    ///
    /// Mass fractions are converted using the species densities of `aero_data`.
    pub fn vol_frac(&self, aero_data: &dyn AeroRegistry) -> ScenarioResult<Vec<f64>> {
        let mut vol_frac = self.species_volumes(aero_data, |f| f.frac)?;
        let total: f64 = vol_frac.iter().sum();
        if total > 0.0 {
            vol_frac.iter_mut().for_each(|v| *v /= total);
        }
        Ok(vol_frac)
    }

    /// Standard deviations of [`AeroMode::vol_frac`], one per species in registry order
    ///
    /// Mass fraction standard deviations are scaled by the same densities and
    /// normalisation as the fractions. Species without one get zero.
    pub fn vol_frac_std(&self, aero_data: &dyn AeroRegistry) -> ScenarioResult<Vec<f64>> {
        let total: f64 = self.species_volumes(aero_data, |f| f.frac)?.iter().sum();
        let mut vol_frac_std =
            self.species_volumes(aero_data, |f| f.std_dev.unwrap_or(0.0))?;
        if total > 0.0 {
            vol_frac_std.iter_mut().for_each(|v| *v /= total);
        }
        Ok(vol_frac_std)
    }

    /// Per-species `mass / density` for the mass quantity picked by `mass`
    fn species_volumes(
        &self,
        aero_data: &dyn AeroRegistry,
        mass: impl Fn(&MassFraction) -> f64,
    ) -> ScenarioResult<Vec<f64>> {
        let mut volumes = vec![0.0; aero_data.n_spec()];
        for fraction in &self.mass_frac {
            let index = aero_data.species_index(&fraction.species).ok_or_else(|| {
                ScenarioError::UnknownAerosolSpecies {
                    mode: self.name.clone(),
                    species: fraction.species.clone(),
                }
            })?;
            let density = aero_data.density(index);
            if !(density > 0.0) {
                return Err(ScenarioError::malformed(
                    &format!("{}.mass_frac", self.name),
                    format!("species '{}' has density {density}", fraction.species),
                ));
            }
            volumes[index] += mass(fraction) / density;
        }
        Ok(volumes)
    }

    /// Number concentration of the mode in each bin of `bin_grid` (m^-3)
    ///
    /// Parts of the distribution outside the grid are dropped.
    pub fn num_dist(&self, bin_grid: &BinGrid) -> Array1<f64> {
        let width = bin_grid.log_width();
        let centers = bin_grid.centers();
        let mut dist = Array1::zeros(bin_grid.n_bin());

        match &self.shape {
            ModeShape::LogNormal {
                num_conc,
                geom_mean_diam,
                log10_geom_std_dev,
            } => {
                let sigma = *log10_geom_std_dev;
                let log10_mean = geom_mean_diam.log10();
                dist.iter_mut().zip(centers.iter()).for_each(|(n, d)| {
                    // dN/dlog10(D), then converted to the ln(D) bin width
                    let x = d.log10() - log10_mean;
                    let density = num_conc / ((2.0 * PI).sqrt() * sigma)
                        * (-x * x / (2.0 * sigma * sigma)).exp();
                    *n = density * width / LN_10;
                });
            }
            ModeShape::Exp {
                num_conc,
                diam_at_mean_vol,
            } => {
                let vol_mean = diam_to_vol(*diam_at_mean_vol);
                dist.iter_mut().zip(centers.iter()).for_each(|(n, d)| {
                    let vol = diam_to_vol(*d);
                    // dN/dV * dV/dln(D)
                    *n = num_conc / vol_mean * (-vol / vol_mean).exp() * 3.0 * vol * width;
                });
            }
            ModeShape::Mono { num_conc, diam } => {
                if let Some(i) = bin_grid.find(*diam) {
                    dist[i] = *num_conc;
                }
            }
            ModeShape::Sampled {
                diam_edges,
                num_concs,
            } => {
                for (edges, num_conc) in diam_edges.windows(2).zip(num_concs.iter()) {
                    if let Some(i) = bin_grid.find((edges[0] * edges[1]).sqrt()) {
                        dist[i] += num_conc;
                    }
                }
            }
        }
        dist
    }

    /// Serialise the mode parameters back to their JSON mapping
    pub fn to_config(&self) -> Value {
        let mut params = Map::new();
        params.insert(
            "mass_frac".to_string(),
            Value::Array(
                self.mass_frac
                    .iter()
                    .enumerate()
                    .map(|(i, f)| {
                        let values = match f.std_dev {
                            Some(std_dev) => vec![f.frac, std_dev],
                            None => vec![f.frac],
                        };
                        let values = NumberArray::from(values).to_value();
                        keyed(&f.species, self.literal(&format!("mass_frac[{i}]"), values))
                    })
                    .collect(),
            ),
        );
        params.insert(
            "diam_type".to_string(),
            Value::from(self.diam_type.as_str()),
        );
        if let DiamType::Mobility { temp, pressure } = self.diam_type {
            params.insert("temp".to_string(), self.number("temp", temp));
            params.insert("pressure".to_string(), self.number("pressure", pressure));
        }
        params.insert("mode_type".to_string(), Value::from(self.mode_type()));

        let scalars: Vec<(&str, f64)> = match &self.shape {
            ModeShape::LogNormal {
                num_conc,
                geom_mean_diam,
                log10_geom_std_dev,
            } => vec![
                ("num_conc", *num_conc),
                ("geom_mean_diam", *geom_mean_diam),
                ("log10_geom_std_dev", *log10_geom_std_dev),
            ],
            ModeShape::Exp {
                num_conc,
                diam_at_mean_vol,
            } => vec![
                ("num_conc", *num_conc),
                ("diam_at_mean_vol", *diam_at_mean_vol),
            ],
            ModeShape::Mono { num_conc, diam } => {
                vec![("num_conc", *num_conc), ("diam", *diam)]
            }
            ModeShape::Sampled {
                diam_edges,
                num_concs,
            } => {
                let diam = NumberArray::from(diam_edges.clone()).to_value();
                let num_conc = NumberArray::from(num_concs.clone()).to_value();
                params.insert(
                    "size_dist".to_string(),
                    Value::Array(vec![
                        keyed("diam", self.literal("size_dist.diam", diam)),
                        keyed("num_conc", self.literal("size_dist.num_conc", num_conc)),
                    ]),
                );
                vec![]
            }
        };
        for (key, value) in scalars {
            params.insert(key.to_string(), self.number(key, value));
        }
        Value::Object(params)
    }

    /// The literal `key` was written as, or `value` if it was not parsed from a configuration
    fn literal(&self, key: &str, value: Value) -> Value {
        self.literals.get(key).cloned().unwrap_or(value)
    }

    fn number(&self, key: &str, value: f64) -> Value {
        self.literal(key, Value::from(value))
    }
}

fn parse_mass_frac(
    value: &Value,
    path: &str,
    literals: &mut Map<String, Value>,
) -> ScenarioResult<Vec<MassFraction>> {
    as_list(value, path)?
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let entry_path = format!("{path}[{i}]");
            let (species, values) = single_entry(entry, &entry_path)?;
            let values = NumberArray::parse(values, &format!("{entry_path}.{species}"))?;
            literals.insert(format!("mass_frac[{i}]"), values.to_value());
            match values.values() {
                [frac] => Ok(MassFraction {
                    species: species.to_string(),
                    frac: *frac,
                    std_dev: None,
                }),
                [frac, std_dev] => Ok(MassFraction {
                    species: species.to_string(),
                    frac: *frac,
                    std_dev: Some(*std_dev),
                }),
                _ => Err(ScenarioError::malformed(
                    &entry_path,
                    format!(
                        "expected [fraction] or [fraction, std_dev], got {} values",
                        values.len()
                    ),
                )),
            }
        })
        .collect()
}

fn diam_to_vol(diam: f64) -> f64 {
    PI / 6.0 * diam.powi(3)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{AeroData, AeroSpecies};
    use is_close::is_close;
    use serde_json::json;

    fn aero_data() -> AeroData {
        AeroData::new(vec![
            AeroSpecies::new("SO4", 1800.0, 0.096),
            AeroSpecies::new("BC", 1800.0, 0.012),
            AeroSpecies::new("H2O", 1000.0, 0.018),
        ])
    }

    fn log_normal() -> Value {
        json!({
            "mass_frac": [{"H2O": [1.0]}],
            "diam_type": "geometric",
            "mode_type": "log_normal",
            "num_conc": 1e6,
            "geom_mean_diam": 1e-6,
            "log10_geom_std_dev": 0.25
        })
    }

    fn assert_relative(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            ((actual - expected) / expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn parse_log_normal() {
        let mode = AeroMode::from_config("test_mode", &log_normal(), &aero_data(), "mode").unwrap();
        assert_eq!(mode.name(), "test_mode");
        assert_eq!(mode.mode_type(), "log_normal");
        assert_eq!(mode.num_conc(), 1e6);
        assert_eq!(mode.diam_type(), DiamType::Geometric);
        assert_eq!(mode.mass_frac().len(), 1);
        assert_eq!(mode.to_config(), log_normal());
    }

    #[test]
    fn parse_mobility_exp() {
        let value = json!({
            "mass_frac": [{"SO4": [2.0]}, {"BC": [1.0, 0.1]}],
            "diam_type": "mobility",
            "temp": 298.0,
            "pressure": 101325.0,
            "mode_type": "exp",
            "num_conc": 5e8,
            "diam_at_mean_vol": 2e-7
        });
        let mode = AeroMode::from_config("exp", &value, &aero_data(), "mode").unwrap();
        assert_eq!(
            mode.diam_type(),
            DiamType::Mobility {
                temp: 298.0,
                pressure: 101325.0
            }
        );
        assert_eq!(mode.mass_frac()[1].std_dev, Some(0.1));
        assert_eq!(mode.to_config(), value);
    }

    #[test]
    fn parse_sampled() {
        let value = json!({
            "mass_frac": [{"BC": [1.0]}],
            "diam_type": "geometric",
            "mode_type": "sampled",
            "size_dist": [{"diam": [1e-8, 1e-7, 1e-6]}, {"num_conc": [100.0, 50.0]}]
        });
        let mode = AeroMode::from_config("sampled", &value, &aero_data(), "mode").unwrap();
        assert_eq!(mode.num_conc(), 150.0);
        assert_eq!(mode.to_config(), value);
    }

    #[test]
    fn sampled_size_mismatch() {
        let value = json!({
            "mass_frac": [{"BC": [1.0]}],
            "diam_type": "geometric",
            "mode_type": "sampled",
            "size_dist": [{"diam": [1e-8, 1e-7]}, {"num_conc": [100.0, 50.0]}]
        });
        let err = AeroMode::from_config("sampled", &value, &aero_data(), "mode").unwrap_err();
        assert!(matches!(err, ScenarioError::MalformedConfig { .. }));
    }

    #[test]
    fn unknown_species() {
        let mut value = log_normal();
        value["mass_frac"] = json!([{"NaCl": [1.0]}]);
        let err = AeroMode::from_config("salt", &value, &aero_data(), "mode").unwrap_err();
        assert_eq!(
            err,
            ScenarioError::UnknownAerosolSpecies {
                mode: "salt".to_string(),
                species: "NaCl".to_string()
            }
        );
    }

    #[test]
    fn unknown_mode_type() {
        let mut value = log_normal();
        value["mode_type"] = json!("gamma");
        let err = AeroMode::from_config("m", &value, &aero_data(), "mode").unwrap_err();
        match err {
            ScenarioError::MalformedConfig { path, .. } => assert_eq!(path, "mode.mode_type"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_parameter() {
        let mut value = log_normal();
        value.as_object_mut().unwrap().remove("geom_mean_diam");
        let err = AeroMode::from_config("m", &value, &aero_data(), "mode").unwrap_err();
        assert!(matches!(err, ScenarioError::MalformedConfig { .. }));
    }

    #[test]
    fn zero_mass_fraction_sum() {
        let mut value = log_normal();
        value["mass_frac"] = json!([{"H2O": [0.0]}]);
        assert!(AeroMode::from_config("m", &value, &aero_data(), "mode").is_err());
    }

    #[test]
    fn volume_fractions() {
        let value = json!({
            "mass_frac": [{"SO4": [1.8]}, {"H2O": [1.0]}],
            "diam_type": "geometric",
            "mode_type": "mono",
            "num_conc": 1.0,
            "diam": 1e-7
        });
        let mode = AeroMode::from_config("m", &value, &aero_data(), "mode").unwrap();
        let vol_frac = mode.vol_frac(&aero_data()).unwrap();
        // 1.8 / 1800 and 1.0 / 1000 occupy equal volumes
        assert!(is_close!(vol_frac[0], 0.5));
        assert_eq!(vol_frac[1], 0.0);
        assert!(is_close!(vol_frac[2], 0.5));
    }

    #[test]
    fn vol_frac_std_from_mass_frac_entries() {
        let value = json!({
            "mass_frac": [{"SO4": [0.9, 0.09]}, {"BC": [0.9]}, {"H2O": [1.0, 0.5]}],
            "diam_type": "geometric",
            "mode_type": "mono",
            "num_conc": 1.0,
            "diam": 1e-7
        });
        let mode = AeroMode::from_config("m", &value, &aero_data(), "mode").unwrap();
        let vol_frac = mode.vol_frac(&aero_data()).unwrap();
        let vol_frac_std = mode.vol_frac_std(&aero_data()).unwrap();
        // Volumes 5e-4, 5e-4 and 1e-3 give a total of 2e-3
        assert!(is_close!(vol_frac[2], 0.5));
        assert!(is_close!(vol_frac_std[0], 0.025));
        assert_eq!(vol_frac_std[1], 0.0);
        assert!(is_close!(vol_frac_std[2], 0.25));
    }

    #[test]
    fn negative_std_dev_rejected() {
        let mut value = log_normal();
        value["mass_frac"] = json!([{"H2O": [1.0, -0.1]}]);
        let err = AeroMode::from_config("m", &value, &aero_data(), "mode").unwrap_err();
        assert!(matches!(err, ScenarioError::MalformedConfig { .. }));
    }

    #[test]
    fn non_positive_density_rejected() {
        let mode = AeroMode::from_config("m", &log_normal(), &aero_data(), "mode").unwrap();
        let weightless = AeroData::new(vec![AeroSpecies::new("H2O", 0.0, 0.018)]);
        for result in [mode.vol_frac(&weightless), mode.vol_frac_std(&weightless)] {
            match result.unwrap_err() {
                ScenarioError::MalformedConfig { path, reason } => {
                    assert_eq!(path, "m.mass_frac");
                    assert!(reason.contains("H2O"));
                }
                other => panic!("unexpected error {other:?}"),
            }
        }
    }

    #[test]
    fn integer_literals_roundtrip() {
        let value = json!({
            "mass_frac": [{"SO4": [1]}, {"BC": [1, 0]}],
            "diam_type": "mobility",
            "temp": 298,
            "pressure": 101325,
            "mode_type": "sampled",
            "size_dist": [{"diam": [1e-8, 1e-7]}, {"num_conc": [100]}]
        });
        let mode = AeroMode::from_config("m", &value, &aero_data(), "mode").unwrap();
        assert_eq!(mode.num_conc(), 100.0);
        assert_eq!(mode.mass_frac()[1].std_dev, Some(0.0));
        assert_eq!(mode.to_config(), value);
    }

    #[test]
    fn typed_mode_writes_floats() {
        let mode = AeroMode::new(
            "m",
            ModeShape::Mono {
                num_conc: 100.0,
                diam: 1e-7,
            },
            DiamType::Geometric,
            vec![MassFraction {
                species: "BC".to_string(),
                frac: 1.0,
                std_dev: None,
            }],
            &aero_data(),
        )
        .unwrap();
        assert_eq!(
            mode.to_config(),
            json!({
                "mass_frac": [{"BC": [1.0]}],
                "diam_type": "geometric",
                "mode_type": "mono",
                "num_conc": 100.0,
                "diam": 1e-7
            })
        );
    }

    #[test]
    fn vol_frac_against_smaller_registry() {
        let mode = AeroMode::from_config("m", &log_normal(), &aero_data(), "mode").unwrap();
        let other = AeroData::new(vec![AeroSpecies::new("SO4", 1800.0, 0.096)]);
        assert!(matches!(
            mode.vol_frac(&other),
            Err(ScenarioError::UnknownAerosolSpecies { .. })
        ));
    }

    #[test]
    fn log_normal_num_dist_conserves_number() {
        let mode = AeroMode::from_config("m", &log_normal(), &aero_data(), "mode").unwrap();
        let grid = BinGrid::new(300, 1e-9, 1e-3).unwrap();
        let dist = mode.num_dist(&grid);
        assert_relative(dist.sum(), 1e6, 1e-3);

        let max_bin = dist
            .iter()
            .enumerate()
            .fold(0, |best, (i, n)| if *n > dist[best] { i } else { best });
        let offset = (grid.centers()[max_bin] / 1e-6).ln().abs();
        assert!(offset <= grid.log_width());
    }

    #[test]
    fn exp_num_dist_conserves_number() {
        let mode = AeroMode::new(
            "exp",
            ModeShape::Exp {
                num_conc: 1e8,
                diam_at_mean_vol: 1e-6,
            },
            DiamType::Geometric,
            vec![MassFraction {
                species: "BC".to_string(),
                frac: 1.0,
                std_dev: None,
            }],
            &aero_data(),
        )
        .unwrap();
        let grid = BinGrid::new(1000, 1e-12, 1e-4).unwrap();
        assert_relative(mode.num_dist(&grid).sum(), 1e8, 1e-2);
    }

    #[test]
    fn mono_and_sampled_num_dist() {
        let grid = BinGrid::new(3, 1e-9, 1e-6).unwrap();
        let mass_frac = vec![MassFraction {
            species: "SO4".to_string(),
            frac: 1.0,
            std_dev: None,
        }];

        let mono = AeroMode::new(
            "mono",
            ModeShape::Mono {
                num_conc: 42.0,
                diam: 5e-8,
            },
            DiamType::Geometric,
            mass_frac.clone(),
            &aero_data(),
        )
        .unwrap();
        assert_eq!(mono.num_dist(&grid).to_vec(), vec![0.0, 42.0, 0.0]);

        let sampled = AeroMode::new(
            "sampled",
            ModeShape::Sampled {
                diam_edges: vec![1e-9, 1e-8, 1e-7, 1e-6],
                num_concs: vec![1.0, 2.0, 3.0],
            },
            DiamType::Geometric,
            mass_frac,
            &aero_data(),
        )
        .unwrap();
        assert_eq!(sampled.num_dist(&grid).to_vec(), vec![1.0, 2.0, 3.0]);
    }
}
