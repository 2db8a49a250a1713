use crate::aero_mode::AeroMode;
use crate::errors::{ScenarioError, ScenarioResult};
use std::collections::HashMap;

/// An ordered collection of uniquely named aerosol modes
///
/// Modes are enumerated in the order they were declared. Lookup by name is
/// a hash lookup into that order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedModeSet {
    modes: Vec<AeroMode>,
    index: HashMap<String, usize>,
}

impl NamedModeSet {
    /// Fails with [`ScenarioError::DuplicateModeName`] if two modes share a name
    pub fn new(modes: Vec<AeroMode>) -> ScenarioResult<Self> {
        let mut index = HashMap::with_capacity(modes.len());
        for (i, mode) in modes.iter().enumerate() {
            if index.insert(mode.name().to_string(), i).is_some() {
                return Err(ScenarioError::DuplicateModeName(mode.name().to_string()));
            }
        }
        Ok(Self { modes, index })
    }

    pub fn mode_count(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    pub fn mode_by_index(&self, i: usize) -> ScenarioResult<&AeroMode> {
        self.modes.get(i).ok_or(ScenarioError::IndexOutOfRange {
            what: "mode set",
            index: i,
            len: self.modes.len(),
        })
    }

    pub fn mode_by_name(&self, name: &str) -> ScenarioResult<&AeroMode> {
        self.index
            .get(name)
            .map(|i| &self.modes[*i])
            .ok_or_else(|| ScenarioError::UnknownMode(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AeroMode> {
        self.modes.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.modes.iter().map(AeroMode::name)
    }
}

impl<'a> IntoIterator for &'a NamedModeSet {
    type Item = &'a AeroMode;
    type IntoIter = std::slice::Iter<'a, AeroMode>;

    fn into_iter(self) -> Self::IntoIter {
        self.modes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aero_mode::{DiamType, MassFraction, ModeShape};
    use crate::registry::{AeroData, AeroSpecies};

    fn mode(name: &str, num_conc: f64) -> AeroMode {
        let aero_data = AeroData::new(vec![AeroSpecies::new("H2O", 1000.0, 0.018)]);
        AeroMode::new(
            name,
            ModeShape::LogNormal {
                num_conc,
                geom_mean_diam: 1e-6,
                log10_geom_std_dev: 0.5,
            },
            DiamType::Geometric,
            vec![MassFraction {
                species: "H2O".to_string(),
                frac: 1.0,
                std_dev: None,
            }],
            &aero_data,
        )
        .unwrap()
    }

    #[test]
    fn declaration_order_is_enumeration_order() {
        let forward = NamedModeSet::new(vec![mode("A", 1.0), mode("B", 2.0)]).unwrap();
        assert_eq!(forward.mode_by_index(0).unwrap().name(), "A");
        assert_eq!(forward.mode_by_index(1).unwrap().name(), "B");

        let reverse = NamedModeSet::new(vec![mode("B", 2.0), mode("A", 1.0)]).unwrap();
        assert_eq!(reverse.names().collect::<Vec<_>>(), vec!["B", "A"]);
    }

    #[test]
    fn lookup_by_name() {
        let set = NamedModeSet::new(vec![mode("B", 2.0), mode("A", 1.0)]).unwrap();
        assert_eq!(set.mode_by_name("A").unwrap().num_conc(), 1.0);
        assert_eq!(set.mode_by_name("B").unwrap().num_conc(), 2.0);
        assert_eq!(
            set.mode_by_name("C").unwrap_err(),
            ScenarioError::UnknownMode("C".to_string())
        );
    }

    #[test]
    fn index_out_of_range() {
        let set = NamedModeSet::new(vec![mode("A", 1.0)]).unwrap();
        assert_eq!(set.mode_count(), 1);
        assert_eq!(
            set.mode_by_index(1).unwrap_err(),
            ScenarioError::IndexOutOfRange {
                what: "mode set",
                index: 1,
                len: 1
            }
        );
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = NamedModeSet::new(vec![mode("A", 1.0), mode("B", 1.0), mode("A", 3.0)])
            .unwrap_err();
        assert_eq!(err, ScenarioError::DuplicateModeName("A".to_string()));
    }

    #[test]
    fn empty_set() {
        let set = NamedModeSet::new(vec![]).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
