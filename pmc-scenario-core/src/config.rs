//! Helpers for walking the nested scenario configuration.
//!
//! Scenario inputs are lists of single-key mappings, e.g.
//! `[{"time": [0, 60]}, {"temp": [290, 291]}]`. These helpers turn that loose
//! shape into typed values and back, reporting the path of anything malformed.
//! Mappings must be built with `serde_json`'s `preserve_order` feature so that
//! key order survives parsing.

use crate::errors::{ScenarioError, ScenarioResult};
use crate::profile::{Interpolation, Profile};
use serde_json::{Map, Value};

pub fn as_list<'v>(value: &'v Value, path: &str) -> ScenarioResult<&'v [Value]> {
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| ScenarioError::malformed(path, format!("expected a list, got {value}")))
}

pub fn as_object<'v>(value: &'v Value, path: &str) -> ScenarioResult<&'v Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| ScenarioError::malformed(path, format!("expected a mapping, got {value}")))
}

pub fn as_f64(value: &Value, path: &str) -> ScenarioResult<f64> {
    value
        .as_f64()
        .ok_or_else(|| ScenarioError::malformed(path, format!("expected a number, got {value}")))
}

pub fn as_str<'v>(value: &'v Value, path: &str) -> ScenarioResult<&'v str> {
    value
        .as_str()
        .ok_or_else(|| ScenarioError::malformed(path, format!("expected a string, got {value}")))
}

/// Numbers read from the configuration, with the JSON literals they were written as
///
/// Queries use the `f64` values. Serialisation writes the literals back, so
/// `[0, 273]` stays `[0, 273]` rather than becoming `[0.0, 273.0]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumberArray {
    values: Vec<f64>,
    literals: Vec<Value>,
}

impl NumberArray {
    pub fn parse(value: &Value, path: &str) -> ScenarioResult<Self> {
        let literals = as_list(value, path)?;
        let values = literals
            .iter()
            .enumerate()
            .map(|(i, v)| as_f64(v, &format!("{path}[{i}]")))
            .collect::<ScenarioResult<Vec<_>>>()?;
        Ok(Self {
            values,
            literals: literals.to_vec(),
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.literals.clone())
    }
}

impl From<Vec<f64>> for NumberArray {
    fn from(values: Vec<f64>) -> Self {
        let literals = values.iter().copied().map(Value::from).collect();
        Self { values, literals }
    }
}

/// Look up a required key of a mapping
pub fn required<'v>(map: &'v Map<String, Value>, key: &str, path: &str) -> ScenarioResult<&'v Value> {
    map.get(key)
        .ok_or_else(|| ScenarioError::malformed(path, format!("missing required key '{key}'")))
}

/// Unpack a mapping that must contain exactly one key
pub fn single_entry<'v>(value: &'v Value, path: &str) -> ScenarioResult<(&'v str, &'v Value)> {
    let map = as_object(value, path)?;
    let mut iter = map.iter();
    match (iter.next(), iter.next()) {
        (Some((key, value)), None) => Ok((key.as_str(), value)),
        _ => Err(ScenarioError::malformed(
            path,
            format!("expected a single-key mapping, got {} keys", map.len()),
        )),
    }
}

/// Fetch the component expected at `position` of a block
///
/// Fails with [`ScenarioError::MissingSeriesComponent`] if the block is too
/// short or the entry at `position` is keyed by something else.
pub fn component<'v>(
    entries: &'v [Value],
    position: usize,
    key: &str,
    block: &str,
) -> ScenarioResult<&'v Value> {
    let entry = entries
        .get(position)
        .ok_or_else(|| ScenarioError::missing(block, key))?;
    let (found, value) = single_entry(entry, &format!("{block}[{position}]"))?;
    if found != key {
        return Err(ScenarioError::missing(block, key));
    }
    Ok(value)
}

/// Parse a `[{"time": [...]}, {field: [...]}]` pair into a profile
pub fn parse_profile(
    value: &Value,
    field: &str,
    block: &str,
    interpolation: Interpolation,
) -> ScenarioResult<Profile> {
    let entries = as_list(value, block)?;
    let times = NumberArray::parse(
        component(entries, 0, "time", block)?,
        &format!("{block}.time"),
    )?;
    let values = NumberArray::parse(
        component(entries, 1, field, block)?,
        &format!("{block}.{field}"),
    )?;
    if entries.len() > 2 {
        return Err(ScenarioError::malformed(
            block,
            format!("expected 2 entries, got {}", entries.len()),
        ));
    }

    Profile::from_arrays(times, values, interpolation).map_err(|e| e.at(block))
}

/// Inverse of [`parse_profile`]
pub fn profile_to_config(profile: &Profile, field: &str) -> Value {
    Value::Array(vec![
        keyed("time", profile.time_array().to_value()),
        keyed(field, profile.value_array().to_value()),
    ])
}

/// A single-key mapping `{key: value}`
pub fn keyed(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
