//! Decoding a wire map into the structured form consumed by model builders.
//!
//! The decoded [`HmmForm`] mirrors what a training backend needs: states in
//! index order with their emission parameters grouped per covariate
//! (`means = [wga, no_wga]`, etc.), the initial probability of each state by
//! name, and every transition probability by `(from, to)` name pair.

use hs_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, warn};

use crate::logging::event_names;
use crate::model::{DistributionKind, ParamField};
use crate::serialize::{keys, WireMap};

/// `com_type` of a decoded state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComType {
    SingleComponent,
    MixtureComponent,
}

/// Parameters of one distribution, indexed `[wga, no_wga]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FormParameters {
    Normal { means: [f64; 2], vars: [f64; 2] },
    Uniform { upper: [f64; 2], lower: [f64; 2] },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormComponent {
    pub distribution: DistributionKind,
    pub parameters: FormParameters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormState {
    pub name: String,
    pub com_type: ComType,
    /// Single-component states only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DistributionKind>,
    /// Single-component states only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<FormParameters>,
    /// Mixture states only, in ascending component index order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<FormComponent>,
    /// Mixture states only, aligned with `components`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialProbability {
    pub state: String,
    pub p: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionProbability {
    pub from: String,
    pub to: String,
    pub p: f64,
}

/// Structured view of a wire map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HmmForm {
    #[serde(default)]
    pub hmm_name: Option<String>,
    pub states: Vec<FormState>,
    #[serde(default)]
    pub init_p_vector: Vec<InitialProbability>,
    #[serde(default)]
    pub transition_probabilities: Vec<TransitionProbability>,
}

impl HmmForm {
    pub fn state(&self, name: &str) -> Option<&FormState> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn initial_probability(&self, state: &str) -> Option<f64> {
        self.init_p_vector
            .iter()
            .find(|ip| ip.state == state)
            .map(|ip| ip.p)
    }

    pub fn transition(&self, from: &str, to: &str) -> Option<f64> {
        self.transition_probabilities
            .iter()
            .find(|t| t.from == from && t.to == to)
            .map(|t| t.p)
    }
}

/// Where a wire key points.
#[derive(Debug, Clone, PartialEq, Eq)]
enum WireKey {
    HmmName,
    InitialVector,
    TransitionRow(usize),
    State(usize, String),
    Component(usize, usize, String),
    Weight(usize, usize),
}

fn parse_key(key: &str) -> Option<WireKey> {
    if key == keys::HMM_NAME {
        return Some(WireKey::HmmName);
    }
    if key == keys::INITIAL_VECTOR {
        return Some(WireKey::InitialVector);
    }
    if let Some(rest) = key.strip_prefix("State_M[") {
        let (row, rest) = take_index(rest)?;
        return (rest == "[tpm]").then_some(WireKey::TransitionRow(row));
    }

    let rest = key.strip_prefix("State[")?;
    let (state, rest) = take_index(rest)?;
    if let Some(rest) = rest.strip_prefix("components[") {
        let (component, rest) = take_index(rest)?;
        let field = take_field(rest)?;
        return Some(WireKey::Component(state, component, field.to_string()));
    }
    if let Some(rest) = rest.strip_prefix("weights[") {
        let (component, rest) = take_index(rest)?;
        let field = take_field(rest)?;
        return (field == keys::WEIGHT).then_some(WireKey::Weight(state, component));
    }
    let field = take_field(rest)?;
    Some(WireKey::State(state, field.to_string()))
}

/// `"12]rest"` → `(12, "rest")`
fn take_index(s: &str) -> Option<(usize, &str)> {
    let end = s.find(']')?;
    let digits = &s[..end];
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits.parse().ok()?, &s[end + 1..]))
}

/// `"[field]"` → `"field"`
fn take_field(s: &str) -> Option<&str> {
    let field = s.strip_prefix('[')?.strip_suffix(']')?;
    (!field.is_empty() && !field.contains(['[', ']'])).then_some(field)
}

#[derive(Debug, Default)]
struct RawState<'a> {
    fields: HashMap<String, &'a str>,
    components: BTreeMap<usize, HashMap<String, &'a str>>,
    weights: BTreeMap<usize, &'a str>,
}

/// Decode a wire map. Unknown or malformed keys are errors.
pub fn decode(wire: &WireMap) -> Result<HmmForm> {
    match decode_inner(wire) {
        Ok(form) => {
            debug!(event = event_names::DECODE_FINISHED, states = form.states.len(), "wire map decoded");
            Ok(form)
        }
        Err(err) => {
            warn!(event = event_names::DECODE_FAILED, error = %err, "wire map rejected");
            Err(err)
        }
    }
}

fn decode_inner(wire: &WireMap) -> Result<HmmForm> {
    let mut hmm_name = None;
    let mut initial = None;
    let mut rows: BTreeMap<usize, &str> = BTreeMap::new();
    let mut raw: BTreeMap<usize, RawState> = BTreeMap::new();

    for (key, value) in wire {
        let parsed =
            parse_key(key).ok_or_else(|| Error::Decode(format!("unrecognised key '{}'", key)))?;
        match parsed {
            WireKey::HmmName => hmm_name = Some(value.trim().to_string()).filter(|n| !n.is_empty()),
            WireKey::InitialVector => initial = Some(value.as_str()),
            WireKey::TransitionRow(row) => {
                rows.insert(row, value);
            }
            WireKey::State(n, field) => {
                raw.entry(n).or_default().fields.insert(field, value);
            }
            WireKey::Component(n, c, field) => {
                raw.entry(n)
                    .or_default()
                    .components
                    .entry(c)
                    .or_default()
                    .insert(field, value);
            }
            WireKey::Weight(n, c) => {
                raw.entry(n).or_default().weights.insert(c, value);
            }
        }
    }

    if raw.is_empty() {
        return Err(Error::Decode("no states in wire map".to_string()));
    }
    for (expected, n) in (1..).zip(raw.keys()) {
        if *n != expected {
            return Err(Error::Decode(format!(
                "state indices must be contiguous from 1, missing State[{}]",
                expected
            )));
        }
    }

    let mut names = HashSet::new();
    let mut states = Vec::with_capacity(raw.len());
    for (n, state) in &raw {
        let form_state = decode_state(*n, state)?;
        if !names.insert(form_state.name.clone()) {
            return Err(Error::Decode(format!(
                "state name '{}' is used more than once",
                form_state.name
            )));
        }
        states.push(form_state);
    }

    let count = states.len();
    let init_p_vector = match initial {
        Some(text) => {
            let values = parse_vector(keys::INITIAL_VECTOR, text, count)?;
            states
                .iter()
                .zip(values)
                .map(|(s, p)| InitialProbability {
                    state: s.name.clone(),
                    p,
                })
                .collect()
        }
        None if count >= 2 => {
            return Err(Error::Decode(format!("missing {}", keys::INITIAL_VECTOR)));
        }
        None => Vec::new(),
    };

    if let Some(row) = rows.keys().find(|row| **row == 0 || **row > count) {
        return Err(Error::Decode(format!(
            "{} does not match any of the {} states",
            keys::transition_row(*row),
            count
        )));
    }
    let mut transition_probabilities = Vec::new();
    if count >= 2 || !rows.is_empty() {
        for (i, from) in states.iter().enumerate() {
            let key = keys::transition_row(i + 1);
            let text = rows
                .get(&(i + 1))
                .ok_or_else(|| Error::Decode(format!("missing {}", key)))?;
            let values = parse_vector(&key, text, count)?;
            for (to, p) in states.iter().zip(values) {
                transition_probabilities.push(TransitionProbability {
                    from: from.name.clone(),
                    to: to.name.clone(),
                    p,
                });
            }
        }
    }

    Ok(HmmForm {
        hmm_name,
        states,
        init_p_vector,
        transition_probabilities,
    })
}

fn decode_state(n: usize, raw: &RawState) -> Result<FormState> {
    let name = raw
        .fields
        .get(keys::STATE_NAME)
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::Decode(format!("State {} has no name", n)))?
        .to_string();

    let com_type = match required(&raw.fields, &keys::state(n, keys::COM_TYPE), keys::COM_TYPE)? {
        "SingleComponent" => ComType::SingleComponent,
        "MixtureComponent" => ComType::MixtureComponent,
        other => {
            return Err(Error::Decode(format!(
                "State {} has unknown com_type '{}'",
                n, other
            )))
        }
    };

    match com_type {
        ComType::SingleComponent => {
            if !raw.components.is_empty() || !raw.weights.is_empty() {
                return Err(Error::Decode(format!(
                    "State {} is SingleComponent but carries mixture keys",
                    n
                )));
            }
            let component = decode_component(&raw.fields, |field| keys::state(n, field))?;
            Ok(FormState {
                name,
                com_type,
                distribution: Some(component.distribution),
                parameters: Some(component.parameters),
                components: Vec::new(),
                weights: Vec::new(),
            })
        }
        ComType::MixtureComponent => {
            if raw.components.is_empty() {
                return Err(Error::Decode(format!("State {} mixture has no components", n)));
            }
            if let Some(c) = raw.weights.keys().find(|c| !raw.components.contains_key(c)) {
                return Err(Error::Decode(format!(
                    "{} has no matching component",
                    keys::weight(n, *c)
                )));
            }
            let mut components = Vec::with_capacity(raw.components.len());
            let mut weights = Vec::with_capacity(raw.components.len());
            for (c, fields) in &raw.components {
                components.push(decode_component(fields, |field| keys::component(n, *c, field))?);
                let key = keys::weight(n, *c);
                let text = raw
                    .weights
                    .get(c)
                    .ok_or_else(|| Error::Decode(format!("missing {}", key)))?;
                weights.push(parse_number(&key, text)?);
            }
            Ok(FormState {
                name,
                com_type,
                distribution: None,
                parameters: None,
                components,
                weights,
            })
        }
    }
}

fn decode_component(
    fields: &HashMap<String, &str>,
    key_of: impl Fn(&str) -> String,
) -> Result<FormComponent> {
    let kind_key = key_of(keys::DISTRIBUTION);
    let kind_text = required(fields, &kind_key, keys::DISTRIBUTION)?;
    let distribution = match kind_text {
        "Normal" => DistributionKind::Normal,
        "Uniform" => DistributionKind::Uniform,
        other => {
            return Err(Error::Decode(format!(
                "{}: unknown distribution '{}'",
                kind_key, other
            )))
        }
    };

    for field in fields.keys() {
        let known = field == keys::DISTRIBUTION
            || field == keys::STATE_NAME
            || field == keys::COM_TYPE
            || distribution
                .fields()
                .iter()
                .any(|f| f.wire_key() == field.as_str());
        if !known {
            return Err(Error::Decode(format!(
                "{} does not belong to a {} distribution",
                key_of(field),
                distribution
            )));
        }
    }

    let value = |field: ParamField| -> Result<f64> {
        let key = key_of(field.wire_key());
        parse_number(&key, required(fields, &key, field.wire_key())?)
    };
    let parameters = match distribution {
        DistributionKind::Normal => FormParameters::Normal {
            means: [value(ParamField::WgaMean)?, value(ParamField::NoWgaMean)?],
            vars: [value(ParamField::WgaVariance)?, value(ParamField::NoWgaVariance)?],
        },
        DistributionKind::Uniform => FormParameters::Uniform {
            upper: [value(ParamField::WgaUpper)?, value(ParamField::NoWgaUpper)?],
            lower: [value(ParamField::WgaLower)?, value(ParamField::NoWgaLower)?],
        },
    };
    Ok(FormComponent {
        distribution,
        parameters,
    })
}

fn required<'a>(fields: &HashMap<String, &'a str>, key: &str, field: &str) -> Result<&'a str> {
    fields
        .get(field)
        .copied()
        .ok_or_else(|| Error::Decode(format!("missing {}", key)))
}

fn parse_number(key: &str, text: &str) -> Result<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::Decode(format!("{}: '{}' is not a number", key, text)))
}

fn parse_vector(key: &str, text: &str, expected: usize) -> Result<Vec<f64>> {
    let values = text
        .split(',')
        .map(|part| parse_number(key, part))
        .collect::<Result<Vec<_>>>()?;
    if values.len() != expected {
        return Err(Error::Decode(format!(
            "{} has {} entries for {} states",
            key,
            values.len(),
            expected
        )));
    }
    Ok(values)
}
