//! Flattening a specification into the wire format.
//!
//! The wire map is a flat string → string mapping whose keys encode the path
//! through the tree:
//!
//! ```text
//! hmm-name                                  model name (optional)
//! State[n][st_name]                         state name
//! State[n][com_type]                        SingleComponent | MixtureComponent
//! State[n][distribution]                    Normal | Uniform        (single)
//! State[n][single_com_m1]                   parameter               (single)
//! State[n]components[c][distribution]       Normal | Uniform        (mixture)
//! State[n]components[c][single_com_l1]      parameter               (mixture)
//! State[n]weights[c][M_com_weight]          component weight        (mixture)
//! State_M[n][tpm]                           accepted transition row n
//! IPV-Value                                 accepted initial vector
//! ```

use hs_common::{Error, Result};
use hs_math::format_entry;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use crate::logging::event_names;
use crate::model::{ComponentBuilder, DistributionSpec, EmissionMode, Specification, State};

/// Flat wire mapping, ordered by key.
pub type WireMap = BTreeMap<String, String>;

/// Wire key construction.
pub mod keys {
    pub const HMM_NAME: &str = "hmm-name";
    pub const INITIAL_VECTOR: &str = "IPV-Value";
    pub const STATE_NAME: &str = "st_name";
    pub const COM_TYPE: &str = "com_type";
    pub const DISTRIBUTION: &str = "distribution";
    pub const WEIGHT: &str = "M_com_weight";

    /// `State[n][field]`
    pub fn state(n: usize, field: &str) -> String {
        format!("State[{}][{}]", n, field)
    }

    /// `State[n]components[c][field]`
    pub fn component(n: usize, c: usize, field: &str) -> String {
        format!("State[{}]components[{}][{}]", n, c, field)
    }

    /// `State[n]weights[c][M_com_weight]`
    pub fn weight(n: usize, c: usize) -> String {
        format!("State[{}]weights[{}][{}]", n, c, WEIGHT)
    }

    /// `State_M[n][tpm]`
    pub fn transition_row(n: usize) -> String {
        format!("State_M[{}][tpm]", n)
    }
}

/// Produces wire maps, collecting every problem that blocks completion.
#[derive(Debug, Clone, Copy)]
pub struct SpecSerializer {
    enforce_uniform_bounds: bool,
    require_model_name: bool,
}

impl Default for SpecSerializer {
    fn default() -> Self {
        SpecSerializer {
            enforce_uniform_bounds: true,
            require_model_name: false,
        }
    }
}

impl SpecSerializer {
    pub fn new(enforce_uniform_bounds: bool) -> Self {
        SpecSerializer {
            enforce_uniform_bounds,
            ..SpecSerializer::default()
        }
    }

    /// Report a missing `hmm-name` as a problem.
    pub fn with_required_model_name(mut self, required: bool) -> Self {
        self.require_model_name = required;
        self
    }

    /// Serializer configured from the specification's own rules.
    pub fn for_spec(spec: &Specification) -> Self {
        let rules = spec.rules();
        SpecSerializer::new(rules.enforce_uniform_bounds)
            .with_required_model_name(rules.require_model_name)
    }

    /// Everything that keeps `spec` from serializing; empty when complete.
    pub fn problems(&self, spec: &Specification) -> Vec<String> {
        let mut problems = Vec::new();
        let mut out = WireMap::new();
        self.write(spec, &mut out, &mut problems);
        problems
    }

    /// Flatten `spec`, or fail with every problem found.
    pub fn serialize(&self, spec: &Specification) -> Result<WireMap> {
        let mut problems = Vec::new();
        let mut out = WireMap::new();
        self.write(spec, &mut out, &mut problems);

        if problems.is_empty() {
            debug!(event = event_names::SERIALIZE_FINISHED, keys = out.len(), "specification serialized");
            Ok(out)
        } else {
            warn!(
                event = event_names::SERIALIZE_INCOMPLETE,
                problems = problems.len(),
                "specification incomplete"
            );
            Err(Error::IncompleteSpecification { problems })
        }
    }

    fn write(&self, spec: &Specification, out: &mut WireMap, problems: &mut Vec<String>) {
        match spec.name() {
            Some(name) => {
                out.insert(keys::HMM_NAME.to_string(), name.to_string());
            }
            None if self.require_model_name => problems.push("model name missing".to_string()),
            None => {}
        }

        if spec.states().is_empty() {
            problems.push("no states defined".to_string());
            return;
        }

        let mut seen = HashSet::new();
        for state in spec.states().iter() {
            let label = state.label();
            if !seen.insert(label.clone()) {
                problems.push(format!("duplicate state name '{}'", label));
            }
            out.insert(keys::state(state.index(), keys::STATE_NAME), label);
            self.write_emission(state, out, problems);
        }

        if let Some(initial) = spec.initial() {
            match initial.accepted() {
                Some(value) => {
                    out.insert(keys::INITIAL_VECTOR.to_string(), value.to_string());
                }
                None => problems.push(format!("initial vector is {}", initial.status())),
            }
        }

        if let Some(transitions) = spec.transitions() {
            for (i, row) in transitions.rows().iter().enumerate() {
                match row.accepted() {
                    Some(value) => {
                        out.insert(keys::transition_row(i + 1), value.to_string());
                    }
                    None => problems.push(format!("transition row {} is {}", i + 1, row.status())),
                }
            }
        }
    }

    fn write_emission(&self, state: &State, out: &mut WireMap, problems: &mut Vec<String>) {
        let n = state.index();
        let emission: &ComponentBuilder = state.emission();

        let Some(com_type) = emission.mode().wire_name() else {
            problems.push(format!("state {}: no emission mode chosen", n));
            return;
        };
        out.insert(keys::state(n, keys::COM_TYPE), com_type.to_string());

        match emission.mode() {
            EmissionMode::Single => {
                let scope = format!("state {}", n);
                match emission.components().first().and_then(|c| c.distribution()) {
                    Some(dist) => {
                        out.insert(
                            keys::state(n, keys::DISTRIBUTION),
                            dist.kind().wire_name().to_string(),
                        );
                        for (field, value) in dist.entries() {
                            if let Some(value) = value {
                                out.insert(keys::state(n, field.wire_key()), format_entry(Some(value)));
                            }
                        }
                        self.check_distribution(&scope, dist, problems);
                    }
                    None => problems.push(format!("{}: no distribution chosen", scope)),
                }
            }
            EmissionMode::Mixture => {
                if emission.components().is_empty() {
                    problems.push(format!("state {}: mixture has no components", n));
                    return;
                }
                for component in emission.components() {
                    let c = component.index();
                    let scope = format!("state {} component {}", n, c);
                    match component.distribution() {
                        Some(dist) => {
                            out.insert(
                                keys::component(n, c, keys::DISTRIBUTION),
                                dist.kind().wire_name().to_string(),
                            );
                            for (field, value) in dist.entries() {
                                if let Some(value) = value {
                                    out.insert(
                                        keys::component(n, c, field.wire_key()),
                                        format_entry(Some(value)),
                                    );
                                }
                            }
                            self.check_distribution(&scope, dist, problems);
                        }
                        None => problems.push(format!("{}: no distribution chosen", scope)),
                    }
                }
                let weights = emission.weights();
                if weights.accepted().is_some() {
                    for (component, weight) in emission.components().iter().zip(weights.slots()) {
                        out.insert(keys::weight(n, component.index()), format_entry(*weight));
                    }
                } else {
                    problems.push(format!("state {}: mixture weights are {}", n, weights.status()));
                }
            }
            EmissionMode::Unset => {}
        }
    }

    fn check_distribution(&self, scope: &str, dist: &DistributionSpec, problems: &mut Vec<String>) {
        let missing = dist.missing_fields();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|f| f.as_str()).collect();
            problems.push(format!("{}: missing {}", scope, names.join(", ")));
        }
        if self.enforce_uniform_bounds {
            for axis in dist.bound_violations() {
                problems.push(format!("{}: {} lower bound exceeds upper bound", scope, axis));
            }
        }
    }
}

/// Serialize with the specification's own rules.
pub fn serialize(spec: &Specification) -> Result<WireMap> {
    SpecSerializer::for_spec(spec).serialize(spec)
}
