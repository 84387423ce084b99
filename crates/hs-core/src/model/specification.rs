//! The root of the model tree.

use hs_common::{Error, Result};
use hs_config::{BuilderConfig, ComponentIndexPolicy};
use hs_math::ProbabilityVectorValidator;
use tracing::{debug, info, warn};

use super::component::EmissionMode;
use super::distribution::{DistributionKind, ParamField};
use super::initial::InitialVectorBuilder;
use super::probability::VectorStatus;
use super::state::{State, StateRegistry};
use super::transition::TransitionMatrixBuilder;
use crate::logging::event_names;

/// Builder rules taken from the configuration at construction time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rules {
    pub max_states: usize,
    pub min_states_for_probabilities: usize,
    pub component_indices: ComponentIndexPolicy,
    pub enforce_uniform_bounds: bool,
    pub require_model_name: bool,
    pub validator: ProbabilityVectorValidator,
}

impl From<&BuilderConfig> for Rules {
    fn from(config: &BuilderConfig) -> Self {
        Rules {
            max_states: config.limits.max_states,
            min_states_for_probabilities: config.limits.min_states_for_probabilities,
            component_indices: config.component_indices,
            enforce_uniform_bounds: config.enforce_uniform_bounds,
            require_model_name: config.require_model_name,
            validator: ProbabilityVectorValidator::new(config.sum_check),
        }
    }
}

impl Default for Rules {
    fn default() -> Self {
        Rules::from(&BuilderConfig::default())
    }
}

/// An HMM specification under construction.
///
/// Owns the states, the initial vector and the transition matrix. Adding or
/// removing a state rebuilds both probability builders at the new size, so
/// values entered before a resize are gone afterwards. Below
/// `min_states_for_probabilities` states neither builder exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Specification {
    name: Option<String>,
    states: StateRegistry,
    initial: Option<InitialVectorBuilder>,
    transitions: Option<TransitionMatrixBuilder>,
    rules: Rules,
}

impl Default for Specification {
    fn default() -> Self {
        Specification::with_rules(Rules::default())
    }
}

impl Specification {
    pub fn new(config: &BuilderConfig) -> Self {
        Specification::with_rules(Rules::from(config))
    }

    pub fn with_rules(rules: Rules) -> Self {
        Specification {
            name: None,
            states: StateRegistry::new(rules.max_states, rules.component_indices),
            initial: None,
            transitions: None,
            rules,
        }
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the model name; a blank name clears it.
    pub fn set_name(&mut self, name: &str) {
        let name = name.trim();
        self.name = (!name.is_empty()).then(|| name.to_string());
    }

    pub fn states(&self) -> &StateRegistry {
        &self.states
    }

    pub fn state(&self, index: usize) -> Option<&State> {
        self.states.get(index)
    }

    pub fn initial(&self) -> Option<&InitialVectorBuilder> {
        self.initial.as_ref()
    }

    pub fn transitions(&self) -> Option<&TransitionMatrixBuilder> {
        self.transitions.as_ref()
    }

    pub fn add_state(&mut self) -> Result<&State> {
        let index = match self.states.add_state() {
            Ok(state) => state.index(),
            Err(err) => {
                warn!(
                    event = event_names::STATE_CAPACITY_EXCEEDED,
                    max_states = self.rules.max_states,
                    "state limit reached"
                );
                return Err(err);
            }
        };
        info!(event = event_names::STATE_ADDED, index, count = self.states.len(), "state added");
        self.rebuild_probabilities();
        self.states
            .get(index)
            .ok_or_else(|| Error::not_found(format!("state {}", index)))
    }

    pub fn remove_state(&mut self, index: usize) -> Result<State> {
        let removed = self.states.remove_state(index)?;
        info!(
            event = event_names::STATE_REMOVED,
            index,
            count = self.states.len(),
            "state removed"
        );
        self.rebuild_probabilities();
        Ok(removed)
    }

    pub fn rename_state(&mut self, index: usize, name: &str) -> Result<()> {
        self.states.rename(index, name)?;
        debug!(event = event_names::STATE_RENAMED, index, name = name.trim(), "state renamed");
        Ok(())
    }

    pub fn set_mode(&mut self, state: usize, mode: EmissionMode) -> Result<()> {
        self.states.require_mut(state)?.emission_mut().set_mode(mode);
        debug!(event = event_names::EMISSION_MODE_SET, state, mode = %mode, "emission mode set");
        Ok(())
    }

    pub fn add_component(&mut self, state: usize) -> Result<usize> {
        let index = self.states.require_mut(state)?.emission_mut().add_component()?;
        debug!(event = event_names::COMPONENT_ADDED, state, component = index, "component added");
        Ok(index)
    }

    pub fn remove_component(&mut self, state: usize, component: usize) -> Result<()> {
        let validator = self.rules.validator;
        self.states
            .require_mut(state)?
            .emission_mut()
            .remove_component(component, &validator)?;
        debug!(event = event_names::COMPONENT_REMOVED, state, component, "component removed");
        Ok(())
    }

    pub fn set_distribution(
        &mut self,
        state: usize,
        component: Option<usize>,
        kind: DistributionKind,
    ) -> Result<()> {
        self.states
            .require_mut(state)?
            .emission_mut()
            .set_distribution(component, kind)?;
        debug!(event = event_names::DISTRIBUTION_SET, state, ?component, kind = %kind, "distribution set");
        Ok(())
    }

    pub fn set_param(
        &mut self,
        state: usize,
        component: Option<usize>,
        field: ParamField,
        value: f64,
    ) -> Result<()> {
        self.states
            .require_mut(state)?
            .emission_mut()
            .set_param(component, field, value)
    }

    pub fn set_weight(
        &mut self,
        state: usize,
        component: usize,
        value: Option<f64>,
    ) -> Result<VectorStatus> {
        let validator = self.rules.validator;
        let status = self
            .states
            .require_mut(state)?
            .emission_mut()
            .set_weight(component, value, &validator)?;
        log_status(&format!("mixture weights of state {}", state), &status);
        Ok(status)
    }

    pub fn set_initial(&mut self, state: usize, value: Option<f64>) -> Result<VectorStatus> {
        let validator = self.rules.validator;
        let needed = self.rules.min_states_for_probabilities;
        let initial = self.initial.as_mut().ok_or_else(|| {
            Error::not_found(format!("initial vector (needs at least {} states)", needed))
        })?;
        let status = initial.set(state, value, &validator)?;
        log_status("initial vector", &status);
        Ok(status)
    }

    pub fn set_transition(
        &mut self,
        from: usize,
        to: usize,
        value: Option<f64>,
    ) -> Result<VectorStatus> {
        let validator = self.rules.validator;
        let needed = self.rules.min_states_for_probabilities;
        let transitions = self.transitions.as_mut().ok_or_else(|| {
            Error::not_found(format!("transition matrix (needs at least {} states)", needed))
        })?;
        let status = transitions.set(from, to, value, &validator)?;
        log_status(&format!("transition row {}", from), &status);
        Ok(status)
    }

    fn rebuild_probabilities(&mut self) {
        let count = self.states.len();
        if count >= self.rules.min_states_for_probabilities {
            self.initial = Some(InitialVectorBuilder::new(count));
            self.transitions = Some(TransitionMatrixBuilder::new(count));
            debug!(event = event_names::PROBABILITIES_REBUILT, count, "probability editors rebuilt");
        } else if self.initial.is_some() {
            self.initial = None;
            self.transitions = None;
            debug!(event = event_names::PROBABILITIES_TORN_DOWN, count, "probability editors removed");
        }
    }
}

fn log_status(scope: &str, status: &VectorStatus) {
    match status {
        VectorStatus::Accepted { value } => {
            debug!(event = event_names::VECTOR_ACCEPTED, scope, value = %value, "vector accepted")
        }
        VectorStatus::Rejected { sum } => {
            debug!(event = event_names::VECTOR_REJECTED, scope, sum, "vector rejected")
        }
        VectorStatus::Pending => {}
    }
}
