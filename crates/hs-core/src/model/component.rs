//! Per-state emission definitions.

use hs_common::{Error, Result};
use hs_config::ComponentIndexPolicy;
use hs_math::ProbabilityVectorValidator;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::distribution::{DistributionKind, DistributionSpec, ParamField};
use super::probability::{ProbabilityVector, VectorStatus};

/// Whether a state emits from one distribution or a weighted mixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmissionMode {
    /// Neither mode chosen yet.
    #[default]
    Unset,
    Single,
    Mixture,
}

impl EmissionMode {
    /// `com_type` value in the wire format.
    pub fn wire_name(&self) -> Option<&'static str> {
        match self {
            EmissionMode::Unset => None,
            EmissionMode::Single => Some("SingleComponent"),
            EmissionMode::Mixture => Some("MixtureComponent"),
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "singlecomponent" => Some(EmissionMode::Single),
            "mixture" | "mixturecomponent" => Some(EmissionMode::Mixture),
            _ => None,
        }
    }
}

impl fmt::Display for EmissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EmissionMode::Unset => write!(f, "unset"),
            EmissionMode::Single => write!(f, "single"),
            EmissionMode::Mixture => write!(f, "mixture"),
        }
    }
}

/// One distribution slot of a state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Component {
    index: usize,
    distribution: Option<DistributionSpec>,
}

impl Component {
    fn new(index: usize) -> Self {
        Component {
            index,
            distribution: None,
        }
    }

    /// 0-based index within the owning state.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn distribution(&self) -> Option<&DistributionSpec> {
        self.distribution.as_ref()
    }

    /// Choose the kind; any entered parameters are discarded.
    pub fn set_distribution(&mut self, kind: DistributionKind) {
        self.distribution = Some(DistributionSpec::empty(kind));
    }

    pub fn set_param(&mut self, field: ParamField, value: f64) -> Result<()> {
        let index = self.index;
        self.distribution
            .as_mut()
            .ok_or_else(|| {
                Error::InvalidCommand(format!(
                    "component {} has no distribution kind yet",
                    index
                ))
            })?
            .set_param(field, value)
    }
}

/// Emission definition of one state.
///
/// Single mode holds exactly one component and no weights. Mixture mode holds
/// any number of components, each paired with a weight slot at the same
/// position.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentBuilder {
    mode: EmissionMode,
    components: Vec<Component>,
    weights: ProbabilityVector,
    next_index: usize,
    policy: ComponentIndexPolicy,
}

impl ComponentBuilder {
    pub fn new(policy: ComponentIndexPolicy) -> Self {
        ComponentBuilder {
            mode: EmissionMode::Unset,
            components: Vec::new(),
            weights: ProbabilityVector::new(0),
            next_index: 0,
            policy,
        }
    }

    pub fn mode(&self) -> EmissionMode {
        self.mode
    }

    /// Switch mode. Every component and weight is discarded, even when the
    /// mode does not change.
    pub fn set_mode(&mut self, mode: EmissionMode) {
        self.mode = mode;
        self.weights = ProbabilityVector::new(0);
        self.components.clear();
        self.next_index = 0;
        if mode == EmissionMode::Single {
            self.components.push(Component::new(0));
            self.next_index = 1;
        }
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Component by its index (not its position).
    pub fn component(&self, index: usize) -> Option<&Component> {
        self.components.iter().find(|c| c.index == index)
    }

    pub fn weights(&self) -> &ProbabilityVector {
        &self.weights
    }

    /// Weight entered for component `index`.
    pub fn weight_of(&self, index: usize) -> Option<f64> {
        self.position(index)
            .and_then(|pos| self.weights.slots().get(pos).copied().flatten())
    }

    /// Append a mixture component with a matching weight slot; returns its index.
    pub fn add_component(&mut self) -> Result<usize> {
        self.require_mixture("add a component")?;
        let index = match self.policy {
            ComponentIndexPolicy::Monotonic => self.next_index,
            ComponentIndexPolicy::Renumber => self.components.len(),
        };
        self.components.push(Component::new(index));
        self.weights.push();
        self.next_index += 1;
        Ok(index)
    }

    /// Remove a mixture component and its weight slot.
    pub fn remove_component(
        &mut self,
        index: usize,
        validator: &ProbabilityVectorValidator,
    ) -> Result<Component> {
        self.require_mixture("remove a component")?;
        let pos = self
            .position(index)
            .ok_or_else(|| Error::not_found(format!("component {}", index)))?;
        let removed = self.components.remove(pos);
        self.weights.remove(pos, validator)?;
        if self.policy == ComponentIndexPolicy::Renumber {
            for (i, component) in self.components.iter_mut().enumerate() {
                component.index = i;
            }
        }
        Ok(removed)
    }

    pub fn set_distribution(&mut self, component: Option<usize>, kind: DistributionKind) -> Result<()> {
        self.component_mut(component)?.set_distribution(kind);
        Ok(())
    }

    pub fn set_param(&mut self, component: Option<usize>, field: ParamField, value: f64) -> Result<()> {
        self.component_mut(component)?.set_param(field, value)
    }

    /// Set the mixture weight of component `index` and re-validate the weights.
    pub fn set_weight(
        &mut self,
        index: usize,
        value: Option<f64>,
        validator: &ProbabilityVectorValidator,
    ) -> Result<VectorStatus> {
        self.require_mixture("set a weight")?;
        let pos = self
            .position(index)
            .ok_or_else(|| Error::not_found(format!("component {}", index)))?;
        self.weights.set(pos, value, validator).cloned()
    }

    fn position(&self, index: usize) -> Option<usize> {
        self.components.iter().position(|c| c.index == index)
    }

    fn require_mixture(&self, action: &str) -> Result<()> {
        if self.mode == EmissionMode::Mixture {
            Ok(())
        } else {
            Err(Error::InvalidCommand(format!(
                "cannot {} in {} mode",
                action, self.mode
            )))
        }
    }

    fn component_mut(&mut self, component: Option<usize>) -> Result<&mut Component> {
        match (self.mode, component) {
            (EmissionMode::Unset, _) => Err(Error::InvalidCommand(
                "choose single or mixture mode first".to_string(),
            )),
            (EmissionMode::Single, None | Some(0)) => self
                .components
                .first_mut()
                .ok_or_else(|| Error::not_found("component 0")),
            (EmissionMode::Single, Some(index)) => Err(Error::InvalidCommand(format!(
                "single mode has no component {}",
                index
            ))),
            (EmissionMode::Mixture, None) => Err(Error::InvalidCommand(
                "mixture components must be addressed by index".to_string(),
            )),
            (EmissionMode::Mixture, Some(index)) => self
                .components
                .iter_mut()
                .find(|c| c.index == index)
                .ok_or_else(|| Error::not_found(format!("component {}", index))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ProbabilityVectorValidator {
        ProbabilityVectorValidator::default()
    }

    fn mixture(policy: ComponentIndexPolicy, n: usize) -> ComponentBuilder {
        let mut builder = ComponentBuilder::new(policy);
        builder.set_mode(EmissionMode::Mixture);
        for _ in 0..n {
            builder.add_component().unwrap();
        }
        builder
    }

    #[test]
    fn test_new_builder_is_unset() {
        let mut builder = ComponentBuilder::new(ComponentIndexPolicy::Monotonic);
        assert_eq!(builder.mode(), EmissionMode::Unset);
        assert!(builder.components().is_empty());
        assert!(matches!(
            builder.set_distribution(None, DistributionKind::Normal),
            Err(Error::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_single_mode_has_one_component() {
        let mut builder = ComponentBuilder::new(ComponentIndexPolicy::Monotonic);
        builder.set_mode(EmissionMode::Single);
        assert_eq!(builder.components().len(), 1);
        assert!(builder.add_component().is_err());
        builder.set_distribution(None, DistributionKind::Normal).unwrap();
        builder.set_param(Some(0), ParamField::WgaMean, 1.0).unwrap();
        assert!(builder.set_param(Some(1), ParamField::WgaMean, 1.0).is_err());
    }

    #[test]
    fn test_mode_switch_discards_parameters() {
        let mut builder = ComponentBuilder::new(ComponentIndexPolicy::Monotonic);
        builder.set_mode(EmissionMode::Single);
        builder.set_distribution(None, DistributionKind::Normal).unwrap();
        builder.set_param(None, ParamField::WgaMean, 1.0).unwrap();

        builder.set_mode(EmissionMode::Mixture);
        assert!(builder.components().is_empty());
        builder.set_mode(EmissionMode::Single);
        assert_eq!(builder.components()[0].distribution(), None);
    }

    #[test]
    fn test_monotonic_indices_leave_gaps() {
        let mut builder = mixture(ComponentIndexPolicy::Monotonic, 3);
        builder.remove_component(0, &validator()).unwrap();
        let idx = builder.add_component().unwrap();
        let indices: Vec<usize> = builder.components().iter().map(|c| c.index()).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert_eq!(idx, 3);
    }

    #[test]
    fn test_renumber_policy_keeps_indices_contiguous() {
        let mut builder = mixture(ComponentIndexPolicy::Renumber, 3);
        builder.remove_component(0, &validator()).unwrap();
        builder.add_component().unwrap();
        let indices: Vec<usize> = builder.components().iter().map(|c| c.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_remove_unknown_component() {
        let mut builder = mixture(ComponentIndexPolicy::Monotonic, 2);
        let err = builder.remove_component(5, &validator()).unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
        assert_eq!(builder.components().len(), 2);
    }

    #[test]
    fn test_weights_follow_components() {
        let mut builder = mixture(ComponentIndexPolicy::Monotonic, 3);
        builder.set_weight(0, Some(0.5), &validator()).unwrap();
        builder.set_weight(1, Some(0.5), &validator()).unwrap();
        let status = builder.set_weight(2, Some(0.2), &validator()).unwrap();
        assert!(matches!(status, VectorStatus::Rejected { .. }));

        builder.remove_component(2, &validator()).unwrap();
        assert_eq!(builder.weights().accepted(), Some("0.5,0.5"));
        assert_eq!(builder.weight_of(1), Some(0.5));
        assert_eq!(builder.weight_of(2), None);
    }

    #[test]
    fn test_weight_requires_mixture() {
        let mut builder = ComponentBuilder::new(ComponentIndexPolicy::Monotonic);
        builder.set_mode(EmissionMode::Single);
        assert!(matches!(
            builder.set_weight(0, Some(1.0), &validator()),
            Err(Error::InvalidCommand(_))
        ));
    }

    #[test]
    fn test_mode_parse_and_wire_name() {
        assert_eq!(EmissionMode::parse("Mixture"), Some(EmissionMode::Mixture));
        assert_eq!(EmissionMode::parse("SingleComponent"), Some(EmissionMode::Single));
        assert_eq!(EmissionMode::parse("both"), None);
        assert_eq!(EmissionMode::Unset.wire_name(), None);
        assert_eq!(EmissionMode::Mixture.wire_name(), Some("MixtureComponent"));
    }
}
