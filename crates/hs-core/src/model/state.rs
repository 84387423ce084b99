//! States and the bounded registry that owns them.

use hs_common::{Error, Result};
use hs_config::ComponentIndexPolicy;

use super::component::ComponentBuilder;

/// One hidden state.
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    index: usize,
    name: Option<String>,
    emission: ComponentBuilder,
}

impl State {
    /// 1-based position in the registry.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Entered name, or `State n` when none was given.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("State {}", self.index),
        }
    }

    pub fn emission(&self) -> &ComponentBuilder {
        &self.emission
    }

    pub fn emission_mut(&mut self) -> &mut ComponentBuilder {
        &mut self.emission
    }
}

/// Ordered states with contiguous 1-based indices.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRegistry {
    states: Vec<State>,
    max_states: usize,
    component_policy: ComponentIndexPolicy,
}

impl StateRegistry {
    pub fn new(max_states: usize, component_policy: ComponentIndexPolicy) -> Self {
        StateRegistry {
            states: Vec::with_capacity(max_states),
            max_states,
            component_policy,
        }
    }

    pub fn max_states(&self) -> usize {
        self.max_states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.states.len() >= self.max_states
    }

    pub fn iter(&self) -> impl Iterator<Item = &State> {
        self.states.iter()
    }

    /// Append a state with index `len + 1`.
    pub fn add_state(&mut self) -> Result<&State> {
        if self.is_full() {
            return Err(Error::CapacityExceeded {
                max: self.max_states,
            });
        }
        let index = self.states.len() + 1;
        self.states.push(State {
            index,
            name: None,
            emission: ComponentBuilder::new(self.component_policy),
        });
        Ok(&self.states[index - 1])
    }

    /// Remove the state at `index`; every later state moves down by one.
    pub fn remove_state(&mut self, index: usize) -> Result<State> {
        let pos = self.position(index)?;
        let removed = self.states.remove(pos);
        for state in &mut self.states[pos..] {
            state.index -= 1;
        }
        Ok(removed)
    }

    pub fn get(&self, index: usize) -> Option<&State> {
        index.checked_sub(1).and_then(|pos| self.states.get(pos))
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut State> {
        index.checked_sub(1).and_then(|pos| self.states.get_mut(pos))
    }

    /// Like [`get_mut`](Self::get_mut) but reports a missing state as `NotFound`.
    pub fn require_mut(&mut self, index: usize) -> Result<&mut State> {
        self.get_mut(index)
            .ok_or_else(|| Error::not_found(format!("state {}", index)))
    }

    pub fn rename(&mut self, index: usize, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidValue {
                field: "name".to_string(),
                message: "state name must not be empty".to_string(),
            });
        }
        self.require_mut(index)?.name = Some(name.to_string());
        Ok(())
    }

    fn position(&self, index: usize) -> Result<usize> {
        index
            .checked_sub(1)
            .filter(|pos| *pos < self.states.len())
            .ok_or_else(|| Error::not_found(format!("state {}", index)))
    }
}
