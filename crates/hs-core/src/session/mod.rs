//! Editing sessions.
//!
//! An [`EditSession`] owns one [`Specification`] and applies [`Command`]s to
//! it. A failing command never ends the session: the error is returned to the
//! caller and recorded as a [`Notice`] scoped to the state, vector or row it
//! concerns.
//!
//! Probability sum failures are not stored. They are derived from the current
//! vector statuses whenever notices are requested, so they disappear as soon
//! as the vector is corrected.

pub mod script;

pub use script::{parse_line, parse_script, Command};

use hs_common::{Error, Result, SessionId};
use hs_config::BuilderConfig;
use serde::Serialize;
use std::fmt;

use crate::log_event;
use crate::logging::{event_names, generate_run_id, LogContext, Stage};
use crate::model::{EmissionMode, Specification, VectorStatus};
use crate::serialize::{SpecSerializer, WireMap};

/// How prominently a notice should be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Must be acknowledged; the action was refused outright.
    Blocking,
    /// Shown inline next to the offending input.
    Warning,
}

/// Part of the model a notice is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoticeScope {
    Model,
    State { state: usize },
    Component { state: usize, component: usize },
    MixtureWeights { state: usize },
    InitialVector,
    TransitionRow { row: usize },
    /// A script line that did not parse.
    Script,
}

impl NoticeScope {
    fn for_command(cmd: &Command) -> NoticeScope {
        match cmd {
            Command::SetName(_) | Command::AddState => NoticeScope::Model,
            Command::RemoveState { state }
            | Command::RenameState { state, .. }
            | Command::SetMode { state, .. }
            | Command::AddComponent { state } => NoticeScope::State { state: *state },
            Command::RemoveComponent { state, component } => NoticeScope::Component {
                state: *state,
                component: *component,
            },
            Command::SetDistribution {
                state, component, ..
            }
            | Command::SetParam {
                state, component, ..
            } => match component {
                Some(c) => NoticeScope::Component {
                    state: *state,
                    component: *c,
                },
                None => NoticeScope::State { state: *state },
            },
            Command::SetWeight { state, .. } => NoticeScope::MixtureWeights { state: *state },
            Command::SetInitial { .. } => NoticeScope::InitialVector,
            Command::SetTransition { from, .. } => NoticeScope::TransitionRow { row: *from },
        }
    }
}

impl fmt::Display for NoticeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoticeScope::Model => write!(f, "model"),
            NoticeScope::State { state } => write!(f, "state {}", state),
            NoticeScope::Component { state, component } => {
                write!(f, "state {} component {}", state, component)
            }
            NoticeScope::MixtureWeights { state } => write!(f, "mixture weights of state {}", state),
            NoticeScope::InitialVector => write!(f, "initial vector"),
            NoticeScope::TransitionRow { row } => write!(f, "transition row {}", row),
            NoticeScope::Script => write!(f, "script"),
        }
    }
}

/// A user-facing message about a refused or flagged edit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub scope: NoticeScope,
    /// Stable error code of the underlying [`Error`].
    pub code: u32,
    pub message: String,
    /// Script line that produced the notice, when replaying a script.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Notice {
    fn from_error(err: &Error, scope: NoticeScope, line: Option<usize>) -> Self {
        Notice {
            level: if err.is_blocking() {
                NoticeLevel::Blocking
            } else {
                NoticeLevel::Warning
            },
            scope,
            code: err.code(),
            message: err.to_string(),
            line,
        }
    }
}

/// Counters for one script replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Non-blank, non-comment lines seen.
    pub commands: usize,
    pub applied: usize,
    /// Lines that failed to parse or were refused by the model.
    pub rejected: usize,
    /// Probability entries stored while their vector failed the sum check.
    pub flagged: usize,
}

/// Status of every probability vector in the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub states: Vec<StateReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_vector: Option<VectorStatus>,
    pub transition_rows: Vec<VectorStatus>,
    /// Everything that still blocks serialization.
    pub problems: Vec<String>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateReport {
    pub index: usize,
    pub label: String,
    pub mode: EmissionMode,
    pub components: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<VectorStatus>,
}

/// One specification being edited.
#[derive(Debug, Clone)]
pub struct EditSession {
    id: SessionId,
    spec: Specification,
    notices: Vec<Notice>,
    ctx: LogContext,
}

impl EditSession {
    pub fn new(config: &BuilderConfig) -> Self {
        Self::with_run_id(config, generate_run_id())
    }

    /// Start a session correlated with an existing run.
    pub fn with_run_id(config: &BuilderConfig, run_id: impl Into<String>) -> Self {
        let id = SessionId::new();
        let ctx = LogContext::new(run_id).with_session_id(id.to_string());
        log_event!(
            ctx,
            DEBUG,
            event_names::SESSION_STARTED,
            Stage::Init,
            "editing session opened",
            max_states = config.limits.max_states
        );
        EditSession {
            id,
            spec: Specification::new(config),
            notices: Vec::new(),
            ctx,
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn spec(&self) -> &Specification {
        &self.spec
    }

    pub fn log_context(&self) -> &LogContext {
        &self.ctx
    }

    /// Apply one command.
    ///
    /// A probability entry that leaves its vector rejected is still stored;
    /// the call then returns [`Error::ValidationFailed`].
    pub fn apply(&mut self, cmd: Command) -> Result<()> {
        self.apply_at(cmd, None)
    }

    fn apply_at(&mut self, cmd: Command, line: Option<usize>) -> Result<()> {
        let scope = NoticeScope::for_command(&cmd);
        let keyword = cmd.keyword();
        let result = self.execute(&cmd, &scope);

        match &result {
            Ok(()) => {
                log_event!(
                    self.ctx,
                    DEBUG,
                    event_names::COMMAND_APPLIED,
                    Stage::Edit,
                    "command applied",
                    command = keyword
                );
            }
            Err(err @ Error::ValidationFailed { .. }) => {
                log_event!(
                    self.ctx,
                    DEBUG,
                    event_names::VECTOR_REJECTED,
                    Stage::Validate,
                    "entry stored, vector does not sum to 1",
                    command = keyword,
                    error = tracing::field::display(err)
                );
            }
            Err(err) => {
                log_event!(
                    self.ctx,
                    WARN,
                    event_names::COMMAND_REJECTED,
                    Stage::Edit,
                    "command rejected",
                    command = keyword,
                    scope = tracing::field::display(&scope),
                    error = tracing::field::display(err)
                );
                self.notices.push(Notice::from_error(err, scope, line));
            }
        }
        result
    }

    fn execute(&mut self, cmd: &Command, scope: &NoticeScope) -> Result<()> {
        let status = match cmd {
            Command::SetName(name) => {
                self.spec.set_name(name);
                return Ok(());
            }
            Command::AddState => return self.spec.add_state().map(|_| ()),
            Command::RemoveState { state } => return self.spec.remove_state(*state).map(|_| ()),
            Command::RenameState { state, name } => return self.spec.rename_state(*state, name),
            Command::SetMode { state, mode } => return self.spec.set_mode(*state, *mode),
            Command::AddComponent { state } => {
                return self.spec.add_component(*state).map(|_| ())
            }
            Command::RemoveComponent { state, component } => {
                return self.spec.remove_component(*state, *component)
            }
            Command::SetDistribution {
                state,
                component,
                kind,
            } => return self.spec.set_distribution(*state, *component, *kind),
            Command::SetParam {
                state,
                component,
                field,
                value,
            } => return self.spec.set_param(*state, *component, *field, *value),
            Command::SetWeight {
                state,
                component,
                value,
            } => self.spec.set_weight(*state, *component, *value)?,
            Command::SetInitial { state, value } => self.spec.set_initial(*state, *value)?,
            Command::SetTransition { from, to, value } => {
                self.spec.set_transition(*from, *to, *value)?
            }
        };

        match status {
            VectorStatus::Rejected { sum } => Err(Error::ValidationFailed {
                scope: scope.to_string(),
                sum,
            }),
            VectorStatus::Pending | VectorStatus::Accepted { .. } => Ok(()),
        }
    }

    /// Replay a script line by line.
    ///
    /// Bad lines and refused commands are recorded as notices; replay always
    /// runs to the end.
    pub fn run_script(&mut self, text: &str) -> ReplaySummary {
        let mut summary = ReplaySummary::default();
        for (i, line) in text.lines().enumerate() {
            let line_no = i + 1;
            let cmd = match parse_line(line) {
                Ok(Some(cmd)) => cmd,
                Ok(None) => continue,
                Err(err) => {
                    summary.commands += 1;
                    summary.rejected += 1;
                    log_event!(
                        self.ctx,
                        WARN,
                        event_names::COMMAND_REJECTED,
                        Stage::Edit,
                        "script line rejected",
                        line = line_no,
                        error = tracing::field::display(&err)
                    );
                    self.notices
                        .push(Notice::from_error(&err, NoticeScope::Script, Some(line_no)));
                    continue;
                }
            };
            summary.commands += 1;
            match self.apply_at(cmd, Some(line_no)) {
                Ok(()) => summary.applied += 1,
                Err(Error::ValidationFailed { .. }) => {
                    summary.applied += 1;
                    summary.flagged += 1;
                }
                Err(_) => summary.rejected += 1,
            }
        }
        log_event!(
            self.ctx,
            INFO,
            event_names::SESSION_FINISHED,
            Stage::Edit,
            "script replayed",
            commands = summary.commands,
            applied = summary.applied,
            rejected = summary.rejected
        );
        summary
    }

    /// Stored command notices followed by the current sum-check warnings.
    pub fn notices(&self) -> Vec<Notice> {
        let mut notices = self.notices.clone();
        notices.extend(self.validation_warnings());
        notices
    }

    /// Whether any refused command left a blocking notice.
    pub fn has_blocking(&self) -> bool {
        self.notices
            .iter()
            .any(|n| n.level == NoticeLevel::Blocking)
    }

    fn validation_warnings(&self) -> Vec<Notice> {
        let mut warnings = Vec::new();
        let mut flag = |scope: NoticeScope, status: &VectorStatus| {
            if let VectorStatus::Rejected { sum } = status {
                let err = Error::ValidationFailed {
                    scope: scope.to_string(),
                    sum: *sum,
                };
                warnings.push(Notice::from_error(&err, scope, None));
            }
        };

        for state in self.spec.states().iter() {
            let emission = state.emission();
            if emission.mode() == EmissionMode::Mixture {
                flag(
                    NoticeScope::MixtureWeights {
                        state: state.index(),
                    },
                    emission.weights().status(),
                );
            }
        }
        if let Some(initial) = self.spec.initial() {
            flag(NoticeScope::InitialVector, initial.status());
        }
        if let Some(transitions) = self.spec.transitions() {
            for (i, row) in transitions.rows().iter().enumerate() {
                flag(NoticeScope::TransitionRow { row: i + 1 }, row.status());
            }
        }
        warnings
    }

    /// Everything that still blocks serialization.
    pub fn problems(&self) -> Vec<String> {
        SpecSerializer::for_spec(&self.spec).problems(&self.spec)
    }

    pub fn is_complete(&self) -> bool {
        self.problems().is_empty()
    }

    pub fn serialize(&self) -> Result<WireMap> {
        SpecSerializer::for_spec(&self.spec).serialize(&self.spec)
    }

    pub fn report(&self) -> SessionReport {
        let states = self
            .spec
            .states()
            .iter()
            .map(|state| {
                let emission = state.emission();
                StateReport {
                    index: state.index(),
                    label: state.label(),
                    mode: emission.mode(),
                    components: emission.components().iter().map(|c| c.index()).collect(),
                    weights: (emission.mode() == EmissionMode::Mixture)
                        .then(|| emission.weights().status().clone()),
                }
            })
            .collect();
        SessionReport {
            name: self.spec.name().map(str::to_string),
            states,
            initial_vector: self.spec.initial().map(|i| i.status().clone()),
            transition_rows: self
                .spec
                .transitions()
                .map(|t| t.rows().iter().map(|r| r.status().clone()).collect())
                .unwrap_or_default(),
            problems: self.problems(),
            notices: self.notices(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> EditSession {
        EditSession::new(&BuilderConfig::default())
    }

    #[test]
    fn test_capacity_notice_is_blocking() {
        let mut s = session();
        for _ in 0..6 {
            s.apply(Command::AddState).unwrap();
        }
        let err = s.apply(Command::AddState).unwrap_err();
        assert!(matches!(err, Error::CapacityExceeded { max: 6 }));
        assert_eq!(s.spec().states().len(), 6);
        assert!(s.has_blocking());
        let notice = &s.notices()[0];
        assert_eq!(notice.level, NoticeLevel::Blocking);
        assert_eq!(notice.scope, NoticeScope::Model);
        assert_eq!(notice.code, 10);
    }

    #[test]
    fn test_rejected_vector_warns_until_corrected() {
        let mut s = session();
        s.run_script("add-state\nadd-state\nipv 1 0.5\n");
        let err = s.apply(Command::SetInitial {
            state: 2,
            value: Some(0.4),
        });
        assert!(matches!(err, Err(Error::ValidationFailed { .. })));
        let notices = s.notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].scope, NoticeScope::InitialVector);
        assert_eq!(notices[0].level, NoticeLevel::Warning);

        s.apply(Command::SetInitial {
            state: 2,
            value: Some(0.5),
        })
        .unwrap();
        assert!(s.notices().is_empty());
    }

    #[test]
    fn test_replay_continues_past_bad_lines() {
        let mut s = session();
        let summary = s.run_script("add-state\nbogus 1\nremove-state 4\nadd-state\n");
        assert_eq!(summary.commands, 4);
        assert_eq!(summary.applied, 2);
        assert_eq!(summary.rejected, 2);
        assert_eq!(s.spec().states().len(), 2);

        let lines: Vec<_> = s.notices().iter().map(|n| n.line).collect();
        assert_eq!(lines, vec![Some(2), Some(3)]);
        assert_eq!(s.notices()[0].scope, NoticeScope::Script);
    }

    #[test]
    fn test_flagged_entries_are_applied() {
        let mut s = session();
        let summary = s.run_script("add-state\nadd-state\ntpm 1 1 0.9\ntpm 1 2 0.9\n");
        assert_eq!(summary.rejected, 0);
        assert_eq!(summary.flagged, 1);
        let report = s.report();
        assert!(matches!(
            report.transition_rows[0],
            VectorStatus::Rejected { .. }
        ));
        assert_eq!(report.transition_rows[1], VectorStatus::Pending);
    }

    #[test]
    fn test_report_lists_components() {
        let mut s = session();
        s.run_script("add-state\nmode 1 mixture\ncomponent 1\ncomponent 1\ndrop-component 1 0\n");
        let report = s.report();
        assert_eq!(report.states[0].mode, EmissionMode::Mixture);
        assert_eq!(report.states[0].components, vec![1]);
        assert_eq!(report.states[0].label, "State 1");
        assert!(report.initial_vector.is_none());
        assert!(!report.problems.is_empty());
    }

    #[test]
    fn test_scope_display() {
        assert_eq!(
            NoticeScope::Component {
                state: 2,
                component: 1
            }
            .to_string(),
            "state 2 component 1"
        );
        assert_eq!(NoticeScope::TransitionRow { row: 3 }.to_string(), "transition row 3");
    }
}
