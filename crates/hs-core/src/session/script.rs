//! Line-oriented command scripts.
//!
//! ```text
//! # two-state copy-number model
//! model-name CNV
//! add-state
//! name 1 Normal
//! mode 1 single
//! dist 1 normal
//! param 1 wga_mean 1.0
//! add-state
//! mode 2 mixture
//! component 2
//! dist 2 0 uniform
//! param 2 0 wga_lower 0
//! weight 2 0 1
//! ipv 1 0.6
//! tpm 1 2 0.3
//! ```
//!
//! State and row indices are 1-based, component indices are the component's
//! own index. A probability command with no value clears the entry.

use hs_common::{Error, Result};
use hs_math::parse_entry;
use std::fmt;

use crate::model::{DistributionKind, EmissionMode, ParamField};

/// One user action against a specification.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetName(String),
    AddState,
    RemoveState {
        state: usize,
    },
    RenameState {
        state: usize,
        name: String,
    },
    SetMode {
        state: usize,
        mode: EmissionMode,
    },
    AddComponent {
        state: usize,
    },
    RemoveComponent {
        state: usize,
        component: usize,
    },
    SetDistribution {
        state: usize,
        component: Option<usize>,
        kind: DistributionKind,
    },
    SetParam {
        state: usize,
        component: Option<usize>,
        field: ParamField,
        value: f64,
    },
    SetWeight {
        state: usize,
        component: usize,
        value: Option<f64>,
    },
    SetInitial {
        state: usize,
        value: Option<f64>,
    },
    SetTransition {
        from: usize,
        to: usize,
        value: Option<f64>,
    },
}

impl Command {
    /// Script keyword of this command.
    pub fn keyword(&self) -> &'static str {
        match self {
            Command::SetName(_) => "model-name",
            Command::AddState => "add-state",
            Command::RemoveState { .. } => "remove-state",
            Command::RenameState { .. } => "name",
            Command::SetMode { .. } => "mode",
            Command::AddComponent { .. } => "component",
            Command::RemoveComponent { .. } => "drop-component",
            Command::SetDistribution { .. } => "dist",
            Command::SetParam { .. } => "param",
            Command::SetWeight { .. } => "weight",
            Command::SetInitial { .. } => "ipv",
            Command::SetTransition { .. } => "tpm",
        }
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: Option<f64>) -> fmt::Result {
    match value {
        Some(v) => write!(f, " {}", v),
        None => Ok(()),
    }
}

/// Renders the command back as a script line.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.keyword())?;
        match self {
            Command::SetName(name) if name.is_empty() => Ok(()),
            Command::SetName(name) => write!(f, " {}", name),
            Command::AddState => Ok(()),
            Command::RemoveState { state } | Command::AddComponent { state } => {
                write!(f, " {}", state)
            }
            Command::RenameState { state, name } => write!(f, " {} {}", state, name),
            Command::SetMode { state, mode } => write!(f, " {} {}", state, mode),
            Command::RemoveComponent { state, component } => {
                write!(f, " {} {}", state, component)
            }
            Command::SetDistribution {
                state,
                component,
                kind,
            } => match component {
                Some(c) => write!(f, " {} {} {}", state, c, kind.wire_name().to_lowercase()),
                None => write!(f, " {} {}", state, kind.wire_name().to_lowercase()),
            },
            Command::SetParam {
                state,
                component,
                field,
                value,
            } => match component {
                Some(c) => write!(f, " {} {} {} {}", state, c, field, value),
                None => write!(f, " {} {} {}", state, field, value),
            },
            Command::SetWeight {
                state,
                component,
                value,
            } => {
                write!(f, " {} {}", state, component)?;
                write_value(f, *value)
            }
            Command::SetInitial { state, value } => {
                write!(f, " {}", state)?;
                write_value(f, *value)
            }
            Command::SetTransition { from, to, value } => {
                write!(f, " {} {}", from, to)?;
                write_value(f, *value)
            }
        }
    }
}

/// Parse one script line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    };
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let Some((&keyword, args)) = tokens.split_first() else {
        return Ok(None);
    };

    let command = match keyword {
        "model-name" => Command::SetName(args.join(" ")),
        "add-state" => {
            arity(keyword, args, 0, 0)?;
            Command::AddState
        }
        "remove-state" => {
            arity(keyword, args, 1, 1)?;
            Command::RemoveState {
                state: index(args[0], "state")?,
            }
        }
        "name" => {
            if args.len() < 2 {
                return Err(usage(keyword, "name <state> <name...>"));
            }
            Command::RenameState {
                state: index(args[0], "state")?,
                name: args[1..].join(" "),
            }
        }
        "mode" => {
            arity(keyword, args, 2, 2)?;
            let mode = EmissionMode::parse(args[1]).ok_or_else(|| {
                Error::InvalidCommand(format!(
                    "unknown emission mode '{}', expected single or mixture",
                    args[1]
                ))
            })?;
            Command::SetMode {
                state: index(args[0], "state")?,
                mode,
            }
        }
        "component" => {
            arity(keyword, args, 1, 1)?;
            Command::AddComponent {
                state: index(args[0], "state")?,
            }
        }
        "drop-component" => {
            arity(keyword, args, 2, 2)?;
            Command::RemoveComponent {
                state: index(args[0], "state")?,
                component: index(args[1], "component")?,
            }
        }
        "dist" => {
            arity(keyword, args, 2, 3)?;
            let (component, kind) = match args {
                [_, kind] => (None, *kind),
                [_, c, kind] => (Some(index(c, "component")?), *kind),
                _ => return Err(usage(keyword, "dist <state> [component] normal|uniform")),
            };
            let kind = DistributionKind::parse(kind).ok_or_else(|| {
                Error::InvalidCommand(format!(
                    "unknown distribution '{}', expected normal or uniform",
                    kind
                ))
            })?;
            Command::SetDistribution {
                state: index(args[0], "state")?,
                component,
                kind,
            }
        }
        "param" => {
            arity(keyword, args, 3, 4)?;
            let (component, field, value) = match args {
                [_, field, value] => (None, *field, *value),
                [_, c, field, value] => (Some(index(c, "component")?), *field, *value),
                _ => return Err(usage(keyword, "param <state> [component] <field> <value>")),
            };
            let field = ParamField::parse(field).ok_or_else(|| {
                Error::InvalidCommand(format!("unknown parameter '{}'", field))
            })?;
            let value = parse_entry(value).ok_or_else(|| Error::InvalidValue {
                field: field.as_str().to_string(),
                message: format!("'{}' is not a finite number", value),
            })?;
            Command::SetParam {
                state: index(args[0], "state")?,
                component,
                field,
                value,
            }
        }
        "weight" => {
            arity(keyword, args, 2, 3)?;
            Command::SetWeight {
                state: index(args[0], "state")?,
                component: index(args[1], "component")?,
                value: args.get(2).and_then(|v| parse_entry(v)),
            }
        }
        "ipv" => {
            arity(keyword, args, 1, 2)?;
            Command::SetInitial {
                state: index(args[0], "state")?,
                value: args.get(1).and_then(|v| parse_entry(v)),
            }
        }
        "tpm" => {
            arity(keyword, args, 2, 3)?;
            Command::SetTransition {
                from: index(args[0], "row")?,
                to: index(args[1], "column")?,
                value: args.get(2).and_then(|v| parse_entry(v)),
            }
        }
        other => {
            return Err(Error::InvalidCommand(format!("unknown command '{}'", other)));
        }
    };
    Ok(Some(command))
}

/// Parse a whole script, stopping at the first bad line.
///
/// Returns `(line_number, command)` pairs with 1-based line numbers.
pub fn parse_script(text: &str) -> Result<Vec<(usize, Command)>> {
    let mut commands = Vec::new();
    for (i, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(cmd)) => commands.push((i + 1, cmd)),
            Ok(None) => {}
            Err(err) => {
                return Err(Error::InvalidCommand(format!("line {}: {}", i + 1, err)));
            }
        }
    }
    Ok(commands)
}

fn arity(keyword: &str, args: &[&str], min: usize, max: usize) -> Result<()> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            format!("{}", min)
        } else {
            format!("{} to {}", min, max)
        };
        return Err(Error::InvalidCommand(format!(
            "'{}' takes {} arguments, got {}",
            keyword,
            expected,
            args.len()
        )));
    }
    Ok(())
}

fn usage(keyword: &str, form: &str) -> Error {
    Error::InvalidCommand(format!("'{}' usage: {}", keyword, form))
}

fn index(token: &str, what: &str) -> Result<usize> {
    token
        .parse::<usize>()
        .map_err(|_| Error::InvalidCommand(format!("expected a {} index, got '{}'", what, token)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# just a note").unwrap(), None);
        assert_eq!(parse("add-state  # trailing"), Command::AddState);
    }

    #[test]
    fn test_single_and_mixture_forms() {
        assert_eq!(
            parse("dist 1 normal"),
            Command::SetDistribution {
                state: 1,
                component: None,
                kind: DistributionKind::Normal
            }
        );
        assert_eq!(
            parse("param 2 0 wga_lower 0"),
            Command::SetParam {
                state: 2,
                component: Some(0),
                field: ParamField::WgaLower,
                value: 0.0
            }
        );
        assert_eq!(
            parse("param 1 wga_mean 1.5"),
            Command::SetParam {
                state: 1,
                component: None,
                field: ParamField::WgaMean,
                value: 1.5
            }
        );
    }

    #[test]
    fn test_names_keep_spaces() {
        assert_eq!(
            parse("name 3 Copy Neutral"),
            Command::RenameState {
                state: 3,
                name: "Copy Neutral".to_string()
            }
        );
        assert_eq!(parse("model-name CNV model"), Command::SetName("CNV model".to_string()));
    }

    #[test]
    fn test_missing_probability_clears() {
        assert_eq!(parse("ipv 2"), Command::SetInitial { state: 2, value: None });
        assert_eq!(
            parse("tpm 1 2 abc"),
            Command::SetTransition {
                from: 1,
                to: 2,
                value: None
            }
        );
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse_line("frobnicate 1"), Err(Error::InvalidCommand(_))));
        assert!(matches!(parse_line("remove-state"), Err(Error::InvalidCommand(_))));
        assert!(matches!(parse_line("remove-state x"), Err(Error::InvalidCommand(_))));
        assert!(matches!(parse_line("mode 1 triple"), Err(Error::InvalidCommand(_))));
        assert!(matches!(parse_line("dist 1 gamma"), Err(Error::InvalidCommand(_))));
        assert!(matches!(parse_line("param 1 wga_mean"), Err(Error::InvalidCommand(_))));
        assert!(matches!(
            parse_line("param 1 wga_mean NaN"),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_display_reparses() {
        let lines = [
            "model-name CNV",
            "add-state",
            "remove-state 2",
            "name 1 Healthy",
            "mode 1 mixture",
            "component 1",
            "drop-component 1 0",
            "dist 1 normal",
            "dist 1 0 uniform",
            "param 1 wga_mean 1",
            "param 1 0 wga_lower 0.25",
            "weight 1 0 0.5",
            "ipv 1 0.6",
            "tpm 1 2",
        ];
        for line in lines {
            let cmd = parse(line);
            assert_eq!(cmd.to_string(), line);
        }
    }

    #[test]
    fn test_parse_script_reports_line() {
        let err = parse_script("add-state\n\nbogus\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
        let cmds = parse_script("add-state\n# c\nadd-state\n").unwrap();
        assert_eq!(cmds.iter().map(|(l, _)| *l).collect::<Vec<_>>(), vec![1, 3]);
    }
}
