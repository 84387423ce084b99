//! End-to-end specification tests: script replay → wire map → decoded form.
//!
//! Uses the script fixtures under test/fixtures/scripts so the CLI tests and
//! these library tests exercise the same inputs.

use hs_common::Error;
use hs_config::{get_preset, BuilderConfig, ComponentIndexPolicy, PresetName};
use hs_core::model::{DistributionKind, EmissionMode, ParamField, Specification};
use hs_core::serialize::{keys, serialize, WireMap};
use hs_core::session::{Command, EditSession};
use hs_core::wire::{decode, ComType, FormParameters};
use std::path::{Path, PathBuf};

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("test")
        .join("fixtures")
}

fn script(name: &str) -> String {
    std::fs::read_to_string(fixtures_dir().join("scripts").join(name)).expect("read script fixture")
}

fn replay(name: &str, config: &BuilderConfig) -> EditSession {
    let mut session = EditSession::new(config);
    session.run_script(&script(name));
    session
}

// ============================================================================
// Two-state example
// ============================================================================

mod two_state {
    use super::*;

    fn wire() -> WireMap {
        replay("two_state.hmm", &BuilderConfig::default())
            .serialize()
            .expect("two-state script serializes")
    }

    #[test]
    fn probability_keys_are_exact() {
        let wire = wire();
        assert_eq!(wire.get("IPV-Value").map(String::as_str), Some("0.6,0.4"));
        assert_eq!(wire.get("State_M[1][tpm]").map(String::as_str), Some("0.7,0.3"));
        assert_eq!(wire.get("State_M[2][tpm]").map(String::as_str), Some("0.2,0.8"));

        let ipv_keys = wire.keys().filter(|k| *k == "IPV-Value").count();
        let tpm_keys = wire.keys().filter(|k| k.starts_with("State_M[")).count();
        assert_eq!(ipv_keys, 1);
        assert_eq!(tpm_keys, 2);
    }

    #[test]
    fn matches_wire_fixture() {
        let text = std::fs::read_to_string(fixtures_dir().join("wire").join("two_state.json"))
            .expect("read wire fixture");
        let expected: WireMap = serde_json::from_str(&text).expect("fixture is a string map");
        assert_eq!(wire(), expected);
    }

    #[test]
    fn decodes_back() {
        let form = decode(&wire()).expect("serializer output decodes");
        assert_eq!(form.hmm_name.as_deref(), Some("copy-number"));
        let names: Vec<&str> = form.states.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Normal", "Deletion"]);

        let normal = form.state("Normal").unwrap();
        assert_eq!(
            normal.parameters,
            Some(FormParameters::Normal {
                means: [1.0, 1.1],
                vars: [0.2, 0.25]
            })
        );
        let deletion = form.state("Deletion").unwrap();
        assert_eq!(
            deletion.parameters,
            Some(FormParameters::Uniform {
                upper: [0.5, 0.6],
                lower: [0.0, 0.0]
            })
        );

        assert_eq!(form.initial_probability("Normal"), Some(0.6));
        assert_eq!(form.transition("Normal", "Deletion"), Some(0.3));
        assert_eq!(form.transition("Deletion", "Deletion"), Some(0.8));
    }
}

// ============================================================================
// Mixtures
// ============================================================================

mod mixture {
    use super::*;

    #[test]
    fn monotonic_indices_leave_gap_on_wire() {
        let wire = replay("mixture.hmm", &BuilderConfig::default())
            .serialize()
            .expect("mixture script serializes");
        assert_eq!(wire.get("State[2][com_type]").map(String::as_str), Some("MixtureComponent"));
        assert!(!wire.contains_key("State[2]components[0][distribution]"));
        assert_eq!(
            wire.get("State[2]components[1][distribution]").map(String::as_str),
            Some("Normal")
        );
        assert_eq!(
            wire.get("State[2]weights[2][M_com_weight]").map(String::as_str),
            Some("0.75")
        );
    }

    #[test]
    fn renumbered_indices_start_at_zero() {
        let mut config = BuilderConfig::default();
        config.component_indices = ComponentIndexPolicy::Renumber;
        // Component indices in the fixture assume monotonic numbering, so
        // build the renumbered mixture directly.
        let mut session = EditSession::new(&config);
        for cmd in [
            Command::AddState,
            Command::SetMode { state: 1, mode: EmissionMode::Mixture },
            Command::AddComponent { state: 1 },
            Command::AddComponent { state: 1 },
            Command::RemoveComponent { state: 1, component: 0 },
            Command::SetDistribution { state: 1, component: Some(0), kind: DistributionKind::Uniform },
        ] {
            session.apply(cmd).unwrap();
        }
        let report = session.report();
        assert_eq!(report.states[0].components, vec![0]);
    }

    #[test]
    fn gap_survives_round_trip() {
        let wire = replay("mixture.hmm", &BuilderConfig::default()).serialize().unwrap();
        let form = decode(&wire).unwrap();
        let tuf = form.state("Tuf").unwrap();
        assert_eq!(tuf.com_type, ComType::MixtureComponent);
        assert_eq!(tuf.components.len(), 2);
        assert_eq!(tuf.components[0].distribution, DistributionKind::Normal);
        assert_eq!(tuf.components[1].distribution, DistributionKind::Uniform);
        assert_eq!(tuf.weights, vec![0.25, 0.75]);
    }

    #[test]
    fn switching_modes_discards_parameters() {
        let mut spec = Specification::default();
        spec.add_state().unwrap();
        spec.set_mode(1, EmissionMode::Single).unwrap();
        spec.set_distribution(1, None, DistributionKind::Normal).unwrap();
        spec.set_param(1, None, ParamField::WgaMean, 3.0).unwrap();

        spec.set_mode(1, EmissionMode::Mixture).unwrap();
        spec.set_mode(1, EmissionMode::Single).unwrap();
        let emission = spec.state(1).unwrap().emission();
        assert_eq!(emission.components().len(), 1);
        assert!(emission.components()[0].distribution().is_none());
    }
}

// ============================================================================
// Incomplete and refused input
// ============================================================================

mod failures {
    use super::*;

    #[test]
    fn incomplete_script_lists_every_problem() {
        let session = replay("incomplete.hmm", &BuilderConfig::default());
        let err = session.serialize().unwrap_err();
        let Error::IncompleteSpecification { problems } = err else {
            panic!("expected an incomplete specification, got {err:?}");
        };
        assert!(problems.iter().any(|p| p.starts_with("state 1: missing")));
        assert!(problems.iter().any(|p| p == "state 2: no emission mode chosen"));
        assert!(problems.iter().any(|p| p.starts_with("initial vector is rejected")));
        assert!(problems.iter().any(|p| p == "transition row 1 is pending"));
    }

    #[test]
    fn seventh_state_is_refused() {
        let mut session = EditSession::new(&BuilderConfig::default());
        let summary = session.run_script(&script("over_capacity.hmm"));
        assert_eq!(session.spec().states().len(), 6);
        assert_eq!(summary.rejected, 2);
        assert!(session.has_blocking());
        assert_eq!(session.spec().initial().map(|i| i.len()), Some(6));
    }

    #[test]
    fn empty_specification_is_incomplete() {
        let err = serialize(&Specification::default()).unwrap_err();
        assert!(err.to_string().contains("no states defined"));
    }

    #[test]
    fn legacy_preset_skips_bound_check() {
        let mut session = EditSession::new(&get_preset(PresetName::Legacy));
        session.run_script(
            "model-name bounds\nadd-state\nmode 1 single\ndist 1 uniform\n\
             param 1 wga_lower 5\nparam 1 no_wga_lower 5\n\
             param 1 wga_upper 1\nparam 1 no_wga_upper 1\n",
        );
        let wire = session.serialize().expect("legacy allows inverted bounds");
        assert_eq!(wire.get(&keys::state(1, "single_com_l1")).map(String::as_str), Some("5"));
        assert!(!wire.contains_key(keys::INITIAL_VECTOR));

        let mut strict = EditSession::new(&BuilderConfig::default());
        strict.run_script(
            "add-state\nmode 1 single\ndist 1 uniform\n\
             param 1 wga_lower 5\nparam 1 no_wga_lower 0\n\
             param 1 wga_upper 1\nparam 1 no_wga_upper 1\n",
        );
        let err = strict.serialize().unwrap_err();
        assert!(err.to_string().contains("WGA lower bound exceeds upper bound"));
    }
}
