//! End-to-end tests for the hmmspec binary.
//!
//! Every invocation pins `--preset default` (or an explicit config) so the
//! results do not depend on config files in the environment.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};

fn hmmspec() -> Command {
    let mut cmd = Command::cargo_bin("hmmspec").expect("hmmspec binary should exist");
    cmd.env_remove("HMMSPEC_CONFIG")
        .env_remove("HMMSPEC_CONFIG_DIR")
        .env_remove("HS_LOG")
        .env_remove("HS_LOG_FORMAT");
    cmd
}

fn fixture(parts: &[&str]) -> PathBuf {
    let mut path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../test/fixtures");
    for part in parts {
        path.push(part);
    }
    path
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout is a JSON document")
}

// ============================================================================
// run
// ============================================================================

mod run {
    use super::*;

    #[test]
    fn complete_script_exits_clean() {
        let output = hmmspec()
            .args(["--preset", "default", "run"])
            .arg(fixture(&["scripts", "two_state.hmm"]))
            .assert()
            .code(0)
            .get_output()
            .clone();

        let json = stdout_json(&output);
        assert_eq!(json["command"], "run");
        assert_eq!(json["status"], "complete");
        assert_eq!(json["exit_code"], "OK_CLEAN");
        assert_eq!(json["wire"]["IPV-Value"], "0.6,0.4");
        assert_eq!(json["wire"]["State_M[2][tpm]"], "0.2,0.8");
        assert_eq!(json["wire"]["hmm-name"], "copy-number");
        assert!(json.get("problems").is_none());
    }

    #[test]
    fn wire_output_matches_fixture() {
        let output = hmmspec()
            .args(["--preset", "default", "run"])
            .arg(fixture(&["scripts", "two_state.hmm"]))
            .output()
            .expect("run hmmspec");
        let json = stdout_json(&output);

        let text = std::fs::read_to_string(fixture(&["wire", "two_state.json"])).unwrap();
        let expected: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(json["wire"], expected);
    }

    #[test]
    fn incomplete_script_exits_one() {
        let output = hmmspec()
            .args(["--preset", "default", "run"])
            .arg(fixture(&["scripts", "incomplete.hmm"]))
            .assert()
            .code(1)
            .get_output()
            .clone();

        let json = stdout_json(&output);
        assert_eq!(json["status"], "incomplete");
        assert_eq!(json["exit_code"], "OK_INCOMPLETE");
        assert!(json.get("wire").is_none());
        let problems = json["problems"].as_array().expect("problems list");
        assert!(problems
            .iter()
            .any(|p| p == "state 2: no emission mode chosen"));
    }

    #[test]
    fn rejected_commands_exit_two() {
        let output = hmmspec()
            .args(["--preset", "default", "run"])
            .arg(fixture(&["scripts", "over_capacity.hmm"]))
            .assert()
            .code(2)
            .get_output()
            .clone();

        let json = stdout_json(&output);
        assert_eq!(json["exit_code"], "ERR_REJECTED");
        assert_eq!(json["summary"]["rejected"], 2);
        let notices = json["notices"].as_array().expect("notices list");
        assert!(notices.iter().any(|n| n["level"] == "blocking"));
        assert!(notices.iter().any(|n| n["line"] == 9));
    }

    #[test]
    fn reads_script_from_stdin() {
        hmmspec()
            .args(["--preset", "default", "-f", "summary", "run", "-"])
            .write_stdin("add-state\nmode 1 single\ndist 1 normal\nparam 1 m1 1\nparam 1 m2 1\nparam 1 v1 1\nparam 1 v2 1\n")
            .assert()
            .code(0)
            .stdout(predicate::str::contains("run: complete (7 commands, 0 rejected, 0 problems)"));
    }

    #[test]
    fn decode_flag_includes_form() {
        let output = hmmspec()
            .args(["--preset", "default", "run", "--decode"])
            .arg(fixture(&["scripts", "mixture.hmm"]))
            .assert()
            .code(0)
            .get_output()
            .clone();

        let json = stdout_json(&output);
        let states = json["form"]["states"].as_array().expect("decoded states");
        assert_eq!(states.len(), 2);
        assert_eq!(states[1]["name"], "Tuf");
        assert_eq!(states[1]["com_type"], "MixtureComponent");
        assert_eq!(states[1]["weights"], serde_json::json!([0.25, 0.75]));
    }

    #[test]
    fn legacy_preset_reported_in_config() {
        let output = hmmspec()
            .args(["--preset", "legacy", "run"])
            .arg(fixture(&["scripts", "two_state.hmm"]))
            .output()
            .expect("run hmmspec");
        let json = stdout_json(&output);
        assert_eq!(json["config"]["preset"], "legacy");
    }

    #[test]
    fn legacy_preset_requires_model_name() {
        let output = hmmspec()
            .args(["--preset", "legacy", "run"])
            .arg(fixture(&["scripts", "mixture.hmm"]))
            .output()
            .expect("run hmmspec");
        assert_eq!(output.status.code(), Some(1));
        let json = stdout_json(&output);
        let problems = json["problems"].as_array().expect("problems list");
        assert!(problems.iter().any(|p| p == "model name missing"));

        hmmspec()
            .args(["--preset", "default", "run"])
            .arg(fixture(&["scripts", "mixture.hmm"]))
            .assert()
            .code(0);
    }

    #[test]
    fn markdown_lists_wire_keys() {
        hmmspec()
            .args(["--preset", "default", "-f", "md", "run"])
            .arg(fixture(&["scripts", "two_state.hmm"]))
            .assert()
            .code(0)
            .stdout(predicate::str::contains("# hmmspec run"))
            .stdout(predicate::str::contains("IPV-Value"));
    }

    #[test]
    fn exitcode_format_prints_nothing() {
        hmmspec()
            .args(["--preset", "default", "-f", "exitcode", "run"])
            .arg(fixture(&["scripts", "incomplete.hmm"]))
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty());
    }
}

// ============================================================================
// check
// ============================================================================

mod check {
    use super::*;

    #[test]
    fn reports_vector_statuses() {
        let output = hmmspec()
            .args(["--preset", "default", "check"])
            .arg(fixture(&["scripts", "incomplete.hmm"]))
            .assert()
            .code(1)
            .get_output()
            .clone();

        let json = stdout_json(&output);
        assert_eq!(json["command"], "check");
        let report = &json["report"];
        assert_eq!(report["states"].as_array().map(Vec::len), Some(2));
        assert_eq!(report["initial_vector"]["status"], "rejected");
        assert_eq!(report["transition_rows"][0]["status"], "pending");
    }

    #[test]
    fn markdown_table() {
        hmmspec()
            .args(["--preset", "default", "-f", "md", "check"])
            .arg(fixture(&["scripts", "mixture.hmm"]))
            .assert()
            .code(0)
            .stdout(predicate::str::contains("| 2 | Tuf | mixture | 1, 2 |"));
    }
}

// ============================================================================
// decode
// ============================================================================

mod decode {
    use super::*;

    #[test]
    fn decodes_wire_fixture() {
        let output = hmmspec()
            .args(["decode"])
            .arg(fixture(&["wire", "two_state.json"]))
            .assert()
            .code(0)
            .get_output()
            .clone();

        let json = stdout_json(&output);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["form"]["hmm_name"], "copy-number");
        assert_eq!(json["form"]["states"][0]["name"], "Normal");
        assert_eq!(json["form"]["init_p_vector"][1]["p"], 0.4);
    }

    #[test]
    fn decodes_run_envelope_from_stdin() {
        let run = hmmspec()
            .args(["--preset", "default", "run"])
            .arg(fixture(&["scripts", "two_state.hmm"]))
            .output()
            .expect("run hmmspec");
        assert!(run.status.success());

        hmmspec()
            .args(["-f", "summary", "decode", "-"])
            .write_stdin(run.stdout)
            .assert()
            .code(0)
            .stdout(predicate::str::contains("decode: 2 states, 4 transitions"));
    }
}

// ============================================================================
// config and version
// ============================================================================

mod config {
    use super::*;

    #[test]
    fn presets_listed() {
        let output = hmmspec()
            .args(["config", "presets"])
            .assert()
            .success()
            .get_output()
            .clone();
        let json = stdout_json(&output);
        let names: Vec<&str> = json["presets"]
            .as_array()
            .expect("preset list")
            .iter()
            .filter_map(|p| p["name"].as_str())
            .collect();
        assert_eq!(names, vec!["default", "legacy", "strict"]);
    }

    #[test]
    fn validate_accepts_valid_file() {
        hmmspec()
            .args(["-f", "summary", "config", "validate"])
            .arg(fixture(&["config", "valid_builder.json"]))
            .assert()
            .code(0)
            .stdout(predicate::str::contains("config validate: OK"));
    }

    #[test]
    fn show_uses_config_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::copy(
            fixture(&["config", "valid_builder.json"]),
            dir.path().join("builder.json"),
        )
        .unwrap();

        let output = hmmspec()
            .args(["config", "show", "--config"])
            .arg(dir.path())
            .assert()
            .success()
            .get_output()
            .clone();
        let json = stdout_json(&output);
        assert_eq!(json["config"]["component_indices"], "renumber");
        assert_eq!(json["config"]["limits"]["max_states"], 4);
    }

    #[test]
    fn show_without_files_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let output = hmmspec()
            .args(["config", "show"])
            .env("HMMSPEC_CONFIG_DIR", dir.path())
            .assert()
            .success()
            .get_output()
            .clone();
        let json = stdout_json(&output);
        assert_eq!(json["config"]["component_indices"], "monotonic");
    }
}

mod version {
    use super::*;

    #[test]
    fn json_version() {
        let output = hmmspec().arg("version").assert().success().get_output().clone();
        let json = stdout_json(&output);
        assert_eq!(json["hmmspec_version"], env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn human_version() {
        hmmspec()
            .args(["-f", "md", "version"])
            .assert()
            .success()
            .stdout(predicate::str::starts_with("hmmspec "));
    }
}
