//! CLI integration tests for esq commands.
//!
//! These tests focus on exit codes and the JSON the compiler emits, not on
//! human-readable formatting which may change.

// Integration tests live outside cfg(test) by design
#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{Value, json};

/// Mappings used by most tests.
const CATALOG: &str = r#"
root = true

[params]
locale = "en"

[field.sku]
property = "_id"

[field.price]
property = "price"

[field.name]
property = "name.{locale}"
converter = "lowercase"

[field.seller]
property = "seller"
join = "offer"
"#;

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to run `esq` with HOME isolated to the provided directory.
fn esq_with_home(home: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("esq").unwrap();
    cmd.env("HOME", home);
    cmd.env_remove("ESQ_LOG");
    cmd
}

/// Creates a directory holding the catalog config and a condition file.
fn project(condition: &Value) -> tempfile::TempDir {
    let dir = temp_dir();
    fs::write(dir.path().join(".esq.toml"), CATALOG).unwrap();
    fs::write(dir.path().join("condition.json"), condition.to_string()).unwrap();
    dir
}

/// Runs `esq` in `dir` and parses stdout as JSON.
fn json_output(dir: &Path, args: &[&str]) -> Value {
    let assert = esq_with_home(dir)
        .current_dir(dir)
        .args(args)
        .assert()
        .success();
    serde_json::from_slice(&assert.get_output().stdout).unwrap()
}

mod compile {
    use super::*;

    #[test]
    fn test_prints_the_query_document() {
        let dir = project(&json!({
            "root": {"fields": {
                "price": {"simple": [10, 20]},
                "sku": {"excluded": ["X1"]}
            }}
        }));
        assert_eq!(
            json_output(dir.path(), &["compile", "condition.json"]),
            json!({"query": {"bool": {
                "must": [{"terms": {"price": [10, 20]}}],
                "must_not": [{"ids": {"values": ["X1"]}}]
            }}})
        );
    }

    #[test]
    fn test_params_override_configuration() {
        let dir = project(&json!({
            "root": {"fields": {"name": {"simple": ["Fiets"]}}},
            "order": {"name": "asc"}
        }));
        assert_eq!(
            json_output(dir.path(), &["compile", "condition.json", "-p", "locale=nl"]),
            json!({
                "query": {"bool": {"must": [{"terms": {"name.nl": ["fiets"]}}]}},
                "sort": {"name.nl": {"order": "asc"}}
            })
        );
    }

    #[test]
    fn test_compact_output_is_one_line() {
        let dir = project(&json!({"order": {"seller": "desc"}}));
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .args(["compile", "condition.json", "--compact"])
            .assert()
            .success()
            .stdout("{\"sort\":{\"_score\":{\"order\":\"desc\"}}}\n");
    }

    #[test]
    fn test_reads_condition_from_stdin() {
        let dir = project(&json!({}));
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .args(["compile", "-", "--compact"])
            .write_stdin(r#"{"root": {"fields": {"price": {"simple": [1]}}}}"#)
            .assert()
            .success()
            .stdout(predicate::str::contains(r#"{"terms":{"price":[1]}}"#));
    }

    #[test]
    fn test_unknown_field_fails_with_hint() {
        let dir = project(&json!({"root": {"fields": {"colour": {"simple": ["red"]}}}}));
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .args(["compile", "condition.json"])
            .assert()
            .failure()
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("unknown field: colour"))
            .stderr(predicate::str::contains("hint:"));
    }

    #[test]
    fn test_invalid_condition_fails() {
        let dir = project(&json!({"filter": {}}));
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .args(["compile", "condition.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid condition"));
    }

    #[test]
    fn test_fails_without_fields() {
        let dir = temp_dir();
        fs::write(dir.path().join("condition.json"), "{}").unwrap();
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .args(["compile", "condition.json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("no fields defined"));
    }

    #[test]
    fn test_malformed_param_is_rejected() {
        let dir = project(&json!({}));
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .args(["compile", "condition.json", "--param", "locale"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("expected key=value"));
    }
}

mod fields {
    use super::*;

    #[test]
    fn test_lists_selected_mappings_as_json() {
        let dir = project(&json!({
            "root": {"fields": {"seller": {"simple": ["acme"]}}},
            "order": {"price": "asc"}
        }));
        assert_eq!(
            json_output(dir.path(), &["fields", "condition.json", "--json"]),
            json!([{
                "field": "seller",
                "property": "seller",
                "nested": [],
                "join": ["offer"],
                "preconditions": 0
            }])
        );
    }

    #[test]
    fn test_lists_mappings_as_text() {
        let dir = project(&json!({"root": {"fields": {"name": {"simple": ["x"]}}}}));
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .args(["fields", "condition.json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("name  name.en"));
    }
}

mod check {
    use super::*;

    #[test]
    fn test_succeeds_without_config() {
        let dir = temp_dir();
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("No configuration files found."));
    }

    #[test]
    fn test_succeeds_with_valid_config() {
        let dir = project(&json!({}));
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .success()
            .stdout(predicate::str::contains("No issues found."));
    }

    #[test]
    fn test_empty_config_warns() {
        let dir = temp_dir();
        fs::write(dir.path().join(".esq.toml"), "").unwrap();
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stdout(predicate::str::contains("no fields are defined"));
    }

    #[test]
    fn test_unresolved_placeholder_warns() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".esq.toml"),
            "[field.name]\nproperty = \"name.{locale}\"\n",
        )
        .unwrap();
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stdout(predicate::str::contains("placeholder '{locale}'"))
            .stdout(predicate::str::contains("Hints:"));
    }

    #[test]
    fn test_precondition_cycle_is_an_error() {
        let dir = temp_dir();
        fs::write(
            dir.path().join(".esq.toml"),
            r#"
[field.a]
property = "a"
[[field.a.precondition]]
field = "b"
value = 1

[field.b]
property = "b"
[[field.b.precondition]]
field = "a"
value = 1
"#,
        )
        .unwrap();
        esq_with_home(dir.path())
            .current_dir(dir.path())
            .arg("check")
            .assert()
            .failure()
            .stderr(predicate::str::contains("precondition cycle: a -> b -> a"));
    }
}

mod init {
    use super::*;

    #[test]
    fn test_creates_config_file() {
        let dir = temp_dir();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();

        esq_with_home(dir.path())
            .current_dir(&project)
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Configuration written:"));

        let contents = fs::read_to_string(project.join(".esq.toml")).unwrap();
        assert!(contents.contains("# [field.price]"));
    }

    #[test]
    fn test_fails_if_config_exists() {
        let dir = temp_dir();
        fs::write(dir.path().join(".esq.toml"), "existing").unwrap();

        esq_with_home(dir.path())
            .current_dir(dir.path())
            .args(["init"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--force"));
    }

    #[test]
    fn test_force_overwrites_existing() {
        let dir = temp_dir();
        let project = dir.path().join("project");
        fs::create_dir(&project).unwrap();
        fs::write(project.join(".esq.toml"), "not = [valid").unwrap();

        esq_with_home(dir.path())
            .current_dir(&project)
            .args(["init", "--force"])
            .assert()
            .success();

        let contents = fs::read_to_string(project.join(".esq.toml")).unwrap();
        assert!(contents.contains("# [field."));
    }

    #[test]
    fn test_global_writes_to_home() {
        let home = temp_dir();
        let cwd = temp_dir();

        esq_with_home(home.path())
            .current_dir(cwd.path())
            .args(["init", "--global"])
            .assert()
            .success();

        assert!(home.path().join(".esq.toml").exists());
        assert!(!cwd.path().join(".esq.toml").exists());
    }
}
