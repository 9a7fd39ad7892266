//! The `hal-resource` binary.

use assert_cmd::Command;
use hal_resource::test_utils::fixtures;
use predicates::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use tempfile::TempDir;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("resources.toml"), fixtures::HIERARCHY_TOML).unwrap();
        Self {
            dir,
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.path(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hal-resource").unwrap();
        cmd.current_dir(self.dir.path())
            .env_remove("HAL_RESOURCE_DEFINITIONS")
            .env_remove("HAL_RESOURCE_URL_PREFIX")
            .env_remove("HAL_RESOURCE_API_PREFIX")
            .env_remove("HAL_RESOURCE_VERSION")
            .env_remove("RUST_LOG");
        cmd
    }
}

fn stdout_json(output: &std::process::Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn options_prints_discovery_document() {
    let project = Project::new();
    let output = project.cmd().args(["options", "--full"]).output().unwrap();
    assert!(output.status.success());

    let document = stdout_json(&output);
    assert_eq!(document["_mediaTypes"][0], "application/hal+json");
    assert_eq!(document["_versions"], serde_json::json!(["1", "2"]));
    assert_eq!(document["_links"]["child:change"]["method"], "PUT");
}

#[test]
fn options_honours_environment_and_flags() {
    let project = Project::new();
    let output = project
        .cmd()
        .env("HAL_RESOURCE_API_PREFIX", "/env")
        .args(["options", "--url-prefix", "/mnt", "--exclude-children", "--compact"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let document = stdout_json(&output);
    assert_eq!(document["_links"]["parent:self"]["href"], "/mnt/env/parent/{id}");
    assert!(document["_links"].get("child:self").is_none());
}

#[test]
fn render_from_data_file() {
    let project = Project::new();
    let data = project.write("child.json", &fixtures::child_with_grandchildren().to_string());
    let output = project
        .cmd()
        .args(["render", "--resource", "child", "--action", "self", "--api-prefix", "/api", "--data"])
        .arg(&data)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body = stdout_json(&output);
    assert_eq!(body["_links"]["self"]["href"], "/api/parent/1/child/2");
    assert_eq!(body["_embedded"]["grandChildren"][2]["_links"]["self"]["href"], "/api/parent/1/child/2/grand/3");
    assert!(body["_embedded"]["grandChildren"][0]["_links"].get("delete").is_none());
}

#[test]
fn render_list_from_stdin_at_version_two() {
    let project = Project::new();
    let output = project
        .cmd()
        .args(["render", "--resource", "parent", "--api-version", "2", "--origin-href", "/parent"])
        .args(["--origin-method", "get"])
        .write_stdin(r#"[{"id": 1, "title": "one", "secret": "x"}]"#)
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body = stdout_json(&output);
    assert_eq!(body["_origin"], serde_json::json!({"href": "/parent", "method": "GET"}));
    assert_eq!(body["parents"][0]["title"], "one");
    assert!(body["parents"][0].get("secret").is_none());
}

#[test]
fn render_unknown_action_suggests() {
    let project = Project::new();
    project
        .cmd()
        .args(["render", "--resource", "parent", "--action", "slef"])
        .write_stdin("{}")
        .assert()
        .failure()
        .stderr(predicate::str::contains("slef").and(predicate::str::contains("self")));
}

#[test]
fn validate_reports_success() {
    let project = Project::new();
    project
        .cmd()
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("✓").and(predicate::str::contains("Valid definitions")));
}

#[test]
fn validate_reports_broken_reference() {
    let project = Project::new();
    let path = project.write(
        "broken.json",
        r#"{"resources": {"parent": {"actions": {
            "self": {"method": "GET", "url": "/parent/:id", "render": {"resource": "ghost", "action": "self"}}
        }}}}"#,
    );
    project
        .cmd()
        .args(["validate", "-d"])
        .arg(&path)
        .assert()
        .failure()
        .stdout(predicate::str::contains("✗").and(predicate::str::contains("ghost:self")));
}

#[test]
fn validate_json_output() {
    let project = Project::new();
    let output = project.cmd().args(["validate", "--format", "json"]).output().unwrap();
    assert!(output.status.success());
    let results = stdout_json(&output);
    assert_eq!(results["valid"], true);
    assert_eq!(results["resources"], 3);
    assert_eq!(results["versions"], serde_json::json!([1, 2]));
}

#[test]
fn missing_definitions_fail() {
    let project = Project::new();
    project
        .cmd()
        .args(["options", "-d", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load definitions from nope.yaml"))
        .stderr(predicate::str::contains("Caused by"));
}
