use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TEMPLATE: &str = r#"name: {{ package.name }} CI
on:
  push:
    branches: [{{ workspace.default_branch }}]
    paths:
      - "{{ package.path }}/**"
jobs:
  test:
    runs-on: ubuntu-latest
    steps:
      - uses: actions/checkout@v4
      - name: Install
        run: uv sync
{% for step in package.custom_steps %}      - name: {{ step.name }}
        run: {{ step.run }}
{% endfor %}{% if package.typechecker %}      - name: Typecheck
        run: uv run {{ package.typechecker }} {{ package.package_name }}
{% endif %}{% if package.generate_standard_test_step %}      - name: Test
        run: uv run pytest {{ package.path }}
{% endif %}"#;

fn wfgen(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("wfgen").unwrap();
    cmd.current_dir(dir.path()).env("WFGEN_ROOT", dir.path());
    cmd
}

fn init_workspace(dir: &TempDir) {
    std::fs::write(
        dir.path().join("pyproject.toml"),
        "[project]\nname = \"ws\"\n\n[tool.uv.workspace]\nmembers = [\"libs/*\"]\n\n\
         [tool.wfgen]\ndefault_template_type = \"lib\"\n",
    )
    .unwrap();
    let tdir = dir.path().join(".github/workflow-templates");
    std::fs::create_dir_all(&tdir).unwrap();
    std::fs::write(tdir.join("lib.template.yml"), TEMPLATE).unwrap();
}

fn write_pkg(dir: &TempDir, rel: &str, pyproject: &str) {
    let pkg = dir.path().join(rel);
    std::fs::create_dir_all(&pkg).unwrap();
    std::fs::write(pkg.join("pyproject.toml"), pyproject).unwrap();
}

fn workflow(dir: &TempDir, filename: &str) -> PathBuf {
    dir.path().join(".github/workflows").join(filename)
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

// ---------------------------------------------------------------------------
// Generation basics
// ---------------------------------------------------------------------------

#[test]
fn generates_workflow_for_opted_in_package_only() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );
    write_pkg(&dir, "libs/bar", "[project]\nname = \"bar\"\n");

    wfgen(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("created lib-libs-foo.yml"));

    assert!(workflow(&dir, "lib-libs-foo.yml").exists());
    let entries: Vec<_> = std::fs::read_dir(dir.path().join(".github/workflows"))
        .unwrap()
        .collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn generated_file_carries_marker_and_rendered_content() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\ntypechecker = \"mypy\"\n",
    );

    wfgen(&dir).assert().success();

    let content = read(&workflow(&dir, "lib-libs-foo.yml"));
    assert!(content.starts_with("# This file was automatically generated by wfgen"));
    assert!(content.contains("name: foo CI"));
    assert!(content.contains("- \"libs/foo/**\""));
    assert!(content.contains("uv run mypy foo"));
}

#[test]
fn second_run_reports_no_changes() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );

    wfgen(&dir).assert().success();
    let before = read(&workflow(&dir, "lib-libs-foo.yml"));

    let output = wfgen(&dir).arg("--json").assert().success();
    let summary: serde_json::Value =
        serde_json::from_slice(&output.get_output().stdout).unwrap();
    assert_eq!(summary["sync"]["created"].as_array().unwrap().len(), 0);
    assert_eq!(summary["sync"]["updated"].as_array().unwrap().len(), 0);
    assert_eq!(summary["sync"]["deleted"].as_array().unwrap().len(), 0);
    assert_eq!(summary["sync"]["unchanged"].as_array().unwrap().len(), 1);

    assert_eq!(read(&workflow(&dir, "lib-libs-foo.yml")), before);
}

// ---------------------------------------------------------------------------
// Staleness
// ---------------------------------------------------------------------------

#[test]
fn opting_out_deletes_the_stale_workflow() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );
    write_pkg(
        &dir,
        "libs/bar",
        "[project]\nname = \"bar\"\n\n[tool.wfgen]\ngenerate = true\n",
    );
    wfgen(&dir).assert().success();

    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = false\n",
    );
    wfgen(&dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("deleted lib-libs-foo.yml"));

    assert!(!workflow(&dir, "lib-libs-foo.yml").exists());
    assert!(workflow(&dir, "lib-libs-bar.yml").exists());
}

#[test]
fn deleting_the_package_directory_deletes_the_workflow() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );
    wfgen(&dir).assert().success();
    assert!(workflow(&dir, "lib-libs-foo.yml").exists());

    std::fs::remove_dir_all(dir.path().join("libs/foo")).unwrap();
    wfgen(&dir).assert().success();
    assert!(!workflow(&dir, "lib-libs-foo.yml").exists());
}

#[test]
fn hand_written_workflows_survive() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let wdir = dir.path().join(".github/workflows");
    std::fs::create_dir_all(&wdir).unwrap();
    std::fs::write(wdir.join("release.yml"), "name: manual release\n").unwrap();

    wfgen(&dir).assert().success();
    assert!(wdir.join("release.yml").exists());
}

// ---------------------------------------------------------------------------
// Failure isolation & strict mode
// ---------------------------------------------------------------------------

#[test]
fn bad_custom_steps_fail_that_package_but_not_others() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/bar",
        "[project]\nname = \"bar\"\n\n[tool.wfgen]\ngenerate = true\n",
    );
    wfgen(&dir).assert().success();

    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n\
         custom_steps = \"- name: [broken\"\n",
    );
    wfgen(&dir)
        .assert()
        .failure()
        .stdout(predicate::str::contains("libs/foo"))
        .stdout(predicate::str::contains("custom_steps"));

    // The unrelated package's file is untouched and still present.
    assert!(workflow(&dir, "lib-libs-bar.yml").exists());
}

#[test]
fn failing_package_does_not_lose_its_workflow() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );
    wfgen(&dir).assert().success();
    assert!(workflow(&dir, "lib-libs-foo.yml").exists());

    // Still opted in, but the metadata no longer parses. The run fails
    // and the previously generated file stays in place.
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n\
         custom_steps = \"- name: [broken\"\n",
    );
    wfgen(&dir).assert().failure();
    assert!(workflow(&dir, "lib-libs-foo.yml").exists());
}

#[test]
fn strict_mode_writes_nothing_on_failure() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[tool.wfgen]\ngenerate = true\ncustom_steps = \"- name: [broken\"\n",
    );
    write_pkg(
        &dir,
        "libs/bar",
        "[project]\nname = \"bar\"\n\n[tool.wfgen]\ngenerate = true\n",
    );

    wfgen(&dir)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(predicate::str::contains("custom_steps"));

    assert!(!dir.path().join(".github/workflows").exists());
}

#[test]
fn missing_template_fails_loudly() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n\
         template_type = \"missing\"\n",
    );

    wfgen(&dir)
        .assert()
        .failure()
        .stdout(predicate::str::contains("missing"));
}

// ---------------------------------------------------------------------------
// Workspace root handling
// ---------------------------------------------------------------------------

#[test]
fn fails_without_workspace_marker() {
    let dir = TempDir::new().unwrap();
    // No pyproject.toml at all.
    wfgen(&dir)
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("not a workspace root"));
}

#[test]
fn explicit_root_flag_overrides_cwd() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );

    let elsewhere = TempDir::new().unwrap();
    Command::cargo_bin("wfgen")
        .unwrap()
        .current_dir(elsewhere.path())
        .arg("--root")
        .arg(dir.path())
        .assert()
        .success();
    assert!(workflow(&dir, "lib-libs-foo.yml").exists());
}

// ---------------------------------------------------------------------------
// Check mode
// ---------------------------------------------------------------------------

#[test]
fn check_mode_fails_when_out_of_date_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );

    wfgen(&dir)
        .arg("--check")
        .assert()
        .failure()
        .stdout(predicate::str::contains("would create lib-libs-foo.yml"));
    assert!(!dir.path().join(".github/workflows").exists());
}

#[test]
fn check_mode_passes_when_up_to_date() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );

    wfgen(&dir).assert().success();
    wfgen(&dir).arg("--check").assert().success();
}

// ---------------------------------------------------------------------------
// Multi-template variants
// ---------------------------------------------------------------------------

#[test]
fn suffix_templates_produce_extra_workflows() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    std::fs::write(
        dir.path()
            .join(".github/workflow-templates/lib.nightly.template.yml"),
        "name: {{ package.name }} nightly\n",
    )
    .unwrap();
    write_pkg(
        &dir,
        "libs/foo",
        "[project]\nname = \"foo\"\n\n[tool.wfgen]\ngenerate = true\n",
    );

    wfgen(&dir).assert().success();
    assert!(workflow(&dir, "lib-libs-foo.yml").exists());
    let nightly = workflow(&dir, "lib-nightly-libs-foo.yml");
    assert!(nightly.exists());
    assert!(read(&nightly).contains("name: foo nightly"));
}

// ---------------------------------------------------------------------------
// Custom steps ordering (end to end)
// ---------------------------------------------------------------------------

#[test]
fn custom_steps_render_in_order_between_install_and_test() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    let pyproject = r#"
[project]
name = "foo"

[tool.wfgen]
generate = true
custom_steps = """
- name: Lint
  run: ruff check
- name: Migrations
  run: alembic check
"""
"#;
    write_pkg(&dir, "libs/foo", pyproject);
    wfgen(&dir).assert().success();

    let content = read(&workflow(&dir, "lib-libs-foo.yml"));
    let install = content.find("name: Install").unwrap();
    let lint = content.find("name: Lint").unwrap();
    let migrations = content.find("name: Migrations").unwrap();
    let test = content.find("name: Test").unwrap();
    assert!(install < lint);
    assert!(lint < migrations);
    assert!(migrations < test);
}
