//! End-to-end tests for the `envmatrix` binary.

mod common;

use common::TestContext;
use predicates::prelude::*;

const RUNNABLE_CONFIG: &str = r#"
[tox]
envlist = ok, broken

[testenv]
changedir = {toxinidir}/out/{envname}
setenv = GREETING = hello {envname}
commands =
    - false
    sh -c 'echo "$GREETING" {posargs} > greeting.txt'

[testenv:broken]
commands =
    false
    touch never.txt
"#;

#[test]
fn list_prints_envlist_then_sections() {
    let ctx = TestContext::with_sample_config();

    ctx.cli()
        .arg("list")
        .assert()
        .success()
        .stdout(
            "py37-offline\npy37-online\npy38-offline\npy38-online\npy37-devdeps\nbuild_docs\nfigure\nconda\n",
        );
}

#[test]
fn list_describe_shows_substituted_descriptions() {
    let ctx = TestContext::with_sample_config();

    ctx.cli()
        .args(["l", "--describe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("py38-online  -> run the py38-online test suite"))
        .stdout(predicate::str::contains("build_docs   -> build the Sphinx documentation"));
}

#[test]
fn show_renders_json_by_default() {
    let ctx = TestContext::with_sample_config();

    let output = ctx.cli().args(["show", "build_docs"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["name"], "build_docs");
    assert_eq!(value["working_dir"], ctx.canonical_work_dir().display().to_string());
    assert_eq!(value["extras"], serde_json::json!(["all", "docs"]));
    assert_eq!(value["setenv"], serde_json::json!({}));
    assert_eq!(value["commands"][0]["line"], "sphinx-build docs docs/_build/html -W -b html");
}

#[test]
fn show_renders_toml_and_yaml() {
    let ctx = TestContext::with_sample_config();

    let output = ctx.cli().args(["show", "py37-online", "--format", "toml"]).output().unwrap();
    assert!(output.status.success());
    let value: toml::Value = toml::from_str(&String::from_utf8_lossy(&output.stdout)).unwrap();
    assert_eq!(value["basepython"].as_str(), Some("python3.7"));
    assert_eq!(value["setenv"]["MPLBACKEND"].as_str(), Some("agg"));

    ctx.cli()
        .args(["s", "py37-devdeps", "-f", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: py37-devdeps"))
        .stdout(predicate::str::contains("git+https://github.com/astropy/astropy"))
        .stdout(predicate::str::contains("PIP_EXTRA_INDEX_URL"));
}

#[test]
fn show_uses_settings_default_format() {
    let ctx = TestContext::with_sample_config();
    ctx.write_file("envmatrix.toml", "default_format = \"yaml\"\n");

    ctx.cli()
        .args(["show", "figure"])
        .assert()
        .success()
        .stdout(predicate::str::contains("basepython: python3.7"))
        .stdout(predicate::str::contains("astropy==4.0.1"));
}

#[test]
fn show_unknown_profile_fails() {
    let ctx = TestContext::with_sample_config();

    ctx.cli()
        .args(["show", "py39"])
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Profile 'py39' not found"))
        .stderr(predicate::str::contains("build_docs"));
}

#[test]
fn commands_substitutes_posargs() {
    let ctx = TestContext::with_sample_config();
    let root = ctx.canonical_work_dir();

    ctx.cli()
        .args(["commands", "py38-online", "--", "-k", "map"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("pip freeze --all --no-input\n"))
        .stdout(predicate::str::contains(format!(
            "--cov-config={}/setup.cfg {}/docs --reruns 2 --timeout=180 --remote-data=any -k map\n",
            root.display(),
            root.display()
        )));
}

#[test]
fn missing_config_reports_error() {
    let ctx = TestContext::new();

    ctx.cli()
        .arg("list")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error: Matrix config not found"));
}

#[test]
fn config_flag_and_env_var_select_the_file() {
    let ctx = TestContext::new();
    ctx.write_file("ci/matrix.ini", "[tox]\nenvlist = lint\n");

    ctx.cli().args(["--config", "ci/matrix.ini", "list"]).assert().success().stdout("lint\n");
    ctx.cli()
        .env("ENVMATRIX_CONFIG", "ci/matrix.ini")
        .arg("list")
        .assert()
        .success()
        .stdout("lint\n");
}

#[test]
fn check_passes_on_sample_config() {
    let ctx = TestContext::with_sample_config();

    ctx.cli()
        .args(["check", "--strict"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed."));
}

#[test]
fn check_strict_turns_warnings_into_exit_code_two() {
    let ctx = TestContext::new();
    ctx.write_config("[tox]\nenvlist = py37\n[testenv]\nusedevelop = true\n");

    ctx.cli()
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("[WARN]"))
        .stderr(predicate::str::contains("unknown key 'usedevelop'"))
        .stderr(predicate::str::contains("Check completed with 1 warning(s)."));

    ctx.cli()
        .args(["c", "--strict"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Check failed: 0 error(s), 1 warning(s) found."));
}

#[test]
fn check_reports_errors() {
    let ctx = TestContext::new();
    ctx.write_config(
        "[tox]\nenvlist = py37\n[testenv]\ncommands = pytest {envtmpdir}\n[testenv:docs]\n[testenv:docs]\n",
    );

    ctx.cli()
        .arg("check")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[ERROR]"))
        .stderr(predicate::str::contains("Unknown placeholder '{envtmpdir}'"))
        .stderr(predicate::str::contains("Duplicate profile 'testenv:docs'"));
}

#[test]
fn matrix_exports_filtered_json() {
    let ctx = TestContext::with_sample_config();

    let output = ctx.cli().args(["matrix", "--filter", "py38"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let include = value["include"].as_array().unwrap();
    assert_eq!(include.len(), 2);
    assert_eq!(include[0]["env"], "py38-offline");
    assert_eq!(include[0]["basepython"], "python3.8");
    assert_eq!(include[1]["description"], "run the py38-online test suite");
}

#[test]
fn run_dry_run_prints_commands_without_running() {
    let ctx = TestContext::with_sample_config();

    ctx.cli()
        .args(["run", "build_docs,figure", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("build_docs:\n  sphinx-build docs docs/_build/html -W -b html\n"))
        .stdout(predicate::str::contains("figure:\n  pip freeze --all --no-input\n"));

    assert!(!ctx.work_dir().join(".tmp").exists());
}

#[cfg(unix)]
#[test]
fn run_executes_profiles_and_reports_failures() {
    let ctx = TestContext::new();
    ctx.write_config(RUNNABLE_CONFIG);

    ctx.cli()
        .args(["run", "ALL", "--", "again"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✅ ok: commands succeeded"))
        .stdout(predicate::str::contains("❌ broken: 'false' failed with exit code 1"));

    let greeting = std::fs::read_to_string(ctx.work_dir().join("out/ok/greeting.txt")).unwrap();
    assert_eq!(greeting, "hello ok again\n");
    assert!(ctx.work_dir().join("out/broken").is_dir());
    assert!(!ctx.work_dir().join("out/broken/never.txt").exists());
}

#[cfg(unix)]
#[test]
fn run_single_profile_succeeds() {
    let ctx = TestContext::new();
    ctx.write_config(RUNNABLE_CONFIG);

    ctx.cli().args(["r", "ok"]).assert().success();
    assert!(ctx.work_dir().join("out/ok/greeting.txt").is_file());
    assert!(!ctx.work_dir().join("out/broken").exists());
}

#[cfg(unix)]
#[test]
fn run_survives_missing_programs() {
    let ctx = TestContext::new();
    ctx.write_config(
        "[tox]\nenvlist = tolerant, strict, after\n\n[testenv]\nchangedir = {toxinidir}\ncommands = touch {envname}.txt\n\n[testenv:tolerant]\ncommands =\n    - envmatrix-no-such-binary\n    touch tolerant.txt\n\n[testenv:strict]\ncommands =\n    envmatrix-no-such-binary --flag\n    touch strict.txt\n",
    );

    ctx.cli()
        .args(["run", "ALL"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("✅ tolerant: commands succeeded"))
        .stdout(predicate::str::contains(
            "❌ strict: 'envmatrix-no-such-binary --flag' failed with exit code 127",
        ))
        .stdout(predicate::str::contains("✅ after: commands succeeded"))
        .stderr(predicate::str::contains("Failed to start 'envmatrix-no-such-binary'"));

    assert!(ctx.work_dir().join("tolerant.txt").is_file());
    assert!(!ctx.work_dir().join("strict.txt").exists());
    assert!(ctx.work_dir().join("after.txt").is_file());
}

#[test]
fn run_requires_a_profile() {
    let ctx = TestContext::with_sample_config();
    ctx.cli().arg("run").assert().failure().code(2);
}
