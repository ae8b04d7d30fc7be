use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use insta_cmd::get_cargo_bin;
use predicates::prelude::*;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn projdoc_cmd() -> Command {
    let mut cmd = Command::new(get_cargo_bin("projdoc"));
    cmd.env("NO_COLOR", "1").env_remove("PROJECT_ROOT");
    cmd
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

#[test]
fn show_meta_as_json_reads_poetry_table() -> TestResult {
    let tmp = tempfile::tempdir()?;
    write(
        tmp.path(),
        "pyproject.toml",
        "[tool.poetry]\nname = \"poetic\"\nversion = \"2.1.0\"\nauthors = [\"Carol <carol@example.com>\"]\n\n[tool.poetry.dependencies]\npython = \"^3.11\"\nhttpx = \"*\"\n",
    );

    projdoc_cmd()
        .arg("show")
        .arg("-i")
        .arg(tmp.path())
        .arg("-f")
        .arg("json")
        .arg("meta")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"name\": \"poetic\""))
        .stdout(predicate::str::contains("\"version\": \"2.1.0\""))
        .stdout(predicate::str::contains("\"author\": \"Carol\""))
        .stdout(predicate::str::contains("\"httpx\""))
        .stdout(predicate::str::contains("\"python\"").not());
    Ok(())
}

#[test]
fn show_tree_prints_connectors() -> TestResult {
    let tmp = tempfile::tempdir()?;
    write(tmp.path(), "a.py", "");
    write(tmp.path(), "src/b.py", "");
    write(tmp.path(), ".env", "");

    projdoc_cmd()
        .arg("show")
        .arg("-i")
        .arg(tmp.path())
        .arg("tree")
        .assert()
        .success()
        .stdout(".\n├── a.py\n└── src\n    └── b.py\n");
    Ok(())
}

#[test]
fn show_files_lists_relative_paths_in_walk_order() -> TestResult {
    let tmp = tempfile::tempdir()?;
    write(tmp.path(), "z.py", "");
    write(tmp.path(), "lib/a.py", "");
    write(tmp.path(), "lib/skip.txt", "");
    write(tmp.path(), "poetry.lock", "");

    projdoc_cmd()
        .arg("show")
        .arg("-i")
        .arg(tmp.path())
        .arg("-e")
        .arg("py")
        .arg("files")
        .assert()
        .success()
        .stdout("z.py\nlib/a.py\n");
    Ok(())
}

#[test]
fn invalid_exclude_pattern_is_rejected() -> TestResult {
    let tmp = tempfile::tempdir()?;

    projdoc_cmd()
        .arg("show")
        .arg("-i")
        .arg(tmp.path())
        .arg("-x")
        .arg("a[")
        .arg("files")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Error:"));
    Ok(())
}

#[test]
fn config_prints_default_toml() -> TestResult {
    projdoc_cmd()
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("[general]"))
        .stdout(predicate::str::contains("output_file = \"project.md\""))
        .stdout(predicate::str::contains("[filters]"));
    Ok(())
}

#[test]
fn config_save_writes_default_file() -> TestResult {
    let tmp = tempfile::tempdir()?;

    projdoc_cmd()
        .arg("config")
        .arg("-i")
        .arg(tmp.path())
        .arg("--save")
        .assert()
        .success();

    let saved = fs::read_to_string(tmp.path().join(".projdoc/projdoc.toml"))?;
    assert!(saved.contains("[output]"));

    projdoc_cmd()
        .arg("--quiet")
        .arg("config")
        .arg("-i")
        .arg(tmp.path())
        .arg("--save")
        .assert()
        .failure();
    Ok(())
}

#[test]
fn completion_emits_script() -> TestResult {
    projdoc_cmd()
        .arg("completion")
        .arg("--shell")
        .arg("bash")
        .assert()
        .success()
        .stdout(predicate::str::contains("projdoc"));

    projdoc_cmd()
        .arg("completion")
        .arg("--shell")
        .arg("tcsh")
        .assert()
        .code(5);
    Ok(())
}
