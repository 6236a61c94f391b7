//! Integration tests for the packgen binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn write(root: &Path, path: &str, content: &str) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

fn packgen(project: &Path, work: &Path) -> Command {
    let mut cmd = Command::cargo_bin("packgen").unwrap();
    cmd.current_dir(work)
        .env("ROOT_DIR", project)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_generates_and_reports_summary() {
    let temp_dir = TempDir::new().unwrap();
    let work = temp_dir.path();
    write(work, "BP/items/sword.ts", "export default { id: \"sword\" };");
    write(
        work,
        "RP/colors.ts",
        "export default [(c: string) => c, (c: string) => ({ c }), [\"red\", \"blue\"]];",
    );

    packgen(work, work)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 2 file(s)"))
        .stdout(predicate::str::contains("BP/items/sword.ts -> BP/items/sword.json"))
        .stdout(predicate::str::contains("RP/colors.ts (2/2) -> RP/blue.json"))
        .stdout(predicate::str::contains("Generated 3 JSON file(s)."));

    assert_eq!(
        std::fs::read_to_string(work.join("BP/items/sword.json")).unwrap(),
        "{\n    \"id\": \"sword\"\n}"
    );
    assert!(work.join("RP/red.json").exists());
}

#[test]
fn test_settings_argument() {
    let temp_dir = TempDir::new().unwrap();
    let work = temp_dir.path();
    write(work, "gen/a.ts", "export default { a: [1, 2] };");
    write(work, "BP/b.ts", "export default { b: 1 };");

    packgen(work, work)
        .arg(r#"{"include": "./packs/gen/*.ts", "pretty": false}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 1 JSON file(s)."));

    assert_eq!(
        std::fs::read_to_string(work.join("gen/a.json")).unwrap(),
        r#"{"a":[1,2]}"#
    );
    assert!(!work.join("BP/b.json").exists());
}

#[test]
fn test_working_dir_flag() {
    let temp_dir = TempDir::new().unwrap();
    let work = temp_dir.path().join("tmp");
    write(&work, "BP/a.ts", "export default {};");

    packgen(temp_dir.path(), temp_dir.path())
        .arg("--working-dir")
        .arg(&work)
        .assert()
        .success();

    assert!(work.join("BP/a.json").exists());
}

#[test]
fn test_no_templates() {
    let temp_dir = TempDir::new().unwrap();

    packgen(temp_dir.path(), temp_dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No .ts templates found."))
        .stdout(predicate::str::contains("Generated").not());
}

#[test]
fn test_missing_config_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let work = temp_dir.path();
    write(work, "BP/a.ts", "export default {};");

    packgen(work, work)
        .assert()
        .success()
        .stdout(predicate::str::contains("config.json not found in project root"));
}

#[test]
fn test_failure_exits_non_zero() {
    let temp_dir = TempDir::new().unwrap();
    let work = temp_dir.path();
    write(work, "BP/a.ts", "export default \"not an object\";");

    packgen(work, work)
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Generation failed"))
        .stdout(predicate::str::contains("Unsupported template in BP/a.ts"));

    assert!(!work.join("BP/a.json").exists());
}

#[test]
fn test_invalid_settings_json() {
    let temp_dir = TempDir::new().unwrap();

    packgen(temp_dir.path(), temp_dir.path())
        .arg("{not json")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("Invalid settings"));
}

#[test]
fn test_root_dir_is_required() {
    let temp_dir = TempDir::new().unwrap();

    Command::cargo_bin("packgen")
        .unwrap()
        .current_dir(temp_dir.path())
        .env_remove("ROOT_DIR")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::contains("ROOT_DIR environment variable not set"));
}

#[test]
fn test_rust_log_can_quiet_progress() {
    let temp_dir = TempDir::new().unwrap();
    let work = temp_dir.path();
    write(work, "BP/a.ts", "export default { a: 1 };");

    packgen(work, work)
        .env("RUST_LOG", "warn")
        .assert()
        .success()
        .stdout(predicate::str::contains("Found").not())
        .stdout(predicate::str::contains("Generated").not());

    assert!(work.join("BP/a.json").exists());
}
