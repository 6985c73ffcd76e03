use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn educenter(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("educenter").unwrap();
    cmd.env("EDUCENTER_DATA_DIR", dir.path()).env_remove("RUST_LOG");
    cmd
}

fn first_id(dir: &TempDir, collection: &str) -> String {
    let raw = std::fs::read_to_string(dir.path().join("data").join(format!("{}.json", collection)))
        .unwrap();
    let records: Vec<serde_json::Value> = serde_json::from_str(&raw).unwrap();
    records[0]["id"].as_str().unwrap().to_string()
}

#[test]
fn init_seeds_default_subjects() {
    let dir = TempDir::new().unwrap();

    educenter(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cờ Vua"));

    assert!(dir.path().join("settings.json").exists());
    assert!(dir.path().join("data").join("subjects.json").exists());
}

#[test]
fn add_update_show_delete_student() {
    let dir = TempDir::new().unwrap();

    educenter(&dir)
        .args(["add", "students", "--set", "name=An", "--set", "parentPhone=0901234567"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created students record"));

    let id = first_id(&dir, "students");

    educenter(&dir)
        .args(["update", "students", &id, "--set", "parentPhone=0907654321"])
        .assert()
        .success();

    educenter(&dir)
        .args(["show", "students", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("0907654321"))
        .stdout(predicate::str::contains("An"));

    educenter(&dir)
        .args(["delete", "students", &id])
        .assert()
        .success();

    educenter(&dir)
        .args(["list", "students"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No students found."));
}

#[test]
fn unknown_collection_fails() {
    let dir = TempDir::new().unwrap();

    educenter(&dir)
        .args(["list", "invoices"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown collection: invoices"));
}

#[test]
fn subject_in_use_cannot_be_deleted() {
    let dir = TempDir::new().unwrap();

    educenter(&dir)
        .args(["add", "registrations", "--set", "subjectId=subj_1"])
        .assert()
        .success();

    educenter(&dir)
        .args(["delete", "subjects", "subj_1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("still referenced"));
}

#[test]
fn backup_create_and_restore_requires_force() {
    let dir = TempDir::new().unwrap();

    educenter(&dir)
        .args(["add", "students", "--set", "name=An"])
        .assert()
        .success();
    educenter(&dir)
        .args(["backup", "create"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup created"));
    educenter(&dir)
        .args(["add", "students", "--set", "name=Binh"])
        .assert()
        .success();

    educenter(&dir)
        .args(["backup", "restore", "latest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--force"));

    educenter(&dir)
        .args(["backup", "restore", "latest", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restore complete!"));

    educenter(&dir)
        .args(["list", "students"])
        .assert()
        .success()
        .stdout(predicate::str::contains("An"))
        .stdout(predicate::str::contains("Binh").not());
}

#[test]
fn backup_file_export_and_import() {
    let source = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let file = source.path().join("backup.json");

    educenter(&source)
        .args(["add", "parents", "--set", "name=Lan"])
        .assert()
        .success();
    educenter(&source)
        .args(["backup", "export"])
        .arg(&file)
        .assert()
        .success();

    educenter(&target)
        .args(["backup", "import"])
        .arg(&file)
        .arg("--force")
        .assert()
        .success()
        .stdout(predicate::str::contains("Import complete!"));

    educenter(&target)
        .args(["list", "parents"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Lan"));
}

#[test]
fn settings_get_and_set() {
    let dir = TempDir::new().unwrap();

    educenter(&dir)
        .args(["setting", "set", "centerInfo", r#"{"name":"Sao Mai"}"#])
        .assert()
        .success();

    educenter(&dir)
        .args(["setting", "get", "centerInfo"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sao Mai"));

    educenter(&dir)
        .args(["setting", "set", "autoBackupEnabled", "maybe"])
        .assert()
        .failure();
}

#[test]
fn auto_backup_written_on_exit() {
    let dir = TempDir::new().unwrap();

    educenter(&dir)
        .args(["setting", "set", "autoBackupEnabled", "true"])
        .assert()
        .success();
    educenter(&dir)
        .args(["add", "students", "--set", "name=An"])
        .assert()
        .success();

    educenter(&dir)
        .args(["backup", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("auto"));
}

#[test]
fn export_csv() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("subjects.csv");

    educenter(&dir)
        .args(["export", "csv", "subjects"])
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 4 subjects record(s)"));

    let csv = std::fs::read_to_string(&file).unwrap();
    assert!(csv.starts_with("id,icon,name,defaultFee"));
}

#[test]
fn clear_requires_force() {
    let dir = TempDir::new().unwrap();

    educenter(&dir)
        .args(["add", "students", "--set", "name=An"])
        .assert()
        .success();

    educenter(&dir)
        .arg("clear")
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"));

    educenter(&dir)
        .args(["clear", "--force"])
        .assert()
        .success();

    educenter(&dir)
        .args(["list", "students"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No students found."));
}
