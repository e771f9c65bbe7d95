use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn run_dly(config_dir: &Path, words: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_dly"))
        .arg("--config-dir")
        .arg(config_dir)
        .args(words)
        .env_remove("DLY_DEBUG")
        .env_remove("DLY_LOG_DIR")
        .env_remove("DLY_CONFIG_DIR")
        .output()
        .unwrap()
}

fn write_config(config_dir: &Path, notes_dir: &Path, backup_dir: &Path) {
    let body = format!(
        "DailyNotesPath: {}\n\
         FilenameFormat: journal\n\
         AddTimestamp: false\n\
         AppendHashtag: cli\n\
         ShowNotificationOnSuccess: false\n\
         ShowNotificationOnNewVersion: false\n\
         BackupDirectories:\n  - {}\n",
        notes_dir.display(),
        backup_dir.display()
    );
    fs::write(config_dir.join("dly.yml"), body).unwrap();
}

#[test]
fn fresh_config_dir_exits_with_status_2() {
    let config = tempfile::tempdir().unwrap();

    let output = run_dly(config.path(), &["first", "entry"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(config.path().join("dly.yml").is_file());
}

#[test]
fn missing_notes_directory_exits_with_status_1() {
    let config = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    let notes = scratch.path().join("not-there");
    write_config(config.path(), &notes, scratch.path());

    let output = run_dly(config.path(), &["lost", "entry"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(!notes.exists());
}

#[test]
fn successful_append_exits_with_status_0() {
    let config = tempfile::tempdir().unwrap();
    let notes = tempfile::tempdir().unwrap();
    let scratch = tempfile::tempdir().unwrap();
    write_config(config.path(), notes.path(), scratch.path());

    let output = run_dly(config.path(), &["standup", "done"]);

    assert_eq!(output.status.code(), Some(0));
    assert_eq!(
        fs::read(notes.path().join("journal.md")).unwrap(),
        b"- standup done #cli\n"
    );
    assert_eq!(
        fs::read(scratch.path().join("journal.md")).unwrap(),
        b"- standup done #cli\n"
    );
}
