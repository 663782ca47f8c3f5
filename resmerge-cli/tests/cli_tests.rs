use indoc::indoc;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const MASTER: &str = indoc! {r#"
    <?xml version="1.0" encoding="utf-8"?>
    <!-- Comment1 with multiple words -->
    <resources>
        <string name="language" translatable="false">English</string>

        <!-- BEGIN NAMESPACE test1 -->
        <string name="word1">Your Drive</string>
        <string name="word2">Radar</string>
        <!-- END NAMESPACE test1 -->
    </resources>
"#};

const UPDATE: &str = indoc! {r#"
    <resources>
        <string name="word1">Votre Disque</string>
    </resources>
"#};

fn resmerge_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("resmerge"));
    cmd.env_remove("RUST_LOG");
    cmd
}

fn stdout_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stdout).to_string()
}

fn stderr_of(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}

struct Fixture {
    dir: TempDir,
    master: PathBuf,
    update: PathBuf,
}

fn fixture(update: &str) -> Fixture {
    let dir = TempDir::new().unwrap();
    let master = dir.path().join("res").join("values").join("strings.xml");
    let update_path = dir.path().join("translations").join("fr.xml");
    fs::create_dir_all(master.parent().unwrap()).unwrap();
    fs::create_dir_all(update_path.parent().unwrap()).unwrap();
    fs::write(&master, MASTER).unwrap();
    fs::write(&update_path, update).unwrap();
    Fixture {
        dir,
        master,
        update: update_path,
    }
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn test_merge_writes_next_to_master() {
    let fx = fixture(UPDATE);

    let out = resmerge_cmd()
        .args([arg(&fx.master), ",", arg(&fx.update), "-o", "%p-fr/%n"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    let written = fx.dir.path().join("res").join("values-fr").join("strings.xml");
    let merged = fs::read_to_string(&written).unwrap();
    assert!(merged.contains("<string name=\"word1\">Votre Disque</string>"));
    assert!(merged.contains("<string name=\"word2\">Radar</string>"));
    assert!(merged.contains("<!-- BEGIN NAMESPACE test1 -->"));
    assert!(stdout_of(&out).contains("(1 updates)"));

    // the master itself is not modified
    assert_eq!(fs::read_to_string(&fx.master).unwrap(), MASTER);
}

#[test]
fn test_merge_to_stdout() {
    let fx = fixture(UPDATE);

    let out = resmerge_cmd()
        .args([arg(&fx.master), ",", arg(&fx.update), "-o", "-"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    let stdout = stdout_of(&out);
    assert!(stdout.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n"));
    assert!(stdout.contains("Votre Disque"));
    assert!(!stdout.contains("Your Drive"));
    // summary goes to stderr when documents go to stdout
    assert!(stderr_of(&out).contains("updates: 1"));
}

#[test]
fn test_round_trip_without_updates() {
    let fx = fixture(UPDATE);

    let out = resmerge_cmd()
        .args([arg(&fx.master), "-o", "-"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert_eq!(stdout_of(&out), MASTER);
}

#[test]
fn test_no_updates_skips_output() {
    let fx = fixture(indoc! {r#"
        <resources>
            <string name="word2">Radar</string>
        </resources>
    "#});

    let out = resmerge_cmd()
        .args([arg(&fx.master), ",", arg(&fx.update), "-o", "%p-fr/%n"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert!(!fx.dir.path().join("res").join("values-fr").exists());

    let forced = resmerge_cmd()
        .args([
            arg(&fx.master),
            ",",
            arg(&fx.update),
            "-o",
            "%p-fr/%n",
            "--force",
        ])
        .output()
        .unwrap();
    assert!(forced.status.success());
    let written = fx.dir.path().join("res").join("values-fr").join("strings.xml");
    let forced_text = fs::read_to_string(written).unwrap();
    assert!(forced_text.contains("<string name=\"word1\">Your Drive</string>"));
    assert!(forced_text.contains("<string name=\"word2\">Radar</string>"));
}

#[test]
fn test_show_input_counts() {
    let fx = fixture(UPDATE);

    let out = resmerge_cmd()
        .args([arg(&fx.master), ",", arg(&fx.update), "--show-input"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    let stdout = stdout_of(&out);
    assert!(stdout.contains(&format!(
        "Parsed: {} rows=",
        fx.master.display()
    )));
    assert!(stdout.contains(" data=3 "));
    assert!(stdout.contains(&format!(
        "Parsed: {} updates=1 extras=0",
        fx.update.display()
    )));
}

#[test]
fn test_unmatched_key_is_warned() {
    let fx = fixture(indoc! {r#"
        <resources>
            <string name="word3">X</string>
        </resources>
    "#});

    let out = resmerge_cmd()
        .args([arg(&fx.master), ",", arg(&fx.update)])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    let stderr = stderr_of(&out);
    assert!(stderr.contains("extra: <string name=\"word3\">X</string>"));
    assert!(stdout_of(&out).contains("extras: 1"));
}

#[test]
fn test_directory_input_with_filters() {
    let fx = fixture(UPDATE);
    let res = fx.dir.path().join("res");
    fs::write(res.join("values").join("notes.txt"), "not xml").unwrap();
    fs::create_dir_all(res.join("values-de")).unwrap();
    fs::write(res.join("values-de").join("strings.xml"), MASTER).unwrap();

    let out = resmerge_cmd()
        .args([
            arg(&res),
            ",",
            arg(&fx.update),
            "--file-include",
            "*.xml",
            "--path-exclude",
            "*values-*",
            "--show-input",
        ])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    let stdout = stdout_of(&out);
    assert!(stdout.contains(&format!("Parsed: {} rows=", fx.master.display())));
    assert!(!stdout.contains("notes.txt"));
    assert!(!stdout.contains("values-de"));
    assert!(stdout.contains("documents: 1"));
}

#[test]
fn test_inputs_from_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let fx = fixture(UPDATE);
    let mut child = resmerge_cmd()
        .args(["-", "-o", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        let stdin = child.stdin.as_mut().unwrap();
        writeln!(stdin, "{}", fx.master.display()).unwrap();
        writeln!(stdin, ",").unwrap();
        writeln!(stdin, "{}", fx.update.display()).unwrap();
    }
    let out = child.wait_with_output().unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert!(stdout_of(&out).contains("Votre Disque"));
}

#[test]
fn test_custom_separator() {
    let fx = fixture(UPDATE);

    let out = resmerge_cmd()
        .args([
            arg(&fx.master),
            "::",
            arg(&fx.update),
            "--separator",
            "::",
            "-o",
            "-",
        ])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert!(stdout_of(&out).contains("Votre Disque"));
}

#[test]
fn test_report_json() {
    let fx = fixture(UPDATE);
    let report = fx.dir.path().join("reports").join("run.json");

    let out = resmerge_cmd()
        .args([
            arg(&fx.master),
            ",",
            arg(&fx.update),
            "-o",
            "%p-fr/%n",
            "--report-json",
            arg(&report),
        ])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["summary"]["updates"], 1);
    assert_eq!(value["summary"]["parsed_files"], 2);
    assert_eq!(value["outputs"][0]["status"], "written");
    assert_eq!(value["files"][0]["master"], true);
}

#[test]
fn test_missing_input_is_counted() {
    let fx = fixture(UPDATE);
    let missing = fx.dir.path().join("missing.xml");

    let out = resmerge_cmd()
        .args([arg(&fx.master), arg(&missing)])
        .output()
        .unwrap();

    // per-file failures do not fail the run
    assert!(out.status.success());
    assert!(stdout_of(&out).contains("Errors: parse=0 io=1 pattern=0"));
}

#[test]
fn test_bad_pattern_fails_after_summary() {
    let fx = fixture(UPDATE);
    let report = fx.dir.path().join("run.json");

    let out = resmerge_cmd()
        .args([
            arg(&fx.master),
            "--file-include",
            "(unclosed",
            "--report-json",
            arg(&report),
        ])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(stdout_of(&out).contains("Errors: parse=0 io=0 pattern=1"));
    assert_eq!(stderr_of(&out).matches("invalid pattern").count(), 1);

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["summary"]["pattern_errors"], 1);
    assert_eq!(value["summary"]["parsed_files"], 0);
}

#[test]
fn test_latin1_master_round_trips() {
    let fx = fixture(UPDATE);
    let master = b"<!-- caf\xE9 -->\n<resources>\n    <string name=\"word1\">Caf\xE9</string>\n</resources>\n";
    fs::write(&fx.master, master).unwrap();

    let out = resmerge_cmd()
        .args([arg(&fx.master), "-o", "-"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert_eq!(out.stdout, master);
}

#[test]
fn test_utf16_master_round_trips() {
    let fx = fixture(UPDATE);
    let mut master = vec![0xFF, 0xFE];
    for unit in MASTER.encode_utf16() {
        master.extend_from_slice(&unit.to_le_bytes());
    }
    fs::write(&fx.master, &master).unwrap();

    let out = resmerge_cmd()
        .args([arg(&fx.master), "-o", "-"])
        .output()
        .unwrap();

    assert!(out.status.success(), "stderr: {}", stderr_of(&out));
    assert_eq!(out.stdout, master);
}

#[test]
fn test_bad_template_fails() {
    let fx = fixture(UPDATE);

    let out = resmerge_cmd()
        .args([arg(&fx.master), "-o", "out/"])
        .output()
        .unwrap();

    assert_eq!(out.status.code(), Some(1));
    assert!(stderr_of(&out).contains("Output validation failed"));
}

#[test]
fn test_strict_close_counts_failed_file() {
    let fx = fixture(UPDATE);
    let bad = fx.dir.path().join("bad.xml");
    fs::write(&bad, "<resources>\n<string name=\"w\">Val</strong>\n</resources>\n").unwrap();

    let out = resmerge_cmd()
        .args([arg(&fx.master), arg(&bad), "--strict-close"])
        .output()
        .unwrap();

    assert!(out.status.success());
    assert!(stdout_of(&out).contains("Errors: parse=1 io=0 pattern=0"));
}
