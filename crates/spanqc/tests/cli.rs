//! The spanqc binary end to end.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn spanqc_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_spanqc"))
}

fn write_script(dir: &Path, source: &str) -> PathBuf {
    let path = dir.join("main.sq");
    std::fs::write(&path, source).unwrap();
    path
}

fn spanqc(args: &[&str], script: &Path) -> Output {
    Command::new(spanqc_bin())
        .args(args)
        .arg(script)
        .env_remove("SPANQ_LOG")
        .output()
        .expect("failed to run spanqc")
}

const QUERY: &str = "let xs: ReadOnlySpan<Int> = [1, 2, 3, 4];\nlet n = xs.Where(|x| x > 2).Count();\n";

#[test]
fn gen_prints_the_unit() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), QUERY);
    let output = spanqc(&["gen"], &script);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("// Generated by spanq. Do not edit.\n"), "{}", stdout);
    assert!(stdout.contains("unit SpanLinq {"), "{}", stdout);
    assert!(stdout.contains("struct WhereSpan<"), "{}", stdout);
}

#[test]
fn gen_prints_nothing_when_nothing_is_needed() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "let xs = [1, 2];\nlet n = xs.Count();\n");
    let output = spanqc(&["gen"], &script);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn config_file_and_flags() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), QUERY);
    std::fs::write(
        dir.path().join("spanq.toml"),
        "[generator]\nunit_name = \"FromFile\"\n",
    )
    .unwrap();

    let output = spanqc(&["gen"], &script);
    assert!(String::from_utf8_lossy(&output.stdout).contains("unit FromFile {"));

    let output = spanqc(&["gen", "--unit-name", "FromFlag"], &script);
    assert!(String::from_utf8_lossy(&output.stdout).contains("unit FromFlag {"));
}

#[test]
fn gen_json_reports_stats() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), QUERY);
    let output = spanqc(&["gen", "--json"], &script);
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["unit"], "SpanLinq");
    assert_eq!(json["stats"]["rounds"], 1);
    assert_eq!(json["stats"]["pending"], 0);
    assert!(json["text"].as_str().unwrap().contains("ext fn Where"));
}

#[test]
fn run_prints_bindings() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), QUERY);
    let output = spanqc(&["run"], &script);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("xs: ReadOnlySpan<Int> = [1, 2, 3, 4]"), "{}", stdout);
    assert!(stdout.contains("n: Int = 2"), "{}", stdout);
    assert!(stdout.ends_with("=> 2\n"), "{}", stdout);
}

#[test]
fn run_reports_query_failures() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "let xs: Span<Int> = [1, 2];\nlet n = xs.Single();\n",
    );
    let output = spanqc(&["run", "--json"], &script);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut stream =
        serde_json::Deserializer::from_str(&stderr).into_iter::<serde_json::Value>();
    let json = stream.next().unwrap().unwrap();
    assert_eq!(json["code"], "R0001");
    assert_eq!(json["message"], "Sequence contains more than one element");
}

#[test]
fn check_reports_permanently_unresolved_calls() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(
        dir.path(),
        "let xs: ReadOnlySpan<Int> = [1];\nlet n = xs.Shuffle();\n",
    );
    let output = spanqc(&["check", "--no-color"], &script);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[H0002]"), "{}", stderr);
    assert!(stderr.contains("no method `Shuffle`"), "{}", stderr);

    let clean = write_script(dir.path(), QUERY);
    let output = spanqc(&["check"], &clean);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "ok\n");
}

#[test]
fn parse_errors_stop_early() {
    let dir = tempfile::tempdir().unwrap();
    let script = write_script(dir.path(), "let xs = [1, 2;\n");
    let output = spanqc(&["gen", "--no-color"], &script);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[P0001]"), "{}", stderr);
}
