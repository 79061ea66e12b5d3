use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::tempdir;

fn replay_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_noria-replay"))
}

fn run(args: &[&str], dir: &Path) -> Output {
    Command::new(replay_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("NORIA_LOG")
        .output()
        .expect("run noria-replay")
}

const SESSION: &str = concat!(
    r#"[{"update_type":"make-node","make-node_node":1,"make-node_type":"div","make-node_props":{"class":"term"}}]"#,
    "\n",
    r#"[{"update_type":"make-node","make-node_node":2,"make-node_type":"raw-line","make-node_props":"#,
    r#"{"metrics":{"width":8,"height":16},"text":"$ ls","fg-markup":[[1,"prompt"]]}},"#,
    r#"{"update_type":"add","add_parent":1,"add_child":2,"add_index":0},"#,
    r#"{"update_type":"make-node","make-node_node":3,"make-node_type":"canvas"}]"#,
    "\n"
);

#[test]
fn replay_json_summary_with_config() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("session.jsonl"), SESSION).expect("write transcript");
    fs::write(dir.path().join("noria.toml"), "root_node = 1\nmount_anchor = \"app\"\n")
        .expect("write config");

    let output = run(
        &["replay", "session.jsonl", "--json", "--config", "noria.toml"],
        dir.path(),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let summary: Value = serde_json::from_slice(&output.stdout).expect("json summary");
    assert_eq!(summary["frames"], 2);
    assert_eq!(summary["applied"], 3);
    assert_eq!(summary["skipped"], 1);
    assert_eq!(summary["diagnostics"][0]["kind"], "unknown-type");
    assert_eq!(summary["diagnostics_total"], 1);
    let html = summary["html"].as_str().expect("html");
    assert!(html.starts_with(r#"<div class="term">"#));
    assert!(html.contains(r#"<span class="prompt">$</span><span> ls</span>"#));
}

#[test]
fn replay_prints_html_and_warnings() {
    let dir = tempdir().expect("tempdir");
    let transcript = concat!(
        r#"[{"update_type":"make-node","make-node_node":0,"make-node_type":"text","make-node_props":{"text":"ok"}}]"#,
        "\n",
        r#"[{"update_type":"remove","remove_node":9}]"#,
        "\n"
    );
    fs::write(dir.path().join("t.jsonl"), transcript).expect("write transcript");

    let output = run(&["replay", "t.jsonl"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "ok\nwarning: remove: unknown node 9\n");
}

#[test]
fn hard_failure_exits_with_two() {
    let dir = tempdir().expect("tempdir");
    let transcript = concat!(
        r#"[{"update_type":"make-node","make-node_node":1,"make-node_type":"text"},"#,
        r#"{"update_type":"make-node","make-node_node":2,"make-node_type":"text"},"#,
        r#"{"update_type":"add","add_parent":1,"add_child":2,"add_index":0}]"#,
        "\n"
    );
    fs::write(dir.path().join("bad.jsonl"), transcript).expect("write transcript");

    let output = run(&["replay", "bad.jsonl"], dir.path());
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("line 1: add on node 1 failed"));
}

#[test]
fn check_reports_counts_and_decode_errors() {
    let dir = tempdir().expect("tempdir");
    fs::write(dir.path().join("session.jsonl"), SESSION).expect("write transcript");
    let output = run(&["check", "session.jsonl"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("frames: 2\n"));
    assert!(stdout.contains("make-node: 3\n"));
    assert!(stdout.contains("add: 1\n"));
    assert!(stdout.contains("destroy: 0\n"));

    fs::write(dir.path().join("broken.jsonl"), "[{\"update_type\":\"nope\"}]\n")
        .expect("write transcript");
    let output = run(&["check", "broken.jsonl"], dir.path());
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("line 1:"));
}
