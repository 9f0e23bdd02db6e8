use codepad::replay::{parse_script, replay, Replayer};
use codepad::{EditorConfig, Position};
use std::process::Command;
use tempfile::TempDir;

const SAMPLE: &str = "bool test_function(int param1, string param2)\n\
{\n\
\x20   if (param1 == 1)\n\
\x20       return true;\n\
\x20   return false;\n\
}\n";

fn inline() -> EditorConfig {
    EditorConfig {
        background_highlight: false,
        ..EditorConfig::default()
    }
}

#[test]
fn edit_then_undo_restores_document() {
    let script = "move 3 5\ntype // \nkey Enter\ntick\nundo\nundo\n";
    let report = replay(inline(), SAMPLE, script).expect("replay");
    assert_eq!(report.content, SAMPLE);
    assert!(report.can_redo);
    assert_eq!(report.cursor, Position::new(3, 5));
}

#[test]
fn typed_brace_opens_an_indented_block() {
    let mut replayer = Replayer::new(inline(), "fn f()\n").expect("replayer");
    let commands = parse_script("move 1 7\ntype  {\nkey Enter\ntype x;\n").expect("parse");
    replayer.run(&commands).expect("run");
    let report = replayer.finish();
    assert_eq!(report.content, "fn f() {\n    x;\n}\n");
    assert_eq!(report.cursor, Position::new(2, 7));
}

#[test]
fn selection_replace_and_word_queries() {
    let script = "word 1 6\ntype check\nmove 4 9\nkey shift+End\n";
    let report = replay(inline(), SAMPLE, script).expect("replay");
    assert!(report.content.starts_with("bool check(int param1"));
    assert_eq!(report.selected_text, "return true;");
}

#[test]
fn every_line_gets_spans_after_settling() {
    let report = replay(EditorConfig::default(), SAMPLE, "goto 5\ntype !\n").expect("replay");
    assert_eq!(report.line_count, 6);
    assert!(report.lines.iter().all(|line| !line.spans.is_empty()));
    assert_eq!(report.lines[4].text, "!    return false;");
}

#[test]
fn binary_writes_output_file_and_json_report() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.c");
    let script = dir.path().join("edit.script");
    let output = dir.path().join("output.c");
    std::fs::write(&input, SAMPLE).expect("write input");
    std::fs::write(&script, "# swap the condition\nword 3 9\ntype flag\n").expect("write script");

    let result = Command::new(env!("CARGO_BIN_EXE_codepad"))
        .arg(&input)
        .arg("--script")
        .arg(&script)
        .arg("--output")
        .arg(&output)
        .arg("--json")
        .env_remove("RUST_LOG")
        .output()
        .expect("run codepad");
    assert!(
        result.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&result.stderr)
    );

    let written = std::fs::read_to_string(&output).expect("read output");
    assert!(written.contains("    if (flag == 1)"), "{}", written);

    let report: serde_json::Value = serde_json::from_slice(&result.stdout).expect("json report");
    assert_eq!(report["content"], written.as_str());
    assert_eq!(report["line_count"], 6);
    assert_eq!(report["cursor"]["line"], 3);
    assert_eq!(report["cursor"]["column"], 13);
}

#[test]
fn binary_reports_script_errors() {
    let dir = TempDir::new().expect("tempdir");
    let input = dir.path().join("input.txt");
    let script = dir.path().join("bad.script");
    std::fs::write(&input, "x\n").expect("write input");
    std::fs::write(&script, "move 1 1\njump 3\n").expect("write script");

    let result = Command::new(env!("CARGO_BIN_EXE_codepad"))
        .arg(&input)
        .arg("--script")
        .arg(&script)
        .output()
        .expect("run codepad");
    assert!(!result.status.success());
    let stderr = String::from_utf8_lossy(&result.stderr);
    assert!(stderr.contains("script line 2"), "{}", stderr);
}
