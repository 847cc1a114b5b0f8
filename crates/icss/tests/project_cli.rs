use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_project_dir(tag: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    dir.push(format!("icss_project_cli_{tag}_{nanos}"));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn icss(args: &[&str], dir: &Path) -> Output {
    let exe = env!("CARGO_BIN_EXE_icss");
    Command::new(exe)
        .args(args)
        .arg("--manifest-path")
        .arg(dir)
        .output()
        .expect("run icss")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn build_writes_folded_stylesheet_to_out_dir() {
    let dir = temp_project_dir("build");
    fs::write(dir.join("icss.toml"), "[package]\nentry = \"main.icss\"\n").expect("write icss.toml");
    fs::write(
        dir.join("main.icss"),
        "Size := 10px;\na {\n  width: Size + 5px;\n}\n",
    )
    .expect("write main.icss");

    let output = icss(&["build"], &dir);
    if !output.status.success() {
        panic!("stderr: {}", stderr(&output));
    }
    let css = fs::read_to_string(dir.join("dist").join("main.css")).expect("read main.css");
    assert_eq!(css, "a {\n\twidth: 15px;\n}\n");
    assert!(dir.join(".icss").join("build").join("main.meta").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn second_build_is_up_to_date_until_source_changes() {
    let dir = temp_project_dir("cache");
    fs::write(dir.join("icss.toml"), "[package]\nentry = \"main.icss\"\n").expect("write icss.toml");
    fs::write(dir.join("main.icss"), "a { width: 1px; }\n").expect("write main.icss");

    let first = icss(&["build"], &dir);
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    assert!(!stderr(&first).contains("up to date"));

    let second = icss(&["build"], &dir);
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    assert!(stderr(&second).contains("up to date"), "stderr: {}", stderr(&second));

    fs::write(dir.join("main.icss"), "a { width: 2px; }\n").expect("rewrite main.icss");
    let third = icss(&["build"], &dir);
    assert!(third.status.success(), "stderr: {}", stderr(&third));
    assert!(!stderr(&third).contains("up to date"));
    let css = fs::read_to_string(dir.join("dist").join("main.css")).expect("read main.css");
    assert_eq!(css, "a {\n\twidth: 2px;\n}\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_reports_type_error_with_location() {
    let dir = temp_project_dir("check");
    fs::write(dir.join("icss.toml"), "[package]\nentry = \"main.icss\"\n").expect("write icss.toml");
    fs::write(dir.join("main.icss"), "a {\n  width: TRUE;\n}\n").expect("write main.icss");

    let output = icss(&["check"], &dir);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(
        err.contains("error: Property 'width' has invalid type"),
        "stderr: {err}"
    );
    assert!(err.contains("main.icss:2:10"), "stderr: {err}");
    assert!(err.contains("[check] failed"), "stderr: {err}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn check_reports_arithmetic_overflow() {
    let dir = temp_project_dir("overflow");
    fs::write(dir.join("icss.toml"), "[package]\nentry = \"main.icss\"\n").expect("write icss.toml");
    fs::write(
        dir.join("main.icss"),
        "a {\n  width: 9223372036854775807px + 1px;\n}\n",
    )
    .expect("write main.icss");

    let output = icss(&["check"], &dir);
    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(
        err.contains("error: Arithmetic overflow in '+' operation"),
        "stderr: {err}"
    );
    assert!(err.contains("main.icss:2:10"), "stderr: {err}");
    assert!(!err.contains("internal error"), "stderr: {err}");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn build_failure_writes_no_output() {
    let dir = temp_project_dir("fail");
    fs::write(dir.join("icss.toml"), "[package]\nentry = \"main.icss\"\n").expect("write icss.toml");
    fs::write(dir.join("main.icss"), "a { width: 10% + 5px; }\n").expect("write main.icss");

    let output = icss(&["build"], &dir);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("One property of the operation has invalid type"));
    assert!(!dir.join("dist").join("main.css").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn manifest_select_branches_keeps_taken_branch() {
    let dir = temp_project_dir("select");
    let manifest = r#"
[package]
name = "site"
entries = ["theme.icss"]

[build]
out_dir = "public"
select_branches = true
"#;
    fs::write(dir.join("icss.toml"), manifest).expect("write icss.toml");
    let src = "Dark := FALSE;\nbody {\n  if [Dark] {\n    color: #000000;\n  } else {\n    color: #ffffff;\n  }\n}\n";
    fs::write(dir.join("theme.icss"), src).expect("write theme.icss");

    let output = icss(&["build"], &dir);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let css = fs::read_to_string(dir.join("public").join("theme.css")).expect("read theme.css");
    assert_eq!(css, "body {\n\tcolor: #ffffff;\n}\n");

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn clean_removes_build_cache() {
    let dir = temp_project_dir("clean");
    fs::write(dir.join("icss.toml"), "[package]\nentry = \"main.icss\"\n").expect("write icss.toml");
    fs::write(dir.join("main.icss"), "a { width: 1px; }\n").expect("write main.icss");

    let build = icss(&["build"], &dir);
    assert!(build.status.success(), "stderr: {}", stderr(&build));
    assert!(dir.join(".icss").join("build").exists());

    let clean = icss(&["clean"], &dir);
    assert!(clean.status.success(), "stderr: {}", stderr(&clean));
    assert!(!dir.join(".icss").join("build").exists());
    assert!(dir.join("dist").join("main.css").exists());

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_entry_is_reported() {
    let dir = temp_project_dir("missing");
    fs::write(dir.join("icss.toml"), "[package]\nname = \"empty\"\n").expect("write icss.toml");

    let output = icss(&["build"], &dir);
    assert!(!output.status.success());
    assert!(
        stderr(&output)
            .contains("missing entry: pass a file path or set package.entry in icss.toml"),
        "stderr: {}",
        stderr(&output)
    );

    let _ = fs::remove_dir_all(&dir);
}
